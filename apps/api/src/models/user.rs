use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::training::TrainingModule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Beauty,
    Restaurant,
    Retail,
}

impl Sector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Beauty => "beauty",
            Sector::Restaurant => "restaurant",
            Sector::Retail => "retail",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "beauty" => Some(Sector::Beauty),
            "restaurant" => Some(Sector::Restaurant),
            "retail" => Some(Sector::Retail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeKey {
    ProfileComplete,
    FirstModule,
    HighScore,
    FiveModules,
}

/// Per-module learner progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub score: u32,
    pub completed: bool,
}

/// A business owner's record, keyed by identity-provider uid.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub uid: String,
    pub phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub establishment_name: Option<String>,
    pub sector: Option<String>,
    pub team_size: Option<i32>,
    pub experience: Option<i32>,
    pub photo_url: Option<String>,
    pub purchased_modules: Json<Vec<TrainingModule>>,
    pub progress: Json<BTreeMap<String, ModuleProgress>>,
    pub badges: Json<Vec<BadgeKey>>,
    pub gemini_credits: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Record shown to an identity that has nothing stored yet.
    pub fn bare(uid: &str, phone: &str) -> Self {
        Self {
            uid: uid.to_string(),
            phone: phone.to_string(),
            first_name: None,
            last_name: None,
            email: None,
            establishment_name: None,
            sector: None,
            team_size: None,
            experience: None,
            photo_url: None,
            purchased_modules: Json(Vec::new()),
            progress: Json(BTreeMap::new()),
            badges: Json(Vec::new()),
            gemini_credits: None,
            created_at: Utc::now(),
        }
    }
}
