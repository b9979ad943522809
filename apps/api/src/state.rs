use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::assessment::plan::PlanGenerator;
use crate::assessment::sessions::SessionStore;
use crate::config::Config;
use crate::identity::client::IdentityClient;
use crate::identity::watch::IdentityWatch;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub sessions: SessionStore,
    pub s3: S3Client,
    pub identity: IdentityClient,
    pub identity_watch: IdentityWatch,
    /// `None` when no generation key is configured; plan requests then fail
    /// with a configuration error.
    pub planner: Option<Arc<dyn PlanGenerator>>,
    pub config: Config,
}
