//! Answer recording, scoring and weak-topic extraction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assessment::questions::Question;
use crate::errors::AppError;

/// Yes/no answers keyed by 0-based question index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    question_count: usize,
    answers: BTreeMap<usize, bool>,
}

impl AnswerSet {
    pub fn new(question_count: usize) -> Self {
        Self {
            question_count,
            answers: BTreeMap::new(),
        }
    }

    /// Records an answer. Answering an index twice overwrites the first value.
    pub fn record(&mut self, question_index: usize, value: bool) -> Result<(), AppError> {
        if question_index >= self.question_count {
            return Err(AppError::Validation(format!(
                "question index {question_index} is out of range (0..{})",
                self.question_count
            )));
        }
        self.answers.insert(question_index, value);
        Ok(())
    }

    pub fn get(&self, question_index: usize) -> Option<bool> {
        self.answers.get(&question_index).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.question_count
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }
}

/// Number of questions answered "yes".
pub fn score(answers: &AnswerSet) -> usize {
    answers.answers.values().filter(|&&v| v).count()
}

/// Topics of the questions answered "no", deduplicated, ordered by the first
/// question index at which each appears.
pub fn weak_topics(questions: &[Question], answers: &AnswerSet) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for (index, question) in questions.iter().enumerate() {
        if answers.get(index) != Some(false) {
            continue;
        }
        if !topics.iter().any(|t| t == question.topic) {
            topics.push(question.topic.to_string());
        }
    }
    topics
}

/// Feedback bucket for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    NeedsImprovement,
    Solid,
    Excellent,
}

impl ScoreBand {
    pub fn from_score(score: usize) -> Self {
        if score < 8 {
            ScoreBand::NeedsImprovement
        } else if score < 14 {
            ScoreBand::Solid
        } else {
            ScoreBand::Excellent
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScoreBand::NeedsImprovement => {
                "Il y a des opportunités d'amélioration significatives. \
                 Nos modules peuvent vous aider à transformer vos pratiques."
            }
            ScoreBand::Solid => {
                "Vos pratiques sont solides, mais il y a toujours de la place pour l'excellence. \
                 Ciblez des modules spécifiques pour perfectionner vos compétences."
            }
            ScoreBand::Excellent => {
                "Excellent ! Vos pratiques sont déjà à un niveau élevé. \
                 Explorez nos modules pour garder une longueur d'avance."
            }
        }
    }
}
