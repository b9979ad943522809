use serde::{Deserialize, Serialize};

/// A multiple-choice question inside a training module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question_text: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
}

impl QuizQuestion {
    /// The correct answer must be one of the offered options.
    pub fn answer_is_an_option(&self) -> bool {
        self.options.iter().any(|o| o == &self.answer)
    }
}

/// A generated training unit tied to one topic, purchasable individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingModule {
    /// Kebab-case slug, unique within a catalog.
    pub id: String,
    pub topic: String,
    pub title: String,
    pub mini_course: String,
    /// HTML lesson body.
    pub lesson_content: String,
    pub video_url: String,
    pub infographic_url: String,
    pub quiz_questions: Vec<QuizQuestion>,
    pub exercises: String,
    pub tips: Vec<String>,
    pub next_steps: String,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_module_deserializes_generator_shape() {
        let json = r#"{
            "id": "accueil-telephonique",
            "topic": "Accueil téléphonique",
            "title": "Décrocher avec le sourire",
            "mini_course": "Apprenez à accueillir vos clients au téléphone.",
            "lesson_content": "<h3>Introduction</h3><p>...</p>",
            "video_url": "https://www.youtube.com/watch?v=abc",
            "infographic_url": "https://picsum.photos/800/1200",
            "quiz_questions": [
                {
                    "question_text": "Combien de sonneries avant de décrocher ?",
                    "options": ["1", "3", "5", "10"],
                    "answer": "3",
                    "explanation": "Trois sonneries maximum."
                }
            ],
            "exercises": "Chronométrez vos prises d'appel.",
            "tips": ["Souriez", "Présentez-vous"],
            "next_steps": "Module Accueil physique."
        }"#;
        let module: TrainingModule = serde_json::from_str(json).unwrap();
        assert_eq!(module.id, "accueil-telephonique");
        assert_eq!(module.quiz_questions.len(), 1);
        assert!(module.quiz_questions[0].answer_is_an_option());
        assert_eq!(module.tips.len(), 2);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let json = r#"{"id": "x", "topic": "y"}"#;
        assert!(serde_json::from_str::<TrainingModule>(json).is_err());
    }

    #[test]
    fn test_answer_outside_options_detected() {
        let question = QuizQuestion {
            question_text: "?".to_string(),
            options: vec!["Oui".to_string(), "Non".to_string()],
            answer: "Peut-être".to_string(),
            explanation: String::new(),
        };
        assert!(!question.answer_is_an_option());
    }
}
