// LLM prompt constants for training-plan generation.

use serde_json::{json, Value};

use crate::llm_client::prompts::{FRENCH_CONTENT_INSTRUCTION, JSON_ONLY_SYSTEM};

pub const TRAINING_PLAN_SYSTEM_PREFIX: &str =
    "You are an expert instructional designer for small business owners \
    in the beauty, restaurant, and retail sectors.";

/// Full system prompt for training-plan generation.
pub fn training_plan_system() -> String {
    format!("{TRAINING_PLAN_SYSTEM_PREFIX} {JSON_ONLY_SYSTEM} {FRENCH_CONTENT_INSTRUCTION}")
}

/// Training plan prompt template. Replace `{topics}` before sending.
pub const TRAINING_PLAN_PROMPT_TEMPLATE: &str = r#"Based on the following areas of improvement identified from a self-assessment quiz, generate a comprehensive and personalized training plan. The areas of improvement are: {topics}.

The output MUST be a valid JSON array of objects, adhering to the provided schema. Each object in the array represents a training module.

For each module, provide the following:
- "id": A unique identifier for the module in kebab-case (e.g., "accueil-telephonique").
- "topic": The general category, copied EXACTLY from the list above (e.g., "Accueil téléphonique").
- "title": A catchy and descriptive title for the module.
- "mini_course": A short, engaging 2-3 sentence summary of what the user will learn.
- "lesson_content": A detailed lesson in HTML format. Use headings (<h3>), paragraphs (<p>), lists (<ul>, <li>), and bold text (<strong>) to structure the content. Make it practical and actionable.
- "video_url": A URL to a relevant YouTube video that supplements the lesson.
- "infographic_url": A placeholder URL for a helpful infographic (e.g., "https://picsum.photos/800/1200").
- "quiz_questions": An array of 3 multiple-choice questions to test understanding. Each question object has "question_text", an array of 4 "options", the correct "answer" (copied EXACTLY from one of the options), and an "explanation" of why the answer is correct.
- "exercises": A short, practical action plan or exercise for the user to implement in their business.
- "tips": A list of 2-3 actionable tips related to the module topic.
- "next_steps": Suggestions on what to focus on after completing this module.

Ensure the content is high-quality, professional, and directly addresses the provided areas of improvement.
Generate exactly one module for each topic provided."#;

pub fn training_plan_prompt(topics: &[String]) -> String {
    TRAINING_PLAN_PROMPT_TEMPLATE.replace("{topics}", &topics.join(", "))
}

/// Response schema constraining the generator to an array of modules.
pub fn training_plan_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING", "description": "A unique identifier for the module, like a slug." },
                "topic": { "type": "STRING" },
                "title": { "type": "STRING" },
                "mini_course": { "type": "STRING" },
                "lesson_content": { "type": "STRING", "description": "Detailed lesson in HTML format." },
                "video_url": { "type": "STRING", "description": "URL to a relevant YouTube video." },
                "infographic_url": { "type": "STRING", "description": "URL for a placeholder infographic." },
                "quiz_questions": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "question_text": { "type": "STRING" },
                            "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                            "answer": { "type": "STRING" },
                            "explanation": { "type": "STRING" }
                        },
                        "required": ["question_text", "options", "answer", "explanation"]
                    }
                },
                "exercises": { "type": "STRING", "description": "A practical action plan." },
                "tips": { "type": "ARRAY", "items": { "type": "STRING" } },
                "next_steps": { "type": "STRING" }
            },
            "required": [
                "id", "topic", "title", "mini_course", "lesson_content", "video_url",
                "infographic_url", "quiz_questions", "exercises", "tips", "next_steps"
            ]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_topics_in_order() {
        let prompt = training_plan_prompt(&[
            "Accueil téléphonique".to_string(),
            "Propreté et image".to_string(),
        ]);
        assert!(prompt.contains("are: Accueil téléphonique, Propreté et image."));
        assert!(!prompt.contains("{topics}"));
    }

    #[test]
    fn test_schema_requires_every_module_field() {
        let schema = training_plan_schema();
        let required = schema["items"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 11);
        assert_eq!(schema["type"], "ARRAY");
    }
}
