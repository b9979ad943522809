// Assessment: the fixed questionnaire, scoring, training-plan generation,
// module selection and pricing, tied together by the quiz session flow.

pub mod answers;
pub mod flow;
pub mod handlers;
pub mod plan;
pub mod pricing;
pub mod prompts;
pub mod questions;
pub mod selection;
pub mod sessions;
