//! Answer generation, citation handling and cost accounting

pub mod answer;
pub mod citation;
pub mod cost;
pub mod prompt;

pub use answer::{AnswerGenerator, GeneratedAnswer};
pub use citation::resolve_citations;
pub use cost::CostEstimator;
pub use prompt::PromptBuilder;
