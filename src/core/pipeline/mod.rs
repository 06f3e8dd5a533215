mod chain;
mod template;

pub use chain::LLMChain;
pub use template::PromptTemplate;

pub const PIPELINE_TEMPLATE: &str = "Answer the following question: {question}";
pub const PIPELINE_TEMPERATURE: f32 = 0.7;
