pub mod article;
pub mod job;
pub mod loaders;
pub mod prompt;
pub mod quote;
pub mod request;

pub use article::ArticleRecord;
pub use job::{BatchJob, JobHandle, JobState};
pub use loaders::{load_articles, load_prompt, load_schema};
pub use prompt::DEFAULT_PROMPT;
pub use quote::{quote_list_schema, Quote};
pub use request::{Content, ExtractionRequest, GenerateContentRequest, GenerationConfig, Part};
