pub mod batch_api;
pub mod gemini_client;
pub mod mock_client;

pub use batch_api::{BatchApi, JSONL_MIME_TYPE};
pub use gemini_client::GeminiClient;
pub use mock_client::{MockBatchApi, MockCall};
