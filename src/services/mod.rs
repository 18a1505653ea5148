pub mod batch_writer;
pub mod job_canceller;
pub mod job_poller;
pub mod job_submitter;
pub mod request_builder;
pub mod result_materializer;

pub use batch_writer::BatchWriter;
pub use job_canceller::JobCanceller;
pub use job_poller::{JobPoller, DEFAULT_POLL_INTERVAL};
pub use job_submitter::JobSubmitter;
pub use request_builder::RequestBuilder;
pub use result_materializer::{parse_result_lines, MaterializeResult, ResultMaterializer};
