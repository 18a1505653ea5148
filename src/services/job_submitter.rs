//! 任务提交服务 - 业务能力层
//!
//! 上传批处理文件并创建远程任务，返回可持久化的任务句柄

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::clients::{BatchApi, JSONL_MIME_TYPE};
use crate::error::AppResult;
use crate::models::JobHandle;

pub struct JobSubmitter {
    api: Arc<dyn BatchApi>,
}

impl JobSubmitter {
    pub fn new(api: Arc<dyn BatchApi>) -> Self {
        Self { api }
    }

    /// 上传文件并创建任务
    ///
    /// # 参数
    /// - `path`: 本地批处理文件
    /// - `file_display_name`: 上传文件的显示名称
    /// - `job_display_name`: 任务的显示名称
    /// - `model`: 使用的模型
    pub async fn submit(
        &self,
        path: &Path,
        file_display_name: &str,
        job_display_name: &str,
        model: &str,
    ) -> AppResult<JobHandle> {
        let file_name = self
            .api
            .upload_file(path, file_display_name, JSONL_MIME_TYPE)
            .await?;
        info!("📤 已上传文件: {}", file_name);

        let job = self
            .api
            .create_batch(model, &file_name, job_display_name)
            .await?;
        info!("🧾 任务初始状态: {}", job.state);

        Ok(job.handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockBatchApi, MockCall};
    use crate::error::{ApiError, AppError};
    use crate::models::JobState;

    #[tokio::test]
    async fn test_submit_uploads_then_creates() {
        let mock = Arc::new(MockBatchApi::new("batches/job-1", vec![JobState::Running]));
        let submitter = JobSubmitter::new(mock.clone());

        let handle = submitter
            .submit(Path::new("data/upload.jsonl"), "reqs", "job", "gemini-2.5-flash")
            .await
            .unwrap();

        assert_eq!(handle.to_string(), "batches/job-1");
        assert_eq!(
            mock.calls(),
            vec![
                MockCall::Upload {
                    path: "data/upload.jsonl".to_string(),
                    display_name: "reqs".to_string(),
                    mime_type: "application/jsonl".to_string(),
                },
                MockCall::Create {
                    model: "gemini-2.5-flash".to_string(),
                    file_name: "files/mock-upload".to_string(),
                    display_name: "job".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_failure_stops_before_job_creation() {
        let mock = Arc::new(MockBatchApi::new("batches/x", vec![]).failing_upload());
        let submitter = JobSubmitter::new(mock.clone());

        let err = submitter
            .submit(Path::new("u.jsonl"), "reqs", "job", "m")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Api(ApiError::UploadFailed { .. })));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_creation_failure_is_reported() {
        let mock = Arc::new(MockBatchApi::new("batches/x", vec![]).failing_create());
        let submitter = JobSubmitter::new(mock);

        let err = submitter
            .submit(Path::new("u.jsonl"), "reqs", "job", "m")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Api(ApiError::JobCreationFailed { .. })));
    }
}
