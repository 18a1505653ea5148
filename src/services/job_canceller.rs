//! 任务取消服务 - 业务能力层
//!
//! 先确认任务存在，再请求远程取消

use std::sync::Arc;

use tracing::info;

use crate::clients::BatchApi;
use crate::error::AppResult;
use crate::models::JobHandle;

pub struct JobCanceller {
    api: Arc<dyn BatchApi>,
}

impl JobCanceller {
    pub fn new(api: Arc<dyn BatchApi>) -> Self {
        Self { api }
    }

    /// 取消任务
    ///
    /// 任务不存在时返回 `ApiError::JobNotFound`，不会发出取消请求。
    /// 已经结束的任务也会发出取消请求，由远程决定如何处理。
    pub async fn cancel(&self, job: &JobHandle) -> AppResult<()> {
        let current = self.api.get_batch(job).await?;
        info!("🛑 取消任务 {}（当前状态: {}）", current.name, current.state);

        self.api.cancel_batch(job).await?;
        info!("✓ 已发送取消请求: {}", job);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MockBatchApi, MockCall};
    use crate::error::{ApiError, AppError};
    use crate::models::JobState;

    #[tokio::test]
    async fn test_cancel_fetches_then_cancels() {
        let mock = Arc::new(MockBatchApi::new("batches/j", vec![JobState::Running]));
        JobCanceller::new(mock.clone())
            .cancel(&JobHandle::new("j"))
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                MockCall::Get("batches/j".to_string()),
                MockCall::Cancel("batches/j".to_string()),
            ]
        );
        let after = mock.get_batch(&JobHandle::new("j")).await.unwrap();
        assert_eq!(after.state, JobState::Cancelled);
    }

    #[tokio::test]
    async fn test_missing_job_is_not_cancelled() {
        let mock = Arc::new(MockBatchApi::new("batches/j", vec![]));
        let err = JobCanceller::new(mock.clone())
            .cancel(&JobHandle::new("other"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Api(ApiError::JobNotFound { .. })));
        assert!(!mock
            .calls()
            .iter()
            .any(|c| matches!(c, MockCall::Cancel(_))));
    }
}
