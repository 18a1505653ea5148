/// 脚本化的批处理 API，用于测试与本地演练
///
/// 按顺序返回预设的状态序列（最后一个状态会一直重复），并记录所有调用。
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::clients::batch_api::BatchApi;
use crate::error::{ApiError, AppResult};
use crate::models::{BatchJob, JobHandle, JobState};

/// 记录下来的一次调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Upload {
        path: String,
        display_name: String,
        mime_type: String,
    },
    Create {
        model: String,
        file_name: String,
        display_name: String,
    },
    Get(String),
    Cancel(String),
    Download(String),
}

pub struct MockBatchApi {
    job_name: String,
    states: Mutex<VecDeque<JobState>>,
    last_state: Mutex<JobState>,
    error_detail: Option<String>,
    result_file: Option<String>,
    result_bytes: Vec<u8>,
    fail_upload: bool,
    fail_create: bool,
    missing_job: bool,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBatchApi {
    /// 创建一个按 `states` 顺序演进的任务
    pub fn new(job_name: &str, states: Vec<JobState>) -> Self {
        Self {
            job_name: JobHandle::new(job_name).name().to_string(),
            states: Mutex::new(states.into()),
            last_state: Mutex::new(JobState::Pending),
            error_detail: None,
            result_file: Some("files/mock-results".to_string()),
            result_bytes: Vec::new(),
            fail_upload: false,
            fail_create: false,
            missing_job: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 设置下载到的结果文件内容
    pub fn with_results(mut self, content: &str) -> Self {
        self.result_bytes = content.as_bytes().to_vec();
        self
    }

    /// 设置失败时的错误详情
    pub fn with_error(mut self, detail: &str) -> Self {
        self.error_detail = Some(detail.to_string());
        self
    }

    /// 成功的任务不带结果文件引用
    pub fn without_result_file(mut self) -> Self {
        self.result_file = None;
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// 查询任务时返回“不存在”
    pub fn missing_job(mut self) -> Self {
        self.missing_job = true;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// `get_batch` 被调用的次数
    pub fn get_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Get(_)))
            .count()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn next_state(&self) -> JobState {
        let mut last = self.last_state.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(next) = self
            .states
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
        {
            *last = next;
        }
        last.clone()
    }

    fn snapshot(&self, state: JobState) -> BatchJob {
        let error = match state {
            JobState::Failed => self.error_detail.clone(),
            _ => None,
        };
        let result_file = match state {
            JobState::Succeeded => self.result_file.clone(),
            _ => None,
        };
        BatchJob {
            name: self.job_name.clone(),
            display_name: None,
            state,
            error,
            result_file,
        }
    }
}

#[async_trait]
impl BatchApi for MockBatchApi {
    async fn upload_file(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> AppResult<String> {
        self.record(MockCall::Upload {
            path: path.display().to_string(),
            display_name: display_name.to_string(),
            mime_type: mime_type.to_string(),
        });
        if self.fail_upload {
            return Err(ApiError::UploadFailed {
                path: path.display().to_string(),
                reason: "API key not valid".to_string(),
            }
            .into());
        }
        Ok("files/mock-upload".to_string())
    }

    async fn create_batch(
        &self,
        model: &str,
        file_name: &str,
        display_name: &str,
    ) -> AppResult<BatchJob> {
        self.record(MockCall::Create {
            model: model.to_string(),
            file_name: file_name.to_string(),
            display_name: display_name.to_string(),
        });
        if self.fail_create {
            return Err(ApiError::JobCreationFailed {
                model: model.to_string(),
                reason: "quota exceeded".to_string(),
            }
            .into());
        }
        Ok(self.snapshot(JobState::Pending))
    }

    async fn get_batch(&self, job: &JobHandle) -> AppResult<BatchJob> {
        self.record(MockCall::Get(job.name().to_string()));
        if self.missing_job || job.name() != self.job_name {
            return Err(ApiError::JobNotFound {
                job_name: job.name().to_string(),
            }
            .into());
        }
        let state = self.next_state();
        Ok(self.snapshot(state))
    }

    async fn cancel_batch(&self, job: &JobHandle) -> AppResult<()> {
        self.record(MockCall::Cancel(job.name().to_string()));
        let mut states = self.states.lock().unwrap_or_else(|p| p.into_inner());
        states.clear();
        states.push_back(JobState::Cancelled);
        Ok(())
    }

    async fn download_file(&self, file_name: &str) -> AppResult<Vec<u8>> {
        self.record(MockCall::Download(file_name.to_string()));
        Ok(self.result_bytes.clone())
    }
}
