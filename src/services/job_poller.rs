//! 任务轮询服务 - 业务能力层
//!
//! 只观察远程状态，不改变任务。单步查询 [`JobPoller::poll`] 与
//! 阻塞等待 [`JobPoller::wait`] 分开，外部调度器也可以只调用单步查询。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::clients::BatchApi;
use crate::error::AppResult;
use crate::models::{BatchJob, JobHandle};
use crate::utils::logging::log_poll_status;

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

pub struct JobPoller {
    api: Arc<dyn BatchApi>,
    interval: Duration,
}

impl JobPoller {
    pub fn new(api: Arc<dyn BatchApi>) -> Self {
        Self::with_interval(api, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(api: Arc<dyn BatchApi>, interval: Duration) -> Self {
        Self { api, interval }
    }

    /// 查询一次任务状态
    pub async fn poll(&self, job: &JobHandle) -> AppResult<BatchJob> {
        self.api.get_batch(job).await
    }

    /// 轮询直到任务进入终止状态
    ///
    /// 第一次查询前不等待，进入终止状态后立即返回。没有超时与次数上限，
    /// 批处理任务可能运行数小时。查询本身失败时直接返回错误。
    pub async fn wait(&self, job: &JobHandle) -> AppResult<BatchJob> {
        let mut attempt = 1;
        let mut current = self.poll(job).await?;
        log_poll_status(&current, attempt);

        while !current.state.is_terminal() {
            sleep(self.interval).await;
            attempt += 1;
            current = self.poll(job).await?;
            log_poll_status(&current, attempt);
        }

        tracing::info!("任务结束，最终状态: {}", current.state);
        Ok(current)
    }
}
