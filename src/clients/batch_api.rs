/// 远程批处理 API 抽象
///
/// 服务层只依赖这个 trait，生产环境使用 `GeminiClient`，测试使用 `MockBatchApi`。
use std::path::Path;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{BatchJob, JobHandle};

/// 上传文件使用的媒体类型（换行分隔 JSON）
pub const JSONL_MIME_TYPE: &str = "application/jsonl";

#[async_trait]
pub trait BatchApi: Send + Sync {
    /// 上传本地文件，返回远程文件引用（如 `files/abc`）
    async fn upload_file(&self, path: &Path, display_name: &str, mime_type: &str)
        -> AppResult<String>;

    /// 基于已上传的文件创建批处理任务
    async fn create_batch(
        &self,
        model: &str,
        file_name: &str,
        display_name: &str,
    ) -> AppResult<BatchJob>;

    /// 查询任务当前状态
    async fn get_batch(&self, job: &JobHandle) -> AppResult<BatchJob>;

    /// 请求取消任务
    async fn cancel_batch(&self, job: &JobHandle) -> AppResult<()>;

    /// 下载远程文件的原始字节
    async fn download_file(&self, file_name: &str) -> AppResult<Vec<u8>>;
}
