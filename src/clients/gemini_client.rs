/// Gemini 批处理 API 客户端
///
/// 封装所有与 Gemini REST 接口的交互：文件上传（可续传协议）、
/// 创建/查询/取消批处理任务、下载结果文件。
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::clients::batch_api::BatchApi;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{BatchJob, JobHandle, JobState};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Gemini 客户端
pub struct GeminiClient {
    http: Client,
    api_key: String,
    api_base_url: String,
    upload_base_url: String,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    ///
    /// `config.api_key` 需已通过 [`Config::require_api_key`] 加载。
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("quote_batch/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed("client", e))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn batch_url(&self, job: &JobHandle) -> String {
        format!("{}/{}", self.api_base_url, job.name())
    }

    async fn start_resumable_upload(
        &self,
        display_name: &str,
        mime_type: &str,
        content_length: usize,
    ) -> AppResult<String> {
        let endpoint = format!("{}/upload/v1beta/files", self.upload_base_url);
        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", content_length)
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;
        let response = ensure_success(&endpoint, response).await?;

        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::BadResponse {
                    endpoint,
                    status: 200,
                    message: format!("响应缺少 {} 头", UPLOAD_URL_HEADER),
                }
                .into()
            })
    }
}

#[async_trait]
impl BatchApi for GeminiClient {
    async fn upload_file(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> AppResult<String> {
        let path_str = path.display().to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(&path_str, e))?;
        debug!("上传文件 {} ({} 字节)", path_str, bytes.len());

        let upload_failed = |reason: String| -> AppError {
            ApiError::UploadFailed {
                path: path_str.clone(),
                reason,
            }
            .into()
        };

        let upload_url = self
            .start_resumable_upload(display_name, mime_type, bytes.len())
            .await
            .map_err(|e| upload_failed(e.to_string()))?;

        let response = self
            .http
            .post(&upload_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Offset", 0)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| upload_failed(e.to_string()))?;
        let response = ensure_success(&upload_url, response)
            .await
            .map_err(|e| upload_failed(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| upload_failed(e.to_string()))?;
        let uploaded: UploadResponseWire =
            serde_json::from_str(&body).map_err(|e| upload_failed(e.to_string()))?;

        debug!("文件上传完成: {}", uploaded.file.name);
        Ok(uploaded.file.name)
    }

    async fn create_batch(
        &self,
        model: &str,
        file_name: &str,
        display_name: &str,
    ) -> AppResult<BatchJob> {
        let model_id = model.strip_prefix("models/").unwrap_or(model);
        let endpoint = format!(
            "{}/models/{}:batchGenerateContent",
            self.api_base_url, model_id
        );
        let creation_failed = |reason: String| -> AppError {
            ApiError::JobCreationFailed {
                model: model.to_string(),
                reason,
            }
            .into()
        };

        let payload = json!({
            "batch": {
                "display_name": display_name,
                "input_config": { "file_name": file_name },
            }
        });

        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| creation_failed(e.to_string()))?;
        let response = ensure_success(&endpoint, response)
            .await
            .map_err(|e| creation_failed(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| creation_failed(e.to_string()))?;

        parse_operation(&body).map_err(|e| creation_failed(e.to_string()))
    }

    async fn get_batch(&self, job: &JobHandle) -> AppResult<BatchJob> {
        let endpoint = self.batch_url(job);
        let response = self
            .http
            .get(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::JobNotFound {
                job_name: job.name().to_string(),
            }
            .into());
        }
        let response = ensure_success(&endpoint, response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;
        parse_operation(&body).map_err(|source| ApiError::JsonParseFailed { endpoint, source }.into())
    }

    async fn cancel_batch(&self, job: &JobHandle) -> AppResult<()> {
        let endpoint = format!("{}:cancel", self.batch_url(job));
        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::JobNotFound {
                job_name: job.name().to_string(),
            }
            .into());
        }
        ensure_success(&endpoint, response).await?;
        Ok(())
    }

    async fn download_file(&self, file_name: &str) -> AppResult<Vec<u8>> {
        let endpoint = format!(
            "{}/download/v1beta/{}:download?alt=media",
            self.upload_base_url, file_name
        );
        let response = self
            .http
            .get(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;
        let response = ensure_success(&endpoint, response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;
        debug!("下载结果文件 {} ({} 字节)", file_name, bytes.len());
        Ok(bytes.to_vec())
    }
}

// ========== 辅助函数 ==========

/// 非 2xx 响应转换为 `ApiError::BadResponse`，带上响应体便于排查
async fn ensure_success(endpoint: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    warn!("API返回错误 {} ({}): {}", status, endpoint, message);
    Err(ApiError::BadResponse {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    }
    .into())
}

#[derive(Debug, Deserialize)]
struct UploadResponseWire {
    file: UploadedFileWire,
}

#[derive(Debug, Deserialize)]
struct UploadedFileWire {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OperationWire {
    name: String,
    #[serde(default)]
    done: bool,
    metadata: Option<BatchMetadataWire>,
    response: Option<BatchOutputWire>,
    error: Option<StatusWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchMetadataWire {
    display_name: Option<String>,
    state: Option<String>,
    output: Option<BatchOutputWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchOutputWire {
    responses_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusWire {
    code: Option<i64>,
    message: Option<String>,
}

/// 解析创建/查询任务返回的长时操作（Operation）
fn parse_operation(body: &str) -> Result<BatchJob, serde_json::Error> {
    let op: OperationWire = serde_json::from_str(body)?;

    let metadata = op.metadata;
    let reported_state = metadata.as_ref().and_then(|m| m.state.as_deref());
    let state = match reported_state {
        Some(raw) => JobState::parse(raw),
        None if op.error.is_some() => JobState::Failed,
        None if op.done => JobState::Succeeded,
        None => JobState::Pending,
    };

    let result_file = op
        .response
        .and_then(|r| r.responses_file)
        .or_else(|| {
            metadata
                .as_ref()
                .and_then(|m| m.output.as_ref())
                .and_then(|o| o.responses_file.clone())
        });

    let error = op.error.map(|e| match (e.code, e.message) {
        (Some(code), Some(message)) => format!("[{}] {}", code, message),
        (None, Some(message)) => message,
        (Some(code), None) => format!("错误码 {}", code),
        (None, None) => "未知错误".to_string(),
    });

    Ok(BatchJob {
        name: op.name,
        display_name: metadata.and_then(|m| m.display_name),
        state,
        error,
        result_file,
    })
}
