//! 批处理流水线 - 编排层
//!
//! ## 职责
//!
//! 把业务能力层的各个服务按调用方式串起来，不包含具体业务判断。
//!
//! ## 四种流程
//!
//! 1. **prep**：加载文章 → 构造请求 → 写批处理文件（离线，无需密钥）
//! 2. **submit**：prep → 上传并创建任务 → 轮询到结束 → 下载结果
//! 3. **poll**：按任务名重新连接 → 轮询到结束 → 下载结果
//! 4. **cancel**：确认任务存在 → 请求取消
//!
//! 每个流程返回 `anyhow::Result`，[`exit_code_for`] 负责映射为进程退出码。

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};

use crate::clients::{BatchApi, GeminiClient};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{load_articles, load_prompt, load_schema, JobHandle};
use crate::services::{
    BatchWriter, JobCanceller, JobPoller, JobSubmitter, MaterializeResult, RequestBuilder,
    ResultMaterializer,
};
use crate::utils::logging::log_job_created;

/// 远程任务以非成功状态结束时的退出码
pub const EXIT_JOB_FAILED: i32 = 2;
/// 其他错误的退出码
pub const EXIT_ERROR: i32 = 1;

/// 一次流程的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 只写出了批处理文件（prep 或 dry-run）
    Prepared { requests: usize, path: PathBuf },
    /// 任务成功，结果已写出
    Materialized(MaterializeResult),
    /// 已发送取消请求
    CancelRequested(JobHandle),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Prepared { requests, path } => {
                write!(f, "已写出 {} 条请求到批处理文件 {}", requests, path.display())
            }
            Outcome::Materialized(result) => write!(
                f,
                "批处理成功，共写出 {} 条结果到 {}",
                result.records,
                result.output_path.display()
            ),
            Outcome::CancelRequested(job) => write!(f, "已请求取消任务 {}", job),
        }
    }
}

/// 构造批处理文件所需的参数
#[derive(Debug, Clone)]
pub struct PrepOptions {
    /// 文章 JSON 数组
    pub input: PathBuf,
    /// 批处理文件（JSONL）
    pub output: PathBuf,
    /// 提示词文件，不存在时使用内置提示词
    pub prompt: Option<PathBuf>,
    /// 自定义响应 Schema 文件
    pub schema: Option<PathBuf>,
}

/// 完整提交流程的参数
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub input: PathBuf,
    /// 结果输出路径
    pub output: PathBuf,
    /// 本地批处理文件路径
    pub upload_file: PathBuf,
    pub file_display_name: String,
    pub job_display_name: String,
    pub prompt: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    /// 为 None 时使用配置中的默认模型
    pub model: Option<String>,
    /// 只写出批处理文件，不上传
    pub dry_run: bool,
}

impl SubmitOptions {
    fn prep_options(&self) -> PrepOptions {
        PrepOptions {
            input: self.input.clone(),
            output: self.upload_file.clone(),
            prompt: self.prompt.clone(),
            schema: self.schema.clone(),
        }
    }
}

/// 应用主结构
///
/// 离线流程（prep、dry-run）不需要 API 客户端；需要网络的流程在
/// 没有客户端时直接报错。
pub struct App {
    config: Config,
    api: Option<Arc<dyn BatchApi>>,
}

impl App {
    /// 创建不带 API 客户端的应用，只能运行离线流程
    pub fn offline(config: Config) -> Self {
        Self { config, api: None }
    }

    /// 使用指定的 API 实现（测试中注入 mock）
    pub fn with_api(config: Config, api: Arc<dyn BatchApi>) -> Self {
        Self {
            config,
            api: Some(api),
        }
    }

    /// 读取 API 密钥并连接 Gemini
    pub fn connect(config: Config) -> Result<Self> {
        let config = config.require_api_key()?;
        let client = GeminiClient::new(&config).context("创建 Gemini 客户端失败")?;
        Ok(Self::with_api(config, Arc::new(client)))
    }

    fn api(&self) -> Result<Arc<dyn BatchApi>> {
        self.api
            .clone()
            .ok_or_else(|| anyhow!("当前流程需要连接批处理 API，但没有可用的客户端"))
    }

    fn poller(&self, api: Arc<dyn BatchApi>) -> JobPoller {
        JobPoller::with_interval(api, Duration::from_secs(self.config.poll_interval_secs))
    }

    /// 构造请求并写出批处理文件
    ///
    /// # 返回
    /// 返回写入的请求数量
    pub async fn prep(&self, opts: &PrepOptions) -> Result<usize> {
        info!("📁 加载文章: {}", opts.input.display());
        let records = load_articles(&opts.input)
            .await
            .with_context(|| format!("加载输入文件 {} 失败", opts.input.display()))?;
        if records.is_empty() {
            warn!("⚠️ 输入文件中没有任何文章");
        }

        let prompt = load_prompt(opts.prompt.as_deref()).await?;
        let schema = load_schema(opts.schema.as_deref()).await?;
        let builder = RequestBuilder::new(prompt, schema);
        let requests = builder.build_all(&records)?;

        let written = BatchWriter::new()
            .write(&requests, &opts.output)
            .with_context(|| format!("写出批处理文件 {} 失败", opts.output.display()))?;
        info!("✓ 已写出 {} 条请求到 {}", written, opts.output.display());
        Ok(written)
    }

    /// 完整提交流程
    ///
    /// # 返回
    /// dry-run 时返回 [`Outcome::Prepared`]，否则返回 [`Outcome::Materialized`]
    pub async fn submit(&self, opts: &SubmitOptions) -> Result<Outcome> {
        let count = self.prep(&opts.prep_options()).await?;

        if opts.dry_run {
            info!("🧪 dry-run 模式：跳过上传，批处理文件保留在 {}", opts.upload_file.display());
            return Ok(Outcome::Prepared {
                requests: count,
                path: opts.upload_file.clone(),
            });
        }
        if count == 0 {
            bail!("没有可提交的请求，输入文件 {} 为空", opts.input.display());
        }

        let api = self.api()?;
        let model = opts.model.as_deref().unwrap_or(&self.config.default_model);
        info!("📤 使用模型 {} 提交 {} 条请求", model, count);

        let handle = JobSubmitter::new(api.clone())
            .submit(
                &opts.upload_file,
                &opts.file_display_name,
                &opts.job_display_name,
                model,
            )
            .await
            .context("提交批处理任务失败")?;
        log_job_created(&handle);

        self.finish(api, &handle, &opts.output)
            .await
            .map(Outcome::Materialized)
    }

    /// 重新连接已有任务，轮询到结束并下载结果
    pub async fn poll(&self, job: &JobHandle, output: &Path) -> Result<MaterializeResult> {
        let api = self.api()?;
        info!("🔗 重新连接任务: {}", job);
        self.finish(api, job, output).await
    }

    /// 取消任务
    pub async fn cancel(&self, job: &JobHandle) -> Result<()> {
        let api = self.api()?;
        JobCanceller::new(api)
            .cancel(job)
            .await
            .with_context(|| format!("取消任务 {} 失败", job))
    }

    async fn finish(
        &self,
        api: Arc<dyn BatchApi>,
        job: &JobHandle,
        output: &Path,
    ) -> Result<MaterializeResult> {
        let finished = self
            .poller(api.clone())
            .wait(job)
            .await
            .with_context(|| format!("查询任务 {} 状态失败", job))?;

        ResultMaterializer::new(api)
            .materialize(&finished, output)
            .await
            .with_context(|| format!("任务 {} 的结果未能写出，可稍后用 poll 重新获取", job))
    }
}

/// 把流程结果映射为进程退出码
///
/// 成功为 0；远程任务失败、取消或过期为 [`EXIT_JOB_FAILED`]；其他错误为 [`EXIT_ERROR`]。
pub fn exit_code_for<T>(outcome: &Result<T>) -> i32 {
    match outcome {
        Ok(_) => 0,
        Err(err) => {
            let remote = err
                .chain()
                .filter_map(|cause| cause.downcast_ref::<AppError>())
                .any(AppError::is_remote_job_failure);
            if remote {
                EXIT_JOB_FAILED
            } else {
                EXIT_ERROR
            }
        }
    }
}
