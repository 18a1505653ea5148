use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 输入记录错误
    #[error("记录错误: {0}")]
    Record(#[from] RecordError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 远程 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 结果解析错误
    #[error("结果错误: {0}")]
    Result(#[from] ResultError),
    /// 远程任务以非成功状态结束
    #[error("任务错误: {0}")]
    Job(#[from] JobError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 API 密钥
    #[error("环境变量 {var_name} 不存在，无法读取 API 密钥")]
    MissingApiKey { var_name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值不合法
    #[error("配置项 {field} 的值 '{value}' 不合法: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
    /// TOML 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 输入记录错误
#[derive(Debug, Error)]
pub enum RecordError {
    /// 记录缺少必需字段（或字段不是字符串）
    #[error("第 {index} 条记录缺少字段 `{field}` 或其值不是字符串")]
    MissingField { index: usize, field: &'static str },
    /// 输入文件顶层不是 JSON 数组
    #[error("输入文件 {path} 的顶层不是 JSON 数组")]
    NotAnArray { path: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 远程 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// 文件上传失败
    #[error("上传文件 {path} 失败: {reason}")]
    UploadFailed { path: String, reason: String },
    /// 创建批处理任务失败
    #[error("创建批处理任务失败 (模型: {model}): {reason}")]
    JobCreationFailed { model: String, reason: String },
    /// 批处理任务不存在
    #[error("批处理任务不存在: {job_name}")]
    JobNotFound { job_name: String },
    /// 响应 JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 结果文件错误
#[derive(Debug, Error)]
pub enum ResultError {
    /// 某一行不是合法 JSON
    #[error("结果文件第 {line} 行不是合法 JSON: {source}")]
    LineParseFailed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// 成功的任务没有结果文件
    #[error("任务 {job_name} 已成功但没有结果文件")]
    MissingResultFile { job_name: String },
    /// 结果文件不是 UTF-8 文本
    #[error("结果文件不是合法的 UTF-8 文本: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// 远程任务失败
#[derive(Debug, Error)]
pub enum JobError {
    /// 任务失败
    #[error("任务 {job_name} 失败: {detail}")]
    Failed { job_name: String, detail: String },
    /// 任务已取消
    #[error("任务 {job_name} 已被取消")]
    Cancelled { job_name: String },
    /// 任务已过期
    #[error("任务 {job_name} 已过期")]
    Expired { job_name: String },
    /// 任务尚未结束（不应在此状态下获取结果）
    #[error("任务 {job_name} 尚未结束，当前状态: {state}")]
    NotFinished { job_name: String, state: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建记录缺字段错误
    pub fn missing_field(index: usize, field: &'static str) -> Self {
        AppError::Record(RecordError::MissingField { index, field })
    }

    /// 是否为远程任务非成功结束导致的错误
    pub fn is_remote_job_failure(&self) -> bool {
        matches!(self, AppError::Job(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
