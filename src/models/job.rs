use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 远程批处理任务状态
///
/// 远程可能返回 `JOB_STATE_*` 或 `BATCH_STATE_*` 两种写法，统一解析。
/// 未识别的状态视为非终止状态，由轮询器继续等待。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Expired,
    /// 远程返回的其他（非终止）状态，保留原文
    Other(String),
}

impl JobState {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled | JobState::Expired
        )
    }

    /// 标准名称（`JOB_STATE_*`）
    pub fn as_str(&self) -> &str {
        match self {
            JobState::Pending => "JOB_STATE_PENDING",
            JobState::Running => "JOB_STATE_RUNNING",
            JobState::Succeeded => "JOB_STATE_SUCCEEDED",
            JobState::Failed => "JOB_STATE_FAILED",
            JobState::Cancelled => "JOB_STATE_CANCELLED",
            JobState::Expired => "JOB_STATE_EXPIRED",
            JobState::Other(raw) => raw.as_str(),
        }
    }

    /// 从远程状态字符串解析（不会失败）
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        let short = upper
            .strip_prefix("JOB_STATE_")
            .or_else(|| upper.strip_prefix("BATCH_STATE_"))
            .unwrap_or(&upper);
        match short {
            "PENDING" | "QUEUED" => JobState::Pending,
            "RUNNING" => JobState::Running,
            "SUCCEEDED" => JobState::Succeeded,
            "FAILED" => JobState::Failed,
            "CANCELLED" => JobState::Cancelled,
            "EXPIRED" => JobState::Expired,
            _ => JobState::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 批处理任务的本地快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJob {
    /// 任务名，例如 `batches/abc123`
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub state: JobState,
    /// 远程返回的错误详情（失败时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 结果文件引用，例如 `files/batch-xyz`（成功时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_file: Option<String>,
}

impl BatchJob {
    pub fn handle(&self) -> JobHandle {
        JobHandle::new(&self.name)
    }
}

/// 任务句柄：重新连接一个任务所需的唯一信息
///
/// 可打印、可解析，`abc123` 与 `batches/abc123` 视为同一个任务。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    const PREFIX: &'static str = "batches/";

    pub fn new(id: &str) -> Self {
        let id = id.trim().trim_matches('/');
        if id.starts_with(Self::PREFIX) {
            Self(id.to_string())
        } else {
            Self(format!("{}{}", Self::PREFIX, id))
        }
    }

    /// 完整资源名（`batches/...`）
    pub fn name(&self) -> &str {
        &self.0
    }

    /// 去掉前缀的 id
    pub fn id(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('/');
        if trimmed.is_empty() || trimmed == "batches" {
            return Err("任务 ID 不能为空".to_string());
        }
        Ok(Self::new(trimmed))
    }
}
