//! 结果落盘服务 - 业务能力层
//!
//! 下载成功任务的结果文件，逐行解析后合并为一个 JSON 数组写入本地

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::clients::BatchApi;
use crate::error::{AppError, AppResult, JobError, ResultError};
use crate::models::{BatchJob, JobState};

/// 落盘结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeResult {
    /// 写出的记录数
    pub records: usize,
    /// 输出文件路径
    pub output_path: PathBuf,
}

pub struct ResultMaterializer {
    api: Arc<dyn BatchApi>,
}

impl ResultMaterializer {
    pub fn new(api: Arc<dyn BatchApi>) -> Self {
        Self { api }
    }

    /// 下载并写出结果
    ///
    /// 只接受 SUCCEEDED 状态的任务；其他终止状态转换为对应的 [`JobError`]。
    /// 任意一行解析失败都会放弃整个输出，不会留下部分文件。
    pub async fn materialize(&self, job: &BatchJob, output: &Path) -> AppResult<MaterializeResult> {
        ensure_succeeded(job)?;

        let file_name = job
            .result_file
            .as_deref()
            .ok_or_else(|| ResultError::MissingResultFile {
                job_name: job.name.clone(),
            })?;
        info!("📥 下载结果文件: {}", file_name);

        let bytes = self.api.download_file(file_name).await?;
        let content = String::from_utf8(bytes).map_err(ResultError::InvalidUtf8)?;
        let records = parse_result_lines(&content)?;

        write_json_atomically(&records, output)?;
        info!("✓ 写出 {} 条结果到 {}", records.len(), output.display());

        Ok(MaterializeResult {
            records: records.len(),
            output_path: output.to_path_buf(),
        })
    }
}

/// 非成功的终止状态映射为任务错误
fn ensure_succeeded(job: &BatchJob) -> AppResult<()> {
    let job_name = job.name.clone();
    let err = match &job.state {
        JobState::Succeeded => return Ok(()),
        JobState::Failed => JobError::Failed {
            job_name,
            detail: job.error.clone().unwrap_or_else(|| "未返回错误详情".to_string()),
        },
        JobState::Cancelled => JobError::Cancelled { job_name },
        JobState::Expired => JobError::Expired { job_name },
        other => JobError::NotFinished {
            job_name,
            state: other.to_string(),
        },
    };
    Err(err.into())
}

/// 解析换行分隔 JSON，跳过空行；行号从 1 开始
pub fn parse_result_lines(content: &str) -> AppResult<Vec<Value>> {
    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(line).map_err(|source| ResultError::LineParseFailed {
            line: index + 1,
            source,
        })?;
        records.push(value);
    }
    debug!("解析到 {} 行结果", records.len());
    Ok(records)
}

/// 以 4 空格缩进写出，非 ASCII 字符原样保留
///
/// 先写同目录临时文件再重命名，失败时不会留下半个输出文件。
fn write_json_atomically(records: &[Value], output: &Path) -> AppResult<()> {
    let path_str = output.display().to_string();
    let write_failed = |e: std::io::Error| AppError::file_write_failed(&path_str, e);

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records
        .serialize(&mut serializer)
        .map_err(|e| AppError::file_write_failed(&path_str, e))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }

    let tmp = tmp_path(output);
    let result = fs::File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(&buf)?;
            f.sync_all()
        })
        .and_then(|_| fs::rename(&tmp, output));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(write_failed(e));
    }
    Ok(())
}

fn tmp_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockBatchApi;

    fn succeeded_job() -> BatchJob {
        BatchJob {
            name: "batches/j".to_string(),
            display_name: None,
            state: JobState::Succeeded,
            error: None,
            result_file: Some("files/mock-results".to_string()),
        }
    }

    #[tokio::test]
    async fn test_two_lines_become_array_of_two() {
        let mock = Arc::new(
            MockBatchApi::new("batches/j", vec![])
                .with_results("{\"key\":\"b\",\"response\":[]}\n\n{\"key\":\"a\",\"response\":[]}\n"),
        );
        let job = succeeded_job();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");

        let result = ResultMaterializer::new(mock.clone())
            .materialize(&job, &out)
            .await
            .unwrap();

        assert_eq!(result.records, 2);
        let written: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        let mut keys: Vec<&str> = written.iter().filter_map(|v| v["key"].as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_malformed_line_aborts_without_output() {
        let mock = Arc::new(
            MockBatchApi::new("batches/j", vec![])
                .with_results("{\"key\":\"a\"}\n{\"key\": oops}\n{\"key\":\"c\"}\n"),
        );
        let job = succeeded_job();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");

        let err = ResultMaterializer::new(mock)
            .materialize(&job, &out)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Result(ResultError::LineParseFailed { line: 2, .. })
        ));
        assert!(!out.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_pretty_output_keeps_non_ascii() {
        let mock = Arc::new(
            MockBatchApi::new("batches/j", vec![])
                .with_results("{\"key\":\"u1\",\"response\":[{\"name\":\"Zoë Müller\"}]}\n"),
        );
        let job = succeeded_job();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");

        ResultMaterializer::new(mock)
            .materialize(&job, &out)
            .await
            .unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("Zoë Müller"));
        assert!(text.starts_with("[\n    {"));
    }

    #[tokio::test]
    async fn test_non_success_states_are_job_errors() {
        let mock = Arc::new(MockBatchApi::new("batches/j", vec![]));
        let materializer = ResultMaterializer::new(mock.clone());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");

        let mut job = succeeded_job();
        job.state = JobState::Failed;
        job.error = Some("[500] internal".to_string());
        let err = materializer.materialize(&job, &out).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Job(JobError::Failed { ref detail, .. }) if detail == "[500] internal"
        ));

        job.state = JobState::Cancelled;
        assert!(matches!(
            materializer.materialize(&job, &out).await.unwrap_err(),
            AppError::Job(JobError::Cancelled { .. })
        ));

        job.state = JobState::Running;
        assert!(matches!(
            materializer.materialize(&job, &out).await.unwrap_err(),
            AppError::Job(JobError::NotFinished { .. })
        ));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_result_file_reference() {
        let mock = Arc::new(MockBatchApi::new("batches/j", vec![]));
        let mut job = succeeded_job();
        job.result_file = None;
        let dir = tempfile::tempdir().unwrap();

        let err = ResultMaterializer::new(mock)
            .materialize(&job, &dir.path().join("out.json"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Result(ResultError::MissingResultFile { .. })
        ));
    }

    #[test]
    fn test_tmp_path_is_sibling() {
        let tmp = tmp_path(Path::new("data/quotes.json"));
        assert_eq!(tmp, Path::new("data/quotes.json.tmp"));
    }
}
