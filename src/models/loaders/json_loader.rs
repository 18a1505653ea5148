use std::path::Path;

use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, FileError, RecordError};
use crate::models::prompt::DEFAULT_PROMPT;
use crate::models::quote::quote_list_schema;

async fn read_existing(path: &Path) -> AppResult<String> {
    if !path.exists() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))
}

/// 从 JSON 文件加载文章数组
///
/// 只检查顶层是数组，单条记录的字段在构造请求时校验。
pub async fn load_articles(path: &Path) -> AppResult<Vec<Value>> {
    let content = read_existing(path).await?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    match value {
        Value::Array(records) => {
            debug!("从 {} 加载了 {} 条记录", path.display(), records.len());
            Ok(records)
        }
        _ => Err(RecordError::NotAnArray {
            path: path.display().to_string(),
        }
        .into()),
    }
}

/// 加载提示词
///
/// 文件不存在时回退到内置提示词；存在但读取失败则报错。
pub async fn load_prompt(path: Option<&Path>) -> AppResult<String> {
    match path {
        Some(path) if path.exists() => {
            let prompt = fs::read_to_string(path)
                .await
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            debug!("使用自定义提示词: {} ({} 字符)", path.display(), prompt.len());
            Ok(prompt)
        }
        Some(path) => {
            warn!("⚠️ 提示词文件 {} 不存在，使用内置提示词", path.display());
            Ok(DEFAULT_PROMPT.to_string())
        }
        None => Ok(DEFAULT_PROMPT.to_string()),
    }
}

/// 加载响应 Schema
///
/// 未指定文件时使用内置的引语列表 Schema；指定了则文件必须存在且为合法 JSON。
pub async fn load_schema(path: Option<&Path>) -> AppResult<Value> {
    match path {
        Some(path) => {
            let content = read_existing(path).await?;
            serde_json::from_str(&content)
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))
        }
        None => Ok(quote_list_schema()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_load_articles_requires_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"uri": "u1", "body": "b"}}"#).unwrap();
        let err = load_articles(file.path()).await.unwrap_err();
        assert!(matches!(err, AppError::Record(RecordError::NotAnArray { .. })));
    }

    #[tokio::test]
    async fn test_load_articles_reads_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"uri": "u1", "body": "b"}}, {{"uri": "u2", "body": "c"}}]"#).unwrap();
        let records = assert_ok!(load_articles(file.path()).await);
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_input_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_articles(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_prompt_falls_back_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = load_prompt(Some(&dir.path().join("quote_prompt.txt")))
            .await
            .unwrap();
        assert_eq!(prompt, DEFAULT_PROMPT);
    }

    #[tokio::test]
    async fn test_prompt_file_is_used_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Find quotes:\n").unwrap();
        let prompt = load_prompt(Some(file.path())).await.unwrap();
        assert_eq!(prompt, "Find quotes:\n");
    }

    #[tokio::test]
    async fn test_custom_schema_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"type": "array", "items": {{"type": "string"}}}}"#).unwrap();
        let schema = load_schema(Some(file.path())).await.unwrap();
        assert_eq!(schema["items"]["type"], "string");

        let default = load_schema(None).await.unwrap();
        assert_eq!(default, quote_list_schema());
    }
}
