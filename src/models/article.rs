use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// 输入文章记录
///
/// 只关心 `uri` 与 `body`，其余字段原样保留但不参与处理。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub uri: String,
    pub body: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArticleRecord {
    pub fn new(uri: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            body: body.into(),
            extra: Map::new(),
        }
    }

    /// 从输入数组中的一个 JSON 值校验并构造记录
    ///
    /// `uri` 必须是非空字符串，`body` 必须是字符串（可以为空）。
    ///
    /// # 参数
    /// - `index`: 记录在输入数组中的位置（从 0 开始，仅用于报错）
    /// - `value`: 原始 JSON 值
    pub fn from_value(index: usize, value: &Value) -> AppResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| AppError::missing_field(index, "uri"))?;

        let uri = match obj.get("uri").and_then(Value::as_str) {
            Some(uri) if !uri.is_empty() => uri.to_string(),
            _ => return Err(AppError::missing_field(index, "uri")),
        };
        let body = obj
            .get("body")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::missing_field(index, "body"))?
            .to_string();

        let extra = obj
            .iter()
            .filter(|(k, _)| k.as_str() != "uri" && k.as_str() != "body")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self { uri, body, extra })
    }
}
