//! 请求构造服务 - 业务能力层
//!
//! 只负责"一篇文章 → 一个 API 请求"的纯转换，不做任何 IO

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::models::{
    ArticleRecord, Content, ExtractionRequest, GenerateContentRequest, GenerationConfig, Part,
};
use crate::utils::truncate_text;

/// 响应格式固定为 JSON
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// 请求构造器
///
/// 提示词与 Schema 在构造时传入，之后对所有文章保持不变。
/// 温度固定为 0，保证解码确定性。
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    prompt: String,
    schema: Value,
}

impl RequestBuilder {
    pub fn new(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            schema,
        }
    }

    /// 为一篇文章构造请求
    pub fn build(&self, record: &ArticleRecord) -> ExtractionRequest {
        let text = format!("{}<article>{}</article>", self.prompt, record.body);

        ExtractionRequest {
            key: record.uri.clone(),
            request: GenerateContentRequest {
                contents: vec![Content {
                    role: "user".to_string(),
                    parts: vec![Part { text }],
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE.to_string(),
                response_schema: self.schema.clone(),
                temperature: 0.0,
            },
        }
    }

    /// 校验原始 JSON 记录并构造请求
    ///
    /// # 参数
    /// - `index`: 记录在输入数组中的位置（用于报错）
    /// - `value`: 原始记录
    pub fn build_value(&self, index: usize, value: &Value) -> AppResult<ExtractionRequest> {
        let record = ArticleRecord::from_value(index, value)?;
        debug!(
            "构造请求 #{}: {} | {}",
            index,
            record.uri,
            truncate_text(&record.body, 40)
        );
        Ok(self.build(&record))
    }

    /// 按输入顺序为所有记录构造请求，遇到第一条不合法记录即失败
    pub fn build_all(&self, records: &[Value]) -> AppResult<Vec<ExtractionRequest>> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut requests = Vec::with_capacity(records.len());

        for (index, value) in records.iter().enumerate() {
            let request = self.build_value(index, value)?;
            if !seen.insert(request.key.clone()) {
                warn!("⚠️ 第 {} 条记录的 uri 重复: {}，结果将无法唯一关联", index, request.key);
            }
            requests.push(request);
        }

        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, RecordError};
    use crate::models::quote_list_schema;
    use serde_json::json;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("Extract quotes:\n", quote_list_schema())
    }

    #[test]
    fn test_key_equals_uri_and_body_is_wrapped_verbatim() {
        let body = "Alice said: \"Hello.\"\nBob replied <b>no</b>.";
        let request = builder().build(&ArticleRecord::new("u1", body));

        assert_eq!(request.key, "u1");
        assert_eq!(
            request.text(),
            Some(format!("Extract quotes:\n<article>{}</article>", body).as_str())
        );
        assert_eq!(request.request.contents[0].role, "user");
    }

    #[test]
    fn test_generation_config_is_deterministic_json() {
        let request = builder().build(&ArticleRecord::new("u1", "b"));
        let config = &request.generation_config;
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.response_mime_type, "application/json");
        assert_eq!(config.response_schema, quote_list_schema());
    }

    #[test]
    fn test_serialized_shape() {
        let request = builder().build(&ArticleRecord::new("u1", "b"));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["key"], "u1");
        assert_eq!(
            value["request"]["contents"][0]["parts"][0]["text"],
            "Extract quotes:\n<article>b</article>"
        );
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["temperature"], 0.0);
        assert!(value["generationConfig"]["responseSchema"].is_object());
    }

    #[test]
    fn test_build_all_preserves_order() {
        let records = vec![
            json!({"uri": "b", "body": "2"}),
            json!({"uri": "a", "body": "1"}),
            json!({"uri": "c", "body": "3", "source": "ignored"}),
        ];
        let keys: Vec<String> = builder()
            .build_all(&records)
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_build_all_reports_malformed_record_index() {
        let records = vec![json!({"uri": "a", "body": "1"}), json!({"uri": "b"})];
        let err = builder().build_all(&records).unwrap_err();
        assert!(matches!(
            err,
            AppError::Record(RecordError::MissingField { index: 1, field: "body" })
        ));
    }
}
