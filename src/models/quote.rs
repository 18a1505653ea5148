use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 模型需要输出的单条引语
///
/// 本地不构造也不校验，只用于生成发送给模型的 JSON Schema。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub name: String,
    pub organisation: String,
    pub role: String,
    pub nationality: String,
    pub quote: String,
    pub message: String,
}

impl Quote {
    pub const FIELDS: [&'static str; 6] = [
        "name",
        "organisation",
        "role",
        "nationality",
        "quote",
        "message",
    ];
}

/// 引语列表的 JSON Schema（默认的响应约束）
pub fn quote_list_schema() -> Value {
    let properties: serde_json::Map<String, Value> = Quote::FIELDS
        .iter()
        .map(|field| (field.to_string(), json!({"type": "string"})))
        .collect();

    json!({
        "description": "A list of quotes extracted from the article",
        "type": "array",
        "items": {
            "type": "object",
            "properties": properties,
            "required": Quote::FIELDS,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_every_quote_field() {
        let schema = quote_list_schema();
        assert_eq!(schema["type"], "array");
        let required: Vec<&str> = schema["items"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, Quote::FIELDS);
        for field in Quote::FIELDS {
            assert_eq!(schema["items"]["properties"][field]["type"], "string");
        }
    }

    #[test]
    fn test_sample_quote_fits_struct() {
        let raw = json!({
            "name": "Alice", "organisation": "", "role": "",
            "nationality": "", "quote": "Hello.", "message": "Hello."
        });
        let quote: Quote = serde_json::from_value(raw).unwrap();
        assert_eq!(quote.name, "Alice");
    }
}
