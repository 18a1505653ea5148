use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError};

/// 默认读取 API 密钥的环境变量
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// 默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "quote_batch.toml";
/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "QUOTE_BATCH_CONFIG";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// API 密钥（空字符串表示尚未加载）
    pub api_key: String,
    /// 存放 API 密钥的环境变量名
    pub api_key_env: String,
    /// Gemini REST API 基础地址
    pub api_base_url: String,
    /// 文件上传/下载的基础地址
    pub upload_base_url: String,
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 单个 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 默认模型
    pub default_model: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            upload_base_url: "https://generativelanguage.googleapis.com".to_string(),
            poll_interval_secs: 30,
            request_timeout_secs: 300,
            default_model: "gemini-2.5-flash".to_string(),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件中允许出现的字段，全部可选
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_key_env: Option<String>,
    api_base_url: Option<String>,
    upload_base_url: Option<String>,
    poll_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    default_model: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载配置
    ///
    /// 不会读取 API 密钥，需要网络的流程再调用 [`Config::require_api_key`]。
    pub fn load() -> AppResult<Self> {
        let path = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            debug!("读取配置文件: {}", path);
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        base.merge_env()
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().merge_env()
    }

    /// 从 TOML 文件加载，未出现的字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?;
        Self::from_toml_str(&content, path)
    }

    fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        let file: FileConfig =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.to_string(),
                source,
            })?;
        let default = Self::default();
        Self {
            api_key: default.api_key,
            api_key_env: file.api_key_env.unwrap_or(default.api_key_env),
            api_base_url: file.api_base_url.unwrap_or(default.api_base_url),
            upload_base_url: file.upload_base_url.unwrap_or(default.upload_base_url),
            poll_interval_secs: file.poll_interval_secs.unwrap_or(default.poll_interval_secs),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(default.request_timeout_secs),
            default_model: file.default_model.unwrap_or(default.default_model),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        }
        .validate()
    }

    fn merge_env(self) -> AppResult<Self> {
        Self {
            api_key: self.api_key,
            api_key_env: self.api_key_env,
            api_base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(self.api_base_url),
            upload_base_url: std::env::var("GEMINI_UPLOAD_BASE_URL")
                .unwrap_or(self.upload_base_url),
            poll_interval_secs: parse_env("POLL_INTERVAL_SECS", "u64")?
                .unwrap_or(self.poll_interval_secs),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            default_model: std::env::var("GEMINI_MODEL").unwrap_or(self.default_model),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
        }
        .validate()
    }

    /// 轮询间隔至少 1 秒
    fn validate(self) -> AppResult<Self> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs",
                value: self.poll_interval_secs.to_string(),
                reason: "轮询间隔必须至少 1 秒",
            }
            .into());
        }
        Ok(self)
    }

    /// 覆盖存放密钥的环境变量名（命令行 `--api-key-env`）
    pub fn with_api_key_env(mut self, var_name: impl Into<String>) -> Self {
        self.api_key_env = var_name.into();
        self
    }

    /// 读取 API 密钥，缺失时立即失败
    pub fn require_api_key(mut self) -> AppResult<Self> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                self.api_key = key.trim().to_string();
                Ok(self)
            }
            _ => Err(ConfigError::MissingApiKey {
                var_name: self.api_key_env.clone(),
            }
            .into()),
        }
    }
}

fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_batch_api() {
        let config = Config::default();
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.default_model, "gemini-2.5-flash");
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_toml_overrides_only_given_fields() {
        let config = Config::from_toml_str(
            "poll_interval_secs = 5\ndefault_model = \"gemini-2.5-pro\"\n",
            "inline.toml",
        )
        .unwrap();
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.default_model, "gemini-2.5-pro");
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn test_toml_unknown_field_is_config_error() {
        let err = Config::from_toml_str("pol_interval = 5\n", "bad.toml").unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::TomlParseFailed { .. })
        ));
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let err = Config::from_toml_str("poll_interval_secs = 0\n", "zero.toml").unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidValue {
                field: "poll_interval_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let config = Config::default().with_api_key_env("QUOTE_BATCH_TEST_KEY_THAT_IS_NEVER_SET");
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::MissingApiKey { ref var_name })
                if var_name == "QUOTE_BATCH_TEST_KEY_THAT_IS_NEVER_SET"
        ));
    }
}
