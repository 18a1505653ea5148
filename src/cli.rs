//! 命令行参数定义
//!
//! 四个子命令分别对应编排层的四个流程，参数在这里转换为
//! [`PrepOptions`] / [`SubmitOptions`]，编排层本身不依赖 clap。

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::models::JobHandle;
use crate::orchestrator::{PrepOptions, SubmitOptions};

#[derive(Parser, Debug)]
#[command(
    name = "quote_batch",
    version,
    about = "通过 Gemini 批处理 API 从新闻文章中批量抽取引语",
    after_help = r#"
示例:
  quote_batch prep data/articles.json data/upload.jsonl
  quote_batch submit data/articles.json data/quotes.json --dry-run
  quote_batch submit data/articles.json data/quotes.json --model gemini-2.5-pro
  quote_batch poll --job-id batches/abc123 --output data/quotes.json
  quote_batch cancel --job-id abc123
"#
)]
pub struct Cli {
    /// 显示详细日志（debug 级别）
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 只构造请求并写出批处理文件，不访问网络
    Prep(PrepArgs),
    /// 构造、上传、创建任务，轮询到结束后下载结果
    Submit(SubmitArgs),
    /// 重新连接已有任务，轮询到结束后下载结果
    Poll(PollArgs),
    /// 取消已有任务
    Cancel(CancelArgs),
}

impl Command {
    /// 子命令名称，用于启动日志
    pub fn mode(&self) -> &'static str {
        match self {
            Command::Prep(_) => "prep",
            Command::Submit(_) => "submit",
            Command::Poll(_) => "poll",
            Command::Cancel(_) => "cancel",
        }
    }

    /// 是否需要 API 密钥
    pub fn needs_api(&self) -> bool {
        match self {
            Command::Prep(_) => false,
            Command::Submit(args) => !args.dry_run,
            Command::Poll(_) | Command::Cancel(_) => true,
        }
    }

    /// 命令行指定的密钥环境变量名
    pub fn api_key_env(&self) -> Option<&str> {
        match self {
            Command::Prep(_) => None,
            Command::Submit(args) => args.api_key_env.as_deref(),
            Command::Poll(args) => args.api_key_env.as_deref(),
            Command::Cancel(args) => args.api_key_env.as_deref(),
        }
    }

    /// 命令行参数覆盖配置，未给出的参数保留配置中的值
    pub fn apply_to(&self, config: Config) -> Config {
        match self.api_key_env() {
            Some(var_name) => config.with_api_key_env(var_name),
            None => config,
        }
    }
}

#[derive(Args, Debug)]
pub struct PrepArgs {
    /// 文章 JSON 数组文件
    pub input: PathBuf,
    /// 输出的批处理文件（JSONL）
    pub output: PathBuf,
    /// 提示词文件，不存在时使用内置提示词
    #[arg(long)]
    pub prompt: Option<PathBuf>,
    /// 自定义响应 Schema（JSON 文件）
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// 文章 JSON 数组文件
    pub input: PathBuf,
    /// 结果输出文件
    pub output: PathBuf,
    /// 本地批处理文件路径
    #[arg(long, default_value = "data/upload.jsonl")]
    pub upload_file: PathBuf,
    /// 上传文件的显示名称
    #[arg(long, default_value = "quote-extraction-requests")]
    pub file_upload_name: String,
    /// 批处理任务的显示名称
    #[arg(long, default_value = "quote-extraction-job")]
    pub batch_job_name: String,
    /// 提示词文件，不存在时使用内置提示词
    #[arg(long, default_value = "quote_prompt.txt")]
    pub prompt: PathBuf,
    /// 自定义响应 Schema（JSON 文件）
    #[arg(long)]
    pub schema: Option<PathBuf>,
    /// 使用的模型，默认取配置中的 default_model
    #[arg(long)]
    pub model: Option<String>,
    /// 只写出批处理文件，不上传
    #[arg(long)]
    pub dry_run: bool,
    /// 存放 API 密钥的环境变量名，未指定时使用配置（默认 GEMINI_API_KEY）
    #[arg(long)]
    pub api_key_env: Option<String>,
}

#[derive(Args, Debug)]
pub struct PollArgs {
    /// 任务名，`abc123` 或 `batches/abc123`
    #[arg(long)]
    pub job_id: JobHandle,
    /// 结果输出文件
    #[arg(long, default_value = "data/quotes_extracted.jsonl")]
    pub output: PathBuf,
    #[arg(long)]
    pub api_key_env: Option<String>,
}

#[derive(Args, Debug)]
pub struct CancelArgs {
    /// 任务名，`abc123` 或 `batches/abc123`
    #[arg(long)]
    pub job_id: JobHandle,
    #[arg(long)]
    pub api_key_env: Option<String>,
}

impl From<&PrepArgs> for PrepOptions {
    fn from(args: &PrepArgs) -> Self {
        PrepOptions {
            input: args.input.clone(),
            output: args.output.clone(),
            prompt: args.prompt.clone(),
            schema: args.schema.clone(),
        }
    }
}

impl From<&SubmitArgs> for SubmitOptions {
    fn from(args: &SubmitArgs) -> Self {
        SubmitOptions {
            input: args.input.clone(),
            output: args.output.clone(),
            upload_file: args.upload_file.clone(),
            file_display_name: args.file_upload_name.clone(),
            job_display_name: args.batch_job_name.clone(),
            prompt: Some(args.prompt.clone()),
            schema: args.schema.clone(),
            model: args.model.clone(),
            dry_run: args.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_defaults() {
        let cli = Cli::try_parse_from(["quote_batch", "submit", "in.json", "out.json"]).unwrap();
        let Command::Submit(args) = &cli.command else {
            panic!("应解析为 submit");
        };
        assert_eq!(args.upload_file, PathBuf::from("data/upload.jsonl"));
        assert_eq!(args.file_upload_name, "quote-extraction-requests");
        assert_eq!(args.batch_job_name, "quote-extraction-job");
        assert_eq!(args.prompt, PathBuf::from("quote_prompt.txt"));
        assert!(args.api_key_env.is_none());
        assert!(args.model.is_none());
        assert!(!args.dry_run);
        assert!(cli.command.needs_api());
    }

    #[test]
    fn test_dry_run_and_prep_need_no_key() {
        let cli = Cli::try_parse_from(["quote_batch", "submit", "a", "b", "--dry-run"]).unwrap();
        assert!(!cli.command.needs_api());

        let cli = Cli::try_parse_from(["quote_batch", "prep", "a", "b", "--schema", "s.json"]).unwrap();
        assert!(!cli.command.needs_api());
        assert_eq!(cli.command.mode(), "prep");
    }

    #[test]
    fn test_poll_normalises_job_id() {
        let cli = Cli::try_parse_from(["quote_batch", "-v", "poll", "--job-id", "abc123"]).unwrap();
        assert!(cli.verbose);
        let Command::Poll(args) = &cli.command else {
            panic!("应解析为 poll");
        };
        assert_eq!(args.job_id.name(), "batches/abc123");
        assert_eq!(args.output, PathBuf::from("data/quotes_extracted.jsonl"));
    }

    #[test]
    fn test_config_file_key_env_survives_when_flag_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote_batch.toml");
        std::fs::write(&path, "api_key_env = \"MY_GEMINI_KEY\"\n").unwrap();
        let config = Config::from_toml_file(path.to_str().unwrap()).unwrap();

        let cli = Cli::try_parse_from(["quote_batch", "poll", "--job-id", "abc"]).unwrap();
        assert_eq!(cli.command.apply_to(config.clone()).api_key_env, "MY_GEMINI_KEY");

        let cli = Cli::try_parse_from([
            "quote_batch",
            "cancel",
            "--job-id",
            "abc",
            "--api-key-env",
            "OTHER_KEY",
        ])
        .unwrap();
        assert_eq!(cli.command.apply_to(config).api_key_env, "OTHER_KEY");
    }

    #[test]
    fn test_cancel_requires_job_id() {
        assert!(Cli::try_parse_from(["quote_batch", "cancel"]).is_err());
        assert!(Cli::try_parse_from(["quote_batch", "cancel", "--job-id", " "]).is_err());
    }
}
