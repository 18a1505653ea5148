//! # Quote Batch
//!
//! 通过 Gemini 批处理 API 从新闻文章中批量抽取引语
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 文章记录、API 请求、引语 Schema、任务状态与任务句柄
//! - `models/loaders` - 从磁盘加载文章、提示词与 Schema
//!
//! ### ② 客户端层（Clients）
//! - `BatchApi` - 远程批处理 API 的抽象边界
//! - `GeminiClient` - 基于 REST 的实现；`MockBatchApi` - 脚本化实现
//!
//! ### ③ 业务能力层（Services）
//! - `RequestBuilder` - 一篇文章 → 一个请求（纯转换）
//! - `BatchWriter` - 写换行分隔 JSON 批处理文件
//! - `JobSubmitter` - 上传文件并创建任务
//! - `JobPoller` - 观察远程状态直到终止
//! - `ResultMaterializer` - 下载并写出结果
//! - `JobCanceller` - 请求取消任务
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator::App` - prep / submit / poll / cancel 四种流程与退出码
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{BatchApi, GeminiClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ArticleRecord, BatchJob, ExtractionRequest, JobHandle, JobState};
pub use orchestrator::{exit_code_for, App, Outcome, PrepOptions, SubmitOptions};
pub use services::{
    BatchWriter, JobCanceller, JobPoller, JobSubmitter, MaterializeResult, RequestBuilder,
    ResultMaterializer,
};
