//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责流程调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! pipeline::App (prep / submit / poll / cancel)
//!     ↓
//! services (能力层：构造 / 写文件 / 提交 / 轮询 / 落盘 / 取消)
//!     ↓
//! clients (远程批处理 API：Gemini / Mock)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → services → clients
//! 2. **无业务逻辑**：只做调度、日志与退出码映射
//! 3. **任务名即状态**：submit 与 poll 之间除任务名外不保存任何本地状态

pub mod pipeline;

// 重新导出主要类型
pub use pipeline::{
    exit_code_for, App, Outcome, PrepOptions, SubmitOptions, EXIT_ERROR, EXIT_JOB_FAILED,
};
