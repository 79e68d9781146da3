//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (配置 → 会话 → 导出 → 写文件)
//!     ↓
//! workflow::ExportFlow (一次导出的完整流程)
//!     ↓
//! services (能力层：答题卡 / 题目列表 / 探测 / 判定 / 编码 / 写文件)
//!     ↓
//! clients + infrastructure (HTTP 客户端、串行节流)
//! ```
//!
//! 编排层只做调度和统计，不做具体业务判断。

pub mod export_app;

pub use export_app::{App, ExportReport, ExportedFiles};
