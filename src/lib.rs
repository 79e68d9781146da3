//! # ULearning Export
//!
//! 把优学院练习（questionTraining）导出为通用题库 JSON 的 Rust 工具
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `clients/` - 优学院 API 客户端，负责请求、鉴权头和返回信封判定
//! - `infrastructure/` - `SerialPacer`，"一次一步、每步后固定等待"的串行节流器
//!
//! ### ② 业务能力层（Services）
//! - `AnswerSheetReader` - 读取答题卡（提交顺序 + 历史作答）
//! - `QuestionListFetcher` - 分页拉取题目
//! - `CorrectAnswerProbe` - 按答题卡顺序探测标准答案
//! - `classifier` / `record_encoder` / `sanitizer` - 题型判定、编码、HTML 清洗
//! - `Exporter` - 写出 JSON / 原始数据 / 文本
//!
//! ### ③ 流程层（Workflow）
//! - `ExportFlow` - 答题卡 → 题目列表 → 对账 → 探测 → 挂答案 → 编码
//! - `ProgressSink` - 进度以事件数据的形式输出
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator::App` - 配置 → 会话 → 导出 → 写文件 → 统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::ULearningClient;
pub use config::Config;
pub use error::{ExportError, ExportResult};
pub use models::{CanonicalQuestionRecord, QuestionKind, RawQuestion, SessionHandle};
pub use orchestrator::{App, ExportReport};
pub use workflow::{ExportFlow, ExportOutcome, ExportProgress, ProgressSink};
