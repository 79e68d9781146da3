//! 进度事件
//!
//! 流程只产出事件数据，如何展示由调用方提供的 sink 决定。

use tracing::{debug, info};

/// 导出阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    /// 读取答题卡
    AnswerSheet,
    /// 分页拉取题目
    QuestionList,
    /// 探测标准答案
    Probe,
    /// 编码导出记录
    Encode,
}

impl ExportPhase {
    pub fn label(self) -> &'static str {
        match self {
            ExportPhase::AnswerSheet => "读取答题卡",
            ExportPhase::QuestionList => "拉取题目",
            ExportPhase::Probe => "探测答案",
            ExportPhase::Encode => "编码记录",
        }
    }
}

/// 进度事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportProgress {
    PhaseStarted(ExportPhase),
    PhaseFinished { phase: ExportPhase, count: usize },
    /// 一页题目拉取完成
    PageFetched {
        page: usize,
        total_pages: usize,
        fetched: usize,
    },
    /// 一次探测提交完成
    ProbeSubmitted {
        done: usize,
        total: usize,
        index: usize,
        question_id: u64,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ExportProgress);
}

/// 把进度事件写成日志
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&self, event: ExportProgress) {
        match event {
            ExportProgress::PhaseStarted(phase) => info!("▶ {}...", phase.label()),
            ExportProgress::PhaseFinished { phase, count } => {
                info!("✓ {}完成: {} 项", phase.label(), count)
            }
            ExportProgress::PageFetched {
                page,
                total_pages,
                fetched,
            } => info!("📄 第 {}/{} 页，累计 {} 道题", page, total_pages, fetched),
            ExportProgress::ProbeSubmitted {
                done,
                total,
                index,
                question_id,
            } => debug!(
                "探测 {}/{} (index={}, 题目={})",
                done, total, index, question_id
            ),
        }
    }
}

/// 丢弃所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _event: ExportProgress) {}
}
