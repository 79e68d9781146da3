//! 标准答案探测 - 业务能力层
//!
//! 按答题卡顺序逐题提交一个占位答案，从判分结果里读出 `correctAnswer`。
//! 服务端按 index 记录作答进度，所以提交必须严格按 sheet_index 递增、一次一题。

use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::clients::{SubmitAnswerBody, SubmitVerdict, ULearningClient};
use crate::error::ExportResult;
use crate::infrastructure::SerialPacer;
use crate::models::{AnswerSheet, QuestionKind, RawQuestion, SessionHandle, SourceType};
use crate::workflow::progress::{ExportProgress, ProgressSink};

/// 每提交这么多题打印一次汇总
const SUMMARY_EVERY: usize = 20;

/// questionId → 标准答案
pub type CorrectAnswerMap = HashMap<u64, Vec<String>>;

/// 探测结果
#[derive(Debug, Default, Clone)]
pub struct ProbeReport {
    pub answers: CorrectAnswerMap,
    /// 占位答案恰好答对的题数
    pub lucky_hits: usize,
}

/// 标准答案探测能力
#[derive(Debug, Clone)]
pub struct CorrectAnswerProbe {
    delay: Duration,
    limit: Option<usize>,
}

impl CorrectAnswerProbe {
    pub fn new(delay: Duration, limit: Option<usize>) -> Self {
        Self { delay, limit }
    }

    /// 按答题卡顺序探测
    ///
    /// `questions` 只用来挑选占位答案；答题卡里有、列表里没有的题目
    /// 退回答题卡记录的题型。
    pub async fn probe(
        &self,
        client: &ULearningClient,
        session: &SessionHandle,
        sheet: &AnswerSheet,
        questions: &[RawQuestion],
        sink: &dyn ProgressSink,
    ) -> ExportResult<ProbeReport> {
        let types: HashMap<u64, &SourceType> =
            questions.iter().map(|q| (q.id, &q.source_type)).collect();

        let total = match self.limit {
            Some(limit) => limit.min(sheet.len()),
            None => sheet.len(),
        };
        if total < sheet.len() {
            info!(
                "探测数量限制为 {}，其余 {} 题使用答题卡记录",
                total,
                sheet.len() - total
            );
        }

        let mut pacer = SerialPacer::new(self.delay);
        let mut report = ProbeReport::default();

        // entries() 已按 sheet_index 递增排列
        for entry in sheet.entries().iter().take(total) {
            let source_type = types
                .get(&entry.question_id)
                .copied()
                .unwrap_or(&entry.legacy_type);
            let body = SubmitAnswerBody {
                training_id: session.training_id,
                training_type: session.training_type,
                index: entry.sheet_index,
                relation_id: entry.question_id,
                answer: placeholder_answer(source_type.base_kind()),
            };

            let outcome = pacer
                .run(|| client.submit_answer(session, &body))
                .await?;

            if outcome.verdict == SubmitVerdict::Correct {
                report.lucky_hits += 1;
            }
            debug!(
                "题目 {} (index={}) 标准答案: {:?}",
                entry.question_id, entry.sheet_index, outcome.correct_answer
            );
            report
                .answers
                .insert(entry.question_id, outcome.correct_answer);

            let done = pacer.steps();
            sink.emit(ExportProgress::ProbeSubmitted {
                done,
                total,
                index: entry.sheet_index,
                question_id: entry.question_id,
            });
            if done % SUMMARY_EVERY == 0 {
                info!("📊 已获取标准答案: {}/{}", done, total);
            }
        }

        info!("✓ 共获取 {} 道题的标准答案", report.answers.len());
        Ok(report)
    }
}

/// 占位答案：选择/判断（及无法判定的题型）用 "A"，填空/问答用空串
pub fn placeholder_answer(kind: Option<QuestionKind>) -> Vec<String> {
    match kind {
        Some(QuestionKind::FillBlank) | Some(QuestionKind::Essay) => vec![String::new()],
        Some(QuestionKind::Choice) | Some(QuestionKind::TrueFalse) | None => vec!["A".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_answer() {
        assert_eq!(placeholder_answer(Some(QuestionKind::Choice)), vec!["A"]);
        assert_eq!(placeholder_answer(Some(QuestionKind::TrueFalse)), vec!["A"]);
        assert_eq!(placeholder_answer(Some(QuestionKind::FillBlank)), vec![""]);
        assert_eq!(placeholder_answer(Some(QuestionKind::Essay)), vec![""]);
        assert_eq!(placeholder_answer(None), vec!["A"]);
    }
}
