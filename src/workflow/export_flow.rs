//! 导出流程 - 流程层
//!
//! 核心职责：定义"一次导出"的完整流程
//!
//! 流程顺序：
//! 1. 读取答题卡（确定总数和提交顺序）
//! 2. 分页拉取题目
//! 3. 按题目 ID 对账
//! 4. 按答题卡顺序探测标准答案（可关闭、可限量）
//! 5. 挂上答案：探测结果 > 答题卡记录 > 无
//! 6. 判定题型并编码

use std::collections::HashSet;
use tracing::{info, warn};

use crate::clients::ULearningClient;
use crate::config::Config;
use crate::error::{ExportResult, FetchError};
use crate::models::{
    AnswerSheet, AnswerSource, CanonicalQuestionRecord, QuestionKind, RawQuestion, SessionHandle,
};
use crate::services::{
    encode_all, AnswerSheetReader, CorrectAnswerMap, CorrectAnswerProbe, QuestionListFetcher,
};
use crate::workflow::progress::{ExportPhase, ExportProgress, ProgressSink};

/// 一次导出的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// 拉取到的题目数
    pub fetched: usize,
    /// 探测提交次数
    pub probed: usize,
    /// 占位答案恰好答对的次数
    pub lucky_hits: usize,
    /// 使用答题卡记录答案的题数
    pub recorded: usize,
    /// 没有任何答案的题数
    pub unresolved: usize,
    pub choice: usize,
    pub true_false: usize,
    pub fill_blank: usize,
    pub essay: usize,
    /// 题型无法判定而丢弃的题数
    pub dropped: usize,
}

impl ExportStats {
    fn count_kinds(&mut self, records: &[CanonicalQuestionRecord]) {
        for record in records {
            match record.kind() {
                QuestionKind::Choice => self.choice += 1,
                QuestionKind::TrueFalse => self.true_false += 1,
                QuestionKind::FillBlank => self.fill_blank += 1,
                QuestionKind::Essay => self.essay += 1,
            }
        }
    }
}

/// 导出结果
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// 按题目列表顺序排列的导出记录
    pub records: Vec<CanonicalQuestionRecord>,
    /// 挂好答案的原始题目
    pub questions: Vec<RawQuestion>,
    pub stats: ExportStats,
}

/// 导出流程
///
/// - 编排答题卡、题目列表、探测、编码的顺序
/// - 不持有 HTTP 客户端，只依赖业务能力（services）
/// - 任一步失败立即返回，不产出部分结果
pub struct ExportFlow {
    reader: AnswerSheetReader,
    fetcher: QuestionListFetcher,
    probe: Option<CorrectAnswerProbe>,
    use_recorded_answers: bool,
}

impl ExportFlow {
    /// 创建新的导出流程
    pub fn new(config: &Config) -> Self {
        let probe = config
            .probe_enabled
            .then(|| CorrectAnswerProbe::new(config.probe_delay(), config.probe_limit));
        Self {
            reader: AnswerSheetReader::new(),
            fetcher: QuestionListFetcher::new(config.page_size, config.page_delay()),
            probe,
            use_recorded_answers: config.use_recorded_answers,
        }
    }

    pub async fn run(
        &self,
        client: &ULearningClient,
        session: &SessionHandle,
        sink: &dyn ProgressSink,
    ) -> ExportResult<ExportOutcome> {
        let mut stats = ExportStats::default();

        // ========== 1. 答题卡 ==========
        sink.emit(ExportProgress::PhaseStarted(ExportPhase::AnswerSheet));
        let sheet = self.reader.read(client, session).await?;
        sink.emit(ExportProgress::PhaseFinished {
            phase: ExportPhase::AnswerSheet,
            count: sheet.len(),
        });

        // ========== 2. 题目列表 ==========
        sink.emit(ExportProgress::PhaseStarted(ExportPhase::QuestionList));
        let listing = self
            .fetcher
            .fetch_all(client, session, sheet.total, sheet.len(), sink)
            .await?;
        let mut questions = reconcile(listing.questions, &sheet, listing.total)?;
        stats.fetched = questions.len();
        sink.emit(ExportProgress::PhaseFinished {
            phase: ExportPhase::QuestionList,
            count: questions.len(),
        });

        // ========== 3. 探测 ==========
        let probed = match &self.probe {
            Some(probe) => {
                sink.emit(ExportProgress::PhaseStarted(ExportPhase::Probe));
                let report = probe
                    .probe(client, session, &sheet, &questions, sink)
                    .await?;
                stats.probed = report.answers.len();
                stats.lucky_hits = report.lucky_hits;
                sink.emit(ExportProgress::PhaseFinished {
                    phase: ExportPhase::Probe,
                    count: report.answers.len(),
                });
                report.answers
            }
            None => {
                info!("⏭ 已关闭探测，只使用答题卡记录的答案");
                CorrectAnswerMap::new()
            }
        };

        // ========== 4. 挂答案 + 编码 ==========
        sink.emit(ExportProgress::PhaseStarted(ExportPhase::Encode));
        attach_answers(
            &mut questions,
            &sheet,
            probed,
            self.use_recorded_answers,
            &mut stats,
        );
        let records = encode_all(&questions);
        stats.dropped = questions.len() - records.len();
        stats.count_kinds(&records);
        if stats.dropped > 0 {
            warn!("⚠️ {} 道题题型无法判定，未导出", stats.dropped);
        }
        sink.emit(ExportProgress::PhaseFinished {
            phase: ExportPhase::Encode,
            count: records.len(),
        });

        Ok(ExportOutcome {
            records,
            questions,
            stats,
        })
    }
}

/// 对账：题目 ID 唯一、数量与总数一致、答题卡里的题目都在列表中
///
/// 保持题目列表原有顺序。
pub fn reconcile(
    questions: Vec<RawQuestion>,
    sheet: &AnswerSheet,
    expected_total: usize,
) -> Result<Vec<RawQuestion>, FetchError> {
    let mut ids = HashSet::with_capacity(questions.len());
    for q in &questions {
        if !ids.insert(q.id) {
            return Err(FetchError::DuplicateQuestion { id: q.id });
        }
    }

    if questions.len() != expected_total {
        return Err(FetchError::CountMismatch {
            expected: expected_total,
            actual: questions.len(),
        });
    }

    if let Some(entry) = sheet
        .entries()
        .iter()
        .find(|e| !ids.contains(&e.question_id))
    {
        return Err(FetchError::MissingQuestion {
            id: entry.question_id,
        });
    }

    let unlisted = questions
        .iter()
        .filter(|q| sheet.get(q.id).is_none())
        .count();
    if unlisted > 0 {
        warn!("⚠️ {} 道题不在答题卡中，无法探测答案", unlisted);
    }

    Ok(questions)
}

/// 给每道题挂上唯一的答案来源
pub fn attach_answers(
    questions: &mut [RawQuestion],
    sheet: &AnswerSheet,
    mut probed: CorrectAnswerMap,
    use_recorded_answers: bool,
    stats: &mut ExportStats,
) {
    for question in questions.iter_mut() {
        let source = if let Some(answer) = probed.remove(&question.id) {
            AnswerSource::Probed(answer)
        } else {
            match sheet.get(question.id) {
                Some(entry) if use_recorded_answers && !entry.legacy_answer.is_empty() => {
                    stats.recorded += 1;
                    AnswerSource::Recorded(entry.legacy_answer.clone())
                }
                _ => {
                    stats.unresolved += 1;
                    AnswerSource::Unresolved
                }
            }
        };
        question.answer = source;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer_sheet::AnswerSheetPayload;
    use crate::models::{AnswerToken, SourceType};
    use serde_json::json;

    fn sheet(ids_and_answers: serde_json::Value) -> AnswerSheet {
        let payload: AnswerSheetPayload =
            serde_json::from_value(json!({ "list": ids_and_answers })).unwrap();
        AnswerSheet::from_payload(payload).unwrap()
    }

    fn listing(ids: &[u64]) -> Vec<RawQuestion> {
        ids.iter()
            .map(|id| RawQuestion::new(*id, SourceType::SingleChoice, format!("题 {}", id)))
            .collect()
    }

    #[test]
    fn test_reconcile_keeps_listing_order() {
        let sheet = sheet(json!([{"id": 3}, {"id": 1}, {"id": 2}]));
        let questions = reconcile(listing(&[1, 2, 3]), &sheet, 3).unwrap();
        let ids: Vec<u64> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_reconcile_rejects_defects() {
        let sheet = sheet(json!([{"id": 1}, {"id": 2}]));

        assert!(matches!(
            reconcile(listing(&[1, 2, 1]), &sheet, 3),
            Err(FetchError::DuplicateQuestion { id: 1 })
        ));
        assert!(matches!(
            reconcile(listing(&[1]), &sheet, 2),
            Err(FetchError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            reconcile(listing(&[1, 5]), &sheet, 2),
            Err(FetchError::MissingQuestion { id: 2 })
        ));
    }

    #[test]
    fn test_attach_prefers_probe_then_recorded() {
        let sheet = sheet(json!([
            {"id": 1, "answer": ["B"]},
            {"id": 2, "answer": ["C"]},
            {"id": 3, "answer": []}
        ]));
        let mut questions = listing(&[1, 2, 3]);
        let probed = CorrectAnswerMap::from([(1, vec!["A".to_string()])]);
        let mut stats = ExportStats::default();

        attach_answers(&mut questions, &sheet, probed, true, &mut stats);

        assert_eq!(questions[0].answer, AnswerSource::Probed(vec!["A".to_string()]));
        assert_eq!(
            questions[1].answer,
            AnswerSource::Recorded(vec![AnswerToken::from("C")])
        );
        assert_eq!(questions[2].answer, AnswerSource::Unresolved);
        assert_eq!((stats.recorded, stats.unresolved), (1, 1));
    }

    #[test]
    fn test_attach_without_recorded_fallback() {
        let sheet = sheet(json!([{"id": 1, "answer": ["B"]}]));
        let mut questions = listing(&[1]);
        let mut stats = ExportStats::default();

        attach_answers(&mut questions, &sheet, CorrectAnswerMap::new(), false, &mut stats);

        assert_eq!(questions[0].answer, AnswerSource::Unresolved);
        assert_eq!(stats.unresolved, 1);
    }
}
