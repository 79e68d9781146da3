//! 答题卡读取 - 业务能力层

use tracing::{debug, info};

use crate::clients::ULearningClient;
use crate::error::ExportResult;
use crate::models::{AnswerSheet, SessionHandle};

/// 答题卡读取能力
///
/// 答题卡的顺序就是服务端认可的提交顺序，探测提交必须按它来。
#[derive(Debug, Default, Clone, Copy)]
pub struct AnswerSheetReader;

impl AnswerSheetReader {
    pub fn new() -> Self {
        Self
    }

    pub async fn read(
        &self,
        client: &ULearningClient,
        session: &SessionHandle,
    ) -> ExportResult<AnswerSheet> {
        let payload = client.answer_sheet(session).await?;
        let sheet = AnswerSheet::from_payload(payload)?;

        info!(
            "✓ 答题卡: {} 项 (total={:?})",
            sheet.len(),
            sheet.total
        );
        let recorded = sheet
            .entries()
            .iter()
            .filter(|e| !e.legacy_answer.is_empty())
            .count();
        debug!("答题卡中已有作答记录 {} 项", recorded);

        Ok(sheet)
    }
}
