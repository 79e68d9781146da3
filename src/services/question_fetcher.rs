//! 题目分页拉取 - 业务能力层

use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::ULearningClient;
use crate::error::ExportResult;
use crate::infrastructure::SerialPacer;
use crate::models::{RawQuestion, SessionHandle};
use crate::workflow::progress::{ExportProgress, ProgressSink};

/// 拉取结果
#[derive(Debug, Clone)]
pub struct QuestionListing {
    /// 按页顺序排列的题目
    pub questions: Vec<RawQuestion>,
    /// 分页时使用的总数
    pub total: usize,
}

/// 题目列表拉取能力
///
/// 按页码 1, 2, … 串行请求，直到拉满 `ceil(total / page_size)` 页；
/// 每页响应返回后等待固定时长。任何一页失败都会中止。
#[derive(Debug, Clone)]
pub struct QuestionListFetcher {
    page_size: usize,
    page_delay: Duration,
}

impl QuestionListFetcher {
    pub fn new(page_size: usize, page_delay: Duration) -> Self {
        if page_size == 0 {
            warn!("⚠️ page_size 为 0，改为每页 1 道");
        }
        Self {
            page_size: page_size.max(1),
            page_delay,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 拉取全部题目
    ///
    /// `known_total` 来自答题卡；缺失时用第一页返回的 total，
    /// 再缺失则退回 `fallback_total`（答题卡条目数）。
    pub async fn fetch_all(
        &self,
        client: &ULearningClient,
        session: &SessionHandle,
        known_total: Option<usize>,
        fallback_total: usize,
        sink: &dyn ProgressSink,
    ) -> ExportResult<QuestionListing> {
        let page_size = self.page_size;
        let mut pacer = SerialPacer::new(self.page_delay);

        // 总数未知时先取第一页，后面不再重复请求
        let first_page = match known_total {
            Some(_) => None,
            None => Some(
                pacer
                    .run(|| client.question_list(session, 1, page_size))
                    .await?,
            ),
        };

        let total = known_total
            .or_else(|| {
                first_page
                    .as_ref()
                    .and_then(|p| p.total)
                    .map(|t| t as usize)
            })
            .unwrap_or(fallback_total);
        let total_pages = total.div_ceil(page_size);
        debug!(
            "题目总数 {}，每页 {}，共 {} 页",
            total, page_size, total_pages
        );

        let mut questions = Vec::with_capacity(total);
        let mut next_page = 1;

        if let Some(first) = first_page {
            questions.extend(first.training_questions);
            sink.emit(ExportProgress::PageFetched {
                page: 1,
                total_pages,
                fetched: questions.len(),
            });
            next_page = 2;
        }

        for page in next_page..=total_pages {
            let payload = pacer
                .run(|| client.question_list(session, page, page_size))
                .await?;
            if payload.training_questions.is_empty() {
                warn!("⚠️ 第 {} 页没有返回题目", page);
            }
            questions.extend(payload.training_questions);
            sink.emit(ExportProgress::PageFetched {
                page,
                total_pages,
                fetched: questions.len(),
            });
        }

        Ok(QuestionListing { questions, total })
    }
}
