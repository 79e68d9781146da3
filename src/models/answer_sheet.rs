use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use super::question::{AnswerToken, SourceType};
use super::{deserialize_id, null_as_default};
use crate::error::FetchError;

/// 答题卡接口 `result` 字段
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerSheetPayload {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<AnswerSheetItem>,
}

/// 答题卡中的一项（接口原始结构）
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerSheetItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: Vec<AnswerToken>,
    #[serde(default)]
    pub correct: Option<JsonValue>,
    #[serde(rename = "questionType", default)]
    pub question_type: SourceType,
}

/// 答题卡条目
///
/// `sheet_index` 是服务端认定的提交顺序，从 0 开始连续编号。
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSheetEntry {
    pub question_id: u64,
    pub sheet_index: usize,
    pub legacy_answer: Vec<AnswerToken>,
    pub legacy_correct: Option<JsonValue>,
    pub legacy_type: SourceType,
}

/// 答题卡：按 sheet_index 排好序的条目 + 题目总数
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    /// 接口给出的总题数（可能缺失）
    pub total: Option<usize>,
    entries: Vec<AnswerSheetEntry>,
    /// question_id → entries 下标
    index: HashMap<u64, usize>,
}

impl AnswerSheet {
    /// 从接口结构构建，按列表位置分配 sheet_index
    pub fn from_payload(payload: AnswerSheetPayload) -> Result<Self, FetchError> {
        let mut index = HashMap::with_capacity(payload.list.len());
        let mut entries = Vec::with_capacity(payload.list.len());

        for (sheet_index, item) in payload.list.into_iter().enumerate() {
            if index.insert(item.id, sheet_index).is_some() {
                return Err(FetchError::DuplicateSheetEntry { id: item.id });
            }
            entries.push(AnswerSheetEntry {
                question_id: item.id,
                sheet_index,
                legacy_answer: item.answer,
                legacy_correct: item.correct,
                legacy_type: item.question_type,
            });
        }

        Ok(Self {
            total: payload.total.map(|t| t as usize),
            entries,
            index,
        })
    }

    /// 按 sheet_index 递增顺序返回条目
    pub fn entries(&self) -> &[AnswerSheetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, question_id: u64) -> Option<&AnswerSheetEntry> {
        self.index.get(&question_id).and_then(|&i| self.entries.get(i))
    }
}
