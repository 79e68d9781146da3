use serde::{Deserialize, Serialize};

use super::question::QuestionKind;

/// 导出格式中的一道题（唯一对外产物）
///
/// 字段名固定为中文，`题型` 作为标签字段写在最前面。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "题型")]
pub enum CanonicalQuestionRecord {
    #[serde(rename = "选择题")]
    Choice {
        #[serde(rename = "题干")]
        stem: String,
        #[serde(rename = "选项")]
        options: Vec<String>,
        #[serde(rename = "答案")]
        answer: String,
        #[serde(rename = "解析")]
        explanation: String,
    },
    #[serde(rename = "判断题")]
    TrueFalse {
        #[serde(rename = "题干")]
        stem: String,
        #[serde(rename = "答案")]
        answer: String,
        #[serde(rename = "解析")]
        explanation: String,
    },
    #[serde(rename = "填空题")]
    FillBlank {
        #[serde(rename = "题干")]
        stem: String,
        #[serde(rename = "解析")]
        explanation: String,
    },
    #[serde(rename = "问答题")]
    Essay {
        #[serde(rename = "题干")]
        stem: String,
        #[serde(rename = "答案")]
        answer: String,
        #[serde(rename = "解析")]
        explanation: String,
    },
}

impl CanonicalQuestionRecord {
    pub fn kind(&self) -> QuestionKind {
        match self {
            CanonicalQuestionRecord::Choice { .. } => QuestionKind::Choice,
            CanonicalQuestionRecord::TrueFalse { .. } => QuestionKind::TrueFalse,
            CanonicalQuestionRecord::FillBlank { .. } => QuestionKind::FillBlank,
            CanonicalQuestionRecord::Essay { .. } => QuestionKind::Essay,
        }
    }

    pub fn stem(&self) -> &str {
        match self {
            CanonicalQuestionRecord::Choice { stem, .. }
            | CanonicalQuestionRecord::TrueFalse { stem, .. }
            | CanonicalQuestionRecord::FillBlank { stem, .. }
            | CanonicalQuestionRecord::Essay { stem, .. } => stem,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            CanonicalQuestionRecord::Choice { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            CanonicalQuestionRecord::Choice { answer, .. }
            | CanonicalQuestionRecord::TrueFalse { answer, .. }
            | CanonicalQuestionRecord::Essay { answer, .. } => Some(answer),
            CanonicalQuestionRecord::FillBlank { .. } => None,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            CanonicalQuestionRecord::Choice { explanation, .. }
            | CanonicalQuestionRecord::TrueFalse { explanation, .. }
            | CanonicalQuestionRecord::FillBlank { explanation, .. }
            | CanonicalQuestionRecord::Essay { explanation, .. } => explanation,
        }
    }
}
