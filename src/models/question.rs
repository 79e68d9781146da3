use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

use super::{deserialize_id, null_as_default};

/// 题目的语义题型（导出格式中的四种题型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    /// 选择题（单选 / 多选）
    Choice,
    /// 判断题
    TrueFalse,
    /// 填空题
    FillBlank,
    /// 问答题
    Essay,
}

impl QuestionKind {
    /// 导出格式中的题型名称
    pub fn label(self) -> &'static str {
        match self {
            QuestionKind::Choice => "选择题",
            QuestionKind::TrueFalse => "判断题",
            QuestionKind::FillBlank => "填空题",
            QuestionKind::Essay => "问答题",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 接口返回的原始题型码
///
/// 接口里的 `type` 字段并不可靠：可能是整数、数字字符串、null，
/// 偶尔也会是完全无法识别的值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum SourceType {
    /// 1 - 单选
    SingleChoice,
    /// 2 - 多选
    MultipleChoice,
    /// 3 - 判断
    TrueFalse,
    /// 4 - 填空
    FillBlank,
    /// 5 - 问答
    Essay,
    /// 其他整数码
    Other(i64),
    /// 非整数的脏数据
    Unresolvable(JsonValue),
}

impl Default for SourceType {
    /// 缺省按单选处理（与平台页面的行为一致）
    fn default() -> Self {
        SourceType::SingleChoice
    }
}

impl SourceType {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => SourceType::SingleChoice,
            2 => SourceType::MultipleChoice,
            3 => SourceType::TrueFalse,
            4 => SourceType::FillBlank,
            5 => SourceType::Essay,
            other => SourceType::Other(other),
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            SourceType::SingleChoice => Some(1),
            SourceType::MultipleChoice => Some(2),
            SourceType::TrueFalse => Some(3),
            SourceType::FillBlank => Some(4),
            SourceType::Essay => Some(5),
            SourceType::Other(code) => Some(*code),
            SourceType::Unresolvable(_) => None,
        }
    }

    /// 只看题型码得到的基础题型，未知的整数码归为选择题
    pub fn base_kind(&self) -> Option<QuestionKind> {
        match self {
            SourceType::SingleChoice | SourceType::MultipleChoice | SourceType::Other(_) => {
                Some(QuestionKind::Choice)
            }
            SourceType::TrueFalse => Some(QuestionKind::TrueFalse),
            SourceType::FillBlank => Some(QuestionKind::FillBlank),
            SourceType::Essay => Some(QuestionKind::Essay),
            SourceType::Unresolvable(_) => None,
        }
    }
}

impl From<JsonValue> for SourceType {
    fn from(value: JsonValue) -> Self {
        match &value {
            JsonValue::Null => SourceType::default(),
            JsonValue::Number(n) => match n.as_i64() {
                Some(code) => SourceType::from_code(code),
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 => SourceType::from_code(f as i64),
                    _ => SourceType::Unresolvable(value),
                },
            },
            JsonValue::String(s) => match s.trim().parse::<i64>() {
                Ok(code) => SourceType::from_code(code),
                Err(_) => SourceType::Unresolvable(value),
            },
            _ => SourceType::Unresolvable(value),
        }
    }
}

impl From<SourceType> for JsonValue {
    fn from(source_type: SourceType) -> Self {
        match source_type {
            SourceType::Unresolvable(raw) => raw,
            other => other.code().map(JsonValue::from).unwrap_or(JsonValue::Null),
        }
    }
}

/// 答案中的单个元素（字符串或布尔值，偶尔是数字）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerToken {
    Flag(bool),
    Text(String),
    Other(JsonValue),
}

impl AnswerToken {
    /// 是否表达"对/错"含义：布尔值，或忽略大小写的 "true"/"false"
    pub fn is_boolish(&self) -> bool {
        match self {
            AnswerToken::Flag(_) => true,
            AnswerToken::Text(s) => {
                let s = s.trim().to_lowercase();
                s == "true" || s == "false"
            }
            AnswerToken::Other(_) => false,
        }
    }
}

impl fmt::Display for AnswerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerToken::Flag(b) => write!(f, "{}", b),
            AnswerToken::Text(s) => write!(f, "{}", s),
            AnswerToken::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for AnswerToken {
    fn from(s: &str) -> Self {
        AnswerToken::Text(s.to_string())
    }
}

/// 题目最终采用的答案来源
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnswerSource {
    /// 没有任何答案
    #[default]
    Unresolved,
    /// 答题卡上记录的历史作答
    Recorded(Vec<AnswerToken>),
    /// 探测提交拿到的标准答案
    Probed(Vec<String>),
}

impl AnswerSource {
    pub fn tokens(&self) -> Vec<AnswerToken> {
        match self {
            AnswerSource::Unresolved => Vec::new(),
            AnswerSource::Recorded(tokens) => tokens.clone(),
            AnswerSource::Probed(answers) => answers
                .iter()
                .map(|a| AnswerToken::Text(a.clone()))
                .collect(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnswerSource::Unresolved => "none",
            AnswerSource::Recorded(_) => "recorded",
            AnswerSource::Probed(_) => "probed",
        }
    }
}

/// 选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    #[serde(default)]
    pub title: Option<String>,

    /// 其余字段原样保留，供原始导出使用
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// 题目列表接口返回的原始题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,

    #[serde(rename = "type", default)]
    pub source_type: SourceType,

    /// 题干（可能含 HTML）
    #[serde(default)]
    pub title: Option<String>,

    #[serde(rename = "item", default, deserialize_with = "null_as_default")]
    pub options: Vec<QuestionOption>,

    /// 未建模的字段（解析、分值等），原始导出时原样写回
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,

    /// 导出前挂上的答案，只赋值一次
    #[serde(skip)]
    pub answer: AnswerSource,
}

impl RawQuestion {
    pub fn new(id: u64, source_type: SourceType, title: impl Into<String>) -> Self {
        Self {
            id,
            source_type,
            title: Some(title.into()),
            options: Vec::new(),
            extra: Map::new(),
            answer: AnswerSource::Unresolved,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|t| QuestionOption {
                title: Some(t.into()),
                ..Default::default()
            })
            .collect();
        self
    }

    pub fn with_answer(mut self, answer: AnswerSource) -> Self {
        self.answer = answer;
        self
    }
}

/// 题目列表接口 `result` 字段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionListPayload {
    #[serde(rename = "trainingQuestions", default, deserialize_with = "null_as_default")]
    pub training_questions: Vec<RawQuestion>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_type_from_wire_values() {
        assert_eq!(SourceType::from(json!(2)), SourceType::MultipleChoice);
        assert_eq!(SourceType::from(json!("4")), SourceType::FillBlank);
        assert_eq!(SourceType::from(json!(null)), SourceType::SingleChoice);
        assert_eq!(SourceType::from(json!(9)), SourceType::Other(9));
        assert_eq!(
            SourceType::from(json!("essay")),
            SourceType::Unresolvable(json!("essay"))
        );
    }

    #[test]
    fn test_unknown_code_defaults_to_choice() {
        assert_eq!(SourceType::Other(7).base_kind(), Some(QuestionKind::Choice));
        assert_eq!(SourceType::Unresolvable(json!({})).base_kind(), None);
    }

    #[test]
    fn test_raw_question_tolerates_loose_payload() {
        let q: RawQuestion = serde_json::from_value(json!({
            "id": "42",
            "title": "<p>题干</p>",
            "item": null
        }))
        .unwrap();

        assert_eq!(q.id, 42);
        assert_eq!(q.source_type, SourceType::SingleChoice);
        assert!(q.options.is_empty());
        assert_eq!(q.answer, AnswerSource::Unresolved);
    }

    #[test]
    fn test_raw_question_keeps_unknown_fields() {
        let payload = json!({
            "id": 1,
            "type": 1,
            "title": "t",
            "item": [{"title": "a", "id": 9}],
            "analysis": "because",
            "score": 2,
            "correctAnswer": ["A"]
        });
        let q: RawQuestion = serde_json::from_value(payload.clone()).unwrap();

        assert_eq!(q.extra.get("analysis"), Some(&json!("because")));
        assert_eq!(q.options[0].extra.get("id"), Some(&json!(9)));
        assert_eq!(serde_json::to_value(&q).unwrap(), payload);
    }

    #[test]
    fn test_answer_token_boolish() {
        let tokens: Vec<AnswerToken> = serde_json::from_value(json!([true, " FALSE ", "A", 1])).unwrap();
        assert!(tokens[0].is_boolish());
        assert!(tokens[1].is_boolish());
        assert!(!tokens[2].is_boolish());
        assert_eq!(tokens[3], AnswerToken::Other(json!(1)));
    }
}
