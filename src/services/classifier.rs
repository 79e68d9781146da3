//! 题型判定 - 业务能力层
//!
//! 接口给的 `type` 不一定可信，这里结合选项和答案修正题型。

use tracing::warn;

use crate::models::{QuestionKind, RawQuestion, SourceType};
use crate::services::sanitizer::sanitize_trimmed;

/// 判断题选项中常见的关键词：正确/错误、对/错、是/否
const TRUE_FALSE_KEYWORDS: [&str; 6] = ["正确", "错误", "对", "错", "是", "否"];

/// 判定题目的最终题型；题型码无法识别时返回 `None`（该题不导出）
///
/// 优先级：
/// 1. 答案首项是布尔值或 "true"/"false" → 判断题
/// 2. 填空题但只有两个"对/错"类选项 → 判断题
/// 3. 按题型码映射，未知整数码按选择题处理
pub fn classify(question: &RawQuestion) -> Option<QuestionKind> {
    let answer = question.answer.tokens();
    if answer.first().is_some_and(|a| a.is_boolish()) {
        return Some(QuestionKind::TrueFalse);
    }

    if question.source_type == SourceType::FillBlank && looks_like_true_false(question) {
        return Some(QuestionKind::TrueFalse);
    }

    match &question.source_type {
        SourceType::Other(code) => {
            warn!("题目 {} 的题型码 {} 无法识别，按选择题处理", question.id, code);
        }
        SourceType::Unresolvable(raw) => {
            warn!("题目 {} 的题型 {} 无法解析，跳过该题", question.id, raw);
        }
        _ => {}
    }

    question.source_type.base_kind()
}

/// 恰好两个选项，且选项文字合起来包含对/错类关键词
fn looks_like_true_false(question: &RawQuestion) -> bool {
    if question.options.len() != 2 {
        return false;
    }
    let joined: String = question
        .options
        .iter()
        .map(|o| sanitize_trimmed(o.title.as_deref()))
        .collect();
    TRUE_FALSE_KEYWORDS.iter().any(|k| joined.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerSource, AnswerToken};
    use serde_json::json;

    #[test]
    fn test_base_kinds() {
        let cases = [
            (SourceType::SingleChoice, QuestionKind::Choice),
            (SourceType::MultipleChoice, QuestionKind::Choice),
            (SourceType::TrueFalse, QuestionKind::TrueFalse),
            (SourceType::FillBlank, QuestionKind::FillBlank),
            (SourceType::Essay, QuestionKind::Essay),
            (SourceType::Other(8), QuestionKind::Choice),
        ];
        for (source_type, expected) in cases {
            let q = RawQuestion::new(1, source_type, "题干");
            assert_eq!(classify(&q), Some(expected));
        }
    }

    #[test]
    fn test_fill_blank_with_true_false_options() {
        let q = RawQuestion::new(1, SourceType::FillBlank, "地球是圆的")
            .with_options(["<p>正确</p>", "错误"])
            .with_answer(AnswerSource::Probed(vec!["A".to_string()]));
        assert_eq!(classify(&q), Some(QuestionKind::TrueFalse));
    }

    #[test]
    fn test_fill_blank_with_other_options_stays() {
        let q = RawQuestion::new(1, SourceType::FillBlank, "____")
            .with_options(["北京", "上海"]);
        assert_eq!(classify(&q), Some(QuestionKind::FillBlank));

        let q = RawQuestion::new(1, SourceType::FillBlank, "____")
            .with_options(["正确", "错误", "不确定"]);
        assert_eq!(classify(&q), Some(QuestionKind::FillBlank));
    }

    #[test]
    fn test_boolean_answer_wins() {
        let q = RawQuestion::new(1, SourceType::Essay, "题干")
            .with_answer(AnswerSource::Recorded(vec![AnswerToken::Flag(true)]));
        assert_eq!(classify(&q), Some(QuestionKind::TrueFalse));

        let q = RawQuestion::new(1, SourceType::SingleChoice, "题干")
            .with_answer(AnswerSource::Probed(vec!["FALSE".to_string()]));
        assert_eq!(classify(&q), Some(QuestionKind::TrueFalse));

        // 题型无法解析时，布尔答案仍能确定题型
        let q = RawQuestion::new(1, SourceType::Unresolvable(json!("?")), "题干")
            .with_answer(AnswerSource::Recorded(vec![AnswerToken::Flag(false)]));
        assert_eq!(classify(&q), Some(QuestionKind::TrueFalse));
    }

    #[test]
    fn test_unresolvable_type_is_dropped() {
        let q = RawQuestion::new(1, SourceType::Unresolvable(json!({"k": 1})), "题干");
        assert_eq!(classify(&q), None);
    }
}
