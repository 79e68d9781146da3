//! 导出记录编码 - 业务能力层
//!
//! 把判定好题型的原始题目转换成导出格式

use regex::{NoExpand, Regex};
use std::sync::LazyLock;
use tracing::debug;

use crate::models::{AnswerToken, CanonicalQuestionRecord, QuestionKind, RawQuestion};
use crate::services::classifier::classify;
use crate::services::sanitizer::sanitize_trimmed;
use crate::utils::logging::truncate_text;

const OPTION_LABELS: [&str; 10] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];

const TRUE_LABEL: &str = "正确";
const FALSE_LABEL: &str = "错误";
const TRUE_TOKENS: [&str; 6] = ["A", "正确", "True", "true", "对", "√"];
const FALSE_TOKENS: [&str; 6] = ["B", "错误", "False", "false", "错", "×"];

/// 填空位的识别规则，按优先级排列
static BLANK_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"_{2,}").expect("valid regex"),
        Regex::new(r"\(\s*\)").expect("valid regex"),
        Regex::new(r"【\s*】").expect("valid regex"),
        Regex::new(r"\[\s*\]").expect("valid regex"),
    ]
});

/// 判定题型并编码；题型无法判定时返回 `None`
pub fn encode(question: &RawQuestion) -> Option<CanonicalQuestionRecord> {
    let kind = classify(question)?;
    Some(encode_as(question, kind))
}

/// 批量编码，丢弃无法判定题型的题目
pub fn encode_all(questions: &[RawQuestion]) -> Vec<CanonicalQuestionRecord> {
    questions
        .iter()
        .filter_map(|q| {
            let record = encode(q);
            if record.is_none() {
                debug!(
                    "题目 {} 题型无法判定，已跳过: {}",
                    q.id,
                    truncate_text(&sanitize_trimmed(q.title.as_deref()), 30)
                );
            }
            record
        })
        .collect()
}

/// 按给定题型编码
pub fn encode_as(question: &RawQuestion, kind: QuestionKind) -> CanonicalQuestionRecord {
    let stem = sanitize_trimmed(question.title.as_deref());
    let answer = question.answer.tokens();

    match kind {
        QuestionKind::Choice => CanonicalQuestionRecord::Choice {
            stem,
            options: format_options(question),
            answer: join_choice_answer(&answer),
            explanation: String::new(),
        },
        QuestionKind::TrueFalse => CanonicalQuestionRecord::TrueFalse {
            stem,
            answer: answer.first().map(true_false_answer).unwrap_or_default(),
            explanation: String::new(),
        },
        QuestionKind::FillBlank => CanonicalQuestionRecord::FillBlank {
            stem: fill_blanks(&stem, &answer),
            explanation: String::new(),
        },
        QuestionKind::Essay => CanonicalQuestionRecord::Essay {
            stem,
            answer: answer
                .iter()
                .map(|a| sanitize_trimmed(Some(&a.to_string())))
                .collect::<Vec<_>>()
                .join("\n"),
            explanation: String::new(),
        },
    }
}

/// "A. 选项文字"，超出字母表的选项用序号作标签
fn format_options(question: &RawQuestion) -> Vec<String> {
    question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let label = OPTION_LABELS
                .get(i)
                .map(|l| l.to_string())
                .unwrap_or_else(|| i.to_string());
            format!("{}. {}", label, sanitize_trimmed(option.title.as_deref()))
        })
        .collect()
}

/// 多选答案排序后直接拼接，如 ["C", "A"] → "AC"
fn join_choice_answer(answer: &[AnswerToken]) -> String {
    let mut letters: Vec<String> = answer.iter().map(|a| a.to_string()).collect();
    letters.sort();
    letters.concat()
}

/// 把判断题答案规整为 正确/错误，无法识别时原样保留
fn true_false_answer(token: &AnswerToken) -> String {
    let text = match token {
        AnswerToken::Flag(true) => return TRUE_LABEL.to_string(),
        AnswerToken::Flag(false) => return FALSE_LABEL.to_string(),
        other => other.to_string(),
    };

    if TRUE_TOKENS.contains(&text.as_str()) {
        return TRUE_LABEL.to_string();
    }
    if FALSE_TOKENS.contains(&text.as_str()) {
        return FALSE_LABEL.to_string();
    }
    match text.trim().to_lowercase().as_str() {
        "true" => TRUE_LABEL.to_string(),
        "false" => FALSE_LABEL.to_string(),
        _ => text,
    }
}

/// 依次把答案填进题干的空位，空位不够时追加到末尾
///
/// 追加时的分隔符看答案序号：第一个答案前用空格，其余用 `", "`。
fn fill_blanks(stem: &str, answer: &[AnswerToken]) -> String {
    let mut filled = stem.to_string();

    for (i, token) in answer.iter().enumerate() {
        let wrapped = format!("{{{}}}", token);
        match BLANK_PATTERNS.iter().find(|re| re.is_match(&filled)) {
            Some(re) => {
                filled = re.replacen(&filled, 1, NoExpand(&wrapped)).into_owned();
            }
            None => {
                filled.push_str(if i == 0 { " " } else { ", " });
                filled.push_str(&wrapped);
            }
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerSource, SourceType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn probed(answers: &[&str]) -> AnswerSource {
        AnswerSource::Probed(answers.iter().map(|a| a.to_string()).collect())
    }

    #[test]
    fn test_choice_answer_sorted_and_joined() {
        let q = RawQuestion::new(1, SourceType::MultipleChoice, "<p>选出正确的</p>")
            .with_options(["<b>甲</b>", "乙", "丙"])
            .with_answer(probed(&["C", "A"]));

        assert_eq!(
            encode(&q),
            Some(CanonicalQuestionRecord::Choice {
                stem: "选出正确的".to_string(),
                options: vec!["A. 甲".to_string(), "B. 乙".to_string(), "C. 丙".to_string()],
                answer: "AC".to_string(),
                explanation: String::new(),
            })
        );
    }

    #[test]
    fn test_option_labels_beyond_alphabet() {
        let titles: Vec<String> = (0..12).map(|i| format!("opt{}", i)).collect();
        let q = RawQuestion::new(1, SourceType::SingleChoice, "题").with_options(titles);

        let record = encode(&q).unwrap();
        let options = record.options().unwrap();
        assert_eq!(options[9], "J. opt9");
        assert_eq!(options[10], "10. opt10");
        assert_eq!(options[11], "11. opt11");
        assert_eq!(record.answer(), Some(""));
    }

    #[test]
    fn test_true_false_tokens() {
        let cases = [
            (json!("A"), "正确"),
            (json!("B"), "错误"),
            (json!(true), "正确"),
            (json!(false), "错误"),
            (json!(" TRUE "), "正确"),
            (json!("√"), "正确"),
            (json!("×"), "错误"),
            (json!("对"), "正确"),
            (json!("maybe"), "maybe"),
        ];
        for (raw, expected) in cases {
            let token: AnswerToken = serde_json::from_value(raw.clone()).unwrap();
            let q = RawQuestion::new(1, SourceType::TrueFalse, "题")
                .with_answer(AnswerSource::Recorded(vec![token]));
            assert_eq!(encode(&q).unwrap().answer(), Some(expected), "token: {}", raw);
        }

        let q = RawQuestion::new(1, SourceType::TrueFalse, "题");
        assert_eq!(encode(&q).unwrap().answer(), Some(""));
    }

    #[test]
    fn test_fill_blank_replaces_in_place() {
        let q = RawQuestion::new(1, SourceType::FillBlank, "The ___ is red")
            .with_answer(probed(&["sky"]));
        assert_eq!(encode(&q).unwrap().stem(), "The {sky} is red");
    }

    #[test]
    fn test_fill_blank_appends_when_no_marker() {
        let q = RawQuestion::new(1, SourceType::FillBlank, "no blanks")
            .with_answer(probed(&["x", "y"]));
        assert_eq!(encode(&q).unwrap().stem(), "no blanks {x}, {y}");
    }

    #[test]
    fn test_fill_blank_pattern_priority_and_overflow() {
        // 下划线优先于括号，即使括号出现在前面
        let q = RawQuestion::new(1, SourceType::FillBlank, "( ) 与 ____ 以及 【 】")
            .with_answer(probed(&["a", "b", "c", "d"]));
        assert_eq!(encode(&q).unwrap().stem(), "{b} 与 {a} 以及 {c}, {d}");

        let q = RawQuestion::new(1, SourceType::FillBlank, "[ ] 和 [] 都是空位")
            .with_answer(probed(&["$1", "x"]));
        assert_eq!(encode(&q).unwrap().stem(), "{$1} 和 {x} 都是空位");
    }

    #[test]
    fn test_fill_blank_without_answer_keeps_stem() {
        let q = RawQuestion::new(1, SourceType::FillBlank, "<p>____ 是首都</p>");
        let record = encode(&q).unwrap();
        assert_eq!(record.stem(), "____ 是首都");
        assert_eq!(record.answer(), None);
    }

    #[test]
    fn test_essay_joins_answers() {
        let q = RawQuestion::new(1, SourceType::Essay, "简述")
            .with_answer(probed(&["<p>第一点</p>", "第二点"]));
        assert_eq!(encode(&q).unwrap().answer(), Some("第一点\n第二点"));
    }

    #[test]
    fn test_encode_all_drops_unresolvable() {
        let questions = vec![
            RawQuestion::new(1, SourceType::SingleChoice, "a"),
            RawQuestion::new(2, SourceType::Unresolvable(json!("x")), "b"),
            RawQuestion::new(3, SourceType::Essay, "c"),
        ];
        let records = encode_all(&questions);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].kind(), QuestionKind::Essay);
    }
}
