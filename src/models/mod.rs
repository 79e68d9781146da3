pub mod answer_sheet;
pub mod question;
pub mod record;
pub mod session;

pub use answer_sheet::{AnswerSheet, AnswerSheetEntry};
pub use question::{
    AnswerSource, AnswerToken, QuestionKind, QuestionListPayload, QuestionOption, RawQuestion,
    SourceType,
};
pub use record::CanonicalQuestionRecord;
pub use session::SessionHandle;

use serde::{Deserialize, Deserializer};

/// 把 `null` 当作默认值处理（接口经常用 null 代替空数组）
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 题目 ID 既可能是整数也可能是数字字符串
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or numeric string id")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u64::try_from(value).map_err(|_| E::custom(format!("negative id: {}", value)))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id: {}", value)))
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
