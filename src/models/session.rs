//! 导出会话
//!
//! 一次导出由 (qtId, ocId, qtType) 三元组 + 用户 ID + 凭证确定，运行期间不可变。

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::config::Config;
use crate::error::InputError;

static PRACTICE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#/questionTrain/practice/(\d+)/(\d+)/(\d+)").expect("valid practice url regex")
});

#[derive(Clone, PartialEq, Eq)]
pub struct SessionHandle {
    /// qtId
    pub training_id: u64,
    /// ocId
    pub course_context_id: u64,
    /// qtType
    pub training_type: u32,
    /// traceId（用户 ID）
    pub trace_user_id: u64,
    /// Authorization 头
    pub credential: String,
}

// 凭证不进日志
impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("training_id", &self.training_id)
            .field("course_context_id", &self.course_context_id)
            .field("training_type", &self.training_type)
            .field("trace_user_id", &self.trace_user_id)
            .field("credential", &"***")
            .finish()
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[练习 #{} 课程 #{} 类型 #{} 用户 #{}]",
            self.training_id, self.course_context_id, self.training_type, self.trace_user_id
        )
    }
}

/// 从练习页面 URL 中解析出的三元组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeIds {
    pub qt_id: String,
    pub oc_id: String,
    pub qt_type: String,
}

/// 解析 `…#/questionTrain/practice/{qtId}/{ocId}/{qtType}`
pub fn parse_practice_url(url: &str) -> Result<PracticeIds, InputError> {
    let caps = PRACTICE_URL_RE
        .captures(url)
        .ok_or_else(|| InputError::PracticeUrl {
            url: url.to_string(),
        })?;
    Ok(PracticeIds {
        qt_id: caps[1].to_string(),
        oc_id: caps[2].to_string(),
        qt_type: caps[3].to_string(),
    })
}

impl SessionHandle {
    pub fn new(
        training_id: u64,
        course_context_id: u64,
        training_type: u32,
        trace_user_id: u64,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            training_id,
            course_context_id,
            training_type,
            trace_user_id,
            credential: credential.into(),
        }
    }

    /// 从配置构建会话；显式 ID 优先，缺失时从练习 URL 解析
    pub fn from_config(config: &Config) -> Result<Self, InputError> {
        let credential = config.authorization.trim();
        if credential.is_empty() {
            return Err(InputError::Missing {
                field: "AUTHORIZATION",
            });
        }

        let from_url = match config.practice_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(parse_practice_url(url)),
            _ => None,
        };

        let pick = |explicit: &str, from_url: Option<&str>| -> Option<String> {
            let explicit = explicit.trim();
            if !explicit.is_empty() {
                Some(explicit.to_string())
            } else {
                from_url.map(str::to_string)
            }
        };

        let ids = match from_url {
            Some(Ok(ids)) => Some(ids),
            // URL 解析失败只在确实需要它时报错
            Some(Err(e)) => {
                if config.qt_id.trim().is_empty() || config.oc_id.trim().is_empty() {
                    return Err(e);
                }
                None
            }
            None => None,
        };

        let qt_id = pick(&config.qt_id, ids.as_ref().map(|i| i.qt_id.as_str()));
        let oc_id = pick(&config.oc_id, ids.as_ref().map(|i| i.oc_id.as_str()));
        // qt_type 有默认值 "1"，URL 中的值只在配置为空时使用
        let qt_type = pick(&config.qt_type, ids.as_ref().map(|i| i.qt_type.as_str()))
            .unwrap_or_else(|| "1".to_string());

        Ok(Self {
            training_id: parse_field("QT_ID", qt_id)?,
            course_context_id: parse_field("OC_ID", oc_id)?,
            training_type: parse_field("QT_TYPE", Some(qt_type))?,
            trace_user_id: parse_field("USER_ID", Some(config.user_id.clone()))?,
            credential: credential.to_string(),
        })
    }

    /// 导出文件名前缀
    pub fn file_stem(&self) -> String {
        format!(
            "ulearning_{}_{}_{}",
            self.training_id, self.course_context_id, self.training_type
        )
    }
}

fn parse_field<T: std::str::FromStr>(
    field: &'static str,
    value: Option<String>,
) -> Result<T, InputError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(InputError::Missing { field })?;
    value
        .parse()
        .map_err(|_| InputError::Unparseable { field, value })
}
