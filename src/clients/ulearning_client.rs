/// 优学院练习 API 客户端
///
/// 封装所有与练习接口相关的 HTTP 调用，以及返回信封（code/message/result）的判定
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, REFERER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AuthError, ExportError, ExportResult, FetchError, InputError, SubmitError};
use crate::models::answer_sheet::AnswerSheetPayload;
use crate::models::{QuestionListPayload, SessionHandle};

pub const ANSWER_SHEET_PATH: &str = "/questionTraining/student/answerSheet";
pub const QUESTION_LIST_PATH: &str = "/questionTraining/student/questionList";
pub const SUBMIT_ANSWER_PATH: &str = "/questionTraining/student/answer";

/// 读接口成功码
pub const CODE_OK: i64 = 1;
/// 提交接口：答案正确
pub const CODE_ANSWER_CORRECT: i64 = 1;
/// 提交接口：答案错误（同样带有标准答案）
pub const CODE_ANSWER_WRONG: i64 = 2;
/// 凭证缺失或过期
pub const CODE_AUTH_REQUIRED: i64 = 2001;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:146.0) Gecko/20100101 Firefox/146.0";
const REFERER_URL: &str = "https://lms.dgut.edu.cn/utest/index.html";

/// 接口统一返回结构
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: JsonValue,
}

/// 提交接口请求体
#[derive(Debug, Clone, Serialize)]
pub struct SubmitAnswerBody {
    #[serde(rename = "qtId")]
    pub training_id: u64,
    #[serde(rename = "qtType")]
    pub training_type: u32,
    pub index: usize,
    #[serde(rename = "relationId")]
    pub relation_id: u64,
    pub answer: Vec<String>,
}

/// 提交结果：服务端对探测答案的判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitVerdict {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub verdict: SubmitVerdict,
    /// 标准答案；字段缺失或不是数组时为空
    pub correct_answer: Vec<String>,
}

/// 优学院 API 客户端
///
/// 带 Authorization 头并启用 cookie 会话；一个客户端对应一次导出。
pub struct ULearningClient {
    http: reqwest::Client,
    base_url: String,
}

impl ULearningClient {
    /// 创建新的客户端
    pub fn new(base_url: impl Into<String>, session: &SessionHandle) -> ExportResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh"));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));
        let auth = HeaderValue::from_str(&session.credential).map_err(|_| {
            InputError::Unparseable {
                field: "AUTHORIZATION",
                value: "<包含非法字符>".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::request_failed("client", e))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// 获取答题卡
    pub async fn answer_sheet(&self, session: &SessionHandle) -> ExportResult<AnswerSheetPayload> {
        self.get_json(ANSWER_SHEET_PATH, &session_query(session))
            .await
    }

    /// 获取题目列表（分页，page 从 1 开始）
    pub async fn question_list(
        &self,
        session: &SessionHandle,
        page: usize,
        page_size: usize,
    ) -> ExportResult<QuestionListPayload> {
        let mut query = session_query(session);
        query.push(("pn", page.to_string()));
        query.push(("ps", page_size.to_string()));
        self.get_json(QUESTION_LIST_PATH, &query).await
    }

    /// 提交一道题的答案
    ///
    /// 无论答案对错，返回中都带有 `result.correctAnswer`
    pub async fn submit_answer(
        &self,
        session: &SessionHandle,
        body: &SubmitAnswerBody,
    ) -> ExportResult<SubmitOutcome> {
        let url = format!("{}{}", self.base_url, SUBMIT_ANSWER_PATH);
        let index = body.index;
        let question_id = body.relation_id;

        debug!("提交答案 Payload: {:?}", body);

        let response = self
            .http
            .post(&url)
            .query(&[("traceId", session.trace_user_id.to_string())])
            .json(body)
            .send()
            .await
            .map_err(|source| SubmitError::RequestFailed {
                index,
                question_id,
                source,
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::new(SUBMIT_ANSWER_PATH, Some(status.to_string())).into());
        }
        if !status.is_success() {
            return Err(SubmitError::HttpStatus {
                index,
                question_id,
                status,
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| SubmitError::RequestFailed {
                index,
                question_id,
                source,
            })?;
        let envelope: ApiEnvelope = serde_json::from_slice(&bytes)
            .map_err(|source| SubmitError::JsonParseFailed { index, source })?;

        debug!("提交结果: code={:?}, message={:?}", envelope.code, envelope.message);

        let verdict = match envelope.code {
            Some(CODE_ANSWER_CORRECT) => SubmitVerdict::Correct,
            Some(CODE_ANSWER_WRONG) => SubmitVerdict::Incorrect,
            Some(CODE_AUTH_REQUIRED) => {
                return Err(AuthError::new(SUBMIT_ANSWER_PATH, envelope.message).into());
            }
            code => {
                return Err(SubmitError::BadResponse {
                    index,
                    question_id,
                    code,
                    message: envelope.message,
                }
                .into());
            }
        };

        Ok(SubmitOutcome {
            verdict,
            correct_answer: extract_correct_answer(&envelope.result),
        })
    }

    /// 通用 GET：检查 HTTP 状态与应用层 code，返回 `result`
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> ExportResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::request_failed(endpoint, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::new(endpoint, Some(status.to_string())).into());
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                endpoint: endpoint.to_string(),
                status,
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::request_failed(endpoint, e))?;
        let envelope: ApiEnvelope =
            serde_json::from_slice(&bytes).map_err(|source| FetchError::JsonParseFailed {
                endpoint: endpoint.to_string(),
                source,
            })?;

        match envelope.code {
            Some(CODE_OK) => {}
            Some(CODE_AUTH_REQUIRED) => {
                return Err(AuthError::new(endpoint, envelope.message).into());
            }
            code => {
                return Err(FetchError::BadResponse {
                    endpoint: endpoint.to_string(),
                    code,
                    message: envelope.message,
                }
                .into());
            }
        }

        serde_json::from_value(envelope.result).map_err(|source| {
            ExportError::from(FetchError::JsonParseFailed {
                endpoint: endpoint.to_string(),
                source,
            })
        })
    }
}

fn session_query(session: &SessionHandle) -> Vec<(&'static str, String)> {
    vec![
        ("qtId", session.training_id.to_string()),
        ("ocId", session.course_context_id.to_string()),
        ("qtType", session.training_type.to_string()),
        ("traceId", session.trace_user_id.to_string()),
    ]
}

/// 取出 `correctAnswer` 并统一成字符串数组
fn extract_correct_answer(result: &JsonValue) -> Vec<String> {
    match result.get("correctAnswer") {
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_correct_answer() {
        assert_eq!(
            extract_correct_answer(&json!({"correctAnswer": ["A", "C"]})),
            vec!["A", "C"]
        );
        assert_eq!(
            extract_correct_answer(&json!({"correctAnswer": [true, 3]})),
            vec!["true", "3"]
        );
        assert!(extract_correct_answer(&json!({"correctAnswer": "A"})).is_empty());
        assert!(extract_correct_answer(&json!({})).is_empty());
        assert!(extract_correct_answer(&JsonValue::Null).is_empty());
    }

    #[test]
    fn test_submit_body_wire_names() {
        let body = SubmitAnswerBody {
            training_id: 2674,
            training_type: 1,
            index: 3,
            relation_id: 555,
            answer: vec!["A".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"qtId": 2674, "qtType": 1, "index": 3, "relationId": 555, "answer": ["A"]})
        );
    }

    #[test]
    fn test_session_query() {
        let session = SessionHandle::new(1, 2, 3, 4, "t");
        let query = session_query(&session);
        assert_eq!(query[0], ("qtId", "1".to_string()));
        assert_eq!(query[3], ("traceId", "4".to_string()));
    }
}
