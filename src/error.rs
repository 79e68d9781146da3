use thiserror::Error;

/// 导出流程错误类型
///
/// 所有错误都是致命的：第一个错误会中止整个导出，不做部分结果的保存。
#[derive(Debug, Error)]
pub enum ExportError {
    /// 会话参数或凭证缺失/无法解析
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 读取接口失败（答题卡 / 题目列表）
    #[error("拉取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 探测提交失败
    #[error("提交错误: {0}")]
    Submit(#[from] SubmitError),
    /// 凭证无效或已过期
    #[error("认证错误: {0}")]
    Auth(#[from] AuthError),
    /// 导出文件写入失败
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 输入错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 必填字段为空
    #[error("缺少必填参数 {field}")]
    Missing { field: &'static str },
    /// 字段无法解析为数字
    #[error("参数 {field} 的值 '{value}' 无法解析为整数")]
    Unparseable { field: &'static str, value: String },
    /// 练习页面 URL 格式不符
    #[error("无法从 URL 中解析练习参数 (需要 #/questionTrain/practice/{{qtId}}/{{ocId}}/{{qtType}}): {url}")]
    PracticeUrl { url: String },
}

/// 读取接口错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// HTTP 状态码非 2xx
    #[error("HTTP 状态异常 ({endpoint}): {status}")]
    HttpStatus {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    /// 应用层返回错误码
    #[error("接口返回错误 ({endpoint}): code={code:?}, message={message:?}")]
    BadResponse {
        endpoint: String,
        code: Option<i64>,
        message: Option<String>,
    },
    /// 返回体无法解析
    #[error("JSON 解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 题目在多页中重复出现
    #[error("题目 {id} 在题目列表中重复出现")]
    DuplicateQuestion { id: u64 },
    /// 答题卡中的题目重复
    #[error("题目 {id} 在答题卡中重复出现")]
    DuplicateSheetEntry { id: u64 },
    /// 答题卡中的题目在题目列表里缺失
    #[error("答题卡中的题目 {id} 未出现在题目列表中")]
    MissingQuestion { id: u64 },
    /// 拉取数量与总数不一致
    #[error("题目数量不一致: 期望 {expected} 道, 实际 {actual} 道")]
    CountMismatch { expected: usize, actual: usize },
}

/// 探测提交错误
#[derive(Debug, Error)]
pub enum SubmitError {
    /// 网络请求失败
    #[error("提交失败 (index={index}, 题目={question_id}): {source}")]
    RequestFailed {
        index: usize,
        question_id: u64,
        #[source]
        source: reqwest::Error,
    },
    /// HTTP 状态码非 2xx
    #[error("提交 HTTP 状态异常 (index={index}, 题目={question_id}): {status}")]
    HttpStatus {
        index: usize,
        question_id: u64,
        status: reqwest::StatusCode,
    },
    /// 应用层返回错误码
    #[error("提交返回错误 (index={index}, 题目={question_id}): code={code:?}, message={message:?}")]
    BadResponse {
        index: usize,
        question_id: u64,
        code: Option<i64>,
        message: Option<String>,
    },
    /// 返回体无法解析
    #[error("提交返回 JSON 解析失败 (index={index}): {source}")]
    JsonParseFailed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// 认证错误
#[derive(Debug, Error)]
#[error("凭证缺失或已过期，请重新登录后更新 AUTHORIZATION ({endpoint}): {message}")]
pub struct AuthError {
    pub endpoint: String,
    pub message: String,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化失败 ({path}): {source}")]
    SerializeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// ========== 便捷构造函数 ==========

impl FetchError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        FetchError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }
}

impl AuthError {
    pub fn new(endpoint: impl Into<String>, message: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            message: message.unwrap_or_else(|| "未知".to_string()),
        }
    }
}

// ========== Result 类型别名 ==========

/// 导出流程结果类型
pub type ExportResult<T> = Result<T, ExportError>;
