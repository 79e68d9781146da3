use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

/// 默认配置文件名（存在时自动加载）
pub const DEFAULT_CONFIG_FILE: &str = "ulearning.toml";

/// 程序配置
///
/// 加载顺序（后者覆盖前者）：默认值 → TOML 文件 → 环境变量 → 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 接口根地址
    pub base_url: String,
    /// Authorization 凭证
    pub authorization: String,
    /// 用户 ID（traceId）
    #[serde(deserialize_with = "deserialize_text")]
    pub user_id: String,
    /// 练习 ID
    #[serde(deserialize_with = "deserialize_text")]
    pub qt_id: String,
    /// 课程 ID
    #[serde(deserialize_with = "deserialize_text")]
    pub oc_id: String,
    /// 练习类型
    #[serde(deserialize_with = "deserialize_text")]
    pub qt_type: String,
    /// 练习页面 URL，缺少 ID 时从中解析
    pub practice_url: Option<String>,
    /// 题目列表每页数量
    pub page_size: usize,
    /// 每页请求后的等待时间（毫秒）
    pub page_delay_ms: u64,
    /// 是否通过探测提交获取标准答案
    pub probe_enabled: bool,
    /// 每次探测提交后的等待时间（毫秒）
    pub probe_delay_ms: u64,
    /// 最多探测的题目数
    pub probe_limit: Option<usize>,
    /// 未探测的题目是否使用答题卡记录的答案
    pub use_recorded_answers: bool,
    /// 输出目录
    pub output_dir: String,
    /// 是否额外导出原始数据
    pub export_raw: bool,
    /// 是否额外导出可读文本
    pub export_txt: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://lms.dgut.edu.cn/utestapi".to_string(),
            authorization: String::new(),
            user_id: String::new(),
            qt_id: String::new(),
            oc_id: String::new(),
            qt_type: "1".to_string(),
            practice_url: None,
            page_size: 30,
            page_delay_ms: 300,
            probe_enabled: true,
            probe_delay_ms: 500,
            probe_limit: None,
            use_recorded_answers: true,
            output_dir: "output".to_string(),
            export_raw: false,
            export_txt: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 按默认顺序加载配置：TOML 文件（可选）+ 环境变量
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let base = match config_file {
            Some(path) => Self::from_toml_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        Ok(base.with_env())
    }

    /// 从 TOML 文件加载，未写出的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 用环境变量覆盖
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// 用给定的查找函数覆盖字段，空值视为未设置
    pub fn with_env_from(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let default = self;
        Self {
            base_url: var("BASE_URL").unwrap_or(default.base_url),
            authorization: var("AUTHORIZATION").unwrap_or(default.authorization),
            user_id: var("USER_ID").unwrap_or(default.user_id),
            qt_id: var("QT_ID").unwrap_or(default.qt_id),
            oc_id: var("OC_ID").unwrap_or(default.oc_id),
            qt_type: var("QT_TYPE").unwrap_or(default.qt_type),
            practice_url: var("PRACTICE_URL").or(default.practice_url),
            page_size: var("PAGE_SIZE").and_then(|v| v.parse().ok()).unwrap_or(default.page_size),
            page_delay_ms: var("PAGE_DELAY_MS").and_then(|v| v.parse().ok()).unwrap_or(default.page_delay_ms),
            probe_enabled: var("PROBE_ENABLED").and_then(|v| v.parse().ok()).unwrap_or(default.probe_enabled),
            probe_delay_ms: var("PROBE_DELAY_MS").and_then(|v| v.parse().ok()).unwrap_or(default.probe_delay_ms),
            probe_limit: var("PROBE_LIMIT").and_then(|v| v.parse().ok()).or(default.probe_limit),
            use_recorded_answers: var("USE_RECORDED_ANSWERS").and_then(|v| v.parse().ok()).unwrap_or(default.use_recorded_answers),
            output_dir: var("OUTPUT_DIR").unwrap_or(default.output_dir),
            export_raw: var("EXPORT_RAW").and_then(|v| v.parse().ok()).unwrap_or(default.export_raw),
            export_txt: var("EXPORT_TXT").and_then(|v| v.parse().ok()).unwrap_or(default.export_txt),
            verbose_logging: var("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn probe_delay(&self) -> Duration {
        Duration::from_millis(self.probe_delay_ms)
    }
}

// TOML 里的 ID 可能写成整数也可能写成字符串
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(TextVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_toml_accepts_numeric_ids_and_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            authorization = "Bearer abc"
            user_id = 1001
            qt_id = "2674"
            oc_id = 134202
            probe_limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.user_id, "1001");
        assert_eq!(config.qt_id, "2674");
        assert_eq!(config.oc_id, "134202");
        assert_eq!(config.qt_type, "1");
        assert_eq!(config.probe_limit, Some(5));
        assert_eq!(config.page_size, 30);
        assert!(config.probe_enabled);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("QT_ID", "99"),
            ("PAGE_DELAY_MS", "0"),
            ("PROBE_ENABLED", "false"),
            ("OUTPUT_DIR", "  "),
        ]);

        let config = Config::from_toml_str("qt_id = 1\noutput_dir = \"dump\"")
            .unwrap()
            .with_env_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.qt_id, "99");
        assert_eq!(config.page_delay(), Duration::ZERO);
        assert!(!config.probe_enabled);
        // 空白值不覆盖
        assert_eq!(config.output_dir, "dump");
    }
}
