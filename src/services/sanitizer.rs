//! 文本清洗 - 业务能力层
//!
//! 把题干/选项里的 HTML 转成纯文本：换行标签转换行、去掉其余标签、
//! 解码实体（解两次，处理 `&amp;amp;` 这类双重转义）、规整空白。

use html_escape::decode_html_entities;
use phf::phf_set;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static BR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").expect("valid regex"));
static BLOCK_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*/\s*(p|div|li|tr)\s*>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+;?|#[xX][0-9a-fA-F]+;?|[A-Za-z][A-Za-z0-9]{0,31};?)")
        .expect("valid regex")
});
static CONTROL_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\x0C\x0B]+").expect("valid regex"));
static SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \x{00A0}]+").expect("valid regex"));
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// 允许省略分号的旧式实体（如 `&amp`、`&nbsp`），其余实体必须带分号
static LEGACY_ENTITIES: phf::Set<&'static str> = phf_set! {
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml",
    "COPY", "Ccedil", "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT",
    "Iacute", "Icirc", "Igrave", "Iuml", "LT", "Ntilde", "Oacute", "Ocirc",
    "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN", "Uacute",
    "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig",
    "agrave", "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil",
    "cent", "copy", "curren", "deg", "divide", "eacute", "ecirc", "egrave",
    "eth", "euml", "frac12", "frac14", "frac34", "gt", "iacute", "icirc",
    "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf",
    "ordm", "oslash", "otilde", "ouml", "para", "plusmn", "pound", "quot",
    "raquo", "reg", "sect", "shy", "sup1", "sup2", "sup3", "szlig",
    "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml", "yacute",
    "yen", "yuml",
};

/// 清洗 HTML 文本；`None` 返回空串
pub fn sanitize(raw: Option<&str>) -> String {
    let s = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return String::new(),
    };

    let s = BR_RE.replace_all(s, "\n");
    let s = BLOCK_END_RE.replace_all(&s, "\n");
    let s = TAG_RE.replace_all(&s, "");

    let s = decode_entities(&decode_entities(&s));

    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    let s = CONTROL_SPACE_RE.replace_all(&s, " ");
    let s = SPACE_RE.replace_all(&s, " ");
    NEWLINES_RE.replace_all(&s, "\n\n").into_owned()
}

/// 清洗并去掉首尾空白（题干、选项文本使用）
pub fn sanitize_trimmed(raw: Option<&str>) -> String {
    sanitize(raw).trim().to_string()
}

/// 解码一层 HTML 实体
///
/// 命名实体按 HTML5 完整实体表解析；数字实体与旧式命名实体可以不带分号，
/// 如 `it&#39s`、`&amp b`。无法识别的实体原样保留。
pub fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &Captures| {
            let body = &caps[1];
            match body.strip_prefix('#') {
                Some(num) => decode_numeric(num.trim_end_matches(';')).to_string(),
                None => decode_named(body).unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .into_owned()
}

fn decode_numeric(num: &str) -> char {
    let code = match num.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => num.parse::<u32>().ok(),
    };
    code.and_then(char::from_u32)
        .filter(|c| *c != '\0')
        .unwrap_or('\u{FFFD}')
}

/// `body` 是 `&` 之后的部分，可能带结尾分号
fn decode_named(body: &str) -> Option<String> {
    let (name, has_semicolon) = match body.strip_suffix(';') {
        Some(name) => (name, true),
        None => (body, false),
    };

    if has_semicolon {
        if let Some(text) = lookup_named(name) {
            return Some(text);
        }
    }

    // 最长的旧式实体前缀，剩余部分原样接在后面：`&ampfoo` → `&foo`
    (1..=name.len()).rev().find_map(|len| {
        let prefix = &name[..len];
        if !LEGACY_ENTITIES.contains(prefix) {
            return None;
        }
        let text = lookup_named(prefix)?;
        Some(format!("{}{}", text, &body[len..]))
    })
}

fn lookup_named(name: &str) -> Option<String> {
    let entity = format!("&{};", name);
    let decoded = decode_html_entities(&entity);
    // 实体最多展开为两个码位；否则说明没有整体匹配
    if decoded != entity && decoded.chars().count() <= 2 {
        Some(decoded.into_owned())
    } else {
        None
    }
}
