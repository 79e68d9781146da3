//! 导出文件写入 - 业务能力层
//!
//! 只负责把已经生成好的记录写到磁盘，不参与拉取和编码。

use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{ExportResult, FileError};
use crate::models::{AnswerToken, CanonicalQuestionRecord, RawQuestion};

/// 原始数据导出时的一项：原始题目 + 最终采用的答案
#[derive(Debug, Serialize)]
struct RawExportEntry<'a> {
    #[serde(flatten)]
    question: &'a RawQuestion,
    #[serde(rename = "resolvedAnswer")]
    resolved_answer: Vec<AnswerToken>,
    #[serde(rename = "answerSource")]
    answer_source: &'static str,
}

/// 已渲染、尚未写盘的导出文件
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub path: PathBuf,
    pub content: String,
}

/// 导出文件写入器
///
/// 先把所有文件渲染成 `PendingFile`，再由 `write_all` 一次写出；
/// 渲染阶段出错时磁盘上什么都不会留下。
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 题库 JSON：`{stem}_questions.json`
    pub fn json_file(
        &self,
        records: &[CanonicalQuestionRecord],
        stem: &str,
    ) -> ExportResult<PendingFile> {
        let path = self.output_dir.join(format!("{}_questions.json", stem));
        let content = to_pretty_json(records, &path)?;
        Ok(PendingFile { path, content })
    }

    /// 原始数据：`{stem}_questions_raw.json`
    pub fn raw_json_file(&self, questions: &[RawQuestion], stem: &str) -> ExportResult<PendingFile> {
        let path = self
            .output_dir
            .join(format!("{}_questions_raw.json", stem));
        let entries: Vec<RawExportEntry<'_>> = questions
            .iter()
            .map(|q| RawExportEntry {
                question: q,
                resolved_answer: q.answer.tokens(),
                answer_source: q.answer.label(),
            })
            .collect();
        let content = to_pretty_json(&entries, &path)?;
        Ok(PendingFile { path, content })
    }

    /// 可读文本：`{stem}_questions.txt`
    pub fn txt_file(&self, records: &[CanonicalQuestionRecord], stem: &str) -> PendingFile {
        PendingFile {
            path: self.output_dir.join(format!("{}_questions.txt", stem)),
            content: render_txt(records),
        }
    }

    /// 依次写出所有文件
    ///
    /// 任一文件写入失败时，删除本批次已写出的文件后返回错误。
    pub fn write_all(&self, files: &[PendingFile]) -> ExportResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir).map_err(|source| FileError::CreateDirFailed {
            path: self.output_dir.display().to_string(),
            source,
        })?;

        let mut written: Vec<PathBuf> = Vec::with_capacity(files.len());
        for file in files {
            if let Err(source) = fs::write(&file.path, &file.content) {
                for path in &written {
                    if let Err(e) = fs::remove_file(path) {
                        warn!("⚠️ 清理未完成的导出文件失败 {}: {}", path.display(), e);
                    }
                }
                return Err(FileError::WriteFailed {
                    path: file.path.display().to_string(),
                    source,
                }
                .into());
            }
            info!("✓ 已写出: {}", file.path.display());
            written.push(file.path.clone());
        }
        Ok(written)
    }
}

// serde_json 默认不转义非 ASCII 字符
fn to_pretty_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> ExportResult<String> {
    serde_json::to_string_pretty(value).map_err(|source| {
        FileError::SerializeFailed {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}

/// 渲染可读文本
pub fn render_txt(records: &[CanonicalQuestionRecord]) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "=== 第{}题 ({}) ===", i + 1, record.kind());
        let _ = writeln!(out, "题干: {}", record.stem());
        if let Some(options) = record.options() {
            out.push_str("选项:\n");
            for option in options {
                let _ = writeln!(out, "  {}", option);
            }
        }
        if let Some(answer) = record.answer() {
            let _ = writeln!(out, "答案: {}", answer);
        }
        if !record.explanation().is_empty() {
            let _ = writeln!(out, "解析: {}", record.explanation());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerSource;
    use pretty_assertions::assert_eq;

    fn sample_records() -> Vec<CanonicalQuestionRecord> {
        vec![
            CanonicalQuestionRecord::Choice {
                stem: "1+1=?".to_string(),
                options: vec!["A. 1".to_string(), "B. 2".to_string()],
                answer: "B".to_string(),
                explanation: String::new(),
            },
            CanonicalQuestionRecord::FillBlank {
                stem: "首都是{北京}".to_string(),
                explanation: String::new(),
            },
        ]
    }

    #[test]
    fn test_render_txt() {
        let expected = "=== 第1题 (选择题) ===\n\
                        题干: 1+1=?\n\
                        选项:\n  A. 1\n  B. 2\n\
                        答案: B\n\n\
                        === 第2题 (填空题) ===\n\
                        题干: 首都是{北京}\n\n";
        assert_eq!(render_txt(&sample_records()), expected);
    }

    #[test]
    fn test_export_json_keeps_chinese_and_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("nested/out"));

        let file = exporter
            .json_file(&sample_records(), "ulearning_1_2_1")
            .unwrap();
        let written = exporter.write_all(&[file]).unwrap();

        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("ulearning_1_2_1_questions.json"));
        let content = fs::read_to_string(&written[0]).unwrap();
        assert!(content.contains("\"题型\": \"选择题\""));
        assert!(!content.contains("\\u"));

        let parsed: Vec<CanonicalQuestionRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, sample_records());
    }

    #[test]
    fn test_export_raw_includes_resolved_answer() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let mut question: RawQuestion = serde_json::from_value(serde_json::json!({
            "id": 7,
            "type": 3,
            "title": "<p>题</p>",
            "item": [{"title": "对", "id": 71}],
            "analysis": "常识",
            "score": 2
        }))
        .unwrap();
        question.answer = AnswerSource::Probed(vec!["A".to_string()]);

        let file = exporter.raw_json_file(&[question], "stem").unwrap();
        assert!(file.path.ends_with("stem_questions_raw.json"));
        let value: serde_json::Value = serde_json::from_str(&file.content).unwrap();

        assert_eq!(value[0]["id"], 7);
        assert_eq!(value[0]["type"], 3);
        assert_eq!(value[0]["title"], "<p>题</p>");
        assert_eq!(value[0]["analysis"], "常识");
        assert_eq!(value[0]["score"], 2);
        assert_eq!(value[0]["item"][0]["id"], 71);
        assert_eq!(value[0]["resolvedAnswer"], serde_json::json!(["A"]));
        assert_eq!(value[0]["answerSource"], "probed");
    }

    #[test]
    fn test_write_all_removes_partial_batch_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let json = exporter.json_file(&sample_records(), "stem").unwrap();
        let txt = exporter.txt_file(&sample_records(), "stem");
        // 目标路径被目录占用，写入必然失败
        fs::create_dir(&txt.path).unwrap();

        let err = exporter.write_all(&[json.clone(), txt]).unwrap_err();

        assert!(matches!(
            err,
            crate::error::ExportError::File(FileError::WriteFailed { .. })
        ));
        assert!(!json.path.exists());
    }
}
