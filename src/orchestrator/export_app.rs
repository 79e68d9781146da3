//! 导出应用 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：由配置构建会话、HTTP 客户端和导出流程
//! 2. **执行导出**：委托 `ExportFlow` 完成拉取、探测和编码
//! 3. **写出文件**：流程全部成功、所有文件渲染完成后才写盘，失败时磁盘上没有半成品
//! 4. **全局统计**：输出本次导出的统计信息

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::clients::ULearningClient;
use crate::config::Config;
use crate::models::{CanonicalQuestionRecord, SessionHandle};
use crate::services::{Exporter, PendingFile};
use crate::utils::logging::{log_session, log_startup, print_final_stats};
use crate::workflow::{ExportFlow, ExportStats, ProgressSink, TracingProgress};

/// 一次导出写出的文件
#[derive(Debug, Clone, Default)]
pub struct ExportedFiles {
    pub json: PathBuf,
    pub raw: Option<PathBuf>,
    pub txt: Option<PathBuf>,
}

impl ExportedFiles {
    fn paths(&self) -> Vec<String> {
        std::iter::once(&self.json)
            .chain(self.raw.iter())
            .chain(self.txt.iter())
            .map(|p| p.display().to_string())
            .collect()
    }
}

/// 导出报告
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub records: Vec<CanonicalQuestionRecord>,
    pub stats: ExportStats,
    pub files: ExportedFiles,
}

/// 应用主结构
pub struct App {
    config: Config,
    session: SessionHandle,
    client: ULearningClient,
    flow: ExportFlow,
    exporter: Exporter,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let session = SessionHandle::from_config(&config).context("会话参数无效")?;
        log_session(&session);

        let client = ULearningClient::new(config.base_url.clone(), &session)
            .context("无法创建 HTTP 客户端")?;
        let flow = ExportFlow::new(&config);
        let exporter = Exporter::new(&config.output_dir);

        Ok(Self {
            config,
            session,
            client,
            flow,
            exporter,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// 运行应用主逻辑，进度写入日志
    pub async fn run(&self) -> Result<ExportReport> {
        self.run_with(&TracingProgress).await
    }

    /// 运行应用主逻辑，进度交给调用方的 sink
    pub async fn run_with(&self, sink: &dyn ProgressSink) -> Result<ExportReport> {
        let outcome = self
            .flow
            .run(&self.client, &self.session, sink)
            .await
            .with_context(|| format!("导出失败 {}", self.session))?;

        if outcome.records.is_empty() {
            info!("⚠️ 没有可导出的题目");
        }

        // 先渲染全部文件，再统一写盘
        let stem = self.session.file_stem();
        let json = self.exporter.json_file(&outcome.records, &stem)?;
        let raw = if self.config.export_raw {
            Some(self.exporter.raw_json_file(&outcome.questions, &stem)?)
        } else {
            None
        };
        let txt = self
            .config
            .export_txt
            .then(|| self.exporter.txt_file(&outcome.records, &stem));
        let files = ExportedFiles {
            json: json.path.clone(),
            raw: raw.as_ref().map(|f| f.path.clone()),
            txt: txt.as_ref().map(|f| f.path.clone()),
        };

        let pending: Vec<PendingFile> = std::iter::once(json).chain(raw).chain(txt).collect();
        self.exporter
            .write_all(&pending)
            .context("写出导出文件失败")?;

        print_final_stats(&outcome.stats, &files.paths());

        Ok(ExportReport {
            records: outcome.records,
            stats: outcome.stats,
            files,
        })
    }
}
