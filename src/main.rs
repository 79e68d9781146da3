use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use ulearning_export::utils::logging;
use ulearning_export::{App, Config};

/// 优学院练习题导出
#[derive(Parser)]
#[command(name = "ulearning_export", version, about = "导出优学院练习题为题库 JSON")]
struct Cli {
    /// 配置文件（默认读取当前目录下的 ulearning.toml）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 练习页面 URL，形如 …#/questionTrain/practice/{qtId}/{ocId}/{qtType}
    #[arg(long)]
    url: Option<String>,

    /// 输出目录
    #[arg(long, short)]
    output: Option<String>,

    /// 额外导出原始数据
    #[arg(long)]
    raw: bool,

    /// 额外导出可读文本
    #[arg(long)]
    txt: bool,

    /// 最多探测的题目数
    #[arg(long)]
    probe_limit: Option<usize>,

    /// 不探测标准答案，只使用答题卡记录
    #[arg(long)]
    no_probe: bool,

    /// 显示详细日志
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    /// 命令行参数覆盖配置
    fn apply(self, mut config: Config) -> Config {
        if let Some(url) = self.url {
            config.practice_url = Some(url);
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(limit) = self.probe_limit {
            config.probe_limit = Some(limit);
        }
        config.export_raw |= self.raw;
        config.export_txt |= self.txt;
        config.verbose_logging |= self.verbose;
        if self.no_probe {
            config.probe_enabled = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref())?;
    let config = cli.apply(config);

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
