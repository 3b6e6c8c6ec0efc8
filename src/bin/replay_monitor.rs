//! 日志回放监视
//!
//! 回放一份录制的节点日志，按测试脚本的规则统计并写出原始日志和报告。

use clap::Parser;
use motelog_rs::config::MonitorConfig;
use motelog_rs::error::MonitorResult;
use motelog_rs::host::{ReplayHost, ReplayOutcome, read_trace};
use motelog_rs::monitor::{ReportFormat, RunOutput};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "replay-monitor",
    about = "回放节点日志 trace，输出每个节点的收发/超时统计"
)]
struct Args {
    /// trace 文件（每行 `<时间戳>\tID:<节点号>\t<消息>`）
    #[arg(long)]
    trace: PathBuf,

    /// JSON 配置文件；命令行参数优先
    #[arg(long)]
    config: Option<PathBuf>,

    /// 节点总数；缺省取 trace 中最大的节点号
    #[arg(long)]
    nodes: Option<usize>,

    #[arg(long)]
    speed_limit: Option<f64>,

    /// 宿主绝对超时（仿真毫秒）
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// 输出文件名里的运行标识，缺省为当前 Unix 毫秒时间戳
    #[arg(long)]
    run_id: Option<String>,

    /// 按早期脚本的扁平格式写报告
    #[arg(long)]
    legacy_report: bool,
}

fn build_config(args: &Args) -> MonitorResult<MonitorConfig> {
    let mut cfg = match &args.config {
        Some(path) => MonitorConfig::from_json_file(path)?,
        None => MonitorConfig::default(),
    };
    if let Some(n) = args.nodes {
        cfg.total_nodes = Some(n);
    }
    if let Some(s) = args.speed_limit {
        cfg.speed_limit = s;
    }
    if let Some(t) = args.timeout_ms {
        cfg.timeout_ms = t;
    }
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
    }
    if args.legacy_report {
        cfg.report_format = ReportFormat::Legacy;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run_stamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
        .to_string()
}

fn run(args: Args) -> MonitorResult<ReplayOutcome> {
    let cfg = build_config(&args)?;
    let events = read_trace(&args.trace)?;
    info!(trace = %args.trace.display(), events = events.len(), "读取 trace");

    let stamp = args.run_id.clone().unwrap_or_else(run_stamp);
    let output = RunOutput::create(&cfg.output_dir, &stamp, cfg.report_format)?;
    ReplayHost::new(cfg).run(events, Some(output))
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(outcome) => {
            let Some(report) = outcome.report else {
                eprintln!("replay ended without a report");
                return ExitCode::FAILURE;
            };
            println!(
                "done @ {:?}, passed={}, timed_out={}, completed={}/{}, tx={}, rx={}, timeouts={}, schedule_installation_s={:.6}",
                outcome.finished_at,
                outcome.control.passed(),
                report.timed_out,
                report.completed_nodes,
                report.total_nodes,
                report.total_tx(),
                report.total_rx(),
                report.total_timeouts(),
                report.schedule_installation_duration_seconds
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("replay-monitor: {err}");
            ExitCode::FAILURE
        }
    }
}
