//! 运行输出
//!
//! 每次运行两份文件，都在运行开始时打开：原始日志 `simulation<stamp>.log`
//! 和报告 `simulation-stats<stamp>.json`。`finish` 消费自身，保证各关闭一次。

use super::event::LogEvent;
use super::stats::Report;
use crate::error::MonitorResult;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 报告的 JSON 布局
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Full,
    /// 早期脚本的扁平数组格式
    Legacy,
}

pub fn raw_log_path(dir: &Path, stamp: &str) -> PathBuf {
    dir.join(format!("simulation{stamp}.log"))
}

pub fn report_path(dir: &Path, stamp: &str) -> PathBuf {
    dir.join(format!("simulation-stats{stamp}.json"))
}

/// 一次运行的输出文件
#[derive(Debug)]
pub struct RunOutput {
    raw_log: BufWriter<File>,
    report: File,
    format: ReportFormat,
    raw_log_path: PathBuf,
    report_path: PathBuf,
    lines: u64,
}

impl RunOutput {
    /// 在 `dir` 下创建两份输出文件（目录不存在时一并创建）。
    pub fn create(dir: &Path, stamp: &str, format: ReportFormat) -> MonitorResult<Self> {
        fs::create_dir_all(dir)?;
        let raw_log_path = raw_log_path(dir, stamp);
        let report_path = report_path(dir, stamp);
        let raw_log = BufWriter::new(File::create(&raw_log_path)?);
        let report = File::create(&report_path)?;
        debug!(
            raw_log = %raw_log_path.display(),
            report = %report_path.display(),
            "输出文件已打开"
        );
        Ok(Self {
            raw_log,
            report,
            format,
            raw_log_path,
            report_path,
            lines: 0,
        })
    }

    pub fn raw_log_path(&self) -> &Path {
        &self.raw_log_path
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// 追加一行 `<nodeId>:<message>`
    pub fn append(&mut self, event: &LogEvent) -> MonitorResult<()> {
        writeln!(self.raw_log, "{}", event.raw_line())?;
        self.lines += 1;
        Ok(())
    }

    /// 写出报告并关闭两份文件。
    pub fn finish(self, report: &Report) -> MonitorResult<()> {
        let RunOutput {
            mut raw_log,
            report: mut report_file,
            format,
            raw_log_path,
            report_path,
            lines,
        } = self;

        let mut json = render_report(report, format)?;
        json.push('\n');
        report_file.write_all(json.as_bytes())?;
        report_file.sync_all()?;
        raw_log.flush()?;

        info!(
            raw_log = %raw_log_path.display(),
            report = %report_path.display(),
            lines,
            ?format,
            "📝 输出已写入"
        );
        Ok(())
    }
}

/// 以 4 空格缩进渲染报告。
pub fn render_report(report: &Report, format: ReportFormat) -> MonitorResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match format {
        ReportFormat::Full => report.serialize(&mut ser)?,
        ReportFormat::Legacy => report.to_legacy().serialize(&mut ser)?,
    }
    String::from_utf8(buf)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}
