use super::support::unique_temp_dir;
use crate::monitor::{
    EventAggregator, LogEvent, ReportFormat, RunOutput, render_report, report_path,
};
use crate::sim::SimTime;
use serde_json::Value;
use std::fs;

fn sample_report() -> crate::monitor::Report {
    let agg = EventAggregator::default();
    let mut state = agg.initialize(2, 2.0).expect("initialize");
    agg.finalize_early(&mut state, SimTime(4_000_000))
        .expect("finalize early")
}

#[test]
fn output_writes_raw_lines_and_pretty_report() {
    let dir = unique_temp_dir("output");
    let mut out = RunOutput::create(&dir, "42", ReportFormat::Full).expect("create output");
    assert!(out.raw_log_path().ends_with("simulation42.log"));
    assert!(out.report_path().ends_with("simulation-stats42.json"));

    out.append(&LogEvent::new(1, 0, "Sending 8 bytes")).expect("append");
    out.append(&LogEvent::new(2, 5, "a:b:c")).expect("append");
    let raw_path = out.raw_log_path().to_path_buf();
    let report = sample_report();
    out.finish(&report).expect("finish");

    let raw = fs::read_to_string(&raw_path).expect("read raw log");
    assert_eq!(raw, "1:Sending 8 bytes\n2:a:b:c\n");
    assert_eq!(
        raw.lines().last(),
        Some(LogEvent::new(2, 5, "a:b:c").raw_line().as_str())
    );

    let text = fs::read_to_string(report_path(&dir, "42")).expect("read report");
    assert!(text.contains("\n    \"firstScheduleEventTime\": null"));
    let v: Value = serde_json::from_str(&text).expect("parse report");
    assert_eq!(v["speedLimit"], Value::from(2.0));
    assert_eq!(v["perNodeStats"].as_array().map(Vec::len), Some(2));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn legacy_format_uses_flat_arrays() {
    let report = sample_report();
    let text = render_report(&report, ReportFormat::Legacy).expect("render");
    let v: Value = serde_json::from_str(&text).expect("parse");
    assert_eq!(v["firstScheduleMsgTime"], Value::from(0));
    assert_eq!(v["tx"], serde_json::json!([0, 0]));
    assert_eq!(v["rx"], serde_json::json!([0, 0]));
    assert_eq!(v["timeouts"], serde_json::json!([0, 0]));
    assert_eq!(v["scheduleInstallationTime"], Value::from(2.0));
    assert!(v.get("perNodeStats").is_none());
}

#[test]
fn dropping_unfinished_output_flushes_raw_log() {
    let dir = unique_temp_dir("output-drop");
    let raw_path = {
        let mut out = RunOutput::create(&dir, "7", ReportFormat::Full).expect("create output");
        out.append(&LogEvent::new(3, 0, "Hello")).expect("append");
        out.raw_log_path().to_path_buf()
    };
    assert_eq!(fs::read_to_string(raw_path).expect("read raw log"), "3:Hello\n");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn rendered_report_is_utf8_with_four_space_indent() {
    let mut report = sample_report();
    report.per_node_stats[0]
        .neighbor_link_stats
        .insert("邻居-1".to_string(), serde_json::Map::new());
    let text = render_report(&report, ReportFormat::Full).expect("render");
    assert!(text.starts_with("{\n    \"firstScheduleEventTime\""));
    assert!(text.contains("\"邻居-1\": {}"));
    let v: Value = serde_json::from_str(&text).expect("parse");
    assert!(v["perNodeStats"][0]["neighborLinkStats"].get("邻居-1").is_some());
}
