use super::support::{RecordingHost, unique_temp_dir};
use crate::config::MonitorConfig;
use crate::monitor::{
    EventAggregator, HarnessPhase, LogEvent, ReportFormat, RunMonitor, RunOutput, SLEEP_MESSAGE,
    sleep_delay,
};
use crate::sim::SimTime;
use serde_json::Value;
use std::fs;

#[test]
fn sleep_delay_depends_on_speed_limit() {
    assert_eq!(sleep_delay(1.0), SimTime::from_millis(5_000));
    assert_eq!(sleep_delay(50.0), SimTime::from_millis(100_000));
    assert_eq!(sleep_delay(0.5), SimTime::from_millis(1_000));
}

#[test]
fn completed_run_writes_outputs_then_waits_for_sleep() {
    let dir = unique_temp_dir("run-monitor");
    let output = RunOutput::create(&dir, "1", ReportFormat::Full).expect("create output");
    let raw_path = output.raw_log_path().to_path_buf();
    let report_path = output.report_path().to_path_buf();

    let mut host = RecordingHost::default();
    let mut monitor =
        RunMonitor::start(EventAggregator::default(), 2, 1.0, Some(output), &mut host)
            .expect("start");
    assert_eq!(host.speed_limits, vec![1.0]);

    let events = [
        LogEvent::new(1, 1_000_000, "schedule_updater_pkt log:"),
        LogEvent::new(2, 2_000_000, "Sending 4 bytes"),
        LogEvent::new(1, 3_000_000, "pkt->type = complete"),
        LogEvent::new(2, 6_000_000, "pkt->type = complete"),
        LogEvent::new(2, 7_000_000, "Sending 4 bytes"),
    ];
    for ev in &events {
        monitor.on_mote_event(ev, &mut host).expect("event");
    }
    assert_eq!(monitor.phase(), HarnessPhase::Settling);
    assert_eq!(
        host.messages,
        vec![(SimTime::from_millis(5_000), SLEEP_MESSAGE.to_string())]
    );
    assert_eq!(host.test_ok_calls, 0);

    monitor.on_host_message("not yet", &mut host);
    assert_eq!(host.test_ok_calls, 0);
    monitor.on_host_message(SLEEP_MESSAGE, &mut host);
    assert_eq!(host.test_ok_calls, 1);
    assert_eq!(monitor.phase(), HarnessPhase::Passed);

    // 超时在通过之后到达时无事发生
    monitor.on_timeout(SimTime(9_000_000), &mut host).expect("timeout");
    assert_eq!(host.test_ok_calls, 1);

    // 结算后的日志不再写入原始日志
    let raw = fs::read_to_string(raw_path).expect("read raw log");
    assert_eq!(raw.lines().count(), 4);
    assert_eq!(raw.lines().next(), Some("1:schedule_updater_pkt log:"));

    let text = fs::read_to_string(report_path).expect("read report");
    let v: Value = serde_json::from_str(&text).expect("parse");
    assert_eq!(v["firstScheduleEventTime"], Value::from(1_000_000));
    assert_eq!(v["scheduleInstallationDurationSeconds"], Value::from(5.0));
    assert_eq!(v["perNodeStats"][1]["txCount"], Value::from(1));
    assert_eq!(v["timedOut"], Value::Bool(false));

    let report = monitor.report().expect("report");
    assert_eq!(report.completed_nodes, 2);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn timeout_before_completion_force_finalizes_and_passes() {
    let mut host = RecordingHost::default();
    let cfg = MonitorConfig::default();
    let mut monitor = RunMonitor::from_config(&cfg, 3, None, &mut host).expect("start");
    monitor
        .on_mote_event(&LogEvent::new(1, 10, "pkt->type = complete"), &mut host)
        .expect("event");
    monitor
        .on_mote_event(&LogEvent::new(3, 20, "Timer expired"), &mut host)
        .expect("event");

    monitor.on_timeout(SimTime(2_000_000), &mut host).expect("timeout");
    assert_eq!(monitor.phase(), HarnessPhase::Passed);
    assert_eq!(host.test_ok_calls, 1);
    assert!(host.messages.is_empty());

    let report = monitor.into_report().expect("partial report");
    assert!(report.timed_out);
    assert_eq!(report.completed_nodes, 1);
    assert_eq!(report.per_node_stats[2].timeout_count, 1);
    assert_eq!(report.schedule_installation_duration_seconds, 2.0);
}

#[test]
fn timeout_while_settling_skips_the_wait() {
    let mut host = RecordingHost::default();
    let mut monitor =
        RunMonitor::start(EventAggregator::default(), 1, 4.0, None, &mut host).expect("start");
    monitor
        .on_mote_event(&LogEvent::new(1, 10, "pkt->type = complete"), &mut host)
        .expect("event");
    assert_eq!(host.messages[0].0, SimTime::from_millis(8_000));
    monitor.on_timeout(SimTime(20), &mut host).expect("timeout");
    assert_eq!(host.test_ok_calls, 1);
    assert!(!monitor.report().expect("report").timed_out);
}
