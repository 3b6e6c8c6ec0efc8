use crate::monitor::HostControl;
use crate::sim::SimTime;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// 记录控制信号的假宿主
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    pub speed_limits: Vec<f64>,
    pub messages: Vec<(SimTime, String)>,
    pub test_ok_calls: usize,
}

impl HostControl for RecordingHost {
    fn set_speed_limit(&mut self, speed_limit: f64) {
        self.speed_limits.push(speed_limit);
    }

    fn generate_message(&mut self, delay: SimTime, message: &str) {
        self.messages.push((delay, message.to_string()));
    }

    fn test_ok(&mut self) {
        self.test_ok_calls += 1;
    }
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "motelog-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
