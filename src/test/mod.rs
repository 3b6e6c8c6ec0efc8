mod output;
mod run_monitor;
mod simulator;
mod support;
