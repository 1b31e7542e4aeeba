pub mod checks;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod exit;
pub mod logs;
pub mod platform;
pub mod remediate;
pub mod remote;
pub mod ui;
