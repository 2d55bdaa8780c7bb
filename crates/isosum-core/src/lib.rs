pub mod config;
pub mod logging;

pub mod algorithm;
pub mod control;
pub mod dispatch;
pub mod enumerate;
pub mod error;
pub mod hasher;
pub mod progress;
pub mod report;
pub mod retry;
pub mod scan;
pub mod task;
