//! Engine fundamentals: the scan orchestrator and everything it dispatches
//! over.

pub mod check;
pub mod error;
pub mod facade;
pub mod graph;
pub mod hooks;
pub mod id;
pub mod init;
pub mod listener;
pub mod package;
pub mod plan;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod session;
