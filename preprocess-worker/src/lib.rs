pub mod config;
pub mod dispatch;
pub mod error;
pub mod runner;
pub mod variants;
