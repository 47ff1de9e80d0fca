pub mod cli;
pub mod commands;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod planner;
pub mod render;
pub mod storage;
pub mod study;
pub mod types;
