//! CLI commands

pub mod get;
pub mod lifecycle;
pub mod versions;
