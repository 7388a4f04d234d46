//! CLI subcommands.

pub mod check;
pub mod common;
pub mod distance;
pub mod replay;
