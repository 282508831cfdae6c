pub mod commands;
pub mod repository;
#[cfg(test)]
pub mod testutil;

pub use commands::{DiffFlags, GitCli};
pub use repository::preflight;
