pub mod analysis;
pub mod cli;
pub mod core;
pub mod experiences;
pub mod file_utils;
pub mod web;

pub use cli::{handle_command, Cli};
pub use web::{build_rocket, start_web_server};
