pub mod cli;
pub mod commands;
pub mod config;
mod context;
mod error;
pub mod filesystem;
pub mod menu;
pub mod transfer;
pub mod ui;
mod utils;

// Re-export commonly used types
pub use context::AppContext;
pub use error::{AppError, Result};
pub use utils::{expand_tilde, init_panic_hook, init_tracing, restore_terminal};
