//! Operator-facing surface.
//!
//! The core only hands plain data to a [`Ui`]: lists to choose from, prompts,
//! progress counters and grouped listings. Formatting is up to the
//! implementation.

mod console;
#[cfg(test)]
pub(crate) mod scripted;

pub use console::ConsoleUi;

use crate::error::{AppError, Result};
use crate::filesystem::DirectoryGroup;

pub trait Ui: Send + Sync {
    /// Pick one entry. `None` means the input was not a number; an index past
    /// the end of `items` is passed through for the caller to reject.
    fn select(&self, title: &str, items: &[String]) -> Result<Option<usize>>;

    /// Pick any number of entries; out-of-range picks are dropped.
    fn multi_select(&self, title: &str, items: &[String]) -> Result<Vec<usize>>;

    /// Free text. An empty answer yields `default` when one is given.
    fn prompt(&self, message: &str, default: Option<&str>) -> Result<String>;

    /// Free text without echo.
    fn prompt_secret(&self, message: &str) -> Result<String>;

    fn confirm(&self, message: &str) -> Result<bool>;

    fn progress(&self, current: u64, total: u64, label: &str);

    /// Hierarchical listing: each group is a directory and the names below it.
    fn tree(&self, root: &str, groups: &[DirectoryGroup]);

    fn show_text(&self, title: &str, body: &str);

    fn info(&self, message: &str);

    fn report_error(&self, error: &AppError);
}
