use std::collections::VecDeque;
use std::sync::Mutex;

use super::Ui;
use crate::error::{AppError, Result};
use crate::filesystem::DirectoryGroup;

#[derive(Debug, Clone)]
pub(crate) enum Answer {
    Select(Option<usize>),
    MultiSelect(Vec<usize>),
    Text(String),
    Confirm(bool),
}

/// Replays queued answers and records everything shown. Running out of
/// answers behaves like a closed stdin.
#[derive(Default)]
pub(crate) struct ScriptedUi {
    answers: Mutex<VecDeque<Answer>>,
    pub menus: Mutex<Vec<(String, Vec<String>)>>,
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub texts: Mutex<Vec<(String, String)>>,
    pub trees: Mutex<Vec<(String, Vec<DirectoryGroup>)>>,
    pub progress: Mutex<Vec<(u64, u64, String)>>,
}

impl ScriptedUi {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn menus(&self) -> Vec<(String, Vec<String>)> {
        self.menus.lock().unwrap().clone()
    }

    fn next(&self) -> Result<Answer> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(AppError::UserCancelled)
    }
}

impl Ui for ScriptedUi {
    fn select(&self, title: &str, items: &[String]) -> Result<Option<usize>> {
        self.menus
            .lock()
            .unwrap()
            .push((title.to_string(), items.to_vec()));
        match self.next()? {
            Answer::Select(pick) => Ok(pick),
            other => panic!("expected a selection answer, got {other:?}"),
        }
    }

    fn multi_select(&self, title: &str, items: &[String]) -> Result<Vec<usize>> {
        self.menus
            .lock()
            .unwrap()
            .push((title.to_string(), items.to_vec()));
        match self.next()? {
            Answer::MultiSelect(picks) => Ok(picks.into_iter().filter(|i| *i < items.len()).collect()),
            other => panic!("expected a multi-selection answer, got {other:?}"),
        }
    }

    fn prompt(&self, _message: &str, default: Option<&str>) -> Result<String> {
        match self.next()? {
            Answer::Text(text) if text.is_empty() => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(text) => Ok(text),
            other => panic!("expected a text answer, got {other:?}"),
        }
    }

    fn prompt_secret(&self, message: &str) -> Result<String> {
        self.prompt(message, None)
    }

    fn confirm(&self, _message: &str) -> Result<bool> {
        match self.next()? {
            Answer::Confirm(yes) => Ok(yes),
            other => panic!("expected a confirmation answer, got {other:?}"),
        }
    }

    fn progress(&self, current: u64, total: u64, label: &str) {
        self.progress
            .lock()
            .unwrap()
            .push((current, total, label.to_string()));
    }

    fn tree(&self, root: &str, groups: &[DirectoryGroup]) {
        self.trees
            .lock()
            .unwrap()
            .push((root.to_string(), groups.to_vec()));
    }

    fn show_text(&self, title: &str, body: &str) {
        self.texts
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }

    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn report_error(&self, error: &AppError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}
