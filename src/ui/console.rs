use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Stylize};
use crossterm::terminal;

use super::Ui;
use crate::error::{AppError, Result};
use crate::filesystem::DirectoryGroup;

const PROGRESS_WIDTH: usize = 30;
const ACCENT: Color = Color::Rgb {
    r: 0x08,
    g: 0xd9,
    b: 0xd6,
};

/// Line-oriented console on stdin/stdout.
///
/// Reads block the calling worker through `block_in_place`, so this must run
/// on the multi-threaded runtime.
#[derive(Debug, Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }

    fn accent(&self) -> Color {
        ACCENT
    }

    fn read_line(&self) -> Result<String> {
        let mut line = String::new();
        let read = tokio::task::block_in_place(|| io::stdin().lock().read_line(&mut line))?;
        if read == 0 {
            // stdin closed, nobody left to answer
            return Err(AppError::UserCancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn write_prompt(&self, message: &str) -> Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "{} ", message.with(self.accent()).bold())?;
        stdout.flush()?;
        Ok(())
    }

    fn print_numbered(&self, title: &str, items: &[String]) {
        println!("{}", "─".repeat(48).dark_grey());
        println!("{}", title.bold());
        for (index, item) in items.iter().enumerate() {
            let color = if index % 2 == 0 {
                self.accent()
            } else {
                Color::Magenta
            };
            println!(
                "{:>5}  {}",
                (index + 1).to_string().with(color),
                item.as_str().with(color)
            );
        }
        println!("{}", "─".repeat(48).dark_grey());
    }

    fn read_secret(&self) -> Result<String> {
        tokio::task::block_in_place(|| {
            terminal::enable_raw_mode()?;
            let result = read_secret_keys();
            terminal::disable_raw_mode()?;
            println!();
            result
        })
    }
}

fn read_secret_keys() -> Result<String> {
    let mut secret = String::new();
    loop {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            match code {
                KeyCode::Enter => return Ok(secret),
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(AppError::UserCancelled);
                }
                KeyCode::Char(ch) => secret.push(ch),
                KeyCode::Esc => return Err(AppError::UserCancelled),
                _ => {}
            }
        }
    }
}

impl Ui for ConsoleUi {
    fn select(&self, title: &str, items: &[String]) -> Result<Option<usize>> {
        self.print_numbered(title, items);
        self.write_prompt("Enter a number:")?;
        let answer = self.read_line()?;
        Ok(match answer.trim().parse::<usize>() {
            Ok(number) if number > 0 => Some(number - 1),
            _ => None,
        })
    }

    fn multi_select(&self, title: &str, items: &[String]) -> Result<Vec<usize>> {
        self.print_numbered(title, items);
        self.write_prompt("Enter numbers separated by commas or spaces:")?;
        let answer = self.read_line()?;
        let mut picked = Vec::new();
        for token in answer.split([',', ' ']).filter(|t| !t.is_empty()) {
            if let Ok(number) = token.trim().parse::<usize>()
                && number > 0
                && number <= items.len()
                && !picked.contains(&(number - 1))
            {
                picked.push(number - 1);
            }
        }
        Ok(picked)
    }

    fn prompt(&self, message: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(default) => self.write_prompt(&format!("{message} [{default}]:"))?,
            None => self.write_prompt(message)?,
        }
        let answer = self.read_line()?;
        match default {
            Some(default) if answer.trim().is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn prompt_secret(&self, message: &str) -> Result<String> {
        self.write_prompt(message)?;
        self.read_secret()
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        loop {
            self.write_prompt(&format!("{message} [y/n]"))?;
            match self.read_line()?.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => continue,
            }
        }
    }

    fn progress(&self, current: u64, total: u64, label: &str) {
        let ratio = if total > 0 {
            (current as f64 / total as f64).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let filled = (ratio * PROGRESS_WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(PROGRESS_WIDTH - filled)
        );
        let mut stdout = io::stdout();
        let _ = write!(
            stdout,
            "\r{} {} {:>3}%",
            bar.with(self.accent()),
            label,
            (ratio * 100.0) as u32
        );
        if current >= total {
            let _ = writeln!(stdout);
        }
        let _ = stdout.flush();
    }

    fn tree(&self, root: &str, groups: &[DirectoryGroup]) {
        println!("{}", root.bold());
        for (index, group) in groups.iter().enumerate() {
            let last_group = index + 1 == groups.len();
            let (branch, indent) = if last_group {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            println!("{}{}", branch, group.dir.as_str().with(self.accent()));
            for (pos, name) in group.entries.iter().enumerate() {
                let leaf = if pos + 1 == group.entries.len() {
                    "└── "
                } else {
                    "├── "
                };
                println!("{indent}{leaf}{name}");
            }
        }
    }

    fn show_text(&self, title: &str, body: &str) {
        println!("{}", format!("┌─ {title}").with(self.accent()));
        for line in body.lines() {
            println!("│ {line}");
        }
        println!("{}", "└─".with(self.accent()));
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn report_error(&self, error: &AppError) {
        eprintln!("{} {}", "error:".red().bold(), error);
    }
}
