//! Terminal implementation of the scanner's `Interaction` collaborator
//!
//! Values given on the command line are used as-is. Anything missing is
//! requested with a `dialoguer` prompt when prompting is allowed; otherwise the
//! selection is treated as cancelled.

use std::io::IsTerminal;
use std::path::PathBuf;

use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use tracing::debug;

use certpost_core::pipeline::Interaction;
use certpost_core::types::MessageKind;

/// Terminal-backed directory/destination selection and user messages.
pub struct TerminalInteraction {
    directory: Option<PathBuf>,
    destination: Option<PathBuf>,
    default_file_name: String,
    can_prompt: bool,
}

impl TerminalInteraction {
    /// Create an interaction with optional preset values.
    ///
    /// Prompting is enabled only when `allow_prompt` is set and stdin/stderr are terminals.
    pub fn new(
        directory: Option<PathBuf>,
        destination: Option<PathBuf>,
        default_file_name: impl Into<String>,
        allow_prompt: bool,
    ) -> Self {
        let can_prompt =
            allow_prompt && std::io::stdin().is_terminal() && std::io::stderr().is_terminal();
        Self {
            directory,
            destination,
            default_file_name: default_file_name.into(),
            can_prompt,
        }
    }

    /// Whether prompts will be shown.
    pub fn can_prompt(&self) -> bool {
        self.can_prompt
    }

    /// Ask whether a failed save should be retried with a new destination.
    ///
    /// Returns `None` when the user declines or prompting is not possible.
    pub fn ask_retry_destination(&self) -> Option<PathBuf> {
        if !self.can_prompt {
            return None;
        }

        let retry = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Save the report to another location?")
            .default(true)
            .interact_opt()
            .ok()
            .flatten()?;

        if !retry {
            return None;
        }
        self.prompt_path("Report file", Some(&self.default_file_name))
    }

    fn prompt_path(&self, prompt: &str, default: Option<&str>) -> Option<PathBuf> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_owned()).show_default(true);
        }

        match input.interact_text() {
            Ok(value) => non_empty_path(&value),
            Err(e) => {
                debug!(error = %e, "prompt aborted");
                None
            }
        }
    }
}

impl Interaction for TerminalInteraction {
    fn select_directory(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.directory {
            return Some(dir.clone());
        }
        if !self.can_prompt {
            return None;
        }
        self.prompt_path("Directory with certificates", None)
    }

    fn select_destination(&self) -> Option<PathBuf> {
        if let Some(dest) = &self.destination {
            return Some(dest.clone());
        }
        if !self.can_prompt {
            return None;
        }
        self.prompt_path("Report file", Some(&self.default_file_name))
    }

    fn show_message(&self, kind: MessageKind, text: &str) {
        eprintln!("{}", format_message(kind, text));
    }
}

/// Prefix a message with a coloured severity tag.
pub fn format_message(kind: MessageKind, text: &str) -> String {
    let tag = match kind {
        MessageKind::Info => "info:".green().bold(),
        MessageKind::Warning => "warning:".yellow().bold(),
        MessageKind::Error => "error:".red().bold(),
    };
    format!("{tag} {text}")
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}
