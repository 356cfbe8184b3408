// SPDX-License-Identifier: Apache-2.0

//! Terminal prompts.
//!
//! Manual repository entry and the interactive issue title, both via
//! `dialoguer`. Only used when stdin and stdout are terminals.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dialoguer::Input;
use techdebt_core::sanitize::MAX_TITLE_CHARS;
use techdebt_core::{ManualPrompt, PromptField};
use tracing::debug;

/// Asks for the repository owner and name on the terminal.
pub struct TerminalPrompt;

#[async_trait]
impl ManualPrompt for TerminalPrompt {
    async fn ask(&self, field: PromptField) -> Option<String> {
        let label = match field {
            PromptField::Owner => "Repository owner (user or organization)",
            PromptField::Repository => "Repository name",
        };

        let answer = tokio::task::spawn_blocking(move || {
            Input::<String>::new()
                .with_prompt(label)
                .allow_empty(true)
                .interact_text()
        })
        .await;

        match answer {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                debug!(error = %e, "Prompt cancelled");
                None
            }
            Err(e) => {
                debug!(error = %e, "Prompt task failed");
                None
            }
        }
    }
}

/// Prompt user for issue title interactively.
///
/// # Errors
///
/// Returns error if not in TTY or user cancels input.
pub fn prompt_title() -> Result<String> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Interactive mode requires a terminal. Use --title flag instead.");
    }

    let title = Input::<String>::new()
        .with_prompt("Issue title")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Title cannot be empty")
            } else if input.chars().count() > MAX_TITLE_CHARS {
                Err("Title must be 256 characters or less")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read title from input")?;

    Ok(title)
}
