// SPDX-License-Identifier: Apache-2.0

//! Command handlers for Techdebt CLI.

pub mod auth;
pub mod issue;
pub mod repo;
pub mod types;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use techdebt_core::{
    AppConfig, ManualPrompt, RepositoryResolver, Session, TechDebtError, TokenChain,
};
use tracing::debug;

use crate::cli::{AuthCommand, Commands, OutputContext, RepoCommand};
use crate::output;
use crate::prompt::TerminalPrompt;

/// Creates a styled spinner (only if interactive).
fn maybe_spinner(ctx: &OutputContext, message: &str) -> Option<ProgressBar> {
    if ctx.is_interactive() {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        s.set_message(message.to_string());
        s.enable_steady_tick(Duration::from_millis(100));
        Some(s)
    } else {
        None
    }
}

/// Awaits `fut` behind a spinner.
async fn with_spinner<T, F>(ctx: &OutputContext, message: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T, TechDebtError>>,
{
    let spinner = maybe_spinner(ctx, message);
    let result = fut.await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    Ok(result?)
}

/// Manual repository entry, offered only on an interactive terminal.
fn manual_prompt(ctx: &OutputContext) -> Option<Arc<dyn ManualPrompt>> {
    if ctx.can_prompt() {
        Some(Arc::new(TerminalPrompt))
    } else {
        None
    }
}

/// Resolver over the standard sources for `workspace`.
fn resolver(workspace: &Path, ctx: &OutputContext) -> RepositoryResolver {
    RepositoryResolver::for_workspace(workspace, manual_prompt(ctx))
}

/// Builds the session owned by this invocation.
fn build_session(workspace: &Path, config: AppConfig, ctx: &OutputContext) -> Session {
    debug!(workspace = %workspace.display(), "Building session");
    Session::builder()
        .credentials(Arc::new(TokenChain))
        .resolver(resolver(workspace, ctx))
        .config(config)
        .build()
}

/// Dispatch to the appropriate command handler.
pub async fn run(
    command: Commands,
    ctx: OutputContext,
    config: AppConfig,
    workspace: &Path,
) -> Result<()> {
    match command {
        Commands::Auth(auth_cmd) => match auth_cmd {
            AuthCommand::Status => {
                let result = auth::run_status().await;
                output::render(&result, &ctx)
            }
        },

        Commands::Repo(repo_cmd) => match repo_cmd {
            RepoCommand::Show => {
                let result = repo::run_show(&resolver(workspace, &ctx)).await?;
                output::render(&result, &ctx)
            }
        },

        Commands::Issue(issue_cmd) => {
            let session = build_session(workspace, config, &ctx);
            issue::run(issue_cmd, &ctx, &session).await
        }
    }
}
