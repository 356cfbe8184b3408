// SPDX-License-Identifier: Apache-2.0

//! Tech debt issue commands.

use anyhow::Result;
use techdebt_core::{FilterSpec, Session, parse_issue_number};
use tracing::debug;

use super::with_spinner;
use crate::cli::{IssueCommand, OutputContext};
use crate::commands::types::{
    CommentResult, CommentsResult, IssueAction, IssueActionResult, IssueListResult,
    IssueViewResult,
};
use crate::output;
use crate::prompt::prompt_title;

/// Initializes the session and returns the `owner/name` it resolved.
async fn connect(session: &Session) -> Result<String> {
    session.initialize().await?;
    let repository = session
        .repository()
        .map(|r| r.to_string())
        .unwrap_or_default();
    debug!(%repository, "Session ready");
    Ok(repository)
}

/// Dispatch an issue subcommand.
///
/// Arguments are parsed before the session is initialized so bad input
/// fails without touching the network.
#[allow(clippy::too_many_lines)]
pub async fn run(command: IssueCommand, ctx: &OutputContext, session: &Session) -> Result<()> {
    match command {
        IssueCommand::Create { title, body } => {
            let title = match title {
                Some(title) => title,
                None if ctx.can_prompt() => prompt_title()?,
                None => anyhow::bail!("Missing issue title. Use --title to provide one."),
            };

            let repository = connect(session).await?;
            let issue = with_spinner(ctx, "Creating issue...", session.create_issue(&title, &body))
                .await?;
            output::render(
                &IssueActionResult {
                    repository,
                    action: IssueAction::Created,
                    issue,
                },
                ctx,
            )
        }

        IssueCommand::List {
            state,
            assignee,
            creator,
        } => {
            let filter = FilterSpec {
                state: state.into(),
                assignee,
                creator,
            };

            let repository = connect(session).await?;
            let issues =
                with_spinner(ctx, "Fetching issues...", session.list_issues(&filter)).await?;
            output::render(
                &IssueListResult {
                    repository,
                    query: None,
                    issues,
                },
                ctx,
            )
        }

        IssueCommand::View { number } => {
            let number = parse_issue_number(&number)?;

            let repository = connect(session).await?;
            let issue = with_spinner(ctx, "Fetching issue...", session.get_issue(number)).await?;
            output::render(&IssueViewResult { repository, issue }, ctx)
        }

        IssueCommand::Comments { number } => {
            let number = parse_issue_number(&number)?;

            let repository = connect(session).await?;
            let comments =
                with_spinner(ctx, "Fetching comments...", session.list_comments(number)).await?;
            output::render(
                &CommentsResult {
                    repository,
                    number,
                    comments,
                },
                ctx,
            )
        }

        IssueCommand::Comment { number, body } => {
            let number = parse_issue_number(&number)?;

            let repository = connect(session).await?;
            let comment =
                with_spinner(ctx, "Posting comment...", session.add_comment(number, &body))
                    .await?;
            output::render(
                &CommentResult {
                    repository,
                    number,
                    comment,
                },
                ctx,
            )
        }

        IssueCommand::Edit {
            number,
            title,
            body,
        } => {
            let number = parse_issue_number(&number)?;
            if title.is_none() && body.is_none() {
                anyhow::bail!("Nothing to change. Use --title and/or --body.");
            }

            let repository = connect(session).await?;
            let issue = with_spinner(
                ctx,
                "Updating issue...",
                session.edit_issue(number, title.as_deref(), body.as_deref()),
            )
            .await?;
            output::render(
                &IssueActionResult {
                    repository,
                    action: IssueAction::Updated,
                    issue,
                },
                ctx,
            )
        }

        IssueCommand::Close { number } => {
            let number = parse_issue_number(&number)?;

            let repository = connect(session).await?;
            let issue = with_spinner(ctx, "Closing issue...", session.close_issue(number)).await?;
            output::render(
                &IssueActionResult {
                    repository,
                    action: IssueAction::Closed,
                    issue,
                },
                ctx,
            )
        }

        IssueCommand::Reopen { number } => {
            let number = parse_issue_number(&number)?;

            let repository = connect(session).await?;
            let issue =
                with_spinner(ctx, "Reopening issue...", session.reopen_issue(number)).await?;
            output::render(
                &IssueActionResult {
                    repository,
                    action: IssueAction::Reopened,
                    issue,
                },
                ctx,
            )
        }

        IssueCommand::Search { query } => {
            let query = query.join(" ");

            let repository = connect(session).await?;
            let issues =
                with_spinner(ctx, "Searching issues...", session.search_issues(&query)).await?;
            output::render(
                &IssueListResult {
                    repository,
                    query: Some(query),
                    issues,
                },
                ctx,
            )
        }
    }
}
