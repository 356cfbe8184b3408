// SPDX-License-Identifier: Apache-2.0

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use console::style;
use std::io::{self, Write};
use techdebt_core::{IssueRef, IssueState};

use crate::cli::OutputContext;
use crate::commands::types::{
    CommentResult, CommentsResult, IssueAction, IssueActionResult, IssueListResult,
    IssueViewResult,
};

use super::Renderable;

fn state_cell(state: IssueState) -> Cell {
    match state {
        IssueState::Open => Cell::new("open").fg(Color::Green),
        IssueState::Closed => Cell::new("closed").fg(Color::Magenta),
    }
}

fn issue_table(issues: &[IssueRef]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "State", "Title"]);

    for issue in issues {
        table.add_row(vec![
            Cell::new(issue.number),
            state_cell(issue.state),
            Cell::new(&issue.title),
        ]);
    }
    table
}

impl Renderable for IssueListResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.issues.is_empty() {
            let msg = match &self.query {
                Some(query) => format!("No tech debt issues match '{query}'."),
                None => "No tech debt issues found.".to_string(),
            };
            writeln!(w, "{}", style(msg).yellow())?;
            return Ok(());
        }

        let heading = match &self.query {
            Some(query) => format!(
                "{} issues in {} matching '{query}':",
                self.issues.len(),
                self.repository
            ),
            None => format!(
                "{} tech debt issues in {}:",
                self.issues.len(),
                self.repository
            ),
        };
        writeln!(w, "{}", style(heading).bold())?;
        writeln!(w, "{}", issue_table(&self.issues))?;
        Ok(())
    }
}

impl Renderable for IssueActionResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let verb = match self.action {
            IssueAction::Created => "Created",
            IssueAction::Updated => "Updated",
            IssueAction::Closed => "Closed",
            IssueAction::Reopened => "Reopened",
        };
        writeln!(
            w,
            "{} {verb} {} {}",
            style("*").green().bold(),
            style(format!("#{}", self.issue.number)).green(),
            self.issue.title
        )?;
        writeln!(w, "  {}", style(&self.issue.url).dim())?;
        Ok(())
    }
}

impl Renderable for IssueViewResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let issue = &self.issue;
        writeln!(
            w,
            "{} {}",
            style(format!("#{}", issue.number)).green().bold(),
            style(&issue.title).bold()
        )?;
        writeln!(
            w,
            "{} opened by {} on {} · {} comments",
            issue.state,
            style(&issue.author).cyan(),
            issue.created_at.format("%Y-%m-%d"),
            issue.comments
        )?;
        if !issue.labels.is_empty() {
            writeln!(w, "Labels: {}", issue.labels.join(", "))?;
        }
        if !issue.assignees.is_empty() {
            writeln!(w, "Assignees: {}", issue.assignees.join(", "))?;
        }
        writeln!(w)?;
        if issue.body.trim().is_empty() {
            writeln!(w, "{}", style("No description provided.").dim())?;
        } else {
            writeln!(w, "{}", issue.body.trim_end())?;
        }
        writeln!(w)?;
        writeln!(w, "{}", style(&issue.url).dim())?;
        Ok(())
    }
}

impl Renderable for CommentsResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.comments.is_empty() {
            writeln!(w, "{}", style(format!("No comments on #{}.", self.number)).yellow())?;
            return Ok(());
        }

        for comment in &self.comments {
            writeln!(
                w,
                "{} {}",
                style(&comment.author).cyan().bold(),
                style(comment.created_at.format("%Y-%m-%d %H:%M")).dim()
            )?;
            for line in comment.body.lines() {
                writeln!(w, "  {line}")?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

impl Renderable for CommentResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(
            w,
            "{} Commented on #{}",
            style("*").green().bold(),
            self.number
        )?;
        writeln!(w, "  {}", style(&self.comment.url).dim())?;
        Ok(())
    }
}
