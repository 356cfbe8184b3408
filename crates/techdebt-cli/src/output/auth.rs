// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::AuthStatusResult;

use super::Renderable;

impl Renderable for AuthStatusResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        if self.authenticated {
            writeln!(w, "{} GitHub token available", style("*").green().bold())?;
            if let Some(ref method) = self.method {
                writeln!(w, "  Source: {}", style(method.to_string()).cyan())?;
            }
        } else {
            writeln!(
                w,
                "{} No GitHub token found. Set {} or run {}.",
                style("!").yellow().bold(),
                style("GH_TOKEN").cyan(),
                style("gh auth login").cyan()
            )?;
        }
        writeln!(w)?;
        Ok(())
    }
}
