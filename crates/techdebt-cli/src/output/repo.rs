// SPDX-License-Identifier: Apache-2.0

use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::RepoResult;

use super::Renderable;

impl Renderable for RepoResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "{}", style(&self.repository).cyan().bold())?;
        writeln!(w, "  Owner: {}", self.owner)?;
        writeln!(w, "  Name:  {}", self.name)?;
        writeln!(w, "  {}", style(&self.issues_url).dim())?;
        Ok(())
    }
}
