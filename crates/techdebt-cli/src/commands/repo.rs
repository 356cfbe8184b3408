// SPDX-License-Identifier: Apache-2.0

//! Repository detection command.

use anyhow::Result;
use techdebt_core::RepositoryResolver;

use crate::commands::types::RepoResult;

/// Run the show command - resolve the repository without authenticating.
pub async fn run_show(resolver: &RepositoryResolver) -> Result<RepoResult> {
    let identity = resolver.resolve().await?;

    Ok(RepoResult {
        repository: identity.to_string(),
        owner: identity.owner().to_string(),
        name: identity.name().to_string(),
        issues_url: format!("https://github.com/{identity}/issues"),
    })
}
