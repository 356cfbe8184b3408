// SPDX-License-Identifier: Apache-2.0

//! GitHub authentication status command.

use techdebt_core::TokenChain;

use crate::commands::types::AuthStatusResult;

/// Run the status command - show where the token would come from.
pub async fn run_status() -> AuthStatusResult {
    match TokenChain.resolve().await {
        Some((_, source)) => AuthStatusResult {
            authenticated: true,
            method: Some(source),
        },
        None => AuthStatusResult {
            authenticated: false,
            method: None,
        },
    }
}
