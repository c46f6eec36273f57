use anyhow::Result;
use chrono::Local;
use clap::Args;
use itertools::Itertools;
use tracing::instrument;

use super::sign_in;
use crate::config::Config;
use crate::utils::message;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username or library card number [default: $FOLIO_USERNAME]
    #[arg(long)]
    username: Option<String>,
}

impl LoginArgs {
    /// Check the credentials by exchanging them for a token.
    ///
    /// The token itself is never printed.
    #[instrument(name = "login", skip_all)]
    pub async fn handle(self, config: Config) -> Result<()> {
        let credential = sign_in(&config, self.username).await?;

        message::updated("Signed in.");
        message::plain(format!("  token type: {}", credential.token_type()));
        message::plain(format!("  scopes:     {}", credential.scopes().join(", ")));
        message::plain(format!(
            "  expires:    {}",
            credential
                .expires_at()
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        ));
        Ok(())
    }
}
