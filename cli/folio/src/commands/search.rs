use anyhow::{Context, Result};
use clap::Args;
use folio_catalog::CatalogRepositoryTrait;
use tracing::instrument;

use super::{SessionArgs, open_repository, print_feed};
use crate::config::Config;
use crate::utils::message;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search terms
    #[arg(value_name = "QUERY")]
    query: String,

    /// Search endpoint [default: search_url or catalog_url from the config]
    #[arg(long, value_name = "URL")]
    base: Option<String>,

    #[command(flatten)]
    session: SessionArgs,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,
}

impl SearchArgs {
    #[instrument(name = "search", skip_all)]
    pub async fn handle(self, config: Config) -> Result<()> {
        let base = match self.base {
            Some(base) => base,
            None => config.search_url()?.to_string(),
        };

        let repository = open_repository(&config, &base, self.session).await?;
        let results = repository
            .search(&self.query, &base)
            .await
            .with_context(|| format!("Could not search for '{}'", self.query))?;

        match results {
            Some(results) => print_feed(&results, self.json),
            None => {
                message::warning(format!("No results for '{}'.", self.query));
                Ok(())
            },
        }
    }
}
