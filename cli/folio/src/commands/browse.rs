use anyhow::{Context, Result};
use clap::Args;
use folio_catalog::CatalogRepositoryTrait;
use tracing::instrument;
use url::Url;

use super::{SessionArgs, open_repository, print_feed};
use crate::config::Config;
use crate::utils::message;

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// Feed to show [default: the configured catalog]
    #[arg(value_name = "URL")]
    url: Option<String>,

    #[command(flatten)]
    session: SessionArgs,

    /// Print the feed as JSON
    #[arg(long)]
    json: bool,
}

impl BrowseArgs {
    #[instrument(name = "browse", skip_all)]
    pub async fn handle(self, config: Config) -> Result<()> {
        let url = match self.url {
            Some(url) => url,
            None => config.catalog_url()?.to_string(),
        };
        let feed_url = Url::parse(&url).with_context(|| format!("'{url}' is not a valid URL"))?;

        let repository = open_repository(&config, &url, self.session).await?;
        let feed = repository
            .load_top_level_catalog(&feed_url)
            .await
            .context("Could not load catalog")?;

        match feed {
            Some(feed) => print_feed(&feed, self.json),
            None => {
                message::warning(format!("The catalog at {feed_url} returned no feed."));
                Ok(())
            },
        }
    }
}
