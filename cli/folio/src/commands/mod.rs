mod browse;
mod login;
mod search;

use std::env;
use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use browse::BrowseArgs;
use clap::{ArgAction, Args, Parser, Subcommand};
use folio_catalog::{
    AuthClient,
    BearerCredential,
    CatalogClient,
    CatalogFeed,
    CatalogRepository,
    Client,
    PatronCredentials,
};
use itertools::Itertools;
use login::LoginArgs;
use search::SearchArgs;
use tracing::debug;

use crate::config::Config;

const USERNAME_VAR: &str = "FOLIO_USERNAME";
const PASSWORD_VAR: &str = "FOLIO_PASSWORD";

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Browse and search OPDS library catalogs.")]
pub struct Cli {
    /// Increase logging verbosity
    ///
    /// Invoke multiple times for increasing detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence logs except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Read configuration from FILE in addition to the user config
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Verbose(self.verbose)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Verbose(u8),
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Sign in to the lending service.")]
    Login(LoginArgs),
    #[command(about = "Show a catalog feed.")]
    Browse(BrowseArgs),
    #[command(about = "Search the catalog.")]
    Search(SearchArgs),
}

impl Command {
    pub async fn handle(self, config: Config) -> Result<()> {
        match self {
            Command::Login(args) => args.handle(config).await,
            Command::Browse(args) => args.handle(config).await,
            Command::Search(args) => args.handle(config).await,
        }
    }
}

/// Sign-in options of commands that read the catalog.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Sign in before contacting the catalog
    #[arg(long)]
    login: bool,

    /// Username to sign in with [default: $FOLIO_USERNAME]
    #[arg(long, requires = "login")]
    username: Option<String>,
}

/// Exchange the patron's credentials for a bearer token.
///
/// The password is read from `FOLIO_PASSWORD`.
pub(crate) async fn sign_in(config: &Config, username: Option<String>) -> Result<BearerCredential> {
    let username = match username {
        Some(username) => username,
        None => env::var(USERNAME_VAR)
            .with_context(|| format!("No username given. Pass '--username' or set {USERNAME_VAR}."))?,
    };
    let credentials = PatronCredentials {
        username,
        password: env::var(PASSWORD_VAR).ok(),
    };

    let auth_client = AuthClient::new(config.auth_client_config()?)?;
    let credential = auth_client
        .exchange(&credentials)
        .await
        .context("Could not sign in")?;
    debug!(expires_at = %credential.expires_at(), "signed in");
    Ok(credential)
}

/// Create a repository for `catalog_url`, signing in first if requested.
pub(crate) async fn open_repository(
    config: &Config,
    catalog_url: &str,
    session: SessionArgs,
) -> Result<CatalogRepository> {
    let mut client = CatalogClient::new(config.catalog_client_config(catalog_url))?;
    if session.login {
        let credential = sign_in(config, session.username).await?;
        client.sign_in(&credential)?;
    }
    Ok(CatalogRepository::new(Client::from(client)))
}

/// Print a feed to stdout, as JSON or as a listing.
pub(crate) fn print_feed(feed: &CatalogFeed, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(feed)?);
    } else {
        print!("{}", render_feed(feed)?);
    }
    Ok(())
}

fn render_feed(feed: &CatalogFeed) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}", feed.title())?;

    for (position, entry) in feed.entries().iter().enumerate() {
        write!(out, "{:>4}. {}", position + 1, entry.title)?;
        if !entry.authors.is_empty() {
            write!(out, " by {}", entry.authors.iter().join(", "))?;
        }
        writeln!(out)?;

        for link in entry.links.iter().filter(|link| link.is_acquisition()) {
            writeln!(out, "      {}", link.href)?;
        }
    }

    if let Some(next) = feed.next_link() {
        writeln!(out, "\nMore: {}", next.href)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use folio_catalog::parse_feed;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_from_flags() {
        let cli = Cli::try_parse_from(["folio", "browse"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Verbose(0));

        let cli = Cli::try_parse_from(["folio", "-vv", "browse"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Verbose(2));

        let cli = Cli::try_parse_from(["folio", "search", "-q", "astronomy"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);

        assert!(Cli::try_parse_from(["folio", "-q", "-v", "browse"]).is_err());
    }

    #[test]
    fn username_requires_login() {
        assert!(Cli::try_parse_from(["folio", "browse", "--username", "patron"]).is_err());
        assert!(
            Cli::try_parse_from(["folio", "browse", "--login", "--username", "patron"]).is_ok()
        );
    }

    #[test]
    fn renders_feed_listing() {
        let feed = parse_feed(
            indoc! {r#"
            <feed xmlns="http://www.w3.org/2005/Atom">
              <title>Public Library</title>
              <link rel="next" href="https://example.org/catalog?page=2"/>
              <entry>
                <id>1</id>
                <title>Good Omens</title>
                <author><name>Terry Pratchett</name></author>
                <author><name>Neil Gaiman</name></author>
                <link rel="http://opds-spec.org/acquisition/borrow" href="https://example.org/borrow/1"/>
                <link rel="alternate" href="https://example.org/book/1"/>
              </entry>
              <entry>
                <id>2</id>
                <title>Beowulf</title>
              </entry>
            </feed>
            "#}
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(render_feed(&feed).unwrap(), indoc! {"
            Public Library
               1. Good Omens by Terry Pratchett, Neil Gaiman
                  https://example.org/borrow/1
               2. Beowulf

            More: https://example.org/catalog?page=2
        "});
    }
}
