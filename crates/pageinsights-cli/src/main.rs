mod render;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pageinsights_core::DateRange;
use pageinsights_graph::{GraphClient, Session};
use tracing_subscriber::EnvFilter;

const DEFAULT_REDIRECT_URI: &str = "https://www.facebook.com/connect/login_success.html";

#[derive(Debug, Parser)]
#[command(name = "pageinsights-cli")]
#[command(about = "Facebook page insights from the command line")]
struct Cli {
    /// User access token from the consent flow (overrides the environment)
    #[arg(long, global = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the consent URL to open in a browser
    LoginUrl {
        /// Where the provider redirects after consent
        #[arg(long, default_value = DEFAULT_REDIRECT_URI)]
        redirect_uri: String,
    },
    /// Log in and list the pages you administer
    Pages,
    /// Show the four dashboard metrics for a page
    Insights {
        /// Page id (see `pages`)
        #[arg(long)]
        page: String,
        /// Start date, YYYY-MM-DD (defaults to now)
        #[arg(long)]
        since: Option<String>,
        /// End date, YYYY-MM-DD (defaults to now + 1 day)
        #[arg(long)]
        until: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pageinsights_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut client = GraphClient::from_app_config(&config)?;
    if let Some(token) = cli.access_token {
        client = client.with_user_access_token(token);
    }

    tracing::debug!(command = ?cli.command, "dispatching");
    match cli.command {
        Some(Commands::LoginUrl { redirect_uri }) => {
            let url = client.login_dialog_url(&redirect_uri)?;
            println!("{url}");
        }
        Some(Commands::Pages) => run_pages(Session::new(Arc::new(client))).await?,
        Some(Commands::Insights { page, since, until }) => {
            let range = DateRange::parse(since.as_deref(), until.as_deref())?;
            run_insights(Session::new(Arc::new(client)), &page, range).await?;
        }
        None => println!("pageinsights-cli ready (app id {})", config.app_id),
    }

    Ok(())
}

async fn run_pages(mut session: Session<GraphClient>) -> anyhow::Result<()> {
    let outcome = session
        .login()
        .await
        .context("sign-in failed; run `login-url` and pass --access-token")?;

    match &outcome.profile {
        Ok(profile) => println!("{}", render::profile(profile)),
        Err(e) => eprintln!("warning: {e}"),
    }
    match &outcome.pages {
        Ok(pages) => print!("{}", render::page_list(pages)),
        Err(e) => anyhow::bail!("{e}"),
    }
    Ok(())
}

async fn run_insights(
    mut session: Session<GraphClient>,
    page_id: &str,
    range: DateRange,
) -> anyhow::Result<()> {
    session
        .login()
        .await
        .context("sign-in failed; run `login-url` and pass --access-token")?;

    // Range first so selecting the page issues exactly one fetch.
    session.set_date_range(range).await?;
    session
        .select_page(page_id)
        .await
        .context("could not load page insights; run the command again to retry")?;

    if let Some(page) = session.selected_page() {
        println!("{}", page.name);
    }
    match session.tiles() {
        Some(tiles) => print!("{}", render::tiles(&tiles)),
        None => println!("no insights loaded"),
    }
    Ok(())
}
