use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use argh::FromArgs;
use links_client::{DummyLinksQuery, HttpTransport, QueryCache, Variables};
use links_config::Endpoint;
use view::{LinkTitleView, ViewState};

mod view;

/// How the view gets its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Issue the query at start-up and read it once it resolves.
    Preload,
    /// Let the view issue the query when it is mounted.
    Mount,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preload" => Ok(Self::Preload),
            "mount" => Ok(Self::Mount),
            _ => Err(format!("unknown strategy `{s}`, expected `preload` or `mount`")),
        }
    }
}

#[derive(FromArgs)]
/// Show the title of the first dummy link.
struct Links {
    #[argh(switch)]
    /// query GitHub's GraphQL API instead of the configured endpoint
    github: bool,
    #[argh(option)]
    /// the GraphQL endpoint to query
    url: Option<String>,
    #[argh(option, default = "Strategy::Preload")]
    /// how to load the links: `preload` or `mount`
    strategy: Strategy,
    #[argh(option, default = "30")]
    /// seconds to wait for a mounted view to load
    timeout: u64,
    #[argh(switch)]
    /// print the query result as JSON
    json: bool,
    #[argh(switch, short = 'v')]
    /// verbose mode
    verbose: bool,
}

/// Print what the view currently shows.
fn print_view(view: &LinkTitleView) {
    let line = view.render();
    match view.state() {
        ViewState::Loading => println!("{}", console::style(line).dim()),
        ViewState::Loaded(_) => println!("{}", console::style(line).bold()),
        ViewState::Empty => println!("{}", console::style(line).red()),
    }
}

/// Build the transport described by the config and the command line.
fn get_transport(links: &Links) -> anyhow::Result<HttpTransport> {
    let mut config = links_config::Config::get_or_default().context("Reading config")?;
    if links.github {
        config.endpoint = Some(Endpoint::Github);
    }
    if let Some(url) = &links.url {
        config.url = Some(url.clone());
    }

    let token = match config.get_endpoint() {
        Endpoint::Github => Some(
            config
                .get_github_token()
                .context("No GitHub token configured")?,
        ),
        Endpoint::Local => None,
    };
    let url = config.get_url();
    tracing::info!("Querying {url}");
    Ok(HttpTransport::new_with_url(url, token))
}

async fn actual_main(links: Links) -> anyhow::Result<()> {
    let transport = Arc::new(get_transport(&links)?);

    match links.strategy {
        Strategy::Preload => {
            // The query is in flight before the view exists.
            let cache = QueryCache::new(transport);
            let handle = cache.preload::<DummyLinksQuery>(Variables::new());

            let view = LinkTitleView::new();
            if view.read_preloaded(&handle)? == ViewState::Loading {
                print_view(&view);
            }

            let response = handle.wait().await.context("Querying links")?;
            if links.json {
                serde_json::to_writer_pretty(std::io::stdout(), &*response)
                    .context("Writing response")?;
                println!();
                return Ok(());
            }
            view.read_preloaded(&handle)?;
            print_view(&view);
        }
        Strategy::Mount => {
            if links.json {
                anyhow::bail!("--json needs the preload strategy");
            }
            let mut view = LinkTitleView::new();
            view.mount(transport);
            print_view(&view);

            tokio::time::timeout(Duration::from_secs(links.timeout), view.finished())
                .await
                .context("Timed out waiting for links")?;
            view.teardown();
            if view.state() == ViewState::Loading {
                anyhow::bail!("Loading links failed");
            }
            print_view(&view);
        }
    }

    Ok(())
}

/// Set up tracing.
fn set_up_tracing(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let env_filter =
        tracing_subscriber::filter::EnvFilter::try_from_default_env().unwrap_or(if verbose {
            tracing_subscriber::filter::EnvFilter::new("INFO")
        } else {
            tracing_subscriber::filter::EnvFilter::new("WARN")
        });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::Layer::default()
                .pretty()
                .with_writer(std::io::stderr)
                .boxed(),
        )
        .with(env_filter)
        .init();
}

fn main() {
    let links: Links = argh::from_env();
    set_up_tracing(links.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Could not start the runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(actual_main(links)) {
        tracing::error!("Error: {e:#}");
        std::process::exit(1);
    }
}
