use std::{
    io::{self, Write},
    sync::Arc,
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use vs_venues::{
    constants::{DEFAULT_API_ROOT, DEFAULT_USER_AGENT},
    format_location, redacted_url, CategorisedResult, Category, CategoryRenderer, Client, Config,
    Location, Query, RunOutcome, SearchError, SearchMetadata, SearchReply,
};

#[derive(Parser, Debug)]
#[command(about = "Search venues near a location")]
struct CliArgs {
    #[arg(default_value = "", help = "Free-text query. May be empty.")]
    query: String,

    #[arg(long, allow_hyphen_values = true, requires = "lng", help = "Latitude to search near")]
    lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "lat", help = "Longitude to search near")]
    lng: Option<f64>,

    #[arg(long, env = "VS_API_ROOT", default_value = DEFAULT_API_ROOT)]
    api_root: String,

    #[arg(long, env = "VS_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    #[arg(short = 't', long, env = "VS_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    #[arg(long, default_value = "warn", help = "Log filter, overridden by RUST_LOG")]
    log_level: String,

    #[arg(long, help = "Pretty-print each result")]
    pretty: bool,

    #[arg(long, help = "Print the request URL instead of searching")]
    print_url: bool,
}

/// Writes results to stdout as JSON, one per line unless pretty-printing.
struct StdoutReply {
    pretty: bool,
    spinner: ProgressBar,
    error: Option<SearchError>,
}

impl SearchReply for StdoutReply {
    fn register_category(
        &mut self,
        id: &str,
        title: &str,
        icon: &str,
        renderer: CategoryRenderer,
    ) -> Category {
        self.spinner.finish_and_clear();
        Category {
            id: id.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
            renderer,
        }
    }

    fn push(&mut self, result: CategorisedResult) -> bool {
        let line = if self.pretty {
            serde_json::to_string_pretty(&result)
        } else {
            serde_json::to_string(&result)
        };
        match line {
            Ok(line) => writeln!(io::stdout().lock(), "{line}").is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "unable to serialize result");
                false
            }
        }
    }

    fn report_error(&mut self, error: SearchError) {
        self.spinner.finish_and_clear();
        self.error = Some(error);
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level `{level}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow!("unable to install logger: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(&args.log_level)?;

    let config = Config::builder()
        .api_root(args.api_root)
        .user_agent(args.user_agent)
        .access_token(args.access_token)
        .build()?;
    let client = Client::from_config(config)?;
    let metadata = SearchMetadata {
        location: match (args.lat, args.lng) {
            (Some(latitude), Some(longitude)) => Some(Location::new(latitude, longitude)),
            _ => None,
        },
    };

    if args.print_url {
        let location = format_location(metadata.location.as_ref());
        let url = client.request_url(args.query.trim(), &location)?;
        println!("{}", redacted_url(&url));
        return Ok(());
    }

    let query = Arc::new(Query::new(args.query, metadata, client));
    let host = Arc::clone(&query);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            host.cancelled();
        }
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("searching venues");
    spinner.enable_steady_tick(Duration::from_millis(80));
    let mut reply = StdoutReply {
        pretty: args.pretty,
        spinner,
        error: None,
    };

    match query.run(&mut reply).await {
        RunOutcome::Completed { .. } | RunOutcome::Stopped { .. } => Ok(()),
        RunOutcome::Failed | RunOutcome::Cancelled => match reply.error.take() {
            Some(error) => Err(error.into()),
            None => bail!("venue search failed"),
        },
    }
}
