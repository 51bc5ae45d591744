//! `scanwebctl`: drive a ScanWeb server from the terminal.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use scanweb_core::poller::{DEFAULT_POLL_INTERVAL, ScanPoller};
use scanweb_model::{ScanId, ScanRecord};
use scanwebctl::{
    ApiClient,
    output::{render_record, save_report, stats_line, status_line},
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "scanwebctl")]
#[command(about = "Submit URL scans to a ScanWeb server and read the results")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Base URL of the ScanWeb server, optionally with a path prefix
    #[arg(long, env = "SCANWEB_SERVER", default_value = "http://127.0.0.1:3000", global = true)]
    server: String,

    /// Session token sent as a bearer credential
    #[arg(long, env = "SCANWEB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a scan for URL, submit it and wait for the result
    Scan {
        url: String,
        /// Return right after submission instead of watching the scan
        #[arg(long)]
        no_wait: bool,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// Poll an existing scan until it finishes
    Watch {
        id: ScanId,
        #[command(flatten)]
        poll: PollArgs,
    },
    /// List your scans, newest first
    List,
    /// Download a scan report as JSON
    Export {
        id: ScanId,
        /// Directory the report is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct PollArgs {
    /// Time between status reads (e.g. 3s, 500ms)
    #[arg(long, default_value_t = humantime::Duration::from(DEFAULT_POLL_INTERVAL))]
    interval: humantime::Duration,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(token) = cli.connection.token.clone() else {
        bail!("a session token is required (--token or SCANWEB_TOKEN)");
    };
    let client = Arc::new(
        ApiClient::new(&cli.connection.server, token)
            .context("failed to build API client")?,
    );

    match cli.command {
        Command::Scan { url, no_wait, poll } => {
            let record = client
                .create_scan(&url)
                .await
                .context("failed to create scan")?;
            println!("Created scan {} for {}", record.id, record.url);

            let reply = client
                .submit(record.id, &record.url)
                .await
                .context("failed to submit scan")?;
            println!("{}", reply.message);

            if no_wait {
                println!("Follow it with: scanwebctl watch {}", record.id);
                return Ok(());
            }
            let current = client.get_scan(record.id).await?;
            let finished = follow(client, current, poll.interval.into()).await;
            print!("{}", render_record(&finished));
        }
        Command::Watch { id, poll } => {
            let current = client
                .get_scan(id)
                .await
                .with_context(|| format!("failed to read scan {id}"))?;
            let finished = follow(client, current, poll.interval.into()).await;
            print!("{}", render_record(&finished));
        }
        Command::List => {
            let listing = client.list_scans().await.context("failed to list scans")?;
            for record in &listing.scans {
                println!("{}", status_line(record));
            }
            println!("{}", stats_line(&listing.stats));
        }
        Command::Export { id, output } => {
            let report = client
                .export(id)
                .await
                .with_context(|| format!("failed to export scan {id}"))?;
            let path = save_report(&output, &report)
                .with_context(|| format!("failed to write report into {}", output.display()))?;
            println!("Report saved to {}", path.display());
        }
    }

    Ok(())
}

async fn follow(client: Arc<ApiClient>, current: ScanRecord, interval: Duration) -> ScanRecord {
    if !current.is_terminal() {
        println!("{}", status_line(&current));
    }
    debug!(scan_id = %current.id, ?interval, "watching scan");

    let poller = ScanPoller::new(client)
        .with_interval(interval)
        .with_observer(|record| {
            if !record.is_terminal() {
                println!("{}", status_line(record));
            }
        });
    poller.follow(current).await
}
