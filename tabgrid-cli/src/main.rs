//! tabgrid: print one page of a CMS admin list.
//!
//! Usage:
//!   tabgrid --base-url https://cms.example.com --path /admin/news/ --page 2 --sort news_date:desc
//!
//! The list is fetched through the same adapter the admin UI uses, so the
//! output reflects exactly what the grid would show.

use anyhow::Result;
use clap::Parser;
use tabgrid_cli::{run, Args};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    info!(path = %args.path, "tabgrid starting");
    let output = run(&args).await?;
    print!("{output}");
    Ok(())
}
