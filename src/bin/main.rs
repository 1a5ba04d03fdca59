use std::io::{self, Write};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tea_crawler::{Config, Crawler, YouTubeClient};
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

/// Downloads the maximum-resolution thumbnail of every video on a channel.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Channel ID to crawl
    #[arg(long)]
    target: Option<String>,
}

/// Writes log lines to stderr with the progress bar cleared out of the way.
#[derive(Clone)]
struct ProgressWriter(ProgressBar);

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for ProgressWriter {
    type Writer = ProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )?
        .progress_chars("#>-"),
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(ProgressWriter(pb.clone()))
        .init();

    let args = Args::parse();

    let config = Config::from_env(args.target)?;
    let client = YouTubeClient::new(&config)?;

    let summary = Crawler::new(client, &config)
        .with_progress(pb)
        .crawl()
        .await?;

    println!(
        "Crawl complete! {} pages, {} thumbnails saved, {} skipped, {} failed",
        summary.pages, summary.downloaded, summary.skipped, summary.failed
    );

    Ok(())
}
