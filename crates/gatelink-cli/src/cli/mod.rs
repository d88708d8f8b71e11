//! CLI for gatelink.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use gatelink_core::config::{self, GatelinkConfig, RecordLayout};
use std::path::PathBuf;

use commands::{run_batch, run_resolve};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gatelink")]
#[command(about = "Gatelink: resolve gated short links to their destinations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve every link in an input file.
    Run(RunArgs),

    /// Resolve one link and print its destination.
    Resolve {
        /// Gated link to resolve.
        url: String,

        /// Skip the warm-up page visit.
        #[arg(long)]
        no_warmup: bool,

        /// Accept links on any host.
        #[arg(long)]
        no_check_domain: bool,

        /// Session file to seed cookies from and save them to.
        #[arg(long, value_name = "PATH")]
        session: Option<PathBuf>,
    },
}

/// Options of `gatelink run`. Unset values come from the config file.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Input file: title lines followed by link lines.
    #[arg(short, long, default_value = "mega.txt", value_name = "PATH")]
    pub input: PathBuf,

    /// Result file (default: random 8-character name in the current directory).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Worker threads.
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Concurrent links per destination host.
    #[arg(long, value_name = "N")]
    pub per_host: Option<usize>,

    /// Attempts per link, including the first.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Seconds to wait for a busy host before skipping a link.
    #[arg(long, value_name = "SECS")]
    pub admission_timeout: Option<u64>,

    /// Timeout of a single HTTP call in seconds.
    #[arg(long, value_name = "SECS")]
    pub http_timeout: Option<u64>,

    /// Failure ledger.
    #[arg(long, default_value = "failed.txt", value_name = "PATH")]
    pub failed: PathBuf,

    /// Session file (default: in the XDG state dir).
    #[arg(long, value_name = "PATH")]
    pub session: Option<PathBuf>,

    /// Skip the warm-up page visit.
    #[arg(long)]
    pub no_warmup: bool,

    /// Accept links on any host.
    #[arg(long)]
    pub no_check_domain: bool,

    /// Write title and outcome only, without the source link.
    #[arg(long)]
    pub compact: bool,
}

impl RunArgs {
    /// Apply the flags given on the command line on top of `cfg`.
    pub fn apply(&self, cfg: &mut GatelinkConfig) {
        if let Some(n) = self.threads {
            cfg.workers = n;
        }
        if let Some(n) = self.per_host {
            cfg.per_host_limit = n;
        }
        if let Some(n) = self.retries {
            let mut retry = cfg.retry_config();
            retry.max_attempts = n;
            cfg.retry = Some(retry);
        }
        if let Some(secs) = self.admission_timeout {
            cfg.admission_timeout_secs = secs;
        }
        if let Some(secs) = self.http_timeout {
            cfg.http_timeout_secs = secs;
        }
        if self.no_warmup {
            cfg.warmup = false;
        }
        if self.compact {
            cfg.record_layout = RecordLayout::Compact;
        }
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run(args) => run_batch(&cfg, &args)?,
            CliCommand::Resolve {
                url,
                no_warmup,
                no_check_domain,
                session,
            } => run_resolve(&cfg, &url, no_warmup, no_check_domain, session.as_deref())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
