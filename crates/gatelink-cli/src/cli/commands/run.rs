//! `gatelink run`: resolve a whole input file.

use anyhow::Result;
use gatelink_core::config::GatelinkConfig;
use gatelink_core::dispatch::{BatchSummary, DispatchConfig, DispatchEngine, ProgressEvent};
use gatelink_core::input::read_input;
use gatelink_core::sink::{FailureLedger, ResultSink};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use super::{curl_factory, open_session_store};
use crate::cli::RunArgs;

const OUTPUT_NAME_LEN: usize = 8;
const OUTPUT_NAME_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub fn run_batch(cfg: &GatelinkConfig, args: &RunArgs) -> Result<()> {
    let mut cfg = cfg.clone();
    args.apply(&mut cfg);

    let items = read_input(&args.input)?;
    let output = args.output.clone().unwrap_or_else(random_output_name);
    let store = open_session_store(args.session.as_deref())?;
    let seed = store.load().unwrap_or_default();
    tracing::info!(
        input = %args.input.display(),
        output = %output.display(),
        items = items.len(),
        seeded_cookies = seed.len(),
        "batch run"
    );

    let engine = DispatchEngine::new(
        DispatchConfig::from_config(&cfg, !args.no_check_domain),
        curl_factory(&cfg),
        ResultSink::new(&output, cfg.record_layout),
        FailureLedger::new(&args.failed),
    )
    .with_cookies(seed);

    println!(
        "Resolving {} link(s) from {} with {} worker(s)",
        items.len(),
        args.input.display(),
        cfg.workers
    );

    let (tx, rx) = mpsc::channel::<ProgressEvent>();
    let printer = std::thread::spawn(move || {
        for ev in rx {
            println!("[{}/{}] {} -> {}", ev.done, ev.total, ev.url, ev.summary);
        }
    });
    let result = engine.run_with_progress(items, Some(tx));
    let _ = printer.join();
    let summary = result?;

    if !store.save(&engine.merged_jar()) {
        eprintln!("warning: could not save session to {}", store.path().display());
    }

    print!("{}", final_report(&summary, &output, &args.failed));
    Ok(())
}

/// Closing lines of a run. Both files are always named.
fn final_report(summary: &BatchSummary, output: &Path, failed: &Path) -> String {
    format!(
        "Done: {}\nResults written to {}\nFailed links ({}) listed in {} for manual follow-up\n",
        summary,
        output.display(),
        summary.failures(),
        failed.display()
    )
}

/// `<8 chars of [a-z0-9]>.txt`
fn random_output_name() -> PathBuf {
    let stem: String = (0..OUTPUT_NAME_LEN)
        .map(|_| OUTPUT_NAME_CHARS[fastrand::usize(..OUTPUT_NAME_CHARS.len())] as char)
        .collect();
    PathBuf::from(format!("{stem}.txt"))
}
