use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use env_logger::{Builder, Env, Target};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bruteforce_wifi_online::cli::Args;
use bruteforce_wifi_online::report::{print_summary, ConsoleReporter};
use bruteforce_wifi_online::{AttemptOrchestrator, PingChecker, ReachabilityProbe, SystemController};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    println!("\n{}", "📡 Bruteforce WiFi Online".bold().cyan());
    println!("{}\n", "WPA2-PSK online password trials - Educational use only".dimmed());

    let config = args.trial_config()?;
    let network_id = args.network_id()?;

    let source = args.candidate_source()?;
    log::debug!("effective config: {config:?}");

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        eprintln!("\nStopping after the current attempt...");
    })
    .context("Failed to install Ctrl+C handler")?;

    let timing = config.timing(source.kind());
    let probe = ReachabilityProbe::new(PingChecker, config.probe_host.clone());
    let mut orchestrator = AttemptOrchestrator::new(
        SystemController::new(config.interface.clone()),
        probe,
        timing,
    )
    .context("Failed to create profile directory")?
    .with_stop_flag(stop);

    let start = Instant::now();
    let session = orchestrator.run(&network_id, source, &mut ConsoleReporter::default());
    print_summary(&session, start.elapsed());

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .target(Target::Stderr)
        .init();
}
