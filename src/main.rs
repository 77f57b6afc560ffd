use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use wait_for_port::args::Cli;
use wait_for_port::docker::DockerCli;
use wait_for_port::probe::Prober;
use wait_for_port::signal::{self, CancelToken};
use wait_for_port::wait::{CancellableSleep, WaitLoop};
use wait_for_port::{config, logging};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures.
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the port became ready.
fn run(cli: &Cli) -> Result<bool> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let cfg = config::load(&cwd)?;
    let settings = cli.resolve(&cfg)?;

    logging::init(settings.log_level)?;
    debug!("resolved settings: {settings:?}");

    let cancel = CancelToken::new();
    if !signal::install(&cancel) {
        debug!("interrupt handler already installed, keeping the existing one");
    }

    let runtime = DockerCli::new(settings.runtime.clone());
    let prober = Prober::for_port(
        settings.target.port(),
        settings.credentials.clone(),
        settings.connect_timeout,
    );
    info!(
        "waiting up to {:?} for {}:{} ({} probe via `{}`)",
        settings.target.timeout(),
        settings.target.container(),
        settings.target.port(),
        prober.kind(),
        runtime.binary()
    );

    let mut wait = WaitLoop::new(
        &runtime,
        &prober,
        CancellableSleep::new(cancel.clone()),
        io::stdout(),
        cancel,
    );
    Ok(wait.run(&settings.target).is_success())
}
