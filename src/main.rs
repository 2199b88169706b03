use std::sync::Arc;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};

use crate::clock_task::ClockTask;
use crate::context::Context;
use crate::error::Error;
use crate::led_task::LedTask;
use crate::nixie::ColonMode;
use crate::roll::Roll;

mod cli;
mod clock_task;
mod color;
mod config;
mod context;
mod error;
mod gpio;
mod konst;
mod led_task;
mod logging;
mod nixie;
mod roll;
mod spi;
mod strip;

fn main() -> color_eyre::eyre::Result<()> {
    setup_panic();
    color_eyre::install().map_err(crate::error::Error::InstallingColorEyre)?;
    let cli = <crate::cli::Cli as clap::Parser>::parse();
    crate::logging::setup(cli.verbosity);

    let roll = crate::config::load(cli.config.as_deref()).map_err(Error::from)?;

    match cli.command {
        cli::Command::Run => {
            run(roll)?;
        }
        cli::Command::VerifyConfig => {
            tracing::info!("Configuration verified");
        }
    }

    Ok(())
}

fn setup_panic() {
    human_panic::setup_panic!(human_panic::Metadata::new(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
}

fn run(roll: Roll) -> Result<(), Error> {
    let context = Arc::new(Context::new(ColonMode::On));

    forward_signals(Arc::clone(&context))?;

    let clock = std::thread::Builder::new()
        .name("clock".into())
        .spawn({
            let context = Arc::clone(&context);
            move || ClockTask::new(context).run()
        })
        .map_err(|source| Error::SpawnWorker {
            name: "clock",
            source,
        })?;

    let led = std::thread::Builder::new()
        .name("led".into())
        .spawn({
            let context = Arc::clone(&context);
            move || LedTask::new(context, roll).run()
        })
        .map_err(|source| Error::SpawnWorker {
            name: "led",
            source,
        })?;

    let clock_result = join_worker(clock, "clock");
    let led_result = join_worker(led, "led");

    if let Err(error) = &led_result {
        tracing::error!(%error, "LED worker failed");
    }
    clock_result?;
    led_result?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

/// Forwards the usual termination signals to the shutdown flag. The
/// forwarder thread is detached; it dies with the process.
fn forward_signals(context: Arc<Context>) -> Result<(), Error> {
    let mut signals =
        signal_hook::iterator::Signals::new([SIGINT, SIGHUP, SIGTERM]).map_err(Error::Signals)?;

    std::thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            for signal in signals.forever() {
                tracing::info!(signal, "Received termination signal");
                context.signal_shutdown();
            }
        })
        .map_err(|source| Error::SpawnWorker {
            name: "signals",
            source,
        })?;

    Ok(())
}

fn join_worker(
    handle: std::thread::JoinHandle<Result<(), Error>>,
    name: &'static str,
) -> Result<(), Error> {
    match handle.join() {
        Ok(result) => result,
        Err(_panic) => Err(Error::WorkerPanicked(name)),
    }
}
