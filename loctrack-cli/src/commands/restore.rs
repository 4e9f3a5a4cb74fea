//! Restore command - resume tracking from the persisted configuration only.
//!
//! Simulates the host restarting the engine after process death: no caller
//! and no explicit configuration, just whatever the last session persisted.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tokio_util::sync::CancellationToken;

use loctrack::capability::StaticCapabilityGate;
use loctrack::config::ResolvedConfiguration;
use loctrack::provider::{SimulatedProvider, SimulatedRoute};

use super::common::{install_interrupt_handler, print_fixes};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the restore command.
#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Stop after this many fixes (default: run until Ctrl+C)
    #[arg(long)]
    pub fixes: Option<u64>,

    /// Starting latitude of the simulated route
    #[arg(long, default_value = "52.5200", allow_hyphen_values = true)]
    pub lat: f64,

    /// Starting longitude of the simulated route
    #[arg(long, default_value = "13.4050", allow_hyphen_values = true)]
    pub lon: f64,
}

/// Run the restore command.
pub fn run(args: RestoreArgs, store_path: Option<PathBuf>) -> Result<(), CliError> {
    let runner = CliRunner::new(store_path)?;
    runner.log_startup("restore");
    let runtime = runner.runtime()?;

    let store = runner.store();
    let restored = ResolvedConfiguration::resolve(None, store.as_ref());
    eprintln!("Restoring tracking from persisted configuration:");
    eprintln!("  Topic:        {}", restored.topic);
    eprintln!("  Interval:     {} ms", restored.interval_ms);
    eprintln!("  Displacement: {} m", restored.smallest_displacement_m);
    eprintln!(
        "  Priority:     {}",
        restored
            .priority()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "provider default".to_string())
    );
    eprintln!("  Foreground:   {}", restored.run_in_foreground);
    eprintln!();

    runtime.block_on(async {
        let shutdown = CancellationToken::new();
        install_interrupt_handler(shutdown.clone())?;

        let provider =
            Arc::new(SimulatedProvider::default().with_route(SimulatedRoute::from(args.lat, args.lon)));
        // The host only restarts engines that were already permitted
        let ctx = runner.context(provider, Arc::new(StaticCapabilityGate::granted()));

        let fixes_rx = ctx.bus.subscribe(&restored.topic);
        ctx.engine.activate(None);

        let printed = print_fixes(fixes_rx, args.fixes, shutdown.clone()).await;

        ctx.engine.deactivate();
        eprintln!("Stopped after {} fixes.", printed);
        Ok(())
    })
}
