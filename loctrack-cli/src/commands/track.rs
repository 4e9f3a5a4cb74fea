//! Track command - run a tracking session against the simulated provider.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use loctrack::bus::{TrackerEvent, PERMISSION_DENIED_TOPIC};
use loctrack::capability::{
    CapabilityGate, CapabilityOutcome, CapabilityStatus, ForwardedCapabilityGate,
    StaticCapabilityGate,
};
use loctrack::engine::{spawn_fix_logger, DEFAULT_FIX_LOG_INTERVAL};
use loctrack::provider::{SimulatedProvider, SimulatedRoute};
use loctrack::session::{SessionOutcome, TrackingSession};

use super::common::{install_interrupt_handler, print_fixes};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the track command.
#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Topic fixes are published on
    #[arg(long)]
    pub topic: String,

    /// Interval between fixes in milliseconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Smallest displacement between fixes in meters
    #[arg(long)]
    pub displacement: Option<u64>,

    /// Maximum batching delay in milliseconds
    #[arg(long)]
    pub max_wait: Option<u64>,

    /// Request high-accuracy (GPS) fixes
    #[arg(long, conflicts_with = "no_gps")]
    pub gps: bool,

    /// Do not request GPS fixes
    #[arg(long)]
    pub no_gps: bool,

    /// Request network-based fixes
    #[arg(long, conflicts_with = "no_network")]
    pub network: bool,

    /// Do not request network-based fixes
    #[arg(long)]
    pub no_network: bool,

    /// Run with the foreground keep-alive indicator
    #[arg(long, conflicts_with = "background")]
    pub foreground: bool,

    /// Run without the foreground keep-alive indicator
    #[arg(long)]
    pub background: bool,

    /// Keep-alive indicator title
    #[arg(long)]
    pub title: Option<String>,

    /// Keep-alive indicator text
    #[arg(long)]
    pub text: Option<String>,

    /// Keep-alive indicator ticker
    #[arg(long)]
    pub ticker: Option<String>,

    /// Keep-alive indicator channel id
    #[arg(long)]
    pub channel: Option<String>,

    /// Stop after this many fixes (default: run until Ctrl+C)
    #[arg(long)]
    pub fixes: Option<u64>,

    /// Simulate a user declining the location permission
    #[arg(long, conflicts_with = "prompt")]
    pub deny_permission: bool,

    /// Ask for the location permission interactively
    #[arg(long)]
    pub prompt: bool,

    /// Starting latitude of the simulated route
    #[arg(long, default_value = "52.5200", allow_hyphen_values = true)]
    pub lat: f64,

    /// Starting longitude of the simulated route
    #[arg(long, default_value = "13.4050", allow_hyphen_values = true)]
    pub lon: f64,
}

impl TrackArgs {
    /// Build the session described by these arguments.
    pub fn to_session(&self) -> TrackingSession {
        let mut session = TrackingSession::new(&self.topic);
        if let Some(interval) = self.interval {
            session = session.with_interval(interval);
        }
        if let Some(displacement) = self.displacement {
            session = session.with_smallest_displacement(displacement);
        }
        if let Some(max_wait) = self.max_wait {
            session = session.with_max_wait_time(max_wait);
        }
        if self.gps {
            session = session.with_gps(true);
        } else if self.no_gps {
            session = session.with_gps(false);
        }
        if self.network {
            session = session.with_network(true);
        } else if self.no_network {
            session = session.with_network(false);
        }
        if self.foreground {
            session = session.with_foreground(true);
        } else if self.background {
            session = session.with_foreground(false);
        }
        session.with_notification(
            self.title.as_deref(),
            self.text.as_deref(),
            self.ticker.as_deref(),
            self.channel.as_deref(),
        )
    }
}

/// Run the track command.
pub fn run(args: TrackArgs, store_path: Option<PathBuf>) -> Result<(), CliError> {
    let runner = CliRunner::new(store_path)?;
    runner.log_startup("track");
    let runtime = runner.runtime()?;

    runtime.block_on(async {
        let shutdown = CancellationToken::new();
        install_interrupt_handler(shutdown.clone())?;

        let provider =
            Arc::new(SimulatedProvider::default().with_route(SimulatedRoute::from(args.lat, args.lon)));
        let (gate, prompt_task) = build_gate(&args);
        let ctx = runner.context(provider, gate);

        if tracing::enabled!(tracing::Level::DEBUG) {
            spawn_fix_logger(
                Arc::clone(&ctx.engine),
                shutdown.child_token(),
                DEFAULT_FIX_LOG_INTERVAL,
            );
        }

        let fixes_rx = ctx.bus.subscribe(&args.topic);
        let mut session = args.to_session().subscribe_current_location(|topic, event| {
            if topic == PERMISSION_DENIED_TOPIC && *event == TrackerEvent::PermissionDenied {
                eprintln!("Location permission denied; tracking not started.");
            }
        });

        let outcome = session.start(&ctx).await;
        if let Some(task) = prompt_task {
            task.abort();
        }
        if outcome? == SessionOutcome::PermissionDenied {
            return Err(CliError::PermissionDenied);
        }

        eprintln!("Tracking on topic '{}'. Press Ctrl+C to stop.", args.topic);
        let printed = print_fixes(fixes_rx, args.fixes, shutdown.clone()).await;

        session.stop(&ctx);
        shutdown.cancel();
        eprintln!("Stopped after {} fixes.", printed);
        Ok(())
    })
}

/// Pick the capability gate for the requested permission behaviour.
///
/// With `--prompt` the returned task answers platform-style requests from
/// stdin.
fn build_gate(
    args: &TrackArgs,
) -> (Arc<dyn CapabilityGate>, Option<tokio::task::JoinHandle<()>>) {
    if args.deny_permission {
        return (Arc::new(StaticCapabilityGate::denied()), None);
    }
    if !args.prompt {
        return (Arc::new(StaticCapabilityGate::granted()), None);
    }

    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<u32>();
    let gate = Arc::new(
        ForwardedCapabilityGate::new(CapabilityStatus::NotGranted).with_prompt(move |code| {
            let _ = request_tx.send(code);
        }),
    );

    let forward_gate = Arc::clone(&gate);
    let task = tokio::spawn(async move {
        while let Some(code) = request_rx.recv().await {
            let outcome = tokio::task::spawn_blocking(ask_permission)
                .await
                .unwrap_or(CapabilityOutcome::Denied);
            forward_gate.on_request_result(code, outcome);
        }
    });

    (gate, Some(task))
}

fn ask_permission() -> CapabilityOutcome {
    eprint!("Allow loctrack to access your location? [y/N] ");
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return CapabilityOutcome::Denied;
    }
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => CapabilityOutcome::Granted,
        _ => CapabilityOutcome::Denied,
    }
}
