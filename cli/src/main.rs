// Copyright (c) 2026 Vela Labs. MIT License.
// See LICENSE for details.

//! # Vela Sandbox Demo Harness
//!
//! Entry point for the `vela-sim` binary. Parses CLI arguments, initializes
//! logging, opens a simulated banking session, and runs a scripted demo:
//! two transfers go out (one flagged for clearance), the hold is authorized
//! after a delay, and status changes stream to the terminal until both
//! transfers arrive.
//!
//! The binary supports two subcommands:
//!
//! - `run`     — run the scripted demo session
//! - `version` — print build version information

mod cli;
mod logging;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rand::Rng;
use tokio::signal;

use vela_core::notify::{MemorySink, NotificationSink, ReceiptSink, TracingNotifier};
use vela_core::progression::SweepConfig;
use vela_core::session::SessionContext;
use vela_core::transfer::{
    Amount, ClearanceMethod, Currency, ExchangeRate, RecipientSnapshot, TransferDetails,
    TransferId, TransferRecord, TransferStatus,
};

use cli::{Commands, RunArgs, VelaSimCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = VelaSimCli::parse();

    match cli.command {
        Commands::Run(args) => run_demo(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Runs the scripted demo session end to end.
async fn run_demo(args: RunArgs) -> Result<()> {
    logging::init_logging(
        "vela_sim=info,vela_core=info",
        LogFormat::from_str_lossy(&args.log_format),
    );

    let config = demo_config(args.fast);
    tracing::info!(
        fast = args.fast,
        sweep_ms = config.sweep_interval.as_millis() as u64,
        "starting vela-sim"
    );

    // Receipts land in a buffer so the run summary can print them; in-app
    // notifications go straight to the log.
    let receipts = Arc::new(MemorySink::new());
    let session = SessionContext::login_with(
        config.clone(),
        Arc::new(TracingNotifier) as Arc<dyn NotificationSink>,
        Arc::clone(&receipts) as Arc<dyn ReceiptSink>,
    );

    let plain = session.submit(demo_transfer(
        "Adaeze Obi",
        "First Sandbox Bank",
        "NG",
        Currency::NGN,
        false,
    ));
    let flagged = session.submit(demo_transfer(
        "Kamau Njoroge",
        "Sandbox Bank of Kenya",
        "KE",
        Currency::KES,
        true,
    ));
    tracing::info!(plain = %plain.id, flagged = %flagged.id, "transfers submitted");

    let method = match args.method.to_lowercase().as_str() {
        "fee" => ClearanceMethod::Fee,
        _ => ClearanceMethod::Code,
    };
    let auth_at = tokio::time::Instant::now() + Duration::from_secs(args.auth_delay_secs);
    let mut authorized = false;

    // Poll the ledger at sweep cadence, reporting every status change,
    // until both transfers are terminal or the user bails out.
    let mut last_seen: HashMap<TransferId, TransferStatus> = HashMap::new();
    loop {
        tokio::select! {
            _ = tokio::time::sleep(config.sweep_interval) => {}
            _ = shutdown_signal() => {
                tracing::info!("interrupted, closing session");
                break;
            }
        }

        // Authorize only once the transfer is actually holding. The session
        // seam drops a premature authorize silently, and the hold has no
        // time-based exit — a single unchecked attempt could leave the
        // transfer stuck and this loop spinning forever.
        if !authorized
            && tokio::time::Instant::now() >= auth_at
            && holding_for_clearance(session.ledger().get(flagged.id).as_ref())
        {
            tracing::info!(transfer = %flagged.id, method = %method, "authorizing clearance hold");
            session.authorize(flagged.id, method);
            authorized = true;
        }

        let mut all_arrived = true;
        for record in session.ledger().all() {
            if last_seen.get(&record.id) != Some(&record.status) {
                tracing::info!(
                    transfer = %record.id,
                    recipient = %record.recipient.name,
                    status = %record.status,
                    "status changed"
                );
                last_seen.insert(record.id, record.status);
            }
            all_arrived &= record.is_terminal();
        }

        if all_arrived {
            break;
        }
    }

    session.logout().await;

    println!("Demo run complete.");
    println!("  Receipts sent : {}", receipts.receipt_count());
    for receipt in receipts.receipts() {
        println!(
            "  {} -> {} ({}){}",
            receipt.send_amount.display_decimal(),
            receipt.receive_amount.display_decimal(),
            receipt.recipient.name,
            if receipt.clearance_fee_paid {
                " [clearance fee paid]"
            } else {
                ""
            },
        );
    }

    Ok(())
}

/// Default progression timing, optionally compressed 5x for demos.
fn demo_config(fast: bool) -> SweepConfig {
    let config = SweepConfig::default();
    if !fast {
        return config;
    }

    let scale = |d: Duration| d / 5;
    SweepConfig {
        sweep_interval: scale(config.sweep_interval),
        convert_after: scale(config.convert_after),
        transit_after: scale(config.transit_after),
        arrival_after: scale(config.arrival_after),
        clearance_resume_delay: scale(config.clearance_resume_delay),
    }
}

/// Builds a demo transfer with a lightly jittered exchange rate, so two
/// runs of the harness don't produce byte-identical output.
fn demo_transfer(
    name: &str,
    bank: &str,
    country: &str,
    currency: Currency,
    requires_auth: bool,
) -> TransferDetails {
    let jitter: u64 = rand::thread_rng().gen_range(0..=25_000);
    TransferDetails {
        source_account: "acct-main".to_string(),
        recipient: RecipientSnapshot {
            name: name.to_string(),
            account_number: "0123456789".to_string(),
            bank: bank.to_string(),
            country: country.to_string(),
            currency,
        },
        send_amount: Amount::new(25_000, Currency::USD),
        fee: Amount::new(1_250, Currency::USD),
        rate: ExchangeRate::from_ppm(1_500_000 + jitter),
        requires_auth,
        reference: Some("vela-sim demo".to_string()),
    }
}

/// Returns `true` once the flagged transfer is holding for clearance.
/// Authorizing any earlier is a silent no-op, so the demo loop must wait
/// for this before spending its one authorization.
fn holding_for_clearance(record: Option<&TransferRecord>) -> bool {
    matches!(
        record.map(|r| r.status),
        Some(TransferStatus::FlaggedAwaitingClearance)
    )
}

/// Prints version information to stdout.
fn print_version() {
    println!("vela-sim {}", env!("CARGO_PKG_VERSION"));
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
