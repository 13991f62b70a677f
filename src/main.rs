//! mTLS Gate - client certificate verification and allow-listing
//!
//! Offline front-end for the gate: validates configuration and evaluates
//! client certificates exactly as the HTTP middleware would.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use mtls_gate::{
    cli::{Cli, Command, OutputFormat, check_exit_code, render_check, render_validate},
    config::Config,
    mtls::{AccessGate, TlsState},
    setup_tracing,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let Some(gate) = build_gate(cli.config.as_deref()) else {
        return ExitCode::FAILURE;
    };

    match cli.command {
        Command::Validate => run_validate(&gate),
        Command::Check {
            cert,
            remote_addr,
            format,
        } => run_check(&gate, &cert, &remote_addr, format),
    }
}

/// Load configuration and construct the gate, logging any startup error.
fn build_gate(config_path: Option<&Path>) -> Option<AccessGate> {
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return None;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        root_cert = %config.gate.root_cert,
        common_names = ?config.gate.common_names,
        serial_numbers = ?config.gate.serial_numbers,
        "Initializing mTLS gate"
    );

    match AccessGate::from_config(&config.gate) {
        Ok(gate) => Some(gate),
        Err(e) => {
            error!("Failed to create gate: {e}");
            None
        }
    }
}

/// Report what the gate loaded
fn run_validate(gate: &AccessGate) -> ExitCode {
    for line in render_validate(gate.trust_store().anchor_count()) {
        println!("{line}");
    }
    ExitCode::SUCCESS
}

/// Evaluate a client certificate file
fn run_check(gate: &AccessGate, cert: &Path, remote_addr: &str, format: OutputFormat) -> ExitCode {
    let tls = match fs::read(cert)
        .map_err(mtls_gate::Error::from)
        .and_then(|pem| TlsState::from_pem(&pem))
    {
        Ok(tls) => tls,
        Err(e) => {
            eprintln!("Cannot load '{}': {e}", cert.display());
            return ExitCode::FAILURE;
        }
    };

    let decision = gate.evaluate(Some(&tls), remote_addr);
    println!("{}", render_check(&decision, format));
    ExitCode::from(check_exit_code(&decision))
}
