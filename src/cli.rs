//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use crate::mtls::Decision;

/// mTLS gate - client certificate verification and allow-listing
#[derive(Parser, Debug)]
#[command(name = "mtls-gate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "MTLS_GATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "MTLS_GATE_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "MTLS_GATE_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the configuration and trust anchor, then report what was loaded
    Validate,

    /// Evaluate a PEM client certificate (leaf first) against the gate
    Check {
        /// Path to the client certificate PEM file
        #[arg(long, required = true)]
        cert: PathBuf,

        /// Remote address reported in diagnostics
        #[arg(long, default_value = "cli")]
        remote_addr: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Output format for `check`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable line
    Text,
    /// Single JSON object
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommand output
// ─────────────────────────────────────────────────────────────────────────────

/// Process exit code for a `check` decision: 0 on forward, 1 on reject.
pub fn check_exit_code(decision: &Decision) -> u8 {
    u8::from(!decision.is_forward())
}

/// Render a `check` decision in the requested format.
pub fn render_check(decision: &Decision, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let body = match decision {
                Decision::Forward => json!({ "decision": "forward" }),
                Decision::Reject(r) => json!({
                    "decision": "reject",
                    "status": r.status.as_u16(),
                    "text": &*r.text,
                    "reason": r.reason.to_string(),
                }),
            };
            body.to_string()
        }
        OutputFormat::Text => match decision {
            Decision::Forward => "forward".to_string(),
            Decision::Reject(r) => {
                format!("reject {} {}: {}", r.status.as_u16(), r.text, r.reason)
            }
        },
    }
}

/// Lines printed by `validate` for a trust store holding `anchors` roots.
pub fn render_validate(anchors: usize) -> Vec<String> {
    let mut lines = vec![format!("Configuration OK: {anchors} trust anchor(s) loaded")];
    if anchors == 0 {
        lines.push("Warning: no usable trust anchor, every client will be rejected".to_string());
    }
    lines
}
