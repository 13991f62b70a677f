//! Diagnostic side-channel for gate decisions.
//!
//! Rejection reasons never reach the HTTP client; they are only reported
//! here.  The gate calls an injected [`DecisionLog`] so the decision path
//! itself performs no direct I/O.

use tracing::{debug, warn};

use crate::mtls::access_control::RejectReason;
use crate::mtls::identity::CertIdentity;

/// Outcome of one evaluation, as reported to the decision log.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// All checks passed; the request goes to the downstream handler.
    Forwarded {
        /// Identity of the accepted client certificate.
        identity: &'a CertIdentity,
    },
    /// A check failed; the client gets the uniform rejection response.
    Rejected {
        /// The first failing check.
        reason: &'a RejectReason,
    },
}

/// Structured event emitted once per evaluation.
#[derive(Debug, Clone, Copy)]
pub struct GateEvent<'a> {
    /// Remote address of the caller, as supplied by the transport.
    pub remote_addr: &'a str,
    /// What the gate decided.
    pub outcome: Outcome<'a>,
}

/// Sink for gate decisions.
///
/// Implementations must be cheap and non-blocking: `record` runs inline on
/// every request.
pub trait DecisionLog: Send + Sync {
    /// Record one decision.
    fn record(&self, event: &GateEvent<'_>);
}

/// Default [`DecisionLog`] writing `tracing` events.
///
/// Forwards are logged at `debug`, rejections at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDecisionLog;

impl DecisionLog for TracingDecisionLog {
    fn record(&self, event: &GateEvent<'_>) {
        match event.outcome {
            Outcome::Forwarded { identity } => debug!(
                remote_addr = %event.remote_addr,
                client = %identity.display_name,
                "Forwarding mTLS-authenticated request"
            ),
            Outcome::Rejected { reason } => warn!(
                remote_addr = %event.remote_addr,
                reason = %reason,
                "Rejecting request"
            ),
        }
    }
}
