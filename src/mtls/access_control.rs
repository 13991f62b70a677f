//! Per-request mTLS access decision.
//!
//! [`AccessGate::evaluate`] runs the following checks in order and stops at
//! the first failure:
//!
//! 1. The connection carries TLS state → else [`RejectReason::NoTls`].
//! 2. The peer presented at least one certificate →
//!    else [`RejectReason::NoPeerCertificate`].
//! 3. The first peer certificate chains to a trusted root and is valid for
//!    client authentication → else [`RejectReason::ChainVerification`].
//! 4. If a common-name allow-list is configured, the subject CN is in it →
//!    else [`RejectReason::CommonNameNotAllowed`].
//! 5. If a serial-number allow-list is configured, the subject serialNumber
//!    is in it → else [`RejectReason::SerialNumberNotAllowed`].
//!
//! Every rejection carries the same configured status code and text.  The
//! reason is only handed to the [`DecisionLog`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use rustls::pki_types::CertificateDer;
use thiserror::Error;

use crate::mtls::audit::{DecisionLog, GateEvent, Outcome, TracingDecisionLog};
use crate::mtls::config::GateConfig;
use crate::mtls::identity::CertIdentity;
use crate::mtls::trust_store::{ChainVerificationError, TrustStore};
use crate::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Transport-supplied connection state
// ─────────────────────────────────────────────────────────────────────────────

/// TLS state of one connection, as negotiated by the hosting transport.
///
/// The transport fills it from the negotiated connection, for rustls from
/// `peer_certificates()`.  Only the first entry is ever inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsState {
    /// Certificates presented by the client, leaf first.  Empty when the
    /// client did not authenticate.
    pub peer_certificates: Vec<CertificateDer<'static>>,
}

impl TlsState {
    /// TLS state with the given peer chain.
    pub fn new(peer_certificates: Vec<CertificateDer<'static>>) -> Self {
        Self { peer_certificates }
    }

    /// Peer chain read from PEM, leaf first.  Used for offline checks.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a PEM block cannot be decoded.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let mut reader = pem;
        let chain = rustls_pemfile::certs(&mut reader)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Config(format!("Failed to parse certificate PEM: {e}")))?;
        Ok(Self::new(chain))
    }

    /// The client's end-entity certificate, if any.
    pub fn leaf(&self) -> Option<&CertificateDer<'static>> {
        self.peer_certificates.first()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision types
// ─────────────────────────────────────────────────────────────────────────────

/// Why a request was rejected.  Diagnostic only, never sent to the client.
#[derive(Debug, Clone, Error)]
pub enum RejectReason {
    /// Plaintext request reached the gate.
    #[error("non-TLS request")]
    NoTls,

    /// TLS negotiated but the client presented no certificate.
    #[error("TLS request without client certificate")]
    NoPeerCertificate,

    /// The client certificate failed path validation.
    #[error("invalid client certificate ({0})")]
    ChainVerification(#[from] ChainVerificationError),

    /// The certificate verified but its subject could not be decoded.
    #[error("unreadable client certificate ({0})")]
    MalformedCertificate(String),

    /// Subject CN not in the configured allow-list.
    #[error("unknown common name: \"{0}\"")]
    CommonNameNotAllowed(String),

    /// Subject serialNumber not in the configured allow-list.
    #[error("unknown serial number: \"{0}\"")]
    SerialNumberNotAllowed(String),
}

/// The uniform rejection response plus the diagnostic reason.
#[derive(Debug, Clone)]
pub struct Rejection {
    /// HTTP status to send.
    pub status: StatusCode,
    /// Response body to send.
    pub text: Arc<str>,
    /// First failing check.
    pub reason: RejectReason,
}

/// Result of evaluating one request.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Hand the request, unmodified, to the downstream handler.
    Forward,
    /// Answer with the configured rejection response.
    Reject(Rejection),
}

impl Decision {
    /// `true` for [`Decision::Forward`].
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward)
    }

    /// The rejection, if this decision is one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Forward => None,
            Self::Reject(rejection) => Some(rejection),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Allow-list
// ─────────────────────────────────────────────────────────────────────────────

/// Compiled identity allow-list.
///
/// `Unrestricted` skips the check.  `Only` with an empty set rejects every
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList {
    /// No restriction configured.
    Unrestricted,
    /// Exact, case-sensitive membership.
    Only(HashSet<String>),
}

impl AllowList {
    /// Compile from the tri-state configuration value.
    pub fn from_config(entries: Option<&[String]>) -> Self {
        match entries {
            None => Self::Unrestricted,
            Some(values) => Self::Only(values.iter().cloned().collect()),
        }
    }

    /// Whether `value` passes this allow-list.
    pub fn permits(&self, value: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Only(allowed) => allowed.contains(value),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Access gate
// ─────────────────────────────────────────────────────────────────────────────

/// The per-request mTLS decision engine.
///
/// Build once at startup and share behind an `Arc`; there is no mutation
/// API after construction.
pub struct AccessGate {
    trust_store: Arc<TrustStore>,
    common_names: AllowList,
    serial_numbers: AllowList,
    status: StatusCode,
    status_text: Arc<str>,
    log: Arc<dyn DecisionLog>,
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("trust_store", &self.trust_store)
            .field("common_names", &self.common_names)
            .field("serial_numbers", &self.serial_numbers)
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .finish_non_exhaustive()
    }
}

impl AccessGate {
    /// Build a gate over an already constructed trust store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `config.status_code` is not a valid HTTP
    /// status code.
    pub fn new(config: &GateConfig, trust_store: Arc<TrustStore>) -> Result<Self> {
        let status = StatusCode::from_u16(config.status_code).map_err(|e| {
            Error::Config(format!("Invalid status_code {}: {e}", config.status_code))
        })?;

        Ok(Self {
            trust_store,
            common_names: AllowList::from_config(config.common_names.as_deref()),
            serial_numbers: AllowList::from_config(config.serial_numbers.as_deref()),
            status,
            status_text: Arc::from(config.status_text.as_str()),
            log: Arc::new(TracingDecisionLog),
        })
    }

    /// Load the trust anchor named by `config.root_cert` and build a gate.
    ///
    /// # Errors
    ///
    /// Fails if the trust anchor cannot be read, if it is empty while
    /// `strict_trust_anchor` is set, or if the status code is invalid.
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        let store = TrustStore::load(&config.root_cert, config.strict_trust_anchor)?;
        Self::new(config, Arc::new(store))
    }

    /// Replace the decision log (defaults to [`TracingDecisionLog`]).
    #[must_use]
    pub fn with_decision_log(mut self, log: Arc<dyn DecisionLog>) -> Self {
        self.log = log;
        self
    }

    /// The trust store this gate verifies against.
    pub fn trust_store(&self) -> &TrustStore {
        &self.trust_store
    }

    /// Decide whether a request may be forwarded.
    ///
    /// `tls` is `None` for plaintext connections.  `remote_addr` is used for
    /// diagnostics only.
    pub fn evaluate(&self, tls: Option<&TlsState>, remote_addr: &str) -> Decision {
        match self.check(tls) {
            Ok(identity) => {
                self.log.record(&GateEvent {
                    remote_addr,
                    outcome: Outcome::Forwarded {
                        identity: &identity,
                    },
                });
                Decision::Forward
            }
            Err(reason) => {
                self.log.record(&GateEvent {
                    remote_addr,
                    outcome: Outcome::Rejected { reason: &reason },
                });
                Decision::Reject(Rejection {
                    status: self.status,
                    text: Arc::clone(&self.status_text),
                    reason,
                })
            }
        }
    }

    fn check(&self, tls: Option<&TlsState>) -> std::result::Result<CertIdentity, RejectReason> {
        let tls = tls.ok_or(RejectReason::NoTls)?;
        let leaf = tls.leaf().ok_or(RejectReason::NoPeerCertificate)?;

        self.trust_store.verify_client_cert(leaf)?;

        let identity = CertIdentity::from_der(leaf)
            .map_err(|e| RejectReason::MalformedCertificate(e.to_string()))?;

        if !self.common_names.permits(&identity.common_name) {
            return Err(RejectReason::CommonNameNotAllowed(identity.common_name));
        }
        if !self.serial_numbers.permits(&identity.serial_number) {
            return Err(RejectReason::SerialNumberNotAllowed(identity.serial_number));
        }

        Ok(identity)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
