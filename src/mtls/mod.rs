//! Mutual TLS (mTLS) client authentication gate.
//!
//! Decides, per request, whether the caller presented a client certificate
//! that chains to the configured trust anchor, is valid for client
//! authentication, and matches the optional identity allow-lists.
//!
//! # Architecture
//!
//! ```text
//! startup:  GateConfig ─→ TrustStore::load(root_cert) ─→ AccessGate
//! request:  transport TLS state ─→ AccessGate::evaluate ─→ Decision
//!                                        └─→ DecisionLog (diagnostics)
//! ```
//!
//! # Modules
//!
//! - [`config`]: YAML configuration (`GateConfig`)
//! - [`trust_store`]: trust anchor parsing and WebPKI chain verification
//! - [`identity`]: subject CN / serialNumber extraction (`CertIdentity`)
//! - [`access_control`]: ordered checks and the `Decision` type
//! - [`audit`]: injectable decision log
//!
//! # Quick start
//!
//! ```yaml
//! gate:
//!   root_cert: "/etc/mtls-gate/ca.crt"
//!   common_names: ["ci-runner"]
//! ```

pub mod access_control;
pub mod audit;
pub mod config;
pub mod identity;
pub mod trust_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use access_control::{AccessGate, AllowList, Decision, RejectReason, Rejection, TlsState};
pub use audit::{DecisionLog, GateEvent, Outcome, TracingDecisionLog};
pub use config::GateConfig;
pub use identity::CertIdentity;
pub use trust_store::{ChainVerificationError, TrustStore};
