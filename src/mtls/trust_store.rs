//! Trust anchor handling and client certificate chain verification.
//!
//! The [`TrustStore`] is built once at startup from a PEM bundle and is
//! read-only afterwards; share it behind an `Arc`.
//!
//! # Permissive parsing
//!
//! PEM blocks that fail to decode, and certificates that cannot be turned into
//! a trust anchor, are skipped.  A bundle that yields zero anchors still
//! produces a store; [`TrustStore::is_empty`] reports it and every subsequent
//! verification fails with [`ChainVerificationError::NoTrustAnchors`].
//! [`TrustStore::load`] can turn that condition into a startup failure.

use std::fmt;
use std::fs;
use std::sync::Arc;

use rustls::RootCertStore;
use rustls::pki_types::{CertificateDer, UnixTime};
use rustls::server::WebPkiClientVerifier;
use rustls::server::danger::ClientCertVerifier;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Verification error
// ─────────────────────────────────────────────────────────────────────────────

/// Why a client certificate failed X.509 path validation.
#[derive(Debug, Clone, Error)]
pub enum ChainVerificationError {
    /// The trust store holds no usable root certificate.
    #[error("trust store holds no usable root certificates")]
    NoTrustAnchors,

    /// WebPKI rejected the certificate (untrusted issuer, expired, wrong
    /// extended key usage, malformed encoding, ...).
    #[error("{0}")]
    Rejected(#[source] rustls::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Trust store
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable set of trusted roots with a client-auth verifier built over them.
pub struct TrustStore {
    /// `None` when no anchor could be parsed.
    verifier: Option<Arc<dyn ClientCertVerifier>>,
    anchor_count: usize,
}

impl fmt::Debug for TrustStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustStore")
            .field("anchor_count", &self.anchor_count)
            .finish_non_exhaustive()
    }
}

impl TrustStore {
    /// Build a trust store from raw PEM bytes.
    ///
    /// Unparsable blocks are skipped, see the module docs.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the WebPKI verifier cannot be built over the
    /// parsed anchors.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let ders = pem_sections(pem).into_iter().flat_map(|section| {
            let mut reader = section;
            rustls_pemfile::certs(&mut reader)
                .filter_map(|item| match item {
                    Ok(der) => Some(der),
                    Err(e) => {
                        debug!(error = %e, "Skipping unreadable PEM block in trust anchor");
                        None
                    }
                })
                .collect::<Vec<_>>()
        });

        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(ders);
        if ignored > 0 {
            debug!(ignored, "Skipped certificates unusable as trust anchors");
        }

        let verifier = if added == 0 {
            None
        } else {
            Some(build_client_verifier(roots)?)
        };

        Ok(Self {
            verifier,
            anchor_count: added,
        })
    }

    /// Read the trust anchor bundle at `path` and build a store from it.
    ///
    /// With `strict` set, a bundle yielding zero anchors is an error instead
    /// of a warning.
    ///
    /// # Errors
    ///
    /// - `Error::TrustAnchorUnreadable` if the file cannot be read.
    /// - `Error::EmptyTrustAnchor` if `strict` and no anchor was parsed.
    pub fn load(path: &str, strict: bool) -> Result<Self> {
        let pem = fs::read(path).map_err(|source| Error::TrustAnchorUnreadable {
            path: path.to_string(),
            source,
        })?;
        let store = Self::from_pem(&pem)?;

        if store.is_empty() {
            if strict {
                return Err(Error::EmptyTrustAnchor(path.to_string()));
            }
            warn!(
                path = %path,
                "Trust anchor holds no usable certificates, every client will be rejected"
            );
        } else {
            debug!(path = %path, anchors = store.anchor_count, "Trust anchor loaded");
        }

        Ok(store)
    }

    /// Number of root certificates accepted as trust anchors.
    pub fn anchor_count(&self) -> usize {
        self.anchor_count
    }

    /// `true` when no root certificate could be parsed.
    pub fn is_empty(&self) -> bool {
        self.anchor_count == 0
    }

    /// Verify `cert` for client authentication against the trusted roots,
    /// using the current system time.
    pub fn verify_client_cert(
        &self,
        cert: &CertificateDer<'_>,
    ) -> std::result::Result<(), ChainVerificationError> {
        self.verify_client_cert_at(cert, UnixTime::now())
    }

    /// Verify `cert` for client authentication as of `now`.
    ///
    /// Only `cert` itself is offered to path building; no intermediate pool
    /// is consulted.
    pub fn verify_client_cert_at(
        &self,
        cert: &CertificateDer<'_>,
        now: UnixTime,
    ) -> std::result::Result<(), ChainVerificationError> {
        let verifier = self
            .verifier
            .as_ref()
            .ok_or(ChainVerificationError::NoTrustAnchors)?;

        verifier
            .verify_client_cert(cert, &[], now)
            .map(|_| ())
            .map_err(ChainVerificationError::Rejected)
    }
}

const PEM_BEGIN: &[u8] = b"-----BEGIN";

/// Split `pem` at every `-----BEGIN` marker.
///
/// Each section is parsed on its own, so a truncated or corrupt block cannot
/// swallow the blocks after it.  Text before the first marker is dropped.
fn pem_sections(pem: &[u8]) -> Vec<&[u8]> {
    let starts: Vec<usize> = pem
        .windows(PEM_BEGIN.len())
        .enumerate()
        .filter(|(_, window)| *window == PEM_BEGIN)
        .map(|(offset, _)| offset)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(pem.len());
            &pem[start..end]
        })
        .collect()
}

/// Build a `WebPkiClientVerifier` over `roots` with the aws-lc-rs provider.
fn build_client_verifier(roots: RootCertStore) -> Result<Arc<dyn ClientCertVerifier>> {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build client verifier: {e}")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
