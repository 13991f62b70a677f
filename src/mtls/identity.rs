//! Certificate identity extraction.
//!
//! Parses an X.509 DER-encoded certificate and extracts the subject fields
//! used by the allow-lists: Common Name and the `serialNumber` DN attribute.
//!
//! The subject `serialNumber` (OID 2.5.4.5) is a naming attribute, unrelated
//! to the certificate's own serial number assigned by the issuer.

use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;
use x509_parser::x509::X509Name;

use crate::{Error, Result};

/// Dotted form of the X.520 `serialNumber` attribute type.
const SERIAL_NUMBER_OID: &str = "2.5.4.5";

// ─────────────────────────────────────────────────────────────────────────────
// Certificate identity
// ─────────────────────────────────────────────────────────────────────────────

/// Subject fields of a verified client certificate.
///
/// An attribute missing from the subject is the empty string, so an
/// allow-list entry of `""` admits certificates without that attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertIdentity {
    /// Subject Common Name (CN).
    pub common_name: String,

    /// Subject `serialNumber` attribute.
    pub serial_number: String,

    /// Pre-computed human-readable label for logs.
    pub display_name: String,
}

impl CertIdentity {
    /// Parse a DER-encoded certificate and extract its subject fields.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the certificate cannot be parsed.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| Error::Config(format!("Failed to parse client certificate: {e}")))?;

        let subject = cert.subject();
        let common_name = extract_cn(subject);
        let serial_number = extract_serial_number(subject);
        let display_name = build_display_name(&common_name, &serial_number);

        Ok(Self {
            common_name,
            serial_number,
            display_name,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Last string-valued CN attribute of the subject DN.
///
/// A later attribute of the same type overrides an earlier one.
fn extract_cn(subject: &X509Name<'_>) -> String {
    subject
        .iter_common_name()
        .filter_map(|attr| attr.as_str().ok())
        .last()
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Last string-valued `serialNumber` attribute of the subject DN.
fn extract_serial_number(subject: &X509Name<'_>) -> String {
    subject
        .iter_attributes()
        .filter(|attr| attr.attr_type().to_id_string() == SERIAL_NUMBER_OID)
        .filter_map(|attr| attr.as_str().ok())
        .last()
        .map(str::to_owned)
        .unwrap_or_default()
}

/// `CN` or `CN (serial)`; `"<unknown>"` for an empty subject.
fn build_display_name(cn: &str, serial: &str) -> String {
    match (cn.is_empty(), serial.is_empty()) {
        (true, true) => "<unknown>".to_owned(),
        (false, true) => cn.to_owned(),
        (true, false) => format!("serial {serial}"),
        (false, false) => format!("{cn} ({serial})"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
