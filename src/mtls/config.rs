//! mTLS gate configuration types.
//!
//! Defines the YAML-deserialisable configuration for the gate: the trust
//! anchor path, the uniform rejection response, and the optional identity
//! allow-lists.
//!
//! # Example YAML
//!
//! ```yaml
//! gate:
//!   root_cert: "/etc/mtls-gate/ca.crt"
//!   status_code: 403
//!   status_text: "Forbidden"
//!   common_names: ["ci-runner", "deploy-bot"]
//!   # serial_numbers omitted: no serial-number restriction
//! ```
//!
//! The camelCase keys used by Traefik plugin configuration (`rootCert`,
//! `statusCode`, `statusText`, `commonNames`, `serialNumbers`) are accepted
//! as aliases.

use serde::{Deserialize, Serialize};

/// Default HTTP status returned for every rejection.
pub const DEFAULT_STATUS_CODE: u16 = 403;

/// Default body text returned for every rejection.
pub const DEFAULT_STATUS_TEXT: &str = "Forbidden";

/// Gate configuration block.
///
/// The allow-lists are tri-state:
///
/// | YAML | value | effect |
/// |------|-------|--------|
/// | absent / `null` | `None` | check skipped |
/// | `[]` | `Some(vec![])` | every certificate rejected |
/// | `["a", "b"]` | `Some(..)` | exact membership check |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GateConfig {
    /// Path to the PEM-encoded root certificate bundle used as trust anchor.
    #[serde(alias = "rootCert")]
    pub root_cert: String,

    /// HTTP status used for all rejections.
    #[serde(alias = "statusCode")]
    pub status_code: u16,

    /// Body text used for all rejections.
    #[serde(alias = "statusText")]
    pub status_text: String,

    /// Allowed subject common names.
    #[serde(alias = "commonNames")]
    pub common_names: Option<Vec<String>>,

    /// Allowed subject serial numbers (the DN `serialNumber` attribute).
    #[serde(alias = "serialNumbers")]
    pub serial_numbers: Option<Vec<String>>,

    /// Fail startup when the trust anchor yields zero usable certificates.
    ///
    /// When `false` (default) such a trust anchor is accepted with a warning
    /// and every request is subsequently rejected.
    #[serde(alias = "strictTrustAnchor")]
    pub strict_trust_anchor: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            root_cert: String::new(),
            status_code: DEFAULT_STATUS_CODE,
            status_text: DEFAULT_STATUS_TEXT.to_string(),
            common_names: None,
            serial_numbers: None,
            strict_trust_anchor: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rejection_is_403_forbidden() {
        let cfg = GateConfig::default();
        assert_eq!(cfg.status_code, 403);
        assert_eq!(cfg.status_text, "Forbidden");
    }

    #[test]
    fn allow_lists_default_to_unset() {
        let cfg = GateConfig::default();
        assert!(cfg.common_names.is_none());
        assert!(cfg.serial_numbers.is_none());
        assert!(!cfg.strict_trust_anchor);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        // GIVEN: only the trust anchor path
        let yaml = "root_cert: /etc/ca.crt";
        let cfg: GateConfig = serde_yaml::from_str(yaml).unwrap();
        // THEN: rejection response and allow-lists keep their defaults
        assert_eq!(cfg.root_cert, "/etc/ca.crt");
        assert_eq!(cfg.status_code, 403);
        assert_eq!(cfg.status_text, "Forbidden");
        assert!(cfg.common_names.is_none());
    }

    #[test]
    fn explicit_null_allow_list_is_unset() {
        let yaml = "root_cert: ca.crt\ncommon_names: null";
        let cfg: GateConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.common_names.is_none());
    }

    #[test]
    fn empty_allow_list_is_distinct_from_unset() {
        // GIVEN: an explicitly empty serial-number list
        let yaml = "root_cert: ca.crt\nserial_numbers: []";
        let cfg: GateConfig = serde_yaml::from_str(yaml).unwrap();
        // THEN: set-and-empty, not unset
        assert_eq!(cfg.serial_numbers, Some(vec![]));
    }

    #[test]
    fn camel_case_plugin_keys_are_accepted() {
        let yaml = r#"
rootCert: "/certs/root.pem"
statusCode: 401
statusText: "Unauthorized"
commonNames: ["alice", "bob"]
serialNumbers: ["0001"]
"#;
        let cfg: GateConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.root_cert, "/certs/root.pem");
        assert_eq!(cfg.status_code, 401);
        assert_eq!(cfg.status_text, "Unauthorized");
        assert_eq!(
            cfg.common_names.as_deref(),
            Some(&["alice".to_string(), "bob".to_string()][..])
        );
        assert_eq!(cfg.serial_numbers, Some(vec!["0001".to_string()]));
    }
}
