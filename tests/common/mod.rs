//! Certificate fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mtls_gate::mtls::{AccessGate, DecisionLog, GateConfig, GateEvent, Outcome, TrustStore};
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, Issuer, KeyPair, date_time_ymd,
};
use rustls::pki_types::CertificateDer;

/// A throwaway root CA.
pub struct TestCa {
    issuer: Issuer<'static, KeyPair>,
    pub pem: String,
}

impl TestCa {
    pub fn new(cn: &str) -> Self {
        let key = KeyPair::generate().expect("CA key generation failed");
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, cn);
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let cert = params.self_signed(&key).expect("CA self-signing failed");
        Self {
            pem: cert.pem(),
            issuer: Issuer::new(params, key),
        }
    }

    /// Client-auth leaf with subject CN and optional serialNumber.
    pub fn client_cert(&self, cn: &str, serial: Option<&str>) -> CertificateDer<'static> {
        self.sign(leaf_params(cn, serial, ExtendedKeyUsagePurpose::ClientAuth))
    }

    /// Leaf that expired in 2001.
    pub fn expired_cert(&self, cn: &str) -> CertificateDer<'static> {
        let mut params = leaf_params(cn, None, ExtendedKeyUsagePurpose::ClientAuth);
        params.not_before = date_time_ymd(2000, 1, 1);
        params.not_after = date_time_ymd(2001, 1, 1);
        self.sign(params)
    }

    /// Leaf only valid for server authentication.
    pub fn server_cert(&self, cn: &str) -> CertificateDer<'static> {
        self.sign(leaf_params(cn, None, ExtendedKeyUsagePurpose::ServerAuth))
    }

    /// PEM encoding of a freshly issued client-auth leaf.
    pub fn client_cert_pem(&self, cn: &str, serial: Option<&str>) -> String {
        let key = KeyPair::generate().expect("leaf key generation failed");
        leaf_params(cn, serial, ExtendedKeyUsagePurpose::ClientAuth)
            .signed_by(&key, &self.issuer)
            .expect("leaf signing failed")
            .pem()
    }

    fn sign(&self, params: CertificateParams) -> CertificateDer<'static> {
        let key = KeyPair::generate().expect("leaf key generation failed");
        params
            .signed_by(&key, &self.issuer)
            .expect("leaf signing failed")
            .der()
            .clone()
    }
}

fn leaf_params(cn: &str, serial: Option<&str>, eku: ExtendedKeyUsagePurpose) -> CertificateParams {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    if let Some(serial) = serial {
        dn.push(DnType::CustomDnType(vec![2, 5, 4, 5]), serial);
    }
    params.distinguished_name = dn;
    params.extended_key_usages = vec![eku];
    params
}

/// Convert a string slice list into a configured allow-list.
pub fn allow(values: &[&str]) -> Option<Vec<String>> {
    Some(values.iter().map(|s| (*s).to_owned()).collect())
}

/// Gate trusting `ca`, reporting to `log`.
pub fn gate_for(ca: &TestCa, config: &GateConfig, log: Arc<RecordingLog>) -> AccessGate {
    let store = TrustStore::from_pem(ca.pem.as_bytes()).expect("trust store");
    AccessGate::new(config, Arc::new(store))
        .expect("gate")
        .with_decision_log(log)
}

/// Decision log spy.
#[derive(Default)]
pub struct RecordingLog {
    forwarded: Mutex<Vec<String>>,
    rejected: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn forwarded(&self) -> Vec<String> {
        self.forwarded.lock().unwrap().clone()
    }

    pub fn rejected(&self) -> Vec<String> {
        self.rejected.lock().unwrap().clone()
    }
}

impl DecisionLog for RecordingLog {
    fn record(&self, event: &GateEvent<'_>) {
        match event.outcome {
            Outcome::Forwarded { identity } => self
                .forwarded
                .lock()
                .unwrap()
                .push(identity.display_name.clone()),
            Outcome::Rejected { reason } => self.rejected.lock().unwrap().push(reason.to_string()),
        }
    }
}
