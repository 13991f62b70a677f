//! `rcgen` fixtures shared by the unit tests of the `mtls` module.

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, Issuer, KeyPair, date_time_ymd,
};
use rustls::pki_types::CertificateDer;

/// OID of the X.520 `serialNumber` DN attribute.
const SERIAL_NUMBER_OID: [u64; 4] = [2, 5, 4, 5];

/// A throwaway root CA able to sign leaf certificates.
pub(crate) struct TestCa {
    issuer: Issuer<'static, KeyPair>,
    pub(crate) pem: String,
}

impl TestCa {
    pub(crate) fn new(cn: &str) -> Self {
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

    /// Issue a client-auth leaf with the given subject CN and serialNumber.
    pub(crate) fn client_cert(&self, cn: &str, serial: Option<&str>) -> CertificateDer<'static> {
        self.sign(leaf_params(cn, serial))
    }

    /// Sign arbitrary leaf parameters with this CA.
    pub(crate) fn sign(&self, params: CertificateParams) -> CertificateDer<'static> {
        let key = KeyPair::generate().expect("leaf key generation failed");
        params
            .signed_by(&key, &self.issuer)
            .expect("leaf signing failed")
            .der()
            .clone()
    }
}

/// Leaf parameters carrying the client-auth extended key usage.
pub(crate) fn leaf_params(cn: &str, serial: Option<&str>) -> CertificateParams {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    if let Some(serial) = serial {
        dn.push(DnType::CustomDnType(SERIAL_NUMBER_OID.to_vec()), serial);
    }
    params.distinguished_name = dn;
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];
    params
}

/// Leaf parameters whose validity period ended in 2001.
pub(crate) fn expired_leaf_params(cn: &str) -> CertificateParams {
    let mut params = leaf_params(cn, None);
    params.not_before = date_time_ymd(2000, 1, 1);
    params.not_after = date_time_ymd(2001, 1, 1);
    params
}

/// Leaf parameters usable for server authentication only.
pub(crate) fn server_only_leaf_params(cn: &str) -> CertificateParams {
    let mut params = leaf_params(cn, None);
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    params
}
