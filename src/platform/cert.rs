//! Leaf Certificate Fetcher
//!
//! Completes a TLS handshake with a capture-only certificate verifier and
//! returns the leaf fields for inspection. Chain-of-trust validation is
//! deliberately absent - the checker wants to SEE what the network
//! presents, including certificates a real validator would reject.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use x509_parser::prelude::*;

use super::{CertFetchError, CertificateFetcher, LeafCertificate};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const HTTPS_PORT: u16 = 443;

pub struct RustlsCertificateFetcher {
    connector: TlsConnector,
    connect_timeout: Duration,
    handshake_timeout: Duration,
}

impl RustlsCertificateFetcher {
    pub fn new() -> Self {
        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(CaptureOnlyVerifier))
            .with_no_client_auth();
        Self {
            connector: TlsConnector::from(Arc::new(config)),
            connect_timeout: CONNECT_TIMEOUT,
            handshake_timeout: HANDSHAKE_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, handshake: Duration) -> Self {
        self.connect_timeout = connect;
        self.handshake_timeout = handshake;
        self
    }
}

impl Default for RustlsCertificateFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CertificateFetcher for RustlsCertificateFetcher {
    async fn fetch_leaf(&self, host: &str) -> Result<LeafCertificate, CertFetchError> {
        let endpoint = host.to_string();
        let server_name =
            ServerName::try_from(endpoint.clone()).map_err(|e| CertFetchError::Connect {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        let stream = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect((host, HTTPS_PORT)),
        )
        .await
        .map_err(|_| CertFetchError::Timeout {
            endpoint: endpoint.clone(),
        })?
        .map_err(|e| CertFetchError::Connect {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;

        let tls_stream = tokio::time::timeout(
            self.handshake_timeout,
            self.connector.connect(server_name, stream),
        )
        .await
        .map_err(|_| CertFetchError::Timeout {
            endpoint: endpoint.clone(),
        })?
        .map_err(|e| CertFetchError::Handshake {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;

        let (_, session) = tls_stream.get_ref();
        let leaf_der = session
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| CertFetchError::Malformed {
                endpoint: endpoint.clone(),
                message: "peer presented no certificate".to_string(),
            })?;

        let leaf = parse_leaf(&endpoint, leaf_der.as_ref())?;
        debug!("{}: leaf issuer={} subject={}", endpoint, leaf.issuer, leaf.subject);
        Ok(leaf)
    }
}

fn parse_leaf(endpoint: &str, der: &[u8]) -> Result<LeafCertificate, CertFetchError> {
    let (_, cert) =
        X509Certificate::from_der(der).map_err(|e| CertFetchError::Malformed {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

    let not_before = timestamp_to_utc(endpoint, cert.validity().not_before.timestamp())?;
    let not_after = timestamp_to_utc(endpoint, cert.validity().not_after.timestamp())?;

    Ok(LeafCertificate {
        issuer: cert.issuer().to_string(),
        subject: cert.subject().to_string(),
        not_before,
        not_after,
    })
}

fn timestamp_to_utc(endpoint: &str, seconds: i64) -> Result<DateTime<Utc>, CertFetchError> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| CertFetchError::Malformed {
        endpoint: endpoint.to_string(),
        message: "certificate validity time out of range".to_string(),
    })
}

/// Accepts every certificate so the leaf can be inspected even when a
/// MITM presents one no trust store would sign.
#[derive(Debug)]
struct CaptureOnlyVerifier;

impl ServerCertVerifier for CaptureOnlyVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
