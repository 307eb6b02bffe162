// src/core/scanner/ssl_scanner.rs

use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info};
use x509_parser::prelude::*;

use crate::core::error::ProbeError;
use crate::core::models::RiskTier;

/// Certificates expiring within this many days are flagged.
const EXPIRY_WARNING_DAYS: i64 = 30;

/// The validity window of the certificate served on port 443.
#[derive(Debug, Clone)]
pub struct CertificateInfo {
    pub subject_name: String,
    pub issuer_name: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateInfo {
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.not_after.signed_duration_since(now).num_days()
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now > self.not_before && now < self.not_after
    }
}

/// Connects to `host:443`, completes a TLS handshake and parses the peer certificate.
///
/// The native-tls handshake is blocking, so it runs on the blocking pool.
pub async fn fetch_certificate(host: &str, timeout: Duration) -> Result<CertificateInfo, ProbeError> {
    info!(host, "Inspecting TLS certificate.");
    let host_owned = host.to_string();
    spawn_blocking(move || perform_tls_handshake(&host_owned, timeout))
        .await
        .unwrap_or_else(|e| {
            error!(panic = %e, "Blocking TLS task panicked!");
            Err(ProbeError::Tls(format!("Task panicked: {e}")))
        })
}

fn perform_tls_handshake(host: &str, timeout: Duration) -> Result<CertificateInfo, ProbeError> {
    let connector = TlsConnector::builder()
        // Validity is judged below; an untrusted chain must not hide the dates.
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(|e| ProbeError::Tls(format!("TlsConnector Error: {e}")))?;

    debug!(host, "Connecting TCP stream to port 443.");
    let addr = (host, 443)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| ProbeError::Tls(format!("{host} did not resolve to any address")))?;
    let stream = TcpStream::connect_timeout(&addr, timeout)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let stream = connector
        .connect(host, stream)
        .map_err(|e| ProbeError::Tls(format!("TLS Handshake Error: {e}")))?;

    let cert = stream
        .peer_certificate()
        .map_err(|e| ProbeError::Tls(format!("Could not get peer certificate: {e}")))?
        .ok_or_else(|| ProbeError::Tls("Server did not provide a certificate".to_string()))?;

    let cert_der = cert
        .to_der()
        .map_err(|e| ProbeError::Tls(format!("Could not convert certificate to DER: {e}")))?;

    let (_, x509) = parse_x509_certificate(&cert_der)
        .map_err(|e| ProbeError::Tls(format!("X.509 Parse Error: {e}")))?;

    let validity = x509.validity();
    let info = CertificateInfo {
        subject_name: x509.subject().to_string(),
        issuer_name: x509.issuer().to_string(),
        not_before: asn1_time_to_chrono_utc(&validity.not_before),
        not_after: asn1_time_to_chrono_utc(&validity.not_after),
    };
    info!(subject = %info.subject_name, issuer = %info.issuer_name, "Parsed certificate.");
    Ok(info)
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

/// Expired or not-yet-valid certificates are critical; expiring soon is a warning.
pub fn analyze_certificate(info: &CertificateInfo, now: DateTime<Utc>) -> Option<(RiskTier, String)> {
    if !info.is_valid_at(now) {
        return Some((
            RiskTier::Critical,
            format!("Certificate outside its validity window (expires {})", info.not_after.format("%Y-%m-%d")),
        ));
    }
    let days = info.days_until_expiry(now);
    if days <= EXPIRY_WARNING_DAYS {
        return Some((RiskTier::Warning, format!("Certificate expires in {days} days")));
    }
    None
}
