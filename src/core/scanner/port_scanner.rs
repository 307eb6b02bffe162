// src/core/scanner/port_scanner.rs

use async_trait::async_trait;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

use super::{Probe, unsupported};
use crate::core::error::ProbeError;
use crate::core::knowledge_base::Candidate;
use crate::core::models::{FindingKind, Phase};
use crate::core::target::Target;

/// TCP connect probe. A completed handshake means the port is open.
pub struct PortProbe {
    timeout: Duration,
}

impl PortProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Probe for PortProbe {
    fn phase(&self) -> Phase {
        Phase::Ports
    }

    async fn probe(&self, candidate: &Candidate, target: &Target) -> Result<Option<FindingKind>, ProbeError> {
        let Candidate::Port(port) = candidate else {
            return Err(unsupported(self.phase(), candidate));
        };

        let connect = TcpStream::connect((target.as_str(), port.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_stream)) => {
                debug!(port = port.port, "Port open.");
                Ok(Some(FindingKind::Port { port: port.port, service: port.service.clone() }))
            }
            Ok(Err(e))
                if matches!(
                    e.kind(),
                    ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset | ErrorKind::TimedOut
                ) =>
            {
                debug!(port = port.port, error = %e, "Port closed.");
                Ok(None)
            }
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            // Silently dropped SYNs: the port is filtered, not open.
            Err(_) => {
                debug!(port = port.port, "Port filtered (connect timed out).");
                Ok(None)
            }
        }
    }
}
