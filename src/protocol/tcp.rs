// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP transport for HS100/HS110 plugs.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{Error, ProtocolError, TransportError};
use crate::protocol::{Protocol, cipher};

// ============================================================================
// TcpConfig - Connection parameters
// ============================================================================

/// Configuration for reaching a plug over TCP.
///
/// # Examples
///
/// ```
/// use hs100::protocol::TcpConfig;
/// use std::time::Duration;
///
/// let config = TcpConfig::new("192.168.0.1")
///     .with_port(9999)
///     .with_timeout(Duration::from_secs(3));
///
/// assert_eq!(config.address(), "192.168.0.1:9999");
/// ```
#[derive(Debug, Clone)]
pub struct TcpConfig {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpConfig {
    /// Default port the plug listens on.
    pub const DEFAULT_PORT: u16 = 9999;
    /// Default connect and read timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Size of the single read that receives a reply.
    pub const RECEIVE_BUFFER: usize = 4096;

    /// Creates a configuration for the given host with default port and timeout.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect and read timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the `host:port` string that is dialed.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Creates a `TcpClient` from this configuration.
    #[must_use]
    pub fn into_client(self) -> TcpClient {
        TcpClient { config: self }
    }
}

// ============================================================================
// TcpClient
// ============================================================================

/// Client that performs one framed exchange per TCP connection.
///
/// There is no pooling or keep-alive: every [`Protocol::call`] connects,
/// writes one frame, reads the reply with a single bounded read and closes
/// the connection. A reply larger than [`TcpConfig::RECEIVE_BUFFER`] is
/// truncated and fails to parse.
///
/// # Examples
///
/// ```no_run
/// use hs100::protocol::{Protocol, TcpClient, envelope};
///
/// # async fn example() -> hs100::Result<()> {
/// let client = TcpClient::new("192.168.0.1");
/// let reply = client.call(&envelope("system", "get_sysinfo", None)).await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TcpClient {
    config: TcpConfig,
}

impl TcpClient {
    /// Creates a client for the given host on the default port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        TcpConfig::new(host).into_client()
    }

    /// Returns the configuration of this client.
    #[must_use]
    pub fn config(&self) -> &TcpConfig {
        &self.config
    }

    /// Performs the raw exchange and returns the undecoded reply frame.
    async fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>, TransportError> {
        // A (host, port) pair resolves IPv6 literals that `address()` cannot.
        let target = (self.config.host.as_str(), self.config.port);

        let mut stream = self
            .with_timeout(TcpStream::connect(target))
            .await?
            .map_err(|source| TransportError::ConnectionFailed {
                address: self.config.address(),
                source,
            })?;

        stream.write_all(frame).await?;

        let mut buffer = vec![0; TcpConfig::RECEIVE_BUFFER];
        let received = self.with_timeout(stream.read(&mut buffer)).await??;
        buffer.truncate(received);

        // Best effort; the reply is already in hand.
        let _ = stream.shutdown().await;

        Ok(buffer)
    }

    async fn with_timeout<F: Future>(&self, future: F) -> Result<F::Output, TransportError> {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, future).await.map_err(|_| {
            TransportError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
        })
    }
}

impl Protocol for TcpClient {
    async fn call(&self, envelope: &Value) -> Result<Value, Error> {
        let request = envelope.to_string();
        tracing::debug!(address = %self.config.address(), request = %request, "Sending command");

        let frame = cipher::encode(request.as_bytes());
        let reply = self.exchange(&frame).await?;
        tracing::trace!(sent = frame.len(), received = reply.len(), "Frame exchanged");

        if let Some(declared) = cipher::declared_length(&reply) {
            let actual = reply.len() - cipher::PREFIX_LEN;
            if usize::try_from(declared).ok() != Some(actual) {
                tracing::debug!(declared, actual, "Reply length prefix does not match payload");
            }
        }

        let decoded = cipher::decode(&reply);
        let value: Value = serde_json::from_slice(&decoded).map_err(ProtocolError::Json)?;

        tracing::debug!(reply = %value, "Received reply");

        Ok(value)
    }
}
