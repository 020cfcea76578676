use crate::prelude::*;

use {
    async_trait::async_trait,
    net2::TcpStreamExt,
    std::time::Duration,
    tokio::io::{AsyncReadExt, AsyncWriteExt},
    tokio::net::TcpStream,
};

const CONNECT_TIMEOUT_SECS: u64 = 10; // Timeout for the initial TCP connect
const WRITE_TIMEOUT_SECS: u64 = 5; // Timeout for write operations
const READ_TIMEOUT_SECS: u64 = 10; // Timeout waiting for the logger's answer
const TCP_KEEPALIVE_SECS: u64 = 60; // TCP keepalive interval

// Responses fit comfortably; the biggest configured range is 64 registers.
const RECEIVE_BUFFER_SIZE: usize = 1024;

/// Byte-level transport to an already-established logger connection.
///
/// The poll loop only ever needs these two calls; having them behind a trait
/// keeps the codec and orchestrator testable without a socket. A caller
/// wanting cancellation drops the future mid-call and treats it as a
/// transport failure.
#[async_trait]
pub trait Transport {
    async fn send(&mut self, bytes: &[u8]) -> Result<()>;
    async fn receive(&mut self) -> Result<Vec<u8>>;
}

/// TCP connection to the Solarman logger stick, usually port 8899.
pub struct DataLogger {
    stream: TcpStream,
    host: String,
    port: u16,
}

impl DataLogger {
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        info!("connecting to data logger at {}:{}", host, port);

        let stream = match tokio::time::timeout(
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            TcpStream::connect((host, port)),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => bail!("failed to connect to {}:{}: {}", host, port, e),
            Err(_) => bail!(
                "connection to {}:{} timed out after {} seconds",
                host,
                port,
                CONNECT_TIMEOUT_SECS
            ),
        };

        // the logger stick drops idle connections; keepalive papers over that
        let std_stream = stream.into_std()?;
        if let Err(e) = std_stream.set_keepalive(Some(Duration::new(TCP_KEEPALIVE_SECS, 0))) {
            warn!("failed to set TCP keepalive: {}", e);
        }
        let stream = TcpStream::from_std(std_stream)?;

        if let Err(e) = stream.set_nodelay(true) {
            warn!("failed to set TCP_NODELAY: {}", e);
        }

        info!("connected to data logger at {}:{}", host, port);

        Ok(Self {
            stream,
            host: host.to_string(),
            port,
        })
    }
}

#[async_trait]
impl Transport for DataLogger {
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        debug!("TX {} bytes: {:02X?}", bytes.len(), bytes);

        match tokio::time::timeout(
            Duration::from_secs(WRITE_TIMEOUT_SECS),
            self.stream.write_all(bytes),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => bail!("write to {}:{} failed: {}", self.host, self.port, e),
            Err(_) => bail!(
                "write to {}:{} timed out after {} seconds",
                self.host,
                self.port,
                WRITE_TIMEOUT_SECS
            ),
        }
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        let mut buffer = [0u8; RECEIVE_BUFFER_SIZE];

        let count = match tokio::time::timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            self.stream.read(&mut buffer),
        )
        .await
        {
            Ok(Ok(0)) => bail!("data logger {}:{} closed the connection", self.host, self.port),
            Ok(Ok(count)) => count,
            Ok(Err(e)) => bail!("read from {}:{} failed: {}", self.host, self.port, e),
            Err(_) => bail!(
                "no response from {}:{} after {} seconds",
                self.host,
                self.port,
                READ_TIMEOUT_SECS
            ),
        };

        debug!("RX {} bytes: {:02X?}", count, &buffer[..count]);

        Ok(buffer[..count].to_vec())
    }
}
