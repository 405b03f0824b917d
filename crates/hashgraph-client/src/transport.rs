//! Wire transport: frames a signed-envelope payload with the 5-byte prefix
//! (1 compression flag + 4-byte big-endian length) used by the framed RPC
//! protocol, and exchanges it for a response of the same shape.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection refused")]
    ConnectionRefused,
    #[error("connection reset")]
    ConnectionReset,
    #[error("i/o error: {0}")]
    Io(String),
    #[error("response framing error: {0}")]
    Framing(&'static str),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// Length-prefixed TCP transport to a single node endpoint. One connection
/// is opened lazily on first use and reused; `hashgraph-client`'s
/// `Network` picks lazy connect over eager address-book probing (see the
/// design ledger's open-question entry).
pub struct TcpTransport {
    connection: Mutex<TcpStream>,
    total_exchanges: AtomicU64,
}

impl TcpTransport {
    pub async fn connect(addr: SocketAddr) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await.map_err(classify_connect_error)?;
        Ok(Self {
            connection: Mutex::new(stream),
            total_exchanges: AtomicU64::new(0),
        })
    }

    pub fn total_exchanges(&self) -> u64 {
        self.total_exchanges.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.total_exchanges.fetch_add(1, Ordering::Relaxed);
        let mut stream = self.connection.lock().await;

        let mut framed = Vec::with_capacity(5 + payload.len());
        framed.push(0); // uncompressed
        framed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        framed.extend_from_slice(payload);
        stream.write_all(&framed).await.map_err(classify_io_error)?;

        let mut header = [0u8; 5];
        stream.read_exact(&mut header).await.map_err(classify_io_error)?;
        let len = u32::from_be_bytes(header[1..5].try_into().unwrap());

        let mut body = vec![0u8; len as usize];
        stream.read_exact(&mut body).await.map_err(classify_io_error)?;
        Ok(body)
    }
}

fn classify_connect_error(err: std::io::Error) -> TransportError {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::ConnectionRefused => TransportError::ConnectionRefused,
        ErrorKind::ConnectionReset => TransportError::ConnectionReset,
        _ => TransportError::Io(err.to_string()),
    }
}

fn classify_io_error(err: std::io::Error) -> TransportError {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::ConnectionReset | ErrorKind::BrokenPipe | ErrorKind::UnexpectedEof => {
            TransportError::ConnectionReset
        }
        ErrorKind::ConnectionRefused => TransportError::ConnectionRefused,
        _ => TransportError::Io(err.to_string()),
    }
}

/// Test doubles for exercising the execution engine without a real socket.
/// Lives in-crate the way the teacher keeps its own hand-rolled transport
/// test double alongside the real transports, rather than reaching for a
/// mocking framework.
pub mod testing {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// A transport whose behavior per call is scripted by a closure,
    /// letting tests simulate `BUSY` responses, transport failures, or
    /// node-specific outcomes deterministically.
    pub struct ScriptedTransport<F>
    where
        F: Fn(&[u8], u64) -> Result<Vec<u8>, TransportError> + Send + Sync,
    {
        script: F,
        calls: AtomicU64,
    }

    impl<F> ScriptedTransport<F>
    where
        F: Fn(&[u8], u64) -> Result<Vec<u8>, TransportError> + Send + Sync,
    {
        pub fn new(script: F) -> Self {
            Self {
                script,
                calls: AtomicU64::new(0),
            }
        }

        pub fn call_count(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl<F> Transport for ScriptedTransport<F>
    where
        F: Fn(&[u8], u64) -> Result<Vec<u8>, TransportError> + Send + Sync,
    {
        async fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
            let call_index = self.calls.fetch_add(1, Ordering::Relaxed);
            (self.script)(payload, call_index)
        }
    }

    /// Always returns the same canned response bytes.
    pub struct FixedTransport {
        response: StdMutex<Vec<u8>>,
    }

    impl FixedTransport {
        pub fn new(response: Vec<u8>) -> Self {
            Self {
                response: StdMutex::new(response),
            }
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn exchange(&self, _payload: &[u8]) -> Result<Vec<u8>, TransportError> {
            Ok(self.response.lock().unwrap().clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;

    #[tokio::test]
    async fn scripted_transport_counts_calls() {
        let transport = ScriptedTransport::new(|_payload, _call| Ok(vec![1, 2, 3]));
        transport.exchange(b"a").await.unwrap();
        transport.exchange(b"b").await.unwrap();
        assert_eq!(transport.call_count(), 2);
    }
}
