//! TLS dialers and the pool they are drawn from
//!
//! Certificates are read, not trusted: every dialer uses a verifier that accepts
//! whatever chain the server presents so that expired and self-signed
//! certificates can still be inspected.

use crate::models::HostTarget;
use crate::utils::{CheckError, ConfigError};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as RustlsError, SignatureScheme};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

/// A certificate verifier that accepts any certificate.
#[derive(Debug)]
struct AcceptAnyCertVerifier {
    schemes: Vec<SignatureScheme>,
}

impl ServerCertVerifier for AcceptAnyCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.schemes.clone()
    }
}

/// Build the client configuration shared by every dialer
fn permissive_client_config() -> Result<ClientConfig, ConfigError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let schemes = provider
        .signature_verification_algorithms
        .supported_schemes();

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ConfigError::InvalidValue {
            key: "tls".to_string(),
            message: e.to_string(),
        })?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertVerifier { schemes }))
        .with_no_client_auth();

    Ok(config)
}

/// Opens TLS connections with a fixed timeout
pub struct Dialer {
    timeout: Duration,
    connector: TlsConnector,
}

impl Dialer {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve, connect and complete the TLS handshake within the timeout.
    ///
    /// Every failure, including an invalid server name, becomes a dial error.
    pub async fn connect(&self, target: &HostTarget) -> Result<TlsStream<TcpStream>, CheckError> {
        let host = target.host();
        let port = target.port();

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| CheckError::dial(host, port, format!("invalid server name: {}", host)))?;

        let handshake = async {
            let tcp = TcpStream::connect(target.socket_addr())
                .await
                .map_err(|e| CheckError::dial(host, port, e.to_string()))?;

            self.connector
                .connect(server_name, tcp)
                .await
                .map_err(|e| CheckError::dial(host, port, format!("tls handshake: {}", e)))
        };

        tokio::time::timeout(self.timeout, handshake)
            .await
            .map_err(|_| {
                CheckError::dial(
                    host,
                    port,
                    format!("i/o timeout after {}ms", self.timeout.as_millis()),
                )
            })?
    }
}

/// Pool of reusable dialers keyed by timeout.
///
/// A dialer is handed out to exactly one caller at a time and comes back on drop
/// of its [`PooledDialer`] guard. At most `max_idle` dialers are kept per key.
pub struct DialerPool {
    config: Arc<ClientConfig>,
    idle: Mutex<HashMap<Duration, Vec<Dialer>>>,
    max_idle: usize,
}

impl DialerPool {
    pub fn new(max_idle: usize) -> Result<Arc<Self>, ConfigError> {
        Ok(Arc::new(Self {
            config: Arc::new(permissive_client_config()?),
            idle: Mutex::new(HashMap::new()),
            max_idle: max_idle.max(1),
        }))
    }

    /// Take an idle dialer for `timeout`, creating one if none is available
    pub fn acquire(self: &Arc<Self>, timeout: Duration) -> PooledDialer {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&timeout)
            .and_then(Vec::pop);

        let dialer = reused.unwrap_or_else(|| Dialer {
            timeout,
            connector: TlsConnector::from(Arc::clone(&self.config)),
        });

        PooledDialer {
            dialer: Some(dialer),
            pool: Arc::clone(self),
        }
    }

    /// Number of idle dialers currently held for `timeout`
    pub fn idle_count(&self, timeout: Duration) -> usize {
        self.idle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&timeout)
            .map_or(0, Vec::len)
    }

    fn release(&self, dialer: Dialer) {
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        let slot = idle.entry(dialer.timeout).or_default();
        if slot.len() < self.max_idle {
            slot.push(dialer);
        }
    }
}

/// Exclusive handle to a pooled dialer
pub struct PooledDialer {
    dialer: Option<Dialer>,
    pool: Arc<DialerPool>,
}

impl Deref for PooledDialer {
    type Target = Dialer;

    fn deref(&self) -> &Dialer {
        self.dialer.as_ref().expect("dialer is only taken in drop")
    }
}

impl Drop for PooledDialer {
    fn drop(&mut self) {
        if let Some(dialer) = self.dialer.take() {
            self.pool.release(dialer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_returns_dialer_to_pool() {
        let pool = DialerPool::new(4).unwrap();
        let timeout = Duration::from_millis(500);

        let first = pool.acquire(timeout);
        let second = pool.acquire(timeout);
        assert_eq!(pool.idle_count(timeout), 0);

        drop(first);
        drop(second);
        assert_eq!(pool.idle_count(timeout), 2);

        let _again = pool.acquire(timeout);
        assert_eq!(pool.idle_count(timeout), 1);
    }

    #[test]
    fn test_pool_keyed_by_timeout() {
        let pool = DialerPool::new(4).unwrap();
        drop(pool.acquire(Duration::from_secs(1)));

        assert_eq!(pool.idle_count(Duration::from_secs(1)), 1);
        assert_eq!(pool.idle_count(Duration::from_secs(2)), 0);

        let other = pool.acquire(Duration::from_secs(2));
        assert_eq!(other.timeout(), Duration::from_secs(2));
        assert_eq!(pool.idle_count(Duration::from_secs(1)), 1);
    }

    #[test]
    fn test_idle_list_is_bounded() {
        let pool = DialerPool::new(2).unwrap();
        let timeout = Duration::from_secs(1);
        let held: Vec<_> = (0..5).map(|_| pool.acquire(timeout)).collect();
        drop(held);
        assert_eq!(pool.idle_count(timeout), 2);
    }

    #[tokio::test]
    async fn test_connect_refused_is_dial_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port().to_string();
        drop(listener);

        let pool = DialerPool::new(1).unwrap();
        let dialer = pool.acquire(Duration::from_secs(2));
        let target = HostTarget::new("127.0.0.1", Some(&port)).unwrap();

        match dialer.connect(&target).await {
            Err(CheckError::Dial { host, port: p, .. }) => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(p, port);
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connection to a closed port succeeded"),
        }
    }
}
