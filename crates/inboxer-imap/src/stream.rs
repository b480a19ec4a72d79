//! The byte stream an `async-imap` session runs over.
//!
//! Only two transports exist: implicit TLS on the configured port, and
//! plaintext for local servers and tests. STARTTLS upgrades are refused.

#![allow(clippy::missing_errors_doc)]

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, LazyLock};
use std::task::{Context, Poll};

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tracing::debug;

use crate::{Config, Error, Result, Security};

/// Client TLS settings shared by every connection: webpki roots, no client
/// certificate.
static TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let roots = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
});

/// Transport under an IMAP session.
pub enum ImapStream {
    /// Unencrypted TCP.
    Plain(TcpStream),
    /// TCP wrapped in TLS from the first byte.
    Tls(Box<TlsStream<TcpStream>>),
}

impl ImapStream {
    /// Connects as `config.security` asks, giving up after
    /// `config.connect_timeout`.
    pub async fn open(config: &Config) -> Result<Self> {
        let connect = async {
            match config.security {
                Security::Implicit => connect_tls(&config.host, config.port).await,
                Security::None => connect_plain(&config.host, config.port).await,
                Security::StartTls => Err(Error::UnsupportedSecurity),
            }
        };

        tokio::time::timeout(config.connect_timeout, connect)
            .await
            .map_err(|_| Error::Timeout(config.connect_timeout))?
    }

    /// Whether the transport is encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

impl fmt::Debug for ImapStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peer = match self {
            Self::Plain(tcp) => tcp.peer_addr(),
            Self::Tls(tls) => tls.get_ref().0.peer_addr(),
        };
        f.debug_struct("ImapStream")
            .field("tls", &self.is_tls())
            .field("peer", &peer.ok())
            .finish()
    }
}

impl AsyncRead for ImapStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(tcp) => Pin::new(tcp).poll_read(cx, buf),
            Self::Tls(tls) => Pin::new(tls).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for ImapStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(tcp) => Pin::new(tcp).poll_write(cx, buf),
            Self::Tls(tls) => Pin::new(tls).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(tcp) => Pin::new(tcp).poll_flush(cx),
            Self::Tls(tls) => Pin::new(tls).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(tcp) => Pin::new(tcp).poll_shutdown(cx),
            Self::Tls(tls) => Pin::new(tls).poll_shutdown(cx),
        }
    }
}

/// TLS connector verifying servers against the webpki roots.
#[must_use]
pub fn tls_connector() -> TlsConnector {
    TlsConnector::from(Arc::clone(&TLS_CONFIG))
}

/// Opens TCP to `host:port` and completes a TLS handshake for `host`.
pub async fn connect_tls(host: &str, port: u16) -> Result<ImapStream> {
    let server_name = ServerName::try_from(host.to_string())?;
    let tcp = tcp(host, port).await?;
    let tls = tls_connector().connect(server_name, tcp).await?;
    debug!(host, port, "TLS handshake done");
    Ok(ImapStream::Tls(Box::new(tls)))
}

/// Opens unencrypted TCP to `host:port`.
pub async fn connect_plain(host: &str, port: u16) -> Result<ImapStream> {
    Ok(ImapStream::Plain(tcp(host, port).await?))
}

async fn tcp(host: &str, port: u16) -> Result<TcpStream> {
    debug!(host, port, "opening TCP connection");
    let tcp = TcpStream::connect((host, port)).await?;
    tcp.set_nodelay(true)?;
    Ok(tcp)
}
