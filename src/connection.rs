//! Secure session setup
//!
//! Opens an implicit-TLS IMAP connection and logs in. A server address
//! that does not resolve sends the user back to the address prompt; a
//! rejected login sends them back to the username/password prompts.
//! How often that may happen is a [`RetryPolicy`].

use crate::config::{Password, RetryPolicy, TlsMode};
use crate::console::Console;
use crate::credentials::{prompt_address, prompt_login};
use crate::error::{Error, Result};
use async_imap::Session;
use async_imap::error::Error as ImapError;
use rustls::RootCertStore;
use rustls::pki_types::ServerName;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info, warn};

type TlsStream = Compat<tokio_rustls::client::TlsStream<TcpStream>>;

/// A connected but not yet authenticated IMAP client.
pub type ImapClient = async_imap::Client<TlsStream>;

/// A TLS-wrapped, authenticated IMAP session.
pub type ImapSession = Session<TlsStream>;

/// Build a TLS connector for the given trust mode.
fn tls_connector(mode: TlsMode) -> Result<TlsConnector> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Tls(e.to_string()))?;

    let config = match mode {
        TlsMode::Verified => {
            let mut roots = RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            builder.with_root_certificates(roots).with_no_client_auth()
        }
        TlsMode::AcceptInvalidCerts => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousVerifier))
            .with_no_client_auth(),
    };
    Ok(TlsConnector::from(Arc::new(config)))
}

/// Open one TLS connection to `host:port`.
///
/// Fails with [`Error::Resolve`] when `host` is not a usable server
/// name or does not resolve to any address.
pub async fn open(host: &str, port: u16, tls: TlsMode) -> Result<ImapClient> {
    let resolve_err = |reason: String| Error::Resolve {
        host: host.to_string(),
        reason,
    };

    let server_name =
        ServerName::try_from(host.to_string()).map_err(|e| resolve_err(e.to_string()))?;

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| resolve_err(e.to_string()))?
        .collect();
    if addrs.is_empty() {
        return Err(resolve_err("no addresses found".to_string()));
    }

    debug!("Connecting to IMAP server at {}:{} ({:?})", host, port, addrs);
    let tcp_stream = TcpStream::connect(&addrs[..]).await?;

    let tls_stream = tls_connector(tls)?
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| Error::Tls(e.to_string()))?;

    info!("Connected to IMAP server {}:{}", host, port);
    Ok(async_imap::Client::new(tls_stream.compat()))
}

/// Connect, re-prompting for the address while it fails to resolve.
///
/// Returns the client together with the address that worked. Any
/// failure other than resolution is returned as-is.
pub async fn connect<C: Console>(
    host: String,
    port: u16,
    tls: TlsMode,
    policy: RetryPolicy,
    console: &mut C,
) -> Result<(ImapClient, String)> {
    let mut host = host;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match open(&host, port, tls).await {
            Ok(client) => return Ok((client, host)),
            Err(e) if e.is_resolve() => {
                warn!("Connection attempt {} failed: {}", attempts, e);
                console.say(&format!(
                    "Unable to connect to server. Is {host} the correct URL?"
                ));
                if !policy.allows_another(attempts) {
                    return Err(Error::RetriesExhausted {
                        attempts,
                        last: Box::new(e),
                    });
                }
                host = prompt_address(console).await?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Log in, re-prompting for credentials while the server rejects them.
pub async fn login<C: Console>(
    client: ImapClient,
    username: String,
    password: Password,
    policy: RetryPolicy,
    console: &mut C,
) -> Result<ImapSession> {
    let mut client = client;
    let (mut username, mut password) = (username, password);
    let mut attempts = 0;

    loop {
        attempts += 1;
        match client.login(&username, password.expose()).await {
            Ok(session) => {
                info!("Logged in as {}", username);
                return Ok(session);
            }
            Err((ImapError::No(reason) | ImapError::Bad(reason), returned)) => {
                client = returned;
                warn!("Login attempt {} for {} rejected: {}", attempts, username, reason);
                console.say("Login failed, please try again:");
                if !policy.allows_another(attempts) {
                    return Err(Error::RetriesExhausted {
                        attempts,
                        last: Box::new(Error::Auth(reason)),
                    });
                }
                (username, password) = prompt_login(console).await?;
            }
            Err((e, _)) => return Err(Error::Imap(format!("Login failed: {e}"))),
        }
    }
}

/// SELECT a mailbox on an existing session.
pub async fn select(session: &mut ImapSession, mailbox: &str) -> Result<()> {
    session
        .select(mailbox)
        .await
        .map_err(|e| Error::Imap(format!("Failed to select {mailbox}: {e}")))?;
    Ok(())
}

/// Certificate verifier that accepts all certificates
/// (for self-signed local bridges and test servers).
#[derive(Debug)]
struct DangerousVerifier;

impl rustls::client::danger::ServerCertVerifier for DangerousVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
