//! Blocking SMTP transport opened from a [`ConnectionDescriptor`]
//! (`with-smtp` feature).

mod error;
mod stream;

use std::net::{SocketAddr, ToSocketAddrs};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use native_tls::{Identity, TlsConnector};
use tracing::{debug, trace};

use super::{ConnectionDescriptor, TlsMode};

pub use error::SmtpError;
pub use stream::SmtpReply;

use stream::SmtpStream;

/// An authenticated, ready-to-send SMTP session.
pub struct SmtpConnection {
    host: String,
    stream: SmtpStream,
    pub transcript: Vec<String>,
}

impl SmtpConnection {
    /// Connect, greet, secure and authenticate as the descriptor asks.
    pub fn open(descriptor: &ConnectionDescriptor, helo: &str) -> Result<Self, SmtpError> {
        let addresses = resolve_addrs(descriptor)?;
        let stream = SmtpStream::connect_any(&descriptor.host, &addresses, descriptor.timeout)?;
        let mut conn = Self {
            host: descriptor.host.clone(),
            stream,
            transcript: Vec::new(),
        };
        let mode = descriptor.tls_mode();
        debug!(endpoint = %descriptor.endpoint(), tls = %mode, "opening SMTP connection");

        if mode == TlsMode::ImplicitTls {
            let connector = build_connector(descriptor)?;
            conn.stream.upgrade_tls(&descriptor.host, &connector)?;
        }

        let banner = conn.read_reply()?;
        expect_positive("banner", &banner)?;

        let ehlo_cmd = format!("EHLO {helo}");
        let ehlo = conn.command(&ehlo_cmd)?;
        expect_positive(&ehlo_cmd, &ehlo)?;

        if mode == TlsMode::StartTls {
            if !ehlo.has_capability("STARTTLS") {
                conn.quit().ok();
                return Err(SmtpError::StartTlsUnavailable {
                    host: conn.host.clone(),
                });
            }
            let reply = conn.command("STARTTLS")?;
            expect_positive("STARTTLS", &reply)?;
            let connector = TlsConnector::new().map_err(SmtpError::tls)?;
            conn.stream.upgrade_tls(&descriptor.host, &connector)?;
            let ehlo = conn.command(&ehlo_cmd)?;
            expect_positive(&ehlo_cmd, &ehlo)?;
        }

        if descriptor.has_credentials() {
            conn.authenticate(&descriptor.username, &descriptor.password)?;
        }
        Ok(conn)
    }

    pub fn is_encrypted(&self) -> bool {
        self.stream.is_tls()
    }

    pub fn command(&mut self, command: &str) -> Result<SmtpReply, SmtpError> {
        self.record("C", command);
        self.stream.send_command(command)?;
        self.read_reply()
    }

    pub fn quit(&mut self) -> Result<(), SmtpError> {
        self.record("C", "QUIT");
        self.stream.send_command("QUIT")?;
        if let Ok(reply) = self.stream.read_reply() {
            self.record_reply(&reply);
        }
        Ok(())
    }

    fn authenticate(&mut self, username: &str, password: &str) -> Result<(), SmtpError> {
        let token = STANDARD.encode(format!("\0{username}\0{password}"));
        self.record("C", "AUTH PLAIN ***");
        self.stream.send_command(&format!("AUTH PLAIN {token}"))?;
        let reply = self.read_reply()?;
        if reply.code != 235 {
            self.quit().ok();
            return Err(SmtpError::AuthRejected {
                host: self.host.clone(),
                code: reply.code,
            });
        }
        Ok(())
    }

    fn read_reply(&mut self) -> Result<SmtpReply, SmtpError> {
        let reply = self.stream.read_reply()?;
        self.record_reply(&reply);
        Ok(reply)
    }

    fn record(&mut self, direction: &str, message: &str) {
        trace!(host = %self.host, direction, "{message}");
        self.transcript
            .push(format!("[{}] {direction}: {message}", self.host));
    }

    fn record_reply(&mut self, reply: &SmtpReply) {
        if reply.lines.is_empty() {
            self.record("S", &format!("{}", reply.code));
        } else {
            for line in &reply.lines {
                self.record("S", &format!("{} {}", reply.code, line));
            }
        }
    }
}

fn expect_positive(command: &str, reply: &SmtpReply) -> Result<(), SmtpError> {
    if reply.is_positive_completion() {
        Ok(())
    } else {
        Err(SmtpError::UnexpectedReply {
            command: command.to_string(),
            code: reply.code,
            text: reply.text(),
        })
    }
}

fn resolve_addrs(descriptor: &ConnectionDescriptor) -> Result<Vec<SocketAddr>, SmtpError> {
    let endpoint = descriptor.endpoint();
    let addrs: Vec<SocketAddr> = (descriptor.host.as_str(), descriptor.port)
        .to_socket_addrs()
        .map_err(|source| SmtpError::Resolve {
            endpoint: endpoint.clone(),
            source,
        })?
        .collect();
    if addrs.is_empty() {
        return Err(SmtpError::NoAddress { endpoint });
    }
    Ok(addrs)
}

/// Client identity for implicit TLS, from the PEM cert and PKCS#8 key.
fn build_connector(descriptor: &ConnectionDescriptor) -> Result<TlsConnector, SmtpError> {
    let mut builder = TlsConnector::builder();
    if let (Some(cert), Some(key)) = (descriptor.ssl_certfile(), descriptor.ssl_keyfile()) {
        let cert_pem = std::fs::read(cert).map_err(|source| SmtpError::IdentityFile {
            path: cert.clone(),
            source,
        })?;
        let key_pem = std::fs::read(key).map_err(|source| SmtpError::IdentityFile {
            path: key.clone(),
            source,
        })?;
        let identity = Identity::from_pkcs8(&cert_pem, &key_pem).map_err(SmtpError::tls)?;
        builder.identity(identity);
    }
    builder.build().map_err(SmtpError::tls)
}

#[cfg(test)]
mod tests;
