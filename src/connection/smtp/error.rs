use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("could not resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no address found for {endpoint}")]
    NoAddress { endpoint: String },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read TLS identity file {path}: {source}")]
    IdentityFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TLS error: {source}")]
    Tls {
        #[source]
        source: native_tls::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("unexpected reply to {command}: {code} {text}")]
    UnexpectedReply {
        command: String,
        code: u16,
        text: String,
    },
    #[error("STARTTLS required but not advertised by {host}")]
    StartTlsUnavailable { host: String },
    #[error("authentication rejected by {host} (code {code})")]
    AuthRejected { host: String, code: u16 },
}

impl SmtpError {
    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    pub(crate) fn tls(source: native_tls::Error) -> Self {
        Self::Tls { source }
    }

    pub(crate) fn connect(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connect {
            host: host.into(),
            source,
        }
    }
}
