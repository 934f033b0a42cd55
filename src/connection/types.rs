use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Per-mailing-list SMTP overrides.
///
/// Every field is optional. Empty strings, a zero port or timeout and
/// `false` flags all count as unset and let the process-wide default win.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailingListConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_use_tls: bool,
    pub smtp_use_ssl: bool,
    /// Seconds.
    pub smtp_timeout: Option<u64>,
    pub smtp_ssl_keyfile: Option<PathBuf>,
    pub smtp_ssl_certfile: Option<PathBuf>,
}

impl MailingListConfig {
    pub(crate) fn host(&self) -> Option<&str> {
        non_empty(self.smtp_host.as_deref())
    }

    pub(crate) fn username(&self) -> Option<&str> {
        non_empty(self.smtp_username.as_deref())
    }

    pub(crate) fn password(&self) -> Option<&str> {
        non_empty(self.smtp_password.as_deref())
    }

    pub(crate) fn port(&self) -> Option<u16> {
        self.smtp_port.filter(|port| *port != 0)
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.smtp_timeout
            .filter(|secs| *secs != 0)
            .map(Duration::from_secs)
    }

    pub(crate) fn keyfile(&self) -> Option<&PathBuf> {
        non_empty_path(self.smtp_ssl_keyfile.as_ref())
    }

    pub(crate) fn certfile(&self) -> Option<&PathBuf> {
        non_empty_path(self.smtp_ssl_certfile.as_ref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn non_empty_path(path: Option<&PathBuf>) -> Option<&PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Process-wide mail settings, handed to the resolver at startup.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDefaults {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_tls: bool,
    pub use_ssl: bool,
    /// Seconds; `None` leaves the socket without deadline.
    pub timeout: Option<u64>,
    pub ssl_keyfile: Option<PathBuf>,
    pub ssl_certfile: Option<PathBuf>,
}

impl Default for MailDefaults {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 25,
            username: String::new(),
            password: String::new(),
            use_tls: false,
            use_ssl: false,
            timeout: None,
            ssl_keyfile: None,
            ssl_certfile: None,
        }
    }
}

impl MailDefaults {
    /// The connection a caller gets when no mailing list is involved.
    pub fn descriptor(&self) -> ConnectionDescriptor {
        let mut descriptor = ConnectionDescriptor::new(
            self.host.clone(),
            self.port,
            self.username.clone(),
            self.password.clone(),
        );
        descriptor.use_tls = self.use_tls;
        descriptor.timeout = self
            .timeout
            .filter(|secs| *secs != 0)
            .map(Duration::from_secs);
        if self.use_ssl {
            let cert = non_empty_path(self.ssl_certfile.as_ref());
            let key = non_empty_path(self.ssl_keyfile.as_ref());
            if let (Some(cert), Some(key)) = (cert, key) {
                descriptor.set_implicit_tls(cert.clone(), key.clone());
            }
        }
        descriptor
    }
}

/// How the transport secures the session.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    None,
    StartTls,
    ImplicitTls,
}

impl fmt::Display for TlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::StartTls => f.write_str("starttls"),
            Self::ImplicitTls => f.write_str("implicit-tls"),
        }
    }
}

/// Resolved connection parameters, ready for the SMTP transport.
#[cfg_attr(feature = "with-serde", derive(Serialize))]
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing))]
    pub password: String,
    pub use_tls: bool,
    use_ssl: bool,
    pub timeout: Option<Duration>,
    ssl_keyfile: Option<PathBuf>,
    ssl_certfile: Option<PathBuf>,
}

impl ConnectionDescriptor {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            use_tls: false,
            use_ssl: false,
            timeout: None,
            ssl_keyfile: None,
            ssl_certfile: None,
        }
    }

    /// Switch to TLS from the first byte. Both files are required, which
    /// keeps `use_ssl` from ever being set without them.
    pub fn set_implicit_tls(&mut self, certfile: PathBuf, keyfile: PathBuf) {
        self.use_ssl = true;
        self.ssl_certfile = Some(certfile);
        self.ssl_keyfile = Some(keyfile);
    }

    pub fn use_ssl(&self) -> bool {
        self.use_ssl
    }

    pub fn ssl_keyfile(&self) -> Option<&PathBuf> {
        self.ssl_keyfile.as_ref()
    }

    pub fn ssl_certfile(&self) -> Option<&PathBuf> {
        self.ssl_certfile.as_ref()
    }

    /// Implicit TLS takes precedence when both flags are set.
    pub fn tls_mode(&self) -> TlsMode {
        if self.use_ssl {
            TlsMode::ImplicitTls
        } else if self.use_tls {
            TlsMode::StartTls
        } else {
            TlsMode::None
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("use_tls", &self.use_tls)
            .field("use_ssl", &self.use_ssl)
            .field("timeout", &self.timeout)
            .field("ssl_keyfile", &self.ssl_keyfile)
            .field("ssl_certfile", &self.ssl_certfile)
            .finish()
    }
}
