use thiserror::Error;

/// Errors raised by the location store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("location store lock poisoned")]
    Poisoned,
    /// Failure reported by an external [`LocationStore`](super::LocationStore)
    /// implementation, such as a database-backed one.
    #[error("{0}")]
    Backend(String),
}

/// Errors raised while geolocating an address.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("address not found: {ip}")]
    AddressNotFound { ip: String },
    #[error("invalid IP address {ip}: {source}")]
    InvalidAddress {
        ip: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("GeoIP database error: {0}")]
    Database(String),
    #[error("location store error: {source}")]
    Store {
        #[from]
        source: StoreError,
    },
}

impl GeoError {
    pub fn address_not_found(ip: impl Into<String>) -> Self {
        Self::AddressNotFound { ip: ip.into() }
    }

    pub(crate) fn invalid_address(
        ip: impl Into<String>,
        source: std::net::AddrParseError,
    ) -> Self {
        Self::InvalidAddress {
            ip: ip.into(),
            source,
        }
    }

    pub(crate) fn database<T: std::fmt::Display>(err: T) -> Self {
        Self::Database(err.to_string())
    }
}
