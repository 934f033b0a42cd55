#![forbid(unsafe_code)]
//! maillist_lib: outbound mail connection resolution and request helpers
//! for mailing-list campaigns.

pub mod client_ip;
pub mod connection;
pub mod geo;
pub mod registry;
pub mod urls;
pub mod validator;

#[cfg(feature = "with-config")]
pub mod settings;

pub use client_ip::{RequestMeta, extract_ip, ip_address_key};
pub use connection::{
    ConnectionDescriptor, MailDefaults, MailingListConfig, TlsMode, resolve_connection,
};
pub use geo::{
    City, Country, GeoError, GeoIpLookup, GeoRecord, InMemoryLocationStore, LocationStore,
    StoreError, locate,
};
pub use registry::{RecordKind, RecordRegistry, RegistryError};
pub use urls::{RouteTable, SiteSettings, UrlError, UrlReverser, absolute_url};
pub use validator::is_uuid;

#[cfg(feature = "with-geoip")]
pub use geo::MaxMindLookup;

#[cfg(feature = "with-smtp")]
pub use connection::smtp::{SmtpConnection, SmtpError};

#[cfg(feature = "with-config")]
pub use settings::{Settings, SettingsError};
