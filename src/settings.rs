//! Process-wide configuration loaded from TOML (`with-config` feature).
//!
//! ```toml
//! [mail]
//! host = "smtp.example.org"
//! port = 587
//! use_tls = true
//!
//! [site]
//! domain = "lists.example.org"
//! https_only = true
//!
//! [geoip]
//! database = "/usr/share/GeoIP/GeoLite2-City.mmdb"
//!
//! [routes]
//! "subscribers:unsubscribe" = "/unsubscribe/{mailing_list_uuid}/"
//!
//! [lists.newsletter]
//! smtp_host = "smtp.newsletter.example.org"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connection::{MailDefaults, MailingListConfig};
use crate::urls::{RouteTable, SiteSettings};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoIpSettings {
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mail: MailDefaults,
    pub site: SiteSettings,
    pub geoip: GeoIpSettings,
    pub routes: BTreeMap<String, String>,
    /// Per-mailing-list SMTP overrides, keyed by list name.
    pub lists: BTreeMap<String, MailingListConfig>,
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, SettingsError> {
        toml::from_str(input).map_err(|source| SettingsError::Parse { source })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn route_table(&self) -> RouteTable {
        RouteTable::from(self.routes.clone())
    }

    pub fn list(&self, name: &str) -> Option<&MailingListConfig> {
        self.lists.get(name)
    }
}
