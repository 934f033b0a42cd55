//! IP geolocation with lazily created Country/City rows.
//!
//! [`locate`] asks a [`GeoIpLookup`] where an address is, then makes sure
//! the matching rows exist in a [`LocationStore`]. With the `with-geoip`
//! feature, [`MaxMindLookup`] reads a GeoLite2/GeoIP2 City database.

mod error;
#[cfg(feature = "with-geoip")]
mod maxmind;
mod store;
mod types;

pub use error::{GeoError, StoreError};
#[cfg(feature = "with-geoip")]
pub use maxmind::MaxMindLookup;
pub use store::{InMemoryLocationStore, LocationStore};
pub use types::{City, Country, GeoRecord};

use tracing::{debug, warn};

/// Vendor GeoIP service.
pub trait GeoIpLookup {
    /// Fails with [`GeoError::AddressNotFound`] when the database has no
    /// entry for `ip`.
    fn city(&self, ip: &str) -> Result<GeoRecord, GeoError>;
}

/// Find the city of `ip`, creating its Country and City rows on first sight.
///
/// Unknown addresses are logged and yield `Ok(None)` without touching the
/// store, as do records without a country code. A record with a country but
/// no city still creates the country and yields `Ok(None)`.
pub fn locate<L, S>(ip: &str, lookup: &L, store: &S) -> Result<Option<City>, GeoError>
where
    L: GeoIpLookup + ?Sized,
    S: LocationStore + ?Sized,
{
    let record = match lookup.city(ip) {
        Ok(record) => record,
        Err(GeoError::AddressNotFound { .. }) => {
            warn!(ip_address = %ip, "address not found");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    let Some(code) = record.country_code.as_deref() else {
        debug!(ip_address = %ip, "no country for address");
        return Ok(None);
    };
    let country =
        store.get_or_create_country(code, record.country_name.as_deref().unwrap_or_default())?;

    match record.city.as_deref() {
        Some(name) => Ok(Some(store.get_or_create_city(name, &country)?)),
        None => Ok(None),
    }
}
