use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use maxminddb::{MaxMindDBError, Reader, geoip2};

use super::{GeoError, GeoIpLookup, GeoRecord};

const LANGUAGE: &str = "en";

/// GeoIP2 / GeoLite2 City database reader.
pub struct MaxMindLookup {
    reader: Reader<Vec<u8>>,
}

impl MaxMindLookup {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GeoError> {
        let reader = Reader::open_readfile(path).map_err(GeoError::database)?;
        Ok(Self { reader })
    }
}

impl GeoIpLookup for MaxMindLookup {
    fn city(&self, ip: &str) -> Result<GeoRecord, GeoError> {
        let addr: IpAddr = ip
            .trim()
            .parse()
            .map_err(|err| GeoError::invalid_address(ip, err))?;
        self.reader
            .lookup::<geoip2::City>(addr)
            .map(record_from_city)
            .map_err(|err| lookup_error(ip, err))
    }
}

fn lookup_error(ip: &str, err: MaxMindDBError) -> GeoError {
    match err {
        MaxMindDBError::AddressNotFoundError(_) => GeoError::address_not_found(ip),
        other => GeoError::database(other),
    }
}

fn record_from_city(city: geoip2::City<'_>) -> GeoRecord {
    let (country_code, country_name) = match city.country {
        Some(country) => (country.iso_code.map(str::to_string), english(country.names)),
        None => (None, None),
    };

    GeoRecord {
        country_code,
        country_name,
        city: city.city.and_then(|c| english(c.names)),
    }
}

fn english(names: Option<BTreeMap<&str, &str>>) -> Option<String> {
    names.and_then(|names| names.get(LANGUAGE).map(|n| n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(json: &str) -> geoip2::City<'_> {
        serde_json::from_str(json).expect("valid GeoIP2 city record")
    }

    #[test]
    fn english_names_are_extracted() {
        let record = record_from_city(city(
            r#"{
                "city": {"names": {"en": "Sao Paulo", "pt-BR": "São Paulo"}},
                "country": {"iso_code": "BR", "names": {"de": "Brasilien", "en": "Brazil"}}
            }"#,
        ));
        assert_eq!(record.country_code.as_deref(), Some("BR"));
        assert_eq!(record.country_name.as_deref(), Some("Brazil"));
        assert_eq!(record.city.as_deref(), Some("Sao Paulo"));
    }

    #[test]
    fn record_without_country_or_city() {
        let record = record_from_city(city(r#"{"continent": {"code": "AN"}}"#));
        assert_eq!(record, GeoRecord::default());
    }

    #[test]
    fn missing_english_name_is_none() {
        let record = record_from_city(city(
            r#"{
                "city": {"names": {"fr": "Lyon"}},
                "country": {"iso_code": "FR"}
            }"#,
        ));
        assert_eq!(record.country_code.as_deref(), Some("FR"));
        assert_eq!(record.country_name, None);
        assert_eq!(record.city, None);
    }

    #[test]
    fn not_found_maps_to_address_not_found() {
        let err = lookup_error(
            "10.0.0.1",
            MaxMindDBError::AddressNotFoundError("no record".to_string()),
        );
        assert!(matches!(err, GeoError::AddressNotFound { ref ip } if ip == "10.0.0.1"));

        let err = lookup_error(
            "10.0.0.1",
            MaxMindDBError::InvalidDatabaseError("bad tree".to_string()),
        );
        assert!(matches!(err, GeoError::Database(_)));
    }

    #[test]
    fn open_missing_database_is_a_database_error() {
        let err = MaxMindLookup::open("/nonexistent/GeoLite2-City.mmdb")
            .err()
            .expect("missing file fails");
        assert!(matches!(err, GeoError::Database(_)));
    }
}
