use anyhow::{Result, bail};
use maillist_lib::ConnectionDescriptor;

#[cfg(feature = "with-geoip")]
use maillist_lib::City;

pub fn print_connection(descriptor: &ConnectionDescriptor, format: &str) -> Result<()> {
    match format {
        "human" => {
            println!("endpoint:  {}", descriptor.endpoint());
            println!("tls:       {}", descriptor.tls_mode());
            if descriptor.has_credentials() {
                println!("username:  {}", descriptor.username);
            }
            if let Some(timeout) = descriptor.timeout {
                println!("timeout:   {}s", timeout.as_secs());
            }
            if let (Some(cert), Some(key)) = (descriptor.ssl_certfile(), descriptor.ssl_keyfile()) {
                println!("certfile:  {}", cert.display());
                println!("keyfile:   {}", key.display());
            }
        }
        "json" => println!("{}", serde_json::to_string_pretty(descriptor)?),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
    Ok(())
}

#[cfg(feature = "with-geoip")]
pub struct LocatedRow {
    pub ip: String,
    pub city: Option<City>,
}

#[cfg(feature = "with-geoip")]
pub fn print_locations(rows: &[LocatedRow], format: &str) -> Result<()> {
    match format {
        "human" => {
            for row in rows {
                match &row.city {
                    Some(city) => println!(
                        "[FOUND]   {} :: {}, {} ({})",
                        row.ip, city.name, city.country.name, city.country.code
                    ),
                    None => println!("[UNKNOWN] {}", row.ip),
                }
            }
        }
        "csv" => {
            #[cfg(feature = "with-csv")]
            {
                let mut wtr = csv::Writer::from_writer(std::io::stdout());
                wtr.write_record(["ip", "country_code", "country_name", "city"])?;
                for row in rows {
                    match &row.city {
                        Some(city) => wtr.write_record([
                            row.ip.as_str(),
                            city.country.code.as_str(),
                            city.country.name.as_str(),
                            city.name.as_str(),
                        ])?,
                        None => wtr.write_record([row.ip.as_str(), "", "", ""])?,
                    }
                }
                wtr.flush()?;
            }
            #[cfg(not(feature = "with-csv"))]
            {
                bail!("format=csv nécessite la feature 'with-csv'");
            }
        }
        other => bail!("unknown --format '{other}', use: human|csv"),
    }
    Ok(())
}
