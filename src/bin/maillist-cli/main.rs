mod args;
mod logging;
mod output;

use std::collections::HashMap;

use anyhow::{Context, Result};
use maillist_lib::{
    RecordRegistry, Settings, UrlError, absolute_url, client_ip, extract_ip, is_uuid,
    resolve_connection,
};
use tracing::debug;

use args::{Cli, Commands, ConnectionArgs};

#[cfg(feature = "with-geoip")]
use std::io::{self, BufRead};

fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.settings {
        Some(path) => {
            debug!(path = %path.display(), "loading settings");
            Settings::load(path).with_context(|| format!("load {}", path.display()))
        }
        None => Ok(Settings::default()),
    }
}

fn run_connection(settings: &Settings, args: &ConnectionArgs) -> Result<()> {
    let named = match &args.list {
        Some(name) => Some(
            settings
                .list(name)
                .with_context(|| format!("no [lists.{name}] in settings"))?,
        ),
        None => None,
    };
    let config = args.mailing_list(named);
    let descriptor = resolve_connection(&settings.mail, config.as_ref());
    output::print_connection(&descriptor, &args.format)?;

    #[cfg(feature = "with-smtp")]
    open_session(&descriptor, args)?;
    Ok(())
}

/// Unknown routes on an empty `[routes]` table get a hint, since that
/// usually means `--settings` was forgotten.
fn build_url(settings: &Settings, name: &str, kwargs: &[(&str, &str)]) -> Result<String> {
    let routes = settings.route_table();
    absolute_url(&settings.site, &routes, name, kwargs).map_err(|err| match err {
        UrlError::UnknownRoute(_) if settings.routes.is_empty() => anyhow::Error::new(err)
            .context("no routes configured: pass --settings with a [routes] table"),
        other => other.into(),
    })
}

#[cfg(feature = "with-smtp")]
fn open_session(
    descriptor: &maillist_lib::ConnectionDescriptor,
    args: &ConnectionArgs,
) -> Result<()> {
    if !args.open {
        return Ok(());
    }
    let mut conn = maillist_lib::SmtpConnection::open(descriptor, &args.helo)
        .with_context(|| format!("open {}", descriptor.endpoint()))?;
    conn.quit()?;
    for line in &conn.transcript {
        println!("{line}");
    }
    Ok(())
}

#[cfg(feature = "with-geoip")]
fn run_locate(
    settings: &Settings,
    db: Option<std::path::PathBuf>,
    stdin: bool,
    format: &str,
    mut ips: Vec<String>,
) -> Result<()> {
    use maillist_lib::{InMemoryLocationStore, MaxMindLookup, locate};

    let path = db
        .or_else(|| settings.geoip.database.clone())
        .context("no GeoIP database: pass --db or set [geoip].database")?;
    let lookup = MaxMindLookup::open(&path).with_context(|| format!("open {}", path.display()))?;
    let store = InMemoryLocationStore::new();

    if stdin {
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                ips.push(trimmed.to_string());
            }
        }
    }

    let mut rows = Vec::with_capacity(ips.len());
    for ip in ips {
        let city = locate(&ip, &lookup, &store).with_context(|| format!("locate {ip}"))?;
        rows.push(output::LocatedRow { ip, city });
    }
    output::print_locations(&rows, format)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let settings = load_settings(&cli)?;

    let Some(cmd) = &cli.cmd else {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(());
    };

    match cmd {
        Commands::Connection(args) => run_connection(&settings, args)?,
        Commands::ClientIp {
            forwarded_for,
            remote_addr,
        } => {
            let mut meta = HashMap::new();
            if let Some(value) = forwarded_for {
                meta.insert(client_ip::FORWARDED_FOR.to_string(), value.clone());
            }
            if let Some(value) = remote_addr {
                meta.insert(client_ip::REMOTE_ADDR.to_string(), value.clone());
            }
            match extract_ip(&meta) {
                Some(ip) => println!("{ip}"),
                None => {
                    eprintln!("no client address in the given headers");
                    std::process::exit(2);
                }
            }
        }
        #[cfg(feature = "with-geoip")]
        Commands::Locate {
            db,
            stdin,
            format,
            ips,
        } => run_locate(&settings, db.clone(), *stdin, format, ips.clone())?,
        Commands::Url { name, args } => {
            let kwargs: Vec<(&str, &str)> = args
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let url = build_url(&settings, name, &kwargs)?;
            println!("{url}");
        }
        Commands::IsUuid { value } => {
            if is_uuid(value) {
                println!("[OK]      {value}");
            } else {
                println!("[INVALID] {value}");
                // codes de sortie : 0 OK, 2 invalide, 1 fatal
                std::process::exit(2);
            }
        }
        Commands::Records => {
            for kind in RecordRegistry::with_defaults().kinds() {
                println!("{kind}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_routes_point_at_settings() {
        let err = build_url(&Settings::default(), "unsubscribe", &[]).expect_err("no routes");
        let rendered = format!("{err:#}");
        assert!(rendered.contains("[routes]"), "{rendered}");
        assert!(rendered.contains("no route named 'unsubscribe'"), "{rendered}");
    }

    #[test]
    fn configured_routes_keep_plain_error() {
        let mut settings = Settings::default();
        settings.routes.insert("home".to_string(), "/".to_string());
        let err = build_url(&settings, "unsubscribe", &[]).expect_err("unknown route");
        assert!(!format!("{err:#}").contains("[routes]"));

        let url = build_url(&settings, "home", &[]).expect("reverse");
        assert_eq!(url, "http://example.com/");
    }

    #[test]
    fn key_value_arguments() {
        assert_eq!(
            args::parse_key_value("pk=42").expect("pair"),
            ("pk".to_string(), "42".to_string())
        );
        assert!(args::parse_key_value("=42").is_err());
        assert!(args::parse_key_value("pk").is_err());
    }
}
