use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use maillist_lib::MailingListConfig;

#[derive(Parser)]
#[command(name = "maillist-cli")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// fichier de configuration TOML ([mail], [site], [geoip], [routes], [lists.*])
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// logs détaillés (debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// résout la connexion SMTP d'une liste (défauts + surcharges)
    Connection(ConnectionArgs),
    /// détermine l'IP client depuis les en-têtes
    #[command(name = "client-ip")]
    ClientIp {
        /// valeur de X-Forwarded-For
        #[arg(long)]
        forwarded_for: Option<String>,
        /// adresse du pair (REMOTE_ADDR)
        #[arg(long)]
        remote_addr: Option<String>,
    },
    /// géolocalise des adresses IP (feature `with-geoip`)
    #[cfg(feature = "with-geoip")]
    Locate {
        /// base GeoLite2/GeoIP2 City (prend le pas sur [geoip].database)
        #[arg(long)]
        db: Option<PathBuf>,
        /// lit des adresses depuis stdin (une par ligne)
        #[arg(long)]
        stdin: bool,
        /// format: human|csv
        #[arg(long, default_value = "human")]
        format: String,
        ips: Vec<String>,
    },
    /// construit l'URL absolue d'une route nommée
    Url {
        name: String,
        /// argument de route key=value (répétable)
        #[arg(long = "arg", value_parser = parse_key_value)]
        args: Vec<(String, String)>,
    },
    /// vérifie qu'une valeur est un UUID (code de sortie 2 sinon)
    #[command(name = "is-uuid")]
    IsUuid { value: String },
    /// liste les types d'enregistrements gérés
    Records,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// liste nommée depuis [lists.<nom>] du fichier de configuration
    #[arg(long)]
    pub list: Option<String>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub use_tls: bool,
    #[arg(long)]
    pub use_ssl: bool,
    /// timeout (secondes)
    #[arg(long)]
    pub timeout: Option<u64>,
    #[arg(long)]
    pub ssl_keyfile: Option<PathBuf>,
    #[arg(long)]
    pub ssl_certfile: Option<PathBuf>,
    /// format: human|json
    #[arg(long, default_value = "human")]
    pub format: String,
    /// ouvre réellement la session SMTP (feature `with-smtp`)
    #[cfg(feature = "with-smtp")]
    #[arg(long)]
    pub open: bool,
    /// nom utilisé pour EHLO
    #[cfg(feature = "with-smtp")]
    #[arg(long, default_value = "localhost")]
    pub helo: String,
}

impl ConnectionArgs {
    fn has_overrides(&self) -> bool {
        self.host.is_some()
            || self.port.is_some()
            || self.username.is_some()
            || self.password.is_some()
            || self.use_tls
            || self.use_ssl
            || self.timeout.is_some()
            || self.ssl_keyfile.is_some()
            || self.ssl_certfile.is_some()
    }

    /// `None` when neither a list nor any override was given, which means
    /// the default connection.
    pub fn mailing_list(&self, named: Option<&MailingListConfig>) -> Option<MailingListConfig> {
        if named.is_none() && !self.has_overrides() {
            return None;
        }
        let mut config = named.cloned().unwrap_or_default();
        if let Some(host) = &self.host {
            config.smtp_host = Some(host.clone());
        }
        if let Some(port) = self.port {
            config.smtp_port = Some(port);
        }
        if let Some(username) = &self.username {
            config.smtp_username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            config.smtp_password = Some(password.clone());
        }
        config.smtp_use_tls |= self.use_tls;
        config.smtp_use_ssl |= self.use_ssl;
        if let Some(timeout) = self.timeout {
            config.smtp_timeout = Some(timeout);
        }
        if let Some(keyfile) = &self.ssl_keyfile {
            config.smtp_ssl_keyfile = Some(keyfile.clone());
        }
        if let Some(certfile) = &self.ssl_certfile {
            config.smtp_ssl_certfile = Some(certfile.clone());
        }
        Some(config)
    }
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }
}

pub fn parse_key_value(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(anyhow!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
