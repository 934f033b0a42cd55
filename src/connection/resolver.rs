use tracing::debug;

use super::{ConnectionDescriptor, MailDefaults, MailingListConfig};

/// Resolve the SMTP connection for a mailing list.
///
/// Without a config the defaults are returned untouched. With one, host,
/// port, credentials and the STARTTLS flag fall back to `defaults` field by
/// field, while implicit TLS and the timeout are only taken from the list.
/// STARTTLS marking and the implicit TLS override are applied independently,
/// so both flags can end up set; [`ConnectionDescriptor::tls_mode`] decides.
pub fn resolve_connection(
    defaults: &MailDefaults,
    config: Option<&MailingListConfig>,
) -> ConnectionDescriptor {
    let Some(config) = config else {
        let descriptor = defaults.descriptor();
        debug!(
            endpoint = %descriptor.endpoint(),
            tls = %descriptor.tls_mode(),
            "using default mail connection"
        );
        return descriptor;
    };

    let username = config.username().unwrap_or(&defaults.username);
    let password = config.password().unwrap_or(&defaults.password);
    let host = config.host().unwrap_or(&defaults.host);
    let port = config.port().unwrap_or(defaults.port);
    let use_tls = config.smtp_use_tls || defaults.use_tls;

    let mut descriptor = defaults.descriptor();
    descriptor.host = host.to_string();
    descriptor.port = port;
    descriptor.username = username.to_string();
    descriptor.password = password.to_string();

    if use_tls {
        descriptor.use_tls = true;
    }
    if let Some(timeout) = config.timeout() {
        descriptor.timeout = Some(timeout);
    }
    if config.smtp_use_ssl {
        if let (Some(cert), Some(key)) = (config.certfile(), config.keyfile()) {
            descriptor.set_implicit_tls(cert.clone(), key.clone());
        }
    }

    debug!(
        endpoint = %descriptor.endpoint(),
        tls = %descriptor.tls_mode(),
        authenticated = descriptor.has_credentials(),
        "resolved mailing list connection"
    );
    descriptor
}
