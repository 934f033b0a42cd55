//! Outbound SMTP connection resolution.
//!
//! The entry point is [`resolve_connection`], which merges a mailing list's
//! optional SMTP overrides with the process-wide [`MailDefaults`]. With the
//! `with-smtp` feature, [`smtp::SmtpConnection`] opens a session from the
//! resulting [`ConnectionDescriptor`].

mod resolver;
mod types;

#[cfg(feature = "with-smtp")]
pub mod smtp;

pub use resolver::resolve_connection;
pub use types::{ConnectionDescriptor, MailDefaults, MailingListConfig, TlsMode};

#[cfg(test)]
mod tests;
