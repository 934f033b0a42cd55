//! Client IP extraction from CGI-style request metadata.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

pub const FORWARDED_FOR: &str = "HTTP_X_FORWARDED_FOR";
pub const REMOTE_ADDR: &str = "REMOTE_ADDR";

/// Read access to request metadata (`HTTP_*` headers, `REMOTE_ADDR`, ...).
pub trait RequestMeta {
    fn meta(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> RequestMeta for HashMap<String, String, S> {
    fn meta(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl RequestMeta for BTreeMap<String, String> {
    fn meta(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Best guess at the client's address.
///
/// Proxies may append to `X-Forwarded-For`, so only its first entry is used.
/// Falls back to the peer address. The value is returned as found, without
/// any IP syntax check.
pub fn extract_ip<M: RequestMeta + ?Sized>(meta: &M) -> Option<&str> {
    match meta.meta(FORWARDED_FOR) {
        Some(forwarded) if !forwarded.is_empty() => forwarded.split(',').next(),
        _ => meta.meta(REMOTE_ADDR),
    }
}

/// Rate-limit key callback. `group` is accepted for the limiter's calling
/// convention and ignored.
pub fn ip_address_key<'a, M>(_group: &str, meta: &'a M) -> Option<&'a str>
where
    M: RequestMeta + ?Sized,
{
    extract_ip(meta)
}
