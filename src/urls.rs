//! Absolute URLs for links that leave the application (unsubscribe links,
//! confirmation links in email bodies).

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("no route named '{0}'")]
    UnknownRoute(String),
    #[error("route '{name}' cannot be reversed: {reason}")]
    NoReverseMatch { name: String, reason: String },
    #[error("site domain is empty")]
    EmptyDomain,
    #[error("site domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
}

impl UrlError {
    fn no_reverse_match(name: &str, reason: impl Into<String>) -> Self {
        Self::NoReverseMatch {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// The public site links point at.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub domain: String,
    pub https_only: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            domain: "example.com".to_string(),
            https_only: false,
        }
    }
}

impl SiteSettings {
    pub fn scheme(&self) -> &'static str {
        if self.https_only { "https" } else { "http" }
    }

    /// Domain in ASCII form, ports preserved.
    pub fn ascii_domain(&self) -> Result<String, UrlError> {
        let trimmed = self.domain.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(UrlError::EmptyDomain);
        }
        let (host, port) = match trimmed.rsplit_once(':') {
            Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => (host, Some(port)),
            _ => (trimmed, None),
        };
        let ascii =
            idna::domain_to_ascii(host).map_err(|source| UrlError::IdnaConversion { source })?;
        Ok(match port {
            Some(port) => format!("{ascii}:{port}"),
            None => ascii,
        })
    }
}

/// Turns a route name and its arguments into a path.
pub trait UrlReverser {
    fn reverse(&self, name: &str, kwargs: &[(&str, &str)]) -> Result<String, UrlError>;
}

/// Named path patterns with `{param}` placeholders, e.g.
/// `/subscribe/{mailing_list_uuid}/confirm/`.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: BTreeMap<String, String>,
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.insert(name, pattern);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, pattern: impl Into<String>) {
        self.routes.insert(name.into(), pattern.into());
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, String>> for RouteTable {
    fn from(routes: BTreeMap<String, String>) -> Self {
        Self { routes }
    }
}

impl UrlReverser for RouteTable {
    fn reverse(&self, name: &str, kwargs: &[(&str, &str)]) -> Result<String, UrlError> {
        let pattern = self
            .routes
            .get(name)
            .ok_or_else(|| UrlError::UnknownRoute(name.to_string()))?;

        let mut used = HashSet::new();
        let mut path = String::with_capacity(pattern.len());
        let mut last = 0;
        for caps in placeholder().captures_iter(pattern) {
            let (Some(whole), Some(param)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = kwargs
                .iter()
                .find(|(key, _)| *key == param.as_str())
                .map(|(_, value)| *value)
                .ok_or_else(|| {
                    UrlError::no_reverse_match(
                        name,
                        format!("missing argument '{}'", param.as_str()),
                    )
                })?;
            if value.is_empty() || value.contains('/') {
                return Err(UrlError::no_reverse_match(
                    name,
                    format!("argument '{}' has invalid value '{value}'", param.as_str()),
                ));
            }
            path.push_str(&pattern[last..whole.start()]);
            path.push_str(value);
            last = whole.end();
            used.insert(param.as_str());
        }
        path.push_str(&pattern[last..]);

        if let Some((extra, _)) = kwargs.iter().find(|(key, _)| !used.contains(key)) {
            return Err(UrlError::no_reverse_match(
                name,
                format!("unexpected argument '{extra}'"),
            ));
        }
        Ok(path)
    }
}

/// `scheme://domain/path` for the named route.
pub fn absolute_url<R: UrlReverser + ?Sized>(
    site: &SiteSettings,
    reverser: &R,
    name: &str,
    kwargs: &[(&str, &str)],
) -> Result<String, UrlError> {
    let path = reverser.reverse(name, kwargs)?;
    let domain = site.ascii_domain()?;
    Ok(format!("{}://{}{}", site.scheme(), domain, path))
}
