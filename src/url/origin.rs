use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// Scheme used when the input URL does not carry one
const DEFAULT_SCHEME: &str = "https";

/// Scheme and authority of a site, without path, query or fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Returns the URL scheme (e.g. "https")
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the host without the port
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the explicit port, if the input carried a non-default one
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Parses the origin into a `Url` with an empty path
    pub fn as_url(&self) -> UrlResult<Url> {
        let origin = self.to_string();
        Url::parse(&origin).map_err(|e| UrlError::Parse(format!("{}: {}", origin, e)))
    }

    /// Returns the sitemap entry point of the site (`<origin>/sitemap.xml`)
    pub fn sitemap_url(&self) -> UrlResult<Url> {
        self.as_url()?
            .join("/sitemap.xml")
            .map_err(|e| UrlError::Parse(e.to_string()))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}

/// Derives the root origin of an arbitrary URL string
///
/// # Rules
///
/// 1. A URL carrying `://` must parse; its host and port are kept as typed
///    (no case folding or IDNA conversion)
/// 2. A URL without a scheme defaults to `https`
/// 3. When no host can be parsed, the first path segment is used as the host
///
/// # Examples
///
/// ```
/// use site_harvester::url::root_origin;
///
/// let origin = root_origin("example.com/a/b").unwrap();
/// assert_eq!(origin.to_string(), "https://example.com");
///
/// let origin = root_origin("http://example.com:8080/x").unwrap();
/// assert_eq!(origin.to_string(), "http://example.com:8080");
/// ```
pub fn root_origin(input: &str) -> UrlResult<Origin> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    if let Some((_, after_scheme)) = input.split_once("://") {
        // Parsed only to validate; the host is taken from the raw authority
        let parsed = Url::parse(input).map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;
        let scheme = parsed.scheme().to_string();

        let authority = first_segment(after_scheme);
        let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
        let (host, port) = split_authority(authority);
        if !host.is_empty() {
            return Ok(Origin { scheme, host, port });
        }

        let (host, port) = split_authority(first_segment(parsed.path()));
        if host.is_empty() {
            return Err(UrlError::MissingHost(input.to_string()));
        }
        return Ok(Origin { scheme, host, port });
    }

    // Scheme-relative ("//example.com/x") and bare ("example.com/x") inputs
    let rest = input.strip_prefix("//").unwrap_or(input);
    let (host, port) = split_authority(first_segment(rest));
    if host.is_empty() {
        return Err(UrlError::MissingHost(input.to_string()));
    }

    Ok(Origin {
        scheme: DEFAULT_SCHEME.to_string(),
        host,
        port,
    })
}

/// Derives the site identifier (storage directory name) of a URL
///
/// Only the host is kept and a leading `www.` is stripped. Casing is left to
/// the caller.
///
/// # Examples
///
/// ```
/// use site_harvester::url::site_identifier;
///
/// assert_eq!(site_identifier("https://www.example.com/").unwrap(), "example.com");
/// ```
pub fn site_identifier(input: &str) -> UrlResult<String> {
    let origin = root_origin(input)?;
    let host = origin.host();
    Ok(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Returns the first segment of a path-like string, stopping at query or fragment
fn first_segment(path: &str) -> &str {
    path.split(['/', '?', '#']).next().unwrap_or("")
}

/// Splits `host[:port]`; a suffix that is not a valid port stays part of the host
fn split_authority(authority: &str) -> (String, Option<u16>) {
    if let Some((host, port)) = authority.rsplit_once(':') {
        if let Ok(port) = port.parse::<u16>() {
            return (host.to_string(), Some(port));
        }
    }
    (authority.to_string(), None)
}
