//! Resource fetching for the preview surface.
//!
//! External scripts named by an `EXTERNAL_SCRIPTS` message are fetched here.
//! `http(s)` URLs go through a blocking `reqwest` client; `data:` URLs are
//! decoded in place.

use std::time::Duration;

use base64::Engine;
use thiserror::Error;

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("vellum-preview/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced while fetching a resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be built or the request failed in transit.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} answered with HTTP {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// A `data:` URL without the `,` separating metadata from payload.
    #[error("invalid data URL: missing comma")]
    DataUrlMissingComma,

    /// A base64 `data:` URL whose payload does not decode.
    #[error("invalid data URL payload: {0}")]
    DataUrlBase64(#[from] base64::DecodeError),

    /// The resource decoded to bytes that are not UTF-8 text.
    #[error("{url} is not UTF-8 text")]
    NotText {
        /// The requested URL.
        url: String,
    },

    /// A URL scheme other than `http`, `https` or `data`.
    #[error("unsupported URL scheme in {0}")]
    UnsupportedScheme(String),
}

/// A parsed `data:` URL that can be decoded into raw bytes.
///
/// [RFC 2397](https://www.rfc-editor.org/rfc/rfc2397)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Everything between `data:` and the first `,` (media type and flags).
    pub metadata: &'a str,
    /// Everything after the first `,`.
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split a raw `data:` URL into metadata and payload.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DataUrlMissingComma`] if there is no `,`.
    pub fn parse(raw: &'a str) -> Result<Self, FetchError> {
        let body = raw.strip_prefix("data:").unwrap_or(raw);
        let (metadata, payload) = body
            .split_once(',')
            .ok_or(FetchError::DataUrlMissingComma)?;
        Ok(Self { metadata, payload })
    }

    /// Whether the payload is base64 encoded.
    #[must_use]
    pub fn is_base64(&self) -> bool {
        self.metadata.ends_with(";base64")
    }

    /// Decode the payload into raw bytes.
    ///
    /// Base64 payloads are decoded; anything else is percent-decoded.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DataUrlBase64`] if base64 decoding fails.
    pub fn decode(&self) -> Result<Vec<u8>, FetchError> {
        if self.is_base64() {
            Ok(base64::engine::general_purpose::STANDARD.decode(self.payload)?)
        } else {
            Ok(percent_decode(self.payload))
        }
    }
}

/// Decode `%XX` escapes; malformed escapes are kept literally.
fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            out.push((hex_value(bytes[i + 1]) << 4) | hex_value(bytes[i + 2]));
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Fetch a URL and return its body as text.
///
/// # Errors
///
/// Returns a [`FetchError`] if the HTTP client cannot be created, the request
/// fails, the response has a non-success status, or the body cannot be decoded.
pub fn fetch_text(url: &str) -> Result<String, FetchError> {
    let request_error = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(request_error)?;

    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(request_error)?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    response.text().map_err(request_error)
}

/// Load a script resource from any supported URL.
///
/// # Errors
///
/// Returns a [`FetchError`] if the URL scheme is unsupported or the resource
/// cannot be fetched or decoded as UTF-8.
pub fn load_script(url: &str) -> Result<String, FetchError> {
    let scheme = url.split_once(':').map_or("", |(scheme, _)| scheme);
    if scheme.eq_ignore_ascii_case("data") {
        let bytes = DataUrl::parse(url)?.decode()?;
        String::from_utf8(bytes).map_err(|_| FetchError::NotText {
            url: url.to_string(),
        })
    } else if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") {
        fetch_text(url)
    } else {
        Err(FetchError::UnsupportedScheme(url.to_string()))
    }
}
