//! Fetching external script sources.

use vellum_common::net::{FetchError, load_script};

/// Produces the source text of an external script.
pub trait ScriptFetcher {
    /// Fetch the script at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the script cannot be retrieved.
    fn fetch(&mut self, url: &str) -> Result<String, FetchError>;
}

/// Fetches `http(s)` and `data:` URLs with [`load_script`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkFetcher;

impl ScriptFetcher for NetworkFetcher {
    fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        load_script(url)
    }
}

/// An external script as it was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedScript {
    /// Where the script came from.
    pub url: String,
    /// Its source, or `None` if fetching failed.
    pub source: Option<String>,
}
