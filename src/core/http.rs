use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

pub const APP_USER_AGENT: &str = concat!("HruHruLauncher/", env!("CARGO_PKG_VERSION"));

/// Timeout for single API calls (search, project lookup, release check).
pub const API_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for bulk catalog lookups.
pub const BULK_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout for file downloads.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .connect_timeout(API_TIMEOUT)
        .build()
}
