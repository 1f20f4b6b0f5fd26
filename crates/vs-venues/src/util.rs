use reqwest::Url;

use crate::constants::ACCESS_TOKEN_PARAM;

pub fn default_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().gzip(true).brotli(true).build()
}

/// Copy of `url` with the access token masked, safe to log or print.
pub fn redacted_url(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == ACCESS_TOKEN_PARAM {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    let mut redacted = url.clone();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted
}
