use reqwest::Url;

use crate::{BoxFuture, FetchError, Listing, ListingSource, ViewportBoundsQuery};

/// Path of the listing query endpoint relative to the API base.
pub const PROPERTIES_PATH: &str = "/api/properties";

/// `reqwest`-backed client for `GET {base}/api/properties`.
#[derive(Debug, Clone)]
pub struct HttpListingSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpListingSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for a query, parameters percent-encoded.
    pub fn request_url(&self, query: &ViewportBoundsQuery) -> Result<Url, FetchError> {
        let endpoint = format!("{}{}", self.base_url.trim_end_matches('/'), PROPERTIES_PATH);
        Url::parse_with_params(&endpoint, query.to_params())
            .map_err(|e| FetchError::InvalidUrl(format!("{endpoint}: {e}")))
    }
}

impl ListingSource for HttpListingSource {
    fn query<'a>(
        &'a self,
        query: &'a ViewportBoundsQuery,
    ) -> BoxFuture<'a, Result<Vec<Listing>, FetchError>> {
        Box::pin(async move {
            let url = self.request_url(query)?;
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = resp.status();
            let body = resp
                .bytes()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }

            serde_json::from_slice::<Vec<Listing>>(&body)
                .map_err(|e| FetchError::Decode(e.to_string()))
        })
    }
}

// Error bodies are `{"error": "..."}`; fall back to the raw text.
fn error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(msg) = value.get("error").and_then(|v| v.as_str()) {
            return msg.to_string();
        }
    }
    let text = String::from_utf8_lossy(body);
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocaleFilter;
    use foundation::GeoBounds;

    fn query() -> ViewportBoundsQuery {
        ViewportBoundsQuery::new(
            GeoBounds::new(39.86, 39.83, 32.87, 32.84),
            LocaleFilter::default(),
        )
    }

    #[test]
    fn request_url_joins_base_and_encodes_locale() {
        let src = HttpListingSource::new("http://localhost:3000/");
        let url = src.request_url(&query()).unwrap();
        assert_eq!(url.path(), "/api/properties");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0], ("north".to_string(), "39.86".to_string()));
        assert_eq!(pairs[5], ("district".to_string(), "Çankaya".to_string()));
    }

    #[test]
    fn invalid_base_is_reported() {
        let src = HttpListingSource::new("not a url");
        assert!(matches!(
            src.request_url(&query()),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn error_message_prefers_json_error_field() {
        assert_eq!(error_message(br#"{"error":"db down"}"#), "db down");
        assert_eq!(error_message(b"Bad Gateway"), "Bad Gateway");
    }
}
