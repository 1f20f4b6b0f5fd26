use reqwest::{header::USER_AGENT, Url};
use serde_json::Value;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::{
    api_interfaces::explore,
    cancel::CancelFlag,
    config::Config,
    constants::*,
    error::SearchError,
    progress::{Next, Progress},
    util::{default_http_client, redacted_url},
    venue::Venues,
};

/// Client for the venue explore endpoint.
///
/// Clones share the cancellation flag, so cancelling any clone aborts the
/// search running on another.
#[derive(Clone, Debug)]
pub struct Client {
    http_client: reqwest::Client,
    config: Config,
    cancelled: CancelFlag,
}

impl Client {
    pub fn new(http_client: reqwest::Client, config: Config) -> Self {
        Self {
            http_client,
            config,
            cancelled: CancelFlag::new(),
        }
    }

    /// Client backed by a compressed-transfer capable HTTP client.
    pub fn from_config(config: Config) -> Result<Self, SearchError> {
        Ok(Self::new(default_http_client()?, config))
    }

    /// Search venues matching `query` near `location` (`"lat,lng"`).
    ///
    /// An empty `query` is sent as-is. Exactly one request is made; there is
    /// no retry and no caching.
    pub async fn search(&self, query: &str, location: &str) -> Result<Venues, SearchError> {
        let url = self.request_url(query, location)?;
        debug!(url = %redacted_url(&url), "searching venues");
        let root = self.get(url).await?;
        match explore::parse_venues(&root) {
            Ok(venues) => {
                debug!(count = venues.len(), "parsed venues");
                Ok(Venues::from(venues))
            }
            Err(error) => {
                warn!(%error, "venue search rejected");
                Err(error)
            }
        }
    }

    /// Ask any in-flight search to abort. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        if !self.cancelled.is_cancelled() {
            info!("venue search cancellation requested");
        }
        self.cancelled.request_cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_cancelled()
    }

    /// Handle sharing this client's cancellation flag.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancelled.clone()
    }

    /// Progress callback polled while a request is in flight.
    pub fn progress_report(&self, progress: &Progress) -> Next {
        trace!(received = progress.received, total = ?progress.total, "request progress");
        if self.cancelled.is_cancelled() {
            Next::Abort
        } else {
            Next::Continue
        }
    }

    /// The explore URL for `query` near `location`.
    pub fn request_url(&self, query: &str, location: &str) -> Result<Url, SearchError> {
        let mut url = self
            .config
            .api_root_url()
            .map_err(|e| SearchError::BuildError(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| {
                SearchError::BuildError(format!("`{}` cannot be a base", self.config.api_root))
            })?
            .pop_if_empty()
            .extend(EXPLORE_PATH);
        url.query_pairs_mut()
            .append_pair("near", location)
            .append_pair("query", query)
            .append_pair("section", EXPLORE_SECTION)
            .append_pair("venuePhotos", EXPLORE_VENUE_PHOTOS)
            .append_pair("radius", EXPLORE_RADIUS_METERS)
            .append_pair(ACCESS_TOKEN_PARAM, &self.config.access_token)
            .append_pair("v", EXPLORE_API_VERSION)
            .append_pair("limit", EXPLORE_LIMIT);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Value, SearchError> {
        let mut progress = Progress::default();
        self.poll(&progress)?;

        let request = self
            .http_client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .send();
        tokio::pin!(request);
        let mut ticker = time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut response = loop {
            tokio::select! {
                response = &mut request => break response?,
                _ = ticker.tick() => self.poll(&progress)?,
            }
        };

        let status = response.status();
        progress.total = response.content_length();
        let mut body = Vec::new();
        loop {
            tokio::select! {
                chunk = response.chunk() => match chunk.map_err(SearchError::ResponseBodyError)? {
                    Some(chunk) => {
                        progress.received += chunk.len() as u64;
                        body.extend_from_slice(&chunk);
                        self.poll(&progress)?;
                    }
                    None => break,
                },
                _ = ticker.tick() => self.poll(&progress)?,
            }
        }

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!(%status, "venue search request failed");
            return Err(SearchError::RequestError { status, body });
        }
        Ok(serde_json::from_slice(&body)?)
    }

    fn poll(&self, progress: &Progress) -> Result<(), SearchError> {
        match self.progress_report(progress) {
            Next::Continue => Ok(()),
            Next::Abort => {
                info!(received = progress.received, "venue search aborted");
                Err(SearchError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const FAKE_TOKEN: &str = "fake-token";
    const FAKE_USER_AGENT: &str = "venuescope-tests/1.0";

    fn client_for(api_root: &str) -> Client {
        let config = Config::builder()
            .api_root(api_root)
            .user_agent(FAKE_USER_AGENT)
            .access_token(FAKE_TOKEN)
            .poll_interval(Duration::from_millis(10))
            .build()
            .unwrap();
        Client::new(reqwest::Client::new(), config)
    }

    fn explore_response(names: &[&str]) -> Value {
        let items: Vec<Value> = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                json!({
                    "venue": {
                        "id": format!("venue-{index}"),
                        "name": name,
                        "categories": [
                            { "name": "Cafe", "icon": { "prefix": "https://icons/cafe_", "suffix": ".png" } }
                        ]
                    }
                })
            })
            .collect();
        json!({ "meta": { "code": 200 }, "response": { "groups": [{ "items": items }] } })
    }

    #[test]
    fn request_url_contains_all_parameters() {
        let client = client_for("https://api.example.com/");
        let url = client.request_url("coffee shop", "40.37,49.84").unwrap();
        assert_eq!(url.path(), "/v2/venues/explore");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let expected = [
            ("near", "40.37,49.84"),
            ("query", "coffee shop"),
            ("section", "topPicks"),
            ("venuePhotos", "1"),
            ("radius", "800"),
            ("oauth_token", FAKE_TOKEN),
            ("v", "20140926"),
            ("limit", "10"),
        ]
        .map(|(key, value)| (key.to_string(), value.to_string()));
        assert_eq!(pairs, expected);
    }

    #[test]
    fn request_url_keeps_api_root_path() {
        let client = client_for("https://api.example.com/proxy/");
        let url = client.request_url("", "1.00,2.00").unwrap();
        assert_eq!(url.path(), "/proxy/v2/venues/explore");
        assert!(url.query_pairs().any(|(key, value)| key == "query" && value.is_empty()));
    }

    #[tokio::test]
    async fn search_success() {
        // Arrange
        let server = MockServer::start_async().await;
        let explore_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/venues/explore")
                    .header("User-Agent", FAKE_USER_AGENT)
                    .query_param("near", "40.37,49.84")
                    .query_param("query", "coffee")
                    .query_param("section", "topPicks")
                    .query_param("venuePhotos", "1")
                    .query_param("radius", "800")
                    .query_param("oauth_token", FAKE_TOKEN)
                    .query_param("v", "20140926")
                    .query_param("limit", "10");
                then.status(200)
                    .json_body(explore_response(&["Alpha", "Beta", "Gamma"]));
            })
            .await;
        let client = client_for(&server.url("/"));

        // Act
        let venues = client.search("coffee", "40.37,49.84").await;

        // Assert
        assert!(venues.is_ok(), "Failed to search: {:?}", venues.unwrap_err());
        let venues = venues.unwrap();
        let titles: Vec<_> = venues.iter().map(|venue| venue.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "Beta", "Gamma"]);
        let uris: Vec<_> = venues.iter().map(|venue| venue.uri.as_str()).collect();
        assert_eq!(uris, ["venue-0", "venue-1", "venue-2"]);
        assert!(venues
            .iter()
            .all(|venue| venue.venue_photo == "https://icons/cafe_bg_100.png"));
        explore_mock.assert();
    }

    #[tokio::test]
    async fn search_sends_empty_query() {
        // Arrange
        let server = MockServer::start_async().await;
        let explore_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/venues/explore")
                    .query_param_exists("query");
                then.status(200).json_body(explore_response(&["Alpha"]));
            })
            .await;
        let client = client_for(&server.url("/"));

        // Act
        let venues = client.search("", "40.37,49.84").await;

        // Assert
        assert_eq!(venues.unwrap().len(), 1);
        explore_mock.assert();
    }

    #[tokio::test]
    async fn search_empty_items_is_not_an_error() {
        // Arrange
        let server = MockServer::start_async().await;
        let explore_mock = server
            .mock_async(|when, then| {
                when.path("/v2/venues/explore");
                then.status(200)
                    .json_body(json!({ "cod": "200", "response": { "groups": [{ "items": [] }] } }));
            })
            .await;
        let client = client_for(&server.url("/"));

        // Act
        let venues = client.search("nothing", "40.37,49.84").await;

        // Assert
        assert!(venues.is_ok());
        assert!(venues.unwrap().is_empty());
        explore_mock.assert();
    }

    #[tokio::test]
    async fn search_api_error() {
        // Arrange
        let server = MockServer::start_async().await;
        let explore_mock = server
            .mock_async(|when, then| {
                when.path("/v2/venues/explore");
                then.status(200)
                    .json_body(json!({ "cod": "210", "message": "quota exceeded" }));
            })
            .await;
        let client = client_for(&server.url("/"));

        // Act
        let venues = client.search("coffee", "40.37,49.84").await;

        // Assert
        assert!(matches!(
            venues,
            Err(SearchError::ApiError(message)) if message == "quota exceeded"
        ));
        explore_mock.assert();
    }

    #[tokio::test]
    async fn search_bad_status() {
        // Arrange
        let server = MockServer::start_async().await;
        let explore_mock = server
            .mock_async(|when, then| {
                when.path("/v2/venues/explore");
                then.status(403).body("invalid token");
            })
            .await;
        let client = client_for(&server.url("/"));

        // Act
        let venues = client.search("coffee", "40.37,49.84").await;

        // Assert
        match venues {
            Err(SearchError::RequestError { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
                assert_eq!(body, "invalid token");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        explore_mock.assert();
    }

    #[tokio::test]
    async fn search_bad_json() {
        // Arrange
        let server = MockServer::start_async().await;
        let explore_mock = server
            .mock_async(|when, then| {
                when.path("/v2/venues/explore");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .body(r#"{"response": "#);
            })
            .await;
        let client = client_for(&server.url("/"));

        // Act
        let venues = client.search("coffee", "40.37,49.84").await;

        // Assert
        assert!(matches!(venues, Err(SearchError::ParseError(_))));
        explore_mock.assert();
    }

    #[tokio::test]
    async fn search_missing_response() {
        // Arrange
        let server = MockServer::start_async().await;
        let explore_mock = server
            .mock_async(|when, then| {
                when.path("/v2/venues/explore");
                then.status(200).json_body(json!({ "cod": 200 }));
            })
            .await;
        let client = client_for(&server.url("/"));

        // Act
        let venues = client.search("coffee", "40.37,49.84").await;

        // Assert
        assert!(matches!(venues, Err(SearchError::MissingField("response"))));
        explore_mock.assert();
    }

    #[tokio::test]
    async fn search_invalid_host() {
        // Arrange
        let client = client_for("http://test.invalid/");

        // Act
        let venues = client.search("coffee", "40.37,49.84").await;

        // Assert
        assert!(matches!(venues, Err(SearchError::RequestFailed(_))));
    }

    #[tokio::test]
    async fn search_cancelled_mid_flight() {
        // Arrange
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.path("/v2/venues/explore");
                then.status(200)
                    .delay(Duration::from_secs(5))
                    .json_body(explore_response(&["Alpha", "Beta"]));
            })
            .await;
        let client = client_for(&server.url("/"));
        let started = Instant::now();

        // Act
        let (venues, _) = tokio::join!(client.search("coffee", "40.37,49.84"), async {
            time::sleep(Duration::from_millis(100)).await;
            client.cancel();
        });

        // Assert
        assert!(matches!(venues, Err(SearchError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn search_after_cancel_sends_nothing() {
        // Arrange
        let server = MockServer::start_async().await;
        let explore_mock = server
            .mock_async(|when, then| {
                when.path("/v2/venues/explore");
                then.status(200).json_body(explore_response(&["Alpha"]));
            })
            .await;
        let client = client_for(&server.url("/"));
        client.cancel();
        client.cancel();

        // Act
        let venues = client.search("coffee", "40.37,49.84").await;

        // Assert
        assert!(venues.unwrap_err().is_cancelled());
        explore_mock.assert_hits_async(0).await;
    }

    #[test]
    fn progress_report_follows_flag() {
        let client = client_for("https://api.example.com/");
        let progress = Progress::default();
        assert_eq!(client.progress_report(&progress), Next::Continue);
        client.cancel_flag().request_cancel();
        assert_eq!(client.progress_report(&progress), Next::Abort);
        client.cancel();
        assert_eq!(client.progress_report(&progress), Next::Abort);
    }
}
