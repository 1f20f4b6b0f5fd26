use tracing::{debug, warn};

use crate::{
    client::Client,
    constants::FALLBACK_LOCATION,
    error::SearchError,
    reply::{CategorisedResult, CategoryRenderer, SearchReply},
};

pub const VENUES_CATEGORY_ID: &str = "venues";

/// Coordinates reported by the host. Either part may be unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchMetadata {
    pub location: Option<Location>,
}

/// `"lat,lng"` with two decimals each, or [`FALLBACK_LOCATION`] without usable coordinates.
pub fn format_location(location: Option<&Location>) -> String {
    let coordinates = location
        .and_then(|location| location.latitude.zip(location.longitude))
        .filter(|(latitude, longitude)| latitude.is_finite() && longitude.is_finite());
    match coordinates {
        Some((latitude, longitude)) => format!("{latitude:.2},{longitude:.2}"),
        None => FALLBACK_LOCATION.to_string(),
    }
}

/// How a [`Query::run`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every venue was pushed.
    Completed { pushed: usize },
    /// The reply stopped accepting results.
    Stopped { pushed: usize },
    /// The search failed; the error went to the reply.
    Failed,
    /// Cancellation was requested before the run finished.
    Cancelled,
}

/// One venue search, from the host's query text to pushed results.
#[derive(Debug)]
pub struct Query {
    query_string: String,
    metadata: SearchMetadata,
    client: Client,
}

impl Query {
    pub fn new(query_string: impl Into<String>, metadata: SearchMetadata, client: Client) -> Self {
        Self {
            query_string: query_string.into(),
            metadata,
            client,
        }
    }

    /// Abort the running search. May be called from another thread while [`Query::run`] is in progress.
    pub fn cancelled(&self) {
        self.client.cancel();
    }

    pub async fn run<R: SearchReply + ?Sized>(&self, reply: &mut R) -> RunOutcome {
        let location = format_location(self.metadata.location.as_ref());
        let query_string = self.query_string.trim();
        debug!(query = query_string, %location, "running venue query");

        let venues = match self.client.search(query_string, &location).await {
            Ok(venues) => venues,
            Err(error) => return self.fail(reply, error),
        };

        let category = reply.register_category(
            VENUES_CATEGORY_ID,
            "",
            "",
            CategoryRenderer::default(),
        );

        let mut pushed = 0;
        for venue in &venues {
            if self.client.is_cancelled() {
                return self.fail(reply, SearchError::Cancelled);
            }
            let accepted = reply.push(CategorisedResult::from_venue(&category, venue));
            pushed += 1;
            if !accepted {
                debug!(pushed, "reply closed, stopping");
                return RunOutcome::Stopped { pushed };
            }
        }
        RunOutcome::Completed { pushed }
    }

    fn fail<R: SearchReply + ?Sized>(&self, reply: &mut R, error: SearchError) -> RunOutcome {
        let outcome = if error.is_cancelled() {
            RunOutcome::Cancelled
        } else {
            warn!(%error, "venue query failed");
            RunOutcome::Failed
        };
        reply.report_error(error);
        outcome
    }
}
