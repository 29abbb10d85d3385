use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::area::BoundingBox;
use super::error::TrackerError;

const USER_AGENT: &str = concat!("plane-o-mat/", env!("CARGO_PKG_VERSION"));

/// Source of raw state-vector payloads for a bounding box.
pub trait FeedSource: Send + Sync + 'static {
    fn fetch(&self, bbox: BoundingBox) -> impl Future<Output = Result<String, TrackerError>> + Send;
}

/// `GET <base>?lamin=..&lomin=..&lamax=..&lomax=..`
#[derive(Debug, Clone)]
pub struct OpenSkyClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, Option<String>)>,
}

impl OpenSkyClient {
    pub fn new(
        base_url: &str,
        username: Option<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            credentials: username.map(|u| (u, password)),
        })
    }

    fn request(&self, bbox: &BoundingBox) -> reqwest::RequestBuilder {
        let request = self.client.get(&self.base_url).query(&bbox_query(bbox));
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_ref()),
            None => request,
        }
    }
}

impl FeedSource for OpenSkyClient {
    async fn fetch(&self, bbox: BoundingBox) -> Result<String, TrackerError> {
        let response = self.request(&bbox).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status(status));
        }

        let body = response.text().await?;
        if body.is_empty() {
            return Err(TrackerError::EmptyPayload);
        }
        Ok(body)
    }
}

pub fn bbox_query(bbox: &BoundingBox) -> [(&'static str, f64); 4] {
    [
        ("lamin", bbox.lat_min),
        ("lomin", bbox.lon_min),
        ("lamax", bbox.lat_max),
        ("lomax", bbox.lon_max),
    ]
}

/// Result of one fetch, delivered back to the tracker loop.
#[derive(Debug)]
pub struct FetchCompletion {
    result: Result<String, TrackerError>,
}

/// Runs fetches off the tick loop, at most one at a time.
///
/// The in-flight flag is only touched from the loop that owns the controller:
/// it is set by [`try_fetch`](Self::try_fetch) and cleared when the matching
/// [`FetchCompletion`] is handed to [`complete`](Self::complete).
pub struct FetchController<S> {
    source: Arc<S>,
    in_flight: bool,
    completions: mpsc::UnboundedSender<FetchCompletion>,
}

impl<S: FeedSource> FetchController<S> {
    pub fn new(source: S) -> (Self, mpsc::UnboundedReceiver<FetchCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            source: Arc::new(source),
            in_flight: false,
            completions: tx,
        };
        (controller, rx)
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Starts a fetch unless one is outstanding. Must be called from within a
    /// tokio runtime.
    pub fn try_fetch(&mut self, bbox: BoundingBox) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;

        let source = Arc::clone(&self.source);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = source.fetch(bbox).await;
            let _ = completions.send(FetchCompletion { result });
        });

        log::debug!("fetch started for {:?}", bbox);
        true
    }

    /// Clears the in-flight flag. Failures are logged and swallowed here.
    pub fn complete(&mut self, completion: FetchCompletion) -> Option<String> {
        self.in_flight = false;
        match completion.result {
            Ok(payload) => Some(payload),
            Err(e) => {
                log::warn!("feed fetch failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Feed that answers every request with the same payload.
    pub struct StaticFeed {
        pub calls: Arc<AtomicUsize>,
        pub payload: Result<String, ()>,
    }

    impl StaticFeed {
        pub fn new(payload: &str) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                payload: Ok(payload.to_string()),
            }
        }

        pub fn failing() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                payload: Err(()),
            }
        }
    }

    impl FeedSource for StaticFeed {
        async fn fetch(&self, _bbox: BoundingBox) -> Result<String, TrackerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payload.clone().map_err(|_| TrackerError::EmptyPayload)
        }
    }

    fn bbox() -> BoundingBox {
        BoundingBox {
            lat_min: 49.75,
            lat_max: 50.25,
            lon_min: 9.75,
            lon_max: 10.25,
        }
    }

    #[tokio::test]
    async fn test_overlapping_triggers_fetch_once() {
        let feed = StaticFeed::new("payload");
        let calls = feed.calls.clone();
        let (mut fetch, mut completions) = FetchController::new(feed);

        assert!(fetch.try_fetch(bbox()));
        assert!(!fetch.try_fetch(bbox()));
        assert!(fetch.in_flight());

        let completion = completions.recv().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(fetch.in_flight());

        assert_eq!(fetch.complete(completion).as_deref(), Some("payload"));
        assert!(!fetch.in_flight());

        assert!(fetch.try_fetch(bbox()));
        let completion = completions.recv().await.unwrap();
        fetch.complete(completion);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_clears_flag() {
        let (mut fetch, mut completions) = FetchController::new(StaticFeed::failing());

        assert!(fetch.try_fetch(bbox()));
        let completion = completions.recv().await.unwrap();
        assert_eq!(fetch.complete(completion), None);
        assert!(!fetch.in_flight());
    }

    #[test]
    fn test_query_url() {
        let client = OpenSkyClient::new(
            "https://example.org/api/states/all",
            None,
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        let request = client.request(&bbox()).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://example.org/api/states/all?lamin=49.75&lomin=9.75&lamax=50.25&lomax=10.25"
        );
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_credentials_sent_as_basic_auth() {
        let client = OpenSkyClient::new(
            "https://example.org/api/states/all",
            Some("user".into()),
            Some("secret".into()),
            Duration::from_secs(5),
        )
        .unwrap();

        let request = client.request(&bbox()).build().unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_some());
        assert!(!request.url().as_str().contains("secret"));
    }
}
