use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use foundation::GeoBounds;

use crate::{FetchError, Listing, ListingSource, LocaleFilter, ViewportBoundsQuery};

/// Result of one fetch attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// New active set; replaces the previous one wholesale.
    Replaced(Vec<Listing>),
    /// Another fetch was already in flight; the transport was not touched.
    Skipped,
    /// Transport or decode failure; the caller keeps its previous set.
    Failed(FetchError),
}

/// Single-flight viewport fetcher.
///
/// Cloning shares the in-flight flag, so overlapping calls from any clone are
/// dropped rather than queued.
pub struct ViewportFetcher<S> {
    source: Arc<S>,
    locale: LocaleFilter,
    in_flight: Arc<AtomicBool>,
    issued: Arc<AtomicUsize>,
}

impl<S> Clone for ViewportFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            locale: self.locale.clone(),
            in_flight: Arc::clone(&self.in_flight),
            issued: Arc::clone(&self.issued),
        }
    }
}

// Clears the flag on drop, including when the fetch future is cancelled.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: ListingSource> ViewportFetcher<S> {
    pub fn new(source: S, locale: LocaleFilter) -> Self {
        Self::from_shared(Arc::new(source), locale)
    }

    pub fn from_shared(source: Arc<S>, locale: LocaleFilter) -> Self {
        Self {
            source,
            locale,
            in_flight: Arc::new(AtomicBool::new(false)),
            issued: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn locale(&self) -> &LocaleFilter {
        &self.locale
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of queries actually sent to the source.
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::Relaxed)
    }

    pub fn query_for(&self, bounds: GeoBounds) -> ViewportBoundsQuery {
        ViewportBoundsQuery::new(bounds, self.locale.clone())
    }

    pub async fn fetch(&self, bounds: GeoBounds) -> FetchOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("listing fetch already in flight; skipping");
            return FetchOutcome::Skipped;
        }
        let _guard = InFlight(&self.in_flight);

        let query = self.query_for(bounds);
        self.issued.fetch_add(1, Ordering::Relaxed);
        match self.source.query(&query).await {
            Ok(listings) => {
                tracing::info!(
                    count = listings.len(),
                    north = bounds.north,
                    south = bounds.south,
                    east = bounds.east,
                    west = bounds.west,
                    "fetched listings for viewport"
                );
                FetchOutcome::Replaced(listings)
            }
            Err(err) => {
                tracing::warn!(error = %err, status = ?err.status(), "listing fetch failed");
                FetchOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxFuture, StaticListingSource};
    use foundation::math::LngLat;
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    fn bounds() -> GeoBounds {
        GeoBounds::new(39.86, 39.83, 32.87, 32.84)
    }

    struct GatedSource {
        gate: Notify,
        calls: AtomicUsize,
    }

    impl ListingSource for GatedSource {
        fn query<'a>(
            &'a self,
            _query: &'a ViewportBoundsQuery,
        ) -> BoxFuture<'a, Result<Vec<Listing>, FetchError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.gate.notified().await;
                Ok(vec![Listing::at(1, LngLat::new(32.85, 39.84))])
            })
        }
    }

    struct FailingSource;

    impl ListingSource for FailingSource {
        fn query<'a>(
            &'a self,
            _query: &'a ViewportBoundsQuery,
        ) -> BoxFuture<'a, Result<Vec<Listing>, FetchError>> {
            Box::pin(async {
                Err(FetchError::Status {
                    status: 500,
                    message: "boom".to_string(),
                })
            })
        }
    }

    #[tokio::test]
    async fn overlapping_fetch_is_dropped() {
        let source = Arc::new(GatedSource {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let fetcher = ViewportFetcher::from_shared(Arc::clone(&source), LocaleFilter::default());
        let second = fetcher.clone();

        let (first, overlapping, ()) = tokio::join!(
            fetcher.fetch(bounds()),
            async {
                assert!(second.is_in_flight());
                second.fetch(bounds()).await
            },
            async { source.gate.notify_one() },
        );

        assert!(matches!(first, FetchOutcome::Replaced(ref l) if l.len() == 1));
        assert_eq!(overlapping, FetchOutcome::Skipped);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetcher.issued(), 1);
        assert!(!fetcher.is_in_flight());
    }

    #[tokio::test]
    async fn sequential_fetches_both_run() {
        let fetcher = ViewportFetcher::new(
            StaticListingSource::new(vec![
                Listing::at(1, LngLat::new(32.85, 39.84)),
                Listing::at(2, LngLat::new(33.50, 39.84)),
            ]),
            LocaleFilter::default(),
        );
        let a = fetcher.fetch(bounds()).await;
        let b = fetcher.fetch(bounds()).await;
        assert_eq!(a, b);
        match a {
            FetchOutcome::Replaced(l) => assert_eq!(l.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1]),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(fetcher.issued(), 2);
    }

    #[tokio::test]
    async fn failure_releases_the_guard() {
        let fetcher = ViewportFetcher::new(FailingSource, LocaleFilter::default());
        let outcome = fetcher.fetch(bounds()).await;
        assert_eq!(
            outcome.clone(),
            FetchOutcome::Failed(FetchError::Status {
                status: 500,
                message: "boom".to_string()
            })
        );
        assert!(!fetcher.is_in_flight());
        assert!(matches!(fetcher.fetch(bounds()).await, FetchOutcome::Failed(_)));
    }
}
