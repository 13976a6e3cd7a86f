use std::future::Future;
use std::pin::Pin;

use foundation::math::Located;

use crate::{Listing, ViewportBoundsQuery};

/// Boxed future so the source trait stays dyn-compatible.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Failure of a single listing query. Never fatal to the viewer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("listing request failed: {0}")]
    Transport(String),
    #[error("listing endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("listing response could not be decoded: {0}")]
    Decode(String),
    #[error("invalid listing endpoint URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// HTTP status, when the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Query capability for listings inside a viewport.
pub trait ListingSource: Send + Sync {
    fn query<'a>(
        &'a self,
        query: &'a ViewportBoundsQuery,
    ) -> BoxFuture<'a, Result<Vec<Listing>, FetchError>>;
}

impl<S: ListingSource + ?Sized> ListingSource for std::sync::Arc<S> {
    fn query<'a>(
        &'a self,
        query: &'a ViewportBoundsQuery,
    ) -> BoxFuture<'a, Result<Vec<Listing>, FetchError>> {
        (**self).query(query)
    }
}

/// Fixed in-memory listing set, filtered by bounds. Useful offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticListingSource {
    listings: Vec<Listing>,
}

impl StaticListingSource {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }
}

impl ListingSource for StaticListingSource {
    fn query<'a>(
        &'a self,
        query: &'a ViewportBoundsQuery,
    ) -> BoxFuture<'a, Result<Vec<Listing>, FetchError>> {
        Box::pin(async move {
            Ok(self
                .listings
                .iter()
                .filter(|l| query.bounds.contains(l.position()))
                .cloned()
                .collect())
        })
    }
}
