//! Lazy, paginated listing over the storage layer.
//!
//! A [`PageSource`] knows how to fetch one page given the previous page's
//! continuation marker. A [`Paginator`] drives a source to exhaustion,
//! keeping the continuation state to itself, so callers just pull pages (or
//! everything at once) in order.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::storage::{ListPage, Storage, VersionMarker};
use crate::types::{ObjectKey, ObjectVersion};

/// Fetches one page of a listing.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;
    type Marker: Send;

    async fn fetch_page(
        &self,
        marker: Option<Self::Marker>,
    ) -> Result<ListPage<Self::Item, Self::Marker>>;
}

enum PaginatorState<M> {
    NotStarted,
    Continue(M),
    Exhausted,
}

/// Produces an ordered, finite sequence of pages from a [`PageSource`].
pub struct Paginator<S: PageSource> {
    source: S,
    state: PaginatorState<S::Marker>,
    pages_fetched: usize,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: PaginatorState::NotStarted,
            pages_fetched: 0,
        }
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the source has reported its last page. After
    /// an error the paginator is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<S::Item>>> {
        let marker = match std::mem::replace(&mut self.state, PaginatorState::Exhausted) {
            PaginatorState::Exhausted => return Ok(None),
            PaginatorState::NotStarted => None,
            PaginatorState::Continue(marker) => Some(marker),
        };

        let page = self.source.fetch_page(marker).await?;
        self.pages_fetched += 1;

        if let Some(next_marker) = page.next_marker {
            self.state = PaginatorState::Continue(next_marker);
        }

        debug!(
            page = self.pages_fetched,
            items = page.items.len(),
            "listing page fetched."
        );

        Ok(Some(page.items))
    }

    /// Drain every remaining page, concatenating items in page order.
    pub async fn collect_all(mut self) -> Result<Vec<S::Item>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

/// Object keys of a bucket, via ListObjectsV2.
pub struct ObjectKeySource<'a> {
    storage: &'a Storage,
    bucket: &'a str,
}

impl<'a> ObjectKeySource<'a> {
    pub fn new(storage: &'a Storage, bucket: &'a str) -> Self {
        Self { storage, bucket }
    }
}

#[async_trait]
impl PageSource for ObjectKeySource<'_> {
    type Item = ObjectKey;
    type Marker = String;

    async fn fetch_page(&self, marker: Option<String>) -> Result<ListPage<ObjectKey, String>> {
        self.storage.list_objects(self.bucket, marker).await
    }
}

/// Versions and delete markers under a key prefix, via ListObjectVersions.
pub struct ObjectVersionSource<'a> {
    storage: &'a Storage,
    bucket: &'a str,
    prefix: &'a str,
}

impl<'a> ObjectVersionSource<'a> {
    pub fn new(storage: &'a Storage, bucket: &'a str, prefix: &'a str) -> Self {
        Self {
            storage,
            bucket,
            prefix,
        }
    }
}

#[async_trait]
impl PageSource for ObjectVersionSource<'_> {
    type Item = ObjectVersion;
    type Marker = VersionMarker;

    async fn fetch_page(
        &self,
        marker: Option<VersionMarker>,
    ) -> Result<ListPage<ObjectVersion, VersionMarker>> {
        self.storage
            .list_object_versions(self.bucket, self.prefix, marker)
            .await
    }
}
