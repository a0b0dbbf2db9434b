//! Cache-first loading of list pages.
//!
//! A [`ListLoader`] answers a list view's query from the shared
//! [`QueryCache`] while the cached page is fresh and falls through to its
//! [`ListSource`] otherwise. Pages are cached as raw JSON rows so one cache
//! serves every row type; [`ListLoader::load`] decodes on the way out.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use clinica_core::cache::{CacheConfig, QueryCache};
use clinica_core::pagination::PaginatedResult;
use clinica_core::query::{Filter, ListQuery};
use clinica_core::resources::Resource;

use crate::error::ClientResult;
use crate::source::ListSource;

/// Cache of raw list pages shared by loaders and admin actions.
pub type PageCache = QueryCache<PaginatedResult<serde_json::Value>>;

/// Loads list pages through a shared cache.
pub struct ListLoader<S> {
    source: S,
    cache: Arc<PageCache>,
}

impl<S: ListSource> ListLoader<S> {
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self::with_cache(source, Arc::new(QueryCache::new(config)))
    }

    /// Share an existing cache, e.g. one also held by [`AdminActions`](crate::actions::AdminActions).
    pub fn with_cache(source: S, cache: Arc<PageCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<PageCache> {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load one page decoded into `T`.
    pub async fn load<T: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &ListQuery,
        filters: &[Filter],
    ) -> ClientResult<PaginatedResult<T>> {
        let page = self.load_raw(resource, query, filters).await?;
        decode_page(page)
    }

    /// Load one page of raw rows, serving a fresh cached copy when present.
    pub async fn load_raw(
        &self,
        resource: Resource,
        query: &ListQuery,
        filters: &[Filter],
    ) -> ClientResult<PaginatedResult<serde_json::Value>> {
        let key = resource.key(query, filters);
        if let Some(page) = self.cache.get_fresh(&key) {
            tracing::debug!(%resource, page = query.page(), "List cache hit");
            return Ok(page);
        }
        tracing::debug!(%resource, page = query.page(), "List cache miss");
        self.fetch_and_store(resource, query, filters).await
    }

    /// Fetch from the source even when a fresh copy is cached.
    pub async fn refetch(
        &self,
        resource: Resource,
        query: &ListQuery,
        filters: &[Filter],
    ) -> ClientResult<PaginatedResult<serde_json::Value>> {
        self.fetch_and_store(resource, query, filters).await
    }

    /// The last cached copy of a page, fresh or stale, for display while a
    /// refetch is running.
    pub fn placeholder(
        &self,
        resource: Resource,
        query: &ListQuery,
        filters: &[Filter],
    ) -> Option<PaginatedResult<serde_json::Value>> {
        self.cache
            .get_entry(&resource.key(query, filters))
            .map(|entry| entry.value)
    }

    /// Mark every cached page of `resource` and its dependents stale.
    pub fn invalidate(&self, resource: Resource) -> usize {
        invalidate_with_dependents(&self.cache, resource)
    }

    async fn fetch_and_store(
        &self,
        resource: Resource,
        query: &ListQuery,
        filters: &[Filter],
    ) -> ClientResult<PaginatedResult<serde_json::Value>> {
        let started = self.cache.generation();
        let page = self.source.fetch_page(resource, query, filters).await?;

        if !page.is_consistent(query.limit()) {
            tracing::warn!(
                %resource,
                page = page.page,
                total = page.total,
                total_pages = page.total_pages,
                limit = query.limit(),
                "Backend page metadata disagrees with requested limit",
            );
        }

        tracing::info!(
            %resource,
            page = page.page,
            rows = page.items.len(),
            total = page.total,
            "Fetched list page",
        );

        let entry = self
            .cache
            .insert_fetched(resource.key(query, filters), page.clone(), started);
        if entry.invalidated {
            tracing::debug!(
                %resource,
                page = page.page,
                "Page invalidated mid-fetch; cached as stale",
            );
        }
        Ok(page)
    }
}

/// Mark `resource` and the resources that embed its data stale.
///
/// Returns the number of cache entries hit.
pub fn invalidate_with_dependents(cache: &PageCache, resource: Resource) -> usize {
    let mut hit = cache.invalidate_resource(resource.as_str());
    for dependent in resource.dependents() {
        hit += cache.invalidate_resource(dependent.as_str());
    }
    tracing::debug!(%resource, entries = hit, "Invalidated cached pages");
    hit
}

/// Decode raw rows into `T`, keeping the paging metadata.
pub fn decode_page<T: DeserializeOwned>(
    raw: PaginatedResult<serde_json::Value>,
) -> ClientResult<PaginatedResult<T>> {
    let items = raw
        .items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(PaginatedResult {
        items,
        total: raw.total,
        page: raw.page,
        total_pages: raw.total_pages,
        has_more: raw.has_more,
    })
}
