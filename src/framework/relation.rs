//! # Relations
//!
//! A [`Relation<K>`] describes a filtered remote collection and pages through
//! it lazily with the platform's cursor.
//!
//! ## Query chaining
//!
//! [`filter`](Relation::filter), [`refilter`](Relation::refilter),
//! [`limit`](Relation::limit) and [`offset`](Relation::offset) take `&self`
//! and return a new relation, so the receiver never changes:
//!
//! ```ignore
//! let paused = account.campaigns()?.filter([("status", json!(["PAUSED"]))]);
//! let both = paused.filter([("status", json!(["DELETED"]))]);   // PAUSED + DELETED
//! let deleted = paused.refilter([("status", json!(["DELETED"]))]); // DELETED only
//! ```
//!
//! ## Enumeration
//!
//! [`iter`](Relation::iter) starts a fresh traversal. Pages are fetched one at
//! a time as the previous one runs out; the traversal ends when a page has no
//! cursor or once `limit` resources were yielded, before fetching another
//! page. The first successful page is kept for the lifetime of this relation
//! (clones start without it), so a second traversal replays page one and
//! fetches the rest again. [`reload`](Relation::reload) drops it.
//!
//! A failed page is a `PageNotLoaded` error under the strict pagination
//! policy, and the end of the traversal otherwise.

use std::fmt;
use std::marker::PhantomData;

use serde_json::{json, Map, Value as Json};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::framework::association::foreign_keys;
use crate::framework::client::Client;
use crate::framework::descriptor::Params;
use crate::framework::error::ResourceError;
use crate::framework::resource::{Resource, ResourceKind};
use crate::framework::transport::Response;

pub struct Relation<K: ResourceKind> {
    client: Client,
    filters: Params,
    limit_value: Option<usize>,
    offset_value: Option<String>,
    first_page: OnceCell<Response>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> Relation<K> {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            filters: Params::new(),
            limit_value: None,
            offset_value: None,
            first_page: OnceCell::new(),
            _kind: PhantomData,
        }
    }

    /// Adds filters. When a key is already filtered and both values are
    /// arrays, the result is their union without duplicates; otherwise the
    /// new value wins.
    pub fn filter<S: Into<String>>(&self, filters: impl IntoIterator<Item = (S, Json)>) -> Self {
        let mut relation = self.clone();
        for (key, value) in filters {
            let key = key.into();
            let merged = match (relation.filters.get_mut(&key), &value) {
                (Some(Json::Array(existing)), Json::Array(added)) => {
                    for item in added {
                        if !existing.contains(item) {
                            existing.push(item.clone());
                        }
                    }
                    true
                }
                _ => false,
            };
            if !merged {
                relation.filters.insert(key, value);
            }
        }
        relation
    }

    /// Sets filters, always replacing the previous value of each key.
    pub fn refilter<S: Into<String>>(&self, filters: impl IntoIterator<Item = (S, Json)>) -> Self {
        let mut relation = self.clone();
        for (key, value) in filters {
            relation.filters.insert(key.into(), value);
        }
        relation
    }

    /// Caps the number of resources a traversal yields. Also sent to the
    /// platform as the page size.
    pub fn limit(&self, limit: usize) -> Self {
        let mut relation = self.clone();
        relation.limit_value = Some(limit);
        relation
    }

    /// Starts traversal at an opaque platform cursor.
    pub fn offset(&self, cursor: impl Into<String>) -> Self {
        let mut relation = self.clone();
        relation.offset_value = Some(cursor.into());
        relation
    }

    pub fn filters(&self) -> &Params {
        &self.filters
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit_value
    }

    pub fn offset_value(&self) -> Option<&str> {
        self.offset_value.as_deref()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Forgets the memoized first page.
    pub fn reload(&mut self) {
        self.first_page = OnceCell::new();
    }

    /// Starts a new traversal.
    pub fn iter(&self) -> Records<'_, K> {
        Records {
            relation: self,
            rows: Vec::new().into_iter(),
            cursor: None,
            started: false,
            finished: false,
            yielded: 0,
        }
    }

    /// Drains a traversal into a vector.
    pub async fn to_vec(&self) -> Result<Vec<Resource<K>>, ResourceError> {
        let mut records = self.iter();
        let mut resources = Vec::new();
        while let Some(resource) = records.next().await? {
            resources.push(resource);
        }
        Ok(resources)
    }

    pub async fn first(&self) -> Result<Option<Resource<K>>, ResourceError> {
        self.iter().next().await
    }

    /// Counts by draining a traversal: one request per page.
    pub async fn count(&self) -> Result<usize, ResourceError> {
        let mut records = self.iter();
        let mut count = 0;
        while records.next().await?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    fn page_params(&self, cursor: Option<&str>) -> Params {
        let mut params = self.filters.clone();
        if let Some(limit) = self.limit_value {
            params.insert("limit".to_string(), json!(limit));
        }
        if let Some(cursor) = cursor {
            params.insert(K::CURSOR_PARAM.to_string(), json!(cursor));
        }
        params
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Response, ResourceError> {
        let request = K::index_request(&self.client, &self.page_params(cursor))?;
        debug!(kind = K::NAME, cursor = ?cursor, "Fetching page");
        Ok(self.client.execute(&request).await)
    }

    async fn first_page(&self) -> Result<Response, ResourceError> {
        if let Some(page) = self.first_page.get() {
            return Ok(page.clone());
        }
        let page = self.fetch_page(self.offset_value.as_deref()).await?;
        if page.is_success() {
            let _ = self.first_page.set(page.clone());
        }
        Ok(page)
    }

    /// Copies scalar foreign keys from the filters into a row that lacks them,
    /// then builds a clean resource from it.
    fn hydrate(&self, mut row: Map<String, Json>) -> Resource<K> {
        let schema = K::schema();
        let registered: Vec<&str> = foreign_keys(K::associations()).collect();
        for (key, value) in &self.filters {
            let foreign = registered.contains(&key.as_str()) || key.ends_with("_id");
            if !foreign || value.is_null() || value.is_array() || value.is_object() {
                continue;
            }
            if let Some(wire) = schema.external_name(key) {
                row.entry(wire.to_string()).or_insert_with(|| value.clone());
            }
        }
        Resource::from_row(&self.client, &row)
    }
}

impl<K: ResourceKind> Clone for Relation<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            filters: self.filters.clone(),
            limit_value: self.limit_value,
            offset_value: self.offset_value.clone(),
            first_page: OnceCell::new(),
            _kind: PhantomData,
        }
    }
}

impl<K: ResourceKind> fmt::Debug for Relation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("kind", &K::NAME)
            .field("filters", &self.filters)
            .field("limit", &self.limit_value)
            .field("offset", &self.offset_value)
            .field("loaded", &self.first_page.initialized())
            .finish()
    }
}

/// One traversal of a [`Relation`].
pub struct Records<'a, K: ResourceKind> {
    relation: &'a Relation<K>,
    rows: std::vec::IntoIter<Map<String, Json>>,
    cursor: Option<String>,
    started: bool,
    finished: bool,
    yielded: usize,
}

impl<K: ResourceKind> Records<'_, K> {
    /// The next resource, fetching the next page when the current one is used
    /// up. `Ok(None)` once the traversal is over.
    pub async fn next(&mut self) -> Result<Option<Resource<K>>, ResourceError> {
        loop {
            if self.finished {
                return Ok(None);
            }
            if self.relation.limit_value.is_some_and(|limit| self.yielded >= limit) {
                self.finished = true;
                return Ok(None);
            }
            if let Some(row) = self.rows.next() {
                self.yielded += 1;
                return Ok(Some(self.relation.hydrate(row)));
            }

            let page = if !self.started {
                self.started = true;
                self.relation.first_page().await?
            } else {
                match self.cursor.take() {
                    Some(cursor) => self.relation.fetch_page(Some(&cursor)).await?,
                    None => {
                        self.finished = true;
                        return Ok(None);
                    }
                }
            };

            if !page.is_success() {
                self.finished = true;
                if self.relation.client.policy().strict_pagination {
                    return Err(ResourceError::PageNotLoaded {
                        kind: K::NAME,
                        response: Box::new(page),
                    });
                }
                warn!(
                    kind = K::NAME,
                    status = page.status(),
                    error = %page.failure_message(),
                    "Page was not loaded, ending enumeration"
                );
                return Ok(None);
            }

            self.cursor = K::page_cursor(&page);
            self.rows = K::page_rows(&page).into_iter();
        }
    }

    /// Resources yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }
}
