//! ListingService: aggregates the store's paginated list calls into one
//! logical listing per prefix, and locates `index.html` objects in it.

use crate::{
    errors::{StoreError, StoreResult},
    models::listing::ListingPage,
    services::store::ObjectStore,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Literal looked for in object keys when deciding whether a prefix has an
/// index page.
pub const INDEX_DOCUMENT: &str = "index.html";

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn ObjectStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// List everything directly under `prefix`, following truncation markers
    /// until the store reports a complete page.
    ///
    /// Pages are fetched strictly one after another since each call depends
    /// on the previous page's marker. Any failing call discards what was
    /// gathered so far.
    #[instrument(skip(self))]
    pub async fn list(&self, prefix: &str) -> StoreResult<ListingPage> {
        let mut listing = ListingPage::new(prefix);
        let mut marker: Option<String> = None;
        let mut calls = 0usize;

        loop {
            let page = self.store.list_objects(prefix, marker.as_deref()).await?;
            calls += 1;

            let next = if page.is_truncated {
                let next = page.continuation_marker().map(str::to_string).ok_or_else(|| {
                    StoreError::bad_gateway(format!(
                        "truncated listing of `{prefix}` carried no continuation marker"
                    ))
                })?;
                if marker.as_deref().is_some_and(|prev| next.as_str() <= prev) {
                    return Err(StoreError::bad_gateway(format!(
                        "listing of `{prefix}` did not advance past marker `{next}`"
                    )));
                }
                Some(next)
            } else {
                None
            };

            listing.extend(page);

            match next {
                Some(next) => {
                    debug!(marker = %next, "listing truncated, continuing");
                    marker = Some(next);
                }
                None => break,
            }
        }

        debug!(
            calls,
            sub_prefixes = listing.entries.len(),
            objects = listing.objects.len(),
            "listing complete"
        );
        Ok(listing)
    }
}

/// First object, in store order, whose key mentions `index.html`.
pub fn find_index(page: &ListingPage) -> Option<&str> {
    page.objects
        .iter()
        .find(|obj| obj.key.contains(INDEX_DOCUMENT))
        .map(|obj| obj.key.as_str())
}
