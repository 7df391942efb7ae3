//! # Page model
//!
//! A master-detail page: a catalog of items, at most one selected item, the
//! query text and the load state of the selected item's detail.
//!
//! Every transition that changes what the detail pane should show (select,
//! back, catalog reload) bumps the page [`Generation`]. Fetches are started
//! with a [`LoadTicket`] carrying the generation at the time of selection, and
//! [`PageState::complete`] drops any result whose ticket is no longer current.
//! The last selection wins regardless of the order in which responses arrive.
//!
//! ```rust
//! use portal_api::prelude::*;
//!
//! let mut page: PageState<CatalogItem, Preview> =
//!     PageState::new(Catalog::fallback().items);
//!
//! let first = page.select_key("HR_Employees").unwrap();
//! let second = page.select_key("RightFax_Users").unwrap();
//!
//! // the response for the second selection arrives first
//! assert!(page.complete(&second, Ok(Preview::empty("RightFax_Users"))));
//! // the late response for the first selection is discarded
//! assert!(!page.complete(&first, Ok(Preview::empty("HR_Employees"))));
//! assert_eq!(page.detail().detail().unwrap().source_key, "RightFax_Users");
//! ```

use tracing::debug;

use crate::filters::{Labeled, filter_items};

/// Which view a page shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
    /// The catalog list
    #[default]
    Listing,
    /// The detail view of one item
    Detail(T),
}

impl<T> Selection<T> {
    pub fn item(&self) -> Option<&T> {
        match self {
            Selection::Listing => None,
            Selection::Detail(item) => Some(item),
        }
    }

    pub fn is_listing(&self) -> bool {
        matches!(self, Selection::Listing)
    }
}

/// Monotonic counter identifying one selection epoch of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Handle for one detail fetch. Returned by [`PageState::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket<T> {
    generation: Generation,
    item: T,
}

impl<T> LoadTicket<T> {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The item whose detail should be fetched
    pub fn item(&self) -> &T {
        &self.item
    }
}

/// Handle for one catalog fetch. Returned by [`PageState::begin_catalog_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogTicket {
    generation: Generation,
}

impl CatalogTicket {
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// Load state of the selected item's detail.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState<D> {
    /// Nothing selected
    #[default]
    Idle,
    Loading,
    Ready(D),
    /// Fetch failed; the message is shown in place of the detail
    Failed(String),
}

impl<D> DetailState<D> {
    pub fn is_loading(&self) -> bool {
        matches!(self, DetailState::Loading)
    }

    pub fn detail(&self) -> Option<&D> {
        match self {
            DetailState::Ready(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DetailState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// State of one master-detail page.
///
/// `T` is the catalog item type, `D` the detail loaded for a selected item.
#[derive(Debug, Clone)]
pub struct PageState<T, D> {
    catalog: Vec<T>,
    catalog_loading: bool,
    catalog_generation: Generation,
    selection: Selection<T>,
    query: String,
    detail: DetailState<D>,
    generation: Generation,
}

impl<T, D> Default for PageState<T, D> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T, D> PageState<T, D> {
    /// A page in the listing state showing `catalog`
    pub fn new(catalog: Vec<T>) -> Self {
        Self {
            catalog,
            catalog_loading: false,
            catalog_generation: Generation::default(),
            selection: Selection::Listing,
            query: String::new(),
            detail: DetailState::Idle,
            generation: Generation::default(),
        }
    }

    pub fn catalog(&self) -> &[T] {
        &self.catalog
    }

    /// True between [`begin_catalog_load`](Self::begin_catalog_load) and the
    /// matching [`finish_catalog_load`](Self::finish_catalog_load)
    pub fn is_catalog_loading(&self) -> bool {
        self.catalog_loading
    }

    pub fn selection(&self) -> &Selection<T> {
        &self.selection
    }

    pub fn selected(&self) -> Option<&T> {
        self.selection.item()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    pub fn detail(&self) -> &DetailState<D> {
        &self.detail
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Starts a catalog fetch. Any catalog fetch started earlier becomes stale.
    pub fn begin_catalog_load(&mut self) -> CatalogTicket {
        self.catalog_generation = self.catalog_generation.next();
        self.catalog_loading = true;
        CatalogTicket {
            generation: self.catalog_generation,
        }
    }

    /// Applies a catalog fetch result if `ticket` is the latest catalog fetch.
    /// Returns false if the result was discarded.
    pub fn finish_catalog_load(&mut self, ticket: CatalogTicket, catalog: Vec<T>) -> bool {
        if ticket.generation != self.catalog_generation {
            debug!(
                ticket = ticket.generation.value(),
                current = self.catalog_generation.value(),
                "discarding stale catalog"
            );
            return false;
        }
        self.replace_catalog(catalog);
        true
    }

    /// Replaces the catalog and returns to the listing. Selection, query and
    /// detail are reset and in-flight detail fetches become stale.
    pub fn replace_catalog(&mut self, catalog: Vec<T>) {
        self.catalog = catalog;
        self.catalog_loading = false;
        self.reset_to_listing();
    }

    /// Selects `item` from any state. Clears the query, marks the detail as
    /// loading and returns the ticket for the fetch.
    pub fn select(&mut self, item: T) -> LoadTicket<T>
    where
        T: Clone,
    {
        self.generation = self.generation.next();
        self.selection = Selection::Detail(item.clone());
        self.query.clear();
        self.detail = DetailState::Loading;
        LoadTicket {
            generation: self.generation,
            item,
        }
    }

    /// Returns to the listing. Returns false, changing nothing, if already there.
    pub fn back(&mut self) -> bool {
        if self.selection.is_listing() {
            return false;
        }
        self.reset_to_listing();
        true
    }

    /// Applies a detail fetch result if `ticket` belongs to the current
    /// selection. Returns false if the result was discarded.
    pub fn complete(&mut self, ticket: &LoadTicket<T>, result: Result<D, String>) -> bool {
        if ticket.generation != self.generation || self.selection.is_listing() {
            debug!(
                ticket = ticket.generation.value(),
                current = self.generation.value(),
                "discarding stale detail"
            );
            return false;
        }
        self.detail = match result {
            Ok(detail) => DetailState::Ready(detail),
            Err(message) => DetailState::Failed(message),
        };
        true
    }

    fn reset_to_listing(&mut self) {
        self.generation = self.generation.next();
        self.selection = Selection::Listing;
        self.query.clear();
        self.detail = DetailState::Idle;
    }
}

impl<T: Labeled + Clone, D> PageState<T, D> {
    /// Selects the catalog item with `key`. None if the catalog has no such item.
    pub fn select_key(&mut self, key: &str) -> Option<LoadTicket<T>> {
        let item = self.catalog.iter().find(|item| item.key() == key)?.clone();
        Some(self.select(item))
    }

    /// Catalog items whose label matches the current query
    pub fn filtered_catalog(&self) -> Vec<&T> {
        filter_items(&self.catalog, &self.query)
    }
}
