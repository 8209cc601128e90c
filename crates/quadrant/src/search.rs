//! Keyword search over a searchable corpus.
//!
//! [`search`] keeps items whose search name contains the keyword
//! (case-sensitive) and whose location is valid, and produces one
//! [`Placemark`] per match in corpus order. An empty keyword matches every
//! item with a valid location.
//!
//! [`SearchController`] runs searches on the worker pool with "last keyword
//! wins" delivery and exposes the current [`SearchState`].

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use quadrant_core::logging::{PerfSpan, span_names, targets};
use quadrant_core::{CancellationToken, MainContext, Recomputer, Signal, ThreadAffinity, ThreadPool};

use crate::capability::{Coordinate, SearchItem, Searchable};
use crate::config::{DEFAULT_CHECKPOINT_STRIDE, QuadrantConfig};

/// One search result.
///
/// A placemark does not keep its item alive: once the data source drops the
/// item, [`Placemark::item`] returns `None`.
pub struct Placemark<T: ?Sized = dyn SearchItem> {
    coordinate: Coordinate,
    display_name: String,
    location_description: String,
    item: Weak<T>,
}

impl<T: ?Sized> Placemark<T> {
    /// The item's coordinate.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// The item's display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The item's location description.
    pub fn location_description(&self) -> &str {
        &self.location_description
    }

    /// The originating item, if it still exists.
    pub fn item(&self) -> Option<Arc<T>> {
        self.item.upgrade()
    }
}

impl<T: Searchable + ?Sized> Placemark<T> {
    /// Build a placemark for `item`.
    pub fn new(item: &Arc<T>) -> Self {
        Self {
            coordinate: item.coordinate(),
            display_name: item.display_name().to_owned(),
            location_description: item.location_description().to_owned(),
            item: Arc::downgrade(item),
        }
    }
}

impl<T: ?Sized> Clone for Placemark<T> {
    fn clone(&self) -> Self {
        Self {
            coordinate: self.coordinate,
            display_name: self.display_name.clone(),
            location_description: self.location_description.clone(),
            item: self.item.clone(),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Placemark<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Placemark")
            .field("display_name", &self.display_name)
            .field("location_description", &self.location_description)
            .field("coordinate", &self.coordinate)
            .finish()
    }
}

/// Whether `item` is a hit for `keyword`.
pub fn matches<T: Searchable + ?Sized>(keyword: &str, item: &T) -> bool {
    item.search_name().contains(keyword) && item.has_valid_location()
}

/// Search `corpus` for `keyword`.
///
/// ```
/// use quadrant::capability::SearchItem;
/// use quadrant::items::{Library, MapMarker, MapMarkerType};
/// use quadrant::search::search;
/// use std::sync::Arc;
///
/// let corpus: Vec<Arc<dyn SearchItem>> = vec![
///     Arc::new(Library::new("Doe Library").with_location(37.8722, -122.2594)),
///     Arc::new(Library::new("Lost Library")),
///     Arc::new(MapMarker::new("Doe printer", MapMarkerType::Printer, 37.8722, -122.2594)),
/// ];
///
/// let results = search("Doe", &corpus);
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[0].location_description(), "Berkeley, CA");
/// ```
pub fn search<T: Searchable + ?Sized>(keyword: &str, corpus: &[Arc<T>]) -> Vec<Placemark<T>> {
    let _span = PerfSpan::new(span_names::SEARCH);
    search_cancellable(keyword, corpus, &CancellationToken::never(), usize::MAX).unwrap_or_default()
}

/// Search with cooperative cancellation, checking `token` every `stride`
/// items.
pub fn search_cancellable<T: Searchable + ?Sized>(
    keyword: &str,
    corpus: &[Arc<T>],
    token: &CancellationToken,
    stride: usize,
) -> Option<Vec<Placemark<T>>> {
    let stride = stride.max(1);
    let mut results = Vec::new();

    for (index, item) in corpus.iter().enumerate() {
        if index % stride == 0 && token.is_cancelled() {
            return None;
        }
        if matches(keyword, &**item) {
            results.push(Placemark::new(item));
        }
    }
    Some(results)
}

/// What a search view is showing.
pub enum SearchState<T: ?Sized = dyn SearchItem> {
    /// No search has been issued.
    Idle,
    /// A search is in flight.
    Loading,
    /// Results of the latest search. Empty after the input was cleared.
    Populated(Arc<Vec<Placemark<T>>>),
}

impl<T: ?Sized> SearchState<T> {
    /// Whether a search is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The results, if populated.
    pub fn results(&self) -> Option<&[Placemark<T>]> {
        match self {
            Self::Populated(results) => Some(results),
            Self::Idle | Self::Loading => None,
        }
    }
}

impl<T: ?Sized> Clone for SearchState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading => Self::Loading,
            Self::Populated(results) => Self::Populated(results.clone()),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for SearchState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Loading => f.write_str("Loading"),
            Self::Populated(results) => f.debug_tuple("Populated").field(&results.len()).finish(),
        }
    }
}

struct SearchShared<T: ?Sized> {
    corpus: RwLock<Arc<Vec<Arc<T>>>>,
    state: RwLock<SearchState<T>>,
    keyword: RwLock<Option<String>>,
    recomputer: Recomputer,
    checkpoint_stride: usize,
    affinity: ThreadAffinity,
    results_changed: Signal<usize>,
}

/// Runs keyword searches off the main context.
///
/// ```
/// use quadrant::capability::SearchItem;
/// use quadrant::items::Library;
/// use quadrant::search::SearchController;
/// use quadrant_core::{MainContext, ThreadPool, ThreadPoolConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let context = MainContext::new();
/// let pool = Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap());
/// let corpus: Vec<Arc<dyn SearchItem>> =
///     vec![Arc::new(Library::new("Moffitt Library").with_location(37.8726, -122.2607))];
///
/// let controller = SearchController::new(corpus, pool, &context);
/// controller.search("Moffitt");
/// assert!(controller.state().is_loading());
///
/// context.process_until(Duration::from_secs(2), || controller.is_settled());
/// assert_eq!(controller.results().len(), 1);
/// ```
pub struct SearchController<T: Searchable + ?Sized + 'static = dyn SearchItem> {
    shared: Arc<SearchShared<T>>,
}

impl<T: Searchable + ?Sized + 'static> SearchController<T> {
    /// Create a controller over `corpus`, delivering to `context`.
    pub fn new(corpus: Vec<Arc<T>>, pool: Arc<ThreadPool>, context: &MainContext) -> Self {
        Self::with_stride(corpus, pool, context, DEFAULT_CHECKPOINT_STRIDE)
    }

    /// Create a controller that checks for cancellation every `stride` items.
    pub fn with_stride(
        corpus: Vec<Arc<T>>,
        pool: Arc<ThreadPool>,
        context: &MainContext,
        stride: usize,
    ) -> Self {
        Self {
            shared: Arc::new(SearchShared {
                corpus: RwLock::new(Arc::new(corpus)),
                state: RwLock::new(SearchState::Idle),
                keyword: RwLock::new(None),
                recomputer: Recomputer::new("search", pool, context.handle()),
                checkpoint_stride: stride.max(1),
                affinity: context.affinity(),
                results_changed: Signal::new(),
            }),
        }
    }

    /// Create a controller using the checkpoint stride from `config`.
    pub fn from_config(
        corpus: Vec<Arc<T>>,
        pool: Arc<ThreadPool>,
        context: &MainContext,
        config: &QuadrantConfig,
    ) -> Self {
        Self::with_stride(corpus, pool, context, config.checkpoint_stride)
    }

    /// Items searched between cancellation checks.
    pub fn checkpoint_stride(&self) -> usize {
        self.shared.checkpoint_stride
    }

    /// Replace the corpus. Does not re-run the current search.
    pub fn set_corpus(&self, corpus: Vec<Arc<T>>) {
        self.shared.affinity.debug_assert_same_thread();
        *self.shared.corpus.write() = Arc::new(corpus);
    }

    /// Search for `keyword`, superseding any search in flight.
    pub fn search(&self, keyword: &str) {
        let shared = &self.shared;
        shared.affinity.debug_assert_same_thread();

        let corpus = shared.corpus.read().clone();
        let stride = shared.checkpoint_stride;
        let owner: Weak<SearchShared<T>> = Arc::downgrade(&self.shared);
        let query = keyword.to_owned();

        *shared.keyword.write() = Some(query.clone());
        *shared.state.write() = SearchState::Loading;

        let token = shared.recomputer.submit(
            move |token| {
                let _span = PerfSpan::new(span_names::SEARCH);
                search_cancellable(&query, &corpus, token, stride)
            },
            move |results| match owner.upgrade() {
                Some(shared) => {
                    let count = results.len();
                    *shared.state.write() = SearchState::Populated(Arc::new(results));
                    tracing::debug!(target: targets::SEARCH, results = count, "search results delivered");
                    shared.results_changed.emit(count);
                }
                None => {
                    tracing::debug!(target: targets::SEARCH, "search view dropped before results arrived");
                }
            },
        );

        tracing::debug!(
            target: targets::SEARCH,
            generation = token.generation(),
            keyword,
            "search issued"
        );
    }

    /// Clear the search input: drop any search in flight and show no results.
    pub fn clear_input(&self) {
        self.shared.affinity.debug_assert_same_thread();
        self.shared.recomputer.cancel();
        *self.shared.keyword.write() = None;
        *self.shared.state.write() = SearchState::Populated(Arc::new(Vec::new()));
        self.shared.results_changed.emit(0);
    }

    /// The current state.
    pub fn state(&self) -> SearchState<T> {
        self.shared.state.read().clone()
    }

    /// The current results; empty unless populated.
    pub fn results(&self) -> Vec<Placemark<T>> {
        self.shared
            .state
            .read()
            .results()
            .map(<[Placemark<T>]>::to_vec)
            .unwrap_or_default()
    }

    /// The keyword of the latest search, if the input is not cleared.
    pub fn keyword(&self) -> Option<String> {
        self.shared.keyword.read().clone()
    }

    /// Whether the latest search has come back to the main context.
    pub fn is_settled(&self) -> bool {
        self.shared.recomputer.is_idle()
    }

    /// Emitted with the result count each time results are shown.
    pub fn results_changed(&self) -> &Signal<usize> {
        &self.shared.results_changed
    }
}

impl<T: Searchable + ?Sized + 'static> std::fmt::Debug for SearchController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("keyword", &self.keyword())
            .field("state", &*self.shared.state.read())
            .finish()
    }
}

static_assertions::assert_impl_all!(SearchController: Send, Sync);
