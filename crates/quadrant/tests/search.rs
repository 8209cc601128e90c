//! Search over heterogeneous campus corpora.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;
use quadrant::capability::{Item, Locatable, SearchItem};
use quadrant::items::{DiningLocation, Library, MapMarker, MapMarkerType, Resource};
use quadrant::search::{SearchController, SearchState, search};
use quadrant_core::{MainContext, ThreadPool, ThreadPoolConfig};

fn corpus() -> Vec<Arc<dyn SearchItem>> {
    vec![
        Arc::new(Library::new("Library A").with_location(37.8, -122.2)),
        Arc::new(Library::new("Library B").with_location(0.0, 0.0)),
        Arc::new(Resource::new("Gym").with_location(37.9, -122.3)),
        Arc::new(DiningLocation::new("Crossroads").with_location(37.8665, -122.2560)),
        Arc::new(MapMarker::new("Library printer", MapMarkerType::Printer, 37.8726, -122.2607)),
        Arc::new(Resource::new("Library Annex")),
    ]
}

fn display_names(results: &[quadrant::Placemark]) -> Vec<&str> {
    results.iter().map(|p| p.display_name()).collect()
}

#[test]
fn keyword_requires_case_sensitive_match_and_location() {
    let corpus = corpus();
    assert_eq!(display_names(&search("Lib", &corpus)), ["Library A", "Library printer"]);
    assert!(search("lib", &corpus).is_empty());
}

#[test]
fn empty_keyword_returns_every_located_item_in_order() {
    let corpus = corpus();
    let expected: Vec<&str> = corpus
        .iter()
        .filter(|item| item.has_valid_location())
        .map(|item| item.display_name())
        .collect();

    assert_eq!(display_names(&search("", &corpus)), expected);
    assert_eq!(expected, ["Library A", "Gym", "Crossroads", "Library printer"]);
}

#[test]
fn placemarks_point_back_to_items() {
    let corpus = corpus();
    let results = search("Crossroads", &corpus);
    let item = results[0].item().unwrap();
    assert!(Arc::ptr_eq(&item, &corpus[3]));
    assert_eq!(results[0].location_description(), "Berkeley, CA");
}

#[test]
fn controller_delivers_latest_keyword() {
    let context = MainContext::new();
    let pool = Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(2)).unwrap());
    let controller = SearchController::with_stride(corpus(), pool, &context, 1);

    let (sender, receiver) = unbounded();
    controller.results_changed().connect(move |count| {
        let _ = sender.send(*count);
    });

    controller.search("Lib");
    controller.search("Gym");
    controller.search("Cross");
    assert!(context.process_until(Duration::from_secs(5), || controller.is_settled()));
    context.process_until(Duration::from_millis(100), || false);

    assert_eq!(display_names(&controller.results()), ["Crossroads"]);
    assert_eq!(receiver.try_iter().collect::<Vec<_>>(), [1]);
}

#[test]
fn clearing_input_shows_no_results() {
    let context = MainContext::new();
    let pool = Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap());
    let controller = SearchController::new(corpus(), pool, &context);

    controller.search("Library");
    assert!(controller.state().is_loading());
    controller.clear_input();
    context.process_until(Duration::from_millis(200), || false);

    match controller.state() {
        SearchState::Populated(results) => assert!(results.is_empty()),
        other => panic!("unexpected state {other:?}"),
    }
}

#[test]
fn replacing_corpus_affects_next_search() {
    let context = MainContext::new();
    let pool = Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(1)).unwrap());
    let controller = SearchController::new(corpus(), pool, &context);

    controller.set_corpus(vec![Arc::new(Library::new("Gym Library").with_location(37.87, -122.25))]);
    controller.search("Gym");
    assert!(context.process_until(Duration::from_secs(5), || controller.is_settled()));
    assert_eq!(display_names(&controller.results()), ["Gym Library"]);
}

#[test]
fn dropping_controller_with_search_in_flight_is_safe() {
    let items: Vec<Arc<dyn SearchItem>> = (0..20_000)
        .map(|i| -> Arc<dyn SearchItem> {
            Arc::new(Library::new(format!("Library {i:05}")).with_location(37.87, -122.26))
        })
        .collect();
    let workers = Arc::new(ThreadPool::new(ThreadPoolConfig::with_threads(2)).unwrap());

    let context = MainContext::new();
    let controller = SearchController::new(items.clone(), workers.clone(), &context);
    let emitted = Arc::new(AtomicUsize::new(0));
    let counter = emitted.clone();
    controller.results_changed().connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    controller.search("Library");
    drop(controller);

    let deadline = Instant::now() + Duration::from_secs(5);
    while workers.active_tasks() > 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    context.process_pending();

    assert_eq!(workers.active_tasks(), 0);
    assert_eq!(context.pending_count(), 0);
    assert_eq!(emitted.load(Ordering::SeqCst), 0);
    assert_eq!(Arc::strong_count(&items[0]), 1);
}
