mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{product, FakeApi};
use storefront_client::{SearchPipeline, SearchResults, StorefrontApi};
use storefront_core::{LoadState, SortOption};

const DEBOUNCE: Duration = Duration::from_millis(300);

fn pipeline(api: &Arc<FakeApi>) -> SearchPipeline {
    let dyn_api: Arc<dyn StorefrontApi> = api.clone();
    SearchPipeline::start(dyn_api, DEBOUNCE)
}

fn catalog() -> Arc<FakeApi> {
    let mut cheap = product("s1", 40.0);
    cheap.name = "Canvas Shoes".into();
    let mut pricey = product("s2", 120.0);
    pricey.name = "Leather Shoes".into();
    let mut other = product("d1", 80.0);
    other.name = "Summer Dress".into();
    FakeApi::with_catalog(vec![cheap, pricey, other])
}

fn names(results: &SearchResults) -> Vec<String> {
    results
        .value()
        .map(|products| products.iter().map(|p| p.name.clone()).collect())
        .unwrap_or_default()
}

async fn settle() {
    tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
}

#[tokio::test(start_paused = true)]
async fn test_rapid_changes_issue_one_search_for_last_value() {
    let api = catalog();
    let search = pipeline(&api);

    search.set_query("s");
    tokio::time::sleep(Duration::from_millis(100)).await;
    search.set_query("sh");
    tokio::time::sleep(Duration::from_millis(100)).await;
    search.set_query("shoes");
    settle().await;

    assert_eq!(api.count("search"), 1);
    assert_eq!(
        api.searches.lock().unwrap()[0].q.as_deref(),
        Some("shoes")
    );
    assert_eq!(names(&search.results()), ["Canvas Shoes", "Leather Shoes"]);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_fires_before_the_window_elapses() {
    let api = catalog();
    let search = pipeline(&api);

    search.set_query("shoes");
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(api.count("search"), 0);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(api.count("search"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_blank_query_without_filters_skips_the_network() {
    let api = catalog();
    let search = pipeline(&api);

    search.set_query("   ");
    settle().await;

    assert_eq!(api.count("search"), 0);
    assert_eq!(search.results(), LoadState::Success(Vec::new()));
}

#[tokio::test(start_paused = true)]
async fn test_category_alone_is_enough_to_search() {
    let api = catalog();
    let search = pipeline(&api);

    search.select_category(Some("women".into()));
    settle().await;

    assert_eq!(api.count("search"), 1);
    let sent = api.searches.lock().unwrap()[0].clone();
    assert_eq!(sent.q, None);
    assert_eq!(sent.gender.as_deref(), Some("women"));
    // No query text, so nothing goes into history.
    assert!(search.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_history_dedups_case_insensitively() {
    let api = catalog();
    let search = pipeline(&api);

    search.set_query("shoes");
    settle().await;
    search.set_query("dress");
    settle().await;
    search.set_query("Shoes");
    settle().await;

    assert_eq!(search.history(), ["Shoes", "dress"]);

    search.clear_history();
    assert!(search.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sort_runs_without_waiting() {
    let api = catalog();
    let search = pipeline(&api);
    search.set_query("shoes");
    settle().await;
    assert_eq!(api.count("search"), 1);

    search.select_sort(SortOption::PriceHighToLow);
    // Well inside the debounce window.
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(api.count("search"), 2);
    assert_eq!(names(&search.results()), ["Leather Shoes", "Canvas Shoes"]);

    // Re-selecting the active option is a no-op.
    search.select_sort(SortOption::PriceHighToLow);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(api.count("search"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_price_range_is_applied_to_results() {
    let api = catalog();
    let search = pipeline(&api);

    search.set_query("shoes");
    search.update_price_range(Some(100.0), None);
    settle().await;

    assert_eq!(api.count("search"), 1);
    assert_eq!(names(&search.results()), ["Leather Shoes"]);
}

#[tokio::test(start_paused = true)]
async fn test_suggestion_searches_immediately() {
    let api = catalog();
    let search = pipeline(&api);

    search.apply_suggestion("dress");
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(api.count("search"), 1);
    assert_eq!(search.inputs().query, "dress");
    assert_eq!(names(&search.results()), ["Summer Dress"]);
}

#[tokio::test(start_paused = true)]
async fn test_failure_then_retry() {
    let api = catalog();
    let search = pipeline(&api);

    api.fail("search");
    search.set_query("shoes");
    settle().await;
    assert!(search.results().is_error());
    assert!(search.history().is_empty());

    api.recover("search");
    search.retry();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(names(&search.results()).len(), 2);
    assert_eq!(search.history(), ["shoes"]);
}

#[tokio::test(start_paused = true)]
async fn test_popular_queries_are_static() {
    let api = catalog();
    let search = pipeline(&api);
    assert_eq!(search.popular_queries().len(), 5);
    assert_eq!(api.calls.lock().unwrap().len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_newer_search_replaces_one_in_flight() {
    let api = catalog();
    api.delay_search("shoes", Duration::from_secs(2));
    let search = pipeline(&api);

    search.apply_suggestion("shoes");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(search.results().is_loading());

    search.apply_suggestion("dress");
    // Long enough for the slow response to have arrived.
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(api.count("search"), 2);
    assert_eq!(names(&search.results()), ["Summer Dress"]);
    assert_eq!(search.history(), ["dress"]);
}

#[tokio::test(start_paused = true)]
async fn test_clearing_the_query_discards_the_pending_response() {
    let api = catalog();
    api.delay_search("shoes", Duration::from_secs(2));
    let search = pipeline(&api);

    search.apply_suggestion("shoes");
    tokio::time::sleep(Duration::from_millis(10)).await;
    search.apply_suggestion("");
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(api.count("search"), 1);
    assert_eq!(search.results(), LoadState::Success(Vec::new()));
    assert!(search.history().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_last_trigger_wins_on_many_workers() {
    let api = catalog();
    let search = pipeline(&api);

    for round in 0..50 {
        let query = if round % 2 == 0 { "shoes" } else { "" };
        search.apply_suggestion(query);
    }
    search.apply_suggestion("");
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(search.results(), LoadState::Success(Vec::new()));
}
