//! Controller teardown, clearing and click telemetry.

#[cfg(test)]
mod tests {
  use std::{sync::Arc, time::Duration};

  use crate::{
    controller::{
      SearchController, SearchOverrides, Settlement,
      __tests__::helpers::{ScriptedBackend, TestContext, test_config},
    },
    domain::query::{SortDirection, SortField, facet},
  };

  fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
  }

  #[tokio::test(start_paused = true)]
  async fn test_dispose_drops_in_flight_response() {
    let ctx = TestContext::new();
    ctx.backend.set_search_latency("lathe", ms(200));
    ctx.controller.set_query("lathe");

    let pending = tokio::spawn(ctx.controller.submit_search(SearchOverrides::default()));
    tokio::time::sleep(ms(50)).await;
    ctx.controller.dispose();

    assert_eq!(pending.await.unwrap(), Settlement::Disposed);
    // The remote call still completed; only its result was ignored.
    assert_eq!(ctx.backend.search_calls(), 1);
    let state = ctx.controller.state();
    assert!(state.outcome.is_none());
    assert!(state.searching);
  }

  #[tokio::test]
  async fn test_disposed_controller_ignores_everything() {
    let ctx = TestContext::new();
    ctx.controller.set_query("lathe");
    ctx.controller.dispose();
    assert!(ctx.controller.is_disposed());
    let frozen = ctx.controller.state();

    ctx.controller.set_query("mill");
    ctx.controller.set_page(4);
    ctx.controller.clear();
    ctx.controller.track_result_click("lathe-0", 0);
    assert_eq!(
      ctx.controller.submit_search(SearchOverrides::default()).await,
      Settlement::Disposed
    );
    assert!(ctx.controller.fetch_suggestions("mill").await.is_none());
    tokio::task::yield_now().await;

    assert_eq!(*ctx.controller.state(), *frozen);
    assert_eq!(ctx.backend.search_calls(), 0);
    assert_eq!(ctx.backend.suggest_calls(), 0);
    assert!(ctx.backend.clicks().is_empty());
  }

  #[tokio::test]
  async fn test_clear_keeps_filters_and_sort() {
    let ctx = TestContext::new();
    ctx.backend.set_suggestions("lathe", &["lathe safety"]);
    ctx.controller.set_query("lathe");
    ctx.controller.set_filters([facet("type", ["course"])].into());
    ctx.controller.set_sort(SortField::Popularity, SortDirection::Descending);
    ctx.controller.fetch_suggestions("lathe").await;
    ctx.controller.submit_search(SearchOverrides::default()).await;
    ctx.controller.set_page(2);

    ctx.controller.clear();
    let state = ctx.controller.state();
    assert_eq!(state.query.text, "");
    assert_eq!(state.query.page, 1);
    assert!(state.results().is_empty());
    assert!(state.facets().is_empty());
    assert!(state.suggestions.is_none());
    assert!(state.error.is_none());
    assert_eq!(state.query.filters.len(), 1);
    assert_eq!(state.query.sort_field, SortField::Popularity);
  }

  /// A search issued before a clear cannot repopulate the cleared state.
  #[tokio::test(start_paused = true)]
  async fn test_clear_supersedes_in_flight_search() {
    let ctx = TestContext::new();
    ctx.backend.set_search_latency("lathe", ms(100));
    ctx.controller.set_query("lathe");

    let pending = tokio::spawn(ctx.controller.submit_search(SearchOverrides::default()));
    ctx.controller.clear();
    assert!(!ctx.controller.state().searching);

    assert_eq!(pending.await.unwrap(), Settlement::Superseded);
    assert!(ctx.controller.state().outcome.is_none());
  }

  #[tokio::test]
  async fn test_reset_filters_keeps_text() {
    let ctx = TestContext::new();
    ctx.controller.set_query("mill");
    ctx.controller.set_filters([facet("type", ["reel"]), facet("author", ["jdoe"])].into());
    ctx.controller.set_page(5);

    ctx.controller.reset_filters();
    let state = ctx.controller.state();
    assert!(state.query.filters.is_empty());
    assert_eq!(state.query.page, 1);
    assert_eq!(state.query.text, "mill");
  }

  #[tokio::test(start_paused = true)]
  async fn test_click_is_tracked_with_live_query() {
    let ctx = TestContext::new();
    ctx.controller.set_query("lathe");
    ctx.controller.track_result_click("lathe-3", 3);
    tokio::time::sleep(ms(1)).await;

    let clicks = ctx.backend.clicks();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].result_id, "lathe-3");
    assert_eq!(clicks[0].position, 3);
    assert_eq!(clicks[0].query, "lathe");
  }

  #[tokio::test(start_paused = true)]
  async fn test_click_failure_is_swallowed() {
    let ctx = TestContext::new();
    ctx.backend.set_fail_clicks(true);
    ctx.controller.set_query("lathe");
    ctx.controller.track_result_click("lathe-0", 0);
    tokio::time::sleep(ms(1)).await;

    assert_eq!(ctx.backend.clicks().len(), 1);
    assert!(ctx.controller.state().error.is_none());
  }

  #[test]
  fn test_click_without_runtime_does_not_panic() {
    let ctx = TestContext::new();
    ctx.controller.track_result_click("lathe-0", 0);
    assert!(ctx.backend.clicks().is_empty());
  }

  #[tokio::test]
  async fn test_controllers_are_independent() {
    let backend = Arc::new(ScriptedBackend::new());
    let left = SearchController::new(backend.clone(), &test_config());
    let right = SearchController::new(backend.clone(), &test_config());

    left.set_query("lathe");
    left.submit_search(SearchOverrides::default()).await;
    right.set_query("mill");

    assert_eq!(left.state().query.text, "lathe");
    assert_eq!(right.state().query.text, "mill");
    assert!(right.state().outcome.is_none());
    assert_eq!(right.latest_sequence(), 0);

    left.dispose();
    right.set_page(2);
    assert_eq!(right.state().query.page, 2);
  }
}
