//! Suggestion gating, debouncing and failure handling.

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::controller::__tests__::helpers::{TestContext, test_config};

  fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
  }

  #[tokio::test]
  async fn test_single_character_never_reaches_remote() {
    let ctx = TestContext::new();
    ctx.controller.set_query("d");

    let outcome = ctx.controller.fetch_suggestions("d").await.unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.query, "d");
    assert_eq!(ctx.backend.suggest_calls(), 0);

    let state = ctx.controller.state();
    assert_eq!(state.suggestions.as_ref(), Some(&outcome));
    assert!(!state.suggesting);
  }

  #[tokio::test]
  async fn test_matching_suggestions_are_installed() {
    let ctx = TestContext::new();
    ctx.backend.set_suggestions("drill", &["drill press", "drilling basics"]);
    ctx.controller.set_query("drill");

    let outcome = ctx.controller.fetch_suggestions("drill").await.unwrap();
    assert_eq!(outcome.suggestions.len(), 2);

    let state = ctx.controller.state();
    assert_eq!(state.suggestion_texts(), vec!["drill press", "drilling basics"]);
    assert!(!state.suggesting);
    assert!(state.error.is_none());
  }

  /// A short call for text that is no longer live installs nothing and
  /// leaves the pending fetch for the live text alone.
  #[tokio::test(start_paused = true)]
  async fn test_stale_short_text_does_not_cancel_live_fetch() {
    let mut config = test_config();
    config.suggest.debounce_ms = 100;
    let ctx = TestContext::with_config(config);
    ctx.backend.set_suggestions("dr", &["drill press"]);
    ctx.controller.set_query("dr");

    let (live, stale) = tokio::join!(ctx.controller.fetch_suggestions("dr"), async {
      tokio::time::sleep(ms(10)).await;
      ctx.controller.fetch_suggestions("d").await
    });

    assert!(stale.is_none());
    assert_eq!(live.map(|o| o.suggestions.len()), Some(1));
    assert_eq!(ctx.backend.suggest_calls(), 1);
    let state = ctx.controller.state();
    assert_eq!(state.query.text, "dr");
    assert_eq!(state.suggestion_texts(), vec!["drill press"]);
  }

  #[tokio::test]
  async fn test_short_text_not_live_is_not_installed() {
    let ctx = TestContext::new();
    ctx.controller.set_query("lathe");

    assert!(ctx.controller.fetch_suggestions("l").await.is_none());
    let state = ctx.controller.state();
    assert!(state.suggestions.is_none());
    assert_eq!(ctx.backend.suggest_calls(), 0);
  }

  /// A response tagged "drill" is dropped once the live text is "drilling".
  #[tokio::test(start_paused = true)]
  async fn test_stale_suggestions_are_discarded() {
    let ctx = TestContext::new();
    ctx.backend.set_suggestions("drill", &["drill press"]);
    ctx.backend.set_suggest_latency(ms(100));
    ctx.controller.set_query("drill");

    let (outcome, _) = tokio::join!(ctx.controller.fetch_suggestions("drill"), async {
      tokio::time::sleep(ms(30)).await;
      ctx.controller.set_query("drilling");
    });

    assert!(outcome.is_none());
    assert_eq!(ctx.backend.suggest_calls(), 1);
    let state = ctx.controller.state();
    assert_eq!(state.query.text, "drilling");
    assert!(state.suggestions.is_none());
  }

  /// Typing quickly only asks the service about the last text.
  #[tokio::test(start_paused = true)]
  async fn test_rapid_typing_is_debounced() {
    let mut config = test_config();
    config.suggest.debounce_ms = 150;
    let ctx = TestContext::with_config(config);
    ctx.backend.set_suggestions("dril", &["drill press"]);

    let type_and_fetch = |text: &'static str, delay: u64| {
      let controller = ctx.controller.clone();
      async move {
        tokio::time::sleep(ms(delay)).await;
        controller.set_query(text);
        controller.fetch_suggestions(text).await
      }
    };

    let (a, b, c) = tokio::join!(
      type_and_fetch("dr", 0),
      type_and_fetch("dri", 50),
      type_and_fetch("dril", 100)
    );

    assert!(a.is_none());
    assert!(b.is_none());
    assert_eq!(c.map(|o| o.suggestions.len()), Some(1));
    let sent = ctx.backend.suggest_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].query, "dril");
  }

  /// Failures are swallowed: no error, no stuck "suggesting" flag.
  #[tokio::test]
  async fn test_failures_never_reach_state() {
    let ctx = TestContext::new();
    ctx.backend.set_fail_suggest(true);
    ctx.controller.set_query("lathe");

    let outcome = ctx.controller.fetch_suggestions("lathe").await;
    assert!(outcome.is_none());
    assert_eq!(ctx.backend.suggest_calls(), 1);

    let state = ctx.controller.state();
    assert!(state.error.is_none());
    assert!(!state.suggesting);
    assert!(state.suggestions.is_none());
  }

  /// Suggestions and searches do not interfere with each other.
  #[tokio::test]
  async fn test_suggestions_do_not_touch_search_state() {
    let ctx = TestContext::new();
    ctx.backend.set_suggestions("lathe", &["lathe safety"]);
    ctx.controller.set_query("lathe");
    ctx.controller.submit_search(Default::default()).await;
    let before = ctx.controller.state();

    ctx.controller.fetch_suggestions("lathe").await;
    let after = ctx.controller.state();
    assert_eq!(after.outcome, before.outcome);
    assert_eq!(after.last_searched_at, before.last_searched_at);
    assert_eq!(ctx.controller.latest_sequence(), 1);
    assert_eq!(after.suggestion_texts(), vec!["lathe safety"]);
  }
}
