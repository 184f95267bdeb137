// Debounced suggestion requests with a loading indicator
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api_client::WordApi;
use crate::suggest::Typed;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Nothing is being typed; the chips should be emptied.
    Cleared,
    Suggestions { typed: Typed, words: Vec<String> },
    Offline,
}

#[derive(Clone, Default)]
pub struct LoadingIndicator {
    visible: Arc<AtomicBool>,
}

/// Hides the indicator when dropped, however the request ended.
pub struct LoadingGuard {
    visible: Arc<AtomicBool>,
}

impl LoadingIndicator {
    pub fn show(&self) -> LoadingGuard {
        self.visible.store(true, Ordering::SeqCst);
        LoadingGuard { visible: self.visible.clone() }
    }

    pub fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.visible.store(false, Ordering::SeqCst);
    }
}

/// Runs at most one scheduled task; scheduling again before the delay
/// elapses replaces the pending one. Once fired, the work is detached.
pub struct Debouncer {
    delay: Duration,
    rt: Handle,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration, rt: Handle) -> Self {
        Self { delay, rt, pending: None }
    }

    pub fn schedule<F>(&mut self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(prev) = self.pending.take() {
            prev.abort();
        }
        let delay = self.delay;
        self.pending = Some(self.rt.spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(work);
        }));
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(prev) = self.pending.take() {
            prev.abort();
        }
    }
}

/// Monotonic request numbering; responses at or below the last applied
/// number are stale.
#[derive(Clone, Default)]
pub struct RequestSeq {
    next: Arc<AtomicU64>,
}

impl RequestSeq {
    pub fn issue(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub async fn fetch_suggestions(
    api: &dyn WordApi,
    text: &str,
    indicator: &LoadingIndicator,
    limit: usize,
) -> FetchOutcome {
    let typed = Typed::parse(text);
    if typed.prefix.is_empty() {
        indicator.hide();
        return FetchOutcome::Cleared;
    }

    let _loading = indicator.show();
    match api.suggest(&typed.prefix).await {
        Ok(items) => {
            debug!(prefix = %typed.prefix, count = items.len(), "suggestions received");
            let words = items.into_iter().take(limit).map(|i| i.word).collect();
            FetchOutcome::Suggestions { typed, words }
        }
        Err(e) => {
            warn!(prefix = %typed.prefix, error = %e, "suggestion request failed");
            FetchOutcome::Offline
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api_client::{ApiError, StatItem, SuggestionItem};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Canned backend. `None` suggestions simulate an unreachable server.
    #[derive(Default)]
    pub struct FakeApi {
        pub suggestions: Option<Vec<&'static str>>,
        pub stats: Option<Vec<StatItem>>,
        pub selected: Mutex<Vec<String>>,
        pub seen_loading: Option<LoadingIndicator>,
        pub loading_during_call: AtomicBool,
        /// Never answer `suggest`, like a backend that stopped responding.
        pub hang: bool,
    }

    fn offline() -> ApiError {
        ApiError::Decode(serde_json::from_str::<()>("<html>").unwrap_err())
    }

    #[async_trait]
    impl WordApi for FakeApi {
        async fn suggest(&self, _prefix: &str) -> Result<Vec<SuggestionItem>, ApiError> {
            if let Some(ind) = &self.seen_loading {
                self.loading_during_call.store(ind.is_visible(), Ordering::SeqCst);
            }
            if self.hang {
                std::future::pending::<()>().await;
            }
            let words = self.suggestions.clone().ok_or_else(offline)?;
            Ok(words
                .into_iter()
                .map(|w| SuggestionItem { word: w.to_string(), rank: None })
                .collect())
        }

        async fn select(&self, word: &str) -> Result<(), ApiError> {
            self.selected.lock().unwrap().push(word.to_string());
            Ok(())
        }

        async fn stats(&self) -> Result<Vec<StatItem>, ApiError> {
            self.stats.clone().ok_or_else(offline)
        }
    }

    #[tokio::test]
    async fn empty_prefix_makes_no_request() {
        let api = FakeApi::default();
        let ind = LoadingIndicator::default();
        assert_eq!(fetch_suggestions(&api, "  ", &ind, 5).await, FetchOutcome::Cleared);
        assert!(!ind.is_visible());
    }

    #[tokio::test]
    async fn success_keeps_at_most_limit_items() {
        let ind = LoadingIndicator::default();
        let api = FakeApi {
            suggestions: Some(vec!["a1", "a2", "a3", "a4", "a5", "a6"]),
            seen_loading: Some(ind.clone()),
            ..Default::default()
        };
        let out = fetch_suggestions(&api, "hi a", &ind, 5).await;
        let FetchOutcome::Suggestions { typed, words } = out else { panic!("expected suggestions") };
        assert_eq!(typed.prefix, "a");
        assert_eq!(typed.head, vec!["hi"]);
        assert_eq!(words.len(), 5);
        assert!(api.loading_during_call.load(Ordering::SeqCst));
        assert!(!ind.is_visible());
    }

    #[tokio::test]
    async fn failure_becomes_offline_and_hides_indicator() {
        let ind = LoadingIndicator::default();
        let api = FakeApi { seen_loading: Some(ind.clone()), ..Default::default() };
        assert_eq!(fetch_suggestions(&api, "ap", &ind, 5).await, FetchOutcome::Offline);
        assert!(api.loading_during_call.load(Ordering::SeqCst));
        assert!(!ind.is_visible());
    }

    #[tokio::test]
    async fn clearing_text_hides_indicator_of_pending_request() {
        let api = FakeApi::default();
        let ind = LoadingIndicator::default();
        let _in_flight = ind.show();
        assert_eq!(fetch_suggestions(&api, "", &ind, 5).await, FetchOutcome::Cleared);
        assert!(!ind.is_visible());
    }

    #[test]
    fn guard_hides_on_drop() {
        let ind = LoadingIndicator::default();
        {
            let _g = ind.show();
            assert!(ind.is_visible());
        }
        assert!(!ind.is_visible());
    }

    #[test]
    fn sequence_numbers_increase() {
        let seq = RequestSeq::default();
        let a = seq.issue();
        let b = seq.clone().issue();
        assert!(b > a);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_keystrokes_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut deb = Debouncer::new(Duration::from_millis(120), Handle::current());
        for _ in 0..4 {
            let fired = fired.clone();
            deb.schedule(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_does_not_cancel_fired_work() {
        let done = Arc::new(AtomicUsize::new(0));
        let mut deb = Debouncer::new(Duration::from_millis(120), Handle::current());
        let d = done.clone();
        deb.schedule(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            d.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(150)).await;
        deb.schedule(async {});
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
