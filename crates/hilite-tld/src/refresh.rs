//! Fetching a fresh TLD list and swapping it into the active pattern.

use std::sync::Arc;
use std::time::Duration;

use hilite_core::{CompositePattern, KeyValueStore, build_pattern, save_pattern};

use crate::cell::PatternCell;
use crate::config::HighlighterConfig;
use crate::error::TldError;
use crate::parse::parse_tld_list;
use crate::source::TldSource;

/// Timeout and retry settings for one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Limit for a single fetch attempt.
    pub timeout: Duration,
    /// Total attempts, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub backoff: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl From<&HighlighterConfig> for RefreshPolicy {
    fn from(config: &HighlighterConfig) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            attempts: config.fetch_retries,
            backoff: config.retry_backoff(),
        }
    }
}

/// Fetch, parse and compile a new pattern, then persist it and publish it.
///
/// On any failure the cell keeps its previous pattern and the error is
/// returned after being logged. A store write failure is logged but does not
/// prevent the swap.
pub async fn refresh_pattern<T, S>(
    source: &T,
    store: &mut S,
    cell: &PatternCell,
    policy: &RefreshPolicy,
    key: &str,
) -> Result<Arc<CompositePattern>, TldError>
where
    T: TldSource,
    S: KeyValueStore + ?Sized,
{
    let pattern = match fetch_pattern(source, policy).await {
        Ok(pattern) => pattern,
        Err(err) => {
            tracing::warn!(key, error = %err, "TLD refresh failed, keeping previous pattern");
            return Err(err);
        }
    };

    if let Err(err) = save_pattern(store, key, &pattern) {
        tracing::warn!(key, error = %err, "failed to persist refreshed pattern");
    }
    cell.replace(pattern);
    tracing::info!(key, "swapped in refreshed pattern");
    Ok(cell.snapshot())
}

async fn fetch_pattern<T: TldSource>(
    source: &T,
    policy: &RefreshPolicy,
) -> Result<CompositePattern, TldError> {
    let body = fetch_with_retry(source, policy).await?;
    let tlds = parse_tld_list(&body)?;
    Ok(build_pattern(&tlds)?)
}

async fn fetch_with_retry<T: TldSource>(
    source: &T,
    policy: &RefreshPolicy,
) -> Result<String, TldError> {
    let attempts = policy.attempts.max(1);
    let mut backoff = policy.backoff;
    let mut attempt = 1;
    loop {
        let result = match tokio::time::timeout(policy.timeout, source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(TldError::Timeout {
                secs: policy.timeout.as_secs(),
            }),
        };
        match result {
            Ok(body) => return Ok(body),
            Err(err) if err.is_transient() && attempt < attempts => {
                tracing::debug!(attempt, error = %err, ?backoff, "TLD fetch failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hilite_core::{MemoryStore, PATTERN_KEY, load_pattern};

    const BODY: &str = "# Version 1\nCOM\nZZ\n";

    enum Reply {
        Body(&'static str),
        Status(u16),
        Hang,
    }

    struct FakeSource {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TldSource for FakeSource {
        async fn fetch(&self) -> Result<String, TldError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Body(body)) => Ok(body.to_owned()),
                Some(Reply::Status(code)) => Err(TldError::Status(code)),
                Some(Reply::Hang) | None => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(TldError::Empty)
                }
            }
        }
    }

    fn zz_pattern() -> CompositePattern {
        build_pattern(&parse_tld_list(BODY).unwrap()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_persists_and_swaps() {
        let source = FakeSource::new([Reply::Body(BODY)]);
        let mut store = MemoryStore::new();
        let cell = PatternCell::default();

        let pattern = refresh_pattern(
            &source,
            &mut store,
            &cell,
            &RefreshPolicy::default(),
            PATTERN_KEY,
        )
        .await
        .unwrap();

        assert_eq!(*pattern, zz_pattern());
        assert_eq!(*cell.snapshot(), zz_pattern());
        assert_eq!(load_pattern(&store, PATTERN_KEY), zz_pattern());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let source = FakeSource::new([Reply::Status(503), Reply::Hang, Reply::Body(BODY)]);
        let mut store = MemoryStore::new();
        let cell = PatternCell::default();

        let started = tokio::time::Instant::now();
        refresh_pattern(
            &source,
            &mut store,
            &cell,
            &RefreshPolicy::default(),
            PATTERN_KEY,
        )
        .await
        .unwrap();

        assert_eq!(source.calls(), 3);
        assert_eq!(*cell.snapshot(), zz_pattern());
        // 500ms backoff, a 10s timeout, then 1s backoff.
        assert!(started.elapsed() >= Duration::from_millis(11_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_keep_previous_pattern() {
        let source = FakeSource::new([Reply::Status(500), Reply::Status(500), Reply::Status(500)]);
        let mut store = MemoryStore::new();
        let cell = PatternCell::default();

        let err = refresh_pattern(
            &source,
            &mut store,
            &cell,
            &RefreshPolicy::default(),
            PATTERN_KEY,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TldError::Status(500)));
        assert_eq!(source.calls(), 3);
        assert_eq!(*cell.snapshot(), CompositePattern::builtin());
        assert_eq!(store.get(PATTERN_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reported() {
        let source = FakeSource::new([Reply::Hang]);
        let mut store = MemoryStore::new();
        let cell = PatternCell::default();
        let policy = RefreshPolicy {
            attempts: 1,
            ..Default::default()
        };

        let err = refresh_pattern(&source, &mut store, &cell, &policy, PATTERN_KEY)
            .await
            .unwrap_err();
        assert!(matches!(err, TldError::Timeout { secs: 10 }));
        assert_eq!(*cell.snapshot(), CompositePattern::builtin());
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_list_not_retried() {
        let source = FakeSource::new([Reply::Body("header\nbad entry\n"), Reply::Body(BODY)]);
        let mut store = MemoryStore::new();
        let cell = PatternCell::default();

        let err = refresh_pattern(
            &source,
            &mut store,
            &cell,
            &RefreshPolicy::default(),
            PATTERN_KEY,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TldError::Malformed { line: 2, .. }));
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_policy_from_config() {
        let config = HighlighterConfig {
            fetch_timeout_secs: 2,
            fetch_retries: 4,
            retry_backoff_ms: 100,
            ..Default::default()
        };
        assert_eq!(
            RefreshPolicy::from(&config),
            RefreshPolicy {
                timeout: Duration::from_secs(2),
                attempts: 4,
                backoff: Duration::from_millis(100),
            }
        );
    }
}
