//! Keyed advisory sessions.
//!
//! An [`AdvisorySession`] runs at most one analysis per key (typically a patient id). Starting
//! an analysis spawns a task and marks the key `Pending`; the result lands as `Succeeded` or
//! `Failed`. A successful result is reused while the input is unchanged unless a refresh is
//! asked for. Cancelling aborts the task and forgets the key; dropping the session aborts
//! everything still in flight.

use crate::advisory::{Advisor, AdvisoryState};
use crate::prompt::AnalysisInput;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::AbortHandle;

struct Entry {
    input: AnalysisInput,
    generation: u64,
    state: watch::Sender<AdvisoryState>,
    task: Option<AbortHandle>,
}

type Entries = Arc<Mutex<HashMap<String, Entry>>>;

pub struct AdvisorySession {
    advisor: Advisor,
    entries: Entries,
    next_generation: Mutex<u64>,
}

impl AdvisorySession {
    pub fn new(advisor: Advisor) -> Self {
        Self {
            advisor,
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_generation: Mutex::new(0),
        }
    }

    /// Start (or reuse) the analysis for `key`, returning the state right after the call.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, key: &str, input: AnalysisInput, refresh: bool) -> AdvisoryState {
        let mut entries = lock(&self.entries);

        if let Some(entry) = entries.get(key) {
            let current = entry.state.borrow().clone();
            let reusable = matches!(
                current,
                AdvisoryState::Pending | AdvisoryState::Succeeded { .. }
            );
            if entry.input == input && reusable && !refresh {
                tracing::debug!(key, "reusing advisory");
                return current;
            }
        }

        if let Some(old) = entries.remove(key) {
            if let Some(task) = old.task {
                task.abort();
            }
        }

        let generation = {
            let mut next = self
                .next_generation
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *next += 1;
            *next
        };
        let (state, _) = watch::channel(AdvisoryState::Pending);

        let advisor = self.advisor.clone();
        let task_entries = Arc::clone(&self.entries);
        let task_key = key.to_string();
        let task_input = input.clone();
        let handle = tokio::spawn(async move {
            let result = advisor.analyze(&task_input).await;
            let mut entries = lock(&task_entries);
            if let Some(entry) = entries.get_mut(&task_key) {
                if entry.generation == generation {
                    entry.state.send_replace(AdvisoryState::from_result(result));
                    entry.task = None;
                }
            }
        });

        entries.insert(
            key.to_string(),
            Entry {
                input,
                generation,
                state,
                task: Some(handle.abort_handle()),
            },
        );
        tracing::info!(key, "advisory started");
        AdvisoryState::Pending
    }

    /// Current state for `key`; `Idle` if nothing was started or it was cancelled.
    pub fn state(&self, key: &str) -> AdvisoryState {
        lock(&self.entries)
            .get(key)
            .map(|entry| entry.state.borrow().clone())
            .unwrap_or(AdvisoryState::Idle)
    }

    /// Abort any in-flight analysis for `key` and forget it. Returns whether anything was
    /// pending.
    pub fn cancel(&self, key: &str) -> bool {
        let Some(entry) = lock(&self.entries).remove(key) else {
            return false;
        };
        let was_pending = entry.state.borrow().is_pending();
        if let Some(task) = entry.task {
            task.abort();
        }
        if was_pending {
            tracing::info!(key, "advisory cancelled");
        }
        was_pending
    }

    /// Wait until the analysis for `key` leaves `Pending`.
    ///
    /// Resolves to `Idle` if the key is unknown or is cancelled while waiting.
    pub async fn settled(&self, key: &str) -> AdvisoryState {
        let receiver = lock(&self.entries)
            .get(key)
            .map(|entry| entry.state.subscribe());
        let Some(mut receiver) = receiver else {
            return AdvisoryState::Idle;
        };
        let settled = match receiver.wait_for(|state| !state.is_pending()).await {
            Ok(state) => (*state).clone(),
            Err(_) => AdvisoryState::Idle,
        };
        settled
    }
}

impl Drop for AdvisorySession {
    fn drop(&mut self) {
        for entry in lock(&self.entries).values_mut() {
            if let Some(task) = entry.task.take() {
                task.abort();
            }
        }
    }
}

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<String, Entry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{CompletionClient, StaticCompletionClient};
    use crate::error::AdvisorResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    const REPLY: &str = r#"{"summary":"Lipoma.","urgencyRecommendation":"Routine","suggestedPathway":"Clinic","safetyAlerts":[]}"#;

    fn input(name: &str) -> AnalysisInput {
        AnalysisInput {
            name: name.into(),
            gp_note: "Large lipoma on shoulder.".into(),
            history: "None.".into(),
            comorbidities: Vec::new(),
        }
    }

    fn session(client: Arc<StaticCompletionClient>) -> AdvisorySession {
        AdvisorySession::new(Advisor::new(client))
    }

    #[tokio::test]
    async fn start_then_settle_succeeds() {
        let client = Arc::new(StaticCompletionClient::new(REPLY));
        let session = session(client.clone());

        assert_eq!(session.state("5"), AdvisoryState::Idle);
        assert_eq!(session.start("5", input("Patel, Amit"), false), AdvisoryState::Pending);
        match session.settled("5").await {
            AdvisoryState::Succeeded { advisory } => assert_eq!(advisory.suggested_pathway, "Clinic"),
            other => panic!("expected Succeeded, got {other:?}"),
        }
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn unchanged_input_is_served_from_cache() {
        let client = Arc::new(StaticCompletionClient::new(REPLY));
        let session = session(client.clone());

        session.start("5", input("Patel, Amit"), false);
        session.settled("5").await;
        let again = session.start("5", input("Patel, Amit"), false);
        assert!(matches!(again, AdvisoryState::Succeeded { .. }));
        assert_eq!(client.calls(), 1);

        assert_eq!(session.start("5", input("Patel, Amit"), true), AdvisoryState::Pending);
        session.settled("5").await;
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn changed_input_runs_again() {
        let client = Arc::new(StaticCompletionClient::new(REPLY));
        let session = session(client.clone());

        session.start("5", input("Patel, Amit"), false);
        session.settled("5").await;
        session.start("5", input("Patel, A."), false);
        session.settled("5").await;
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_analysis() {
        let client = Arc::new(
            StaticCompletionClient::new(REPLY).with_delay(Duration::from_secs(30)),
        );
        let session = session(client);

        session.start("1", input("Doe, John"), false);
        assert!(session.state("1").is_pending());
        assert!(session.cancel("1"));
        assert_eq!(session.state("1"), AdvisoryState::Idle);
        assert!(!session.cancel("1"));
    }

    #[tokio::test]
    async fn waiter_sees_idle_when_cancelled() {
        let client = Arc::new(
            StaticCompletionClient::new(REPLY).with_delay(Duration::from_secs(30)),
        );
        let session = Arc::new(session(client));
        session.start("1", input("Doe, John"), false);

        let waiter = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.settled("1").await })
        };
        tokio::task::yield_now().await;
        session.cancel("1");
        assert_eq!(waiter.await.expect("join"), AdvisoryState::Idle);
    }

    #[tokio::test]
    async fn failure_is_retryable() {
        let client = Arc::new(StaticCompletionClient::failing(503, "overloaded"));
        let session = session(client.clone());

        session.start("3", input("Bloggs, Joe"), false);
        assert!(matches!(
            session.settled("3").await,
            AdvisoryState::Failed { .. }
        ));
        assert_eq!(session.start("3", input("Bloggs, Joe"), false), AdvisoryState::Pending);
        session.settled("3").await;
        assert_eq!(client.calls(), 2);
    }

    /// Replies after a delay and records whether it got that far.
    struct SlowClient {
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl CompletionClient for SlowClient {
        async fn complete(&self, _system: &str, _user: &str) -> AdvisorResult<String> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(REPLY.to_string())
        }
    }

    #[tokio::test]
    async fn dropping_session_aborts_in_flight_analysis() {
        let finished = Arc::new(AtomicBool::new(false));
        let client = Arc::new(SlowClient {
            finished: Arc::clone(&finished),
        });
        let session = AdvisorySession::new(Advisor::new(client));

        assert!(session.start("2", input("Smith, Jane"), false).is_pending());
        drop(session);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
