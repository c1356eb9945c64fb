//! Streaming ingestion sessions.
//!
//! A session owns one in-flight generation: it pulls chunks from an opaque
//! producer, accumulates them, and notifies the observer with the cumulative
//! text after every chunk. On natural termination it emits exactly one
//! terminal event (`Completed` or `Failed`). Cancellation is cooperative and
//! suppresses the terminal event, including when it races a natural
//! completion. At most one session is live per manager; starting a new one
//! first cancels the active one.
//!
//! Chunk boundaries are insignificant; only the cumulative text matters.
//! Records are merged once, at completion, never per progress tick, so
//! cancelling never retracts anything already merged.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::StreamResult;

/// Events observed during one streaming session.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A chunk arrived; carries the full cumulative text so far.
    Progress { text: String },
    /// The producer finished normally; carries the complete text.
    Completed { text: String },
    /// The producer or transport failed; surfaced exactly once. The caller
    /// may re-trigger generation; the core never retries.
    Failed { error: String },
}

/// An opaque producer of in-order UTF-8 text fragments.
///
/// `Ok(Some(chunk))` delivers the next fragment, `Ok(None)` signals natural
/// completion, `Err` signals a terminal transport failure.
#[async_trait]
pub trait ChunkProducer: Send {
    async fn next_chunk(&mut self) -> StreamResult<Option<String>>;
}

/// Handle to one in-flight session.
struct StreamSession {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns at most one live streaming session for its consumer.
#[derive(Default)]
pub struct SessionManager {
    active: Option<StreamSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Start a session over the given producer, cancelling any session that
    /// is still live. Returns the receiver for this session's events.
    pub fn start(
        &mut self,
        producer: impl ChunkProducer + 'static,
    ) -> mpsc::UnboundedReceiver<StreamEvent> {
        self.stop();

        let cancel = CancellationToken::new();
        let (events, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_session(producer, cancel.clone(), events));

        self.active = Some(StreamSession { cancel, task });
        receiver
    }

    /// Cancel the active session, if any. The cancelled session emits no
    /// terminal event.
    pub fn stop(&mut self) {
        if let Some(session) = self.active.take() {
            session.cancel.cancel();
        }
    }

    /// Whether a session is still running.
    pub fn is_streaming(&self) -> bool {
        self.active
            .as_ref()
            .map(|s| !s.task.is_finished())
            .unwrap_or(false)
    }
}

async fn run_session(
    mut producer: impl ChunkProducer,
    cancel: CancellationToken,
    events: mpsc::UnboundedSender<StreamEvent>,
) {
    let mut accumulated = String::new();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(chars = accumulated.len(), "Stream session cancelled");
                return;
            }

            chunk = producer.next_chunk() => match chunk {
                Ok(Some(chunk)) => {
                    accumulated.push_str(&chunk);
                    let _ = events.send(StreamEvent::Progress {
                        text: accumulated.clone(),
                    });
                }
                Ok(None) => {
                    // Cancellation that raced the final chunk still wins.
                    if cancel.is_cancelled() {
                        return;
                    }
                    debug!(chars = accumulated.len(), "Stream session completed");
                    let _ = events.send(StreamEvent::Completed { text: accumulated });
                    return;
                }
                Err(e) => {
                    if cancel.is_cancelled() {
                        return;
                    }
                    warn!(error = %e, "Stream session failed");
                    let _ = events.send(StreamEvent::Failed {
                        error: e.to_string(),
                    });
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Scripted producer replaying a fixed sequence of results.
    struct ScriptedProducer {
        steps: VecDeque<StreamResult<Option<String>>>,
        delay: Option<Duration>,
    }

    impl ScriptedProducer {
        fn chunks(chunks: &[&str]) -> Self {
            let mut steps: VecDeque<_> = chunks
                .iter()
                .map(|c| Ok(Some(c.to_string())))
                .collect();
            steps.push_back(Ok(None));
            Self { steps, delay: None }
        }

        fn failing(chunks: &[&str], error: &str) -> Self {
            let mut steps: VecDeque<_> = chunks
                .iter()
                .map(|c| Ok(Some(c.to_string())))
                .collect();
            steps.push_back(Err(StreamError::Producer {
                message: error.to_string(),
            }));
            Self { steps, delay: None }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl ChunkProducer for ScriptedProducer {
        async fn next_chunk(&mut self) -> StreamResult<Option<String>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.steps.pop_front().unwrap_or(Ok(None))
        }
    }

    async fn collect(mut rx: mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_progress_carries_cumulative_text() {
        let mut manager = SessionManager::new();
        let rx = manager.start(ScriptedProducer::chunks(&["hel", "lo ", "world"]));

        let events = collect(rx).await;
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            StreamEvent::Progress {
                text: "hel".to_string()
            }
        );
        assert_eq!(
            events[2],
            StreamEvent::Progress {
                text: "hello world".to_string()
            }
        );
        assert_eq!(
            events[3],
            StreamEvent::Completed {
                text: "hello world".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_stream_completes_with_empty_text() {
        let mut manager = SessionManager::new();
        let rx = manager.start(ScriptedProducer::chunks(&[]));

        let events = collect(rx).await;
        assert_eq!(
            events,
            vec![StreamEvent::Completed {
                text: String::new()
            }]
        );
    }

    #[tokio::test]
    async fn test_failure_is_terminal_and_single() {
        let mut manager = SessionManager::new();
        let rx = manager.start(ScriptedProducer::failing(&["partial"], "connection reset"));

        let events = collect(rx).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], StreamEvent::Progress { .. }));
        match &events[1] {
            StreamEvent::Failed { error } => assert!(error.contains("connection reset")),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_suppresses_terminal_event() {
        let mut manager = SessionManager::new();
        let rx = manager.start(
            ScriptedProducer::chunks(&["a", "b", "c"]).with_delay(Duration::from_millis(50)),
        );

        tokio::time::sleep(Duration::from_millis(75)).await;
        manager.stop();

        let events = collect(rx).await;
        assert!(!events.is_empty());
        assert!(events
            .iter()
            .all(|e| matches!(e, StreamEvent::Progress { .. })));
    }

    #[tokio::test]
    async fn test_starting_new_session_cancels_previous() {
        let mut manager = SessionManager::new();
        let first = manager.start(
            ScriptedProducer::chunks(&["slow", "stream"]).with_delay(Duration::from_millis(200)),
        );
        let second = manager.start(ScriptedProducer::chunks(&["fast"]));

        let second_events = collect(second).await;
        assert_eq!(
            second_events.last(),
            Some(&StreamEvent::Completed {
                text: "fast".to_string()
            })
        );

        // The first session was cancelled before any terminal event.
        let first_events = collect(first).await;
        assert!(first_events
            .iter()
            .all(|e| matches!(e, StreamEvent::Progress { .. })));
    }

    #[tokio::test]
    async fn test_is_streaming_reflects_session_state() {
        let mut manager = SessionManager::new();
        assert!(!manager.is_streaming());

        let rx = manager.start(
            ScriptedProducer::chunks(&["x"]).with_delay(Duration::from_millis(100)),
        );
        assert!(manager.is_streaming());

        let _ = collect(rx).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!manager.is_streaming());
    }
}
