//! Battle-scoped listeners that are torn down together.
use std::future::Future;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::warn;

use super::bus::{Event, EventBus, Topic};

/// Owns listener tasks for one battle.
///
/// Each listener runs on its own task and sees every event of its topic in
/// publish order. [`SubscriptionScope::dispose`] aborts all of them at once;
/// dropping the scope does the same.
#[derive(Default)]
pub struct SubscriptionScope {
    tasks: Vec<JoinHandle<()>>,
}

impl SubscriptionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a task feeding every event of `topic` to `handler`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen<F, Fut>(&mut self, bus: &EventBus, topic: Topic, mut handler: F)
    where
        F: FnMut(Event) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut rx = bus.subscribe(topic);
        self.tasks.push(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => handler(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            target: "battle::events",
                            ?topic,
                            skipped,
                            "Listener lagged behind the event bus"
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn dispose(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for SubscriptionScope {
    fn drop(&mut self) {
        self.dispose();
    }
}
