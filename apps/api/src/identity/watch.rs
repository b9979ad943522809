//! Observable "current identity" state.
//!
//! Sign-in publishes the identity, sign-out publishes `None`. Handlers
//! registered with [`IdentityWatch::subscribe`] run on every change until
//! their [`Subscription`] is unsubscribed or dropped.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::identity::Identity;

#[derive(Clone)]
pub struct IdentityWatch {
    tx: Arc<watch::Sender<Option<Identity>>>,
}

impl Default for IdentityWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityWatch {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, identity: Option<Identity>) {
        // send_replace succeeds even without subscribers
        self.tx.send_replace(identity);
    }

    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    /// Runs `handler` for each change published after this call.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Option<&Identity>) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let identity = rx.borrow_and_update().clone();
                handler(identity.as_ref());
            }
        });
        Subscription { task: Some(task) }
    }
}

/// Handle of a registered handler. Dropping it also unsubscribes.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}
