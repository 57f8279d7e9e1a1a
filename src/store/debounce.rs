use async_std::channel::{self, Sender};
use async_std::future::timeout;
use async_std::task::{self, JoinHandle};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

enum Message<K, V> {
    Edit(K, V),
    /// Commit the pending edit for a key now; the sender is signalled once done
    CommitNow(K, Sender<()>),
}

/// Coalesces rapid edits per key and commits the latest value for a key once
/// that key has seen no edit for the quiescence window.
///
/// Dropping the debouncer still commits whatever is pending, but only
/// [`close`](Debouncer::close) waits for it.
pub struct Debouncer<K, V> {
    tx: Sender<Message<K, V>>,
    task: JoinHandle<()>,
}

/// Commits every pending edit whose deadline has passed
fn commit_due<K: Ord, V, F: Fn(K, V)>(pending: &mut BTreeMap<K, (V, Instant)>, commit: &F) {
    let now = Instant::now();
    let (due, waiting): (BTreeMap<K, (V, Instant)>, BTreeMap<K, (V, Instant)>) =
        std::mem::take(pending).into_iter().partition(|(_, (_, deadline))| *deadline <= now);
    *pending = waiting;

    if !due.is_empty() {
        debug!("Committing {} debounced edit(s)", due.len());
    }
    for (key, (value, _)) in due {
        commit(key, value);
    }
}

impl<K, V> Debouncer<K, V>
where
    K: Ord + Send + 'static,
    V: Send + 'static,
{
    /// Starts the commit task
    ///
    /// # Arguments
    /// * `window` - How long a key must stay untouched before its edit is committed
    /// * `commit` - Called with each key and its latest value
    ///
    /// # Returns
    /// * `Debouncer<K, V>` - Handle used to queue edits
    pub fn spawn<F>(window: Duration, commit: F) -> Self
    where
        F: Fn(K, V) + Send + 'static,
    {
        let (tx, rx) = channel::unbounded::<Message<K, V>>();

        let task = task::spawn(async move {
            let mut pending: BTreeMap<K, (V, Instant)> = BTreeMap::new();
            loop {
                let next_deadline = pending.values().map(|(_, deadline)| *deadline).min();
                let message = match next_deadline {
                    None => rx.recv().await.ok(),
                    Some(deadline) => {
                        let wait = deadline.saturating_duration_since(Instant::now());
                        match timeout(wait, rx.recv()).await {
                            Ok(received) => received.ok(),
                            Err(_) => {
                                commit_due(&mut pending, &commit);
                                continue;
                            }
                        }
                    }
                };

                match message {
                    Some(Message::Edit(key, value)) => {
                        trace!("Debouncing edit");
                        pending.insert(key, (value, Instant::now() + window));
                    }
                    Some(Message::CommitNow(key, done)) => {
                        if let Some((value, _)) = pending.remove(&key) {
                            commit(key, value);
                        }
                        let _ = done.try_send(());
                    }
                    None => break,
                }
                commit_due(&mut pending, &commit);
            }

            for (key, (value, _)) in pending {
                commit(key, value);
            }
        });

        Self { tx, task }
    }

    /// Queues `value` for `key`, replacing any edit still waiting for that key
    pub fn push(&self, key: K, value: V) {
        if self.tx.try_send(Message::Edit(key, value)).is_err() {
            debug!("Debouncer task has stopped, edit dropped");
        }
    }

    /// Commits the pending edit for `key`, if any, without waiting for the window.
    ///
    /// Returns once the commit has run, so a write made afterwards is never
    /// overtaken by it.
    pub async fn commit_now(&self, key: K) {
        let (done_tx, done_rx) = channel::bounded(1);
        if self.tx.send(Message::CommitNow(key, done_tx)).await.is_err() {
            return;
        }
        let _ = done_rx.recv().await;
    }

    /// Stops accepting edits, commits everything pending and waits for it
    pub async fn close(self) {
        self.tx.close();
        self.task.await;
    }
}
