//! Change feed: topic-keyed listeners with cancellable registrations.
//!
//! Every write is stamped with a version taken under the database lock.
//! Each topic has at most one delivering thread at a time; snapshots published
//! while a delivery is running are queued (newest wins) and delivered by that
//! thread. A listener never sees a snapshot older than one it already saw.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::debug;

use crate::models::{Measurement, Patient, SavedMealPlan};

/// What a listener is watching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// One patient record
    Patient(String),
    /// All patients, newest first
    PatientList,
    /// A patient's measurements, oldest first
    Measurements(String),
    /// A patient's saved meal plans, newest first
    MealPlans(String),
}

/// Current state of a topic, delivered to its listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Patient(Option<Patient>),
    Patients(Vec<Patient>),
    Measurements(Vec<Measurement>),
    MealPlans(Vec<SavedMealPlan>),
}

pub type SnapshotListener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

struct Registration {
    topic: Topic,
    listener: SnapshotListener,
    /// Oldest version this listener still accepts
    next_version: AtomicU64,
}

impl Registration {
    /// Call the listener unless it has already seen `version` or newer.
    /// Only the topic's delivering thread calls this.
    fn offer(&self, version: u64, snapshot: &Snapshot) {
        if self.next_version.load(Ordering::Acquire) > version {
            return;
        }
        self.next_version.store(version + 1, Ordering::Release);
        (self.listener)(snapshot);
    }
}

/// Snapshots waiting for a topic's delivering thread.
#[derive(Default)]
struct TopicQueue {
    /// Newest broadcast snapshot
    latest: Option<(u64, Snapshot)>,
    /// First snapshots for new registrations: (registration id, version, snapshot)
    initial: Vec<(u64, u64, Snapshot)>,
    delivering: bool,
}

#[derive(Default)]
struct FeedInner {
    next_id: AtomicU64,
    version: AtomicU64,
    registrations: Mutex<HashMap<u64, Arc<Registration>>>,
    queues: Mutex<HashMap<Topic, TopicQueue>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry of listeners keyed by topic.
///
/// Clones share the same registry.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    inner: Arc<FeedInner>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new write. Call while holding the lock that orders writes.
    pub fn next_version(&self) -> u64 {
        self.inner.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Version of the most recent write.
    pub fn current_version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    /// Register a listener that accepts snapshots from `version` on. The
    /// registration lives until the returned [`Subscription`] is cancelled or
    /// dropped.
    pub fn register(&self, topic: Topic, listener: SnapshotListener, version: u64) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, ?topic, version, "Registering listener");

        lock(&self.inner.registrations).insert(
            id,
            Arc::new(Registration {
                topic,
                listener,
                next_version: AtomicU64::new(version),
            }),
        );

        Subscription {
            id,
            feed: Arc::downgrade(&self.inner),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Whether anything is listening on `topic`.
    pub fn has_listeners(&self, topic: &Topic) -> bool {
        lock(&self.inner.registrations)
            .values()
            .any(|r| &r.topic == topic)
    }

    /// Number of live registrations.
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.registrations).len()
    }

    /// Deliver `snapshot` to every listener on `topic` that has not yet seen
    /// `version` or a newer one.
    ///
    /// If another thread is delivering on `topic`, the snapshot is queued for
    /// it and this call returns at once. Listeners run with no lock held, so
    /// a listener may write, subscribe or cancel from inside its callback.
    pub fn publish(&self, topic: &Topic, version: u64, snapshot: Snapshot) {
        self.enqueue(topic, |queue| {
            if queue.latest.as_ref().map_or(true, |(v, _)| *v < version) {
                queue.latest = Some((version, snapshot));
            }
        });
    }

    /// Deliver a new subscription's first snapshot to it alone.
    pub fn deliver_initial(&self, subscription: &Subscription, version: u64, snapshot: Snapshot) {
        let Some(topic) = self.registration(subscription.id).map(|r| r.topic.clone()) else {
            return;
        };
        let id = subscription.id;
        self.enqueue(&topic, |queue| queue.initial.push((id, version, snapshot)));
    }

    fn enqueue(&self, topic: &Topic, push: impl FnOnce(&mut TopicQueue)) {
        {
            let mut queues = lock(&self.inner.queues);
            let queue = queues.entry(topic.clone()).or_default();
            push(queue);
            if queue.delivering {
                debug!(?topic, "Delivery in progress, snapshot queued");
                return;
            }
            queue.delivering = true;
        }

        let _delivering = DeliveryGuard {
            inner: &self.inner,
            topic,
        };
        loop {
            let (initial, latest) = {
                let mut queues = lock(&self.inner.queues);
                let Some(queue) = queues.get_mut(topic) else {
                    break;
                };
                if queue.initial.is_empty() && queue.latest.is_none() {
                    queues.remove(topic);
                    break;
                }
                (std::mem::take(&mut queue.initial), queue.latest.take())
            };

            for (id, version, snapshot) in initial {
                if let Some(registration) = self.registration(id) {
                    registration.offer(version, &snapshot);
                }
            }
            if let Some((version, snapshot)) = latest {
                let listeners = self.registrations_for(topic);
                debug!(?topic, version, listeners = listeners.len(), "Publishing snapshot");
                for registration in listeners {
                    registration.offer(version, &snapshot);
                }
            }
        }
    }

    fn registration(&self, id: u64) -> Option<Arc<Registration>> {
        lock(&self.inner.registrations).get(&id).cloned()
    }

    /// Live registrations on `topic`, oldest first.
    fn registrations_for(&self, topic: &Topic) -> Vec<Arc<Registration>> {
        let regs = lock(&self.inner.registrations);
        let mut matching: Vec<(u64, Arc<Registration>)> = regs
            .iter()
            .filter(|(_, r)| &r.topic == topic)
            .map(|(id, r)| (*id, Arc::clone(r)))
            .collect();
        matching.sort_by_key(|(id, _)| *id);
        matching.into_iter().map(|(_, r)| r).collect()
    }
}

/// Frees a topic's queue if a listener panics mid-delivery.
struct DeliveryGuard<'a> {
    inner: &'a FeedInner,
    topic: &'a Topic,
}

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            lock(&self.inner.queues).remove(self.topic);
        }
    }
}

/// Handle to a listener registration.
///
/// `cancel` is idempotent and dropping the handle cancels it, so the
/// registration is released exactly once.
pub struct Subscription {
    id: u64,
    feed: Weak<FeedInner>,
    cancelled: AtomicBool,
}

impl Subscription {
    /// Stop receiving snapshots.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(inner) = self.feed.upgrade() else {
            return;
        };
        let removed = lock(&inner.registrations).remove(&self.id);
        debug!(id = self.id, removed = removed.is_some(), "Listener cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
