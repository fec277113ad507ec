use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// The two independently diffed projections a display can stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Status,
    LiftingOrder,
}

/// Unique identifier for a streaming subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A serialized JSON projection, shared by every recipient.
pub type Frame = Arc<str>;

/// Sending half of a subscriber's queue. Closed once the connection task
/// drops its receiver.
pub type Outbox = mpsc::UnboundedSender<Frame>;

pub(crate) type Members = HashMap<SubscriberId, Outbox>;

/// A live subscription handed to a connection task.
pub struct Subscription {
    pub id: SubscriberId,
    pub channel: Channel,
    pub platform: String,
    pub frames: mpsc::UnboundedReceiver<Frame>,
}

/// Per-channel, per-platform sets of streaming endpoints.
///
/// Sets are keyed by platform name, independent of the registry, so a
/// display can subscribe before its platform has received any event.
#[derive(Default)]
pub struct Subscriptions {
    status: DashMap<String, Members>,
    lifting_order: DashMap<String, Members>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, channel: Channel) -> &DashMap<String, Members> {
        match channel {
            Channel::Status => &self.status,
            Channel::LiftingOrder => &self.lifting_order,
        }
    }

    /// Exclusive access to the member set for `name`. Broadcasts to `name`
    /// on this channel wait while the guard is held.
    pub(crate) fn members(&self, channel: Channel, name: &str) -> RefMut<'_, String, Members> {
        self.map(channel).entry(name.to_string()).or_default()
    }

    /// Push `frame` to every open endpoint subscribed to `name`.
    /// Returns how many endpoints accepted it.
    pub fn broadcast(&self, channel: Channel, name: &str, frame: Frame) -> usize {
        let Some(members) = self.map(channel).get(name) else {
            return 0;
        };

        let mut delivered = 0;
        for outbox in members.values() {
            if outbox.is_closed() {
                continue;
            }
            if outbox.send(Arc::clone(&frame)).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Forget a subscriber. Returns whether it was present.
    pub fn unsubscribe(&self, channel: Channel, name: &str, id: SubscriberId) -> bool {
        let map = self.map(channel);
        let removed = map
            .get_mut(name)
            .is_some_and(|mut members| members.remove(&id).is_some());
        map.remove_if(name, |_, members| members.is_empty());
        removed
    }

    pub fn count(&self, channel: Channel, name: &str) -> usize {
        self.map(channel)
            .get(name)
            .map_or(0, |members| members.len())
    }
}

/// Greet a new subscriber with `greeting`, then add it to `members`.
pub(crate) fn admit(members: &mut Members, id: SubscriberId, outbox: Outbox, greeting: Option<Frame>) {
    if let Some(frame) = greeting {
        // The receiver is still held by the caller, so this cannot fail.
        let _ = outbox.send(frame);
    }
    members.insert(id, outbox);
}
