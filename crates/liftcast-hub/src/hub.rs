//! Change-detecting broadcast engine.
//!
//! Every mutation goes through [`Hub::apply`]: both projections are captured
//! before and after the mutation, and each one is pushed to its subscribers
//! only when it changed. The whole sequence runs under the platform's lock,
//! so events for one platform never interleave while different platforms
//! never contend.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;

use liftcast_core::{
    AthleteState, ClockState, CurrentAthlete, JuryTicket, Platform, PlatformState,
    JURY_DECISION_DURATION,
};

use crate::registry::{PlatformRegistry, PlatformSlot, Retention};
use crate::subscriptions::{admit, Channel, Frame, SubscriberId, Subscription, Subscriptions};

/// Which projections a mutation pushed to subscribers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Published {
    pub status: bool,
    pub lifting_order: bool,
}

impl Published {
    pub fn any(&self) -> bool {
        self.status || self.lifting_order
    }
}

/// Owned copies of both projections, compared by value.
struct Projections {
    status: PlatformState,
    lifting_order: Vec<AthleteState>,
}

impl Projections {
    fn capture(platform: &Platform) -> Self {
        Self {
            status: platform.state(),
            lifting_order: platform.lifting_order(),
        }
    }
}

fn frame<T: Serialize>(value: &T) -> Option<Frame> {
    match serde_json::to_string(value) {
        Ok(json) => Some(Frame::from(json)),
        Err(e) => {
            tracing::error!("Failed to serialize projection: {}", e);
            None
        }
    }
}

fn project(channel: Channel, platform: &Platform) -> Option<Frame> {
    match channel {
        Channel::Status => frame(&platform.state()),
        Channel::LiftingOrder => frame(&platform.lifting_order()),
    }
}

/// Registry, subscriptions and the broadcast engine tying them together.
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Hub {
    registry: Arc<PlatformRegistry>,
    subscriptions: Arc<Subscriptions>,
    jury_display: Duration,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(JURY_DECISION_DURATION)
    }
}

impl Hub {
    /// `jury_display` is how long a jury decision stays up before clearing.
    pub fn new(jury_display: Duration) -> Self {
        Self {
            registry: Arc::new(PlatformRegistry::new()),
            subscriptions: Arc::new(Subscriptions::new()),
            jury_display,
        }
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Names of platforms that have received at least one event.
    pub fn platforms(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Apply a mutation batch to the named platform, creating it if needed,
    /// and broadcast whichever projections changed.
    ///
    /// Must be called from within a tokio runtime: a jury decision spawns
    /// its expiry timer.
    pub fn apply<F>(&self, name: &str, mutate: F) -> Published
    where
        F: FnOnce(&mut Platform),
    {
        let slot = self.registry.resolve(name, Retention::Persist);
        self.apply_to(&slot, mutate)
    }

    fn apply_to<F>(&self, slot: &Arc<PlatformSlot>, mutate: F) -> Published
    where
        F: FnOnce(&mut Platform),
    {
        let mut platform = slot.lock();
        let before = Projections::capture(&platform);

        mutate(&mut *platform);
        if let Some(ticket) = platform.take_jury_expiry() {
            self.schedule_jury_expiry(slot, ticket);
        }

        let after = Projections::capture(&platform);
        let mut published = Published::default();
        if after.status != before.status {
            published.status = self.publish(Channel::Status, slot.name(), &after.status);
        }
        if after.lifting_order != before.lifting_order {
            published.lifting_order =
                self.publish(Channel::LiftingOrder, slot.name(), &after.lifting_order);
        }
        published
    }

    fn publish<T: Serialize>(&self, channel: Channel, name: &str, projection: &T) -> bool {
        let Some(frame) = frame(projection) else {
            return false;
        };
        let delivered = self.subscriptions.broadcast(channel, name, frame);
        tracing::debug!(platform = name, ?channel, delivered, "Projection changed");
        true
    }

    /// Clear the jury decision after the display delay, through the engine
    /// so displays see it disappear. Replaces any pending expiry.
    fn schedule_jury_expiry(&self, slot: &Arc<PlatformSlot>, ticket: JuryTicket) {
        let hub = self.clone();
        let target = Arc::clone(slot);
        let delay = self.jury_display;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let published = hub.apply_to(&target, |platform| {
                platform.expire_jury(ticket);
            });
            tracing::debug!(
                platform = target.name(),
                pushed = published.status,
                "Jury decision expired"
            );
        });
        slot.replace_jury_timer(task.abort_handle());
    }

    /// Run a read against the named platform. Unknown names read a fresh
    /// default platform that is not retained.
    pub fn read<R>(&self, name: &str, read: impl FnOnce(&Platform) -> R) -> R {
        let slot = self.registry.resolve(name, Retention::Ephemeral);
        let platform = slot.lock();
        read(&*platform)
    }

    pub fn status(&self, name: &str) -> PlatformState {
        self.read(name, Platform::state)
    }

    pub fn lifting_order(&self, name: &str) -> Vec<AthleteState> {
        self.read(name, Platform::lifting_order)
    }

    pub fn athlete_clock(&self, name: &str) -> ClockState {
        self.read(name, |platform| platform.athlete_clock().state())
    }

    pub fn break_clock(&self, name: &str) -> ClockState {
        self.read(name, |platform| platform.break_clock().state())
    }

    pub fn current_athlete(&self, name: &str) -> CurrentAthlete {
        self.read(name, Platform::current_athlete_with_clock)
    }

    pub fn leaders(&self, name: &str) -> Vec<AthleteState> {
        self.read(name, Platform::leaders)
    }

    /// Join a channel. The current projection is queued on the returned
    /// subscription before any later change can be.
    pub fn subscribe(&self, channel: Channel, name: &str) -> Subscription {
        let (outbox, frames) = mpsc::unbounded_channel();
        let id = SubscriberId::new();
        let subscription = Subscription {
            id,
            channel,
            platform: name.to_string(),
            frames,
        };

        if self.registry.get(name).is_none() {
            // Holding the member set blocks broadcasts for `name`, so the
            // platform cannot appear and publish between this check and the
            // default greeting.
            let mut members = self.subscriptions.members(channel, name);
            if self.registry.get(name).is_none() {
                let greeting = project(channel, &Platform::new(name));
                admit(&mut members, id, outbox, greeting);
                tracing::debug!(platform = name, ?channel, %id, "Subscribed to unknown platform");
                return subscription;
            }
        }

        // Lock order is platform, then member set, same as `apply_to`.
        let slot = self.registry.resolve(name, Retention::Ephemeral);
        let platform = slot.lock();
        let greeting = project(channel, &platform);
        admit(&mut self.subscriptions.members(channel, name), id, outbox, greeting);
        tracing::debug!(platform = name, ?channel, %id, "Subscribed");
        subscription
    }

    pub fn unsubscribe(&self, channel: Channel, name: &str, id: SubscriberId) {
        if self.subscriptions.unsubscribe(channel, name, id) {
            tracing::debug!(platform = name, ?channel, %id, "Unsubscribed");
        }
    }
}
