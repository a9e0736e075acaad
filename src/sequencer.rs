use crate::{
    config::{SequencerConfig, StallPolicy},
    dispatch::{Dispatcher, SlotActionKind, SlotClick},
    event::{ClickAction, InteractionEvent},
    waiter::{GuiConfirmWaiter, Waiter},
    TriggerType,
};
use std::{num::NonZeroU32, time::Instant};
use tokio::sync::mpsc;
use tracing::{debug, instrument, trace, warn};

/// Dispatches interactions one at a time, each one waiting for its confirmation before the next
/// one is sent.
///
/// The sequencer is driven by a single owner, typically the client's update loop, which feeds it
/// triggers with [`notify`](Self::notify). Other threads append interactions through a
/// [`Producer`].
///
/// There is one sequencer per client session. It must be [cleared](Self::clear) whenever the
/// context that confirmations come from disappears, such as on disconnection or when the
/// container screen is closed, otherwise the queue stays stalled forever.
pub struct Sequencer<D: Dispatcher> {
    dispatcher: D,
    config: SequencerConfig,
    producer: Producer<D>,
    queue: mpsc::UnboundedReceiver<InteractionEvent<D>>,
    current: Option<Pending>,
    dispatched: u64,
}

impl<D: Dispatcher> Sequencer<D> {
    pub fn new(dispatcher: D) -> Self {
        Self::with_config(dispatcher, SequencerConfig::default())
    }

    pub fn with_config(dispatcher: D, config: SequencerConfig) -> Self {
        let (sender, queue) = mpsc::unbounded_channel();
        let producer = Producer {
            sender,
            click_confirmations: config.click_confirmations,
        };
        Self {
            dispatcher,
            config,
            producer,
            queue,
            current: None,
            dispatched: 0,
        }
    }

    /// A handle to append interactions from other threads.
    pub fn producer(&self) -> Producer<D> {
        self.producer.clone()
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    /// Whether no confirmation is being waited for.
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// The number of queued interactions not dispatched yet.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The number of interactions dispatched since the sequencer was created.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Appends an interaction to the queue, and dispatches it right away if the sequencer is
    /// idle.
    pub fn enqueue<E>(&mut self, event: E)
    where
        E: Into<InteractionEvent<D>>,
    {
        self.producer.enqueue(event);
        if self.is_idle() {
            self.drain();
        }
    }

    /// Enqueues a slot click awaiting the configured number of GUI confirmations.
    pub fn enqueue_click(
        &mut self,
        sync_id: i32,
        slot_id: i32,
        button_id: i32,
        kind: SlotActionKind,
    ) {
        self.producer.enqueue_click(sync_id, slot_id, button_id, kind);
        if self.is_idle() {
            self.drain();
        }
    }

    /// Feeds a trigger to the current waiter. If the waiter is satisfied, or if there was none,
    /// queued interactions are dispatched until one of them must wait for a confirmation.
    pub fn notify(&mut self, trigger: TriggerType) {
        let proceed = match &mut self.current {
            None => true,
            Some(pending) => pending.waiter.accept(trigger),
        };
        if proceed {
            self.drain();
        } else {
            trace!(%trigger, "trigger did not satisfy the current waiter");
        }
    }

    /// Dispatches the interactions appended by producers while the sequencer was idle.
    pub fn pump(&mut self) {
        self.notify(TriggerType::Initial);
    }

    /// Replaces the current waiter. The sequencer stops being idle until it is satisfied.
    pub fn set_waiter(&mut self, waiter: Waiter) {
        trace!(?waiter, "current waiter replaced");
        self.current = Some(Pending::new(waiter));
    }

    /// Drops every queued interaction and forgets the current waiter.
    pub fn clear(&mut self) {
        let mut dropped = 0usize;
        while self.queue.try_recv().is_ok() {
            dropped += 1;
        }
        let was_waiting = self.current.take().is_some();
        if dropped > 0 || was_waiting {
            debug!(dropped, was_waiting, "interaction queue cleared");
        }
    }

    /// Handles the current waiter as stalled if it has been waiting for longer than the
    /// configured timeout at `now`, according to the configured [`StallPolicy`].
    ///
    /// Returns true if a stall was handled. Does nothing if no timeout is configured.
    pub fn expire_stalled(&mut self, now: Instant) -> bool {
        let (Some(timeout), Some(pending)) = (self.config.stall_timeout, &self.current) else {
            return false;
        };
        let waited = now.saturating_duration_since(pending.since);
        if waited < timeout {
            return false;
        }
        let policy = self.config.stall_policy;
        warn!(
            ?waited,
            ?policy,
            waiter = ?pending.waiter,
            pending = self.pending(),
            "interaction confirmation has stalled"
        );
        match policy {
            StallPolicy::Clear => self.clear(),
            StallPolicy::Advance => self.drain(),
        }
        true
    }

    #[instrument(level = "trace", skip_all)]
    fn drain(&mut self) {
        self.current = None;
        while let Ok(event) = self.queue.try_recv() {
            let mut waiter = event.dispatch(&mut self.dispatcher);
            self.dispatched += 1;
            trace!(dispatched = self.dispatched, ?waiter, "interaction dispatched");
            if !waiter.accept(TriggerType::Initial) {
                debug!(?waiter, pending = self.pending(), "waiting for confirmation");
                self.current = Some(Pending::new(waiter));
                return;
            }
        }
        trace!("interaction queue is drained");
    }
}

impl<D: Dispatcher> std::fmt::Debug for Sequencer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("config", &self.config)
            .field("current", &self.current)
            .field("pending", &self.pending())
            .field("dispatched", &self.dispatched)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Pending {
    waiter: Waiter,
    since: Instant,
}

impl Pending {
    fn new(waiter: Waiter) -> Self {
        Self {
            waiter,
            since: Instant::now(),
        }
    }
}

/// Appends interactions to the queue of a [`Sequencer`].
///
/// Producers may be used from any thread. They never dispatch: interactions appended while the
/// sequencer is idle are dispatched on its owner's next call to [`Sequencer::enqueue`],
/// [`Sequencer::notify`] or [`Sequencer::pump`].
pub struct Producer<D: Dispatcher> {
    sender: mpsc::UnboundedSender<InteractionEvent<D>>,
    click_confirmations: NonZeroU32,
}

impl<D: Dispatcher> Producer<D> {
    pub fn enqueue<E>(&self, event: E)
    where
        E: Into<InteractionEvent<D>>,
    {
        if self.sender.send(event.into()).is_err() {
            trace!("the sequencer has been dropped, the interaction is discarded");
        }
    }

    /// Enqueues a slot click awaiting the number of GUI confirmations configured on the
    /// sequencer.
    pub fn enqueue_click(&self, sync_id: i32, slot_id: i32, button_id: i32, kind: SlotActionKind) {
        let waiter = GuiConfirmWaiter::from(self.click_confirmations);
        let click = SlotClick::new(sync_id, slot_id, button_id, kind);
        self.enqueue(ClickAction::with_waiter(click, waiter.into()));
    }

    /// Whether the sequencer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl<D: Dispatcher> Clone for Producer<D> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            click_confirmations: self.click_confirmations,
        }
    }
}

impl<D: Dispatcher> std::fmt::Debug for Producer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::PacketAction, CallbackAction};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[derive(Default, Debug)]
    struct Recorder(Vec<String>);

    impl Dispatcher for Recorder {
        type Packet = &'static str;

        fn click_slot(&mut self, click: &SlotClick) {
            self.0.push(format!("click {}", click.slot_id));
        }

        fn send_packet(&mut self, packet: Self::Packet) {
            self.0.push(packet.to_owned());
        }
    }

    fn sequencer() -> Sequencer<Recorder> {
        Sequencer::new(Recorder::default())
    }

    #[test]
    fn enqueue_while_idle_dispatches_immediately() {
        let mut seq = sequencer();
        seq.enqueue(PacketAction::new("a"));
        assert_eq!(seq.dispatcher().0, ["a"]);
        assert!(seq.is_idle());
        assert_eq!(seq.dispatched(), 1);
    }

    #[test]
    fn enqueue_while_waiting_does_not_dispatch() {
        let mut seq = sequencer();
        seq.enqueue_click(1, 10, 0, SlotActionKind::Pickup);
        seq.enqueue_click(1, 11, 0, SlotActionKind::Pickup);
        assert_eq!(seq.dispatcher().0, ["click 10"]);
        assert!(!seq.is_idle());
        assert_eq!(seq.pending(), 1);
        seq.notify(TriggerType::GuiConfirm);
        assert_eq!(seq.dispatcher().0, ["click 10", "click 11"]);
        assert!(!seq.is_idle());
        seq.notify(TriggerType::GuiConfirm);
        assert!(seq.is_idle());
    }

    #[test]
    fn notify_rejected_keeps_waiting() {
        let mut seq = sequencer();
        seq.enqueue_click(1, 10, 0, SlotActionKind::Pickup);
        seq.enqueue(PacketAction::new("after"));
        seq.notify(TriggerType::ContainerSlotUpdate);
        seq.notify(TriggerType::HeldItemChange);
        seq.notify(TriggerType::Initial);
        assert_eq!(seq.dispatcher().0, ["click 10"]);
        assert_eq!(seq.pending(), 1);
    }

    #[test]
    fn notify_while_idle_with_empty_queue_does_nothing() {
        let mut seq = sequencer();
        seq.notify(TriggerType::GuiConfirm);
        assert!(seq.is_idle());
        assert_eq!(seq.dispatched(), 0);
    }

    #[test]
    fn enqueue_click_uses_configured_confirmations() {
        let count = NonZeroU32::new(2).unwrap();
        let config = SequencerConfig::new().with_click_confirmations(count);
        let mut seq = Sequencer::with_config(Recorder::default(), config);
        seq.enqueue_click(1, 10, 0, SlotActionKind::QuickMove);
        seq.enqueue(PacketAction::new("next"));
        seq.notify(TriggerType::GuiConfirm);
        assert_eq!(seq.dispatcher().0, ["click 10"]);
        seq.notify(TriggerType::GuiConfirm);
        assert_eq!(seq.dispatcher().0, ["click 10", "next"]);
        assert!(seq.is_idle());
    }

    #[test]
    fn set_waiter_blocks_until_satisfied() {
        let mut seq = sequencer();
        seq.set_waiter(Waiter::until(TriggerType::HeldItemChange));
        seq.enqueue(PacketAction::new("a"));
        assert!(seq.dispatcher().0.is_empty());
        seq.notify(TriggerType::GuiConfirm);
        assert!(seq.dispatcher().0.is_empty());
        seq.notify(TriggerType::HeldItemChange);
        assert_eq!(seq.dispatcher().0, ["a"]);
        assert!(seq.is_idle());
    }

    #[test]
    fn callback_may_enqueue_through_a_producer() {
        let mut seq = sequencer();
        let producer = seq.producer();
        seq.enqueue(CallbackAction::new(move |recorder: &mut Recorder| {
            recorder.send_packet("callback");
            producer.enqueue(PacketAction::new("from callback"));
            Waiter::Dummy
        }));
        assert_eq!(seq.dispatcher().0, ["callback", "from callback"]);
        assert!(seq.is_idle());
    }

    #[test]
    fn producer_events_wait_for_pump() {
        let mut seq = sequencer();
        let producer = seq.producer();
        producer.enqueue(PacketAction::new("a"));
        producer.enqueue_click(1, 5, 1, SlotActionKind::Pickup);
        assert!(seq.dispatcher().0.is_empty());
        assert_eq!(seq.pending(), 2);
        seq.pump();
        assert_eq!(seq.dispatcher().0, ["a", "click 5"]);
        assert!(!seq.is_idle());
    }

    #[test]
    fn producer_clicks_use_configured_confirmations() {
        let count = NonZeroU32::new(2).unwrap();
        let config = SequencerConfig::new().with_click_confirmations(count);
        let mut seq = Sequencer::with_config(Recorder::default(), config);
        let producer = seq.producer();
        producer.enqueue_click(1, 10, 0, SlotActionKind::Pickup);
        producer.enqueue(PacketAction::new("next"));
        seq.pump();
        seq.notify(TriggerType::GuiConfirm);
        assert_eq!(seq.dispatcher().0, ["click 10"]);
        seq.notify(TriggerType::GuiConfirm);
        assert_eq!(seq.dispatcher().0, ["click 10", "next"]);
        assert!(seq.is_idle());
    }

    #[test]
    fn dispatcher_is_reachable_between_dispatches() {
        let mut seq = sequencer();
        seq.enqueue(PacketAction::new("a"));
        seq.dispatcher_mut().0.clear();
        seq.enqueue(PacketAction::new("b"));
        assert_eq!(seq.dispatcher().0, ["b"]);
    }

    #[test]
    fn producer_is_closed_once_sequencer_dropped() {
        let seq = sequencer();
        let producer = seq.producer();
        assert!(!producer.is_closed());
        drop(seq);
        assert!(producer.is_closed());
        producer.enqueue(PacketAction::new("lost"));
    }

    #[test]
    fn expire_stalled_without_timeout_does_nothing() {
        let mut seq = sequencer();
        seq.enqueue_click(1, 10, 0, SlotActionKind::Pickup);
        assert!(!seq.expire_stalled(Instant::now() + Duration::from_secs(3600)));
        assert!(!seq.is_idle());
    }

    #[test]
    fn expire_stalled_clears_by_default() {
        let timeout = Duration::from_millis(500);
        let config = SequencerConfig::new().with_stall_timeout(timeout);
        let mut seq = Sequencer::with_config(Recorder::default(), config);
        seq.enqueue_click(1, 10, 0, SlotActionKind::Pickup);
        seq.enqueue(PacketAction::new("dropped"));
        assert!(!seq.expire_stalled(Instant::now()));
        assert!(seq.expire_stalled(Instant::now() + timeout));
        assert!(seq.is_idle());
        assert_eq!(seq.pending(), 0);
        assert_eq!(seq.dispatcher().0, ["click 10"]);
    }

    #[test]
    fn expire_stalled_advances_when_configured() {
        let timeout = Duration::from_millis(500);
        let config = SequencerConfig::new()
            .with_stall_timeout(timeout)
            .with_stall_policy(StallPolicy::Advance);
        let mut seq = Sequencer::with_config(Recorder::default(), config);
        seq.enqueue_click(1, 10, 0, SlotActionKind::Pickup);
        seq.enqueue(PacketAction::new("next"));
        assert!(seq.expire_stalled(Instant::now() + timeout));
        assert_eq!(seq.dispatcher().0, ["click 10", "next"]);
        assert!(seq.is_idle());
        assert!(!seq.expire_stalled(Instant::now() + timeout));
    }

    #[test]
    fn debug_reports_state() {
        let mut seq = sequencer();
        seq.enqueue_click(1, 10, 0, SlotActionKind::Pickup);
        let repr = format!("{seq:?}");
        assert_matches!(repr.find("GuiConfirm"), Some(_));
    }
}
