use crate::{
    dispatch::{Dispatcher, SlotActionKind, SlotClick},
    error::Result,
    waiter::{GuiConfirmWaiter, Waiter},
};

/// One queued interaction.
///
/// Dispatching an event performs its side effect through the [`Dispatcher`] and yields the
/// [`Waiter`] that must be satisfied before the next event may be dispatched. Events are consumed
/// by their dispatch.
pub enum InteractionEvent<D: Dispatcher> {
    Click(ClickAction),
    Callback(CallbackAction<D>),
    Packet(PacketAction<D::Packet>),
}

impl<D: Dispatcher> InteractionEvent<D> {
    pub fn dispatch(self, dispatcher: &mut D) -> Waiter {
        match self {
            Self::Click(action) => action.dispatch(dispatcher),
            Self::Callback(action) => action.dispatch(dispatcher),
            Self::Packet(action) => action.dispatch(dispatcher),
        }
    }
}

impl<D: Dispatcher> From<ClickAction> for InteractionEvent<D> {
    fn from(action: ClickAction) -> Self {
        Self::Click(action)
    }
}

impl<D: Dispatcher> From<CallbackAction<D>> for InteractionEvent<D> {
    fn from(action: CallbackAction<D>) -> Self {
        Self::Callback(action)
    }
}

impl<D: Dispatcher> From<PacketAction<D::Packet>> for InteractionEvent<D> {
    fn from(action: PacketAction<D::Packet>) -> Self {
        Self::Packet(action)
    }
}

impl<D> std::fmt::Debug for InteractionEvent<D>
where
    D: Dispatcher,
    D::Packet: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Click(action) => f.debug_tuple("Click").field(action).finish(),
            Self::Callback(action) => f.debug_tuple("Callback").field(action).finish(),
            Self::Packet(action) => f.debug_tuple("Packet").field(action).finish(),
        }
    }
}

/// A click on a container slot.
#[derive(Debug)]
pub struct ClickAction {
    click: SlotClick,
    waiter: Waiter,
}

impl ClickAction {
    /// A click that expects exactly one GUI confirmation from the server, which is what the
    /// server sends back for a click that mutates the container.
    pub fn new(sync_id: i32, slot_id: i32, button_id: i32, kind: SlotActionKind) -> Self {
        Self::with_waiter(
            SlotClick::new(sync_id, slot_id, button_id, kind),
            Waiter::GuiConfirm(GuiConfirmWaiter::single()),
        )
    }

    /// A click that expects `count` GUI confirmations.
    pub fn with_confirmations(click: SlotClick, count: u32) -> Result<Self> {
        Ok(Self::with_waiter(click, Waiter::gui_confirms(count)?))
    }

    pub fn with_waiter(click: SlotClick, waiter: Waiter) -> Self {
        Self { click, waiter }
    }

    pub fn click(&self) -> &SlotClick {
        &self.click
    }

    fn dispatch<D: Dispatcher>(self, dispatcher: &mut D) -> Waiter {
        dispatcher.click_slot(&self.click);
        self.waiter
    }
}

/// A deferred action, whose effect and waiter are only decided at dispatch time.
pub struct CallbackAction<D: Dispatcher> {
    callback: Box<dyn FnOnce(&mut D) -> Waiter + Send>,
}

impl<D: Dispatcher> CallbackAction<D> {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(&mut D) -> Waiter + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    fn dispatch(self, dispatcher: &mut D) -> Waiter {
        (self.callback)(dispatcher)
    }
}

impl<D: Dispatcher> std::fmt::Debug for CallbackAction<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackAction").finish_non_exhaustive()
    }
}

/// A raw outbound packet.
#[derive(Debug)]
pub struct PacketAction<P> {
    packet: P,
    waiter: Waiter,
}

impl<P> PacketAction<P> {
    /// A packet that requires no confirmation: the sequencer proceeds right after sending it.
    pub fn new(packet: P) -> Self {
        Self::with_waiter(packet, Waiter::Dummy)
    }

    /// A packet that expects `count` GUI confirmations.
    pub fn with_confirmations(packet: P, count: u32) -> Result<Self> {
        Ok(Self::with_waiter(packet, Waiter::gui_confirms(count)?))
    }

    pub fn with_waiter(packet: P, waiter: Waiter) -> Self {
        Self { packet, waiter }
    }

    pub fn packet(&self) -> &P {
        &self.packet
    }

    fn dispatch<D>(self, dispatcher: &mut D) -> Waiter
    where
        D: Dispatcher<Packet = P>,
    {
        dispatcher.send_packet(self.packet);
        self.waiter
    }
}
