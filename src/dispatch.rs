/// The sink through which dispatched events reach the server.
///
/// Implemented by the host, usually on top of the game client's interaction manager and
/// network connection. Failures to deliver are the implementation's concern: the sequencer
/// neither observes nor retries them.
pub trait Dispatcher {
    /// Outbound packets, opaque to the sequencer.
    type Packet;

    /// Performs a slot action in the container identified by the click's sync ID, on behalf of
    /// the current player.
    fn click_slot(&mut self, click: &SlotClick);

    /// Sends a packet on the current connection.
    fn send_packet(&mut self, packet: Self::Packet);
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlotClick {
    pub sync_id: i32,
    pub slot_id: i32,
    pub button_id: i32,
    pub kind: SlotActionKind,
}

impl SlotClick {
    pub fn new(sync_id: i32, slot_id: i32, button_id: i32, kind: SlotActionKind) -> Self {
        Self {
            sync_id,
            slot_id,
            button_id,
            kind,
        }
    }
}

impl std::fmt::Display for SlotClick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{kind:?} slot {slot} (button {button}) in container {sync}",
            kind = self.kind,
            slot = self.slot_id,
            button = self.button_id,
            sync = self.sync_id,
        )
    }
}

/// How a slot is acted upon by a click.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SlotActionKind {
    Pickup,
    QuickMove,
    Swap,
    Clone,
    Throw,
    QuickCraft,
    PickupAll,
}
