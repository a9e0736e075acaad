/// A signal that may satisfy the confirmation the sequencer is waiting for.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerType {
    /// Emitted by the sequencer itself right after an event is dispatched, or when it is asked to
    /// start draining while idle. Only waiters that require no confirmation accept it.
    Initial,
    /// The contents of an inventory slot changed.
    ContainerSlotUpdate,
    /// The server confirmed a container transaction.
    GuiConfirm,
    /// The held item changed.
    HeldItemChange,
}

impl TriggerType {
    pub const ALL: [Self; 4] = [
        Self::Initial,
        Self::ContainerSlotUpdate,
        Self::GuiConfirm,
        Self::HeldItemChange,
    ];
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial",
            Self::ContainerSlotUpdate => "container-slot-update",
            Self::GuiConfirm => "gui-confirm",
            Self::HeldItemChange => "held-item-change",
        })
    }
}
