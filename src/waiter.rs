use crate::{
    error::{Error, Result},
    TriggerType,
};
use std::num::NonZeroU32;

/// Decides, given a trigger, whether the action the sequencer is waiting on has been confirmed.
///
/// A waiter is owned by the sequencer while it is current, and is dropped as soon as it accepts a
/// trigger.
#[derive(Default)]
pub enum Waiter {
    /// Accepts any trigger: the action requires no confirmation.
    #[default]
    Dummy,
    /// Accepts once the expected number of GUI confirmations has been received.
    GuiConfirm(GuiConfirmWaiter),
    /// A caller provided predicate.
    Custom(Box<dyn FnMut(TriggerType) -> bool + Send>),
}

impl Waiter {
    /// A waiter that expects `count` GUI confirmations.
    ///
    /// Fails if `count` is zero, since such a waiter could never be satisfied.
    pub fn gui_confirms(count: u32) -> Result<Self> {
        GuiConfirmWaiter::new(count).map(Self::GuiConfirm)
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(TriggerType) -> bool + Send + 'static,
    {
        Self::Custom(Box::new(f))
    }

    /// A waiter satisfied by the first trigger of the given kind.
    pub fn until(expected: TriggerType) -> Self {
        Self::from_fn(move |trigger| trigger == expected)
    }

    /// Feeds a trigger to the waiter. Returns true if the sequencer may proceed.
    pub fn accept(&mut self, trigger: TriggerType) -> bool {
        match self {
            Self::Dummy => true,
            Self::GuiConfirm(waiter) => waiter.accept(trigger),
            Self::Custom(f) => f(trigger),
        }
    }
}

impl From<GuiConfirmWaiter> for Waiter {
    fn from(waiter: GuiConfirmWaiter) -> Self {
        Self::GuiConfirm(waiter)
    }
}

impl std::fmt::Debug for Waiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dummy => f.write_str("Dummy"),
            Self::GuiConfirm(waiter) => f.debug_tuple("GuiConfirm").field(waiter).finish(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct GuiConfirmWaiter {
    remaining: u32,
}

impl GuiConfirmWaiter {
    pub fn new(count: u32) -> Result<Self> {
        NonZeroU32::new(count)
            .map(Self::from)
            .ok_or(Error::ZeroConfirmations)
    }

    /// A waiter that expects a single GUI confirmation.
    pub const fn single() -> Self {
        Self { remaining: 1 }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn accept(&mut self, trigger: TriggerType) -> bool {
        if trigger != TriggerType::GuiConfirm || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

impl From<NonZeroU32> for GuiConfirmWaiter {
    fn from(count: NonZeroU32) -> Self {
        Self {
            remaining: count.get(),
        }
    }
}
