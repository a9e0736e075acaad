use serde_with::{serde_as, DurationMilliSeconds};
use std::{num::NonZeroU32, time::Duration};

/// Tunables of a [`Sequencer`](crate::Sequencer).
///
/// The default configuration waits forever for confirmations, and expects one GUI confirmation
/// per click enqueued with [`Sequencer::enqueue_click`](crate::Sequencer::enqueue_click).
#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SequencerConfig {
    /// How long a waiter may stay unsatisfied before
    /// [`Sequencer::expire_stalled`](crate::Sequencer::expire_stalled) handles it as stalled.
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(rename = "stall-timeout-ms")]
    pub stall_timeout: Option<Duration>,
    pub stall_policy: StallPolicy,
    pub click_confirmations: NonZeroU32,
}

impl SequencerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = Some(timeout);
        self
    }

    pub fn with_stall_policy(mut self, policy: StallPolicy) -> Self {
        self.stall_policy = policy;
        self
    }

    pub fn with_click_confirmations(mut self, count: NonZeroU32) -> Self {
        self.click_confirmations = count;
        self
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            stall_timeout: None,
            stall_policy: StallPolicy::default(),
            click_confirmations: NonZeroU32::MIN,
        }
    }
}

/// What to do with a waiter that has not been satisfied in time.
#[derive(
    Default, Copy, Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum StallPolicy {
    /// Drop the waiter and every queued event, as on a disconnection.
    #[default]
    Clear,
    /// Drop the waiter only, and proceed with the next queued events.
    Advance,
}
