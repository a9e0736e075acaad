use anyhow::{bail, Result};
use interact::{
    CallbackAction, ClickAction, Dispatcher, GuiConfirmWaiter, InteractionEvent, PacketAction,
    SequencerConfig, SlotClick, TriggerType, Waiter,
};
use std::{path::Path, time::Duration};

/// A replayable sequence of interactions and triggers.
#[derive(Default, Debug, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct Script {
    pub(crate) config: Option<SequencerConfig>,
    pub(crate) steps: Vec<Step>,
    /// Interactions enqueued from another thread while the steps are replayed.
    pub(crate) background: Vec<Step>,
}

impl Script {
    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub(crate) fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let script: Self = serde_json::from_reader(reader)?;
        if let Some(step) = script.background.iter().find(|step| !step.is_interaction()) {
            bail!("background steps may only be interactions, found {step:?}");
        }
        Ok(script)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Step {
    Click(ClickStep),
    Packet(PacketStep),
    /// Sends a packet from a callback, then waits for the given trigger.
    CallbackWait(CallbackWaitStep),
    Notify(TriggerType),
    Pump,
    Clear,
    /// Checks for a stall as if the given time had passed.
    Expire {
        #[serde(rename = "after-ms")]
        after_ms: u64,
    },
}

impl Step {
    pub(crate) fn is_interaction(&self) -> bool {
        matches!(self, Self::Click(_) | Self::Packet(_) | Self::CallbackWait(_))
    }

    pub(crate) fn expire_after(&self) -> Option<Duration> {
        match self {
            Self::Expire { after_ms } => Some(Duration::from_millis(*after_ms)),
            _ => None,
        }
    }

    /// The interaction described by the step, if it is one.
    pub(crate) fn to_event<D>(
        &self,
        config: &SequencerConfig,
    ) -> Result<Option<InteractionEvent<D>>>
    where
        D: Dispatcher<Packet = String> + 'static,
    {
        let event = match self {
            Self::Click(ClickStep {
                click,
                confirmations: Some(count),
            }) => ClickAction::with_confirmations(*click, *count)?.into(),
            Self::Click(ClickStep {
                click,
                confirmations: None,
            }) => {
                let waiter = GuiConfirmWaiter::from(config.click_confirmations);
                ClickAction::with_waiter(*click, waiter.into()).into()
            }
            Self::Packet(PacketStep {
                payload,
                confirmations: Some(count),
            }) => PacketAction::with_confirmations(payload.clone(), *count)?.into(),
            Self::Packet(PacketStep {
                payload,
                confirmations: None,
            }) => PacketAction::new(payload.clone()).into(),
            Self::CallbackWait(CallbackWaitStep { payload, until }) => {
                let (payload, until) = (payload.clone(), *until);
                CallbackAction::new(move |dispatcher: &mut D| {
                    dispatcher.send_packet(payload);
                    Waiter::until(until)
                })
                .into()
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ClickStep {
    #[serde(flatten)]
    pub(crate) click: SlotClick,
    #[serde(default)]
    pub(crate) confirmations: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct PacketStep {
    pub(crate) payload: String,
    #[serde(default)]
    pub(crate) confirmations: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct CallbackWaitStep {
    pub(crate) payload: String,
    pub(crate) until: TriggerType,
}
