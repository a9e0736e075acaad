use crate::script::{Script, Step};
use anyhow::{bail, Result};
use colored::Colorize;
use interact::{Dispatcher, Sequencer};
use std::{thread, time::Instant};

/// Replays a script: its background interactions are enqueued from another thread while its
/// steps are replayed, then whatever producers left in the queue is pumped.
pub(crate) fn run<D>(sequencer: &mut Sequencer<D>, script: &Script) -> Result<()>
where
    D: Dispatcher<Packet = String> + 'static,
{
    let background = {
        let producer = sequencer.producer();
        let events = script
            .background
            .iter()
            .filter_map(|step| step.to_event::<D>(sequencer.config()).transpose())
            .collect::<Result<Vec<_>>>()?;
        thread::spawn(move || {
            for event in events {
                producer.enqueue(event);
            }
        })
    };

    for step in &script.steps {
        replay(sequencer, step)?;
    }
    if background.join().is_err() {
        bail!("the background producer has panicked");
    }
    sequencer.pump();
    Ok(())
}

fn replay<D>(sequencer: &mut Sequencer<D>, step: &Step) -> Result<()>
where
    D: Dispatcher<Packet = String> + 'static,
{
    if let Some(event) = step.to_event::<D>(sequencer.config())? {
        sequencer.enqueue(event);
        return Ok(());
    }
    if let Some(after) = step.expire_after() {
        if sequencer.expire_stalled(Instant::now() + after) {
            println!("     {} after {after:?}", "stalled".red());
        }
        return Ok(());
    }
    match step {
        Step::Notify(trigger) => {
            println!("     {} {trigger}", "notify".yellow());
            sequencer.notify(*trigger);
        }
        Step::Pump => sequencer.pump(),
        Step::Clear => {
            println!("     {}", "clear".red());
            sequencer.clear();
        }
        Step::Click(_) | Step::Packet(_) | Step::CallbackWait(_) | Step::Expire { .. } => {}
    }
    Ok(())
}
