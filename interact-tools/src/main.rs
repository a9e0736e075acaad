#![deny(unsafe_code)]
#![warn(unused_crate_dependencies)]

mod replay;
mod script;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use interact::{Dispatcher, Sequencer, SequencerConfig, SlotClick};
use script::Script;
use std::{path::PathBuf, time::Duration};
use tracing::info;

/// Replays a script of interactions and triggers against a sequencer, and prints what gets
/// dispatched.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON script to replay.
    script: PathBuf,

    /// Path to a JSON sequencer configuration, overriding the one of the script.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Stall timeout in milliseconds, overriding the configuration.
    #[clap(long)]
    stall_timeout_ms: Option<u64>,

    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn sequencer_config(&self, script: &Script) -> Result<SequencerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("opening configuration {}", path.display()))?;
                serde_json::from_reader(std::io::BufReader::new(file))
                    .with_context(|| format!("parsing configuration {}", path.display()))?
            }
            None => script.config.clone().unwrap_or_default(),
        };
        if let Some(timeout) = self.stall_timeout_ms {
            config = config.with_stall_timeout(Duration::from_millis(timeout));
        }
        Ok(config)
    }
}

/// Prints dispatched interactions to the console.
#[derive(Default, Debug)]
struct Console {
    sent: usize,
}

impl Dispatcher for Console {
    type Packet = String;

    fn click_slot(&mut self, click: &SlotClick) {
        self.sent += 1;
        println!("{:>4} {} {click}", self.sent, "click".green());
    }

    fn send_packet(&mut self, packet: String) {
        self.sent += 1;
        println!("{:>4} {} {packet}", self.sent, "packet".cyan());
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Activate traces to the console.
    tracing_subscriber::fmt()
        .compact()
        .with_max_level(match args.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            3.. => tracing::Level::TRACE,
        })
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let script = Script::from_file(&args.script)
        .with_context(|| format!("loading script {}", args.script.display()))?;
    let config = args.sequencer_config(&script)?;
    info!(?config, steps = script.steps.len(), "replaying script");

    let mut sequencer = Sequencer::with_config(Console::default(), config);

    replay::run(&mut sequencer, &script)?;

    let status = if sequencer.is_idle() {
        "idle".green()
    } else {
        "waiting".yellow()
    };
    println!(
        "{} dispatched, {} pending, {status}",
        sequencer.dispatched(),
        sequencer.pending()
    );
    Ok(())
}
