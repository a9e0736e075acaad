#![deny(unreachable_pub, unsafe_code)]
#![warn(unused_crate_dependencies)]
#![warn(
    clippy::all,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::empty_structs_with_brackets,
    clippy::exit,
    clippy::get_unwrap,
    clippy::if_then_some_else_none,
    clippy::let_underscore_must_use,
    clippy::map_err_ignore,
    clippy::mem_forget,
    clippy::panic,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::same_name_method,
    clippy::mod_module_files,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::todo,
    clippy::try_err,
    clippy::unimplemented,
    clippy::unnecessary_self_imports,
    clippy::unneeded_field_pattern
)]
// Deny warnings in doc test.
#![doc(test(attr(deny(warnings))))]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod dispatch;
mod error;
pub mod event;
mod sequencer;
mod trigger;
pub mod waiter;

#[doc(inline)]
pub use crate::{
    config::{SequencerConfig, StallPolicy},
    dispatch::{Dispatcher, SlotActionKind, SlotClick},
    error::{Error, Result},
    event::{CallbackAction, ClickAction, InteractionEvent, PacketAction},
    sequencer::{Producer, Sequencer},
    trigger::TriggerType,
    waiter::{GuiConfirmWaiter, Waiter},
};
