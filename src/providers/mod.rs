//! Built-in input sources

pub mod autopilot;
pub mod channel;
pub mod scripted;

pub use autopilot::Autopilot;
pub use channel::{ChannelInput, InputHandle};
pub use scripted::{ScriptStep, ScriptedInput};
