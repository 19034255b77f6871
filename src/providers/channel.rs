//! Latest-value input channel for device pollers

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::provider::InputSource;
use crate::types::{CarSnapshot, InputCommand};

/// Input fed from another task through a watch channel.
///
/// The simulation reads whatever command was published last; intermediate
/// updates between two ticks are skipped. If every [`InputHandle`] is dropped
/// the controls are released.
#[derive(Debug)]
pub struct ChannelInput {
    rx: watch::Receiver<InputCommand>,
    disconnected: bool,
}

/// Publishing side of a [`ChannelInput`].
#[derive(Debug, Clone)]
pub struct InputHandle {
    tx: watch::Sender<InputCommand>,
}

impl ChannelInput {
    pub fn new() -> (Self, InputHandle) {
        let (tx, rx) = watch::channel(InputCommand::default());
        (Self { rx, disconnected: false }, InputHandle { tx })
    }

    /// Command currently on the channel.
    pub fn current(&self) -> InputCommand {
        *self.rx.borrow()
    }
}

impl InputSource for ChannelInput {
    fn command(&mut self, car: &CarSnapshot) -> InputCommand {
        if self.rx.has_changed().is_err() {
            if !self.disconnected {
                warn!(car = %car.id, "Input channel closed, releasing controls");
                self.disconnected = true;
            }
            return InputCommand::default();
        }
        *self.rx.borrow_and_update()
    }
}

impl InputHandle {
    /// Publish a new command; it replaces any command not yet read.
    pub fn send(&self, input: InputCommand) {
        self.tx.send_replace(input);
    }

    /// Change part of the current command in place.
    pub fn update(&self, modify: impl FnOnce(&mut InputCommand)) {
        self.tx.send_modify(modify);
    }

    /// Whether the simulation side is still listening.
    pub fn is_connected(&self) -> bool {
        let connected = !self.tx.is_closed();
        if !connected {
            debug!("Input handle has no reader");
        }
        connected
    }
}
