//! Input source trait for the driver loop

use crate::types::{CarSnapshot, InputCommand};

/// Per-car source of control input.
///
/// The driver asks every source once per tick, in grid order, handing it the car's
/// state from the previous tick. Sources must not block: device polling, network
/// reads and the like belong on their own task, publishing into something the
/// source can read without waiting (see [`ChannelInput`](crate::providers::ChannelInput)).
pub trait InputSource: Send + 'static {
    /// Command for the coming tick. Out-of-range values are clamped by the simulation.
    fn command(&mut self, car: &CarSnapshot) -> InputCommand;
}

impl<F> InputSource for F
where
    F: FnMut(&CarSnapshot) -> InputCommand + Send + 'static,
{
    fn command(&mut self, car: &CarSnapshot) -> InputCommand {
        self(car)
    }
}

/// Source that never touches the controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl InputSource for Idle {
    fn command(&mut self, _car: &CarSnapshot) -> InputCommand {
        InputCommand::default()
    }
}
