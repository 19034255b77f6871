//! Timed command scripts

use tracing::debug;

use crate::provider::InputSource;
use crate::types::{CarSnapshot, InputCommand};

/// One scripted command held for a number of ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    pub ticks: u32,
    pub input: InputCommand,
}

/// Plays back a fixed sequence of commands, one tick per call.
///
/// Once the script runs out the source keeps returning its fallback command,
/// [`InputCommand::default`] unless set with [`ScriptedInput::then`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
    step: usize,
    elapsed: u32,
    fallback: InputCommand,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `input` for `ticks` ticks.
    pub fn hold(mut self, input: InputCommand, ticks: u32) -> Self {
        if ticks > 0 {
            self.steps.push(ScriptStep { ticks, input });
        }
        self
    }

    /// Command used after the last step.
    pub fn then(mut self, fallback: InputCommand) -> Self {
        self.fallback = fallback;
        self
    }

    /// Total scripted length in ticks.
    pub fn len(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.ticks)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn finished(&self) -> bool {
        self.step >= self.steps.len()
    }

    /// Next command, advancing the script by one tick.
    pub fn next_command(&mut self) -> InputCommand {
        let Some(step) = self.steps.get(self.step) else {
            return self.fallback;
        };
        let input = step.input;
        self.elapsed += 1;
        if self.elapsed >= step.ticks {
            self.step += 1;
            self.elapsed = 0;
            if self.finished() {
                debug!(steps = self.steps.len(), "Input script finished");
            }
        }
        input
    }

    /// Restart from the first step.
    pub fn rewind(&mut self) {
        self.step = 0;
        self.elapsed = 0;
    }
}

impl FromIterator<ScriptStep> for ScriptedInput {
    fn from_iter<I: IntoIterator<Item = ScriptStep>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |script, step| script.hold(step.input, step.ticks))
    }
}

impl InputSource for ScriptedInput {
    fn command(&mut self, _car: &CarSnapshot) -> InputCommand {
        self.next_command()
    }
}
