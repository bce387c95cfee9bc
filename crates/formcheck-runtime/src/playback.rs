//! Playback state machine
//!
//! ```text
//! RUNNING --pause--> PAUSED --resume--> RUNNING
//! RUNNING --quit | end of stream--> TERMINATED
//! PAUSED  --quit--> TERMINATED
//! RUNNING | PAUSED --fatal error--> TERMINATED
//! ```
//!
//! TERMINATED is final. Commands that do not apply in the current state are
//! ignored.

use std::fmt;

/// Playback state, owned solely by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Running,
    Paused,
    Terminated,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Running => write!(f, "running"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Discrete user command delivered by the display collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackCommand {
    Pause,
    Resume,
    /// Single-key devices: pause when running, resume when paused
    TogglePause,
    Quit,
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    Quit,
    EndOfStream,
    /// A fatal error stopped the session
    Aborted,
}

/// Effect of feeding an input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed {
        from: PlaybackState,
        to: PlaybackState,
    },
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct PlaybackStateMachine {
    state: PlaybackState,
    reason: Option<TerminationReason>,
}

impl PlaybackStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the synchronizer may be advanced this tick
    pub fn should_advance(&self) -> bool {
        self.state == PlaybackState::Running
    }

    pub fn is_terminated(&self) -> bool {
        self.state == PlaybackState::Terminated
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.reason
    }

    /// Apply a user command
    pub fn apply(&mut self, command: PlaybackCommand) -> Transition {
        use PlaybackCommand::*;
        use PlaybackState::*;

        let next = match (self.state, command) {
            (Running, Pause) | (Running, TogglePause) => Paused,
            (Paused, Resume) | (Paused, TogglePause) => Running,
            (Running, Quit) | (Paused, Quit) => {
                self.reason = Some(TerminationReason::Quit);
                Terminated
            }
            _ => {
                tracing::debug!(state = %self.state, ?command, "playback command ignored");
                return Transition::Ignored;
            }
        };
        self.change(next)
    }

    /// The synchronizer reported that a source ran dry
    pub fn end_of_stream(&mut self) -> Transition {
        if self.state != PlaybackState::Running {
            return Transition::Ignored;
        }
        self.reason = Some(TerminationReason::EndOfStream);
        self.change(PlaybackState::Terminated)
    }

    /// A fatal error occurred; terminate from any live state
    pub fn abort(&mut self) -> Transition {
        if self.is_terminated() {
            return Transition::Ignored;
        }
        self.reason = Some(TerminationReason::Aborted);
        self.change(PlaybackState::Terminated)
    }

    fn change(&mut self, to: PlaybackState) -> Transition {
        let from = self.state;
        self.state = to;
        tracing::info!(%from, %to, "playback state changed");
        Transition::Changed { from, to }
    }
}
