//! Phase state machine governing when the world is live.

use std::time::Duration;

use detour_defence_core::{Phase, PhaseError};

/// Tracks the active phase, its countdown and the phase interrupted by a pause.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SimulationClock {
    phase: Phase,
    countdown: Duration,
    resume: Option<Phase>,
}

impl SimulationClock {
    /// Starts in the build phase with the provided countdown.
    pub(crate) fn new(build_countdown: Duration) -> Self {
        Self {
            phase: Phase::Build,
            countdown: build_countdown,
            resume: None,
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    /// Countdown remaining before the next wave; zero outside countdown phases.
    pub(crate) fn countdown(&self) -> Duration {
        if self.phase.is_countdown() {
            self.countdown
        } else {
            Duration::ZERO
        }
    }

    /// Decrements the countdown, reporting whether it has run out.
    ///
    /// Returns `false` outside countdown phases.
    pub(crate) fn count_down(&mut self, dt: Duration) -> bool {
        if !self.phase.is_countdown() {
            return false;
        }
        self.countdown = self.countdown.saturating_sub(dt);
        self.countdown.is_zero()
    }

    /// Ends the current countdown immediately.
    pub(crate) fn expire(&mut self) -> Result<(), PhaseError> {
        match self.phase {
            Phase::GameOver => Err(PhaseError::MatchOver),
            phase if phase.is_countdown() => {
                self.countdown = Duration::ZERO;
                Ok(())
            }
            _ => Err(PhaseError::NotCountingDown),
        }
    }

    pub(crate) fn start_playing(&mut self) {
        self.phase = Phase::Playing;
        self.countdown = Duration::ZERO;
    }

    pub(crate) fn start_countdown(&mut self, phase: Phase, countdown: Duration) {
        debug_assert!(phase.is_countdown(), "{phase:?} does not count down");
        self.phase = phase;
        self.countdown = countdown;
    }

    pub(crate) fn pause(&mut self) -> Result<(), PhaseError> {
        match self.phase {
            Phase::GameOver => Err(PhaseError::MatchOver),
            Phase::Paused => Err(PhaseError::AlreadyPaused),
            phase => {
                self.resume = Some(phase);
                self.phase = Phase::Paused;
                Ok(())
            }
        }
    }

    pub(crate) fn resume(&mut self) -> Result<Phase, PhaseError> {
        match self.phase {
            Phase::GameOver => Err(PhaseError::MatchOver),
            Phase::Paused => {
                let phase = self.resume.take().ok_or(PhaseError::NotPaused)?;
                self.phase = phase;
                Ok(phase)
            }
            _ => Err(PhaseError::NotPaused),
        }
    }

    /// Enters the terminal phase.
    pub(crate) fn finish(&mut self) {
        self.phase = Phase::GameOver;
        self.countdown = Duration::ZERO;
        self.resume = None;
    }
}
