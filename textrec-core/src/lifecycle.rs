//! Lifecycle state machines of producers and consumers
//!
//! Both sides move through `open -> before -> records -> after -> closed`. The records
//! phase may repeat and every state except `Closed` may jump straight to `Closed`. The
//! allowed moves are listed in a transition table per side.

use crate::error::RecordError;
use crate::Result;

#[cfg(feature = "logging")]
use tracing::debug;

/// A state of a lifecycle
pub trait Phase: Copy + Eq + std::fmt::Debug + 'static {
    /// State a fresh lifecycle starts in
    const INITIAL: Self;

    /// Allowed `(from, to)` moves
    const TRANSITIONS: &'static [(Self, Self)];

    /// Name used in error messages
    fn name(&self) -> &'static str;

    /// Check if `from -> to` is an allowed move
    fn allows(from: Self, to: Self) -> bool {
        Self::TRANSITIONS.iter().any(|&(f, t)| f == from && t == to)
    }
}

/// States of a producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerState {
    /// Created, nothing read yet
    Open,
    /// Leading data was read
    ReadBefore,
    /// Records were handed out
    ReadRecords,
    /// Trailing data was read
    ReadAfter,
    /// Source released
    Closed,
}

impl Phase for ProducerState {
    const INITIAL: Self = ProducerState::Open;

    const TRANSITIONS: &'static [(Self, Self)] = &[
        (ProducerState::Open, ProducerState::ReadBefore),
        (ProducerState::ReadBefore, ProducerState::ReadRecords),
        (ProducerState::ReadBefore, ProducerState::ReadAfter),
        (ProducerState::ReadRecords, ProducerState::ReadRecords),
        (ProducerState::ReadRecords, ProducerState::ReadAfter),
        (ProducerState::Open, ProducerState::Closed),
        (ProducerState::ReadBefore, ProducerState::Closed),
        (ProducerState::ReadRecords, ProducerState::Closed),
        (ProducerState::ReadAfter, ProducerState::Closed),
    ];

    fn name(&self) -> &'static str {
        match self {
            ProducerState::Open => "Open",
            ProducerState::ReadBefore => "ReadBefore",
            ProducerState::ReadRecords => "ReadRecords",
            ProducerState::ReadAfter => "ReadAfter",
            ProducerState::Closed => "Closed",
        }
    }
}

/// States of a consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerState {
    /// Created, nothing written yet
    Open,
    /// Leading text was written
    WriteBefore,
    /// At least one record was written
    WriteRecords,
    /// Trailing text was written
    WriteAfter,
    /// Sink released
    Closed,
}

impl Phase for ConsumerState {
    const INITIAL: Self = ConsumerState::Open;

    const TRANSITIONS: &'static [(Self, Self)] = &[
        (ConsumerState::Open, ConsumerState::WriteBefore),
        (ConsumerState::WriteBefore, ConsumerState::WriteRecords),
        (ConsumerState::WriteBefore, ConsumerState::WriteAfter),
        (ConsumerState::WriteRecords, ConsumerState::WriteRecords),
        (ConsumerState::WriteRecords, ConsumerState::WriteAfter),
        (ConsumerState::Open, ConsumerState::Closed),
        (ConsumerState::WriteBefore, ConsumerState::Closed),
        (ConsumerState::WriteRecords, ConsumerState::Closed),
        (ConsumerState::WriteAfter, ConsumerState::Closed),
    ];

    fn name(&self) -> &'static str {
        match self {
            ConsumerState::Open => "Open",
            ConsumerState::WriteBefore => "WriteBefore",
            ConsumerState::WriteRecords => "WriteRecords",
            ConsumerState::WriteAfter => "WriteAfter",
            ConsumerState::Closed => "Closed",
        }
    }
}

/// Current state of a producer or consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle<P: Phase> {
    state: P,
}

impl<P: Phase> Default for Lifecycle<P> {
    fn default() -> Self {
        Self { state: P::INITIAL }
    }
}

impl<P: Phase> Lifecycle<P> {
    /// Start in the initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> P {
        self.state
    }

    /// Move to `to`, failing if the table does not allow it
    pub fn transition(&mut self, to: P) -> Result<()> {
        self.check_transition(to)?;
        if self.state != to {
            #[cfg(feature = "logging")]
            debug!("Lifecycle {} -> {}", self.state.name(), to.name());
        }
        self.state = to;
        Ok(())
    }

    /// Fail unless `to` would be an allowed move, without moving
    pub fn check_transition(&self, to: P) -> Result<()> {
        if P::allows(self.state, to) {
            Ok(())
        } else {
            Err(self.illegal(to))
        }
    }

    /// Fail unless the current state is one of `states`
    pub fn require(&self, states: &[P], operation: &'static str) -> Result<()> {
        if states.contains(&self.state) {
            Ok(())
        } else {
            Err(RecordError::IllegalState {
                from: self.state.name(),
                to: operation,
            })
        }
    }

    fn illegal(&self, to: P) -> RecordError {
        RecordError::IllegalState {
            from: self.state.name(),
            to: to.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_happy_path() {
        let mut lifecycle = Lifecycle::<ProducerState>::new();
        lifecycle.transition(ProducerState::ReadBefore).unwrap();
        lifecycle.transition(ProducerState::ReadRecords).unwrap();
        lifecycle.transition(ProducerState::ReadRecords).unwrap();
        lifecycle.transition(ProducerState::ReadAfter).unwrap();
        lifecycle.transition(ProducerState::Closed).unwrap();
        assert_eq!(lifecycle.state(), ProducerState::Closed);
    }

    #[test]
    fn test_skipping_a_phase_is_illegal() {
        let mut lifecycle = Lifecycle::<ProducerState>::new();
        let err = lifecycle.transition(ProducerState::ReadRecords).unwrap_err();
        assert_eq!(
            err,
            RecordError::IllegalState {
                from: "Open",
                to: "ReadRecords"
            }
        );
        assert_eq!(lifecycle.state(), ProducerState::Open);
    }

    #[test]
    fn test_every_open_state_may_close() {
        for state in [
            ConsumerState::Open,
            ConsumerState::WriteBefore,
            ConsumerState::WriteRecords,
            ConsumerState::WriteAfter,
        ] {
            assert!(ConsumerState::allows(state, ConsumerState::Closed));
        }
        assert!(!ConsumerState::allows(ConsumerState::Closed, ConsumerState::Closed));
    }

    #[test]
    fn test_nothing_leaves_closed() {
        for &(from, _) in ProducerState::TRANSITIONS {
            assert_ne!(from, ProducerState::Closed);
        }
    }

    #[test]
    fn test_going_back_is_illegal() {
        let mut lifecycle = Lifecycle::<ConsumerState>::new();
        lifecycle.transition(ConsumerState::WriteBefore).unwrap();
        lifecycle.transition(ConsumerState::WriteAfter).unwrap();
        assert!(lifecycle.transition(ConsumerState::WriteRecords).is_err());
        assert!(lifecycle
            .require(&[ConsumerState::WriteAfter], "recordCount")
            .is_ok());
    }
}
