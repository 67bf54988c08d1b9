//! Two-slot producer/consumer state machine.
//!
//! One slot is always stable and safe to read; the other is either waiting
//! for the producer, being written, or holds a newer committed frame that the
//! consumer has not switched to yet.

use crate::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// The producer may claim this slot; the other slot is stable.
    WaitingOn(Slot),
    /// The producer is writing this slot; the other slot is stable.
    Updating(Slot),
    /// This slot holds a freshly committed frame the consumer will switch to.
    Available(Slot),
}

impl Default for BufferState {
    fn default() -> Self {
        BufferState::INITIAL
    }
}

impl BufferState {
    pub const INITIAL: BufferState = BufferState::WaitingOn(Slot::Zero);

    /// Claim the waiting slot for writing. `None` while a write is in flight
    /// or a committed frame has not been picked up yet.
    pub fn begin_write(self) -> Option<(Slot, BufferState)> {
        match self {
            BufferState::WaitingOn(slot) => Some((slot, BufferState::Updating(slot))),
            BufferState::Updating(_) | BufferState::Available(_) => None,
        }
    }

    /// State after `slot` has been fully written.
    pub fn commit(slot: Slot) -> BufferState {
        BufferState::Available(slot)
    }

    /// Pick the slot to hand the consumer.
    ///
    /// A freshly available slot is returned, and when `release` is set the
    /// other slot becomes the next write target. Otherwise the stable slot is
    /// returned and nothing changes.
    pub fn read(self, release: bool) -> (Slot, BufferState) {
        match self {
            BufferState::Available(slot) if release => {
                (slot, BufferState::WaitingOn(slot.other()))
            }
            BufferState::Available(slot) => (slot, self),
            BufferState::WaitingOn(slot) | BufferState::Updating(slot) => (slot.other(), self),
        }
    }

    /// Slot whose contents are currently complete and not being replaced.
    pub fn stable_slot(self) -> Slot {
        match self {
            BufferState::Available(slot) => slot,
            BufferState::WaitingOn(slot) | BufferState::Updating(slot) => slot.other(),
        }
    }

    /// Slot being written, if any.
    pub fn writing(self) -> Option<Slot> {
        match self {
            BufferState::Updating(slot) => Some(slot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(BufferState::default(), BufferState::WaitingOn(Slot::Zero));
        assert_eq!(BufferState::INITIAL.stable_slot(), Slot::One);
    }

    #[test]
    fn test_begin_write_claims_waiting_slot() {
        assert_eq!(
            BufferState::WaitingOn(Slot::Zero).begin_write(),
            Some((Slot::Zero, BufferState::Updating(Slot::Zero)))
        );
        assert_eq!(
            BufferState::WaitingOn(Slot::One).begin_write(),
            Some((Slot::One, BufferState::Updating(Slot::One)))
        );
    }

    #[test]
    fn test_begin_write_refused_when_busy() {
        for slot in Slot::ALL {
            assert_eq!(BufferState::Updating(slot).begin_write(), None);
            assert_eq!(BufferState::Available(slot).begin_write(), None);
        }
    }

    #[test]
    fn test_read_available_with_release() {
        assert_eq!(
            BufferState::Available(Slot::Zero).read(true),
            (Slot::Zero, BufferState::WaitingOn(Slot::One))
        );
        assert_eq!(
            BufferState::Available(Slot::One).read(true),
            (Slot::One, BufferState::WaitingOn(Slot::Zero))
        );
    }

    #[test]
    fn test_read_available_without_release_keeps_state() {
        let state = BufferState::Available(Slot::One);
        assert_eq!(state.read(false), (Slot::One, state));
    }

    #[test]
    fn test_read_pending_returns_other_slot() {
        for slot in Slot::ALL {
            for state in [BufferState::WaitingOn(slot), BufferState::Updating(slot)] {
                assert_eq!(state.read(true), (slot.other(), state));
                assert_eq!(state.read(false), (slot.other(), state));
            }
        }
    }

    #[test]
    fn test_full_cycle() {
        let (slot, state) = BufferState::INITIAL.begin_write().unwrap();
        assert_eq!(slot, Slot::Zero);
        assert_eq!(state.writing(), Some(Slot::Zero));
        let state = BufferState::commit(slot);
        let (read, state) = state.read(true);
        assert_eq!(read, Slot::Zero);

        let (slot, state) = state.begin_write().unwrap();
        assert_eq!(slot, Slot::One);
        // Consumer keeps reading slot 0 while slot 1 is written.
        assert_eq!(state.read(true).0, Slot::Zero);
        let (read, state) = BufferState::commit(slot).read(true);
        assert_eq!(read, Slot::One);
        assert_eq!(state, BufferState::INITIAL);
    }
}
