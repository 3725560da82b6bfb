// src/analysis/counter.rs
//! Rep/set state machine
//!
//! Two separated thresholds form a hysteresis band: once a rep is counted
//! on reaching the peak, nothing more is counted until the lift returns all
//! the way to the rest position.

use crate::config::constants::session::{MAX_REPS_PER_SET, MIN_REPS_PER_SET};
use crate::error::{CoreError, CoreResult};
use crate::error_context;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the rep cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Extended / rest position
    #[default]
    Down,
    /// Contracted / peak position
    Up,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Down => f.write_str("down"),
            Phase::Up => f.write_str("up"),
        }
    }
}

/// Which phase conditions hold on the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseSignal {
    pub at_peak: bool,
    pub at_rest: bool,
}

impl PhaseSignal {
    pub fn new(at_peak: bool, at_rest: bool) -> Self {
        Self { at_peak, at_rest }
    }
}

/// What a frame did to the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Inside the hysteresis band
    Hold,
    /// Both conditions held at once; phase kept
    Ambiguous,
    /// Up → Down, no counter change
    Lowered,
    /// Down → Up, `rep` is the new rep count
    RepCompleted { rep: u32 },
    /// Down → Up that filled a set; reps rolled back to zero
    SetCompleted { set: u32 },
}

impl Transition {
    pub fn counted_rep(&self) -> bool {
        matches!(self, Transition::RepCompleted { .. } | Transition::SetCompleted { .. })
    }
}

/// Phase and counters for one lifter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepState {
    phase: Phase,
    rep_count: u32,
    set_count: u32,
    reps_per_set: u32,
}

impl RepState {
    pub fn new(reps_per_set: u32) -> CoreResult<Self> {
        validate_reps_per_set(reps_per_set)?;
        Ok(Self {
            phase: Phase::Down,
            rep_count: 0,
            set_count: 0,
            reps_per_set,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Reps in the current set, always below [`RepState::reps_per_set`]
    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn set_count(&self) -> u32 {
        self.set_count
    }

    pub fn reps_per_set(&self) -> u32 {
        self.reps_per_set
    }

    /// Feed one validated frame
    pub fn advance(&mut self, signal: PhaseSignal) -> Transition {
        if signal.at_peak && signal.at_rest {
            return Transition::Ambiguous;
        }

        match self.phase {
            Phase::Down if signal.at_peak => {
                self.phase = Phase::Up;
                self.rep_count += 1;
                if self.rep_count >= self.reps_per_set {
                    self.set_count += 1;
                    self.rep_count = 0;
                    Transition::SetCompleted { set: self.set_count }
                } else {
                    Transition::RepCompleted { rep: self.rep_count }
                }
            }
            Phase::Up if signal.at_rest => {
                self.phase = Phase::Down;
                Transition::Lowered
            }
            _ => Transition::Hold,
        }
    }

    /// Zero the counters and return to the rest position
    pub fn reset(&mut self) {
        self.phase = Phase::Down;
        self.rep_count = 0;
        self.set_count = 0;
    }

    #[cfg(test)]
    pub(crate) fn with_counts(reps_per_set: u32, phase: Phase, rep_count: u32, set_count: u32) -> Self {
        Self {
            phase,
            rep_count,
            set_count,
            reps_per_set,
        }
    }
}

pub(crate) fn validate_reps_per_set(reps_per_set: u32) -> CoreResult<()> {
    if !(MIN_REPS_PER_SET..=MAX_REPS_PER_SET).contains(&reps_per_set) {
        return Err(CoreError::invalid_data(
            error_context!("rep_counter", "new"),
            "reps_per_set",
            format!(
                "must be between {} and {}, got {}",
                MIN_REPS_PER_SET, MAX_REPS_PER_SET, reps_per_set
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PEAK: PhaseSignal = PhaseSignal { at_peak: true, at_rest: false };
    const REST: PhaseSignal = PhaseSignal { at_peak: false, at_rest: true };
    const BAND: PhaseSignal = PhaseSignal { at_peak: false, at_rest: false };

    #[test]
    fn test_starts_down_and_empty() {
        let state = RepState::new(10).unwrap();
        assert_eq!(state.phase(), Phase::Down);
        assert_eq!(state.rep_count(), 0);
        assert_eq!(state.set_count(), 0);
    }

    #[test]
    fn test_zero_reps_per_set_is_rejected() {
        assert!(matches!(RepState::new(0), Err(CoreError::InvalidData { .. })));
    }

    #[test]
    fn test_rep_counted_only_on_the_way_up() {
        let mut state = RepState::new(10).unwrap();

        assert_eq!(state.advance(PEAK), Transition::RepCompleted { rep: 1 });
        assert_eq!(state.advance(REST), Transition::Lowered);
        assert_eq!(state.rep_count(), 1);
        assert_eq!(state.phase(), Phase::Down);
    }

    #[test]
    fn test_band_holds_phase() {
        let mut state = RepState::new(10).unwrap();
        state.advance(PEAK);

        assert_eq!(state.advance(BAND), Transition::Hold);
        assert_eq!(state.phase(), Phase::Up);
    }

    #[test]
    fn test_rest_while_down_is_a_hold() {
        let mut state = RepState::new(10).unwrap();
        assert_eq!(state.advance(REST), Transition::Hold);
        assert_eq!(state.phase(), Phase::Down);
    }

    #[test]
    fn test_ambiguous_frame_holds() {
        let mut state = RepState::new(10).unwrap();
        assert_eq!(state.advance(PhaseSignal::new(true, true)), Transition::Ambiguous);
        assert_eq!(state.rep_count(), 0);
        assert_eq!(state.phase(), Phase::Down);
    }

    #[test]
    fn test_rollover_happens_within_one_frame() {
        let mut state = RepState::with_counts(10, Phase::Down, 9, 0);

        assert_eq!(state.advance(PEAK), Transition::SetCompleted { set: 1 });
        assert_eq!(state.rep_count(), 0);
        assert_eq!(state.set_count(), 1);
        assert_eq!(state.phase(), Phase::Up);
    }

    #[test]
    fn test_single_rep_sets() {
        let mut state = RepState::new(1).unwrap();
        for _ in 0..3 {
            assert!(matches!(state.advance(PEAK), Transition::SetCompleted { .. }));
            state.advance(REST);
        }
        assert_eq!(state.set_count(), 3);
        assert_eq!(state.rep_count(), 0);
    }

    #[test]
    fn test_reset() {
        let mut state = RepState::with_counts(10, Phase::Up, 4, 2);
        state.reset();
        assert_eq!(state, RepState::new(10).unwrap());
    }

    proptest! {
        /// Jitter around the peak without returning to rest counts once at most
        #[test]
        fn jitter_near_peak_counts_once(frames in proptest::collection::vec(any::<bool>(), 1..200)) {
            let mut state = RepState::new(10).unwrap();
            for at_peak in frames {
                state.advance(PhaseSignal::new(at_peak, false));
            }
            prop_assert!(state.rep_count() <= 1);
        }

        #[test]
        fn counters_stay_in_bounds(
            reps_per_set in 1u32..15,
            frames in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..300),
        ) {
            let mut state = RepState::new(reps_per_set).unwrap();
            let mut total_reps = 0u32;
            for (at_peak, at_rest) in frames {
                if state.advance(PhaseSignal::new(at_peak, at_rest)).counted_rep() {
                    total_reps += 1;
                }
                prop_assert!(state.rep_count() < state.reps_per_set());
            }
            prop_assert_eq!(state.set_count() * reps_per_set + state.rep_count(), total_reps);
        }
    }
}
