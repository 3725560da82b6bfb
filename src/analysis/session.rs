// src/analysis/session.rs
//! Per-lifter session state and per-stream ownership

use crate::analysis::classifier::Feedback;
use crate::analysis::counter::{Phase, RepState};
use crate::analysis::rules::ExerciseKind;
use crate::config::SessionConfig;
use crate::error::CoreResult;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Mutable state for one user's exercise attempt across frames
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    state: RepState,
    exercise: ExerciseKind,
    last_feedback: Option<Feedback>,
}

impl Session {
    pub fn new(exercise: ExerciseKind, reps_per_set: u32) -> CoreResult<Self> {
        Ok(Self {
            state: RepState::new(reps_per_set)?,
            exercise,
            last_feedback: None,
        })
    }

    pub fn from_config(config: &SessionConfig) -> CoreResult<Self> {
        Self::new(config.default_exercise, config.reps_per_set)
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    /// Switch exercise between frames. Counters and phase carry over.
    pub fn set_exercise(&mut self, exercise: ExerciseKind) {
        if exercise != self.exercise {
            debug!(from = self.exercise.key(), to = exercise.key(), "Exercise changed");
            self.exercise = exercise;
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn rep_count(&self) -> u32 {
        self.state.rep_count()
    }

    pub fn set_count(&self) -> u32 {
        self.state.set_count()
    }

    pub fn reps_per_set(&self) -> u32 {
        self.state.reps_per_set()
    }

    /// Feedback from the most recent analyzed frame; never a gate notice
    pub fn last_feedback(&self) -> Option<&Feedback> {
        self.last_feedback.as_ref()
    }

    /// Start over: counters to zero, phase back to rest
    pub fn reset(&mut self) {
        self.state.reset();
        self.last_feedback = None;
    }

    pub(crate) fn state_mut(&mut self) -> &mut RepState {
        &mut self.state
    }

    pub(crate) fn record_feedback(&mut self, feedback: Feedback) {
        self.last_feedback = Some(feedback);
    }

    #[cfg(test)]
    pub(crate) fn with_state(exercise: ExerciseKind, state: RepState) -> Self {
        Self {
            state,
            exercise,
            last_feedback: None,
        }
    }
}

/// Caller-supplied identity of one video stream / connection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(String);

impl StreamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StreamId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Independently owned sessions keyed by stream.
///
/// Each stream selects its own exercise; nothing here is shared between them.
#[derive(Debug)]
pub struct SessionRegistry {
    defaults: SessionConfig,
    sessions: HashMap<StreamId, Session>,
}

impl SessionRegistry {
    pub fn new(defaults: SessionConfig) -> CoreResult<Self> {
        // Fail on bad defaults here rather than on the first connect
        Session::from_config(&defaults)?;
        Ok(Self {
            defaults,
            sessions: HashMap::new(),
        })
    }

    /// Session for a stream, created from the defaults on first use
    pub fn open(&mut self, id: impl Into<StreamId>) -> CoreResult<&mut Session> {
        match self.sessions.entry(id.into()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let session = Session::from_config(&self.defaults)?;
                info!(stream = %entry.key(), exercise = session.exercise().key(), "Session opened");
                Ok(entry.insert(session))
            }
        }
    }

    pub fn get(&self, id: &StreamId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &StreamId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Tear down a stream's session, returning its final state
    pub fn close(&mut self, id: &StreamId) -> Option<Session> {
        let session = self.sessions.remove(id)?;
        info!(
            stream = %id,
            sets = session.set_count(),
            reps = session.rep_count(),
            "Session closed"
        );
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn stream_ids(&self) -> impl Iterator<Item = &StreamId> {
        self.sessions.keys()
    }
}
