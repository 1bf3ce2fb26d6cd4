use std::fmt;

use serde::{Deserialize, Serialize};

use crate::answers::{Answer, AnswerValue};
use crate::state::SessionState;
use crate::user_data::{UserData, UserDataField, strip_country_prefix};

/// Receives the session state after every mutation.
pub trait SessionObserver: Send {
    fn on_change(&mut self, state: &SessionState);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionState) + Send,
{
    fn on_change(&mut self, state: &SessionState) {
        self(state)
    }
}

/// Identifies one incarnation of a session; bumped on every reset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owns a [`SessionState`] and exposes the only sanctioned ways to change it.
#[derive(Default)]
pub struct SessionStore {
    state: SessionState,
    epoch: SessionEpoch,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("epoch", &self.epoch)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a persisted state, routing every field through the
    /// regular setters so loaded data obeys the same invariants as typed data.
    pub fn from_state(state: SessionState) -> Self {
        let mut store = Self::new();
        for answer in state.answers {
            store.upsert(answer.question_id, answer.value);
        }
        for field in UserDataField::ALL {
            store.write_field(field, state.user_data.get(field));
        }
        store.state.current_step = state.current_step;
        store
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user_data(&self) -> &UserData {
        &self.state.user_data
    }

    pub fn answers(&self) -> &[Answer] {
        &self.state.answers
    }

    pub fn answer(&self, question_id: &str) -> Option<&AnswerValue> {
        self.state.answer(question_id)
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Records `value` for `question_id`, replacing an earlier answer in place.
    pub fn set_answer(&mut self, question_id: impl Into<String>, value: impl Into<AnswerValue>) {
        let question_id = question_id.into();
        tracing::debug!(question_id = %question_id, "set answer");
        self.upsert(question_id, value.into());
        self.notify();
    }

    /// Drops the answer for `question_id`, if any.
    pub fn remove_answer(&mut self, question_id: &str) -> Option<Answer> {
        let idx = self
            .state
            .answers
            .iter()
            .position(|answer| answer.question_id == question_id)?;
        let removed = self.state.answers.remove(idx);
        tracing::debug!(question_id, "removed answer");
        self.notify();
        Some(removed)
    }

    /// Writes one contact field. Phone input loses any leading `+<digits>` prefix.
    pub fn set_user_data_field(&mut self, field: UserDataField, value: &str) {
        tracing::debug!(field = %field, "set user data field");
        self.write_field(field, value);
        self.notify();
    }

    pub fn advance_step(&mut self) {
        self.state.current_step = self.state.current_step.saturating_add(1);
        tracing::debug!(step = self.state.current_step, "advanced step");
        self.notify();
    }

    pub fn retreat_step(&mut self) {
        self.state.current_step = self.state.current_step.saturating_sub(1);
        tracing::debug!(step = self.state.current_step, "retreated step");
        self.notify();
    }

    pub fn set_step(&mut self, step: usize) {
        self.state.current_step = step;
        tracing::debug!(step, "set step");
        self.notify();
    }

    /// Replaces the state with a fresh empty one and starts a new epoch.
    pub fn reset(&mut self) {
        self.state = SessionState::new();
        self.epoch = self.epoch.next();
        tracing::debug!(epoch = %self.epoch, "session reset");
        self.notify();
    }

    fn upsert(&mut self, question_id: String, value: AnswerValue) {
        match self
            .state
            .answers
            .iter_mut()
            .find(|answer| answer.question_id == question_id)
        {
            Some(existing) => existing.value = value,
            None => self.state.answers.push(Answer { question_id, value }),
        }
    }

    fn write_field(&mut self, field: UserDataField, value: &str) {
        let value = match field {
            UserDataField::Phone => strip_country_prefix(value).into_owned(),
            _ => value.to_string(),
        };
        *self.state.user_data.slot_mut(field) = value;
    }

    fn notify(&mut self) {
        let state = &self.state;
        for observer in &mut self.observers {
            observer.on_change(state);
        }
    }
}
