use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    answers::{AnswerRecord, DriverField, Field},
    coerce::{apply_driver_field, coerce},
    error::{QuoteError, Result},
    sequence::QuestionSequence,
    step::{QuestionSpec, Step},
    storage::Session,
};

/// Position of a session within its sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    /// Index of the active step; equals the sequence length once complete
    pub current_index: usize,
    /// Options offered by the active step
    pub revealed_choices: Vec<String>,
    pub complete: bool,
}

/// Outcome of a successful [`StepController::advance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Moved on to the step at `index`
    Moved { index: usize },
    /// The last step was left; carries a copy of the finished answers
    Completed(AnswerRecord),
}

/// Drives one session through a question sequence.
///
/// Time never enters the controller except through the session's fixed
/// `today`, so every operation is synchronous and repeatable.
#[derive(Debug, Clone)]
pub struct StepController {
    sequence: Arc<QuestionSequence>,
    session: Session,
}

impl StepController {
    /// Start a fresh session at the first step
    pub fn new(sequence: Arc<QuestionSequence>, session_id: impl Into<String>, today: NaiveDate) -> Self {
        let session = Session::new(session_id, sequence.id(), today);
        let mut controller = Self { sequence, session };
        controller.start();
        controller
    }

    /// Pick up a stored session
    pub fn resume(sequence: Arc<QuestionSequence>, session: Session) -> Result<Self> {
        if session.sequence_id != sequence.id() {
            return Err(QuoteError::SequenceMismatch {
                session: session.sequence_id,
                sequence: sequence.id().to_string(),
            });
        }
        let index = session.state.current_index;
        if index > sequence.len() || (index == sequence.len()) != session.state.complete {
            return Err(QuoteError::OutOfRange {
                index,
                len: sequence.len(),
            });
        }
        Ok(Self { sequence, session })
    }

    /// Reset to the first step with an empty answer record
    pub fn start(&mut self) {
        self.session.answers = AnswerRecord::default();
        self.session.status_message = None;
        self.session.state.complete = false;
        self.enter(0);
        info!(session_id = %self.session.id, sequence = %self.sequence.id(), "quote session started");
    }

    fn enter(&mut self, index: usize) {
        self.session.state.current_index = index;
        self.session.state.revealed_choices = self
            .sequence
            .step(index)
            .map(Step::choices)
            .unwrap_or_default();
    }

    /// The active step. Fails with `SessionComplete` once every step has
    /// been answered.
    pub fn current_step(&self) -> Result<&Step> {
        if self.session.state.complete {
            return Err(QuoteError::SessionComplete);
        }
        let index = self.session.state.current_index;
        self.sequence.step(index).ok_or(QuoteError::OutOfRange {
            index,
            len: self.sequence.len(),
        })
    }

    /// The question of a single-question (chat) step
    pub fn current_question(&self) -> Result<&QuestionSpec> {
        let step = self.current_step()?;
        step.sole_question()
            .ok_or_else(|| QuoteError::NotSingleQuestion(step.id.clone()))
    }

    /// Coerce `raw` and store it under `field`, which the active step must ask
    pub fn submit_answer(&mut self, field: Field, raw: &str) -> Result<()> {
        let step = self.current_step()?;
        if !step.asks(field) {
            return Err(QuoteError::FieldNotInStep {
                field,
                step: step.id.clone(),
            });
        }
        let step_id = step.id.clone();

        let value = coerce(field, raw)?;
        self.session.answers.set(field, value)?;
        if field.is_branch() {
            debug!(
                session_id = %self.session.id,
                field = %field,
                branch = ?self.session.answers.flag(field),
                "branch recorded"
            );
        }
        debug!(
            session_id = %self.session.id,
            step = %step_id,
            field = %field,
            ready = self.can_advance(),
            "answer recorded"
        );
        Ok(())
    }

    /// Answer the only question of the active step
    pub fn submit(&mut self, raw: &str) -> Result<()> {
        let field = self.current_question()?.field;
        self.submit_answer(field, raw)
    }

    fn ensure_drivers_open(&self) -> Result<()> {
        let step = self.current_step()?;
        if step.collects_drivers() && self.session.answers.has_additional_drivers == Some(true) {
            Ok(())
        } else {
            Err(QuoteError::DriversDisabled)
        }
    }

    /// Append a blank driver entry and return its index
    pub fn add_driver(&mut self) -> Result<usize> {
        self.ensure_drivers_open()?;
        let drivers = &mut self.session.answers.additional_drivers;
        drivers.push(Default::default());
        Ok(drivers.len() - 1)
    }

    pub fn remove_driver(&mut self, index: usize) -> Result<()> {
        self.ensure_drivers_open()?;
        let drivers = &mut self.session.answers.additional_drivers;
        if index >= drivers.len() {
            return Err(QuoteError::DriverNotFound(index));
        }
        drivers.remove(index);
        Ok(())
    }

    pub fn update_driver(&mut self, index: usize, field: DriverField, raw: &str) -> Result<()> {
        self.ensure_drivers_open()?;
        let driver = self
            .session
            .answers
            .additional_drivers
            .get_mut(index)
            .ok_or(QuoteError::DriverNotFound(index))?;
        apply_driver_field(driver, field, raw);
        Ok(())
    }

    /// Unmet requirements of the active step
    pub fn missing(&self) -> Vec<String> {
        match self.current_step() {
            Ok(step) => step
                .rule
                .missing(step, &self.session.answers, self.session.today),
            Err(_) => Vec::new(),
        }
    }

    pub fn can_advance(&self) -> bool {
        self.current_step().is_ok() && self.missing().is_empty()
    }

    /// Leave the active step for the next one that applies, completing the
    /// session after the last
    pub fn advance(&mut self) -> Result<Progress> {
        let step = self.current_step()?;
        let missing = step
            .rule
            .missing(step, &self.session.answers, self.session.today);
        if !missing.is_empty() {
            return Err(QuoteError::NotReady {
                step: step.id.clone(),
                missing,
            });
        }

        let from = self.session.state.current_index;
        match self.sequence.next_applicable(from, &self.session.answers) {
            Some(next) => {
                self.enter(next);
                info!(session_id = %self.session.id, from, to = next, "advanced");
                Ok(Progress::Moved { index: next })
            }
            None => {
                self.session.state.current_index = self.sequence.len();
                self.session.state.revealed_choices.clear();
                self.session.state.complete = true;
                info!(session_id = %self.session.id, "all steps answered");
                Ok(Progress::Completed(self.session.answers.clone()))
            }
        }
    }

    /// Step back to the previous step that applies, keeping every answer.
    /// Returns false, changing nothing, when already at the first step.
    pub fn retreat(&mut self) -> bool {
        let from = self.session.state.current_index;
        match self.sequence.previous_applicable(from, &self.session.answers) {
            Some(previous) => {
                self.session.state.complete = false;
                self.enter(previous);
                info!(session_id = %self.session.id, from, to = previous, "retreated");
                true
            }
            None => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.session.state.complete
    }

    /// One-based number of the active step and the sequence length
    pub fn position(&self) -> (usize, usize) {
        let len = self.sequence.len();
        ((self.session.state.current_index + 1).min(len), len)
    }

    pub fn progress_percent(&self) -> u32 {
        let (number, len) = self.position();
        ((number as f64 / len as f64) * 100.0).round() as u32
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.session.answers
    }

    pub fn state(&self) -> &StepState {
        &self.session.state
    }

    pub fn today(&self) -> NaiveDate {
        self.session.today
    }

    pub fn sequence(&self) -> &QuestionSequence {
        &self.sequence
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.session.status_message = Some(message.into());
    }

    pub fn into_session(self) -> Session {
        self.session
    }
}
