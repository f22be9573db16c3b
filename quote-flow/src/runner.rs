//! QuoteRunner – loads a session, applies exactly **one** input event, and persists the
//! updated session back to storage.
//!
//! ## When should you use `QuoteRunner`?
//! * **Front ends that answer one event at a time**: a chat reply, a wizard field edit or a
//!   button press each become one [`InputEvent`], and the session is saved for the next one.
//! * **Several concurrent sessions**: the runner is cheap to clone and shares its storage.
//!
//! ## When should you use `StepController` directly?
//! * **Tests and scripted runs** where keeping the whole session in memory is simpler.
//! * **Custom persistence logic**, via [`StepController::resume`] and
//!   [`StepController::into_session`].
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use quote_flow::{InMemorySessionStorage, InputEvent, QuestionSequence, QuoteRunner};
//! # async fn demo() -> quote_flow::Result<()> {
//! let runner = QuoteRunner::new(
//!     Arc::new(QuestionSequence::chat()?),
//!     Arc::new(InMemorySessionStorage::new()),
//! );
//! let today = chrono::Utc::now().date_naive();
//! let session_id = runner.start(today).await?;
//! let result = runner.run(&session_id, InputEvent::Reply("2020".into())).await?;
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    answers::{AnswerRecord, DriverField, Field},
    controller::{Progress, StepController},
    error::{QuoteError, Result},
    sequence::QuestionSequence,
    storage::SessionStorage,
};

/// One thing the user did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Chat reply to the single question of the active step. Advances when
    /// the reply satisfies the step.
    Reply(String),
    Answer { field: Field, value: String },
    AddDriver,
    RemoveDriver(usize),
    UpdateDriver {
        index: usize,
        field: DriverField,
        value: String,
    },
    Advance,
    Retreat,
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    WaitingForInput,
    /// Every step is answered; carries the finished record
    Completed(AnswerRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub status: RunStatus,
    pub status_message: Option<String>,
}

/// High-level helper that orchestrates the common _load → apply → save_ pattern.
#[derive(Clone)]
pub struct QuoteRunner {
    sequence: Arc<QuestionSequence>,
    storage: Arc<dyn SessionStorage>,
}

impl QuoteRunner {
    pub fn new(sequence: Arc<QuestionSequence>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { sequence, storage }
    }

    pub fn sequence(&self) -> &Arc<QuestionSequence> {
        &self.sequence
    }

    /// Create and store a new session, returning its id
    pub async fn start(&self, today: NaiveDate) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let controller = StepController::new(self.sequence.clone(), id.clone(), today);
        self.storage.save(controller.into_session()).await?;
        Ok(id)
    }

    /// Load a stored session into a controller, for rendering
    pub async fn controller(&self, session_id: &str) -> Result<StepController> {
        let session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| QuoteError::SessionNotFound(session_id.to_string()))?;
        StepController::resume(self.sequence.clone(), session)
    }

    /// Apply **exactly one** event to the session and persist it.
    ///
    /// A rejected event leaves the stored session untouched and returns the error.
    pub async fn run(&self, session_id: &str, event: InputEvent) -> Result<RunResult> {
        // 1. Load session
        let mut controller = self.controller(session_id).await?;

        // 2. Apply the event
        debug!(session_id, event = ?event, "applying input event");
        let (status, message) = apply(&mut controller, event)?;
        if let Some(message) = &message {
            controller.set_status_message(message.clone());
        }

        // 3. Persist new state so the next call starts where we left off
        self.storage.save(controller.into_session()).await?;

        Ok(RunResult {
            status,
            status_message: message,
        })
    }
}

fn waiting(message: Option<String>) -> Result<(RunStatus, Option<String>)> {
    Ok((RunStatus::WaitingForInput, message))
}

fn advance(controller: &mut StepController) -> Result<(RunStatus, Option<String>)> {
    match controller.advance()? {
        Progress::Moved { .. } => waiting(None),
        Progress::Completed(record) => Ok((
            RunStatus::Completed(record),
            Some("All steps complete".to_string()),
        )),
    }
}

fn apply(controller: &mut StepController, event: InputEvent) -> Result<(RunStatus, Option<String>)> {
    match event {
        InputEvent::Reply(raw) => {
            controller.submit(&raw)?;
            if controller.can_advance() {
                advance(controller)
            } else {
                let missing = controller.missing();
                warn!(session_id = %controller.session().id, ?missing, "reply did not satisfy the step");
                waiting(Some(format!("Still needed: {}", missing.join(", "))))
            }
        }
        InputEvent::Answer { field, value } => {
            controller.submit_answer(field, &value)?;
            waiting(None)
        }
        InputEvent::AddDriver => {
            let index = controller.add_driver()?;
            waiting(Some(format!("Driver {} added", index + 1)))
        }
        InputEvent::RemoveDriver(index) => {
            controller.remove_driver(index)?;
            waiting(Some(format!("Driver {} removed", index + 1)))
        }
        InputEvent::UpdateDriver { index, field, value } => {
            controller.update_driver(index, field, &value)?;
            waiting(None)
        }
        InputEvent::Advance => advance(controller),
        InputEvent::Retreat => {
            if controller.retreat() {
                waiting(None)
            } else {
                waiting(Some("Already at the first step".to_string()))
            }
        }
        InputEvent::Restart => {
            controller.start();
            waiting(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySessionStorage;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn runner(sequence: QuestionSequence) -> QuoteRunner {
        QuoteRunner::new(Arc::new(sequence), Arc::new(InMemorySessionStorage::new()))
    }

    #[tokio::test]
    async fn replies_advance_one_step_at_a_time() {
        let runner = runner(QuestionSequence::chat().unwrap());
        let id = runner.start(today()).await.unwrap();

        let result = runner.run(&id, InputEvent::Reply("2020".into())).await.unwrap();
        assert_eq!(result.status, RunStatus::WaitingForInput);

        let controller = runner.controller(&id).await.unwrap();
        assert_eq!(controller.current_step().unwrap().id, "carMake");
        assert_eq!(controller.answers().car_year.as_deref(), Some("2020"));
    }

    #[tokio::test]
    async fn rejected_events_leave_the_session_untouched() {
        let runner = runner(QuestionSequence::wizard().unwrap());
        let id = runner.start(today()).await.unwrap();

        let err = runner.run(&id, InputEvent::Advance).await.unwrap_err();
        assert!(matches!(err, QuoteError::NotReady { .. }));

        let err = runner
            .run(
                &id,
                InputEvent::Answer {
                    field: Field::UseRegistration,
                    value: "maybe".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::Coercion { .. }));

        let controller = runner.controller(&id).await.unwrap();
        assert_eq!(controller.answers(), &AnswerRecord::default());
    }

    #[tokio::test]
    async fn incomplete_driver_reply_waits_with_a_message() {
        let runner = runner(QuestionSequence::chat().unwrap());
        let id = runner.start(today()).await.unwrap();
        for reply in [
            "2020", "Toyota", "Camry", "Sedan", "1 Main St", "No",
            "Private use (Personal day-to-day)", "No", "Male", "30", "20", "No", "Yes",
        ] {
            runner.run(&id, InputEvent::Reply(reply.into())).await.unwrap();
        }

        let result = runner
            .run(&id, InputEvent::Reply("Jane, 12".into()))
            .await
            .unwrap();
        assert_eq!(result.status, RunStatus::WaitingForInput);
        assert!(result.status_message.unwrap().contains("driver 1"));

        runner
            .run(&id, InputEvent::Reply("Jane, 30, 12".into()))
            .await
            .unwrap();
        let result = runner
            .run(&id, InputEvent::Reply("Comprehensive".into()))
            .await
            .unwrap();
        match result.status {
            RunStatus::Completed(record) => assert_eq!(record.additional_drivers.len(), 1),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_sessions_are_reported() {
        let runner = runner(QuestionSequence::chat().unwrap());
        let err = runner.run("missing", InputEvent::Advance).await.unwrap_err();
        assert!(matches!(err, QuoteError::SessionNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn retreat_at_the_start_is_a_no_op() {
        let runner = runner(QuestionSequence::wizard().unwrap());
        let id = runner.start(today()).await.unwrap();
        let result = runner.run(&id, InputEvent::Retreat).await.unwrap();
        assert_eq!(result.status_message.as_deref(), Some("Already at the first step"));
    }
}
