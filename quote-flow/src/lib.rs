pub mod answers;
pub mod chat;
pub mod coerce;
pub mod controller;
pub mod error;
pub mod pacing;
pub mod pricing;
pub mod quote;
pub mod runner;
pub mod sequence;
pub mod step;
pub mod storage;
pub mod summary;

// Re-export commonly used types
pub use answers::{AdditionalDriver, AnswerRecord, CoverType, DriverField, Field, UsagePurpose};
pub use chat::{ChatHistory, ChatMessage, MessageRole};
pub use controller::{Progress, StepController, StepState};
pub use error::{QuoteError, Result};
pub use pacing::{InstantPacer, Pacer, Pause, TokioPacer};
pub use pricing::{ExcessBreakdown, QuoteResult, estimate_excess, resolve};
pub use quote::{Quote, QuoteGenerator};
pub use runner::{InputEvent, QuoteRunner, RunResult, RunStatus};
pub use sequence::{QuestionSequence, SequenceBuilder};
pub use step::{InputKind, QuestionSpec, Step, StepCondition, StepRule};
pub use storage::{InMemorySessionStorage, Session, SessionStorage};
pub use summary::SummaryView;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn question(field: Field, prompt: &str) -> QuestionSpec {
        QuestionSpec {
            id: field.name().to_string(),
            prompt: prompt.to_string(),
            field,
            input: InputKind::FreeText,
            options: Vec::new(),
        }
    }

    fn step(id: &str, questions: Vec<QuestionSpec>) -> Step {
        Step {
            id: id.to_string(),
            title: id.to_string(),
            questions,
            rule: StepRule::Answered,
            condition: None,
        }
    }

    #[tokio::test]
    async fn test_simple_sequence_execution() {
        let sequence = SequenceBuilder::new("mini")
            .title("Mini quote")
            .add_step(step("make", vec![question(Field::CarMake, "Make?")]))
            .add_step(step("cover", vec![question(Field::CoverType, "Cover?")]))
            .build()
            .unwrap();

        let runner = QuoteRunner::new(Arc::new(sequence), Arc::new(InMemorySessionStorage::new()));
        let id = runner
            .start(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
            .await
            .unwrap();

        let first = runner.run(&id, InputEvent::Reply("Mazda".into())).await.unwrap();
        assert_eq!(first.status, RunStatus::WaitingForInput);

        let done = runner
            .run(&id, InputEvent::Reply("Third Party Property".into()))
            .await
            .unwrap();
        let RunStatus::Completed(record) = done.status else {
            panic!("sequence should be complete");
        };
        assert_eq!(record.car_make.as_deref(), Some("Mazda"));

        let quote = QuoteGenerator::new(Arc::new(InstantPacer)).generate(&record).await;
        assert_eq!(quote.price.weekly_price, 42);
        assert_eq!(quote.excess.total, 500);
    }

    #[tokio::test]
    async fn test_storage() {
        let storage = InMemorySessionStorage::new();
        let session = Session::new("session1", "chat", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());

        storage.save(session).await.unwrap();
        let retrieved = storage.get("session1").await.unwrap();
        assert_eq!(retrieved.unwrap().sequence_id, "chat");

        storage.delete("session1").await.unwrap();
        assert!(storage.get("session1").await.unwrap().is_none());
    }
}
