use anyhow::Context as _;
use chrono::NaiveDate;
use clap::Args;
use quote_flow::{Pacer, QuestionSequence, TokioPacer};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;

/// Settings shared by both front ends
#[derive(Args, Debug, Clone)]
pub struct QuoteConfig {
    #[arg(
        long,
        global = true,
        env = "QUOTE_SEQUENCE",
        help = "YAML question table to use instead of the built-in one"
    )]
    pub sequence: Option<PathBuf>,
    #[arg(long, global = true, help = "Date to treat as today (YYYY-MM-DD)")]
    pub today: Option<NaiveDate>,
    #[arg(long, global = true, env = "QUOTE_TYPING_DELAY_MS", default_value_t = 1500)]
    pub typing_delay_ms: u64,
    #[arg(long, global = true, env = "QUOTE_REVEAL_DELAY_MS", default_value_t = 1000)]
    pub reveal_delay_ms: u64,
    #[arg(long, global = true, env = "QUOTE_GENERATION_DELAY_MS", default_value_t = 2000)]
    pub generation_delay_ms: u64,
    #[arg(long, global = true, help = "Print the final summary as JSON")]
    pub json: bool,
}

impl QuoteConfig {
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn pacer(&self) -> Arc<dyn Pacer> {
        Arc::new(TokioPacer::new(
            Duration::from_millis(self.typing_delay_ms),
            Duration::from_millis(self.reveal_delay_ms),
            Duration::from_millis(self.generation_delay_ms),
        ))
    }

    /// The table given with `--sequence`, or the built-in one
    pub async fn load_sequence(
        &self,
        builtin: fn() -> quote_flow::Result<QuestionSequence>,
    ) -> anyhow::Result<Arc<QuestionSequence>> {
        let sequence = match &self.sequence {
            Some(path) => {
                let source = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading question table {}", path.display()))?;
                QuestionSequence::from_yaml(&source)
                    .with_context(|| format!("loading question table {}", path.display()))?
            }
            None => builtin()?,
        };
        info!(sequence = %sequence.id(), steps = sequence.len(), "question table loaded");
        Ok(Arc::new(sequence))
    }
}
