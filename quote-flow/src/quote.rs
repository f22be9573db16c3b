use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::{
    answers::AnswerRecord,
    pacing::{Pacer, Pause},
    pricing::{ExcessBreakdown, QuoteResult, estimate_excess, resolve},
};

pub const QUOTE_VALIDITY_DAYS: u32 = 30;

/// A priced quote for a completed answer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub reference: String,
    pub price: QuoteResult,
    pub excess: ExcessBreakdown,
    pub valid_for_days: u32,
}

impl Quote {
    /// Price the record straight away
    pub fn for_record(record: &AnswerRecord) -> Self {
        Self {
            reference: format!("QTE-{:08X}", rand::random::<u32>()),
            price: resolve(record.cover_type.as_ref()),
            excess: estimate_excess(record),
            valid_for_days: QUOTE_VALIDITY_DAYS,
        }
    }
}

/// Produces quotes, taking the generation pause first
#[derive(Clone)]
pub struct QuoteGenerator {
    pacer: Arc<dyn Pacer>,
}

impl QuoteGenerator {
    pub fn new(pacer: Arc<dyn Pacer>) -> Self {
        Self { pacer }
    }

    pub async fn generate(&self, record: &AnswerRecord) -> Quote {
        self.pacer.pause(Pause::QuoteGeneration).await;
        let quote = Quote::for_record(record);
        info!(
            reference = %quote.reference,
            cover = %quote.price.cover_type_label,
            weekly = quote.price.weekly_price,
            excess = quote.excess.total,
            "quote generated"
        );
        quote
    }
}
