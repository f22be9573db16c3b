//! Static price table and excess estimate.
//!
//! Weekly and annual figures are kept exactly as published; the annual price
//! is not a fixed multiple of the weekly one.

use serde::Serialize;

use crate::answers::{AnswerRecord, CoverType};

pub const BASIC_EXCESS: u32 = 500;
pub const YOUNG_DRIVER_EXCESS: u32 = 400;
pub const INEXPERIENCED_DRIVER_EXCESS: u32 = 400;
/// Applies when someone not listed on the policy has an accident
pub const UNLISTED_DRIVER_EXCESS: u32 = 1600;

const YOUNG_DRIVER_AGE: u32 = 25;
const MIN_EXPERIENCE_YEARS: i64 = 2;
const ASSUMED_AGE: u32 = 25;
const ASSUMED_EXPERIENCE_YEARS: i64 = 5;

struct PriceRow {
    cover: CoverType,
    label: &'static str,
    weekly: u32,
    annual: u32,
}

static PRICE_TABLE: [PriceRow; 4] = [
    PriceRow {
        cover: CoverType::Comprehensive,
        label: "Comprehensive",
        weekly: 89,
        annual: 4628,
    },
    PriceRow {
        cover: CoverType::ThirdParty,
        label: "Third Party Property",
        weekly: 42,
        annual: 2184,
    },
    PriceRow {
        cover: CoverType::ThirdPartyFire,
        label: "Third Party Fire & Theft",
        weekly: 58,
        annual: 3016,
    },
    PriceRow {
        cover: CoverType::CompleteCare,
        label: "Complete Care®",
        weekly: 105,
        annual: 5460,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub cover_type_label: String,
    pub weekly_price: u32,
    pub annual_price: u32,
}

fn row(cover: Option<&CoverType>) -> &'static PriceRow {
    cover
        .and_then(|cover| PRICE_TABLE.iter().find(|row| &row.cover == cover))
        .unwrap_or(&PRICE_TABLE[0])
}

/// Display name of a cover tier. Unlisted covers keep their own text.
pub fn cover_label(cover: Option<&CoverType>) -> String {
    match cover {
        Some(CoverType::Unlisted(text)) => text.clone(),
        other => row(other).label.to_string(),
    }
}

/// Price a cover tier. Anything outside the table is priced as comprehensive.
pub fn resolve(cover: Option<&CoverType>) -> QuoteResult {
    let row = row(cover);
    QuoteResult {
        cover_type_label: cover_label(cover),
        weekly_price: row.weekly,
        annual_price: row.annual,
    }
}

/// What the insured would pay towards a claim, split by component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcessBreakdown {
    pub basic: u32,
    pub young_driver: u32,
    pub inexperienced_driver: u32,
    pub total: u32,
    /// Some additional driver is under 25
    pub young_additional_driver: bool,
    /// Some additional driver has under 2 years of experience
    pub inexperienced_additional_driver: bool,
    pub unlisted_driver: u32,
}

/// Excess for the main driver. The additional driver flags are informational
/// and do not change the total.
pub fn estimate_excess(record: &AnswerRecord) -> ExcessBreakdown {
    let age = record.age.unwrap_or(ASSUMED_AGE);
    let experience = record
        .driving_experience()
        .unwrap_or(ASSUMED_EXPERIENCE_YEARS);

    let young_driver = if age < YOUNG_DRIVER_AGE {
        YOUNG_DRIVER_EXCESS
    } else {
        0
    };
    let inexperienced_driver = if experience < MIN_EXPERIENCE_YEARS {
        INEXPERIENCED_DRIVER_EXCESS
    } else {
        0
    };

    let drivers = &record.additional_drivers;
    ExcessBreakdown {
        basic: BASIC_EXCESS,
        young_driver,
        inexperienced_driver,
        total: BASIC_EXCESS + young_driver + inexperienced_driver,
        young_additional_driver: drivers.iter().any(|d| d.age < YOUNG_DRIVER_AGE),
        inexperienced_additional_driver: drivers
            .iter()
            .any(|d| i64::from(d.experience) < MIN_EXPERIENCE_YEARS),
        unlisted_driver: UNLISTED_DRIVER_EXCESS,
    }
}
