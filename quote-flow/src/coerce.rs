//! Turns raw user input into typed answers.
//!
//! Both the chat and the wizard tables go through [`coerce`], so a field is
//! read the same way whichever front end collected it.

use chrono::NaiveDate;
use tracing::warn;

use crate::{
    answers::{AdditionalDriver, AnswerValue, CoverType, DriverField, Field, UsagePurpose},
    error::{QuoteError, Result},
};

static COVER_LABELS: [(&str, CoverType); 4] = [
    ("Comprehensive", CoverType::Comprehensive),
    ("Third Party Property", CoverType::ThirdParty),
    ("Third Party Fire & Theft", CoverType::ThirdPartyFire),
    ("Complete Care", CoverType::CompleteCare),
];

const DEFAULT_DRIVER_AGE: u32 = 16;
const DEFAULT_DRIVER_EXPERIENCE: u32 = 0;

/// Coerce `raw` into the value stored for `field`
pub fn coerce(field: Field, raw: &str) -> Result<AnswerValue> {
    let value = match field {
        f if f.is_flag() => AnswerValue::Flag(coerce_flag(f, raw)?),
        Field::MainPurpose => AnswerValue::Purpose(coerce_purpose(raw)),
        Field::CoverType => AnswerValue::Cover(coerce_cover(raw)),
        Field::Age | Field::LicenseAge => AnswerValue::Number(
            raw.trim()
                .parse::<u32>()
                .map_err(|_| coercion_error(field, raw))?,
        ),
        Field::CoverStartDate => AnswerValue::Date(
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| coercion_error(field, raw))?,
        ),
        Field::AdditionalDrivers => AnswerValue::Drivers(parse_driver_list(raw)?),
        Field::Registration => AnswerValue::Text(raw.to_uppercase()),
        _ => AnswerValue::Text(raw.to_string()),
    };
    Ok(value)
}

fn coercion_error(field: Field, raw: &str) -> QuoteError {
    QuoteError::Coercion {
        field,
        value: raw.to_string(),
    }
}

fn coerce_flag(field: Field, raw: &str) -> Result<bool> {
    match raw {
        "Yes" => Ok(true),
        "No" => Ok(false),
        _ => Err(coercion_error(field, raw)),
    }
}

fn coerce_purpose(raw: &str) -> UsagePurpose {
    if raw.contains("Private") {
        UsagePurpose::Private
    } else {
        UsagePurpose::Business
    }
}

fn coerce_cover(raw: &str) -> CoverType {
    if let Some((_, cover)) = COVER_LABELS.iter().find(|(label, _)| *label == raw) {
        return cover.clone();
    }
    let lowered = raw.to_lowercase();
    CoverType::from_id(&lowered).unwrap_or(CoverType::Unlisted(lowered))
}

/// Integer at the start of `raw`, after leading whitespace and an optional
/// sign. Trailing text is ignored, so "30 years" reads as 30.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let value = rest[..end].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
    });
    Some(if negative { -value } else { value })
}

/// Read a numeric driver sub-field. Input with no leading number falls back
/// to the form defaults (16 for age, 0 for experience); negative numbers are
/// stored as 0 so they never satisfy the minimum age.
pub fn driver_number(field: DriverField, raw: &str) -> u32 {
    match leading_integer(raw) {
        Some(value) if value < 0 => {
            warn!(field = ?field, input = %raw, "negative driver value, storing 0");
            0
        }
        Some(value) => u32::try_from(value).unwrap_or(u32::MAX),
        None => {
            let fallback = match field {
                DriverField::Experience => DEFAULT_DRIVER_EXPERIENCE,
                _ => DEFAULT_DRIVER_AGE,
            };
            warn!(field = ?field, input = %raw, fallback, "driver value is not a number, using default");
            fallback
        }
    }
}

pub fn apply_driver_field(driver: &mut AdditionalDriver, field: DriverField, raw: &str) {
    match field {
        DriverField::Name => driver.name = raw.to_string(),
        DriverField::Age => driver.age = driver_number(field, raw),
        DriverField::Experience => driver.experience = driver_number(field, raw),
    }
}

/// Parse chat input of the form `name, age, years driving`, with several
/// drivers separated by `;`. Age and experience may be left out.
pub fn parse_driver_list(raw: &str) -> Result<Vec<AdditionalDriver>> {
    let drivers = raw
        .split(';')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| parse_driver(entry).ok_or_else(|| coercion_error(Field::AdditionalDrivers, raw)))
        .collect::<Result<Vec<_>>>()?;

    if drivers.is_empty() {
        return Err(coercion_error(Field::AdditionalDrivers, raw));
    }
    Ok(drivers)
}

fn parse_driver(entry: &str) -> Option<AdditionalDriver> {
    let mut parts = entry.split(',').map(str::trim);
    let name = parts.next().filter(|name| !name.is_empty())?;

    let mut driver = AdditionalDriver {
        name: name.to_string(),
        ..Default::default()
    };
    if let Some(age) = parts.next() {
        apply_driver_field(&mut driver, DriverField::Age, age);
    }
    if let Some(experience) = parts.next() {
        apply_driver_field(&mut driver, DriverField::Experience, experience);
    }
    Some(driver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_yes_and_no_as_authored() {
        assert_eq!(
            coerce(Field::UnderFinance, "Yes").unwrap(),
            AnswerValue::Flag(true)
        );
        assert_eq!(
            coerce(Field::HasAccidents, "No").unwrap(),
            AnswerValue::Flag(false)
        );
        assert!(matches!(
            coerce(Field::BusinessRegistered, "yes"),
            Err(QuoteError::Coercion { field: Field::BusinessRegistered, .. })
        ));
    }

    #[test]
    fn main_purpose_keys_off_private() {
        assert_eq!(
            coerce(Field::MainPurpose, "Business use (Used for business purposes)").unwrap(),
            AnswerValue::Purpose(UsagePurpose::Business)
        );
        assert_eq!(
            coerce(Field::MainPurpose, "Private use (Personal day-to-day)").unwrap(),
            AnswerValue::Purpose(UsagePurpose::Private)
        );
    }

    #[test]
    fn cover_labels_map_to_tiers() {
        assert_eq!(
            coerce(Field::CoverType, "Third Party Fire & Theft").unwrap(),
            AnswerValue::Cover(CoverType::ThirdPartyFire)
        );
        assert_eq!(
            coerce(Field::CoverType, "Complete Care").unwrap(),
            AnswerValue::Cover(CoverType::CompleteCare)
        );
        assert_eq!(
            coerce(Field::CoverType, "THIRD-PARTY").unwrap(),
            AnswerValue::Cover(CoverType::ThirdParty)
        );
        assert_eq!(
            coerce(Field::CoverType, "Gold Plus").unwrap(),
            AnswerValue::Cover(CoverType::Unlisted("gold plus".into()))
        );
    }

    #[test]
    fn coercion_is_idempotent() {
        for (field, raw) in [
            (Field::CoverType, "Comprehensive"),
            (Field::MainPurpose, "Private use (Personal day-to-day)"),
            (Field::Registration, "abc123"),
            (Field::Age, "42"),
            (Field::AdditionalDrivers, "Jane, 30, 12"),
        ] {
            assert_eq!(coerce(field, raw).unwrap(), coerce(field, raw).unwrap());
        }
    }

    #[test]
    fn top_level_ages_must_be_numbers() {
        assert_eq!(coerce(Field::Age, " 25 ").unwrap(), AnswerValue::Number(25));
        assert!(matches!(
            coerce(Field::LicenseAge, "eighteen"),
            Err(QuoteError::Coercion { field: Field::LicenseAge, .. })
        ));
    }

    #[test]
    fn registration_is_upper_cased_and_text_passes_through() {
        assert_eq!(
            coerce(Field::Registration, "abc123").unwrap(),
            AnswerValue::Text("ABC123".into())
        );
        assert_eq!(
            coerce(Field::CarModel, "Corolla Ascent").unwrap(),
            AnswerValue::Text("Corolla Ascent".into())
        );
    }

    #[test]
    fn cover_start_dates_are_iso() {
        assert_eq!(
            coerce(Field::CoverStartDate, "2026-03-01").unwrap(),
            AnswerValue::Date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        );
        assert!(coerce(Field::CoverStartDate, "01/03/2026").is_err());
    }

    #[test]
    fn driver_numbers_fall_back_to_form_defaults() {
        assert_eq!(driver_number(DriverField::Age, "abc"), 16);
        assert_eq!(driver_number(DriverField::Experience, ""), 0);
        assert_eq!(driver_number(DriverField::Age, "31"), 31);
    }

    #[test]
    fn driver_numbers_read_leading_digits() {
        assert_eq!(driver_number(DriverField::Age, "30abc"), 30);
        assert_eq!(driver_number(DriverField::Experience, " 12 years"), 12);
        assert_eq!(driver_number(DriverField::Age, "+21"), 21);
        assert_eq!(driver_number(DriverField::Age, "99999999999"), u32::MAX);
    }

    #[test]
    fn negative_driver_numbers_are_not_defaulted() {
        assert_eq!(driver_number(DriverField::Age, "-5"), 0);
        assert_eq!(driver_number(DriverField::Experience, "-2"), 0);
        assert_eq!(driver_number(DriverField::Age, "-"), 16);

        let drivers = parse_driver_list("Jane, -5").unwrap();
        assert!(!drivers[0].is_complete());
    }

    #[test]
    fn driver_lists_parse_from_chat_lines() {
        let drivers = parse_driver_list("Jane, 30, 12; Tom, 19").unwrap();
        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].name, "Jane");
        assert_eq!(drivers[0].experience, 12);
        assert_eq!(drivers[1].age, 19);
        assert_eq!(drivers[1].experience, 0);

        assert!(parse_driver_list(" , 30").is_err());
        assert!(parse_driver_list("  ").is_err());
    }
}
