use serde::Serialize;
use std::fmt;

use crate::{answers::AnswerRecord, pricing::cover_label, quote::Quote};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarySection {
    pub title: String,
    pub lines: Vec<String>,
}

impl SummarySection {
    fn new(title: &str, lines: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            lines,
        }
    }
}

/// Review of a finished answer record, with the quote once one exists
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub sections: Vec<SummarySection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
    pub answers: AnswerRecord,
}

fn or_blank(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "Not specified",
    }
}

impl SummaryView {
    pub fn review(record: &AnswerRecord) -> Self {
        let car = match (&record.registration, record.use_registration) {
            (Some(registration), Some(true)) => format!("Registration: {registration}"),
            _ => format!(
                "{} {} {} ({})",
                or_blank(&record.car_year),
                or_blank(&record.car_make),
                or_blank(&record.car_model),
                or_blank(&record.body_type)
            ),
        };

        let usage = vec![
            format!("Address: {}", or_blank(&record.address)),
            format!(
                "Purpose: {}",
                record.main_purpose.map(|p| p.label()).unwrap_or("Not specified")
            ),
            format!("Under finance: {}", yes_no(record.under_finance)),
        ];

        let cover_start = record
            .cover_start_date
            .map(|date| date.format("%-d %B %Y").to_string())
            .unwrap_or_else(|| "Not specified".to_string());

        let mut driver = Vec::new();
        if let Some(age) = record.age {
            driver.push(format!("Age: {age} years old"));
        }
        if let Some(license_age) = record.license_age {
            driver.push(format!("Licensed at age: {license_age}"));
        }
        driver.push(format!("Recent accidents: {}", yes_no(record.has_accidents)));
        if !record.additional_drivers.is_empty() {
            driver.push(format!(
                "Additional drivers: {}",
                record.additional_drivers.len()
            ));
        }

        Self {
            sections: vec![
                SummarySection::new("Car Details", vec![car]),
                SummarySection::new("Location & Usage", usage),
                SummarySection::new("Cover Start", vec![cover_start]),
                SummarySection::new("Driver Details", driver),
                SummarySection::new(
                    "Cover Type",
                    vec![cover_label(record.cover_type.as_ref())],
                ),
            ],
            quote: None,
            answers: record.clone(),
        }
    }

    pub fn with_quote(record: &AnswerRecord, quote: Quote) -> Self {
        Self {
            quote: Some(quote),
            ..Self::review(record)
        }
    }

    fn quote_lines(&self, quote: &Quote) -> Vec<String> {
        let mut lines = vec![
            format!(
                "{}: ${} per week",
                quote.price.cover_type_label, quote.price.weekly_price
            ),
            format!("or ${} annually", quote.price.annual_price),
            format!("Quote valid for {} days", quote.valid_for_days),
            format!("Reference: {}", quote.reference),
            format!("Excess: ${}", quote.excess.total),
        ];
        if let Some(address) = &self.answers.address {
            let garage = address.split(',').next().unwrap_or(address).trim();
            lines.push(format!("Garaged at: {garage}"));
        }
        if let Some(age) = self.answers.age {
            lines.push(format!("Main driver: {age} years old"));
        }
        lines
    }
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "{}", section.title)?;
            for line in &section.lines {
                writeln!(f, "  {line}")?;
            }
        }
        if let Some(quote) = &self.quote {
            writeln!(f, "Your Quote")?;
            for line in self.quote_lines(quote) {
                writeln!(f, "  {line}")?;
            }
        }
        Ok(())
    }
}
