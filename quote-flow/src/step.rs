use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::answers::{AnswerRecord, Field};

/// Latest cover start date that can be picked, counted from today
pub const MAX_COVER_START_DAYS: u64 = 42;

/// How a question expects to be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    FreeText,
    SingleChoice,
    /// A choice from a long list, rendered as a dropdown
    LongList,
    DatePick,
}

impl InputKind {
    pub fn has_options(&self) -> bool {
        matches!(self, InputKind::SingleChoice | InputKind::LongList)
    }
}

/// One question asking for a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSpec {
    pub id: String,
    pub prompt: String,
    pub field: Field,
    pub input: InputKind,
    pub options: Vec<String>,
}

/// What has to hold before a step can be left
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRule {
    /// Either the registration, or year, make, model and body type
    CarDetails,
    LocationUsage,
    CoverStart,
    DriverDetails,
    AdditionalDrivers,
    /// Informational, always ready
    ExcessInfo,
    CoverType,
    /// Every question on the step has an answer
    #[default]
    Answered,
}

impl StepRule {
    /// Requirements of `step` that `answers` does not meet yet, empty when the
    /// step is ready to be left
    pub fn missing(&self, step: &Step, answers: &AnswerRecord, today: NaiveDate) -> Vec<String> {
        let mut missing = Vec::new();
        let mut require = |field: Field| {
            if !answers.is_answered(field) {
                missing.push(field.name().to_string());
            }
        };

        match self {
            StepRule::CarDetails => {
                if answers.use_registration == Some(true) {
                    require(Field::Registration);
                } else {
                    for field in [Field::CarYear, Field::CarMake, Field::CarModel, Field::BodyType] {
                        require(field);
                    }
                }
            }
            StepRule::LocationUsage => {
                for field in [
                    Field::Address,
                    Field::UnderFinance,
                    Field::MainPurpose,
                    Field::BusinessRegistered,
                ] {
                    require(field);
                }
            }
            StepRule::CoverStart => match answers.cover_start_date {
                None => require(Field::CoverStartDate),
                Some(date) if !cover_start_in_range(date, today) => missing.push(format!(
                    "{} between {} and {}",
                    Field::CoverStartDate,
                    today,
                    latest_cover_start(today)
                )),
                Some(_) => {}
            },
            StepRule::DriverDetails => {
                for field in [Field::Gender, Field::Age, Field::LicenseAge, Field::HasAccidents] {
                    require(field);
                }
            }
            StepRule::AdditionalDrivers => match answers.has_additional_drivers {
                None => require(Field::HasAdditionalDrivers),
                Some(false) => {}
                Some(true) if answers.additional_drivers.is_empty() => {
                    missing.push("at least one additional driver".to_string())
                }
                Some(true) => {
                    for (index, driver) in answers.additional_drivers.iter().enumerate() {
                        if !driver.is_complete() {
                            missing.push(format!("name and age (16+) for driver {}", index + 1));
                        }
                    }
                }
            },
            StepRule::ExcessInfo => {}
            StepRule::CoverType => require(Field::CoverType),
            StepRule::Answered => {
                for question in &step.questions {
                    require(question.field);
                }
            }
        }
        missing
    }
}

pub fn latest_cover_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(MAX_COVER_START_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Cover may start any day from today up to and including today + 42 days
pub fn cover_start_in_range(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today && date <= latest_cover_start(today)
}

/// Gate that decides whether a step is visited at all. Tables write it as a
/// YAML tag, e.g. `condition: !when_true hasAdditionalDrivers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCondition {
    WhenTrue(Field),
    WhenFalse(Field),
}

impl StepCondition {
    pub fn field(&self) -> Field {
        match self {
            StepCondition::WhenTrue(field) | StepCondition::WhenFalse(field) => *field,
        }
    }

    pub fn holds(&self, answers: &AnswerRecord) -> bool {
        match self {
            StepCondition::WhenTrue(field) => answers.flag(*field) == Some(true),
            StepCondition::WhenFalse(field) => answers.flag(*field) != Some(true),
        }
    }
}

/// A unit of the sequence: one chat question, or one wizard screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub questions: Vec<QuestionSpec>,
    pub rule: StepRule,
    pub condition: Option<StepCondition>,
}

impl Step {
    pub fn asks(&self, field: Field) -> bool {
        self.questions.iter().any(|q| q.field == field)
    }

    pub fn question(&self, field: Field) -> Option<&QuestionSpec> {
        self.questions.iter().find(|q| q.field == field)
    }

    /// The only question of a single-question step
    pub fn sole_question(&self) -> Option<&QuestionSpec> {
        match self.questions.as_slice() {
            [question] => Some(question),
            _ => None,
        }
    }

    pub fn applies(&self, answers: &AnswerRecord) -> bool {
        self.condition.is_none_or(|condition| condition.holds(answers))
    }

    /// Options offered while this step is active
    pub fn choices(&self) -> Vec<String> {
        self.questions
            .iter()
            .flat_map(|q| q.options.iter().cloned())
            .collect()
    }

    /// Whether additional driver entries are edited on this step
    pub fn collects_drivers(&self) -> bool {
        self.asks(Field::HasAdditionalDrivers) || self.asks(Field::AdditionalDrivers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AdditionalDriver;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn step(rule: StepRule) -> Step {
        Step {
            id: "step".into(),
            title: "Step".into(),
            questions: Vec::new(),
            rule,
            condition: None,
        }
    }

    #[test]
    fn car_details_follow_the_registration_branch() {
        let car = step(StepRule::CarDetails);
        let mut answers = AnswerRecord {
            use_registration: Some(true),
            ..Default::default()
        };
        assert_eq!(car.rule.missing(&car, &answers, today()), vec!["registration"]);

        answers.registration = Some("ABC123".into());
        assert!(car.rule.missing(&car, &answers, today()).is_empty());

        answers.use_registration = Some(false);
        assert_eq!(
            car.rule.missing(&car, &answers, today()),
            vec!["carYear", "carMake", "carModel", "bodyType"]
        );
    }

    #[test]
    fn cover_start_window_is_inclusive() {
        let cover = step(StepRule::CoverStart);
        let mut answers = AnswerRecord::default();
        for (offset, ready) in [(0, true), (42, true), (43, false)] {
            answers.cover_start_date = today().checked_add_days(Days::new(offset));
            assert_eq!(cover.rule.missing(&cover, &answers, today()).is_empty(), ready);
        }
        answers.cover_start_date = today().pred_opt();
        assert!(!cover.rule.missing(&cover, &answers, today()).is_empty());
    }

    #[test]
    fn additional_drivers_need_named_adults() {
        let drivers = step(StepRule::AdditionalDrivers);
        let mut answers = AnswerRecord {
            has_additional_drivers: Some(true),
            ..Default::default()
        };
        assert!(!drivers.rule.missing(&drivers, &answers, today()).is_empty());

        answers.additional_drivers.push(AdditionalDriver::default());
        assert_eq!(
            drivers.rule.missing(&drivers, &answers, today()),
            vec!["name and age (16+) for driver 1"]
        );

        answers.additional_drivers[0].name = "Jane".into();
        answers.additional_drivers[0].age = 30;
        assert!(drivers.rule.missing(&drivers, &answers, today()).is_empty());
    }

    #[test]
    fn excess_info_is_always_ready() {
        let excess = step(StepRule::ExcessInfo);
        assert!(excess.rule.missing(&excess, &AnswerRecord::default(), today()).is_empty());
    }

    #[test]
    fn conditions_read_branch_flags() {
        let answers = AnswerRecord {
            has_additional_drivers: Some(true),
            ..Default::default()
        };
        assert!(StepCondition::WhenTrue(Field::HasAdditionalDrivers).holds(&answers));
        assert!(!StepCondition::WhenFalse(Field::HasAdditionalDrivers).holds(&answers));
        assert!(StepCondition::WhenFalse(Field::UseRegistration).holds(&answers));
    }
}
