use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QuoteError, Result};

/// Every field a quote session can collect, named as the sequence tables name them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    CarYear,
    CarMake,
    CarModel,
    BodyType,
    UseRegistration,
    Registration,
    Address,
    UnderFinance,
    MainPurpose,
    BusinessRegistered,
    CoverStartDate,
    Gender,
    Age,
    LicenseAge,
    HasAccidents,
    HasAdditionalDrivers,
    AdditionalDrivers,
    CoverType,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::CarYear,
        Field::CarMake,
        Field::CarModel,
        Field::BodyType,
        Field::UseRegistration,
        Field::Registration,
        Field::Address,
        Field::UnderFinance,
        Field::MainPurpose,
        Field::BusinessRegistered,
        Field::CoverStartDate,
        Field::Gender,
        Field::Age,
        Field::LicenseAge,
        Field::HasAccidents,
        Field::HasAdditionalDrivers,
        Field::AdditionalDrivers,
        Field::CoverType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::CarYear => "carYear",
            Field::CarMake => "carMake",
            Field::CarModel => "carModel",
            Field::BodyType => "bodyType",
            Field::UseRegistration => "useRegistration",
            Field::Registration => "registration",
            Field::Address => "address",
            Field::UnderFinance => "underFinance",
            Field::MainPurpose => "mainPurpose",
            Field::BusinessRegistered => "businessRegistered",
            Field::CoverStartDate => "coverStartDate",
            Field::Gender => "gender",
            Field::Age => "age",
            Field::LicenseAge => "licenseAge",
            Field::HasAccidents => "hasAccidents",
            Field::HasAdditionalDrivers => "hasAdditionalDrivers",
            Field::AdditionalDrivers => "additionalDrivers",
            Field::CoverType => "coverType",
        }
    }

    /// Yes/No fields
    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            Field::UseRegistration
                | Field::UnderFinance
                | Field::BusinessRegistered
                | Field::HasAccidents
                | Field::HasAdditionalDrivers
        )
    }

    /// Flags whose value decides which steps or requirements apply later on
    pub fn is_branch(&self) -> bool {
        matches!(self, Field::UseRegistration | Field::HasAdditionalDrivers)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| QuoteError::UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsagePurpose {
    Private,
    Business,
}

impl UsagePurpose {
    pub fn label(&self) -> &'static str {
        match self {
            UsagePurpose::Private => "Private use",
            UsagePurpose::Business => "Business use",
        }
    }
}

/// Insurance product tier. `Unlisted` keeps the lower-cased text of a
/// selection that matched none of the published tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverType {
    Comprehensive,
    ThirdParty,
    ThirdPartyFire,
    CompleteCare,
    Unlisted(String),
}

impl CoverType {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "comprehensive" => Some(CoverType::Comprehensive),
            "third-party" => Some(CoverType::ThirdParty),
            "third-party-fire" => Some(CoverType::ThirdPartyFire),
            "complete-care" => Some(CoverType::CompleteCare),
            _ => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CoverType::Comprehensive => "comprehensive",
            CoverType::ThirdParty => "third-party",
            CoverType::ThirdPartyFire => "third-party-fire",
            CoverType::CompleteCare => "complete-care",
            CoverType::Unlisted(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverField {
    Name,
    Age,
    Experience,
}

impl FromStr for DriverField {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(DriverField::Name),
            "age" => Ok(DriverField::Age),
            "experience" => Ok(DriverField::Experience),
            other => Err(QuoteError::UnknownField(other.to_string())),
        }
    }
}

/// Another person who regularly drives the insured car
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalDriver {
    pub name: String,
    pub age: u32,
    /// Years of driving experience
    pub experience: u32,
}

impl Default for AdditionalDriver {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 16,
            experience: 0,
        }
    }
}

impl AdditionalDriver {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.age >= 16
    }
}

/// A coerced answer, ready to be merged into an [`AnswerRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Flag(bool),
    Number(u32),
    Date(NaiveDate),
    Purpose(UsagePurpose),
    Cover(CoverType),
    Drivers(Vec<AdditionalDriver>),
}

/// Answers accumulated over one quote session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_registration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub under_finance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_purpose: Option<UsagePurpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_registered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_accidents: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_additional_drivers: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_drivers: Vec<AdditionalDriver>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_type: Option<CoverType>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a coerced value, overwriting any earlier answer for the field.
    /// Answering "No" to additional drivers drops any listed drivers.
    pub fn set(&mut self, field: Field, value: AnswerValue) -> Result<()> {
        match (field, value) {
            (Field::CarYear, AnswerValue::Text(v)) => self.car_year = Some(v),
            (Field::CarMake, AnswerValue::Text(v)) => self.car_make = Some(v),
            (Field::CarModel, AnswerValue::Text(v)) => self.car_model = Some(v),
            (Field::BodyType, AnswerValue::Text(v)) => self.body_type = Some(v),
            (Field::UseRegistration, AnswerValue::Flag(v)) => self.use_registration = Some(v),
            (Field::Registration, AnswerValue::Text(v)) => self.registration = Some(v),
            (Field::Address, AnswerValue::Text(v)) => self.address = Some(v),
            (Field::UnderFinance, AnswerValue::Flag(v)) => self.under_finance = Some(v),
            (Field::MainPurpose, AnswerValue::Purpose(v)) => self.main_purpose = Some(v),
            (Field::BusinessRegistered, AnswerValue::Flag(v)) => {
                self.business_registered = Some(v)
            }
            (Field::CoverStartDate, AnswerValue::Date(v)) => self.cover_start_date = Some(v),
            (Field::Gender, AnswerValue::Text(v)) => self.gender = Some(v),
            (Field::Age, AnswerValue::Number(v)) => self.age = Some(v),
            (Field::LicenseAge, AnswerValue::Number(v)) => self.license_age = Some(v),
            (Field::HasAccidents, AnswerValue::Flag(v)) => self.has_accidents = Some(v),
            (Field::HasAdditionalDrivers, AnswerValue::Flag(v)) => {
                self.has_additional_drivers = Some(v);
                if !v {
                    self.additional_drivers.clear();
                }
            }
            (Field::AdditionalDrivers, AnswerValue::Drivers(v)) => self.additional_drivers = v,
            (Field::CoverType, AnswerValue::Cover(v)) => self.cover_type = Some(v),
            (field, value) => {
                return Err(QuoteError::Coercion {
                    field,
                    value: format!("{value:?}"),
                });
            }
        }
        Ok(())
    }

    /// Value of a Yes/No field, `None` for unanswered or non-flag fields
    pub fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::UseRegistration => self.use_registration,
            Field::UnderFinance => self.under_finance,
            Field::BusinessRegistered => self.business_registered,
            Field::HasAccidents => self.has_accidents,
            Field::HasAdditionalDrivers => self.has_additional_drivers,
            _ => None,
        }
    }

    /// Whether the field holds a usable answer. Blank text does not count.
    pub fn is_answered(&self, field: Field) -> bool {
        fn filled(text: &Option<String>) -> bool {
            text.as_deref().is_some_and(|t| !t.trim().is_empty())
        }

        match field {
            Field::CarYear => filled(&self.car_year),
            Field::CarMake => filled(&self.car_make),
            Field::CarModel => filled(&self.car_model),
            Field::BodyType => filled(&self.body_type),
            Field::Registration => filled(&self.registration),
            Field::Address => filled(&self.address),
            Field::Gender => filled(&self.gender),
            Field::MainPurpose => self.main_purpose.is_some(),
            Field::CoverStartDate => self.cover_start_date.is_some(),
            Field::Age => self.age.is_some(),
            Field::LicenseAge => self.license_age.is_some(),
            Field::AdditionalDrivers => !self.additional_drivers.is_empty(),
            Field::CoverType => self.cover_type.is_some(),
            flag => self.flag(flag).is_some(),
        }
    }

    /// Human readable form of the stored answer, as it would be offered back
    /// as a default when the step is revisited
    pub fn display(&self, field: Field) -> Option<String> {
        let yes_no = |v: bool| if v { "Yes" } else { "No" }.to_string();
        match field {
            Field::CarYear => self.car_year.clone(),
            Field::CarMake => self.car_make.clone(),
            Field::CarModel => self.car_model.clone(),
            Field::BodyType => self.body_type.clone(),
            Field::Registration => self.registration.clone(),
            Field::Address => self.address.clone(),
            Field::Gender => self.gender.clone(),
            Field::MainPurpose => self.main_purpose.map(|p| p.label().to_string()),
            Field::CoverStartDate => self.cover_start_date.map(|d| d.to_string()),
            Field::Age => self.age.map(|v| v.to_string()),
            Field::LicenseAge => self.license_age.map(|v| v.to_string()),
            Field::AdditionalDrivers => {
                if self.additional_drivers.is_empty() {
                    None
                } else {
                    Some(
                        self.additional_drivers
                            .iter()
                            .map(|d| format!("{}, {}, {}", d.name, d.age, d.experience))
                            .collect::<Vec<_>>()
                            .join("; "),
                    )
                }
            }
            Field::CoverType => self.cover_type.as_ref().map(|c| c.id().to_string()),
            flag => self.flag(flag).map(yes_no),
        }
    }

    /// Years between licensing and now for the main driver
    pub fn driving_experience(&self) -> Option<i64> {
        match (self.age, self.license_age) {
            (Some(age), Some(license_age)) => Some(i64::from(age) - i64::from(license_age)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip_through_from_str() {
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>().unwrap(), field);
        }
        assert!(matches!(
            "carColour".parse::<Field>(),
            Err(QuoteError::UnknownField(name)) if name == "carColour"
        ));
    }

    #[test]
    fn serde_names_match_field_names() {
        let json = serde_json::to_string(&Field::HasAdditionalDrivers).unwrap();
        assert_eq!(json, "\"hasAdditionalDrivers\"");
    }

    #[test]
    fn declining_additional_drivers_clears_the_list() {
        let mut record = AnswerRecord::new();
        record
            .set(Field::HasAdditionalDrivers, AnswerValue::Flag(true))
            .unwrap();
        record
            .set(
                Field::AdditionalDrivers,
                AnswerValue::Drivers(vec![AdditionalDriver {
                    name: "Jane".into(),
                    age: 30,
                    experience: 12,
                }]),
            )
            .unwrap();
        assert_eq!(record.additional_drivers.len(), 1);

        record
            .set(Field::HasAdditionalDrivers, AnswerValue::Flag(false))
            .unwrap();
        assert!(record.additional_drivers.is_empty());
    }

    #[test]
    fn mismatched_value_is_rejected_without_touching_the_record() {
        let mut record = AnswerRecord::new();
        let err = record.set(Field::Age, AnswerValue::Text("thirty".into()));
        assert!(matches!(err, Err(QuoteError::Coercion { field: Field::Age, .. })));
        assert_eq!(record, AnswerRecord::default());
    }

    #[test]
    fn blank_text_is_not_an_answer() {
        let mut record = AnswerRecord::new();
        record
            .set(Field::Address, AnswerValue::Text("   ".into()))
            .unwrap();
        assert!(!record.is_answered(Field::Address));
        record
            .set(Field::UnderFinance, AnswerValue::Flag(false))
            .unwrap();
        assert!(record.is_answered(Field::UnderFinance));
        assert_eq!(record.display(Field::UnderFinance).as_deref(), Some("No"));
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let record = AnswerRecord {
            license_age: Some(18),
            cover_type: Some(CoverType::ThirdPartyFire),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["licenseAge"], 18);
        assert_eq!(value["coverType"], "third-party-fire");
        assert!(value.get("age").is_none());
    }
}
