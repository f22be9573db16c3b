//! Parsing of what the user types at the prompt.

use quote_flow::{DriverField, Field, InputKind, QuestionSpec, QuoteError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (type `help` for the list)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Driver numbers start at 1, got {0:?}")]
    DriverNumber(String),

    #[error(transparent)]
    Field(#[from] QuoteError),
}

/// Map a typed answer onto one of the question's options.
///
/// Single-choice questions also accept the one-based number of an option.
/// Anything that matches no option is passed through trimmed.
pub fn resolve_choice(question: &QuestionSpec, raw: &str) -> String {
    let trimmed = raw.trim();
    if question.input == InputKind::SingleChoice {
        let picked = trimmed
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| question.options.get(index));
        if let Some(option) = picked {
            return option.clone();
        }
    }
    question
        .options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(trimmed))
        .cloned()
        .unwrap_or_else(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Answer(String),
    Back,
    Quit,
}

pub fn parse_chat_input(line: &str) -> ChatInput {
    match line.trim().to_ascii_lowercase().as_str() {
        "back" => ChatInput::Back,
        "quit" | "exit" => ChatInput::Quit,
        _ => ChatInput::Answer(line.trim().to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    Set { field: Field, value: String },
    AddDriver,
    /// Zero-based index
    RemoveDriver(usize),
    UpdateDriver {
        index: usize,
        field: DriverField,
        value: String,
    },
    Next,
    Back,
    Restart,
    Generate,
    Help,
    Quit,
}

pub const WIZARD_HELP: &str = "\
Commands:
  <field> = <value>                          answer a question on this step
  driver add                                 add an additional driver
  driver remove <n>                          remove driver n
  driver <n> <name|age|experience> <value>   edit driver n
  next | back | restart | generate | quit";

fn driver_index(raw: &str) -> Result<usize, CommandError> {
    raw.parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .ok_or_else(|| CommandError::DriverNumber(raw.to_string()))
}

pub fn parse_wizard_command(line: &str) -> Result<WizardCommand, CommandError> {
    let line = line.trim();
    if let Some((field, value)) = line.split_once('=') {
        return Ok(WizardCommand::Set {
            field: field.trim().parse()?,
            value: value.trim().to_string(),
        });
    }

    let mut words = line.split_whitespace();
    let command = match words.next().map(str::to_ascii_lowercase).as_deref() {
        Some("next") => WizardCommand::Next,
        Some("back") => WizardCommand::Back,
        Some("restart") => WizardCommand::Restart,
        Some("generate") => WizardCommand::Generate,
        Some("help") | None => WizardCommand::Help,
        Some("quit") | Some("exit") => WizardCommand::Quit,
        Some("driver") => match words.next() {
            Some("add") => WizardCommand::AddDriver,
            Some("remove") => {
                let number = words
                    .next()
                    .ok_or(CommandError::Usage("driver remove <n>"))?;
                WizardCommand::RemoveDriver(driver_index(number)?)
            }
            Some(number) => {
                let index = driver_index(number)?;
                let field = words
                    .next()
                    .ok_or(CommandError::Usage("driver <n> <name|age|experience> <value>"))?
                    .parse()?;
                let value = words.collect::<Vec<_>>().join(" ");
                WizardCommand::UpdateDriver { index, field, value }
            }
            None => return Err(CommandError::Usage("driver add | driver remove <n> | driver <n> <field> <value>")),
        },
        Some(_) => return Err(CommandError::Unknown(line.to_string())),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(input: InputKind, options: &[&str]) -> QuestionSpec {
        QuestionSpec {
            id: "q".into(),
            prompt: "?".into(),
            field: Field::BodyType,
            input,
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn choices_resolve_by_number_or_text() {
        let body = question(InputKind::SingleChoice, &["Hatchback", "Sedan", "SUV"]);
        assert_eq!(resolve_choice(&body, "2"), "Sedan");
        assert_eq!(resolve_choice(&body, " suv "), "SUV");
        assert_eq!(resolve_choice(&body, "9"), "9");
        assert_eq!(resolve_choice(&body, "Tractor"), "Tractor");
    }

    #[test]
    fn long_lists_do_not_take_option_numbers() {
        let years = question(InputKind::LongList, &["2025", "2024", "2023"]);
        assert_eq!(resolve_choice(&years, "2"), "2");
        assert_eq!(resolve_choice(&years, "2024"), "2024");
    }

    #[test]
    fn chat_keywords() {
        assert_eq!(parse_chat_input(" Back "), ChatInput::Back);
        assert_eq!(parse_chat_input("quit"), ChatInput::Quit);
        assert_eq!(parse_chat_input(" Toyota "), ChatInput::Answer("Toyota".into()));
    }

    #[test]
    fn wizard_assignments() {
        assert_eq!(
            parse_wizard_command("address = 1 Main St, Melbourne").unwrap(),
            WizardCommand::Set {
                field: Field::Address,
                value: "1 Main St, Melbourne".into()
            }
        );
        assert!(matches!(
            parse_wizard_command("colour = red"),
            Err(CommandError::Field(QuoteError::UnknownField(_)))
        ));
    }

    #[test]
    fn wizard_driver_commands_use_one_based_numbers() {
        assert_eq!(parse_wizard_command("driver add").unwrap(), WizardCommand::AddDriver);
        assert_eq!(
            parse_wizard_command("driver remove 2").unwrap(),
            WizardCommand::RemoveDriver(1)
        );
        assert_eq!(
            parse_wizard_command("driver 1 name Jane Smith").unwrap(),
            WizardCommand::UpdateDriver {
                index: 0,
                field: DriverField::Name,
                value: "Jane Smith".into()
            }
        );
        assert!(matches!(
            parse_wizard_command("driver 0 age 30"),
            Err(CommandError::DriverNumber(_))
        ));
        assert!(matches!(
            parse_wizard_command("driver remove"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn wizard_navigation() {
        assert_eq!(parse_wizard_command("NEXT").unwrap(), WizardCommand::Next);
        assert_eq!(parse_wizard_command("").unwrap(), WizardCommand::Help);
        assert!(matches!(
            parse_wizard_command("jump"),
            Err(CommandError::Unknown(_))
        ));
    }
}
