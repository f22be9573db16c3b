use quote_flow::{
    InMemorySessionStorage, InputEvent, QuestionSequence, QuoteGenerator, QuoteRunner, RunStatus,
    StepController, StepRule, SummaryView, estimate_excess,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::{
    config::QuoteConfig,
    console::Console,
    input::{WIZARD_HELP, WizardCommand, parse_wizard_command, resolve_choice},
};

fn render_step(console: &Console, controller: &StepController) {
    if controller.is_complete() {
        console.say("Review Your Quote");
        console.say(&SummaryView::review(controller.answers()).to_string());
        console.say("Type `generate` to get your quote, `back` to make changes, or `quit`.");
        return;
    }
    let Ok(step) = controller.current_step() else {
        return;
    };

    let (number, len) = controller.position();
    console.say(&format!(
        "Step {number} of {len} ({}% Complete): {}",
        controller.progress_percent(),
        step.title
    ));

    let answers = controller.answers();
    for question in &step.questions {
        let current = answers
            .display(question.field)
            .map(|value| format!(" [{value}]"))
            .unwrap_or_default();
        console.say(&format!("  {} - {}{current}", question.field, question.prompt));
        console.options(question, false);
    }

    if step.collects_drivers() && answers.has_additional_drivers == Some(true) {
        if answers.additional_drivers.is_empty() {
            console.say("  No additional drivers yet. Use `driver add`.");
        }
        for (index, driver) in answers.additional_drivers.iter().enumerate() {
            console.say(&format!(
                "  driver {}: name {:?}, age {}, experience {} years",
                index + 1,
                driver.name,
                driver.age,
                driver.experience
            ));
        }
    }

    if step.rule == StepRule::ExcessInfo {
        let excess = estimate_excess(answers);
        console.say(&format!("  Basic excess: ${}", excess.basic));
        if excess.young_driver > 0 {
            console.say(&format!("  Young driver excess (under 25): ${}", excess.young_driver));
        }
        if excess.inexperienced_driver > 0 {
            console.say(&format!(
                "  Inexperienced driver excess (under 2 years driving): ${}",
                excess.inexperienced_driver
            ));
        }
        console.say(&format!("  Total excess: ${}", excess.total));
        if excess.young_additional_driver {
            console.say("  Note: an additional driver is under 25");
        }
        if excess.inexperienced_additional_driver {
            console.say("  Note: an additional driver has under 2 years of experience");
        }
        console.say(&format!(
            "  Unlisted driver excess: ${}",
            excess.unlisted_driver
        ));
    }
}

/// Run the step-by-step form over stdin
pub async fn run(config: &QuoteConfig) -> anyhow::Result<()> {
    let sequence = config.load_sequence(QuestionSequence::wizard).await?;
    let console = Console::new(config.json);
    let runner = QuoteRunner::new(sequence, Arc::new(InMemorySessionStorage::new()));
    let generator = QuoteGenerator::new(config.pacer());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let session_id = runner.start(config.today()).await?;
    info!(session_id = %session_id, "wizard started");
    render_step(&console, &runner.controller(&session_id).await?);

    while let Some(line) = lines.next_line().await? {
        let command = match parse_wizard_command(&line) {
            Ok(command) => command,
            Err(err) => {
                console.say(&err.to_string());
                continue;
            }
        };

        let controller = runner.controller(&session_id).await?;
        let event = match command {
            WizardCommand::Quit => return Ok(()),
            WizardCommand::Help => {
                console.say(WIZARD_HELP);
                continue;
            }
            WizardCommand::Generate if controller.is_complete() => {
                let record = controller.answers().clone();
                console.say("Generating your quote...");
                let quote = generator.generate(&record).await;
                let view = SummaryView::with_quote(&record, quote);
                return console.summary(&view, serde_json::json!({ "sessionId": session_id }));
            }
            WizardCommand::Generate => {
                console.say("Finish every step before generating a quote.");
                continue;
            }
            WizardCommand::Set { field, value } => {
                let value = match controller.current_step().ok().and_then(|s| s.question(field)) {
                    Some(question) => resolve_choice(question, &value),
                    None => value,
                };
                InputEvent::Answer { field, value }
            }
            WizardCommand::AddDriver => InputEvent::AddDriver,
            WizardCommand::RemoveDriver(index) => InputEvent::RemoveDriver(index),
            WizardCommand::UpdateDriver { index, field, value } => {
                InputEvent::UpdateDriver { index, field, value }
            }
            WizardCommand::Next => InputEvent::Advance,
            WizardCommand::Back => InputEvent::Retreat,
            WizardCommand::Restart => InputEvent::Restart,
        };

        let rerender = !matches!(event, InputEvent::Answer { .. } | InputEvent::UpdateDriver { .. });
        match runner.run(&session_id, event).await {
            Ok(result) => {
                if let Some(message) = &result.status_message {
                    console.say(message);
                }
                if let RunStatus::Completed(_) = result.status {
                    info!(session_id = %session_id, "all wizard steps complete");
                }
                if rerender {
                    render_step(&console, &runner.controller(&session_id).await?);
                }
            }
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "wizard input rejected");
                console.say(&format!("Error: {err}"));
            }
        }
    }
    Ok(())
}
