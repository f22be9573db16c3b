use quote_flow::{
    ChatHistory, InMemorySessionStorage, InputEvent, InputKind, Pause, QuestionSequence,
    QuoteGenerator, QuoteRunner, RunResult, RunStatus, SummaryView,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::{
    config::QuoteConfig,
    console::Console,
    input::{ChatInput, parse_chat_input, resolve_choice},
};

/// Run the chatbot over stdin until the quote is shown, the user quits, or
/// input runs out
pub async fn run(config: &QuoteConfig) -> anyhow::Result<()> {
    let sequence = config.load_sequence(QuestionSequence::chat).await?;
    let pacer = config.pacer();
    let console = Console::new(config.json);
    let runner = QuoteRunner::new(sequence.clone(), Arc::new(InMemorySessionStorage::new()));
    let mut history = ChatHistory::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let say = |history: &mut ChatHistory, text: &str| {
        console.say(text);
        history.add_bot_message(text);
    };

    if let Some(greeting) = sequence.greeting() {
        pacer.pause(Pause::Typing).await;
        say(&mut history, greeting);
    }
    if let Some(start) = sequence.start_option() {
        console.say(&format!("    1. {start}"));
        match lines.next_line().await? {
            Some(line) if parse_chat_input(&line) != ChatInput::Quit => {
                history.add_user_message(start);
            }
            _ => return Ok(()),
        }
    }

    let session_id = runner.start(config.today()).await?;
    info!(session_id = %session_id, "chat started");

    loop {
        let controller = runner.controller(&session_id).await?;
        let question = controller.current_question()?.clone();

        pacer.pause(Pause::Typing).await;
        say(&mut history, &question.prompt);
        if !controller.state().revealed_choices.is_empty() {
            pacer.pause(Pause::Reveal).await;
            console.options(&question, question.input == InputKind::SingleChoice);
        }

        let Some(line) = lines.next_line().await? else {
            info!(session_id = %session_id, "input closed before the quote was finished");
            return Ok(());
        };
        let reply = match parse_chat_input(&line) {
            ChatInput::Quit => return Ok(()),
            ChatInput::Back => {
                let result = runner.run(&session_id, InputEvent::Retreat).await?;
                if let Some(message) = result.status_message {
                    say(&mut history, &message);
                }
                continue;
            }
            ChatInput::Answer(raw) => resolve_choice(&question, &raw),
        };
        history.add_user_message(reply.clone());

        match runner.run(&session_id, InputEvent::Reply(reply)).await {
            Ok(RunResult {
                status: RunStatus::Completed(record),
                ..
            }) => {
                if let Some(closing) = sequence.closing() {
                    pacer.pause(Pause::Typing).await;
                    say(&mut history, closing);
                }
                let quote = QuoteGenerator::new(pacer.clone()).generate(&record).await;
                let view = SummaryView::with_quote(&record, quote);
                return console.summary(
                    &view,
                    serde_json::json!({
                        "sessionId": session_id,
                        "transcript": history.messages(),
                    }),
                );
            }
            Ok(RunResult {
                status_message: Some(message),
                ..
            }) => say(&mut history, &message),
            Ok(_) => {}
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "reply rejected");
                say(&mut history, &format!("Sorry, I couldn't use that answer. {err}"));
            }
        }
    }
}
