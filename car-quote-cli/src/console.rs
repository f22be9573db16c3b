use quote_flow::{QuestionSpec, SummaryView};
use serde_json::Value;

/// Options beyond this many are shown as a range
const MAX_LISTED_OPTIONS: usize = 16;

/// Conversation text goes to stdout, or to stderr when stdout is reserved
/// for the JSON summary
#[derive(Debug, Clone, Copy)]
pub struct Console {
    json: bool,
}

impl Console {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn say(&self, text: &str) {
        if self.json {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }

    pub fn options(&self, question: &QuestionSpec, numbered: bool) {
        let options = &question.options;
        match options.as_slice() {
            [] => {}
            [first, .., last] if options.len() > MAX_LISTED_OPTIONS => {
                self.say(&format!("    ({first} to {last})"))
            }
            _ if numbered => {
                for (index, option) in options.iter().enumerate() {
                    self.say(&format!("    {}. {option}", index + 1));
                }
            }
            _ => self.say(&format!("    ({})", options.join(" | "))),
        }
    }

    /// Print the final summary, as JSON when asked to
    pub fn summary(&self, view: &SummaryView, extra: Value) -> anyhow::Result<()> {
        if self.json {
            let mut output = serde_json::json!({ "summary": view });
            if let (Value::Object(output), Value::Object(extra)) = (&mut output, extra) {
                output.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print!("{view}");
        }
        Ok(())
    }
}
