use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

use crate::{
    answers::{AnswerRecord, Field},
    error::{QuoteError, Result},
    step::{InputKind, QuestionSpec, Step, StepCondition, StepRule},
};

const CHAT_TABLE: &str = include_str!("../tables/chat.yaml");
const WIZARD_TABLE: &str = include_str!("../tables/wizard.yaml");

/// An ordered, read-only list of steps, built once at startup
#[derive(Debug, Clone)]
pub struct QuestionSequence {
    id: String,
    title: String,
    greeting: Option<String>,
    start_option: Option<String>,
    closing: Option<String>,
    steps: Vec<Step>,
}

impl QuestionSequence {
    /// The chatbot table: one question per step
    pub fn chat() -> Result<Self> {
        Self::from_yaml(CHAT_TABLE)
    }

    /// The wizard table: one screen per step
    pub fn wizard() -> Result<Self> {
        Self::from_yaml(WIZARD_TABLE)
    }

    pub fn from_yaml(source: &str) -> Result<Self> {
        let definition: SequenceDef = serde_yaml::from_str(source)?;
        definition.into_builder().build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Opening line of the chat
    pub fn greeting(&self) -> Option<&str> {
        self.greeting.as_deref()
    }

    /// Option the user picks to start the chat
    pub fn start_option(&self) -> Option<&str> {
        self.start_option.as_deref()
    }

    /// Line said once every question is answered
    pub fn closing(&self) -> Option<&str> {
        self.closing.as_deref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// First step after `index` that applies to the answers so far
    pub fn next_applicable(&self, index: usize, answers: &AnswerRecord) -> Option<usize> {
        (index + 1..self.steps.len()).find(|&i| self.steps[i].applies(answers))
    }

    /// Last step before `index` that applies to the answers so far
    pub fn previous_applicable(&self, index: usize, answers: &AnswerRecord) -> Option<usize> {
        (0..index.min(self.steps.len()))
            .rev()
            .find(|&i| self.steps[i].applies(answers))
    }
}

/// Builder for question sequences, validating the table on `build`
pub struct SequenceBuilder {
    sequence: QuestionSequence,
}

impl SequenceBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            sequence: QuestionSequence {
                title: id.clone(),
                id,
                greeting: None,
                start_option: None,
                closing: None,
                steps: Vec::new(),
            },
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.sequence.title = title.into();
        self
    }

    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.sequence.greeting = Some(greeting.into());
        self
    }

    pub fn start_option(mut self, option: impl Into<String>) -> Self {
        self.sequence.start_option = Some(option.into());
        self
    }

    pub fn closing(mut self, closing: impl Into<String>) -> Self {
        self.sequence.closing = Some(closing.into());
        self
    }

    pub fn add_step(mut self, step: Step) -> Self {
        self.sequence.steps.push(step);
        self
    }

    pub fn build(self) -> Result<QuestionSequence> {
        let sequence = self.sequence;
        let invalid = |message: String| Err(QuoteError::InvalidSequence(message));

        if sequence.steps.is_empty() {
            return invalid(format!("sequence '{}' has no steps", sequence.id));
        }
        if sequence.steps[0].condition.is_some() {
            return invalid(format!(
                "first step '{}' of '{}' cannot be conditional",
                sequence.steps[0].id, sequence.id
            ));
        }

        let mut step_ids = HashSet::new();
        let mut fields = HashSet::new();
        for step in &sequence.steps {
            if !step_ids.insert(step.id.as_str()) {
                return invalid(format!("duplicate step id '{}'", step.id));
            }

            if let Some(condition) = step.condition {
                let field = condition.field();
                if !field.is_flag() {
                    return invalid(format!(
                        "step '{}' is conditional on {field}, which is not a Yes/No field",
                        step.id
                    ));
                }
                if !fields.contains(&field) {
                    return invalid(format!(
                        "step '{}' is conditional on {field}, which no earlier step asks",
                        step.id
                    ));
                }
            }

            for question in &step.questions {
                if !fields.insert(question.field) {
                    return invalid(format!("field {} is asked more than once", question.field));
                }
                if question.input.has_options() == question.options.is_empty() {
                    return invalid(format!(
                        "question '{}' ({:?}) has {} options",
                        question.id,
                        question.input,
                        question.options.len()
                    ));
                }
            }
        }

        debug!(
            sequence = %sequence.id,
            steps = sequence.steps.len(),
            fields = fields.len(),
            "question sequence built"
        );
        Ok(sequence)
    }
}

#[derive(Debug, Deserialize)]
struct SequenceDef {
    id: String,
    title: Option<String>,
    greeting: Option<String>,
    start_option: Option<String>,
    closing: Option<String>,
    steps: Vec<StepDef>,
}

impl SequenceDef {
    fn into_builder(self) -> SequenceBuilder {
        let mut builder = SequenceBuilder::new(self.id);
        if let Some(title) = self.title {
            builder = builder.title(title);
        }
        if let Some(greeting) = self.greeting {
            builder = builder.greeting(greeting);
        }
        if let Some(option) = self.start_option {
            builder = builder.start_option(option);
        }
        if let Some(closing) = self.closing {
            builder = builder.closing(closing);
        }
        self.steps
            .into_iter()
            .fold(builder, |builder, step| builder.add_step(step.into_step()))
    }
}

#[derive(Debug, Deserialize)]
struct StepDef {
    id: String,
    title: Option<String>,
    #[serde(default)]
    rule: StepRule,
    condition: Option<StepCondition>,
    #[serde(default)]
    questions: Vec<QuestionDef>,
}

impl StepDef {
    fn into_step(self) -> Step {
        Step {
            title: self.title.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            questions: self.questions.into_iter().map(QuestionDef::into_spec).collect(),
            rule: self.rule,
            condition: self.condition,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuestionDef {
    id: Option<String>,
    prompt: String,
    field: Field,
    input: InputKind,
    #[serde(default)]
    options: OptionSource,
}

impl QuestionDef {
    fn into_spec(self) -> QuestionSpec {
        QuestionSpec {
            id: self.id.unwrap_or_else(|| self.field.name().to_string()),
            prompt: self.prompt,
            field: self.field,
            input: self.input,
            options: self.options.expand(),
        }
    }
}

/// Options written out, or an inclusive numeric range in either direction
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OptionSource {
    Range { range: OptionRange },
    List(Vec<String>),
}

impl Default for OptionSource {
    fn default() -> Self {
        OptionSource::List(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct OptionRange {
    from: i64,
    to: i64,
}

impl OptionSource {
    fn expand(self) -> Vec<String> {
        match self {
            OptionSource::List(options) => options,
            OptionSource::Range { range } if range.from <= range.to => {
                (range.from..=range.to).map(|n| n.to_string()).collect()
            }
            OptionSource::Range { range } => (range.to..=range.from)
                .rev()
                .map(|n| n.to_string())
                .collect(),
        }
    }
}
