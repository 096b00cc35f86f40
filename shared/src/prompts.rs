//! Prompt templates for the message pipeline.
//!
//! Templates are Handlebars with HTML escaping off and strict mode on, so
//! values go in verbatim and a missing variable is an error.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use handlebars::Handlebars;
use serde::Serialize;

use crate::{Error, Result};

const INQUIRY_SYSTEM: &str = "Given the following user prompt and conversation log, formulate a question that would be the most relevant to provide the user with an answer from a knowledge base.

Rules:
- Always prioritize the user prompt over the conversation log
- Ignore any conversation log that is not directly related to the user prompt
- Only attempt to answer if a question was posed
- The question should be a single sentence
- Remove any punctuation from the question
- Remove any words that are not relevant to the question
- If unable to formulate a question, respond with the same USER PROMPT received";

const INQUIRY_HUMAN: &str = "USER PROMPT: {{userPrompt}}\n\nCONVERSATION LOG: {{conversationHistory}}";

const ANSWER_SYSTEM: &str = "You are an AI Assistant specialized in providing accurate, context-based responses. Analyze the provided context carefully and follow these guidelines:

CORE RESPONSIBILITIES:
- Base responses primarily on the provided context
- Cite specific parts of the context to support answers
- Maintain high accuracy and transparency
- Acknowledge limitations clearly

RESPONSE GUIDELINES:
1. Use the context precisely and effectively
2. Distinguish between context-based facts and general knowledge
3. Structure responses clearly and logically
4. Include relevant quotes when beneficial
5. State confidence levels when appropriate

IMPORTANT RULES:
- Never make up information not present in the context
- Don't speculate beyond the given information
- If the context is insufficient, explicitly state what's missing
- Ask for clarification if the question is ambiguous
- Always hide PII Data such as User ID, Email Address, First Name, Last Name, Job Title, School Name, School Address, School State ID, School US State Location

PERSONA-SPECIFIC INSTRUCTIONS:
{{personaGuideline}}

Context: {{context}}";

const ANSWER_HUMAN: &str = "Question: {{question}}";

/// Turns the user prompt and conversation log into a single search question.
pub static INQUIRY_PROMPT: ChatPrompt = ChatPrompt::new(INQUIRY_SYSTEM, INQUIRY_HUMAN);

/// Answers the inquiry from retrieved context with persona guidance.
pub static ANSWER_PROMPT: ChatPrompt = ChatPrompt::new(ANSWER_SYSTEM, ANSWER_HUMAN);

/// Named values substituted into a prompt template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PromptVars(BTreeMap<String, String>);

impl PromptVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

/// A system + human message pair ready to send to a chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// A two-message chat prompt template.
#[derive(Debug, Clone, Copy)]
pub struct ChatPrompt {
    system: &'static str,
    human: &'static str,
}

impl ChatPrompt {
    pub const fn new(system: &'static str, human: &'static str) -> Self {
        Self { system, human }
    }

    pub fn render(&self, vars: &PromptVars) -> Result<RenderedPrompt> {
        Ok(RenderedPrompt {
            system: render_template(self.system, vars)?,
            user: render_template(self.human, vars)?,
        })
    }
}

fn engine() -> &'static Handlebars<'static> {
    static ENGINE: OnceLock<Handlebars<'static>> = OnceLock::new();
    ENGINE.get_or_init(|| {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
    })
}

/// Render a single template against `vars`.
pub fn render_template(template: &str, vars: &PromptVars) -> Result<String> {
    engine()
        .render_template(template, vars)
        .map_err(|e| Error::Template(format!("Failed to render prompt: {}", e)))
}
