//! Prompt Synthesis
//!
//! Builds the generation request for one lesson. Synthesis is a pure function of
//! the document, its section and the settings: the same inputs always produce the
//! same prompt text, which keeps retries and test doubles deterministic.

use crate::category::ContentCategory;
use crate::corpus::Document;
use crate::extraction::{BlockFormat, CLOSING_MARKER};
use crate::provider::{ChatMessage, CompletionOptions, MessageRole};
use serde::{Deserialize, Serialize};

/// Prompt and sampling parameters sent to the model for one attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    /// Single user message carrying the prompt
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: MessageRole::User,
            content: self.prompt.clone(),
        }]
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_output_tokens),
            ..CompletionOptions::default()
        }
    }
}

/// Synthesizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// Excerpt length in characters, not bytes
    pub max_excerpt_chars: usize,
    pub min_code_lines: usize,
    pub max_code_lines: usize,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            max_excerpt_chars: 2000,
            min_code_lines: 20,
            max_code_lines: 50,
            temperature: 0.2,
            max_output_tokens: 16384,
        }
    }
}

/// Prompt synthesizer
#[derive(Debug, Clone)]
pub struct PromptSynthesizer {
    settings: SynthesisSettings,
    format: BlockFormat,
}

impl PromptSynthesizer {
    pub fn new(settings: SynthesisSettings, format: BlockFormat) -> Self {
        Self { settings, format }
    }

    /// Build the request for one document.
    pub fn synthesize(&self, document: &Document, category: ContentCategory) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt(document, category),
            temperature: self.settings.temperature,
            max_output_tokens: self.settings.max_output_tokens,
        }
    }

    /// Prompt text for one document
    pub fn prompt(&self, document: &Document, category: ContentCategory) -> String {
        let template = category.template();
        let excerpt = excerpt(document.content(), self.settings.max_excerpt_chars);
        let min = self.settings.min_code_lines;
        let max = self.settings.max_code_lines;
        let heading = &self.format.heading;
        let component = &self.format.component;

        format!(
            r#"Create a MINIMAL working {component} playground for a lesson.

Topic: {title}
Section: {section}

Lesson excerpt:
{excerpt}

FORMAT (return ONLY this block):

{heading}

<{component}
  template="{template}"
  files={{{{
    "{entry}": `
[FILE CODE, {min}-{max} lines max]
`
  }}}}
/>

RULES:
1. {entry_description}
2. Keep the code MINIMAL and INTERACTIVE, between {min} and {max} lines
3. Escape: \${{}} inside template literals, <\/script> for closing script tags
4. Dark theme: background #282c34, color white
5. Return exactly one block; it MUST end with `{marker}`
"#,
            title = document.title(),
            section = category.as_str(),
            template = template.as_str(),
            entry = template.entry_file(),
            entry_description = capitalize(template.entry_description()),
            marker = CLOSING_MARKER,
        )
    }
}

impl Default for PromptSynthesizer {
    fn default() -> Self {
        Self::new(SynthesisSettings::default(), BlockFormat::default())
    }
}

/// Leading `max_chars` characters of `content`; truncated, never summarized.
pub fn excerpt(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((index, _)) => &content[..index],
        None => content,
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
