//! Response Extraction
//!
//! Turns raw model output into a validated playground block, or rejects it. The
//! block is located with a small JSX tokenizer rather than a lazy pattern, so a
//! `/>` inside a string or template literal never terminates a block and a
//! truncated response is always rejected. Extraction is all-or-nothing: there is
//! no repair of partial output.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

/// Closing marker every block must end with (bit-exact)
pub const CLOSING_MARKER: &str = "/>";

const DEFAULT_HEADING: &str = "## Интерактивный пример";
const DEFAULT_COMPONENT: &str = "Sandpack";

/// Fence languages stripped from model output
const FENCE_LANGUAGES: &[&str] = &[
    "html",
    "jsx",
    "tsx",
    "mdx",
    "js",
    "javascript",
    "ts",
    "typescript",
    "md",
    "markdown",
];

/// Textual shape of an embedded playground block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFormat {
    /// Canonical section heading line, including the `#` prefix
    pub heading: String,
    /// Component name, e.g. `Sandpack`
    pub component: String,
}

impl Default for BlockFormat {
    fn default() -> Self {
        Self {
            heading: DEFAULT_HEADING.to_string(),
            component: DEFAULT_COMPONENT.to_string(),
        }
    }
}

impl BlockFormat {
    pub fn new(heading: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            component: component.into(),
        }
    }

    /// Opening tag, e.g. `<Sandpack`
    pub fn open_tag(&self) -> String {
        format!("<{}", self.component)
    }

    /// Marker detection used by the scanner: any open tag or the heading counts.
    pub fn is_present_in(&self, content: &str) -> bool {
        content.contains(&self.open_tag()) || content.contains(&self.heading)
    }
}

/// A validated, terminator-complete playground block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    text: String,
    template: String,
    entry_files: Vec<String>,
}

impl Block {
    /// Block text with exactly one leading blank-line separator
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Block text without the leading separator
    pub fn body(&self) -> &str {
        self.text.trim_start_matches('\n')
    }

    /// Template kind declared on the component
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Entry filenames declared in the `files` mapping, in source order
    pub fn entry_files(&self) -> &[String] {
        &self.entry_files
    }
}

/// Why a response was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ExtractionFailure {
    #[error("no playground block found in response")]
    NoBlock,

    #[error("playground block is not terminated with `/>`")]
    Unterminated,

    #[error("malformed playground block: {0}")]
    Malformed(String),
}

/// Result of extracting a block from one response
pub type ExtractionResult = Result<Block, ExtractionFailure>;

/// Compiled block extractor
///
/// Create once per run and reuse for every response.
#[derive(Debug, Clone)]
pub struct BlockExtractor {
    format: BlockFormat,
    fence_line: Regex,
    decode_unicode_escapes: bool,
}

impl BlockExtractor {
    pub fn new(format: BlockFormat) -> Self {
        let languages = FENCE_LANGUAGES.join("|");
        let fence_line = Regex::new(&format!(r"(?m)^[ \t]*```[ \t]*(?:{languages})?[ \t]*\r?(?:\n|$)"))
            .expect("fence pattern is a valid regex");
        Self {
            format,
            fence_line,
            decode_unicode_escapes: false,
        }
    }

    /// Decode `\uXXXX` escapes of non-ASCII code points before extraction.
    pub fn with_unicode_escape_decoding(mut self, enabled: bool) -> Self {
        self.decode_unicode_escapes = enabled;
        self
    }

    /// Extract a validated block from raw model output.
    pub fn extract(&self, raw: &str) -> ExtractionResult {
        let decoded = if self.decode_unicode_escapes {
            decode_unicode_escapes(raw)
        } else {
            Cow::Borrowed(raw)
        };
        let stripped = self.strip_fences(&decoded);
        let text = stripped.trim();

        let candidates = self.candidates(text);
        if candidates.is_empty() {
            return Err(ExtractionFailure::NoBlock);
        }

        let tag_len = self.format.open_tag().len();
        let mut first_failure: Option<ExtractionFailure> = None;
        let mut record = |failure: ExtractionFailure| {
            // Unterminated dominates: it is the signature of a truncated response.
            let replace = match &first_failure {
                None => true,
                Some(ExtractionFailure::Malformed(_)) => failure == ExtractionFailure::Unterminated,
                Some(_) => false,
            };
            if replace {
                first_failure = Some(failure);
            }
        };

        // Pass 1: heading immediately followed by the component.
        for &start in &candidates {
            let Some(heading_start) = self.heading_before(text, start) else {
                continue;
            };
            match ComponentParser::new(text, start + tag_len).parse() {
                Ok(parts) => {
                    return self.finish(&text[heading_start..parts.end], true, parts);
                }
                Err(failure) => record(failure),
            }
        }

        // Pass 2: the component on its own.
        for &start in &candidates {
            match ComponentParser::new(text, start + tag_len).parse() {
                Ok(parts) => return self.finish(&text[start..parts.end], false, parts),
                Err(failure) => record(failure),
            }
        }

        Err(first_failure.unwrap_or(ExtractionFailure::NoBlock))
    }

    fn finish(&self, matched: &str, has_heading: bool, parts: ComponentParts) -> ExtractionResult {
        let matched = matched.trim();
        if !matched.ends_with(CLOSING_MARKER) {
            return Err(ExtractionFailure::Unterminated);
        }
        let body = if has_heading {
            matched.to_string()
        } else {
            format!("{}\n\n{}", self.format.heading, matched)
        };
        Ok(Block {
            text: format!("\n\n{}", body),
            template: parts.template,
            entry_files: parts.entry_files,
        })
    }

    /// Remove whole-line code fences wherever they occur.
    fn strip_fences<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.fence_line.replace_all(text, "")
    }

    /// Byte offsets of every `<Component` open tag followed by whitespace or `/`.
    fn candidates(&self, text: &str) -> Vec<usize> {
        let tag = self.format.open_tag();
        text.match_indices(&tag)
            .filter(|(index, _)| {
                matches!(
                    text.as_bytes().get(index + tag.len()),
                    Some(b) if b.is_ascii_whitespace() || *b == b'/'
                )
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Start of the heading line if it precedes `start` with only whitespace
    /// (including at least one newline) in between.
    fn heading_before(&self, text: &str, start: usize) -> Option<usize> {
        let before = &text[..start];
        let trimmed = before.trim_end();
        let gap = &before[trimmed.len()..];
        if !gap.contains('\n') || !trimmed.ends_with(self.format.heading.as_str()) {
            return None;
        }
        let heading_start = trimmed.len() - self.format.heading.len();
        if heading_start == 0 || text.as_bytes()[heading_start - 1] == b'\n' {
            Some(heading_start)
        } else {
            None
        }
    }
}

impl Default for BlockExtractor {
    fn default() -> Self {
        Self::new(BlockFormat::default())
    }
}

/// Attributes recovered from a well-formed component
#[derive(Debug)]
struct ComponentParts {
    /// Byte offset just past the closing marker
    end: usize,
    template: String,
    entry_files: Vec<String>,
}

/// Attribute value as written in the source
enum AttrValue {
    Flag,
    Text(String),
    Expression { body: String, keys: Vec<String> },
}

type ParseResult<T> = Result<T, ExtractionFailure>;

/// Tokenizer over one JSX self-closing component.
///
/// All delimiters are ASCII, so byte positions always fall on char boundaries.
struct ComponentParser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ComponentParser<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos,
        }
    }

    fn parse(mut self) -> ParseResult<ComponentParts> {
        let mut template: Option<String> = None;
        let mut entry_files: Option<Vec<String>> = None;

        loop {
            self.skip_whitespace();
            let Some(&byte) = self.bytes.get(self.pos) else {
                return Err(ExtractionFailure::Unterminated);
            };

            if self.src[self.pos..].starts_with(CLOSING_MARKER) {
                self.pos += CLOSING_MARKER.len();
                break;
            }
            if byte == b'>' {
                return Err(ExtractionFailure::Malformed(
                    "component must be self-closing".to_string(),
                ));
            }

            let name = self.read_identifier();
            if name.is_empty() {
                return Err(ExtractionFailure::Malformed(format!(
                    "unexpected character {:?} in component attributes",
                    self.src[self.pos..].chars().next().unwrap_or_default()
                )));
            }

            match (name, self.read_attribute_value()?) {
                ("template", AttrValue::Text(value)) => template = Some(value),
                ("template", AttrValue::Expression { body, .. }) => {
                    template = Some(unquote(body.trim()).ok_or_else(|| {
                        ExtractionFailure::Malformed(
                            "template must be a string literal".to_string(),
                        )
                    })?)
                }
                ("files", AttrValue::Expression { keys, .. }) => entry_files = Some(keys),
                ("files", _) => {
                    return Err(ExtractionFailure::Malformed(
                        "files must be an object expression".to_string(),
                    ))
                }
                _ => {}
            }
        }

        let template = template
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ExtractionFailure::Malformed("missing template attribute".to_string()))?;
        let entry_files = entry_files
            .ok_or_else(|| ExtractionFailure::Malformed("missing files attribute".to_string()))?;
        if entry_files.is_empty() {
            return Err(ExtractionFailure::Malformed(
                "files mapping declares no entry file".to_string(),
            ));
        }

        Ok(ComponentParts {
            end: self.pos,
            template,
            entry_files,
        })
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.bytes.get(self.pos), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn read_identifier(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while matches!(
            self.bytes.get(self.pos),
            Some(b) if b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-'
        ) {
            self.pos += 1;
        }
        &src[start..self.pos]
    }

    fn read_attribute_value(&mut self) -> ParseResult<AttrValue> {
        self.skip_whitespace();
        if self.bytes.get(self.pos) != Some(&b'=') {
            return Ok(AttrValue::Flag);
        }
        self.pos += 1;
        self.skip_whitespace();

        match self.bytes.get(self.pos) {
            None => Err(ExtractionFailure::Unterminated),
            Some(b'"') | Some(b'\'') => {
                let quote = self.bytes[self.pos];
                let start = self.pos + 1;
                let end = self.src[start..]
                    .find(quote as char)
                    .map(|offset| start + offset)
                    .ok_or(ExtractionFailure::Unterminated)?;
                self.pos = end + 1;
                Ok(AttrValue::Text(self.src[start..end].to_string()))
            }
            Some(b'{') => {
                self.pos += 1;
                let start = self.pos;
                let keys = self.read_expression()?;
                Ok(AttrValue::Expression {
                    body: self.src[start..self.pos - 1].to_string(),
                    keys,
                })
            }
            Some(_) => Err(ExtractionFailure::Malformed(
                "attribute value must be a string or an expression".to_string(),
            )),
        }
    }

    /// Consume a JS expression up to and including the `}` that closes the
    /// already-consumed `{`. Returns quoted keys of the first nested object.
    fn read_expression(&mut self) -> ParseResult<Vec<String>> {
        let mut depth = 1usize;
        let mut keys = Vec::new();

        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(keys);
                    }
                }
                b'"' | b'\'' => {
                    let start = self.pos + 1;
                    self.skip_string(byte)?;
                    if depth == 2 && self.followed_by_colon() {
                        keys.push(self.src[start..self.pos - 1].to_string());
                    }
                }
                b'`' => {
                    self.pos += 1;
                    self.skip_template_literal()?;
                }
                b'/' if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    match self.src[self.pos..].find('\n') {
                        Some(offset) => self.pos += offset + 1,
                        None => return Err(ExtractionFailure::Unterminated),
                    }
                }
                b'/' if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    match self.src[self.pos + 2..].find("*/") {
                        Some(offset) => self.pos += offset + 4,
                        None => return Err(ExtractionFailure::Unterminated),
                    }
                }
                _ => self.pos += 1,
            }
        }

        Err(ExtractionFailure::Unterminated)
    }

    /// Skip a quoted JS string whose opening quote is at `self.pos`.
    fn skip_string(&mut self, quote: u8) -> ParseResult<()> {
        self.pos += 1;
        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'\\' => self.pos += 2,
                b'\n' => {
                    return Err(ExtractionFailure::Malformed(
                        "line break inside string literal".to_string(),
                    ))
                }
                b if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
        Err(ExtractionFailure::Unterminated)
    }

    /// Skip a template literal body; the opening backtick is already consumed.
    fn skip_template_literal(&mut self) -> ParseResult<()> {
        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    return Ok(());
                }
                b'$' if self.bytes.get(self.pos + 1) == Some(&b'{') => {
                    self.pos += 2;
                    self.read_expression()?;
                }
                _ => self.pos += 1,
            }
        }
        Err(ExtractionFailure::Unterminated)
    }

    fn followed_by_colon(&self) -> bool {
        self.src[self.pos..].trim_start().starts_with(':')
    }
}

fn unquote(value: &str) -> Option<String> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))?;
    Some(inner.to_string())
}

/// Decode `\uXXXX` escapes that encode non-ASCII code points.
///
/// ASCII escapes are left alone since they are usually deliberate in code.
/// Surrogate pairs are combined; lone surrogates are kept verbatim.
pub fn decode_unicode_escapes(text: &str) -> Cow<'_, str> {
    if !text.contains("\\u") {
        return Cow::Borrowed(text);
    }

    fn hex_at(text: &str, index: usize) -> Option<u32> {
        let digits = text.get(index + 2..index + 6)?;
        if !text[index..].starts_with("\\u") || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok()
    }

    let mut out = String::with_capacity(text.len());
    let mut index = 0;
    while index < text.len() {
        if let Some(unit) = hex_at(text, index) {
            if (0xD800..0xDC00).contains(&unit) {
                if let Some(low) = hex_at(text, index + 6).filter(|l| (0xDC00..0xE000).contains(l)) {
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(c) = char::from_u32(code) {
                        out.push(c);
                        index += 12;
                        continue;
                    }
                }
            } else if unit >= 0x80 {
                if let Some(c) = char::from_u32(unit) {
                    out.push(c);
                    index += 6;
                    continue;
                }
            }
        }
        let c = text[index..].chars().next().unwrap_or_default();
        out.push(c);
        index += c.len_utf8().max(1);
    }
    Cow::Owned(out)
}
