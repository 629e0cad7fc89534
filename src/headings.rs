//! Heading extraction from chapter documents.
//!
//! Selects `h2`/`h3` elements nested inside the content container (any
//! element whose `class` list contains the configured class) using the
//! `html5ever` tokenizer. Malformed markup is tolerated the same way a
//! browser tolerates it: unmatched end tags are ignored and void elements
//! never open a scope.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use serde::{Deserialize, Serialize};

use crate::scanner::slugify;

/// Default content container class.
pub const DEFAULT_CONTENT_CLASS: &str = "content";

/// A heading entry shown in a page's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level (2 or 3).
    pub level: u8,

    /// Fragment identifier (the element's `id`, or a slug of its text).
    pub id: String,

    /// Whitespace-collapsed heading text.
    pub text: String,
}

impl Heading {
    /// Link target for this heading. `page` is `None` for the current page.
    #[must_use]
    pub fn link(&self, page: Option<&str>) -> String {
        match page {
            Some(href) => format!("{href}#{}", self.id),
            None => format!("#{}", self.id),
        }
    }
}

/// Extracts level 2–3 headings inside the content container of `html`.
#[must_use]
pub fn extract_headings(html: &str, content_class: &str) -> Vec<Heading> {
    let sink = HeadingSink::new(content_class);
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());

    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));
    let _ = tokenizer.feed(&input);
    tokenizer.end();

    tokenizer.sink.take_headings()
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug)]
struct OpenElement {
    name: String,
    is_container: bool,
}

#[derive(Debug)]
struct PendingHeading {
    level: u8,
    tag: String,
    id: Option<String>,
    text: String,
}

#[derive(Debug, Default)]
struct SinkState {
    stack: Vec<OpenElement>,
    current: Option<PendingHeading>,
    headings: Vec<Heading>,
}

impl SinkState {
    fn in_container(&self) -> bool {
        self.stack.iter().any(|e| e.is_container)
    }

    fn start_tag(&mut self, tag: &Tag, content_class: &str) {
        let name = (*tag.name).to_ascii_lowercase();
        if tag.self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            return;
        }

        let level = match name.as_str() {
            "h2" => Some(2),
            "h3" => Some(3),
            _ => None,
        };
        if let Some(level) = level {
            if self.current.is_none() && self.in_container() {
                self.current = Some(PendingHeading {
                    level,
                    tag: name.clone(),
                    id: attr(tag, "id").filter(|id| !id.trim().is_empty()),
                    text: String::new(),
                });
            }
        }

        let is_container = attr(tag, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == content_class));
        self.stack.push(OpenElement { name, is_container });
    }

    fn end_tag(&mut self, tag: &Tag) {
        let name = (*tag.name).to_ascii_lowercase();

        if self.current.as_ref().is_some_and(|h| h.tag == name) {
            if let Some(pending) = self.current.take() {
                self.finish_heading(pending);
            }
        }

        if let Some(pos) = self.stack.iter().rposition(|e| e.name == name) {
            self.stack.truncate(pos);
        }
    }

    fn finish_heading(&mut self, pending: PendingHeading) {
        let text = pending.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() && pending.id.is_none() {
            return;
        }
        let id = pending.id.unwrap_or_else(|| slugify(&text));
        self.headings.push(Heading {
            level: pending.level,
            id,
            text,
        });
    }
}

fn attr(tag: &Tag, name: &str) -> Option<String> {
    tag.attrs
        .iter()
        .find(|a| a.name.local.as_ref() == name)
        .map(|a| a.value.to_string())
}

struct HeadingSink {
    content_class: String,
    state: RefCell<SinkState>,
}

impl HeadingSink {
    fn new(content_class: &str) -> Self {
        Self {
            content_class: content_class.to_string(),
            state: RefCell::new(SinkState::default()),
        }
    }

    fn take_headings(&self) -> Vec<Heading> {
        std::mem::take(&mut self.state.borrow_mut().headings)
    }
}

impl TokenSink for HeadingSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let mut state = self.state.borrow_mut();
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => {
                    state.start_tag(&tag, &self.content_class);
                    // Raw-text elements must not be tokenized as markup.
                    match &*tag.name {
                        "script" => return TokenSinkResult::RawData(RawKind::ScriptData),
                        "style" => return TokenSinkResult::RawData(RawKind::Rawtext),
                        "title" | "textarea" => return TokenSinkResult::RawData(RawKind::Rcdata),
                        _ => {}
                    }
                }
                TagKind::EndTag => state.end_tag(&tag),
            },
            Token::CharacterTokens(text) => {
                if let Some(pending) = state.current.as_mut() {
                    pending.text.push_str(&text);
                }
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}
