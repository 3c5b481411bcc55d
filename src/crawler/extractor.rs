//! Streaming link extraction
//!
//! Markup is pushed through a streaming HTML rewriter chunk by chunk; no
//! document tree is ever built. Every start tag is inspected and each
//! `href`, `src` or `action` attribute becomes a [`LinkCandidate`],
//! whatever the tag is.
//!
//! Extraction never fails: a tokenizer error or a read error ends the
//! sequence, and whatever was found before that point has already been (or
//! will still be) yielded.

use html_escape::decode_html_entities;
use lol_html::{element, HtmlRewriter, Settings};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::rc::Rc;

/// Bytes read from the source per step
const CHUNK_SIZE: usize = 8 * 1024;

/// The attribute a candidate was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Href,
    Src,
    Action,
}

impl AttributeKind {
    /// Maps a (lowercase) attribute name to a link-bearing kind
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "href" => Some(Self::Href),
            "src" => Some(Self::Src),
            "action" => Some(Self::Action),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Href => "href",
            Self::Src => "src",
            Self::Action => "action",
        }
    }
}

/// A raw, unresolved link value found in markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub kind: AttributeKind,
    pub value: String,
}

type Found = Rc<RefCell<VecDeque<LinkCandidate>>>;

fn discard(_: &[u8]) {}

/// Lazy iterator of link candidates over a byte source
///
/// The source is read only as far as needed to produce the next candidate.
/// One extractor handles exactly one document and cannot be restarted.
///
/// # Example
///
/// ```
/// use blackscout::crawler::{AttributeKind, LinkExtractor};
///
/// let html = r#"<a href="/about">About</a><img src="logo.png"><form action="/login"></form>"#;
/// let found: Vec<_> = LinkExtractor::new(html.as_bytes())
///     .map(|c| (c.kind, c.value))
///     .collect();
///
/// assert_eq!(
///     found,
///     vec![
///         (AttributeKind::Href, "/about".to_string()),
///         (AttributeKind::Src, "logo.png".to_string()),
///         (AttributeKind::Action, "/login".to_string()),
///     ]
/// );
/// ```
pub struct LinkExtractor<R> {
    source: R,
    rewriter: Option<HtmlRewriter<'static, fn(&[u8])>>,
    found: Found,
    buf: Vec<u8>,
}

impl<R: Read> LinkExtractor<R> {
    pub fn new(source: R) -> Self {
        let found: Found = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&found);

        let rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("*", move |el| {
                    let mut found = sink.borrow_mut();
                    for attr in el.attributes() {
                        if let Some(kind) = AttributeKind::from_name(&attr.name()) {
                            let value = decode_html_entities(&attr.value()).into_owned();
                            found.push_back(LinkCandidate { kind, value });
                        }
                    }
                    Ok(())
                })],
                ..Settings::default()
            },
            discard as fn(&[u8]),
        );

        Self {
            source,
            rewriter: Some(rewriter),
            found,
            buf: vec![0; CHUNK_SIZE],
        }
    }

    /// Feeds one chunk from the source into the tokenizer
    ///
    /// Drops the tokenizer once the source is exhausted or anything fails.
    fn pump(&mut self) {
        let read = match self.source.read(&mut self.buf) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => return,
            Err(e) => {
                tracing::debug!("Body read failed, truncating extraction: {}", e);
                self.rewriter = None;
                return;
            }
        };

        if read == 0 {
            if let Some(rewriter) = self.rewriter.take() {
                if let Err(e) = rewriter.end() {
                    tracing::debug!("Markup ended mid-token: {}", e);
                }
            }
            return;
        }

        if let Some(rewriter) = self.rewriter.as_mut() {
            if let Err(e) = rewriter.write(&self.buf[..read]) {
                tracing::debug!("Malformed markup, truncating extraction: {}", e);
                self.rewriter = None;
            }
        }
    }
}

impl<R: Read> Iterator for LinkExtractor<R> {
    type Item = LinkCandidate;

    fn next(&mut self) -> Option<LinkCandidate> {
        loop {
            if let Some(candidate) = self.found.borrow_mut().pop_front() {
                return Some(candidate);
            }

            self.rewriter.as_ref()?;
            self.pump();
        }
    }
}
