//! Streaming XML decoding for memory-bounded processing of large dumps
//!
//! The decoder reads start/end events and only ever holds the chain of open
//! elements plus the subtree of the record currently being built. Once a
//! matching element completes it is handed to the caller and every completed
//! subtree outside an open match is released, so memory is bounded by
//! document depth and record size rather than document size.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::bufread::GzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, Span};

use super::XmlElement;
use crate::errors::{DecodeError, DecodeResult};

/// Leading bytes of every gzip member
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Which completed elements the decoder yields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    /// Every completed element, including the (emptied) root
    All,
    /// Only elements whose tag is in the set
    Tags(HashSet<String>),
    /// Only the root element, with its full subtree
    Document,
}

impl TagFilter {
    /// Build a filter from tag names; an empty list selects every element
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = tags.into_iter().map(Into::into).collect();
        if set.is_empty() {
            TagFilter::All
        } else {
            TagFilter::Tags(set)
        }
    }

    fn matches(&self, tag: &str, depth: usize) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Tags(set) => set.contains(tag),
            TagFilter::Document => depth == 0,
        }
    }
}

/// Owned view of the reader events the decoder acts on
enum Token {
    Start(XmlElement),
    End,
    Text(String),
    Eof,
}

/// Forward-only, single-pass decoder yielding matching elements in document order
pub struct StreamingDecoder<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    filter: TagFilter,
    /// Open elements, root first
    stack: Vec<XmlElement>,
    root_seen: bool,
    finished: bool,
    yielded: usize,
    span: Span,
}

impl StreamingDecoder<Box<dyn BufRead + Send>> {
    /// Open a file, transparently decompressing it when it is gzip encoded
    pub fn open<P: AsRef<Path>>(path: P, filter: TagFilter) -> DecodeResult<Self> {
        let file = File::open(path.as_ref())?;
        debug!("Opened {} for streaming decode", path.as_ref().display());
        Self::from_reader(file, filter)
    }

    /// Wrap any reader, transparently decompressing gzip input
    pub fn from_reader<R: Read + Send + 'static>(
        reader: R,
        filter: TagFilter,
    ) -> DecodeResult<Self> {
        Ok(Self::new(maybe_gunzip(reader)?, filter))
    }
}

impl<R: BufRead> StreamingDecoder<R> {
    /// Create a decoder over uncompressed XML
    pub fn new(reader: R, filter: TagFilter) -> Self {
        let mut reader = Reader::from_reader(reader);
        reader.expand_empty_elements(true);

        Self {
            reader,
            buf: Vec::new(),
            filter,
            stack: Vec::new(),
            root_seen: false,
            finished: false,
            yielded: 0,
            span: Span::none(),
        }
    }

    /// Attach a span that parents this decoder's log events
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Number of elements currently held in memory by the decoder
    pub fn retained_nodes(&self) -> usize {
        self.stack.iter().map(XmlElement::node_count).sum()
    }

    /// Bytes of text held in memory by the decoder, across all retained elements
    pub fn retained_text_bytes(&self) -> usize {
        fn text_bytes(element: &XmlElement) -> usize {
            element.text.len() + element.children.iter().map(text_bytes).sum::<usize>()
        }
        self.stack.iter().map(text_bytes).sum()
    }

    /// Number of elements yielded so far
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    fn next_token(&mut self) -> DecodeResult<Token> {
        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf);
            let position = self.reader.buffer_position();
            let xml_error = |source: quick_xml::Error| DecodeError::Xml { position, source };

            let token = match event.map_err(xml_error)? {
                Event::Start(start) => Token::Start(element_from_start(&start).map_err(xml_error)?),
                Event::End(_) => Token::End,
                Event::Text(text) => Token::Text(text.unescape().map_err(xml_error)?.into_owned()),
                Event::CData(data) => {
                    Token::Text(String::from_utf8_lossy(&data.into_inner()).into_owned())
                }
                Event::Eof => Token::Eof,
                // Declarations, comments, processing instructions, doctypes
                _ => continue,
            };
            return Ok(token);
        }
    }

    /// Index of the outermost open non-root element that matches the filter
    fn retaining_ancestor(&self) -> Option<usize> {
        self.stack
            .iter()
            .enumerate()
            .skip(1)
            .find(|(depth, open)| self.filter.matches(&open.tag, *depth))
            .map(|(depth, _)| depth)
    }

    fn next_element(&mut self) -> DecodeResult<Option<XmlElement>> {
        loop {
            match self.next_token()? {
                Token::Start(element) => {
                    self.root_seen = true;
                    self.stack.push(element);
                }
                Token::Text(text) => {
                    if let Some(open) = self.stack.last_mut() {
                        open.text.push_str(&text);
                    }
                }
                Token::End => {
                    let Some(element) = self.stack.pop() else {
                        continue;
                    };
                    let depth = self.stack.len();
                    let matched = self.filter.matches(&element.tag, depth);

                    if depth == 0 {
                        return Ok(matched.then_some(element));
                    }

                    if !matched {
                        if let Some(parent) = self.stack.last_mut() {
                            parent.push(element);
                        }
                        continue;
                    }

                    // A match nested in another open match stays part of the outer record
                    let retaining = self.retaining_ancestor();
                    if retaining.is_some() {
                        if let Some(parent) = self.stack.last_mut() {
                            parent.push(element.clone());
                        }
                    }

                    let release_to = retaining.unwrap_or(self.stack.len());
                    for open in &mut self.stack[..release_to] {
                        open.children.clear();
                        open.text.clear();
                    }

                    self.yielded += 1;
                    return Ok(Some(element));
                }
                Token::Eof => {
                    if let Some(open) = self.stack.last() {
                        return Err(DecodeError::Truncated {
                            open: self.stack.len(),
                            tag: open.tag.clone(),
                        });
                    }
                    if !self.root_seen {
                        return Err(DecodeError::Empty);
                    }
                    return Ok(None);
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for StreamingDecoder<R> {
    type Item = DecodeResult<XmlElement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.finished = true;
                debug!(parent: &self.span, "Streaming decode finished after {} elements", self.yielded);
                None
            }
            Err(e) => {
                self.finished = true;
                debug!(parent: &self.span, "Streaming decode failed: {}", e);
                Some(Err(e))
            }
        }
    }
}

/// Build an element (without children) from a start tag
fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, quick_xml::Error> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Buffer a reader, inserting a gzip decoder when the stream starts with the gzip magic
pub fn maybe_gunzip<R: Read + Send + 'static>(
    reader: R,
) -> std::io::Result<Box<dyn BufRead + Send>> {
    let mut reader = BufReader::new(reader);
    let compressed = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if compressed {
        Ok(Box::new(BufReader::new(GzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}
