//! Qt Linguist `.ts` reader.
//!
//! Walks the event stream of `quick_xml` with one method per element.
//! Unknown elements are skipped whole; anything structurally wrong aborts
//! the parse, so a caller either gets a complete catalog or an error.

use std::borrow::Cow;
use std::fmt::Display;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::ParseError;
use crate::model::catalog::{Catalog, CatalogHeader, Context};
use crate::model::entry::{LineRef, Location, TranslationEntry, TranslationStatus};

pub fn parse(text: &str) -> Result<Catalog, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let text = normalize_newlines(text);
    let mut r = TsReader::new(&text);

    let (header, contexts) = loop {
        match r.next()? {
            Event::Start(e) => {
                expect_root(&e)?;
                let header = r.header(&e)?;
                break (header, r.read_ts()?);
            }
            Event::Empty(e) => {
                expect_root(&e)?;
                break (r.header(&e)?, Vec::new());
            }
            Event::Text(t) if is_blank(&t) => {}
            Event::Text(_) | Event::CData(_) => {
                return Err(r.xml_error("text before the root element"));
            }
            Event::Eof => return Err(ParseError::MissingRoot),
            _ => {}
        }
    };

    loop {
        match r.next()? {
            Event::Eof => break,
            Event::Text(t) if is_blank(&t) => {}
            Event::Comment(_) | Event::PI(_) => {}
            _ => return Err(ParseError::TrailingContent(r.position())),
        }
    }

    let catalog = Catalog::new(header, contexts);
    debug!(
        language = catalog.language().unwrap_or(""),
        contexts = catalog.contexts().len(),
        entries = catalog.len(),
        "parsed ts document"
    );

    Ok(catalog)
}

// XML 1.0 section 2.11: CRLF and lone CR reach the application as LF.
// `&#13;` is a reference, not a raw CR, and still yields '\r'.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

fn expect_root(e: &BytesStart) -> Result<(), ParseError> {
    if e.name().as_ref() == b"TS" {
        Ok(())
    } else {
        Err(ParseError::UnexpectedRoot(
            String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ))
    }
}

fn is_blank(t: &BytesText) -> bool {
    t.iter().all(u8::is_ascii_whitespace)
}

struct TsReader<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> TsReader<'a> {
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);
        reader.config_mut().check_end_names = true;
        TsReader { reader }
    }

    fn next(&mut self) -> Result<Event<'a>, ParseError> {
        match self.reader.read_event() {
            Ok(ev) => Ok(ev),
            Err(e) => Err(ParseError::Xml {
                position: self.reader.error_position() as u64,
                message: e.to_string(),
            }),
        }
    }

    fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn xml_error(&self, message: impl Display) -> ParseError {
        ParseError::Xml {
            position: self.position(),
            message: message.to_string(),
        }
    }

    fn skip(&mut self, e: &BytesStart<'a>) -> Result<(), ParseError> {
        match self.reader.read_to_end(e.name()) {
            Ok(_) => Ok(()),
            Err(err) => Err(self.xml_error(err)),
        }
    }

    fn attr(&self, e: &BytesStart, name: &str) -> Result<Option<String>, ParseError> {
        let attr = e
            .try_get_attribute(name)
            .map_err(|err| self.xml_error(err))?;

        match attr {
            Some(a) => a
                .unescape_value()
                .map(|v| Some(v.into_owned()))
                .map_err(|err| self.xml_error(err)),
            None => Ok(None),
        }
    }

    fn unescape(&self, t: &BytesText<'a>) -> Result<String, ParseError> {
        t.unescape()
            .map(Cow::into_owned)
            .map_err(|err| self.xml_error(err))
    }

    fn header(&self, e: &BytesStart) -> Result<CatalogHeader, ParseError> {
        Ok(CatalogHeader {
            version: self.attr(e, "version")?,
            language: self.attr(e, "language")?,
            source_language: self.attr(e, "sourcelanguage")?,
        })
    }

    fn read_ts(&mut self) -> Result<Vec<Context>, ParseError> {
        let mut contexts = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"context" => {
                    contexts.push(self.read_context()?);
                }
                Event::Empty(e) if e.name().as_ref() == b"context" => {
                    return Err(ParseError::MissingChild {
                        element: "context",
                        child: "name",
                    });
                }
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(contexts),
                Event::Eof => return Err(ParseError::UnexpectedEof("TS".into())),
                _ => {}
            }
        }
    }

    fn read_context(&mut self) -> Result<Context, ParseError> {
        let mut name = None;
        let mut entries = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"name" => name = Some(self.read_text("name")?),
                    b"message" => entries.push(self.read_message(&e)?),
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"name" => name = Some(String::new()),
                    b"message" => {
                        return Err(ParseError::MissingChild {
                            element: "message",
                            child: "source",
                        });
                    }
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => return Err(ParseError::UnexpectedEof("context".into())),
                _ => {}
            }
        }

        let name = name.ok_or(ParseError::MissingChild {
            element: "context",
            child: "name",
        })?;

        Ok(Context { name, entries })
    }

    fn read_message(&mut self, start: &BytesStart) -> Result<TranslationEntry, ParseError> {
        let numerus = self.attr(start, "numerus")?.as_deref() == Some("yes");

        let mut source = None;
        let mut translation = String::new();
        let mut status = None;
        let mut numerus_forms = numerus.then(Vec::new);
        let mut comment = None;
        let mut extra_comment = None;
        let mut translator_comment = None;
        let mut locations = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"source" => source = Some(self.read_text("source")?),
                    b"translation" => {
                        status = Some(self.status(&e)?);
                        if numerus {
                            let forms = self.read_numerus_forms()?;
                            translation = forms.first().cloned().unwrap_or_default();
                            numerus_forms = Some(forms);
                        } else {
                            translation = self.read_text("translation")?;
                        }
                    }
                    b"comment" => comment = Some(self.read_text("comment")?),
                    b"extracomment" => extra_comment = Some(self.read_text("extracomment")?),
                    b"translatorcomment" => {
                        translator_comment = Some(self.read_text("translatorcomment")?);
                    }
                    b"location" => {
                        locations.push(self.location(&e)?);
                        self.skip(&e)?;
                    }
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"source" => source = Some(String::new()),
                    b"translation" => {
                        status = Some(self.status(&e)?);
                        if numerus {
                            numerus_forms = Some(Vec::new());
                        }
                    }
                    b"comment" => comment = Some(String::new()),
                    b"extracomment" => extra_comment = Some(String::new()),
                    b"translatorcomment" => translator_comment = Some(String::new()),
                    b"location" => locations.push(self.location(&e)?),
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => return Err(ParseError::UnexpectedEof("message".into())),
                _ => {}
            }
        }

        let source_text = source.ok_or(ParseError::MissingChild {
            element: "message",
            child: "source",
        })?;

        Ok(TranslationEntry {
            context: String::new(),
            source_text,
            translation,
            // a message with no <translation> at all has nothing reviewed
            status: status.unwrap_or(TranslationStatus::Unfinished),
            comment,
            extra_comment,
            translator_comment,
            locations,
            numerus_forms,
            placeholder_count: 0,
        })
    }

    fn read_numerus_forms(&mut self) -> Result<Vec<String>, ParseError> {
        let mut forms = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"numerusform" => {
                    forms.push(self.read_text("numerusform")?);
                }
                Event::Empty(e) if e.name().as_ref() == b"numerusform" => forms.push(String::new()),
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(forms),
                Event::Eof => return Err(ParseError::UnexpectedEof("translation".into())),
                _ => {}
            }
        }
    }

    /// Text content up to the closing tag of the current element.
    fn read_text(&mut self, element: &str) -> Result<String, ParseError> {
        let mut out = String::new();

        loop {
            match self.next()? {
                Event::Text(t) => out.push_str(&self.unescape(&t)?),
                Event::CData(c) => out.push_str(&String::from_utf8_lossy(&c)),
                Event::Empty(e) if e.name().as_ref() == b"byte" => out.push(self.byte(&e)?),
                Event::Start(e) => {
                    if e.name().as_ref() == b"byte" {
                        out.push(self.byte(&e)?);
                    }
                    self.skip(&e)?;
                }
                Event::End(_) => return Ok(out),
                Event::Eof => return Err(ParseError::UnexpectedEof(element.to_string())),
                _ => {}
            }
        }
    }

    // <byte value="x1b"/> or <byte value="27"/>
    fn byte(&self, e: &BytesStart) -> Result<char, ParseError> {
        let raw = self.attr(e, "value")?.unwrap_or_default();
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };

        code.and_then(char::from_u32)
            .ok_or(ParseError::InvalidAttribute {
                element: "byte",
                attribute: "value",
                value: raw,
            })
    }

    fn status(&self, e: &BytesStart) -> Result<TranslationStatus, ParseError> {
        let kind = self.attr(e, "type")?;
        TranslationStatus::from_type_attr(kind.as_deref()).ok_or_else(|| {
            ParseError::InvalidAttribute {
                element: "translation",
                attribute: "type",
                value: kind.unwrap_or_default(),
            }
        })
    }

    fn location(&self, e: &BytesStart) -> Result<Location, ParseError> {
        let filename = self.attr(e, "filename")?;
        let line = match self.attr(e, "line")? {
            Some(raw) => Some(LineRef::parse(&raw).ok_or(ParseError::InvalidAttribute {
                element: "location",
                attribute: "line",
                value: raw,
            })?),
            None => None,
        };

        Ok(Location { filename, line })
    }
}
