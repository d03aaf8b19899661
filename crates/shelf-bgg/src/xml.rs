// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event-driven parsing of BGG `<items>` documents.
//!
//! The same routine reads `/search` and `/thing` responses; search items
//! simply leave most fields empty. Only direct children of each `<item>`
//! are read, so nested poll results never leak into the record.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use shelf_client::normalize::decode_entities;
use thiserror::Error;

/// One `<item>` element.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BggItem {
    pub id: String,
    pub primary_name: Option<String>,
    pub alternate_name: Option<String>,
    pub year_published: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub min_players: Option<String>,
    pub max_players: Option<String>,
    pub playing_time: Option<String>,
    pub min_age: Option<String>,
    pub designers: Vec<String>,
    pub publishers: Vec<String>,
}

impl BggItem {
    /// Primary name, falling back to the first alternate.
    pub fn name(&self) -> Option<&str> {
        self.primary_name
            .as_deref()
            .or(self.alternate_name.as_deref())
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parse error at position {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    /// The document is well-formed but not an `<items>` list (e.g. `<errors>`).
    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),
    #[error("document is empty")]
    Empty,
}

#[derive(Clone, Copy)]
enum TextField {
    Description,
    Image,
    Thumbnail,
}

/// Parse an `<items>` document into its items, in document order.
pub fn parse_items(xml: &str) -> Result<Vec<BggItem>, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut current: Option<BggItem> = None;
    let mut capture: Option<(TextField, String)> = None;
    let mut seen_root = false;
    let mut depth: usize = 0;

    loop {
        let event = reader.read_event().map_err(|source| ParseError::Xml {
            position: reader.buffer_position() as u64,
            source,
        })?;
        match event {
            Event::Start(ref e) => {
                depth += 1;
                if !seen_root {
                    check_root(e)?;
                    seen_root = true;
                    continue;
                }
                if let Some(item) = current.as_mut() {
                    if depth == 3 {
                        capture = text_field(e).map(|f| (f, String::new()));
                        read_value_element(item, e);
                    }
                } else if depth == 2 && e.name().as_ref() == b"item" {
                    current = Some(new_item(e));
                }
            }
            Event::Empty(ref e) => {
                if !seen_root {
                    check_root(e)?;
                    seen_root = true;
                    continue;
                }
                // Empty elements do not change depth; children of an item sit at depth + 1.
                match (depth + 1, current.as_mut()) {
                    (2, None) if e.name().as_ref() == b"item" => items.push(new_item(e)),
                    (3, Some(item)) => read_value_element(item, e),
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                if let Some((_, buf)) = capture.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::CData(ref e) => {
                if let Some((_, buf)) = capture.as_mut() {
                    // CDATA is literal; escape the ampersands so the decode pass leaves it intact.
                    buf.push_str(&String::from_utf8_lossy(e).replace('&', "&amp;"));
                }
            }
            Event::End(_) => {
                if depth == 3 {
                    if let (Some((field, raw)), Some(item)) = (capture.take(), current.as_mut()) {
                        store_text(item, field, &raw);
                    }
                }
                if depth == 2 {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ParseError::Empty);
    }
    Ok(items)
}

fn check_root(e: &BytesStart<'_>) -> Result<(), ParseError> {
    if e.name().as_ref() == b"items" {
        Ok(())
    } else {
        Err(ParseError::UnexpectedRoot(
            String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ))
    }
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .map(|attr| decode_entities(&String::from_utf8_lossy(&attr.value)))
}

fn new_item(e: &BytesStart<'_>) -> BggItem {
    BggItem {
        id: attribute(e, b"id").unwrap_or_default(),
        ..Default::default()
    }
}

fn text_field(e: &BytesStart<'_>) -> Option<TextField> {
    match e.name().as_ref() {
        b"description" => Some(TextField::Description),
        b"image" => Some(TextField::Image),
        b"thumbnail" => Some(TextField::Thumbnail),
        _ => None,
    }
}

/// Read the `value="..."` style children of an item.
fn read_value_element(item: &mut BggItem, e: &BytesStart<'_>) {
    let value = || {
        attribute(e, b"value")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    match e.name().as_ref() {
        b"name" => {
            let is_primary = attribute(e, b"type").is_some_and(|t| t == "primary");
            if is_primary && item.primary_name.is_none() {
                item.primary_name = value();
            } else if !is_primary && item.alternate_name.is_none() {
                item.alternate_name = value();
            }
        }
        b"yearpublished" => item.year_published = value(),
        b"minplayers" => item.min_players = value(),
        b"maxplayers" => item.max_players = value(),
        b"playingtime" => item.playing_time = value(),
        b"minage" => item.min_age = value(),
        b"link" => {
            let Some(v) = value() else { return };
            match attribute(e, b"type").as_deref() {
                Some("boardgamedesigner") => item.designers.push(v),
                Some("boardgamepublisher") => item.publishers.push(v),
                _ => {}
            }
        }
        _ => {}
    }
}

fn store_text(item: &mut BggItem, field: TextField, raw: &str) {
    // The XML layer is escaped once more on top of BGG's own HTML entities.
    let text = decode_entities(&decode_entities(raw));
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let slot = match field {
        TextField::Description => &mut item.description,
        TextField::Image => &mut item.image,
        TextField::Thumbnail => &mut item.thumbnail,
    };
    *slot = Some(text.to_string());
}
