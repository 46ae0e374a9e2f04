//! Netlist Loader
//!
//! Reads the `components` section of a KiCad intermediate netlist into
//! [`RawComponent`]s. Everything else in the document (design header,
//! libparts, nets) is skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{BomError, BomResult};
use kicad_bom_models::{RawComponent, RawField};

const TAG_COMPONENTS: &[u8] = b"components";
const TAG_VALUE: &[u8] = b"value";
const TAG_FOOTPRINT: &[u8] = b"footprint";
const TAG_DATASHEET: &[u8] = b"datasheet";
const TAG_FIELDS: &[u8] = b"fields";
const ATTR_REF: &str = "ref";
const ATTR_NAME: &str = "name";

// Element depths, counting the document root as 0
const DEPTH_SECTION: usize = 1;
const DEPTH_COMPONENT: usize = 2;
const DEPTH_PROPERTY: usize = 3;
const DEPTH_FIELD: usize = 4;

/// Components read from one netlist file
#[derive(Debug, Clone)]
pub struct ParsedNetlist {
    pub filename: String,
    pub components: Vec<RawComponent>,
}

/// Loader for the KiCad intermediate netlist format
#[derive(Debug, Default)]
pub struct NetlistLoader;

impl NetlistLoader {
    pub fn new() -> Self {
        Self
    }

    /// Reads and parses a netlist file
    pub fn load_file(&self, path: &Path) -> BomResult<ParsedNetlist> {
        let data = std::fs::read(path)
            .map_err(|e| BomError::io(path.display().to_string(), e.to_string()))?;
        self.parse_bytes(&path.display().to_string(), &data)
    }

    /// Parses netlist XML held in memory
    pub fn parse_bytes(&self, filename: &str, data: &[u8]) -> BomResult<ParsedNetlist> {
        // Text is kept as written; whitespace between elements is never read back
        let mut reader = Reader::from_reader(data);

        let mut state = ParseState::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    state.open(e)?;
                }
                Ok(Event::Empty(ref e)) => {
                    state.open(e)?;
                    state.close()?;
                }
                Ok(Event::Text(e)) => {
                    state.text.push_str(&e.unescape()?);
                }
                Ok(Event::CData(e)) => {
                    state.text.push_str(&String::from_utf8_lossy(&e));
                }
                Ok(Event::End(_)) => {
                    state.close()?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(BomError::parse(format!(
                        "XML parse error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = state.path.last() {
            return Err(BomError::parse(format!(
                "Unexpected end of document in {}: <{}> not closed",
                filename,
                String::from_utf8_lossy(open)
            )));
        }

        if !state.found_section {
            return Err(BomError::parse(format!(
                "No <components> section found in {}",
                filename
            )));
        }

        info!("Parsed {} components from {}", state.components.len(), filename);

        Ok(ParsedNetlist {
            filename: filename.to_string(),
            components: state.components,
        })
    }
}

/// Cursor over the element tree while streaming events
#[derive(Default)]
struct ParseState {
    path: Vec<Vec<u8>>,
    text: String,
    found_section: bool,
    in_section: bool,
    current: Option<RawComponent>,
    field_name: Option<String>,
    components: Vec<RawComponent>,
}

impl ParseState {
    fn open(&mut self, e: &BytesStart) -> BomResult<()> {
        let name = e.name().as_ref().to_vec();
        let depth = self.path.len();

        if depth == DEPTH_SECTION && name == TAG_COMPONENTS && !self.found_section {
            self.found_section = true;
            self.in_section = true;
        } else if depth == DEPTH_COMPONENT && self.in_section {
            let reference = attribute(e, ATTR_REF)?.ok_or_else(|| {
                BomError::parse(format!(
                    "Component #{} has no '{}' attribute",
                    self.components.len() + 1,
                    ATTR_REF
                ))
            })?;
            debug!("Reading component {}", reference);
            self.current = Some(RawComponent::new(reference));
        } else if depth == DEPTH_FIELD && self.current.is_some() && self.parent_is(TAG_FIELDS) {
            let field_name = attribute(e, ATTR_NAME)?.ok_or_else(|| {
                BomError::parse(format!(
                    "A field of component {} has no '{}' attribute",
                    self.current_reference(),
                    ATTR_NAME
                ))
            })?;
            self.field_name = Some(field_name);
        }

        self.path.push(name);
        self.text.clear();
        Ok(())
    }

    fn close(&mut self) -> BomResult<()> {
        let name = self
            .path
            .pop()
            .ok_or_else(|| BomError::parse("Unbalanced closing tag"))?;
        let depth = self.path.len();
        let text = std::mem::take(&mut self.text);

        match depth {
            DEPTH_SECTION if self.in_section => {
                self.in_section = false;
            }
            DEPTH_COMPONENT if self.in_section => {
                if let Some(component) = self.current.take() {
                    self.components.push(component);
                }
            }
            DEPTH_PROPERTY => {
                if let Some(component) = self.current.as_mut() {
                    // First occurrence wins
                    let slot = match name.as_slice() {
                        TAG_VALUE => Some(&mut component.value),
                        TAG_FOOTPRINT => Some(&mut component.footprint),
                        TAG_DATASHEET => Some(&mut component.datasheet),
                        _ => None,
                    };
                    if let Some(slot) = slot {
                        slot.get_or_insert(text);
                    }
                }
            }
            DEPTH_FIELD => {
                if let (Some(component), Some(field_name)) =
                    (self.current.as_mut(), self.field_name.take())
                {
                    component.fields.push(RawField {
                        name: field_name,
                        value: text,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn parent_is(&self, tag: &[u8]) -> bool {
        self.path.last().map_or(false, |parent| parent == tag)
    }

    fn current_reference(&self) -> &str {
        self.current
            .as_ref()
            .map_or("<unknown>", |c| c.reference.as_str())
    }
}

fn attribute(e: &BytesStart, name: &str) -> BomResult<Option<String>> {
    match e.try_get_attribute(name).map_err(quick_xml::Error::from)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}
