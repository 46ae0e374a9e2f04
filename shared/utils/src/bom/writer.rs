//! Report Writer
//!
//! Serializes a [`BomTable`] to CSV and XML. Both outputs follow the schema
//! order; CSV renders a missing column as an empty cell, XML leaves the
//! element out.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{BomError, BomResult};
use kicad_bom_models::BomTable;

const TAG_ROOT: &str = "schematic";
const TAG_COMPONENT: &str = "component";

/// The two files produced for one output base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: PathBuf,
    pub xml: PathBuf,
}

impl OutputPaths {
    /// Appends `.csv` / `.xml` to `base`; an existing extension is kept
    pub fn from_base(base: &Path) -> Self {
        Self {
            csv: append_extension(base, "csv"),
            xml: append_extension(base, "xml"),
        }
    }
}

fn append_extension(base: &Path, extension: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Element name used for a column: spaces and ampersands become `_`
pub fn xml_tag(column: &str) -> String {
    column.replace([' ', '&'], "_")
}

/// CSV and XML report writer
pub struct ReportWriter {
    indent: Option<usize>,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self { indent: Some(2) }
    }
}

impl ReportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes XML without any indentation
    pub fn compact(mut self) -> Self {
        self.indent = None;
        self
    }

    pub fn write_csv<W: Write>(&self, table: &BomTable, out: W) -> BomResult<()> {
        let mut writer = csv::Writer::from_writer(out);

        writer.write_record(table.schema().iter())?;
        for record in table.records() {
            writer.write_record(
                table
                    .schema()
                    .iter()
                    .map(|column| record.get(column).unwrap_or_default()),
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_xml<W: Write>(&self, table: &BomTable, out: W) -> BomResult<()> {
        let mut writer = match self.indent {
            Some(indent) => Writer::new_with_indent(out, b' ', indent),
            None => Writer::new(out),
        };

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(TAG_ROOT)))?;

        for record in table.records() {
            writer.write_event(Event::Start(BytesStart::new(TAG_COMPONENT)))?;
            for column in table.schema().iter() {
                if let Some(value) = record.get(column) {
                    let tag = xml_tag(column);
                    writer
                        .create_element(&tag)
                        .write_text_content(BytesText::new(value))?;
                }
            }
            writer.write_event(Event::End(BytesEnd::new(TAG_COMPONENT)))?;
        }

        writer.write_event(Event::End(BytesEnd::new(TAG_ROOT)))?;
        writer.into_inner().flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, table: &BomTable, path: &Path) -> BomResult<()> {
        let file = create(path)?;
        self.write_csv(table, file)
            .map_err(|e| BomError::io(path.display().to_string(), e.to_string()))
    }

    pub fn write_xml_file(&self, table: &BomTable, path: &Path) -> BomResult<()> {
        let file = create(path)?;
        self.write_xml(table, file)
            .map_err(|e| BomError::io(path.display().to_string(), e.to_string()))
    }
}

fn create(path: &Path) -> BomResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| BomError::io(path.display().to_string(), e.to_string()))
}
