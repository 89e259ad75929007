//! Pull-style XML events across one file or a whole directory tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use super::files::{list_files, open_file};
use crate::error::{GraphFormatError, Result};

/// A start tag with its attributes, unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    Start(XmlElement),
    End(String),
    /// Non-blank character data.
    Text(String),
}

/// Streams XML events from every file under an input path, in sorted order.
///
/// Empty elements are reported as a start event followed by an end event.
pub struct XmlSource {
    files: Vec<PathBuf>,
    next_file: usize,
    current: Option<(PathBuf, Reader<Box<dyn BufRead>>)>,
    buf: Vec<u8>,
}

impl XmlSource {
    pub fn open<P: AsRef<Path>>(input: P) -> Result<Self> {
        let files = list_files(input)?;
        Ok(Self {
            files,
            next_file: 0,
            current: None,
            buf: Vec::new(),
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.next_file = 0;
    }

    pub fn close(&mut self) {
        self.current = None;
        self.next_file = self.files.len();
    }

    fn open_next_file(&mut self) -> Result<bool> {
        self.current = None;
        let Some(path) = self.files.get(self.next_file) else {
            return Ok(false);
        };
        self.next_file += 1;
        log::debug!("Reading XML events from {}", path.display());

        let mut reader = Reader::from_reader(open_file(path)?);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.trim_text(true);
        self.current = Some((path.clone(), reader));
        Ok(true)
    }

    /// Next start, end or text event, or `None` once every file is consumed.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        loop {
            if self.current.is_none() && !self.open_next_file()? {
                return Ok(None);
            }
            let Some((path, reader)) = self.current.as_mut() else {
                return Ok(None);
            };

            self.buf.clear();
            let event = reader
                .read_event_into(&mut self.buf)
                .map_err(|e| xml_error(path, e))?;

            let converted = match event {
                Event::Start(start) => {
                    Some(XmlEvent::Start(element(&start).map_err(|e| xml_error(path, e))?))
                }
                Event::End(end) => Some(XmlEvent::End(
                    String::from_utf8_lossy(end.local_name().as_ref()).into_owned(),
                )),
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| xml_error(path, e))?;
                    if text.trim().is_empty() {
                        None
                    } else {
                        Some(XmlEvent::Text(text.into_owned()))
                    }
                }
                Event::Eof => {
                    self.current = None;
                    continue;
                }
                _ => None,
            };

            if let Some(event) = converted {
                return Ok(Some(event));
            }
        }
    }
}

fn element(start: &BytesStart<'_>) -> std::result::Result<XmlElement, quick_xml::Error> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement { name, attributes })
}

fn xml_error(path: &Path, error: quick_xml::Error) -> GraphFormatError {
    GraphFormatError::Xml {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
