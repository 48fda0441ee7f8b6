//! The `[Content_Types].xml` part.
//!
//! Implements the OPC content type discovery algorithm: an `Override` for the
//! exact partname wins, otherwise the `Default` for the extension applies.

use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;

/// Content type map, kept in document order for faithful re-serialization.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeMap {
    /// (extension, content type), extension lowercased
    defaults: Vec<(String, String)>,
    /// (partname, content type)
    overrides: Vec<(String, String)>,
}

impl ContentTypeMap {
    /// Parse content types from `[Content_Types].xml`.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) => {
                    let is_default = match e.local_name().as_ref() {
                        b"Default" => Some(true),
                        b"Override" => Some(false),
                        _ => None,
                    };

                    if let Some(is_default) = is_default {
                        let mut key = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = attr
                                .decode_and_unescape_value(reader.decoder())
                                .map_err(|e| OpcError::XmlError(e.to_string()))?
                                .into_owned();
                            match attr.key.as_ref() {
                                b"Extension" | b"PartName" => key = Some(value),
                                b"ContentType" => content_type = Some(value),
                                _ => {},
                            }
                        }

                        match (key, content_type, is_default) {
                            (Some(key), Some(ct), true) => map.add_default(&key, &ct),
                            (Some(key), Some(ct), false) => map.add_override(&key, &ct),
                            _ => {},
                        }
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Look up the content type of a part.
    pub fn content_type(&self, partname: &PackURI) -> Result<&str> {
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(partname.as_str()))
        {
            return Ok(ct);
        }

        let ext = partname.ext().to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
            .ok_or_else(|| OpcError::ContentTypeNotFound(partname.to_string()))
    }

    /// Add a `Default` mapping unless the extension is already mapped.
    pub fn add_default(&mut self, ext: &str, content_type: &str) {
        let ext = ext.to_ascii_lowercase();
        if !self.defaults.iter().any(|(e, _)| *e == ext) {
            self.defaults.push((ext, content_type.to_string()));
        }
    }

    /// Add or replace an `Override` mapping.
    pub fn add_override(&mut self, partname: &str, content_type: &str) {
        match self.overrides.iter_mut().find(|(name, _)| name == partname) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self
                .overrides
                .push((partname.to_string(), content_type.to_string())),
        }
    }

    /// Serialize back to `[Content_Types].xml`.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.overrides.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        let _ = write!(xml, r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES);
        for (ext, ct) in &self.defaults {
            let _ = write!(xml, r#"<Default Extension="{}" ContentType="{}"/>"#, ext, ct);
        }
        for (name, ct) in &self.overrides {
            let _ = write!(xml, r#"<Override PartName="{}" ContentType="{}"/>"#, name, ct);
        }
        xml.push_str("</Types>");
        xml
    }
}
