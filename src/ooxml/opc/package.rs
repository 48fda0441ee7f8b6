/// In-memory OPC package.
///
/// `OpcPackage` holds every part of a package as owned bytes, in archive
/// order, together with the content type map. Parts are looked up by
/// `PackURI`; relationship parts are parsed on demand.
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::content_types::ContentTypeMap;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::{PhysPkgReader, PhysPkgWriter};
use crate::ooxml::opc::rel::Relationships;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

pub struct OpcPackage {
    /// Parts in archive order, `[Content_Types].xml` excluded
    parts: Vec<(PackURI, Vec<u8>)>,
    /// Position of each part in `parts`
    index: HashMap<PackURI, usize>,
    content_types: ContentTypeMap,
}

impl OpcPackage {
    /// Open an OPC package from a file.
    ///
    /// # Example
    /// ```no_run
    /// use pptx_blueprint::ooxml::opc::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("template.pptx").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_members(PhysPkgReader::open(path)?)
    }

    /// Load an OPC package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_members(PhysPkgReader::from_reader(reader)?)
    }

    /// Load an OPC package from its serialized bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    fn from_members(members: Vec<(String, Vec<u8>)>) -> Result<Self> {
        let mut content_types = None;
        let mut parts = Vec::with_capacity(members.len());

        for (name, blob) in members {
            let uri = PackURI::from_membername(&name);
            if uri.as_str() == CONTENT_TYPES_URI {
                content_types = Some(ContentTypeMap::from_xml(&blob)?);
            } else {
                parts.push((uri, blob));
            }
        }

        let content_types = content_types
            .ok_or_else(|| OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()))?;
        let index = parts
            .iter()
            .enumerate()
            .map(|(i, (uri, _))| (uri.clone(), i))
            .collect();

        Ok(Self {
            parts,
            index,
            content_types,
        })
    }

    /// Get the binary content of a part.
    pub fn part(&self, partname: &PackURI) -> Result<&[u8]> {
        self.index
            .get(partname)
            .map(|&i| self.parts[i].1.as_slice())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Check whether a part exists.
    pub fn contains(&self, partname: &PackURI) -> bool {
        self.index.contains_key(partname)
    }

    /// Replace the content of a part, appending it if it is new.
    pub fn set_part(&mut self, partname: PackURI, blob: Vec<u8>) {
        match self.index.get(&partname) {
            Some(&i) => self.parts[i].1 = blob,
            None => {
                self.index.insert(partname.clone(), self.parts.len());
                self.parts.push((partname, blob));
            },
        }
    }

    /// Content type of a part.
    pub fn content_type(&self, partname: &PackURI) -> Result<&str> {
        self.content_types.content_type(partname)
    }

    /// Mutable access to the content type map.
    pub fn content_types_mut(&mut self) -> &mut ContentTypeMap {
        &mut self.content_types
    }

    /// Relationships whose source is `source`. A part without a `.rels`
    /// part has an empty collection.
    pub fn relationships(&self, source: &PackURI) -> Result<Relationships> {
        let rels_uri = source.rels_uri();
        match self.index.get(&rels_uri) {
            Some(&i) => Relationships::from_xml(source.base_uri(), &self.parts[i].1),
            None => Ok(Relationships::new(source.base_uri())),
        }
    }

    /// Write back the relationships of `source`.
    pub fn set_relationships(&mut self, source: &PackURI, rels: &Relationships) {
        self.set_part(source.rels_uri(), rels.to_xml().into_bytes());
    }

    /// Partname of the main document part, found through the package-level
    /// officeDocument relationship.
    pub fn main_document_partname(&self) -> Result<PackURI> {
        let package = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let rels = self.relationships(&package)?;
        let rel = rels
            .first_of_type(relationship_type::OFFICE_DOCUMENT)
            .ok_or_else(|| {
                OpcError::RelationshipNotFound(relationship_type::OFFICE_DOCUMENT.to_string())
            })?;
        rels.target_partname(rel.r_id())
    }

    /// Next free partname of the form `{prefix}{n}.{ext}`, e.g.
    /// `/ppt/media/image3.png`.
    pub fn next_partname(&self, prefix: &str, ext: &str) -> PackURI {
        let mut n = 1;
        loop {
            let candidate = PackURI::from_membername(&format!("{}{}.{}", prefix, n, ext));
            if !self.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Iterate partnames in archive order.
    pub fn partnames(&self) -> impl Iterator<Item = &PackURI> {
        self.parts.iter().map(|(uri, _)| uri)
    }

    /// Serialize the package to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PhysPkgWriter::new();
        writer.add_member(
            &CONTENT_TYPES_URI[1..],
            self.content_types.to_xml().as_bytes(),
        )?;
        for (uri, blob) in &self.parts {
            writer.add_member(uri.membername(), blob)?;
        }
        Ok(writer.finish()?.into_inner())
    }

    /// Serialize the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_package() -> Vec<u8> {
        let mut writer = PhysPkgWriter::new();
        writer
            .add_member(
                "[Content_Types].xml",
                br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#,
            )
            .unwrap();
        writer
            .add_member(
                "_rels/.rels",
                br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#,
            )
            .unwrap();
        writer.add_member("ppt/presentation.xml", b"<p:presentation/>").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_main_document_partname() {
        let pkg = OpcPackage::from_bytes(minimal_package()).unwrap();
        let main = pkg.main_document_partname().unwrap();
        assert_eq!(main.as_str(), "/ppt/presentation.xml");
        assert_eq!(pkg.part(&main).unwrap(), b"<p:presentation/>");
    }

    #[test]
    fn test_missing_content_types() {
        let mut writer = PhysPkgWriter::new();
        writer.add_member("ppt/presentation.xml", b"<p:presentation/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(matches!(
            OpcPackage::from_bytes(bytes),
            Err(OpcError::PartNotFound(_))
        ));
    }

    #[test]
    fn test_set_part_and_next_partname() {
        let mut pkg = OpcPackage::from_bytes(minimal_package()).unwrap();
        let first = pkg.next_partname("ppt/media/image", "png");
        assert_eq!(first.as_str(), "/ppt/media/image1.png");

        pkg.set_part(first.clone(), vec![1, 2, 3]);
        let second = pkg.next_partname("ppt/media/image", "png");
        assert_eq!(second.as_str(), "/ppt/media/image2.png");

        let reopened = OpcPackage::from_bytes(pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.part(&first).unwrap(), &[1, 2, 3]);
        let names: Vec<&str> = reopened.partnames().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            ["/_rels/.rels", "/ppt/presentation.xml", "/ppt/media/image1.png"]
        );
    }

    #[test]
    fn test_relationships_absent_is_empty() {
        let pkg = OpcPackage::from_bytes(minimal_package()).unwrap();
        let pres = PackURI::new("/ppt/presentation.xml").unwrap();
        assert!(pkg.relationships(&pres).unwrap().is_empty());
    }
}
