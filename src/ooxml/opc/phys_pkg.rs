//! Physical (ZIP) side of an OPC package.
//!
//! Reading loads every archive member into memory in archive order; writing
//! emits members in the order given, Deflate-compressed. Template filling
//! touches only a few parts, so the whole package is held as owned bytes.

use crate::ooxml::opc::error::{OpcError, Result};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

/// A single archive member: ZIP member name and its decompressed content.
pub type Member = (String, Vec<u8>);

/// Reads all members of a ZIP-based OPC package.
pub struct PhysPkgReader;

impl PhysPkgReader {
    /// Read every member of the package at `path`.
    ///
    /// # Errors
    /// Returns `PackageNotFound` if the file does not exist, or a ZIP error if
    /// it is not a valid archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Vec<Member>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Self::from_reader(Cursor::new(data))
    }

    /// Read every member from an in-memory or seekable source.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Vec<Member>> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut members = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut content = Vec::with_capacity(initial_capacity(file.size()));
            file.read_to_end(&mut content)?;
            members.push((name, content));
        }

        Ok(members)
    }
}

/// Upper bound on the buffer reserved up front for one member; larger
/// members grow while being read.
const MAX_RESERVE: u64 = 4 * 1024 * 1024;

/// Buffer size to reserve for a member declaring `size` uncompressed bytes.
/// The declared size comes from the archive and is not trusted.
fn initial_capacity(size: u64) -> usize {
    size.min(MAX_RESERVE) as usize
}

/// Writes package members into a new ZIP archive.
pub struct PhysPkgWriter<W: Write + Seek> {
    zip_writer: ZipWriter<W>,
}

impl PhysPkgWriter<Cursor<Vec<u8>>> {
    /// Create a writer that produces the archive in memory.
    pub fn new() -> Self {
        Self {
            zip_writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }
}

impl Default for PhysPkgWriter<Cursor<Vec<u8>>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Seek> PhysPkgWriter<W> {
    /// Add one member to the archive.
    pub fn add_member(&mut self, name: &str, content: &[u8]) -> Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip_writer.start_file(name, options)?;
        self.zip_writer.write_all(content)?;
        Ok(())
    }

    /// Finish the archive and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip_writer.finish()?)
    }
}
