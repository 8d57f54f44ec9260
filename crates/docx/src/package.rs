//! The zip container around `word/document.xml`.

use std::io::{Read, Seek, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::Result;

/// One archive entry, held in memory so it can be written back unchanged.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub is_dir: bool,
}

/// Every entry of the archive, in archive order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Package {
    entries: Vec<Entry>,
}

impl Package {
    pub fn read<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }
            entries.push(Entry {
                name: file.name().to_string(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data,
            });
        }

        log::debug!("Read {} archive entries", entries.len());
        Ok(Package { entries })
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Write every entry back, substituting `replacement` for the entry named `name`.
    pub fn write<W: Write + Seek>(&self, writer: W, name: &str, replacement: &[u8]) -> Result<W> {
        let mut zip = ZipWriter::new(writer);

        for entry in &self.entries {
            // Stored entries stay stored; anything else is re-deflated.
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options: FileOptions<()> = FileOptions::default().compression_method(method);

            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }

            zip.start_file(entry.name.as_str(), options)?;
            if entry.name == name {
                zip.write_all(replacement)?;
            } else {
                zip.write_all(&entry.data)?;
            }
        }

        Ok(zip.finish()?)
    }
}
