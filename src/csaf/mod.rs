//! CSAF archive support.
//!
//! A CSAF file starts with a 32-byte header, followed by a fixed-size info
//! section, a name section and the payload. Payload data is addressed in
//! 4096-byte chunks and may be AES-256-CBC encrypted chunk by chunk.
pub mod catalog;
pub mod crypto;
pub mod error;
pub mod extract;
pub mod header;
#[cfg(test)]
pub(crate) mod test_archive;

pub use catalog::{CsafArchive, CsafEntry};
pub use error::CsafError;
pub use extract::{ExtractSummary, extract_archive};
pub use header::{CsafFlags, CsafHeader};

use crate::types::ExtraConfig;
use anyhow::Result;
use std::io::BufReader;
use std::path::Path;

/// Opens the archive at `archive_path` and extracts every entry below `output`.
///
/// Header and catalog errors are returned as [CsafError] inside the
/// [anyhow::Error]. Per-entry failures only show up in the summary.
pub fn extract_file(archive_path: &Path, output: &Path, config: &ExtraConfig) -> Result<ExtractSummary> {
    let file = std::fs::File::open(archive_path)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", archive_path.display(), e))?;
    let mut reader = BufReader::new(file);
    let archive = CsafArchive::read(&mut reader, config)?;
    tracing::info!(
        "{}: {} entries{}",
        archive_path.display(),
        archive.entries.len(),
        if archive.is_encrypted() { ", encrypted" } else { "" }
    );
    extract_archive(&mut reader, &archive, output, config)
}
