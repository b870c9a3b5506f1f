//! Concurrent extraction of archive entries.
use super::catalog::{CsafArchive, CsafEntry};
use super::crypto::decrypt_chunks;
use super::error::CsafError;
use crate::ext::io::*;
use crate::types::ExtraConfig;
use crate::utils::counter::Counter;
use crate::utils::files::{entry_output_path, write_file_all};
use crate::utils::threadpool::ThreadPool;
use anyhow::Result;
use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug)]
/// Outcome of an extraction run.
pub struct ExtractSummary {
    /// Number of entries in the archive.
    pub total: usize,
    /// Number of entries written out.
    pub succeeded: usize,
    /// One [CsafError::EntryExtractionFailed] per failed entry, in no particular order.
    pub failures: Vec<CsafError>,
}

impl ExtractSummary {
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }
}

impl std::fmt::Display for ExtractSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.total)
    }
}

/// Reads the stored bytes of `entry`, chunk padding included when present.
///
/// The last entry of an archive may end at the end of the file without its
/// chunk padding. Plain entries only need `size` bytes; encrypted entries need
/// every chunk in full.
fn read_entry_data<R: Read + Seek>(
    reader: &mut R,
    entry: &CsafEntry,
    stream_len: u64,
    encrypted: bool,
) -> Result<Vec<u8>> {
    let available = stream_len.saturating_sub(entry.offset());
    let padded = entry.padded_size() as u64;
    let needed = if encrypted { padded } else { entry.size as u64 };
    if available < needed {
        return Err(anyhow::anyhow!(
            "entry needs {} bytes at offset {:#x} but only {} remain",
            needed,
            entry.offset(),
            available
        ));
    }
    reader.seek(SeekFrom::Start(entry.offset()))?;
    let data = reader.read_exact_vec(padded.min(available) as usize)?;
    Ok(data)
}

/// Output paths handed out during one run.
///
/// Paths are compared case-insensitively, and a path may not be both a file
/// of one entry and a parent directory of another. The entry that comes first
/// in the catalog keeps the path.
#[derive(Default)]
struct PathClaims {
    files: HashSet<String>,
    dirs: HashSet<String>,
}

impl PathClaims {
    fn key(path: &Path) -> String {
        path.to_string_lossy().to_lowercase()
    }

    fn parents<'a>(path: &'a Path, root: &'a Path) -> impl Iterator<Item = &'a Path> {
        path.ancestors().skip(1).take_while(move |p| *p != root)
    }

    /// Describes why `path` collides with an earlier entry, if it does.
    fn conflict(&self, path: &Path, root: &Path) -> Option<String> {
        let key = Self::key(path);
        if self.files.contains(&key) {
            return Some(format!(
                "output path {} is already used by another entry",
                path.display()
            ));
        }
        if self.dirs.contains(&key) {
            return Some(format!(
                "output path {} is a directory of another entry",
                path.display()
            ));
        }
        Self::parents(path, root)
            .find(|p| self.files.contains(&Self::key(p)))
            .map(|p| format!("parent directory {} is a file of another entry", p.display()))
    }

    fn claim(&mut self, path: &Path, root: &Path) {
        for parent in Self::parents(path, root) {
            self.dirs.insert(Self::key(parent));
        }
        self.files.insert(Self::key(path));
    }
}

fn write_entry(entry: &CsafEntry, mut data: Vec<u8>, path: &Path, encrypted: bool) -> Result<()> {
    if encrypted {
        decrypt_chunks(&mut data, entry.start_chunk)?;
    }
    data.truncate(entry.size as usize);
    write_file_all(path, &data)?;
    Ok(())
}

/// Extracts every entry of `archive` below `output`.
///
/// Payloads are read sequentially from `reader` on the calling thread; decryption
/// and file writes run on a pool of `config.workers` threads. A failing entry is
/// logged and recorded in the summary without stopping the others.
pub fn extract_archive<R: Read + Seek>(
    reader: &mut R,
    archive: &CsafArchive,
    output: &Path,
    config: &ExtraConfig,
) -> Result<ExtractSummary> {
    let pool = ThreadPool::<Result<(), CsafError>>::new(config.workers.max(1), Some("csaf-extract-"))?;
    let counter = Arc::new(Counter::new());
    let encrypted = archive.is_encrypted();
    let stream_len = stream_length(reader)?;
    let mut claims = PathClaims::default();
    let mut failures = Vec::new();
    let mut fail = |entry: &CsafEntry, reason: String| {
        let err = CsafError::entry(&entry.name, reason);
        tracing::error!("{}", err);
        counter.inc_error();
        failures.push(err);
    };

    for entry in archive.entries.iter() {
        let path = match entry_output_path(output, &entry.name) {
            Ok(path) => path,
            Err(e) => {
                fail(entry, format!("{:#}", e));
                continue;
            }
        };
        if let Some(reason) = claims.conflict(&path, output) {
            fail(entry, reason);
            continue;
        }
        let data = match read_entry_data(reader, entry, stream_len, encrypted) {
            Ok(data) => data,
            Err(e) => {
                fail(entry, format!("{:#}", e));
                continue;
            }
        };
        // Only entries that will be written hold on to their path.
        claims.claim(&path, output);
        let entry = entry.clone();
        let counter = Arc::clone(&counter);
        pool.execute(move || match write_entry(&entry, data, &path, encrypted) {
            Ok(()) => {
                counter.inc_ok();
                tracing::info!("extract resource: {}", entry.name);
                Ok(())
            }
            Err(e) => {
                counter.inc_error();
                let err = CsafError::entry(&entry.name, format!("{:#}", e));
                tracing::error!("{}", err);
                Err(err)
            }
        })?;
    }

    failures.extend(pool.into_results().into_iter().filter_map(|r| r.err()));
    let summary = ExtractSummary {
        total: archive.entries.len(),
        succeeded: counter.ok(),
        failures,
    };
    tracing::info!("extract {} files from archive ({})", summary, counter);
    Ok(summary)
}
