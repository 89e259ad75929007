//! Input file enumeration and transparent gzip decompression

use flate2::read::MultiGzDecoder;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{GraphFormatError, Result};

/// Files with this suffix are decompressed while reading.
pub const GZIP_EXTENSION: &str = ".gz";

/// List the files under `input`.
///
/// A file yields itself. A directory is walked recursively and the files found
/// are sorted by absolute path.
pub fn list_files<P: AsRef<Path>>(input: P) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    if !input.exists() {
        return Err(GraphFormatError::InvalidInput(input.to_path_buf()));
    }
    let root = fs::canonicalize(input)?;
    if root.is_file() {
        return Ok(vec![root]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = entry.map_err(|e| GraphFormatError::Io(e.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    log::debug!("Found {} input files under {}", files.len(), root.display());
    Ok(files)
}

pub fn is_gzip(path: &Path) -> bool {
    path.to_string_lossy().ends_with(GZIP_EXTENSION)
}

/// Open a file for buffered reading, decompressing `.gz` files.
pub fn open_file(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
