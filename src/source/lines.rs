//! Line-by-line reading across one file or a whole directory tree.

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use super::files::{list_files, open_file};
use crate::error::Result;

/// Streams lines from every file under an input path, in sorted order.
///
/// An optional addendum is emitted, line by line, after the last line of each
/// file. The graph readers use `"\n"` so that the end of a file always acts as
/// a blank separator line.
pub struct LineSource {
    files: Vec<PathBuf>,
    next_file: usize,
    reader: Option<Box<dyn BufRead>>,
    addendum: Option<String>,
    pending: VecDeque<String>,
}

impl LineSource {
    pub fn open<P: AsRef<Path>>(input: P, addendum: Option<&str>) -> Result<Self> {
        let files = list_files(input)?;
        Ok(Self {
            files,
            next_file: 0,
            reader: None,
            addendum: addendum.map(str::to_string),
            pending: VecDeque::new(),
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Go back to the first line of the first file.
    pub fn reset(&mut self) {
        self.reader = None;
        self.pending.clear();
        self.next_file = 0;
    }

    /// Release the open file. Nothing more is read until `reset()`.
    pub fn close(&mut self) {
        self.reader = None;
        self.pending.clear();
        self.next_file = self.files.len();
    }

    /// Next line without its line terminator, or `None` at the end of input.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Ok(Some(line));
            }

            if let Some(reader) = self.reader.as_mut() {
                let mut line = String::new();
                if reader.read_line(&mut line)? > 0 {
                    if line.ends_with('\n') {
                        line.pop();
                        if line.ends_with('\r') {
                            line.pop();
                        }
                    }
                    return Ok(Some(line));
                }
                self.reader = None;
                if let Some(addendum) = &self.addendum {
                    self.pending.extend(addendum.lines().map(str::to_string));
                }
                continue;
            }

            if self.next_file >= self.files.len() {
                return Ok(None);
            }
            let path = &self.files[self.next_file];
            self.next_file += 1;
            log::debug!("Reading lines from {}", path.display());
            self.reader = Some(open_file(path)?);
        }
    }
}

impl Iterator for LineSource {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
