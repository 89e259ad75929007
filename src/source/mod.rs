//! Streaming access to corpus files.
//!
//! Both sources accept a file or a directory. Directories are walked
//! recursively and read in sorted path order; `.gz` files are decompressed on
//! the fly.

pub mod files;
pub mod lines;
pub mod xml;

pub use files::{is_gzip, list_files, open_file, GZIP_EXTENSION};
pub use lines::LineSource;
pub use xml::{XmlElement, XmlEvent, XmlSource};
