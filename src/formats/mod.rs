//! Multi-format alignment reader and writer.
//!
//! Supports:
//! - FASTA
//! - Clustal (`CLUSTAL W` header, interleaved blocks)
//! - PHYLIP - sequential and interleaved, relaxed or strict 10-character names
//!
//! The format of a file is decided from its first line alone:
//! 1. `CLUSTAL W` / `CLUSTALW` (any case) → Clustal
//! 2. exactly two unsigned integers → PHYLIP
//! 3. anything else → FASTA
//!
//! The `parse_*` functions return `None` when the content is not valid for
//! their format; the `load*` functions turn that into a [`LoadError`].

pub mod clustal;
pub mod fasta;
pub mod phylip;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::model::AlignmentCollection;

pub use clustal::{parse_clustal, write_clustal, ClustalOptions};
pub use fasta::{parse_fasta, write_fasta, FastaOptions};
pub use phylip::{parse_phylip, write_phylip, PhylipLayout, PhylipOptions};

/// Sequence file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Fasta,
    Clustal,
    Phylip,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Fasta => write!(f, "FASTA"),
            FileFormat::Clustal => write!(f, "Clustal"),
            FileFormat::Phylip => write!(f, "PHYLIP"),
        }
    }
}

/// Errors that can occur while loading a file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not load '{path}' as a {format}-format file of sequences")]
    FileFormat { path: PathBuf, format: FileFormat },
}

/// Errors that can occur while writing a collection.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Cannot write {format} alignment: {reason}")]
    InvalidAlignment { format: FileFormat, reason: String },

    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for write operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Keeps records whose name starts with one of a set of prefixes.
///
/// An empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    prefixes: Vec<String>,
}

impl NameFilter {
    /// A filter that keeps every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter keeping names that start with any of `prefixes`.
    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// True if a record called `name` is kept.
    pub fn accepts(&self, name: &str) -> bool {
        self.prefixes.is_empty() || self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

/// Output format with its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteFormat {
    Fasta(FastaOptions),
    Clustal(ClustalOptions),
    Phylip(PhylipOptions),
}

impl WriteFormat {
    /// The format these options write.
    pub fn file_format(&self) -> FileFormat {
        match self {
            WriteFormat::Fasta(_) => FileFormat::Fasta,
            WriteFormat::Clustal(_) => FileFormat::Clustal,
            WriteFormat::Phylip(_) => FileFormat::Phylip,
        }
    }
}

impl From<FileFormat> for WriteFormat {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Fasta => WriteFormat::Fasta(FastaOptions::default()),
            FileFormat::Clustal => WriteFormat::Clustal(ClustalOptions::default()),
            FileFormat::Phylip => WriteFormat::Phylip(PhylipOptions::default()),
        }
    }
}

/// Decides the format of a file from its first line.
pub fn detect_format(first_line: &str) -> FileFormat {
    if clustal::is_clustal_header(first_line) {
        FileFormat::Clustal
    } else if phylip::parse_dimensions(first_line).is_some() {
        FileFormat::Phylip
    } else {
        FileFormat::Fasta
    }
}

/// Guesses a format from a file extension. Used to pick an output format.
pub fn detect_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FileFormat> {
    let ext = path.as_ref().extension().and_then(OsStr::to_str)?;
    match ext.to_lowercase().as_str() {
        "fa" | "fas" | "fasta" | "fna" | "faa" | "ffn" | "frn" => Some(FileFormat::Fasta),
        "aln" | "clustal" | "clw" => Some(FileFormat::Clustal),
        "phy" | "phylip" | "ph" => Some(FileFormat::Phylip),
        _ => None,
    }
}

/// Parses content with a specific format.
pub fn parse_content(
    content: &str,
    format: FileFormat,
    filter: &NameFilter,
) -> Option<AlignmentCollection> {
    match format {
        FileFormat::Fasta => parse_fasta(content, filter),
        FileFormat::Clustal => parse_clustal(content, filter),
        FileFormat::Phylip => parse_phylip(content, filter, PhylipLayout::Auto, false),
    }
}

/// Parses content after detecting its format from the first line.
pub fn parse_str(content: &str, filter: &NameFilter) -> Option<(AlignmentCollection, FileFormat)> {
    let format = detect_format(content.lines().next().unwrap_or(""));
    debug!("Detected {} format", format);
    parse_content(content, format, filter).map(|aln| (aln, format))
}

/// Loads a sequence file, detecting its format from the first line.
///
/// A file that fails to parse as the detected format is an error; no other
/// format is tried.
pub fn load<P: AsRef<Path>>(path: P, filter: &NameFilter) -> LoadResult<AlignmentCollection> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let format = detect_format(content.lines().next().unwrap_or(""));
    debug!("Detected {} format for {}", format, path.display());
    finish_load(path, format, parse_content(&content, format, filter))
}

/// Loads a sequence file as a given format.
pub fn load_as<P: AsRef<Path>>(
    path: P,
    format: FileFormat,
    filter: &NameFilter,
) -> LoadResult<AlignmentCollection> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    finish_load(path, format, parse_content(&content, format, filter))
}

/// Loads a PHYLIP file with an explicit layout and name convention.
pub fn load_phylip<P: AsRef<Path>>(
    path: P,
    filter: &NameFilter,
    layout: PhylipLayout,
    strict: bool,
) -> LoadResult<AlignmentCollection> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    finish_load(
        path,
        FileFormat::Phylip,
        parse_phylip(&content, filter, layout, strict),
    )
}

fn finish_load(
    path: &Path,
    format: FileFormat,
    parsed: Option<AlignmentCollection>,
) -> LoadResult<AlignmentCollection> {
    let aln = parsed.ok_or_else(|| LoadError::FileFormat {
        path: path.to_path_buf(),
        format,
    })?;
    info!(
        "Loaded {} sequences from {} ({})",
        aln.len(),
        path.display(),
        format
    );
    if !aln.is_alignment() {
        warn!("Sequences in {} have different lengths", path.display());
    }
    Ok(aln)
}

/// Renders a collection in the requested format.
pub fn to_string(aln: &AlignmentCollection, format: &WriteFormat) -> WriteResult<String> {
    match format {
        WriteFormat::Fasta(opts) => Ok(write_fasta(aln, opts)),
        WriteFormat::Clustal(opts) => write_clustal(aln, opts),
        WriteFormat::Phylip(opts) => write_phylip(aln, opts),
    }
}

/// Writes a collection to `path`.
pub fn save<P: AsRef<Path>>(
    aln: &AlignmentCollection,
    path: P,
    format: &WriteFormat,
) -> WriteResult<()> {
    let text = to_string(aln, format)?;
    fs::write(path.as_ref(), text)?;
    info!(
        "Wrote {} sequences to {} ({})",
        aln.len(),
        path.as_ref().display(),
        format.file_format()
    );
    Ok(())
}

/// Writes an ungapped FASTA copy of `aln`; `aln` itself is left untouched.
pub fn save_fasta_sequences<P: AsRef<Path>>(
    aln: &AlignmentCollection,
    path: P,
    options: &FastaOptions,
) -> WriteResult<()> {
    let mut ungapped = aln.copy();
    ungapped.strip_gaps();
    save(&ungapped, path, &WriteFormat::Fasta(options.clone()))
}

/// Shared length of the records for the block-based writers.
///
/// Those writers slice every record at the same column offsets, so residues
/// must be single-byte.
fn uniform_length(aln: &AlignmentCollection, format: FileFormat) -> WriteResult<usize> {
    if let Some(record) = aln.iter().find(|r| !r.residues().is_ascii()) {
        return Err(WriteError::InvalidAlignment {
            format,
            reason: format!("sequence '{}' has non-ASCII residues", record.name()),
        });
    }
    aln.alignment_length()
        .ok_or_else(|| WriteError::InvalidAlignment {
            format,
            reason: if aln.is_empty() {
                "no sequences".to_string()
            } else {
                "sequences have different lengths".to_string()
            },
        })
}
