//! # alnkey - Multiple Sequence Alignment Toolkit
//!
//! Loads FASTA, Clustal and PHYLIP alignments and computes the per-column
//! statistics used to drive alignment viewers.
//!
//! ## Architecture
//!
//! - `matrix`: substitution matrices, their text loader and the built-in
//!   BLOSUM registry
//! - `model`: sequence records and the alignment collection with its lazy
//!   name index
//! - `formats`: format detection, parsers, writers and file entry points
//! - `analysis`: consensus, variants, identity and variation scores
//!
//! ## Example
//!
//! ```
//! use alnkey::analysis::{consensus, identity};
//! use alnkey::formats::{parse_str, FileFormat, NameFilter};
//!
//! let (aln, format) = parse_str(">s1\nAC-GT\n>s2\nACGGT\n", &NameFilter::all()).unwrap();
//! assert_eq!(format, FileFormat::Fasta);
//! assert_eq!(identity(aln[0].residues(), aln[1].residues()).unwrap(), 80.0);
//! assert_eq!(consensus(aln.records(), false).unwrap(), "ACGGT");
//! ```

pub mod analysis;
pub mod formats;
pub mod matrix;
pub mod model;
