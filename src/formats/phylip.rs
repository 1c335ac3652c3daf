//! PHYLIP reader and writer.
//!
//! ## PHYLIP Format
//!
//! The first line contains the number of sequences and the alignment length:
//! ```text
//!  3 20
//! ```
//!
//! ### Sequential Format
//! Each sequence keeps all its lines together:
//! ```text
//!  2 20
//! Seq1      ACGTACGTAC
//! GGGGGGGGGG
//! Seq2      TGCATGCATG
//! CCCCCCCCCC
//! ```
//!
//! ### Interleaved Format
//! Names on the first block, then data continues in subsequent blocks:
//! ```text
//!  2 20
//! Seq1      ACGTACGTAC
//! Seq2      TGCATGCATG
//!
//! GGGGGGGGGG
//! CCCCCCCCCC
//! ```
//!
//! Names are either whitespace-delimited ("relaxed") or exactly the first
//! 10 characters of the line ("strict", as written by PhyML). Neither the
//! layout nor the naming convention is declared in the file, so the reader
//! tries each combination until one yields every sequence at the declared
//! length.

use std::ops::Range;

use log::debug;

use crate::model::{
    translate_name, AlignmentCollection, SequenceRecord, PHYLO_NAME_FILTER, WHITESPACE_NAME_FILTER,
};

use super::{uniform_length, FileFormat, NameFilter, WriteResult};

/// Name width of strict PHYLIP.
pub const STRICT_NAME_WIDTH: usize = 10;

/// Layout of the sequence blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhylipLayout {
    /// Reading only: try interleaved, then sequential. Written as interleaved.
    #[default]
    Auto,
    Interleaved,
    Sequential,
}

/// Options for [`write_phylip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhylipOptions {
    pub layout: PhylipLayout,
    /// Write 10-character names, cleaned for phylogenetics software.
    pub strict: bool,
    /// Approximate maximum line length.
    pub line_width: usize,
    /// Residues per space-separated chunk.
    pub chunk_size: usize,
}

impl Default for PhylipOptions {
    fn default() -> Self {
        Self {
            layout: PhylipLayout::Interleaved,
            strict: false,
            line_width: 70,
            chunk_size: 10,
        }
    }
}

/// Parses a `"<count> <length>"` header line.
pub fn parse_dimensions(line: &str) -> Option<(usize, usize)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [count, length] if is_number(count) && is_number(length) => {
            Some((count.parse().ok()?, length.parse().ok()?))
        }
        _ => None,
    }
}

fn is_number(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Parses PHYLIP content.
///
/// With [`PhylipLayout::Auto`] the candidates are, in order: interleaved
/// and sequential, each first with the requested name convention and then
/// with the other one. The first candidate giving exactly the declared
/// number of sequences, all of the declared length, wins. The name filter is
/// applied afterwards.
pub fn parse_phylip(
    content: &str,
    filter: &NameFilter,
    layout: PhylipLayout,
    strict: bool,
) -> Option<AlignmentCollection> {
    let mut lines = content.lines();
    let (count, length) = parse_dimensions(lines.next()?)?;

    let body: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
    if count == 0 || body.is_empty() || body.len() % count != 0 {
        return None;
    }

    let layouts: &[bool] = match layout {
        PhylipLayout::Auto => &[true, false],
        PhylipLayout::Interleaved => &[true],
        PhylipLayout::Sequential => &[false],
    };
    let candidates = layouts
        .iter()
        .flat_map(|&interleaved| [(interleaved, strict), (interleaved, !strict)]);

    for (interleaved, strict) in candidates {
        if let Some(records) = read_layout(&body, count, length, interleaved, strict) {
            debug!(
                "PHYLIP parsed as {} with {} names",
                if interleaved { "interleaved" } else { "sequential" },
                if strict { "strict" } else { "relaxed" }
            );
            let records: Vec<SequenceRecord> =
                records.into_iter().filter(|r| filter.accepts(r.name())).collect();
            return if records.is_empty() {
                None
            } else {
                Some(AlignmentCollection::from_records(records))
            };
        }
    }
    None
}

/// Reads `count` records with one layout / naming combination.
fn read_layout(
    lines: &[&str],
    count: usize,
    length: usize,
    interleaved: bool,
    strict: bool,
) -> Option<Vec<SequenceRecord>> {
    let per_record = lines.len() / count;
    let mut records = Vec::with_capacity(count);

    for i in 0..count {
        let first = if interleaved { i } else { i * per_record };
        let (name, mut residues) = split_name(lines[first], strict);
        for j in 1..per_record {
            let next = if interleaved { first + j * count } else { first + j };
            residues.extend(lines[next].split_whitespace());
        }
        if residues.len() != length {
            return None;
        }
        records.push(SequenceRecord::new(name, residues));
    }
    Some(records)
}

/// Splits the first line of a record into its name and residues.
fn split_name(line: &str, strict: bool) -> (String, String) {
    if strict {
        let cut = line
            .char_indices()
            .nth(STRICT_NAME_WIDTH)
            .map_or(line.len(), |(i, _)| i);
        let (name, rest) = line.split_at(cut);
        (name.trim().to_string(), rest.split_whitespace().collect())
    } else {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().unwrap_or_default().to_string();
        (name, tokens.collect())
    }
}

/// Renders an alignment as PHYLIP.
///
/// All records must have the same length. Residues are grouped in chunks of
/// `chunk_size`, and chunks are added to a line until the next one would
/// push it past `line_width`. Every record uses the same line breaks, so
/// interleaved blocks stay in step.
pub fn write_phylip(aln: &AlignmentCollection, options: &PhylipOptions) -> WriteResult<String> {
    let length = uniform_length(aln, FileFormat::Phylip)?;

    let names: Vec<String> = if options.strict {
        aln.iter()
            .map(|r| {
                let name: String = translate_name(r.name(), PHYLO_NAME_FILTER)
                    .chars()
                    .take(STRICT_NAME_WIDTH)
                    .collect();
                format!("{:<w$}", name, w = STRICT_NAME_WIDTH)
            })
            .collect()
    } else {
        let cleaned: Vec<String> = aln
            .iter()
            .map(|r| translate_name(r.name(), WHITESPACE_NAME_FILTER))
            .collect();
        let width = cleaned.iter().map(|n| n.chars().count()).max().unwrap_or(0);
        cleaned
            .into_iter()
            .map(|n| format!("{:<w$} ", n, w = width))
            .collect()
    };
    let prefix_width = names.first().map_or(0, |n| n.chars().count());
    let plan = line_plan(length, prefix_width, options.chunk_size, options.line_width);

    let mut out = format!(" {} {}\n", aln.len(), length);
    let render = |out: &mut String, record: &SequenceRecord, name: &str, line: usize| {
        let residues = record.residues();
        if line == 0 {
            out.push_str(name);
        }
        let chunks: Vec<&str> = plan[line].iter().map(|r| &residues[r.clone()]).collect();
        out.push_str(&chunks.join(" "));
        out.push('\n');
    };

    match options.layout {
        PhylipLayout::Sequential => {
            for (record, name) in aln.iter().zip(&names) {
                for line in 0..plan.len() {
                    render(&mut out, record, name, line);
                }
            }
        }
        PhylipLayout::Interleaved | PhylipLayout::Auto => {
            for line in 0..plan.len() {
                if line > 0 {
                    out.push('\n');
                }
                for (record, name) in aln.iter().zip(&names) {
                    render(&mut out, record, name, line);
                }
            }
        }
    }
    Ok(out)
}

/// Chunk ranges for each output line.
///
/// The first line starts after a prefix of `prefix_width` characters.
fn line_plan(
    length: usize,
    prefix_width: usize,
    chunk_size: usize,
    line_width: usize,
) -> Vec<Vec<Range<usize>>> {
    let chunk_size = chunk_size.max(1);
    let mut lines = Vec::new();
    let mut current: Vec<Range<usize>> = Vec::new();
    let mut used = prefix_width;

    for start in (0..length).step_by(chunk_size) {
        let end = (start + chunk_size).min(length);
        let size = end - start;
        if !current.is_empty() && used + 1 + size > line_width {
            lines.push(std::mem::take(&mut current));
            used = 0;
        }
        used += if current.is_empty() { size } else { size + 1 };
        current.push(start..end);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::WriteError;

    fn parse(content: &str) -> Option<AlignmentCollection> {
        parse_phylip(content, &NameFilter::all(), PhylipLayout::Auto, false)
    }

    #[test]
    fn test_parse_sequential_simple() {
        let content = " 3 10
Seq1      ACGTACGTAC
Seq2      TGCATGCATG
Seq3      AAAACCCCGG
";
        let alignment = parse(content).unwrap();
        assert_eq!(alignment.names(), vec!["Seq1", "Seq2", "Seq3"]);
        assert_eq!(alignment[0].residues(), "ACGTACGTAC");
    }

    #[test]
    fn test_parse_sequential_multiline() {
        let content = " 2 20
Seq1      ACGTACGTAC
GGGGGGGGGG
Seq2      TGCATGCATG
CCCCCCCCCC
";
        let alignment = parse(content).unwrap();
        assert_eq!(alignment[0].residues(), "ACGTACGTACGGGGGGGGGG");
        assert_eq!(alignment[1].residues(), "TGCATGCATGCCCCCCCCCC");
    }

    #[test]
    fn test_parse_interleaved() {
        let content = " 3 20
Seq1      ACGTACGTAC
Seq2      TGCATGCATG
Seq3      AAAACCCCGG

GGGGG GGGGG
CCCCCCCCCC
TTTTTTTTTT
";
        let alignment = parse(content).unwrap();
        assert_eq!(alignment.len(), 3);
        assert_eq!(alignment[0].residues(), "ACGTACGTACGGGGGGGGGG");
        assert_eq!(alignment[1].residues(), "TGCATGCATGCCCCCCCCCC");
        assert_eq!(alignment[2].residues(), "AAAACCCCGGTTTTTTTTTT");
    }

    #[test]
    fn test_parse_strict_names() {
        // Ten-character names run straight into the residues.
        let content = "2 6
Sequence01ACGTAC
Sequence02TGCATG
";
        let alignment = parse(content).unwrap();
        assert_eq!(alignment.names(), vec!["Sequence01", "Sequence02"]);
        assert_eq!(alignment[1].residues(), "TGCATG");
    }

    #[test]
    fn test_parse_strict_names_with_spaces() {
        let content = "2 4
my seq 1  ACGT
my seq 2  TTGA
";
        let alignment = parse(content).unwrap();
        assert_eq!(alignment.names(), vec!["my seq 1", "my seq 2"]);
        assert_eq!(alignment[0].residues(), "ACGT");
    }

    #[test]
    fn test_body_not_multiple_of_count() {
        let content = " 3 10
Seq1      ACGTACGTAC
Seq2      TGCATGCATG
";
        assert!(parse(content).is_none());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let content = " 2 10
Seq1 ACGTACGTAC
Seq2 TGCATG
";
        assert!(parse(content).is_none());
    }

    #[test]
    fn test_invalid_header() {
        assert!(parse("invalid\nSeq1 ACGT\n").is_none());
        assert!(parse("0 4\n").is_none());
        assert!(parse("2 4\n").is_none());
    }

    #[test]
    fn test_filter_after_validation() {
        let content = "2 4\nkeep ACGT\ndrop TTGA\n";
        let alignment =
            parse_phylip(content, &NameFilter::prefixes(["keep"]), PhylipLayout::Auto, false).unwrap();
        assert_eq!(alignment.names(), vec!["keep"]);
    }

    #[test]
    fn test_forced_layout() {
        let content = " 2 20
Seq1      ACGTACGTAC
Seq2      TGCATGCATG
GGGGGGGGGG
CCCCCCCCCC
";
        let interleaved =
            parse_phylip(content, &NameFilter::all(), PhylipLayout::Interleaved, false).unwrap();
        assert_eq!(interleaved[0].residues(), "ACGTACGTACGGGGGGGGGG");
        // Sequential reading of this body pulls a name into the residues.
        assert!(parse_phylip(content, &NameFilter::all(), PhylipLayout::Sequential, false).is_none());
    }

    #[test]
    fn test_line_plan() {
        let plan = line_plan(25, 5, 10, 20);
        assert_eq!(plan, vec![vec![0..10], vec![10..20, 20..25]]);
        assert!(line_plan(0, 5, 10, 20).is_empty());
    }

    fn sample() -> AlignmentCollection {
        vec![
            SequenceRecord::new("alpha", "ACGTACGTAC-GTACGTACGTACGTA"),
            SequenceRecord::new("b", "TTGCATGCAT-GCATGCATGCATGCA"),
            SequenceRecord::new("gamma ray", "AAAACCCCGG-TTTTAAAACCCCGGT"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_write_interleaved_round_trip() {
        let options = PhylipOptions {
            line_width: 30,
            ..PhylipOptions::default()
        };
        let text = write_phylip(&sample(), &options).unwrap();
        assert!(text.starts_with(" 3 26\n"));
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.names(), vec!["alpha", "b", "gamma_ray"]);
        for (a, b) in parsed.iter().zip(sample().iter()) {
            assert_eq!(a.residues(), b.residues());
        }
    }

    #[test]
    fn test_write_sequential_round_trip() {
        let options = PhylipOptions {
            layout: PhylipLayout::Sequential,
            line_width: 30,
            ..PhylipOptions::default()
        };
        let text = write_phylip(&sample(), &options).unwrap();
        let parsed =
            parse_phylip(&text, &NameFilter::all(), PhylipLayout::Sequential, false).unwrap();
        assert_eq!(parsed.names(), vec!["alpha", "b", "gamma_ray"]);
        assert_eq!(parsed[2].residues(), "AAAACCCCGG-TTTTAAAACCCCGGT");
    }

    #[test]
    fn test_write_strict_names() {
        let aln: AlignmentCollection = vec![
            SequenceRecord::new("a very long name", "ACGT"),
            SequenceRecord::new("x(1)", "TTGA"),
        ]
        .into_iter()
        .collect();
        let options = PhylipOptions {
            strict: true,
            ..PhylipOptions::default()
        };
        let text = write_phylip(&aln, &options).unwrap();
        assert_eq!(text, " 2 4\na_very_lonACGT\nx1        TTGA\n");
        let parsed = parse_phylip(&text, &NameFilter::all(), PhylipLayout::Auto, true).unwrap();
        assert_eq!(parsed.names(), vec!["a_very_lon", "x1"]);
    }

    #[test]
    fn test_write_requires_alignment() {
        let aln: AlignmentCollection = vec![
            SequenceRecord::new("a", "ACGT"),
            SequenceRecord::new("b", "AC"),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            write_phylip(&aln, &PhylipOptions::default()),
            Err(WriteError::InvalidAlignment { .. })
        ));
    }
}
