//! Clustal reader and writer.
//!
//! ## Clustal Format
//!
//! ```text
//! CLUSTAL W multiple sequence alignment
//!
//! seq1 MKV-LLA 6
//! seq2 MKVQLLA 7
//!      ***.***
//! ```
//!
//! Blocks repeat every 60 columns. Lines starting with whitespace
//! (conservation rows, blank separators) carry no sequence data.

use std::collections::HashMap;

use crate::model::{translate_name, AlignmentCollection, SequenceRecord, WHITESPACE_NAME_FILTER};

use super::{uniform_length, FileFormat, NameFilter, WriteResult};

/// Columns per block in written files.
pub const BLOCK_WIDTH: usize = 60;

/// Header written at the top of every file.
pub const HEADER: &str = "CLUSTAL W multiple sequence alignment";

/// ClustalX "strong" residue groups, marked `:`.
pub const STRONG_GROUPS: [&str; 9] = [
    "STA", "NEQK", "NHQK", "NDEQ", "QHRK", "MILV", "MILF", "HY", "FYW",
];

/// ClustalX "weak" residue groups, marked `.`.
pub const WEAK_GROUPS: [&str; 11] = [
    "CSA", "ATV", "SAG", "STNK", "STPA", "SGND", "SNDEQK", "NDEQHK", "NEQHRK", "FVLIM", "HFY",
];

/// Options for [`write_clustal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClustalOptions {
    /// Append the running residue count to every sequence line.
    pub numbers: bool,
    /// Truncate names to this many characters.
    pub name_len: Option<usize>,
}

impl Default for ClustalOptions {
    fn default() -> Self {
        Self {
            numbers: true,
            name_len: None,
        }
    }
}

/// True if `line` opens a Clustal file.
pub fn is_clustal_header(line: &str) -> bool {
    let upper = line.to_uppercase();
    upper.starts_with("CLUSTAL W") || upper.starts_with("CLUSTALW")
}

/// Parses Clustal content.
///
/// Fragments are gathered per name in order of first appearance, across
/// all blocks. Returns `None` if the header is missing, a sequence line has
/// no data, or no record is accepted by `filter`.
pub fn parse_clustal(content: &str, filter: &NameFilter) -> Option<AlignmentCollection> {
    let mut lines = content.lines();
    if !is_clustal_header(lines.next()?) {
        return None;
    }

    let mut order: Vec<(String, String)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for line in lines {
        if line.is_empty() || line.starts_with(char::is_whitespace) {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (name, fragment) = (parts.next()?, parts.next()?);
        match positions.get(name) {
            Some(&i) => order[i].1.push_str(fragment),
            None => {
                positions.insert(name.to_string(), order.len());
                order.push((name.to_string(), fragment.to_string()));
            }
        }
    }

    let records: Vec<SequenceRecord> = order
        .into_iter()
        .filter(|(name, _)| filter.accepts(name))
        .map(|(name, residues)| SequenceRecord::new(name, residues))
        .collect();

    if records.is_empty() {
        None
    } else {
        Some(AlignmentCollection::from_records(records))
    }
}

/// Conservation mark for one column.
///
/// `*` for a single repeated residue, `:` if all residues fall in one strong
/// group, `.` for one weak group, blank otherwise. A gap anywhere in the
/// column always gives a blank.
pub fn conservation(column: &[u8]) -> char {
    if column.is_empty() || column.contains(&b'-') {
        return ' ';
    }
    let first = column[0];
    if column.iter().all(|&c| c == first) {
        return '*';
    }
    let within = |group: &str| column.iter().all(|c| group.as_bytes().contains(c));
    if STRONG_GROUPS.iter().any(|g| within(g)) {
        ':'
    } else if WEAK_GROUPS.iter().any(|g| within(g)) {
        '.'
    } else {
        ' '
    }
}

/// Conservation line for a whole alignment of upper-case sequences.
pub fn conservation_line(sequences: &[String], length: usize) -> String {
    (0..length)
        .map(|col| {
            let column: Vec<u8> = sequences.iter().map(|s| s.as_bytes()[col]).collect();
            conservation(&column)
        })
        .collect()
}

/// Renders an alignment as Clustal.
///
/// All records must have the same length.
pub fn write_clustal(aln: &AlignmentCollection, options: &ClustalOptions) -> WriteResult<String> {
    let length = uniform_length(aln, FileFormat::Clustal)?;

    let names: Vec<String> = aln
        .iter()
        .map(|r| {
            let name = translate_name(r.name(), WHITESPACE_NAME_FILTER);
            match options.name_len {
                Some(n) => name.chars().take(n).collect(),
                None => name,
            }
        })
        .collect();
    let sequences: Vec<String> = aln.iter().map(|r| r.residues().to_ascii_uppercase()).collect();
    let name_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    let marks = conservation_line(&sequences, length);

    let mut out = format!("{}\n\n\n", HEADER);
    let mut counts = vec![0usize; sequences.len()];

    for start in (0..length).step_by(BLOCK_WIDTH) {
        let end = (start + BLOCK_WIDTH).min(length);
        for (i, (name, seq)) in names.iter().zip(&sequences).enumerate() {
            let fragment = &seq[start..end];
            out.push_str(&format!("{:<w$} {}", name, fragment, w = name_width));
            if options.numbers {
                counts[i] += fragment.chars().filter(|c| c.is_alphabetic()).count();
                out.push_str(&format!(" {}", counts[i]));
            }
            out.push('\n');
        }
        out.push_str(&format!("{:w$} {}\n\n", "", &marks[start..end], w = name_width));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::WriteError;

    const SAMPLE: &str = "CLUSTAL W (1.83) multiple sequence alignment

seq1 MKV-LLA 6
seq2 MKVQLLA 7
     ***.***

seq1 ST 8
seq2 SA 9
     *:
";

    #[test]
    fn test_parse_interleaved_blocks() {
        let aln = parse_clustal(SAMPLE, &NameFilter::all()).unwrap();
        assert_eq!(aln.names(), vec!["seq1", "seq2"]);
        assert_eq!(aln[0].residues(), "MKV-LLAST");
        assert_eq!(aln[1].residues(), "MKVQLLASA");
    }

    #[test]
    fn test_header_required() {
        assert!(parse_clustal("seq1 ACGT\n", &NameFilter::all()).is_none());
        assert!(parse_clustal("", &NameFilter::all()).is_none());
        assert!(parse_clustal("CLUSTALW\n", &NameFilter::all()).is_none());
    }

    #[test]
    fn test_filter_at_assembly() {
        let aln = parse_clustal(SAMPLE, &NameFilter::prefixes(["seq2"])).unwrap();
        assert_eq!(aln.len(), 1);
        assert_eq!(aln[0].residues(), "MKVQLLASA");
    }

    #[test]
    fn test_conservation_marks() {
        assert_eq!(conservation(b"AAAA"), '*');
        assert_eq!(conservation(b"STA"), ':');
        assert_eq!(conservation(b"CS"), '.');
        assert_eq!(conservation(b"AW"), ' ');
        assert_eq!(conservation(b"A-"), ' ');
        assert_eq!(conservation(b"--"), ' ');
    }

    #[test]
    fn test_write_blocks_and_counts() {
        let long_a: String = "A".repeat(61);
        let long_b: String = format!("-{}", "C".repeat(60));
        let aln: AlignmentCollection = vec![
            SequenceRecord::new("a", long_a),
            SequenceRecord::new("bb b", long_b),
        ]
        .into_iter()
        .collect();
        let text = write_clustal(&aln, &ClustalOptions::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert!(lines[3].starts_with("a    AAAA"));
        assert!(lines[3].ends_with(" 60"));
        assert!(lines[4].starts_with("bb_b -CCC"));
        assert!(lines[4].ends_with(" 59"));
        assert_eq!(lines[7], "a    A 61");
        assert_eq!(lines[8], "bb_b C 60");
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
            write_clustal(&aln, &ClustalOptions::default()),
            Err(WriteError::InvalidAlignment { .. })
        ));
    }

    #[test]
    fn test_round_trip() {
        let aln = parse_clustal(SAMPLE, &NameFilter::all()).unwrap();
        let text = write_clustal(&aln, &ClustalOptions::default()).unwrap();
        assert_eq!(parse_clustal(&text, &NameFilter::all()).unwrap(), aln);
    }
}
