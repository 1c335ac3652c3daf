//! FASTA reader and writer.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence name, the whole rest of the line
//! ACGTACGTACGT...
//! >another_sequence
//! TGCATGCATGCA...
//! ```
//!
//! Sequence lines are trimmed and concatenated until the next header.

use crate::model::{AlignmentCollection, SequenceRecord};

use super::NameFilter;

/// Residues per space-separated group when [`FastaOptions::spaces`] is set.
pub const SPACE_GROUP: usize = 10;

/// Options for [`write_fasta`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FastaOptions {
    /// Residues per line; `None` writes each sequence on one line.
    pub line_width: Option<usize>,
    /// Split every line into groups of [`SPACE_GROUP`] residues.
    pub spaces: bool,
    /// Prefix every line with the 1-based count of the first non-gap residue
    /// on it.
    pub numbers: bool,
}

/// Parses FASTA content.
///
/// Lines before the first header are ignored. Returns `None` when no record
/// survives (no header at all, or none accepted by `filter`).
pub fn parse_fasta(content: &str, filter: &NameFilter) -> Option<AlignmentCollection> {
    let mut records = Vec::new();
    let mut current: Option<(&str, String)> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some((name, residues)) = current.take() {
                push_filtered(&mut records, filter, name, residues);
            }
            current = Some((header, String::new()));
        } else if let Some((_, residues)) = current.as_mut() {
            residues.push_str(line);
        }
    }

    if let Some((name, residues)) = current {
        push_filtered(&mut records, filter, name, residues);
    }

    if records.is_empty() {
        None
    } else {
        Some(AlignmentCollection::from_records(records))
    }
}

fn push_filtered(records: &mut Vec<SequenceRecord>, filter: &NameFilter, name: &str, residues: String) {
    if filter.accepts(name) {
        records.push(SequenceRecord::new(name, residues));
    }
}

/// Renders every record as FASTA, separated by blank lines.
pub fn write_fasta(aln: &AlignmentCollection, options: &FastaOptions) -> String {
    aln.iter()
        .map(|record| format_record(record, options))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders one record as FASTA.
pub fn format_record(record: &SequenceRecord, options: &FastaOptions) -> String {
    let width = match options.line_width {
        Some(w) if w > 0 => w,
        _ => return format!(">{}\n{}\n", record.name(), record.residues()),
    };

    let residues: Vec<char> = record.residues().chars().collect();
    let number_width = record.nongaps().max(1).to_string().len();
    let mut out = format!(">{}\n", record.name());
    let mut counted = 0usize;

    for line in residues.chunks(width) {
        let mut parts: Vec<String> = Vec::new();
        if options.numbers {
            parts.push(format!("{:>w$}", counted + 1, w = number_width));
        }
        if options.spaces {
            parts.extend(line.chunks(SPACE_GROUP).map(|g| g.iter().collect()));
        } else {
            parts.push(line.iter().collect());
        }
        counted += line.iter().filter(|c| c.is_alphabetic()).count();
        out.push_str(&parts.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> AlignmentCollection {
        parse_fasta(content, &NameFilter::all()).unwrap()
    }

    #[test]
    fn test_parse_simple_fasta() {
        let alignment = parse(">s1\nAC-GT\n>s2\nACGGT\n");
        assert_eq!(alignment.len(), 2);
        assert_eq!(alignment[0].name(), "s1");
        assert_eq!(alignment[0].residues(), "AC-GT");
        assert_eq!(alignment[1].name(), "s2");
        assert_eq!(alignment[1].len(), 5);
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let alignment = parse(">seq1\nACGT\n  TGCA  \nAAAA\n");
        assert_eq!(alignment.len(), 1);
        assert_eq!(alignment[0].residues(), "ACGTTGCAAAAA");
    }

    #[test]
    fn test_whole_header_is_name() {
        let alignment = parse(">seq1 This is a description\nACGT\n");
        assert_eq!(alignment[0].name(), "seq1 This is a description");
    }

    #[test]
    fn test_parse_with_empty_lines() {
        let alignment = parse(">seq1\nACGT\n\n>seq2\n\nTGCA\n");
        assert_eq!(alignment.len(), 2);
        assert_eq!(alignment[1].residues(), "TGCA");
    }

    #[test]
    fn test_no_header_is_no_result() {
        assert!(parse_fasta("", &NameFilter::all()).is_none());
        assert!(parse_fasta("ACGT\nTTTT\n", &NameFilter::all()).is_none());
    }

    #[test]
    fn test_name_filter_applies_to_last_record() {
        let content = ">keep_1\nAAAA\n>drop\nCCCC\n>keep_2\nGGGG\n>drop_last\nTTTT\n";
        let alignment = parse_fasta(content, &NameFilter::prefixes(["keep"])).unwrap();
        assert_eq!(alignment.names(), vec!["keep_1", "keep_2"]);
        assert!(parse_fasta(content, &NameFilter::prefixes(["none"])).is_none());
    }

    #[test]
    fn test_uppercase_preservation() {
        let alignment = parse(">seq1\nacgt\n");
        assert_eq!(alignment[0].residues(), "acgt");
    }

    #[test]
    fn test_write_unwrapped() {
        let alignment = parse(">a\nACGT\n>b\nAC-T\n");
        assert_eq!(write_fasta(&alignment, &FastaOptions::default()), ">a\nACGT\n\n>b\nAC-T\n");
    }

    #[test]
    fn test_write_wrapped_with_numbers() {
        let record = SequenceRecord::new("a", "AC--GTACGTAC");
        let options = FastaOptions {
            line_width: Some(5),
            spaces: false,
            numbers: true,
        };
        assert_eq!(format_record(&record, &options), ">a\n 1 AC--G\n 4 TACGT\n 9 AC\n");
    }

    #[test]
    fn test_write_spaces() {
        let record = SequenceRecord::new("a", "ACGTACGTACGTACGTACGTAC");
        let options = FastaOptions {
            line_width: Some(20),
            spaces: true,
            numbers: false,
        };
        assert_eq!(
            format_record(&record, &options),
            ">a\nACGTACGTAC GTACGTACGT\nAC\n"
        );
    }

    #[test]
    fn test_wrap_multibyte_residues() {
        let record = SequenceRecord::new("a", "A\u{e9}CG\u{e9}T");
        let options = FastaOptions {
            line_width: Some(2),
            spaces: true,
            numbers: false,
        };
        let text = format_record(&record, &options);
        assert_eq!(text, ">a\nA\u{e9}\nCG\n\u{e9}T\n");
        assert_eq!(parse(&text)[0].residues(), record.residues());
    }

    #[test]
    fn test_round_trip_wrapped() {
        let alignment = parse(">a\nACGTACGTAC-GT\n>b\nACGTACGTACAGT\n");
        let options = FastaOptions {
            line_width: Some(4),
            ..FastaOptions::default()
        };
        let reparsed = parse(&write_fasta(&alignment, &options));
        assert_eq!(reparsed, alignment);
    }
}
