//! Column statistics over aligned sequences.
//!
//! Every function here takes the sequences as a slice of anything that
//! dereferences to `str` (plain strings or [`SequenceRecord`]s) and requires
//! them to be aligned, i.e. to share one length. Residues are expected to be
//! ASCII.
//!
//! Columns and sequence pairs are independent, so the work is spread over
//! the rayon thread pool; each task reads the shared inputs and produces its
//! own output slot.
//!
//! [`SequenceRecord`]: crate::model::SequenceRecord

use rayon::prelude::*;
use thiserror::Error;

use crate::matrix::SubstitutionMatrix;
use crate::model::GAP;

const GAP_BYTE: u8 = GAP as u8;

/// Errors raised by the column analyses.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Sequences are not aligned: sequence {index} has length {found}, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("At least 2 sequences are required, got {0}")]
    TooFewSequences(usize),

    #[error("Residue '{residue}' is not in the {matrix} alphabet")]
    UnknownResidue { residue: char, matrix: String },
}

/// Result type for analyses.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// How the per-residue distances of a column are summarised by [`variation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deviation {
    /// Mean of the distances to the column mean.
    #[default]
    AbsoluteMean,
    /// Root mean square of the distances to the column mean.
    StandardDeviation,
}

/// Most frequent character of every column.
///
/// Ties go to the character met first when reading the column from the first
/// sequence to the last. With `allow_gaps` off, gaps are ignored and a column
/// only yields `-` when it holds nothing but gaps.
pub fn consensus<S: AsRef<str> + Sync>(seqs: &[S], allow_gaps: bool) -> AnalysisResult<String> {
    let length = aligned_length(seqs)?;
    let rows = as_rows(seqs);

    let columns: Vec<char> = (0..length)
        .into_par_iter()
        .map(|col| {
            let counts = tally(
                rows.iter()
                    .map(|row| row[col])
                    .filter(|&c| allow_gaps || c != GAP_BYTE),
            );
            most_frequent(&counts).map_or(GAP, char::from)
        })
        .collect();
    Ok(columns.into_iter().collect())
}

/// Characters of every column with their counts, most frequent first.
///
/// Equal counts keep the order in which the characters appear in the
/// column. `number` caps the length of each list.
pub fn variants<S: AsRef<str> + Sync>(
    seqs: &[S],
    number: Option<usize>,
) -> AnalysisResult<Vec<Vec<(char, usize)>>> {
    let length = aligned_length(seqs)?;
    let rows = as_rows(seqs);

    Ok((0..length)
        .into_par_iter()
        .map(|col| {
            let mut counts = tally(rows.iter().map(|row| row[col]));
            counts.sort_by(|a, b| b.1.cmp(&a.1));
            if let Some(n) = number {
                counts.truncate(n);
            }
            counts.into_iter().map(|(c, n)| (char::from(c), n)).collect()
        })
        .collect())
}

/// Percent identity of two aligned sequences.
///
/// Matches are positions where both characters are equal and not gaps; the
/// denominator is the number of positions where at least one of them is not
/// a gap. Two sequences made only of gaps have an identity of 0.
pub fn identity(a: &str, b: &str) -> AnalysisResult<f64> {
    if a.len() != b.len() {
        return Err(AnalysisError::LengthMismatch {
            index: 1,
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(identity_bytes(a.as_bytes(), b.as_bytes()))
}

/// Identity of every unordered pair, in `(0,1), (0,2), .., (1,2), ..` order.
pub fn pairwise_identities<S: AsRef<str> + Sync>(seqs: &[S]) -> AnalysisResult<Vec<f64>> {
    if seqs.len() < 2 {
        return Err(AnalysisError::TooFewSequences(seqs.len()));
    }
    aligned_length(seqs)?;
    let rows = as_rows(seqs);
    let n = rows.len();

    Ok((0..n)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..n)
                .map(|j| identity_bytes(rows[i], rows[j]))
                .collect::<Vec<f64>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect())
}

/// Identity of every sequence of `a` against every sequence of `b`, row-major.
pub fn cross_identities<S, T>(a: &[S], b: &[T]) -> AnalysisResult<Vec<f64>>
where
    S: AsRef<str> + Sync,
    T: AsRef<str> + Sync,
{
    let length = aligned_length(a)?;
    if let Some((index, found)) = b
        .iter()
        .map(|s| s.as_ref().len())
        .enumerate()
        .find(|&(_, len)| !a.is_empty() && len != length)
    {
        return Err(AnalysisError::LengthMismatch {
            index,
            expected: length,
            found,
        });
    }
    let rows_a = as_rows(a);
    let rows_b = as_rows(b);

    Ok(rows_a
        .par_iter()
        .map(|x| {
            rows_b
                .iter()
                .map(|y| identity_bytes(x, y))
                .collect::<Vec<f64>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect())
}

/// Average of a list of identities; `None` when the list is empty.
pub fn mean_identity(identities: &[f64]) -> Option<f64> {
    if identities.is_empty() {
        None
    } else {
        Some(identities.iter().sum::<f64>() / identities.len() as f64)
    }
}

/// Substitution-matrix variation score of every column.
///
/// Each residue of a column is replaced by its row in `matrix` (gaps use the
/// gap symbol row), giving one score vector per residue. The column score
/// summarises the Euclidean distances between those vectors and their mean,
/// as selected by `deviation`. A column with a single distinct character
/// scores 0.
pub fn variation<S: AsRef<str> + Sync>(
    seqs: &[S],
    matrix: &SubstitutionMatrix,
    deviation: Deviation,
) -> AnalysisResult<Vec<f64>> {
    let length = aligned_length(seqs)?;
    let rows = as_rows(seqs);

    (0..length)
        .into_par_iter()
        .map(|col| {
            let column: Vec<u8> = rows.iter().map(|row| row[col]).collect();
            column_variation(&column, matrix, deviation)
        })
        .collect()
}

fn column_variation(
    column: &[u8],
    matrix: &SubstitutionMatrix,
    deviation: Deviation,
) -> AnalysisResult<f64> {
    let Some(&first) = column.first() else {
        return Ok(0.0);
    };
    if column.iter().all(|&c| c == first) {
        return Ok(0.0);
    }

    let vectors = column
        .iter()
        .map(|&c| {
            matrix
                .row_for_byte(c)
                .ok_or_else(|| AnalysisError::UnknownResidue {
                    residue: char::from(c),
                    matrix: matrix.name().to_string(),
                })
        })
        .collect::<AnalysisResult<Vec<&[f64]>>>()?;

    let count = vectors.len() as f64;
    let mut mean = vec![0.0; matrix.alphabet().len()];
    for vector in &vectors {
        for (m, v) in mean.iter_mut().zip(vector.iter()) {
            *m += v;
        }
    }
    mean.iter_mut().for_each(|m| *m /= count);

    let distances = vectors.iter().map(|vector| {
        vector
            .iter()
            .zip(&mean)
            .map(|(v, m)| (v - m) * (v - m))
            .sum::<f64>()
            .sqrt()
    });

    Ok(match deviation {
        Deviation::AbsoluteMean => distances.sum::<f64>() / count,
        Deviation::StandardDeviation => (distances.map(|d| d * d).sum::<f64>() / count).sqrt(),
    })
}

/// Shared length of `seqs`, 0 for an empty slice.
fn aligned_length<S: AsRef<str>>(seqs: &[S]) -> AnalysisResult<usize> {
    let Some(first) = seqs.first() else {
        return Ok(0);
    };
    let expected = first.as_ref().len();
    match seqs
        .iter()
        .map(|s| s.as_ref().len())
        .enumerate()
        .find(|&(_, len)| len != expected)
    {
        Some((index, found)) => Err(AnalysisError::LengthMismatch {
            index,
            expected,
            found,
        }),
        None => Ok(expected),
    }
}

fn as_rows<S: AsRef<str>>(seqs: &[S]) -> Vec<&[u8]> {
    seqs.iter().map(|s| s.as_ref().as_bytes()).collect()
}

/// Character counts in order of first appearance.
fn tally(column: impl Iterator<Item = u8>) -> Vec<(u8, usize)> {
    let mut counts: Vec<(u8, usize)> = Vec::new();
    for c in column {
        match counts.iter_mut().find(|(seen, _)| *seen == c) {
            Some((_, n)) => *n += 1,
            None => counts.push((c, 1)),
        }
    }
    counts
}

fn most_frequent(counts: &[(u8, usize)]) -> Option<u8> {
    let mut best: Option<(u8, usize)> = None;
    for &(c, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((c, n));
        }
    }
    best.map(|(c, _)| c)
}

fn identity_bytes(a: &[u8], b: &[u8]) -> f64 {
    let mut matches = 0usize;
    let mut total = 0usize;
    for (&x, &y) in a.iter().zip(b) {
        if x == GAP_BYTE && y == GAP_BYTE {
            continue;
        }
        total += 1;
        if x == y {
            matches += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        100.0 * matches as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{default_matrix, get_matrix, MatrixParser};
    use crate::model::SequenceRecord;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_consensus_first_seen_tie() {
        assert_eq!(consensus(&["A", "C", "A", "C"], true).unwrap(), "A");
        assert_eq!(consensus(&["C", "A", "A", "C"], true).unwrap(), "C");
    }

    #[test]
    fn test_consensus_gap_modes() {
        let seqs = ["A-", "A-", "CG"];
        assert_eq!(consensus(&seqs, true).unwrap(), "A-");
        assert_eq!(consensus(&seqs, false).unwrap(), "AG");
        assert_eq!(consensus(&["--", "-A"], false).unwrap(), "-A");
    }

    #[test]
    fn test_consensus_on_records() {
        let records = vec![
            SequenceRecord::new("a", "ACGT"),
            SequenceRecord::new("b", "ACGA"),
            SequenceRecord::new("c", "TCGA"),
        ];
        assert_eq!(consensus(&records, true).unwrap(), "ACGA");
    }

    #[test]
    fn test_consensus_length_mismatch() {
        assert_eq!(
            consensus(&["ACGT", "ACGT", "AC"], true),
            Err(AnalysisError::LengthMismatch {
                index: 2,
                expected: 4,
                found: 2
            })
        );
        assert_eq!(consensus::<&str>(&[], true).unwrap(), "");
    }

    #[test]
    fn test_variants_ranked() {
        let seqs = ["AT", "CT", "C-", "AT", "GT"];
        let columns = variants(&seqs, None).unwrap();
        assert_eq!(columns[0], vec![('A', 2), ('C', 2), ('G', 1)]);
        assert_eq!(columns[1], vec![('T', 4), ('-', 1)]);

        let capped = variants(&seqs, Some(1)).unwrap();
        assert_eq!(capped[0], vec![('A', 2)]);
    }

    #[test]
    fn test_identity_counts_gap_against_residue() {
        assert!(close(identity("AC-GT", "ACGGT").unwrap(), 80.0));
    }

    #[test]
    fn test_identity_properties() {
        let a = "MKV-LLA-ST";
        let b = "MKVQLL--SA";
        assert!(close(identity(a, a).unwrap(), 100.0));
        assert!(close(identity(a, b).unwrap(), identity(b, a).unwrap()));
        // Double gaps are left out of the denominator.
        assert!(close(identity(a, b).unwrap(), 100.0 * 6.0 / 9.0));
        assert_eq!(identity("---", "---").unwrap(), 0.0);
    }

    #[test]
    fn test_identity_length_mismatch() {
        assert!(matches!(
            identity("ACGT", "ACG"),
            Err(AnalysisError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_pairwise_identities() {
        let seqs = ["AAAA", "AAAC", "CCCC"];
        let values = pairwise_identities(&seqs).unwrap();
        assert_eq!(values.len(), 3);
        assert!(close(values[0], 75.0));
        assert!(close(values[1], 0.0));
        assert!(close(values[2], 25.0));
        assert!(close(mean_identity(&values).unwrap(), 100.0 / 3.0));

        assert_eq!(
            pairwise_identities(&["AAAA"]),
            Err(AnalysisError::TooFewSequences(1))
        );
        assert_eq!(mean_identity(&[]), None);
    }

    #[test]
    fn test_cross_identities() {
        let values = cross_identities(&["AAAA", "CCCC"], &["AAAC", "AACC", "ACCC"]).unwrap();
        assert_eq!(values.len(), 6);
        assert!(close(values[0], 75.0));
        assert!(close(values[5], 75.0));
        assert!(cross_identities(&["AAAA"], &["AA"]).is_err());
    }

    #[test]
    fn test_uniform_column_has_no_variation() {
        for name in ["30", "62", "80"] {
            let matrix = get_matrix(name).unwrap();
            let scores = variation(&["A", "A", "A", "A"], matrix, Deviation::AbsoluteMean).unwrap();
            assert_eq!(scores, vec![0.0]);
        }
        let scores = variation(&["-", "-"], default_matrix(), Deviation::StandardDeviation).unwrap();
        assert_eq!(scores, vec![0.0]);
    }

    #[test]
    fn test_variation_toy_matrix() {
        let matrix = MatrixParser::new()
            .required_symbols("AC")
            .parse(
                "TOY",
                "# Toy matrix in 1/2 Bit Units\n# Entropy = 0.5, Expected = -0.25\n   A  C\nA  4 -2\nC -2  9\n",
            )
            .unwrap();
        // Column AAC: mean vector (2, 5/3); A lies at sqrt(157)/3, C twice as far.
        let d = (157.0f64).sqrt() / 3.0;
        let mean = variation(&["A", "A", "C"], &matrix, Deviation::AbsoluteMean).unwrap();
        assert!(close(mean[0], 4.0 * d / 3.0));
        let rms = variation(&["A", "A", "C"], &matrix, Deviation::StandardDeviation).unwrap();
        assert!(close(rms[0], 2.0f64.sqrt() * d));
    }

    #[test]
    fn test_variation_case_and_gaps() {
        let matrix = default_matrix();
        let scores = variation(&["Aa", "aA", "a-"], matrix, Deviation::AbsoluteMean).unwrap();
        assert_eq!(scores[0], 0.0);
        assert!(scores[1] > 0.0);
    }

    #[test]
    fn test_variation_unknown_residue() {
        let result = variation(&["A", "J"], default_matrix(), Deviation::AbsoluteMean);
        assert_eq!(
            result,
            Err(AnalysisError::UnknownResidue {
                residue: 'J',
                matrix: "BLOSUM62".to_string()
            })
        );
    }
}
