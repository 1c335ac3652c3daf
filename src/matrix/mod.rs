//! Substitution matrices.
//!
//! A [`SubstitutionMatrix`] scores every ordered pair of residues from a
//! fixed alphabet. Matrices are read from the NCBI text layout:
//!
//! ```text
//! #  BLOSUM Clustered Scoring Matrix in 1/2 Bit Units
//! #  Entropy =   0.6979, Expected =  -0.5209
//!    A  R  N  D ...
//! A  4 -1 -2 -2 ...
//! R -1  5  0 -2 ...
//! ```
//!
//! The built-in BLOSUM matrices live in [`blosum`] and are resolved by name
//! with [`get_matrix`].

pub mod blosum;

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

pub use blosum::{default_matrix, get_matrix, matrices, MATRIX_NAMES};

/// The 20 standard amino acids. A header row must contain all of them.
pub const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

/// Symbol used by the matrices for gaps and stops.
pub const GAP_SYMBOL: char = '*';

const LN_2: f64 = std::f64::consts::LN_2;

/// Errors raised while loading or resolving substitution matrices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Invalid substitution matrix: {0}")]
    Format(String),

    #[error("Unrecognized substitution matrix name '{name}'. Must be one of: {valid}")]
    UnknownMatrix { name: String, valid: String },
}

/// Result type for matrix operations.
pub type MatrixResult<T> = Result<T, MatrixError>;

/// An immutable residue-by-residue score table.
#[derive(Clone)]
pub struct SubstitutionMatrix {
    name: String,
    alphabet: Vec<char>,
    /// Row-major `alphabet.len()²` scores.
    scores: Vec<f64>,
    /// Byte to alphabet position, lower case and `-` already folded in.
    lookup: [Option<u8>; 256],
    min: f64,
    max: f64,
    lambda: f64,
    entropy: f64,
    expected: f64,
}

impl SubstitutionMatrix {
    /// Parses a matrix in NCBI text layout, requiring the amino acid header.
    pub fn parse(name: impl Into<String>, text: &str) -> MatrixResult<Self> {
        MatrixParser::new().parse(name, text)
    }

    /// Registry name, e.g. `BLOSUM62`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Symbols in header order.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Lowest score in the table.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Highest score in the table.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Scale of the scores, `ln(2) * N / D` for an `N/D Bit Units` matrix.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Relative entropy from the `Entropy =` header field.
    pub fn entropy(&self) -> f64 {
        self.entropy
    }

    /// Expected score from the `Expected =` header field.
    pub fn expected(&self) -> f64 {
        self.expected
    }

    /// Position of `symbol` in the alphabet.
    ///
    /// Case-insensitive; `-` resolves to the gap symbol `*` when the
    /// alphabet carries one.
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        if !symbol.is_ascii() {
            return None;
        }
        self.lookup[symbol as usize].map(usize::from)
    }

    /// Score of substituting `a` with `b`.
    pub fn score(&self, a: char, b: char) -> Option<f64> {
        let row = self.index_of(a)?;
        let col = self.index_of(b)?;
        Some(self.scores[row * self.alphabet.len() + col])
    }

    /// Scores of `symbol` against the whole alphabet, in alphabet order.
    pub fn row(&self, symbol: char) -> Option<&[f64]> {
        self.index_of(symbol).map(|i| self.row_at(i))
    }

    /// Row lookup by raw byte, used by the column analyses.
    pub(crate) fn row_for_byte(&self, byte: u8) -> Option<&[f64]> {
        self.lookup[byte as usize].map(|i| self.row_at(usize::from(i)))
    }

    fn row_at(&self, index: usize) -> &[f64] {
        let n = self.alphabet.len();
        &self.scores[index * n..(index + 1) * n]
    }
}

impl fmt::Debug for SubstitutionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubstitutionMatrix")
            .field("name", &self.name)
            .field("alphabet", &self.alphabet.iter().collect::<String>())
            .field("min", &self.min)
            .field("max", &self.max)
            .field("lambda", &self.lambda)
            .finish()
    }
}

impl fmt::Display for SubstitutionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Loader for matrix descriptions.
///
/// Header lines are scanned top to bottom for the bit-unit scale, the
/// entropy/expected pair and finally the alphabet row; the score grid
/// starts on the line after the alphabet.
#[derive(Debug, Clone)]
pub struct MatrixParser {
    required: Vec<char>,
}

impl Default for MatrixParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixParser {
    /// A parser whose alphabet row must contain the 20 amino acids.
    pub fn new() -> Self {
        Self {
            required: AMINO_ACIDS.chars().collect(),
        }
    }

    /// Replaces the symbols an alphabet row must contain, e.g. `"ACGT"`.
    pub fn required_symbols(mut self, symbols: &str) -> Self {
        self.required = symbols
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        self
    }

    /// Parses `text`, naming the result `name`.
    pub fn parse(&self, name: impl Into<String>, text: &str) -> MatrixResult<SubstitutionMatrix> {
        let name = name.into();
        let lines: Vec<&str> = text.lines().collect();

        let mut lambda = None;
        let mut entropy_expected = None;
        let mut alphabet: Option<(usize, Vec<char>)> = None;

        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.trim().to_uppercase();
            if line.ends_with("BIT UNITS") {
                lambda = Some(parse_bit_units(&line)?);
            } else if line.contains("ENTROPY") && line.contains("EXPECTED") {
                entropy_expected = Some(parse_entropy_expected(&line)?);
            } else if let Some(symbols) = self.alphabet_row(&line) {
                alphabet = Some((idx, symbols));
                break;
            }
        }

        let (lambda, (entropy, expected), (header_idx, alphabet)) =
            match (lambda, entropy_expected, alphabet) {
                (Some(l), Some(e), Some(a)) => (l, e, a),
                _ => {
                    return Err(MatrixError::Format(format!(
                        "could not parse the header of matrix '{}'",
                        name
                    )))
                }
            };

        let mut seen = HashSet::new();
        if let Some(dup) = alphabet.iter().find(|c| !seen.insert(**c)) {
            return Err(MatrixError::Format(format!(
                "duplicate symbol '{}' in the alphabet of '{}'",
                dup, name
            )));
        }

        let n = alphabet.len();
        let position = |symbol: char| alphabet.iter().position(|&c| c == symbol);
        let mut scores = vec![0.0; n * n];
        let mut filled = vec![false; n * n];
        let mut rows_seen = vec![false; n];
        let mut pair_entries = 0usize;
        let mut row_entries = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for raw in &lines[header_idx + 1..] {
            let mut tokens = raw.split_whitespace();
            let Some(symbol) = tokens.next() else {
                continue;
            };
            let row = single_symbol(symbol)
                .and_then(|c| position(c.to_ascii_uppercase()))
                .ok_or_else(|| {
                    MatrixError::Format(format!("unexpected row '{}' in '{}'", symbol, name))
                })?;

            if !rows_seen[row] {
                rows_seen[row] = true;
                row_entries += 1;
            }
            for (col, token) in tokens.take(n).enumerate() {
                let value: f64 = token.parse().map_err(|_| {
                    MatrixError::Format(format!("invalid score '{}' in '{}'", token, name))
                })?;
                let cell = row * n + col;
                if !filled[cell] {
                    filled[cell] = true;
                    pair_entries += 1;
                }
                scores[cell] = value;
                min = min.min(value);
                max = max.max(value);
            }
        }

        if pair_entries + row_entries != n * n + n {
            return Err(MatrixError::Format(format!(
                "matrix '{}' has {} entries, expected {}",
                name,
                pair_entries + row_entries,
                n * n + n
            )));
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(MatrixError::Format(format!("matrix '{}' has no scores", name)));
        }

        Ok(SubstitutionMatrix {
            lookup: build_lookup(&alphabet),
            name,
            alphabet,
            scores,
            min,
            max,
            lambda,
            entropy,
            expected,
        })
    }

    /// Returns the symbols of `line` if it is an alphabet row.
    fn alphabet_row(&self, line: &str) -> Option<Vec<char>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }
        let symbols: Vec<char> = tokens.iter().map(|t| single_symbol(t)).collect::<Option<_>>()?;
        self.required
            .iter()
            .all(|c| symbols.contains(c))
            .then_some(symbols)
    }
}

fn single_symbol(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Some(c),
        _ => None,
    }
}

/// `... in 1/2 Bit Units` gives `ln(2) * 1 / 2`.
fn parse_bit_units(line: &str) -> MatrixResult<f64> {
    let invalid = || MatrixError::Format(format!("invalid bit units line '{}'", line));
    let (before, after) = line.rsplit_once('/').ok_or_else(invalid)?;
    let num: f64 = before
        .split_whitespace()
        .last()
        .and_then(|t| t.parse().ok())
        .ok_or_else(invalid)?;
    let denom: f64 = after
        .split_whitespace()
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(invalid)?;
    Ok(LN_2 * num / denom)
}

/// `#  Entropy =   0.6979, Expected =  -0.5209`
fn parse_entropy_expected(line: &str) -> MatrixResult<(f64, f64)> {
    let invalid = || MatrixError::Format(format!("invalid entropy line '{}'", line));
    let line = line.replace('#', "");
    let (ent, exp) = line.split_once(',').ok_or_else(invalid)?;
    let value = |part: &str| -> MatrixResult<f64> {
        part.split_once('=')
            .and_then(|(_, v)| v.trim().parse().ok())
            .ok_or_else(invalid)
    };
    Ok((value(ent)?, value(exp)?))
}

fn build_lookup(alphabet: &[char]) -> [Option<u8>; 256] {
    let mut lookup = [None; 256];
    for (i, &c) in alphabet.iter().enumerate() {
        let i = Some(i as u8);
        lookup[c as usize] = i;
        lookup[c.to_ascii_lowercase() as usize] = i;
    }
    if !alphabet.contains(&'-') {
        lookup[b'-' as usize] = lookup[GAP_SYMBOL as usize];
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOY: &str = "# Toy matrix in 1/2 Bit Units
# Entropy = 0.5, Expected = -0.25
   A  C
A  4 -2
C -2  9
";

    fn toy() -> SubstitutionMatrix {
        MatrixParser::new()
            .required_symbols("AC")
            .parse("TOY", TOY)
            .unwrap()
    }

    #[test]
    fn test_toy_matrix_bounds() {
        let m = toy();
        assert_eq!(m.min(), -2.0);
        assert_eq!(m.max(), 9.0);
        assert_eq!(m.alphabet(), &['A', 'C']);
        assert!((m.lambda() - LN_2 / 2.0).abs() < 1e-12);
        assert_eq!(m.entropy(), 0.5);
        assert_eq!(m.expected(), -0.25);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let m = toy();
        assert_eq!(m.score('a', 'C'), Some(-2.0));
        assert_eq!(m.score('c', 'c'), Some(9.0));
        assert_eq!(m.row('a'), Some(&[4.0, -2.0][..]));
        assert_eq!(m.score('A', 'G'), None);
    }

    #[test]
    fn test_toy_requires_amino_acid_header_by_default() {
        let result = SubstitutionMatrix::parse("TOY", TOY);
        assert!(matches!(result, Err(MatrixError::Format(_))));
    }

    #[test]
    fn test_missing_entropy_line() {
        let text = "# 1/2 Bit Units\n   A  C\nA 1 0\nC 0 1\n";
        let result = MatrixParser::new().required_symbols("AC").parse("X", text);
        assert!(matches!(result, Err(MatrixError::Format(_))));
    }

    #[test]
    fn test_missing_row_is_rejected() {
        let text = "# 1/2 Bit Units\n# Entropy = 0.1, Expected = -0.1\n   A  C\nA 1 0\n";
        let result = MatrixParser::new().required_symbols("AC").parse("X", text);
        assert!(matches!(result, Err(MatrixError::Format(_))));
    }

    #[test]
    fn test_short_row_is_rejected() {
        let text = "# 1/2 Bit Units\n# Entropy = 0.1, Expected = -0.1\n   A  C\nA 1 0\nC 0\n";
        let result = MatrixParser::new().required_symbols("AC").parse("X", text);
        assert!(matches!(result, Err(MatrixError::Format(_))));
    }

    #[test]
    fn test_empty_body_is_rejected() {
        let text = "# 1/2 Bit Units\n# Entropy = 0.1, Expected = -0.1\n   A  C\n";
        let result = MatrixParser::new().required_symbols("AC").parse("X", text);
        assert!(matches!(result, Err(MatrixError::Format(_))));
    }

    #[test]
    fn test_gap_maps_to_star() {
        let text = "# 1/3 Bit Units\n# Entropy = 0.1, Expected = -0.1\n   A  *\nA 5 -5\n* -5 1\n";
        let m = MatrixParser::new().required_symbols("A").parse("X", text).unwrap();
        assert_eq!(m.score('-', 'a'), Some(-5.0));
        assert_eq!(m.row('-'), m.row('*'));
    }
}
