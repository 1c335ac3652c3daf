//! alnkey - Multiple Sequence Alignment Toolkit
//!
//! ## Usage
//!
//! ```bash
//! alnkey info <sequence_file>
//! alnkey consensus --no-gaps <sequence_file>
//! alnkey variation -m 45 --stdev <sequence_file>
//! alnkey convert -o out.phy --to phylip --strict <sequence_file>
//! alnkey -vv identity -f clustal <sequence_file>  # Force format, debug logs
//! ```
//!
//! ## Supported Formats
//!
//! - FASTA (.fasta, .fa, .fna, .faa, .fas)
//! - Clustal (.aln, .clustal, .clw)
//! - PHYLIP (.phy, .phylip)

#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use alnkey::analysis::{self, Deviation};
use alnkey::formats::{
    self, detect_format_from_extension, ClustalOptions, FastaOptions, FileFormat, NameFilter,
    PhylipLayout, PhylipOptions, WriteFormat,
};
use alnkey::matrix::get_matrix;
use alnkey::model::{AlignmentCollection, PHYLO_NAME_FILTER};

/// File format specification for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Detect from the first line of the file
    Auto,
    /// FASTA format
    Fasta,
    /// Clustal format
    Clustal,
    /// PHYLIP format
    Phylip,
}

impl From<FormatArg> for Option<FileFormat> {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Fasta => Some(FileFormat::Fasta),
            FormatArg::Clustal => Some(FileFormat::Clustal),
            FormatArg::Phylip => Some(FileFormat::Phylip),
            FormatArg::Auto => None,
        }
    }
}

/// Output format for `convert`
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputArg {
    Fasta,
    Clustal,
    Phylip,
}

impl From<OutputArg> for FileFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Fasta => FileFormat::Fasta,
            OutputArg::Clustal => FileFormat::Clustal,
            OutputArg::Phylip => FileFormat::Phylip,
        }
    }
}

/// Input file shared by every command.
#[derive(clap::Args, Debug)]
struct Input {
    /// Sequence file (FASTA, Clustal or PHYLIP format)
    file: PathBuf,

    /// Force a specific file format (overrides auto-detection)
    #[arg(short = 'f', long = "format", value_enum, default_value = "auto")]
    format: FormatArg,

    /// Keep only sequences whose name starts with PREFIX (repeatable)
    #[arg(long = "only", value_name = "PREFIX")]
    only: Vec<String>,
}

impl Input {
    fn load(&self) -> Result<AlignmentCollection> {
        let filter = NameFilter::prefixes(self.only.iter().cloned());
        let aln = match Option::<FileFormat>::from(self.format) {
            Some(format) => formats::load_as(&self.file, format, &filter)?,
            None => formats::load(&self.file, &filter)?,
        };
        Ok(aln)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarise the sequences of a file
    Info {
        #[command(flatten)]
        input: Input,
    },

    /// Print the consensus sequence
    Consensus {
        #[command(flatten)]
        input: Input,

        /// Ignore gaps unless a column holds nothing else
        #[arg(long = "no-gaps")]
        no_gaps: bool,
    },

    /// Print the ranked characters of every column
    Variants {
        #[command(flatten)]
        input: Input,

        /// Keep at most N characters per column
        #[arg(short = 'n', long = "number")]
        number: Option<usize>,
    },

    /// Print the mean pairwise identity
    Identity {
        #[command(flatten)]
        input: Input,

        /// Print the identity of every pair instead of the mean
        #[arg(long = "all")]
        all: bool,
    },

    /// Print the substitution-matrix variation of every column
    Variation {
        #[command(flatten)]
        input: Input,

        /// Substitution matrix (BLOSUM30, 45, 50, 62 or 80)
        #[arg(short = 'm', long = "matrix", default_value = "BLOSUM62")]
        matrix: String,

        /// Use the root mean square of the distances instead of their mean
        #[arg(long = "stdev")]
        stdev: bool,
    },

    /// Filter, clean and write the sequences in another format
    Convert {
        #[command(flatten)]
        input: Input,

        /// Output file. Use "-" for stdout.
        #[arg(short = 'o', long = "output")]
        output: String,

        /// Output format (default: from the output extension)
        #[arg(long = "to", value_enum)]
        to: Option<OutputArg>,

        /// Residues per line (FASTA: unwrapped if absent; PHYLIP: approximate)
        #[arg(long = "line-width")]
        line_width: Option<usize>,

        /// FASTA: split lines into groups of 10 residues
        #[arg(long = "spaces")]
        spaces: bool,

        /// FASTA: prefix lines with residue counts. Clustal: append them.
        #[arg(long = "numbers")]
        numbers: bool,

        /// PHYLIP: 10-character names
        #[arg(long = "strict")]
        strict: bool,

        /// PHYLIP: sequential instead of interleaved layout
        #[arg(long = "sequential")]
        sequential: bool,

        /// Remove gaps from every sequence
        #[arg(long = "strip-gaps")]
        strip_gaps: bool,

        /// Drop sequences without residues
        #[arg(long = "remove-empty")]
        remove_empty: bool,

        /// Drop sequences with fewer residues
        #[arg(long = "min-length")]
        min_length: Option<usize>,

        /// Drop sequences with more residues
        #[arg(long = "max-length")]
        max_length: Option<usize>,

        /// Drop sequences identical to an earlier one
        #[arg(long = "unique")]
        unique: bool,

        /// Make names safe for phylogenetics software
        #[arg(long = "clean-names")]
        clean_names: bool,
    },
}

/// alnkey - Inspect, analyse and convert multiple sequence alignments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG also applies
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run_info(input: &Input) -> Result<()> {
    let aln = input.load()?;
    let mut out = io::stdout().lock();
    writeln!(out, "File:        {}", input.file.display())?;
    writeln!(out, "Sequences:   {}", aln.len())?;
    match aln.alignment_length() {
        Some(length) => writeln!(out, "Alignment:   yes, {} columns", length)?,
        None => {
            let lengths: Vec<usize> = aln.iter().map(|r| r.len()).collect();
            let min = lengths.iter().min().copied().unwrap_or(0);
            let max = lengths.iter().max().copied().unwrap_or(0);
            writeln!(out, "Alignment:   no, lengths {}..={}", min, max)?
        }
    }
    writeln!(out, "Residues:    {}", aln.nongaps())?;
    writeln!(out, "Gaps:        {}", aln.gaps())?;
    Ok(())
}

fn run_variants(input: &Input, number: Option<usize>) -> Result<()> {
    let aln = input.load()?;
    let columns = analysis::variants(aln.records(), number)?;
    let mut out = io::stdout().lock();
    for (pos, column) in columns.iter().enumerate() {
        let ranked: Vec<String> = column.iter().map(|(c, n)| format!("{}:{}", c, n)).collect();
        writeln!(out, "{}\t{}", pos + 1, ranked.join(" "))?;
    }
    Ok(())
}

fn run_identity(input: &Input, all: bool) -> Result<()> {
    let aln = input.load()?;
    let values = analysis::pairwise_identities(aln.records())?;
    let mut out = io::stdout().lock();
    if all {
        let names = aln.names();
        let pairs = (0..names.len()).flat_map(|i| ((i + 1)..names.len()).map(move |j| (i, j)));
        for ((i, j), value) in pairs.zip(&values) {
            writeln!(out, "{}\t{}\t{:.2}", names[i], names[j], value)?;
        }
    } else if let Some(mean) = analysis::mean_identity(&values) {
        writeln!(out, "{:.2}", mean)?;
    }
    Ok(())
}

fn run_variation(input: &Input, matrix: &str, stdev: bool) -> Result<()> {
    let matrix = get_matrix(matrix)?;
    let aln = input.load()?;
    let deviation = if stdev {
        Deviation::StandardDeviation
    } else {
        Deviation::AbsoluteMean
    };
    info!("Scoring variation with {}", matrix.name());
    let scores = analysis::variation(aln.records(), matrix, deviation)?;
    let mut out = io::stdout().lock();
    for (pos, score) in scores.iter().enumerate() {
        writeln!(out, "{}\t{:.4}", pos + 1, score)?;
    }
    Ok(())
}

/// Settings of the `convert` command, once parsed.
struct ConvertSettings {
    output: String,
    to: Option<OutputArg>,
    line_width: Option<usize>,
    spaces: bool,
    numbers: bool,
    strict: bool,
    sequential: bool,
    strip_gaps: bool,
    remove_empty: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    unique: bool,
    clean_names: bool,
}

impl ConvertSettings {
    fn write_format(&self) -> Result<WriteFormat> {
        let format = match self.to {
            Some(to) => FileFormat::from(to),
            None => detect_format_from_extension(&self.output).with_context(|| {
                format!("Cannot infer an output format from '{}'; use --to", self.output)
            })?,
        };
        Ok(match format {
            FileFormat::Fasta => WriteFormat::Fasta(FastaOptions {
                line_width: self.line_width,
                spaces: self.spaces,
                numbers: self.numbers,
            }),
            FileFormat::Clustal => WriteFormat::Clustal(ClustalOptions {
                numbers: self.numbers,
                name_len: None,
            }),
            FileFormat::Phylip => {
                let defaults = PhylipOptions::default();
                WriteFormat::Phylip(PhylipOptions {
                    layout: if self.sequential {
                        PhylipLayout::Sequential
                    } else {
                        PhylipLayout::Interleaved
                    },
                    strict: self.strict,
                    line_width: self.line_width.unwrap_or(defaults.line_width),
                    chunk_size: defaults.chunk_size,
                })
            }
        })
    }

    fn apply(&self, aln: &mut AlignmentCollection) {
        if self.strip_gaps {
            aln.strip_gaps();
        }
        if self.remove_empty {
            aln.remove_empty();
        }
        if let Some(min) = self.min_length {
            aln.remove_shorter(min);
        }
        if let Some(max) = self.max_length {
            aln.remove_longer(max);
        }
        if self.unique {
            aln.make_unique();
        }
        if self.clean_names {
            aln.clean_names(PHYLO_NAME_FILTER);
        }
    }
}

fn run_convert(input: &Input, settings: &ConvertSettings) -> Result<()> {
    let format = settings.write_format()?;
    let mut aln = input.load()?;
    settings.apply(&mut aln);
    if aln.is_empty() {
        bail!("No sequences left to write");
    }

    if settings.output == "-" {
        let text = formats::to_string(&aln, &format)?;
        io::stdout().lock().write_all(text.as_bytes())?;
    } else {
        formats::save(&aln, &settings.output, &format)?;
        eprintln!("Wrote {} sequences to {}", aln.len(), settings.output);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Info { input } => run_info(&input)?,
        Command::Consensus { input, no_gaps } => {
            let aln = input.load()?;
            println!("{}", analysis::consensus(aln.records(), !no_gaps)?);
        }
        Command::Variants { input, number } => run_variants(&input, number)?,
        Command::Identity { input, all } => run_identity(&input, all)?,
        Command::Variation {
            input,
            matrix,
            stdev,
        } => run_variation(&input, &matrix, stdev)?,
        Command::Convert {
            input,
            output,
            to,
            line_width,
            spaces,
            numbers,
            strict,
            sequential,
            strip_gaps,
            remove_empty,
            min_length,
            max_length,
            unique,
            clean_names,
        } => {
            let settings = ConvertSettings {
                output,
                to,
                line_width,
                spaces,
                numbers,
                strict,
                sequential,
                strip_gaps,
                remove_empty,
                min_length,
                max_length,
                unique,
                clean_names,
            };
            run_convert(&input, &settings)?;
        }
    }

    Ok(())
}
