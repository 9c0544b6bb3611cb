//! Command line argument parsing for the Phalanx CLI using clap.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Phalanx - composable searchers over an in-memory document set
#[derive(Parser, Debug, Clone)]
#[command(name = "phalanx")]
#[command(about = "Run term, boolean, phrase and nested queries over JSON documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Phalanx Contributors")]
#[command(long_about = None)]
pub struct PhalanxArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Searcher configuration file (JSON)
    #[arg(long, value_name = "CONFIG_FILE", env = "PHALANX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PhalanxArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run a boolean query built from term clauses
    Search(SearchArgs),

    /// Run a phrase query
    Phrase(PhraseArgs),

    /// Join term clauses on a shared ancestor
    Nested(NestedArgs),
}

/// A `field:term` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field: String,
    pub term: String,
}

impl FromStr for Clause {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((field, term)) if !field.is_empty() && !term.is_empty() => Ok(Clause {
                field: field.to_string(),
                term: term.to_lowercase(),
            }),
            _ => Err(format!("expected FIELD:TERM, got '{s}'")),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.term)
    }
}

/// Arguments for boolean search
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Document file (JSON array)
    #[arg(short, long, value_name = "DOCS_FILE")]
    pub docs: PathBuf,

    /// Clause every match must satisfy
    #[arg(long, value_name = "FIELD:TERM")]
    pub must: Vec<Clause>,

    /// Clause that contributes to the score
    #[arg(long, value_name = "FIELD:TERM")]
    pub should: Vec<Clause>,

    /// Clause that excludes a match
    #[arg(long = "must-not", value_name = "FIELD:TERM")]
    pub must_not: Vec<Clause>,

    /// Minimum number of should clauses that must match
    #[arg(long, default_value = "0")]
    pub min: usize,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Include score explanations
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for phrase search
#[derive(Parser, Debug, Clone)]
pub struct PhraseArgs {
    /// Document file (JSON array)
    #[arg(short, long, value_name = "DOCS_FILE")]
    pub docs: PathBuf,

    /// Field to match the phrase in
    #[arg(long)]
    pub field: String,

    /// Positional distance allowed between phrase terms
    #[arg(short, long, default_value = "0")]
    pub slop: u32,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Include score explanations
    #[arg(long)]
    pub explain: bool,

    /// Phrase terms; `a|b` accepts either term, `_` marks a gap
    #[arg(value_name = "TERM", required = true)]
    pub terms: Vec<String>,
}

impl PhraseArgs {
    /// Phrase slots in the form the phrase searcher expects.
    pub fn slots(&self) -> Vec<Vec<String>> {
        self.terms
            .iter()
            .map(|term| {
                if term == "_" {
                    Vec::new()
                } else {
                    term.split('|')
                        .filter(|t| !t.is_empty())
                        .map(str::to_lowercase)
                        .collect()
                }
            })
            .collect()
    }
}

/// Arguments for nested search
#[derive(Parser, Debug, Clone)]
pub struct NestedArgs {
    /// Document file (JSON array)
    #[arg(short, long, value_name = "DOCS_FILE")]
    pub docs: PathBuf,

    /// Ancestor depth the clauses are joined on (0 = root)
    #[arg(short, long = "join-depth", default_value = "0")]
    pub join_depth: usize,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Include score explanations
    #[arg(long)]
    pub explain: bool,

    /// Clauses to join
    #[arg(value_name = "FIELD:TERM", required = true)]
    pub clauses: Vec<Clause>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
