//! Output formatting for CLI commands.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cli::args::{OutputFormat, PhalanxArgs};
use crate::error::Result;
use crate::search::{DocumentMatch, Explanation, Location};

/// One matched document.
#[derive(Debug, Serialize)]
pub struct Hit {
    pub id: u64,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
    /// field -> term -> locations, sorted for stable output
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub locations: BTreeMap<String, BTreeMap<String, Vec<Location>>>,
}

impl From<DocumentMatch> for Hit {
    fn from(dm: DocumentMatch) -> Self {
        let locations = dm
            .locations
            .into_iter()
            .map(|(field, terms)| (field, terms.into_iter().collect()))
            .collect();
        Hit {
            id: dm.id.value(),
            score: dm.score,
            explanation: dm.expl,
            locations,
        }
    }
}

/// Result structure for every query command.
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub hits: Vec<Hit>,
    pub total_hits: usize,
    pub duration_ms: u64,
}

/// Output query results in the selected format.
pub fn output_results(results: &SearchResults, args: &PhalanxArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(results, args),
        OutputFormat::Json => output_json(results, args),
    }
}

/// Output in human-readable format.
fn output_human(results: &SearchResults, args: &PhalanxArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("Query: {}", results.query);
        println!();
    }

    println!("Search Results:");
    println!("═══════════════");
    for (i, hit) in results.hits.iter().enumerate() {
        println!();
        println!("Result {}: doc {} (Score: {:.7})", i + 1, hit.id, hit.score);
        for (field, terms) in &hit.locations {
            for (term, locations) in terms {
                let positions: Vec<String> = locations
                    .iter()
                    .map(|l| format!("{}@{}..{}", l.pos, l.start, l.end))
                    .collect();
                println!("  {field}:{term} {}", positions.join(" "));
            }
        }
        if let Some(expl) = &hit.explanation {
            for line in expl.to_string().lines() {
                println!("  {line}");
            }
        }
    }

    println!();
    println!(
        "Showing {} of {} hits ({} ms)",
        results.hits.len(),
        results.total_hits,
        results.duration_ms
    );
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PhalanxArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}
