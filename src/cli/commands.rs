//! Command implementations for the Phalanx CLI.

use std::time::Instant;

use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SearcherConfig;
use crate::error::Result;
use crate::index::memory::{MemoryDocument, MemoryIndex};
use crate::search::{
    BooleanSearcher, BoxedSearcher, ConjunctionSearcher, NestedConjunctionSearcher,
    PhraseSearcher, Searcher, SearcherOptions, TermSearcher, close_all, new_disjunction_searcher,
    search_context_for,
};

/// Execute a CLI command.
pub fn execute_command(args: PhalanxArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading searcher config from: {}", path.display());
            SearcherConfig::from_file(path)?
        }
        None => SearcherConfig::default(),
    };

    match &args.command {
        Command::Search(search_args) => run_search(search_args, config, &args),
        Command::Phrase(phrase_args) => run_phrase(phrase_args, config, &args),
        Command::Nested(nested_args) => run_nested(nested_args, config, &args),
    }
}

fn load_index(path: &std::path::Path) -> Result<MemoryIndex> {
    let docs = MemoryDocument::load_json_file(path)?;
    let index = MemoryIndex::from_documents(&docs)?;
    debug!("Indexed {} top-level documents from {}", docs.len(), path.display());
    Ok(index)
}

/// Build one term searcher per clause, closing the built ones on failure.
fn term_searchers(
    index: &MemoryIndex,
    clauses: &[Clause],
    options: &SearcherOptions,
) -> Result<Vec<BoxedSearcher>> {
    let mut searchers: Vec<BoxedSearcher> = Vec::with_capacity(clauses.len());
    for clause in clauses {
        match TermSearcher::new(index, &clause.term, &clause.field, 1.0, options) {
            Ok(searcher) => searchers.push(Box::new(searcher)),
            Err(e) => {
                let _ = close_all(searchers.iter_mut());
                return Err(e);
            }
        }
    }
    Ok(searchers)
}

/// Disjunction over `clauses`, or `None` when there are none.
fn disjunction_part(
    index: &MemoryIndex,
    clauses: &[Clause],
    min: usize,
    options: &SearcherOptions,
) -> Result<Option<BoxedSearcher>> {
    if clauses.is_empty() {
        return Ok(None);
    }
    let children = term_searchers(index, clauses, options)?;
    Ok(Some(new_disjunction_searcher(children, min, options)?))
}

fn join_clauses(clauses: &[Clause]) -> String {
    clauses
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a boolean query.
fn run_search(args: &SearchArgs, config: SearcherConfig, cli_args: &PhalanxArgs) -> Result<()> {
    let index = load_index(&args.docs)?;
    let options = SearcherOptions::default()
        .with_explain(args.explain)
        .with_config(config);

    let mut must = if args.must.is_empty() {
        None
    } else {
        let children = term_searchers(&index, &args.must, &options)?;
        Some(Box::new(ConjunctionSearcher::new(children, &options)) as BoxedSearcher)
    };
    let mut should = match disjunction_part(&index, &args.should, args.min, &options) {
        Ok(should) => should,
        Err(e) => {
            let _ = close_all(must.iter_mut());
            return Err(e);
        }
    };
    let must_not = match disjunction_part(&index, &args.must_not, 0, &options) {
        Ok(must_not) => must_not,
        Err(e) => {
            let _ = close_all(must.iter_mut().chain(should.iter_mut()));
            return Err(e);
        }
    };

    let query = format!(
        "+({}) ({}) -({})",
        join_clauses(&args.must),
        join_clauses(&args.should),
        join_clauses(&args.must_not)
    );
    let mut searcher = BooleanSearcher::new(must, should, must_not, &options);
    run_and_output(&mut searcher, query, args.limit, cli_args)
}

/// Run a phrase query.
fn run_phrase(args: &PhraseArgs, config: SearcherConfig, cli_args: &PhalanxArgs) -> Result<()> {
    let index = load_index(&args.docs)?;
    let options = SearcherOptions::default()
        .with_explain(args.explain)
        .with_config(config);

    let mut searcher =
        PhraseSearcher::new_multi(&index, args.slots(), args.slop, &args.field, 1.0, &options)?;
    let query = format!("{}:\"{}\"~{}", args.field, args.terms.join(" "), args.slop);
    run_and_output(&mut searcher, query, args.limit, cli_args)
}

/// Run a nested conjunction of term clauses.
fn run_nested(args: &NestedArgs, config: SearcherConfig, cli_args: &PhalanxArgs) -> Result<()> {
    let index = load_index(&args.docs)?;
    let options = SearcherOptions::default()
        .with_explain(args.explain)
        .with_config(config);

    let children = term_searchers(&index, &args.clauses, &options)?;
    let mut searcher = NestedConjunctionSearcher::new(&index, children, args.join_depth, &options)?;
    let query = format!("nested@{}({})", args.join_depth, join_clauses(&args.clauses));
    run_and_output(&mut searcher, query, args.limit, cli_args)
}

/// Drive `searcher` to exhaustion, close it and print the first `limit` hits.
fn run_and_output(
    searcher: &mut dyn Searcher,
    query: String,
    limit: usize,
    cli_args: &PhalanxArgs,
) -> Result<()> {
    let start_time = Instant::now();
    let mut ctx = search_context_for(&*searcher);

    let mut hits = Vec::new();
    let mut total_hits = 0;
    let outcome = loop {
        match searcher.next(&mut ctx) {
            Ok(Some(dm)) => {
                total_hits += 1;
                if hits.len() < limit {
                    hits.push(Hit::from(dm));
                } else {
                    ctx.pool.put(dm);
                }
            }
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    let closed = searcher.close();
    outcome?;
    closed?;

    let results = SearchResults {
        query,
        hits,
        total_hits,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    output_results(&results, cli_args)
}
