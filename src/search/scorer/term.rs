//! TF-IDF scorer for single-term postings.

use crate::index::TermFieldDoc;
use crate::search::document_match::{DocumentMatch, Location, add_location};
use crate::search::explanation::Explanation;
use crate::search::pool::SearchContext;
use crate::search::searcher::{ScoreMode, SearcherOptions};

/// Scores the postings of one (term, field) pair.
///
/// `idf = 1 + ln(doc_total / (doc_term + 1))`, and a posting scores
/// `sqrt(freq) * norm * idf`, scaled by the query weight once a query norm
/// has been set.
#[derive(Debug, Clone)]
pub struct TermScorer {
    term: String,
    field: String,
    boost: f64,
    doc_term: u64,
    doc_total: u64,
    idf: f64,
    query_norm: f64,
    query_weight: f64,
    explain: bool,
    score_mode: ScoreMode,
    include_term_vectors: bool,
    idf_explanation: Option<Explanation>,
    query_weight_explanation: Option<Explanation>,
}

impl TermScorer {
    /// Create a scorer for a term found in `doc_term` of `doc_total` documents.
    pub fn new(
        term: &str,
        field: &str,
        boost: f64,
        doc_total: u64,
        doc_term: u64,
        options: &SearcherOptions,
    ) -> Self {
        let idf = 1.0 + (doc_total as f64 / (doc_term as f64 + 1.0)).ln();
        let idf_explanation = options.explain.then(|| {
            Explanation::new(
                idf,
                format!("idf(docFreq={doc_term}, maxDocs={doc_total})"),
            )
        });
        TermScorer {
            term: term.to_string(),
            field: field.to_string(),
            boost,
            doc_term,
            doc_total,
            idf,
            query_norm: 1.0,
            query_weight: 1.0,
            explain: options.explain,
            score_mode: options.score,
            include_term_vectors: options.include_term_vectors,
            idf_explanation,
            query_weight_explanation: None,
        }
    }

    /// Inverse document frequency of the term.
    pub fn idf(&self) -> f64 {
        self.idf
    }

    /// Squared boosted idf, this leaf's share of the query norm.
    pub fn weight(&self) -> f64 {
        let sum = self.boost * self.idf;
        sum * sum
    }

    pub fn set_query_norm(&mut self, query_norm: f64) {
        self.query_norm = query_norm;
        self.query_weight = self.boost * self.idf * query_norm;

        if self.explain {
            let children = vec![
                Explanation::new(self.boost, "boost"),
                self.idf_explanation
                    .clone()
                    .unwrap_or_else(|| Explanation::new(self.idf, "idf")),
                Explanation::new(query_norm, "queryNorm"),
            ];
            self.query_weight_explanation = Some(Explanation::with_children(
                self.query_weight,
                format!(
                    "queryWeight({}:{}^{:.6}), product of:",
                    self.field, self.term, self.boost
                ),
                children,
            ));
        }
    }

    /// Build the match for one posting.
    pub fn score(&self, ctx: &mut SearchContext, posting: &TermFieldDoc) -> DocumentMatch {
        let mut rv = ctx.pool.get();
        rv.id = posting.id;

        if self.score_mode != ScoreMode::None {
            let tf = (posting.freq as f64).sqrt();
            let mut score = tf * posting.norm * self.idf;
            let mut expl = self.explain.then(|| {
                Explanation::with_children(
                    score,
                    format!(
                        "fieldWeight({}:{} in {}), product of:",
                        self.field, self.term, posting.id
                    ),
                    vec![
                        Explanation::new(
                            tf,
                            format!(
                                "tf(termFreq({}:{})={})",
                                self.field, self.term, posting.freq
                            ),
                        ),
                        Explanation::new(
                            posting.norm,
                            format!("fieldNorm(field={}, doc={})", self.field, posting.id),
                        ),
                        self.idf_explanation
                            .clone()
                            .unwrap_or_else(|| Explanation::new(self.idf, "idf")),
                    ],
                )
            });

            if self.query_weight != 1.0 {
                score *= self.query_weight;
                if let Some(field_weight) = expl.take() {
                    let mut children = Vec::with_capacity(2);
                    children.extend(self.query_weight_explanation.clone());
                    children.push(field_weight);
                    expl = Some(Explanation::with_children(
                        score,
                        format!(
                            "weight({}:{}^{:.6} in {}), product of:",
                            self.field, self.term, self.boost, posting.id
                        ),
                        children,
                    ));
                }
            }

            rv.score = score;
            rv.expl = expl;
        }

        if self.include_term_vectors {
            for vector in &posting.vectors {
                let location = Location {
                    pos: vector.pos,
                    start: vector.start,
                    end: vector.end,
                    array_positions: vector.array_positions.clone(),
                };
                let terms = rv.locations.entry(vector.field.clone()).or_default();
                add_location(terms, &self.term, location);
            }
        }

        rv
    }

    /// Number of documents the term occurs in, as used for idf.
    pub fn doc_term(&self) -> u64 {
        self.doc_term
    }

    /// Document total used for idf.
    pub fn doc_total(&self) -> u64 {
        self.doc_total
    }
}
