//! Line-oriented record parser for generator output.
//!
//! The upstream generator emits one JSON object per line interleaved with
//! arbitrary free text. The parser extracts the well-formed records for the
//! current phase and silently skips everything else: the producer is an LLM
//! whose output is not guaranteed well-formed line by line, so there is no
//! error path here at all.
//!
//! Each phase context has an explicit set of typed decoders, tried in order
//! against every candidate line (trimmed, starting with `{`); the first
//! structural match wins. The parser is stateless and preserves input order;
//! deduplication against already-merged entries is the responsibility of the
//! per-phase merge code, not the parser.

use serde::Deserialize;

use crate::model::{
    AssumptionCategory, ConfidenceLevel, EvidenceType, NodeType, Novelty, SolutionApproach,
};

/// Which phase's record shapes to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    Framing,
    Assumptions,
    Decomposition,
    Validation,
    Reconstruction,
}

/// A reframed problem statement record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReframingRecord {
    pub perspective: String,
    pub text: String,
}

/// An extracted assumption record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionRecord {
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub is_challengeable: Option<bool>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl AssumptionRecord {
    /// Category with lenient fallback: unrecognized values become the
    /// default category rather than dropping the record.
    pub fn category(&self) -> AssumptionCategory {
        self.category.parse().unwrap_or_default()
    }

    /// Confidence clamped to 0-100; missing values default to 70.
    pub fn confidence(&self) -> u8 {
        self.confidence.unwrap_or(70.0).clamp(0.0, 100.0) as u8
    }

    pub fn is_challengeable(&self) -> bool {
        self.is_challengeable.unwrap_or(true)
    }
}

/// A decomposition node record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub is_fundamental: Option<bool>,
}

impl NodeRecord {
    /// Node type with lenient fallback to `component`.
    pub fn node_type(&self) -> NodeType {
        self.node_type
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn is_fundamental(&self) -> bool {
        self.is_fundamental.unwrap_or(false)
    }
}

/// An evidence record from the validation phase.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
    pub content: String,
    #[serde(rename = "type")]
    pub evidence_type: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_label: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub is_counter_argument: Option<bool>,
}

impl EvidenceRecord {
    /// Evidence type with lenient fallback to `logical`.
    pub fn evidence_type(&self) -> EvidenceType {
        self.evidence_type.parse().unwrap_or_default()
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or("")
    }

    pub fn source_label(&self) -> &str {
        self.source_label.as_deref().unwrap_or("Unknown Source")
    }

    pub fn confidence(&self) -> ConfidenceLevel {
        self.confidence
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn is_counter_argument(&self) -> bool {
        self.is_counter_argument.unwrap_or(false)
    }
}

/// The summary record closing a validation response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub summary: String,
    #[serde(default)]
    pub overall_confidence: Option<String>,
    #[serde(default)]
    pub suggested_revision: Option<String>,
}

impl SummaryRecord {
    pub fn overall_confidence(&self) -> ConfidenceLevel {
        self.overall_confidence
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Suggested revision; empty strings collapse to None.
    pub fn suggested_revision(&self) -> Option<String> {
        self.suggested_revision
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// A reconstructed solution record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionRecord {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub approach: Option<String>,
    #[serde(default)]
    pub used_principles: Vec<String>,
    #[serde(default)]
    pub novelty: Option<String>,
    #[serde(default)]
    pub feasibility: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl SolutionRecord {
    pub fn approach(&self) -> SolutionApproach {
        self.approach
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn novelty(&self) -> Novelty {
        self.novelty
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn feasibility(&self) -> ConfidenceLevel {
        self.feasibility
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn rationale(&self) -> &str {
        self.rationale.as_deref().unwrap_or("")
    }
}

/// The comparison record closing a reconstruction response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComparisonRecord {
    pub comparison: String,
}

/// One typed record recovered from the raw stream text.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Reframing(ReframingRecord),
    Assumption(AssumptionRecord),
    Node(NodeRecord),
    Evidence(EvidenceRecord),
    ValidationSummary(SummaryRecord),
    Solution(SolutionRecord),
    Comparison(ComparisonRecord),
}

impl Record {
    /// Short record kind name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Reframing(_) => "reframing",
            Record::Assumption(_) => "assumption",
            Record::Node(_) => "node",
            Record::Evidence(_) => "evidence",
            Record::ValidationSummary(_) => "validation_summary",
            Record::Solution(_) => "solution",
            Record::Comparison(_) => "comparison",
        }
    }
}

/// Extract every well-formed record for the given context from accumulated
/// stream text, in original order. Malformed, partial, or foreign lines are
/// skipped without error.
pub fn parse(context: ParseContext, text: &str) -> Vec<Record> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if !trimmed.starts_with('{') {
                return None;
            }
            decode(context, trimmed)
        })
        .collect()
}

/// Try the context's decoders against one candidate line; first structural
/// match wins. Required string fields must be present and non-empty.
fn decode(context: ParseContext, line: &str) -> Option<Record> {
    match context {
        ParseContext::Framing => serde_json::from_str::<ReframingRecord>(line)
            .ok()
            .filter(|r| !r.text.is_empty() && !r.perspective.is_empty())
            .map(Record::Reframing),
        ParseContext::Assumptions => serde_json::from_str::<AssumptionRecord>(line)
            .ok()
            .filter(|r| !r.text.is_empty() && !r.category.is_empty())
            .map(Record::Assumption),
        ParseContext::Decomposition => serde_json::from_str::<NodeRecord>(line)
            .ok()
            .filter(|r| !r.label.is_empty())
            .map(Record::Node),
        ParseContext::Validation => serde_json::from_str::<SummaryRecord>(line)
            .ok()
            .filter(|r| !r.summary.is_empty())
            .map(Record::ValidationSummary)
            .or_else(|| {
                serde_json::from_str::<EvidenceRecord>(line)
                    .ok()
                    .filter(|r| !r.content.is_empty() && !r.evidence_type.is_empty())
                    .map(Record::Evidence)
            }),
        ParseContext::Reconstruction => serde_json::from_str::<ComparisonRecord>(line)
            .ok()
            .filter(|r| !r.comparison.is_empty())
            .map(Record::Comparison)
            .or_else(|| {
                serde_json::from_str::<SolutionRecord>(line)
                    .ok()
                    .filter(|r| !r.title.is_empty() && !r.description.is_empty())
                    .map(Record::Solution)
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reframings() {
        let text = concat!(
            "Here are some perspectives:\n",
            r#"{"perspective": "User-centric", "text": "How might users feel?"}"#,
            "\n",
            r#"{"perspective": "Economic", "text": "What does it cost?"}"#,
            "\nA closing analysis paragraph."
        );

        let records = parse(ParseContext::Framing, text);
        assert_eq!(records.len(), 2);
        match &records[0] {
            Record::Reframing(r) => assert_eq!(r.perspective, "User-centric"),
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let text = concat!(
            r#"{"perspective": "A", "text": "ok"}"#,
            "\n",
            r#"{"perspective": "B", "text": "#, // truncated mid-record
            "\n",
            r#"{"perspective": "C"}"#, // missing required field
            "\n",
            r#"{"perspective": "D", "text": ""}"#, // empty required field
            "\n",
            r#"{"perspective": "E", "text": "also ok"}"#,
        );

        let records = parse(ParseContext::Framing, text);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_decomposition_scenario() {
        let text = "{\"label\":\"Users want speed\",\"type\":\"principle\",\"isFundamental\":true}\nnot json\n{\"label\":\"Bandwidth is costly\",\"type\":\"constraint\"}";

        let records = parse(ParseContext::Decomposition, text);
        assert_eq!(records.len(), 2);

        match &records[0] {
            Record::Node(n) => {
                assert_eq!(n.label, "Users want speed");
                assert_eq!(n.node_type(), NodeType::Principle);
                assert!(n.is_fundamental());
            }
            other => panic!("unexpected record: {:?}", other),
        }
        match &records[1] {
            Record::Node(n) => {
                assert_eq!(n.node_type(), NodeType::Constraint);
                assert!(!n.is_fundamental());
            }
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_node_type_falls_back_to_component() {
        let text = r#"{"label": "odd", "type": "widget"}"#;
        let records = parse(ParseContext::Decomposition, text);
        assert_eq!(records.len(), 1);
        match &records[0] {
            Record::Node(n) => assert_eq!(n.node_type(), NodeType::Component),
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_assumption_defaults() {
        let text = r#"{"text": "markets are rational", "category": "economic"}"#;
        let records = parse(ParseContext::Assumptions, text);
        assert_eq!(records.len(), 1);
        match &records[0] {
            Record::Assumption(a) => {
                assert_eq!(a.category(), AssumptionCategory::Economic);
                assert_eq!(a.confidence(), 70);
                assert!(a.is_challengeable());
            }
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_validation_summary_beats_evidence_decoder() {
        let text = concat!(
            r#"{"type": "statistic", "content": "42% of users churn", "confidence": "high"}"#,
            "\n",
            r#"{"summary": "The claim holds", "overallConfidence": "high", "suggestedRevision": null}"#,
        );

        let records = parse(ParseContext::Validation, text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind(), "evidence");
        assert_eq!(records[1].kind(), "validation_summary");
        match &records[1] {
            Record::ValidationSummary(s) => {
                assert_eq!(s.overall_confidence(), ConfidenceLevel::High);
                assert_eq!(s.suggested_revision(), None);
            }
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_reconstruction_solutions_and_comparison() {
        let text = concat!(
            r#"{"title": "Peer caching", "description": "Cache at the edge", "approach": "first_principles", "usedPrinciples": ["Users want speed"], "novelty": "radical", "feasibility": "medium", "rationale": "Distance dominates latency"}"#,
            "\n",
            r#"{"title": "Bigger servers", "description": "Scale vertically", "approach": "conventional"}"#,
            "\n",
            r#"{"comparison": "The first-principles option removes the latency floor entirely."}"#,
        );

        let records = parse(ParseContext::Reconstruction, text);
        assert_eq!(records.len(), 3);
        match &records[0] {
            Record::Solution(s) => {
                assert_eq!(s.approach(), SolutionApproach::FirstPrinciples);
                assert_eq!(s.novelty(), Novelty::Radical);
                assert_eq!(s.used_principles, vec!["Users want speed"]);
            }
            other => panic!("unexpected record: {:?}", other),
        }
        match &records[1] {
            Record::Solution(s) => assert_eq!(s.approach(), SolutionApproach::Conventional),
            other => panic!("unexpected record: {:?}", other),
        }
        assert_eq!(records[2].kind(), "comparison");
    }

    #[test]
    fn test_order_preserved_under_interleaving() {
        let text = concat!(
            "noise before\n",
            r#"{"label": "first"}"#,
            "\nmore noise\n{broken\n",
            r#"{"label": "second"}"#,
            "\n\n",
            r#"{"label": "third"}"#,
            "\ntrailing noise",
        );

        let records = parse(ParseContext::Decomposition, text);
        let labels: Vec<_> = records
            .iter()
            .map(|r| match r {
                Record::Node(n) => n.label.as_str(),
                other => panic!("unexpected record: {:?}", other),
            })
            .collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_parse_is_stateless_over_growing_text() {
        let first = r#"{"label": "a"}"#;
        let longer = format!("{}\n{}", first, r#"{"label": "b"}"#);

        assert_eq!(parse(ParseContext::Decomposition, first).len(), 1);
        // Re-invocation with a longer accumulation re-emits earlier records;
        // merge-time dedup is the caller's job.
        assert_eq!(parse(ParseContext::Decomposition, &longer).len(), 2);
    }

    #[test]
    fn test_foreign_records_ignored() {
        // An assumption-shaped line in decomposition context has no label
        // and is skipped.
        let text = r#"{"text": "x", "category": "domain"}"#;
        assert!(parse(ParseContext::Decomposition, text).is_empty());
    }

    #[test]
    fn test_extra_fields_tolerated() {
        let text = r#"{"label": "x", "extra": {"nested": true}, "another": 3}"#;
        assert_eq!(parse(ParseContext::Decomposition, text).len(), 1);
    }

    #[test]
    fn test_indented_lines_are_candidates() {
        let text = "   {\"label\": \"indented\"}   ";
        assert_eq!(parse(ParseContext::Decomposition, text).len(), 1);
    }
}
