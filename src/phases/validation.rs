use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::anthropic::AnthropicClient;
use crate::error::{AppResult, PhaseError};
use crate::model::{Evidence, ValidationResult};
use crate::parser::{self, ParseContext, Record};
use crate::prompts;
use crate::store::AnalysisStore;
use crate::stream::{SessionManager, StreamEvent};

/// Result of folding a validation completion into the aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Supporting evidence gathered.
    pub evidence_count: usize,
    /// Counter-arguments gathered.
    pub counter_argument_count: usize,
    /// Whether the stream carried a summary record.
    pub has_summary: bool,
}

/// Validation phase driver
pub struct ValidationPhase {
    client: AnthropicClient,
}

impl ValidationPhase {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }

    /// Open a streaming validation run for one node's claim.
    pub async fn begin(
        &self,
        sessions: &mut SessionManager,
        store: &AnalysisStore,
        node_id: &str,
    ) -> AppResult<UnboundedReceiver<StreamEvent>> {
        let analysis = store.analysis();
        let node = analysis.tree.get(node_id).ok_or_else(|| PhaseError::UnknownNode {
            node_id: node_id.to_string(),
        })?;

        let claim = format!("{}: {}", node.label, node.description);
        let node_type = node.node_type.to_string();
        let user_prompt =
            prompts::validation_user_prompt(&claim, analysis.framing.problem_statement(), &node_type);
        let producer = self
            .client
            .stream_message(prompts::VALIDATION_PROMPT, &user_prompt)
            .await?;

        Ok(sessions.start(producer))
    }

    /// Fold a completed validation stream into the store.
    ///
    /// Evidence records partition into supporting and counter-argument sets
    /// by their flag; the summary record fills the overall confidence and
    /// suggested revision. The assembled result replaces any prior result
    /// for the node (1:1 by node id, last write wins).
    pub fn apply_completion(
        store: &mut AnalysisStore,
        text: &str,
        node_id: &str,
    ) -> ValidationOutcome {
        let mut result = ValidationResult::new(node_id);
        let mut has_summary = false;

        for record in parser::parse(ParseContext::Validation, text) {
            match record {
                Record::Evidence(r) => {
                    let evidence = Evidence::new(node_id, r.content.clone(), r.evidence_type())
                        .with_source(r.source(), r.source_label())
                        .with_confidence(r.confidence());
                    if r.is_counter_argument() {
                        result.counter_arguments.push(evidence.as_counter_argument());
                    } else {
                        result.evidence.push(evidence);
                    }
                }
                Record::ValidationSummary(r) => {
                    result.summary = r.summary.clone();
                    result.overall_confidence = r.overall_confidence();
                    result.suggested_revision = r.suggested_revision();
                    has_summary = true;
                }
                _ => {}
            }
        }

        let outcome = ValidationOutcome {
            evidence_count: result.evidence.len(),
            counter_argument_count: result.counter_arguments.len(),
            has_summary,
        };

        store.upsert_validation(result);
        store.increment_ai_interactions();

        info!(
            node_id,
            evidence = outcome.evidence_count,
            counter_arguments = outcome.counter_argument_count,
            "Validation stream merged"
        );
        outcome
    }
}
