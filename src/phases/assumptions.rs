use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::anthropic::AnthropicClient;
use crate::error::{AppResult, PhaseError};
use crate::model::{Assumption, Provenance};
use crate::parser::{self, ParseContext, Record};
use crate::prompts;
use crate::store::AnalysisStore;
use crate::stream::{SessionManager, StreamEvent};

/// Result of folding an assumptions completion into the aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumptionsOutcome {
    /// Assumptions added.
    pub added: usize,
    /// Parsed records dropped as case-insensitive duplicates.
    pub skipped_duplicates: usize,
}

/// Assumption-extraction phase driver
pub struct AssumptionsPhase {
    client: AnthropicClient,
}

impl AssumptionsPhase {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }

    /// Open a streaming extraction run. Existing assumption texts are fed
    /// back so the generator looks for new ones.
    pub async fn begin(
        &self,
        sessions: &mut SessionManager,
        store: &AnalysisStore,
    ) -> AppResult<UnboundedReceiver<StreamEvent>> {
        let analysis = store.analysis();
        let problem = analysis.framing.problem_statement();
        if problem.trim().is_empty() {
            return Err(PhaseError::Precondition {
                message: "Frame the problem before extracting assumptions".to_string(),
            }
            .into());
        }

        let existing: Vec<String> = analysis.assumptions.iter().map(|a| a.text.clone()).collect();
        let user_prompt = prompts::assumptions_user_prompt(problem, &existing);
        let producer = self
            .client
            .stream_message(prompts::ASSUMPTIONS_PROMPT, &user_prompt)
            .await?;

        Ok(sessions.start(producer))
    }

    /// Fold a completed extraction stream into the store.
    ///
    /// Each parsed record becomes a pending AI-sourced assumption unless an
    /// existing entry already carries case-insensitively identical text;
    /// repeated runs against a growing text buffer therefore never
    /// accumulate duplicates.
    pub fn apply_completion(store: &mut AnalysisStore, text: &str) -> AssumptionsOutcome {
        let mut added = 0;
        let mut skipped = 0;
        for record in parser::parse(ParseContext::Assumptions, text) {
            if let Record::Assumption(r) = record {
                let assumption = Assumption::new(r.text.clone(), r.category())
                    .with_confidence(r.confidence())
                    .with_source(Provenance::Ai)
                    .with_challengeable(r.is_challengeable())
                    .with_notes(r.reasoning.clone().unwrap_or_default());
                if store.add_assumption_if_new(assumption) {
                    added += 1;
                } else {
                    skipped += 1;
                }
            }
        }
        store.increment_ai_interactions();

        info!(added, skipped, "Assumptions stream merged");
        AssumptionsOutcome {
            added,
            skipped_duplicates: skipped,
        }
    }
}
