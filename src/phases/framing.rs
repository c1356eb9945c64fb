use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::anthropic::AnthropicClient;
use crate::error::{AppResult, PhaseError};
use crate::model::ReframedStatement;
use crate::parser::{self, ParseContext, Record};
use crate::prompts;
use crate::store::AnalysisStore;
use crate::stream::{SessionManager, StreamEvent};

/// Result of folding a framing completion into the aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramingOutcome {
    /// Statements added (after dedup).
    pub statements_added: usize,
}

/// Problem-framing phase driver
pub struct FramingPhase {
    client: AnthropicClient,
}

impl FramingPhase {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }

    /// Open a streaming generation of reframed statements for the store's
    /// current original input.
    pub async fn begin(
        &self,
        sessions: &mut SessionManager,
        store: &AnalysisStore,
    ) -> AppResult<UnboundedReceiver<StreamEvent>> {
        let framing = &store.analysis().framing;
        if framing.original_input.trim().is_empty() {
            return Err(PhaseError::Precondition {
                message: "Enter a problem statement before analyzing".to_string(),
            }
            .into());
        }

        let user_prompt = prompts::framing_user_prompt(
            &framing.original_input,
            Some(framing.context.as_str()),
            framing.domain.as_deref(),
        );
        let producer = self
            .client
            .stream_message(prompts::FRAMING_PROMPT, &user_prompt)
            .await?;

        Ok(sessions.start(producer))
    }

    /// Fold a completed framing stream into the store.
    ///
    /// Parsed statements merge with case-insensitive text dedup, so
    /// re-running against a longer accumulation never duplicates entries.
    /// Counts one generator interaction regardless of parse yield.
    pub fn apply_completion(store: &mut AnalysisStore, text: &str) -> FramingOutcome {
        let mut added = 0;
        for record in parser::parse(ParseContext::Framing, text) {
            if let Record::Reframing(r) = record {
                let statement = ReframedStatement::new(r.text, r.perspective);
                if store.add_reframed_statement_if_new(statement) {
                    added += 1;
                }
            }
        }
        store.increment_ai_interactions();

        info!(statements_added = added, "Framing stream merged");
        FramingOutcome {
            statements_added: added,
        }
    }

    /// Clear previously proposed statements before a fresh analysis run.
    pub fn clear_proposals(store: &mut AnalysisStore) {
        store.set_reframed_statements(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_completion_merges_statements() {
        let mut store = AnalysisStore::new();
        let text = concat!(
            r#"{"perspective": "User-centric", "text": "How do users experience the wait?"}"#,
            "\n",
            r#"{"perspective": "Economic", "text": "What does each minute of delay cost?"}"#,
            "\nThe most promising angle is the user-centric one.",
        );

        let outcome = FramingPhase::apply_completion(&mut store, text);

        assert_eq!(outcome.statements_added, 2);
        assert_eq!(store.analysis().framing.reframed_statements.len(), 2);
        assert_eq!(store.analysis().metadata.total_ai_interactions, 1);
    }

    #[test]
    fn test_apply_completion_dedups_across_reruns() {
        let mut store = AnalysisStore::new();
        let text = r#"{"perspective": "Economic", "text": "What does delay cost?"}"#;

        FramingPhase::apply_completion(&mut store, text);
        let longer = format!(
            "{}\n{}",
            text,
            r#"{"perspective": "Temporal", "text": "When does delay matter most?"}"#
        );
        let outcome = FramingPhase::apply_completion(&mut store, &longer);

        assert_eq!(outcome.statements_added, 1);
        assert_eq!(store.analysis().framing.reframed_statements.len(), 2);
    }

    #[test]
    fn test_apply_completion_counts_interaction_without_records() {
        let mut store = AnalysisStore::new();
        let outcome = FramingPhase::apply_completion(&mut store, "no structured output at all");
        assert_eq!(outcome.statements_added, 0);
        assert_eq!(store.analysis().metadata.total_ai_interactions, 1);
    }
}
