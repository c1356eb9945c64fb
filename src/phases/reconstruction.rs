use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::anthropic::AnthropicClient;
use crate::error::{AppResult, PhaseError};
use crate::model::Solution;
use crate::parser::{self, ParseContext, Record};
use crate::prompts;
use crate::store::AnalysisStore;
use crate::stream::{SessionManager, StreamEvent};

/// Result of folding a reconstruction completion into the aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructionOutcome {
    /// Solutions stored (replacing the previous list when non-zero).
    pub solutions: usize,
    /// The conventional-vs-first-principles comparison, if one was emitted.
    pub comparison: Option<String>,
}

/// Reconstruction phase driver
pub struct ReconstructionPhase {
    client: AnthropicClient,
}

impl ReconstructionPhase {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }

    /// Open a streaming solution-generation run.
    ///
    /// Requires at least one fundamental node; generation builds on those
    /// truths and avoids the challenged assumptions.
    pub async fn begin(
        &self,
        sessions: &mut SessionManager,
        store: &AnalysisStore,
    ) -> AppResult<UnboundedReceiver<StreamEvent>> {
        let analysis = store.analysis();
        let truths: Vec<(String, String)> = analysis
            .fundamental_nodes()
            .iter()
            .map(|n| (n.label.clone(), n.description.clone()))
            .collect();
        if truths.is_empty() {
            return Err(PhaseError::Precondition {
                message: "Identify at least one fundamental truth before reconstructing"
                    .to_string(),
            }
            .into());
        }

        let challenged = analysis.rejected_assumption_texts();
        let user_prompt = prompts::reconstruction_user_prompt(
            analysis.framing.problem_statement(),
            &truths,
            &challenged,
        );
        let producer = self
            .client
            .stream_message(prompts::RECONSTRUCTION_PROMPT, &user_prompt)
            .await?;

        Ok(sessions.start(producer))
    }

    /// Fold a completed reconstruction stream into the store.
    ///
    /// Parsed solutions replace the solution list only when at least one was
    /// recovered; a fully garbled stream leaves the previous solutions in
    /// place. The comparison record is returned for display rather than
    /// stored.
    pub fn apply_completion(store: &mut AnalysisStore, text: &str) -> ReconstructionOutcome {
        let mut solutions = Vec::new();
        let mut comparison = None;

        for record in parser::parse(ParseContext::Reconstruction, text) {
            match record {
                Record::Solution(r) => {
                    solutions.push(
                        Solution::new(r.title.clone(), r.description.clone())
                            .with_approach(r.approach())
                            .with_principles(r.used_principles.clone())
                            .with_novelty(r.novelty())
                            .with_feasibility(r.feasibility())
                            .with_rationale(r.rationale()),
                    );
                }
                Record::Comparison(r) => comparison = Some(r.comparison.clone()),
                _ => {}
            }
        }

        let count = solutions.len();
        if count > 0 {
            store.set_solutions(solutions);
        }
        store.increment_ai_interactions();

        info!(solutions = count, "Reconstruction stream merged");
        ReconstructionOutcome {
            solutions: count,
            comparison,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfidenceLevel, Novelty, SolutionApproach};

    #[test]
    fn test_apply_completion_replaces_solution_list() {
        let mut store = AnalysisStore::new();
        store.add_solution(Solution::new("stale", "from an earlier run"));

        let text = concat!(
            r#"{"title": "Edge-first delivery", "description": "Push compute to the edge", "approach": "first_principles", "usedPrinciples": ["Latency has a floor"], "novelty": "radical", "feasibility": "medium", "rationale": "Physics beats optimization"}"#,
            "\n",
            r#"{"title": "Bigger origin", "description": "Scale the origin up", "approach": "conventional", "novelty": "incremental", "feasibility": "high"}"#,
            "\n",
            r#"{"comparison": "Conventional scaling hits the same floor; edge-first removes it."}"#,
        );

        let outcome = ReconstructionPhase::apply_completion(&mut store, text);

        assert_eq!(outcome.solutions, 2);
        assert!(outcome.comparison.unwrap().contains("edge-first"));

        let solutions = &store.analysis().solutions;
        assert_eq!(solutions.len(), 2);
        assert_eq!(solutions[0].approach, SolutionApproach::FirstPrinciples);
        assert_eq!(solutions[0].novelty, Novelty::Radical);
        assert_eq!(solutions[0].used_principles, vec!["Latency has a floor"]);
        assert_eq!(solutions[1].approach, SolutionApproach::Conventional);
        assert_eq!(solutions[1].feasibility, ConfidenceLevel::High);
        assert!(solutions.iter().all(|s| s.user_rank.is_none()));
    }

    #[test]
    fn test_apply_completion_keeps_previous_solutions_on_empty_parse() {
        let mut store = AnalysisStore::new();
        store.add_solution(Solution::new("keep me", "still valid"));

        let outcome = ReconstructionPhase::apply_completion(&mut store, "no structured output");

        assert_eq!(outcome.solutions, 0);
        assert_eq!(store.analysis().solutions.len(), 1);
        assert_eq!(store.analysis().solutions[0].title, "keep me");
    }
}
