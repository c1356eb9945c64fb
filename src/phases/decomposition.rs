use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::anthropic::AnthropicClient;
use crate::error::{AppResult, PhaseError};
use crate::model::{DecompositionNode, NodeType, Provenance, TITLE_MAX_LEN};
use crate::parser::{self, ParseContext, Record};
use crate::prompts;
use crate::store::AnalysisStore;
use crate::stream::{SessionManager, StreamEvent};

/// Result of folding a decomposition completion into the aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompositionOutcome {
    /// Child nodes attached.
    pub nodes_added: usize,
}

/// Decomposition phase driver
pub struct DecompositionPhase {
    client: AnthropicClient,
}

impl DecompositionPhase {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }

    /// Open a streaming decomposition of one node. Existing child labels
    /// and challenged assumptions feed the prompt.
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

        let children: Vec<String> = analysis
            .tree
            .children_of(node_id)
            .iter()
            .map(|c| c.label.clone())
            .collect();
        let challenged = analysis.rejected_assumption_texts();

        let user_prompt = prompts::decomposition_user_prompt(
            analysis.framing.problem_statement(),
            &node.label,
            &node.description,
            &children,
            &challenged,
        );
        let producer = self
            .client
            .stream_message(prompts::DECOMPOSITION_PROMPT, &user_prompt)
            .await?;

        Ok(sessions.start(producer))
    }

    /// Fold a completed decomposition stream into the store, attaching each
    /// parsed record as a new leaf under the target node.
    ///
    /// If the target node was removed while the stream was in flight (a
    /// manual edit racing a live stream), the merge is skipped; nothing is
    /// reconciled and the later write wins.
    pub fn apply_completion(
        store: &mut AnalysisStore,
        text: &str,
        parent_id: &str,
    ) -> DecompositionOutcome {
        let Some(parent_depth) = store.analysis().tree.get(parent_id).map(|n| n.depth) else {
            warn!(parent_id, "Decomposition target vanished mid-stream; dropping records");
            store.increment_ai_interactions();
            return DecompositionOutcome { nodes_added: 0 };
        };

        let mut added = 0;
        for record in parser::parse(ParseContext::Decomposition, text) {
            if let Record::Node(r) = record {
                let node = DecompositionNode::new(r.label.clone())
                    .with_description(r.description.clone())
                    .with_type(r.node_type())
                    .with_fundamental(r.is_fundamental())
                    .with_parent(parent_id, parent_depth + 1)
                    .with_source(Provenance::Ai);
                store.add_node(node);
                added += 1;
            }
        }
        store.increment_ai_interactions();

        info!(parent_id, nodes_added = added, "Decomposition stream merged");
        DecompositionOutcome { nodes_added: added }
    }
}

/// Seed the tree with a root node for the framed problem if the tree is
/// still empty. Returns the root's id when one exists afterwards.
pub fn ensure_root(store: &mut AnalysisStore) -> Option<String> {
    if let Some(root) = store.analysis().tree.roots().first() {
        return Some(root.id.to_string());
    }

    let problem = store.analysis().framing.problem_statement().to_string();
    if problem.is_empty() {
        return None;
    }

    let label: String = problem.chars().take(TITLE_MAX_LEN).collect();
    let root = DecompositionNode::new(label)
        .with_description(problem)
        .with_type(NodeType::Root);
    let id = root.id.clone();
    store.add_node(root);
    Some(id)
}
