//! The Analysis aggregate's mutation surface.
//!
//! `AnalysisStore` is an explicitly owned object handed to every consumer;
//! there is no ambient global state. All entity creation and mutation goes
//! through it, and every data mutation bumps the aggregate's `updatedAt`
//! timestamp. Mutations run to completion on a single-threaded path; there
//! are no locks and no transactions.

use chrono::{Duration, Utc};
use tracing::debug;

use crate::model::{
    Analysis, AnalysisPhase, Assumption, AssumptionCategory, ConfidenceLevel, DecompositionNode,
    Evidence, NodeUpdate, PhaseGate, ReframedStatement, Solution, ValidationResult,
    ValidationStatus, TITLE_MAX_LEN,
};

/// Partial update applied to an assumption in place.
#[derive(Debug, Clone, Default)]
pub struct AssumptionUpdate {
    pub text: Option<String>,
    pub category: Option<AssumptionCategory>,
    pub confidence: Option<u8>,
    pub is_challengeable: Option<bool>,
    pub notes: Option<String>,
    pub validation_status: Option<ValidationStatus>,
}

/// Owner of one Analysis document and its entire mutation surface.
#[derive(Debug, Clone)]
pub struct AnalysisStore {
    analysis: Analysis,
}

impl AnalysisStore {
    /// Create a store holding a fresh empty analysis
    pub fn new() -> Self {
        Self {
            analysis: Analysis::new(),
        }
    }

    /// Read access to the current document snapshot.
    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// Bump `updatedAt`, keeping it strictly increasing even when the clock
    /// resolution would produce equal stamps for back-to-back mutations.
    fn touch(&mut self) {
        let now = Utc::now();
        self.analysis.updated_at = if now > self.analysis.updated_at {
            now
        } else {
            self.analysis.updated_at + Duration::microseconds(1)
        };
    }

    // ------------------------------------------------------------------
    // Framing
    // ------------------------------------------------------------------

    pub fn set_original_input(&mut self, input: impl Into<String>) {
        self.analysis.framing.original_input = input.into();
        self.touch();
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.analysis.framing.context = context.into();
        self.touch();
    }

    pub fn set_domain(&mut self, domain: Option<String>) {
        self.analysis.framing.domain = domain;
        self.touch();
    }

    /// Replace the whole reframed-statement list.
    pub fn set_reframed_statements(&mut self, statements: Vec<ReframedStatement>) {
        self.analysis.framing.reframed_statements = statements;
        self.touch();
    }

    pub fn add_reframed_statement(&mut self, statement: ReframedStatement) {
        self.analysis.framing.reframed_statements.push(statement);
        self.touch();
    }

    /// Add a reframed statement unless one with case-insensitively identical
    /// text already exists. Returns whether it was added.
    pub fn add_reframed_statement_if_new(&mut self, statement: ReframedStatement) -> bool {
        let duplicate = self
            .analysis
            .framing
            .reframed_statements
            .iter()
            .any(|s| s.text.eq_ignore_ascii_case(&statement.text));
        if duplicate {
            return false;
        }
        self.add_reframed_statement(statement);
        true
    }

    /// Choose the authoritative framing.
    ///
    /// Derives the analysis title from a truncated prefix of the text and
    /// marks exactly the listed statements whose text equals the argument as
    /// selected, clearing all others. Equality is by exact text, not id, so
    /// selecting free-hand text selects none of the statements.
    pub fn select_framing(&mut self, text: &str) {
        self.analysis.title = text.chars().take(TITLE_MAX_LEN).collect();
        self.analysis.framing.selected_framing = text.to_string();
        for statement in &mut self.analysis.framing.reframed_statements {
            statement.selected = statement.text == text;
        }
        self.touch();
    }

    // ------------------------------------------------------------------
    // Assumptions
    // ------------------------------------------------------------------

    pub fn set_assumptions(&mut self, assumptions: Vec<Assumption>) {
        self.analysis.assumptions = assumptions;
        self.touch();
    }

    pub fn add_assumption(&mut self, assumption: Assumption) {
        self.analysis.assumptions.push(assumption);
        self.touch();
    }

    /// Add an assumption unless one with case-insensitively identical text
    /// already exists. This is the merge path for parsed records: repeated
    /// "extract more" runs against a growing text buffer re-emit earlier
    /// records, and this check keeps them from accumulating.
    pub fn add_assumption_if_new(&mut self, assumption: Assumption) -> bool {
        let duplicate = self
            .analysis
            .assumptions
            .iter()
            .any(|a| a.text.eq_ignore_ascii_case(&assumption.text));
        if duplicate {
            debug!(text = %assumption.text, "Skipping duplicate assumption");
            return false;
        }
        self.add_assumption(assumption);
        true
    }

    /// Merge a partial update into an assumption. Returns false if the id
    /// does not exist.
    pub fn update_assumption(&mut self, id: &str, update: AssumptionUpdate) -> bool {
        let Some(assumption) = self.analysis.assumptions.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        if let Some(text) = update.text {
            assumption.text = text;
        }
        if let Some(category) = update.category {
            assumption.category = category;
        }
        if let Some(confidence) = update.confidence {
            assumption.confidence = confidence.min(100);
        }
        if let Some(challengeable) = update.is_challengeable {
            assumption.is_challengeable = challengeable;
        }
        if let Some(notes) = update.notes {
            assumption.notes = notes;
        }
        if let Some(status) = update.validation_status {
            assumption.validation_status = status;
        }
        self.touch();
        true
    }

    /// Advance an assumption's status one step around the fixed ring.
    pub fn cycle_assumption_status(&mut self, id: &str) -> Option<ValidationStatus> {
        let next = self
            .analysis
            .assumptions
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.validation_status.next())?;
        self.update_assumption(
            id,
            AssumptionUpdate {
                validation_status: Some(next),
                ..AssumptionUpdate::default()
            },
        );
        Some(next)
    }

    pub fn remove_assumption(&mut self, id: &str) -> bool {
        let before = self.analysis.assumptions.len();
        self.analysis.assumptions.retain(|a| a.id != id);
        let removed = self.analysis.assumptions.len() < before;
        if removed {
            self.touch();
        }
        removed
    }

    // ------------------------------------------------------------------
    // Tree
    // ------------------------------------------------------------------

    pub fn add_node(&mut self, node: DecompositionNode) {
        self.analysis.tree.insert(node);
        self.touch();
    }

    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> bool {
        let updated = self.analysis.tree.update(id, update);
        if updated {
            self.touch();
        }
        updated
    }

    /// Remove a node and its whole subtree. Returns the number of nodes
    /// removed.
    pub fn remove_node(&mut self, id: &str) -> usize {
        let removed = self.analysis.tree.remove(id);
        if removed > 0 {
            self.touch();
        }
        removed
    }

    pub fn attach_evidence(&mut self, node_id: &str, evidence: Evidence) -> bool {
        let attached = self.analysis.tree.attach_evidence(node_id, evidence);
        if attached {
            self.touch();
        }
        attached
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Store the validation result for a node, replacing any prior result
    /// for the same node. Re-running validation never appends.
    pub fn upsert_validation(&mut self, result: ValidationResult) {
        self.analysis
            .validations
            .retain(|v| v.node_id != result.node_id);
        self.analysis.validations.push(result);
        self.touch();
    }

    // ------------------------------------------------------------------
    // Solutions
    // ------------------------------------------------------------------

    pub fn add_solution(&mut self, solution: Solution) {
        self.analysis.solutions.push(solution);
        self.touch();
    }

    pub fn set_solutions(&mut self, solutions: Vec<Solution>) {
        self.analysis.solutions = solutions;
        self.touch();
    }

    /// Set or clear a solution's rank. Only the value 1 ("best") carries
    /// meaning; callers toggle it rather than building a total order.
    pub fn rank_solution(&mut self, id: &str, rank: Option<i32>) -> bool {
        let Some(solution) = self.analysis.solutions.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        solution.user_rank = rank;
        self.touch();
        true
    }

    /// Toggle the "best" mark on a solution, clearing it elsewhere.
    pub fn toggle_best_solution(&mut self, id: &str) -> bool {
        let Some(currently) = self
            .analysis
            .solutions
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.user_rank)
        else {
            return false;
        };
        let new_rank = if currently == Some(1) { None } else { Some(1) };
        for solution in &mut self.analysis.solutions {
            solution.user_rank = if solution.id == id { new_rank } else { None };
        }
        self.touch();
        true
    }

    // ------------------------------------------------------------------
    // Navigation and counters
    // ------------------------------------------------------------------

    /// Set the current phase without gating. Navigation state only; does not
    /// bump `updatedAt`.
    pub fn set_phase(&mut self, phase: AnalysisPhase) {
        self.analysis.current_phase = phase;
    }

    /// Navigate to a phase if the gate allows it. Returns whether the
    /// navigation happened.
    pub fn navigate_to(&mut self, target: AnalysisPhase) -> bool {
        if !PhaseGate::can_navigate(self.analysis.current_phase, target, &self.analysis) {
            return false;
        }
        self.analysis.current_phase = target;
        true
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.analysis.title = title.into();
        self.touch();
    }

    /// Count one completed generator interaction.
    pub fn increment_ai_interactions(&mut self) {
        self.analysis.metadata.total_ai_interactions += 1;
        self.touch();
    }

    /// Count one snapshot export. Called by the codec as a side effect of
    /// producing an envelope. Does not bump `updatedAt`: exporting observes
    /// the document, and the round-trip contract allows only the export
    /// counter and the envelope stamp to differ.
    pub fn record_export(&mut self) {
        self.analysis.metadata.export_count += 1;
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Discard the current document and start a fresh analysis.
    pub fn reset(&mut self) {
        self.analysis = Analysis::new();
    }

    /// Replace the whole document (the import path).
    pub fn replace(&mut self, analysis: Analysis) {
        self.analysis = analysis;
    }

    /// Convenience for the validation phase: nodes worth validating
    /// (non-root components, principles, and anything flagged fundamental).
    pub fn validatable_node_ids(&self) -> Vec<String> {
        use crate::model::NodeType;
        self.analysis
            .tree
            .nodes
            .iter()
            .filter(|n| {
                n.node_type != NodeType::Root
                    && (n.is_fundamental()
                        || n.node_type == NodeType::Component)
            })
            .map(|n| n.id.clone())
            .collect()
    }

    /// Overall confidence for a node if it has been validated.
    pub fn node_confidence(&self, node_id: &str) -> Option<ConfidenceLevel> {
        self.analysis
            .validation_for(node_id)
            .map(|v| v.overall_confidence)
    }
}

impl Default for AnalysisStore {
    fn default() -> Self {
        Self::new()
    }
}
