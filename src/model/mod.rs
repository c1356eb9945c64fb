//! Analysis data model.
//!
//! This module defines the Analysis aggregate and every entity it owns:
//! problem framing, assumptions, the decomposition tree, validation results,
//! and solutions. All wire names are camelCase to match the snapshot file
//! format, which is a compatibility contract.

mod phase;
mod tree;

pub use phase::{AnalysisPhase, PhaseGate};
pub use tree::{DecompositionTree, NodeUpdate};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of an analysis title derived from a selected framing.
pub const TITLE_MAX_LEN: usize = 60;

/// Origin of an entity: produced by the AI generator or entered by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Extracted from a generator text stream.
    Ai,
    /// Entered manually by the user.
    #[default]
    User,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Ai => write!(f, "ai"),
            Provenance::User => write!(f, "user"),
        }
    }
}

/// Three-level confidence used by evidence and validation results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "high"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for ConfidenceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(ConfidenceLevel::High),
            "medium" => Ok(ConfidenceLevel::Medium),
            "low" => Ok(ConfidenceLevel::Low),
            _ => Err(format!("Unknown confidence level: {}", s)),
        }
    }
}

/// One reframed problem statement proposed during the framing phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReframedStatement {
    /// Unique statement identifier.
    pub id: String,
    /// The reframed problem statement text.
    pub text: String,
    /// Perspective label (e.g., "User-centric", "Contrarian").
    pub perspective: String,
    /// Whether this statement is the currently selected framing.
    #[serde(default)]
    pub selected: bool,
}

impl ReframedStatement {
    /// Create a new unselected statement
    pub fn new(text: impl Into<String>, perspective: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            perspective: perspective.into(),
            selected: false,
        }
    }
}

/// The problem framing produced during the first phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemFraming {
    /// The user's original free-text problem input.
    #[serde(default)]
    pub original_input: String,
    /// Reframings proposed by the generator, in arrival order.
    #[serde(default)]
    pub reframed_statements: Vec<ReframedStatement>,
    /// The authoritative chosen framing. May be free-hand text that matches
    /// none of the listed statements.
    #[serde(default)]
    pub selected_framing: String,
    /// Optional domain hint.
    #[serde(default)]
    pub domain: Option<String>,
    /// Optional additional context.
    #[serde(default)]
    pub context: String,
    /// When the framing was created.
    pub timestamp: DateTime<Utc>,
}

impl ProblemFraming {
    fn empty(now: DateTime<Utc>) -> Self {
        Self {
            original_input: String::new(),
            reframed_statements: Vec::new(),
            selected_framing: String::new(),
            domain: None,
            context: String::new(),
            timestamp: now,
        }
    }

    /// The effective problem statement: the selected framing if one exists,
    /// otherwise the original input.
    pub fn problem_statement(&self) -> &str {
        if self.selected_framing.is_empty() {
            &self.original_input
        } else {
            &self.selected_framing
        }
    }
}

/// Category of an extracted assumption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssumptionCategory {
    /// Assumptions about the problem domain or industry.
    #[default]
    Domain,
    /// Assumed constraints that may not actually exist.
    Constraint,
    /// Cultural or social norms being assumed.
    Cultural,
    /// Technical feasibility assumptions.
    Technical,
    /// Cost, resource, or market assumptions.
    Economic,
    /// Time-related assumptions.
    Temporal,
    /// Assumptions about what's in/out of scope.
    Scope,
}

impl std::fmt::Display for AssumptionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssumptionCategory::Domain => write!(f, "domain"),
            AssumptionCategory::Constraint => write!(f, "constraint"),
            AssumptionCategory::Cultural => write!(f, "cultural"),
            AssumptionCategory::Technical => write!(f, "technical"),
            AssumptionCategory::Economic => write!(f, "economic"),
            AssumptionCategory::Temporal => write!(f, "temporal"),
            AssumptionCategory::Scope => write!(f, "scope"),
        }
    }
}

impl std::str::FromStr for AssumptionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "domain" => Ok(AssumptionCategory::Domain),
            "constraint" => Ok(AssumptionCategory::Constraint),
            "cultural" => Ok(AssumptionCategory::Cultural),
            "technical" => Ok(AssumptionCategory::Technical),
            "economic" => Ok(AssumptionCategory::Economic),
            "temporal" => Ok(AssumptionCategory::Temporal),
            "scope" => Ok(AssumptionCategory::Scope),
            _ => Err(format!("Unknown assumption category: {}", s)),
        }
    }
}

/// User annotation of an assumption's standing. Cyclable in ring order;
/// every transition is permitted (this is an annotation, not a proof system).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Validated,
    Challenged,
    Disproved,
}

impl ValidationStatus {
    /// The next status in the fixed ring order
    /// (pending -> validated -> challenged -> disproved -> pending).
    pub fn next(self) -> Self {
        match self {
            ValidationStatus::Pending => ValidationStatus::Validated,
            ValidationStatus::Validated => ValidationStatus::Challenged,
            ValidationStatus::Challenged => ValidationStatus::Disproved,
            ValidationStatus::Disproved => ValidationStatus::Pending,
        }
    }

    /// Whether the assumption has been challenged or disproved.
    pub fn is_rejected(self) -> bool {
        matches!(
            self,
            ValidationStatus::Challenged | ValidationStatus::Disproved
        )
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationStatus::Pending => write!(f, "pending"),
            ValidationStatus::Validated => write!(f, "validated"),
            ValidationStatus::Challenged => write!(f, "challenged"),
            ValidationStatus::Disproved => write!(f, "disproved"),
        }
    }
}

/// A hidden assumption uncovered in the problem statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumption {
    /// Unique assumption identifier.
    pub id: String,
    /// The assumption text.
    pub text: String,
    /// Assumption category.
    #[serde(default)]
    pub category: AssumptionCategory,
    /// How strongly this is assumed, 0-100.
    #[serde(default)]
    pub confidence: u8,
    /// Whether the generator or the user produced it.
    #[serde(default)]
    pub source: Provenance,
    /// Whether the assumption could reasonably be wrong or removed.
    #[serde(default)]
    pub is_challengeable: bool,
    /// Free-text notes (the generator's reasoning lands here).
    #[serde(default)]
    pub notes: String,
    /// Current user annotation.
    #[serde(default)]
    pub validation_status: ValidationStatus,
    /// When the assumption was created.
    pub timestamp: DateTime<Utc>,
}

impl Assumption {
    /// Create a new pending assumption
    pub fn new(text: impl Into<String>, category: AssumptionCategory) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            category,
            confidence: 50,
            source: Provenance::User,
            is_challengeable: true,
            notes: String::new(),
            validation_status: ValidationStatus::Pending,
            timestamp: Utc::now(),
        }
    }

    /// Set confidence (clamped to 0-100)
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.min(100);
        self
    }

    /// Set provenance
    pub fn with_source(mut self, source: Provenance) -> Self {
        self.source = source;
        self
    }

    /// Set the challengeable flag
    pub fn with_challengeable(mut self, challengeable: bool) -> Self {
        self.is_challengeable = challengeable;
        self
    }

    /// Set notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Type of a decomposition node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// The problem statement a tree grows from.
    Root,
    /// A sub-component that can be further decomposed.
    #[default]
    Component,
    /// A fundamental truth or first principle.
    Principle,
    /// An open question that needs investigation.
    Question,
    /// A real constraint (physical law, regulation, etc.).
    Constraint,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Root => write!(f, "root"),
            NodeType::Component => write!(f, "component"),
            NodeType::Principle => write!(f, "principle"),
            NodeType::Question => write!(f, "question"),
            NodeType::Constraint => write!(f, "constraint"),
        }
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "root" => Ok(NodeType::Root),
            "component" => Ok(NodeType::Component),
            "principle" => Ok(NodeType::Principle),
            "question" => Ok(NodeType::Question),
            "constraint" => Ok(NodeType::Constraint),
            _ => Err(format!("Unknown node type: {}", s)),
        }
    }
}

/// Display position hint for a node (round-tripped, never interpreted).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One node in the decomposition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecompositionNode {
    /// Unique node identifier.
    pub id: String,
    /// Parent node id; None only for root nodes.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Short label (3-8 words).
    pub label: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Node type.
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    /// Depth in the tree: parent depth + 1, or 0 for roots.
    #[serde(default)]
    pub depth: u32,
    /// Explicit fundamental-truth flag. A node is treated as fundamental
    /// when this is set OR its type is `principle`; see [`Self::is_fundamental`].
    #[serde(default)]
    pub is_fundamental: bool,
    /// Whether the generator or the user produced it.
    #[serde(default)]
    pub source: Provenance,
    /// Evidence attached directly to the node.
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    /// Display position hint.
    #[serde(default)]
    pub position: Position,
    /// Display collapse flag.
    #[serde(default)]
    pub collapsed: bool,
    /// When the node was created.
    pub timestamp: DateTime<Utc>,
}

impl DecompositionNode {
    /// Create a new root-less component node
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: None,
            label: label.into(),
            description: String::new(),
            node_type: NodeType::Component,
            depth: 0,
            is_fundamental: false,
            source: Provenance::User,
            evidence: Vec::new(),
            position: Position::default(),
            collapsed: false,
            timestamp: Utc::now(),
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set node type
    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    /// Attach under a parent at the given depth
    pub fn with_parent(mut self, parent_id: impl Into<String>, depth: u32) -> Self {
        self.parent_id = Some(parent_id.into());
        self.depth = depth;
        self
    }

    /// Set provenance
    pub fn with_source(mut self, source: Provenance) -> Self {
        self.source = source;
        self
    }

    /// Set the explicit fundamental flag
    pub fn with_fundamental(mut self, fundamental: bool) -> Self {
        self.is_fundamental = fundamental;
        self
    }

    /// Whether the node counts as a fundamental truth: the explicit flag is
    /// set or the type is `principle`.
    pub fn is_fundamental(&self) -> bool {
        self.is_fundamental || self.node_type == NodeType::Principle
    }
}

/// One parent-child link in the serialized tree. The edge list is a derived
/// projection of the nodes' `parentId` fields, rebuilt on every structural
/// mutation; `parentId` is the single source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionEdge {
    /// Edge identifier, deterministic per (source, target) pair.
    pub id: String,
    /// Parent node id.
    pub source: String,
    /// Child node id.
    pub target: String,
    /// Optional edge label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DecompositionEdge {
    /// Create the derived edge for a parent-child pair
    pub fn derived(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{}->{}", source, target),
            source,
            target,
            label: None,
        }
    }
}

/// Type of evidence attached to a claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// A specific number, percentage, or quantitative data point.
    Statistic,
    /// A research finding or published study.
    Study,
    /// Views from recognized domain experts.
    ExpertOpinion,
    /// Historical precedent or case study.
    Historical,
    /// A logical argument or deduction.
    #[default]
    Logical,
    /// Observable, testable, or experimentally verified claim.
    Empirical,
}

impl std::fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvidenceType::Statistic => write!(f, "statistic"),
            EvidenceType::Study => write!(f, "study"),
            EvidenceType::ExpertOpinion => write!(f, "expert_opinion"),
            EvidenceType::Historical => write!(f, "historical"),
            EvidenceType::Logical => write!(f, "logical"),
            EvidenceType::Empirical => write!(f, "empirical"),
        }
    }
}

impl std::str::FromStr for EvidenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "statistic" => Ok(EvidenceType::Statistic),
            "study" => Ok(EvidenceType::Study),
            "expert_opinion" => Ok(EvidenceType::ExpertOpinion),
            "historical" => Ok(EvidenceType::Historical),
            "logical" => Ok(EvidenceType::Logical),
            "empirical" => Ok(EvidenceType::Empirical),
            _ => Err(format!("Unknown evidence type: {}", s)),
        }
    }
}

/// One piece of evidence for or against a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Unique evidence identifier.
    pub id: String,
    /// The node whose claim this evidence addresses.
    pub node_id: String,
    /// Evidence type.
    #[serde(rename = "type", default)]
    pub evidence_type: EvidenceType,
    /// The evidence content.
    pub content: String,
    /// Source citation: a URL or a citation string.
    #[serde(default)]
    pub source: String,
    /// Human-readable source name.
    #[serde(default)]
    pub source_label: String,
    /// Confidence in the evidence.
    #[serde(default)]
    pub confidence: ConfidenceLevel,
    /// True for counter-arguments, false for supporting evidence.
    #[serde(default)]
    pub is_counter_argument: bool,
    /// When the evidence was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Evidence {
    /// Create new supporting evidence
    pub fn new(
        node_id: impl Into<String>,
        content: impl Into<String>,
        evidence_type: EvidenceType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            node_id: node_id.into(),
            evidence_type,
            content: content.into(),
            source: String::new(),
            source_label: String::new(),
            confidence: ConfidenceLevel::Medium,
            is_counter_argument: false,
            timestamp: Utc::now(),
        }
    }

    /// Set the source citation and its display label
    pub fn with_source(mut self, source: impl Into<String>, label: impl Into<String>) -> Self {
        self.source = source.into();
        self.source_label = label.into();
        self
    }

    /// Set confidence
    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    /// Mark as a counter-argument
    pub fn as_counter_argument(mut self) -> Self {
        self.is_counter_argument = true;
        self
    }
}

/// The validation outcome for one node. Keyed 1:1 by `nodeId`; re-running
/// validation replaces the prior result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// The validated node.
    pub node_id: String,
    /// Overall confidence in the claim after weighing the evidence.
    #[serde(default)]
    pub overall_confidence: ConfidenceLevel,
    /// Supporting evidence.
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    /// Counter-arguments.
    #[serde(default)]
    pub counter_arguments: Vec<Evidence>,
    /// Free-text summary of the validation.
    #[serde(default)]
    pub summary: String,
    /// A more accurate version of the claim, if the evidence suggests one.
    #[serde(default)]
    pub suggested_revision: Option<String>,
}

impl ValidationResult {
    /// Create an empty result for a node
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            overall_confidence: ConfidenceLevel::Medium,
            evidence: Vec::new(),
            counter_arguments: Vec::new(),
            summary: String::new(),
            suggested_revision: None,
        }
    }
}

/// Solution-building approach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionApproach {
    /// Built up from fundamental truths.
    #[default]
    FirstPrinciples,
    /// The conventional baseline for comparison.
    Conventional,
}

impl std::fmt::Display for SolutionApproach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionApproach::FirstPrinciples => write!(f, "first_principles"),
            SolutionApproach::Conventional => write!(f, "conventional"),
        }
    }
}

impl std::str::FromStr for SolutionApproach {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first_principles" => Ok(SolutionApproach::FirstPrinciples),
            "conventional" => Ok(SolutionApproach::Conventional),
            _ => Err(format!("Unknown solution approach: {}", s)),
        }
    }
}

/// How novel a solution is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Novelty {
    Incremental,
    #[default]
    Moderate,
    Radical,
}

impl std::fmt::Display for Novelty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Novelty::Incremental => write!(f, "incremental"),
            Novelty::Moderate => write!(f, "moderate"),
            Novelty::Radical => write!(f, "radical"),
        }
    }
}

impl std::str::FromStr for Novelty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "incremental" => Ok(Novelty::Incremental),
            "moderate" => Ok(Novelty::Moderate),
            "radical" => Ok(Novelty::Radical),
            _ => Err(format!("Unknown novelty level: {}", s)),
        }
    }
}

/// One reconstructed solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    /// Unique solution identifier.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Whether this is a first-principles or conventional solution.
    #[serde(default)]
    pub approach: SolutionApproach,
    /// Labels of the fundamental truths this solution builds on. These are
    /// informal string references, not node ids.
    #[serde(default)]
    pub used_principles: Vec<String>,
    /// Novelty rating.
    #[serde(default)]
    pub novelty: Novelty,
    /// Feasibility rating.
    #[serde(default)]
    pub feasibility: ConfidenceLevel,
    /// User ranking; only the value 1 ("best") is meaningful, and it is
    /// toggled on/off rather than forming a total order.
    #[serde(default)]
    pub user_rank: Option<i32>,
    /// The generator's rationale for the solution.
    #[serde(default)]
    pub ai_rationale: String,
    /// When the solution was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Solution {
    /// Create a new first-principles solution
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            approach: SolutionApproach::FirstPrinciples,
            used_principles: Vec::new(),
            novelty: Novelty::Moderate,
            feasibility: ConfidenceLevel::Medium,
            user_rank: None,
            ai_rationale: String::new(),
            timestamp: Utc::now(),
        }
    }

    /// Set the approach
    pub fn with_approach(mut self, approach: SolutionApproach) -> Self {
        self.approach = approach;
        self
    }

    /// Set the referenced principle labels
    pub fn with_principles(mut self, principles: Vec<String>) -> Self {
        self.used_principles = principles;
        self
    }

    /// Set novelty
    pub fn with_novelty(mut self, novelty: Novelty) -> Self {
        self.novelty = novelty;
        self
    }

    /// Set feasibility
    pub fn with_feasibility(mut self, feasibility: ConfidenceLevel) -> Self {
        self.feasibility = feasibility;
        self
    }

    /// Set the generator rationale
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.ai_rationale = rationale.into();
        self
    }
}

/// Process counters carried by the aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// Number of completed generator interactions.
    #[serde(rename = "totalAIInteractions", default)]
    pub total_ai_interactions: u32,
    /// Round-tripped but never computed by the core (no timers exist).
    #[serde(default)]
    pub time_spent_minutes: u32,
    /// Number of snapshot exports produced.
    #[serde(default)]
    pub export_count: u32,
}

/// The root aggregate: one complete analysis document.
///
/// The Analysis exclusively owns every contained entity; entities are never
/// shared across two analyses. All mutation goes through
/// [`crate::store::AnalysisStore`], which bumps `updated_at` as a side effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Opaque analysis identifier.
    #[serde(default)]
    pub id: String,
    /// Document schema version.
    #[serde(default = "default_document_version")]
    pub version: u32,
    /// Title, derived from the selected framing.
    #[serde(default)]
    pub title: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time; bumped by every data mutation.
    pub updated_at: DateTime<Utc>,
    /// The phase the user is currently on.
    #[serde(default)]
    pub current_phase: AnalysisPhase,
    /// Problem framing.
    pub framing: ProblemFraming,
    /// Extracted assumptions.
    #[serde(default)]
    pub assumptions: Vec<Assumption>,
    /// The decomposition forest.
    #[serde(default)]
    pub tree: DecompositionTree,
    /// Validation results, at most one per node.
    #[serde(default)]
    pub validations: Vec<ValidationResult>,
    /// Reconstructed solutions.
    #[serde(default)]
    pub solutions: Vec<Solution>,
    /// Process counters.
    #[serde(default)]
    pub metadata: AnalysisMetadata,
}

fn default_document_version() -> u32 {
    1
}

impl Analysis {
    /// Create a fresh, empty analysis
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            version: 1,
            title: "Untitled Analysis".to_string(),
            created_at: now,
            updated_at: now,
            current_phase: AnalysisPhase::Framing,
            framing: ProblemFraming::empty(now),
            assumptions: Vec::new(),
            tree: DecompositionTree::default(),
            validations: Vec::new(),
            solutions: Vec::new(),
            metadata: AnalysisMetadata::default(),
        }
    }

    /// All fundamental truths: nodes with the explicit flag or of type
    /// `principle`.
    pub fn fundamental_nodes(&self) -> Vec<&DecompositionNode> {
        self.tree.fundamental_nodes()
    }

    /// Texts of assumptions the user has challenged or disproved.
    pub fn rejected_assumption_texts(&self) -> Vec<String> {
        self.assumptions
            .iter()
            .filter(|a| a.validation_status.is_rejected())
            .map(|a| a.text.clone())
            .collect()
    }

    /// The validation result for a node, if one exists.
    pub fn validation_for(&self, node_id: &str) -> Option<&ValidationResult> {
        self.validations.iter().find(|v| v.node_id == node_id)
    }
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new()
    }
}
