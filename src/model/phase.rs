//! The six-phase workflow and its navigation gate.

use serde::{Deserialize, Serialize};

use super::Analysis;

/// One of the six ordered stages of the guided workflow. The string forms
/// are persisted as `currentPhase` and used as navigation targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisPhase {
    #[default]
    Framing,
    Assumptions,
    Decomposition,
    Validation,
    Reconstruction,
    Dashboard,
}

impl AnalysisPhase {
    /// All phases in workflow order.
    pub const ALL: [AnalysisPhase; 6] = [
        AnalysisPhase::Framing,
        AnalysisPhase::Assumptions,
        AnalysisPhase::Decomposition,
        AnalysisPhase::Validation,
        AnalysisPhase::Reconstruction,
        AnalysisPhase::Dashboard,
    ];

    /// Zero-based position in the workflow order.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    /// The immediate successor phase, if any.
    pub fn next(self) -> Option<AnalysisPhase> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Get the phase name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisPhase::Framing => "framing",
            AnalysisPhase::Assumptions => "assumptions",
            AnalysisPhase::Decomposition => "decomposition",
            AnalysisPhase::Validation => "validation",
            AnalysisPhase::Reconstruction => "reconstruction",
            AnalysisPhase::Dashboard => "dashboard",
        }
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AnalysisPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "framing" => Ok(AnalysisPhase::Framing),
            "assumptions" => Ok(AnalysisPhase::Assumptions),
            "decomposition" => Ok(AnalysisPhase::Decomposition),
            "validation" => Ok(AnalysisPhase::Validation),
            "reconstruction" => Ok(AnalysisPhase::Reconstruction),
            "dashboard" => Ok(AnalysisPhase::Dashboard),
            _ => Err(format!("Unknown phase: {}", s)),
        }
    }
}

/// Navigation gate over the six phases.
///
/// Completion predicates are evaluated against the aggregate on demand, not
/// stored as flags. The phase itself is advanced explicitly by the caller on
/// navigation, so the data may run ahead of `currentPhase`; that relaxation
/// is intentional.
pub struct PhaseGate;

impl PhaseGate {
    /// Whether a phase's completion predicate holds for the given analysis.
    pub fn is_complete(phase: AnalysisPhase, analysis: &Analysis) -> bool {
        match phase {
            AnalysisPhase::Framing => !analysis.framing.selected_framing.is_empty(),
            AnalysisPhase::Assumptions => !analysis.assumptions.is_empty(),
            AnalysisPhase::Decomposition => analysis.tree.non_root_count() > 0,
            // Validation may be skipped entirely.
            AnalysisPhase::Validation => true,
            AnalysisPhase::Reconstruction => !analysis.tree.fundamental_nodes().is_empty(),
            AnalysisPhase::Dashboard => false,
        }
    }

    /// Whether navigation from `current` to `target` is permitted: any
    /// revisit (target at or before current), or the immediate successor
    /// when the current phase's completion predicate holds.
    pub fn can_navigate(
        current: AnalysisPhase,
        target: AnalysisPhase,
        analysis: &Analysis,
    ) -> bool {
        if target.index() <= current.index() {
            return true;
        }
        current.next() == Some(target) && Self::is_complete(current, analysis)
    }
}
