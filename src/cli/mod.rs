//! Interactive command-line surface for the guided workflow.
//!
//! The REPL drives one Analysis through the six phases. Streamed generation
//! is printed live; every command runs to completion before the next one is
//! read, which keeps all mutations on a single serialized path.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;

use crate::anthropic::AnthropicClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::model::{AnalysisPhase, Assumption, AssumptionCategory, DecompositionNode, PhaseGate};
use crate::phases::{
    ensure_root, AssumptionsPhase, DecompositionPhase, FramingPhase, ReconstructionPhase,
    ValidationPhase,
};
use crate::snapshot;
use crate::store::AnalysisStore;
use crate::stream::{SessionManager, StreamEvent};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(
    name = "firstp",
    version,
    about = "Guided first-principles analysis from your terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the interactive guided workflow (the default)
    Run {
        /// Snapshot file to resume from
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Validate a snapshot file and print a summary
    Inspect {
        /// Snapshot file to inspect
        file: PathBuf,
    },
}

/// Validate a snapshot file and print a one-screen summary.
pub fn inspect(path: &Path) -> AppResult<()> {
    let analysis = snapshot::read_snapshot(path).map_err(AppError::from)?;
    println!("Analysis: {}", analysis.title);
    println!("  id:            {}", analysis.id);
    println!("  phase:         {}", analysis.current_phase);
    println!("  updated:       {}", analysis.updated_at.to_rfc3339());
    println!("  assumptions:   {}", analysis.assumptions.len());
    println!(
        "  tree:          {} nodes ({} fundamental)",
        analysis.tree.node_count(),
        analysis.tree.fundamental_nodes().len()
    );
    println!("  validations:   {}", analysis.validations.len());
    println!("  solutions:     {}", analysis.solutions.len());
    println!(
        "  exports:       {}",
        analysis.metadata.export_count
    );
    Ok(())
}

/// The interactive workflow session.
pub struct Workflow {
    store: AnalysisStore,
    sessions: SessionManager,
    framing: FramingPhase,
    assumptions: AssumptionsPhase,
    decomposition: DecompositionPhase,
    validation: ValidationPhase,
    reconstruction: ReconstructionPhase,
}

impl Workflow {
    /// Build a workflow from configuration
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = AnthropicClient::new(
            &config.anthropic,
            config.request.clone(),
            config.generation.clone(),
        )?;
        Ok(Self {
            store: AnalysisStore::new(),
            sessions: SessionManager::new(),
            framing: FramingPhase::new(client.clone()),
            assumptions: AssumptionsPhase::new(client.clone()),
            decomposition: DecompositionPhase::new(client.clone()),
            validation: ValidationPhase::new(client.clone()),
            reconstruction: ReconstructionPhase::new(client),
        })
    }

    /// Resume from a snapshot file before entering the loop.
    pub fn load_snapshot(&mut self, path: &Path) -> AppResult<()> {
        let analysis = snapshot::read_snapshot(path)?;
        self.store.replace(analysis);
        Ok(())
    }

    /// Run the REPL until `quit`.
    pub async fn run(&mut self) -> AppResult<()> {
        println!("firstp - guided first-principles analysis");
        println!("Type 'help' for commands.\n");
        self.print_status();

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            print!("firstp[{}]> ", self.store.analysis().current_phase);
            let _ = std::io::stdout().flush();

            let Ok(Some(line)) = lines.next_line().await else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "quit" || line == "exit" {
                break;
            }
            if let Err(e) = self.dispatch(line).await {
                println!("error: {}", e);
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, line: &str) -> AppResult<()> {
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "help" => self.print_help(),
            "status" => self.print_status(),
            "list" => self.print_phase_items(),
            "tree" => self.print_tree(),
            "input" => {
                self.store.set_original_input(rest);
                println!("problem input set ({} chars)", rest.len());
            }
            "context" => {
                self.store.set_context(rest);
                println!("context set");
            }
            "domain" => {
                self.store
                    .set_domain(if rest.is_empty() { None } else { Some(rest.to_string()) });
                println!("domain set");
            }
            "analyze" => self.run_framing().await?,
            "select" => self.select_framing(rest),
            "extract" => self.run_assumptions().await?,
            "add" => self.add_manual(rest),
            "cycle" => self.cycle_status(rest),
            "rm" => self.remove_item(rest),
            "decompose" => self.run_decomposition(rest).await?,
            "validate" => self.run_validation(rest).await?,
            "reconstruct" => self.run_reconstruction().await?,
            "rank" => self.rank_solution(rest),
            "next" => self.navigate_next(),
            "back" => self.navigate_back(),
            "goto" => self.navigate_goto(rest),
            "export" => self.export_snapshot(rest)?,
            "import" => self.import_snapshot(rest)?,
            "new" => {
                self.store.reset();
                println!("started a new analysis");
            }
            other => println!("unknown command '{}'; try 'help'", other),
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Streaming phases
    // ------------------------------------------------------------------

    /// Print stream progress live and return the completed text, or None on
    /// failure or cancellation.
    async fn consume_stream(mut events: UnboundedReceiver<StreamEvent>) -> Option<String> {
        let mut printed = 0usize;
        while let Some(event) = events.recv().await {
            match event {
                StreamEvent::Progress { text } => {
                    print!("{}", &text[printed..]);
                    let _ = std::io::stdout().flush();
                    printed = text.len();
                }
                StreamEvent::Completed { text } => {
                    println!();
                    return Some(text);
                }
                StreamEvent::Failed { error } => {
                    println!();
                    println!("generation failed: {} (you can retry the command)", error);
                    return None;
                }
            }
        }
        None
    }

    async fn run_framing(&mut self) -> AppResult<()> {
        FramingPhase::clear_proposals(&mut self.store);
        let events = self.framing.begin(&mut self.sessions, &self.store).await?;
        if let Some(text) = Self::consume_stream(events).await {
            let outcome = FramingPhase::apply_completion(&mut self.store, &text);
            println!(
                "\n{} reframings proposed; 'list' to review, 'select <n>' to choose",
                outcome.statements_added
            );
        }
        Ok(())
    }

    async fn run_assumptions(&mut self) -> AppResult<()> {
        let events = self
            .assumptions
            .begin(&mut self.sessions, &self.store)
            .await?;
        if let Some(text) = Self::consume_stream(events).await {
            let outcome = AssumptionsPhase::apply_completion(&mut self.store, &text);
            println!(
                "\n{} new assumptions ({} duplicates skipped)",
                outcome.added, outcome.skipped_duplicates
            );
        }
        Ok(())
    }

    async fn run_decomposition(&mut self, rest: &str) -> AppResult<()> {
        ensure_root(&mut self.store);
        let Some(node_id) = self.resolve_node(rest) else {
            println!("usage: decompose <node-index> (see 'tree')");
            return Ok(());
        };
        let events = self
            .decomposition
            .begin(&mut self.sessions, &self.store, &node_id)
            .await?;
        if let Some(text) = Self::consume_stream(events).await {
            let outcome = DecompositionPhase::apply_completion(&mut self.store, &text, &node_id);
            println!("\n{} child nodes attached", outcome.nodes_added);
        }
        Ok(())
    }

    async fn run_validation(&mut self, rest: &str) -> AppResult<()> {
        let node_id = if rest.is_empty() {
            // Next validatable node without a result.
            self.store
                .validatable_node_ids()
                .into_iter()
                .find(|id| self.store.analysis().validation_for(id).is_none())
        } else {
            self.resolve_node(rest)
        };
        let Some(node_id) = node_id else {
            println!("nothing left to validate");
            return Ok(());
        };

        let events = self
            .validation
            .begin(&mut self.sessions, &self.store, &node_id)
            .await?;
        if let Some(text) = Self::consume_stream(events).await {
            let outcome = ValidationPhase::apply_completion(&mut self.store, &text, &node_id);
            println!(
                "\n{} evidence, {} counter-arguments",
                outcome.evidence_count, outcome.counter_argument_count
            );
        }
        Ok(())
    }

    async fn run_reconstruction(&mut self) -> AppResult<()> {
        let events = self
            .reconstruction
            .begin(&mut self.sessions, &self.store)
            .await?;
        if let Some(text) = Self::consume_stream(events).await {
            let outcome = ReconstructionPhase::apply_completion(&mut self.store, &text);
            println!("\n{} solutions generated", outcome.solutions);
            if let Some(comparison) = outcome.comparison {
                println!("comparison: {}", comparison);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Manual edits
    // ------------------------------------------------------------------

    fn select_framing(&mut self, rest: &str) {
        if let Ok(index) = rest.parse::<usize>() {
            let text = self
                .store
                .analysis()
                .framing
                .reframed_statements
                .get(index)
                .map(|s| s.text.clone());
            match text {
                Some(text) => {
                    self.store.select_framing(&text);
                    println!("selected: {}", text);
                }
                None => println!("no reframing at index {}", index),
            }
        } else if !rest.is_empty() {
            // Free-hand framing; selects none of the listed statements.
            self.store.select_framing(rest);
            println!("selected custom framing");
        } else {
            println!("usage: select <n> or select <your own framing text>");
        }
    }

    fn add_manual(&mut self, rest: &str) {
        match self.store.analysis().current_phase {
            AnalysisPhase::Assumptions => {
                if rest.is_empty() {
                    println!("usage: add <assumption text>");
                    return;
                }
                self.store
                    .add_assumption(Assumption::new(rest, AssumptionCategory::Domain));
                println!("assumption added");
            }
            AnalysisPhase::Decomposition => {
                let Some((index, label)) = rest.split_once(' ') else {
                    println!("usage: add <parent-index> <label>");
                    return;
                };
                let Some(parent_id) = self.resolve_node(index) else {
                    println!("no node at index {}", index);
                    return;
                };
                let parent_depth = self
                    .store
                    .analysis()
                    .tree
                    .get(&parent_id)
                    .map(|n| n.depth)
                    .unwrap_or(0);
                self.store.add_node(
                    DecompositionNode::new(label.trim())
                        .with_parent(parent_id, parent_depth + 1),
                );
                println!("node added");
            }
            phase => println!("'add' is not available in the {} phase", phase),
        }
    }

    fn cycle_status(&mut self, rest: &str) {
        let Some(id) = rest
            .parse::<usize>()
            .ok()
            .and_then(|i| self.store.analysis().assumptions.get(i))
            .map(|a| a.id.clone())
        else {
            println!("usage: cycle <assumption-index>");
            return;
        };
        if let Some(status) = self.store.cycle_assumption_status(&id) {
            println!("status -> {}", status);
        }
    }

    fn remove_item(&mut self, rest: &str) {
        match self.store.analysis().current_phase {
            AnalysisPhase::Assumptions => {
                let Some(id) = rest
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.store.analysis().assumptions.get(i))
                    .map(|a| a.id.clone())
                else {
                    println!("usage: rm <assumption-index>");
                    return;
                };
                self.store.remove_assumption(&id);
                println!("assumption removed");
            }
            AnalysisPhase::Decomposition => {
                let Some(id) = self.resolve_node(rest) else {
                    println!("usage: rm <node-index>");
                    return;
                };
                let removed = self.store.remove_node(&id);
                println!("{} nodes removed (subtree included)", removed);
            }
            phase => println!("'rm' is not available in the {} phase", phase),
        }
    }

    fn rank_solution(&mut self, rest: &str) {
        let Some(id) = rest
            .parse::<usize>()
            .ok()
            .and_then(|i| self.store.analysis().solutions.get(i))
            .map(|s| s.id.clone())
        else {
            println!("usage: rank <solution-index>");
            return;
        };
        self.store.toggle_best_solution(&id);
        println!("best-solution mark toggled");
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn navigate_next(&mut self) {
        let current = self.store.analysis().current_phase;
        let Some(target) = current.next() else {
            println!("already at the last phase");
            return;
        };
        self.navigate(target);
    }

    fn navigate_back(&mut self) {
        let current = self.store.analysis().current_phase;
        let index = current.index();
        if index == 0 {
            println!("already at the first phase");
            return;
        }
        self.navigate(AnalysisPhase::ALL[index - 1]);
    }

    fn navigate_goto(&mut self, rest: &str) {
        match rest.parse::<AnalysisPhase>() {
            Ok(target) => self.navigate(target),
            Err(e) => println!("{}", e),
        }
    }

    fn navigate(&mut self, target: AnalysisPhase) {
        if self.store.navigate_to(target) {
            if target == AnalysisPhase::Decomposition {
                ensure_root(&mut self.store);
            }
            println!("now in the {} phase", target);
        } else {
            let current = self.store.analysis().current_phase;
            if PhaseGate::is_complete(current, self.store.analysis()) {
                println!("cannot jump from {} to {}", current, target);
            } else {
                println!(
                    "complete the {} phase first (see 'status')",
                    current
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    fn export_snapshot(&mut self, rest: &str) -> AppResult<()> {
        if rest.is_empty() {
            println!("usage: export <path>");
            return Ok(());
        }
        snapshot::write_snapshot(&mut self.store, Path::new(rest))?;
        println!("exported to {}", rest);
        Ok(())
    }

    fn import_snapshot(&mut self, rest: &str) -> AppResult<()> {
        if rest.is_empty() {
            println!("usage: import <path>");
            return Ok(());
        }
        // A failed read leaves the current analysis untouched.
        match snapshot::read_snapshot(Path::new(rest)) {
            Ok(analysis) => {
                self.sessions.stop();
                self.store.replace(analysis);
                println!("imported {}", rest);
            }
            Err(e) => {
                warn!(error = %e, path = rest, "Snapshot import rejected");
                println!("invalid file: {}", e);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Display
    // ------------------------------------------------------------------

    fn resolve_node(&self, rest: &str) -> Option<String> {
        rest.parse::<usize>()
            .ok()
            .and_then(|i| self.store.analysis().tree.nodes.get(i))
            .map(|n| n.id.clone())
    }

    fn print_help(&self) {
        println!("workflow:   analyze | select <n|text> | extract | decompose <n> |");
        println!("            validate [n] | reconstruct | rank <n>");
        println!("edit:       input <text> | context <text> | domain <text> |");
        println!("            add ... | cycle <n> | rm <n>");
        println!("navigate:   next | back | goto <phase> | status | list | tree");
        println!("snapshots:  export <path> | import <path> | new");
        println!("            quit");
    }

    fn print_status(&self) {
        let analysis = self.store.analysis();
        println!("phase: {}  |  {}", analysis.current_phase, analysis.title);
        println!(
            "  framing: {}  assumptions: {}  nodes: {} ({} fundamental)  validations: {}  solutions: {}",
            if analysis.framing.selected_framing.is_empty() { "pending" } else { "selected" },
            analysis.assumptions.len(),
            analysis.tree.node_count(),
            analysis.tree.fundamental_nodes().len(),
            analysis.validations.len(),
            analysis.solutions.len(),
        );
    }

    fn print_phase_items(&self) {
        let analysis = self.store.analysis();
        match analysis.current_phase {
            AnalysisPhase::Framing => {
                for (i, s) in analysis.framing.reframed_statements.iter().enumerate() {
                    let mark = if s.selected { "*" } else { " " };
                    println!("[{}]{} ({}) {}", i, mark, s.perspective, s.text);
                }
            }
            AnalysisPhase::Assumptions => {
                for (i, a) in analysis.assumptions.iter().enumerate() {
                    println!(
                        "[{}] ({}, {}%, {}) {}",
                        i, a.category, a.confidence, a.validation_status, a.text
                    );
                }
            }
            AnalysisPhase::Decomposition | AnalysisPhase::Validation => self.print_tree(),
            AnalysisPhase::Reconstruction | AnalysisPhase::Dashboard => {
                for (i, s) in analysis.solutions.iter().enumerate() {
                    let best = if s.user_rank == Some(1) { " [best]" } else { "" };
                    println!(
                        "[{}] ({}, {}, {} feasibility){} {} - {}",
                        i, s.approach, s.novelty, s.feasibility, best, s.title, s.description
                    );
                }
            }
        }
    }

    fn print_tree(&self) {
        let analysis = self.store.analysis();
        let roots: Vec<String> = analysis.tree.roots().iter().map(|n| n.id.clone()).collect();
        for root_id in roots {
            self.print_subtree(&root_id, 0);
        }
    }

    fn print_subtree(&self, node_id: &str, indent: usize) {
        let analysis = self.store.analysis();
        let Some(node) = analysis.tree.get(node_id) else {
            return;
        };
        let index = analysis
            .tree
            .nodes
            .iter()
            .position(|n| n.id == node.id)
            .unwrap_or(0);
        let star = if node.is_fundamental() { " *" } else { "" };
        let validated = match self.store.node_confidence(node_id) {
            Some(confidence) => format!(" [validated: {}]", confidence),
            None => String::new(),
        };
        println!(
            "{}[{}] ({}){}{} {}",
            "  ".repeat(indent),
            index,
            node.node_type,
            star,
            validated,
            node.label
        );
        let children: Vec<String> = analysis
            .tree
            .children_of(node_id)
            .iter()
            .map(|n| n.id.clone())
            .collect();
        for child_id in children {
            self.print_subtree(&child_id, indent + 1);
        }
    }
}
