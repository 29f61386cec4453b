//! Named release steps ordered by a dependency graph.
//!
//! Edges point from a predecessor to the step that waits on it, so a
//! topological sort yields an execution order with predecessors first.

use crate::error::{PipelineError, ReleaseError, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// One node of the release graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Unique step name
    pub name: String,
    /// Steps that must run first
    pub predecessors: Vec<String>,
    /// Whether a failure aborts the release
    pub required: bool,
}

impl Step {
    /// A step whose failure aborts the release
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predecessors: Vec::new(),
            required: true,
        }
    }

    /// A step whose failure is logged and skipped over
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    /// Add predecessors
    pub fn after<I, S>(mut self, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predecessors
            .extend(predecessors.into_iter().map(Into::into));
        self
    }
}

/// Validated, acyclic set of steps
#[derive(Debug)]
pub struct StepGraph {
    graph: DiGraph<Step, ()>,
    node_map: HashMap<String, NodeIndex>,
    order: Vec<NodeIndex>,
}

impl StepGraph {
    /// Build the graph, rejecting duplicate names, unknown predecessors and cycles
    pub fn new(steps: Vec<Step>) -> std::result::Result<Self, PipelineError> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for step in steps {
            let name = step.name.clone();
            if node_map.contains_key(&name) {
                return Err(PipelineError::DuplicateStep { step: name });
            }
            let idx = graph.add_node(step);
            node_map.insert(name, idx);
        }

        let mut edges = Vec::new();
        for (name, &idx) in &node_map {
            for predecessor in &graph[idx].predecessors {
                let &from = node_map.get(predecessor).ok_or_else(|| {
                    PipelineError::UnknownPredecessor {
                        step: name.clone(),
                        predecessor: predecessor.clone(),
                    }
                })?;
                edges.push((from, idx));
            }
        }
        for (from, to) in edges {
            graph.add_edge(from, to, ());
        }

        let order = toposort(&graph, None).map_err(|cycle| PipelineError::Cycle {
            step: graph[cycle.node_id()].name.clone(),
        })?;

        Ok(Self {
            graph,
            node_map,
            order,
        })
    }

    /// Steps in execution order
    pub fn order(&self) -> Vec<&Step> {
        self.order.iter().map(|&idx| &self.graph[idx]).collect()
    }

    /// Look up a step by name
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.node_map.get(name).map(|&idx| &self.graph[idx])
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no steps
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Run every step in order
    ///
    /// A failed required step stops the run with
    /// [`PipelineError::StepFailed`]. A failed optional step is recorded and
    /// the run continues; its dependents still execute.
    pub fn execute<R: StepRunner + ?Sized>(&self, runner: &mut R) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for step in self.order() {
            log::info!("Running step '{}'", step.name);
            match runner.run_step(&step.name) {
                Ok(()) => report.record(step, StepStatus::Succeeded),
                Err(e) if step.required => {
                    log::error!("Required step '{}' failed: {}", step.name, e);
                    return Err(ReleaseError::Pipeline(PipelineError::StepFailed {
                        step: step.name.clone(),
                        reason: e.to_string(),
                    }));
                }
                Err(e) => {
                    log::warn!("Optional step '{}' failed, continuing: {}", step.name, e);
                    report.record(step, StepStatus::Degraded(e.to_string()));
                }
            }
        }

        Ok(report)
    }
}

/// Executes steps by name
pub trait StepRunner {
    /// Run the named step
    fn run_step(&mut self, step: &str) -> Result<()>;
}

/// How a step finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Completed
    Succeeded,
    /// Optional step failed; the release carried on
    Degraded(String),
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Step name
    pub name: String,
    /// Final status
    pub status: StepStatus,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Steps in the order they ran
    pub steps: Vec<StepReport>,
}

impl PipelineReport {
    fn record(&mut self, step: &Step, status: StepStatus) {
        self.steps.push(StepReport {
            name: step.name.clone(),
            status,
        });
    }

    /// Names of steps that ran
    pub fn executed(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Steps that failed without aborting the run
    pub fn degraded(&self) -> Vec<&StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Degraded(_)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    struct Recorder {
        ran: Vec<String>,
        failing: Vec<&'static str>,
    }

    impl StepRunner for Recorder {
        fn run_step(&mut self, step: &str) -> Result<()> {
            self.ran.push(step.to_string());
            if self.failing.contains(&step) {
                return Err(CliError::ExecutionFailed {
                    command: step.to_string(),
                    reason: "boom".to_string(),
                }
                .into());
            }
            Ok(())
        }
    }

    fn position(order: &[&Step], name: &str) -> usize {
        order
            .iter()
            .position(|s| s.name == name)
            .expect("step present")
    }

    #[test]
    fn test_predecessors_run_first() {
        let graph = StepGraph::new(vec![
            Step::optional("notify").after(["publish"]),
            Step::required("publish").after(["collect", "changelog"]),
            Step::optional("changelog").after(["version"]),
            Step::required("collect"),
            Step::required("version"),
        ])
        .expect("valid graph");

        let order = graph.order();
        assert_eq!(order.len(), 5);
        assert!(position(&order, "version") < position(&order, "changelog"));
        assert!(position(&order, "changelog") < position(&order, "publish"));
        assert!(position(&order, "collect") < position(&order, "publish"));
        assert!(position(&order, "publish") < position(&order, "notify"));
    }

    #[test]
    fn test_cycle_rejected() {
        let err = StepGraph::new(vec![
            Step::required("a").after(["b"]),
            Step::required("b").after(["a"]),
        ])
        .unwrap_err();
        assert!(matches!(err, PipelineError::Cycle { .. }));
    }

    #[test]
    fn test_unknown_predecessor_rejected() {
        let err = StepGraph::new(vec![Step::required("publish").after(["collect"])]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnknownPredecessor { ref step, ref predecessor }
                if step == "publish" && predecessor == "collect"
        ));
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let err = StepGraph::new(vec![Step::required("a"), Step::optional("a")]).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateStep { .. }));
    }

    #[test]
    fn test_required_failure_aborts() {
        let graph = StepGraph::new(vec![
            Step::required("collect"),
            Step::optional("notify").after(["collect"]),
        ])
        .expect("valid graph");
        let mut runner = Recorder {
            ran: Vec::new(),
            failing: vec!["collect"],
        };

        let err = graph.execute(&mut runner).unwrap_err();
        assert!(matches!(
            err,
            ReleaseError::Pipeline(PipelineError::StepFailed { ref step, .. }) if step == "collect"
        ));
        assert_eq!(runner.ran, vec!["collect".to_string()]);
    }

    #[test]
    fn test_optional_failure_degrades() {
        let graph = StepGraph::new(vec![
            Step::optional("changelog"),
            Step::required("publish").after(["changelog"]),
        ])
        .expect("valid graph");
        let mut runner = Recorder {
            ran: Vec::new(),
            failing: vec!["changelog"],
        };

        let report = graph.execute(&mut runner).expect("run completes");
        assert_eq!(report.executed(), vec!["changelog", "publish"]);
        assert_eq!(report.degraded().len(), 1);
        assert_eq!(report.degraded()[0].name, "changelog");
    }
}
