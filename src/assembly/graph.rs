// src/assembly/graph.rs

//! Read-only view of an assembled task set as a directed graph.
//!
//! None of this is needed to install tasks; it exists for plan output and
//! diagnostics. Problems found here (cycles, unknown prerequisites) are only
//! warnings, because the runner is the one that interprets the edges.

use std::collections::HashSet;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Dfs, Reversed};
use tracing::warn;

use crate::assembly::runner::TaskSpec;
use crate::types::TaskName;

/// Edge direction: prerequisite -> task.
#[derive(Debug, Clone)]
pub struct TaskGraph<'a> {
    graph: DiGraphMap<&'a str, ()>,
    /// Node order used when the graph has a cycle.
    registration_order: Vec<&'a str>,
}

/// A prerequisite that names no task in the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPrerequisite {
    pub task: TaskName,
    pub prerequisite: TaskName,
}

impl<'a> TaskGraph<'a> {
    pub fn from_specs(specs: &'a [TaskSpec]) -> Self {
        let mut graph: DiGraphMap<&'a str, ()> = DiGraphMap::new();
        let mut registration_order = Vec::with_capacity(specs.len());

        for spec in specs {
            graph.add_node(spec.name.as_str());
            registration_order.push(spec.name.as_str());
        }

        for spec in specs {
            for prereq in &spec.prerequisites {
                graph.add_edge(prereq.as_str(), spec.name.as_str(), ());
            }
        }

        Self {
            graph,
            registration_order,
        }
    }

    /// Immediate prerequisites of `task`.
    pub fn dependencies_of(&self, task: &str) -> Vec<&'a str> {
        self.neighbors(task, Direction::Incoming)
    }

    /// Tasks that list `task` as a prerequisite.
    pub fn dependents_of(&self, task: &str) -> Vec<&'a str> {
        self.neighbors(task, Direction::Outgoing)
    }

    /// Name of a task on a dependency cycle, if there is one.
    pub fn find_cycle(&self) -> Option<&'a str> {
        toposort(&self.graph, None).err().map(|cycle| cycle.node_id())
    }

    /// Every task, prerequisites first. Unknown prerequisite names are left
    /// out.
    ///
    /// Falls back to registration order (with a warning) when the edges form
    /// a cycle.
    pub fn dependency_order(&self) -> Vec<&'a str> {
        match toposort(&self.graph, None) {
            Ok(order) => order
                .into_iter()
                .filter(|n| self.node(n).is_some())
                .collect(),
            Err(cycle) => {
                warn!(
                    task = %cycle.node_id(),
                    "dependency cycle detected; listing tasks in registration order"
                );
                self.registration_order.clone()
            }
        }
    }

    /// `task` plus everything it transitively depends on, prerequisites first.
    ///
    /// Empty if `task` is not in the graph.
    pub fn prerequisite_closure(&self, task: &str) -> Vec<&'a str> {
        let Some(start) = self.node(task) else {
            return Vec::new();
        };

        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut reachable: HashSet<&'a str> = HashSet::new();
        while let Some(node) = dfs.next(reversed) {
            reachable.insert(node);
        }

        self.dependency_order()
            .into_iter()
            .filter(|n| reachable.contains(n))
            .collect()
    }

    fn node(&self, task: &str) -> Option<&'a str> {
        self.registration_order.iter().copied().find(|n| *n == task)
    }

    fn neighbors(&self, task: &str, direction: Direction) -> Vec<&'a str> {
        match self.node(task) {
            Some(node) => self.graph.neighbors_directed(node, direction).collect(),
            None => Vec::new(),
        }
    }

    /// Prerequisites that do not name any task in the set.
    ///
    /// These are passed through to the runner unchanged; this list is only
    /// for diagnostics.
    pub fn unknown_prerequisites(&self, specs: &[TaskSpec]) -> Vec<UnknownPrerequisite> {
        let known: HashSet<&str> = self.registration_order.iter().copied().collect();
        specs
            .iter()
            .flat_map(|spec| {
                spec.prerequisites
                    .iter()
                    .filter(|p| !known.contains(p.as_str()))
                    .map(|p| UnknownPrerequisite {
                        task: spec.name.clone(),
                        prerequisite: p.clone(),
                    })
            })
            .collect()
    }
}
