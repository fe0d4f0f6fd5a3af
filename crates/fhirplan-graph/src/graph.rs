//! PlanGraph — accumulates resource declarations, evaluates once.
//!
//! The graph is a plain builder: `add` registers resources under unique
//! logical ids, `depends_on` edges express provider-side ordering, and
//! [`PlanGraph::synth`] validates the edges, topologically sorts the
//! resources, and produces the immutable plan artifact.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::plan::{DeploymentPlan, Output, PLAN_FORMAT_VERSION};
use crate::resource::{AlarmSpec, Resource, ResourceSpec};

#[derive(Debug)]
pub struct PlanGraph {
    stack_name: String,
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
    outputs: Vec<Output>,
}

impl PlanGraph {
    pub fn new(stack_name: &str) -> Self {
        Self {
            stack_name: stack_name.to_string(),
            resources: Vec::new(),
            index: HashMap::new(),
            outputs: Vec::new(),
        }
    }

    /// Declare a resource with no ordering dependencies.
    pub fn add(&mut self, id: &str, spec: ResourceSpec) -> GraphResult<()> {
        self.add_with_deps(id, spec, &[])
    }

    /// Declare a resource that must be created after `deps`.
    pub fn add_with_deps(
        &mut self,
        id: &str,
        spec: ResourceSpec,
        deps: &[&str],
    ) -> GraphResult<()> {
        if self.index.contains_key(id) {
            return Err(GraphError::DuplicateResource(id.to_string()));
        }
        debug!(id, kind = spec.kind(), deps = deps.len(), "resource declared");
        self.index.insert(id.to_string(), self.resources.len());
        self.resources.push(Resource {
            id: id.to_string(),
            spec,
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
        });
        Ok(())
    }

    /// Add an ordering edge to an already-declared resource.
    pub fn add_dependency(&mut self, id: &str, dep: &str) -> GraphResult<()> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| GraphError::UnknownResource(id.to_string()))?;
        let resource = &mut self.resources[idx];
        if !resource.depends_on.iter().any(|d| d == dep) {
            resource.depends_on.push(dep.to_string());
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.index.get(id).map(|&i| &self.resources[i])
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Iterate over every alarm in the graph, mutably. Used by the
    /// notification router to attach actions.
    pub fn alarms_mut(&mut self) -> impl Iterator<Item = (&str, &mut AlarmSpec)> {
        self.resources.iter_mut().filter_map(|r| {
            let Resource { id, spec, .. } = r;
            spec.as_alarm_mut().map(|a| (id.as_str(), a))
        })
    }

    /// Surface a named plan-generation-time value.
    pub fn add_output(&mut self, name: &str, description: &str, value: String) {
        self.outputs.push(Output {
            name: name.to_string(),
            description: description.to_string(),
            value,
        });
    }

    /// Kahn's algorithm over the dependency edges. Fails on edges to
    /// undeclared resources and on cycles.
    pub fn topo_order(&self) -> GraphResult<Vec<&Resource>> {
        let n = self.resources.len();
        let mut indegree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, resource) in self.resources.iter().enumerate() {
            for dep in &resource.depends_on {
                let &j = self.index.get(dep).ok_or_else(|| {
                    GraphError::UnknownDependency {
                        resource: resource.id.clone(),
                        dependency: dep.clone(),
                    }
                })?;
                indegree[i] += 1;
                dependents[j].push(i);
            }
        }

        // Seed with declaration order so independent resources keep a
        // stable, deterministic position in the plan.
        let mut queue: VecDeque<usize> =
            (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(i) = queue.pop_front() {
            order.push(&self.resources[i]);
            for &k in &dependents[i] {
                indegree[k] -= 1;
                if indegree[k] == 0 {
                    queue.push_back(k);
                }
            }
        }

        if order.len() != n {
            let stuck = self
                .resources
                .iter()
                .enumerate()
                .find(|(i, _)| indegree[*i] > 0)
                .map(|(_, r)| r.id.clone())
                .unwrap_or_default();
            return Err(GraphError::DependencyCycle(stuck));
        }
        Ok(order)
    }

    /// Evaluate the graph into the immutable plan artifact.
    pub fn synth(self) -> GraphResult<DeploymentPlan> {
        let ordered: Vec<Resource> = self.topo_order()?.into_iter().cloned().collect();
        debug!(
            stack = %self.stack_name,
            resources = ordered.len(),
            outputs = self.outputs.len(),
            "plan synthesized"
        );
        Ok(DeploymentPlan {
            format_version: PLAN_FORMAT_VERSION,
            stack_name: self.stack_name,
            resources: ordered,
            outputs: self.outputs,
        })
    }
}
