//! # Workflow Registry
//!
//! Maps workflow identifiers to workflow instances and picks the one an
//! interaction names in its `workflow` key.

use super::errors::{WorkflowError, WorkflowResult};
use super::{Workflow, WorkflowType};
use crate::messaging::InteractionDetails;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default, Clone)]
pub struct WorkflowRegistry {
    workflows: HashMap<WorkflowType, Arc<dyn Workflow>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow under its own type, replacing any previous one
    pub fn register(&mut self, workflow: Arc<dyn Workflow>) -> Option<Arc<dyn Workflow>> {
        let workflow_type = workflow.workflow_type();
        debug!(workflow = %workflow_type, "Registering workflow");
        self.workflows.insert(workflow_type, workflow)
    }

    pub fn get(&self, workflow_type: WorkflowType) -> WorkflowResult<Arc<dyn Workflow>> {
        self.workflows
            .get(&workflow_type)
            .cloned()
            .ok_or_else(|| WorkflowError::unknown_workflow(workflow_type.as_str()))
    }

    /// Workflow named by the interaction's `workflow` key
    pub fn for_interaction(&self, details: &InteractionDetails) -> WorkflowResult<Arc<dyn Workflow>> {
        let name = details.workflow().ok_or(WorkflowError::MissingWorkflow)?;
        self.get(name.parse()?)
    }

    pub fn workflow_types(&self) -> Vec<WorkflowType> {
        let mut types: Vec<_> = self.workflows.keys().copied().collect();
        types.sort_by_key(|workflow_type| workflow_type.as_str());
        types
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::RetryPolicy;
    use crate::state_machine::MemoryStore;
    use crate::workflow::{AsynchronousExpressWorkflow, AsynchronousReliableWorkflow};

    fn registry() -> WorkflowRegistry {
        let store = Arc::new(MemoryStore::new());
        let mut registry = WorkflowRegistry::new();
        registry.register(Arc::new(AsynchronousExpressWorkflow::new(
            store.clone(),
            RetryPolicy::default(),
            None,
            None,
        )));
        registry.register(Arc::new(AsynchronousReliableWorkflow::new(
            store,
            RetryPolicy::default(),
            None,
            None,
        )));
        registry
    }

    #[test]
    fn test_for_interaction_selects_by_workflow_key() {
        let registry = registry();
        let details = InteractionDetails::new().with("workflow", "async-reliable");

        let workflow = registry.for_interaction(&details).unwrap();
        assert_eq!(workflow.workflow_type(), WorkflowType::AsyncReliable);
        assert_eq!(
            registry.workflow_types(),
            vec![WorkflowType::AsyncExpress, WorkflowType::AsyncReliable]
        );
    }

    #[test]
    fn test_for_interaction_errors() {
        let registry = registry();

        let missing = registry.for_interaction(&InteractionDetails::new());
        assert_eq!(missing.err(), Some(WorkflowError::MissingWorkflow));

        let unknown = registry.for_interaction(&InteractionDetails::new().with("workflow", "sync-sync"));
        assert_eq!(unknown.err(), Some(WorkflowError::unknown_workflow("sync-sync")));

        let empty = WorkflowRegistry::new();
        assert!(empty.get(WorkflowType::AsyncExpress).is_err());
    }
}
