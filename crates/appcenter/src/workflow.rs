//! Contract of the external workflow engine.
//!
//! The state machine itself lives outside this crate; callers inject an implementation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a workflow definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(pub i64);

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub i64);

/// Resource a workflow runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResource {
    pub resource_id: i64,
    pub resource_type: String,
    pub workflow_id: WorkflowId,
    /// Parent resource scoping the state, if any.
    pub external_parent_id: Option<i64>,
}

impl WorkflowResource {
    pub fn new(resource_id: i64, resource_type: impl Into<String>, workflow_id: WorkflowId) -> Self {
        Self {
            resource_id,
            resource_type: resource_type.into(),
            workflow_id,
            external_parent_id: None,
        }
    }
}

/// Operations the demand service needs from the workflow engine.
pub trait WorkflowEngine: Send + Sync {
    /// Current state of the resource, initializing it on the workflow's initial state when the
    /// resource has never been seen.
    fn get_state(&self, resource: &WorkflowResource) -> Result<Option<StateId>, WorkflowError>;

    /// Run every automatic action available from the resource's current state.
    fn execute_automatic_actions(&self, resource: &WorkflowResource) -> Result<(), WorkflowError>;
}

/// Workflow engine failure.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("workflow {0} is not defined")]
    UnknownWorkflow(WorkflowId),
    #[error("workflow engine unavailable: {0}")]
    Unavailable(String),
}
