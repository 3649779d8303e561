//! Workflow engine: definition lifecycle and the state-machine core
//!
//! All operations are synchronous. Each read-check-write sequence runs under a
//! per-entity lock, so concurrent callers touching the same instance (or the
//! same definition) are serialized while unrelated entities proceed in
//! parallel.

use crate::error::{ValidationError, WorkflowError, WorkflowResult};
use crate::storage::WorkflowStores;
use crate::workflow::{
    Action, ActionId, DefinitionId, InstanceId, State, ValidationPolicy, Validator,
    WorkflowDefinition, WorkflowInstance,
};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-entity mutual exclusion
///
/// Entries are created on first use and never removed. Definitions and
/// instances are never deleted, so the map grows with the stored entities.
#[derive(Default)]
struct EntityLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl EntityLocks {
    fn definition(&self, id: &DefinitionId) -> Arc<Mutex<()>> {
        self.lock_for(format!("definition:{id}"))
    }

    fn instance(&self, id: &InstanceId) -> Arc<Mutex<()>> {
        self.lock_for(format!("instance:{id}"))
    }

    fn lock_for(&self, key: String) -> Arc<Mutex<()>> {
        self.locks.entry(key).or_default().clone()
    }
}

/// Orchestrates validation, storage and transitions
pub struct WorkflowEngine {
    stores: WorkflowStores,
    validator: Validator,
    locks: EntityLocks,
}

impl WorkflowEngine {
    /// Create an engine over the given stores
    pub fn new(stores: WorkflowStores, policy: ValidationPolicy) -> Self {
        Self {
            stores,
            validator: Validator::new(policy),
            locks: EntityLocks::default(),
        }
    }

    /// The validator used for every accepted definition
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Create a definition, assigning an id when none was given
    pub fn create_definition(
        &self,
        mut definition: WorkflowDefinition,
    ) -> WorkflowResult<WorkflowDefinition> {
        if definition.id.is_blank() {
            definition.id = DefinitionId::generate();
        }

        let lock = self.locks.definition(&definition.id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.stores.definitions.contains(definition.id.as_str())? {
            tracing::warn!("Rejected definition '{}': id already exists", definition.id);
            return Err(WorkflowError::DuplicateDefinitionId {
                id: definition.id.to_string(),
            });
        }

        if let Err(e) = self.validator.validate(&definition) {
            tracing::warn!("Rejected definition '{}': {}", definition.id, e);
            return Err(e.into());
        }

        self.stores.definitions.add(definition.clone())?;
        tracing::info!(
            "Created definition '{}' with {} states and {} actions",
            definition.id,
            definition.states.len(),
            definition.actions.len()
        );

        Ok(definition)
    }

    /// Fetch a definition
    pub fn get_definition(&self, id: &DefinitionId) -> WorkflowResult<WorkflowDefinition> {
        self.stores
            .definitions
            .get(id.as_str())?
            .ok_or_else(|| WorkflowError::DefinitionNotFound { id: id.to_string() })
    }

    /// All definitions in creation order
    pub fn list_definitions(&self) -> WorkflowResult<Vec<WorkflowDefinition>> {
        Ok(self.stores.definitions.get_all()?)
    }

    /// States of a definition in declaration order
    pub fn list_states(&self, id: &DefinitionId) -> WorkflowResult<Vec<State>> {
        Ok(self.get_definition(id)?.states)
    }

    /// Actions of a definition in declaration order
    pub fn list_actions(&self, id: &DefinitionId) -> WorkflowResult<Vec<Action>> {
        Ok(self.get_definition(id)?.actions)
    }

    /// Start a new instance in the definition's initial state
    pub fn start_instance(&self, definition_id: &DefinitionId) -> WorkflowResult<WorkflowInstance> {
        let definition = self.get_definition(definition_id)?;

        let initial = match definition.initial_state() {
            Some(state) => state.id.clone(),
            None => {
                tracing::error!(
                    "Stored definition '{}' has no initial state",
                    definition_id
                );
                return Err(ValidationError::InitialStateCount { found: 0 }.into());
            }
        };

        let instance = WorkflowInstance::new(definition.id.clone(), initial);
        self.stores.instances.add(instance.clone())?;
        tracing::info!(
            "Started instance '{}' of '{}' in state '{}'",
            instance.id,
            instance.definition_id,
            instance.current_state
        );

        Ok(instance)
    }

    /// Fetch an instance
    pub fn get_instance(&self, id: &InstanceId) -> WorkflowResult<WorkflowInstance> {
        self.stores
            .instances
            .get(id.as_str())?
            .ok_or_else(|| WorkflowError::InstanceNotFound { id: id.to_string() })
    }

    /// All instances in creation order
    pub fn list_instances(&self) -> WorkflowResult<Vec<WorkflowInstance>> {
        Ok(self.stores.instances.get_all()?)
    }

    /// Instances of one definition in creation order
    pub fn list_instances_for(
        &self,
        definition_id: &DefinitionId,
    ) -> WorkflowResult<Vec<WorkflowInstance>> {
        Ok(self
            .list_instances()?
            .into_iter()
            .filter(|instance| &instance.definition_id == definition_id)
            .collect())
    }

    /// Fire an action on an instance
    ///
    /// Checks, in order: the instance exists, its definition exists, the
    /// action is declared, the action is enabled, the current state is one of
    /// the action's source states, and the current state is not final. Only
    /// when every check passes is the instance moved and its history extended.
    pub fn execute_action(
        &self,
        instance_id: &InstanceId,
        action_id: &ActionId,
    ) -> WorkflowResult<WorkflowInstance> {
        let lock = self.locks.instance(instance_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut instance = self.get_instance(instance_id)?;
        let definition = self.definition_of(&instance)?;

        let action = definition
            .action(action_id)
            .ok_or_else(|| WorkflowError::ActionNotFound {
                action: action_id.to_string(),
                definition: definition.id.to_string(),
            })?;

        if !action.enabled {
            return Err(WorkflowError::ActionDisabled {
                action: action_id.to_string(),
            });
        }

        if !action.fires_from(&instance.current_state) {
            return Err(WorkflowError::IllegalTransition {
                action: action_id.to_string(),
                state: instance.current_state.to_string(),
            });
        }

        let is_final = definition
            .state(&instance.current_state)
            .is_some_and(|state| state.is_final);
        if is_final {
            return Err(WorkflowError::TerminalState {
                state: instance.current_state.to_string(),
            });
        }

        let from = instance.current_state.clone();
        instance.record_transition(action.id.clone(), action.to_state.clone());
        self.stores.instances.add(instance.clone())?;
        tracing::info!(
            "Instance '{}': '{}' fired, {} -> {}",
            instance.id,
            action.id,
            from,
            instance.current_state
        );

        Ok(instance)
    }

    /// Actions that would currently fire on the instance
    pub fn available_actions(&self, instance_id: &InstanceId) -> WorkflowResult<Vec<Action>> {
        let instance = self.get_instance(instance_id)?;
        let definition = self.definition_of(&instance)?;

        let is_final = definition
            .state(&instance.current_state)
            .is_some_and(|state| state.is_final);
        if is_final {
            return Ok(Vec::new());
        }

        Ok(definition
            .actions
            .into_iter()
            .filter(|action| action.enabled && action.fires_from(&instance.current_state))
            .collect())
    }

    /// Add a state to an existing definition
    ///
    /// The whole definition is re-validated with the state appended; on
    /// failure the definition is left exactly as it was.
    pub fn add_state(&self, workflow_id: &DefinitionId, state: State) -> WorkflowResult<State> {
        let lock = self.locks.definition(workflow_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut definition = self.workflow(workflow_id)?;

        if definition.has_state(&state.id) {
            return Err(WorkflowError::DuplicateStateId {
                workflow: workflow_id.to_string(),
                state: state.id.to_string(),
            });
        }

        if state.is_initial {
            if let Some(existing) = definition.initial_state() {
                return Err(WorkflowError::MultipleInitialStates {
                    workflow: workflow_id.to_string(),
                    existing: existing.id.to_string(),
                });
            }
        }

        definition.states.push(state.clone());
        if let Err(e) = self.validator.validate(&definition) {
            definition.states.pop();
            tracing::warn!("Rejected state '{}' for '{}': {}", state.id, workflow_id, e);
            return Err(e.into());
        }

        self.stores.definitions.add(definition)?;
        tracing::info!("Added state '{}' to '{}'", state.id, workflow_id);

        Ok(state)
    }

    /// Add an action to an existing definition
    ///
    /// Same contract as [`WorkflowEngine::add_state`].
    pub fn add_action(&self, workflow_id: &DefinitionId, action: Action) -> WorkflowResult<Action> {
        let lock = self.locks.definition(workflow_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut definition = self.workflow(workflow_id)?;

        if definition.has_action(&action.id) {
            return Err(WorkflowError::DuplicateActionId {
                workflow: workflow_id.to_string(),
                action: action.id.to_string(),
            });
        }

        definition.actions.push(action.clone());
        if let Err(e) = self.validator.validate(&definition) {
            definition.actions.pop();
            tracing::warn!("Rejected action '{}' for '{}': {}", action.id, workflow_id, e);
            return Err(e.into());
        }

        self.stores.definitions.add(definition)?;
        tracing::info!("Added action '{}' to '{}'", action.id, workflow_id);

        Ok(action)
    }

    /// Lookup used by the mutation operations, which report a missing
    /// definition as `WorkflowNotFound`
    fn workflow(&self, id: &DefinitionId) -> WorkflowResult<WorkflowDefinition> {
        self.stores
            .definitions
            .get(id.as_str())?
            .ok_or_else(|| WorkflowError::WorkflowNotFound { id: id.to_string() })
    }

    fn definition_of(&self, instance: &WorkflowInstance) -> WorkflowResult<WorkflowDefinition> {
        self.get_definition(&instance.definition_id).inspect_err(|_| {
            // Definitions are never deleted, so this is an invariant violation
            tracing::error!(
                "Instance '{}' refers to missing definition '{}'",
                instance.id,
                instance.definition_id
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::workflow::test_helpers::*;
    use crate::workflow::StateId;

    fn started(engine: &WorkflowEngine, definition: WorkflowDefinition) -> WorkflowInstance {
        let definition = engine.create_definition(definition).unwrap();
        engine.start_instance(&definition.id).unwrap()
    }

    #[test]
    fn test_entity_locks_are_shared_per_id() {
        let locks = EntityLocks::default();
        let orders = DefinitionId::new("orders");

        let first = locks.definition(&orders);
        assert!(Arc::ptr_eq(&first, &locks.definition(&orders)));
        assert!(!Arc::ptr_eq(&first, &locks.definition(&DefinitionId::new("other"))));
        assert!(!Arc::ptr_eq(&first, &locks.instance(&InstanceId::new("orders"))));
        assert_eq!(locks.locks.len(), 3);
    }

    #[test]
    fn test_create_definition_assigns_missing_id() {
        let engine = create_memory_engine();
        let created = engine
            .create_definition(create_two_state_definition(""))
            .unwrap();

        assert!(!created.id.is_blank());
        assert_eq!(engine.get_definition(&created.id).unwrap(), created);
    }

    #[test]
    fn test_create_definition_keeps_given_id() {
        let engine = create_memory_engine();
        let created = engine
            .create_definition(create_two_state_definition("orders"))
            .unwrap();

        assert_eq!(created.id.as_str(), "orders");
    }

    #[test]
    fn test_create_definition_rejects_duplicate_id() {
        let engine = create_memory_engine();
        engine
            .create_definition(create_two_state_definition("orders"))
            .unwrap();

        let err = engine
            .create_definition(create_review_definition("orders"))
            .unwrap_err();

        assert_eq!(err.code(), "DuplicateDefinitionId");
        assert_eq!(err.kind(), ErrorKind::DuplicateId);
        // The first definition is untouched
        assert_eq!(
            engine
                .get_definition(&DefinitionId::new("orders"))
                .unwrap()
                .states
                .len(),
            2
        );
    }

    #[test]
    fn test_create_definition_does_not_store_invalid() {
        let engine = create_memory_engine();
        let mut definition = create_two_state_definition("bad");
        definition.states[0].is_initial = false;

        let err = engine.create_definition(definition).unwrap_err();

        assert_eq!(err.code(), "InitialStateCount");
        assert!(engine.list_definitions().unwrap().is_empty());
    }

    #[test]
    fn test_permissive_engine_accepts_single_state() {
        let engine = WorkflowEngine::new(WorkflowStores::memory(), ValidationPolicy::permissive());
        let definition =
            WorkflowDefinition::new("solo").with_state(State::new("only", "Only").initial());

        let created = engine.create_definition(definition).unwrap();
        let instance = engine.start_instance(&created.id).unwrap();
        assert_eq!(instance.current_state.as_str(), "only");
    }

    #[test]
    fn test_start_instance_in_initial_state() {
        let engine = create_memory_engine();
        let instance = started(&engine, create_review_definition("review"));

        assert_eq!(instance.current_state.as_str(), "draft");
        assert!(instance.history.is_empty());
        assert_eq!(engine.get_instance(&instance.id).unwrap(), instance);
    }

    #[test]
    fn test_start_instance_unknown_definition() {
        let engine = create_memory_engine();
        let err = engine
            .start_instance(&DefinitionId::new("missing"))
            .unwrap_err();

        assert_eq!(err.code(), "DefinitionNotFound");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_execute_action_moves_instance() {
        let engine = create_memory_engine();
        let instance = started(&engine, create_review_definition("review"));

        let updated = engine
            .execute_action(&instance.id, &ActionId::new("submit"))
            .unwrap();

        assert_eq!(updated.current_state.as_str(), "review");
        assert_eq!(updated.history.len(), 1);
        assert_eq!(updated.history[0].action_id.as_str(), "submit");
        // Persisted
        assert_eq!(engine.get_instance(&instance.id).unwrap(), updated);
    }

    #[test]
    fn test_execute_action_unknown_instance() {
        let engine = create_memory_engine();
        let err = engine
            .execute_action(&InstanceId::new("nope"), &ActionId::new("A1"))
            .unwrap_err();

        assert_eq!(err.code(), "InstanceNotFound");
    }

    #[test]
    fn test_execute_action_unknown_action() {
        let engine = create_memory_engine();
        let instance = started(&engine, create_review_definition("review"));

        let err = engine
            .execute_action(&instance.id, &ActionId::new("teleport"))
            .unwrap_err();

        assert_eq!(err.code(), "ActionNotFound");
        assert_eq!(err.kind(), ErrorKind::TransitionRejected);
    }

    #[test]
    fn test_disabled_check_precedes_source_check() {
        let engine = create_memory_engine();
        let instance = started(&engine, create_review_definition("review"));

        let err = engine
            .execute_action(&instance.id, &ActionId::new("archive"))
            .unwrap_err();

        assert_eq!(err.code(), "ActionDisabled");
    }

    #[test]
    fn test_illegal_transition() {
        let engine = create_memory_engine();
        let instance = started(&engine, create_review_definition("review"));

        let err = engine
            .execute_action(&instance.id, &ActionId::new("approve"))
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::IllegalTransition { ref state, .. } if state == "draft"
        ));
    }

    #[test]
    fn test_terminal_state_blocks_listed_action() {
        let engine = create_memory_engine();
        let instance = started(&engine, create_review_definition("review"));
        engine
            .execute_action(&instance.id, &ActionId::new("submit"))
            .unwrap();
        engine
            .execute_action(&instance.id, &ActionId::new("approve"))
            .unwrap();

        // `approve` lists the final state as a source, the final check still wins
        let err = engine
            .execute_action(&instance.id, &ActionId::new("approve"))
            .unwrap_err();

        assert_eq!(err.code(), "TerminalState");
        assert_eq!(engine.get_instance(&instance.id).unwrap().history.len(), 2);
    }

    #[test]
    fn test_cycles_are_allowed() {
        let engine = create_memory_engine();
        let instance = started(&engine, create_review_definition("review"));

        for action in ["submit", "reject", "submit", "reject"] {
            engine
                .execute_action(&instance.id, &ActionId::new(action))
                .unwrap();
        }

        let instance = engine.get_instance(&instance.id).unwrap();
        assert_eq!(instance.current_state.as_str(), "draft");
        assert_eq!(instance.history.len(), 4);
    }

    #[test]
    fn test_available_actions() {
        let engine = create_memory_engine();
        let instance = started(&engine, create_review_definition("review"));

        let ids = |actions: Vec<Action>| -> Vec<String> {
            actions.into_iter().map(|a| a.id.to_string()).collect()
        };

        assert_eq!(ids(engine.available_actions(&instance.id).unwrap()), vec!["submit"]);

        engine
            .execute_action(&instance.id, &ActionId::new("submit"))
            .unwrap();
        assert_eq!(
            ids(engine.available_actions(&instance.id).unwrap()),
            vec!["reject", "approve"]
        );

        engine
            .execute_action(&instance.id, &ActionId::new("approve"))
            .unwrap();
        assert!(engine.available_actions(&instance.id).unwrap().is_empty());
    }

    #[test]
    fn test_add_state_and_action() {
        let engine = create_memory_engine();
        let id = engine
            .create_definition(create_two_state_definition("orders"))
            .unwrap()
            .id;

        engine
            .add_state(&id, State::new("S3", "Cancelled").terminal())
            .unwrap();
        engine
            .add_action(&id, Action::new("A2", "Cancel", ["S1"], "S3"))
            .unwrap();

        let definition = engine.get_definition(&id).unwrap();
        assert_eq!(definition.states.len(), 3);
        assert_eq!(definition.actions.len(), 2);
        assert_eq!(engine.list_states(&id).unwrap()[2].id, StateId::new("S3"));
    }

    #[test]
    fn test_add_state_to_missing_workflow() {
        let engine = create_memory_engine();
        let err = engine
            .add_state(&DefinitionId::new("missing"), State::new("S3", "x"))
            .unwrap_err();

        assert_eq!(err.code(), "WorkflowNotFound");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_add_duplicate_state() {
        let engine = create_memory_engine();
        let id = engine
            .create_definition(create_two_state_definition("orders"))
            .unwrap()
            .id;

        let err = engine.add_state(&id, State::new("S2", "Again")).unwrap_err();

        assert_eq!(err.code(), "DuplicateStateId");
        assert_eq!(err.kind(), ErrorKind::DuplicateId);
    }

    #[test]
    fn test_add_duplicate_action() {
        let engine = create_memory_engine();
        let id = engine
            .create_definition(create_two_state_definition("orders"))
            .unwrap()
            .id;

        let err = engine
            .add_action(&id, Action::new("A1", "Again", ["S1"], "S2"))
            .unwrap_err();

        assert_eq!(err.code(), "DuplicateActionId");
        assert_eq!(engine.list_actions(&id).unwrap().len(), 1);
    }

    #[test]
    fn test_add_action_with_unknown_state_rolls_back() {
        let engine = create_memory_engine();
        let id = engine
            .create_definition(create_two_state_definition("orders"))
            .unwrap()
            .id;
        let before = engine.get_definition(&id).unwrap();

        let err = engine
            .add_action(&id, Action::new("A2", "Haunt", ["S1"], "ghost"))
            .unwrap_err();

        assert_eq!(err.code(), "UnknownStateReference");
        assert_eq!(engine.get_definition(&id).unwrap(), before);
    }
}
