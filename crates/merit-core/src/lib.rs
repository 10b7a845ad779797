//! # merit-core
//!
//! The deterministic performance-appraisal engine for Merit - THE LOGIC.
//!
//! This crate implements the CORE of the appraisal system: the linear
//! status state machine, the pure validation engine, the per-status and
//! per-role field access gate, and the appraisal aggregate that composes
//! them on every mutation.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is the ONLY place where appraisal state lives (stateful)
//! - Is closed: authorization and validation cannot be injected around
//! - Never reads a wall clock or resolves identity; those arrive through
//!   the `Clock` and `RoleResolver` collaborators
//! - Emits typed events; logging is the caller's concern
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod access;
pub mod appraisal;
pub mod clock;
pub mod events;
pub mod primitives;
pub mod roles;
pub mod service;
pub mod status;
pub mod storage;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AppraisalId, AppraisalKind, Assessment, EmployeeId, EmployeeRef, EntryId, Goal, GoalId,
    MeritError, PreconditionFailure, Rating, RuleViolation, Timestamp, Version, Weightage,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use access::{authorize_write, compute_field_access, FieldAccess, FieldGroup, Grant};
pub use appraisal::{Appraisal, AppraisalGoal, AssessmentInput};
pub use clock::{Clock, FixedClock};
pub use events::{AppraisalEvent, EventSink, MemorySink, NullSink};
pub use roles::{ActorRole, RoleResolver, StaticResolver};
pub use service::{AppraisalService, CreateRequest, StoreBackend};
pub use status::{authorize_transition, Status, TransitionEdge};
pub use storage::RedbStore;
pub use store::{EntityStore, InMemoryStore, SharedStore};
