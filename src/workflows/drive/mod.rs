//! Recruitment drive workflow: drives, their staff and candidates, interview rounds and
//! feedback, with the consistency rules that keep them coherent.

pub mod assignment;
pub mod domain;
pub mod memory;
pub mod patch;
pub mod projections;
pub mod propagation;
pub mod repository;
pub mod router;
pub mod service;
pub mod status;
pub mod validation;

pub use assignment::{plan_round_robin, AutoAssignPolicy, PlannedRound};
pub use domain::*;
pub use memory::MemoryEntityStore;
pub use patch::{FieldValue, Patch};
pub use projections::{
    DriveCandidateFilter, DriveCandidateView, DriveConfigurationView, DriveFilter,
    DriveMemberFilter, DriveMemberView, DriveView, FeedbackView, ReassignmentView, RoundFilter,
    RoundView,
};
pub use repository::{
    Clock, Constraint, EntityStore, FixedClock, Notification, NotificationError,
    NotificationPublisher, RepositoryError, Sequence, SystemClock, UnitOfWork, Write,
};
pub use router::drive_router;
pub use service::{CommandOutcome, DriveWorkflowError, DriveWorkflowService};
pub use validation::{Rejection, ValidationFailure};

#[cfg(test)]
mod tests;
