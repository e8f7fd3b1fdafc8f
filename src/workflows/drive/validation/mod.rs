//! Per-operation rule sets evaluated before any mutation is applied.
//!
//! Blocking preconditions (missing drive, wrong caller, closed drive) end a check early
//! through [`Validation::block`], keeping whatever independent failures were already
//! collected. Independent field rules are all gathered and surfaced together. Every
//! validator hands back the state it loaded so the engine does not read it twice.

pub mod messages;

mod assignment;
mod candidate;
mod drive;
mod membership;
mod round;

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Actor, Drive, DriveId, RoleId, UserId, UserRole};
use super::patch::Patch;
use super::repository::{EntityStore, RepositoryError};
use super::service::DriveWorkflowError;

pub(crate) use assignment::{validate_auto_assign, validate_reassignment};
pub(crate) use candidate::{validate_attendance, validate_drive_candidate_edit};
pub use drive::ConfigSection;
pub(crate) use drive::{validate_configuration_edit, validate_create_drive, validate_drive_edit};
pub(crate) use membership::{
    validate_add_candidates, validate_add_member, validate_remove_candidates,
    validate_remove_member,
};
pub(crate) use round::{validate_feedback, validate_feedback_edit, validate_round_edit};

/// One rejected rule, addressed to the offending field or to `Main`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

/// The ordered failure list returned for a rejected command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub failures: Vec<ValidationFailure>,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for failure in &self.failures {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", failure.field, failure.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for Rejection {}

impl Rejection {
    pub fn main(message: impl Into<String>) -> Self {
        Self::on(messages::MAIN, message)
    }

    pub fn on(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failures: vec![ValidationFailure {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn messages(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|failure| failure.message.as_str())
            .collect()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.failures.iter().any(|failure| failure.message == message)
    }
}

/// Collector for independent failures.
#[derive(Debug, Default)]
pub struct Validation {
    failures: Vec<ValidationFailure>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.failures.push(ValidationFailure {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Stops the check on a blocking precondition.
    pub fn block(mut self, message: impl Into<String>) -> DriveWorkflowError {
        self.fail(messages::MAIN, message);
        self.into_rejection().into()
    }

    pub fn finish(self) -> Result<(), Rejection> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(self.into_rejection())
        }
    }

    fn into_rejection(self) -> Rejection {
        Rejection {
            failures: self.failures,
        }
    }
}

pub(crate) type Checked<T> = Result<T, DriveWorkflowError>;

pub(crate) fn is_admin_or_owner(actor: &Actor, drive: &Drive) -> bool {
    actor.is_admin() || actor.user_id == drive.created_by
}

/// Records a failure for every key an edit does not accept. Audit and credential fields
/// get their own wording.
pub(crate) fn reject_foreign_keys(patch: &Patch, allowed: &[&str], validation: &mut Validation) {
    for key in patch.keys_outside(allowed) {
        let message = match key {
            "createdBy" => messages::CREATED_BY_READ_ONLY.to_string(),
            "createdDate" => messages::CREATED_DATE_READ_ONLY.to_string(),
            "updatedDate" => messages::UPDATED_DATE_READ_ONLY.to_string(),
            "password" | "passwordHash" => messages::PASSWORD_READ_ONLY.to_string(),
            other => messages::field_read_only(other),
        };
        validation.fail(key, message);
    }
}

pub(crate) fn load_drive<S>(
    store: &S,
    drive_id: DriveId,
    validation: Validation,
) -> Checked<(Drive, Validation)>
where
    S: EntityStore + ?Sized,
{
    match store.drive(drive_id)? {
        Some(drive) => Ok((drive, validation)),
        None => Err(validation.block(messages::DRIVE_NOT_FOUND)),
    }
}

pub(crate) fn role_id<S>(store: &S, role: UserRole) -> Checked<RoleId>
where
    S: EntityStore + ?Sized,
{
    store
        .role_by_name(role)?
        .map(|role| role.id)
        .ok_or_else(|| RepositoryError::NotFound.into())
}

/// True when the user already staffs another open drive on `date`.
pub(crate) fn assigned_elsewhere_on<S>(
    store: &S,
    user_id: UserId,
    date: NaiveDate,
    excluding: Option<DriveId>,
) -> Checked<bool>
where
    S: EntityStore + ?Sized,
{
    for membership in store.memberships_for_user(user_id)? {
        if Some(membership.drive_id) == excluding {
            continue;
        }
        if let Some(drive) = store.drive(membership.drive_id)? {
            if drive.date == date && !drive.status.is_closed() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
