use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::domain::{
    Candidate, CandidateId, CandidateReassignment, Drive, DriveCandidate, DriveCandidateId,
    DriveConfiguration, DriveId, DriveMember, DriveMemberId, Feedback, FeedbackId, Role, RoleId,
    Round, RoundId, User, UserId, UserRole,
};

/// Storage abstraction so the engine can be exercised against any backing store.
///
/// Reads are plain lookups. Every mutation of a command is collected into one
/// [`UnitOfWork`] and handed to [`EntityStore::commit`], which applies all of it or none.
pub trait EntityStore: Send + Sync {
    fn next_id(&self, sequence: Sequence) -> Result<i64, RepositoryError>;

    fn role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError>;
    fn role_by_name(&self, name: UserRole) -> Result<Option<Role>, RepositoryError>;
    fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, RepositoryError>;

    fn drive(&self, id: DriveId) -> Result<Option<Drive>, RepositoryError>;
    fn drive_by_name(&self, name: &str) -> Result<Option<Drive>, RepositoryError>;
    fn drives(&self) -> Result<Vec<Drive>, RepositoryError>;
    fn drive_configuration(
        &self,
        drive_id: DriveId,
    ) -> Result<Option<DriveConfiguration>, RepositoryError>;

    /// Members of one drive in insertion order.
    fn drive_members(&self, drive_id: DriveId) -> Result<Vec<DriveMember>, RepositoryError>;
    fn drive_member(&self, id: DriveMemberId) -> Result<Option<DriveMember>, RepositoryError>;
    fn memberships_for_user(&self, user_id: UserId) -> Result<Vec<DriveMember>, RepositoryError>;

    /// Candidates of one drive in insertion order.
    fn drive_candidates(&self, drive_id: DriveId)
        -> Result<Vec<DriveCandidate>, RepositoryError>;
    fn drive_candidate(
        &self,
        id: DriveCandidateId,
    ) -> Result<Option<DriveCandidate>, RepositoryError>;

    fn rounds(&self) -> Result<Vec<Round>, RepositoryError>;
    fn round(&self, id: RoundId) -> Result<Option<Round>, RepositoryError>;
    fn rounds_for_drive_candidate(
        &self,
        drive_candidate_id: DriveCandidateId,
    ) -> Result<Vec<Round>, RepositoryError>;
    fn feedback(&self, id: FeedbackId) -> Result<Option<Feedback>, RepositoryError>;
    fn reassignments(
        &self,
        drive_candidate_id: DriveCandidateId,
    ) -> Result<Vec<CandidateReassignment>, RepositoryError>;

    fn commit(&self, unit: UnitOfWork) -> Result<(), RepositoryError>;
}

/// Identifier sequences handed out by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sequence {
    Drive,
    DriveMember,
    DriveCandidate,
    Round,
    Feedback,
    Reassignment,
}

/// One pending change inside a unit of work.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    InsertDrive(Drive),
    UpdateDrive(Drive),
    PutConfiguration(DriveConfiguration),
    InsertMember(DriveMember),
    RemoveMember(DriveMemberId),
    InsertDriveCandidate(DriveCandidate),
    UpdateDriveCandidate(DriveCandidate),
    RemoveDriveCandidate(DriveCandidateId),
    InsertRound(Round),
    UpdateRound(Round),
    RemoveRound(RoundId),
    InsertFeedback(Feedback),
    UpdateFeedback(Feedback),
    RemoveFeedback(FeedbackId),
    InsertReassignment(CandidateReassignment),
}

/// Ordered set of writes applied atomically by [`EntityStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOfWork {
    writes: Vec<Write>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, write: Write) {
        self.writes.push(write);
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

/// Uniqueness rules the store enforces at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    DriveName,
    DriveMember,
    DriveCandidate,
    RoundFeedback,
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("unique constraint violated: {constraint:?}")]
    Conflict { constraint: Constraint },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Trait describing outbound notification hooks (e-mail adapters and the like).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Notification payload so routes/tests can assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: String,
    pub recipient: String,
    pub details: BTreeMap<String, String>,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Source of the current time for date-sensitive rules.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to one instant, for demos and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(9, 0, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
