use std::fmt;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::config::WorkflowConfig;
use crate::workflows::drive::router::{USER_ID_HEADER, USER_ROLE_HEADER};
use crate::workflows::drive::{
    Actor, Candidate, CandidateId, CandidateReassignment, CandidateSelection, Clock, Drive,
    DriveCandidate, DriveCandidateId, DriveConfiguration, DriveId, DriveMember, DriveMemberId,
    DriveStatus, DriveView, DriveWorkflowError, DriveWorkflowService, EntityStore, Feedback,
    FeedbackId, MemoryEntityStore, NewDrive, Notification, NotificationError,
    NotificationPublisher, Patch, Recommendation, Rejection, RepositoryError, Role, RoleId, Round,
    RoundId, RoundResult, RoundStatus, RoundType, Sequence, UnitOfWork, User, UserId, UserRole,
    Write,
};

pub(super) const ADMIN: UserId = UserId(1);
pub(super) const OTHER_ADMIN: UserId = UserId(2);
pub(super) const HR: UserId = UserId(10);
pub(super) const SECOND_HR: UserId = UserId(11);
pub(super) const INACTIVE_HR: UserId = UserId(12);
pub(super) const PANEL_A: UserId = UserId(20);
pub(super) const PANEL_B: UserId = UserId(21);
pub(super) const PANEL_C: UserId = UserId(22);
pub(super) const MENTOR: UserId = UserId(30);
pub(super) const SECOND_MENTOR: UserId = UserId(31);

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 3, 10).expect("valid date")
}

pub(super) fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub(super) fn admin() -> Actor {
    Actor::new(ADMIN, UserRole::Admin)
}

pub(super) fn other_admin() -> Actor {
    Actor::new(OTHER_ADMIN, UserRole::Admin)
}

pub(super) fn staff(user_id: UserId, role: UserRole) -> Actor {
    Actor::new(user_id, role)
}

/// Clock the tests can move forward between commands.
pub(super) struct TestClock {
    now: Mutex<NaiveDateTime>,
}

impl TestClock {
    pub(super) fn on(date: NaiveDate) -> Self {
        Self {
            now: Mutex::new(date.and_hms_opt(9, 0, 0).expect("valid time")),
        }
    }

    pub(super) fn advance_to(&self, date: NaiveDate) {
        *self.now.lock().expect("clock mutex poisoned") =
            date.and_hms_opt(9, 0, 0).expect("valid time");
    }
}

impl Clock for TestClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationPublisher for RecordingNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct RejectingNotifier;

impl NotificationPublisher for RejectingNotifier {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::InvalidRecipient(notification.recipient))
    }
}

pub(super) type TestService = DriveWorkflowService<MemoryEntityStore, RecordingNotifier>;

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) store: Arc<MemoryEntityStore>,
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) clock: Arc<TestClock>,
}

pub(super) fn build_harness() -> Harness {
    build_harness_with(WorkflowConfig::default())
}

pub(super) fn build_harness_with(config: WorkflowConfig) -> Harness {
    let store = Arc::new(seeded_store());
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(TestClock::on(today()));
    let service = DriveWorkflowService::with_clock(
        store.clone(),
        notifier.clone(),
        config,
        clock.clone(),
    );
    Harness {
        service: Arc::new(service),
        store,
        notifier,
        clock,
    }
}

pub(super) fn seeded_store() -> MemoryEntityStore {
    let store = MemoryEntityStore::with_standard_roles();
    let people = [
        (ADMIN, "Asha Rao", UserRole::Admin, true),
        (OTHER_ADMIN, "Ravi Menon", UserRole::Admin, true),
        (HR, "Hema Iyer", UserRole::Hr, true),
        (SECOND_HR, "Kiran Das", UserRole::Hr, true),
        (INACTIVE_HR, "Old Account", UserRole::Hr, false),
        (PANEL_A, "Priya Nair", UserRole::Panel, true),
        (PANEL_B, "Arjun Shah", UserRole::Panel, true),
        (PANEL_C, "Meera Pillai", UserRole::Panel, true),
        (MENTOR, "Tara Singh", UserRole::Mentor, true),
        (SECOND_MENTOR, "Vikram Bose", UserRole::Mentor, true),
    ];
    for (id, name, role, is_active) in people {
        store.seed_user(User {
            id,
            full_name: name.to_string(),
            email: format!("user{}@example.com", id.0),
            role_id: role_id(role),
            is_active,
        });
    }
    for id in 100..=105 {
        store.seed_candidate(Candidate {
            id: CandidateId(id),
            full_name: format!("Candidate {id}"),
            email: format!("candidate{id}@example.com"),
        });
    }
    store
}

/// Role ids handed out by [`MemoryEntityStore::with_standard_roles`].
pub(super) fn role_id(role: UserRole) -> RoleId {
    match role {
        UserRole::Admin => RoleId(1),
        UserRole::Hr => RoleId(2),
        UserRole::Panel => RoleId(3),
        UserRole::Mentor => RoleId(4),
    }
}

pub(super) fn new_drive(name: &str, date: NaiveDate) -> NewDrive {
    NewDrive {
        drive_name: name.to_string(),
        drive_date: date,
        technical_rounds: 1,
        hr_ids: vec![HR],
        panel_ids: vec![PANEL_A, PANEL_B],
        mentor_ids: vec![MENTOR],
        hr_configuration: Default::default(),
        panel_configuration: Default::default(),
        mentor_configuration: Default::default(),
        panel_visibility_settings: Default::default(),
        notification_settings: Default::default(),
        feedback_configuration: Default::default(),
    }
}

pub(super) fn create_drive(harness: &Harness, name: &str, date: NaiveDate) -> DriveView {
    harness
        .service
        .create_drive(&admin(), new_drive(name, date))
        .expect("drive created")
        .data
}

pub(super) fn add_candidates(harness: &Harness, drive_id: DriveId, ids: &[i64]) {
    harness
        .service
        .add_candidates(&admin(), drive_id, selection(ids))
        .expect("candidates added");
}

pub(super) fn selection(ids: &[i64]) -> CandidateSelection {
    CandidateSelection {
        candidate_ids: ids.iter().copied().map(CandidateId).collect(),
    }
}

pub(super) fn set_drive_status(harness: &Harness, drive_id: DriveId, status: &str) {
    harness
        .service
        .edit_drive(&admin(), drive_id, &Patch::new().with("driveStatus", status))
        .expect("drive status changes");
}

/// A drive dated today, started, with candidates 100 and 101 linked.
pub(super) fn started_drive(harness: &Harness, name: &str) -> DriveId {
    let drive = create_drive(harness, name, today());
    add_candidates(harness, drive.drive_id, &[100, 101]);
    set_drive_status(harness, drive.drive_id, "Started");
    drive.drive_id
}

pub(super) fn member_id(
    store: &MemoryEntityStore,
    drive_id: DriveId,
    user_id: UserId,
) -> DriveMemberId {
    store
        .drive_members(drive_id)
        .expect("members load")
        .into_iter()
        .find(|member| member.user_id == user_id)
        .map(|member| member.id)
        .expect("user staffs the drive")
}

pub(super) fn link(store: &MemoryEntityStore, drive_id: DriveId, candidate: i64) -> DriveCandidate {
    store
        .drive_candidates(drive_id)
        .expect("candidates load")
        .into_iter()
        .find(|link| link.candidate_id == CandidateId(candidate))
        .expect("candidate linked to drive")
}

pub(super) fn seed_round(
    store: &MemoryEntityStore,
    drive_candidate_id: DriveCandidateId,
    interviewer_id: DriveMemberId,
    round_type: RoundType,
) -> Round {
    let round = Round {
        id: RoundId(store.next_id(Sequence::Round).expect("round id")),
        interviewer_id,
        drive_candidate_id,
        round_type,
        status: RoundStatus::Scheduled,
        result: RoundResult::Pending,
        feedback_id: None,
    };
    let mut unit = UnitOfWork::new();
    unit.push(Write::InsertRound(round.clone()));
    store.commit(unit).expect("round stored");
    round
}

pub(super) fn attach_feedback(store: &MemoryEntityStore, round: &Round) -> FeedbackId {
    let feedback = Feedback {
        id: FeedbackId(store.next_id(Sequence::Feedback).expect("feedback id")),
        overall_rating: Some(4),
        technical_skill: Some(4),
        communication: Some(3),
        problem_solving: Some(4),
        overall_feedback: Some("Solid fundamentals".to_string()),
        recommendation: Recommendation::Hire,
        submitted_date: today().and_hms_opt(11, 0, 0).expect("valid time"),
    };
    let mut updated = round.clone();
    updated.feedback_id = Some(feedback.id);

    let id = feedback.id;
    let mut unit = UnitOfWork::new();
    unit.push(Write::InsertFeedback(feedback));
    unit.push(Write::UpdateRound(updated));
    store.commit(unit).expect("feedback stored");
    id
}

/// Seeds a drive directly, bypassing the create checks (used for past dates).
pub(super) fn seed_drive(store: &MemoryEntityStore, name: &str, date: NaiveDate) -> Drive {
    let drive = Drive {
        id: DriveId(store.next_id(Sequence::Drive).expect("drive id")),
        name: name.to_string(),
        date,
        technical_rounds: 1,
        status: DriveStatus::Completed,
        created_by: ADMIN,
        created_date: date.and_hms_opt(8, 0, 0).expect("valid time"),
        updated_date: None,
    };
    let mut unit = UnitOfWork::new();
    unit.push(Write::InsertDrive(drive.clone()));
    store.commit(unit).expect("drive stored");
    drive
}

pub(super) fn rejected<T: fmt::Debug>(result: Result<T, DriveWorkflowError>) -> Rejection {
    match result {
        Err(DriveWorkflowError::Rejected(rejection)) => rejection,
        other => panic!("expected a rejection, got {other:?}"),
    }
}

pub(super) fn fields(rejection: &Rejection) -> Vec<&str> {
    rejection
        .failures
        .iter()
        .map(|failure| failure.field.as_str())
        .collect()
}

pub(super) fn api_request(
    method: &str,
    uri: &str,
    actor: Option<Actor>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder
            .header(USER_ID_HEADER, actor.user_id.0.to_string())
            .header(USER_ROLE_HEADER, actor.role.label());
    }
    let body = match body {
        Some(payload) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&payload).expect("payload serializes"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose lookups miss rows a concurrent writer already committed, so only the
/// commit-time uniqueness check can catch the duplicate.
pub(super) struct RacingStore {
    pub(super) inner: MemoryEntityStore,
}

impl EntityStore for RacingStore {
    fn next_id(&self, sequence: Sequence) -> Result<i64, RepositoryError> {
        self.inner.next_id(sequence)
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError> {
        self.inner.role(id)
    }

    fn role_by_name(&self, name: UserRole) -> Result<Option<Role>, RepositoryError> {
        self.inner.role_by_name(name)
    }

    fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.user(id)
    }

    fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        self.inner.candidate(id)
    }

    fn drive(&self, id: DriveId) -> Result<Option<Drive>, RepositoryError> {
        self.inner.drive(id)
    }

    fn drive_by_name(&self, _name: &str) -> Result<Option<Drive>, RepositoryError> {
        Ok(None)
    }

    fn drives(&self) -> Result<Vec<Drive>, RepositoryError> {
        self.inner.drives()
    }

    fn drive_configuration(
        &self,
        drive_id: DriveId,
    ) -> Result<Option<DriveConfiguration>, RepositoryError> {
        self.inner.drive_configuration(drive_id)
    }

    fn drive_members(&self, drive_id: DriveId) -> Result<Vec<DriveMember>, RepositoryError> {
        self.inner.drive_members(drive_id)
    }

    fn drive_member(&self, id: DriveMemberId) -> Result<Option<DriveMember>, RepositoryError> {
        self.inner.drive_member(id)
    }

    fn memberships_for_user(&self, user_id: UserId) -> Result<Vec<DriveMember>, RepositoryError> {
        self.inner.memberships_for_user(user_id)
    }

    fn drive_candidates(
        &self,
        _drive_id: DriveId,
    ) -> Result<Vec<DriveCandidate>, RepositoryError> {
        Ok(Vec::new())
    }

    fn drive_candidate(
        &self,
        id: DriveCandidateId,
    ) -> Result<Option<DriveCandidate>, RepositoryError> {
        self.inner.drive_candidate(id)
    }

    fn rounds(&self) -> Result<Vec<Round>, RepositoryError> {
        self.inner.rounds()
    }

    fn round(&self, id: RoundId) -> Result<Option<Round>, RepositoryError> {
        self.inner.round(id)
    }

    fn rounds_for_drive_candidate(
        &self,
        drive_candidate_id: DriveCandidateId,
    ) -> Result<Vec<Round>, RepositoryError> {
        self.inner.rounds_for_drive_candidate(drive_candidate_id)
    }

    fn feedback(&self, id: FeedbackId) -> Result<Option<Feedback>, RepositoryError> {
        self.inner.feedback(id)
    }

    fn reassignments(
        &self,
        drive_candidate_id: DriveCandidateId,
    ) -> Result<Vec<CandidateReassignment>, RepositoryError> {
        self.inner.reassignments(drive_candidate_id)
    }

    fn commit(&self, unit: UnitOfWork) -> Result<(), RepositoryError> {
        self.inner.commit(unit)
    }
}

/// Store that is reachable for reads but refuses every commit.
pub(super) struct OfflineStore {
    pub(super) inner: MemoryEntityStore,
}

impl EntityStore for OfflineStore {
    fn next_id(&self, sequence: Sequence) -> Result<i64, RepositoryError> {
        self.inner.next_id(sequence)
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError> {
        self.inner.role(id)
    }

    fn role_by_name(&self, name: UserRole) -> Result<Option<Role>, RepositoryError> {
        self.inner.role_by_name(name)
    }

    fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.inner.user(id)
    }

    fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        self.inner.candidate(id)
    }

    fn drive(&self, id: DriveId) -> Result<Option<Drive>, RepositoryError> {
        self.inner.drive(id)
    }

    fn drive_by_name(&self, name: &str) -> Result<Option<Drive>, RepositoryError> {
        self.inner.drive_by_name(name)
    }

    fn drives(&self) -> Result<Vec<Drive>, RepositoryError> {
        self.inner.drives()
    }

    fn drive_configuration(
        &self,
        drive_id: DriveId,
    ) -> Result<Option<DriveConfiguration>, RepositoryError> {
        self.inner.drive_configuration(drive_id)
    }

    fn drive_members(&self, drive_id: DriveId) -> Result<Vec<DriveMember>, RepositoryError> {
        self.inner.drive_members(drive_id)
    }

    fn drive_member(&self, id: DriveMemberId) -> Result<Option<DriveMember>, RepositoryError> {
        self.inner.drive_member(id)
    }

    fn memberships_for_user(&self, user_id: UserId) -> Result<Vec<DriveMember>, RepositoryError> {
        self.inner.memberships_for_user(user_id)
    }

    fn drive_candidates(
        &self,
        drive_id: DriveId,
    ) -> Result<Vec<DriveCandidate>, RepositoryError> {
        self.inner.drive_candidates(drive_id)
    }

    fn drive_candidate(
        &self,
        id: DriveCandidateId,
    ) -> Result<Option<DriveCandidate>, RepositoryError> {
        self.inner.drive_candidate(id)
    }

    fn rounds(&self) -> Result<Vec<Round>, RepositoryError> {
        self.inner.rounds()
    }

    fn round(&self, id: RoundId) -> Result<Option<Round>, RepositoryError> {
        self.inner.round(id)
    }

    fn rounds_for_drive_candidate(
        &self,
        drive_candidate_id: DriveCandidateId,
    ) -> Result<Vec<Round>, RepositoryError> {
        self.inner.rounds_for_drive_candidate(drive_candidate_id)
    }

    fn feedback(&self, id: FeedbackId) -> Result<Option<Feedback>, RepositoryError> {
        self.inner.feedback(id)
    }

    fn reassignments(
        &self,
        drive_candidate_id: DriveCandidateId,
    ) -> Result<Vec<CandidateReassignment>, RepositoryError> {
        self.inner.reassignments(drive_candidate_id)
    }

    fn commit(&self, _unit: UnitOfWork) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
