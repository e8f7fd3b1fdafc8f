use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::assignment::{plan_round_robin, reassign};
use super::domain::{
    Actor, CandidateId, CandidateReassignment, CandidateSelection, CandidateStatus, Drive,
    DriveCandidate, DriveCandidateId, DriveConfiguration, DriveId, DriveMember, DriveMemberId,
    DriveStatus, Feedback, FeedbackId, InterviewerChange, NewDrive, NewFeedback, NewMember,
    ReassignmentId, Round, RoundId, RoundResult, RoundStatus, RoundType, UserId, UserRole,
};
use super::patch::Patch;
use super::projections::{
    self, DriveCandidateFilter, DriveCandidateView, DriveConfigurationView, DriveFilter,
    DriveMemberFilter, DriveMemberView, DriveView, FeedbackView, ReassignmentView, RoundFilter,
    RoundView,
};
use super::propagation::propagate_round_result;
use super::repository::{
    Clock, Constraint, EntityStore, Notification, NotificationError, NotificationPublisher,
    RepositoryError, Sequence, SystemClock, UnitOfWork, Write,
};
use super::status::derive_round_result;
use super::validation::{self, messages, Rejection};
use crate::config::WorkflowConfig;

/// Result of an accepted command: the projection it produced plus non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome<T> {
    pub data: T,
    pub warnings: Vec<String>,
}

impl<T> CommandOutcome<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Error raised by the drive workflow service.
#[derive(Debug, thiserror::Error)]
pub enum DriveWorkflowError {
    #[error("command rejected: {0}")]
    Rejected(#[from] Rejection),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl DriveWorkflowError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            DriveWorkflowError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

type Outcome<T> = Result<CommandOutcome<T>, DriveWorkflowError>;

/// Service composing validation, the transition rules and the entity store.
///
/// Every command validates first, then stages all of its writes into one [`UnitOfWork`]
/// and commits once. A rejected command never reaches the store.
pub struct DriveWorkflowService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    config: WorkflowConfig,
}

impl<S, N> DriveWorkflowService<S, N>
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: WorkflowConfig) -> Self {
        Self::with_clock(store, notifier, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<S>,
        notifier: Arc<N>,
        config: WorkflowConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create a drive together with its staff and configuration.
    pub fn create_drive(&self, actor: &Actor, request: NewDrive) -> Outcome<DriveView> {
        debug!(user = %actor.user_id, name = %request.drive_name, "create drive requested");
        let result = self.apply_create_drive(actor, request);
        observe("create_drive", result)
    }

    fn apply_create_drive(&self, actor: &Actor, request: NewDrive) -> Outcome<DriveView> {
        let now = self.clock.now();
        let proposed =
            validation::validate_create_drive(&*self.store, actor, &request, now.date())?;

        let drive = Drive {
            id: DriveId(self.store.next_id(Sequence::Drive)?),
            name: request.drive_name.trim().to_string(),
            date: request.drive_date,
            technical_rounds: request.technical_rounds,
            status: DriveStatus::InProposal,
            created_by: actor.user_id,
            created_date: now,
            updated_date: None,
        };

        let mut unit = UnitOfWork::new();
        unit.push(Write::InsertDrive(drive.clone()));
        for member in proposed {
            unit.push(Write::InsertMember(DriveMember {
                id: DriveMemberId(self.store.next_id(Sequence::DriveMember)?),
                drive_id: drive.id,
                user_id: member.user_id,
                role_id: member.role_id,
            }));
        }

        let mut hr = request.hr_configuration;
        hr.can_view_feedback = true;
        hr.allow_bulk_upload = true;
        let mut panel = request.panel_configuration;
        panel.can_view_feedback = true;
        panel.allow_bulk_upload = false;
        let mut mentor = request.mentor_configuration;
        mentor.can_edit_submitted_feedback = false;
        mentor.allow_bulk_upload = false;

        unit.push(Write::PutConfiguration(DriveConfiguration {
            drive_id: drive.id,
            hr,
            panel,
            mentor,
            panel_visibility: request.panel_visibility_settings,
            notifications: request.notification_settings,
            feedback: request.feedback_configuration,
        }));

        self.commit(unit)?;
        Ok(CommandOutcome::new(DriveView::from(&drive)))
    }

    /// Apply a sparse patch to a drive. Identical re-sends leave the stored drive untouched.
    pub fn edit_drive(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        patch: &Patch,
    ) -> Outcome<DriveView> {
        debug!(user = %actor.user_id, drive = %drive_id, "edit drive requested");
        let result = self.apply_edit_drive(actor, drive_id, patch);
        observe("edit_drive", result)
    }

    fn apply_edit_drive(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        patch: &Patch,
    ) -> Outcome<DriveView> {
        let now = self.clock.now();
        let edit =
            validation::validate_drive_edit(&*self.store, actor, drive_id, patch, now.date())?;

        let mut drive = edit.drive.clone();
        if let Some(name) = edit.name {
            drive.name = name;
        }
        if let Some(date) = edit.date {
            drive.date = date;
        }
        if let Some(rounds) = edit.technical_rounds {
            drive.technical_rounds = rounds;
        }
        if let Some(status) = edit.status {
            drive.status = status;
        }

        if drive == edit.drive {
            return Ok(CommandOutcome::new(DriveView::from(&drive)));
        }

        drive.updated_date = Some(now);
        let mut unit = UnitOfWork::new();
        unit.push(Write::UpdateDrive(drive.clone()));
        self.commit(unit)?;
        Ok(CommandOutcome::new(DriveView::from(&drive)))
    }

    pub fn edit_drive_configuration(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        patch: &Patch,
    ) -> Outcome<DriveConfigurationView> {
        debug!(user = %actor.user_id, drive = %drive_id, "edit drive configuration requested");
        let result = self.apply_edit_configuration(actor, drive_id, patch);
        observe("edit_drive_configuration", result)
    }

    fn apply_edit_configuration(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        patch: &Patch,
    ) -> Outcome<DriveConfigurationView> {
        let edit = validation::validate_configuration_edit(&*self.store, actor, drive_id, patch)?;

        let mut configuration = edit.configuration.clone();
        for (section, key, value) in &edit.changes {
            section.apply(&mut configuration, key, *value);
        }

        if configuration != edit.configuration {
            let mut unit = UnitOfWork::new();
            unit.push(Write::PutConfiguration(configuration.clone()));
            self.commit(unit)?;
        }
        Ok(CommandOutcome::new(DriveConfigurationView::from(
            &configuration,
        )))
    }

    /// Staff a user on a drive, notifying them when the drive has e-mail enabled.
    pub fn add_member(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        request: NewMember,
    ) -> Outcome<DriveMemberView> {
        debug!(
            user = %actor.user_id,
            drive = %drive_id,
            member = %request.user_id,
            "add member requested"
        );
        let result = self.apply_add_member(actor, drive_id, request);
        observe("add_member", result)
    }

    fn apply_add_member(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        request: NewMember,
    ) -> Outcome<DriveMemberView> {
        let addition = validation::validate_add_member(&*self.store, actor, drive_id, &request)?;
        let member = DriveMember {
            id: DriveMemberId(self.store.next_id(Sequence::DriveMember)?),
            drive_id: addition.drive.id,
            user_id: addition.user.id,
            role_id: addition.role_id,
        };

        let notify = self
            .store
            .drive_configuration(addition.drive.id)?
            .is_some_and(|configuration| configuration.notifications.email_notification_enabled);
        if notify {
            let mut details = BTreeMap::new();
            details.insert("drive_name".to_string(), addition.drive.name.clone());
            details.insert("drive_date".to_string(), addition.drive.date.to_string());
            details.insert("role".to_string(), addition.role.label().to_string());
            let notification = Notification {
                template: "drive_member_added".to_string(),
                recipient: addition.user.email.clone(),
                details,
            };
            match self.notifier.publish(notification) {
                Ok(()) => {}
                Err(NotificationError::InvalidRecipient(_)) => {
                    return Err(Rejection::on("email", messages::INVALID_EMAIL).into());
                }
                Err(other) => return Err(other.into()),
            }
        }

        let mut unit = UnitOfWork::new();
        unit.push(Write::InsertMember(member.clone()));
        self.commit(unit)?;
        Ok(CommandOutcome::new(projections::member_view(
            &*self.store,
            &member,
        )?))
    }

    /// Remove a user's membership, dropping the rounds they were to conduct.
    pub fn remove_member(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        user_id: UserId,
    ) -> Outcome<DriveMemberView> {
        debug!(
            user = %actor.user_id,
            drive = %drive_id,
            member = %user_id,
            "remove member requested"
        );
        let result = self.apply_remove_member(actor, drive_id, user_id);
        observe("remove_member", result)
    }

    fn apply_remove_member(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        user_id: UserId,
    ) -> Outcome<DriveMemberView> {
        let removal = validation::validate_remove_member(&*self.store, actor, drive_id, user_id)?;
        let view = projections::member_view(&*self.store, &removal.member)?;

        let mut unit = UnitOfWork::new();
        for link in self.store.drive_candidates(removal.drive.id)? {
            for round in self.store.rounds_for_drive_candidate(link.id)? {
                if round.interviewer_id == removal.member.id {
                    stage_round_removal(&mut unit, &round);
                }
            }
        }
        unit.push(Write::RemoveMember(removal.member.id));

        self.commit(unit)?;
        Ok(CommandOutcome::new(view))
    }

    pub fn add_candidates(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        request: CandidateSelection,
    ) -> Outcome<Vec<DriveCandidateView>> {
        debug!(
            user = %actor.user_id,
            drive = %drive_id,
            count = request.candidate_ids.len(),
            "add candidates requested"
        );
        let result = self.apply_add_candidates(actor, drive_id, request);
        observe("add_candidates", result)
    }

    fn apply_add_candidates(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        request: CandidateSelection,
    ) -> Outcome<Vec<DriveCandidateView>> {
        let addition =
            validation::validate_add_candidates(&*self.store, actor, drive_id, &request)?;
        let now = self.clock.now();

        let mut links = Vec::with_capacity(addition.candidates.len());
        let mut unit = UnitOfWork::new();
        for candidate in &addition.candidates {
            let link = DriveCandidate {
                id: DriveCandidateId(self.store.next_id(Sequence::DriveCandidate)?),
                drive_id: addition.drive.id,
                candidate_id: candidate.id,
                status: CandidateStatus::Pending,
                status_set_by: None,
                attendance_status: None,
                created_date: now,
            };
            unit.push(Write::InsertDriveCandidate(link.clone()));
            links.push(link);
        }

        self.commit(unit)?;
        let views = links
            .iter()
            .map(|link| projections::drive_candidate_view(&*self.store, link))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CommandOutcome::new(views))
    }

    /// Remove candidates from a drive along with their rounds and feedback.
    pub fn remove_candidates(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        request: CandidateSelection,
    ) -> Outcome<Vec<DriveCandidateView>> {
        debug!(
            user = %actor.user_id,
            drive = %drive_id,
            count = request.candidate_ids.len(),
            "remove candidates requested"
        );
        let result = self.apply_remove_candidates(actor, drive_id, request);
        observe("remove_candidates", result)
    }

    fn apply_remove_candidates(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        request: CandidateSelection,
    ) -> Outcome<Vec<DriveCandidateView>> {
        let removal =
            validation::validate_remove_candidates(&*self.store, actor, drive_id, &request)?;

        let mut views = Vec::with_capacity(removal.drive_candidates.len());
        let mut unit = UnitOfWork::new();
        for link in &removal.drive_candidates {
            views.push(projections::drive_candidate_view(&*self.store, link)?);
            for round in self.store.rounds_for_drive_candidate(link.id)? {
                stage_round_removal(&mut unit, &round);
            }
            unit.push(Write::RemoveDriveCandidate(link.id));
        }

        self.commit(unit)?;
        Ok(CommandOutcome::new(views))
    }

    pub fn edit_drive_candidate(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        candidate_id: CandidateId,
        patch: &Patch,
    ) -> Outcome<DriveCandidateView> {
        debug!(
            user = %actor.user_id,
            drive = %drive_id,
            candidate = %candidate_id,
            "edit drive candidate requested"
        );
        let result = self.apply_edit_drive_candidate(actor, drive_id, candidate_id, patch);
        observe("edit_drive_candidate", result)
    }

    fn apply_edit_drive_candidate(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        candidate_id: CandidateId,
        patch: &Patch,
    ) -> Outcome<DriveCandidateView> {
        let today = self.clock.today();
        let edit = validation::validate_drive_candidate_edit(
            &*self.store,
            actor,
            drive_id,
            candidate_id,
            patch,
            today,
        )?;

        let mut link = edit.drive_candidate.clone();
        if let Some(status) = edit.status {
            link.status = status;
            link.status_set_by = Some(actor.user_id);
        }
        if let Some(attendance) = edit.attendance {
            link.attendance_status = Some(attendance);
            link.status_set_by = Some(actor.user_id);
        }

        if link != edit.drive_candidate {
            let mut unit = UnitOfWork::new();
            unit.push(Write::UpdateDriveCandidate(link.clone()));
            self.commit(unit)?;
        }
        Ok(CommandOutcome::new(projections::drive_candidate_view(
            &*self.store,
            &link,
        )?))
    }

    /// Record a candidate's attendance on the day of a running drive.
    pub fn mark_attendance(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        candidate_id: CandidateId,
        attendance: &str,
    ) -> Outcome<DriveCandidateView> {
        debug!(
            user = %actor.user_id,
            drive = %drive_id,
            candidate = %candidate_id,
            "mark attendance requested"
        );
        let result = self.apply_mark_attendance(actor, drive_id, candidate_id, attendance);
        observe("mark_attendance", result)
    }

    fn apply_mark_attendance(
        &self,
        actor: &Actor,
        drive_id: DriveId,
        candidate_id: CandidateId,
        attendance: &str,
    ) -> Outcome<DriveCandidateView> {
        let input = validation::validate_attendance(
            &*self.store,
            actor,
            drive_id,
            candidate_id,
            attendance,
            self.clock.today(),
        )?;

        let mut link = input.drive_candidate;
        link.attendance_status = Some(input.status);
        link.status_set_by = Some(actor.user_id);

        let mut unit = UnitOfWork::new();
        unit.push(Write::UpdateDriveCandidate(link.clone()));
        self.commit(unit)?;
        Ok(CommandOutcome::new(projections::drive_candidate_view(
            &*self.store,
            &link,
        )?))
    }

    pub fn edit_round(
        &self,
        actor: &Actor,
        round_id: RoundId,
        patch: &Patch,
    ) -> Outcome<RoundView> {
        debug!(user = %actor.user_id, round = %round_id, "edit round requested");
        let result = self.apply_edit_round(actor, round_id, patch);
        observe("edit_round", result)
    }

    fn apply_edit_round(
        &self,
        actor: &Actor,
        round_id: RoundId,
        patch: &Patch,
    ) -> Outcome<RoundView> {
        let edit = validation::validate_round_edit(&*self.store, actor, round_id, patch)?;
        let context = edit.context;

        let mut round = context.round.clone();
        if let Some(status) = edit.status {
            round.status = status;
        }
        if let Some(result) = edit.result {
            round.result = result;
        }

        let mut unit = UnitOfWork::new();
        if round != context.round {
            unit.push(Write::UpdateRound(round.clone()));
        }
        if edit.result.is_some() {
            let mut link = context.drive_candidate;
            if propagate_round_result(&round, &mut link, actor.user_id) {
                unit.push(Write::UpdateDriveCandidate(link));
            }
        }

        if !unit.is_empty() {
            self.commit(unit)?;
        }
        Ok(CommandOutcome::new(projections::round_view(&*self.store, &round)?))
    }

    /// Attach feedback to a round and derive the round result from its recommendation.
    pub fn add_feedback(
        &self,
        actor: &Actor,
        round_id: RoundId,
        form: NewFeedback,
    ) -> Outcome<RoundView> {
        debug!(user = %actor.user_id, round = %round_id, "add feedback requested");
        let result = self.apply_add_feedback(actor, round_id, form);
        observe("add_feedback", result)
    }

    fn apply_add_feedback(
        &self,
        actor: &Actor,
        round_id: RoundId,
        form: NewFeedback,
    ) -> Outcome<RoundView> {
        let draft = validation::validate_feedback(&*self.store, actor, round_id, &form)?;
        let feedback = Feedback {
            id: FeedbackId(self.store.next_id(Sequence::Feedback)?),
            overall_rating: draft.overall_rating,
            technical_skill: draft.technical_skill,
            communication: draft.communication,
            problem_solving: draft.problem_solving,
            overall_feedback: draft.overall_feedback,
            recommendation: draft.recommendation,
            submitted_date: self.clock.now(),
        };

        let mut round = draft.context.round;
        round.feedback_id = Some(feedback.id);
        round.result = derive_round_result(feedback.recommendation);

        let mut unit = UnitOfWork::new();
        unit.push(Write::InsertFeedback(feedback));
        unit.push(Write::UpdateRound(round.clone()));
        let mut link = draft.context.drive_candidate;
        if propagate_round_result(&round, &mut link, actor.user_id) {
            unit.push(Write::UpdateDriveCandidate(link));
        }

        self.commit(unit)?;
        Ok(CommandOutcome::new(projections::round_view(&*self.store, &round)?))
    }

    pub fn edit_feedback(
        &self,
        actor: &Actor,
        round_id: RoundId,
        patch: &Patch,
    ) -> Outcome<RoundView> {
        debug!(user = %actor.user_id, round = %round_id, "edit feedback requested");
        let result = self.apply_edit_feedback(actor, round_id, patch);
        observe("edit_feedback", result)
    }

    fn apply_edit_feedback(
        &self,
        actor: &Actor,
        round_id: RoundId,
        patch: &Patch,
    ) -> Outcome<RoundView> {
        let changes = validation::validate_feedback_edit(&*self.store, actor, round_id, patch)?;

        let mut feedback = changes.feedback;
        if let Some(value) = changes.overall_rating {
            feedback.overall_rating = value;
        }
        if let Some(value) = changes.technical_skill {
            feedback.technical_skill = value;
        }
        if let Some(value) = changes.communication {
            feedback.communication = value;
        }
        if let Some(value) = changes.problem_solving {
            feedback.problem_solving = value;
        }
        if let Some(value) = changes.overall_feedback {
            feedback.overall_feedback = value;
        }
        if let Some(value) = changes.recommendation {
            feedback.recommendation = value;
        }
        feedback.submitted_date = self.clock.now();

        let context = changes.context;
        let mut unit = UnitOfWork::new();
        unit.push(Write::UpdateFeedback(feedback.clone()));

        let mut round = context.round.clone();
        if changes.recommendation.is_some() {
            round.result = derive_round_result(feedback.recommendation);
            if round != context.round {
                unit.push(Write::UpdateRound(round.clone()));
            }
            let mut link = context.drive_candidate;
            if propagate_round_result(&round, &mut link, actor.user_id) {
                unit.push(Write::UpdateDriveCandidate(link));
            }
        }

        self.commit(unit)?;
        Ok(CommandOutcome::new(projections::round_view(&*self.store, &round)?))
    }

    /// Schedule one Tech1 round per candidate, spreading candidates over the panel.
    pub fn auto_assign_panel(&self, actor: &Actor, drive_id: DriveId) -> Outcome<Vec<RoundView>> {
        debug!(
            user = %actor.user_id,
            drive = %drive_id,
            policy = self.config.auto_assign.label(),
            "auto assign requested"
        );
        let result = self.apply_auto_assign(actor, drive_id);
        observe("auto_assign_panel", result)
    }

    fn apply_auto_assign(&self, actor: &Actor, drive_id: DriveId) -> Outcome<Vec<RoundView>> {
        let input = validation::validate_auto_assign(
            &*self.store,
            actor,
            drive_id,
            self.clock.today(),
            self.config.auto_assign,
        )?;

        let mut rounds = Vec::with_capacity(input.candidates.len());
        let mut unit = UnitOfWork::new();
        for planned in plan_round_robin(&input.candidates, &input.panel) {
            let round = Round {
                id: RoundId(self.store.next_id(Sequence::Round)?),
                interviewer_id: planned.interviewer_id,
                drive_candidate_id: planned.drive_candidate_id,
                round_type: RoundType::Tech1,
                status: RoundStatus::Scheduled,
                result: RoundResult::Pending,
                feedback_id: None,
            };
            unit.push(Write::InsertRound(round.clone()));
            rounds.push(round);
        }

        self.commit(unit)?;
        let views = rounds
            .iter()
            .map(|round| projections::round_view(&*self.store, round))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CommandOutcome::new(views))
    }

    /// Move a round to another panel member of the same drive and record the swap.
    pub fn reassign_interviewer(
        &self,
        actor: &Actor,
        round_id: RoundId,
        change: InterviewerChange,
    ) -> Outcome<RoundView> {
        debug!(
            user = %actor.user_id,
            round = %round_id,
            from = change.old_interviewer_id,
            to = change.new_interviewer_id,
            "reassign interviewer requested"
        );
        let result = self.apply_reassign(actor, round_id, change);
        observe("reassign_interviewer", result)
    }

    fn apply_reassign(
        &self,
        actor: &Actor,
        round_id: RoundId,
        change: InterviewerChange,
    ) -> Outcome<RoundView> {
        let input = validation::validate_reassignment(&*self.store, actor, round_id, &change)?;
        let require_approval = change.require_approval
            || input
                .configuration
                .for_role(actor.role)
                .is_some_and(|role| role.require_approval_for_reassignment);

        let round = reassign(&input.round, input.new_member.id);
        let record = CandidateReassignment {
            id: ReassignmentId(self.store.next_id(Sequence::Reassignment)?),
            drive_candidate_id: input.drive_candidate.id,
            previous_interviewer_id: input.round.interviewer_id,
            new_interviewer_id: input.new_member.id,
            requested_by: actor.user_id,
            require_approval,
            requested_at: self.clock.now(),
            approved_at: None,
        };

        let mut unit = UnitOfWork::new();
        unit.push(Write::UpdateRound(round.clone()));
        unit.push(Write::InsertReassignment(record));
        self.commit(unit)?;

        let outcome = CommandOutcome::new(projections::round_view(&*self.store, &round)?);
        if require_approval {
            Ok(outcome.with_warning(messages::REASSIGNED_WITHOUT_APPROVAL))
        } else {
            Ok(outcome)
        }
    }

    pub fn list_drives(&self, filter: &DriveFilter) -> Result<Vec<DriveView>, DriveWorkflowError> {
        Ok(projections::list_drives(
            &*self.store,
            filter,
            self.clock.today(),
        )?)
    }

    pub fn get_drive(&self, drive_id: DriveId) -> Result<DriveView, DriveWorkflowError> {
        match self.store.drive(drive_id)? {
            Some(drive) => Ok(DriveView::from(&drive)),
            None => Err(Rejection::main(messages::DRIVE_NOT_FOUND).into()),
        }
    }

    pub fn get_drive_configuration(
        &self,
        drive_id: DriveId,
    ) -> Result<DriveConfigurationView, DriveWorkflowError> {
        match self.store.drive_configuration(drive_id)? {
            Some(configuration) => Ok(DriveConfigurationView::from(&configuration)),
            None => Err(Rejection::main(messages::DRIVE_NOT_FOUND).into()),
        }
    }

    pub fn list_drive_members(
        &self,
        filter: &DriveMemberFilter,
    ) -> Result<Vec<DriveMemberView>, DriveWorkflowError> {
        Ok(projections::list_drive_members(
            &*self.store,
            filter,
            self.clock.today(),
        )?)
    }

    pub fn list_drive_candidates(
        &self,
        filter: &DriveCandidateFilter,
    ) -> Result<Vec<DriveCandidateView>, DriveWorkflowError> {
        Ok(projections::list_drive_candidates(
            &*self.store,
            filter,
            self.clock.today(),
        )?)
    }

    pub fn list_rounds(&self, filter: &RoundFilter) -> Result<Vec<RoundView>, DriveWorkflowError> {
        Ok(projections::list_rounds(&*self.store, filter)?)
    }

    /// Candidates the calling panel member interviews.
    pub fn assigned_candidates(
        &self,
        actor: &Actor,
    ) -> Result<Vec<DriveCandidateView>, DriveWorkflowError> {
        if actor.role != UserRole::Panel {
            return Err(Rejection::main(messages::PANEL_ONLY_ASSIGNED_CANDIDATES).into());
        }
        if self.store.user(actor.user_id)?.is_none() {
            return Err(Rejection::main(messages::USER_NOT_FOUND).into());
        }
        Ok(projections::assigned_candidates(&*self.store, actor.user_id)?)
    }

    pub fn get_round(&self, round_id: RoundId) -> Result<RoundView, DriveWorkflowError> {
        match self.store.round(round_id)? {
            Some(round) => Ok(projections::round_view(&*self.store, &round)?),
            None => Err(Rejection::main(messages::ROUND_NOT_FOUND).into()),
        }
    }

    pub fn get_feedback(
        &self,
        feedback_id: FeedbackId,
    ) -> Result<FeedbackView, DriveWorkflowError> {
        match self.store.feedback(feedback_id)? {
            Some(feedback) => Ok(FeedbackView::from(&feedback)),
            None => Err(Rejection::main(messages::FEEDBACK_NOT_FOUND).into()),
        }
    }

    /// Interviewer swaps recorded for the candidate a round belongs to.
    pub fn reassignments(
        &self,
        round_id: RoundId,
    ) -> Result<Vec<ReassignmentView>, DriveWorkflowError> {
        let round = self
            .store
            .round(round_id)?
            .ok_or_else(|| Rejection::main(messages::ROUND_NOT_FOUND))?;
        let records = self.store.reassignments(round.drive_candidate_id)?;
        Ok(records.iter().map(ReassignmentView::from).collect())
    }

    /// Commits a unit of work, turning store-level uniqueness violations into the same
    /// rejection the pre-checks produce.
    fn commit(&self, unit: UnitOfWork) -> Result<(), DriveWorkflowError> {
        match self.store.commit(unit) {
            Ok(()) => Ok(()),
            Err(RepositoryError::Conflict { constraint }) => {
                warn!(?constraint, "uniqueness conflict at commit");
                Err(conflict_rejection(constraint).into())
            }
            Err(other) => Err(other.into()),
        }
    }
}

pub(crate) fn conflict_rejection(constraint: Constraint) -> Rejection {
    match constraint {
        Constraint::DriveName => Rejection::on("driveName", messages::DRIVE_NAME_EXISTS),
        Constraint::DriveMember => Rejection::main(messages::ALREADY_MEMBER),
        Constraint::DriveCandidate => Rejection::main(messages::CANDIDATE_ALREADY_ADDED),
        Constraint::RoundFeedback => Rejection::main(messages::FEEDBACK_ALREADY_PROVIDED),
    }
}

fn stage_round_removal(unit: &mut UnitOfWork, round: &Round) {
    if let Some(feedback_id) = round.feedback_id {
        unit.push(Write::RemoveFeedback(feedback_id));
    }
    unit.push(Write::RemoveRound(round.id));
}

fn observe<T>(operation: &'static str, result: Outcome<T>) -> Outcome<T> {
    match &result {
        Ok(outcome) if outcome.warnings.is_empty() => info!(operation, "command applied"),
        Ok(outcome) => {
            info!(operation, warnings = ?outcome.warnings, "command applied with warnings")
        }
        Err(DriveWorkflowError::Rejected(rejection)) => {
            warn!(operation, %rejection, "command rejected")
        }
        Err(other) => error!(operation, error = %other, "command failed"),
    }
    result
}
