use std::collections::HashSet;

use chrono::NaiveDate;

use super::super::domain::{
    Actor, Drive, DriveConfiguration, DriveId, DriveStatus, NewDrive, RoleId, UserId, UserRole,
};
use super::super::patch::{FieldValue, Patch};
use super::super::repository::EntityStore;
use super::super::status::{self, DriveCalendar, DriveField};
use super::{
    assigned_elsewhere_on, is_admin_or_owner, load_drive, messages, reject_foreign_keys, role_id,
    Checked, Validation,
};

pub(crate) const DRIVE_EDIT_KEYS: &[&str] =
    &["driveName", "driveDate", "technicalRounds", "driveStatus"];

/// A user who will be staffed on a new drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProposedMember {
    pub user_id: UserId,
    pub role_id: RoleId,
}

pub(crate) fn validate_create_drive<S>(
    store: &S,
    actor: &Actor,
    request: &NewDrive,
    today: NaiveDate,
) -> Checked<Vec<ProposedMember>>
where
    S: EntityStore + ?Sized,
{
    let mut validation = Validation::new();

    if !actor.is_admin() {
        return Err(validation.block(messages::ADMIN_ONLY));
    }

    let name = request.drive_name.trim();
    if name.is_empty() {
        validation.fail("driveName", messages::DRIVE_NAME_REQUIRED);
    } else if store.drive_by_name(name)?.is_some() {
        validation.fail("driveName", messages::DRIVE_NAME_EXISTS);
    }

    if request.drive_date < today {
        validation.fail("driveDate", messages::FUTURE_DATE_ONLY);
    }

    if !(1..=2).contains(&request.technical_rounds) {
        validation.fail("technicalRounds", messages::TECHNICAL_ROUNDS_RANGE);
    }

    let mut proposed = Vec::new();
    for (role, user_ids) in request.members_by_role() {
        let field = match role {
            UserRole::Hr => "hrIds",
            UserRole::Panel => "panelIds",
            _ => "mentorIds",
        };
        match check_staff_list(store, role, user_ids, request.drive_date)? {
            Ok(role_id) => proposed.extend(
                user_ids
                    .iter()
                    .map(|&user_id| ProposedMember { user_id, role_id }),
            ),
            Err(message) => validation.fail(field, message),
        }
    }

    validation.finish()?;
    Ok(proposed)
}

/// Checks one role's staff list; the inner `Err` is the first failing rule.
fn check_staff_list<S>(
    store: &S,
    role: UserRole,
    user_ids: &[UserId],
    date: NaiveDate,
) -> Checked<Result<RoleId, String>>
where
    S: EntityStore + ?Sized,
{
    if user_ids.is_empty() {
        let message = match role {
            UserRole::Hr => messages::MIN_ONE_HR,
            UserRole::Panel => messages::MIN_ONE_PANEL,
            _ => messages::MIN_ONE_MENTOR,
        };
        return Ok(Err(message.to_string()));
    }

    let distinct: HashSet<_> = user_ids.iter().collect();
    if distinct.len() != user_ids.len() {
        return Ok(Err(messages::duplicate_users(role.label())));
    }

    let expected_role = role_id(store, role)?;
    let mut users = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        match store.user(*user_id)? {
            Some(user) => users.push(user),
            None => return Ok(Err(messages::SOME_USER_NOT_FOUND.to_string())),
        }
    }

    if users.iter().any(|user| !user.is_active) {
        return Ok(Err(messages::SOME_USERS_INACTIVE.to_string()));
    }

    if users.iter().any(|user| user.role_id != expected_role) {
        return Ok(Err(messages::SOME_USER_ROLE_MISMATCH.to_string()));
    }

    for user in &users {
        if assigned_elsewhere_on(store, user.id, date, None)? {
            return Ok(Err(messages::SOME_USER_BUSY_SAME_DATE.to_string()));
        }
    }

    Ok(Ok(expected_role))
}

/// Accepted edit of a drive's own attributes.
#[derive(Debug, Clone)]
pub(crate) struct DriveEdit {
    pub drive: Drive,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub technical_rounds: Option<u8>,
    pub status: Option<DriveStatus>,
}

pub(crate) fn validate_drive_edit<S>(
    store: &S,
    actor: &Actor,
    drive_id: DriveId,
    patch: &Patch,
    today: NaiveDate,
) -> Checked<DriveEdit>
where
    S: EntityStore + ?Sized,
{
    let mut validation = Validation::new();
    reject_foreign_keys(patch, DRIVE_EDIT_KEYS, &mut validation);

    let (drive, mut validation) = load_drive(store, drive_id, validation)?;
    if !is_admin_or_owner(actor, &drive) {
        return Err(validation.block(messages::ADMIN_OR_OWNER));
    }
    if !status::can_edit_drive(drive.status) {
        return Err(validation.block(messages::CLOSED_DRIVE));
    }

    let mut edit = DriveEdit {
        drive,
        name: None,
        date: None,
        technical_rounds: None,
        status: None,
    };

    if patch.contains("driveName") {
        if !status::can_edit_drive_field(DriveField::Name, edit.drive.status) {
            validation.fail("driveName", messages::DRIVE_NAME_FROZEN);
        } else {
            match patch.field::<String>("driveName") {
                Ok(FieldValue::Present(name)) if !name.trim().is_empty() => {
                    let name = name.trim().to_string();
                    let clash = store
                        .drive_by_name(&name)?
                        .is_some_and(|other| other.id != edit.drive.id);
                    if clash {
                        validation.fail("driveName", messages::DRIVE_NAME_EXISTS);
                    } else {
                        edit.name = Some(name);
                    }
                }
                Ok(_) => validation.fail("driveName", messages::DRIVE_NAME_REQUIRED),
                Err(_) => validation.fail("driveName", messages::INVALID_VALUE),
            }
        }
    }

    if patch.contains("driveDate") {
        if !status::can_edit_drive_field(DriveField::Date, edit.drive.status) {
            validation.fail("driveDate", messages::DRIVE_DATE_FROZEN);
        } else {
            match patch.field::<NaiveDate>("driveDate") {
                Ok(FieldValue::Present(date)) if date >= today => edit.date = Some(date),
                Ok(FieldValue::Present(_)) => {
                    validation.fail("driveDate", messages::FUTURE_DATE_ONLY)
                }
                _ => validation.fail("driveDate", messages::INVALID_VALUE),
            }
        }
    }

    if patch.contains("technicalRounds") {
        if !status::can_edit_drive_field(DriveField::TechnicalRounds, edit.drive.status) {
            validation.fail("technicalRounds", messages::TECHNICAL_ROUNDS_FROZEN);
        } else {
            match patch.field::<i64>("technicalRounds") {
                Ok(FieldValue::Present(rounds @ 1..=2)) => {
                    edit.technical_rounds = Some(rounds as u8)
                }
                _ => validation.fail("technicalRounds", messages::TECHNICAL_ROUNDS_RANGE),
            }
        }
    }

    if patch.contains("driveStatus") {
        match patch.field::<DriveStatus>("driveStatus") {
            Ok(FieldValue::Present(target)) => {
                let calendar = DriveCalendar {
                    drive_date: edit.date.unwrap_or(edit.drive.date),
                    today,
                };
                match status::DRIVE_STATUS.check(edit.drive.status, target, &calendar) {
                    Ok(()) => edit.status = Some(target),
                    Err(message) => validation.fail("driveStatus", message),
                }
            }
            _ => validation.fail("driveStatus", messages::INVALID_DRIVE_STATUS),
        }
    }

    validation.finish()?;
    Ok(edit)
}

/// Editable sections of a drive's configuration, keyed by their payload name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Hr,
    Panel,
    Mentor,
    PanelVisibility,
    Notifications,
    Feedback,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 6] = [
        ConfigSection::Hr,
        ConfigSection::Panel,
        ConfigSection::Mentor,
        ConfigSection::PanelVisibility,
        ConfigSection::Notifications,
        ConfigSection::Feedback,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            ConfigSection::Hr => "hrConfiguration",
            ConfigSection::Panel => "panelConfiguration",
            ConfigSection::Mentor => "mentorConfiguration",
            ConfigSection::PanelVisibility => "panelVisibilitySettings",
            ConfigSection::Notifications => "notificationSettings",
            ConfigSection::Feedback => "feedbackConfiguration",
        }
    }

    /// Flags a caller may change in this section.
    pub const fn editable(self) -> &'static [&'static str] {
        match self {
            ConfigSection::Hr => &[
                "allowBulkUpload",
                "canEditSubmittedFeedback",
                "allowPanelReassign",
                "requireApprovalForReassignment",
            ],
            ConfigSection::Panel => &[
                "canEditSubmittedFeedback",
                "allowPanelReassign",
                "requireApprovalForReassignment",
            ],
            ConfigSection::Mentor => &[
                "canViewFeedback",
                "allowPanelReassign",
                "requireApprovalForReassignment",
            ],
            ConfigSection::PanelVisibility => &[
                "showPhone",
                "showEmail",
                "showPreviousCompany",
                "showResume",
                "showCollege",
                "showAddress",
                "showLinkedIn",
                "showGitHub",
            ],
            ConfigSection::Notifications => &["emailNotificationEnabled"],
            ConfigSection::Feedback => &[
                "overallRatingRequired",
                "technicalSkillRequired",
                "communicationRequired",
                "problemSolvingRequired",
                "recommendationRequired",
                "overallFeedbackRequired",
            ],
        }
    }

    /// Writes one flag. Keys outside [`ConfigSection::editable`] are ignored.
    pub fn apply(self, configuration: &mut DriveConfiguration, key: &str, value: bool) {
        if !self.editable().contains(&key) {
            return;
        }

        let slot = match self {
            ConfigSection::Hr | ConfigSection::Panel | ConfigSection::Mentor => {
                let role = match self {
                    ConfigSection::Hr => &mut configuration.hr,
                    ConfigSection::Panel => &mut configuration.panel,
                    _ => &mut configuration.mentor,
                };
                match key {
                    "canViewFeedback" => &mut role.can_view_feedback,
                    "allowBulkUpload" => &mut role.allow_bulk_upload,
                    "canEditSubmittedFeedback" => &mut role.can_edit_submitted_feedback,
                    "allowPanelReassign" => &mut role.allow_panel_reassign,
                    "requireApprovalForReassignment" => {
                        &mut role.require_approval_for_reassignment
                    }
                    _ => return,
                }
            }
            ConfigSection::PanelVisibility => {
                let visibility = &mut configuration.panel_visibility;
                match key {
                    "showPhone" => &mut visibility.show_phone,
                    "showEmail" => &mut visibility.show_email,
                    "showPreviousCompany" => &mut visibility.show_previous_company,
                    "showResume" => &mut visibility.show_resume,
                    "showCollege" => &mut visibility.show_college,
                    "showAddress" => &mut visibility.show_address,
                    "showLinkedIn" => &mut visibility.show_linked_in,
                    "showGitHub" => &mut visibility.show_git_hub,
                    _ => return,
                }
            }
            ConfigSection::Notifications => match key {
                "emailNotificationEnabled" => {
                    &mut configuration.notifications.email_notification_enabled
                }
                _ => return,
            },
            ConfigSection::Feedback => {
                let feedback = &mut configuration.feedback;
                match key {
                    "overallRatingRequired" => &mut feedback.overall_rating_required,
                    "technicalSkillRequired" => &mut feedback.technical_skill_required,
                    "communicationRequired" => &mut feedback.communication_required,
                    "problemSolvingRequired" => &mut feedback.problem_solving_required,
                    "recommendationRequired" => &mut feedback.recommendation_required,
                    "overallFeedbackRequired" => &mut feedback.overall_feedback_required,
                    _ => return,
                }
            }
        };
        *slot = value;
    }
}

/// Accepted configuration edit with the flags to write.
#[derive(Debug, Clone)]
pub(crate) struct ConfigurationEdit {
    pub drive: Drive,
    pub configuration: DriveConfiguration,
    pub changes: Vec<(ConfigSection, String, bool)>,
}

pub(crate) fn validate_configuration_edit<S>(
    store: &S,
    actor: &Actor,
    drive_id: DriveId,
    patch: &Patch,
) -> Checked<ConfigurationEdit>
where
    S: EntityStore + ?Sized,
{
    let mut validation = Validation::new();
    let section_keys: Vec<&str> = ConfigSection::ALL.iter().map(|section| section.key()).collect();
    reject_foreign_keys(patch, &section_keys, &mut validation);

    let (drive, mut validation) = load_drive(store, drive_id, validation)?;
    if !is_admin_or_owner(actor, &drive) {
        return Err(validation.block(messages::ADMIN_OR_OWNER));
    }
    if !status::can_edit_drive(drive.status) {
        return Err(validation.block(messages::CLOSED_DRIVE));
    }
    let configuration = match store.drive_configuration(drive.id)? {
        Some(configuration) => configuration,
        None => return Err(validation.block(messages::DRIVE_NOT_FOUND)),
    };

    let mut changes = Vec::new();
    for section in ConfigSection::ALL {
        let nested = match patch.nested(section.key()) {
            Ok(FieldValue::Present(nested)) => nested,
            Ok(FieldValue::Absent) => continue,
            Ok(FieldValue::Null) | Err(_) => {
                validation.fail(section.key(), messages::INVALID_VALUE);
                continue;
            }
        };

        for key in nested.keys() {
            let path = format!("{}.{}", section.key(), key);
            if !section.editable().contains(&key) {
                validation.fail(path, messages::field_read_only(key));
                continue;
            }
            match nested.field::<bool>(key) {
                Ok(FieldValue::Present(value)) => changes.push((section, key.to_string(), value)),
                _ => validation.fail(path, messages::INVALID_VALUE),
            }
        }
    }

    validation.finish()?;
    Ok(ConfigurationEdit {
        drive,
        configuration,
        changes,
    })
}
