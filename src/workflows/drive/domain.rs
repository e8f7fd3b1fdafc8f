use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub i64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

entity_id!(
    /// Identifier of a recruitment drive.
    DriveId,
    /// Identifier of a platform user (staff account).
    UserId,
    /// Identifier of a candidate profile, independent of any drive.
    CandidateId,
    /// Identifier of a user's role-scoped participation in one drive.
    DriveMemberId,
    /// Identifier of a candidate's participation in one drive.
    DriveCandidateId,
    RoundId,
    FeedbackId,
    RoleId,
    ReassignmentId,
);

/// Lifecycle of a drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveStatus {
    InProposal,
    Started,
    Halted,
    Completed,
    Cancelled,
}

impl DriveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DriveStatus::InProposal => "InProposal",
            DriveStatus::Started => "Started",
            DriveStatus::Halted => "Halted",
            DriveStatus::Completed => "Completed",
            DriveStatus::Cancelled => "Cancelled",
        }
    }

    /// Completed and Cancelled drives accept no further changes.
    pub const fn is_closed(self) -> bool {
        matches!(self, DriveStatus::Completed | DriveStatus::Cancelled)
    }
}

/// Disposition of a candidate within one drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateStatus {
    Pending,
    Selected,
    Rejected,
}

impl CandidateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CandidateStatus::Pending => "Pending",
            CandidateStatus::Selected => "Selected",
            CandidateStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundStatus {
    Scheduled,
    OnProcess,
    Completed,
    Skipped,
}

impl RoundStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RoundStatus::Scheduled => "Scheduled",
            RoundStatus::OnProcess => "OnProcess",
            RoundStatus::Completed => "Completed",
            RoundStatus::Skipped => "Skipped",
        }
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, RoundStatus::Completed | RoundStatus::Skipped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundResult {
    Pending,
    Selected,
    Rejected,
}

impl RoundResult {
    pub const fn label(self) -> &'static str {
        match self {
            RoundResult::Pending => "Pending",
            RoundResult::Selected => "Selected",
            RoundResult::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundType {
    Hr,
    Tech1,
    Tech2,
}

impl RoundType {
    pub const fn label(self) -> &'static str {
        match self {
            RoundType::Hr => "Hr",
            RoundType::Tech1 => "Tech1",
            RoundType::Tech2 => "Tech2",
        }
    }
}

/// Interviewer's verdict recorded on a feedback form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    NA,
    NoHire,
    Maybe,
    Hire,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::NA => "NA",
            Recommendation::NoHire => "NoHire",
            Recommendation::Maybe => "Maybe",
            Recommendation::Hire => "Hire",
        }
    }
}

/// Global role of a user; HR, Panel and Mentor double as drive membership roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    #[serde(rename = "HR")]
    Hr,
    Panel,
    Mentor,
}

impl UserRole {
    pub const MEMBERSHIP_ROLES: [UserRole; 3] = [UserRole::Hr, UserRole::Panel, UserRole::Mentor];

    pub const fn label(self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Hr => "HR",
            UserRole::Panel => "Panel",
            UserRole::Mentor => "Mentor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "hr" => Some(UserRole::Hr),
            "panel" => Some(UserRole::Panel),
            "mentor" => Some(UserRole::Mentor),
            _ => None,
        }
    }
}

/// The user on whose behalf a command or query runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Actor {
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub role_id: RoleId,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    pub id: DriveId,
    pub name: String,
    pub date: NaiveDate,
    pub technical_rounds: u8,
    pub status: DriveStatus,
    pub created_by: UserId,
    pub created_date: NaiveDateTime,
    pub updated_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveMember {
    pub id: DriveMemberId,
    pub drive_id: DriveId,
    pub user_id: UserId,
    pub role_id: RoleId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveCandidate {
    pub id: DriveCandidateId,
    pub drive_id: DriveId,
    pub candidate_id: CandidateId,
    pub status: CandidateStatus,
    pub status_set_by: Option<UserId>,
    pub attendance_status: Option<String>,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub interviewer_id: DriveMemberId,
    pub drive_candidate_id: DriveCandidateId,
    pub round_type: RoundType,
    pub status: RoundStatus,
    pub result: RoundResult,
    pub feedback_id: Option<FeedbackId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub overall_rating: Option<u8>,
    pub technical_skill: Option<u8>,
    pub communication: Option<u8>,
    pub problem_solving: Option<u8>,
    pub overall_feedback: Option<String>,
    pub recommendation: Recommendation,
    pub submitted_date: NaiveDateTime,
}

/// Audit record written for every interviewer swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateReassignment {
    pub id: ReassignmentId,
    pub drive_candidate_id: DriveCandidateId,
    pub previous_interviewer_id: DriveMemberId,
    pub new_interviewer_id: DriveMemberId,
    pub requested_by: UserId,
    pub require_approval: bool,
    pub requested_at: NaiveDateTime,
    pub approved_at: Option<NaiveDateTime>,
}

/// Permissions granted to one membership role within a drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleConfiguration {
    pub can_view_feedback: bool,
    pub allow_bulk_upload: bool,
    pub can_edit_submitted_feedback: bool,
    pub allow_panel_reassign: bool,
    pub require_approval_for_reassignment: bool,
}

/// Candidate profile fields shown to panel members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelVisibility {
    pub show_phone: bool,
    pub show_email: bool,
    pub show_previous_company: bool,
    pub show_resume: bool,
    pub show_college: bool,
    pub show_address: bool,
    #[serde(rename = "showLinkedIn")]
    pub show_linked_in: bool,
    #[serde(rename = "showGitHub")]
    pub show_git_hub: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notification_enabled: bool,
}

/// Which feedback fields an interviewer must fill in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedbackRequirements {
    pub overall_rating_required: bool,
    pub technical_skill_required: bool,
    pub communication_required: bool,
    pub problem_solving_required: bool,
    pub recommendation_required: bool,
    pub overall_feedback_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfiguration {
    pub drive_id: DriveId,
    pub hr: RoleConfiguration,
    pub panel: RoleConfiguration,
    pub mentor: RoleConfiguration,
    pub panel_visibility: PanelVisibility,
    pub notifications: NotificationSettings,
    pub feedback: FeedbackRequirements,
}

impl DriveConfiguration {
    pub fn for_role(&self, role: UserRole) -> Option<&RoleConfiguration> {
        match role {
            UserRole::Hr => Some(&self.hr),
            UserRole::Panel => Some(&self.panel),
            UserRole::Mentor => Some(&self.mentor),
            UserRole::Admin => None,
        }
    }
}

/// Payload for creating a drive together with its staff and settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDrive {
    pub drive_name: String,
    pub drive_date: NaiveDate,
    pub technical_rounds: u8,
    #[serde(default)]
    pub hr_ids: Vec<UserId>,
    #[serde(default)]
    pub panel_ids: Vec<UserId>,
    #[serde(default)]
    pub mentor_ids: Vec<UserId>,
    #[serde(default)]
    pub hr_configuration: RoleConfiguration,
    #[serde(default)]
    pub panel_configuration: RoleConfiguration,
    #[serde(default)]
    pub mentor_configuration: RoleConfiguration,
    #[serde(default)]
    pub panel_visibility_settings: PanelVisibility,
    #[serde(default)]
    pub notification_settings: NotificationSettings,
    #[serde(default)]
    pub feedback_configuration: FeedbackRequirements,
}

impl NewDrive {
    pub fn members_by_role(&self) -> [(UserRole, &[UserId]); 3] {
        [
            (UserRole::Hr, self.hr_ids.as_slice()),
            (UserRole::Panel, self.panel_ids.as_slice()),
            (UserRole::Mentor, self.mentor_ids.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub user_id: UserId,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSelection {
    pub candidate_ids: Vec<CandidateId>,
}

/// Feedback form as submitted; values are checked before they become a [`Feedback`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    #[serde(default)]
    pub overall_rating: Option<i64>,
    #[serde(default)]
    pub technical_skill: Option<i64>,
    #[serde(default)]
    pub communication: Option<i64>,
    #[serde(default)]
    pub problem_solving: Option<i64>,
    #[serde(default)]
    pub overall_feedback: Option<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewerChange {
    #[serde(default)]
    pub old_interviewer_id: i64,
    #[serde(default)]
    pub new_interviewer_id: i64,
    #[serde(default)]
    pub require_approval: bool,
}
