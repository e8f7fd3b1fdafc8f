//! Caller-facing rejection texts.

pub const MAIN: &str = "Main";

pub const DRIVE_NOT_FOUND: &str = "Drive not found";
pub const ADMIN_OR_OWNER: &str = "Admin or Owner of the Drive can able to edit/add/remove";
pub const ADMIN_OWNER_OR_INTERVIEWER: &str = "Admin or Drive Owner or Interviewer can able to edit";
pub const ADMIN_OWNER_OR_HR_INTERVIEWER: &str =
    "Admin or Drive Owner or Interviewer(Hr) can able to edit";
pub const ADMIN_ONLY: &str = "Only Admin can create a Drive";
pub const CLOSED_DRIVE: &str = "Closed Drive cannot be edit";
pub const PAUSED_DRIVE: &str = "Paused Drive cannot be edit";
pub const DRIVE_NEEDS_START: &str = "Drive need to be start first";

pub const DRIVE_NAME_REQUIRED: &str = "Drive Name is required";
pub const DRIVE_NAME_EXISTS: &str = "Drive Name Already Exist";
pub const DRIVE_NAME_FROZEN: &str = "Drive Name cannot be change";
pub const DRIVE_DATE_FROZEN: &str = "Drive Date cannot be change";
pub const TECHNICAL_ROUNDS_FROZEN: &str = "Drive Technical Rounds cannot be change";
pub const FUTURE_DATE_ONLY: &str = "Future Date only allowed";
pub const TECHNICAL_ROUNDS_RANGE: &str = "Technical Rounds should be 1 or 2";
pub const INVALID_DRIVE_STATUS: &str = "Invalid Drive Status";
pub const DRIVE_STATUS_TO_IN_PROPOSAL: &str = "DriveStatus cannot be change to InProposal";
pub const DRIVE_NOT_STARTABLE_YET: &str = "Drive cannot be started before scheduled date";

pub const CANNOT_REMOVE_ON_STARTED_DRIVE: &str = "Cannot remove Members on a started Drive";
pub const CANNOT_ADD_MEMBER_ON_CLOSED_DRIVE: &str = "Cannot add Member on a closed Drive";
pub const CANNOT_ADD_CANDIDATES_ON_CLOSED_DRIVE: &str = "Cannot add candidates on a closed Drive";

pub const USER_NOT_FOUND: &str = "User not found";
pub const USER_INACTIVE: &str = "Not a Active User";
pub const ALREADY_MEMBER: &str = "Already a member of the Drive";
pub const USER_BUSY_SAME_DATE: &str = "User was assigned to another active Drive on same Date";
pub const USER_ROLE_MISMATCH: &str = "User not in a Specified Role";
pub const INVALID_MEMBER_ROLE: &str = "Provided Role is Invalid";
pub const DRIVE_MEMBER_NOT_FOUND: &str = "Drive Member not found";

pub const MIN_ONE_HR: &str = "Minimum one HR should be add";
pub const MIN_ONE_PANEL: &str = "Minimum one Panel member should be add";
pub const MIN_ONE_MENTOR: &str = "Minimum one Mentor should be add";
pub const SOME_USER_NOT_FOUND: &str = "Some user not found";
pub const SOME_USERS_INACTIVE: &str = "Some users are Inactive";
pub const SOME_USER_ROLE_MISMATCH: &str = "Some user not in a Specified Role";
pub const SOME_USER_BUSY_SAME_DATE: &str =
    "Some user were assigned to another active Drive on same Date";

pub const NO_CANDIDATES_SUPPLIED: &str = "Minimum one Candidate should be provided";
pub const CANDIDATE_NOT_FOUND: &str = "Candidate not found";
pub const DRIVE_CANDIDATE_NOT_FOUND: &str = "Drive Candidate not found";
pub const CANDIDATE_ALREADY_ADDED: &str = "Some Candidate already added to the Drive";
pub const CANDIDATE_STATUS_TO_PENDING: &str = "CandidateStatus cannot be change to Pending";
pub const INVALID_CANDIDATE_STATUS: &str = "Invalid Candidate Status";
pub const INVALID_ATTENDANCE_STATUS: &str = "Invalid Attendance Status";
pub const ATTENDANCE_NOT_ALLOWED: &str = "Attendance allowed only for today's active drive.";
pub const ATTENDANCE_ALREADY_MARKED: &str = "Attendance already marked.";

pub const ROUND_NOT_FOUND: &str = "Interview Round not found";
pub const ROUND_CLOSED: &str = "Interview Round was closed";
pub const ROUND_RESULT_REQUIRED: &str = "Need to set Round Result before closing Round";
pub const ROUND_NOT_STARTED: &str = "Need to Start Round before set Round Result";
pub const INVALID_ROUND_STATUS: &str = "Invalid Round Status";
pub const INVALID_ROUND_STATUS_TRANSITION: &str = "Invalid Round Status transition";
pub const INVALID_ROUND_RESULT: &str = "Invalid Round Result";
pub const ROUND_RESULT_TO_PENDING: &str = "RoundResult cannot be change to Pending";

pub const INVALID_RECOMMENDATION: &str = "Invalid Candidate Recommendation";
pub const INVALID_RATING: &str = "Invalid Rating Number";
pub const FEEDBACK_ALREADY_PROVIDED: &str = "Feedback already provided";
pub const NO_FEEDBACK_FOR_ROUND: &str = "No Feedback was provided for the Interview Round";
pub const FEEDBACK_NOT_FOUND: &str = "Feedback not found";

pub const CREATED_BY_READ_ONLY: &str = "CreatedBy cannot be updated";
pub const CREATED_DATE_READ_ONLY: &str = "CreatedDate cannot be updated";
pub const UPDATED_DATE_READ_ONLY: &str = "UpdatedDate cannot be updated";
pub const PASSWORD_READ_ONLY: &str = "Password cannot be updated";
pub const INVALID_VALUE: &str = "Invalid value";

pub const NO_CANDIDATES_FOUND: &str = "No candidates found";
pub const NO_INTERVIEWERS_FOUND: &str = "No interviewers found";
pub const PANEL_ALREADY_ASSIGNED: &str = "Panel already assigned for the Drive";
pub const AUTO_ASSIGN_FUTURE_ONLY: &str = "Panel can be auto assigned only for a future Drive";
pub const AUTO_ASSIGN_IN_PROPOSAL_ONLY: &str =
    "Panel can be auto assigned only while the Drive is InProposal";
pub const INTERVIEWER_NOT_ASSIGNED: &str = "Interviewer not yet assigned";
pub const INVALID_PANEL_INTERVIEWER: &str = "Invalid panel interviewer";
pub const SAME_INTERVIEWER: &str = "New interviewer cannot be same as old interviewer";
pub const ROUND_ID_INVALID: &str = "Round Id must be a valid value";
pub const OLD_INTERVIEWER_REQUIRED: &str = "Old interviewer is required";
pub const NEW_INTERVIEWER_REQUIRED: &str = "New interviewer is required";
pub const REASSIGNED_WITHOUT_APPROVAL: &str = "Reassignment applied without approval workflow";
pub const PANEL_ONLY_ASSIGNED_CANDIDATES: &str = "Only Panel can view assigned candidates";

pub const INVALID_EMAIL: &str = "Invalid Email";

pub fn duplicate_users(role_label: &str) -> String {
    format!("Some duplicate users found in {role_label} list")
}

pub fn field_read_only(key: &str) -> String {
    format!("{key} cannot be updated")
}

pub fn field_required(label: &str) -> String {
    format!("{label} is required")
}
