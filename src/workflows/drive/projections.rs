//! Read models and list filters.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::domain::{
    CandidateId, CandidateReassignment, CandidateStatus, Drive, DriveCandidate, DriveCandidateId,
    DriveConfiguration, DriveId, DriveMember, DriveMemberId, DriveStatus, Feedback, FeedbackId,
    FeedbackRequirements, NotificationSettings, PanelVisibility, Recommendation, ReassignmentId,
    RoleConfiguration, Round, RoundId, RoundResult, RoundStatus, RoundType, UserId, UserRole,
};
use super::repository::{EntityStore, RepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveView {
    pub drive_id: DriveId,
    pub drive_name: String,
    pub drive_date: NaiveDate,
    pub technical_rounds: u8,
    pub drive_status: DriveStatus,
    pub created_by: UserId,
    pub created_date: NaiveDateTime,
    pub updated_date: Option<NaiveDateTime>,
}

impl From<&Drive> for DriveView {
    fn from(drive: &Drive) -> Self {
        Self {
            drive_id: drive.id,
            drive_name: drive.name.clone(),
            drive_date: drive.date,
            technical_rounds: drive.technical_rounds,
            drive_status: drive.status,
            created_by: drive.created_by,
            created_date: drive.created_date,
            updated_date: drive.updated_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveConfigurationView {
    pub drive_id: DriveId,
    pub hr_configuration: RoleConfiguration,
    pub panel_configuration: RoleConfiguration,
    pub mentor_configuration: RoleConfiguration,
    pub panel_visibility_settings: PanelVisibility,
    pub notification_settings: NotificationSettings,
    pub feedback_configuration: FeedbackRequirements,
}

impl From<&DriveConfiguration> for DriveConfigurationView {
    fn from(configuration: &DriveConfiguration) -> Self {
        Self {
            drive_id: configuration.drive_id,
            hr_configuration: configuration.hr,
            panel_configuration: configuration.panel,
            mentor_configuration: configuration.mentor,
            panel_visibility_settings: configuration.panel_visibility,
            notification_settings: configuration.notifications,
            feedback_configuration: configuration.feedback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveMemberView {
    pub drive_member_id: DriveMemberId,
    pub drive_id: DriveId,
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveCandidateView {
    pub drive_candidate_id: DriveCandidateId,
    pub drive_id: DriveId,
    pub candidate_id: CandidateId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub candidate_status: CandidateStatus,
    pub status_set_by: Option<UserId>,
    pub attendance_status: Option<String>,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    pub feedback_id: FeedbackId,
    pub overall_rating: Option<u8>,
    pub technical_skill: Option<u8>,
    pub communication: Option<u8>,
    pub problem_solving: Option<u8>,
    pub overall_feedback: Option<String>,
    pub recommendation: Recommendation,
    pub submitted_date: NaiveDateTime,
}

impl From<&Feedback> for FeedbackView {
    fn from(feedback: &Feedback) -> Self {
        Self {
            feedback_id: feedback.id,
            overall_rating: feedback.overall_rating,
            technical_skill: feedback.technical_skill,
            communication: feedback.communication,
            problem_solving: feedback.problem_solving,
            overall_feedback: feedback.overall_feedback.clone(),
            recommendation: feedback.recommendation,
            submitted_date: feedback.submitted_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub round_id: RoundId,
    pub drive_id: Option<DriveId>,
    pub drive_candidate_id: DriveCandidateId,
    pub candidate_id: Option<CandidateId>,
    pub interviewer_id: DriveMemberId,
    pub interviewer_user_id: Option<UserId>,
    pub round_type: RoundType,
    pub round_status: RoundStatus,
    pub round_result: RoundResult,
    pub feedback: Option<FeedbackView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignmentView {
    pub reassignment_id: ReassignmentId,
    pub drive_candidate_id: DriveCandidateId,
    pub previous_interviewer_id: DriveMemberId,
    pub new_interviewer_id: DriveMemberId,
    pub requested_by: UserId,
    pub require_approval: bool,
    pub requested_at: NaiveDateTime,
    pub approved_at: Option<NaiveDateTime>,
}

impl From<&CandidateReassignment> for ReassignmentView {
    fn from(record: &CandidateReassignment) -> Self {
        Self {
            reassignment_id: record.id,
            drive_candidate_id: record.drive_candidate_id,
            previous_interviewer_id: record.previous_interviewer_id,
            new_interviewer_id: record.new_interviewer_id,
            requested_by: record.requested_by,
            require_approval: record.require_approval,
            requested_at: record.requested_at,
            approved_at: record.approved_at,
        }
    }
}

pub(crate) fn member_view<S>(
    store: &S,
    member: &DriveMember,
) -> Result<DriveMemberView, RepositoryError>
where
    S: EntityStore + ?Sized,
{
    let user = store.user(member.user_id)?;
    let role = store.role(member.role_id)?;
    Ok(DriveMemberView {
        drive_member_id: member.id,
        drive_id: member.drive_id,
        user_id: member.user_id,
        full_name: user.as_ref().map(|user| user.full_name.clone()),
        email: user.map(|user| user.email),
        role: role.map(|role| role.name),
    })
}

pub(crate) fn drive_candidate_view<S>(
    store: &S,
    link: &DriveCandidate,
) -> Result<DriveCandidateView, RepositoryError>
where
    S: EntityStore + ?Sized,
{
    let candidate = store.candidate(link.candidate_id)?;
    Ok(DriveCandidateView {
        drive_candidate_id: link.id,
        drive_id: link.drive_id,
        candidate_id: link.candidate_id,
        full_name: candidate.as_ref().map(|candidate| candidate.full_name.clone()),
        email: candidate.map(|candidate| candidate.email),
        candidate_status: link.status,
        status_set_by: link.status_set_by,
        attendance_status: link.attendance_status.clone(),
        created_date: link.created_date,
    })
}

pub(crate) fn round_view<S>(store: &S, round: &Round) -> Result<RoundView, RepositoryError>
where
    S: EntityStore + ?Sized,
{
    let link = store.drive_candidate(round.drive_candidate_id)?;
    let interviewer = store.drive_member(round.interviewer_id)?;
    let feedback = match round.feedback_id {
        Some(id) => store.feedback(id)?.as_ref().map(FeedbackView::from),
        None => None,
    };

    Ok(RoundView {
        round_id: round.id,
        drive_id: link.as_ref().map(|link| link.drive_id),
        drive_candidate_id: round.drive_candidate_id,
        candidate_id: link.map(|link| link.candidate_id),
        interviewer_id: round.interviewer_id,
        interviewer_user_id: interviewer.map(|member| member.user_id),
        round_type: round.round_type,
        round_status: round.status,
        round_result: round.result,
        feedback,
    })
}

/// Filters accepted by the drive list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveFilter {
    pub status: Option<DriveStatus>,
    pub creator_id: Option<UserId>,
    pub technical_rounds: Option<u8>,
    pub latest_first: Option<bool>,
    pub include_past_drives: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveMemberFilter {
    pub drive_id: Option<DriveId>,
    pub user_id: Option<UserId>,
    pub role: Option<UserRole>,
    pub drive_status: Option<DriveStatus>,
    pub latest_first: Option<bool>,
    pub include_past_drives: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveCandidateFilter {
    pub drive_id: Option<DriveId>,
    pub candidate_id: Option<CandidateId>,
    pub candidate_status: Option<CandidateStatus>,
    pub drive_status: Option<DriveStatus>,
    pub latest_first: Option<bool>,
    pub include_past_drives: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoundFilter {
    pub drive_id: Option<DriveId>,
    /// Matches the user conducting the round.
    pub user_id: Option<UserId>,
    pub round_type: Option<RoundType>,
    pub round_status: Option<RoundStatus>,
    pub round_result: Option<RoundResult>,
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

/// Date window shared by the drive-scoped lists.
struct DriveWindow {
    today: NaiveDate,
    include_past: bool,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    status: Option<DriveStatus>,
}

impl DriveWindow {
    fn admits(&self, drive: &Drive) -> bool {
        (self.include_past || drive.date >= self.today)
            && self.start.map_or(true, |start| drive.date >= start)
            && self.end.map_or(true, |end| drive.date <= end)
            && self.status.map_or(true, |status| drive.status == status)
    }
}

/// Drive date, then creation time; newest first unless `latest_first` is false.
fn chronological(left: &Drive, right: &Drive, latest_first: bool) -> Ordering {
    let ordering = left
        .date
        .cmp(&right.date)
        .then(left.created_date.cmp(&right.created_date));
    if latest_first {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Pages are 1-based and only applied when both bounds are supplied.
fn paginate<T>(items: Vec<T>, page_number: Option<usize>, page_size: Option<usize>) -> Vec<T> {
    match (page_number, page_size) {
        (Some(number), Some(size)) if number > 0 && size > 0 => {
            match (number - 1).checked_mul(size) {
                Some(offset) => items.into_iter().skip(offset).take(size).collect(),
                None => Vec::new(),
            }
        }
        _ => items,
    }
}

pub(crate) fn list_drives<S>(
    store: &S,
    filter: &DriveFilter,
    today: NaiveDate,
) -> Result<Vec<DriveView>, RepositoryError>
where
    S: EntityStore + ?Sized,
{
    let window = DriveWindow {
        today,
        include_past: filter.include_past_drives.unwrap_or(false),
        start: filter.start_date,
        end: filter.end_date,
        status: filter.status,
    };

    let mut drives: Vec<_> = store
        .drives()?
        .into_iter()
        .filter(|drive| window.admits(drive))
        .filter(|drive| filter.creator_id.map_or(true, |creator| drive.created_by == creator))
        .filter(|drive| {
            filter
                .technical_rounds
                .map_or(true, |rounds| drive.technical_rounds == rounds)
        })
        .collect();

    let latest_first = filter.latest_first.unwrap_or(true);
    drives.sort_by(|left, right| chronological(left, right, latest_first));

    Ok(paginate(drives, filter.page_number, filter.page_size)
        .iter()
        .map(DriveView::from)
        .collect())
}

pub(crate) fn list_drive_members<S>(
    store: &S,
    filter: &DriveMemberFilter,
    today: NaiveDate,
) -> Result<Vec<DriveMemberView>, RepositoryError>
where
    S: EntityStore + ?Sized,
{
    let window = DriveWindow {
        today,
        include_past: filter.include_past_drives.unwrap_or(false),
        start: filter.start_date,
        end: filter.end_date,
        status: filter.drive_status,
    };
    let role_id = match filter.role {
        Some(role) => match store.role_by_name(role)? {
            Some(role) => Some(role.id),
            None => return Ok(Vec::new()),
        },
        None => None,
    };

    let mut scoped = Vec::new();
    for drive in store.drives()? {
        if !window.admits(&drive) || filter.drive_id.map_or(false, |id| id != drive.id) {
            continue;
        }
        for member in store.drive_members(drive.id)? {
            let wanted = filter.user_id.map_or(true, |user| member.user_id == user)
                && role_id.map_or(true, |role| member.role_id == role);
            if wanted {
                scoped.push((drive.clone(), member));
            }
        }
    }

    let latest_first = filter.latest_first.unwrap_or(true);
    scoped.sort_by(|(left, left_member), (right, right_member)| {
        chronological(left, right, latest_first).then(left_member.id.cmp(&right_member.id))
    });

    paginate(scoped, filter.page_number, filter.page_size)
        .iter()
        .map(|(_, member)| member_view(store, member))
        .collect()
}

pub(crate) fn list_drive_candidates<S>(
    store: &S,
    filter: &DriveCandidateFilter,
    today: NaiveDate,
) -> Result<Vec<DriveCandidateView>, RepositoryError>
where
    S: EntityStore + ?Sized,
{
    let window = DriveWindow {
        today,
        include_past: filter.include_past_drives.unwrap_or(false),
        start: filter.start_date,
        end: filter.end_date,
        status: filter.drive_status,
    };

    let mut scoped = Vec::new();
    for drive in store.drives()? {
        if !window.admits(&drive) || filter.drive_id.map_or(false, |id| id != drive.id) {
            continue;
        }
        for link in store.drive_candidates(drive.id)? {
            let wanted = filter
                .candidate_id
                .map_or(true, |candidate| link.candidate_id == candidate)
                && filter
                    .candidate_status
                    .map_or(true, |status| link.status == status);
            if wanted {
                scoped.push((drive.clone(), link));
            }
        }
    }

    let latest_first = filter.latest_first.unwrap_or(true);
    scoped.sort_by(|(left, left_link), (right, right_link)| {
        chronological(left, right, latest_first)
            .then(left_link.created_date.cmp(&right_link.created_date))
            .then(left_link.id.cmp(&right_link.id))
    });

    paginate(scoped, filter.page_number, filter.page_size)
        .iter()
        .map(|(_, link)| drive_candidate_view(store, link))
        .collect()
}

/// Candidates a user interviews from a panel seat, across every drive, without repeats.
pub(crate) fn assigned_candidates<S>(
    store: &S,
    user_id: UserId,
) -> Result<Vec<DriveCandidateView>, RepositoryError>
where
    S: EntityStore + ?Sized,
{
    let Some(panel) = store.role_by_name(UserRole::Panel)? else {
        return Ok(Vec::new());
    };
    let seats: Vec<DriveMemberId> = store
        .memberships_for_user(user_id)?
        .into_iter()
        .filter(|member| member.role_id == panel.id)
        .map(|member| member.id)
        .collect();

    let mut links: Vec<DriveCandidateId> = store
        .rounds()?
        .into_iter()
        .filter(|round| seats.contains(&round.interviewer_id))
        .map(|round| round.drive_candidate_id)
        .collect();
    links.sort();
    links.dedup();

    let mut views = Vec::with_capacity(links.len());
    for id in links {
        if let Some(link) = store.drive_candidate(id)? {
            views.push(drive_candidate_view(store, &link)?);
        }
    }
    Ok(views)
}

pub(crate) fn list_rounds<S>(
    store: &S,
    filter: &RoundFilter,
) -> Result<Vec<RoundView>, RepositoryError>
where
    S: EntityStore + ?Sized,
{
    let mut rounds = Vec::new();
    for round in store.rounds()? {
        if !filter.round_type.map_or(true, |kind| round.round_type == kind)
            || !filter.round_status.map_or(true, |status| round.status == status)
            || !filter.round_result.map_or(true, |result| round.result == result)
        {
            continue;
        }
        if let Some(drive_id) = filter.drive_id {
            let in_drive = store
                .drive_candidate(round.drive_candidate_id)?
                .is_some_and(|link| link.drive_id == drive_id);
            if !in_drive {
                continue;
            }
        }
        if let Some(user_id) = filter.user_id {
            let conducts = store
                .drive_member(round.interviewer_id)?
                .is_some_and(|member| member.user_id == user_id);
            if !conducts {
                continue;
            }
        }
        rounds.push(round);
    }

    rounds.sort_by_key(|round| round.id);
    paginate(rounds, filter.page_number, filter.page_size)
        .iter()
        .map(|round| round_view(store, round))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_needs_both_bounds() {
        let items: Vec<_> = (1..=7).collect();
        assert_eq!(paginate(items.clone(), Some(2), None), items);
        assert_eq!(paginate(items.clone(), Some(2), Some(3)), vec![4, 5, 6]);
        assert_eq!(paginate(items, Some(4), Some(3)), Vec::<i32>::new());
    }

    #[test]
    fn oversized_page_numbers_yield_an_empty_page() {
        let items: Vec<_> = (1..=3).collect();
        assert_eq!(paginate(items.clone(), Some(usize::MAX), Some(2)), Vec::<i32>::new());
        assert_eq!(paginate(items, Some(2), Some(usize::MAX)), Vec::<i32>::new());
    }
}
