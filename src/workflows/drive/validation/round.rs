use super::super::domain::{
    Actor, Drive, DriveCandidate, DriveConfiguration, DriveMember, Feedback, NewFeedback,
    Recommendation, Round, RoundId, RoundResult, RoundStatus,
};
use super::super::patch::{FieldValue, Patch};
use super::super::repository::{EntityStore, RepositoryError};
use super::super::status::{self, RoundOutcome, RoundProgress};
use super::{is_admin_or_owner, messages, reject_foreign_keys, Checked, Validation};

pub(crate) const ROUND_EDIT_KEYS: &[&str] = &["roundStatus", "roundResult"];

pub(crate) const FEEDBACK_EDIT_KEYS: &[&str] = &[
    "overallRating",
    "technicalSkill",
    "communication",
    "problemSolving",
    "overallFeedback",
    "recommendation",
];

/// Everything a round command needs, loaded once.
#[derive(Debug, Clone)]
pub(crate) struct RoundContext {
    pub round: Round,
    pub drive_candidate: DriveCandidate,
    pub drive: Drive,
    pub interviewer: Option<DriveMember>,
    pub configuration: DriveConfiguration,
}

/// Loads the round with its drive and applies the shared authorization and window rules.
fn load_round_context<S>(
    store: &S,
    actor: &Actor,
    round_id: RoundId,
    validation: Validation,
) -> Checked<(RoundContext, Validation)>
where
    S: EntityStore + ?Sized,
{
    let round = match store.round(round_id)? {
        Some(round) => round,
        None => return Err(validation.block(messages::ROUND_NOT_FOUND)),
    };
    let drive_candidate = match store.drive_candidate(round.drive_candidate_id)? {
        Some(link) => link,
        None => return Err(validation.block(messages::ROUND_NOT_FOUND)),
    };
    let drive = match store.drive(drive_candidate.drive_id)? {
        Some(drive) => drive,
        None => return Err(validation.block(messages::DRIVE_NOT_FOUND)),
    };
    let interviewer = store.drive_member(round.interviewer_id)?;

    let conducts_round = interviewer
        .as_ref()
        .is_some_and(|member| member.user_id == actor.user_id);
    if !is_admin_or_owner(actor, &drive) && !conducts_round {
        return Err(validation.block(messages::ADMIN_OWNER_OR_INTERVIEWER));
    }
    if let Err(message) = status::round_edit_window(drive.status, round.status) {
        return Err(validation.block(message));
    }

    let configuration = store
        .drive_configuration(drive.id)?
        .ok_or(RepositoryError::NotFound)?;

    Ok((
        RoundContext {
            round,
            drive_candidate,
            drive,
            interviewer,
            configuration,
        },
        validation,
    ))
}

#[derive(Debug, Clone)]
pub(crate) struct RoundEdit {
    pub context: RoundContext,
    pub status: Option<RoundStatus>,
    pub result: Option<RoundResult>,
}

/// Each target is judged against the round as stored, so completing a round and setting
/// its result in one patch is refused while the stored result is still Pending.
pub(crate) fn validate_round_edit<S>(
    store: &S,
    actor: &Actor,
    round_id: RoundId,
    patch: &Patch,
) -> Checked<RoundEdit>
where
    S: EntityStore + ?Sized,
{
    let mut validation = Validation::new();
    reject_foreign_keys(patch, ROUND_EDIT_KEYS, &mut validation);
    let (context, mut validation) = load_round_context(store, actor, round_id, validation)?;

    let mut edit = RoundEdit {
        context,
        status: None,
        result: None,
    };
    let current = &edit.context.round;

    if patch.contains("roundStatus") {
        match patch.field::<RoundStatus>("roundStatus") {
            Ok(FieldValue::Present(target)) => {
                let outcome = RoundOutcome {
                    result: current.result,
                };
                match status::ROUND_STATUS.check(current.status, target, &outcome) {
                    Ok(()) => edit.status = Some(target),
                    Err(message) => validation.fail("roundStatus", message),
                }
            }
            _ => validation.fail("roundStatus", messages::INVALID_ROUND_STATUS),
        }
    }

    if patch.contains("roundResult") {
        match patch.field::<RoundResult>("roundResult") {
            Ok(FieldValue::Present(target)) => {
                let progress = RoundProgress {
                    status: current.status,
                };
                match status::ROUND_RESULT.check(current.result, target, &progress) {
                    Ok(()) => edit.result = Some(target),
                    Err(message) => validation.fail("roundResult", message),
                }
            }
            _ => validation.fail("roundResult", messages::INVALID_ROUND_RESULT),
        }
    }

    validation.finish()?;
    Ok(edit)
}

/// A feedback form that passed every rule.
#[derive(Debug, Clone)]
pub(crate) struct FeedbackDraft {
    pub context: RoundContext,
    pub overall_rating: Option<u8>,
    pub technical_skill: Option<u8>,
    pub communication: Option<u8>,
    pub problem_solving: Option<u8>,
    pub overall_feedback: Option<String>,
    pub recommendation: Recommendation,
}

pub(crate) fn validate_feedback<S>(
    store: &S,
    actor: &Actor,
    round_id: RoundId,
    form: &NewFeedback,
) -> Checked<FeedbackDraft>
where
    S: EntityStore + ?Sized,
{
    let (context, mut validation) = load_round_context(store, actor, round_id, Validation::new())?;
    if context.round.feedback_id.is_some() {
        return Err(validation.block(messages::FEEDBACK_ALREADY_PROVIDED));
    }

    let required = context.configuration.feedback;
    let ratings = [
        (
            "overallRating",
            "Overall Rating",
            form.overall_rating,
            required.overall_rating_required,
        ),
        (
            "technicalSkill",
            "Technical Skill",
            form.technical_skill,
            required.technical_skill_required,
        ),
        (
            "communication",
            "Communication",
            form.communication,
            required.communication_required,
        ),
        (
            "problemSolving",
            "Problem Solving",
            form.problem_solving,
            required.problem_solving_required,
        ),
    ];
    let mut accepted = [None; 4];
    for (slot, (field, label, value, is_required)) in accepted.iter_mut().zip(ratings) {
        match value {
            Some(value) => match rating(value) {
                Some(value) => *slot = Some(value),
                None => validation.fail(field, messages::INVALID_RATING),
            },
            None if is_required => validation.fail(field, messages::field_required(label)),
            None => {}
        }
    }

    let recommendation = match parse_recommendation(&form.recommendation) {
        Some(recommendation) => {
            if required.recommendation_required && recommendation == Recommendation::NA {
                validation.fail("recommendation", messages::field_required("Recommendation"));
            }
            recommendation
        }
        None => {
            validation.fail("recommendation", messages::INVALID_RECOMMENDATION);
            Recommendation::NA
        }
    };

    let overall_feedback = form
        .overall_feedback
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    if overall_feedback.is_none() && required.overall_feedback_required {
        validation.fail("overallFeedback", messages::field_required("Overall Feedback"));
    }

    validation.finish()?;
    let [overall_rating, technical_skill, communication, problem_solving] = accepted;
    Ok(FeedbackDraft {
        context,
        overall_rating,
        technical_skill,
        communication,
        problem_solving,
        overall_feedback,
        recommendation,
    })
}

/// Accepted feedback edit. The outer `Option` is presence in the patch, the inner one the
/// new value.
#[derive(Debug, Clone)]
pub(crate) struct FeedbackChanges {
    pub context: RoundContext,
    pub feedback: Feedback,
    pub overall_rating: Option<Option<u8>>,
    pub technical_skill: Option<Option<u8>>,
    pub communication: Option<Option<u8>>,
    pub problem_solving: Option<Option<u8>>,
    pub overall_feedback: Option<Option<String>>,
    pub recommendation: Option<Recommendation>,
}

pub(crate) fn validate_feedback_edit<S>(
    store: &S,
    actor: &Actor,
    round_id: RoundId,
    patch: &Patch,
) -> Checked<FeedbackChanges>
where
    S: EntityStore + ?Sized,
{
    let mut validation = Validation::new();
    reject_foreign_keys(patch, FEEDBACK_EDIT_KEYS, &mut validation);
    let (context, mut validation) = load_round_context(store, actor, round_id, validation)?;

    let feedback_id = match context.round.feedback_id {
        Some(id) => id,
        None => return Err(validation.block(messages::NO_FEEDBACK_FOR_ROUND)),
    };
    let feedback = match store.feedback(feedback_id)? {
        Some(feedback) => feedback,
        None => return Err(validation.block(messages::FEEDBACK_NOT_FOUND)),
    };

    let required = context.configuration.feedback;
    let rating_change = |field: &str, label: &str, is_required: bool, validation: &mut Validation| {
        match patch.field::<i64>(field) {
            Ok(FieldValue::Absent) => None,
            Ok(FieldValue::Null) if is_required => {
                validation.fail(field, messages::field_required(label));
                None
            }
            Ok(FieldValue::Null) => Some(None),
            Ok(FieldValue::Present(value)) => match rating(value) {
                Some(value) => Some(Some(value)),
                None => {
                    validation.fail(field, messages::INVALID_RATING);
                    None
                }
            },
            Err(_) => {
                validation.fail(field, messages::INVALID_RATING);
                None
            }
        }
    };

    let overall_rating = rating_change(
        "overallRating",
        "Overall Rating",
        required.overall_rating_required,
        &mut validation,
    );
    let technical_skill = rating_change(
        "technicalSkill",
        "Technical Skill",
        required.technical_skill_required,
        &mut validation,
    );
    let communication = rating_change(
        "communication",
        "Communication",
        required.communication_required,
        &mut validation,
    );
    let problem_solving = rating_change(
        "problemSolving",
        "Problem Solving",
        required.problem_solving_required,
        &mut validation,
    );

    let recommendation = match patch.field::<String>("recommendation") {
        Ok(FieldValue::Absent) => None,
        Ok(FieldValue::Present(value)) => match parse_recommendation(&value) {
            Some(Recommendation::NA) if required.recommendation_required => {
                validation.fail("recommendation", messages::field_required("Recommendation"));
                None
            }
            Some(recommendation) => Some(recommendation),
            None => {
                validation.fail("recommendation", messages::INVALID_RECOMMENDATION);
                None
            }
        },
        Ok(FieldValue::Null) | Err(_) => {
            validation.fail("recommendation", messages::INVALID_RECOMMENDATION);
            None
        }
    };

    let overall_feedback = match patch.field::<String>("overallFeedback") {
        Ok(FieldValue::Absent) => None,
        Ok(FieldValue::Present(text)) if !text.trim().is_empty() => {
            Some(Some(text.trim().to_string()))
        }
        Ok(FieldValue::Present(_)) | Ok(FieldValue::Null) => {
            if required.overall_feedback_required {
                validation.fail("overallFeedback", messages::field_required("Overall Feedback"));
                None
            } else {
                Some(None)
            }
        }
        Err(_) => {
            validation.fail("overallFeedback", messages::INVALID_VALUE);
            None
        }
    };

    validation.finish()?;
    Ok(FeedbackChanges {
        context,
        feedback,
        overall_rating,
        technical_skill,
        communication,
        problem_solving,
        overall_feedback,
        recommendation,
    })
}

fn rating(value: i64) -> Option<u8> {
    u8::try_from(value).ok().filter(|rating| (1..=5).contains(rating))
}

/// Blank counts as "no recommendation".
fn parse_recommendation(value: &str) -> Option<Recommendation> {
    let value = value.trim();
    if value.is_empty() {
        return Some(Recommendation::NA);
    }
    [
        Recommendation::NA,
        Recommendation::NoHire,
        Recommendation::Maybe,
        Recommendation::Hire,
    ]
    .into_iter()
    .find(|candidate| candidate.label().eq_ignore_ascii_case(value))
}

