use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    Actor, CandidateId, CandidateSelection, DriveId, FeedbackId, InterviewerChange, NewDrive,
    NewFeedback, NewMember, RoundId, UserId, UserRole,
};
use super::patch::Patch;
use super::projections::{DriveCandidateFilter, DriveFilter, DriveMemberFilter, RoundFilter};
use super::repository::{EntityStore, NotificationPublisher};
use super::service::{CommandOutcome, DriveWorkflowError, DriveWorkflowService};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

type SharedService<S, N> = Arc<DriveWorkflowService<S, N>>;

/// Router builder exposing the drive commands and queries.
pub fn drive_router<S, N>(service: SharedService<S, N>) -> Router
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/drives",
            post(create_drive::<S, N>).get(list_drives::<S, N>),
        )
        .route(
            "/api/v1/drives/:drive_id",
            get(get_drive::<S, N>).patch(edit_drive::<S, N>),
        )
        .route(
            "/api/v1/drives/:drive_id/config",
            get(get_configuration::<S, N>).patch(edit_configuration::<S, N>),
        )
        .route("/api/v1/drives/:drive_id/members", post(add_member::<S, N>))
        .route(
            "/api/v1/drives/:drive_id/members/:user_id",
            delete(remove_member::<S, N>),
        )
        .route(
            "/api/v1/drives/:drive_id/candidates",
            post(add_candidates::<S, N>),
        )
        .route(
            "/api/v1/drives/:drive_id/candidates/remove",
            post(remove_candidates::<S, N>),
        )
        .route(
            "/api/v1/drives/:drive_id/candidates/:candidate_id",
            patch(edit_drive_candidate::<S, N>),
        )
        .route(
            "/api/v1/drives/:drive_id/candidates/:candidate_id/attendance",
            post(mark_attendance::<S, N>),
        )
        .route(
            "/api/v1/drives/:drive_id/panel/auto-assign",
            post(auto_assign::<S, N>),
        )
        .route("/api/v1/drive-members", get(list_members::<S, N>))
        .route("/api/v1/drive-candidates", get(list_candidates::<S, N>))
        .route(
            "/api/v1/panel/candidates",
            get(list_assigned_candidates::<S, N>),
        )
        .route("/api/v1/rounds", get(list_rounds::<S, N>))
        .route(
            "/api/v1/rounds/:round_id",
            get(get_round::<S, N>).patch(edit_round::<S, N>),
        )
        .route(
            "/api/v1/rounds/:round_id/interviewer",
            put(reassign_interviewer::<S, N>),
        )
        .route(
            "/api/v1/rounds/:round_id/reassignments",
            get(list_reassignments::<S, N>),
        )
        .route(
            "/api/v1/rounds/:round_id/feedback",
            post(add_feedback::<S, N>).patch(edit_feedback::<S, N>),
        )
        .route("/api/v1/feedback/:feedback_id", get(get_feedback::<S, N>))
        .with_state(service)
}

/// Calling user, taken from the identity headers set by the upstream gateway.
#[derive(Debug, Clone, Copy)]
pub struct RequestActor(pub Actor);

#[axum::async_trait]
impl<T> FromRequestParts<T> for RequestActor
where
    T: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &T) -> Result<Self, Self::Rejection> {
        let user_id =
            header(parts, USER_ID_HEADER).and_then(|value| value.parse::<i64>().ok());
        let role = header(parts, USER_ROLE_HEADER).and_then(UserRole::parse);

        match (user_id, role) {
            (Some(user_id), Some(role)) => Ok(RequestActor(Actor::new(UserId(user_id), role))),
            _ => {
                let payload = json!({
                    "error": "x-user-id and x-user-role headers are required",
                });
                Err((StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response())
            }
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    pub attendance_status: String,
}

fn respond<T: Serialize>(
    success: StatusCode,
    result: Result<CommandOutcome<T>, DriveWorkflowError>,
) -> Response {
    match result {
        Ok(outcome) => (success, axum::Json(outcome)).into_response(),
        Err(error) => failure(error),
    }
}

fn respond_query<T: Serialize>(result: Result<T, DriveWorkflowError>) -> Response {
    respond(StatusCode::OK, result.map(CommandOutcome::new))
}

fn failure(error: DriveWorkflowError) -> Response {
    match error {
        DriveWorkflowError::Rejected(rejection) => {
            let payload = json!({
                "errors": rejection.failures,
                "warnings": Vec::<String>::new(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn create_drive<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    axum::Json(request): axum::Json<NewDrive>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(StatusCode::CREATED, service.create_drive(&actor, request))
}

pub(crate) async fn list_drives<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(_actor): RequestActor,
    Query(filter): Query<DriveFilter>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.list_drives(&filter))
}

pub(crate) async fn get_drive<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(_actor): RequestActor,
    Path(drive_id): Path<i64>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.get_drive(DriveId(drive_id)))
}

pub(crate) async fn edit_drive<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(drive_id): Path<i64>,
    axum::Json(patch): axum::Json<Patch>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.edit_drive(&actor, DriveId(drive_id), &patch),
    )
}

pub(crate) async fn get_configuration<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(_actor): RequestActor,
    Path(drive_id): Path<i64>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.get_drive_configuration(DriveId(drive_id)))
}

pub(crate) async fn edit_configuration<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(drive_id): Path<i64>,
    axum::Json(patch): axum::Json<Patch>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.edit_drive_configuration(&actor, DriveId(drive_id), &patch),
    )
}

pub(crate) async fn add_member<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(drive_id): Path<i64>,
    axum::Json(request): axum::Json<NewMember>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_member(&actor, DriveId(drive_id), request),
    )
}

pub(crate) async fn remove_member<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path((drive_id, user_id)): Path<(i64, i64)>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.remove_member(&actor, DriveId(drive_id), UserId(user_id)),
    )
}

pub(crate) async fn add_candidates<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(drive_id): Path<i64>,
    axum::Json(request): axum::Json<CandidateSelection>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_candidates(&actor, DriveId(drive_id), request),
    )
}

pub(crate) async fn remove_candidates<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(drive_id): Path<i64>,
    axum::Json(request): axum::Json<CandidateSelection>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.remove_candidates(&actor, DriveId(drive_id), request),
    )
}

pub(crate) async fn edit_drive_candidate<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path((drive_id, candidate_id)): Path<(i64, i64)>,
    axum::Json(patch): axum::Json<Patch>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.edit_drive_candidate(
            &actor,
            DriveId(drive_id),
            CandidateId(candidate_id),
            &patch,
        ),
    )
}

pub(crate) async fn mark_attendance<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path((drive_id, candidate_id)): Path<(i64, i64)>,
    axum::Json(request): axum::Json<AttendanceRequest>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.mark_attendance(
            &actor,
            DriveId(drive_id),
            CandidateId(candidate_id),
            &request.attendance_status,
        ),
    )
}

pub(crate) async fn auto_assign<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(drive_id): Path<i64>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::CREATED,
        service.auto_assign_panel(&actor, DriveId(drive_id)),
    )
}

pub(crate) async fn list_members<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(_actor): RequestActor,
    Query(filter): Query<DriveMemberFilter>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.list_drive_members(&filter))
}

pub(crate) async fn list_candidates<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(_actor): RequestActor,
    Query(filter): Query<DriveCandidateFilter>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.list_drive_candidates(&filter))
}

pub(crate) async fn list_assigned_candidates<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.assigned_candidates(&actor))
}

pub(crate) async fn list_rounds<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(_actor): RequestActor,
    Query(filter): Query<RoundFilter>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.list_rounds(&filter))
}

pub(crate) async fn get_round<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(_actor): RequestActor,
    Path(round_id): Path<i64>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.get_round(RoundId(round_id)))
}

pub(crate) async fn edit_round<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(round_id): Path<i64>,
    axum::Json(patch): axum::Json<Patch>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.edit_round(&actor, RoundId(round_id), &patch),
    )
}

pub(crate) async fn reassign_interviewer<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(round_id): Path<i64>,
    axum::Json(change): axum::Json<InterviewerChange>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.reassign_interviewer(&actor, RoundId(round_id), change),
    )
}

pub(crate) async fn list_reassignments<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(_actor): RequestActor,
    Path(round_id): Path<i64>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.reassignments(RoundId(round_id)))
}

pub(crate) async fn add_feedback<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(round_id): Path<i64>,
    axum::Json(form): axum::Json<NewFeedback>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_feedback(&actor, RoundId(round_id), form),
    )
}

pub(crate) async fn edit_feedback<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(actor): RequestActor,
    Path(round_id): Path<i64>,
    axum::Json(patch): axum::Json<Patch>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.edit_feedback(&actor, RoundId(round_id), &patch),
    )
}

pub(crate) async fn get_feedback<S, N>(
    State(service): State<SharedService<S, N>>,
    RequestActor(_actor): RequestActor,
    Path(feedback_id): Path<i64>,
) -> Response
where
    S: EntityStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond_query(service.get_feedback(FeedbackId(feedback_id)))
}
