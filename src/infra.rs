use chrono::NaiveDate;
use drive_engine::workflows::drive::{
    Candidate, CandidateId, MemoryEntityStore, Notification, NotificationError,
    NotificationPublisher, RoleId, User, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Writes each notification to the log instead of handing it to a mail relay.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingNotificationPublisher;

impl NotificationPublisher for LoggingNotificationPublisher {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        check_recipient(&notification)?;
        info!(
            template = %notification.template,
            recipient = %notification.recipient,
            details = ?notification.details,
            "notification dispatched"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        check_recipient(&notification)?;
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotificationError::Transport("outbox mutex poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

fn check_recipient(notification: &Notification) -> Result<(), NotificationError> {
    let recipient = notification.recipient.trim();
    match recipient.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(NotificationError::InvalidRecipient(
            notification.recipient.clone(),
        )),
    }
}

pub(crate) const DEMO_ADMIN: UserId = UserId(1);
pub(crate) const DEMO_HR: UserId = UserId(2);
pub(crate) const DEMO_PANEL: [UserId; 2] = [UserId(3), UserId(4)];
pub(crate) const DEMO_MENTORS: [UserId; 2] = [UserId(5), UserId(6)];
pub(crate) const DEMO_CANDIDATES: [CandidateId; 3] =
    [CandidateId(101), CandidateId(102), CandidateId(103)];

/// Store with the standard roles plus a small staff and candidate directory.
pub(crate) fn demo_store() -> MemoryEntityStore {
    let store = MemoryEntityStore::with_standard_roles();
    let staff = [
        (DEMO_ADMIN, "Meera Iyer", RoleId(1)),
        (DEMO_HR, "Rahul Verma", RoleId(2)),
        (DEMO_PANEL[0], "Sana Qureshi", RoleId(3)),
        (DEMO_PANEL[1], "Vikram Rao", RoleId(3)),
        (DEMO_MENTORS[0], "Leela Pillai", RoleId(4)),
        (DEMO_MENTORS[1], "Nikhil Joshi", RoleId(4)),
    ];
    for (id, full_name, role_id) in staff {
        store.seed_user(User {
            id,
            full_name: full_name.to_string(),
            email: email_for(full_name),
            role_id,
            is_active: true,
        });
    }

    let candidates = ["Anita Bose", "Farhan Ali", "Divya Menon"];
    for (id, full_name) in DEMO_CANDIDATES.into_iter().zip(candidates) {
        store.seed_candidate(Candidate {
            id,
            full_name: full_name.to_string(),
            email: email_for(full_name),
        });
    }
    store
}

fn email_for(full_name: &str) -> String {
    format!(
        "{}@drives.example.com",
        full_name.to_ascii_lowercase().replace(' ', ".")
    )
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
