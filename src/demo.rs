use crate::infra::{
    demo_store, InMemoryNotificationPublisher, DEMO_ADMIN, DEMO_CANDIDATES, DEMO_HR,
    DEMO_MENTORS, DEMO_PANEL,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use drive_engine::config::WorkflowConfig;
use drive_engine::error::AppError;
use drive_engine::workflows::drive::{
    Actor, AutoAssignPolicy, CandidateSelection, DriveId, DriveWorkflowError,
    DriveWorkflowService, FixedClock, MemoryEntityStore, NewDrive, NewFeedback, NewMember,
    NotificationSettings, Patch, RoundView, UserRole,
};
use std::sync::Arc;

type DemoService = DriveWorkflowService<MemoryEntityStore, InMemoryNotificationPublisher>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date the drive is proposed on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Days between the proposal and the drive itself.
    #[arg(long, default_value_t = 3)]
    pub(crate) lead_days: i64,
    /// Name of the drive to create.
    #[arg(long, default_value = "Campus Hiring Spring")]
    pub(crate) drive_name: String,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        lead_days,
        drive_name,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let drive_date = today + chrono::Duration::days(lead_days.max(1));

    let store = Arc::new(demo_store());
    let outbox = Arc::new(InMemoryNotificationPublisher::default());
    let config = WorkflowConfig {
        auto_assign: AutoAssignPolicy::Once,
    };
    let planning = service_on(&store, &outbox, config, today);
    let admin = Actor::new(DEMO_ADMIN, UserRole::Admin);

    println!("Recruitment drive demo");
    println!("Proposed on {} for {}", today, drive_date);

    let drive = planning
        .create_drive(
            &admin,
            NewDrive {
                drive_name,
                drive_date,
                technical_rounds: 2,
                hr_ids: vec![DEMO_HR],
                panel_ids: DEMO_PANEL.to_vec(),
                mentor_ids: vec![DEMO_MENTORS[0]],
                hr_configuration: Default::default(),
                panel_configuration: Default::default(),
                mentor_configuration: Default::default(),
                panel_visibility_settings: Default::default(),
                notification_settings: NotificationSettings {
                    email_notification_enabled: true,
                },
                feedback_configuration: Default::default(),
            },
        )?
        .data;
    println!(
        "- Created drive {} '{}' ({:?})",
        drive.drive_id, drive.drive_name, drive.drive_status
    );

    planning.add_member(
        &admin,
        drive.drive_id,
        NewMember {
            user_id: DEMO_MENTORS[1],
            role: UserRole::Mentor,
        },
    )?;
    planning.add_candidates(
        &admin,
        drive.drive_id,
        CandidateSelection {
            candidate_ids: DEMO_CANDIDATES.to_vec(),
        },
    )?;
    println!("- Added a second mentor and {} candidates", DEMO_CANDIDATES.len());

    let early = planning.edit_drive(
        &admin,
        drive.drive_id,
        &Patch::new().with("driveStatus", "Started"),
    );
    report_rejection("Starting ahead of the drive date", early);

    let rounds = planning.auto_assign_panel(&admin, drive.drive_id)?.data;
    println!("\nPanel allocation");
    for round in &rounds {
        print_round(round);
    }

    let drive_day = service_on(&store, &outbox, config, drive_date);
    drive_day.edit_drive(
        &admin,
        drive.drive_id,
        &Patch::new().with("driveStatus", "Started"),
    )?;
    println!("\nDrive day {}: drive started", drive_date);

    run_first_round(&drive_day, drive.drive_id, &rounds)?;

    println!("\nCandidates");
    let filter = drive_engine::workflows::drive::DriveCandidateFilter {
        drive_id: Some(drive.drive_id),
        ..Default::default()
    };
    for candidate in drive_day.list_drive_candidates(&filter)? {
        println!(
            "- {} ({}): {:?}, attendance {}",
            candidate.full_name.as_deref().unwrap_or("unknown"),
            candidate.candidate_id,
            candidate.candidate_status,
            candidate.attendance_status.as_deref().unwrap_or("not marked")
        );
    }

    let events = outbox.events();
    if events.is_empty() {
        println!("\nNotifications: none dispatched");
    } else {
        println!("\nNotifications");
        for event in events {
            println!("- template={} -> {}", event.template, event.recipient);
        }
    }

    Ok(())
}

fn service_on(
    store: &Arc<MemoryEntityStore>,
    outbox: &Arc<InMemoryNotificationPublisher>,
    config: WorkflowConfig,
    today: NaiveDate,
) -> DemoService {
    DriveWorkflowService::with_clock(
        store.clone(),
        outbox.clone(),
        config,
        Arc::new(FixedClock::on(today)),
    )
}

fn run_first_round(
    service: &DemoService,
    drive_id: DriveId,
    rounds: &[RoundView],
) -> Result<(), AppError> {
    let Some(round) = rounds.first() else {
        println!("- No rounds to run");
        return Ok(());
    };
    let Some(interviewer) = round.interviewer_user_id else {
        println!("- Round {} has no interviewer on record", round.round_id);
        return Ok(());
    };
    let panel = Actor::new(interviewer, UserRole::Panel);

    if let Some(candidate_id) = round.candidate_id {
        service.mark_attendance(&panel, drive_id, candidate_id, "Present")?;
    }
    service.edit_round(
        &panel,
        round.round_id,
        &Patch::new().with("roundStatus", "OnProcess"),
    )?;

    let reviewed = service
        .add_feedback(
            &panel,
            round.round_id,
            NewFeedback {
                overall_rating: Some(4),
                technical_skill: Some(5),
                overall_feedback: Some("Strong fundamentals, clear communicator".to_string()),
                recommendation: "Hire".to_string(),
                ..NewFeedback::default()
            },
        )?
        .data;
    println!(
        "- Feedback recorded for round {}: result {:?}",
        reviewed.round_id, reviewed.round_result
    );

    let closed = service
        .edit_round(
            &panel,
            round.round_id,
            &Patch::new().with("roundStatus", "Completed"),
        )?
        .data;
    print_round(&closed);

    let repeat = service.add_feedback(
        &panel,
        round.round_id,
        NewFeedback {
            recommendation: "NoHire".to_string(),
            ..NewFeedback::default()
        },
    );
    report_rejection("Second feedback on the same round", repeat);
    Ok(())
}

fn print_round(round: &RoundView) {
    println!(
        "- Round {} {:?} for candidate {} with interviewer {}: {:?}/{:?}",
        round.round_id,
        round.round_type,
        round
            .candidate_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "?".to_string()),
        round
            .interviewer_user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "?".to_string()),
        round.round_status,
        round.round_result
    );
}

fn report_rejection<T>(label: &str, result: Result<T, DriveWorkflowError>) {
    match result {
        Ok(_) => println!("- {label}: unexpectedly accepted"),
        Err(err) => match err.rejection() {
            Some(rejection) => {
                println!("- {label}: rejected");
                for failure in &rejection.failures {
                    println!("    {}: {}", failure.field, failure.message);
                }
            }
            None => println!("- {label}: failed ({err})"),
        },
    }
}
