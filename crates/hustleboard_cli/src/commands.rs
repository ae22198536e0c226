//! Subcommand handlers.
//!
//! Output is `key=value` lines for single values and one JSON document per
//! line for records, so results stay greppable.

use crate::{Command, FeedbackCommand, MeetingCommand, RegisterArgs, TaskCommand};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use hustleboard_core::{
    core_version, format_timestamp, parse_timestamp, ping, scan_deadlines, start_for_session,
    weekly_summary, Alert, AlertBoard, CoreConfig, DesktopNotifier, FieldQuery, KeyValueStorage,
    ListOptions, LocalStore, LogNotifier, Record, RegisterRequest, SessionService, SessionUser,
    SortSpec, TaskStatus, UserRole,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct App {
    session: SessionService,
}

impl App {
    pub(crate) fn new(storage: Arc<dyn KeyValueStorage>, config: CoreConfig) -> Self {
        Self {
            session: SessionService::new(storage, config),
        }
    }

    pub(crate) async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Ping => println!("hustleboard_core ping={}", ping()),
            Command::Version => println!("hustleboard_core version={}", core_version()),
            Command::Register(args) => self.register(args).await?,
            Command::Login { email, password } => {
                let user = self.session.login(&email, &password).await?;
                print_user(&user)?;
            }
            Command::Guest => {
                let user = self.session.login_as_guest().await?;
                print_user(&user)?;
            }
            Command::Logout => {
                self.session.logout()?;
                println!("status=logged_out");
            }
            Command::Whoami => match self.session.current_user()? {
                Some(user) => print_user(&user)?,
                None => println!("status=anonymous"),
            },
            Command::Task(command) => self.task(command).await?,
            Command::Meeting(command) => self.meeting(command).await?,
            Command::Feedback(command) => self.feedback(command).await?,
            Command::Scan => self.scan().await?,
            Command::Watch { interval_secs } => self.watch(interval_secs).await?,
            Command::Timesheet => self.timesheet().await?,
        }
        Ok(())
    }

    async fn register(&self, args: RegisterArgs) -> Result<()> {
        let role = args
            .role
            .map(|role| serde_json::from_value::<UserRole>(Value::String(role)))
            .transpose()
            .context("invalid role")?;
        let user = self
            .session
            .register(RegisterRequest {
                email: args.email,
                password: args.password,
                full_name: args.name,
                role,
                invite_code: args.invite,
            })
            .await?;
        print_user(&user)
    }

    async fn task(&self, command: TaskCommand) -> Result<()> {
        let tasks = self.store()?.tasks();
        match command {
            TaskCommand::Add {
                title,
                due,
                assign,
                priority,
            } => {
                let due_date = due.as_deref().map(normalize_timestamp).transpose()?;
                let record = tasks
                    .create(json!({
                        "title": title,
                        "description": "",
                        "status": TaskStatus::Todo.as_str(),
                        "priority": priority,
                        "assigned_to": assign,
                        "due_date": due_date,
                    }))
                    .await?;
                print_record(&record)?;
            }
            TaskCommand::List {
                status,
                sort,
                limit,
            } => {
                let mut options = ListOptions::default();
                if let Some(sort) = sort.as_deref() {
                    options.sort = Some(SortSpec::parse(sort).context("empty sort field")?);
                }
                options.limit = limit;
                let records = match status {
                    Some(status) => {
                        tasks
                            .filter(&FieldQuery::new().eq("status", status), &options)
                            .await?
                    }
                    None => tasks.list(&options).await?,
                };
                print_records(&records)?;
            }
            TaskCommand::Done { id } => {
                let record = tasks
                    .update(&id, json!({ "status": TaskStatus::Completed.as_str() }))
                    .await?;
                print_record(&record)?;
            }
            TaskCommand::Move { id, status } => {
                let record = tasks.update(&id, json!({ "status": status })).await?;
                print_record(&record)?;
            }
            TaskCommand::Rm { id } => {
                tasks.delete(&id).await?;
                print_deleted(&id);
            }
        }
        Ok(())
    }

    async fn meeting(&self, command: MeetingCommand) -> Result<()> {
        let meetings = self.store()?.meetings();
        match command {
            MeetingCommand::Add {
                title,
                at,
                attendees,
                duration,
            } => {
                let record = meetings
                    .create(json!({
                        "title": title,
                        "description": "",
                        "scheduled_date": normalize_timestamp(&at)?,
                        "duration_minutes": duration,
                        "attendees": attendees,
                        "meeting_type": "team",
                        "status": "scheduled",
                    }))
                    .await?;
                print_record(&record)?;
            }
            MeetingCommand::List => {
                let options = ListOptions::sorted_by(SortSpec::ascending("scheduled_date"));
                print_records(&meetings.list(&options).await?)?;
            }
            MeetingCommand::Rm { id } => {
                meetings.delete(&id).await?;
                print_deleted(&id);
            }
        }
        Ok(())
    }

    async fn feedback(&self, command: FeedbackCommand) -> Result<()> {
        let feedback = self.store()?.feedback();
        match command {
            FeedbackCommand::Add {
                to,
                rating,
                content,
                task,
            } => {
                let author = self.require_user()?;
                let record = feedback
                    .create(json!({
                        "target_user": to,
                        "task_id": task,
                        "rating": rating,
                        "content": content,
                        "visibility": "private",
                        "created_by": author.email,
                    }))
                    .await?;
                print_record(&record)?;
            }
            FeedbackCommand::List => {
                let options = ListOptions::sorted_by(SortSpec::descending("created_at"));
                print_records(&feedback.list(&options).await?)?;
            }
        }
        Ok(())
    }

    async fn scan(&self) -> Result<()> {
        let user = self.require_user()?;
        let store = self.store()?;
        let (tasks_store, meetings_store) = (store.tasks(), store.meetings());
        let no_sort = ListOptions::default();
        let (tasks, meetings) =
            tokio::join!(tasks_store.list(&no_sort), meetings_store.list(&no_sort));
        let report = scan_deadlines(&tasks?, &meetings?, &user, Utc::now());
        print_alerts(&report.alerts)?;
        for notice in &report.desktop_notices {
            println!("notice title={:?} body={:?}", notice.title, notice.body);
        }
        Ok(())
    }

    async fn watch(&self, interval_secs: Option<u64>) -> Result<()> {
        let interval = interval_secs
            .map(Duration::from_secs)
            .unwrap_or(self.session.config().scan_interval);
        let board = Arc::new(AlertBoard::new());
        let notifier: Arc<dyn DesktopNotifier> = Arc::new(LogNotifier);
        let handle = start_for_session(
            self.store()?,
            self.session.current_user()?,
            Arc::clone(&board),
            notifier,
            interval,
        )?
        .context("log in before watching deadlines")?;

        let mut printed = 0;
        let mut refresh = tokio::time::interval(Duration::from_secs(1));
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                _ = refresh.tick() => {
                    let snapshot = board.snapshot();
                    if snapshot.scans_completed > printed {
                        printed = snapshot.scans_completed;
                        println!("scan={printed} alerts={}", snapshot.alerts.len());
                        print_alerts(&snapshot.alerts)?;
                        board.mark_read();
                    }
                }
            }
        }
        handle.stop().await;
        println!("status=stopped");
        Ok(())
    }

    async fn timesheet(&self) -> Result<()> {
        let user = self.require_user()?;
        let store = self.store()?;
        let (tasks_store, feedback_store) = (store.tasks(), store.feedback());
        let no_sort = ListOptions::default();
        let (tasks, feedback) =
            tokio::join!(tasks_store.list(&no_sort), feedback_store.list(&no_sort));
        let summary = weekly_summary(&tasks?, &feedback?, &user, Utc::now());
        println!("{}", serde_json::to_string(&summary)?);
        Ok(())
    }

    fn store(&self) -> Result<LocalStore> {
        Ok(self.session.store()?)
    }

    fn require_user(&self) -> Result<SessionUser> {
        match self.session.current_user()? {
            Some(user) => Ok(user),
            None => bail!("no active session; run `hustleboard login` first"),
        }
    }
}

/// Accepts any parseable timestamp and stores it in canonical form.
fn normalize_timestamp(value: &str) -> Result<String> {
    parse_timestamp(value)
        .map(format_timestamp)
        .with_context(|| format!("unrecognized timestamp `{value}`"))
}

fn print_deleted(id: &str) {
    println!("status=deleted id={id}");
}

fn print_user(user: &SessionUser) -> Result<()> {
    println!("{}", serde_json::to_string(user)?);
    Ok(())
}

fn print_record(record: &Record) -> Result<()> {
    println!("{}", serde_json::to_string(record)?);
    Ok(())
}

fn print_records(records: &[Record]) -> Result<()> {
    for record in records {
        print_record(record)?;
    }
    println!("count={}", records.len());
    Ok(())
}

fn print_alerts(alerts: &[Alert]) -> Result<()> {
    for alert in alerts {
        println!("{}", serde_json::to_string(alert)?);
    }
    Ok(())
}
