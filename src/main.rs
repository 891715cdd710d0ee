use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labtrack::access;
use labtrack::api::test_results::ValidationDecision;
use labtrack::api::ApiClient;
use labtrack::config::Config;
use labtrack::error::ApiError;
use labtrack::lifecycle::{self, Action};
use labtrack::models::TestResultStatus;
use labtrack::notifier::NotificationPoller;
use labtrack::progress::Progress;
use labtrack::session::{Session, SessionStore};

#[derive(Parser)]
#[command(name = "labtrack", about = "Lab request management client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LABTRACK_PASSWORD")]
        password: String,
    },
    /// Drop the persisted session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Lab requests
    Requests {
        #[command(subcommand)]
        action: RequestsCmd,
    },
    /// In-progress requests for your department
    Worklist,
    /// Test results on a request
    Results {
        #[command(subcommand)]
        action: ResultsCmd,
    },
    /// Shipment tracking
    Logistics {
        #[command(subcommand)]
        action: LogisticsCmd,
    },
    /// Unread notifications
    Notifications {
        /// Keep polling and print count changes
        #[arg(long)]
        watch: bool,
    },
    /// Dashboard statistics
    Stats,
}

#[derive(Subcommand)]
enum RequestsCmd {
    /// List requests visible to you
    List,
    /// Show one request with items, progress and available actions
    Show { id: i64 },
    /// Submit a draft (for approval, or directly as company admin)
    Submit { id: i64 },
    /// Approve a pending request (company admin)
    Approve { id: i64 },
    /// Reject a pending request back to draft (company admin)
    Reject { id: i64 },
    /// Close a validated request (super admin)
    Close { id: i64 },
    /// Delete a draft you own
    Delete { id: i64 },
    /// Download the request PDF
    Pdf {
        id: i64,
        #[arg(long, default_value = "request.pdf")]
        out: std::path::PathBuf,
    },
}

#[derive(Subcommand)]
enum ResultsCmd {
    /// List test results of a request
    List { request_id: i64 },
    /// Record a result and mark the item completed
    Save {
        request_id: i64,
        test_type_id: i64,
        #[arg(long)]
        text: String,
    },
    /// Hand your department's finished work over for validation
    SubmitValidation { request_id: i64 },
    /// Accept or reject one result (super admin)
    Validate {
        result_id: i64,
        #[arg(long)]
        reject: bool,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand)]
enum LogisticsCmd {
    /// Requests currently in the shipment stages
    List,
    /// Advance a request to its next logistics status (scan)
    Advance { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labtrack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let store = SessionStore::new(&config.session_file);

    match run(cli.command, &config, &store).await {
        Ok(()) => Ok(()),
        Err(err) => {
            // a rejected token means the session is gone, mirror that locally
            if matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthenticated(_))) {
                let _ = store.clear();
            }
            Err(err)
        }
    }
}

async fn run(command: Command, config: &Config, store: &SessionStore) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let client = ApiClient::new(&config.api_url);
            let response = client.login(&email, &password).await?;
            let session = Session::new(response.token, response.user);
            store.save(&session)?;
            println!(
                "Logged in as {} ({})",
                session.user.name,
                session.user.role.as_str()
            );
            Ok(())
        }
        Command::Logout => {
            store.clear()?;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            let (session, client) = authed(config, store)?;
            // re-validate against the backend, the local mirror may be stale
            let user = client.me().await?;
            println!("{} <{}>", user.name, user.email);
            println!("role: {}", user.role.as_str());
            if let Some(company) = user.company_name.or(session.user.company_name) {
                println!("company: {}", company);
            }
            if let Some(department) = user.department_name.or(session.user.department_name) {
                println!("department: {}", department);
            }
            Ok(())
        }
        Command::Requests { action } => requests(action, config, store).await,
        Command::Worklist => {
            let (session, client) = authed(config, store)?;
            let worklist = client.my_worklist().await?;
            for request in &worklist {
                let progress =
                    Progress::over(&request.test_results, session.user.department_id);
                println!(
                    "#{:<6} {:<22} {:<20} {}",
                    request.id,
                    request.display_id(),
                    request.status.label(),
                    progress
                );
            }
            println!("{} request(s)", worklist.len());
            Ok(())
        }
        Command::Results { action } => results(action, config, store).await,
        Command::Logistics { action } => logistics(action, config, store).await,
        Command::Notifications { watch } => {
            let (_, client) = authed(config, store)?;
            let count = client.unread_notification_count().await?;
            println!("{} unread notification(s)", count);
            if watch {
                let poller = NotificationPoller::spawn(
                    client,
                    Duration::from_secs(config.poll_interval_secs),
                );
                let mut rx = poller.subscribe();
                println!("Watching (Ctrl-C to stop)...");
                loop {
                    tokio::select! {
                        changed = rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            println!("{} unread notification(s)", *rx.borrow());
                        }
                        _ = tokio::signal::ctrl_c() => break,
                    }
                }
                poller.shutdown().await;
            }
            Ok(())
        }
        Command::Stats => {
            let (_, client) = authed(config, store)?;
            let stats = client.dashboard_stats().await?;
            println!("total requests: {}", stats.total_requests);
            let mut by_status: Vec<_> = stats.by_status.iter().collect();
            by_status.sort();
            for (status, count) in by_status {
                println!("  {:<22} {}", status, count);
            }
            println!("total revenue: {:.0}", stats.total_revenue);
            Ok(())
        }
    }
}

async fn requests(
    action: RequestsCmd,
    config: &Config,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let (session, client) = authed(config, store)?;
    match action {
        RequestsCmd::List => {
            let requests = client.list_requests().await?;
            for request in &requests {
                let progress = Progress::over(&request.test_results, None);
                println!(
                    "#{:<6} {:<22} {:<20} {:<10} {}",
                    request.id,
                    request.display_id(),
                    request.status.label(),
                    request.urgency.as_str(),
                    progress
                );
            }
            println!("{} request(s)", requests.len());
            Ok(())
        }
        RequestsCmd::Show { id } => {
            let request = client.get_request(id).await?;
            println!("{} [{}]", request.display_id(), request.status.label());
            if let Some(description) = &request.sample_description {
                println!("sample: {}", description);
            }
            if let Some(company) = &request.company_name {
                println!("company: {}", company);
            }
            println!("urgency: {}", request.urgency.as_str());

            let items = access::visible_test_items(&session.user, &request);
            let scope = match session.user.role {
                labtrack::models::Role::LaborStaff => session.user.department_id,
                _ => None,
            };
            println!("progress: {}", Progress::over(&request.test_results, scope));
            for item in items {
                println!(
                    "  - {:<30} {:<12} {}",
                    item.test_type_name.as_deref().unwrap_or("?"),
                    item.status.as_str(),
                    item.department_name.as_deref().unwrap_or("")
                );
            }

            let actions = lifecycle::next_actions(&session.user, &request);
            if actions.is_empty() {
                println!("no actions available");
            } else {
                for action in actions {
                    println!("action: {}", action.label());
                }
            }
            Ok(())
        }
        RequestsCmd::Submit { id } => {
            transition(&client, &session, id, &[Action::SubmitForApproval, Action::Submit]).await
        }
        RequestsCmd::Approve { id } => transition(&client, &session, id, &[Action::Approve]).await,
        RequestsCmd::Reject { id } => transition(&client, &session, id, &[Action::Reject]).await,
        RequestsCmd::Close { id } => {
            let request = client.get_request(id).await?;
            let actions = lifecycle::next_actions(&session.user, &request);
            if !actions.contains(&Action::AcceptValidation) {
                bail!(ApiError::AuthorizationDenied(format!(
                    "closing is not available on request {} for your role",
                    id
                )));
            }
            client.complete_validation(id).await?;
            println!("Request {} closed", id);
            Ok(())
        }
        RequestsCmd::Delete { id } => {
            let request = client.get_request(id).await?;
            if !access::can_delete_request(&session.user, &request) {
                bail!(ApiError::AuthorizationDenied(format!(
                    "request {} cannot be deleted by your role",
                    id
                )));
            }
            client.delete_request(id).await?;
            println!("Request {} deleted", id);
            Ok(())
        }
        RequestsCmd::Pdf { id, out } => {
            let bytes = client.download_request_pdf(id).await?;
            tokio::fs::write(&out, bytes)
                .await
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Saved {}", out.display());
            Ok(())
        }
    }
}

async fn results(
    action: ResultsCmd,
    config: &Config,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let (session, client) = authed(config, store)?;
    match action {
        ResultsCmd::List { request_id } => {
            let results = client.list_test_results(request_id).await?;
            for item in &results {
                println!(
                    "#{:<6} {:<30} {:<12} {}",
                    item.id,
                    item.test_type_name.as_deref().unwrap_or("?"),
                    item.status.as_str(),
                    item.completed_by.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        ResultsCmd::Save {
            request_id,
            test_type_id,
            text,
        } => {
            let request = client.get_request(request_id).await?;
            let item = request
                .test_results
                .iter()
                .find(|tr| tr.test_type_id == test_type_id)
                .ok_or_else(|| {
                    ApiError::NotFound(format!(
                        "test type {} is not on request {}",
                        test_type_id, request_id
                    ))
                })?;
            if !access::can_edit_test_item(&session.user, &request, item) {
                bail!(ApiError::AuthorizationDenied(
                    "this test item belongs to another department".to_string()
                ));
            }
            client
                .save_test_result(request_id, test_type_id, &text, TestResultStatus::Completed)
                .await?;
            println!("Result saved");
            Ok(())
        }
        ResultsCmd::SubmitValidation { request_id } => {
            let request = client.get_request(request_id).await?;
            let actions = lifecycle::next_actions(&session.user, &request);
            if !actions.contains(&Action::SubmitForValidation) {
                bail!(ApiError::AuthorizationDenied(
                    "not every test item of your department is completed yet".to_string()
                ));
            }
            client.submit_for_validation(request_id).await?;
            println!("Request {} submitted for validation", request_id);
            Ok(())
        }
        ResultsCmd::Validate {
            result_id,
            reject,
            reason,
        } => {
            let decision = if reject {
                ValidationDecision::Reject
            } else {
                ValidationDecision::Approve
            };
            client
                .validate_test_result(result_id, decision, reason.as_deref())
                .await?;
            println!(
                "Result {} {}",
                result_id,
                if reject { "sent back for rework" } else { "accepted" }
            );
            Ok(())
        }
    }
}

async fn logistics(
    action: LogisticsCmd,
    config: &Config,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let (session, client) = authed(config, store)?;
    match action {
        LogisticsCmd::List => {
            let requests = client.list_requests().await?;
            let mut shown = 0;
            for request in &requests {
                if !request.status.is_logistics_stage() {
                    continue;
                }
                if !access::can_view(&session.user, request) {
                    continue;
                }
                println!(
                    "#{:<6} {:<22} {:<20} {}",
                    request.id,
                    request.display_id(),
                    request.status.label(),
                    request.shipping_address.as_deref().unwrap_or("")
                );
                shown += 1;
            }
            println!("{} request(s)", shown);
            Ok(())
        }
        LogisticsCmd::Advance { id } => {
            let request = client.get_request(id).await?;
            let actions = lifecycle::next_actions(&session.user, &request);
            let action = actions
                .iter()
                .find(|a| matches!(**a, Action::StartTransit | Action::ConfirmArrival))
                .copied()
                .ok_or_else(|| {
                    ApiError::AuthorizationDenied(format!(
                        "no logistics transition available on request {} ({})",
                        id,
                        request.status.label()
                    ))
                })?;
            client.logistics_update_status(id, &action.target()).await?;
            println!("Request {} is now {}", id, action.target().label());
            Ok(())
        }
    }
}

/// Load the persisted session and build a client carrying its token.
fn authed(config: &Config, store: &SessionStore) -> anyhow::Result<(Session, ApiClient)> {
    let session = store.require()?;
    let client = ApiClient::with_session(&config.api_url, &session);
    Ok((session, client))
}

/// Fetch, check the transition against the lifecycle table, persist it.
async fn transition(
    client: &ApiClient,
    session: &Session,
    id: i64,
    wanted: &[Action],
) -> anyhow::Result<()> {
    let request = client.get_request(id).await?;
    let offered = lifecycle::next_actions(&session.user, &request);
    let action = wanted
        .iter()
        .find(|a| offered.contains(*a))
        .copied()
        .ok_or_else(|| {
            ApiError::AuthorizationDenied(format!(
                "request {} ({}) offers no such action for your role",
                id,
                request.status.label()
            ))
        })?;
    client.update_request_status(id, &action.target()).await?;
    println!(
        "{}: request {} is now {}",
        action.label(),
        id,
        action.target().label()
    );
    Ok(())
}
