//! Command handlers.
//!
//! Commands that show a page go through the navigator first, so a signed-out
//! or non-admin user is turned away the same way the web front-end would.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, warn};

use punchcard_core::api::ApiError;
use punchcard_core::auth::CredentialStore;
use punchcard_core::models::{Credentials, ListQuery, PasswordChange, ProfileUpdate, Registration, Resource};
use punchcard_core::router::{resolve, routes, HOME_PATH, LOGIN_PATH};
use punchcard_core::{AppContext, Config, StoreError};

use crate::cli::{
    AdminCommand, AttendanceCommand, Command, DiaryCommand, ExpenseCommand, LeaveCommand,
    OutingCommand, RegisterArgs, ScheduleCommand,
};
use crate::output;

/// How long to wait for the session watcher after a 401
const SETTLE_TIMEOUT: Duration = Duration::from_secs(1);
const SETTLE_POLL: Duration = Duration::from_millis(10);

pub async fn run(command: Command, ctx: &AppContext, config: &Config) -> Result<()> {
    match command {
        Command::Login {
            username,
            remember,
            forget,
        } => login(ctx, config, username, remember, forget).await,
        Command::Logout => {
            ctx.store().logout()?;
            println!("Signed out");
            Ok(())
        }
        Command::Register(args) => register(ctx, args).await,
        Command::Whoami => {
            match ctx.store().current_user() {
                Some(user) => output::print_user(&user),
                None => println!("Not signed in"),
            }
            Ok(())
        }
        Command::Profile {
            real_name,
            phone,
            email,
        } => profile(ctx, ProfileUpdate { real_name, phone, email }).await,
        Command::Password => change_password(ctx).await,
        Command::Status => {
            let nav = ctx.navigate(HOME_PATH)?;
            output::print_session(&ctx.store().snapshot(), Some(&nav.location));
            Ok(())
        }
        Command::Dashboard => dashboard(ctx).await,
        Command::Routes => {
            output::print_routes(routes());
            Ok(())
        }
        Command::Open { path } => {
            let nav = ctx.navigate(&path)?;
            output::print_navigation(&nav);
            Ok(())
        }
        Command::Health => output::print_json(&ctx.api().health().await?),
        Command::Attendance(cmd) => attendance(ctx, cmd).await,
        Command::Leave(cmd) => leave(ctx, cmd).await,
        Command::Expense(cmd) => expense(ctx, cmd).await,
        Command::Diary(cmd) => diary(ctx, cmd).await,
        Command::Outing(cmd) => outing(ctx, cmd).await,
        Command::Schedule(cmd) => schedule(ctx, cmd).await,
        Command::Admin(cmd) => admin(ctx, cmd).await,
    }
}

// ============================================================================
// Navigation and failures
// ============================================================================

/// Navigate to `path`, failing when the guard sends the user elsewhere
fn enter(ctx: &AppContext, path: &str) -> Result<()> {
    let nav = ctx.navigate(path)?;
    if !nav.redirected {
        return Ok(());
    }
    debug!(requested = %nav.requested, location = %nav.location, "Page refused");
    if nav.location == LOGIN_PATH {
        bail!("Not signed in. Run `punchcard login` first.");
    }
    if resolve(&nav.requested).is_some_and(|route| route.name.is_entry_page()) {
        bail!("Already signed in. Run `punchcard logout` first.");
    }
    bail!("{} requires administrator access", nav.requested)
}

/// Report a failed session action with the message the store recorded
fn action_failed(ctx: &AppContext, err: StoreError) -> anyhow::Error {
    if matches!(err, StoreError::Superseded) {
        return err.into();
    }
    match ctx.store().error() {
        Some(message) => anyhow::Error::from(err).context(message),
        None => err.into(),
    }
}

/// Whether the failure came from a 401 response
pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_unauthorized)
            || cause
                .downcast_ref::<StoreError>()
                .and_then(StoreError::api)
                .is_some_and(ApiError::is_unauthorized)
    })
}

/// Whether a 401 ended a session that existed before the command ran
fn session_expired(was_signed_in: bool, signed_in_now: bool, location: Option<&str>) -> bool {
    was_signed_in && !signed_in_now && location == Some(LOGIN_PATH)
}

/// Give the session watcher time to drop rejected credentials before exit
pub async fn settle_session(ctx: &AppContext, was_signed_in: bool) {
    // A rejected sign-in has no session to wait for
    if !was_signed_in {
        return;
    }
    let signed_out = async {
        while ctx.store().is_authenticated() {
            tokio::time::sleep(SETTLE_POLL).await;
        }
    };
    if tokio::time::timeout(SETTLE_TIMEOUT, signed_out).await.is_err() {
        warn!("Session still present after unauthorized response");
        return;
    }
    let location = ctx.navigator().current();
    if session_expired(was_signed_in, ctx.store().is_authenticated(), location.as_deref()) {
        eprintln!("Session expired. Run `punchcard login` to sign in again.");
    }
}

// ============================================================================
// Account
// ============================================================================

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_new_password() -> Result<String> {
    let password = rpassword::prompt_password("New password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        bail!("Passwords do not match");
    }
    Ok(password)
}

async fn login(
    ctx: &AppContext,
    config: &Config,
    username: Option<String>,
    remember: bool,
    forget: bool,
) -> Result<()> {
    let username = match username.or_else(|| config.last_username.clone()) {
        Some(username) => username,
        None => prompt("Username: ")?,
    };
    if username.is_empty() {
        bail!("Username is required");
    }

    if forget {
        CredentialStore::delete(&username)?;
    }
    let remembered = if forget {
        None
    } else {
        CredentialStore::get_password(&username).unwrap_or_else(|e| {
            warn!(error = %e, "Keychain unavailable");
            None
        })
    };
    let used_remembered = remembered.is_some();
    let password = match remembered {
        Some(password) => password,
        None => rpassword::prompt_password(format!("Password for {}: ", username))?,
    };

    let response = match ctx.store().login(&Credentials::new(&username, &password)).await {
        Ok(response) => response,
        Err(e) => {
            if used_remembered {
                eprintln!("Remembered password was used; pass --forget to enter a new one.");
            }
            return Err(action_failed(ctx, e));
        }
    };

    if remember {
        CredentialStore::store(&username, &password)?;
    }
    remember_username(&username);

    let nav = ctx.navigate(HOME_PATH)?;
    println!(
        "Signed in as {} ({})",
        response.user.display_name(),
        response.user.role()
    );
    debug!(location = %nav.location, "Landed after sign-in");
    Ok(())
}

/// Record the last username in the config file, leaving env overrides out
fn remember_username(username: &str) {
    let result = Config::path().and_then(|path| {
        let mut stored = Config::load_from(&path)?;
        stored.last_username = Some(username.to_string());
        stored.save_to(&path)
    });
    if let Err(e) = result {
        warn!(error = %e, "Failed to save last username");
    }
}

async fn register(ctx: &AppContext, args: RegisterArgs) -> Result<()> {
    enter(ctx, "/register")?;
    let registration = Registration {
        username: args.username,
        email: args.email,
        password: prompt_new_password()?,
        real_name: args.real_name,
        employee_id: args.employee_id,
        department: args.department,
        position: args.position,
        phone: args.phone,
    };

    let response = ctx
        .store()
        .register(&registration)
        .await
        .map_err(|e| action_failed(ctx, e))?;
    println!(
        "{}",
        response.message.as_deref().unwrap_or("Registration complete")
    );
    println!("Sign in with `punchcard login {}`", registration.username);
    Ok(())
}

async fn profile(ctx: &AppContext, update: ProfileUpdate) -> Result<()> {
    enter(ctx, "/profile")?;
    if update.is_empty() {
        let response = ctx.store().fetch_profile().await?;
        output::print_user(&response.user);
        return Ok(());
    }

    ctx.store()
        .update_profile(&update)
        .await
        .map_err(|e| action_failed(ctx, e))?;
    let user = ctx
        .store()
        .current_user()
        .ok_or_else(|| anyhow!("Signed out while updating the profile"))?;
    output::print_user(&user);
    Ok(())
}

async fn change_password(ctx: &AppContext) -> Result<()> {
    enter(ctx, "/profile")?;
    let change = PasswordChange {
        current_password: rpassword::prompt_password("Current password: ")?,
        new_password: prompt_new_password()?,
    };
    ctx.store()
        .change_password(&change)
        .await
        .map_err(|e| action_failed(ctx, e))?;
    println!("Password changed");
    Ok(())
}

async fn dashboard(ctx: &AppContext) -> Result<()> {
    enter(ctx, HOME_PATH)?;
    let api = ctx.api();
    let attendance_api = api.attendance();
    let diary_api = api.diary();
    let schedule_api = api.schedule();
    let outing_api = api.outing();
    let (attendance, diary, schedule, outing) = futures::try_join!(
        attendance_api.today(),
        diary_api.today(),
        schedule_api.today(),
        outing_api.current()
    )
    .context("Failed to load the dashboard")?;

    if let Some(user) = ctx.store().current_user() {
        println!("{}", user.display_name());
    }
    println!("{}", output::attendance_line(&attendance));
    println!("{}", output::schedule_line(&schedule));
    println!("{}", output::diary_line(&diary));
    println!("{}", output::outing_line(&outing));
    Ok(())
}

// ============================================================================
// Domains
// ============================================================================

async fn attendance(ctx: &AppContext, cmd: AttendanceCommand) -> Result<()> {
    let api = ctx.api().attendance();
    let result = match cmd {
        AttendanceCommand::ClockIn => {
            enter(ctx, "/attendance")?;
            api.clock_in().await?
        }
        AttendanceCommand::ClockOut => {
            enter(ctx, "/attendance")?;
            api.clock_out().await?
        }
        AttendanceCommand::Today => {
            enter(ctx, "/attendance")?;
            let today = api.today().await?;
            println!("{}", output::attendance_line(&today));
            return Ok(());
        }
        AttendanceCommand::History(query) => {
            enter(ctx, "/attendance/history")?;
            api.history(&ListQuery::from(query)).await?
        }
        AttendanceCommand::Statistics(query) => {
            enter(ctx, "/attendance/history")?;
            api.statistics(&ListQuery::from(query)).await?
        }
    };
    output::print_json(&result)
}

async fn leave(ctx: &AppContext, cmd: LeaveCommand) -> Result<()> {
    enter(ctx, "/leave")?;
    let api = ctx.api().leave();
    let result: Resource = match cmd {
        LeaveCommand::List(query) => api.list(&ListQuery::from(query)).await?,
        LeaveCommand::Create(body) => api.create(&body.data).await?,
        LeaveCommand::Get { id } => api.get(id).await?,
        LeaveCommand::Update { id, body } => api.update(id, &body.data).await?,
        LeaveCommand::Approve { id, body } => api.approve(id, &body.data).await?,
        LeaveCommand::Delete { id } => api.delete(id).await?,
        LeaveCommand::Types => api.types().await?,
    };
    output::print_json(&result)
}

async fn expense(ctx: &AppContext, cmd: ExpenseCommand) -> Result<()> {
    enter(ctx, "/expense")?;
    let api = ctx.api().expense();
    let result = match cmd {
        ExpenseCommand::List(query) => api.list(&ListQuery::from(query)).await?,
        ExpenseCommand::Create(body) => api.create(&body.data).await?,
        ExpenseCommand::Get { id } => api.get(id).await?,
        ExpenseCommand::Update { id, body } => api.update(id, &body.data).await?,
        ExpenseCommand::Approve { id, body } => api.approve(id, &body.data).await?,
        ExpenseCommand::Delete { id } => api.delete(id).await?,
        ExpenseCommand::Types => api.types().await?,
        ExpenseCommand::Statistics(query) => api.statistics(&ListQuery::from(query)).await?,
    };
    output::print_json(&result)
}

async fn diary(ctx: &AppContext, cmd: DiaryCommand) -> Result<()> {
    enter(ctx, "/diary")?;
    let api = ctx.api().diary();
    let result = match cmd {
        DiaryCommand::List(query) => api.list(&ListQuery::from(query)).await?,
        DiaryCommand::Create(body) => api.create(&body.data).await?,
        DiaryCommand::Get { id } => api.get(id).await?,
        DiaryCommand::Update { id, body } => api.update(id, &body.data).await?,
        DiaryCommand::Delete { id } => api.delete(id).await?,
        DiaryCommand::Today => {
            let today = api.today().await?;
            println!("{}", output::diary_line(&today));
            return Ok(());
        }
        DiaryCommand::Statistics(query) => api.statistics(&ListQuery::from(query)).await?,
    };
    output::print_json(&result)
}

async fn outing(ctx: &AppContext, cmd: OutingCommand) -> Result<()> {
    enter(ctx, "/outing")?;
    let api = ctx.api().outing();
    let result = match cmd {
        OutingCommand::List(query) => api.list(&ListQuery::from(query)).await?,
        OutingCommand::Create(body) => api.create(&body.data).await?,
        OutingCommand::Get { id } => api.get(id).await?,
        OutingCommand::Update { id, body } => api.update(id, &body.data).await?,
        OutingCommand::Approve { id, body } => api.approve(id, &body.data).await?,
        OutingCommand::Complete { id } => api.complete(id).await?,
        OutingCommand::Delete { id } => api.delete(id).await?,
        OutingCommand::Current => {
            let current = api.current().await?;
            println!("{}", output::outing_line(&current));
            return Ok(());
        }
    };
    output::print_json(&result)
}

async fn schedule(ctx: &AppContext, cmd: ScheduleCommand) -> Result<()> {
    enter(ctx, "/schedule")?;
    let api = ctx.api().schedule();
    let result = match cmd {
        ScheduleCommand::List(query) => api.list(&ListQuery::from(query)).await?,
        ScheduleCommand::Create(body) => api.create(&body.data).await?,
        ScheduleCommand::Get { id } => api.get(id).await?,
        ScheduleCommand::Update { id, body } => api.update(id, &body.data).await?,
        ScheduleCommand::Delete { id } => api.delete(id).await?,
        ScheduleCommand::Mine(query) => api.mine(&ListQuery::from(query)).await?,
        ScheduleCommand::Today => {
            let today = api.today().await?;
            println!("{}", output::schedule_line(&today));
            return Ok(());
        }
        ScheduleCommand::ShiftTypes => api.shift_types().await?,
        ScheduleCommand::Calendar(query) => api.calendar(&ListQuery::from(query)).await?,
    };
    output::print_json(&result)
}

async fn admin(ctx: &AppContext, cmd: AdminCommand) -> Result<()> {
    let api = ctx.api().admin();
    let result = match cmd {
        AdminCommand::Users(query) => {
            enter(ctx, "/admin/users")?;
            api.users(&ListQuery::from(query)).await?
        }
        AdminCommand::CreateUser(body) => {
            enter(ctx, "/admin/users")?;
            api.create_user(&body.data).await?
        }
        AdminCommand::UpdateUser { id, body } => {
            enter(ctx, "/admin/users")?;
            api.update_user(id, &body.data).await?
        }
        AdminCommand::DeleteUser { id } => {
            enter(ctx, "/admin/users")?;
            api.delete_user(id).await?
        }
        AdminCommand::Settings => {
            enter(ctx, "/admin/settings")?;
            api.settings().await?
        }
        AdminCommand::UpdateSettings(body) => {
            enter(ctx, "/admin/settings")?;
            api.update_settings(&body.data).await?
        }
        AdminCommand::Attendance(query) => {
            enter(ctx, "/admin/attendance")?;
            api.attendance_records(&ListQuery::from(query)).await?
        }
        AdminCommand::AttendanceStatistics(query) => {
            enter(ctx, "/admin/attendance")?;
            api.attendance_statistics(&ListQuery::from(query)).await?
        }
    };
    output::print_json(&result)
}
