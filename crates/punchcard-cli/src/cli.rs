//! Command line definitions.

use clap::{Args, Parser, Subcommand};
use punchcard_core::models::{ListQuery, Resource};

#[derive(Parser, Debug)]
#[command(name = "punchcard", version, about = "Attendance and HR from the terminal")]
pub struct Cli {
    /// Backend base URL, e.g. http://localhost:5000/api
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and keep the session for later commands
    Login {
        username: Option<String>,
        /// Keep the password in the OS keychain
        #[arg(long)]
        remember: bool,
        /// Remove a remembered password before signing in
        #[arg(long, conflicts_with = "remember")]
        forget: bool,
    },
    /// Forget the stored session
    Logout,
    /// Create an account (does not sign in)
    Register(RegisterArgs),
    /// Show the signed-in user as stored locally
    Whoami,
    /// Show the profile, or update it when any field is given
    Profile {
        #[arg(long)]
        real_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change the account password
    Password,
    /// Session state and current location
    Status,
    /// Today's attendance, diary, schedule and outing
    Dashboard,
    /// List the route table
    Routes,
    /// Navigate to a page and report where the guard lands
    Open { path: String },
    /// Check that the backend is reachable
    Health,
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    #[command(subcommand)]
    Leave(LeaveCommand),
    #[command(subcommand)]
    Expense(ExpenseCommand),
    #[command(subcommand)]
    Diary(DiaryCommand),
    #[command(subcommand)]
    Outing(OutingCommand),
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub real_name: String,
    #[arg(long)]
    pub employee_id: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

/// Filters shared by every list endpoint
#[derive(Args, Debug, Default, Clone)]
pub struct QueryArgs {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub per_page: Option<u32>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub start_date: Option<String>,
    #[arg(long)]
    pub end_date: Option<String>,
    #[arg(long)]
    pub user_id: Option<i64>,
    /// Month as YYYY-MM
    #[arg(long)]
    pub month: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
}

impl From<QueryArgs> for ListQuery {
    fn from(args: QueryArgs) -> Self {
        ListQuery {
            page: args.page,
            per_page: args.per_page,
            status: args.status,
            start_date: args.start_date,
            end_date: args.end_date,
            user_id: args.user_id,
            month: args.month,
            search: args.search,
        }
    }
}

/// JSON request body
#[derive(Args, Debug)]
pub struct DataArg {
    /// Request body as a JSON object
    #[arg(long, value_parser = parse_json)]
    pub data: Resource,
}

fn parse_json(s: &str) -> Result<Resource, String> {
    let value: Resource = serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("expected a JSON object".to_string())
    }
}

#[derive(Subcommand, Debug)]
pub enum AttendanceCommand {
    ClockIn,
    ClockOut,
    Today,
    History(QueryArgs),
    Statistics(QueryArgs),
}

#[derive(Subcommand, Debug)]
pub enum LeaveCommand {
    List(QueryArgs),
    Create(DataArg),
    Get { id: i64 },
    Update { id: i64, #[command(flatten)] body: DataArg },
    Approve { id: i64, #[command(flatten)] body: DataArg },
    Delete { id: i64 },
    Types,
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    List(QueryArgs),
    Create(DataArg),
    Get { id: i64 },
    Update { id: i64, #[command(flatten)] body: DataArg },
    Approve { id: i64, #[command(flatten)] body: DataArg },
    Delete { id: i64 },
    Types,
    Statistics(QueryArgs),
}

#[derive(Subcommand, Debug)]
pub enum DiaryCommand {
    List(QueryArgs),
    Create(DataArg),
    Get { id: i64 },
    Update { id: i64, #[command(flatten)] body: DataArg },
    Delete { id: i64 },
    Today,
    Statistics(QueryArgs),
}

#[derive(Subcommand, Debug)]
pub enum OutingCommand {
    List(QueryArgs),
    Create(DataArg),
    Get { id: i64 },
    Update { id: i64, #[command(flatten)] body: DataArg },
    Approve { id: i64, #[command(flatten)] body: DataArg },
    /// Record the return from an outing
    Complete { id: i64 },
    Delete { id: i64 },
    Current,
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    List(QueryArgs),
    Create(DataArg),
    Get { id: i64 },
    Update { id: i64, #[command(flatten)] body: DataArg },
    Delete { id: i64 },
    Mine(QueryArgs),
    Today,
    ShiftTypes,
    Calendar(QueryArgs),
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    Users(QueryArgs),
    CreateUser(DataArg),
    UpdateUser { id: i64, #[command(flatten)] body: DataArg },
    DeleteUser { id: i64 },
    Settings,
    UpdateSettings(DataArg),
    Attendance(QueryArgs),
    AttendanceStatistics(QueryArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_leave_list_filters() {
        let cli = Cli::parse_from(["punchcard", "leave", "list", "--page", "2", "--status", "pending"]);
        match cli.command {
            Command::Leave(LeaveCommand::List(args)) => {
                let query = ListQuery::from(args);
                assert_eq!(query.page, Some(2));
                assert_eq!(query.status.as_deref(), Some("pending"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_update_with_data() {
        let cli = Cli::parse_from(["punchcard", "outing", "update", "7", "--data", r#"{"destination": "HQ"}"#]);
        match cli.command {
            Command::Outing(OutingCommand::Update { id, body }) => {
                assert_eq!(id, 7);
                assert_eq!(body.data["destination"], "HQ");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_data_must_be_object() {
        assert!(parse_json("[1, 2]").is_err());
        assert!(parse_json("{not json").is_err());
        assert!(parse_json(r#"{"days": 2}"#).is_ok());
    }
}
