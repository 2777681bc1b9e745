//! Terminal rendering for command results.

use anyhow::Result;
use punchcard_core::models::{Resource, User};
use punchcard_core::router::{Navigation, RouteDescriptor};
use punchcard_core::utils::{format_date, format_datetime, format_time};
use punchcard_core::Session;

/// Placeholder for missing values
const NONE: &str = "-";

pub fn print_json(value: &Resource) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_none(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NONE)
}

fn field<'a>(value: &'a Resource, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Resource::as_str)
}

pub fn user_lines(user: &User) -> Vec<String> {
    vec![
        format!("{} ({})", user.display_name(), user.username),
        format!("  Role:        {}", user.role()),
        format!("  Email:       {}", or_none(user.email.as_deref())),
        format!("  Employee ID: {}", or_none(user.employee_id.as_deref())),
        format!("  Department:  {}", or_none(user.department.as_deref())),
        format!("  Position:    {}", or_none(user.position.as_deref())),
        format!("  Phone:       {}", or_none(user.phone.as_deref())),
    ]
}

pub fn print_user(user: &User) {
    for line in user_lines(user) {
        println!("{}", line);
    }
}

pub fn print_session(session: &Session, location: Option<&str>) {
    match &session.user {
        Some(user) if session.is_authenticated() => {
            println!("Signed in as {} ({})", user.username, session.user_role());
        }
        _ => println!("Not signed in"),
    }
    if session.is_admin() {
        println!("Administrator");
    }
    if let Some(error) = session.error() {
        println!("Last error: {}", error);
    }
    println!("Location: {}", location.unwrap_or(NONE));
}

pub fn print_routes(routes: &[RouteDescriptor]) {
    for route in routes {
        let access = match (route.meta.requires_auth, route.meta.requires_admin) {
            (_, true) => "admin",
            (true, false) => "signed in",
            (false, false) => "public",
        };
        println!("{:<22} {:<18} {:<10} {}", route.path, route.name.as_str(), access, route.title);
    }
}

pub fn print_navigation(nav: &Navigation) {
    let title = nav.route.map(|r| r.title).unwrap_or("(no page)");
    if nav.redirected {
        println!("{} -> {} [{}]", nav.requested, nav.location, title);
    } else {
        println!("{} [{}]", nav.location, title);
    }
}

pub fn attendance_line(today: &Resource) -> String {
    let clock_in = field(today, "clock_in_time").map(format_datetime);
    let clock_out = field(today, "clock_out_time").map(format_datetime);
    format!(
        "Attendance {}: {} (in {}, out {})",
        field(today, "date").map(format_date).unwrap_or_else(|| NONE.to_string()),
        or_none(field(today, "status")),
        clock_in.as_deref().unwrap_or(NONE),
        clock_out.as_deref().unwrap_or(NONE),
    )
}

pub fn diary_line(resp: &Resource) -> String {
    match resp.get("diary").filter(|d| !d.is_null()) {
        Some(diary) => format!("Diary: written ({})", or_none(field(diary, "content"))),
        None => "Diary: not written yet".to_string(),
    }
}

pub fn schedule_line(resp: &Resource) -> String {
    match resp.get("schedule").filter(|s| !s.is_null()) {
        Some(schedule) => format!(
            "Shift: {} {}-{}",
            or_none(field(schedule, "shift_type")),
            field(schedule, "start_time").map(format_time).unwrap_or_else(|| NONE.to_string()),
            field(schedule, "end_time").map(format_time).unwrap_or_else(|| NONE.to_string()),
        ),
        None => "Shift: none scheduled".to_string(),
    }
}

pub fn outing_line(resp: &Resource) -> String {
    match resp.get("outing").filter(|o| !o.is_null()) {
        Some(outing) => format!(
            "Outing: {} until {}",
            or_none(field(outing, "destination")),
            field(outing, "expected_return_time")
                .map(format_datetime)
                .unwrap_or_else(|| NONE.to_string()),
        ),
        None => "Outing: none".to_string(),
    }
}
