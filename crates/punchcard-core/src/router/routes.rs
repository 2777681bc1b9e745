use std::fmt;

/// Path of the sign-in page
pub const LOGIN_PATH: &str = "/login";

/// Path of the dashboard, where refused navigations land
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Login,
    Register,
    Dashboard,
    Profile,
    Attendance,
    AttendanceHistory,
    LeaveRequest,
    ExpenseReport,
    WorkDiary,
    OutingReport,
    Schedule,
    AdminUsers,
    AdminSettings,
    AdminAttendance,
}

impl RouteName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::Login => "Login",
            RouteName::Register => "Register",
            RouteName::Dashboard => "Dashboard",
            RouteName::Profile => "Profile",
            RouteName::Attendance => "Attendance",
            RouteName::AttendanceHistory => "AttendanceHistory",
            RouteName::LeaveRequest => "LeaveRequest",
            RouteName::ExpenseReport => "ExpenseReport",
            RouteName::WorkDiary => "WorkDiary",
            RouteName::OutingReport => "OutingReport",
            RouteName::Schedule => "Schedule",
            RouteName::AdminUsers => "AdminUsers",
            RouteName::AdminSettings => "AdminSettings",
            RouteName::AdminAttendance => "AdminAttendance",
        }
    }

    /// Sign-in and sign-up pages, which a signed-in user is sent away from
    pub fn is_entry_page(&self) -> bool {
        matches!(self, RouteName::Login | RouteName::Register)
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub name: RouteName,
    pub title: &'static str,
    pub component: &'static str,
    pub meta: RouteMeta,
}

const PUBLIC: RouteMeta = RouteMeta {
    requires_auth: false,
    requires_admin: false,
};

// Pages inside the authenticated layout inherit its auth requirement
const MEMBER: RouteMeta = RouteMeta {
    requires_auth: true,
    requires_admin: false,
};

const ADMIN: RouteMeta = RouteMeta {
    requires_auth: true,
    requires_admin: true,
};

const fn route(
    path: &'static str,
    name: RouteName,
    title: &'static str,
    component: &'static str,
    meta: RouteMeta,
) -> RouteDescriptor {
    RouteDescriptor {
        path,
        name,
        title,
        component,
        meta,
    }
}

static ROUTES: [RouteDescriptor; 14] = [
    route("/login", RouteName::Login, "Sign in", "views/Login", PUBLIC),
    route("/register", RouteName::Register, "Register", "views/Register", PUBLIC),
    route("/", RouteName::Dashboard, "Dashboard", "views/Dashboard", MEMBER),
    route("/profile", RouteName::Profile, "Profile", "views/Profile", MEMBER),
    route("/attendance", RouteName::Attendance, "Attendance", "views/Attendance", MEMBER),
    route(
        "/attendance/history",
        RouteName::AttendanceHistory,
        "Attendance history",
        "views/AttendanceHistory",
        MEMBER,
    ),
    route("/leave", RouteName::LeaveRequest, "Leave requests", "views/LeaveRequest", MEMBER),
    route("/expense", RouteName::ExpenseReport, "Expense reports", "views/ExpenseReport", MEMBER),
    route("/diary", RouteName::WorkDiary, "Work diary", "views/WorkDiary", MEMBER),
    route("/outing", RouteName::OutingReport, "Outing reports", "views/OutingReport", MEMBER),
    route("/schedule", RouteName::Schedule, "Schedule", "views/Schedule", MEMBER),
    route("/admin/users", RouteName::AdminUsers, "User management", "views/admin/Users", ADMIN),
    route("/admin/settings", RouteName::AdminSettings, "System settings", "views/admin/Settings", ADMIN),
    route(
        "/admin/attendance",
        RouteName::AdminAttendance,
        "Attendance management",
        "views/admin/Attendance",
        ADMIN,
    ),
];

/// The full route table, in declaration order
pub fn routes() -> &'static [RouteDescriptor] {
    &ROUTES
}

pub fn find(name: RouteName) -> Option<&'static RouteDescriptor> {
    ROUTES.iter().find(|r| r.name == name)
}

/// Strip query, fragment and trailing slashes; always keep a leading slash
pub fn normalize_path(path: &str) -> String {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_matches('/');
    format!("/{}", trimmed)
}

/// Find the route matching `path`
pub fn resolve(path: &str) -> Option<&'static RouteDescriptor> {
    let path = normalize_path(path);
    ROUTES.iter().find(|r| r.path == path)
}
