//! The single source of truth for which role reaches which view.

use crate::models::user::Role;

/// The login entry point.
pub const LOGIN_PATH: &str = "/login";
/// The generic dashboard entry point; resolves to the role's landing page.
pub const DASHBOARD_PATH: &str = "/dashboard";

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ADMIN_OR_SECRETARY: &[Role] = &[Role::Admin, Role::Secretary];
const ADMIN_OR_TEACHER: &[Role] = &[Role::Admin, Role::Teacher];
const STUDENT_ONLY: &[Role] = &[Role::Student];

/// Every view the application can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    DashboardRedirect,
    AdminDashboard,
    AdminPanel,
    Users,
    Classes,
    Reports,
    SecretaryDashboard,
    TeacherDashboard,
    Questions,
    Assignments,
    Submissions,
    DesignReview,
    Grades { read_only: bool },
    StudentDashboard,
    Profile,
    NotFound,
}

/// Who may reach a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not. No guard runs.
    Public,
    /// Any signed-in user.
    Authenticated,
    /// Signed-in users holding one of these roles.
    Roles(&'static [Role]),
}

impl Access {
    /// The allow-list handed to the guard, if the route is guarded at all.
    pub fn allow_list(self) -> Option<Option<&'static [Role]>> {
        match self {
            Access::Public => None,
            Access::Authenticated => Some(None),
            Access::Roles(roles) => Some(Some(roles)),
        }
    }

    pub fn permits(self, role: Role) -> bool {
        match self {
            Access::Public | Access::Authenticated => true,
            Access::Roles(roles) => roles.contains(&role),
        }
    }
}

/// What a route leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    View(View),
    Redirect(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteSpec {
    pub path: &'static str,
    pub access: Access,
    pub target: Target,
}

const fn route(path: &'static str, access: Access, view: View) -> RouteSpec {
    RouteSpec {
        path,
        access,
        target: Target::View(view),
    }
}

pub static ROUTES: &[RouteSpec] = &[
    route(LOGIN_PATH, Access::Public, View::Login),
    RouteSpec {
        path: "/",
        access: Access::Public,
        target: Target::Redirect(DASHBOARD_PATH),
    },
    route(DASHBOARD_PATH, Access::Authenticated, View::DashboardRedirect),
    // Admin
    route("/admin", Access::Roles(ADMIN_ONLY), View::AdminDashboard),
    route("/admin/panel", Access::Roles(ADMIN_OR_SECRETARY), View::AdminPanel),
    route("/admin/users", Access::Roles(ADMIN_OR_SECRETARY), View::Users),
    route("/admin/classes", Access::Roles(ADMIN_OR_SECRETARY), View::Classes),
    route("/admin/reports", Access::Roles(ADMIN_OR_SECRETARY), View::Reports),
    // Secretary
    route("/secretary", Access::Roles(ADMIN_OR_SECRETARY), View::SecretaryDashboard),
    // Teacher
    route("/teacher", Access::Roles(ADMIN_OR_TEACHER), View::TeacherDashboard),
    route("/teacher/questions", Access::Roles(ADMIN_OR_TEACHER), View::Questions),
    route("/teacher/assignments", Access::Roles(ADMIN_OR_TEACHER), View::Assignments),
    route("/teacher/submissions", Access::Roles(ADMIN_OR_TEACHER), View::Submissions),
    route("/teacher/design-review", Access::Roles(ADMIN_OR_TEACHER), View::DesignReview),
    route(
        "/teacher/grades",
        Access::Roles(ADMIN_OR_TEACHER),
        View::Grades { read_only: false },
    ),
    // Student
    route("/student", Access::Roles(STUDENT_ONLY), View::StudentDashboard),
    route(
        "/student/grades",
        Access::Roles(STUDENT_ONLY),
        View::Grades { read_only: true },
    ),
    route("/student/profile", Access::Authenticated, View::Profile),
];

/// Matched for any path the table does not know.
pub static NOT_FOUND: RouteSpec = route("*", Access::Public, View::NotFound);

/// Finds the route for an already normalized path.
pub fn lookup(path: &str) -> &'static RouteSpec {
    ROUTES
        .iter()
        .find(|spec| spec.path == path)
        .unwrap_or(&NOT_FOUND)
}

/// The page a role lands on after login or via `/dashboard`.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Secretary => "/secretary",
        Role::Teacher => "/teacher",
        Role::Student => "/student",
    }
}

/// An entry in a role's sidebar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
}

const fn nav(path: &'static str, label: &'static str) -> NavItem {
    NavItem { path, label }
}

static ADMIN_NAV: &[NavItem] = &[
    nav("/admin", "Dashboard"),
    nav("/admin/panel", "Admin Panel"),
    nav("/admin/classes", "Classes"),
    nav("/admin/reports", "Reports"),
    nav("/secretary", "Secretary"),
    nav("/teacher", "Teacher View"),
];

static SECRETARY_NAV: &[NavItem] = &[
    nav("/secretary", "Dashboard"),
    nav("/admin/panel", "Manage Accounts"),
    nav("/admin/classes", "Classes"),
    nav("/admin/reports", "Reports"),
];

static TEACHER_NAV: &[NavItem] = &[
    nav("/teacher", "Dashboard"),
    nav("/teacher/questions", "Question Bank"),
    nav("/teacher/assignments", "Assignments"),
    nav("/teacher/submissions", "Submissions"),
    nav("/teacher/design-review", "Design Review"),
    nav("/teacher/grades", "Grades"),
];

static STUDENT_NAV: &[NavItem] = &[
    nav("/student", "Home"),
    nav("/student/grades", "My Grades"),
    nav("/student/profile", "Profile"),
];

/// The sidebar entries shown to `role`.
pub fn nav_items(role: Role) -> &'static [NavItem] {
    match role {
        Role::Admin => ADMIN_NAV,
        Role::Secretary => SECRETARY_NAV,
        Role::Teacher => TEACHER_NAV,
        Role::Student => STUDENT_NAV,
    }
}
