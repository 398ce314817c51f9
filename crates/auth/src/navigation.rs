//! Dashboard navigation: the static menu table and its per-role view.

use serde::Serialize;

use crate::{Role, RoleSet};

/// Symbolic icon reference; the presentation layer decides how to draw it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Home,
    Inbox,
    PlusCircle,
    CreditCard,
    Folder,
    Briefcase,
    CheckSquare,
    Image,
    LifeBuoy,
    Shield,
    Users,
    Palette,
    BarChart,
    Settings,
}

/// Static menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    pub title: &'static str,
    pub path: &'static str,
    pub icon: Icon,
    pub allowed_roles: RoleSet,
}

const CLIENT: RoleSet = RoleSet::only(Role::Client);
const DESIGNER: RoleSet = RoleSet::only(Role::Designer);
const ADMIN: RoleSet = RoleSet::only(Role::Admin);

const fn item(title: &'static str, path: &'static str, icon: Icon, allowed_roles: RoleSet) -> NavigationItem {
    NavigationItem {
        title,
        path,
        icon,
        allowed_roles,
    }
}

/// The dashboard menu, in display order.
pub static DEFAULT_NAVIGATION: &[NavigationItem] = &[
    item("Overview", "/dashboard/client", Icon::Home, CLIENT),
    item("My Requests", "/dashboard/requests", Icon::Inbox, CLIENT),
    item("New Request", "/dashboard/requests/new", Icon::PlusCircle, CLIENT),
    item("Billing", "/dashboard/billing", Icon::CreditCard, CLIENT),
    item("Brand Assets", "/dashboard/assets", Icon::Folder, CLIENT.with(Role::Designer)),
    item("Workspace", "/dashboard/designer", Icon::Briefcase, DESIGNER),
    item("Tasks", "/dashboard/tasks", Icon::CheckSquare, DESIGNER.with(Role::Admin)),
    item("Portfolio", "/dashboard/portfolio", Icon::Image, DESIGNER),
    item("Support", "/dashboard/support", Icon::LifeBuoy, CLIENT.with(Role::Admin)),
    item("Admin", "/dashboard/admin", Icon::Shield, ADMIN),
    item("Users", "/dashboard/users", Icon::Users, ADMIN),
    item("Designers", "/dashboard/designers", Icon::Palette, ADMIN),
    item("Analytics", "/dashboard/analytics", Icon::BarChart, ADMIN),
    item("Settings", "/dashboard/settings", Icon::Settings, RoleSet::all()),
];

/// Items visible to `role`, in declaration order.
pub fn filter_for_role(items: &[NavigationItem], role: Role) -> Vec<NavigationItem> {
    items
        .iter()
        .filter(|item| item.allowed_roles.contains(role))
        .cloned()
        .collect()
}

/// Whether the entry for `item_path` should be highlighted at `current_path`.
///
/// Matches the path itself or anything below it on a segment boundary, so
/// `/dashboard/tasks` is active at `/dashboard/tasks/42` but not at
/// `/dashboard/tasks2`.
pub fn is_active(current_path: &str, item_path: &str) -> bool {
    let item_path = match item_path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if current_path == item_path {
        return true;
    }
    if item_path == "/" {
        return current_path.starts_with('/');
    }

    current_path
        .strip_prefix(item_path)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// A visible menu entry with its highlight state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    #[serde(flatten)]
    pub item: NavigationItem,
    pub active: bool,
}

/// The sidebar view for `role` at `current_path`.
pub fn visible_entries(items: &[NavigationItem], role: Role, current_path: &str) -> Vec<NavEntry> {
    filter_for_role(items, role)
        .into_iter()
        .map(|item| NavEntry {
            active: is_active(current_path, item.path),
            item,
        })
        .collect()
}
