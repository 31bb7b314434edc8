use serde::Serialize;

use crate::access::{check, Actor, View};
use crate::models::{Bank, Role, User, UserId};

/// A dashboard shortcut
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub view: View,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub path: &'static str,
}

struct MenuItem {
    view: View,
    title: &'static str,
    subtitle: &'static str,
    roles: &'static [Role],
}

const ALL_ROLES: &[Role] = &[Role::Customer, Role::Admin, Role::Owner];

const MENU: &[MenuItem] = &[
    MenuItem {
        view: View::ApplyLoan,
        title: "Ajukan Pinjaman",
        subtitle: "Butuh dana cepat? Ajukan sekarang.",
        roles: &[Role::Customer],
    },
    MenuItem {
        view: View::MyLoans,
        title: "Pinjaman Saya",
        subtitle: "Cek status dan riwayat tagihan.",
        roles: &[Role::Customer],
    },
    MenuItem {
        view: View::ReviewLoans,
        title: "Kelola Pinjaman",
        subtitle: "Validasi dan monitoring nasabah.",
        roles: &[Role::Admin, Role::Owner],
    },
    MenuItem {
        view: View::Banks,
        title: "Database Bank",
        subtitle: "Pengaturan referensi bank sistem.",
        roles: &[Role::Owner],
    },
    MenuItem {
        view: View::Users,
        title: "Kelola Pengguna",
        subtitle: "Atur akun dan peran pengguna.",
        roles: &[Role::Owner],
    },
    MenuItem {
        view: View::AuditLog,
        title: "Log Audit",
        subtitle: "Riwayat aktivitas sistem.",
        roles: &[Role::Owner],
    },
    MenuItem {
        view: View::Profile,
        title: "Pengaturan Akun",
        subtitle: "Update password & data diri.",
        roles: ALL_ROLES,
    },
];

/// Landing page after sign-in
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub name: String,
    pub role: Role,
    pub menu: Vec<MenuEntry>,
}

impl DashboardView {
    pub fn build(name: &str, role: Role) -> Self {
        let actor = Actor::signed_in(role);
        let menu = MENU
            .iter()
            .filter(|item| item.roles.contains(&role))
            .filter(|item| check(item.view, &actor).is_granted())
            .map(|item| MenuEntry {
                view: item.view,
                title: item.title,
                subtitle: item.subtitle,
                path: item.view.path(),
            })
            .collect();

        Self {
            name: name.to_string(),
            role,
            menu,
        }
    }
}

/// The signed-in user's own account
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: UserId,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub bank: Option<Bank>,
    pub bank_code: Option<String>,
    /// Account number with all but the last four digits hidden
    pub account_number: Option<String>,
}

impl From<User> for ProfileView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            role: user.role,
            phone: user.phone,
            address: user.address,
            occupation: user.occupation,
            bank: user.bank,
            bank_code: user.bank_code,
            account_number: user.account_number.as_deref().map(mask_account),
        }
    }
}

fn mask_account(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    let visible = chars.len().min(4);
    let hidden = chars.len() - visible;
    std::iter::repeat('*')
        .take(hidden)
        .chain(chars[hidden..].iter().copied())
        .collect()
}
