//! Symbolic icon names to renderable icons.
//!
//! Menu records name their icon either in kebab-case (`bar-chart`, as the
//! menu form stores it) or in the icon set's PascalCase (`BarChart2`). Both
//! resolve through [`Icon::from_name`]; anything unknown becomes
//! [`Icon::HelpCircle`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Home,
    Settings,
    User,
    Users,
    Shield,
    ShieldCheck,
    Menu,
    Lock,
    BarChart,
    PieChart,
    Database,
    FileText,
    List,
    Folder,
    Calendar,
    Mail,
    HelpCircle,
}

/// Options offered by the menu form, in display order
pub const ICON_CHOICES: [(&str, &str); 15] = [
    ("home", "Home"),
    ("settings", "Settings"),
    ("user", "User"),
    ("users", "Users"),
    ("shield", "Shield"),
    ("menu", "Menu"),
    ("lock", "Lock"),
    ("bar-chart", "Bar Chart"),
    ("pie-chart", "Pie Chart"),
    ("database", "Database"),
    ("file-text", "File Text"),
    ("list", "List"),
    ("folder", "Folder"),
    ("calendar", "Calendar"),
    ("mail", "Mail"),
];

impl Icon {
    pub fn from_name(name: &str) -> Icon {
        let key: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "home" | "house" | "layoutdashboard" => Icon::Home,
            "settings" | "cog" => Icon::Settings,
            "user" => Icon::User,
            "users" => Icon::Users,
            "shield" => Icon::Shield,
            "shieldcheck" => Icon::ShieldCheck,
            "menu" => Icon::Menu,
            "lock" => Icon::Lock,
            "barchart" | "barchart2" | "barchart3" => Icon::BarChart,
            "piechart" => Icon::PieChart,
            "database" => Icon::Database,
            "filetext" => Icon::FileText,
            "list" => Icon::List,
            "folder" => Icon::Folder,
            "calendar" => Icon::Calendar,
            "mail" => Icon::Mail,
            _ => Icon::HelpCircle,
        }
    }

    /// Single-cell glyph used by the terminal renderer
    pub fn glyph(&self) -> char {
        match self {
            Icon::Home => '⌂',
            Icon::Settings => '⚙',
            Icon::User => '☺',
            Icon::Users => '☷',
            Icon::Shield | Icon::ShieldCheck => '⛨',
            Icon::Menu => '☰',
            Icon::Lock => '⚿',
            Icon::BarChart => '▥',
            Icon::PieChart => '◔',
            Icon::Database => '⛁',
            Icon::FileText => '▤',
            Icon::List => '≡',
            Icon::Folder => '▭',
            Icon::Calendar => '▦',
            Icon::Mail => '✉',
            Icon::HelpCircle => '?',
        }
    }

    /// Name in the icon set the web console used
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Icon::Home => "Home",
            Icon::Settings => "Settings",
            Icon::User => "User",
            Icon::Users => "Users",
            Icon::Shield => "Shield",
            Icon::ShieldCheck => "ShieldCheck",
            Icon::Menu => "Menu",
            Icon::Lock => "Lock",
            Icon::BarChart => "BarChart2",
            Icon::PieChart => "PieChart",
            Icon::Database => "Database",
            Icon::FileText => "FileText",
            Icon::List => "List",
            Icon::Folder => "Folder",
            Icon::Calendar => "Calendar",
            Icon::Mail => "Mail",
            Icon::HelpCircle => "HelpCircle",
        }
    }
}
