use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::api::resources::Resource;
use crate::api::ApiClient;
use crate::types::routes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCard {
    pub title: &'static str,
    pub description: &'static str,
    pub route: &'static str,
    pub resource: Resource,
    /// `None` until loaded, or when the count could not be fetched
    pub count: Option<usize>,
}

const CARDS: [(&str, &str, &str, Resource); 6] = [
    ("Users", "Manage user accounts", routes::USERS, Resource::Users),
    ("Groups", "Manage user groups", routes::GROUPS, Resource::Groups),
    ("Access Levels", "Configure access levels", routes::ACCESS_LEVELS, Resource::AccessLevels),
    ("Menus", "Customize system menus", routes::MENUS, Resource::Menus),
    ("Power BI Reports", "View dashboards", routes::POWERBI_REPORTS, Resource::PowerBiReports),
    ("SQL Reports", "Analytical queries and reports", routes::SQL_REPORTS, Resource::SqlReports),
];

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub greeting: String,
    pub cards: Vec<DashboardCard>,
}

impl Dashboard {
    pub fn new(user_name: Option<&str>) -> Self {
        let greeting = match user_name {
            Some(name) if !name.is_empty() => format!("Welcome, {}!", name),
            _ => "Welcome!".to_string(),
        };
        let cards = CARDS
            .iter()
            .map(|&(title, description, route, resource)| DashboardCard {
                title,
                description,
                route,
                resource,
                count: None,
            })
            .collect();
        Self { greeting, cards }
    }

    /// Count every resource concurrently. A failed count leaves its card
    /// without a number.
    pub async fn load_counts(&mut self, api: &ApiClient) {
        let counts = join_all(self.cards.iter().map(|card| async move {
            match api.list::<Value>(card.resource).await {
                Ok(items) => Some(items.len()),
                Err(e) => {
                    tracing::warn!(resource = %card.resource, "count unavailable: {}", e);
                    None
                }
            }
        }))
        .await;
        for (card, count) in self.cards.iter_mut().zip(counts) {
            card.count = count;
        }
    }

    pub fn card(&self, route: &str) -> Option<&DashboardCard> {
        self.cards.iter().find(|c| c.route == route)
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.greeting)?;
        writeln!(f)?;
        for card in &self.cards {
            let count = card.count.map_or_else(|| "-".to_string(), |n| n.to_string());
            writeln!(f, "{:<18} {:>5}  {} ({})", card.title, count, card.description, card.route)?;
        }
        Ok(())
    }
}
