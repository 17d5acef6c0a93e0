use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_view, Console};
use crate::cli::OutputFormat;
use crate::menu::tree::{self, MenuItem};
use crate::menu::{MenuSource, MenuStore, StaticMenuSource};

#[derive(Subcommand)]
pub enum MenuCommands {
    #[command(about = "Render the sidebar")]
    Show {
        #[arg(long, help = "Current route, for active highlighting")]
        route: Option<String>,
        #[arg(long, help = "Render the collapsed sidebar")]
        collapsed: bool,
        #[arg(long = "expand", value_name = "ID", help = "Expand a parent entry (repeatable)")]
        expand: Vec<i64>,
        #[arg(long, help = "Expand every parent entry")]
        expand_all: bool,
        #[arg(long = "static", help = "Use the built-in menu instead of the API")]
        use_static: bool,
    },

    #[command(about = "Print the menu hierarchy")]
    Tree {
        #[arg(long = "static", help = "Use the built-in menu instead of the API")]
        use_static: bool,
    },
}

pub async fn handle(cmd: MenuCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open(output_format)?;

    match cmd {
        MenuCommands::Show {
            route,
            collapsed,
            expand,
            expand_all,
            use_static,
        } => {
            let mut store = load(&console, use_static).await?;
            if collapsed {
                store.toggle_sidebar();
            }
            if expand_all {
                let nodes = store.tree().to_vec();
                store.sidebar.expand_all(&nodes);
            }
            for id in expand {
                if tree::find(store.tree(), id).is_none() {
                    tracing::warn!(menu_id = id, "no such menu entry");
                }
                store.sidebar.set_expanded(id, true);
            }
            let view = store
                .sidebar
                .render(store.tree(), route.as_deref(), store.is_sidebar_open());
            output_view(&output_format, &view.to_string(), &serde_json::to_value(&view)?)
        }
        MenuCommands::Tree { use_static } => {
            let store = load(&console, use_static).await?;
            let mut text = String::new();
            outline(store.tree(), 0, &mut text);
            if text.is_empty() {
                text.push_str("No menus\n");
            }
            output_view(&output_format, &text, &json!({ "menus": store.tree() }))
        }
    }
}

async fn load(console: &Console, use_static: bool) -> anyhow::Result<MenuStore> {
    let mut store = MenuStore::new();
    if use_static {
        store.set_flat(StaticMenuSource.fetch_menus().await?)?;
    } else {
        console.require_token()?;
        store.load(&console.api, &console.session).await?;
    }
    Ok(store)
}

fn outline(nodes: &[MenuItem], depth: usize, out: &mut String) {
    for node in nodes {
        let route = if node.has_route() { node.route.as_str() } else { "-" };
        out.push_str(&format!(
            "{}{} [{}] {} (order {})\n",
            "  ".repeat(depth),
            node.name,
            node.id,
            route,
            node.order
        ));
        outline(&node.children, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_indents_children() {
        let nodes = tree::build_tree(&[
            MenuItem::new(1, "Cadastros", None, 1),
            MenuItem::new(2, "Usuários", Some(1), 1).with_route("/usuarios"),
        ])
        .unwrap();
        let mut text = String::new();
        outline(&nodes, 0, &mut text);
        assert_eq!(text, "Cadastros [1] - (order 1)\n  Usuários [2] /usuarios (order 1)\n");
    }
}
