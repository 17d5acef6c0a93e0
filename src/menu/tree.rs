//! Flat menu records to navigation tree.
//!
//! The feed delivers menu records as a flat list where `parent_id` points at
//! another record's `id` (or is `None` for roots). [`build_tree`] nests them,
//! ordering each sibling group by `order` with ties kept in input order.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A navigation entry. `children` is only ever filled in by [`build_tree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    /// Empty for parent entries that only group submenus
    #[serde(rename = "rota", alias = "route", default, deserialize_with = "null_as_empty")]
    pub route: String,
    #[serde(rename = "icone", alias = "icon", default, deserialize_with = "null_as_empty")]
    pub icon: String,
    #[serde(rename = "paiId", alias = "parentId", default)]
    pub parent_id: Option<i64>,
    #[serde(rename = "ordem", alias = "order", default)]
    pub order: i64,
    #[serde(rename = "filhos", default, skip_deserializing)]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    pub fn new(id: i64, name: impl Into<String>, parent_id: Option<i64>, order: i64) -> Self {
        Self {
            id,
            name: name.into(),
            route: String::new(),
            icon: String::new(),
            parent_id,
            order,
            children: Vec::new(),
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn has_route(&self) -> bool {
        !self.route.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuTreeError {
    #[error("menu {id} is its own ancestor (cyclic parent reference)")]
    Cycle { id: i64 },
}

/// Build the tree of root entries (`parent_id == None`).
pub fn build_tree(items: &[MenuItem]) -> Result<Vec<MenuItem>, MenuTreeError> {
    build_subtree(items, None)
}

/// Build the subtree hanging off `parent_id`.
///
/// Children are grouped by parent in a single pass, so the whole build is
/// linear apart from the per-group sort. Records whose parent does not exist
/// are never reached and are dropped. Re-entering an id that is already on
/// the current path aborts with [`MenuTreeError::Cycle`].
pub fn build_subtree(
    items: &[MenuItem],
    parent_id: Option<i64>,
) -> Result<Vec<MenuItem>, MenuTreeError> {
    let mut groups: HashMap<Option<i64>, Vec<&MenuItem>> = HashMap::new();
    for item in items {
        groups.entry(item.parent_id).or_default().push(item);
    }
    for siblings in groups.values_mut() {
        // sort_by_key is stable: equal orders keep feed order
        siblings.sort_by_key(|item| item.order);
    }

    let mut path = HashSet::new();
    assemble(&groups, parent_id, &mut path)
}

fn assemble(
    groups: &HashMap<Option<i64>, Vec<&MenuItem>>,
    parent_id: Option<i64>,
    path: &mut HashSet<i64>,
) -> Result<Vec<MenuItem>, MenuTreeError> {
    let Some(siblings) = groups.get(&parent_id) else {
        return Ok(Vec::new());
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for item in siblings {
        if !path.insert(item.id) {
            return Err(MenuTreeError::Cycle { id: item.id });
        }
        let children = assemble(groups, Some(item.id), path)?;
        path.remove(&item.id);

        nodes.push(MenuItem {
            children,
            ..MenuItem::clone(item)
        });
    }
    Ok(nodes)
}

/// Records that point at a parent id absent from the list. These never show
/// up in a built tree.
pub fn orphans(items: &[MenuItem]) -> Vec<&MenuItem> {
    let ids: HashSet<i64> = items.iter().map(|item| item.id).collect();
    items
        .iter()
        .filter(|item| matches!(item.parent_id, Some(parent) if !ids.contains(&parent)))
        .collect()
}

/// Pre-order walk over a tree from [`build_tree`]. Recursion follows
/// `children` unchecked, so hand-assembled cyclic input is not supported.
pub fn walk(nodes: &[MenuItem]) -> Vec<&MenuItem> {
    let mut out = Vec::new();
    for node in nodes {
        out.push(node);
        out.extend(walk(&node.children));
    }
    out
}

/// Depth-first lookup by id in a tree from [`build_tree`]; same input
/// expectation as [`walk`]
pub fn find(nodes: &[MenuItem], id: i64) -> Option<&MenuItem> {
    nodes.iter().find_map(|node| {
        if node.id == id {
            Some(node)
        } else {
            find(&node.children, id)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, parent: Option<i64>, order: i64, name: &str) -> MenuItem {
        MenuItem::new(id, name, parent, order)
    }

    // Straight transcription of the filter/sort/recurse procedure, used as an oracle
    fn naive(items: &[MenuItem], parent: Option<i64>) -> Vec<MenuItem> {
        let mut level: Vec<MenuItem> = items
            .iter()
            .filter(|i| i.parent_id == parent)
            .cloned()
            .collect();
        level.sort_by_key(|i| i.order);
        level
            .into_iter()
            .map(|mut i| {
                i.children = naive(items, Some(i.id));
                i
            })
            .collect()
    }

    // Deterministic pseudo-random forest: parents always point backwards, plus a few orphans
    fn generated(n: i64, seed: u64) -> Vec<MenuItem> {
        let mut state = seed;
        let mut next = move |m: u64| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) % m
        };
        (1..=n)
            .map(|id| {
                let parent = match next(5) {
                    0 => None,
                    1 if id > 3 => Some(1000 + id), // orphan
                    _ if id > 1 => Some(1 + next(id as u64 - 1) as i64),
                    _ => None,
                };
                item(id, parent, next(4) as i64, &format!("m{}", id))
            })
            .collect()
    }

    #[test]
    fn walk_and_find_cover_every_level() {
        let input = vec![
            item(1, None, 2, "B"),
            item(2, None, 1, "A"),
            item(3, Some(1), 1, "B1"),
            item(4, Some(3), 1, "B1a"),
        ];
        let tree = build_tree(&input).unwrap();
        let names: Vec<&str> = walk(&tree).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "B1", "B1a"]);
        assert_eq!(find(&tree, 4).map(|m| m.name.as_str()), Some("B1a"));
        assert!(find(&tree, 9).is_none());
    }

    #[test]
    fn scenario_orders_roots_and_nests_children() {
        let input = vec![
            item(1, None, 2, "B"),
            item(2, None, 1, "A"),
            item(3, Some(1), 1, "B1"),
        ];
        let tree = build_tree(&input).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, 2);
        assert_eq!(tree[0].name, "A");
        assert!(tree[0].children.is_empty());
        assert_eq!(tree[1].id, 1);
        assert_eq!(tree[1].children.len(), 1);
        assert_eq!(tree[1].children[0].name, "B1");
        assert!(tree[1].children[0].children.is_empty());
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        assert!(build_tree(&[]).unwrap().is_empty());
    }

    #[test]
    fn orphans_are_dropped() {
        let input = vec![
            item(1, None, 1, "root"),
            item(2, Some(99), 1, "orphan"),
            item(3, Some(2), 1, "orphan child"),
        ];
        let tree = build_tree(&input).unwrap();
        let ids: Vec<i64> = walk(&tree).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1]);

        let orphan_ids: Vec<i64> = orphans(&input).iter().map(|n| n.id).collect();
        assert_eq!(orphan_ids, vec![2]);
    }

    #[test]
    fn equal_orders_keep_input_order() {
        let input = vec![
            item(10, None, 1, "first"),
            item(11, None, 0, "zero"),
            item(12, None, 1, "second"),
            item(13, None, 1, "third"),
        ];
        let names: Vec<String> = build_tree(&input)
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(names, vec!["zero", "first", "second", "third"]);
    }

    #[test]
    fn every_reachable_record_appears_once() {
        for seed in 1..20u64 {
            let input = generated(60, seed);
            let tree = build_tree(&input).unwrap();
            let mut seen: Vec<i64> = walk(&tree).iter().map(|n| n.id).collect();
            let total = seen.len();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), total, "duplicate node for seed {}", seed);

            // Everything not seen must descend from an orphan
            let orphan_ids: HashSet<i64> = orphans(&input).iter().map(|n| n.id).collect();
            for record in &input {
                if !seen.contains(&record.id) {
                    let mut cursor = record;
                    loop {
                        if orphan_ids.contains(&cursor.id) {
                            break;
                        }
                        let parent = cursor.parent_id.expect("unseen root");
                        cursor = input.iter().find(|r| r.id == parent).unwrap();
                    }
                }
            }
        }
    }

    #[test]
    fn siblings_are_sorted_and_match_naive_build() {
        for seed in 1..20u64 {
            let input = generated(40, seed);
            let tree = build_tree(&input).unwrap();
            assert_eq!(tree, naive(&input, None));

            fn check(nodes: &[MenuItem]) {
                assert!(nodes.windows(2).all(|w| w[0].order <= w[1].order));
                for n in nodes {
                    check(&n.children);
                }
            }
            check(&tree);
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let input = vec![item(1, None, 1, "a"), item(2, Some(1), 1, "b")];
        let before = input.clone();
        let _ = build_tree(&input).unwrap();
        assert_eq!(input, before);
        assert!(input.iter().all(|i| i.children.is_empty()));
    }

    #[test]
    fn subtree_filter_selects_children_of_parent() {
        let input = vec![
            item(1, None, 1, "root"),
            item(2, Some(1), 2, "b"),
            item(3, Some(1), 1, "a"),
            item(4, Some(3), 1, "a1"),
        ];
        let sub = build_subtree(&input, Some(1)).unwrap();
        assert_eq!(sub.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3, 2]);
        assert_eq!(sub[0].children[0].id, 4);
    }

    #[test]
    fn cycle_reached_through_filter_is_reported() {
        let input = vec![item(1, Some(2), 1, "a"), item(2, Some(1), 1, "b")];
        // Unreachable from the roots: behaves like orphans
        assert!(build_tree(&input).unwrap().is_empty());
        assert_eq!(
            build_subtree(&input, Some(1)),
            Err(MenuTreeError::Cycle { id: 2 })
        );
    }

    #[test]
    fn self_parent_and_duplicate_ids_are_reported() {
        let self_loop = vec![item(7, Some(7), 1, "self")];
        assert_eq!(
            build_subtree(&self_loop, Some(7)),
            Err(MenuTreeError::Cycle { id: 7 })
        );

        let duplicated = vec![item(5, None, 1, "a"), item(5, Some(5), 1, "a again")];
        assert_eq!(build_tree(&duplicated), Err(MenuTreeError::Cycle { id: 5 }));
    }

    #[test]
    fn decodes_feed_names_and_ignores_feed_children() {
        let json = serde_json::json!([
            { "id": 1, "nome": "Cadastros", "rota": null, "icone": "folder", "paiId": null, "ordem": 1,
              "filhos": [{ "id": 9, "nome": "ghost", "rota": "/x", "icone": "", "paiId": 1, "ordem": 1 }] },
            { "id": 2, "name": "Users", "route": "/usuarios", "icon": "users", "parentId": 1, "order": 1 }
        ]);
        let items: Vec<MenuItem> = serde_json::from_value(json).unwrap();
        assert_eq!(items[0].route, "");
        assert!(items[0].children.is_empty());
        assert_eq!(items[1].parent_id, Some(1));

        let tree = build_tree(&items).unwrap();
        assert_eq!(walk(&tree).len(), 2);
        assert_eq!(tree[0].children[0].route, "/usuarios");
    }
}
