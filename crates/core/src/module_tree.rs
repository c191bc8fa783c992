//! Rules for the self-referencing module hierarchy.
//!
//! The database only guarantees that `parent_module_id` points at an
//! existing row. Acyclicity is enforced here, before any write that sets a
//! parent: the proposed parent's ancestor chain must not reach the module
//! being written.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum module name length in characters.
pub const MAX_NAME_LEN: usize = 50;

/// Maximum module key length in characters.
pub const MAX_KEY_LEN: usize = 50;

/// Check that `node` may be placed under `new_parent`.
///
/// `parents` maps every existing module id to its current parent. `node` is
/// `None` for a module that does not exist yet (insert); a new row cannot
/// close a cycle, so only parent existence is checked in that case.
pub fn check_parent_assignment(
    node: Option<DbId>,
    new_parent: DbId,
    parents: &HashMap<DbId, Option<DbId>>,
) -> Result<(), CoreError> {
    if !parents.contains_key(&new_parent) {
        return Err(CoreError::NotFound {
            entity: "ParentModule",
            id: new_parent,
        });
    }

    let Some(node) = node else {
        return Ok(());
    };

    if node == new_parent {
        return Err(CoreError::Validation(
            "A module cannot be its own parent".into(),
        ));
    }

    let mut visited = HashSet::new();
    let mut current = Some(new_parent);
    while let Some(id) = current {
        if id == node {
            return Err(CoreError::Validation(format!(
                "Module {new_parent} is a descendant of module {node}; \
                 assigning it as parent would create a cycle"
            )));
        }
        if !visited.insert(id) {
            return Err(CoreError::Internal(format!(
                "Module hierarchy already contains a cycle through module {id}"
            )));
        }
        current = parents.get(&id).copied().flatten();
    }

    Ok(())
}

/// Validate a module key: 1..=50 characters of `[a-z0-9_-]`.
pub fn validate_module_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty() || key.chars().count() > MAX_KEY_LEN {
        return Err(CoreError::Validation(format!(
            "Module key must be between 1 and {MAX_KEY_LEN} characters"
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(CoreError::Validation(format!(
            "Module key '{key}' may only contain lowercase letters, digits, '_' and '-'"
        )));
    }
    Ok(())
}

/// Validate a module display name: non-blank, at most 50 characters.
pub fn validate_module_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Module name must be between 1 and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// An item that can be arranged in the module tree.
pub trait TreeItem {
    fn id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
    fn display_order(&self) -> i32;
    fn name(&self) -> &str;
}

/// A node of the navigable module tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<T> {
    #[serde(flatten)]
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

/// Arrange a flat list into a forest ordered by `(display_order, name)`.
///
/// Items whose parent is not part of `items` (for example an inactive parent
/// filtered out by the caller) become roots. Items that are only reachable
/// through a cycle are dropped.
pub fn build_forest<T: TreeItem>(items: Vec<T>) -> Vec<TreeNode<T>> {
    let ids: HashSet<DbId> = items.iter().map(TreeItem::id).collect();

    let mut roots = Vec::new();
    let mut children: HashMap<DbId, Vec<T>> = HashMap::new();
    for item in items {
        match item.parent_id() {
            Some(parent) if ids.contains(&parent) => {
                children.entry(parent).or_default().push(item);
            }
            _ => roots.push(item),
        }
    }

    sort_items(&mut roots);
    roots
        .into_iter()
        .map(|item| attach(item, &mut children))
        .collect()
}

fn attach<T: TreeItem>(item: T, children: &mut HashMap<DbId, Vec<T>>) -> TreeNode<T> {
    let mut kids = children.remove(&item.id()).unwrap_or_default();
    sort_items(&mut kids);
    let kids = kids
        .into_iter()
        .map(|child| attach(child, children))
        .collect();
    TreeNode {
        item,
        children: kids,
    }
}

fn sort_items<T: TreeItem>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.display_order()
            .cmp(&b.display_order())
            .then_with(|| a.name().cmp(b.name()))
    });
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[derive(Debug, Clone)]
    struct Item {
        id: DbId,
        parent: Option<DbId>,
        order: i32,
        name: &'static str,
    }

    impl TreeItem for Item {
        fn id(&self) -> DbId {
            self.id
        }
        fn parent_id(&self) -> Option<DbId> {
            self.parent
        }
        fn display_order(&self) -> i32 {
            self.order
        }
        fn name(&self) -> &str {
            self.name
        }
    }

    fn item(id: DbId, parent: Option<DbId>, order: i32, name: &'static str) -> Item {
        Item {
            id,
            parent,
            order,
            name,
        }
    }

    /// 1 -> 2 -> 3, and 4 standalone.
    fn chain() -> HashMap<DbId, Option<DbId>> {
        HashMap::from([(1, None), (2, Some(1)), (3, Some(2)), (4, None)])
    }

    #[test]
    fn insert_under_existing_parent_is_allowed() {
        assert!(check_parent_assignment(None, 3, &chain()).is_ok());
    }

    #[test]
    fn missing_parent_is_not_found() {
        let err = check_parent_assignment(None, 99, &chain()).unwrap_err();
        assert_matches!(err, CoreError::NotFound { id: 99, .. });
    }

    #[test]
    fn self_parent_is_rejected() {
        let err = check_parent_assignment(Some(2), 2, &chain()).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("own parent"));
    }

    #[test]
    fn descendant_as_parent_is_a_cycle() {
        let err = check_parent_assignment(Some(1), 3, &chain()).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("cycle"));
    }

    #[test]
    fn moving_to_unrelated_branch_is_allowed() {
        assert!(check_parent_assignment(Some(2), 4, &chain()).is_ok());
        assert!(check_parent_assignment(Some(4), 3, &chain()).is_ok());
    }

    #[test]
    fn corrupt_hierarchy_is_reported() {
        let parents = HashMap::from([(1, Some(2)), (2, Some(1)), (5, None)]);
        let err = check_parent_assignment(Some(5), 1, &parents).unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }

    #[test]
    fn key_validation() {
        assert!(validate_module_key("permissions").is_ok());
        assert!(validate_module_key("hardware-inventory_2").is_ok());
        assert!(validate_module_key("").is_err());
        assert!(validate_module_key("Permissions").is_err());
        assert!(validate_module_key("with space").is_err());
        assert!(validate_module_key(&"k".repeat(MAX_KEY_LEN + 1)).is_err());
    }

    #[test]
    fn name_validation() {
        assert!(validate_module_name("Administration").is_ok());
        assert!(validate_module_name(" ").is_err());
        assert!(validate_module_name(&"n".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn forest_nests_and_orders_children() {
        let forest = build_forest(vec![
            item(9, Some(6), 3, "Countries"),
            item(6, None, 6, "Administration"),
            item(1, None, 1, "Dashboard"),
            item(7, Some(6), 1, "Roles"),
            item(8, Some(6), 2, "Permissions"),
        ]);

        let root_ids: Vec<DbId> = forest.iter().map(|n| n.item.id).collect();
        assert_eq!(root_ids, vec![1, 6]);
        let admin_children: Vec<&str> = forest[1].children.iter().map(|n| n.item.name).collect();
        assert_eq!(admin_children, vec!["Roles", "Permissions", "Countries"]);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn equal_order_falls_back_to_name() {
        let forest = build_forest(vec![item(2, None, 0, "Zeta"), item(1, None, 0, "Alpha")]);
        let names: Vec<&str> = forest.iter().map(|n| n.item.name).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn orphans_become_roots() {
        let forest = build_forest(vec![item(7, Some(6), 1, "Roles")]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].item.id, 7);
    }

    #[test]
    fn cycle_members_are_dropped() {
        let forest = build_forest(vec![
            item(1, None, 0, "Root"),
            item(2, Some(3), 0, "A"),
            item(3, Some(2), 0, "B"),
        ]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].item.id, 1);
    }
}
