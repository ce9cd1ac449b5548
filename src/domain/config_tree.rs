// SPDX-License-Identifier: MIT OR Apache-2.0

//! The namespace tree of a config layer.
//!
//! Every registered item is a leaf at its path. A leaf can never sit on the
//! path of another leaf, which keeps `a.b` and `a.b.c` from both being
//! items in one namespace.

use crate::domain::errors::RegistrationError;
use crate::domain::item::AnyItem;

/// A prefix tree over dotted item paths.
///
/// Cloning produces a deep copy: later insertions into the copy are not
/// visible in the original and vice versa.
///
/// # Examples
///
/// ```
/// use layercfg::domain::config_tree::ConfigTree;
/// use layercfg::domain::item::Item;
///
/// let mut tree = ConfigTree::new();
/// let buffer = Item::<i32>::required("network.buffer", "").unwrap();
/// let size = Item::<i32>::required("network.buffer.size", "").unwrap();
///
/// tree.insert(buffer.as_any()).unwrap();
/// assert!(tree.insert(size.as_any()).is_err());
/// ```
#[derive(Clone, Debug)]
pub enum ConfigTree {
    /// An inner node; the root node has an empty path.
    Node {
        /// Path from the root to this node
        path: Vec<String>,
        /// Child nodes and leaves in insertion order
        children: Vec<ConfigTree>,
    },
    /// A registered item.
    Leaf {
        /// Path from the root to this leaf
        path: Vec<String>,
        /// The item registered at this path
        item: AnyItem,
    },
}

impl Default for ConfigTree {
    fn default() -> Self {
        ConfigTree::new()
    }
}

impl ConfigTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        ConfigTree::Node {
            path: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the path of this node or leaf.
    pub fn path(&self) -> &[String] {
        match self {
            ConfigTree::Node { path, .. } | ConfigTree::Leaf { path, .. } => path,
        }
    }

    /// Inserts `item` at its path.
    ///
    /// Fails with `NameConflict` if the walk reaches an existing leaf before
    /// the path is exhausted, or if the path ends on an existing node. The
    /// tree is unchanged on failure.
    pub fn insert(&mut self, item: &AnyItem) -> Result<(), RegistrationError> {
        self.insert_at(item.path().segments(), item)
    }

    fn insert_at(&mut self, rest: &[String], item: &AnyItem) -> Result<(), RegistrationError> {
        match self {
            ConfigTree::Leaf { item: existing, .. } => {
                let reason = if rest.is_empty() {
                    format!("item {} has been added", existing.name())
                } else {
                    format!("item {} has been added to config", existing.name())
                };
                Err(conflict(item, reason))
            }
            ConfigTree::Node { path, children } => {
                let Some((head, tail)) = rest.split_first() else {
                    let names: Vec<String> = children
                        .iter()
                        .flat_map(ConfigTree::items)
                        .map(|item| item.name().to_string())
                        .collect();
                    return Err(conflict(
                        item,
                        format!(
                            "the following items have been added to config: {}",
                            names.join(", ")
                        ),
                    ));
                };
                if let Some(child) = children
                    .iter_mut()
                    .find(|child| child.path().last() == Some(head))
                {
                    return child.insert_at(tail, item);
                }

                let mut child_path = path.clone();
                child_path.push(head.clone());
                let child = if tail.is_empty() {
                    ConfigTree::Leaf {
                        path: child_path,
                        item: item.clone(),
                    }
                } else {
                    let mut node = ConfigTree::Node {
                        path: child_path,
                        children: Vec::new(),
                    };
                    node.insert_at(tail, item)?;
                    node
                };
                children.push(child);
                Ok(())
            }
        }
    }

    /// Finds the node or leaf at `path`.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&ConfigTree> {
        path.iter().try_fold(self, |tree, segment| match tree {
            ConfigTree::Node { children, .. } => children
                .iter()
                .find(|child| child.path().last().map(String::as_str) == Some(segment.as_ref())),
            ConfigTree::Leaf { .. } => None,
        })
    }

    /// Returns `true` if `item` is registered as a leaf of this tree.
    pub fn contains(&self, item: &AnyItem) -> bool {
        matches!(
            self.find(item.path().segments()),
            Some(ConfigTree::Leaf { item: found, .. }) if found == item
        )
    }

    /// Returns all items, in depth-first insertion order.
    pub fn items(&self) -> Vec<AnyItem> {
        let mut items = Vec::new();
        self.visit(|_| {}, |_| {}, |_, item| items.push(item.clone()));
        items
    }

    /// Walks the tree depth first.
    ///
    /// `on_enter_node` and `on_leave_node` are called around the children of
    /// every node (the root included); `on_enter_leaf` is called for every
    /// leaf.
    pub fn visit<N, L, F>(&self, mut on_enter_node: N, mut on_leave_node: L, mut on_enter_leaf: F)
    where
        N: FnMut(&[String]),
        L: FnMut(&[String]),
        F: FnMut(&[String], &AnyItem),
    {
        self.walk(&mut on_enter_node, &mut on_leave_node, &mut on_enter_leaf);
    }

    fn walk(
        &self,
        on_enter_node: &mut dyn FnMut(&[String]),
        on_leave_node: &mut dyn FnMut(&[String]),
        on_enter_leaf: &mut dyn FnMut(&[String], &AnyItem),
    ) {
        match self {
            ConfigTree::Node { path, children } => {
                on_enter_node(path);
                for child in children {
                    child.walk(on_enter_node, on_leave_node, on_enter_leaf);
                }
                on_leave_node(path);
            }
            ConfigTree::Leaf { path, item } => on_enter_leaf(path, item),
        }
    }
}

fn conflict(item: &AnyItem, reason: String) -> RegistrationError {
    RegistrationError::NameConflict {
        name: item.name().to_string(),
        reason,
    }
}
