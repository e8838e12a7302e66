use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, NonEmptyString};

/// A node of the part category tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: NonEmptyString,
    pub parent_id: Option<CategoryId>,
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: NonEmptyString,
    pub parent_id: Option<CategoryId>,
}

/// A category with its children, as served to the catalog filter UI.
///
/// Only leaf nodes expose facet filters; the flag spares the caller another
/// round trip to find out.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTreeNode {
    pub id: CategoryId,
    pub name: String,
    pub is_leaf: bool,
    pub children: Vec<CategoryTreeNode>,
}
