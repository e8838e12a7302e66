use diesel::prelude::*;

use crate::domain::category::Category as DomainCategory;
use crate::domain::types::{CategoryId, NonEmptyString, TypeConstraintError};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
}

/// Insertable form of [`Category`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub name: String,
    pub parent_id: Option<i32>,
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CategoryId::new(category.id)?,
            name: NonEmptyString::new_for_field(category.name, "category name")?,
            parent_id: category.parent_id.map(CategoryId::new).transpose()?,
        })
    }
}

impl From<crate::domain::category::NewCategory> for NewCategory {
    fn from(category: crate::domain::category::NewCategory) -> Self {
        Self {
            name: category.name.into_inner(),
            parent_id: category.parent_id.map(CategoryId::get),
        }
    }
}
