use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::part::{
    Part as DomainPart, PartSpecification as DomainPartSpecification,
};
use crate::domain::types::{
    CategoryId, Money, NonEmptyString, PartId, StockCount, TypeConstraintError,
};
use crate::models::image::Image;

/// Diesel model representing the `parts` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::parts)]
pub struct Part {
    pub id: i32,
    pub name: String,
    pub article: Option<String>,
    pub description: String,
    pub price_cents: i64,
    pub stock_count: i32,
    pub manufacturer: String,
    pub category_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Part`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::parts)]
pub struct NewPart {
    pub name: String,
    pub article: Option<String>,
    pub description: String,
    pub price_cents: i64,
    pub stock_count: i32,
    pub manufacturer: String,
    pub category_id: i32,
}

/// Diesel model representing the `part_specifications` table.
#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(table_name = crate::schema::part_specifications)]
#[diesel(belongs_to(Part))]
pub struct PartSpecification {
    pub id: i32,
    pub part_id: i32,
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
}

/// Insertable form of [`PartSpecification`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::part_specifications)]
pub struct NewPartSpecification {
    pub part_id: i32,
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
}

impl NewPartSpecification {
    pub fn from_domain(part_id: i32, spec: &DomainPartSpecification) -> Self {
        Self {
            part_id,
            name: spec.name.as_str().to_string(),
            value: spec.value.as_str().to_string(),
            unit: spec.unit.clone(),
        }
    }
}

impl TryFrom<PartSpecification> for DomainPartSpecification {
    type Error = TypeConstraintError;

    fn try_from(spec: PartSpecification) -> Result<Self, Self::Error> {
        Ok(Self {
            name: NonEmptyString::new_for_field(spec.name, "spec name")?,
            value: NonEmptyString::new_for_field(spec.value, "spec value")?,
            unit: spec.unit,
        })
    }
}

impl Part {
    /// Assemble the domain part from its row plus loaded associations.
    pub fn into_domain(
        self,
        specifications: Vec<PartSpecification>,
        images: Vec<Image>,
    ) -> Result<DomainPart, TypeConstraintError> {
        Ok(DomainPart {
            id: PartId::new(self.id)?,
            name: NonEmptyString::new_for_field(self.name, "part name")?,
            article: self
                .article
                .map(|a| NonEmptyString::new_for_field(a, "article"))
                .transpose()?,
            description: self.description,
            price: Money::new(self.price_cents)?,
            stock_count: StockCount::new(self.stock_count)?,
            manufacturer: NonEmptyString::new_for_field(self.manufacturer, "manufacturer")?,
            category_id: CategoryId::new(self.category_id)?,
            specifications: specifications
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<_>, _>>()?,
            images: images.into_iter().map(Into::into).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<&crate::domain::part::NewPart> for NewPart {
    fn from(part: &crate::domain::part::NewPart) -> Self {
        Self {
            name: part.name.as_str().to_string(),
            article: part.article.as_ref().map(|a| a.as_str().to_string()),
            description: part.description.clone(),
            price_cents: part.price.cents(),
            stock_count: part.stock_count.get(),
            manufacturer: part.manufacturer.as_str().to_string(),
            category_id: part.category_id.get(),
        }
    }
}
