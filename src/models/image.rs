use diesel::prelude::*;

use crate::domain::part::Image as DomainImage;

/// Diesel model representing the `images` table. A row belongs to either a
/// part or a car.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::images)]
pub struct Image {
    pub id: i32,
    pub part_id: Option<i32>,
    pub car_id: Option<i32>,
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
}

/// Insertable form of [`Image`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::images)]
pub struct NewImage {
    pub part_id: Option<i32>,
    pub car_id: Option<i32>,
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
}

impl From<Image> for DomainImage {
    fn from(image: Image) -> Self {
        Self {
            url: image.url,
            alt_text: image.alt_text,
            sort_order: image.sort_order,
        }
    }
}

impl NewImage {
    pub fn for_part(part_id: i32, image: &DomainImage) -> Self {
        Self {
            part_id: Some(part_id),
            car_id: None,
            url: image.url.clone(),
            alt_text: image.alt_text.clone(),
            sort_order: image.sort_order,
        }
    }

    pub fn for_car(car_id: i32, image: &DomainImage) -> Self {
        Self {
            part_id: None,
            car_id: Some(car_id),
            url: image.url.clone(),
            alt_text: image.alt_text.clone(),
            sort_order: image.sort_order,
        }
    }
}
