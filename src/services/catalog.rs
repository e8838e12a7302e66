use crate::domain::car::Car;
use crate::domain::category::CategoryTreeNode;
use crate::domain::facet::FacetConfig;
use crate::domain::part::Part;
use crate::forms::catalog::{CarsQueryPayload, PartsQueryPayload};
use crate::pagination::Page;
use crate::repository::{CarReader, CategoryReader, PartReader};

use super::{ServiceError, ServiceResult};

/// Faceted parts search: free text, category scope and facet selections, with
/// a `has_more` look-ahead.
///
/// A category id that does not resolve is a `NotFound`, not an empty result,
/// so the shell can distinguish a stale link from an empty shelf.
pub fn search_parts<R>(payload: PartsQueryPayload, repo: &R) -> ServiceResult<Page<Part>>
where
    R: PartReader + CategoryReader,
{
    if let Some(category_id) = payload.category_id {
        if repo.get_category_by_id(category_id)?.is_none() {
            return Err(ServiceError::NotFound);
        }
    }

    Ok(repo.list_parts(payload.into_query())?)
}

/// Structured cars search. `include_hidden` is reserved for staff callers;
/// the shell decides who gets to set it.
pub fn search_cars<R>(payload: CarsQueryPayload, repo: &R) -> ServiceResult<Page<Car>>
where
    R: CarReader,
{
    Ok(repo.list_cars(payload.into_query())?)
}

/// The full category forest for the catalog sidebar.
pub fn category_tree<R>(repo: &R) -> ServiceResult<Vec<CategoryTreeNode>>
where
    R: CategoryReader,
{
    Ok(repo.category_tree()?)
}

/// Facet metadata for a leaf category.
pub fn facet_config<R>(category_id: i32, repo: &R) -> ServiceResult<FacetConfig>
where
    R: PartReader,
{
    let category_id = crate::domain::types::CategoryId::new(category_id)
        .map_err(|_| ServiceError::NotFound)?;
    Ok(repo.filter_config(category_id)?)
}

/// A single part with its specifications and gallery.
pub fn part_detail<R>(part_id: i32, repo: &R) -> ServiceResult<Part>
where
    R: PartReader,
{
    let part_id =
        crate::domain::types::PartId::new(part_id).map_err(|_| ServiceError::NotFound)?;
    repo.get_part_by_id(part_id)?.ok_or(ServiceError::NotFound)
}

/// A single car with its trim and gallery.
pub fn car_detail<R>(car_id: i32, repo: &R) -> ServiceResult<Car>
where
    R: CarReader,
{
    let car_id = crate::domain::types::CarId::new(car_id).map_err(|_| ServiceError::NotFound)?;
    repo.get_car_by_id(car_id)?.ok_or(ServiceError::NotFound)
}
