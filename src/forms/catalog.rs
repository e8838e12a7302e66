use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{CategoryId, Money, TypeConstraintError};
use crate::pagination::Pagination;
use crate::repository::{CarFilters, CarListQuery, PartListQuery, SpecSelection, SpecsFilter};

#[derive(Debug, Error)]
pub enum CatalogFormError {
    #[error("catalog form validation failed: {0}")]
    Validation(String),
    #[error("catalog form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("malformed specs filter: {0}")]
    SpecsFilter(String),
}

impl From<ValidationErrors> for CatalogFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CatalogFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn default_limit() -> i64 {
    crate::pagination::DEFAULT_PAGE_SIZE
}

/// Raw parts search/filter request.
#[derive(Debug, Deserialize, Validate)]
pub struct PartsQueryForm {
    #[serde(default)]
    pub query: String,
    pub category_id: Option<i32>,
    /// JSON document: `{"Name": "value"}`, `{"Name": ["a", "b"]}` or
    /// `{"Name": {"min": 1, "max": 2}}`.
    pub specs: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 50))]
    pub limit: i64,
}

/// Validated parts query ready for the repository.
#[derive(Debug, Clone)]
pub struct PartsQueryPayload {
    pub query: Option<String>,
    pub category_id: Option<CategoryId>,
    pub specs: SpecsFilter,
    pub pagination: Pagination,
}

impl PartsQueryPayload {
    pub fn into_query(self) -> PartListQuery {
        let mut query = PartListQuery::default().specs(self.specs);
        query.pagination = self.pagination;
        if let Some(search) = self.query {
            query = query.search(search);
        }
        if let Some(category_id) = self.category_id {
            query = query.category(category_id);
        }
        query
    }
}

impl TryFrom<PartsQueryForm> for PartsQueryPayload {
    type Error = CatalogFormError;

    fn try_from(form: PartsQueryForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let specs = match form.specs.as_deref() {
            Some(raw) => parse_specs_filter(raw)?,
            None => SpecsFilter::new(),
        };

        let query = Some(form.query.trim().to_string()).filter(|q| !q.is_empty());

        Ok(Self {
            query,
            category_id: form.category_id.map(CategoryId::new).transpose()?,
            specs,
            pagination: Pagination::new(form.offset, form.limit),
        })
    }
}

/// Parse the facet selection JSON. Malformed documents are rejected, never
/// silently ignored.
pub fn parse_specs_filter(raw: &str) -> Result<SpecsFilter, CatalogFormError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| CatalogFormError::SpecsFilter(e.to_string()))?;

    let serde_json::Value::Object(entries) = value else {
        return Err(CatalogFormError::SpecsFilter(
            "specs filter must be a JSON object".to_string(),
        ));
    };

    let mut filter = SpecsFilter::new();
    for (name, selection) in entries {
        let parsed = match selection {
            serde_json::Value::String(value) => SpecSelection::Options(vec![value]),
            serde_json::Value::Array(values) => {
                let options = values
                    .into_iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => Ok(s),
                        other => Err(CatalogFormError::SpecsFilter(format!(
                            "option for {name:?} must be a string, got {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                SpecSelection::Options(options)
            }
            serde_json::Value::Object(bounds) => {
                for key in bounds.keys() {
                    if key != "min" && key != "max" {
                        return Err(CatalogFormError::SpecsFilter(format!(
                            "unknown range key {key:?} for {name:?}"
                        )));
                    }
                }
                let bound = |key: &str| -> Result<Option<f64>, CatalogFormError> {
                    match bounds.get(key) {
                        None | Some(serde_json::Value::Null) => Ok(None),
                        Some(v) => v.as_f64().map(Some).ok_or_else(|| {
                            CatalogFormError::SpecsFilter(format!(
                                "range bound {key:?} for {name:?} must be a number"
                            ))
                        }),
                    }
                };
                let min = bound("min")?;
                let max = bound("max")?;
                if min.is_none() && max.is_none() {
                    return Err(CatalogFormError::SpecsFilter(format!(
                        "range for {name:?} needs min or max"
                    )));
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(CatalogFormError::SpecsFilter(format!(
                            "range for {name:?} has min above max"
                        )));
                    }
                }
                SpecSelection::Range { min, max }
            }
            other => {
                return Err(CatalogFormError::SpecsFilter(format!(
                    "selection for {name:?} must be a string, array or range object, got {other}"
                )));
            }
        };
        filter.insert(name, parsed);
    }

    Ok(filter)
}

/// Raw cars search/filter request.
#[derive(Debug, Deserialize, Validate)]
pub struct CarsQueryForm {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub fuel_types: Vec<String>,
    #[serde(default)]
    pub transmissions: Vec<String>,
    #[serde(default)]
    pub drive_types: Vec<String>,
    #[serde(default)]
    pub body_types: Vec<String>,
    pub min_mileage: Option<i32>,
    pub max_mileage: Option<i32>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    /// Minor units.
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_engine_volume: Option<f64>,
    pub max_engine_volume: Option<f64>,
    pub min_engine_power: Option<i32>,
    pub max_engine_power: Option<i32>,
    pub min_engine_torque: Option<i32>,
    pub max_engine_torque: Option<i32>,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 50))]
    pub limit: i64,
}

impl Default for CarsQueryForm {
    fn default() -> Self {
        Self {
            query: String::new(),
            colors: Vec::new(),
            conditions: Vec::new(),
            brands: Vec::new(),
            fuel_types: Vec::new(),
            transmissions: Vec::new(),
            drive_types: Vec::new(),
            body_types: Vec::new(),
            min_mileage: None,
            max_mileage: None,
            min_year: None,
            max_year: None,
            min_price: None,
            max_price: None,
            min_engine_volume: None,
            max_engine_volume: None,
            min_engine_power: None,
            max_engine_power: None,
            min_engine_torque: None,
            max_engine_torque: None,
            include_hidden: false,
            offset: 0,
            limit: default_limit(),
        }
    }
}

/// Validated cars query ready for the repository.
#[derive(Debug, Clone)]
pub struct CarsQueryPayload {
    pub query: Option<String>,
    pub filters: CarFilters,
    pub include_hidden: bool,
    pub pagination: Pagination,
}

impl CarsQueryPayload {
    pub fn into_query(self) -> CarListQuery {
        let mut query = CarListQuery::default()
            .filters(self.filters)
            .include_hidden(self.include_hidden);
        query.pagination = self.pagination;
        if let Some(search) = self.query {
            query = query.search(search);
        }
        query
    }
}

fn parse_each<T: std::str::FromStr<Err = TypeConstraintError>>(
    values: &[String],
) -> Result<Vec<T>, CatalogFormError> {
    values
        .iter()
        .map(|v| v.parse().map_err(CatalogFormError::from))
        .collect()
}

impl TryFrom<CarsQueryForm> for CarsQueryPayload {
    type Error = CatalogFormError;

    fn try_from(form: CarsQueryForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let filters = CarFilters {
            colors: form.colors,
            conditions: parse_each(&form.conditions)?,
            brands: form.brands,
            fuel_types: parse_each(&form.fuel_types)?,
            transmissions: parse_each(&form.transmissions)?,
            drive_types: parse_each(&form.drive_types)?,
            body_types: parse_each(&form.body_types)?,
            min_mileage: form.min_mileage,
            max_mileage: form.max_mileage,
            min_year: form.min_year,
            max_year: form.max_year,
            min_price: form.min_price.map(Money::new).transpose()?,
            max_price: form.max_price.map(Money::new).transpose()?,
            min_engine_volume: form.min_engine_volume,
            max_engine_volume: form.max_engine_volume,
            min_engine_power: form.min_engine_power,
            max_engine_power: form.max_engine_power,
            min_engine_torque: form.min_engine_torque,
            max_engine_torque: form.max_engine_torque,
        };

        let query = Some(form.query.trim().to_string()).filter(|q| !q.is_empty());

        Ok(Self {
            query,
            filters,
            include_hidden: form.include_hidden,
            pagination: Pagination::new(form.offset, form.limit),
        })
    }
}
