use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;

use crate::db::DbConnection;
use crate::domain::facet::{self, SpecSample};
use crate::domain::part::{NewPart, Part, PartUpdate};
use crate::domain::types::{CategoryId, PartId};
use crate::models::image::{Image as DbImage, NewImage};
use crate::models::part::{
    NewPart as DbNewPart, NewPartSpecification, Part as DbPart,
    PartSpecification as DbPartSpecification,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CategoryReader, DieselRepository, PartListQuery, PartReader, PartWriter, SpecSelection,
};

/// Search tokens shorter than this are discarded.
const MIN_TOKEN_LEN: usize = 2;
/// Free-text search collects at most this many candidate ids before the
/// filter stage, like the two-phase search in the storefront it replaced.
const SEARCH_CANDIDATE_CAP: i64 = 200;

/// Explicit cache of facet samples keyed by category id.
///
/// Every part write must call [`SpecCache::invalidate`] for the categories it
/// touches; reads go through [`SpecCache::get`].
#[derive(Clone, Default)]
pub(crate) struct SpecCache {
    inner: Arc<Mutex<HashMap<i32, Arc<BTreeMap<String, Vec<SpecSample>>>>>>,
}

impl SpecCache {
    pub(crate) fn get(&self, category_id: i32) -> Option<Arc<BTreeMap<String, Vec<SpecSample>>>> {
        self.inner.lock().expect("spec cache poisoned").get(&category_id).cloned()
    }

    pub(crate) fn insert(
        &self,
        category_id: i32,
        specs: BTreeMap<String, Vec<SpecSample>>,
    ) -> Arc<BTreeMap<String, Vec<SpecSample>>> {
        let specs = Arc::new(specs);
        self.inner
            .lock()
            .expect("spec cache poisoned")
            .insert(category_id, Arc::clone(&specs));
        specs
    }

    pub(crate) fn invalidate(&self, category_id: i32) {
        self.inner.lock().expect("spec cache poisoned").remove(&category_id);
    }

    pub(crate) fn clear(&self) {
        self.inner.lock().expect("spec cache poisoned").clear();
    }
}

/// Split a raw query into usable search tokens.
fn search_tokens(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

type PartPredicate = Box<dyn BoxableExpression<crate::schema::parts::table, Sqlite, SqlType = Bool>>;

/// Candidate part ids for a free-text query: a part matches if any token
/// substring-matches its name, article or manufacturer, or a specification
/// name or value. Returns `None` when the query holds no usable token, which
/// means "match everything".
fn search_part_ids(conn: &mut DbConnection, raw: &str) -> RepositoryResult<Option<Vec<i32>>> {
    use crate::schema::{part_specifications, parts};

    let tokens = search_tokens(raw);
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut predicate: Option<PartPredicate> = None;
    for token in &tokens {
        let pattern = format!("%{token}%");
        let spec_match = part_specifications::table
            .filter(
                part_specifications::name
                    .like(pattern.clone())
                    .or(part_specifications::value.like(pattern.clone())),
            )
            .select(part_specifications::part_id);

        let token_match: PartPredicate = Box::new(
            parts::name
                .like(pattern.clone())
                .or(parts::article
                    .is_not_null()
                    .and(parts::article.assume_not_null().like(pattern.clone())))
                .or(parts::manufacturer.like(pattern))
                .or(parts::id.eq_any(spec_match)),
        );

        predicate = Some(match predicate {
            Some(prior) => Box::new(prior.or(token_match)),
            None => token_match,
        });
    }

    let predicate = predicate.expect("tokens are non-empty");
    let ids = parts::table
        .filter(predicate)
        .select(parts::id)
        .limit(SEARCH_CANDIDATE_CAP)
        .load::<i32>(conn)?;

    Ok(Some(ids))
}

/// Load specifications and images for a page of part rows and assemble domain
/// parts.
fn assemble_parts(conn: &mut DbConnection, rows: Vec<DbPart>) -> RepositoryResult<Vec<Part>> {
    use crate::schema::{images, part_specifications};

    let ids: Vec<i32> = rows.iter().map(|p| p.id).collect();

    let mut specs_by_part: HashMap<i32, Vec<DbPartSpecification>> = HashMap::new();
    let specs = part_specifications::table
        .filter(part_specifications::part_id.eq_any(&ids))
        .order(part_specifications::id.asc())
        .load::<DbPartSpecification>(conn)?;
    for spec in specs {
        specs_by_part.entry(spec.part_id).or_default().push(spec);
    }

    let mut images_by_part: HashMap<i32, Vec<DbImage>> = HashMap::new();
    let part_keys: Vec<Option<i32>> = ids.iter().copied().map(Some).collect();
    let image_rows = images::table
        .filter(images::part_id.eq_any(part_keys))
        .order(images::sort_order.asc())
        .load::<DbImage>(conn)?;
    for image in image_rows {
        if let Some(part_id) = image.part_id {
            images_by_part.entry(part_id).or_default().push(image);
        }
    }

    rows.into_iter()
        .map(|row| {
            let specs = specs_by_part.remove(&row.id).unwrap_or_default();
            let images = images_by_part.remove(&row.id).unwrap_or_default();
            row.into_domain(specs, images).map_err(Into::into)
        })
        .collect()
}

impl PartReader for DieselRepository {
    fn list_parts(&self, query: PartListQuery) -> RepositoryResult<crate::pagination::Page<Part>> {
        use crate::schema::{part_specifications, parts};

        let mut conn = self.conn()?;

        let mut items = parts::table.into_boxed::<Sqlite>();

        if let Some(raw) = query.search.as_deref() {
            if let Some(ids) = search_part_ids(&mut conn, raw)? {
                items = items.filter(parts::id.eq_any(ids));
            }
        }

        if let Some(category_id) = query.category_id {
            let scope: Vec<i32> = self
                .descendants(&[category_id])?
                .iter()
                .map(|c| c.get())
                .collect();
            items = items.filter(parts::category_id.eq_any(scope));
        }

        for (name, selection) in &query.specs {
            match selection {
                SpecSelection::Options(values) => {
                    let sub = part_specifications::table
                        .filter(part_specifications::name.eq(name.clone()))
                        .filter(part_specifications::value.eq_any(values.clone()))
                        .select(part_specifications::part_id);
                    items = items.filter(parts::id.eq_any(sub));
                }
                SpecSelection::Range { min, max } => {
                    // The permissive parser cannot run in SQL; pull the spec
                    // rows for this name and band-match in memory.
                    let rows: Vec<(i32, String)> = part_specifications::table
                        .filter(part_specifications::name.eq(name.clone()))
                        .select((part_specifications::part_id, part_specifications::value))
                        .load(&mut conn)?;
                    let matching: Vec<i32> = rows
                        .into_iter()
                        .filter(|(_, value)| match facet::parse_numeric(value) {
                            Some(v) => {
                                min.is_none_or(|lo| v >= lo) && max.is_none_or(|hi| v <= hi)
                            }
                            None => false,
                        })
                        .map(|(id, _)| id)
                        .collect();
                    items = items.filter(parts::id.eq_any(matching));
                }
            }
        }

        let rows = items
            .order(parts::id.asc())
            .offset(query.pagination.offset)
            .limit(query.pagination.limit + 1)
            .load::<DbPart>(&mut conn)?;

        let limit = query.pagination.limit;
        let parts = assemble_parts(&mut conn, rows)?;
        Ok(crate::pagination::Page::from_lookahead(parts, limit))
    }

    fn get_part_by_id(&self, id: PartId) -> RepositoryResult<Option<Part>> {
        use crate::schema::parts;

        let mut conn = self.conn()?;

        let row = parts::table
            .filter(parts::id.eq(id.get()))
            .first::<DbPart>(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(assemble_parts(&mut conn, vec![row])?.pop())
    }

    fn specs_for_category(
        &self,
        category_id: CategoryId,
    ) -> RepositoryResult<BTreeMap<String, Vec<SpecSample>>> {
        use crate::schema::{part_specifications, parts};

        if self.get_category_by_id(category_id)?.is_none() {
            return Err(RepositoryError::NotFound);
        }

        if let Some(cached) = self.spec_cache().get(category_id.get()) {
            return Ok((*cached).clone());
        }

        let mut conn = self.conn()?;

        let rows: Vec<(String, String, Option<String>)> = part_specifications::table
            .inner_join(parts::table)
            .filter(parts::category_id.eq(category_id.get()))
            .select((
                part_specifications::name,
                part_specifications::value,
                part_specifications::unit,
            ))
            .distinct()
            .load(&mut conn)?;

        let mut specs: BTreeMap<String, Vec<SpecSample>> = BTreeMap::new();
        for (name, value, unit) in rows {
            specs.entry(name).or_default().push(SpecSample::new(value, unit));
        }

        self.spec_cache().insert(category_id.get(), specs.clone());
        Ok(specs)
    }

    fn filter_config(&self, category_id: CategoryId) -> RepositoryResult<facet::FacetConfig> {
        if self.get_category_by_id(category_id)?.is_none() {
            return Err(RepositoryError::NotFound);
        }
        // Facets above leaf level would mix incompatible attribute
        // vocabularies.
        if !self.is_leaf(category_id)? {
            return Err(RepositoryError::InvalidOperation(
                "facet filters are only available on leaf categories".to_string(),
            ));
        }

        let specs = self.specs_for_category(category_id)?;
        Ok(specs
            .into_iter()
            .map(|(name, samples)| (name, facet::classify(&samples)))
            .collect())
    }
}

impl PartWriter for DieselRepository {
    fn create_part(&self, part: &NewPart) -> RepositoryResult<Part> {
        use crate::schema::{images, part_specifications, parts};

        if self.get_category_by_id(part.category_id)?.is_none() {
            return Err(RepositoryError::NotFound);
        }
        if !self.is_leaf(part.category_id)? {
            return Err(RepositoryError::InvalidOperation(
                "parts can only be filed under leaf categories".to_string(),
            ));
        }

        let mut conn = self.conn()?;

        let created = conn.transaction::<DbPart, RepositoryError, _>(|conn| {
            if let Some(article) = part.article.as_ref() {
                let clashes: i64 = parts::table
                    .filter(parts::article.eq(article.as_str()))
                    .count()
                    .get_result(conn)?;
                if clashes > 0 {
                    return Err(RepositoryError::ValidationError(format!(
                        "a part with article {article} already exists"
                    )));
                }
            }

            let db_part: DbNewPart = part.into();
            let row = diesel::insert_into(parts::table)
                .values(db_part)
                .get_result::<DbPart>(conn)?;

            let specs: Vec<NewPartSpecification> = part
                .specifications
                .iter()
                .map(|spec| NewPartSpecification::from_domain(row.id, spec))
                .collect();
            diesel::insert_into(part_specifications::table)
                .values(&specs)
                .execute(conn)?;

            let image_rows: Vec<NewImage> = part
                .images
                .iter()
                .map(|image| NewImage::for_part(row.id, image))
                .collect();
            diesel::insert_into(images::table)
                .values(&image_rows)
                .execute(conn)?;

            Ok(row)
        })?;

        self.spec_cache().invalidate(part.category_id.get());

        let part_id = PartId::new(created.id)?;
        self.get_part_by_id(part_id)?.ok_or(RepositoryError::NotFound)
    }

    fn update_part(&self, id: PartId, update: &PartUpdate) -> RepositoryResult<Part> {
        use crate::schema::{images, part_specifications, parts};

        let mut conn = self.conn()?;

        let old_category = conn.transaction::<i32, RepositoryError, _>(|conn| {
            let existing = parts::table
                .filter(parts::id.eq(id.get()))
                .first::<DbPart>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            if let Some(Some(article)) = update.article.as_ref() {
                let clashes: i64 = parts::table
                    .filter(parts::article.eq(article.as_str()))
                    .filter(parts::id.ne(id.get()))
                    .count()
                    .get_result(conn)?;
                if clashes > 0 {
                    return Err(RepositoryError::ValidationError(format!(
                        "a part with article {article} already exists"
                    )));
                }
            }

            diesel::update(parts::table.filter(parts::id.eq(id.get())))
                .set((
                    update.name.as_ref().map(|v| parts::name.eq(v.as_str().to_string())),
                    update
                        .article
                        .as_ref()
                        .map(|v| parts::article.eq(v.as_ref().map(|a| a.as_str().to_string()))),
                    update.description.as_ref().map(|v| parts::description.eq(v.clone())),
                    update.price.map(|v| parts::price_cents.eq(v.cents())),
                    update.stock_count.map(|v| parts::stock_count.eq(v.get())),
                    update
                        .manufacturer
                        .as_ref()
                        .map(|v| parts::manufacturer.eq(v.as_str().to_string())),
                    update.category_id.map(|v| parts::category_id.eq(v.get())),
                    parts::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;

            if let Some(specs) = update.specifications.as_ref() {
                diesel::delete(
                    part_specifications::table
                        .filter(part_specifications::part_id.eq(id.get())),
                )
                .execute(conn)?;
                let rows: Vec<NewPartSpecification> = specs
                    .iter()
                    .map(|spec| NewPartSpecification::from_domain(id.get(), spec))
                    .collect();
                diesel::insert_into(part_specifications::table)
                    .values(&rows)
                    .execute(conn)?;
            }

            if let Some(image_list) = update.images.as_ref() {
                diesel::delete(images::table.filter(images::part_id.eq(Some(id.get()))))
                    .execute(conn)?;
                let rows: Vec<NewImage> = image_list
                    .iter()
                    .map(|image| NewImage::for_part(id.get(), image))
                    .collect();
                diesel::insert_into(images::table).values(&rows).execute(conn)?;
            }

            Ok(existing.category_id)
        })?;

        self.spec_cache().invalidate(old_category);
        if let Some(new_category) = update.category_id {
            self.spec_cache().invalidate(new_category.get());
        }

        self.get_part_by_id(id)?.ok_or(RepositoryError::NotFound)
    }

    fn delete_part(&self, id: PartId) -> RepositoryResult<usize> {
        use crate::schema::{cart_items, images, part_specifications, parts};

        let mut conn = self.conn()?;

        let (affected, category_id) = conn.transaction::<(usize, Option<i32>), RepositoryError, _>(
            |conn| {
                let category_id = parts::table
                    .filter(parts::id.eq(id.get()))
                    .select(parts::category_id)
                    .first::<i32>(conn)
                    .optional()?;

                diesel::delete(
                    part_specifications::table
                        .filter(part_specifications::part_id.eq(id.get())),
                )
                .execute(conn)?;
                diesel::delete(images::table.filter(images::part_id.eq(Some(id.get()))))
                    .execute(conn)?;
                diesel::delete(cart_items::table.filter(cart_items::part_id.eq(id.get())))
                    .execute(conn)?;

                let affected =
                    diesel::delete(parts::table.filter(parts::id.eq(id.get()))).execute(conn)?;
                Ok((affected, category_id))
            },
        )?;

        if let Some(category_id) = category_id {
            self.spec_cache().invalidate(category_id);
        }

        Ok(affected)
    }
}
