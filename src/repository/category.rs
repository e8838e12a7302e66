use std::collections::{BTreeSet, HashMap};

use diesel::prelude::*;

use crate::domain::category::{Category, CategoryTreeNode, NewCategory};
use crate::domain::types::{CategoryId, NonEmptyString};
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CategoryReader, CategoryWriter, DieselRepository};

impl CategoryReader for DieselRepository {
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::id.eq(id.get()))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(TryInto::try_into).transpose()?)
    }

    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let items = categories::table
            .order(categories::name.asc())
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn is_leaf(&self, id: CategoryId) -> RepositoryResult<bool> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let children: i64 = categories::table
            .filter(categories::parent_id.eq(Some(id.get())))
            .count()
            .get_result(&mut conn)?;

        Ok(children == 0)
    }

    fn descendants(&self, roots: &[CategoryId]) -> RepositoryResult<BTreeSet<CategoryId>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let mut visited: BTreeSet<i32> = roots.iter().map(|c| c.get()).collect();
        let mut frontier: Vec<i32> = visited.iter().copied().collect();

        // The visited set bounds the walk even if stored parent pointers form
        // a cycle.
        while !frontier.is_empty() {
            let parents: Vec<Option<i32>> = frontier.iter().copied().map(Some).collect();
            let children: Vec<i32> = categories::table
                .filter(categories::parent_id.eq_any(parents))
                .select(categories::id)
                .load(&mut conn)?;

            frontier = children
                .into_iter()
                .filter(|id| visited.insert(*id))
                .collect();
        }

        visited
            .into_iter()
            .map(|id| CategoryId::new(id).map_err(Into::into))
            .collect()
    }

    fn category_tree(&self) -> RepositoryResult<Vec<CategoryTreeNode>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let rows = categories::table
            .order(categories::name.asc())
            .load::<DbCategory>(&mut conn)?;

        let mut by_parent: HashMap<Option<i32>, Vec<&DbCategory>> = HashMap::new();
        for row in &rows {
            by_parent.entry(row.parent_id).or_default().push(row);
        }

        fn build(
            parent: Option<i32>,
            by_parent: &HashMap<Option<i32>, Vec<&DbCategory>>,
        ) -> RepositoryResult<Vec<CategoryTreeNode>> {
            let Some(children) = by_parent.get(&parent) else {
                return Ok(Vec::new());
            };
            children
                .iter()
                .map(|row| {
                    let nested = build(Some(row.id), by_parent)?;
                    Ok(CategoryTreeNode {
                        id: CategoryId::new(row.id)?,
                        name: row.name.clone(),
                        is_leaf: nested.is_empty(),
                        children: nested,
                    })
                })
                .collect()
        }

        build(None, &by_parent)
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        if let Some(parent_id) = category.parent_id {
            let parent_exists: i64 = categories::table
                .filter(categories::id.eq(parent_id.get()))
                .count()
                .get_result(&mut conn)?;
            if parent_exists == 0 {
                return Err(RepositoryError::NotFound);
            }
        }

        let db_category: DbNewCategory = category.clone().into();
        let created = diesel::insert_into(categories::table)
            .values(db_category)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn rename_category(&self, id: CategoryId, name: &NonEmptyString) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let affected = diesel::update(categories::table.filter(categories::id.eq(id.get())))
            .set(categories::name.eq(name.as_str()))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let doomed: Vec<i32> = self.descendants(&[id])?.iter().map(|c| c.get()).collect();

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            diesel::delete(categories::table.filter(categories::id.eq_any(doomed)))
                .execute(conn)
        })?;

        self.spec_cache().clear();

        Ok(affected)
    }
}
