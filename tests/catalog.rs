use std::collections::BTreeMap;

use diesel::prelude::*;

use avtomarket::domain::facet::FacetDescriptor;
use avtomarket::domain::part::{NewPart, PartSpecification};
use avtomarket::domain::types::{CategoryId, Money, NonEmptyString, StockCount};
use avtomarket::forms::catalog::parse_specs_filter;
use avtomarket::repository::errors::RepositoryError;
use avtomarket::repository::{
    CarFilters, CarListQuery, CarReader, CategoryReader, CategoryWriter, DieselRepository,
    PartListQuery, PartReader, PartWriter,
};
use avtomarket::schema::categories;

mod common;

use common::{seed_car, seed_category, seed_part, seed_spec, seed_trim};

fn brakes_fixture(repo_pool: &avtomarket::db::DbPool) -> (i32, i32) {
    let root = seed_category(repo_pool, "Parts", None);
    let brakes = seed_category(repo_pool, "Brakes", Some(root));

    let d280 = seed_part(repo_pool, "Brake disc 280", Some("BD-280"), brakes, 100_000, 5, "Brembo");
    let d300 = seed_part(repo_pool, "Brake disc 300", Some("BD-300"), brakes, 120_000, 5, "Bosch");
    let d305 = seed_part(repo_pool, "Brake disc 305", Some("BD-305"), brakes, 130_000, 5, "Zimmermann");
    seed_spec(repo_pool, d280, "Diameter", "280 мм", Some("мм"));
    seed_spec(repo_pool, d300, "Diameter", "300 мм", Some("мм"));
    seed_spec(repo_pool, d305, "Diameter", "305 мм", Some("мм"));

    (root, brakes)
}

#[test]
fn facet_config_classifies_numeric_specs_as_range() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let (_, brakes) = brakes_fixture(&test_db.pool());

    let config = repo.filter_config(CategoryId::new(brakes).unwrap()).unwrap();
    assert_eq!(
        config.get("Diameter"),
        Some(&FacetDescriptor::Range {
            min: 280.0,
            max: 305.0,
            unit: Some("мм".to_string()),
        })
    );
}

#[test]
fn facet_config_rejects_non_leaf_and_unknown_categories() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let (root, _) = brakes_fixture(&test_db.pool());

    let err = repo.filter_config(CategoryId::new(root).unwrap()).unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidOperation(_)));

    let err = repo.filter_config(CategoryId::new(999).unwrap()).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn facet_cache_is_invalidated_by_part_writes() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let (_, brakes) = brakes_fixture(&test_db.pool());
    let brakes_id = CategoryId::new(brakes).unwrap();

    let before = repo.filter_config(brakes_id).unwrap();
    assert!(!before.contains_key("Material"));

    repo.create_part(&NewPart {
        name: NonEmptyString::new("Brake pad set").unwrap(),
        article: None,
        description: String::new(),
        price: Money::new(40_000).unwrap(),
        stock_count: StockCount::new(10).unwrap(),
        manufacturer: NonEmptyString::new("TRW").unwrap(),
        category_id: brakes_id,
        specifications: vec![PartSpecification {
            name: NonEmptyString::new("Material").unwrap(),
            value: NonEmptyString::new("ceramic").unwrap(),
            unit: None,
        }],
        images: vec![],
    })
    .unwrap();

    let after = repo.filter_config(brakes_id).unwrap();
    assert!(matches!(
        after.get("Material"),
        Some(FacetDescriptor::Options { .. })
    ));
}

#[test]
fn range_filter_matches_numeric_band_only() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let (_, brakes) = brakes_fixture(&test_db.pool());

    let specs = parse_specs_filter(r#"{"Diameter": {"min": 290, "max": 310}}"#).unwrap();
    let page = repo
        .list_parts(
            PartListQuery::default()
                .category(CategoryId::new(brakes).unwrap())
                .specs(specs),
        )
        .unwrap();

    let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Brake disc 300", "Brake disc 305"]);
}

#[test]
fn options_filter_requires_exact_spec_value() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let (_, brakes) = brakes_fixture(&test_db.pool());

    let specs = parse_specs_filter(r#"{"Diameter": ["280 мм"]}"#).unwrap();
    let page = repo
        .list_parts(
            PartListQuery::default()
                .category(CategoryId::new(brakes).unwrap())
                .specs(specs),
        )
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name.as_str(), "Brake disc 280");
}

#[test]
fn text_search_covers_name_article_manufacturer_and_specs() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    brakes_fixture(&test_db.pool());
    let filters = seed_category(&test_db.pool(), "Filters", None);
    let oil = seed_part(&test_db.pool(), "Oil filter", Some("OF-1"), filters, 5_000, 9, "Mann-Filter");
    seed_spec(&test_db.pool(), oil, "Thread", "M20x1.5", None);

    // manufacturer match
    let page = repo
        .list_parts(PartListQuery::default().search("brembo"))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].manufacturer.as_str(), "Brembo");

    // article match
    let page = repo
        .list_parts(PartListQuery::default().search("OF-1"))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name.as_str(), "Oil filter");

    // specification value match
    let page = repo
        .list_parts(PartListQuery::default().search("M20x1.5"))
        .unwrap();
    assert_eq!(page.items.len(), 1);

    // single-character tokens are discarded -> matches everything
    let page = repo.list_parts(PartListQuery::default().search("a")).unwrap();
    assert_eq!(page.items.len(), 4);

    // any-token semantics
    let page = repo
        .list_parts(PartListQuery::default().search("brembo bosch"))
        .unwrap();
    assert_eq!(page.items.len(), 2);
}

#[test]
fn category_scope_includes_descendants() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let (root, _) = brakes_fixture(&test_db.pool());

    let page = repo
        .list_parts(PartListQuery::default().category(CategoryId::new(root).unwrap()))
        .unwrap();
    assert_eq!(page.items.len(), 3);
}

#[test]
fn descendants_terminate_on_corrupted_cyclic_tree() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let root = seed_category(&test_db.pool(), "A", None);
    let child = seed_category(&test_db.pool(), "B", Some(root));

    // Corrupt the tree: point the root back at its own child.
    let mut conn = test_db.pool().get().unwrap();
    diesel::update(categories::table.filter(categories::id.eq(root)))
        .set(categories::parent_id.eq(Some(child)))
        .execute(&mut conn)
        .unwrap();

    let closure = repo.descendants(&[CategoryId::new(root).unwrap()]).unwrap();
    assert_eq!(closure.len(), 2);
}

#[test]
fn category_tree_is_name_sorted_with_leaf_flags() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let pool = test_db.pool();

    let parts = seed_category(&pool, "Parts", None);
    seed_category(&pool, "Suspension", Some(parts));
    seed_category(&pool, "Brakes", Some(parts));
    seed_category(&pool, "Accessories", None);

    let forest = repo.category_tree().unwrap();
    let names: Vec<&str> = forest.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Accessories", "Parts"]);

    assert!(forest[0].is_leaf);
    assert!(!forest[1].is_leaf);
    let children: Vec<&str> = forest[1].children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(children, vec!["Brakes", "Suspension"]);
    assert!(forest[1].children.iter().all(|c| c.is_leaf));
}

#[test]
fn pagination_lookahead_reports_has_more() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    brakes_fixture(&test_db.pool());

    let first = repo
        .list_parts(PartListQuery::default().paginate(0, 2))
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert!(first.has_more);

    let second = repo
        .list_parts(PartListQuery::default().paginate(2, 2))
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(!second.has_more);
}

#[test]
fn duplicate_article_is_rejected() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let (_, brakes) = brakes_fixture(&test_db.pool());

    let err = repo
        .create_part(&NewPart {
            name: NonEmptyString::new("Another disc").unwrap(),
            article: Some(NonEmptyString::new("BD-280").unwrap()),
            description: String::new(),
            price: Money::new(1_000).unwrap(),
            stock_count: StockCount::new(1).unwrap(),
            manufacturer: NonEmptyString::new("Brembo").unwrap(),
            category_id: CategoryId::new(brakes).unwrap(),
            specifications: vec![],
            images: vec![],
        })
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError(_)));
}

#[test]
fn parts_cannot_be_filed_under_non_leaf_categories() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let (root, _) = brakes_fixture(&test_db.pool());

    let err = repo
        .create_part(&NewPart {
            name: NonEmptyString::new("Lost part").unwrap(),
            article: None,
            description: String::new(),
            price: Money::new(1_000).unwrap(),
            stock_count: StockCount::new(1).unwrap(),
            manufacturer: NonEmptyString::new("Bosch").unwrap(),
            category_id: CategoryId::new(root).unwrap(),
            specifications: vec![],
            images: vec![],
        })
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidOperation(_)));
}

#[test]
fn deleting_a_category_cascades_to_descendants() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let pool = test_db.pool();

    let root = seed_category(&pool, "Parts", None);
    let mid = seed_category(&pool, "Brakes", Some(root));
    seed_category(&pool, "Discs", Some(mid));

    let removed = repo.delete_category(CategoryId::new(root).unwrap()).unwrap();
    assert!(removed >= 1);
    assert!(repo.list_categories().unwrap().is_empty());
}

#[test]
fn specs_for_category_returns_distinct_samples() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let (_, brakes) = brakes_fixture(&test_db.pool());

    // duplicate sample must collapse
    let extra = seed_part(&test_db.pool(), "Brake disc 280 v2", None, brakes, 90_000, 2, "Brembo");
    seed_spec(&test_db.pool(), extra, "Diameter", "280 мм", Some("мм"));

    let specs: BTreeMap<_, _> = repo
        .specs_for_category(CategoryId::new(brakes).unwrap())
        .unwrap();
    assert_eq!(specs["Diameter"].len(), 3);
}

#[test]
fn car_search_short_circuits_on_vin() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let pool = test_db.pool();

    let trim = seed_trim(&pool, "Honda", "Accord");
    seed_car(&pool, trim, "1HGCM82633A004352", 2003, "silver", Some(2_000_000));
    seed_car(&pool, trim, "JHMCM56557C404453", 2007, "black", Some(2_500_000));

    let page = repo
        .list_cars(CarListQuery::default().search("1hgcm-82633-a004352"))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].vin.as_str(), "1HGCM82633A004352");
}

#[test]
fn car_search_understands_numeric_hints() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let pool = test_db.pool();

    let trim = seed_trim(&pool, "Honda", "Accord");
    seed_car(&pool, trim, "1HGCM82633A004352", 2003, "silver", Some(2_000_000));
    seed_car(&pool, trim, "JHMCM56557C404453", 2007, "black", Some(2_500_000));

    let page = repo
        .list_cars(CarListQuery::default().search("2007"))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].production_year, 2007);

    // brand match is case-insensitive
    let page = repo
        .list_cars(CarListQuery::default().search("honda"))
        .unwrap();
    assert_eq!(page.items.len(), 2);
}

#[test]
fn car_column_filters_compose() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let pool = test_db.pool();

    let honda = seed_trim(&pool, "Honda", "Accord");
    let bmw = seed_trim(&pool, "BMW", "320i");
    seed_car(&pool, honda, "1HGCM82633A004352", 2003, "silver", Some(2_000_000));
    seed_car(&pool, bmw, "WBAVA37553NL57291", 2010, "black", Some(3_000_000));

    let filters = CarFilters {
        brands: vec!["BMW".to_string()],
        min_year: Some(2005),
        max_price: Some(Money::new(3_500_000).unwrap()),
        ..CarFilters::default()
    };
    let page = repo
        .list_cars(CarListQuery::default().filters(filters))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].trim.brand.as_str(), "BMW");
}

#[test]
fn unpriced_cars_never_match_price_filters() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let pool = test_db.pool();

    let trim = seed_trim(&pool, "Honda", "Accord");
    seed_car(&pool, trim, "1HGCM82633A004352", 2003, "silver", None);

    let filters = CarFilters {
        max_price: Some(Money::new(10_000_000).unwrap()),
        ..CarFilters::default()
    };
    let page = repo
        .list_cars(CarListQuery::default().filters(filters))
        .unwrap();
    assert!(page.items.is_empty());
}
