//! Facet classification over observed specification values.
//!
//! Attribute names and values are data, not code: the set of filterable
//! attributes for a category is derived at runtime from the specification rows
//! attached to its parts. Each attribute is classified as either a numeric
//! range or a finite option set based on how many of its distinct values parse
//! as numbers.

use std::collections::BTreeMap;

use serde::Serialize;

/// A distinct `(value, unit)` pair observed for one specification name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecSample {
    pub value: String,
    pub unit: Option<String>,
}

impl SpecSample {
    pub fn new<V: Into<String>>(value: V, unit: Option<String>) -> Self {
        Self {
            value: value.into(),
            unit,
        }
    }
}

/// How a specification attribute is exposed to catalog filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FacetDescriptor {
    /// Finite option set; values carry their unit suffix when present.
    Options { values: Vec<String> },
    /// Numeric range with bounds derived from the parsed values.
    Range {
        min: f64,
        max: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
}

/// Facet metadata for every attribute observed in a category.
pub type FacetConfig = BTreeMap<String, FacetDescriptor>;

/// Permissive numeric parser shared by classification and range filtering.
///
/// Strips every character except digits, sign and decimal separators, treating
/// a comma as a decimal point. Values that still fail to parse yield `None`
/// and never match a range filter.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | ','))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Classify one attribute from its distinct observed samples.
///
/// If at least half of the distinct values parse as numbers the attribute is a
/// range facet (bounds = min/max of the parsed values, unit = most frequent
/// unit among the numeric entries); otherwise it is an options facet with each
/// value concatenated with its unit, deduplicated and sorted.
pub fn classify(samples: &[SpecSample]) -> FacetDescriptor {
    let mut distinct_values: Vec<&str> = samples.iter().map(|s| s.value.as_str()).collect();
    distinct_values.sort_unstable();
    distinct_values.dedup();

    let parsed: Vec<f64> = distinct_values
        .iter()
        .filter_map(|v| parse_numeric(v))
        .collect();

    if !distinct_values.is_empty() && parsed.len() * 2 >= distinct_values.len() {
        let min = parsed.iter().copied().fold(f64::INFINITY, f64::min);
        let max = parsed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        FacetDescriptor::Range {
            min,
            max,
            unit: dominant_unit(samples),
        }
    } else {
        let mut values: Vec<String> = samples
            .iter()
            .map(|s| match &s.unit {
                Some(unit) if !unit.is_empty() => format!("{} {}", s.value, unit),
                _ => s.value.clone(),
            })
            .collect();
        values.sort();
        values.dedup();
        FacetDescriptor::Options { values }
    }
}

/// Most frequent unit string among samples whose value parses as numeric.
/// Ties resolve to the lexicographically smallest unit for determinism.
fn dominant_unit(samples: &[SpecSample]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for sample in samples {
        if parse_numeric(&sample.value).is_none() {
            continue;
        }
        if let Some(unit) = sample.unit.as_deref().filter(|u| !u.is_empty()) {
            *counts.entry(unit).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(unit, _)| unit.to_string())
}
