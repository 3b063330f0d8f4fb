//! The category queries and codified filter used for counting.
//!
//! The shapes mirror these JSONPath expressions:
//!
//! ```text
//! $.entry[?(@.resource.category[?(@.coding[?(@.code='laboratory')])])].resource
//! $.entry[?(@.resource.category[?(@.coding[?(@.code='vital-signs')])])].resource
//! $[?(@.code.coding[?(@.system='http://loinc.org' & @.code!='')])]
//! ```

use std::sync::LazyLock;

use crate::path::{ListFilter, Path, Predicate, Query};

pub const CATEGORY_LABORATORY: &str = "laboratory";
pub const CATEGORY_VITAL_SIGNS: &str = "vital-signs";
pub const LOINC_SYSTEM: &str = "http://loinc.org";

static LAB_QUERY: LazyLock<Query> = LazyLock::new(|| category_query(CATEGORY_LABORATORY));
static VITAL_QUERY: LazyLock<Query> = LazyLock::new(|| category_query(CATEGORY_VITAL_SIGNS));
static CODIFIED_FILTER: LazyLock<ListFilter> = LazyLock::new(|| {
    let coding = Predicate::all([
        Predicate::equals(Path::current().field("system"), LOINC_SYSTEM),
        Predicate::not_equals(Path::current().field("code"), ""),
    ]);
    ListFilter::new(Predicate::exists(
        Path::current().field("code").field("coding").filter(coding),
    ))
});

/// Resources under `entry[*].resource` with a category coding equal to `code`.
pub fn category_query(code: &str) -> Query {
    let coding_matches = Predicate::equals(Path::current().field("code"), code);
    let category_matches =
        Predicate::exists(Path::current().field("coding").filter(coding_matches));
    let entry_matches = Predicate::exists(
        Path::current()
            .field("resource")
            .field("category")
            .filter(category_matches),
    );
    Query::new(
        Path::current()
            .field("entry")
            .filter(entry_matches)
            .field("resource"),
    )
}

pub fn lab_query() -> &'static Query {
    &LAB_QUERY
}

pub fn vital_query() -> &'static Query {
    &VITAL_QUERY
}

/// Resources carrying a LOINC coding with a non-empty code.
pub fn codified_filter() -> &'static ListFilter {
    &CODIFIED_FILTER
}

/// The observation categories reported by the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryQuery {
    Laboratory,
    VitalSigns,
}

impl CategoryQuery {
    pub fn query(self) -> &'static Query {
        match self {
            Self::Laboratory => lab_query(),
            Self::VitalSigns => vital_query(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn observation(category: &str, coding: serde_json::Value) -> serde_json::Value {
        json!({
            "resource": {
                "resourceType": "Observation",
                "category": [{"coding": [{"code": category}]}],
                "code": {"coding": coding}
            }
        })
    }

    #[test]
    fn lab_query_selects_resources_not_entries() {
        let record = json!({"entry": [observation("laboratory", json!([]))]});
        let matches = lab_query().select(&record).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["resourceType"], "Observation");
    }

    #[test]
    fn category_queries_are_disjoint_on_code() {
        let record = json!({"entry": [
            observation("laboratory", json!([])),
            observation("vital-signs", json!([])),
            observation("social-history", json!([])),
        ]});
        assert_eq!(lab_query().select(&record).unwrap().len(), 1);
        assert_eq!(vital_query().select(&record).unwrap().len(), 1);
        assert_eq!(category_query("social-history").select(&record).unwrap().len(), 1);
    }

    #[test]
    fn any_category_coding_can_match() {
        let record = json!({"entry": [{"resource": {"category": [
            {"coding": [{"code": "exam"}]},
            {"coding": [{"system": "x", "code": "other"}, {"code": "vital-signs"}]}
        ]}}]});
        assert_eq!(vital_query().select(&record).unwrap().len(), 1);
        assert!(lab_query().select(&record).unwrap().is_empty());
    }

    #[test]
    fn missing_members_exclude_resources() {
        let record = json!({"entry": [
            {},
            {"resource": {}},
            {"resource": {"category": []}},
            {"resource": {"category": [{}]}},
            {"resource": {"category": [{"coding": []}]}},
            {"resource": {"category": {"coding": [{"code": "laboratory"}]}}},
        ]});
        assert!(lab_query().select(&record).unwrap().is_empty());
        assert!(lab_query().select(&json!({})).unwrap().is_empty());
        assert!(lab_query().select(&json!({"entry": null})).unwrap().is_empty());
    }

    #[test]
    fn codified_filter_requires_loinc_and_code() {
        let resources = [
            json!({"code": {"coding": [{"system": "http://loinc.org", "code": "718-7"}]}}),
            json!({"code": {"coding": [{"system": "http://loinc.org", "code": ""}]}}),
            json!({"code": {"coding": [{"system": "http://loinc.org"}]}}),
            json!({"code": {"coding": [{"system": "http://snomed.info/sct", "code": "123"}]}}),
            json!({"code": {"coding": [
                {"system": "http://snomed.info/sct", "code": "123"},
                {"system": "http://loinc.org", "code": "8480-6"}
            ]}}),
            json!({"code": {}}),
            json!({}),
        ];
        let refs: Vec<&serde_json::Value> = resources.iter().collect();
        let codified = codified_filter().select(&refs);
        assert_eq!(codified.len(), 2);
        assert!(std::ptr::eq(codified[0], &resources[0]));
        assert!(std::ptr::eq(codified[1], &resources[4]));
    }

    #[test]
    fn system_and_code_must_be_on_the_same_coding() {
        let resource = json!({"code": {"coding": [
            {"system": "http://loinc.org", "code": ""},
            {"system": "urn:oid:1.2.3", "code": "abc"}
        ]}});
        assert!(codified_filter().select(&[&resource]).is_empty());
    }

    #[test]
    fn category_query_enum_resolves_shared_queries() {
        assert!(std::ptr::eq(CategoryQuery::Laboratory.query(), lab_query()));
        assert!(std::ptr::eq(CategoryQuery::VitalSigns.query(), vital_query()));
    }
}
