//! The query engine agrees with a direct reading of the where clause.
//!
//! Random users with random skills are seeded, random where clauses are
//! built from native comparisons, quantified relation filters and AND/OR
//! groups, and the engine's answer is checked against evaluating the
//! clause on the generated data.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value as Json};
use stitch_core::{doc, Document, Value};
use stitch_query::{OrderBy, Pagination, QueryEngine};
use stitch_registry::{FieldDef, Registry, RegistryBuilder, ScalarType};
use stitch_store::MemoryStore;

const CODES: [&str; 3] = ["S0", "S1", "S2"];

#[derive(Debug, Clone)]
struct User {
    age: i64,
    skills: [bool; 3],
}

#[derive(Debug, Clone, Copy)]
enum Quantifier {
    Some,
    None,
    Every,
}

#[derive(Debug, Clone)]
enum Where {
    AgeGt(i64),
    AgeLt(i64),
    NameIn(Vec<usize>),
    Skills(Quantifier, usize),
    And(Vec<Where>),
    Or(Vec<Where>),
}

impl Where {
    fn to_json(&self) -> Json {
        match self {
            Where::AgeGt(n) => json!({ "age_gt": n }),
            Where::AgeLt(n) => json!({ "age_lt": n }),
            Where::NameIn(users) => {
                let names: Vec<String> = users.iter().map(|i| format!("n{}", i)).collect();
                json!({ "name_in": names })
            }
            Where::Skills(quantifier, code) => {
                let key = match quantifier {
                    Quantifier::Some => "some",
                    Quantifier::None => "none",
                    Quantifier::Every => "every",
                };
                let mut nested = serde_json::Map::new();
                nested.insert(key.to_string(), json!({ "code": CODES[*code] }));
                json!({ "skills": nested })
            }
            Where::And(children) => {
                json!({ "AND": children.iter().map(Where::to_json).collect::<Vec<_>>() })
            }
            Where::Or(children) => {
                json!({ "OR": children.iter().map(Where::to_json).collect::<Vec<_>>() })
            }
        }
    }

    fn holds(&self, index: usize, user: &User) -> bool {
        match self {
            Where::AgeGt(n) => user.age > *n,
            Where::AgeLt(n) => user.age < *n,
            Where::NameIn(users) => users.contains(&index),
            Where::Skills(quantifier, code) => {
                let related = user.skills.iter().filter(|s| **s).count();
                let matched = usize::from(user.skills[*code]);
                match quantifier {
                    Quantifier::Some => matched > 0,
                    Quantifier::None => matched == 0,
                    Quantifier::Every => matched == related,
                }
            }
            Where::And(children) => children.iter().all(|c| c.holds(index, user)),
            Where::Or(children) => children.iter().any(|c| c.holds(index, user)),
        }
    }
}

fn registry() -> Registry {
    let mut builder = RegistryBuilder::new();
    builder
        .add_model("User")
        .field(FieldDef::scalar("name", ScalarType::String).unique())
        .field(FieldDef::scalar("age", ScalarType::Int))
        .field(FieldDef::relation("skills", "Skill").list())
        .done()
        .unwrap();
    builder
        .add_model("Skill")
        .field(FieldDef::scalar("code", ScalarType::String).unique())
        .field(FieldDef::relation("users", "User").list())
        .done()
        .unwrap();
    builder.build().unwrap()
}

fn join(source: String, targets: Vec<String>) -> Document {
    doc! { "sourceSideId" => source, "targetSideIds" => targets }
}

/// Users without skills get no join record at all.
fn seed(users: &[User]) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store
        .seed(
            "users",
            users.iter().enumerate().map(|(i, user)| {
                doc! { "id" => format!("u{}", i), "name" => format!("n{}", i), "age" => user.age }
            }),
        )
        .unwrap();
    store
        .seed(
            "skills",
            CODES
                .iter()
                .enumerate()
                .map(|(c, code)| doc! { "id" => format!("s{}", c), "code" => *code }),
        )
        .unwrap();

    let user_joins = users.iter().enumerate().filter_map(|(i, user)| {
        let skills: Vec<String> = (0..CODES.len())
            .filter(|c| user.skills[*c])
            .map(|c| format!("s{}", c))
            .collect();
        (!skills.is_empty()).then(|| join(format!("u{}", i), skills))
    });
    store.seed("_user_skill", user_joins).unwrap();

    let skill_joins = (0..CODES.len()).filter_map(|c| {
        let holders: Vec<String> = users
            .iter()
            .enumerate()
            .filter(|(_, user)| user.skills[c])
            .map(|(i, _)| format!("u{}", i))
            .collect();
        (!holders.is_empty()).then(|| join(format!("s{}", c), holders))
    });
    store.seed("_skill_user", skill_joins).unwrap();

    Arc::new(store)
}

fn matching(engine: &QueryEngine<'_>, raw: Json) -> BTreeSet<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime
        .block_on(engine.find("User", &Value::from(raw), &OrderBy::new(), &Pagination::new()))
        .unwrap()
        .ids()
        .iter()
        .map(|id| id.to_string())
        .collect()
}

fn users() -> impl Strategy<Value = Vec<User>> {
    prop::collection::vec(
        (0i64..50, any::<[bool; 3]>()).prop_map(|(age, skills)| User { age, skills }),
        1..7,
    )
}

fn quantifier() -> impl Strategy<Value = Quantifier> {
    prop_oneof![
        Just(Quantifier::Some),
        Just(Quantifier::None),
        Just(Quantifier::Every),
    ]
}

fn leaf() -> impl Strategy<Value = Where> {
    prop_oneof![
        (0i64..50).prop_map(Where::AgeGt),
        (0i64..50).prop_map(Where::AgeLt),
        prop::collection::vec(0usize..7, 1..3).prop_map(Where::NameIn),
        (quantifier(), 0usize..CODES.len()).prop_map(|(q, code)| Where::Skills(q, code)),
    ]
}

fn where_clause() -> impl Strategy<Value = Where> {
    leaf().prop_recursive(2, 12, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Where::And),
            prop::collection::vec(inner, 1..4).prop_map(Where::Or),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn engine_matches_direct_evaluation(users in users(), clause in where_clause()) {
        let registry = registry();
        let engine = QueryEngine::new(&registry, seed(&users));

        let actual = matching(&engine, clause.to_json());

        let expected: BTreeSet<String> = users
            .iter()
            .enumerate()
            .filter(|(i, user)| clause.holds(*i, user))
            .map(|(i, _)| format!("u{}", i))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn and_is_intersection_or_is_union(users in users(), a in where_clause(), b in where_clause()) {
        let registry = registry();
        let engine = QueryEngine::new(&registry, seed(&users));

        let left = matching(&engine, a.to_json());
        let right = matching(&engine, b.to_json());
        let both = matching(&engine, json!({ "AND": [a.to_json(), b.to_json()] }));
        let either = matching(&engine, json!({ "OR": [a.to_json(), b.to_json()] }));

        prop_assert_eq!(both, left.intersection(&right).cloned().collect::<BTreeSet<_>>());
        prop_assert_eq!(either, left.union(&right).cloned().collect::<BTreeSet<_>>());
    }
}

#[tokio::test]
async fn test_quantifiers_over_no_related_records() {
    // GIVEN a user with no skills at all
    let registry = registry();
    let engine = QueryEngine::new(&registry, seed(&[User { age: 1, skills: [false; 3] }]));
    let find = |quantifier: &str| {
        let mut nested = serde_json::Map::new();
        nested.insert(quantifier.to_string(), json!({ "code": "S0" }));
        Value::from(json!({ "skills": nested }))
    };

    // WHEN each quantifier is applied
    let mut hits = Vec::new();
    for quantifier in ["some", "none", "every"] {
        let page = engine
            .find("User", &find(quantifier), &OrderBy::new(), &Pagination::new())
            .await
            .unwrap();
        hits.push(page.total);
    }

    // THEN some fails while none and every hold vacuously
    assert_eq!(hits, vec![0, 1, 1]);
}
