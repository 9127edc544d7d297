//! Scalar writes, array operations, constraints and deletes.

use stitch_tests::prelude::*;

mod constraints {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("constraints")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/writes.json")
            .step("duplicate_name", |a| {
                a.error(r#"Constraint unique value expected for "name" duplicate on User model"#)
            })
            .step("missing_name", |a| {
                a.error("Document failed validation on User model")
            })
            .step("non_unique_selector", |a| {
                a.error("invalid argument for the where selector on User")
            })
            .step("unknown_selector", |a| {
                a.error("No Node for the model User with unique field.")
            })
            .step("rename_id", |a| a.error("Cannot modify readonly field: id on model User"))
    }

    #[tokio::test]
    async fn test_write_constraints() {
        scenario().run().await.unwrap();
    }
}

mod array_operations {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("array_operations")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/writes.json")
            .step("set_tags", |a| a.field("tags", vec!["a", "b"]))
            .step("add_tag", |a| a.field("tags", vec!["a", "b", "c"]))
            .step("remove_tag", |a| a.field("tags", vec!["b", "c"]))
            .step("conflicting_tags", |a| {
                a.error("Only one of set, add or remove is allowed on tags")
            })
            .step("plain_tags", |a| a.error("Invalid array operation on tags"))
    }

    #[tokio::test]
    async fn test_set_add_remove() {
        scenario().run().await.unwrap();
    }
}

mod lazy_join_pruning {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("lazy_join_pruning")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/writes.json")
            .step("delete_cid", |a| a.deleted())
            .step("cid_is_gone", |a| a.missing())
            .step("delete_cid_again", |a| {
                a.error("No Node for the model User with unique field.")
            })
            // join entries stay until read
            .step("skill_joins", |a| {
                a.contains(json!({"sourceSideId": "s1", "targetSideIds": ["u2", "u3"]}))
            })
    }

    #[tokio::test]
    async fn test_delete_leaves_join_entries() {
        scenario().run().await.unwrap();
    }
}

mod eager_join_pruning {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("eager_join_pruning")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/writes.json")
            .config(SessionConfig::new().with_join_pruning(JoinPruning::Eager))
            .step("delete_cid", |a| a.deleted())
            .step("delete_ann", |a| a.deleted())
            .step("skill_joins", |a| {
                a.contains(json!({"sourceSideId": "s0", "targetSideIds": []}))
                    .contains(json!({"sourceSideId": "s1", "targetSideIds": ["u2"]}))
                    .contains(json!({"sourceSideId": "s2", "targetSideIds": []}))
            })
            .step("user_skill_joins", |a| {
                a.rows(1)
                    .contains(json!({"sourceSideId": "u2", "targetSideIds": ["s1"]}))
            })
    }

    #[tokio::test]
    async fn test_delete_prunes_join_entries() {
        scenario().run().await.unwrap();
    }
}

mod first_wins {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("first_wins")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/writes.json")
            .config(SessionConfig::new().with_array_conflicts(ArrayConflictPolicy::FirstWins))
            .step("set_tags", |a| a.field("tags", vec!["a", "b"]))
            // add takes precedence over remove
            .step("conflicting_tags", |a| a.field("tags", vec!["a", "b", "x"]))
    }

    #[tokio::test]
    async fn test_first_operator_wins() {
        scenario().run().await.unwrap();
    }
}
