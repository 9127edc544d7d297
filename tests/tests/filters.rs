//! Relation-aware filtering over the people fixtures.

use stitch_tests::prelude::*;

mod singular_relations {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("singular_relations")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/filters.json")
            // u3 has no team and must not match
            .step("users_in_team_one", |a| a.ids(["u1", "u2"]))
            .step("user_by_profile", |a| a.ids(["u1"]))
            .step("profile_by_user", |a| a.ids(["p1"]))
    }

    #[tokio::test]
    async fn test_filter_through_singular_relations() {
        scenario().run().await.unwrap();
    }
}

mod quantifiers {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("quantifiers")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/filters.json")
            // u4 has no skills: none and every hold, some does not
            .step("users_without_s00", |a| a.ids(["u2", "u3", "u4"]))
            .step("users_with_some_s01", |a| a.ids(["u2", "u3"]))
            .step("users_with_only_s01", |a| a.ids(["u2", "u4"]))
            .step("teams_with_member_over_25", |a| a.ids(["t1"]))
            // t3 has no members
            .step("teams_of_adults", |a| a.ids(["t2", "t3"]))
            .step("skills_of_team_one", |a| a.ids(["s0", "s1"]))
    }

    #[tokio::test]
    async fn test_some_none_every() {
        scenario().run().await.unwrap();
    }
}

mod boolean_groups {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("boolean_groups")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/filters.json")
            .step("ann_or_team_two", |a| a.ids_unordered(["u1", "u4"]).total(2))
            .step("older_with_s01", |a| a.ids(["u3"]))
    }

    #[tokio::test]
    async fn test_and_or_mix_native_and_relation_filters() {
        scenario().run().await.unwrap();
    }
}

mod lookups {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("lookups")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/filters.json")
            .step("first_under_25", |a| a.field("name", "bob"))
            .step("nobody_under_10", |a| a.missing())
            .step("by_age_desc", |a| a.ids(["u3", "u1", "u4", "u2"]))
    }

    #[tokio::test]
    async fn test_find_one_and_ordering() {
        scenario().run().await.unwrap();
    }
}

mod rejected_filters {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("rejected_filters")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/filters.json")
            .step("unknown_field", |a| a.error("Unknown field 'nickname' on model 'User'"))
            .step("quantified_singular", |a| {
                a.error("Relation 'team' is not a list and cannot be quantified")
            })
            .step("unknown_model", |a| a.error_matches(r"^configuration error: .*Robot$"))
    }

    #[tokio::test]
    async fn test_invalid_filters_fail() {
        scenario().run().await.unwrap();
    }
}
