//! Ordering and windowing over the people fixtures.

use stitch_tests::prelude::*;

mod cursors {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("cursors")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/pagination.json")
            .step("first_two", |a| {
                a.ids(["u1", "u2"])
                    .total(4)
                    .has_next_page(true)
                    .has_previous_page(false)
            })
            .step("after_bob", |a| {
                a.ids(["u3", "u4"])
                    .has_next_page(false)
                    .has_previous_page(true)
            })
            .step("before_cid", |a| {
                a.ids(["u1", "u2"])
                    .has_next_page(true)
                    .has_previous_page(false)
            })
            .step("last_one", |a| a.ids(["u4"]).has_previous_page(true))
            .step("skip_three", |a| a.ids(["u4"]).total(4))
            .step("filtered_page", |a| a.ids(["u2"]).total(2).has_next_page(true))
    }

    #[tokio::test]
    async fn test_cursor_windows() {
        scenario().run().await.unwrap();
    }

    #[tokio::test]
    async fn test_windows_are_deterministic() {
        // Same store contents, same request, same window.
        for _ in 0..3 {
            scenario().run().await.unwrap();
        }
    }
}

mod numbered_pages {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("numbered_pages")
            .schema("people/schema.json")
            .seed("people/seeds/base.json")
            .operations("people/operations/pagination.json")
            .step("second_page_of_three", |a| {
                a.ids(["u4"])
                    .total(4)
                    .has_next_page(false)
                    .has_previous_page(true)
            })
            .step("page_zero", |a| a.error("Invalid pagination"))
            .step("bad_direction", |a| a.error("name must be ASC or DESC"))
            .step("team_then_age", |a| a.ids(["u4", "u2", "u1", "u3"]))
            .step("unordered_keys", |a| a.error("list of single-key objects"))
    }

    #[tokio::test]
    async fn test_numbered_pages() {
        scenario().run().await.unwrap();
    }
}
