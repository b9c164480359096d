#[cfg(test)]
mod tests {
    use crate::{
        harness, init_logging,
        utils::{User, count, seed_company_scenario},
    };
    use fixtures::{FixtureConfig, FixtureError};
    use model::core::value::Value;
    use planner::{AssociationQueryBuilder, PlanError, QuerySpec, query_spec};
    use query_builder::accumulator::{QueryAccumulator, SelectAccumulator};
    use serde_json::json;
    use tracing_test::traced_test;

    // Scenario: one document with name "A".
    // Expected Outcome: {name: "A"} finds it, {name: "B"} finds nothing.
    #[traced_test]
    #[test]
    fn tc01_round_trip() {
        let h = harness(FixtureConfig::default());
        let id = h.have_in_repository("User", [("name", "A")]).unwrap();

        let found = h
            .grab_entities_from_repository("User", &query_spec! { "name" => "A" })
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_value("id"), id);

        assert_eq!(count(&h, "User", json!({ "name": "B" })), 0);
        assert!(logs_contain("matched 1 of 1 documents"));
        assert!(logs_contain("matched 0 of 1 documents"));
    }

    // Scenario: {name: "hlogeon", Company: {name: "Codegyre"}}.
    // Expected Outcome: one join on Company, two bound parameters, and only
    // hlogeon is returned.
    #[traced_test]
    #[test]
    fn tc02_company_filter() {
        let h = harness(FixtureConfig::default());
        let seeded = seed_company_scenario(&h).unwrap();
        let spec = query_spec! {
            "name" => "hlogeon",
            "Company" => { "name" => "Codegyre" },
        };

        let accumulator = AssociationQueryBuilder::new(h.store().schema())
            .query("User", &spec)
            .unwrap();
        assert_eq!(
            accumulator.to_query_string(),
            "SELECT s FROM User AS s INNER JOIN s.Company AS Company \
             WHERE ((s.name = :s_name) AND (Company.name = :Company__name))"
        );

        let rows = h.store().execute(accumulator.query()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_value("id"), seeded.hlogeon);

        h.dont_see_in_repository(
            "User",
            &query_spec! { "name" => "davert", "Company" => { "name" => "Codegyre" } },
        )
        .unwrap();
    }

    // Scenario: chains through two associations and a self-reference.
    // Expected Outcome: joins descend and aliases stay distinct.
    #[traced_test]
    #[test]
    fn tc03_deep_and_self_referencing_chains() {
        let h = harness(FixtureConfig::default());
        let seeded = seed_company_scenario(&h).unwrap();

        assert_eq!(
            count(&h, "User", json!({ "Company": { "Country": { "name": "Ukraine" } } })),
            1
        );
        assert_eq!(
            count(&h, "User", json!({ "Company": { "Country": { "name": "Poland" } } })),
            1
        );
        assert_eq!(
            h.grab_from_repository(
                "User",
                "id",
                &query_spec! { "Manager" => { "name" => "davert" } }
            )
            .unwrap(),
            seeded.hlogeon
        );
        assert_eq!(
            count(
                &h,
                "User",
                json!({ "Manager": { "Manager": { "name": "anyone" } } })
            ),
            0
        );
        assert!(logs_contain("joining as `Manager_2`"));
    }

    // Scenario: null values and reference-many fields.
    // Expected Outcome: null matches missing references, a join through a
    // reference-many field matches any referenced document.
    #[traced_test]
    #[test]
    fn tc04_nulls_and_collections() {
        let h = harness(FixtureConfig::default());
        let seeded = seed_company_scenario(&h).unwrap();

        assert_eq!(count(&h, "User", json!({ "Company": null })), 1);
        assert_eq!(count(&h, "User", json!({ "Manager": null })), 2);
        assert_eq!(count(&h, "User", json!({ "Groups": { "title": "devs" } })), 1);
        assert_eq!(count(&h, "User", json!({ "Groups": { "title": "ops" } })), 0);
        assert_eq!(
            count(&h, "Company", json!({ "Country": { "code": "UA" } })),
            1
        );
        assert_eq!(
            h.grab_from_repository("Company", "id", &query_spec! { "name" => "Codegyre" })
                .unwrap(),
            seeded.codegyre
        );
    }

    // Scenario: malformed or inconsistent filters.
    // Expected Outcome: typed errors, nothing emitted into the accumulator.
    #[traced_test]
    #[test]
    fn tc05_rejected_filters_leave_accumulator_untouched() {
        let h = harness(FixtureConfig::default());
        let builder = AssociationQueryBuilder::new(h.store().schema());

        let mut accumulator = SelectAccumulator::new("User", "s");
        let spec = QuerySpec::try_from(json!({
            "name": "x",
            "email": { "domain": "example.com" }
        }))
        .unwrap();
        let err = builder.build("User", "s", &spec, &mut accumulator).unwrap_err();
        assert!(matches!(err, PlanError::InvalidSpecShape(_)));
        assert!(accumulator.joins().is_empty());
        assert!(accumulator.params().is_empty());

        assert!(matches!(
            h.count_in_repository("Invoice", &QuerySpec::new()),
            Err(FixtureError::Plan(PlanError::UnknownEntity(e))) if e == "Invoice"
        ));
        assert!(QuerySpec::try_from(json!(["name"])).is_err());
    }

    // Scenario: builder depth limit configured through the fixture config.
    // Expected Outcome: deeper filters are refused before any emission.
    #[traced_test]
    #[test]
    fn tc06_depth_limit_from_config() {
        let config =
            FixtureConfig::from_json_str(r#"{ "builder": { "max_depth": 2, "root_alias": "u" } }"#)
                .unwrap();
        let h = harness(config);
        seed_company_scenario(&h).unwrap();

        assert_eq!(count(&h, "User", json!({ "Company": { "name": "Codegyre" } })), 1);
        let err = h
            .count_in_repository(
                "User",
                &query_spec! { "Company" => { "Country" => { "name" => "Ukraine" } } },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            FixtureError::Plan(PlanError::MaxDepthExceeded { depth: 3, max: 2 })
        ));
        assert!(logs_contain("INNER JOIN u.Company AS Company"));
    }

    // Scenario: writes inside an isolated test.
    // Expected Outcome: rolled back with cleanup, kept without.
    #[test]
    fn tc07_isolation() {
        init_logging();
        let h = harness(FixtureConfig::default());
        seed_company_scenario(&h).unwrap();

        h.isolated(|h| {
            h.have_in_repository("User", [("name", "temp")]).unwrap();
            h.see_in_repository("User", &query_spec! { "name" => "temp" })
                .unwrap();
        })
        .unwrap();
        h.dont_see_in_repository("User", &query_spec! { "name" => "temp" })
            .unwrap();

        let h = harness(FixtureConfig {
            cleanup: false,
            ..FixtureConfig::default()
        });
        h.isolated(|h| h.have_in_repository("User", [("name", "temp")]).unwrap())
            .unwrap();
        h.see_in_repository("User", &query_spec! { "name" => "temp" })
            .unwrap();
    }

    // Scenario: typed entities persisted and grabbed back.
    // Expected Outcome: the id is assigned on insert and the entity is
    // updated in place on the second persist.
    #[traced_test]
    #[test]
    fn tc08_hydration() {
        let h = harness(FixtureConfig::default());
        let seeded = seed_company_scenario(&h).unwrap();

        let mut user = User {
            id: Some("u-100".into()),
            name: "newcomer".into(),
            email: None,
            company: Some(seeded.codegyre.clone()),
        };
        h.persist_entity(&user).unwrap();
        user.email = Some("newcomer@example.com".into());
        h.persist_entity(&user).unwrap();

        let grabbed: User = h
            .grab_entity_from_repository(&query_spec! {
                "Company" => { "name" => "Codegyre" },
                "email" => "newcomer@example.com",
            })
            .unwrap();
        assert_eq!(grabbed, user);

        let davert: User = h
            .grab_entity_from_repository(&query_spec! { "name" => "davert" })
            .unwrap();
        assert!(davert.id.map(Value::from).is_some_and(|id| id.equal(&seeded.davert)));

        assert!(matches!(
            h.grab_entity_from_repository::<User>(&query_spec! { "name" => "ghost" }),
            Err(FixtureError::NotFound(_))
        ));
    }
}
