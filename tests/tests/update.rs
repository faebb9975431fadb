//! Update planning applied end to end against the in-memory store.

use strata_tests::prelude::*;

fn meta() -> Metadata {
    Metadata::new("u1", "alice", 1_700_000_000_000)
}

#[test]
fn test_read_back_payload_is_a_noop_diff() {
    // GIVEN an employee with an owned address, inserted and applied
    let model = hr_model();
    let mut store = MemoryStore::new(&model);
    let ids = SequenceProvider::default();
    let plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner
            .insert(
                "Employee",
                &payload! {
                    "name" => Value::from("E1"),
                    "address" => payload! { "street" => Value::from("Main") },
                },
                &meta(),
                true,
            )
            .unwrap()
    };
    store.apply(&plan).unwrap();

    let employee = model.type_id("Employee").unwrap();
    let address = model.type_id("Address").unwrap();
    let e1 = plan
        .iter()
        .find(|s| s.is_insert() && s.entity_type() == employee)
        .unwrap()
        .id();
    let a1 = plan
        .iter()
        .find(|s| s.is_insert() && s.entity_type() == address)
        .unwrap()
        .id();

    // WHEN updating with the payload as it would read back, unchanged
    let read_back = payload! {
        "name" => Value::from("E1"),
        "address" => payload! { "street" => Value::from("Main") }.with_id(a1),
    }
    .with_id(e1);
    let planner = StatementPlanner::new(&model, &store, &ids);
    let diff = planner
        .update("Employee", &read_back, &read_back, &meta(), false)
        .unwrap();

    // THEN nothing is planned
    assert!(diff.is_empty());
}

#[test]
fn test_dropping_one_collection_element_detaches_only_that_element() {
    // GIVEN employee E holding positions P1 and P2
    let model = hr_model();
    let mut store = MemoryStore::new(&model);
    let employee = model.type_id("Employee").unwrap();
    let position = model.type_id("Position").unwrap();
    let positions_ref = model.reference_by_name(employee, "positions").unwrap().id;

    let e = store.seed(employee, 1, &[("name", Value::from("E"))]);
    let p1 = store.seed(position, 2, &[("name", Value::from("P1"))]);
    let p2 = store.seed(position, 3, &[("name", Value::from("P2"))]);
    store.link(e, positions_ref, p1);
    store.link(e, positions_ref, p2);
    let ids = SequenceProvider::starting_at(100);

    let original = Payload::new().with_id(e).with(
        "positions",
        vec![Payload::new().with_id(p1), Payload::new().with_id(p2)],
    );
    let updated = Payload::new()
        .with_id(e)
        .with("positions", vec![Payload::new().with_id(p1)]);

    // WHEN
    let plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner
            .update("Employee", &original, &updated, &meta(), false)
            .unwrap()
    };

    // THEN: exactly one detach and nothing touching the kept element
    assert_eq!(plan.len(), 1);
    assert!(plan.iter().all(|s| matches!(
        s,
        Statement::RemoveReference { referenced_id, .. } if *referenced_id == p2
    )));
    store.apply(&plan).unwrap();
    assert_eq!(store.targets_of(e, positions_ref), vec![p1]);
}

#[test]
fn test_version_conflict_is_rejected() {
    let model = hr_model();
    let mut store = MemoryStore::new(&model);
    let division = model.type_id("Division").unwrap();
    let d = store.seed(division, 1, &[("name", Value::from("D"))]);
    let ids = SequenceProvider::starting_at(100);
    let planner = StatementPlanner::new(&model, &store, &ids);

    let original = payload! { "name" => Value::from("D") }
        .with_id(d)
        .with_version(1);
    let updated = payload! { "name" => Value::from("D2") }
        .with_id(d)
        .with_version(2);

    assert!(matches!(
        planner.update("Division", &original, &updated, &meta(), false),
        Err(PlanError::OptimisticLockConflict { .. })
    ));
}

#[test]
fn test_reassigning_single_association_moves_the_edge() {
    // GIVEN position P assigned to division D1, with D2 available
    let model = hr_model();
    let mut store = MemoryStore::new(&model);
    let division = model.type_id("Division").unwrap();
    let position = model.type_id("Position").unwrap();
    let division_ref = model.reference_by_name(position, "division").unwrap().id;

    let d1 = store.seed(division, 1, &[("name", Value::from("D1"))]);
    let d2 = store.seed(division, 2, &[("name", Value::from("D2"))]);
    let p = store.seed(position, 3, &[("name", Value::from("P"))]);
    store.link(p, division_ref, d1);
    let ids = SequenceProvider::starting_at(100);

    let original = Payload::new()
        .with_id(p)
        .with("division", Payload::new().with_id(d1));
    let updated = Payload::new()
        .with_id(p)
        .with("division", Payload::new().with_id(d2));

    // WHEN
    let plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner
            .update("Position", &original, &updated, &meta(), false)
            .unwrap()
    };
    store.apply(&plan).unwrap();

    // THEN
    assert_eq!(store.targets_of(p, division_ref), vec![d2]);
}

#[test]
fn test_clearing_owned_child_deletes_it() {
    // GIVEN employee E owning address A
    let model = hr_model();
    let mut store = MemoryStore::new(&model);
    let employee = model.type_id("Employee").unwrap();
    let address = model.type_id("Address").unwrap();
    let address_ref = model.reference_by_name(employee, "address").unwrap().id;

    let e = store.seed(employee, 1, &[("name", Value::from("E"))]);
    let a = store.seed(address, 2, &[("street", Value::from("Main"))]);
    store.link(e, address_ref, a);
    let ids = SequenceProvider::starting_at(100);

    let original = Payload::new()
        .with_id(e)
        .with("address", Payload::new().with_id(a));
    let updated = Payload::new().with_id(e).with("address", Value::Null);

    // WHEN
    let plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner
            .update("Employee", &original, &updated, &meta(), false)
            .unwrap()
    };
    store.apply(&plan).unwrap();

    // THEN the child is gone and the parent survives
    assert!(!store.contains(a));
    assert!(store.contains(e));
    assert!(store.targets_of(e, address_ref).is_empty());
}

#[test]
fn test_attribute_update_bumps_stored_version() {
    let model = hr_model();
    let mut store = MemoryStore::new(&model);
    let division = model.type_id("Division").unwrap();
    let d = store.seed(division, 1, &[("name", Value::from("Old"))]);
    let ids = SequenceProvider::starting_at(100);

    let original = payload! { "name" => Value::from("Old") }.with_id(d);
    let updated = payload! { "name" => Value::from("New") }.with_id(d);
    let plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner
            .update("Division", &original, &updated, &meta(), false)
            .unwrap()
    };
    store.apply(&plan).unwrap();

    let stored = store.get(d).unwrap();
    assert_eq!(stored.attributes.get("name"), Some(&Value::from("New")));
    assert_eq!(stored.version, 2);
}
