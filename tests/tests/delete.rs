//! Delete planning applied end to end against the in-memory store.

use strata_tests::prelude::*;

fn meta() -> Metadata {
    Metadata::new("u1", "alice", 1_700_000_000_000)
}

#[test]
fn test_delete_removes_exactly_the_owned_closure() {
    // GIVEN employee E owning address A and holding position P
    let model = hr_model();
    let mut store = MemoryStore::new(&model);
    let employee = model.type_id("Employee").unwrap();
    let address = model.type_id("Address").unwrap();
    let position = model.type_id("Position").unwrap();
    let address_ref = model.reference_by_name(employee, "address").unwrap().id;
    let positions_ref = model.reference_by_name(employee, "positions").unwrap().id;

    let e = store.seed(employee, 1, &[("name", Value::from("E"))]);
    let a = store.seed(address, 2, &[("street", Value::from("Main"))]);
    let p = store.seed(position, 3, &[("name", Value::from("P"))]);
    store.link(e, address_ref, a);
    store.link(e, positions_ref, p);
    let ids = SequenceProvider::starting_at(100);

    // WHEN
    let plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner.delete("Employee", &[e], &meta()).unwrap()
    };
    store.apply(&plan).unwrap();

    // THEN the owned closure is gone, the associated position survives
    assert!(!store.contains(e));
    assert!(!store.contains(a));
    assert!(store.contains(p));
}

#[test]
fn test_delete_blocked_by_mandatory_holder() {
    // GIVEN badge B that must always point at employee E
    let model = org_model();
    let mut store = MemoryStore::new(&model);
    let employee = model.type_id("Employee").unwrap();
    let badge = model.type_id("Badge").unwrap();
    let holder_ref = model.reference_by_name(badge, "holder").unwrap().id;

    let e = store.seed(employee, 1, &[("name", Value::from("E"))]);
    let b = store.seed(badge, 2, &[]);
    store.link(b, holder_ref, e);
    let ids = SequenceProvider::starting_at(100);

    // WHEN / THEN
    {
        let planner = StatementPlanner::new(&model, &store, &ids);
        assert!(matches!(
            planner.delete("Employee", &[e], &meta()),
            Err(PlanError::DanglingMandatoryReference { .. })
        ));
    }

    // deleting the badge first unblocks the employee
    let badge_plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner.delete("Badge", &[b], &meta()).unwrap()
    };
    store.apply(&badge_plan).unwrap();
    let employee_plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner.delete("Employee", &[e], &meta()).unwrap()
    };
    store.apply(&employee_plan).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_delete_blocked_by_mandatory_holder_of_owned_child() {
    // GIVEN department D owning team T, with project P mandatorily on T
    let model = org_model();
    let mut store = MemoryStore::new(&model);
    let department = model.type_id("Department").unwrap();
    let team = model.type_id("Team").unwrap();
    let project = model.type_id("Project").unwrap();
    let teams_ref = model.reference_by_name(department, "teams").unwrap().id;
    let team_ref = model.reference_by_name(project, "team").unwrap().id;

    let d = store.seed(department, 1, &[("name", Value::from("D"))]);
    let t = store.seed(team, 2, &[("name", Value::from("T"))]);
    let p = store.seed(project, 3, &[]);
    store.link(d, teams_ref, t);
    store.link(p, team_ref, t);
    let ids = SequenceProvider::starting_at(100);

    // WHEN / THEN deleting the root trips on the holder of the owned child
    {
        let planner = StatementPlanner::new(&model, &store, &ids);
        assert!(matches!(
            planner.delete("Department", &[d], &meta()),
            Err(PlanError::DanglingMandatoryReference { .. })
        ));
    }

    // deleting the project first unblocks the whole subtree
    let project_plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner.delete("Project", &[p], &meta()).unwrap()
    };
    store.apply(&project_plan).unwrap();
    let department_plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner.delete("Department", &[d], &meta()).unwrap()
    };
    store.apply(&department_plan).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_delete_cascades_through_annotated_reference() {
    // GIVEN account ACC annotated to die with its owner E
    let model = org_model();
    let mut store = MemoryStore::new(&model);
    let employee = model.type_id("Employee").unwrap();
    let account = model.type_id("Account").unwrap();
    let owner_ref = model.reference_by_name(account, "owner").unwrap().id;
    let accounts_ref = model.reference_by_name(employee, "accounts").unwrap().id;

    let e = store.seed(employee, 1, &[("name", Value::from("E"))]);
    let acc = store.seed(account, 2, &[]);
    store.link(acc, owner_ref, e);
    store.link(e, accounts_ref, acc);
    let ids = SequenceProvider::starting_at(100);

    // WHEN
    let plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner.delete("Employee", &[e], &meta()).unwrap()
    };

    // THEN the plan schedules each row once despite the mutual edges
    assert_eq!(plan.iter().filter(|s| s.is_delete()).count(), 2);
    store.apply(&plan).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_delete_owned_child_detaches_from_surviving_parent() {
    // GIVEN department D owning team T
    let model = org_model();
    let mut store = MemoryStore::new(&model);
    let department = model.type_id("Department").unwrap();
    let team = model.type_id("Team").unwrap();
    let teams_ref = model.reference_by_name(department, "teams").unwrap().id;

    let d = store.seed(department, 1, &[("name", Value::from("D"))]);
    let t = store.seed(team, 2, &[("name", Value::from("T"))]);
    store.link(d, teams_ref, t);
    let ids = SequenceProvider::starting_at(100);

    // WHEN deleting the team alone
    let plan = {
        let planner = StatementPlanner::new(&model, &store, &ids);
        planner.delete("Team", &[t], &meta()).unwrap()
    };
    store.apply(&plan).unwrap();

    // THEN the department keeps living without the edge
    assert!(store.contains(d));
    assert!(!store.contains(t));
    assert!(store.targets_of(d, teams_ref).is_empty());
}
