//! Integration tests for solution, use case, and prerequisite queries.
//!
//! Each test runs against its own temporary database on the shared
//! PostgreSQL server provided by `planner-test-utils`.

use uuid::Uuid;

use planner_db::models::{NewPrerequisite, NewSolution, NewUseCase, PrerequisiteScope};
use planner_db::queries::{prerequisites, solutions, use_cases};
use planner_test_utils::{create_legacy_prerequisites_table, create_test_db, drop_test_db};

fn new_solution(name: &str) -> NewSolution {
    NewSolution {
        name: name.to_string(),
        description: format!("{name} description"),
        icon: "🔑".to_string(),
    }
}

// -----------------------------------------------------------------------
// Solutions
// -----------------------------------------------------------------------

#[tokio::test]
async fn insert_and_get_solution() {
    let (pool, db_name) = create_test_db().await;

    let solution = solutions::insert_solution(&pool, &new_solution("Password Safe"))
        .await
        .expect("insert_solution should succeed");

    assert_eq!(solution.name, "Password Safe");
    assert_eq!(solution.icon, "🔑");
    assert_eq!(solution.created_at, solution.updated_at);

    let fetched = solutions::get_solution(&pool, solution.id)
        .await
        .expect("get_solution should succeed")
        .expect("solution should exist");
    assert_eq!(fetched, solution);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_solutions_orders_by_name() {
    let (pool, db_name) = create_test_db().await;

    solutions::insert_solution(&pool, &new_solution("Remote Support"))
        .await
        .unwrap();
    solutions::insert_solution(&pool, &new_solution("Identity Security Insights"))
        .await
        .unwrap();
    solutions::insert_solution(&pool, &new_solution("Password Safe"))
        .await
        .unwrap();

    let names: Vec<String> = solutions::list_solutions(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(
        names,
        vec!["Identity Security Insights", "Password Safe", "Remote Support"]
    );
    assert_eq!(solutions::count_solutions(&pool).await.unwrap(), 3);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_solution_overwrites_fields_and_bumps_updated_at() {
    let (pool, db_name) = create_test_db().await;

    let solution = solutions::insert_solution(&pool, &new_solution("PRA"))
        .await
        .unwrap();

    let updated = solutions::update_solution(
        &pool,
        solution.id,
        &NewSolution {
            name: "Privileged Remote Access".to_string(),
            description: String::new(),
            icon: "🔐".to_string(),
        },
    )
    .await
    .expect("update should succeed");

    assert_eq!(updated.name, "Privileged Remote Access");
    assert!(updated.description.is_empty());
    assert_eq!(updated.created_at, solution.created_at);
    assert!(updated.updated_at >= solution.updated_at);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_missing_solution_errors() {
    let (pool, db_name) = create_test_db().await;

    let err = solutions::update_solution(&pool, Uuid::new_v4(), &new_solution("x"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"), "got: {err}");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_solution_cascades_to_its_children_only() {
    let (pool, db_name) = create_test_db().await;

    let doomed = solutions::insert_solution(&pool, &new_solution("Doomed"))
        .await
        .unwrap();
    let kept = solutions::insert_solution(&pool, &new_solution("Kept"))
        .await
        .unwrap();

    for solution_id in [doomed.id, kept.id] {
        use_cases::insert_use_case(
            &pool,
            &NewUseCase {
                solution_id,
                text: "use case".to_string(),
                prerequisites: vec![],
            },
        )
        .await
        .unwrap();
        prerequisites::insert_prerequisite(
            &pool,
            &NewPrerequisite {
                text: "prereq".to_string(),
                scope: PrerequisiteScope::Solution(solution_id),
            },
            None,
        )
        .await
        .unwrap();
    }

    let report = solutions::delete_solution_cascade(&pool, doomed.id)
        .await
        .expect("cascade should succeed");
    assert_eq!(report.use_cases, 1);
    assert_eq!(report.prerequisites, 1);

    assert!(solutions::get_solution(&pool, doomed.id).await.unwrap().is_none());
    let remaining_use_cases = use_cases::list_use_cases(&pool).await.unwrap();
    assert_eq!(remaining_use_cases.len(), 1);
    assert_eq!(remaining_use_cases[0].solution_id, kept.id);
    let remaining_prereqs = prerequisites::list_prerequisites(&pool).await.unwrap();
    assert_eq!(remaining_prereqs.len(), 1);
    assert_eq!(remaining_prereqs[0].scope, PrerequisiteScope::Solution(kept.id));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_missing_solution_rolls_back() {
    let (pool, db_name) = create_test_db().await;

    // A use case pointing at a solution id that does not exist: the cascade
    // finds no solution row and must leave the orphan alone.
    let ghost = Uuid::new_v4();
    use_cases::insert_use_case(
        &pool,
        &NewUseCase {
            solution_id: ghost,
            text: "orphan".to_string(),
            prerequisites: vec![],
        },
    )
    .await
    .unwrap();

    let result = solutions::delete_solution_cascade(&pool, ghost).await;
    assert!(result.is_err());
    assert_eq!(use_cases::list_use_cases(&pool).await.unwrap().len(), 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Use cases
// -----------------------------------------------------------------------

#[tokio::test]
async fn use_case_roundtrips_embedded_prerequisites() {
    let (pool, db_name) = create_test_db().await;

    let solution_id = Uuid::new_v4();
    let use_case = use_cases::insert_use_case(
        &pool,
        &NewUseCase {
            solution_id,
            text: "SSH key management".to_string(),
            prerequisites: vec![
                "SSH keys discovered".to_string(),
                "Key rotation policies configured".to_string(),
            ],
        },
    )
    .await
    .unwrap();

    let fetched = use_cases::get_use_case(&pool, use_case.id)
        .await
        .unwrap()
        .expect("use case should exist");
    assert_eq!(
        fetched.prerequisites,
        vec!["SSH keys discovered", "Key rotation policies configured"]
    );

    let for_solution = use_cases::list_use_cases_for_solution(&pool, solution_id)
        .await
        .unwrap();
    assert_eq!(for_solution.len(), 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_use_case_keeps_linked_prerequisites_unless_asked() {
    let (pool, db_name) = create_test_db().await;

    let solution_id = Uuid::new_v4();
    let mut ids = Vec::new();
    for _ in 0..2 {
        let uc = use_cases::insert_use_case(
            &pool,
            &NewUseCase {
                solution_id,
                text: "uc".to_string(),
                prerequisites: vec![],
            },
        )
        .await
        .unwrap();
        prerequisites::insert_prerequisite(
            &pool,
            &NewPrerequisite {
                text: "linked".to_string(),
                scope: PrerequisiteScope::UseCase(uc.id),
            },
            None,
        )
        .await
        .unwrap();
        ids.push(uc.id);
    }

    let removed = use_cases::delete_use_case(&pool, ids[0], false).await.unwrap();
    assert_eq!(removed, 0);
    assert_eq!(prerequisites::list_prerequisites(&pool).await.unwrap().len(), 2);

    let removed = use_cases::delete_use_case(&pool, ids[1], true).await.unwrap();
    assert_eq!(removed, 1);
    let left = prerequisites::list_prerequisites(&pool).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].scope, PrerequisiteScope::UseCase(ids[0]));

    pool.close().await;
    drop_test_db(&db_name).await;
}

// -----------------------------------------------------------------------
// Prerequisites
// -----------------------------------------------------------------------

#[tokio::test]
async fn prerequisite_scope_survives_update() {
    let (pool, db_name) = create_test_db().await;

    let solution_id = Uuid::new_v4();
    let use_case_id = Uuid::new_v4();
    let prereq = prerequisites::insert_prerequisite(
        &pool,
        &NewPrerequisite {
            text: "SSL certificate".to_string(),
            scope: PrerequisiteScope::Solution(solution_id),
        },
        None,
    )
    .await
    .unwrap();

    let moved = prerequisites::update_prerequisite(
        &pool,
        prereq.id,
        &NewPrerequisite {
            text: "SSL certificate for web portal".to_string(),
            scope: PrerequisiteScope::UseCase(use_case_id),
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.scope, PrerequisiteScope::UseCase(use_case_id));
    assert_eq!(moved.text, "SSL certificate for web portal");

    prerequisites::delete_prerequisite(&pool, prereq.id).await.unwrap();
    assert!(
        prerequisites::get_prerequisite(&pool, prereq.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(prerequisites::delete_prerequisite(&pool, prereq.id).await.is_err());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn check_constraint_rejects_unattached_rows() {
    let (pool, db_name) = create_test_db().await;

    let result = sqlx::query("INSERT INTO solution_prerequisites (text) VALUES ('floating')")
        .execute(&pool)
        .await;
    assert!(result.is_err(), "row without owner must be rejected");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn legacy_prerequisites_absent_by_default() {
    let (pool, db_name) = create_test_db().await;

    assert!(!prerequisites::legacy_table_exists(&pool).await.unwrap());
    assert!(prerequisites::list_legacy_prerequisites(&pool).await.unwrap().is_empty());

    create_legacy_prerequisites_table(&pool).await;
    sqlx::query("INSERT INTO prerequisites (text, solution_id) VALUES ($1, $2)")
        .bind("Read access to Active Directory")
        .bind(Uuid::new_v4())
        .execute(&pool)
        .await
        .unwrap();

    let legacy = prerequisites::list_legacy_prerequisites(&pool).await.unwrap();
    assert_eq!(legacy.len(), 1);
    assert_eq!(legacy[0].text, "Read access to Active Directory");
    assert!(legacy[0].created_at.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}
