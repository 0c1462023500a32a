use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use planner_core::aggregate::{AggregatedSolution, load_aggregate};
use planner_core::catalog::{self, CatalogError};
use planner_core::dashboard::{
    DashboardItem, DashboardTotals, SolutionSelection, ViewMode, apply_filter, dashboard_items,
    dashboard_totals,
};
use planner_core::document::{ExportKind, PlanSelection, PocDocument, escape_html, render_html};
use planner_core::planner::{PlannerError, PlannerSession};
use planner_core::snapshot::{load_saved_plan, save_poc_plan, unresolved_count};
use planner_core::store::{Envelope, Store, StoreError, UseCaseDeletePolicy};
use planner_db::models::{
    NewPrerequisite, NewSolution, NewUseCase, PocPlan, PocPlanStatus, PrerequisiteScope,
    Solution, SolutionPrerequisite, UseCase,
};

type AppState = Arc<dyn Store>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(e) => Self::bad_request(e.to_string()),
            CatalogError::Store(e) => e.into(),
        }
    }
}

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(Envelope::<()>::err(self.message))).into_response()
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope::ok(data)))
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub search: String,
    /// Comma-separated solution IDs; absent means all.
    pub solutions: Option<String>,
    #[serde(default)]
    pub view: ViewMode,
}

#[derive(Debug, Serialize)]
pub struct SolutionOption {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub checked: bool,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub solutions: Vec<SolutionOption>,
    pub totals: DashboardTotals,
    pub items: Vec<DashboardItem>,
}

#[derive(Debug, Deserialize)]
pub struct NewUseCaseBody {
    pub solution_id: Uuid,
    pub text: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUseCaseBody {
    pub text: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUseCaseQuery {
    #[serde(default)]
    pub delete_linked: bool,
}

#[derive(Debug, Deserialize)]
pub struct PrerequisiteBody {
    pub text: String,
    pub scope: PrerequisiteScope,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePrerequisiteBody {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedSolution {
    pub id: Uuid,
    pub use_cases: u64,
    pub prerequisites: u64,
}

#[derive(Debug, Serialize)]
pub struct PlanDetailResponse {
    pub plan: PocPlan,
    pub document: PocDocument,
    pub unresolved: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: PocPlanStatus,
}

#[derive(Debug, Deserialize)]
pub struct PrintQuery {
    #[serde(default)]
    pub kind: ExportKind,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(store: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/solutions", get(list_solutions).post(create_solution))
        .route(
            "/api/solutions/{id}",
            get(get_solution).put(update_solution).delete(delete_solution),
        )
        .route("/api/solutions/{id}/use-cases", get(list_use_cases))
        .route("/api/solutions/{id}/prerequisites", get(list_prerequisites))
        .route("/api/use-cases", post(create_use_case))
        .route(
            "/api/use-cases/{id}",
            put(update_use_case).delete(delete_use_case),
        )
        .route("/api/prerequisites", post(create_prerequisite))
        .route(
            "/api/prerequisites/{id}",
            put(update_prerequisite).delete(delete_prerequisite),
        )
        .route("/api/dashboard", get(dashboard))
        .route("/api/plans", get(list_plans).post(create_plan))
        .route(
            "/api/plans/{id}",
            get(get_plan).patch(update_plan_status).delete(delete_plan),
        )
        .route("/api/plans/{id}/print", get(print_plan))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(store: AppState, addr: SocketAddr) -> Result<()> {
    let app = build_router(store);
    tracing::info!("poc-planner serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("poc-planner serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

async fn index(State(store): State<AppState>) -> Result<Response, AppError> {
    let aggregate = load_aggregate(store.as_ref()).await?;
    let plans = store.list_poc_plans().await?;

    let solutions = if aggregate.is_empty() {
        "<li>No solutions. Run <code>poc-planner seed</code>.</li>".to_string()
    } else {
        aggregate
            .iter()
            .map(|s| {
                format!(
                    "<li>{} {} ({} use cases, {} prerequisites)</li>",
                    escape_html(&s.solution.icon),
                    escape_html(s.name()),
                    s.use_cases.len(),
                    s.prerequisites.len()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let rows = if plans.is_empty() {
        "<tr><td colspan=\"4\">No saved plans.</td></tr>".to_string()
    } else {
        plans
            .iter()
            .map(|p| {
                format!(
                    "<tr><td><a href=\"/api/plans/{id}/print\">{company}</a></td><td>{status}</td>\
                     <td>{created}</td><td><a href=\"/api/plans/{id}\">{id}</a></td></tr>",
                    id = p.id,
                    company = escape_html(&p.customer_info.company_name),
                    status = p.status,
                    created = p.created_at.format("%Y-%m-%d"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let html = format!(
        "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><title>poc-planner</title></head><body>\
<h1>poc-planner</h1>\
<p><a href=\"/api/solutions\">/api/solutions</a> | <a href=\"/api/dashboard\">/api/dashboard</a> | \
<a href=\"/api/plans\">/api/plans</a></p>\
<h2>Solutions</h2><ul>{solutions}</ul>\
<h2>Saved plans</h2>\
<table><tr><th>Customer</th><th>Status</th><th>Created</th><th>ID</th></tr>{rows}</table>\
</body></html>"
    );

    Ok(Html(html).into_response())
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

async fn list_solutions(State(store): State<AppState>) -> ApiResult<Vec<AggregatedSolution>> {
    ok(load_aggregate(store.as_ref()).await?)
}

async fn get_solution(State(store): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Solution> {
    ok(store.get_solution(id).await?)
}

async fn create_solution(
    State(store): State<AppState>,
    Json(body): Json<NewSolution>,
) -> Result<(StatusCode, Json<Envelope<Solution>>), AppError> {
    let solution = catalog::add_solution(store.as_ref(), &body).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(solution))))
}

async fn update_solution(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NewSolution>,
) -> ApiResult<Solution> {
    ok(catalog::update_solution(store.as_ref(), id, &body).await?)
}

async fn delete_solution(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedSolution> {
    let report = catalog::delete_solution(store.as_ref(), id).await?;
    ok(DeletedSolution {
        id,
        use_cases: report.use_cases,
        prerequisites: report.prerequisites,
    })
}

async fn list_use_cases(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<UseCase>> {
    ok(catalog::use_cases_for(store.as_ref(), id).await?)
}

async fn create_use_case(
    State(store): State<AppState>,
    Json(body): Json<NewUseCaseBody>,
) -> Result<(StatusCode, Json<Envelope<UseCase>>), AppError> {
    store.get_solution(body.solution_id).await?;
    let use_case = catalog::add_use_case(
        store.as_ref(),
        &NewUseCase {
            solution_id: body.solution_id,
            text: body.text,
            prerequisites: body.prerequisites,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(use_case))))
}

async fn update_use_case(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUseCaseBody>,
) -> ApiResult<UseCase> {
    let current = store.get_use_case(id).await?;
    let fields = NewUseCase {
        solution_id: current.solution_id,
        text: body.text,
        prerequisites: body.prerequisites,
    };
    ok(catalog::update_use_case(store.as_ref(), id, &fields).await?)
}

async fn delete_use_case(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteUseCaseQuery>,
) -> ApiResult<u64> {
    let policy = if query.delete_linked {
        UseCaseDeletePolicy::DeleteLinkedPrerequisites
    } else {
        UseCaseDeletePolicy::KeepLinkedPrerequisites
    };
    ok(catalog::delete_use_case(store.as_ref(), id, policy).await?)
}

async fn list_prerequisites(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<SolutionPrerequisite>> {
    ok(catalog::prerequisites_for(store.as_ref(), id).await?)
}

async fn create_prerequisite(
    State(store): State<AppState>,
    Json(body): Json<PrerequisiteBody>,
) -> Result<(StatusCode, Json<Envelope<SolutionPrerequisite>>), AppError> {
    let prerequisite = catalog::add_prerequisite(
        store.as_ref(),
        &NewPrerequisite {
            text: body.text,
            scope: body.scope,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(prerequisite))))
}

async fn update_prerequisite(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePrerequisiteBody>,
) -> ApiResult<SolutionPrerequisite> {
    let current = store.get_prerequisite(id).await?;
    let fields = NewPrerequisite {
        text: body.text,
        scope: current.scope,
    };
    ok(catalog::update_prerequisite(store.as_ref(), id, &fields).await?)
}

async fn delete_prerequisite(State(store): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Uuid> {
    catalog::delete_prerequisite(store.as_ref(), id).await?;
    ok(id)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn parse_solution_ids(raw: &str) -> Result<Vec<Uuid>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Uuid>()
                .map_err(|_| AppError::bad_request(format!("invalid solution id: {s:?}")))
        })
        .collect()
}

async fn dashboard(
    State(store): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardResponse> {
    let aggregate = load_aggregate(store.as_ref()).await?;
    let selection = match &query.solutions {
        Some(raw) => SolutionSelection::only(&aggregate, parse_solution_ids(raw)?),
        None => SolutionSelection::all(&aggregate),
    };

    let filtered = apply_filter(&aggregate, &selection, &query.search);
    let items = dashboard_items(&filtered, query.view);
    let totals = dashboard_totals(&items, &selection);
    let solutions = aggregate
        .iter()
        .map(|s| SolutionOption {
            id: s.id(),
            name: s.solution.name.clone(),
            icon: s.solution.icon.clone(),
            checked: selection.contains(s.id()),
        })
        .collect();

    ok(DashboardResponse {
        solutions,
        totals,
        items,
    })
}

// ---------------------------------------------------------------------------
// Saved plans
// ---------------------------------------------------------------------------

async fn list_plans(State(store): State<AppState>) -> ApiResult<Vec<PocPlan>> {
    ok(store.list_poc_plans().await?)
}

async fn create_plan(
    State(store): State<AppState>,
    Json(selection): Json<PlanSelection>,
) -> Result<(StatusCode, Json<Envelope<PocPlan>>), AppError> {
    let aggregate = load_aggregate(store.as_ref()).await?;

    // Run the selection through the planner so the same rules apply as in
    // the interactive flow.
    let mut session = PlannerSession::new();
    session.set_customer(selection.customer.clone());
    session.select_solutions(
        selection
            .solutions
            .iter()
            .copied()
            .filter(|id| aggregate.iter().any(|s| s.id() == *id)),
    );
    for (solution_id, use_cases) in &selection.selected_use_cases {
        if !session.is_selected(*solution_id) {
            continue;
        }
        for uc in use_cases {
            session.set_use_case(*solution_id, *uc, true)?;
        }
    }
    for (solution_id, text) in &selection.custom_use_cases {
        if session.is_selected(*solution_id) {
            session.set_custom_use_case(*solution_id, text)?;
        }
    }
    session.advance()?;

    let plan = save_poc_plan(store.as_ref(), &aggregate, session.selection()).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(plan))))
}

async fn get_plan(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PlanDetailResponse> {
    let (plan, document) = load_saved_plan(store.as_ref(), id).await?;
    let unresolved = unresolved_count(&document);
    ok(PlanDetailResponse {
        plan,
        document,
        unresolved,
    })
}

async fn update_plan_status(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> ApiResult<PocPlan> {
    store.update_poc_plan_status(id, body.status).await?;
    ok(store.get_poc_plan(id).await?)
}

async fn delete_plan(State(store): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Uuid> {
    store.delete_poc_plan(id).await?;
    ok(id)
}

async fn print_plan(
    State(store): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PrintQuery>,
) -> Result<Html<String>, AppError> {
    let (_, document) = load_saved_plan(store.as_ref(), id).await?;
    Ok(Html(render_html(&document, query.kind)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use planner_core::seed::seed_starter_data;
    use planner_core::store::{Collection, MemoryStore, Operation, Store};

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    async fn seeded() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        seed_starter_data(store.as_ref()).await.unwrap();
        store
    }

    async fn send(
        store: Arc<MemoryStore>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let app = super::build_router(store);
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        app.oneshot(request).await.unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 4 * 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 4 * 1_048_576)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn solution_id(store: &MemoryStore, name: &str) -> uuid::Uuid {
        store
            .list_solutions()
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.name == name)
            .unwrap()
            .id
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn index_returns_html() {
        let resp = send(seeded().await, "GET", "/", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp
            .headers()
            .get("content-type")
            .expect("should have content-type header")
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.contains("text/html"), "got: {content_type}");
        assert!(body_text(resp).await.contains("Password Safe"));
    }

    #[tokio::test]
    async fn solutions_are_wrapped_in_envelope() {
        let resp = send(seeded().await, "GET", "/api/solutions", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
        let data = json["data"].as_array().expect("data should be an array");
        assert_eq!(data.len(), 6);
        assert!(data[0].get("use_cases").is_some());
        assert!(data[0].get("name").is_some(), "solution fields are flattened");
    }

    #[tokio::test]
    async fn store_failure_is_500_with_message() {
        let store = seeded().await;
        store.fail(Collection::UseCases, Operation::List);
        let resp = send(store, "GET", "/api/solutions", None).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("injected failure"));
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn blank_solution_name_is_400() {
        let store = seeded().await;
        let resp = send(
            store.clone(),
            "POST",
            "/api/solutions",
            Some(json!({ "name": "  ", "description": "", "icon": "" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.count_solutions().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn create_and_delete_solution() {
        let store = seeded().await;
        let resp = send(
            store.clone(),
            "POST",
            "/api/solutions",
            Some(json!({ "name": "Cloud Privilege Broker", "description": "", "icon": "☁️" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let id = body_json(resp).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let resp = send(
            store.clone(),
            "POST",
            "/api/use-cases",
            Some(json!({ "solution_id": id, "text": "Entitlement review" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = send(store.clone(), "DELETE", &format!("/api/solutions/{id}"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["use_cases"], 1);

        let resp = send(store, "DELETE", &format!("/api/solutions/{id}"), None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn use_case_for_unknown_solution_is_404() {
        let resp = send(
            seeded().await,
            "POST",
            "/api/use-cases",
            Some(json!({ "solution_id": uuid::Uuid::new_v4(), "text": "Orphan" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dashboard_filters_by_search_and_selection() {
        let store = seeded().await;
        let ps = solution_id(&store, "Password Safe").await;

        let resp = send(
            store.clone(),
            "GET",
            &format!("/api/dashboard?search=SSH&solutions={ps}&view=use_cases"),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let items = json["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["text"], "SSH key management");
        assert_eq!(json["data"]["totals"]["solutions"], 1);
        let checked: Vec<_> = json["data"]["solutions"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|s| s["checked"] == true)
            .collect();
        assert_eq!(checked.len(), 1);

        let resp = send(store, "GET", "/api/dashboard?solutions=nope", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn plan_lifecycle() {
        let store = seeded().await;
        let ps = solution_id(&store, "Password Safe").await;
        let ssh = store
            .list_use_cases()
            .await
            .unwrap()
            .into_iter()
            .find(|uc| uc.text == "SSH key management")
            .unwrap()
            .id;

        let selection = json!({
            "solutions": [ps],
            "selected_use_cases": { ps.to_string(): [ssh] },
            "custom_use_cases": { ps.to_string(): "Break-glass rotation" },
            "customer": { "company_name": "Acme & Sons" }
        });
        let resp = send(store.clone(), "POST", "/api/plans", Some(selection)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let plan_id = body_json(resp).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let resp = send(store.clone(), "GET", &format!("/api/plans/{plan_id}"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["plan"]["status"], "draft");
        assert_eq!(json["data"]["unresolved"], 0);
        let rows = &json["data"]["document"]["sections"][0]["checklist"]["value"];
        assert_eq!(rows[0]["milestone"], "SSH key management");
        assert_eq!(rows[1]["custom"], true);

        let resp = send(
            store.clone(),
            "PATCH",
            &format!("/api/plans/{plan_id}"),
            Some(json!({ "status": "approved" })),
        )
        .await;
        assert_eq!(body_json(resp).await["data"]["status"], "approved");

        let resp = send(
            store.clone(),
            "GET",
            &format!("/api/plans/{plan_id}/print?kind=success-plan"),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Mutual POC Success Plan"));
        assert!(html.contains("Acme &amp; Sons"));
        assert!(!html.contains("Technical Pre-requisites"));

        let resp = send(store.clone(), "DELETE", &format!("/api/plans/{plan_id}"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = send(store, "GET", &format!("/api/plans/{plan_id}"), None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn plan_without_known_solutions_is_400() {
        let selection = json!({ "solutions": [uuid::Uuid::new_v4()] });
        let resp = send(seeded().await, "POST", "/api/plans", Some(selection)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn missing_plan_is_404() {
        let random_id = uuid::Uuid::new_v4();
        let resp = send(seeded().await, "GET", &format!("/api/plans/{random_id}/print"), None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
