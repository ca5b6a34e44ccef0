#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Resource lifecycle, authentication and the error envelope over HTTP.

use agency::domain::models::ContractStatus;
use agency::test_support::{
    TEST_PASSWORD, TestApp, date, seed_agent, seed_branch, seed_case, seed_client, seed_contract,
    seed_insurance_type,
};
use agency_security::Role;
use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

async fn post(app: &TestApp, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    app.request(Method::POST, uri, Some(token), Some(body)).await
}

async fn put(app: &TestApp, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    app.request(Method::PUT, uri, Some(token), Some(body)).await
}

async fn delete(app: &TestApp, uri: &str, token: &str) -> StatusCode {
    app.request(Method::DELETE, uri, Some(token), None).await.0
}

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["contractId"].as_i64().unwrap())
        .collect()
}

fn close_to(value: &Value, expected: f64) -> bool {
    (value.as_f64().unwrap() - expected).abs() < 1e-9
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/api/v1/contracts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH");
    assert_eq!(body["error"]["details"], json!({}));

    let (status, body) = app.get("/api/v1/contracts", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid or expired token");

    // Signed correctly but for a user that does not exist.
    let (status, _) = app.get("/api/v1/contracts", &app.token(999)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_returns_a_usable_token() {
    let app = TestApp::new().await;
    app.login_as("admin@agency.test", Role::Admin, None).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "admin@agency.test", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid credentials");

    let (status, session) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "admin@agency.test", "password": TEST_PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["role"], "Admin");

    let token = session["token"].as_str().unwrap();
    let (status, me) = app.get("/api/v1/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "admin@agency.test");
    assert_eq!(me["agentId"], Value::Null);
}

#[tokio::test]
async fn only_admins_register_users() {
    let app = TestApp::new().await;
    let agent_id = seed_agent(&app.db, "Olena Kovalenko", None).await;
    let admin = app.login_as("admin@agency.test", Role::Admin, None).await;
    let agent = app.login_as("olena@agency.test", Role::Agent, Some(agent_id)).await;
    let new_user = json!({
        "email": "petro@agency.test",
        "password": "secret123",
        "role": "Agent",
        "agentId": agent_id
    });

    let (status, body) = post(&app, "/api/v1/auth/register", &agent, new_user.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Insufficient permissions");

    let (status, session) = post(&app, "/api/v1/auth/register", &admin, new_user.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["user"]["agentId"], agent_id);

    let (status, body) = post(&app, "/api/v1/auth/register", &admin, new_user).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "email");

    let (status, body) = post(
        &app,
        "/api/v1/auth/register",
        &admin,
        json!({"email": "x@agency.test", "password": "secret123", "role": "Agent"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "agentId");
}

#[tokio::test]
async fn branch_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.login_as("admin@agency.test", Role::Admin, None).await;

    let (status, created) = post(&app, "/api/v1/branches", &admin, json!({"name": "Kyiv Central"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["branchId"].as_i64().unwrap();
    assert_eq!(created["name"], "Kyiv Central");

    let (status, body) = post(&app, "/api/v1/branches", &admin, json!({"name": "Kyiv Central"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DB_CONSTRAINT");
    assert_eq!(body["error"]["message"], "Unique constraint violation");

    let (status, body) = put(&app, &format!("/api/v1/branches/{id}"), &admin, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "No fields to update");

    let (status, updated) = put(&app, &format!("/api/v1/branches/{id}"), &admin, json!({"name": "Lviv"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Lviv");

    let (_, found) = app.get("/api/v1/branches?query=lv", &admin).await;
    assert_eq!(found["pagination"]["total"], 1);

    assert_eq!(delete(&app, &format!("/api/v1/branches/{id}"), &admin).await, StatusCode::NO_CONTENT);
    let (status, body) = app.get(&format!("/api/v1/branches/{id}"), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Branch not found");
}

#[tokio::test]
async fn referenced_rows_cannot_be_deleted() {
    let app = TestApp::new().await;
    let branch = seed_branch(&app.db, "Odesa").await;
    seed_agent(&app.db, "Olena Kovalenko", Some(branch)).await;
    let admin = app.login_as("admin@agency.test", Role::Admin, None).await;

    let (status, body) = app
        .request(Method::DELETE, &format!("/api/v1/branches/{branch}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DB_CONSTRAINT");
    assert_eq!(body["error"]["message"], "Foreign key constraint violation");

    let (status, _) = app.get(&format!("/api/v1/branches/{branch}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn role_allowlist_applies_before_scoping() {
    let app = TestApp::new().await;
    let client = app.login_as("taras@example.com", Role::Client, None).await;
    let agent_id = seed_agent(&app.db, "Olena Kovalenko", None).await;
    let agent = app.login_as("olena@agency.test", Role::Agent, Some(agent_id)).await;

    for uri in ["/api/v1/branches", "/api/v1/agents", "/api/v1/audit-logs"] {
        let (status, body) = app.get(uri, &client).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"]["message"], "Insufficient permissions", "{uri}");
    }
    let (status, _) = app.get("/api/v1/audit-logs", &agent).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post(&app, "/api/v1/branches", &agent, json!({"name": "Dnipro"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/v1/insurance-types", &client).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_input_is_reported_per_field() {
    let app = TestApp::new().await;
    let admin = app.login_as("admin@agency.test", Role::Admin, None).await;

    let (status, body) = post(
        &app,
        "/api/v1/clients",
        &admin,
        json!({"lastName": "", "firstName": "Taras", "email": "not-an-email"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION");
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"lastName"));
    assert!(fields.contains(&"email"));

    let (status, body) = app.get("/api/v1/contracts/abc", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["message"], "ID must be a positive integer");

    let (status, body) = app.get("/api/v1/contracts?from=2024/01/01", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "from");

    let (status, body) = app
        .request(Method::POST, "/api/v1/branches", Some(&admin), Some(json!("just a string")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn unknown_paths_use_the_error_envelope() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/api/v2/contracts", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Endpoint not found");
}

#[tokio::test]
async fn contract_dates_and_pricing_are_checked() {
    let app = TestApp::new().await;
    let agent_id = seed_agent(&app.db, "Olena Kovalenko", None).await;
    let client_id = seed_client(&app.db, "Shevchenko", "Taras", Some("taras@example.com")).await;
    let ty = seed_insurance_type(&app.db, "Home", 0.02, 0.9, 0.15).await;
    let other_ty = seed_insurance_type(&app.db, "Life", 0.04, 1.0, 0.2).await;
    let admin = app.login_as("admin@agency.test", Role::Admin, None).await;

    let (status, body) = post(
        &app,
        "/api/v1/contracts",
        &admin,
        json!({
            "clientId": client_id, "agentId": agent_id, "insuranceTypeId": ty,
            "startDate": "2025-06-01", "endDate": "2025-01-01", "insuranceAmount": 5000.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "endDate");

    let (status, created) = post(
        &app,
        "/api/v1/contracts",
        &admin,
        json!({
            "clientId": client_id, "agentId": agent_id, "insuranceTypeId": ty,
            "startDate": "2025-01-01", "endDate": "2026-01-01", "insuranceAmount": 5000.0,
            "status": "Active"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(close_to(&created["contributionAmount"], 100.0));
    assert!(close_to(&created["agentPercent"], 0.15));
    let id = created["contractId"].as_i64().unwrap();

    let (status, repriced) = put(
        &app,
        &format!("/api/v1/contracts/{id}"),
        &admin,
        json!({"insuranceTypeId": other_ty}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(close_to(&repriced["contributionAmount"], 200.0));

    let (status, body) = put(
        &app,
        &format!("/api/v1/contracts/{id}"),
        &admin,
        json!({"endDate": "2024-12-31"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION");

    let (status, body) = post(
        &app,
        "/api/v1/contracts",
        &admin,
        json!({
            "clientId": 999, "agentId": agent_id, "insuranceTypeId": ty,
            "startDate": "2025-01-01", "endDate": "2026-01-01", "insuranceAmount": 5000.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DB_CONSTRAINT");
}

#[tokio::test]
async fn agent_writes_are_limited_to_their_portfolio() {
    let app = TestApp::new().await;
    let mine = seed_agent(&app.db, "Olena Kovalenko", None).await;
    let other = seed_agent(&app.db, "Petro Bondar", None).await;
    let client_id = seed_client(&app.db, "Shevchenko", "Taras", Some("taras@example.com")).await;
    let stranger = seed_client(&app.db, "Ukrainka", "Lesya", Some("lesya@example.com")).await;
    let ty = seed_insurance_type(&app.db, "Auto", 0.05, 0.8, 0.1).await;
    let own = seed_contract(&app.db, client_id, mine, ty, ContractStatus::Draft, date(2025, 1, 1), date(2026, 1, 1)).await;
    let foreign = seed_contract(&app.db, stranger, other, ty, ContractStatus::Draft, date(2025, 1, 1), date(2026, 1, 1)).await;
    let token = app.login_as("olena@agency.test", Role::Agent, Some(mine)).await;

    let (status, body) = post(&app, &format!("/api/v1/contracts/{foreign}/status"), &token, json!({"status": "Active"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Contract not in your portfolio");

    let (status, body) = post(&app, &format!("/api/v1/contracts/{own}/status"), &token, json!({"status": "Active"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Active");

    let (status, body) = put(&app, &format!("/api/v1/contracts/{own}"), &token, json!({"agentId": other})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Cannot reassign contract to another agent");

    let (status, _) = put(&app, &format!("/api/v1/clients/{stranger}"), &token, json!({"address": "Poltava"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, updated) = put(&app, &format!("/api/v1/clients/{client_id}"), &token, json!({"address": "Kaniv"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["address"], "Kaniv");

    let case = json!({"contractId": foreign, "caseDate": "2025-03-01", "actNumber": "ACT-1", "damageLevel": 0.5});
    let (status, _) = post(&app, "/api/v1/cases", &token, case).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let case = json!({"contractId": 999, "caseDate": "2025-03-01", "actNumber": "ACT-1", "damageLevel": 0.5});
    let (status, body) = post(&app, "/api/v1/cases", &token, case).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "contractId");

    assert_eq!(delete(&app, &format!("/api/v1/contracts/{own}"), &token).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn case_payment_is_accrued_from_the_contract() {
    let app = TestApp::new().await;
    let agent_id = seed_agent(&app.db, "Olena Kovalenko", None).await;
    let client_id = seed_client(&app.db, "Shevchenko", "Taras", Some("taras@example.com")).await;
    let ty = seed_insurance_type(&app.db, "Auto", 0.05, 0.8, 0.1).await;
    let contract = seed_contract(&app.db, client_id, agent_id, ty, ContractStatus::Active, date(2025, 1, 1), date(2026, 1, 1)).await;
    let token = app.login_as("olena@agency.test", Role::Agent, Some(agent_id)).await;

    let (status, case) = post(
        &app,
        "/api/v1/cases",
        &token,
        json!({"contractId": contract, "caseDate": "2025-04-10", "actNumber": " ACT-7 ", "damageLevel": 0.25}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // 10 000 x 0.25 x 0.8
    assert!(close_to(&case["accruedPayment"], 2000.0));
    assert_eq!(case["accruedDate"], "2025-04-10");
    assert_eq!(case["actNumber"], "ACT-7");

    let id = case["caseId"].as_i64().unwrap();
    let (status, updated) = put(&app, &format!("/api/v1/cases/{id}"), &token, json!({"damageLevel": 0.5})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(close_to(&updated["accruedPayment"], 4000.0));

    let (status, body) = put(&app, &format!("/api/v1/cases/{id}"), &token, json!({"damageLevel": 1.5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "damageLevel");

    let (_, listed) = app.get(&format!("/api/v1/cases?contractId={contract}&from=2025-04-01&to=2025-04-30"), &token).await;
    assert_eq!(listed["pagination"]["total"], 1);
}

#[tokio::test]
async fn mutations_are_audited_with_the_acting_user() {
    let app = TestApp::new().await;
    let admin_id = agency::test_support::seed_user(&app.db, "admin@agency.test", Role::Admin, None).await;
    let admin = app.token(admin_id);

    let (_, created) = post(&app, "/api/v1/branches", &admin, json!({"name": "Kharkiv"})).await;
    let id = created["branchId"].as_i64().unwrap();
    put(&app, &format!("/api/v1/branches/{id}"), &admin, json!({"name": "Kharkiv North"})).await;
    delete(&app, &format!("/api/v1/branches/{id}"), &admin).await;

    let (status, log) = app.get("/api/v1/audit-logs?entity=Branch", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["pagination"]["total"], 3);
    let actions: Vec<&str> = log["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["DELETE", "UPDATE", "INSERT"]);
    assert!(log["data"].as_array().unwrap().iter().all(|e| e["changedBy"] == admin_id));
    assert_eq!(log["data"][0]["payload"]["name"], "Kharkiv North");

    let (_, inserts) = app.get("/api/v1/audit-logs?action=INSERT", &admin).await;
    assert_eq!(inserts["pagination"]["total"], 1);
}

#[tokio::test]
async fn active_contracts_report_follows_portfolio_rules() {
    let app = TestApp::new().await;
    let mine = seed_agent(&app.db, "Olena Kovalenko", None).await;
    let other = seed_agent(&app.db, "Petro Bondar", None).await;
    let client_id = seed_client(&app.db, "Shevchenko", "Taras", Some("taras@example.com")).await;
    let stranger = seed_client(&app.db, "Ukrainka", "Lesya", Some("lesya@example.com")).await;
    let ty = seed_insurance_type(&app.db, "Auto", 0.05, 0.8, 0.1).await;
    let active = seed_contract(&app.db, client_id, mine, ty, ContractStatus::Active, date(2025, 1, 1), date(2099, 1, 1)).await;
    seed_contract(&app.db, client_id, mine, ty, ContractStatus::Draft, date(2025, 1, 1), date(2099, 1, 1)).await;
    seed_contract(&app.db, client_id, mine, ty, ContractStatus::Active, date(2020, 1, 1), date(2021, 1, 1)).await;
    seed_contract(&app.db, stranger, other, ty, ContractStatus::Active, date(2025, 1, 1), date(2099, 1, 1)).await;
    let agent = app.login_as("olena@agency.test", Role::Agent, Some(mine)).await;
    let client = app.login_as("taras@example.com", Role::Client, None).await;

    let (status, report) = app.get(&format!("/api/v1/reports/active-contracts?clientId={client_id}"), &agent).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["clientId"], client_id);
    let rows = report["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["contractId"], active);
    assert_eq!(rows[0]["agentName"], "Olena Kovalenko");
    assert_eq!(rows[0]["insuranceTypeName"], "Auto");

    let (status, _) = app.get(&format!("/api/v1/reports/active-contracts?clientId={stranger}"), &agent).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/api/v1/reports/active-contracts?clientId={client_id}"), &client).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/v1/reports/active-contracts?clientId={stranger}"), &client).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/v1/reports/active-contracts", &client).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "clientId");
}

#[tokio::test]
async fn status_options_list_every_status() {
    let app = TestApp::new().await;
    let token = app.login_as("taras@example.com", Role::Client, None).await;
    let (status, body) = app.get("/api/v1/status-options", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["contractStatuses"],
        json!(["Draft", "Active", "Suspended", "Cancelled", "Completed"])
    );
    assert_eq!(body["roles"], json!(["Admin", "Agent", "Client"]));
}

#[tokio::test]
async fn client_contract_list_can_be_limited_to_active() {
    let app = TestApp::new().await;
    let agent_id = seed_agent(&app.db, "Olena Kovalenko", None).await;
    let client_id = seed_client(&app.db, "Shevchenko", "Taras", Some("taras@example.com")).await;
    let ty = seed_insurance_type(&app.db, "Auto", 0.05, 0.8, 0.1).await;
    let active = seed_contract(&app.db, client_id, agent_id, ty, ContractStatus::Active, date(2025, 1, 1), date(2099, 1, 1)).await;
    let ended = seed_contract(&app.db, client_id, agent_id, ty, ContractStatus::Active, date(2020, 1, 1), date(2021, 1, 1)).await;
    let contract = seed_contract(&app.db, client_id, agent_id, ty, ContractStatus::Draft, date(2025, 1, 1), date(2099, 1, 1)).await;
    seed_case(&app.db, contract, date(2025, 2, 1), "C-1").await;
    let admin = app.login_as("admin@agency.test", Role::Admin, None).await;

    let (_, all) = app.get(&format!("/api/v1/clients/{client_id}/contracts"), &admin).await;
    assert_eq!(all["pagination"]["total"], 3);
    assert_eq!(ids(&all), vec![contract, ended, active]);

    let (_, current) = app
        .get(&format!("/api/v1/clients/{client_id}/contracts?activeOnly=true"), &admin)
        .await;
    assert_eq!(current["pagination"]["total"], 1);
    assert_eq!(current["data"][0]["contractId"], active);
}
