#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Row scoping through the HTTP surface: every role sees exactly its rows.

use agency::domain::models::ContractStatus;
use agency::test_support::{
    TestApp, date, seed_agent, seed_case, seed_client, seed_contract, seed_insurance_type,
};
use agency_security::Role;
use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

struct Portfolio {
    mine: i64,
    other: i64,
    my_client: i64,
    other_client: i64,
    ty: i64,
}

async fn portfolio(app: &TestApp) -> Portfolio {
    let db = &app.db;
    let mine = seed_agent(db, "Olena Kovalenko", None).await;
    let other = seed_agent(db, "Petro Bondar", None).await;
    let my_client = seed_client(db, "Shevchenko", "Taras", Some("taras@example.com")).await;
    let other_client = seed_client(db, "Ukrainka", "Lesya", Some("lesya@example.com")).await;
    let ty = seed_insurance_type(db, "Auto", 0.05, 0.8, 0.1).await;
    Portfolio {
        mine,
        other,
        my_client,
        other_client,
        ty,
    }
}

async fn active_contract(app: &TestApp, client_id: i64, agent_id: i64, ty: i64) -> i64 {
    seed_contract(
        &app.db,
        client_id,
        agent_id,
        ty,
        ContractStatus::Active,
        date(2024, 1, 1),
        date(2030, 1, 1),
    )
    .await
}

fn ids(body: &Value, key: &str) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row[key].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn agent_contract_list_is_limited_to_their_portfolio() {
    let app = TestApp::new().await;
    let p = portfolio(&app).await;
    for _ in 0..45 {
        active_contract(&app, p.my_client, p.mine, p.ty).await;
    }
    for _ in 0..100 {
        active_contract(&app, p.other_client, p.other, p.ty).await;
    }
    let token = app.login_as("olena@agency.test", Role::Agent, Some(p.mine)).await;

    let (status, body) = app.get("/api/v1/contracts?page=1&limit=20", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 20);
    assert_eq!(
        body["pagination"],
        json!({"page": 1, "limit": 20, "total": 45, "totalPages": 3})
    );
    assert!(body["data"].as_array().unwrap().iter().all(|c| c["agentId"] == p.mine));

    let (_, last) = app.get("/api/v1/contracts?page=3&limit=20", &token).await;
    assert_eq!(last["data"].as_array().unwrap().len(), 5);

    let (status, beyond) = app.get("/api/v1/contracts?page=4&limit=20", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(beyond["data"], json!([]));
    assert_eq!(beyond["pagination"]["total"], 45);
    assert_eq!(beyond["pagination"]["totalPages"], 3);
}

#[tokio::test]
async fn unmatched_client_gets_an_empty_page_not_an_error() {
    let app = TestApp::new().await;
    let p = portfolio(&app).await;
    active_contract(&app, p.my_client, p.mine, p.ty).await;
    let token = app.login_as("nobody@example.com", Role::Client, None).await;

    for uri in ["/api/v1/contracts", "/api/v1/clients", "/api/v1/cases"] {
        let (status, body) = app.get(uri, &token).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(
            body,
            json!({"data": [], "pagination": {"page": 1, "limit": 20, "total": 0, "totalPages": 0}}),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn agent_without_agent_record_sees_nothing() {
    let app = TestApp::new().await;
    let p = portfolio(&app).await;
    active_contract(&app, p.my_client, p.mine, p.ty).await;
    let token = app.login_as("unlinked@agency.test", Role::Agent, None).await;

    let (status, body) = app.get("/api/v1/contracts", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 0);

    let (status, _) = app.get("/api/v1/agents", &token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn foreign_contract_is_hidden_from_an_agent() {
    let app = TestApp::new().await;
    let p = portfolio(&app).await;
    let foreign = active_contract(&app, p.other_client, p.other, p.ty).await;
    let agent = app.login_as("olena@agency.test", Role::Agent, Some(p.mine)).await;
    let admin = app.login_as("admin@agency.test", Role::Admin, None).await;

    let (status, body) = app.get(&format!("/api/v1/contracts/{foreign}"), &agent).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = app.get(&format!("/api/v1/contracts/{foreign}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contractId"], foreign);
}

#[tokio::test]
async fn agent_cannot_create_a_contract_for_another_agent() {
    let app = TestApp::new().await;
    let p = portfolio(&app).await;
    let token = app.login_as("olena@agency.test", Role::Agent, Some(p.mine)).await;
    let body = |agent_id: i64| {
        json!({
            "clientId": p.my_client,
            "agentId": agent_id,
            "insuranceTypeId": p.ty,
            "startDate": "2025-01-01",
            "endDate": "2026-01-01",
            "insuranceAmount": 20000.0
        })
    };

    let (status, err) = app
        .request(Method::POST, "/api/v1/contracts", Some(&token), Some(body(p.other)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["error"]["code"], "FORBIDDEN");

    let (status, created) = app
        .request(Method::POST, "/api/v1/contracts", Some(&token), Some(body(p.mine)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["agentId"], p.mine);
    assert_eq!(created["status"], "Draft");
    let contribution = created["contributionAmount"].as_f64().unwrap();
    assert!((contribution - 1000.0).abs() < 1e-9);
    let percent = created["agentPercent"].as_f64().unwrap();
    assert!((percent - 0.1).abs() < 1e-9);
}

#[tokio::test]
async fn client_sees_only_their_own_records() {
    let app = TestApp::new().await;
    let p = portfolio(&app).await;
    let own = active_contract(&app, p.my_client, p.mine, p.ty).await;
    let foreign = active_contract(&app, p.other_client, p.mine, p.ty).await;
    seed_case(&app.db, own, date(2024, 6, 1), "A-1").await;
    seed_case(&app.db, foreign, date(2024, 6, 2), "A-2").await;
    let token = app.login_as("taras@example.com", Role::Client, None).await;

    let (_, clients) = app.get("/api/v1/clients", &token).await;
    assert_eq!(ids(&clients, "clientId"), vec![p.my_client]);

    let (_, contracts) = app.get("/api/v1/contracts", &token).await;
    assert_eq!(ids(&contracts, "contractId"), vec![own]);

    let (_, cases) = app.get("/api/v1/cases", &token).await;
    assert_eq!(cases["pagination"]["total"], 1);
    assert_eq!(cases["data"][0]["contractId"], own);

    let (status, _) = app.get(&format!("/api/v1/clients/{}", p.other_client), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&format!("/api/v1/contracts/{foreign}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .get(&format!("/api/v1/clients/{}/contracts", p.other_client), &token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, body) = app
        .get(&format!("/api/v1/clients/{}/contracts", p.my_client), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "contractId"), vec![own]);
}

#[tokio::test]
async fn agent_sees_clients_and_cases_through_their_contracts() {
    let app = TestApp::new().await;
    let p = portfolio(&app).await;
    let mine = active_contract(&app, p.my_client, p.mine, p.ty).await;
    let theirs = active_contract(&app, p.other_client, p.other, p.ty).await;
    let my_case = seed_case(&app.db, mine, date(2024, 3, 1), "B-1").await;
    seed_case(&app.db, theirs, date(2024, 3, 2), "B-2").await;
    let token = app.login_as("olena@agency.test", Role::Agent, Some(p.mine)).await;

    let (_, clients) = app.get("/api/v1/clients", &token).await;
    assert_eq!(ids(&clients, "clientId"), vec![p.my_client]);
    assert_eq!(clients["pagination"]["total"], 1);

    let (_, cases) = app.get("/api/v1/cases", &token).await;
    assert_eq!(ids(&cases, "caseId"), vec![my_case]);
    assert_eq!(cases["pagination"]["total"], 1);

    let (status, _) = app.get(&format!("/api/v1/clients/{}", p.other_client), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn filtered_count_matches_the_rows_returned() {
    let app = TestApp::new().await;
    let p = portfolio(&app).await;
    let statuses = [
        ContractStatus::Active,
        ContractStatus::Draft,
        ContractStatus::Active,
        ContractStatus::Cancelled,
        ContractStatus::Active,
    ];
    for (i, status) in statuses.into_iter().enumerate() {
        let day = u32::try_from(i + 1).unwrap();
        let start = date(2024, 1, day);
        let end = date(2030, 1, 1);
        seed_contract(&app.db, p.my_client, p.mine, p.ty, status, start, end).await;
        seed_contract(&app.db, p.other_client, p.other, p.ty, status, start, end).await;
    }
    let token = app.login_as("olena@agency.test", Role::Agent, Some(p.mine)).await;

    let foreign_client = format!("clientId={}", p.other_client);
    let queries = [
        "status=Active",
        "status=Draft",
        "from=2024-01-03",
        "status=Active&from=2024-01-02",
        "activeOnly=true",
        foreign_client.as_str(),
    ];
    for q in queries {
        let (status, body) = app.get(&format!("/api/v1/contracts?limit=100&{q}"), &token).await;
        assert_eq!(status, StatusCode::OK, "{q}");
        let rows = body["data"].as_array().unwrap();
        assert_eq!(
            u64::try_from(rows.len()).unwrap(),
            body["pagination"]["total"].as_u64().unwrap(),
            "{q}"
        );
        assert!(rows.iter().all(|c| c["agentId"] == p.mine), "{q}");
    }

    let (_, active) = app.get("/api/v1/contracts?status=Active", &token).await;
    assert_eq!(active["pagination"]["total"], 3);
    let (_, foreign) = app.get(&format!("/api/v1/contracts?{foreign_client}"), &token).await;
    assert_eq!(foreign["pagination"]["total"], 0);
}

#[tokio::test]
async fn out_of_range_paging_falls_back_to_bounds() {
    let app = TestApp::new().await;
    let token = app.login_as("admin@agency.test", Role::Admin, None).await;

    let cases = [
        ("limit=0", 1, 20),
        ("limit=101", 1, 100),
        ("limit=-5", 1, 20),
        ("page=0", 1, 20),
        ("page=-1&limit=abc", 1, 20),
        ("page=3&limit=20", 3, 20),
    ];
    for (q, page, limit) in cases {
        let (status, body) = app.get(&format!("/api/v1/branches?{q}"), &token).await;
        assert_eq!(status, StatusCode::OK, "{q}");
        assert_eq!(body["pagination"]["page"], page, "{q}");
        assert_eq!(body["pagination"]["limit"], limit, "{q}");
        assert_eq!(body["pagination"]["totalPages"], 0, "{q}");
    }
}
