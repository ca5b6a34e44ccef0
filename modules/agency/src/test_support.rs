#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! In-memory application and seeding helpers for tests.

use std::sync::Arc;

use agency_db::{Db, DbConfig, connect_db};
use agency_security::Role;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use sea_orm::{EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::TokenService;
use crate::auth::password::hash_password;
use crate::domain::models::ContractStatus;
use crate::domain::service::AppServices;
use crate::infra::storage::entity::{
    agent, branch, client, contract, insurance_case, insurance_type, user,
};
use crate::infra::storage::migrations::Migrator;
use crate::{AppConfig, build_router, build_services};

pub const TEST_JWT_SECRET: &str = "agency-test-secret-0123456789abcdef";
pub const TEST_PASSWORD: &str = "secret123";

/// Defaults with an in-memory database and a valid signing secret.
pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database = DbConfig::in_memory();
    cfg.auth.jwt_secret = SecretString::from(TEST_JWT_SECRET);
    cfg
}

/// Create a migrated in-memory database.
pub async fn inmem_db() -> Db {
    let db = connect_db(&DbConfig::in_memory())
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(db.conn(), None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Services and router over one in-memory database.
pub struct TestApp {
    pub db: Db,
    pub services: Arc<AppServices>,
    pub router: Router,
    tokens: TokenService,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = test_config();
        let db = inmem_db().await;
        let services = build_services(db.clone(), &cfg).unwrap();
        let router = build_router(Arc::clone(&services), &cfg);
        let tokens = TokenService::new(&cfg.auth).unwrap();
        Self {
            db,
            services,
            router,
            tokens,
        }
    }

    pub fn token(&self, user_id: i64) -> String {
        self.tokens.issue(user_id).unwrap()
    }

    /// Seeds a user with [`TEST_PASSWORD`] and returns a bearer token for it.
    pub async fn login_as(&self, email: &str, role: Role, agent_id: Option<i64>) -> String {
        let id = seed_user(&self.db, email, role, agent_id).await;
        self.token(id)
    }

    /// Sends one request; the body is parsed as JSON, `Null` when empty.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn seed_branch(db: &Db, name: &str) -> i64 {
    let row = branch::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    };
    branch::Entity::insert(row)
        .exec(db.conn())
        .await
        .expect("Failed to seed branch")
        .last_insert_id
}

pub async fn seed_agent(db: &Db, full_name: &str, branch_id: Option<i64>) -> i64 {
    let row = agent::ActiveModel {
        full_name: Set(full_name.to_owned()),
        phone: Set(None),
        email: Set(None),
        hire_date: Set(date(2020, 1, 15)),
        branch_id: Set(branch_id),
        ..Default::default()
    };
    agent::Entity::insert(row)
        .exec(db.conn())
        .await
        .expect("Failed to seed agent")
        .last_insert_id
}

pub async fn seed_client(db: &Db, last_name: &str, first_name: &str, email: Option<&str>) -> i64 {
    let row = client::ActiveModel {
        last_name: Set(last_name.to_owned()),
        first_name: Set(first_name.to_owned()),
        middle_name: Set(None),
        address: Set(None),
        phone: Set(Some("+380 44 000 0000".to_owned())),
        email: Set(email.map(str::to_owned)),
        ..Default::default()
    };
    client::Entity::insert(row)
        .exec(db.conn())
        .await
        .expect("Failed to seed client")
        .last_insert_id
}

pub async fn seed_insurance_type(
    db: &Db,
    name: &str,
    base_rate: f64,
    payout_coeff: f64,
    agent_percent_default: f64,
) -> i64 {
    let row = insurance_type::ActiveModel {
        name: Set(name.to_owned()),
        description: Set(None),
        base_rate: Set(base_rate),
        payout_coeff: Set(payout_coeff),
        agent_percent_default: Set(agent_percent_default),
        ..Default::default()
    };
    insurance_type::Entity::insert(row)
        .exec(db.conn())
        .await
        .expect("Failed to seed insurance type")
        .last_insert_id
}

/// A 10 000 contract running from `start` to `end`.
pub async fn seed_contract(
    db: &Db,
    client_id: i64,
    agent_id: i64,
    insurance_type_id: i64,
    status: ContractStatus,
    start: NaiveDate,
    end: NaiveDate,
) -> i64 {
    let row = contract::ActiveModel {
        client_id: Set(client_id),
        agent_id: Set(agent_id),
        insurance_type_id: Set(insurance_type_id),
        start_date: Set(start),
        end_date: Set(end),
        insurance_amount: Set(10_000.0),
        contribution_amount: Set(100.0),
        agent_percent: Set(0.1),
        status: Set(status),
        ..Default::default()
    };
    contract::Entity::insert(row)
        .exec(db.conn())
        .await
        .expect("Failed to seed contract")
        .last_insert_id
}

pub async fn seed_case(db: &Db, contract_id: i64, case_date: NaiveDate, act_number: &str) -> i64 {
    let row = insurance_case::ActiveModel {
        contract_id: Set(contract_id),
        case_date: Set(case_date),
        act_number: Set(act_number.to_owned()),
        damage_level: Set(0.5),
        accrued_payment: Set(None),
        accrued_date: Set(None),
        payment_date: Set(None),
        ..Default::default()
    };
    insurance_case::Entity::insert(row)
        .exec(db.conn())
        .await
        .expect("Failed to seed insurance case")
        .last_insert_id
}

/// A login with [`TEST_PASSWORD`].
pub async fn seed_user(db: &Db, email: &str, role: Role, agent_id: Option<i64>) -> i64 {
    let row = user::ActiveModel {
        email: Set(email.to_owned()),
        password_hash: Set(hash_password(TEST_PASSWORD).unwrap()),
        role: Set(role.as_str().to_owned()),
        agent_id: Set(agent_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    user::Entity::insert(row)
        .exec(db.conn())
        .await
        .expect("Failed to seed user")
        .last_insert_id
}
