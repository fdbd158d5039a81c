//! End-to-end tests for the payroll run lifecycle over the HTTP API.
//!
//! This suite covers:
//! - The full run lifecycle (create → calculate → submit → approve → process)
//! - A known gross-to-net scenario with garnishment
//! - Maker-checker approval
//! - Year-to-date accumulation across runs (Social Security wage base)
//! - Gateway rejection and rollback
//! - Void with reversing entries
//! - Cancel before approval
//! - Error cases (bad JSON, unknown run, illegal transitions)

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::engine::{
    BatchDecision, DisbursementGateway, InMemoryDirectory, PayInstruction, PayrollEngine,
};
use payroll_engine::models::{
    FilingStatus, GarnishmentKind, GarnishmentOrder, PayBasis, PayFrequency, PayProfile,
    PaymentMethod, VoluntaryDeduction,
};
use payroll_engine::ruleset::{
    FicaParameters, IncomeTaxTable, Ruleset, RulesetPayload, RulesetStore, TaxBracket,
};
use uuid::Uuid;

// =============================================================================
// Test Helpers
// =============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct AcceptAllGateway;

#[async_trait::async_trait]
impl DisbursementGateway for AcceptAllGateway {
    async fn submit_batch(&self, _run_id: Uuid, _instructions: &[PayInstruction]) -> BatchDecision {
        BatchDecision::Accepted
    }
}

struct RejectAllGateway;

#[async_trait::async_trait]
impl DisbursementGateway for RejectAllGateway {
    async fn submit_batch(&self, _run_id: Uuid, _instructions: &[PayInstruction]) -> BatchDecision {
        BatchDecision::Rejected {
            reason: "batch limit exceeded".to_string(),
        }
    }
}

/// 2025-style graduated federal table for single filers, flat 6% state
/// tax for CA, and FICA parameters.
fn test_rulesets() -> Arc<RulesetStore> {
    let mut federal = BTreeMap::new();
    federal.insert(
        FilingStatus::Single,
        vec![
            TaxBracket {
                min_income: dec("0"),
                max_income: Some(dec("11000")),
                rate: dec("0.10"),
                base_tax: dec("0"),
            },
            TaxBracket {
                min_income: dec("11000"),
                max_income: Some(dec("44725")),
                rate: dec("0.12"),
                base_tax: dec("1100"),
            },
            TaxBracket {
                min_income: dec("44725"),
                max_income: None,
                rate: dec("0.22"),
                base_tax: dec("5147"),
            },
        ],
    );

    let mut state = BTreeMap::new();
    state.insert(
        FilingStatus::Single,
        vec![TaxBracket {
            min_income: dec("0"),
            max_income: None,
            rate: dec("0.06"),
            base_tax: dec("0"),
        }],
    );

    Arc::new(RulesetStore::with_rulesets(vec![
        Ruleset {
            key: "income_tax".to_string(),
            jurisdiction: "US".to_string(),
            version: 1,
            effective_start: date(2025, 1, 1),
            effective_end: None,
            payload: RulesetPayload::IncomeTax(IncomeTaxTable { brackets: federal }),
        },
        Ruleset {
            key: "income_tax".to_string(),
            jurisdiction: "CA".to_string(),
            version: 1,
            effective_start: date(2025, 1, 1),
            effective_end: None,
            payload: RulesetPayload::IncomeTax(IncomeTaxTable { brackets: state }),
        },
        Ruleset {
            key: "fica".to_string(),
            jurisdiction: "US".to_string(),
            version: 1,
            effective_start: date(2025, 1, 1),
            effective_end: None,
            payload: RulesetPayload::Fica(FicaParameters {
                social_security_rate: dec("0.062"),
                social_security_wage_base: dec("176100"),
                medicare_rate: dec("0.0145"),
                additional_medicare_rate: dec("0.009"),
                additional_medicare_threshold: dec("200000"),
            }),
        },
    ]))
}

fn salaried_profile(employee_id: &str, annual: &str) -> PayProfile {
    PayProfile {
        employee_id: employee_id.to_string(),
        company_id: "co_001".to_string(),
        pay_basis: PayBasis::Salaried {
            annual_salary: dec(annual),
        },
        pay_frequency: PayFrequency::Biweekly,
        bonus: None,
        filing_status: FilingStatus::Single,
        work_state: "CA".to_string(),
        locality: None,
        payment_method: PaymentMethod::DirectDeposit,
        deductions: vec![],
        garnishments: vec![],
    }
}

fn garnished_profile() -> PayProfile {
    let mut profile = salaried_profile("emp_garnished", "130000");
    profile.garnishments = vec![GarnishmentOrder {
        case_ref: "CS-2024-0042".to_string(),
        kind: GarnishmentKind::ChildSupport,
        amount_per_period: dec("800.00"),
        in_arrears: false,
        received: date(2024, 3, 1),
    }];
    profile
}

fn router_with(profiles: Vec<PayProfile>, gateway: Arc<dyn DisbursementGateway>) -> Router {
    let engine = PayrollEngine::new(
        test_rulesets(),
        Arc::new(InMemoryDirectory::new(profiles)),
        gateway,
    );
    create_router(AppState::new(engine))
}

fn create_run_body(start: &str, end: &str, pay_date: &str) -> Value {
    json!({
        "company_id": "co_001",
        "period": { "start": start, "end": end, "pay_date": pay_date },
        "payroll_type": "regular",
        "created_by": "maker"
    })
}

async fn request(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    let request = match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(router, "POST", uri, Some(body)).await
}

async fn post_empty(router: &Router, uri: &str) -> (StatusCode, Value) {
    request(router, "POST", uri, None).await
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    request(router, "GET", uri, None).await
}

/// Drives a freshly created run to `approved` and returns its id.
async fn approved_run(router: &Router) -> String {
    let (status, run) = post(
        router,
        "/runs",
        create_run_body("2025-06-01", "2025-06-14", "2025-06-20"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let run_id = run["id"].as_str().unwrap().to_string();

    let (status, _) = post_empty(router, &format!("/runs/{}/calculate", run_id)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_empty(router, &format!("/runs/{}/submit", run_id)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(
        router,
        &format!("/runs/{}/approve", run_id),
        json!({ "approver_id": "checker" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    run_id
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_full_lifecycle_over_http() {
    let router = router_with(
        vec![salaried_profile("emp_001", "130000")],
        Arc::new(AcceptAllGateway),
    );

    let (status, run) = post(
        &router,
        "/runs",
        create_run_body("2025-06-01", "2025-06-14", "2025-06-20"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(run["status"], "draft");
    assert_eq!(run["version"], 0);
    let run_id = run["id"].as_str().unwrap().to_string();

    let (status, run) = post_empty(&router, &format!("/runs/{}/calculate", run_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "calculated");
    assert_eq!(run["totals"]["gross"], "5000.00");

    let (status, run) = post_empty(&router, &format!("/runs/{}/submit", run_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "pending_approval");

    let (status, run) = post(
        &router,
        &format!("/runs/{}/approve", run_id),
        json!({ "approver_id": "checker" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "approved");
    assert_eq!(run["approved_by"], "checker");

    let (status, run) = post_empty(&router, &format!("/runs/{}/process", run_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "completed");
    assert!(run["processed_at"].is_string());

    let (status, checks) = get(&router, &format!("/runs/{}/paychecks", run_id)).await;
    assert_eq!(status, StatusCode::OK);
    let checks = checks.as_array().unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0]["payment_status"], "paid");
}

#[tokio::test]
async fn test_gross_to_net_scenario_with_child_support() {
    // 130k salary, biweekly: gross 5000.00. Federal on annualized 130k is
    // 23907.50 / 26 = 919.52; CA 6% flat = 300.00; SS 310.00; Medicare
    // 72.50. Disposable income 3397.98 easily covers the 800.00 support
    // order, leaving net 2597.98.
    let router = router_with(vec![garnished_profile()], Arc::new(AcceptAllGateway));
    let run_id = approved_run(&router).await;

    let (status, checks) = get(&router, &format!("/runs/{}/paychecks", run_id)).await;
    assert_eq!(status, StatusCode::OK);
    let check = &checks.as_array().unwrap()[0];

    assert_eq!(check["gross_pay"], "5000.00");
    assert_eq!(check["taxes"]["federal_income"], "919.52");
    assert_eq!(check["taxes"]["state_income"], "300.00");
    assert_eq!(check["taxes"]["social_security"], "310.00");
    assert_eq!(check["taxes"]["medicare"], "72.50");
    assert_eq!(check["garnishments"][0]["case_ref"], "CS-2024-0042");
    assert_eq!(check["garnishments"][0]["amount"], "800.00");
    assert_eq!(check["net_pay"], "2597.98");
}

#[tokio::test]
async fn test_ytd_social_security_wage_base_caps_second_run() {
    // 4M annual, biweekly: gross 153846.15 per period. The first run taxes
    // the full amount; the second crosses the 176100 wage base, so only
    // 176100 - 153846.15 = 22253.85 is taxable (SS 1379.74).
    let router = router_with(
        vec![salaried_profile("emp_exec", "4000000")],
        Arc::new(AcceptAllGateway),
    );

    let first = approved_run(&router).await;
    let (status, _) = post_empty(&router, &format!("/runs/{}/process", first)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, checks) = get(&router, &format!("/runs/{}/paychecks", first)).await;
    assert_eq!(checks[0]["taxes"]["social_security"], "9538.46");

    let (_, run) = post(
        &router,
        "/runs",
        create_run_body("2025-06-15", "2025-06-28", "2025-07-04"),
    )
    .await;
    let second = run["id"].as_str().unwrap().to_string();
    let (status, _) = post_empty(&router, &format!("/runs/{}/calculate", second)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, checks) = get(&router, &format!("/runs/{}/paychecks", second)).await;
    assert_eq!(checks[0]["taxes"]["social_security"], "1379.74");
    assert_eq!(checks[0]["wage_bases"]["social_security"], "22253.85");
}

#[tokio::test]
async fn test_run_totals_balance_paychecks() {
    let router = router_with(
        vec![
            garnished_profile(),
            salaried_profile("emp_002", "91000"),
            salaried_profile("emp_003", "65000"),
        ],
        Arc::new(AcceptAllGateway),
    );
    let run_id = approved_run(&router).await;

    let (_, run) = get(&router, &format!("/runs/{}", run_id)).await;
    let (_, checks) = get(&router, &format!("/runs/{}/paychecks", run_id)).await;

    let sum = |field: &str| -> Decimal {
        checks
            .as_array()
            .unwrap()
            .iter()
            .map(|c| dec(c[field].as_str().unwrap()))
            .sum()
    };
    assert_eq!(dec(run["totals"]["gross"].as_str().unwrap()), sum("gross_pay"));
    assert_eq!(dec(run["totals"]["net"].as_str().unwrap()), sum("net_pay"));
}

// =============================================================================
// Maker-checker
// =============================================================================

#[tokio::test]
async fn test_self_approval_is_rejected() {
    let router = router_with(
        vec![salaried_profile("emp_001", "130000")],
        Arc::new(AcceptAllGateway),
    );

    let (_, run) = post(
        &router,
        "/runs",
        create_run_body("2025-06-01", "2025-06-14", "2025-06-20"),
    )
    .await;
    let run_id = run["id"].as_str().unwrap().to_string();
    post_empty(&router, &format!("/runs/{}/calculate", run_id)).await;
    post_empty(&router, &format!("/runs/{}/submit", run_id)).await;

    let (status, error) = post(
        &router,
        &format!("/runs/{}/approve", run_id),
        json!({ "approver_id": "maker" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "SELF_APPROVAL");

    // The run is still approvable by someone else.
    let (status, run) = post(
        &router,
        &format!("/runs/{}/approve", run_id),
        json!({ "approver_id": "checker" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "approved");
}

// =============================================================================
// Gateway failure and rollback
// =============================================================================

#[tokio::test]
async fn test_gateway_rejection_fails_run_over_http() {
    let router = router_with(
        vec![salaried_profile("emp_001", "130000")],
        Arc::new(RejectAllGateway),
    );
    let run_id = approved_run(&router).await;

    let (status, error) = post_empty(&router, &format!("/runs/{}/process", run_id)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error["code"], "GATEWAY_REJECTED");
    assert!(error["message"].as_str().unwrap().contains("batch limit exceeded"));

    let (_, run) = get(&router, &format!("/runs/{}", run_id)).await;
    assert_eq!(run["status"], "failed");

    // Paychecks were never marked paid.
    let (_, checks) = get(&router, &format!("/runs/{}/paychecks", run_id)).await;
    assert_eq!(checks[0]["payment_status"], "pending");
}

// =============================================================================
// Void and cancel
// =============================================================================

#[tokio::test]
async fn test_void_appends_reversing_paychecks() {
    let router = router_with(
        vec![salaried_profile("emp_001", "130000")],
        Arc::new(AcceptAllGateway),
    );
    let run_id = approved_run(&router).await;
    post_empty(&router, &format!("/runs/{}/process", run_id)).await;

    let (status, run) = post(
        &router,
        &format!("/runs/{}/void", run_id),
        json!({ "reason": "wrong pay period", "actor": "checker" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "voided");
    assert_eq!(run["void_reason"], "wrong pay period");

    let (_, checks) = get(&router, &format!("/runs/{}/paychecks", run_id)).await;
    let checks = checks.as_array().unwrap();
    assert_eq!(checks.len(), 2);

    let original = checks.iter().find(|c| c["reverses"].is_null()).unwrap();
    let reversal = checks.iter().find(|c| !c["reverses"].is_null()).unwrap();
    assert_eq!(reversal["reverses"], original["id"]);
    assert_eq!(
        dec(reversal["net_pay"].as_str().unwrap()),
        -dec(original["net_pay"].as_str().unwrap())
    );
    // The original record is untouched.
    assert_eq!(original["payment_status"], "paid");
}

#[tokio::test]
async fn test_void_before_completion_is_rejected() {
    let router = router_with(
        vec![salaried_profile("emp_001", "130000")],
        Arc::new(AcceptAllGateway),
    );
    let run_id = approved_run(&router).await;

    let (status, error) = post(
        &router,
        &format!("/runs/{}/void", run_id),
        json!({ "reason": "too soon", "actor": "checker" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_cancel_discards_staged_paychecks() {
    let router = router_with(
        vec![salaried_profile("emp_001", "130000")],
        Arc::new(AcceptAllGateway),
    );

    let (_, run) = post(
        &router,
        "/runs",
        create_run_body("2025-06-01", "2025-06-14", "2025-06-20"),
    )
    .await;
    let run_id = run["id"].as_str().unwrap().to_string();
    post_empty(&router, &format!("/runs/{}/calculate", run_id)).await;

    let (status, run) = post(
        &router,
        &format!("/runs/{}/cancel", run_id),
        json!({ "actor": "maker" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "cancelled");

    let (_, checks) = get(&router, &format!("/runs/{}/paychecks", run_id)).await;
    assert!(checks.as_array().unwrap().is_empty());
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_unknown_run_returns_404() {
    let router = router_with(vec![], Arc::new(AcceptAllGateway));
    let (status, error) = get(&router, &format!("/runs/{}", Uuid::nil())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "RUN_NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let router = router_with(vec![], Arc::new(AcceptAllGateway));
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/runs")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_field_returns_validation_error() {
    let router = router_with(vec![], Arc::new(AcceptAllGateway));
    let (status, error) = post(
        &router,
        "/runs",
        json!({
            "company_id": "co_001",
            "created_by": "maker"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error["message"].as_str().unwrap().contains("period"));
}

#[tokio::test]
async fn test_invalid_period_returns_400() {
    let router = router_with(vec![], Arc::new(AcceptAllGateway));
    let (status, error) = post(
        &router,
        "/runs",
        create_run_body("2025-06-14", "2025-06-01", "2025-06-20"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_process_before_approval_returns_409() {
    let router = router_with(
        vec![salaried_profile("emp_001", "130000")],
        Arc::new(AcceptAllGateway),
    );
    let (_, run) = post(
        &router,
        "/runs",
        create_run_body("2025-06-01", "2025-06-14", "2025-06-20"),
    )
    .await;
    let run_id = run["id"].as_str().unwrap().to_string();

    let (status, error) = post_empty(&router, &format!("/runs/{}/process", run_id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_missing_state_ruleset_blocks_calculation() {
    let mut profile = salaried_profile("emp_001", "130000");
    profile.work_state = "NV".to_string();
    let router = router_with(vec![profile], Arc::new(AcceptAllGateway));

    let (_, run) = post(
        &router,
        "/runs",
        create_run_body("2025-06-01", "2025-06-14", "2025-06-20"),
    )
    .await;
    let run_id = run["id"].as_str().unwrap().to_string();

    let (status, error) = post_empty(&router, &format!("/runs/{}/calculate", run_id)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "RULESET_UNAVAILABLE");

    // The run is untouched and can be retried once a ruleset is published.
    let (_, run) = get(&router, &format!("/runs/{}", run_id)).await;
    assert_eq!(run["status"], "draft");
}

// =============================================================================
// Deductions
// =============================================================================

#[tokio::test]
async fn test_deductions_reduced_with_warning_when_income_short() {
    // 26000 annual, biweekly: gross 1000.00. Taxes take roughly a quarter,
    // so a 900.00 401k election cannot be honored in full.
    let mut profile = salaried_profile("emp_001", "26000");
    profile.deductions = vec![VoluntaryDeduction {
        code: "401K".to_string(),
        description: "Retirement".to_string(),
        amount: dec("900.00"),
    }];
    let router = router_with(vec![profile], Arc::new(AcceptAllGateway));
    let run_id = approved_run(&router).await;

    let (_, checks) = get(&router, &format!("/runs/{}/paychecks", run_id)).await;
    let check = &checks.as_array().unwrap()[0];

    let requested = dec("900.00");
    let taken = dec(check["deductions"][0]["amount"].as_str().unwrap());
    assert!(taken < requested);
    assert_eq!(check["net_pay"], "0.00");
    assert_eq!(check["warnings"][0]["code"], "DEDUCTIONS_REDUCED");
}
