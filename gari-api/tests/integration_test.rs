use axum::body::Body;
use axum::extract::connect_info::ConnectInfo;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use gari_api::{
    app,
    state::{AppState, AuthConfig},
    worker,
};
use gari_catalog::{Car, InMemoryCarRepository};
use gari_order::{FinancialManager, MockGatewayAdapter, PaymentOrchestrator};
use gari_store::app_config::BusinessRules;
use gari_store::InMemoryBookingRepository;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::util::ServiceExt;

fn business_rules() -> BusinessRules {
    BusinessRules {
        commission_rate: 0.15,
        vat_rate: 0.16,
        insurance_per_day: 1500.0,
        cross_country_per_day: 5000.0,
        min_rental_days: 3,
        min_driver_age: 25,
        full_refund_hours: 48,
        half_refund_hours: 24,
        checkout_hold_seconds: 900,
        starting_wallet_balance: 50_000.0,
    }
}

struct TestHarness {
    app: Router,
    state: AppState,
}

async fn harness() -> TestHarness {
    // Redis and Kafka clients construct lazily; nothing in these tests
    // requires live servers (rate limiting fails open, publishes are
    // fire-and-forget at the call sites)
    let redis = gari_store::RedisClient::new("redis://127.0.0.1:1/")
        .await
        .expect("lazy redis client");
    let kafka = gari_store::EventProducer::new("localhost:1").expect("lazy kafka producer");

    let state = AppState {
        booking_repo: Arc::new(InMemoryBookingRepository::new()),
        car_repo: Arc::new(InMemoryCarRepository::seeded()),
        redis: Arc::new(redis),
        kafka: Arc::new(kafka),
        payments: Arc::new(PaymentOrchestrator::new(
            Arc::new(MockGatewayAdapter::new()),
            50_000.0,
        )),
        finance: Arc::new(RwLock::new(FinancialManager::new())),
        profiles: Arc::new(RwLock::new(std::collections::HashMap::new())),
        auth: AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        },
        business_rules: business_rules(),
    };

    TestHarness {
        app: app(state.clone()),
        state,
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let mut req = builder.body(body).unwrap();
    // The rate-limit middleware reads the peer address; oneshot requests
    // don't go through a listener, so inject it
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 47000))));
    req
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn guest_token(app: &Router) -> String {
    let (status, body) = send(app, request(Method::POST, "/v1/auth/guest", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn fleet(app: &Router) -> Vec<Car> {
    let (status, body) = send(app, request(Method::GET, "/v1/cars", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body["cars"].clone()).unwrap()
}

fn quote_body(car: &Car, days: i64, dob: Option<&str>) -> Value {
    let pickup = Utc::now() + Duration::days(7);
    let dropoff = pickup + Duration::days(days);
    json!({
        "car_id": car.id,
        "pickup_at": pickup,
        "dropoff_at": dropoff,
        "with_insurance": true,
        "cross_country": false,
        "pay_on_site": true,
        "date_of_birth": dob,
    })
}

const ADULT_DOB: &str = "1990-03-12";

#[tokio::test]
async fn test_quote_breakdown_and_split() {
    let h = harness().await;
    let cars = fleet(&h.app).await;
    let axio = &cars[0]; // 3500/day

    let (status, body) = send(
        &h.app,
        request(Method::POST, "/v1/quotes", None, Some(quote_body(axio, 4, Some(ADULT_DOB)))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let breakdown = &body["breakdown"];
    assert_eq!(breakdown["days"], 4);
    assert_eq!(breakdown["base"], 14000.0);
    assert_eq!(breakdown["insurance"], 6000.0);
    assert_eq!(breakdown["total"], 20000.0);

    // VAT is included: subtotal + vat reconstructs the total
    let subtotal = breakdown["subtotal"].as_f64().unwrap();
    let vat = breakdown["vat_amount"].as_f64().unwrap();
    assert!((subtotal + vat - 20000.0).abs() < 1e-9);

    // 15% / 85% split, exact
    assert_eq!(body["payment_plan"]["plan"], "PAY_ON_SITE");
    assert_eq!(body["payment_plan"]["booking_fee"], 3000.0);
    assert_eq!(body["payment_plan"]["balance_on_site"], 17000.0);
}

#[tokio::test]
async fn test_quote_gating_rules() {
    let h = harness().await;
    let cars = fleet(&h.app).await;
    let car = &cars[0];

    // Below the 3-day minimum
    let (status, _) = send(
        &h.app,
        request(Method::POST, "/v1/quotes", None, Some(quote_body(car, 2, Some(ADULT_DOB)))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Underage driver: hard block
    let underage = (Utc::now() - Duration::days(20 * 365)).date_naive().to_string();
    let (status, _) = send(
        &h.app,
        request(Method::POST, "/v1/quotes", None, Some(quote_body(car, 4, Some(&underage)))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing date of birth: a distinct profile-incomplete outcome
    let (status, body) = send(
        &h.app,
        request(Method::POST, "/v1/quotes", None, Some(quote_body(car, 4, None))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("date of birth"));

    // Inverted range clamps to zero days and is blocked
    let pickup = Utc::now() + Duration::days(7);
    let (status, _) = send(
        &h.app,
        request(
            Method::POST,
            "/v1/quotes",
            None,
            Some(json!({
                "car_id": car.id,
                "pickup_at": pickup,
                "dropoff_at": pickup - Duration::days(1),
                "date_of_birth": ADULT_DOB,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn booking_body(car: &Car, pickup_offset_days: i64, days: i64) -> Value {
    let pickup = Utc::now() + Duration::days(pickup_offset_days);
    let dropoff = pickup + Duration::days(days);
    json!({
        "car_id": car.id,
        "pickup_at": pickup,
        "dropoff_at": dropoff,
        "pickup_location": "Nairobi CBD",
        "dropoff_location": "Nairobi CBD",
        "with_insurance": false,
        "cross_country": false,
        "pay_on_site": true,
        "payment_method": "WALLET",
        "date_of_birth": ADULT_DOB,
    })
}

#[tokio::test]
async fn test_stored_profile_backs_up_missing_dob() {
    let h = harness().await;
    let token = guest_token(&h.app).await;
    let cars = fleet(&h.app).await;

    // No request DOB and no profile: profile-incomplete
    let mut body = booking_body(&cars[0], 7, 3);
    body["date_of_birth"] = Value::Null;
    let (status, _) = send(
        &h.app,
        request(Method::POST, "/v1/bookings", Some(&token), Some(body.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Complete the profile, masked contact data included
    let (status, profile) = send(
        &h.app,
        request(
            Method::PUT,
            "/v1/profile",
            Some(&token),
            Some(json!({
                "full_name": "Asha Mwangi",
                "phone": "+254712345678",
                "date_of_birth": ADULT_DOB,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["date_of_birth"], ADULT_DOB);

    // The stored date of birth now satisfies age gating
    let (status, _) = send(
        &h.app,
        request(Method::POST, "/v1/bookings", Some(&token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_booking_requires_auth() {
    let h = harness().await;
    let cars = fleet(&h.app).await;

    let (status, _) = send(
        &h.app,
        request(Method::POST, "/v1/bookings", None, Some(booking_body(&cars[0], 7, 3))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_booking_flow_with_wallet_payment() {
    let h = harness().await;
    let token = guest_token(&h.app).await;
    let cars = fleet(&h.app).await;
    let car = &cars[0]; // 3500/day

    // 1. Create: 3 days at 3500 = 10500 total, 1575 fee
    let (status, booking) = send(
        &h.app,
        request(Method::POST, "/v1/bookings", Some(&token), Some(booking_body(car, 7, 3))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "PENDING");
    assert_eq!(booking["total_price"], 10500.0);
    assert_eq!(booking["booking_fee"], 1575.0);
    assert_eq!(booking["balance_on_site"], 8925.0);
    assert!(booking["reference"].as_str().unwrap().starts_with("GR-"));
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // 2. Overlapping dates on the same car are rejected
    let (status, _) = send(
        &h.app,
        request(Method::POST, "/v1/bookings", Some(&token), Some(booking_body(car, 8, 3))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 3. Pay the booking fee from the wallet: PENDING -> ACTIVE
    let (status, paid) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/pay", booking_id),
            Some(&token),
            Some(json!({"payment_method": "WALLET"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "ACTIVE");

    // Wallet went down by exactly the booking fee
    let (status, wallet) = send(
        &h.app,
        request(Method::GET, "/v1/wallet", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wallet["balance"], 50_000.0 - 1575.0);

    // 4. Paying twice conflicts
    let (status, _) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/pay", booking_id),
            Some(&token),
            Some(json!({"payment_method": "WALLET"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 5. Countdown is live for the active rental
    let (status, countdown) = send(
        &h.app,
        request(
            Method::GET,
            &format!("/v1/bookings/{}/countdown", booking_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(countdown["remaining"]["days"].as_i64().unwrap() >= 9);
}

#[tokio::test]
async fn test_insufficient_wallet_balance() {
    let h = harness().await;
    let token = guest_token(&h.app).await;
    let cars = fleet(&h.app).await;
    let defender = cars.iter().find(|c| c.name == "Land Rover Defender").unwrap();

    // 10 days at 15000, prepaid in full: 150000 > the 50000 wallet
    let mut body = booking_body(defender, 7, 10);
    body["pay_on_site"] = json!(false);
    let (status, booking) = send(
        &h.app,
        request(Method::POST, "/v1/bookings", Some(&token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, err) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/pay", booking["id"].as_str().unwrap()),
            Some(&token),
            Some(json!({"payment_method": "WALLET"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(err["error"].as_str().unwrap().contains("Insufficient"));
}

#[tokio::test]
async fn test_gateway_failure_is_retryable() {
    let h = harness().await;
    let token = guest_token(&h.app).await;
    let cars = fleet(&h.app).await;

    let (_, booking) = send(
        &h.app,
        request(Method::POST, "/v1/bookings", Some(&token), Some(booking_body(&cars[1], 7, 3))),
    )
    .await;
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // The designated failure reference simulates a provider outage
    let (status, _) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/pay", booking_id),
            Some(&token),
            Some(json!({"payment_method": "MPESA", "payment_reference": "fail-gateway"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    // The booking is still Pending: the renter can retry
    let (status, paid) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/pay", booking_id),
            Some(&token),
            Some(json!({"payment_method": "MPESA"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "ACTIVE");
}

#[tokio::test]
async fn test_cancellation_refund_tiers() {
    let h = harness().await;
    let token = guest_token(&h.app).await;
    let cars = fleet(&h.app).await;

    // Pickup 7 days out: > 48h, full booking-fee refund
    let (_, booking) = send(
        &h.app,
        request(Method::POST, "/v1/bookings", Some(&token), Some(booking_body(&cars[0], 7, 3))),
    )
    .await;
    let (status, cancelled) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/cancel", booking["id"].as_str().unwrap()),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");
    assert_eq!(cancelled["refund"]["percent"], 100);
    assert_eq!(cancelled["refund"]["amount"], 1575.0);

    // Pickup ~30h out: 50% tier
    let (_, booking) = send(
        &h.app,
        request(
            Method::POST,
            "/v1/bookings",
            Some(&token),
            Some({
                let pickup = Utc::now() + Duration::hours(30);
                json!({
                    "car_id": cars[1].id,
                    "pickup_at": pickup,
                    "dropoff_at": pickup + Duration::days(3),
                    "pickup_location": "Westlands",
                    "dropoff_location": "Westlands",
                    "pay_on_site": true,
                    "payment_method": "CARD",
                    "date_of_birth": ADULT_DOB,
                })
            }),
        ),
    )
    .await;
    let (status, cancelled) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/cancel", booking["id"].as_str().unwrap()),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["refund"]["percent"], 50);

    // Cancelling twice conflicts
    let (status, _) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/cancel", booking["id"].as_str().unwrap()),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancelled_dates_free_up() {
    let h = harness().await;
    let token = guest_token(&h.app).await;
    let cars = fleet(&h.app).await;
    let car = &cars[3];

    let (_, booking) = send(
        &h.app,
        request(Method::POST, "/v1/bookings", Some(&token), Some(booking_body(car, 7, 3))),
    )
    .await;

    let pickup_date = (Utc::now() + Duration::days(8)).date_naive();
    let dropoff_date = (Utc::now() + Duration::days(10)).date_naive();
    let availability_uri = format!(
        "/v1/cars/{}/availability?pickup_date={}&dropoff_date={}",
        car.id, pickup_date, dropoff_date
    );

    let (status, availability) =
        send(&h.app, request(Method::GET, &availability_uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(availability["available"], false);

    send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/cancel", booking["id"].as_str().unwrap()),
            Some(&token),
            None,
        ),
    )
    .await;

    let (_, availability) =
        send(&h.app, request(Method::GET, &availability_uri, None, None)).await;
    assert_eq!(availability["available"], true);
}

#[tokio::test]
async fn test_lifecycle_sweep_credits_owner_and_withdrawal() {
    let h = harness().await;
    let token = guest_token(&h.app).await;
    let cars = fleet(&h.app).await;
    let car = &cars[2]; // Subaru Forester, 6500/day
    let owner_id = car.owner.id.clone();

    // A rental that is already over: pickup 5 days ago, dropoff an hour ago
    let pickup = Utc::now() - Duration::days(5);
    let dropoff = Utc::now() - Duration::hours(1);
    let (status, booking) = send(
        &h.app,
        request(
            Method::POST,
            "/v1/bookings",
            Some(&token),
            Some(json!({
                "car_id": car.id,
                "pickup_at": pickup,
                "dropoff_at": dropoff,
                "pickup_location": "Karen",
                "dropoff_location": "Karen",
                "pay_on_site": true,
                "payment_method": "WALLET",
                "date_of_birth": ADULT_DOB,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let booking_id = booking["id"].as_str().unwrap().to_string();

    send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/bookings/{}/pay", booking_id),
            Some(&token),
            Some(json!({"payment_method": "WALLET"})),
        ),
    )
    .await;

    // One worker sweep completes the overdue rental
    let completed = worker::complete_overdue_rentals(
        &h.state.booking_repo,
        &h.state.finance,
        &h.state.kafka,
    )
    .await
    .unwrap();
    assert_eq!(completed, 1);

    let (_, booking) = send(
        &h.app,
        request(
            Method::GET,
            &format!("/v1/bookings/{}", booking_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(booking["status"], "COMPLETED");

    // 5 days x 6500 = 32500 total; owner keeps 85%
    let (status, balance) = send(
        &h.app,
        request(Method::GET, &format!("/v1/owners/{}/balance", owner_id), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let available = balance["available_balance"].as_f64().unwrap();
    assert!((available - 32_500.0 * 0.85).abs() < 1e-6);

    // Withdraw part of it
    let (status, withdrawal) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/owners/{}/withdrawals", owner_id),
            None,
            Some(json!({"amount": 10_000.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!((withdrawal["remaining_balance"].as_f64().unwrap() - (available - 10_000.0)).abs() < 1e-6);

    // Overdrawing is a validation failure
    let (status, err) = send(
        &h.app,
        request(
            Method::POST,
            &format!("/v1/owners/{}/withdrawals", owner_id),
            None,
            Some(json!({"amount": 1_000_000.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("Insufficient"));

    // Unknown owners have nothing to withdraw
    let (status, _) = send(
        &h.app,
        request(
            Method::POST,
            "/v1/owners/owner-ghost/withdrawals",
            None,
            Some(json!({"amount": 100.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
