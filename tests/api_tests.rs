use oracle_arena::battle::{ActionReport, MatchPhase, MatchState, Side};
use oracle_arena::config::ArenaConfig;
use oracle_arena::wallet::AccountView;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};

fn test_config() -> ArenaConfig {
    ArenaConfig {
        autopilot: false,
        seed: Some(7),
        static_dir: "target/no-static-dir".into(),
        ..ArenaConfig::default()
    }
}

fn client_with(config: ArenaConfig) -> Client {
    Client::tracked(oracle_arena::rocket_with_config(config)).expect("valid rocket instance")
}

fn client() -> Client {
    client_with(test_config())
}

fn post_json<'c>(
    client: &'c Client,
    path: &'static str,
    body: Value,
) -> rocket::local::blocking::LocalResponse<'c> {
    client
        .post(path)
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
}

fn message(response: rocket::local::blocking::LocalResponse<'_>) -> String {
    let body: Value = response.into_json().expect("json body");
    body["message"].as_str().unwrap_or_default().to_string()
}

#[test]
fn health_reports_environment_and_headers() {
    let client = client();
    let response = client.get("/api/health").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Strict-Transport-Security"),
        Some("max-age=31536000; includeSubDomains; preload")
    );
    assert!(response
        .headers()
        .get_one("Content-Security-Policy")
        .unwrap_or_default()
        .contains("frame-src 'none'"));
    assert_eq!(response.headers().get_one("RateLimit-Limit"), Some("100"));

    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn api_routes_are_rate_limited() {
    let client = client_with(ArenaConfig {
        rate_limit_max: 2,
        ..test_config()
    });
    assert_eq!(client.get("/api/health").dispatch().status(), Status::Ok);
    assert_eq!(client.get("/api/health").dispatch().status(), Status::Ok);

    let blocked = client.get("/api/health").dispatch();
    assert_eq!(blocked.status(), Status::TooManyRequests);
    assert_eq!(
        message(blocked),
        "Too many requests from this IP, please try again later."
    );

    // non-api routes are not counted
    assert_eq!(client.get("/battle").dispatch().status(), Status::Ok);
}

#[test]
fn price_proxy_without_key_fails() {
    let client = client();
    let response = client.get("/api/oracle/price/ETHUSD").dispatch();
    assert_eq!(response.status(), Status::InternalServerError);
    assert_eq!(message(response), "Oracle API key not configured");
}

#[test]
fn prices_start_from_initial_board() {
    let client = client();
    let response = client.get("/oracle/prices").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().expect("json body");
    assert_eq!(body["board"]["eth_usd"]["price"], 3245.67);
    assert_eq!(body["board"]["source"], "Initial");
    assert!(body["multipliers"]["attack_bonus_percent"].as_f64().unwrap_or_default() > 0.0);
}

#[test]
fn wallet_connect_and_disconnect() {
    let client = client();
    let view: AccountView = client.get("/wallet").dispatch().into_json().expect("view");
    assert!(!view.connected);

    let view: AccountView = client.post("/wallet/connect").dispatch().into_json().expect("view");
    assert!(view.connected);
    assert_eq!(view.supra_balance, 147.25);
    assert_eq!(view.eth_balance, 2.34);

    let view: AccountView = client.post("/wallet/disconnect").dispatch().into_json().expect("view");
    assert!(!view.connected);
}

#[test]
fn battle_flow_over_http() {
    let client = client();

    let response = post_json(&client, "/battle/join", json!({"stake": 0.1}));
    assert_eq!(response.status(), Status::Unauthorized);

    client.post("/wallet/connect").dispatch();

    let response = post_json(&client, "/battle/join", json!({"stake": 0.1}));
    assert_eq!(response.status(), Status::Ok);
    let state: MatchState = response.into_json().expect("state");
    assert_eq!(state.phase, MatchPhase::InProgress);
    assert_eq!(state.turn, Side::Player);

    let response = post_json(&client, "/battle/join", json!({"stake": 0.1}));
    assert_eq!(response.status(), Status::Conflict);

    let response = post_json(&client, "/battle/action", json!({"kind": "Special"}));
    assert_eq!(response.status(), Status::BadRequest);

    let response = client.post("/battle/opponent").dispatch();
    assert_eq!(response.status(), Status::Conflict);

    let response = post_json(&client, "/battle/action", json!({"kind": "Attack"}));
    assert_eq!(response.status(), Status::Ok);
    let report: ActionReport = response.into_json().expect("report");
    assert_eq!(report.actor, Side::Player);
    assert!(report.defender_health_after < 100);

    let response = client.post("/battle/opponent").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let report: ActionReport = response.into_json().expect("report");
    assert_eq!(report.actor, Side::Opponent);

    let state: MatchState = client.get("/battle").dispatch().into_json().expect("state");
    assert_eq!(state.turn, Side::Player);
    assert_eq!(state.turn_number, 2);

    let response = client.post("/battle/tick").dispatch();
    let event: Value = response.into_json().expect("event");
    assert_eq!(event["event"], "Ticking");
    assert_eq!(event["seconds_left"], 29);

    let response = client.post("/battle/settle").dispatch();
    let body: Value = response.into_json().expect("settle");
    assert_eq!(body["settled"], false);
}

#[test]
fn battle_log_can_be_paged_and_cleared() {
    let client = client();
    client.post("/wallet/connect").dispatch();
    post_json(&client, "/battle/join", json!({"stake": 0.1}));

    let body: Value = client.get("/battle/log?limit=1").dispatch().into_json().expect("log");
    assert_eq!(body["entries"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["next_seq"], 2);

    let response = client.delete("/battle/log").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: Value = client.get("/battle/log").dispatch().into_json().expect("log");
    let entries = body["entries"].as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["message"], "Battle log cleared");
}

#[test]
fn loot_box_requires_wallet() {
    let client = client();
    let response = client.post("/loot/open").dispatch();
    assert_eq!(response.status(), Status::Unauthorized);

    client.post("/wallet/connect").dispatch();
    let response = client.post("/loot/open").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().expect("outcome");
    assert_eq!(body["cost"], 10.0);
}

#[test]
fn seeding_makes_matches_repeatable() {
    let play = || {
        let client = client();
        client.post("/wallet/connect").dispatch();
        let response = post_json(&client, "/player/seed", json!({"seed": 42}));
        assert_eq!(response.status(), Status::Ok);
        post_json(&client, "/battle/join", json!({"stake": 0.1}));
        post_json(&client, "/battle/action", json!({"kind": "Attack"}));
        client.post("/battle/opponent").dispatch();
        let state: MatchState = client.get("/battle").dispatch().into_json().expect("state");
        state
    };
    assert_eq!(play(), play());
}

#[test]
fn unknown_page_without_static_dir_is_json_404() {
    let client = client();
    let response = client.get("/some/page").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(message(response), "Not found");
}
