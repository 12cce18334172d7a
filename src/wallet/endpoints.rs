use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use super::AccountView;
use crate::SharedEngine;

#[openapi]
#[get("/wallet")]
pub async fn get_wallet(engine: &State<SharedEngine>) -> Json<AccountView> {
    Json(engine.lock().await.account())
}

#[openapi]
#[post("/wallet/connect")]
pub async fn connect_wallet(engine: &State<SharedEngine>) -> Json<AccountView> {
    Json(engine.lock().await.connect_account())
}

/// Disconnect; any match in flight is abandoned.
#[openapi]
#[post("/wallet/disconnect")]
pub async fn disconnect_wallet(engine: &State<SharedEngine>) -> Json<AccountView> {
    Json(engine.lock().await.disconnect_account())
}
