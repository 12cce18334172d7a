use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// JSON body returned alongside every non-success response.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Status {
    pub message: String,
}

pub fn new_status(message: impl Into<String>) -> Json<Status> {
    Json(Status {
        message: message.into(),
    })
}

#[catch(500)]
pub fn internal_error() -> Json<Status> {
    new_status("Something went wrong!")
}

#[catch(404)]
pub fn not_found() -> Json<Status> {
    new_status("Not found")
}
