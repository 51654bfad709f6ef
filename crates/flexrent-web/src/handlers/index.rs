use axum::Json;

use crate::models::{HealthJson, LIVENESS_STATUS};

pub async fn index() -> Json<HealthJson> {
    Json(HealthJson {
        status: LIVENESS_STATUS,
    })
}
