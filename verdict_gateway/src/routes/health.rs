use axum::{response::IntoResponse, response::Json};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct Status {
    status: String,
    service: String,
}

pub async fn healthcheck() -> impl IntoResponse {
    Json(Status {
        status: "Available".into(),
        service: env!("CARGO_PKG_NAME").into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn healthcheck_reports_available() {
        let response = healthcheck().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
