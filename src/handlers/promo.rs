use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::services::pricing;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ValidatePromoRequest {
    pub code: Option<String>,
    pub subtotal: Option<i64>,
}

// POST /api/promo/validate
//
// Unlike booking creation, which silently ignores bad codes, this endpoint
// reports them: that is where the user sees "invalid or expired".
pub async fn validate_promo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidatePromoRequest>,
) -> Result<Response, AppError> {
    let code = req
        .code
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("promo code is required".to_string()))?;
    let subtotal = req.subtotal.unwrap_or(0);

    let promo = {
        let db = state.db.lock().unwrap();
        queries::find_active_promo(&db, code)?
    };

    let Some(promo) = promo else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "valid": false,
                "error": "Invalid or expired promo code",
            })),
        )
            .into_response());
    };

    let discount = pricing::discount(subtotal, &promo);

    Ok(Json(serde_json::json!({
        "valid": true,
        "discount_type": promo.discount_type.as_str(),
        "discount_value": promo.discount_value,
        "discount": discount,
    }))
    .into_response())
}
