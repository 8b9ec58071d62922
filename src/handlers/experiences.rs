use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Experience, Slot};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

// GET /api/experiences
pub async fn list_experiences(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Experience>>, AppError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let experiences = {
        let db = state.db.lock().unwrap();
        queries::list_experiences(&db, search)?
    };

    Ok(Json(experiences))
}

#[derive(Serialize)]
pub struct ExperienceDetail {
    #[serde(flatten)]
    pub experience: Experience,
    pub slots: Vec<Slot>,
}

// GET /api/experiences/:id
pub async fn get_experience(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ExperienceDetail>, AppError> {
    let (experience, slots) = {
        let db = state.db.lock().unwrap();
        let experience = queries::get_experience(&db, id)?
            .ok_or_else(|| AppError::NotFound(format!("experience {id}")))?;
        let slots = queries::get_upcoming_slots(&db, id)?;
        (experience, slots)
    };

    Ok(Json(ExperienceDetail { experience, slots }))
}
