//! Category handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use paisa_core::models::{Category, NewCategory};

#[derive(Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub category: Category,
}

/// GET /api/categories - List categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoryListResponse>, AppError> {
    let categories = state.db.list_categories()?;
    Ok(Json(CategoryListResponse { categories }))
}

/// POST /api/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(new_category): Json<NewCategory>,
) -> Result<Json<CategoryResponse>, AppError> {
    if new_category.name.trim().is_empty() {
        return Err(AppError::bad_request("Category name must not be empty"));
    }

    let id = state.db.insert_category(&new_category)?;
    let category = state
        .db
        .get_category(id)?
        .ok_or_else(|| AppError::not_found("Category vanished after insert"))?;
    Ok(Json(CategoryResponse { category }))
}
