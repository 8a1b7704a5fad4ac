//! Company route handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use menuhub_core::CompanyId;

use crate::db::CompanyRepository;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::models::company::{Company, CompanyDetail, NewCompany, UpdateCompany};
use crate::state::AppState;

/// `GET /api/companies`
pub async fn index(State(state): State<AppState>) -> Result<AppJson<Vec<Company>>> {
    let companies = CompanyRepository::new(state.pool()).list().await?;
    Ok(AppJson(companies))
}

/// `GET /api/companies/{id}`
pub async fn show(
    State(state): State<AppState>,
    AppPath(id): AppPath<CompanyId>,
) -> Result<AppJson<CompanyDetail>> {
    let company = CompanyRepository::new(state.pool())
        .get_with_stores(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Company".to_string()))?;
    Ok(AppJson(company))
}

/// `POST /api/companies`
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewCompany>,
) -> Result<(StatusCode, AppJson<Company>)> {
    let body = body.normalized()?;
    let company = CompanyRepository::new(state.pool()).create(&body).await?;
    tracing::info!(company_id = %company.id, "Company created");
    Ok((StatusCode::CREATED, AppJson(company)))
}

/// `PUT /api/companies/{id}`
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<CompanyId>,
    AppJson(body): AppJson<UpdateCompany>,
) -> Result<AppJson<Company>> {
    let body = body.normalized()?;
    let company = CompanyRepository::new(state.pool()).update(id, &body).await?;
    Ok(AppJson(company))
}

/// `DELETE /api/companies/{id}`
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<CompanyId>,
) -> Result<StatusCode> {
    CompanyRepository::new(state.pool()).delete(id).await?;
    tracing::info!(company_id = %id, "Company deleted");
    Ok(StatusCode::NO_CONTENT)
}
