use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::{Digest, DigestService};
use crate::sources::SourceHealth;
use crate::view::{CountryFilter, SortColumn, SortDirection, TableView};

pub struct AppState {
    pub service: DigestService,
}

#[derive(Debug, Default, Deserialize)]
pub struct DigestQuery {
    search: Option<String>,
    country: Option<String>,
    sort: Option<String>,
    dir: Option<String>,
}

impl DigestQuery {
    fn view(&self) -> Result<TableView, (StatusCode, String)> {
        let mut view = TableView::new();
        if let Some(search) = &self.search {
            view.set_search(search.as_str());
        }
        if let Some(country) = &self.country {
            // Infallible
            view.set_country(CountryFilter::from_str(country).unwrap_or_default());
        }
        let column = match &self.sort {
            Some(raw) => SortColumn::from_str(raw)
                .map_err(|_| (StatusCode::BAD_REQUEST, format!("Unknown sort column: {}", raw)))?,
            None => SortColumn::Rank,
        };
        let direction = match &self.dir {
            Some(raw) => SortDirection::from_str(raw).map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Sort direction must be asc or desc, got {}", raw),
                )
            })?,
            None => SortDirection::Ascending,
        };
        view.set_sort(column, direction);
        Ok(view)
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn refresh(state: &AppState) -> Result<Digest, (StatusCode, String)> {
    state.service.refresh().await.map_err(|e| {
        log::error!("Digest refresh failed: {:#}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

// The KPI panel always describes the full digest, not the filtered rows
async fn get_digest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DigestQuery>,
) -> Result<Json<Digest>, (StatusCode, String)> {
    let view = query.view()?;
    let digest = refresh(&state).await?;
    let records = view.visible(&digest.records).into_iter().cloned().collect();

    Ok(Json(Digest { records, ..digest }))
}

async fn get_kpi(State(state): State<Arc<AppState>>) -> Result<Response, (StatusCode, String)> {
    let digest = refresh(&state).await?;
    Ok(match digest.kpi {
        Some(kpi) => Json(kpi).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

async fn get_sources_health(State(state): State<Arc<AppState>>) -> Json<Vec<SourceHealth>> {
    Json(state.service.health().await)
}

pub fn router(service: DigestService) -> Router {
    let state = Arc::new(AppState { service });
    Router::new()
        .route("/health", get(health))
        .route("/digest", get(get_digest))
        .route("/digest/kpi", get(get_kpi))
        .route("/sources/health", get(get_sources_health))
        .with_state(state)
}
