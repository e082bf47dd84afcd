//! Request handlers.
//!
//! Handlers translate between wire types from `api-shared` and core operations. Risk is always
//! derived on read using the tier policy from [`CoreConfig`](puw_core::CoreConfig).

use crate::error::ApiError;
use crate::AppState;
use api_shared::{
    BradenReq, CreatePatientReq, DashboardStatsRes, ErrorRes, HealthRes, HealthService,
    ListPatientsRes, PatientRes, PredictionDto, PredictionRes, RecommendationRes, RiskRes, UpdatePatientReq,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use puw_core::{
    dashboard, has_no_signal, recommendation_for, PatientId, RawBradenAssessment, RiskSummary,
    RiskTier,
};
use puw_prediction::CancellationToken;
use serde::Deserialize;

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(id: &str) -> ApiResult<PatientId> {
    PatientId::parse(id).map_err(|_| ApiError::NotFound(format!("patient not found: {}", id)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPatientsQuery {
    pub tier: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients",
    params(
        ("tier" = Option<String>, Query, description = "Only patients in this tier: critical, high, moderate or low"),
        ("q" = Option<String>, Query, description = "Case-insensitive search over name, room and diagnosis"),
        ("sort" = Option<String>, Query, description = "`severity` for most at risk first; creation order otherwise")
    ),
    responses(
        (status = 200, description = "List of patients", body = ListPatientsRes),
        (status = 422, description = "Unknown tier or sort order", body = ErrorRes)
    )
)]
/// List patients, optionally filtered, searched and sorted.
///
/// # Errors
/// Returns `422 Unprocessable Entity` if `tier` or `sort` is not recognised.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<ListPatientsQuery>,
) -> ApiResult<Json<ListPatientsRes>> {
    let policy = state.cfg.tier_policy();
    let mut patients = state.repo.list()?;

    if let Some(tier) = query.tier.as_deref().filter(|t| !t.trim().is_empty()) {
        let tier: RiskTier = tier.parse().map_err(ApiError::InvalidInput)?;
        patients = dashboard::filter_by_tier(patients, tier, policy);
    }
    if let Some(q) = query.q.as_deref() {
        patients = dashboard::search(patients, q);
    }
    match query.sort.as_deref().map(str::trim) {
        None | Some("") | Some("created") => {}
        Some("severity") => dashboard::sort_by_severity(&mut patients, policy),
        Some(other) => {
            return Err(ApiError::InvalidInput(format!(
                "unknown sort order: '{}'",
                other
            )))
        }
    }

    let patients = patients
        .iter()
        .map(|p| PatientRes::from_patient(p, policy))
        .collect();
    Ok(Json(ListPatientsRes { patients }))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = PatientRes),
        (status = 422, description = "Validation failed", body = ErrorRes)
    )
)]
/// Create a patient. The server assigns the id.
///
/// # Errors
/// Returns `422 Unprocessable Entity` if any field, including a Braden sub-score, is invalid.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<CreatePatientReq>,
) -> ApiResult<(StatusCode, Json<PatientRes>)> {
    let patient = state.repo.create(req.into())?;
    Ok((
        StatusCode::CREATED,
        Json(PatientRes::from_patient(&patient, state.cfg.tier_policy())),
    ))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id, 32 hex characters")),
    responses(
        (status = 200, description = "The patient", body = PatientRes),
        (status = 404, description = "No such patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientRes>> {
    let patient = state.repo.get_by_id(&parse_id(&id)?)?;
    Ok(Json(PatientRes::from_patient(
        &patient,
        state.cfg.tier_policy(),
    )))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id, 32 hex characters")),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Updated patient", body = PatientRes),
        (status = 404, description = "No such patient", body = ErrorRes),
        (status = 422, description = "Validation failed; nothing was changed", body = ErrorRes)
    )
)]
/// Apply a partial update.
///
/// Braden sub-scores may be updated individually; the merged assessment is validated as a whole.
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePatientReq>,
) -> ApiResult<Json<PatientRes>> {
    let patient = state.repo.update(&parse_id(&id)?, req.into())?;
    Ok(Json(PatientRes::from_patient(
        &patient,
        state.cfg.tier_policy(),
    )))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id, 32 hex characters")),
    responses(
        (status = 200, description = "Removed patient", body = PatientRes),
        (status = 404, description = "No such patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientRes>> {
    let id = parse_id(&id)?;
    let patient = state.repo.remove(&id)?;
    state.watch.forget(&id);
    Ok(Json(PatientRes::from_patient(
        &patient,
        state.cfg.tier_policy(),
    )))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/risk",
    params(("id" = String, Path, description = "Patient id, 32 hex characters")),
    responses(
        (status = 200, description = "Score, tier and normalised risk", body = RiskRes),
        (status = 404, description = "No such patient", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub async fn get_patient_risk(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RiskRes>> {
    let patient = state.repo.get_by_id(&parse_id(&id)?)?;
    Ok(Json(patient.risk(state.cfg.tier_policy()).into()))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/prediction",
    params(("id" = String, Path, description = "Patient id, 32 hex characters")),
    responses(
        (status = 200, description = "Current prediction and change flag", body = PredictionRes),
        (status = 404, description = "No such patient", body = ErrorRes),
        (status = 502, description = "Prediction service failed", body = ErrorRes),
        (status = 504, description = "Prediction service timed out", body = ErrorRes)
    )
)]
/// Fetch the patient's prediction and compare it with the last one this server showed.
///
/// A prediction whose message reports missing data is treated as absent. When the risk label
/// has not changed, the earlier prediction is returned and `changed` is false.
#[axum::debug_handler]
pub async fn get_patient_prediction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PredictionRes>> {
    let patient = state.repo.get_by_id(&parse_id(&id)?)?;

    let fetched = state
        .predictions
        .get_prediction(patient.id, &CancellationToken::new())
        .await?;

    let no_signal = fetched.as_ref().is_some_and(has_no_signal);
    if no_signal {
        tracing::warn!(patient_id = %patient.id, "prediction reported no signal");
    }

    let (changed, shown) = state.watch.observe(patient.id, fetched);
    tracing::debug!(patient_id = %patient.id, changed, "prediction compared");

    Ok(Json(PredictionRes {
        patient_id: patient.id.to_string(),
        prediction: shown.as_ref().map(PredictionDto::from),
        no_signal,
        changed,
        recommendation: shown
            .as_ref()
            .map(|p| RecommendationRes::from(recommendation_for(&p.risk_level))),
    }))
}

#[utoipa::path(
    post,
    path = "/risk/score",
    request_body = BradenReq,
    responses(
        (status = 200, description = "Score, tier and normalised risk", body = RiskRes),
        (status = 422, description = "A sub-score is missing, not an integer or out of range", body = ErrorRes)
    )
)]
/// Score a Braden assessment without storing it.
#[axum::debug_handler]
pub async fn score_risk(
    State(state): State<AppState>,
    Json(req): Json<BradenReq>,
) -> ApiResult<Json<RiskRes>> {
    let assessment = RawBradenAssessment::from(req).validate()?;
    Ok(Json(
        RiskSummary::of(&assessment, state.cfg.tier_policy()).into(),
    ))
}

#[utoipa::path(
    get,
    path = "/dashboard/stats",
    responses(
        (status = 200, description = "Patient counts per tier", body = DashboardStatsRes)
    )
)]
#[axum::debug_handler]
pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStatsRes>> {
    let patients = state.repo.list()?;
    Ok(Json(
        dashboard::stats(&patients, state.cfg.tier_policy()).into(),
    ))
}

/// Forward a request under the proxy prefix to the prediction service.
///
/// # Errors
/// Returns `502 Bad Gateway` if the upstream cannot be reached and `504 Gateway Timeout` if it
/// does not answer in time. Upstream error statuses are relayed as they are.
pub async fn proxy_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let proxied = state
        .proxy
        .forward(method, uri.path(), uri.query(), &headers, body)
        .await?;
    Ok((proxied.status, proxied.headers, proxied.body).into_response())
}
