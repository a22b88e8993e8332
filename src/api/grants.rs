//! Grants and funding API: one resource, dispatched by query `type` on reads,
//! by body `action` on creates and by body `type` on updates.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    now_timestamp, parse_timestamp, CreateFundingSourceRequest, CreateGrantRequest,
    FundingSource, FundingStatus, Grant, GrantExpenditure, GrantReceipt, GrantReport,
    GrantReportResponse, GrantStatus, ReceiveFundsRequest, RecordExpenditureRequest,
    SubmitReportRequest, UpdateFundingSourceRequest, UpdateGrantRequest,
};
use crate::engine::{
    self, ComplianceSummary, GrantBalance, GrantCompliance, GrantTotals, GrantWithBalance,
    GrantsByStatus, SourceTypeTotal,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_currency, validate_date_order, validate_date_span, validate_datetime,
    validate_email, validate_non_empty, validate_non_negative_amount,
    validate_optional_datetime, validate_optional_uuid, validate_positive_amount,
    validate_required, validate_uuid,
};

/// Longest start-to-end window a grant may cover
const MAX_GRANT_SPAN_YEARS: u32 = 50;

// -------------------------------------------------------------------------
// Request shapes
// -------------------------------------------------------------------------

/// Query parameters for `GET /api/grants`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrantsQuery {
    /// grants | funding_sources | expenditures | compliance | reports
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub grant_id: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for `DELETE /api/grants`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrantsView {
    Grants,
    FundingSources,
    Expenditures,
    Compliance,
    Reports,
}

impl GrantsView {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "grants" => Some(Self::Grants),
            "funding_sources" => Some(Self::FundingSources),
            "expenditures" => Some(Self::Expenditures),
            "compliance" => Some(Self::Compliance),
            "reports" => Some(Self::Reports),
            _ => None,
        }
    }
}

const GRANT_ACTIONS: [&str; 5] = [
    "create_grant",
    "create_funding_source",
    "record_expenditure",
    "submit_report",
    "receive_funds",
];

/// Body of `POST /api/grants`: `{ "action": ..., "data": { ... } }`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum GrantAction {
    CreateGrant(CreateGrantRequest),
    CreateFundingSource(CreateFundingSourceRequest),
    RecordExpenditure(RecordExpenditureRequest),
    SubmitReport(SubmitReportRequest),
    ReceiveFunds(ReceiveFundsRequest),
}

impl GrantAction {
    /// Decode a POST body. Unknown actions are rejected before the payload
    /// is looked at; known actions with a malformed payload are validation
    /// errors.
    pub fn from_body(body: serde_json::Value) -> Result<Self, ApiError> {
        let known = body
            .get("action")
            .and_then(|a| a.as_str())
            .is_some_and(|a| GRANT_ACTIONS.contains(&a));
        if !known {
            return Err(ApiError::bad_request("Invalid action"));
        }

        serde_json::from_value(body).map_err(|e| ApiError::validation_field("data", e.to_string()))
    }
}

const UPDATE_TYPES: [&str; 2] = ["grant", "funding_source"];

/// Body of `PATCH /api/grants`: `{ "id": ..., "type": ..., <fields> }`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateTarget {
    Grant {
        id: String,
        #[serde(flatten)]
        changes: UpdateGrantRequest,
    },
    FundingSource {
        id: String,
        #[serde(flatten)]
        changes: UpdateFundingSourceRequest,
    },
}

impl UpdateTarget {
    pub fn from_body(body: serde_json::Value) -> Result<Self, ApiError> {
        let known = body
            .get("type")
            .and_then(|t| t.as_str())
            .is_some_and(|t| UPDATE_TYPES.contains(&t));
        if !known {
            return Err(ApiError::bad_request("Invalid type"));
        }

        serde_json::from_value(body).map_err(|e| ApiError::validation_field("body", e.to_string()))
    }
}

// -------------------------------------------------------------------------
// Response shapes
// -------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GrantsListResponse {
    pub grants: Vec<GrantWithBalance>,
    pub by_status: GrantsByStatus,
    pub totals: GrantTotals,
}

#[derive(Debug, Serialize)]
pub struct FundingSourcesResponse {
    pub sources: Vec<FundingSource>,
    pub by_type: BTreeMap<String, SourceTypeTotal>,
    pub total_funding: f64,
}

#[derive(Debug, Serialize)]
pub struct ExpenditureSummary {
    pub total_spent: f64,
    pub budget: f64,
    pub remaining: f64,
}

#[derive(Debug, Serialize)]
pub struct ExpendituresResponse {
    pub expenditures: Vec<GrantExpenditure>,
    pub by_category: BTreeMap<String, f64>,
    pub summary: ExpenditureSummary,
}

#[derive(Debug, Serialize)]
pub struct ComplianceResponse {
    pub compliance: Vec<GrantCompliance>,
    pub summary: ComplianceSummary,
}

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    pub reports: Vec<GrantReportResponse>,
}

#[derive(Debug, Serialize)]
pub struct FundingSummary {
    pub active_grants: usize,
    pub total_grant_funding: f64,
    pub funding_sources: usize,
    pub total_other_funding: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: FundingSummary,
}

#[derive(Debug, Serialize)]
pub struct GrantResponse {
    pub grant: Grant,
}

#[derive(Debug, Serialize)]
pub struct SourceResponse {
    pub source: FundingSource,
}

#[derive(Debug, Serialize)]
pub struct ExpenditureResponse {
    pub expenditure: GrantExpenditure,
    pub remaining_balance: f64,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: GrantReportResponse,
}

#[derive(Debug, Serialize)]
pub struct FundsReceivedResponse {
    pub success: bool,
    pub total_received: f64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// -------------------------------------------------------------------------
// Validation
// -------------------------------------------------------------------------

fn validate_create_grant(req: &CreateGrantRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    errors
        .check("name", validate_required(&req.name, "Name"))
        .check("grantor", validate_required(&req.grantor, "Grantor"))
        .check("amount_awarded", validate_positive_amount(req.amount_awarded, "Amount awarded"))
        .check(
            "amount_received",
            validate_non_negative_amount(req.amount_received, "Amount received"),
        )
        .check("currency", validate_currency(&req.currency))
        .check("start_date", validate_datetime(&req.start_date, "start_date"))
        .check("end_date", validate_datetime(&req.end_date, "end_date"))
        .check("end_date", validate_date_order(&req.start_date, &req.end_date))
        .check(
            "end_date",
            validate_date_span(&req.start_date, &req.end_date, MAX_GRANT_SPAN_YEARS),
        )
        .check("project_id", validate_optional_uuid(&req.project_id, "project_id"))
        .check("contact_email", validate_email(&req.contact_email));

    errors.finish()
}

/// Window check for a grant whose dates are being changed, run against the
/// stored dates merged with the patched ones
fn validate_grant_window(start: &str, end: &str) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    errors
        .check("end_date", validate_date_order(start, end))
        .check("end_date", validate_date_span(start, end, MAX_GRANT_SPAN_YEARS));

    errors.finish()
}

fn validate_create_funding_source(req: &CreateFundingSourceRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    errors
        .check("name", validate_required(&req.name, "Name"))
        .check("amount", validate_positive_amount(req.amount, "Amount"))
        .check("currency", validate_currency(&req.currency))
        .check("start_date", validate_optional_datetime(&req.start_date, "start_date"))
        .check("end_date", validate_optional_datetime(&req.end_date, "end_date"))
        .check("project_id", validate_optional_uuid(&req.project_id, "project_id"))
        .check("donor_id", validate_optional_uuid(&req.donor_id, "donor_id"));

    if let (Some(start), Some(end)) = (&req.start_date, &req.end_date) {
        errors.check("end_date", validate_date_order(start, end));
    }

    errors.finish()
}

fn validate_record_expenditure(req: &RecordExpenditureRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    errors
        .check("grant_id", validate_uuid(&req.grant_id, "grant_id"))
        .check("amount", validate_positive_amount(req.amount, "Amount"))
        .check(
            "expenditure_date",
            validate_datetime(&req.expenditure_date, "expenditure_date"),
        )
        .check("category", validate_non_empty(&req.category, "Category"))
        .check("description", validate_non_empty(&req.description, "Description"))
        .check("vendor_id", validate_optional_uuid(&req.vendor_id, "vendor_id"))
        .check("invoice_id", validate_optional_uuid(&req.invoice_id, "invoice_id"))
        .check("approved_by", validate_optional_uuid(&req.approved_by, "approved_by"));

    errors.finish()
}

fn validate_submit_report(req: &SubmitReportRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("report_id", validate_uuid(&req.report_id, "report_id"));
    errors.finish()
}

fn validate_receive_funds(req: &ReceiveFundsRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    errors
        .check("grant_id", validate_uuid(&req.grant_id, "grant_id"))
        .check("amount", validate_positive_amount(req.amount, "Amount"))
        .check("received_date", validate_datetime(&req.received_date, "received_date"));

    errors.finish()
}

fn validate_update_grant(id: &str, req: &UpdateGrantRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    errors.check("id", validate_uuid(id, "id"));
    if let Some(ref name) = req.name {
        errors.check("name", validate_required(name, "Name"));
    }
    if let Some(ref grantor) = req.grantor {
        errors.check("grantor", validate_required(grantor, "Grantor"));
    }
    if let Some(amount) = req.amount_awarded {
        errors.check("amount_awarded", validate_positive_amount(amount, "Amount awarded"));
    }
    if let Some(amount) = req.amount_received {
        errors.check(
            "amount_received",
            validate_non_negative_amount(amount, "Amount received"),
        );
    }
    errors
        .check("currency", validate_currency(&req.currency))
        .check("start_date", validate_optional_datetime(&req.start_date, "start_date"))
        .check("end_date", validate_optional_datetime(&req.end_date, "end_date"))
        .check("project_id", validate_optional_uuid(&req.project_id, "project_id"))
        .check("contact_email", validate_email(&req.contact_email));

    errors.finish()
}

fn validate_update_funding_source(
    id: &str,
    req: &UpdateFundingSourceRequest,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    errors.check("id", validate_uuid(id, "id"));
    if let Some(ref name) = req.name {
        errors.check("name", validate_required(name, "Name"));
    }
    if let Some(amount) = req.amount {
        errors.check("amount", validate_positive_amount(amount, "Amount"));
    }
    errors
        .check("currency", validate_currency(&req.currency))
        .check("start_date", validate_optional_datetime(&req.start_date, "start_date"))
        .check("end_date", validate_optional_datetime(&req.end_date, "end_date"))
        .check("project_id", validate_optional_uuid(&req.project_id, "project_id"))
        .check("donor_id", validate_optional_uuid(&req.donor_id, "donor_id"));

    errors.finish()
}

fn require_grant_id(grant_id: Option<&str>) -> Result<&str, ApiError> {
    let grant_id = grant_id.unwrap_or_default();
    validate_uuid(grant_id, "grant_id").map_err(|e| ApiError::validation_field("grant_id", e))?;
    Ok(grant_id)
}

// -------------------------------------------------------------------------
// GET
// -------------------------------------------------------------------------

/// Read grants and funding data; the `type` query parameter picks the view.
/// Without a recognised `type` a funding summary is returned.
pub async fn get_grants(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GrantsQuery>,
) -> Result<Response, ApiError> {
    let view = query.kind.as_deref().and_then(GrantsView::parse);
    tracing::debug!(view = ?view, grant_id = ?query.grant_id, "Reading grants data");

    let response = match view {
        Some(GrantsView::Grants) => {
            Json(list_grants(&state, query.status.as_deref()).await?).into_response()
        }
        Some(GrantsView::FundingSources) => Json(list_funding_sources(&state).await?).into_response(),
        Some(GrantsView::Expenditures) => {
            let grant_id = require_grant_id(query.grant_id.as_deref())?;
            Json(list_expenditures(&state, grant_id).await?).into_response()
        }
        Some(GrantsView::Compliance) => Json(compliance(&state).await?).into_response(),
        Some(GrantsView::Reports) => {
            let grant_id = require_grant_id(query.grant_id.as_deref())?;
            let reports = GrantReport::list_for_grant(&state.db, grant_id)
                .await?
                .into_iter()
                .map(GrantReportResponse::from)
                .collect();
            Json(ReportsResponse { reports }).into_response()
        }
        None => Json(funding_summary(&state).await?).into_response(),
    };

    Ok(response)
}

async fn list_grants(state: &AppState, status: Option<&str>) -> Result<GrantsListResponse, ApiError> {
    let grants = Grant::list(&state.db, status).await?;
    let spent: HashMap<String, f64> = GrantExpenditure::totals_by_grant(&state.db).await?;

    let now = Utc::now();
    let window = state.config.grants.expiring_window_days;
    let grants: Vec<GrantWithBalance> = grants
        .into_iter()
        .map(|grant| {
            let total = spent.get(&grant.id).copied().unwrap_or(0.0);
            let balance = GrantBalance::compute(&grant, total, now, window);
            GrantWithBalance { grant, balance }
        })
        .collect();

    Ok(GrantsListResponse {
        by_status: engine::group_by_status(&grants),
        totals: engine::totals(&grants),
        grants,
    })
}

async fn list_funding_sources(state: &AppState) -> Result<FundingSourcesResponse, ApiError> {
    let sources = FundingSource::list_active(&state.db).await?;

    Ok(FundingSourcesResponse {
        by_type: engine::group_by_source_type(&sources),
        total_funding: sources.iter().map(|s| s.amount).sum(),
        sources,
    })
}

async fn list_expenditures(
    state: &AppState,
    grant_id: &str,
) -> Result<ExpendituresResponse, ApiError> {
    let expenditures = GrantExpenditure::list_for_grant(&state.db, grant_id).await?;
    let budget = Grant::find(&state.db, grant_id)
        .await?
        .map(|g| g.amount_awarded)
        .unwrap_or(0.0);

    let total_spent: f64 = expenditures.iter().map(|e| e.amount).sum();

    Ok(ExpendituresResponse {
        by_category: engine::sum_by_category(&expenditures),
        summary: ExpenditureSummary {
            total_spent,
            budget,
            remaining: budget - total_spent,
        },
        expenditures,
    })
}

async fn compliance(state: &AppState) -> Result<ComplianceResponse, ApiError> {
    let active = GrantStatus::Active.as_str();
    let grants = Grant::list(&state.db, Some(active)).await?;
    let reports = GrantReport::list_for_grant_status(&state.db, active).await?;

    let mut by_grant: HashMap<String, Vec<GrantReport>> = HashMap::new();
    for report in reports {
        by_grant.entry(report.grant_id.clone()).or_default().push(report);
    }

    let now = Utc::now();
    let window = Duration::days(state.config.grants.upcoming_report_window_days);
    let compliance: Vec<GrantCompliance> = grants
        .iter()
        .map(|g| {
            let reports = by_grant.get(&g.id).map(Vec::as_slice).unwrap_or(&[]);
            engine::evaluate(g, reports, now, window)
        })
        .collect();

    Ok(ComplianceResponse {
        summary: engine::summarize(&compliance),
        compliance,
    })
}

async fn funding_summary(state: &AppState) -> Result<SummaryResponse, ApiError> {
    let (grants, sources) = tokio::try_join!(
        Grant::list(&state.db, Some(GrantStatus::Active.as_str())),
        FundingSource::list_active(&state.db),
    )?;

    Ok(SummaryResponse {
        summary: FundingSummary {
            active_grants: grants.len(),
            total_grant_funding: grants.iter().map(|g| g.amount_awarded).sum(),
            funding_sources: sources.len(),
            total_other_funding: sources.iter().map(|s| s.amount).sum(),
        },
    })
}

// -------------------------------------------------------------------------
// POST
// -------------------------------------------------------------------------

/// Create a grant or funding source, record spending, submit a report or
/// log received funds, depending on the body's `action`.
pub async fn post_grants(
    State(state): State<Arc<AppState>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;

    match GrantAction::from_body(body)? {
        GrantAction::CreateGrant(req) => create_grant(&state, req).await,
        GrantAction::CreateFundingSource(req) => create_funding_source(&state, req).await,
        GrantAction::RecordExpenditure(req) => record_expenditure(&state, req).await,
        GrantAction::SubmitReport(req) => submit_report(&state, req).await,
        GrantAction::ReceiveFunds(req) => receive_funds(&state, req).await,
    }
}

async fn create_grant(state: &AppState, req: CreateGrantRequest) -> Result<Response, ApiError> {
    validate_create_grant(&req)?;

    let now = now_timestamp();
    let grant = Grant::from_request(
        &req,
        Uuid::new_v4().to_string(),
        &state.config.grants.default_currency,
        &now,
    );

    let mut tx = state.db.begin().await?;
    grant.insert(&mut *tx).await?;

    let mut scheduled = 0;
    if let Some(frequency) = grant.frequency() {
        let (Some(start), Some(end)) = (
            parse_timestamp(&grant.start_date),
            parse_timestamp(&grant.end_date),
        ) else {
            return Err(ApiError::internal("Stored grant dates could not be parsed"));
        };

        let reports = engine::generate_schedule(
            &grant.id,
            start,
            end,
            frequency,
            Duration::days(state.config.grants.final_report_offset_days),
        );
        scheduled = GrantReport::insert_batch(&mut *tx, &reports, &now).await?;
    }

    tx.commit().await?;

    tracing::info!(
        grant_id = %grant.id,
        grantor = %grant.grantor,
        amount_awarded = grant.amount_awarded,
        reports_scheduled = scheduled,
        "Grant created"
    );

    Ok((StatusCode::CREATED, Json(GrantResponse { grant })).into_response())
}

async fn create_funding_source(
    state: &AppState,
    req: CreateFundingSourceRequest,
) -> Result<Response, ApiError> {
    validate_create_funding_source(&req)?;

    let now = now_timestamp();
    let source = FundingSource::from_request(
        &req,
        Uuid::new_v4().to_string(),
        &state.config.grants.default_currency,
        &now,
    );
    source.insert(&state.db).await?;

    tracing::info!(
        source_id = %source.id,
        source_type = %source.source_type,
        amount = source.amount,
        "Funding source created"
    );

    Ok((StatusCode::CREATED, Json(SourceResponse { source })).into_response())
}

async fn record_expenditure(
    state: &AppState,
    req: RecordExpenditureRequest,
) -> Result<Response, ApiError> {
    validate_record_expenditure(&req)?;

    let mut tx = state.db.begin().await?;

    let grant = Grant::find(&mut *tx, &req.grant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Grant not found"))?;
    let spent = GrantExpenditure::total_for_grant(&mut *tx, &grant.id).await?;

    let remaining_balance = engine::check_expenditure(grant.amount_awarded, spent, req.amount)
        .inspect_err(|e| {
            tracing::warn!(grant_id = %grant.id, amount = req.amount, error = %e, "Expenditure rejected");
        })?;

    let expenditure = GrantExpenditure::from_request(&req, Uuid::new_v4().to_string(), &now_timestamp());
    expenditure.insert(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!(
        grant_id = %grant.id,
        expenditure_id = %expenditure.id,
        amount = expenditure.amount,
        remaining_balance,
        "Expenditure recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(ExpenditureResponse {
            expenditure,
            remaining_balance,
        }),
    )
        .into_response())
}

async fn submit_report(state: &AppState, req: SubmitReportRequest) -> Result<Response, ApiError> {
    validate_submit_report(&req)?;

    if !GrantReport::submit(&state.db, &req, &now_timestamp()).await? {
        return Err(ApiError::not_found("Report not found"));
    }

    let report = GrantReport::find(&state.db, &req.report_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Report not found"))?;

    tracing::info!(report_id = %report.id, grant_id = %report.grant_id, "Report submitted");

    Ok(Json(ReportResponse {
        report: report.into(),
    })
    .into_response())
}

async fn receive_funds(state: &AppState, req: ReceiveFundsRequest) -> Result<Response, ApiError> {
    validate_receive_funds(&req)?;

    let now = now_timestamp();
    let mut tx = state.db.begin().await?;

    let grant = Grant::find(&mut *tx, &req.grant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Grant not found"))?;

    let total_received = grant.amount_received + req.amount;
    Grant::set_amount_received(&mut *tx, &grant.id, total_received, &now).await?;

    let receipt = GrantReceipt::from_request(&req, Uuid::new_v4().to_string(), &now);
    receipt.insert(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!(
        grant_id = %grant.id,
        amount = req.amount,
        total_received,
        "Grant funds received"
    );

    Ok(Json(FundsReceivedResponse {
        success: true,
        total_received,
    })
    .into_response())
}

// -------------------------------------------------------------------------
// PATCH / DELETE
// -------------------------------------------------------------------------

/// Update fields of a grant or funding source
pub async fn patch_grants(
    State(state): State<Arc<AppState>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let now = now_timestamp();

    match UpdateTarget::from_body(body)? {
        UpdateTarget::Grant { id, changes } => {
            validate_update_grant(&id, &changes)?;

            let mut tx = state.db.begin().await?;
            let stored = Grant::find(&mut *tx, &id)
                .await?
                .ok_or_else(|| ApiError::not_found("Grant not found"))?;

            if changes.start_date.is_some() || changes.end_date.is_some() {
                validate_grant_window(
                    changes.start_date.as_deref().unwrap_or(&stored.start_date),
                    changes.end_date.as_deref().unwrap_or(&stored.end_date),
                )?;
            }

            if !Grant::update(&mut *tx, &id, &changes, &now).await? {
                return Err(ApiError::not_found("Grant not found"));
            }
            let grant = Grant::find(&mut *tx, &id)
                .await?
                .ok_or_else(|| ApiError::not_found("Grant not found"))?;
            tx.commit().await?;

            tracing::info!(grant_id = %grant.id, status = %grant.status, "Grant updated");
            Ok(Json(GrantResponse { grant }).into_response())
        }
        UpdateTarget::FundingSource { id, changes } => {
            validate_update_funding_source(&id, &changes)?;

            let mut tx = state.db.begin().await?;
            let stored = FundingSource::find(&mut *tx, &id)
                .await?
                .ok_or_else(|| ApiError::not_found("Funding source not found"))?;

            let start = changes.start_date.as_ref().or(stored.start_date.as_ref());
            let end = changes.end_date.as_ref().or(stored.end_date.as_ref());
            if let (Some(start), Some(end)) = (start, end) {
                if changes.start_date.is_some() || changes.end_date.is_some() {
                    validate_date_order(start, end)
                        .map_err(|e| ApiError::validation_field("end_date", e))?;
                }
            }

            if !FundingSource::update(&mut *tx, &id, &changes, &now).await? {
                return Err(ApiError::not_found("Funding source not found"));
            }
            let source = FundingSource::find(&mut *tx, &id)
                .await?
                .ok_or_else(|| ApiError::not_found("Funding source not found"))?;
            tx.commit().await?;

            tracing::info!(source_id = %source.id, status = %source.status, "Funding source updated");
            Ok(Json(SourceResponse { source }).into_response())
        }
    }
}

/// Close a grant or deactivate a funding source. Rows are never removed.
pub async fn delete_grants(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (Some(id), Some(kind)) = (query.id.as_deref(), query.kind.as_deref()) else {
        return Err(ApiError::bad_request("id and type are required"));
    };
    let now = now_timestamp();

    let found = match kind {
        "grant" => Grant::set_status(&state.db, id, GrantStatus::Closed, &now).await?,
        "funding_source" => {
            FundingSource::set_status(&state.db, id, FundingStatus::Inactive, &now).await?
        }
        _ => return Err(ApiError::bad_request("Invalid type")),
    };

    if !found {
        return Err(ApiError::not_found("Resource not found"));
    }

    tracing::info!(id = %id, kind = %kind, "Funding record closed");
    Ok(Json(SuccessResponse { success: true }))
}
