//! RPC request handlers and wire DTOs.

use crate::error::RpcError;
use atelier_types::{ArtistAddress, ArtistProfile, SocialLinks, VerificationRecord};
use atelier_verification::VerificationOrchestrator;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type AppState = Arc<VerificationOrchestrator>;

/// Header carrying the authenticated caller address. The relay trusts the
/// upstream wallet-auth layer to have populated it.
pub const CALLER_HEADER: &str = "x-caller-address";

fn caller_from(headers: &HeaderMap) -> Result<ArtistAddress, RpcError> {
    let raw = headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(RpcError::MissingCaller)?;
    ArtistAddress::parse(raw)
        .map_err(|e| RpcError::Verification(atelier_verification::VerificationError::from(e)))
}

fn parse_address(raw: &str) -> Result<ArtistAddress, RpcError> {
    ArtistAddress::parse(raw)
        .map_err(|e| RpcError::Verification(atelier_verification::VerificationError::from(e)))
}

// ── Submit ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub artist_address: String,
    pub profile: ProfileBody,
}

#[derive(Deserialize)]
pub struct ProfileBody {
    pub name: String,
    pub bio: String,
    pub portfolio_url: String,
    pub email: String,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub art_style: Option<String>,
}

impl From<ProfileBody> for ArtistProfile {
    fn from(body: ProfileBody) -> Self {
        ArtistProfile {
            name: body.name,
            bio: body.bio,
            portfolio_url: body.portfolio_url,
            email: body.email,
            social: SocialLinks {
                twitter: body.twitter,
                instagram: body.instagram,
            },
            art_style: body.art_style,
        }
    }
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub content_ref: String,
    pub receipt_id: String,
    pub record: VerificationRecord,
}

pub async fn submit(
    State(orchestrator): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, RpcError> {
    let caller = caller_from(&headers)?;
    let artist = parse_address(&request.artist_address)?;
    let outcome = orchestrator
        .submit(&caller, &artist, request.profile.into())
        .await?;
    Ok(Json(SubmitResponse {
        content_ref: outcome
            .record
            .content_ref
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_default(),
        receipt_id: outcome.receipt.id.to_string(),
        record: outcome.record,
    }))
}

// ── Verify / reject ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ModerationRequest {
    pub artist_address: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct ReceiptResponse {
    pub receipt_id: String,
}

pub async fn verify(
    State(orchestrator): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ModerationRequest>,
) -> Result<Json<ReceiptResponse>, RpcError> {
    let caller = caller_from(&headers)?;
    let artist = parse_address(&request.artist_address)?;
    let receipt = orchestrator.verify(&caller, &artist).await?;
    Ok(Json(ReceiptResponse {
        receipt_id: receipt.id.to_string(),
    }))
}

pub async fn reject(
    State(orchestrator): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ModerationRequest>,
) -> Result<Json<ReceiptResponse>, RpcError> {
    let caller = caller_from(&headers)?;
    let artist = parse_address(&request.artist_address)?;
    let receipt = orchestrator
        .reject(&caller, &artist, request.reason.as_deref())
        .await?;
    Ok(Json(ReceiptResponse {
        receipt_id: receipt.id.to_string(),
    }))
}

// ── Reads ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub refresh: bool,
}

pub async fn status(
    State(orchestrator): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<VerificationRecord>, RpcError> {
    let artist = parse_address(&address)?;
    let record = orchestrator.get_status(&artist, query.refresh).await?;
    Ok(Json(record))
}

pub async fn verified_list(
    State(orchestrator): State<AppState>,
) -> Result<Json<Vec<VerificationRecord>>, RpcError> {
    let records = orchestrator.list_verified().await?;
    Ok(Json(records))
}
