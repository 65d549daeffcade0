//! HTTP handlers for browsing, directory management, grants, and upload.
//!
//! Every endpoint is scoped to one caller: bucket, region, and access key id
//! travel with the ordinary request parameters while the secret key arrives
//! on its own in the `Authorization` header and never appears in logs or
//! error bodies.

use crate::{
    errors::AppError,
    models::{
        aggregate::DirectoryAggregate,
        grant::AccessGrant,
        listing::{DirectoryContents, ListingPage},
        upload::UploadResult,
    },
    services::BrowseError,
    state::AppState,
    store::StoreCredentials,
};
use axum::{
    Json,
    extract::{
        Query, State,
        multipart::{Field, Multipart},
    },
    http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};

/// Content type assumed when neither the form nor the file part names one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Query params accepted by `GET /listing`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub search: String,
    pub cursor: Option<String>,
    pub page_size: Option<usize>,
}

/// Query params accepted by `GET /directory-info`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryInfoQuery {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub path: String,
}

/// Query params accepted by `GET /directory-contents`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryContentsQuery {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub path: String,
    pub cursor: Option<String>,
    pub max_keys: Option<usize>,
}

/// Query params accepted by `GET /secure-url`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureUrlQuery {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub key: Option<String>,
}

/// Request body for `POST /create-directory`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDirectoryRequest {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub path: Option<String>,
}

/// Response body for `POST /create-directory`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDirectoryResponse {
    pub success: bool,
    pub directory_path: String,
}

/// GET `/listing`, one hierarchy level, supports ?path=&search=&cursor=&pageSize=
pub async fn get_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<ListingQuery>,
) -> Result<Json<ListingPage>, AppError> {
    let credentials = credentials_from(q.bucket, q.region, q.access_key_id, &headers)?;
    let service = state.browse(&credentials)?;
    let page = service
        .list_directory(&q.path, &q.search, q.cursor.as_deref(), q.page_size)
        .await?;
    Ok(Json(page))
}

/// GET `/directory-info`, recursive file count, byte total, and latest mtime.
pub async fn get_directory_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<DirectoryInfoQuery>,
) -> Result<Json<DirectoryAggregate>, AppError> {
    let credentials = credentials_from(q.bucket, q.region, q.access_key_id, &headers)?;
    let service = state.browse(&credentials)?;
    let aggregate = service.directory_info(&q.path).await?;
    Ok(Json(aggregate))
}

/// GET `/directory-contents`, every file at any depth, supports ?cursor=&maxKeys=
pub async fn get_directory_contents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<DirectoryContentsQuery>,
) -> Result<Json<DirectoryContents>, AppError> {
    let credentials = credentials_from(q.bucket, q.region, q.access_key_id, &headers)?;
    let service = state.browse(&credentials)?;
    let contents = service
        .directory_contents(&q.path, q.cursor.as_deref(), q.max_keys)
        .await?;
    Ok(Json(contents))
}

/// GET `/secure-url`, a presigned download link for one key.
pub async fn get_secure_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<SecureUrlQuery>,
) -> Result<Json<AccessGrant>, AppError> {
    let credentials = credentials_from(q.bucket, q.region, q.access_key_id, &headers)?;
    let key = required("key", q.key)?;
    let service = state.browse(&credentials)?;
    let grant = service.issue_grant(&key).await?;
    Ok(Json(grant))
}

/// POST `/create-directory`, writes a zero-byte marker so the path lists.
pub async fn create_directory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateDirectoryRequest>,
) -> Result<Json<CreateDirectoryResponse>, AppError> {
    let credentials = credentials_from(body.bucket, body.region, body.access_key_id, &headers)?;
    let path = required("path", body.path)?;
    let service = state.browse(&credentials)?;
    let directory_path = service.create_directory(&path).await?;
    Ok(Json(CreateDirectoryResponse {
        success: true,
        directory_path,
    }))
}

/// POST `/upload`, multipart form with credential fields and a `file` part.
///
/// Text fields: `bucket`, `region`, `accessKeyId`, `key`, optional
/// `contentType`. The explicit `contentType` field wins over the file part's
/// own header.
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>, AppError> {
    let mut bucket = None;
    let mut region = None;
    let mut access_key_id = None;
    let mut key = None;
    let mut explicit_content_type = None;
    let mut part_content_type = None;
    let mut payload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("bucket") => bucket = Some(read_text(field).await?),
            Some("region") => region = Some(read_text(field).await?),
            Some("accessKeyId") => access_key_id = Some(read_text(field).await?),
            Some("key") => key = Some(read_text(field).await?),
            Some("contentType") => explicit_content_type = Some(read_text(field).await?),
            Some("file") => {
                part_content_type = field.content_type().map(str::to_string);
                payload = Some(field.bytes().await.map_err(|e| {
                    AppError::bad_request(format!("could not read file part: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let credentials = credentials_from(bucket, region, access_key_id, &headers)?;
    let key = required("key", key)?;
    let payload = payload.ok_or_else(|| AppError::from(BrowseError::MissingParameter("file")))?;
    let content_type = explicit_content_type
        .filter(|ct| !ct.is_empty())
        .or(part_content_type)
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    let service = state.browse(&credentials)?;
    let result = service.upload_file(&key, payload, &content_type).await?;
    Ok(Json(result))
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::bad_request(format!("could not read form field: {e}")))
}

/// Assemble per-request credentials from parameters plus the secret header.
fn credentials_from(
    bucket: Option<String>,
    region: Option<String>,
    access_key_id: Option<String>,
    headers: &HeaderMap,
) -> Result<StoreCredentials, AppError> {
    Ok(StoreCredentials {
        bucket: required("bucket", bucket)?,
        region: required("region", region)?,
        access_key_id: required("accessKeyId", access_key_id)?,
        secret_access_key: bearer_secret(headers)?,
    })
}

fn required(name: &'static str, value: Option<String>) -> Result<String, AppError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::from(BrowseError::MissingParameter(name)))
}

/// Pull the secret key out of the `Authorization` header. A `Bearer` prefix
/// is accepted but not required.
fn bearer_secret(headers: &HeaderMap) -> Result<String, AppError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let secret = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if secret.is_empty() {
        return Err(AppError::from(BrowseError::MissingParameter(
            "authorization",
        )));
    }
    Ok(secret.to_string())
}
