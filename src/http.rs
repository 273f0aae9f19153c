//! HTTP transport - the catalog routes as a JSON API.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health` - liveness check.
//! - `GET /catalog` - home page counters.
//! - `GET /catalog/{categories,colors,items,iteminstances}` - lists.
//! - `GET /catalog/<entity>/:id` - detail.
//! - `POST /catalog/<entity>/create` - create (items take `multipart/form-data`
//!   with an optional `image` file part, everything else takes JSON).
//! - `GET|POST /catalog/<entity>/:id/update` - current values / update.
//! - `GET|POST /catalog/<entity>/:id/delete` - delete preview / delete.
//!
//! Errors are `{ "error": "..." }` with `violations` (422) or `dependents`
//! (409) attached where relevant.

use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::forms::{CategoryForm, ColorForm, InstanceForm, ItemForm};
use crate::images::{FileStorage, Upload};
use crate::model::DocumentStore;

type Shared<S, F> = State<Arc<Catalog<S, F>>>;

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogError),
    /// The request itself could not be read.
    BadRequest(String),
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Catalog(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let mut body = json!({ "error": err.to_string() });
                match &err {
                    CatalogError::Validation(errors) => {
                        body["violations"] = json!(errors.violations);
                    }
                    CatalogError::DeleteBlocked { dependents, .. } => {
                        body["dependents"] = json!(dependents);
                    }
                    _ => {}
                }
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                }
                (status, body)
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

/// Unwrap a JSON body, turning axum's plain-text rejection into an `ApiError`.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn ok<T: serde::Serialize>(value: T) -> ApiResult {
    Ok(Json(value).into_response())
}

fn created<T: serde::Serialize>(url: String, value: T) -> ApiResult {
    Ok((StatusCode::CREATED, Json(json!({ "url": url, "data": value }))).into_response())
}

/// Build an axum `Router` serving the catalog.
pub fn router<S, F>(catalog: Arc<Catalog<S, F>>) -> Router
where
    S: DocumentStore + 'static,
    F: FileStorage + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/catalog", get(summary::<S, F>))
        // categories
        .route("/catalog/categories", get(list_categories::<S, F>))
        .route("/catalog/category/create", axum::routing::post(create_category::<S, F>))
        .route("/catalog/category/:id", get(category_detail::<S, F>))
        .route(
            "/catalog/category/:id/update",
            get(category_current::<S, F>).post(update_category::<S, F>),
        )
        .route(
            "/catalog/category/:id/delete",
            get(category_delete_preview::<S, F>).post(delete_category::<S, F>),
        )
        // colors
        .route("/catalog/colors", get(list_colors::<S, F>))
        .route("/catalog/color/create", axum::routing::post(create_color::<S, F>))
        .route("/catalog/color/:id", get(color_detail::<S, F>))
        .route(
            "/catalog/color/:id/update",
            get(color_current::<S, F>).post(update_color::<S, F>),
        )
        .route(
            "/catalog/color/:id/delete",
            get(color_delete_preview::<S, F>).post(delete_color::<S, F>),
        )
        // items
        .route("/catalog/items", get(list_items::<S, F>))
        .route(
            "/catalog/item/create",
            get(item_form_options::<S, F>).post(create_item::<S, F>),
        )
        .route("/catalog/item/:id", get(item_detail::<S, F>))
        .route(
            "/catalog/item/:id/update",
            get(item_current::<S, F>).post(update_item::<S, F>),
        )
        .route(
            "/catalog/item/:id/delete",
            get(item_delete_preview::<S, F>).post(delete_item::<S, F>),
        )
        // item instances
        .route("/catalog/iteminstances", get(list_instances::<S, F>))
        .route(
            "/catalog/iteminstance/create",
            get(instance_form_options::<S, F>).post(create_instance::<S, F>),
        )
        .route("/catalog/iteminstance/:id", get(instance_detail::<S, F>))
        .route(
            "/catalog/iteminstance/:id/update",
            get(instance_current::<S, F>).post(update_instance::<S, F>),
        )
        .route(
            "/catalog/iteminstance/:id/delete",
            get(instance_delete_preview::<S, F>).post(delete_instance::<S, F>),
        )
        .layer(middleware::from_fn(log_requests))
        .with_state(catalog)
}

/// Serve the catalog at `addr` until Ctrl-C.
pub async fn serve<S, F>(
    catalog: Arc<Catalog<S, F>>,
    addr: SocketAddr,
    max_body: usize,
) -> Result<(), std::io::Error>
where
    S: DocumentStore + 'static,
    F: FileStorage + 'static,
{
    let app = router(catalog).layer(DefaultBodyLimit::max(max_body));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "catalog listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

/// Log method, path, status and latency of every request.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn summary<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
) -> ApiResult {
    ok(catalog.summary()?)
}

// =============================================================================
// Categories
// =============================================================================

async fn list_categories<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
) -> ApiResult {
    ok(catalog.list_categories()?)
}

async fn category_detail<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.category_detail(&id)?)
}

async fn create_category<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    payload: Result<Json<CategoryForm>, JsonRejection>,
) -> ApiResult {
    let form = json_body(payload)?;
    let category = catalog.create_category(form)?;
    created(category.url(), category)
}

async fn category_current<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.category(&id)?)
}

async fn update_category<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryForm>, JsonRejection>,
) -> ApiResult {
    let form = json_body(payload)?;
    let category = catalog.update_category(&id, form)?;
    ok(json!({ "url": category.url(), "data": category }))
}

async fn category_delete_preview<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.category_delete_preview(&id)?)
}

async fn delete_category<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    let category = catalog.delete_category(&id)?;
    ok(json!({ "url": "/catalog/categories", "data": category }))
}

// =============================================================================
// Colors
// =============================================================================

async fn list_colors<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
) -> ApiResult {
    ok(catalog.list_colors()?)
}

async fn color_detail<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.color_detail(&id)?)
}

async fn create_color<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    payload: Result<Json<ColorForm>, JsonRejection>,
) -> ApiResult {
    let form = json_body(payload)?;
    let color = catalog.create_color(form)?;
    created("/catalog/colors".to_string(), color)
}

async fn color_current<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.color(&id)?)
}

async fn update_color<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
    payload: Result<Json<ColorForm>, JsonRejection>,
) -> ApiResult {
    let form = json_body(payload)?;
    let color = catalog.update_color(&id, form)?;
    ok(json!({ "url": "/catalog/colors", "data": color }))
}

async fn color_delete_preview<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.color_delete_preview(&id)?)
}

async fn delete_color<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    let color = catalog.delete_color(&id)?;
    ok(json!({ "url": "/catalog/colors", "data": color }))
}

// =============================================================================
// Items
// =============================================================================

/// An item form read from `multipart/form-data`.
struct ItemSubmission {
    form: ItemForm,
    upload: Option<Upload>,
    delete_image: bool,
}

fn truthy(value: &str) -> bool {
    matches!(value.trim(), "on" | "true" | "1" | "yes")
}

/// Read the item form fields and write the `image` part (if any) to a temp
/// file under `image_dir` named like the intake names uploads: a random
/// name without extension.
async fn read_item_submission(
    image_dir: &FsPath,
    mut multipart: Multipart,
) -> Result<ItemSubmission, ApiError> {
    let mut submission = ItemSubmission {
        form: ItemForm::default(),
        upload: None,
        delete_image: false,
    };

    let result = read_fields(image_dir, &mut multipart, &mut submission).await;
    if result.is_err() {
        if let Some(upload) = &submission.upload {
            discard_partial_upload(upload).await;
        }
    }
    result.map(|()| submission)
}

/// Remove the temp file of a submission that could not be read in full.
async fn discard_partial_upload(upload: &Upload) -> bool {
    match tokio::fs::remove_file(&upload.temporary_path).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                path = %upload.temporary_path.display(),
                error = %err,
                "could not discard partial upload"
            );
            false
        }
    }
}

async fn read_fields(
    image_dir: &FsPath,
    multipart: &mut Multipart,
    submission: &mut ItemSubmission,
) -> Result<(), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let original = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("read error: {}", e)))?;
            // Browsers send an empty part when no file was chosen.
            if original.is_empty() || bytes.is_empty() || submission.upload.is_some() {
                continue;
            }
            let temporary_path: PathBuf = image_dir.join(uuid::Uuid::new_v4().simple().to_string());
            tokio::fs::write(&temporary_path, &bytes)
                .await
                .map_err(|e| ApiError::Internal(format!("could not store upload: {}", e)))?;
            submission.upload = Some(Upload::new(temporary_path, original));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("read error: {}", e)))?;
        match name.as_str() {
            "title" => submission.form.title = value,
            "description" => submission.form.description = value,
            "price" => submission.form.price = value,
            "category" => submission.form.category = value,
            "delete_image" => submission.delete_image = truthy(&value),
            _ => {} // ignore unknown fields
        }
    }
    Ok(())
}

async fn list_items<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
) -> ApiResult {
    ok(catalog.list_items()?)
}

async fn item_detail<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.item_detail(&id)?)
}

async fn item_form_options<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
) -> ApiResult {
    ok(catalog.item_form_options()?)
}

async fn create_item<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let multipart = multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let submission = read_item_submission(catalog.images().image_dir(), multipart).await?;
    let write = catalog.create_item(submission.form, submission.upload)?;
    created(write.item.url(), write)
}

async fn item_current<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    let item = catalog.item(&id)?;
    let options = catalog.item_form_options()?;
    ok(json!({ "item": item, "categories": options.categories }))
}

async fn update_item<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let multipart = multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let submission = read_item_submission(catalog.images().image_dir(), multipart).await?;
    let write = catalog.update_item(
        &id,
        submission.form,
        submission.upload,
        submission.delete_image,
    )?;
    ok(json!({ "url": write.item.url(), "data": write }))
}

async fn item_delete_preview<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.item_delete_preview(&id)?)
}

async fn delete_item<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    let write = catalog.delete_item(&id)?;
    ok(json!({ "url": "/catalog/items", "data": write }))
}

// =============================================================================
// Item instances
// =============================================================================

async fn list_instances<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
) -> ApiResult {
    ok(catalog.list_instances()?)
}

async fn instance_detail<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.instance_detail(&id)?)
}

async fn instance_form_options<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
) -> ApiResult {
    ok(catalog.instance_form_options()?)
}

async fn create_instance<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    payload: Result<Json<InstanceForm>, JsonRejection>,
) -> ApiResult {
    let form = json_body(payload)?;
    let instance = catalog.create_instance(form)?;
    created(instance.url(), instance)
}

async fn instance_current<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    let instance = catalog.instance(&id)?;
    let options = catalog.instance_form_options()?;
    ok(json!({ "instance": instance, "items": options.items, "colors": options.colors }))
}

async fn update_instance<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
    payload: Result<Json<InstanceForm>, JsonRejection>,
) -> ApiResult {
    let form = json_body(payload)?;
    let instance = catalog.update_instance(&id, form)?;
    ok(json!({ "url": instance.url(), "data": instance }))
}

async fn instance_delete_preview<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    ok(catalog.instance_detail(&id)?)
}

async fn delete_instance<S: DocumentStore + 'static, F: FileStorage + 'static>(
    State(catalog): Shared<S, F>,
    Path(id): Path<String>,
) -> ApiResult {
    let instance = catalog.delete_instance(&id)?;
    ok(json!({ "url": "/catalog/iteminstances", "data": instance }))
}
