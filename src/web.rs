//! HTTP front end.
//!
//! Each request makes at most one store call, then either redirects back to
//! `/` or renders an error page. Validation lives in the store; this layer
//! only pulls the raw form field or path id out of the request.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::StoreError;
use crate::render::Renderer;
use crate::store::{ItemId, ItemStore};

/// Shown instead of backend error details.
const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong while accessing the item database.";

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>, renderer: Renderer) -> Self {
        Self {
            store,
            renderer: Arc::new(renderer),
        }
    }

    /// Turn a store failure into an error page.
    fn fail(&self, err: StoreError) -> ErrorPage {
        let status = status_for(&err);
        let message = if err.is_user_facing() {
            err.to_string()
        } else {
            error!("Store operation failed: {}", err);
            INTERNAL_ERROR_MESSAGE.to_string()
        };

        match self.renderer.render_error(&message) {
            Ok(body) => ErrorPage { status, body },
            Err(e) => ErrorPage::template_failure(e),
        }
    }
}

/// HTTP status reported alongside each kind of store failure.
///
/// Error views carry a 4xx/5xx status on purpose instead of a bare 200, so
/// scripted clients can tell a rejected add from a successful one. Browsers
/// render the error page either way.
pub fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::EmptyValue => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        StoreError::TooMany | StoreError::Duplicate(_) => StatusCode::CONFLICT,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::ConnectionError(_) | StoreError::DatabaseError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// A rendered error view with its status code.
#[derive(Debug)]
pub struct ErrorPage {
    status: StatusCode,
    body: String,
}

impl ErrorPage {
    fn template_failure(err: tera::Error) -> Self {
        error!("Failed to render template: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        (self.status, Html(self.body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct NewItemForm {
    new_item: String,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/items/add", get(add_item_form).post(add_item))
        .route("/items/{id}/delete", get(delete_item))
        .route("/items/{id}/swap-state", get(swap_item_state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the application until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

// HTTP handlers

async fn index(State(state): State<AppState>) -> Result<Html<String>, ErrorPage> {
    state
        .store
        .ensure_initialized()
        .await
        .map_err(|e| state.fail(e))?;
    let items = state.store.list_all().await.map_err(|e| state.fail(e))?;

    state
        .renderer
        .render(&items)
        .map(Html)
        .map_err(ErrorPage::template_failure)
}

/// Adding only happens on POST; a plain GET goes back to the list.
async fn add_item_form() -> Redirect {
    Redirect::to("/")
}

async fn add_item(
    State(state): State<AppState>,
    Form(form): Form<NewItemForm>,
) -> Result<Redirect, ErrorPage> {
    let item = state
        .store
        .add(&form.new_item)
        .await
        .map_err(|e| state.fail(e))?;
    info!(id = item.id, "Added item '{}'", item.value);

    Ok(Redirect::to("/"))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Redirect, ErrorPage> {
    info!("Deleting item {}...", id);
    state
        .store
        .delete_by_id(id)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(Redirect::to("/"))
}

async fn swap_item_state(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Redirect, ErrorPage> {
    let item = state
        .store
        .swap_state(id)
        .await
        .map_err(|e| state.fail(e))?;
    info!(
        "Swapped item {} state (current state: {})",
        id,
        u8::from(item.state)
    );

    Ok(Redirect::to("/"))
}
