//! HTTP routing
//!
//! Maps method + path onto the controllers and turns their [`Outcome`] into
//! a response: rendered HTML, a `303 See Other` redirect, or an error page.
//!
//! ## Routes
//!
//! - `GET /` redirects to `/inventory`
//! - `GET /inventory` shows entity counts
//! - `GET /inventory/{games,genres,platforms}` lists an entity
//! - `GET|POST /inventory/{game,genre,platform}/create`
//! - `GET /inventory/{game,genre,platform}/:id`
//! - `GET|POST /inventory/{game,genre,platform}/:id/update`
//! - `GET|POST /inventory/{game,genre,platform}/:id/delete`

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};

use crate::controllers;
use crate::error::{Error, Result};
use crate::validation::{escape, FormData};
use crate::views::{Outcome, Page, TemplateEngine};
use crate::{Config, Inventory};

/// Everything a request handler needs
pub struct AppState {
    pub inventory: Inventory,
    pub views: TemplateEngine,
}

type Shared = Arc<AppState>;

/// Url-encoded body as ordered pairs, so repeated checkbox keys survive
type Pairs = Form<Vec<(String, String)>>;

impl AppState {
    pub fn new(inventory: Inventory, views: TemplateEngine) -> Self {
        Self { inventory, views }
    }

    /// Open the inventory and templates described by `config`
    pub async fn from_config(config: &Config) -> Result<Self> {
        let inventory = Inventory::open(config).await?;
        let views = match &config.templates {
            Some(dir) => TemplateEngine::with_overrides(dir)?,
            None => TemplateEngine::builtin()?,
        };
        Ok(Self::new(inventory, views))
    }

    fn respond(&self, result: Result<Outcome>) -> Response {
        let error = match result {
            Ok(Outcome::Redirect(to)) => return Redirect::to(&to).into_response(),
            Ok(Outcome::Render(page)) => match self.views.render(&page) {
                Ok(html) => return Html(html).into_response(),
                Err(e) => e,
            },
            Err(e) => e,
        };
        self.error_page(error)
    }

    fn error_page(&self, error: Error) -> Response {
        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let title = if status == StatusCode::NOT_FOUND {
            tracing::debug!("not found: {}", error);
            "Not Found"
        } else {
            tracing::error!("request failed: {}", error);
            "Something went wrong"
        };

        // Messages can echo raw path segments
        let page = Page::new("error.html", title)
            .with("message", escape(&error.to_string()))
            .with("status", status.as_u16());
        match self.views.render(&page) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(_) => (status, error.to_string()).into_response(),
        }
    }
}

/// The list, create, detail, update and delete routes of one entity
macro_rules! entity_routes {
    ($router:expr, $module:ident, $slug:literal, $plural:literal) => {{
        use controllers::$module;

        $router
            .route(
                concat!("/inventory/", $plural),
                get(|State(state): State<Shared>| async move {
                    state.respond($module::list(&state.inventory).await)
                }),
            )
            .route(
                concat!("/inventory/", $slug, "/create"),
                get(|State(state): State<Shared>| async move {
                    state.respond($module::create_get(&state.inventory).await)
                })
                .post(|State(state): State<Shared>, Form(pairs): Pairs| async move {
                    let form = FormData::from_pairs(pairs);
                    state.respond($module::create_post(&state.inventory, form).await)
                }),
            )
            .route(
                concat!("/inventory/", $slug, "/:id"),
                get(|State(state): State<Shared>, Path(id): Path<String>| async move {
                    state.respond($module::detail(&state.inventory, &id).await)
                }),
            )
            .route(
                concat!("/inventory/", $slug, "/:id/update"),
                get(|State(state): State<Shared>, Path(id): Path<String>| async move {
                    state.respond($module::update_get(&state.inventory, &id).await)
                })
                .post(
                    |State(state): State<Shared>, Path(id): Path<String>, Form(pairs): Pairs| async move {
                        let form = FormData::from_pairs(pairs);
                        state.respond($module::update_post(&state.inventory, &id, form).await)
                    },
                ),
            )
            .route(
                concat!("/inventory/", $slug, "/:id/delete"),
                get(|State(state): State<Shared>, Path(id): Path<String>| async move {
                    state.respond($module::delete_get(&state.inventory, &id).await)
                })
                .post(
                    |State(state): State<Shared>, Path(id): Path<String>, Form(pairs): Pairs| async move {
                        let form = FormData::from_pairs(pairs);
                        state.respond($module::delete_post(&state.inventory, &id, form).await)
                    },
                ),
            )
    }};
}

/// Build the application router
pub fn router(state: Shared) -> Router {
    let router = Router::new()
        .route("/", get(|| async { Redirect::to("/inventory") }))
        .route(
            "/inventory",
            get(|State(state): State<Shared>| async move {
                state.respond(controllers::index(&state.inventory).await)
            }),
        );

    let router = entity_routes!(router, game, "game", "games");
    let router = entity_routes!(router, genre, "genre", "genres");
    let router = entity_routes!(router, platform, "platform", "platforms");

    router.with_state(state)
}

/// Serve the inventory over HTTP at `addr` (e.g. `"127.0.0.1:3000"`)
pub async fn serve(state: Shared, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
