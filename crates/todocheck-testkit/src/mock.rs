//! Mock todo backend
//!
//! An in-process axum server implementing the todo contract, used to run the
//! suite end to end without an external server. [`MockBehavior`] switches
//! individual parts of the contract off so tests can check that the matching
//! expectations fail.
//!
//! # Example
//!
//! ```rust,no_run
//! use todocheck_testkit::mock::{MockBackend, MockBehavior};
//!
//! # async fn example() -> std::io::Result<()> {
//! // Conformant backend
//! let backend = MockBackend::start().await?;
//! println!("collection at {}", backend.url());
//!
//! // Backend that forgets to send Location
//! let behavior = MockBehavior::default().with_location_header(false);
//! let broken = MockBackend::start_with(behavior).await?;
//! # Ok(())
//! # }
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Which parts of the contract the mock honours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBehavior {
    /// Answer `OPTIONS` with wildcard CORS headers
    pub cors: bool,
    /// Send `Location` on `201 Created`
    pub location_header: bool,
    /// Actually remove items on `DELETE`
    pub deletes: bool,
    /// Apply `PUT`/`PATCH` bodies
    pub updates: bool,
    /// Route `PATCH` at all (otherwise `405`)
    pub patch: bool,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            cors: true,
            location_header: true,
            deletes: true,
            updates: true,
            patch: true,
        }
    }
}

impl MockBehavior {
    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_location_header(mut self, location_header: bool) -> Self {
        self.location_header = location_header;
        self
    }

    pub fn with_deletes(mut self, deletes: bool) -> Self {
        self.deletes = deletes;
        self
    }

    pub fn with_updates(mut self, updates: bool) -> Self {
        self.updates = updates;
        self
    }

    pub fn with_patch(mut self, patch: bool) -> Self {
        self.patch = patch;
        self
    }
}

/// A stored todo item as the mock serves it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockTodo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Body accepted by `POST`, `PUT` and `PATCH`
#[derive(Debug, Default, Deserialize)]
struct TodoInput {
    title: Option<String>,
    completed: Option<bool>,
    order: Option<i64>,
}

#[derive(Debug, Default)]
struct Store {
    items: BTreeMap<u64, MockTodo>,
    next_id: u64,
}

#[derive(Debug, Clone)]
struct MockState {
    store: Arc<RwLock<Store>>,
    /// Collection URL, e.g. `http://127.0.0.1:4242/todos`
    base: Arc<str>,
    behavior: MockBehavior,
}

/// Running mock backend, stopped when dropped
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Start a conformant backend on an ephemeral local port
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(MockBehavior::default()).await
    }

    /// Start a backend with the given behaviour
    pub async fn start_with(behavior: MockBehavior) -> std::io::Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let state = MockState {
            store: Arc::new(RwLock::new(Store::default())),
            base: format!("http://{addr}/todos").into(),
            behavior,
        };
        let app = create_router(state.clone());

        debug!(%addr, ?behavior, "Starting mock todo backend");
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!(error = %e, "Mock todo backend stopped");
            }
        });

        Ok(Self { addr, state, task })
    }

    /// Collection URL
    pub fn url(&self) -> String {
        self.state.base.to_string()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of stored items
    pub async fn item_count(&self) -> usize {
        self.state.store.read().await.items.len()
    }

    /// Snapshot of stored items in creation order
    pub async fn items(&self) -> Vec<MockTodo> {
        self.state.store.read().await.items.values().cloned().collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn create_router(state: MockState) -> Router {
    let behavior = state.behavior;

    let mut item = get(get_todo).put(update_todo).delete(delete_todo);
    if behavior.patch {
        item = item.patch(update_todo);
    }

    let router = Router::new()
        .route("/todos", get(list_todos).post(create_todo).delete(clear_todos))
        .route("/todos/{id}", item)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if behavior.cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

async fn list_todos(State(state): State<MockState>) -> Json<Vec<MockTodo>> {
    Json(state.store.read().await.items.values().cloned().collect())
}

async fn create_todo(State(state): State<MockState>, Json(input): Json<TodoInput>) -> Response {
    let Some(title) = input.title else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let todo = {
        let mut store = state.store.write().await;
        store.next_id += 1;
        let id = store.next_id;
        let todo = MockTodo {
            id,
            title,
            completed: input.completed.unwrap_or(false),
            url: format!("{}/{id}", state.base),
            order: input.order,
        };
        store.items.insert(id, todo.clone());
        todo
    };

    let location = HeaderValue::from_str(&todo.url).ok();
    let mut response = (StatusCode::CREATED, Json(todo)).into_response();
    if state.behavior.location_header {
        if let Some(location) = location {
            response.headers_mut().insert(header::LOCATION, location);
        }
    }
    response
}

async fn clear_todos(State(state): State<MockState>) -> StatusCode {
    if state.behavior.deletes {
        state.store.write().await.items.clear();
    }
    StatusCode::NO_CONTENT
}

async fn get_todo(State(state): State<MockState>, Path(id): Path<u64>) -> Response {
    match state.store.read().await.items.get(&id) {
        Some(todo) => Json(todo.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_todo(
    State(state): State<MockState>,
    Path(id): Path<u64>,
    Json(input): Json<TodoInput>,
) -> Response {
    let mut store = state.store.write().await;
    let Some(todo) = store.items.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if state.behavior.updates {
        if let Some(title) = input.title {
            todo.title = title;
        }
        if let Some(completed) = input.completed {
            todo.completed = completed;
        }
        if input.order.is_some() {
            todo.order = input.order;
        }
    }

    Json(todo.clone()).into_response()
}

async fn delete_todo(State(state): State<MockState>, Path(id): Path<u64>) -> StatusCode {
    let mut store = state.store.write().await;
    if !store.items.contains_key(&id) {
        return StatusCode::NOT_FOUND;
    }
    if state.behavior.deletes {
        store.items.remove(&id);
    }
    StatusCode::NO_CONTENT
}
