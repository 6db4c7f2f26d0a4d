use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::data::{Placement, TimetableInput, TimetableOutput};
use crate::generator;
use crate::store::PlacementStore;

// One mutex around the store serializes concurrent generation requests;
// interleaved replace phases would corrupt the persisted timetable.
type SharedStore = Arc<Mutex<PlacementStore>>;

async fn generate_handler(
    State(store): State<SharedStore>,
    Json(input): Json<TimetableInput>,
) -> Result<Json<TimetableOutput>, (axum::http::StatusCode, String)> {
    let mut store = store.lock().await;
    match generator::run(&input, &mut store) {
        Ok(output) => Ok(Json(output)),
        Err(e) => Err((axum::http::StatusCode::BAD_REQUEST, e.to_string())),
    }
}

async fn timetable_handler(State(store): State<SharedStore>) -> Json<Vec<Placement>> {
    Json(store.lock().await.placements().to_vec())
}

pub async fn run_server() {
    let store: SharedStore = Arc::new(Mutex::new(PlacementStore::new()));
    let app = Router::new()
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable", get(timetable_handler))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .unwrap();

    println!("Server running at http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
