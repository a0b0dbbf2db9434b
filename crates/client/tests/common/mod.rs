use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use clinica_client::api::BackendApi;

/// Patients served by the fake backend, ordered by name.
pub const PATIENTS: [&str; 12] = [
    "Ana", "Bruno", "Carla", "Diego", "Elisa", "Fábio", "Gabi", "Hugo", "Iara", "João", "Karen",
    "Lucas",
];

/// What the fake backend saw.
#[derive(Debug, Default)]
pub struct Recorded {
    pub list_params: Vec<(String, HashMap<String, String>)>,
    pub bodies: Vec<(String, Value)>,
}

pub type SharedRecorded = Arc<Mutex<Recorded>>;

/// A backend answering like the clinic API.
///
/// - `pacientes` pages through [`PATIENTS`] inside a success envelope and
///   honours `search`.
/// - `mapeamentos` answers with a bare page (no envelope).
/// - `planos` fails with a 403 failure envelope.
/// - `arquivos` fails with a plain-text 500.
/// - anything else answers with an empty enveloped page.
pub fn fake_backend(recorded: SharedRecorded) -> Router {
    Router::new()
        .route("/api/divergencias/auditoria", post(audit))
        .route("/api/carteirinhas/migracao", post(migrate))
        .route("/api/{resource}", get(list))
        .with_state(recorded)
}

/// Serve the fake backend on an ephemeral port and point a client at it.
pub async fn spawn_backend() -> (BackendApi, SharedRecorded) {
    let recorded = SharedRecorded::default();
    let app = fake_backend(Arc::clone(&recorded));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (BackendApi::new(format!("http://{addr}/api/")), recorded)
}

async fn list(
    State(recorded): State<SharedRecorded>,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    recorded
        .lock()
        .unwrap()
        .list_params
        .push((resource.clone(), params.clone()));

    let page: i64 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: i64 = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let offset: i64 = params.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);

    match resource.as_str() {
        "pacientes" => {
            let search = params.get("search").map(|s| s.to_lowercase());
            let matching: Vec<(usize, &str)> = PATIENTS
                .iter()
                .enumerate()
                .filter(|(_, nome)| {
                    search
                        .as_deref()
                        .map_or(true, |s| nome.to_lowercase().contains(s))
                })
                .map(|(i, nome)| (i, *nome))
                .collect();
            let total = matching.len() as i64;
            let items: Vec<Value> = matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .map(|(i, nome)| json!({ "id": i + 1, "nome": nome }))
                .collect();
            Json(json!({ "success": true, "data": page_json(items, total, page, limit) }))
                .into_response()
        }
        "mapeamentos" => Json(page_json(
            vec![json!({ "id": 1, "codigoOrigem": "10101012", "codigoDestino": "TUSS-1" })],
            1,
            page,
            limit,
        ))
        .into_response(),
        "planos" => (
            StatusCode::FORBIDDEN,
            Json(json!({ "success": false, "error": "Acesso negado", "message": "perfil sem permissão" })),
        )
            .into_response(),
        "arquivos" => {
            (StatusCode::INTERNAL_SERVER_ERROR, "bucket unavailable").into_response()
        }
        _ => Json(json!({ "success": true, "data": page_json(Vec::new(), 0, page, limit) }))
            .into_response(),
    }
}

async fn audit(State(recorded): State<SharedRecorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded
        .lock()
        .unwrap()
        .bodies
        .push(("auditoria".to_string(), body));
    Json(json!({
        "success": true,
        "data": { "checked": 120, "divergencesFound": 4 },
        "message": "Auditoria concluída"
    }))
}

async fn migrate(State(recorded): State<SharedRecorded>, Json(body): Json<Value>) -> Json<Value> {
    let count = body["numeros"].as_array().map_or(0, Vec::len) as i64;
    let dry_run = body["dryRun"].as_bool().unwrap_or(false);
    recorded
        .lock()
        .unwrap()
        .bodies
        .push(("migracao".to_string(), body));
    Json(json!({
        "success": true,
        "data": {
            "eligible": count,
            "migrated": if dry_run { 0 } else { count },
            "skipped": 0
        }
    }))
}

fn page_json(items: Vec<Value>, total: i64, page: i64, limit: i64) -> Value {
    let total_pages = if total == 0 { 0 } else { (total - 1) / limit + 1 };
    json!({
        "items": items,
        "total": total,
        "page": page,
        "totalPages": total_pages,
        "hasMore": page * limit < total
    })
}
