use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

#[path = "../src/worker.rs"]
mod worker;

use lb_client::ApiClient;
use lb_core::api::{HumanContactUpdate, LoginRequest, ReportKind};
use worker::{handle, Action, Request, Response};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn backend(hits: Arc<Mutex<Vec<String>>>) -> Router {
    Router::new()
        .route(
            "/api/auth/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "ok" {
                    Json(json!({"access_token": "t", "token_type": "bearer"})).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        )
        .route(
            "/api/dashboard/stats",
            get(|| async { Json(json!({"total_leads": 1, "hot_leads": 1})) }),
        )
        .route(
            "/api/leads",
            get(|| async {
                Json(json!([{"id": 9, "phone_number": "5511900000009", "interest_level": "hot"}]))
            }),
        )
        .route(
            "/api/leads/{id}/conversation",
            get(|Path(id): Path<String>| async move {
                if id == "9" {
                    Json(json!({"lead_id": 9, "messages": []})).into_response()
                } else {
                    StatusCode::NOT_FOUND.into_response()
                }
            }),
        )
        .route(
            "/api/leads/{id}/human-contact",
            put(
                |State(hits): State<Arc<Mutex<Vec<String>>>>, Path(id): Path<String>| async move {
                    hits.lock().unwrap().push(format!("contact:{id}"));
                    Json(json!({}))
                },
            ),
        )
        .route(
            "/api/reports/leads/excel",
            get(|| async {
                (
                    [(header::CONTENT_DISPOSITION, "attachment; filename=leads.xlsx")],
                    vec![1u8, 2, 3],
                )
            }),
        )
        .with_state(hits)
}

#[tokio::test]
async fn login_maps_401_to_fixed_message() {
    let base = serve(backend(Arc::default())).await;
    let mut client = ApiClient::new(&base, None).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let bad = Request::Login(LoginRequest { username: "ana".into(), password: "no".into() });
    match handle(&mut client, dir.path(), bad).await {
        Response::LoginFailed(msg) => assert_eq!(msg, "Invalid username or password"),
        other => panic!("unexpected {other:?}"),
    }

    let good = Request::Login(LoginRequest { username: "ana".into(), password: "ok".into() });
    match handle(&mut client, dir.path(), good).await {
        Response::LoggedIn { username } => assert_eq!(username, "ana"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn dashboard_and_conversation() {
    let base = serve(backend(Arc::default())).await;
    let mut client = ApiClient::new(&base, None).unwrap();
    let dir = tempfile::tempdir().unwrap();

    match handle(&mut client, dir.path(), Request::LoadDashboard).await {
        Response::Dashboard(Ok((stats, leads))) => {
            assert_eq!(stats.total_leads, 1);
            assert_eq!(stats.no_sale, 0);
            assert_eq!(leads.len(), 1);
        }
        other => panic!("unexpected {other:?}"),
    }

    match handle(&mut client, dir.path(), Request::LoadConversation("9".into())).await {
        Response::Conversation { lead_id, result: Ok(conv) } => {
            assert_eq!(lead_id, "9");
            assert!(conv.messages.is_empty());
        }
        other => panic!("unexpected {other:?}"),
    }

    match handle(&mut client, dir.path(), Request::LoadConversation("404".into())).await {
        Response::Conversation { lead_id, result: Err(msg) } => {
            assert_eq!(lead_id, "404");
            assert!(!msg.is_empty());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn mutation_reports_completion() {
    let hits: Arc<Mutex<Vec<String>>> = Arc::default();
    let base = serve(backend(hits.clone())).await;
    let mut client = ApiClient::new(&base, None).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let req = Request::SetHumanContact(
        "9".into(),
        HumanContactUpdate { human_contacted: true, notes: None },
    );
    match handle(&mut client, dir.path(), req).await {
        Response::Completed { action, result } => {
            assert_eq!(action, Action::HumanContact);
            assert!(result.is_ok());
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(hits.lock().unwrap().as_slice(), ["contact:9".to_string()]);

    // Unknown route: the failure still comes back as a completion.
    match handle(&mut client, dir.path(), Request::DeleteUser("u1".into())).await {
        Response::Completed { action, result } => {
            assert_eq!(action, Action::UserDeleted);
            assert!(result.is_err());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn report_is_written_to_reports_dir() {
    let base = serve(backend(Arc::default())).await;
    let mut client = ApiClient::new(&base, None).unwrap();
    let dir = tempfile::tempdir().unwrap();

    match handle(&mut client, dir.path(), Request::DownloadReport(ReportKind::Leads)).await {
        Response::ReportSaved(Ok(path)) => {
            assert_eq!(path, dir.path().join("leads.xlsx"));
            assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        }
        other => panic!("unexpected {other:?}"),
    }

    match handle(&mut client, dir.path(), Request::DownloadReport(ReportKind::Appointments)).await
    {
        Response::ReportSaved(Err(msg)) => assert!(!msg.is_empty()),
        other => panic!("unexpected {other:?}"),
    }
}
