//! In-process stand-in for the Bot API, served by axum.

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    axum::{
        Json, Router,
        body::Bytes,
        extract::State,
        http::{StatusCode, Uri},
        response::{IntoResponse, Response},
    },
    serde_json::{Value, json},
    teloxide::Bot,
    tokio::{sync::oneshot, task::JoinHandle},
};

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub raw: String,
}

#[derive(Clone, Default)]
struct Shared {
    requests: Arc<Mutex<Vec<Captured>>>,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    updates: Arc<Mutex<VecDeque<Value>>>,
}

pub struct MockTelegramApi {
    state: Shared,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl MockTelegramApi {
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = Router::new()
            .fallback(telegram_api_handler)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock telegram api");
        });

        Self {
            state,
            addr,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        }
    }

    pub fn api_url(&self) -> reqwest::Url {
        reqwest::Url::parse(&format!("http://{}/", self.addr)).expect("parse api url")
    }

    pub fn bot(&self) -> Bot {
        Bot::new(TOKEN).set_api_url(self.api_url())
    }

    pub fn serve_file(&self, path: &str, contents: Vec<u8>) {
        self.state
            .files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents);
    }

    /// Queue an update for the next `getUpdates` call.
    pub fn push_update(&self, update: Value) {
        self.state.updates.lock().unwrap().push_back(update);
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn raw_bodies(&self, method: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .map(|r| r.raw)
            .collect()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            server.await.expect("server join");
        }
    }
}

/// JSON bodies of every captured call to `method`.
pub fn captured(api: &MockTelegramApi, method: &str) -> Vec<Value> {
    api.raw_bodies(method)
        .iter()
        .map(|raw| serde_json::from_str(raw).expect("json request body"))
        .collect()
}

fn user_json(id: i64, name: &str) -> Value {
    json!({ "id": id, "is_bot": false, "first_name": name, "username": name.to_lowercase() })
}

async fn telegram_api_handler(State(state): State<Shared>, uri: Uri, body: Bytes) -> Response {
    let path = uri.path();
    if let Some(file_path) = path.strip_prefix(&format!("/file/bot{TOKEN}/")) {
        let contents = state.files.lock().unwrap().get(file_path).cloned();
        return match contents {
            Some(contents) => contents.into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        };
    }

    let method = path.rsplit('/').next().unwrap_or_default().to_string();
    state.requests.lock().unwrap().push(Captured {
        method: method.clone(),
        raw: String::from_utf8_lossy(&body).into_owned(),
    });
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let result = match method.as_str() {
        "GetMe" => json!({
            "id": 4242,
            "is_bot": true,
            "first_name": "Herald",
            "username": "herald_test_bot",
            "can_join_groups": true,
            "can_read_all_group_messages": false,
            "supports_inline_queries": false,
            "can_connect_to_business": false,
            "has_main_web_app": false
        }),
        "GetUpdates" => {
            let next = state.updates.lock().unwrap().pop_front();
            match next {
                Some(update) => json!([update]),
                None => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    json!([])
                },
            }
        },
        "SendMessage" => json!({
            "message_id": 1,
            "date": 0,
            "chat": { "id": request["chat_id"].as_i64().unwrap_or(42), "type": "private" },
            "text": request["text"].as_str().unwrap_or_default()
        }),
        "SendDocument" => json!({
            "message_id": 2,
            "date": 0,
            "chat": { "id": 42, "type": "private" },
            "document": { "file_id": "uploaded", "file_unique_id": "uploaded-unique" }
        }),
        "GetFile" => json!({
            "file_id": request["file_id"].as_str().unwrap_or_default(),
            "file_unique_id": "file-unique",
            "file_size": 7,
            "file_path": "documents/backup.json"
        }),
        "GetChatAdministrators" => json!([{
            "status": "creator",
            "user": user_json(1001, "Alice"),
            "is_anonymous": false
        }]),
        _ => json!(true),
    };

    Json(json!({ "ok": true, "result": result })).into_response()
}
