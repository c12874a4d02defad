// Shared fixtures for the pipeline integration tests

pub mod pipeline_tests;

use async_trait::async_trait;
use listing_watcher::{
    config::MarketplaceConfig,
    dedup_store::DedupStore,
    models::Query,
    plugins::{NotificationDispatcher, NotificationEvent, NotifierPlugin},
    AppError, Scanner,
};
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_PATH: &str = "/api/v2/catalog/items";

/// Shared record of every delivery attempt, as "channel:item_id".
pub type DeliveryLog = Arc<Mutex<Vec<String>>>;

pub struct RecordingNotifier {
    pub plugin_type: &'static str,
    pub fail: bool,
    pub log: DeliveryLog,
}

#[async_trait]
impl NotifierPlugin for RecordingNotifier {
    fn name(&self) -> &str {
        "Recording Notifier"
    }

    fn plugin_type(&self) -> &str {
        self.plugin_type
    }

    async fn notify(&self, event: &NotificationEvent) -> listing_watcher::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.plugin_type, event.item.id));
        if self.fail {
            Err(AppError::Delivery {
                channel: self.plugin_type.to_string(),
                message: "simulated outage".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Dispatcher with one recording channel per `(type, fail)` pair.
pub fn recording_dispatcher(channels: &[(&'static str, bool)], log: &DeliveryLog) -> NotificationDispatcher {
    let mut dispatcher = NotificationDispatcher::new();
    for &(plugin_type, fail) in channels {
        dispatcher.register_notifier(Box::new(RecordingNotifier {
            plugin_type,
            fail,
            log: Arc::clone(log),
        }));
    }
    dispatcher
}

pub fn new_log() -> DeliveryLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn deliveries(log: &DeliveryLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn item_json(id: u64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "url": format!("u{}", id),
        "price": {"amount": "10", "currency_code": "EUR"},
        "photo": {"full_size_url": format!("img{}", id)}
    })
}

pub fn text_query(search_text: &str) -> Query {
    Query {
        search_text: search_text.to_string(),
        ..Query::default()
    }
}

/// Marketplace double: session bootstrap on `/` and no catalog routes yet.
pub async fn start_marketplace() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "access_token_web=test-token; Path=/"),
        )
        .mount(&server)
        .await;
    server
}

/// Serve `items` for catalog requests whose `search_text` matches.
pub async fn mount_search(server: &MockServer, search_text: &str, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("search_text", search_text))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

pub fn build_scanner(
    base_url: &str,
    queries: Vec<Query>,
    items_file: &Path,
    dispatcher: NotificationDispatcher,
) -> Scanner {
    let mut marketplace = MarketplaceConfig::new(base_url);
    marketplace.request_timeout = 5;

    Scanner::new(&marketplace, queries, DedupStore::new(items_file), dispatcher)
        .expect("scanner should build")
}

pub fn read_ids(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// In-memory sink for the events a test emits through `tracing`.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

pub struct CapturedWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl CapturedLogs {
    /// Install as the default subscriber for the current thread until the
    /// guard is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}
