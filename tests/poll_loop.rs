//! End-to-end poll cycles against mock status and Telegram servers.
//!
//! Both HTTP collaborators are real clients pointed at wiremock, so these
//! tests cover the wire format as well as the loop's failure policy.

use std::time::Duration;

use homework_watch::config::Config;
use homework_watch::endpoint::EndpointClient;
use homework_watch::errors::CycleError;
use homework_watch::jobs::poller::{CycleOutcome, Poller};
use homework_watch::notification::telegram::TelegramNotifier;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATUS_PATH: &str = "/api/user_api/homework_statuses/";
const SEND_PATH: &str = "/botbot-token/sendMessage";
const START: i64 = 500;

struct Harness {
    status_server: MockServer,
    telegram_server: MockServer,
}

impl Harness {
    async fn start() -> Self {
        Self {
            status_server: MockServer::start().await,
            telegram_server: MockServer::start().await,
        }
    }

    fn config(&self) -> Config {
        let status_url = format!("{}{}", self.status_server.uri(), STATUS_PATH);
        let telegram_url = self.telegram_server.uri();
        Config::from_lookup(move |key| match key {
            "PRACTICUM_TOKEN" => Some("practicum-token".into()),
            "TELEGRAM_TOKEN" => Some("bot-token".into()),
            "TELEGRAM_CHAT_ID" => Some("777".into()),
            "HOMEWORK_ENDPOINT" => Some(status_url.clone()),
            "TELEGRAM_API_URL" => Some(telegram_url.clone()),
            "HOMEWORK_REQUEST_TIMEOUT_SECS" => Some("5".into()),
            _ => None,
        })
        .expect("test config should be valid")
    }

    fn poller(&self) -> Poller<EndpointClient, TelegramNotifier> {
        let cfg = self.config();
        let endpoint =
            EndpointClient::new(&cfg.endpoint, &cfg.practicum_token, cfg.request_timeout).unwrap();
        let notifier = TelegramNotifier::new(
            &cfg.telegram_api_url,
            &cfg.telegram_token,
            &cfg.telegram_chat_id,
            cfg.request_timeout,
        )
        .unwrap();
        Poller::new(endpoint, notifier, Duration::from_millis(10), START)
    }

    async fn sent_texts(&self) -> Vec<String> {
        self.telegram_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|req| req.body_json::<Value>().ok())
            .filter_map(|body| body["text"].as_str().map(String::from))
            .collect()
    }
}

async fn mount_telegram_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .mount(server)
        .await;
}

fn reviewing_report(current_date: i64) -> Value {
    json!({
        "homeworks": [{"homework_name": "proj1", "status": "reviewing"}],
        "current_date": current_date
    })
}

#[tokio::test]
async fn test_status_change_delivered_once_then_suppressed() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .and(header("Authorization", "OAuth practicum-token"))
        .and(query_param("from_date", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviewing_report(1000)))
        .expect(1)
        .mount(&h.status_server)
        .await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .and(query_param("from_date", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviewing_report(1100)))
        .expect(1)
        .mount(&h.status_server)
        .await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_json(json!({
            "chat_id": "777",
            "text": "Status changed for \"proj1\". Работа взята на проверку ревьюером."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .expect(1)
        .mount(&h.telegram_server)
        .await;

    let mut poller = h.poller();

    let first = poller.tick().await.unwrap();
    assert!(matches!(first, CycleOutcome::Notified(_)));
    assert_eq!(poller.cursor(), 1000);

    let second = poller.tick().await.unwrap();
    assert_eq!(second, CycleOutcome::Unchanged);
    assert_eq!(poller.cursor(), 1100);
    assert_eq!(h.sent_texts().await.len(), 1);
}

#[tokio::test]
async fn test_503_reports_failure_and_keeps_cursor() {
    let h = Harness::start().await;
    mount_telegram_ok(&h.telegram_server).await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&h.status_server)
        .await;

    let mut poller = h.poller();

    for _ in 0..2 {
        let err = poller.tick().await.unwrap_err();
        assert!(matches!(err, CycleError::EndpointUnavailable(_)), "got {:?}", err);
        assert_eq!(poller.cursor(), START);
    }

    let sent = h.sent_texts().await;
    assert_eq!(sent.len(), 2, "one failure report per failed cycle");
    assert!(sent.iter().all(|t| t.starts_with("Monitor failure: ")), "{:?}", sent);

    let requests = h.status_server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| r.url.query() == Some("from_date=500")));
}

#[tokio::test]
async fn test_empty_window_advances_cursor_silently() {
    let h = Harness::start().await;
    mount_telegram_ok(&h.telegram_server).await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"homeworks": [], "current_date": 900})),
        )
        .mount(&h.status_server)
        .await;

    let mut poller = h.poller();
    assert_eq!(poller.tick().await.unwrap(), CycleOutcome::NoUpdates);
    assert_eq!(poller.cursor(), 900);
    assert!(h.sent_texts().await.is_empty());
}

#[tokio::test]
async fn test_telegram_outage_does_not_record_message() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviewing_report(1000)))
        .mount(&h.status_server)
        .await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "ok": false,
            "error_code": 500,
            "description": "Internal Server Error"
        })))
        .mount(&h.telegram_server)
        .await;

    let mut poller = h.poller();
    let err = poller.tick().await.unwrap_err();

    assert!(matches!(err, CycleError::DeliveryFailure(_)));
    assert_eq!(poller.last_message(), None);
    assert_eq!(poller.cursor(), START);
    // the status message and the failure report were both attempted
    assert_eq!(h.sent_texts().await.len(), 2);
}

#[tokio::test]
async fn test_loop_survives_failures_until_shutdown() {
    let h = Harness::start().await;
    mount_telegram_ok(&h.telegram_server).await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&h.status_server)
        .await;

    let poller = h.poller();
    let shutdown = tokio::time::sleep(Duration::from_millis(300));
    tokio::time::timeout(Duration::from_secs(10), poller.run(shutdown))
        .await
        .expect("loop should exit on shutdown");

    let requests = h.status_server.received_requests().await.unwrap();
    assert!(requests.len() >= 2, "loop kept polling after failures");
}
