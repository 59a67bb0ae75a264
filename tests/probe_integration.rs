//! Status probe tests against a mock status API.

use axum::http::Method;
use std::time::Duration;

use status_relay::commands::handlers::{format_liveness, SERVER_DOWN};
use status_relay::probe::{McStatusProbe, ProbeError, ServerAddress, StatusProbe};

mod common;

const ONLINE_BODY: &str = r#"{
    "online": true,
    "host": "play.example.net",
    "port": 25565,
    "eula_blocked": false,
    "retrieved_at": 1700000000000,
    "version": { "name_raw": "1.20.4", "name_clean": "1.20.4", "protocol": 765 },
    "players": {
        "online": 2,
        "max": 20,
        "list": [
            { "uuid": "a", "name_raw": "Steve", "name_clean": "Steve" },
            { "uuid": "b", "name_raw": "Alex", "name_clean": "Alex" }
        ]
    },
    "motd": { "raw": "A server", "clean": "A server", "html": "A server" },
    "software": "Paper",
    "plugins": [ { "name": "EssentialsX", "version": "2.20" } ],
    "mods": [],
    "srv_record": null
}"#;

fn probe(backend: &common::MockBackend) -> McStatusProbe {
    McStatusProbe::new(&backend.url(), Duration::from_secs(2)).unwrap()
}

fn address() -> ServerAddress {
    ServerAddress::new("play.example.net", 25565)
}

#[tokio::test]
async fn test_online_server_is_decoded() {
    let backend = common::start_recording_backend(|_| (200, ONLINE_BODY.to_string())).await;

    let result = probe(&backend).query(&address()).await.unwrap();

    assert!(result.online);
    let players = result.players.as_ref().unwrap();
    assert_eq!((players.online, players.max), (2, 20));
    let names: Vec<_> = players.list.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Steve", "Alex"]);
    assert_eq!(result.motd.as_deref(), Some("A server"));
    assert_eq!(result.version.as_deref(), Some("1.20.4"));
    assert_eq!(result.software.as_deref(), Some("Paper"));
    assert_eq!(result.plugins, ["EssentialsX 2.20"]);
    assert!(result.retrieved_at.is_some());

    let requests = backend.matching(Method::GET, "/v2/status/java/play.example.net:25565");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_offline_server_reports_not_live() {
    let backend = common::start_recording_backend(|_| {
        (200, r#"{"online":false,"host":"play.example.net","port":25565}"#.to_string())
    })
    .await;

    let result = probe(&backend).query(&address()).await.unwrap();

    assert!(!result.online);
    assert_eq!(format_liveness(&result), SERVER_DOWN);
}

#[tokio::test]
async fn test_non_success_status_is_offline_not_error() {
    let backend = common::start_recording_backend(|_| (503, "{}".to_string())).await;

    let result = probe(&backend).query(&address()).await.unwrap();

    assert!(!result.online);
}

#[tokio::test]
async fn test_garbage_payload_is_error_but_check_is_offline() {
    let backend = common::start_recording_backend(|_| (200, "not json".to_string())).await;
    let probe = probe(&backend);

    let err = probe.query(&address()).await.unwrap_err();
    assert!(matches!(err, ProbeError::Payload(_)));

    let result = probe.check(&address()).await;
    assert!(!result.online);
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    // Bind and drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let probe = McStatusProbe::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

    let err = probe.query(&address()).await.unwrap_err();
    assert!(matches!(err, ProbeError::Transport(_)));
    assert!(!probe.check(&address()).await.online);
}

#[tokio::test]
async fn test_silent_api_is_timeout_error() {
    // Accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let api = McStatusProbe::new(&format!("http://{addr}"), Duration::from_millis(200)).unwrap();

    let err = api.query(&address()).await.unwrap_err();
    assert!(matches!(err, ProbeError::Timeout(200)));
}
