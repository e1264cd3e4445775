use std::path::Path;
use std::thread;
use std::time::Duration;

use gesture_rps::api::Service;
use gesture_rps::config::ServerConfig;
use gesture_rps::models::{Classifier, Move};
use gesture_rps::server::{Client, Server};
use serde_json::{json, Value};
use tempfile::TempDir;

fn start_server(dir: &Path) -> std::path::PathBuf {
    let config = ServerConfig {
        socket: dir.join("rps.sock"),
        workers: 2,
    };
    let service = Service::new(Classifier::default(), || Move::Scissors);
    let server = Server::bind(&config, service).expect("bind server");
    let path = server.path().to_path_buf();

    thread::spawn(move || {
        let _ = server.run();
    });
    path
}

fn connect(path: &Path) -> Client {
    for _ in 0..50 {
        if let Ok(client) = Client::connect(path) {
            return client;
        }
        thread::sleep(Duration::from_millis(20));
    }
    panic!("server never came up at {}", path.display());
}

fn hand(extended: usize, label: &str) -> Value {
    let mut points = vec![json!({"x": 0.5, "y": 0.5, "z": 0.0}); 21];
    // thumb tucked for either label
    let thumb_x = if label == "Left" { 0.4 } else { 0.6 };
    points[4] = json!({"x": thumb_x, "y": 0.5, "z": 0.0});
    for (i, tip) in [8, 12, 16, 20].into_iter().enumerate() {
        let y = if i < extended { 0.3 } else { 0.7 };
        points[tip] = json!({"x": 0.5, "y": y, "z": 0.0});
    }
    json!({"label": label, "landmarks": points})
}

#[test]
fn play_and_score_over_socket() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = start_server(tmp.path());
    let client = connect(&path);

    let res: Value = client
        .request(&json!({"op": "play", "playerGesture": "Rock"}))
        .unwrap();
    assert_eq!(res["success"], true);
    assert_eq!(res["computerGesture"], "Scissors");
    assert_eq!(res["result"], "win");
    assert_eq!(res["message"], "You Win!");

    let res: Value = client
        .request(&json!({"op": "play", "playerGesture": "Unknown"}))
        .unwrap();
    assert_eq!(res["success"], false);
    assert!(res.get("computerGesture").is_none());

    let res: Value = client.request(&json!({"op": "score"})).unwrap();
    assert_eq!(res, json!({"player": 1, "computer": 0}));
}

#[test]
fn detect_over_socket() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = start_server(tmp.path());
    let client = connect(&path);

    let res: Value = client
        .request(&json!({"op": "detect", "hands": [hand(3, "Left"), hand(2, "Right")]}))
        .unwrap();
    assert_eq!(res["success"], true);
    assert_eq!(res["hand_count"], 2);
    assert_eq!(res["gesture"], "Scissors");
    assert_eq!(res["hands"][0]["gesture"], "Unknown");
    assert_eq!(res["message"], "Detected 2 hand(s): Scissors");

    let res: Value = client.request(&json!({"op": "detect", "hands": []})).unwrap();
    assert_eq!(res["gesture"], "None");
    assert_eq!(res["message"], "No hand detected");
}

#[test]
fn garbage_keeps_connection_alive() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = start_server(tmp.path());
    let client = connect(&path);

    let res: Value = client.request_raw(b"{\"op\": \"dance\"}").unwrap();
    assert_eq!(res["success"], false);
    assert_eq!(res["gesture"], "None");

    let res: Value = client.request(&json!({"op": "health"})).unwrap();
    assert_eq!(res["status"], "healthy");

    let res: Value = client.request(&json!({"op": "index"})).unwrap();
    assert!(res["endpoints"]["play"].is_string());
}

#[test]
fn stale_socket_is_replaced() {
    let tmp = TempDir::new().expect("create temp dir");
    std::fs::write(tmp.path().join("rps.sock"), b"left over").unwrap();

    let path = start_server(tmp.path());
    let client = connect(&path);
    let res: Value = client.request(&json!({"op": "health"})).unwrap();
    assert_eq!(res["status"], "healthy");
}
