//! End-to-end WebSocket tests: commands over the socket and pushes driven
//! by REST refreshes.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use common::{ONE, bootstrap_snapshot, spawn_server, steady_snapshot};

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

fn command(id: &str, payload: Value) -> Message {
    Message::text(
        json!({
            "id": id,
            "type": "command",
            "timestamp": chrono::Utc::now(),
            "payload": payload,
        })
        .to_string(),
    )
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), socket.next()).await
        else {
            panic!("no message within timeout");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                panic!("frame is not JSON");
            };
            return value;
        }
    }
}

async fn register(base: &str, body: &Value) -> String {
    let Ok(resp) = reqwest::Client::new()
        .post(format!("{base}/api/v1/markets"))
        .json(body)
        .send()
        .await
    else {
        panic!("request failed");
    };
    let Ok(created) = resp.json::<Value>().await else {
        panic!("invalid body");
    };
    let Some(id) = created["market_id"].as_str() else {
        panic!("missing market_id");
    };
    id.to_string()
}

#[tokio::test]
async fn edit_input_over_socket() {
    let addr = spawn_server().await;
    let id = register(&format!("http://{addr}"), &steady_snapshot()).await;
    let Ok((mut socket, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await
    else {
        panic!("ws connect failed");
    };

    let Ok(()) = socket
        .send(command(
            "e1",
            json!({"command": "edit_input", "market_id": id, "field": "pt", "input": "10.5"}),
        ))
        .await
    else {
        panic!("send failed");
    };
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["id"], "e1");
    assert_eq!(reply["payload"]["token_input"], "10");
    assert_eq!(reply["payload"]["lp_preview"]["raw"], (10 * ONE).to_string());

    let Ok(()) = socket.send(Message::text("not json")).await else {
        panic!("send failed");
    };
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 1001);
}

#[tokio::test]
async fn refresh_pushes_event_and_requote() {
    let addr = spawn_server().await;
    let base = format!("http://{addr}");
    let id = register(&base, &bootstrap_snapshot()).await;
    let Ok((mut socket, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await
    else {
        panic!("ws connect failed");
    };

    let Ok(()) = socket
        .send(command("s1", json!({"command": "subscribe", "market_ids": [id]})))
        .await
    else {
        panic!("send failed");
    };
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["payload"]["count"], 1);

    for (n, (field, input)) in [("token", "4"), ("pt", "9")].into_iter().enumerate() {
        let Ok(()) = socket
            .send(command(
                &format!("e{n}"),
                json!({"command": "edit_input", "market_id": id, "field": field, "input": input}),
            ))
            .await
        else {
            panic!("send failed");
        };
        let reply = next_json(&mut socket).await;
        assert_eq!(reply["payload"]["state"], "bootstrap_editing");
    }

    let Ok(resp) = reqwest::Client::new()
        .put(format!("{base}/api/v1/markets/{id}"))
        .json(&steady_snapshot())
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert!(resp.status().is_success());

    let event = next_json(&mut socket).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["event_type"], "market_refreshed");
    assert_eq!(event["payload"]["version"], 2);

    // 4 SY against 9 PT at 1.05 PT/SY: SY is the limiting side.
    let push = next_json(&mut socket).await;
    assert_eq!(push["payload"]["event_type"], "lp_preview_updated");
    assert_eq!(push["payload"]["state"], "bootstrap_editing");
    assert_eq!(push["payload"]["lp_preview"]["raw"], (4 * ONE).to_string());
}
