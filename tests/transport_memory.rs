// tests/transport_memory.rs

//! Reference-semantics tests for the in-memory transport.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;
use sha1::{Digest, Sha1};

use http_rpc::{
    //
    create_memory_transport_with_hub,
    Error,
    MemoryHub,
    ResponseEnvelope,
    RpcServer,
    Transport,
    CONTENT_SHA1_HEADER,
    CONTENT_TYPE_HEADER,
    CONTENT_TYPE_JSON,
};

const ENDPOINT: &str = "http://math.test/rpc";

fn math_server() -> Arc<RpcServer> {
    // ---
    let mut server = RpcServer::new();
    server.register("add", |(a, b): (i64, i64)| async move { Ok(a + b) });
    Arc::new(server)
}

fn request_body(id: u64) -> Bytes {
    Bytes::from(
        serde_json::to_vec(&json!({"id": id, "method": "add", "params": [2, 3]})).unwrap(),
    )
}

#[tokio::test]
async fn bound_endpoint_serves_posts() {
    // ---
    // Arrange
    // ---
    let hub = MemoryHub::new();
    hub.bind(ENDPOINT, math_server()).await;

    let transport = create_memory_transport_with_hub(hub);

    // ---
    // Act
    // ---
    let reply = transport
        .post(ENDPOINT, request_body(1))
        .await
        .expect("post failed");

    // ---
    // Assert
    // ---
    assert_eq!(reply.status, 200);
    assert_eq!(reply.header(CONTENT_TYPE_HEADER), Some(CONTENT_TYPE_JSON));

    let envelope: ResponseEnvelope = serde_json::from_slice(&reply.body).unwrap();
    assert_eq!(envelope.id, Some(1));
    assert_eq!(envelope.result, json!(5));
}

#[tokio::test]
async fn reply_digest_matches_the_body_bytes() {
    // ---
    let hub = MemoryHub::new();
    hub.bind(ENDPOINT, math_server()).await;

    let transport = create_memory_transport_with_hub(hub);
    let reply = transport
        .post(ENDPOINT, request_body(1))
        .await
        .expect("post failed");

    let expected = hex::encode(Sha1::digest(&reply.body));
    assert_eq!(reply.header(CONTENT_SHA1_HEADER), Some(expected.as_str()));
}

#[tokio::test]
async fn unbound_endpoint_is_a_connection_failure() {
    // ---
    let transport = create_memory_transport_with_hub(MemoryHub::new());

    let err = transport
        .post(ENDPOINT, request_body(1))
        .await
        .expect_err("post should fail");

    assert!(matches!(err, Error::Connection(_)));
}

#[tokio::test]
async fn hubs_are_isolated_from_each_other() {
    // ---
    let bound = MemoryHub::new();
    bound.bind(ENDPOINT, math_server()).await;

    let other = create_memory_transport_with_hub(MemoryHub::new());
    let err = other
        .post(ENDPOINT, request_body(1))
        .await
        .expect_err("unbound hub should not route");

    assert!(matches!(err, Error::Connection(_)));
}

#[tokio::test]
async fn notification_produces_no_response_bytes() {
    // ---
    let hub = MemoryHub::new();
    hub.bind(ENDPOINT, math_server()).await;

    let transport = create_memory_transport_with_hub(hub);
    let body = Bytes::from(
        serde_json::to_vec(&json!({"id": null, "method": "add", "params": [2, 3]})).unwrap(),
    );

    let reply = transport.post(ENDPOINT, body).await.expect("post failed");

    assert_eq!(reply.status, 204);
    assert!(reply.body.is_empty());
    assert_eq!(reply.header(CONTENT_SHA1_HEADER), None);
}

#[tokio::test]
async fn malformed_body_yields_the_fatal_envelope() {
    // ---
    let hub = MemoryHub::new();
    hub.bind(ENDPOINT, math_server()).await;

    let transport = create_memory_transport_with_hub(hub);
    let reply = transport
        .post(ENDPOINT, Bytes::from_static(b"{nope"))
        .await
        .expect("post itself succeeds");

    let envelope: ResponseEnvelope = serde_json::from_slice(&reply.body).unwrap();
    assert_eq!(envelope.id, Some(0));
    assert!(envelope.error.is_some());
}

#[tokio::test]
async fn close_unbinds_servers_on_the_hub() {
    // ---
    let hub = MemoryHub::new();
    hub.bind(ENDPOINT, math_server()).await;

    let transport = create_memory_transport_with_hub(hub);
    transport.close().await.expect("close failed");

    let err = transport
        .post(ENDPOINT, request_body(1))
        .await
        .expect_err("post after close should fail");
    assert!(matches!(err, Error::Connection(_)));
}
