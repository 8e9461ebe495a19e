//! Notification-mode client demo.
//!
//! A notification session sends null-id envelopes and never waits for
//! a reply; the transport's acceptance of the send is the only success
//! signal.
//!
//! Run with: cargo run --example notify_client
//!
//! Requires: math_server running on 127.0.0.1:8742

use anyhow::Result;

use http_rpc::{RpcClient, RpcConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    let config = RpcConfig::new("http://127.0.0.1:8742/rpc").with_notification();
    let mut client = RpcClient::connect(&config).await?;

    for i in 0..3i64 {
        client.invoke("add", vec![i.into(), i.into()]).await?;
        println!("notified add({i}, {i}), no reply expected");
    }

    Ok(())
}
