//! Math RPC client demo.
//!
//! This demo sends a few calls to the math server and prints the
//! responses, including the diagnostics for a remote exception.
//!
//! Run with: cargo run --example math_client
//!
//! Requires: math_server running on 127.0.0.1:8742

use anyhow::Result;

use http_rpc::{Error, RpcClient, RpcConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    let config = RpcConfig::new("http://127.0.0.1:8742/rpc");
    let mut client = RpcClient::connect(&config).await?;

    // ---
    // Ordinary calls: ids 1 and 2, correlated automatically.
    let sum: i64 = client.call("add", (2, 3)).await?;
    println!("2 + 3 = {sum}");

    let quotient: f64 = client.call("divide", (1.0, 4.0)).await?;
    println!("1 / 4 = {quotient}");

    // ---
    // A remote exception arrives with message, code and origin.
    match client.call::<_, f64>("divide", (1.0, 0.0)).await {
        Err(Error::RemoteException(exception)) => println!("{exception}"),
        other => println!("unexpected outcome: {other:?}"),
    }

    Ok(())
}
