//! Math RPC server demo over HTTP.
//!
//! Run with: cargo run --example math_server
//!
//! Listens on 127.0.0.1:8742 and exposes `add` and `divide`. `divide`
//! raises a structured exception on a zero divisor, so the client demo
//! can show remote-exception diagnostics.

use std::net::SocketAddr;
use std::sync::Arc;

use http_rpc::{serve, Exception, RpcServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ---
    tracing_subscriber::fmt::init();

    let mut server = RpcServer::new();

    server.register("add", |(a, b): (i64, i64)| async move { Ok(a + b) });

    server.register("divide", |(a, b): (f64, f64)| async move {
        if b == 0.0 {
            return Err(Exception::new("division by zero", 1));
        }
        Ok(a / b)
    });

    let addr: SocketAddr = "127.0.0.1:8742".parse()?;
    println!("serving math RPC on http://{addr}/rpc");

    serve(addr, Arc::new(server)).await?;

    Ok(())
}
