//! RPC client: request building, transport send, response correlation.

mod builder;
mod correlate;
mod rpc_client;

pub use rpc_client::RpcClient;
