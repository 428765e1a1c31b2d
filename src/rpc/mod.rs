pub mod client;

pub use client::{RpcClient, RpcErrorObject, RpcRequest, RpcResponse};
