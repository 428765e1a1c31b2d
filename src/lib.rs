pub mod address;
pub mod config;
pub mod error;
pub mod precision;
pub mod provider;
pub mod rpc;
pub mod server;
pub mod tokens;
pub mod tools;

pub use config::{Config, NetworkConfig};
pub use error::{Neo3Error, Result};
pub use provider::Neo3Provider;
pub use rpc::RpcClient;
pub use server::McpServer;
pub use tools::{NeoTool, ToolRegistry, ToolResult};
