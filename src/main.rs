use neo3_mcp_server::server::{JsonRpcRequest, JsonRpcResponse};
use neo3_mcp_server::{Config, McpServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_line_number(true)
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        warn!("Ignoring environment configuration: {}", e);
        Config::default()
    });

    let addr: SocketAddr = config.listen_addr.parse()?;
    let server = Arc::new(McpServer::new(config)?);
    let listener = TcpListener::bind(addr).await?;

    info!("Neo N3 MCP server listening on {}", addr);
    info!("Tools: {}", server.tool_names().join(", "));

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = accepted?;
                let server = Arc::clone(&server);
                tokio::spawn(async move {
                    if let Err(e) = serve(socket, &server).await {
                        error!("Connection {} closed with error: {}", peer, e);
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

/// One JSON-RPC request per line in, one response per line out.
async fn serve(socket: TcpStream, server: &McpServer) -> eyre::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => {
                info!("{} (id: {})", request.method, request.id);
                server.handle_request(request).await
            }
            Err(e) => {
                warn!("Unparseable request line: {}", e);
                JsonRpcResponse::parse_error(e.to_string())
            }
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }

    Ok(())
}
