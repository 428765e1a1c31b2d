use serde_json::{json, Value};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

type Reader = BufReader<OwnedReadHalf>;
type Writer = OwnedWriteHalf;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    println!("╔═══════════════════════════════════════════════════════╗");
    println!("║        Neo N3 MCP Server - Test Client v0.1          ║");
    println!("╚═══════════════════════════════════════════════════════╝\n");

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());
    println!("Connecting to server at {}...", addr);

    let socket = TcpStream::connect(&addr).await?;
    let (reader, writer) = socket.into_split();

    println!("✓ Connected successfully!\n");

    let mut client = TestClient::new(BufReader::new(reader), writer);
    client.initialize().await?;

    loop {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║ Available Commands:                                  ║");
        println!("║ 1. get_block_count     - Current chain height       ║");
        println!("║ 2. get_nep17_balances  - Token balances of address  ║");
        println!("║ 3. validate_address    - Check a Neo N3 address     ║");
        println!("║ 4. invoke_function     - Read-only contract call    ║");
        println!("║ 5. tools/list          - List available tools       ║");
        println!("║ 6. exit                - Close connection           ║");
        println!("╚═══════════════════════════════════════════════════════╝");

        let choice = prompt("\nEnter command number (1-6): ")?;

        match choice.as_str() {
            "1" => client.get_block_count().await?,
            "2" => client.get_nep17_balances().await?,
            "3" => client.validate_address().await?,
            "4" => client.invoke_function().await?,
            "5" => client.list_tools().await?,
            "6" => {
                println!("\nGoodbye!");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-6."),
        }
    }

    Ok(())
}

fn prompt(label: &str) -> eyre::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Empty input means "use the server default network".
fn with_network(mut arguments: Value, network: String) -> Value {
    if !network.is_empty() {
        arguments["network"] = Value::String(network);
    }
    arguments
}

struct TestClient {
    reader: Reader,
    writer: Writer,
    request_id: u64,
}

impl TestClient {
    fn new(reader: Reader, writer: Writer) -> Self {
        TestClient {
            reader,
            writer,
            request_id: 1,
        }
    }

    async fn send_request(&mut self, method: &str, params: Value) -> eyre::Result<()> {
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": self.request_id
        });
        println!(
            "\n→ Sending request:\n{}",
            serde_json::to_string_pretty(&request)?
        );

        self.writer
            .write_all(serde_json::to_string(&request)?.as_bytes())
            .await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        let mut response_line = String::new();
        self.reader.read_line(&mut response_line).await?;
        self.request_id += 1;

        if response_line.is_empty() {
            println!("\n⚠️  Server closed the connection");
            return Ok(());
        }

        let response: Value = serde_json::from_str(&response_line)?;
        println!("\n← Response received:");

        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            println!("⚠️  Error: {}", error.get("message").unwrap_or(&Value::Null));
            return Ok(());
        }

        // tools/call results carry the text payload; print it unescaped
        let result = &response["result"];
        match result["content"][0]["text"].as_str() {
            Some(text) if result["isError"] == true => println!("✗ {}", text),
            Some(text) => println!("✓ {}", text),
            None => println!("{}", serde_json::to_string_pretty(result)?),
        }

        Ok(())
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> eyre::Result<()> {
        self.send_request("tools/call", json!({"name": name, "arguments": arguments}))
            .await
    }

    async fn initialize(&mut self) -> eyre::Result<()> {
        self.send_request("initialize", json!({})).await
    }

    async fn get_block_count(&mut self) -> eyre::Result<()> {
        let network = prompt("\nNetwork (mainnet/testnet, Enter for default): ")?;
        self.call_tool("get_block_count", with_network(json!({}), network))
            .await
    }

    async fn get_nep17_balances(&mut self) -> eyre::Result<()> {
        let address = prompt("\nEnter Neo N3 address (N...): ")?;
        let network = prompt("Network (mainnet/testnet, Enter for default): ")?;
        self.call_tool(
            "get_nep17_balances",
            with_network(json!({"address": address}), network),
        )
        .await
    }

    async fn validate_address(&mut self) -> eyre::Result<()> {
        let address = prompt("\nEnter address to validate: ")?;
        self.call_tool("validate_address", json!({"address": address}))
            .await
    }

    async fn invoke_function(&mut self) -> eyre::Result<()> {
        let script_hash = prompt("\nContract hash or native name (e.g. NEO, GAS): ")?;
        let operation = prompt("Operation (e.g. symbol, totalSupply): ")?;
        let params = prompt("Params as JSON array (Enter for none): ")?;
        let network = prompt("Network (mainnet/testnet, Enter for default): ")?;

        let mut arguments = json!({"script_hash": script_hash, "operation": operation});
        if !params.is_empty() {
            match serde_json::from_str::<Value>(&params) {
                Ok(parsed) => arguments["params"] = parsed,
                Err(e) => {
                    println!("✗ Params are not valid JSON: {}", e);
                    return Ok(());
                }
            }
        }

        self.call_tool("invoke_function", with_network(arguments, network))
            .await
    }

    async fn list_tools(&mut self) -> eyre::Result<()> {
        self.send_request("tools/list", json!({})).await
    }
}
