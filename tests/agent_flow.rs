//! End-to-end: chat endpoint -> agent -> scripted chat-completions model ->
//! MCP tool servers over real HTTP.

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use stock_mcp::adapters::OpenAIAdapter;
use stock_mcp::agent::{Agent, AgentConfig};
use stock_mcp::chat;
use stock_mcp::client::McpClient;
use stock_mcp::config::MCPServerConfig;
use stock_mcp::server::{self, McpServer, ServerConfig, ToolHandler};
use stock_mcp::tools::{EmployeeTools, StockTools};
use tokio::net::TcpListener;
use tower::ServiceExt;

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_tool_server(name: &str, handler: Arc<dyn ToolHandler>) -> String {
    let server = Arc::new(McpServer::new(ServerConfig::new(name), handler));
    spawn(server::router(server)).await
}

/// Tool call the fake model makes before answering
#[derive(Clone)]
struct Script {
    tool: &'static str,
    arguments: Value,
}

/// Requests a single tool call, then answers with whatever the tool returned.
async fn fake_completions(State(script): State<Script>, Json(request): Json<Value>) -> Json<Value> {
    let messages = request["messages"].as_array().cloned().unwrap_or_default();
    assert_eq!(messages[0]["role"], "system");

    let last = messages.last().cloned().unwrap_or(Value::Null);
    if last["role"] == "tool" {
        let observed = last["content"].as_str().unwrap_or_default();
        return Json(json!({
            "choices": [{
                "message": { "role": "assistant", "content": format!("Tool said: {}", observed) },
                "finish_reason": "stop"
            }]
        }));
    }

    let offered: Vec<&str> = request["tools"]
        .as_array()
        .map(|tools| {
            tools
                .iter()
                .filter_map(|t| t["function"]["name"].as_str())
                .collect()
        })
        .unwrap_or_default();
    assert!(offered.contains(&script.tool), "{} not offered: {:?}", script.tool, offered);

    Json(json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": { "name": script.tool, "arguments": script.arguments.to_string() }
                }]
            },
            "finish_reason": "tool_calls"
        }]
    }))
}

async fn chat_app(servers: Vec<MCPServerConfig>, script: Script) -> Router {
    let llm_url = spawn(
        Router::new()
            .route("/v1/chat/completions", post(fake_completions))
            .with_state(script),
    )
    .await;

    let llm = OpenAIAdapter::new(None, "scripted".to_string()).with_base_url(llm_url);
    let agent = Agent::new(McpClient::new(servers), Arc::new(llm), AgentConfig::default());
    chat::router(Arc::new(agent))
}

async fn ask(app: Router, query: &str) -> (StatusCode, String) {
    let uri = format!("/chat?query={}", urlencoding::encode(query));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_company_question_uses_lookup_tool() {
    let stock_url = spawn_tool_server("Stock MCP Server", Arc::new(StockTools::default())).await;
    let app = chat_app(
        vec![MCPServerConfig::http("stock", stock_url)],
        Script {
            tool: "getCompanyByName",
            arguments: json!({ "companyName": "OCP" }),
        },
    )
    .await;

    let (status, body) = ask(app, "Quel est le chiffre d'affaires de OCP ?").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("Tool said: "), "{}", body);
    assert!(body.contains("5.6"), "{}", body);
    assert!(body.contains("Extraction minière"), "{}", body);
}

#[tokio::test]
async fn test_unknown_company_reaches_model_as_error() {
    let stock_url = spawn_tool_server("Stock MCP Server", Arc::new(StockTools::default())).await;
    let app = chat_app(
        vec![MCPServerConfig::http("stock", stock_url)],
        Script {
            tool: "getCompanyByName",
            arguments: json!({ "companyName": "IAM" }),
        },
    )
    .await;

    let (status, body) = ask(app, "Parle-moi de IAM").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Tool said: Error: Company IAM not found");
}

#[tokio::test]
async fn test_stock_quote_within_price_range() {
    let stock_url = spawn_tool_server("Stock MCP Server", Arc::new(StockTools::default())).await;
    let app = chat_app(
        vec![MCPServerConfig::http("stock", stock_url)],
        Script {
            tool: "getStockByCompany",
            arguments: json!({ "companyName": "Maroc Telecom" }),
        },
    )
    .await;

    let (status, body) = ask(app, "Cours de Maroc Telecom ?").await;
    assert_eq!(status, StatusCode::OK);

    let stock: Value = serde_json::from_str(body.trim_start_matches("Tool said: ")).unwrap();
    assert_eq!(stock["companyName"], "Maroc Telecom");
    let price = stock["price"].as_f64().unwrap();
    assert!((100.0..1100.0).contains(&price), "price {}", price);
}

#[tokio::test]
async fn test_calls_route_to_the_advertising_server() {
    let stock_url = spawn_tool_server("Stock MCP Server", Arc::new(StockTools::default())).await;
    let employee_url = spawn_tool_server("Employee MCP Server", Arc::new(EmployeeTools)).await;
    let app = chat_app(
        vec![
            MCPServerConfig::http("stock", stock_url),
            MCPServerConfig::http("employee", employee_url),
        ],
        Script {
            tool: "get_employee_info",
            arguments: json!({ "name": "Mohamed" }),
        },
    )
    .await;

    let (status, body) = ask(app, "Salaire de Mohamed ?").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"employee_name\":\"Mohamed\""), "{}", body);
    assert!(body.contains("5400"), "{}", body);
}

#[tokio::test]
async fn test_model_unreachable_is_bad_gateway() {
    let stock_url = spawn_tool_server("Stock MCP Server", Arc::new(StockTools::default())).await;
    let llm = OpenAIAdapter::new(None, "offline".to_string()).with_base_url("http://127.0.0.1:9");
    let agent = Agent::new(
        McpClient::new(vec![MCPServerConfig::http("stock", stock_url)]),
        Arc::new(llm),
        AgentConfig::default(),
    );

    let (status, _) = ask(chat::router(Arc::new(agent)), "hello").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_duplicate_tool_kept_by_first_configured_server() {
    let first_url = spawn_tool_server("Employee A", Arc::new(EmployeeTools)).await;
    let second_url = spawn_tool_server("Employee B", Arc::new(EmployeeTools)).await;
    let client = McpClient::new(vec![
        MCPServerConfig::http("first", first_url),
        MCPServerConfig::http("second", second_url),
    ]);

    let tools = client.list_tools().await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "get_employee_info");
    assert_eq!(client.server_for_tool("get_employee_info").as_deref(), Some("first"));

    let result = client
        .call_tool("get_employee_info", json!({ "name": "Salma" }))
        .await
        .unwrap();
    assert!(result.text().contains("Salma"));

    client.close_all_sessions().await.unwrap();
    assert!(!client.is_connected());
    assert_eq!(client.server_for_tool("get_employee_info"), None);
}
