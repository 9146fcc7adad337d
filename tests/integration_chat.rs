#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Full chat turns through the hosted clients, all served by one mock server
// Run with: cargo test --test integration_chat

use product_advisor::catalog::Catalog;
use product_advisor::chatbot::{APOLOGY_MESSAGE, CLARIFICATION_MESSAGE, Chatbot};
use product_advisor::config::Config;
use product_advisor::index::ProductMetadata;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHAT_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";
const EMBEDDING_PATH: &str = "/openai/deployments/text-embedding-ada-002/embeddings";

fn mock_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::load(dir.path()).expect("defaults load");
    let uri = server.uri();
    config.apply_env(|key| match key {
        "AZURE_OPENAI_ENDPOINT" | "AZURE_EMBEDDING_ENDPOINT" => Some(uri.clone()),
        "AZURE_OPENAI_API_KEY" | "AZURE_EMBEDDING_API_KEY" | "PINECONE_API_KEY" => {
            Some("test-key".to_string())
        }
        "AZURE_OPENAI_DEPLOYMENT_NAME" => Some("gpt-4o".to_string()),
        "AZURE_EMBEDDING_MODEL" => Some("text-embedding-ada-002".to_string()),
        _ => None,
    });
    config.pinecone.controller_url = server.uri();
    config.embedding.dimension = 64;
    config
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

fn metadata_json(id: &str) -> Value {
    let product = Catalog::builtin().by_id(id).expect("fixture exists");
    serde_json::to_value(ProductMetadata::try_from(product).expect("metadata encodes"))
        .expect("metadata serializes")
}

async fn mount_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexes": [{ "name": "product-recommendations", "host": server.uri() }]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/product-recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "product-recommendations",
            "host": server.uri()
        })))
        .mount(server)
        .await;
}

async fn mount_intent(server: &MockServer, intent: Value) {
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_partial_json(json!({ "response_format": { "type": "json_object" } })))
        .respond_with(completion(&intent.to_string()))
        .with_priority(1)
        .mount(server)
        .await;
}

async fn mount_embedding(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(EMBEDDING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": vec![0.1_f32; 64] }]
        })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn laptop_request_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");
    mount_index(&server).await;
    mount_embedding(&server).await;
    mount_intent(
        &server,
        json!({ "category": "laptop", "min_price": null, "max_price": null,
                "brand": null, "features": ["portable"], "search_query": "laptop for work" }),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({ "filter": { "category": "laptop" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                { "id": "laptop_001", "score": 0.91, "metadata": metadata_json("laptop_001") },
                { "id": "laptop_003", "score": 0.87, "metadata": metadata_json("laptop_003") }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Composer is unavailable, so the templated listing is returned
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(5)
        .mount(&server)
        .await;

    let mut bot = Chatbot::from_config(&mock_config(&server, &dir)).expect("bot builds");
    let reply = bot.chat("I need a laptop for work");

    let first = reply.find("**1. MacBook Pro 14-inch** ($1999)").expect("MacBook first");
    let second = reply
        .find("**2. Lenovo ThinkPad X1 Carbon** ($1699)")
        .expect("ThinkPad second");
    assert!(first < second);
    assert!(reply.contains("Brand: Apple"));
    assert!(reply.contains("Brand: Lenovo"));
    assert!(reply.contains("Match Score: 0.91"));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_results_ask_for_clarification() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");
    mount_index(&server).await;
    mount_embedding(&server).await;
    mount_intent(&server, json!({ "category": "tablet", "search_query": "tablet" })).await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matches": [] })))
        .mount(&server)
        .await;

    let mut bot = Chatbot::from_config(&mock_config(&server, &dir)).expect("bot builds");
    assert_eq!(bot.chat("a tablet please"), CLARIFICATION_MESSAGE);

    let chat_calls = server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|r| r.url.path() == CHAT_PATH)
        .count();
    assert_eq!(chat_calls, 1, "only the intent call reaches the model");
}

#[tokio::test(flavor = "multi_thread")]
async fn embedding_outage_is_not_an_apology() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");
    mount_index(&server).await;
    mount_intent(&server, json!({ "category": "phone", "search_query": "phone" })).await;

    Mock::given(method("POST"))
        .and(path(EMBEDDING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matches": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let mut bot = Chatbot::from_config(&mock_config(&server, &dir)).expect("bot builds");
    let reply = bot.chat("a new phone");
    assert_eq!(reply, CLARIFICATION_MESSAGE);
    assert_ne!(reply, APOLOGY_MESSAGE);
}

#[tokio::test(flavor = "multi_thread")]
async fn populate_uploads_catalog_in_one_batch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");
    mount_index(&server).await;
    mount_embedding(&server).await;

    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "upsertedCount": 12 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/describe_index_stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dimension": 64,
            "indexFullness": 0.01,
            "totalVectorCount": 12
        })))
        .mount(&server)
        .await;

    let bot = Chatbot::from_config(&mock_config(&server, &dir)).expect("bot builds");
    let report = bot.populate_index().expect("population succeeds");
    assert_eq!(report.embedded, 12);
    assert_eq!(report.batches, 1);

    let stats = bot.index_stats().expect("stats available");
    assert_eq!(stats.total_vector_count, 12);
    assert_eq!(stats.dimension, 64);
}
