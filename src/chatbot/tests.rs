use super::*;
use crate::catalog::Category;
use crate::embeddings::Embedder;
use crate::index::{MetadataFilter, VectorIndex};
use crate::llm::ResponseFormat;
use crate::test_support::{EmbedBehavior, MockEmbedder, MockIndex, ScriptedModel, catalog_match};

struct Harness {
    bot: Chatbot,
    model: Arc<ScriptedModel>,
    embedder: Arc<MockEmbedder>,
    index: Arc<MockIndex>,
}

fn harness(replies: Vec<Result<String, String>>, embedder: MockEmbedder, index: MockIndex) -> Harness {
    let model = Arc::new(ScriptedModel::new(replies));
    let embedder = Arc::new(embedder);
    let index = Arc::new(index);
    let search = ProductSearch::new(
        Arc::clone(&embedder) as Arc<dyn Embedder>,
        Arc::clone(&index) as Arc<dyn VectorIndex>,
        5,
    );
    let bot = Chatbot::new(Arc::clone(&model) as Arc<dyn LanguageModel>, Arc::new(search));
    Harness {
        bot,
        model,
        embedder,
        index,
    }
}

fn laptop_intent() -> Result<String, String> {
    Ok(r#"{"category": "laptop", "search_query": "laptop for work"}"#.to_string())
}

#[test]
fn laptop_request_lists_fixtures_in_rank_order() {
    let mut h = harness(
        vec![laptop_intent(), Err("composer unavailable".to_string())],
        MockEmbedder::working(),
        MockIndex::returning(vec![
            catalog_match("laptop_001", 0.92),
            catalog_match("laptop_003", 0.88),
        ]),
    );

    let reply = h.bot.chat("I need a laptop for work");

    let first = reply.find("**1. MacBook Pro 14-inch** ($1999)").expect("MacBook listed first");
    let second = reply
        .find("**2. Lenovo ThinkPad X1 Carbon** ($1699)")
        .expect("ThinkPad listed second");
    assert!(first < second);
    assert!(reply.contains("Brand: Apple"));
    assert!(reply.contains("Brand: Lenovo"));

    assert_eq!(
        h.index.recorded_filters(),
        vec![Some(MetadataFilter::Category(Category::Laptop))]
    );
    let embedded = h.embedder.texts.lock().expect("mock lock").clone();
    assert_eq!(embedded, vec!["laptop for work".to_string()]);
}

#[test]
fn conversational_reply_is_returned_when_model_answers() {
    let mut h = harness(
        vec![laptop_intent(), Ok("The MacBook Pro is ideal for work.".to_string())],
        MockEmbedder::working(),
        MockIndex::returning(vec![catalog_match("laptop_001", 0.92)]),
    );

    assert_eq!(h.bot.chat("I need a laptop for work"), "The MacBook Pro is ideal for work.");
    assert_eq!(h.model.call_count(), 2);
    let (_, format) = h.model.call(1);
    assert_eq!(format, ResponseFormat::Text);
}

#[test]
fn no_matches_asks_for_clarification_without_composing() {
    let mut h = harness(
        vec![laptop_intent(), Ok("should never be used".to_string())],
        MockEmbedder::working(),
        MockIndex::default(),
    );

    let reply = h.bot.chat("I need a laptop for work");

    assert_eq!(reply, CLARIFICATION_MESSAGE);
    for clue in ["type of device", "budget", "features", "brand"] {
        assert!(reply.contains(clue));
    }
    assert_eq!(h.model.call_count(), 1, "only the intent call is made");
}

#[test]
fn category_wins_over_brand() {
    let mut h = harness(
        vec![Ok(
            r#"{"category": "phone", "brand": "Samsung", "min_price": 100, "max_price": 900, "search_query": "galaxy"}"#
                .to_string(),
        )],
        MockEmbedder::working(),
        MockIndex::default(),
    );

    h.bot.chat("a samsung phone");
    assert_eq!(
        h.index.recorded_filters(),
        vec![Some(MetadataFilter::Category(Category::Phone))]
    );
}

#[test]
fn brand_filter_uses_catalog_spelling() {
    let mut h = harness(
        vec![Ok(r#"{"category": null, "brand": "apple", "features": null, "search_query": "apple"}"#.to_string())],
        MockEmbedder::working(),
        MockIndex::default(),
    );

    h.bot.chat("something from apple");
    assert_eq!(
        h.index.recorded_filters(),
        vec![Some(MetadataFilter::Brand("Apple".to_string()))]
    );
}

#[test]
fn unusable_intent_falls_back_to_keywords() {
    let mut h = harness(
        vec![Err("intent service down".to_string())],
        MockEmbedder::working(),
        MockIndex::default(),
    );

    h.bot.chat("any good tablet under $300?");
    assert_eq!(
        h.index.recorded_filters(),
        vec![Some(MetadataFilter::Category(Category::Tablet))]
    );
    let embedded = h.embedder.texts.lock().expect("mock lock").clone();
    assert_eq!(embedded, vec!["any good tablet under $300?".to_string()]);
}

#[test]
fn embedding_failure_becomes_apology() {
    let mut h = harness(
        vec![laptop_intent(), laptop_intent()],
        MockEmbedder::new(EmbedBehavior::Fail),
        MockIndex::returning(vec![catalog_match("laptop_001", 0.9)]),
    );

    let reply = h.bot.chat("I need a laptop for work");
    assert!(!reply.is_empty());
    assert_eq!(reply, APOLOGY_MESSAGE);
    assert!(h.index.recorded_filters().is_empty());

    // The session stays usable
    assert_eq!(h.bot.chat_history().len(), 2);
    assert_eq!(h.bot.chat("still there?"), APOLOGY_MESSAGE);
    h.bot.clear_memory();
    assert!(h.bot.chat_history().is_empty());
}

#[test]
fn memory_records_turns_and_feeds_composer() {
    let mut h = harness(
        vec![
            laptop_intent(),
            Ok("Try the MacBook.".to_string()),
            laptop_intent(),
            Ok("It has 18GB of RAM.".to_string()),
        ],
        MockEmbedder::working(),
        MockIndex::returning(vec![catalog_match("laptop_001", 0.9)]),
    );

    h.bot.chat("I need a laptop for work");
    h.bot.chat("how much memory does it have?");

    let history: Vec<(Role, &str)> = h
        .bot
        .chat_history()
        .iter()
        .map(|t| (t.role, t.content.as_str()))
        .collect();
    assert_eq!(
        history,
        vec![
            (Role::User, "I need a laptop for work"),
            (Role::Assistant, "Try the MacBook."),
            (Role::User, "how much memory does it have?"),
            (Role::Assistant, "It has 18GB of RAM."),
        ]
    );

    // system prompt, two remembered turns, new request
    let (messages, _) = h.model.call(3);
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[1].content, "I need a laptop for work");
    assert_eq!(messages[2].content, "Try the MacBook.");
}

#[test]
fn history_window_is_bounded() {
    let mut replies = Vec::new();
    for _ in 0..3 {
        replies.push(laptop_intent());
        replies.push(Ok("reply".to_string()));
    }
    let h = harness(
        replies,
        MockEmbedder::working(),
        MockIndex::returning(vec![catalog_match("laptop_002", 0.9)]),
    );
    let mut bot = h.bot.with_history_turns(2);

    for _ in 0..3 {
        bot.chat("laptop");
    }

    let (messages, _) = h.model.call(5);
    assert_eq!(messages.len(), 4, "system prompt, two turns, request");
}

#[test]
fn clear_memory_is_idempotent() {
    let mut h = harness(vec![], MockEmbedder::working(), MockIndex::default());
    h.bot.clear_memory();
    h.bot.chat("hello");
    assert_eq!(h.bot.chat_history().len(), 2);
    h.bot.clear_memory();
    h.bot.clear_memory();
    assert!(h.bot.chat_history().is_empty());
}

#[test]
fn sessions_do_not_share_memory() {
    let mut h = harness(vec![], MockEmbedder::working(), MockIndex::default());
    let other = h.bot.new_session();

    h.bot.chat("hello");
    assert_ne!(h.bot.session_id(), other.session_id());
    assert_eq!(h.bot.chat_history().len(), 2);
    assert!(other.chat_history().is_empty());
}

#[test]
fn admin_operations_delegate_to_search() {
    let h = harness(vec![], MockEmbedder::working(), MockIndex::default());

    let report = h.bot.populate_index().expect("population succeeds");
    assert_eq!(report.embedded, 12);
    assert_eq!(h.bot.index_stats().map(|s| s.total_vector_count), Some(12));
}

#[test]
fn invalid_config_prevents_construction() {
    let err = Chatbot::from_config(&Config::default())
        .err()
        .expect("empty settings are rejected");
    assert!(matches!(err, crate::AdvisorError::Config(_)));
}
