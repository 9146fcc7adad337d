// Conversation orchestrator
// One instance per chat session: intent, retrieval and reply for each turn

pub mod compose;
pub mod intent;
pub mod memory;
pub mod plan;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::index::IndexStats;
use crate::llm::{AzureChatClient, LanguageModel, Role};
use crate::search::{PopulateReport, ProductSearch};

pub use compose::{APOLOGY_MESSAGE, CLARIFICATION_MESSAGE, format_conversational, format_templated};
pub use intent::{SearchIntent, extract_intent};
pub use memory::{ConversationMemory, Turn};
pub use plan::{FilterDimension, RetrievalPlan};

pub const DEFAULT_HISTORY_TURNS: usize = 10;

/// Product recommendation chat session.
///
/// The model and search handles are shared and read-only; the transcript
/// belongs to this session alone.
pub struct Chatbot {
    session_id: Uuid,
    llm: Arc<dyn LanguageModel>,
    search: Arc<ProductSearch>,
    memory: ConversationMemory,
    history_turns: usize,
    system_prompt: String,
}

impl Chatbot {
    #[inline]
    pub fn new(llm: Arc<dyn LanguageModel>, search: Arc<ProductSearch>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            llm,
            search,
            memory: ConversationMemory::new(),
            history_turns: DEFAULT_HISTORY_TURNS,
            system_prompt: compose::system_prompt(Catalog::builtin()),
        }
    }

    /// Build the hosted clients from validated settings.
    ///
    /// Missing or malformed settings fail here, before any network call.
    #[inline]
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        config.validate()?;

        let llm = AzureChatClient::new(&config.llm)?;
        let search = ProductSearch::from_config(config)?;

        Ok(Self::new(Arc::new(llm), Arc::new(search)).with_history_turns(config.chat.history_turns))
    }

    #[inline]
    #[must_use]
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// A fresh session over the same model and index handles
    #[inline]
    pub fn new_session(&self) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            llm: Arc::clone(&self.llm),
            search: Arc::clone(&self.search),
            memory: ConversationMemory::new(),
            history_turns: self.history_turns,
            system_prompt: self.system_prompt.clone(),
        }
    }

    #[inline]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Answer one user message.
    ///
    /// Never fails: an unexpected error is logged and answered with
    /// [`APOLOGY_MESSAGE`]. Both sides of the exchange are remembered.
    #[inline]
    pub fn chat(&mut self, message: &str) -> String {
        let reply = match self.respond(message) {
            Ok(reply) => reply,
            Err(e) => {
                error!("Chat turn failed (session {}): {:#}", self.session_id, e);
                APOLOGY_MESSAGE.to_string()
            }
        };

        self.memory.push(Role::User, message);
        self.memory.push(Role::Assistant, reply.as_str());
        reply
    }

    fn respond(&self, message: &str) -> anyhow::Result<String> {
        let intent = extract_intent(self.llm.as_ref(), message);
        let plan = RetrievalPlan::for_intent(&intent);
        debug!("Intent: {:?}, filter: {:?}", intent, plan.filter());

        let matches = self.search.search(&intent.search_query, plan.filter())?;
        if matches.is_empty() {
            info!("No products matched, asking for clarification");
            return Ok(CLARIFICATION_MESSAGE.to_string());
        }

        let history = self.memory.recent_messages(self.history_turns);
        Ok(format_conversational(
            self.llm.as_ref(),
            &self.system_prompt,
            &history,
            message,
            &matches,
        ))
    }

    #[inline]
    pub fn chat_history(&self) -> &[Turn] {
        self.memory.turns()
    }

    /// Forget the transcript. Safe to call on an empty session.
    #[inline]
    pub fn clear_memory(&mut self) {
        self.memory.clear();
        debug!("Cleared memory for session {}", self.session_id);
    }

    /// Embed and upsert the built-in catalog
    #[inline]
    pub fn populate_index(&self) -> crate::Result<PopulateReport> {
        Ok(self.search.populate(Catalog::builtin())?)
    }

    #[inline]
    pub fn index_stats(&self) -> Option<IndexStats> {
        self.search.stats()
    }
}
