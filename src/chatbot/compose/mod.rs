// Reply composition
// Templated product listings and model-written conversational replies


use itertools::Itertools;
use tracing::warn;

use crate::catalog::{Catalog, Category};
use crate::llm::{ChatMessage, LanguageModel, ResponseFormat};
use crate::search::RankedMatch;

/// Products shown in a single reply
pub const SHOWN_PRODUCTS: usize = 3;

pub const CLARIFICATION_MESSAGE: &str = "I couldn't find any products matching your requirements. \
Could you please provide more details about what you're looking for? For example:\n\
- What type of device (phone, laptop, tablet)?\n\
- What's your budget range?\n\
- Any specific features you need?\n\
- Preferred brand?";

pub const APOLOGY_MESSAGE: &str = "I'm sorry, I encountered an error while processing your request. \
Please try again or rephrase your question.";

const FOLLOW_UP: &str = "Would you like me to provide more details about any of these products \
or help you narrow down your search?";

/// Product attributes surfaced in listings, in display order
const LISTED_SPECS: [(&str, &str); 3] = [
    ("screen_size", "Screen"),
    ("storage", "Storage"),
    ("processor", "Processor"),
];

/// Persona sent ahead of every conversational reply
#[inline]
pub fn system_prompt(catalog: Catalog<'_>) -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| {
            let brands = catalog
                .by_category(*c)
                .into_iter()
                .map(|p| p.brand.as_str())
                .unique()
                .join(", ");
            format!("- {}: {}", c.display_name(), brands)
        })
        .join("\n");

    format!(
        "You are a helpful product recommendation assistant for an electronics store. \
You help customers find the right phone, laptop or tablet for their needs and budget.\n\n\
You can explain product specifications, compare options on price and features, and \
recommend specific products with your reasoning.\n\n\
Available product categories and brands:\n{categories}\n\n\
Be friendly and specific. If you don't have enough information, ask clarifying questions."
    )
}

/// Deterministic listing of the first [`SHOWN_PRODUCTS`] matches.
///
/// An empty slice yields [`CLARIFICATION_MESSAGE`].
#[inline]
pub fn format_templated(matches: &[RankedMatch]) -> String {
    if matches.is_empty() {
        return CLARIFICATION_MESSAGE.to_string();
    }

    let mut sections = vec!["Here are some great options for you:".to_string()];
    sections.extend(
        matches
            .iter()
            .take(SHOWN_PRODUCTS)
            .enumerate()
            .map(|(rank, m)| product_listing(rank + 1, m)),
    );

    if matches.len() > SHOWN_PRODUCTS {
        sections.push(format!(
            "... and {} more options available.",
            matches.len() - SHOWN_PRODUCTS
        ));
    }

    sections.push(FOLLOW_UP.to_string());
    sections.join("\n\n")
}

/// One numbered product entry, one attribute per line
fn product_listing(position: usize, RankedMatch { product, score }: &RankedMatch) -> String {
    let mut lines = vec![
        format!("**{}. {}** ({})", position, product.name, product.price_label()),
        format!("   Brand: {}", product.brand),
        format!("   Description: {}", product.description),
    ];

    lines.extend(LISTED_SPECS.into_iter().filter_map(|(key, label)| {
        product.spec(key).map(|value| format!("   {}: {}", label, value))
    }));

    if !product.features.is_empty() {
        lines.push(format!(
            "   Key Features: {}",
            product.features.iter().take(3).join(", ")
        ));
    }

    lines.push(format!("   Match Score: {:.2}", score.unwrap_or(0.0)));
    lines.join("\n")
}

fn reply_prompt(message: &str, matches: &[RankedMatch]) -> String {
    let context = matches
        .iter()
        .take(SHOWN_PRODUCTS)
        .map(|m| format!("- {}: {}", m.product.name, m.product.description))
        .join("\n");

    format!(
        "The customer is looking for products and you found these options:\n\n\
{context}\n\n\
Customer message: \"{message}\"\n\n\
Write a helpful, conversational reply that acknowledges the request, presents the \
recommendations naturally, mentions the key benefits of each and asks a follow-up \
question to help the customer decide. Sound like a knowledgeable, friendly sales assistant."
    )
}

/// Model-written reply about `matches`.
///
/// `history` is replayed between the system prompt and the new request. A
/// failed or blank model reply degrades to [`format_templated`].
#[inline]
pub fn format_conversational(
    llm: &dyn LanguageModel,
    system_prompt: &str,
    history: &[ChatMessage],
    message: &str,
    matches: &[RankedMatch],
) -> String {
    if matches.is_empty() {
        return CLARIFICATION_MESSAGE.to_string();
    }

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(reply_prompt(message, matches)));

    match llm.complete(&messages, ResponseFormat::Text) {
        Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
        Ok(_) => {
            warn!("Model returned an empty reply, using template");
            format_templated(matches)
        }
        Err(e) => {
            warn!("Conversational reply failed, using template: {:#}", e);
            format_templated(matches)
        }
    }
}
