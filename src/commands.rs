use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use tracing::info;

use crate::catalog::{Catalog, Category, Product};
use crate::chatbot::Chatbot;
use crate::config::Config;
use crate::search::ProductSearch;

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "bye"];

/// Offline catalog filters; every set field must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub category: Option<Category>,
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
}

impl CatalogQuery {
    /// Products matching every filter, in catalog order
    #[inline]
    pub fn apply<'a>(&self, catalog: Catalog<'a>) -> Vec<&'a Product> {
        let mut products = catalog.by_price_range(self.min_price, self.max_price);

        if let Some(category) = self.category {
            products.retain(|p| p.category == category);
        }
        if let Some(brand) = &self.brand {
            let by_brand = catalog.by_brand(brand);
            products.retain(|p| by_brand.iter().any(|b| b.id == p.id));
        }
        if let Some(text) = &self.search {
            let found = catalog.keyword_search(text);
            products.retain(|p| found.iter().any(|f| f.id == p.id));
        }

        products
    }
}

/// Interactive chat loop on the terminal
#[inline]
pub fn run_chat() -> Result<()> {
    let mut bot = Chatbot::from_config(&Config::load_effective()?)?;
    info!("Started chat session {}", bot.session_id());

    eprintln!("{}", style("🛍️  Product Advisor").bold().cyan());
    eprintln!(
        "Ask about phones, laptops or tablets. Type {} to start over, {} to review, {} to leave.",
        style("clear").yellow(),
        style("history").yellow(),
        style("quit").yellow()
    );
    eprintln!();

    loop {
        let line: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;
        let message = line.trim();

        match message.to_lowercase().as_str() {
            "" => continue,
            word if EXIT_WORDS.contains(&word) => {
                eprintln!("Goodbye!");
                break;
            }
            "clear" => {
                bot.clear_memory();
                eprintln!("{}", style("✓ Conversation cleared").green());
            }
            "history" => print_history(&bot),
            _ => {
                let reply = bot.chat(message);
                println!("\n{} {}\n", style("Advisor:").bold().green(), reply);
            }
        }
    }

    Ok(())
}

fn print_history(bot: &Chatbot) {
    let turns = bot.chat_history();
    if turns.is_empty() {
        eprintln!("No messages yet.");
        return;
    }

    for turn in turns {
        println!(
            "[{}] {}: {}",
            turn.at.format("%H:%M:%S"),
            style(turn.role).bold(),
            turn.content
        );
    }
}

/// Answer a single message and print the reply
#[inline]
pub fn ask(message: &str) -> Result<()> {
    let mut bot = Chatbot::from_config(&Config::load_effective()?)?;
    println!("{}", bot.chat(message));
    Ok(())
}

/// Embed the built-in catalog and upsert it into the vector index
#[inline]
pub fn populate_index() -> Result<()> {
    let config = Config::load_effective()?;
    let search = ProductSearch::from_config(&config)?;
    let catalog = Catalog::builtin();

    let bar = ProgressBar::new(catalog.len() as u64).with_style(
        ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding {msg}")
            .context("Invalid progress template")?,
    );

    let result = search.populate_with_progress(catalog, |product| {
        bar.set_message(product.name.clone());
        bar.inc(1);
    });
    bar.finish_and_clear();

    let report = result.context("Failed to populate index")?;
    println!(
        "{} Indexed {} products in {} batch(es)",
        style("✓").green(),
        report.embedded,
        report.batches
    );
    if report.skipped > 0 {
        println!(
            "{} Skipped {} products without embeddings",
            style("⚠").yellow(),
            report.skipped
        );
    }

    Ok(())
}

#[inline]
pub fn show_index_stats() -> Result<()> {
    let config = Config::load_effective()?;
    let search = ProductSearch::from_config(&config)?;

    println!("📊 Index: {}", config.pinecone.index_name);
    match search.stats() {
        Some(stats) => {
            println!("   Total vectors: {}", stats.total_vector_count);
            println!("   Dimension: {}", stats.dimension);
            println!("   Fullness: {:.1}%", stats.index_fullness * 100.0);
        }
        None => println!("   Statistics: Not available"),
    }

    Ok(())
}

/// Print the built-in catalog grouped by category
#[inline]
pub fn browse_catalog(query: &CatalogQuery) {
    let products = query.apply(Catalog::builtin());
    if products.is_empty() {
        println!("No products match these filters.");
        return;
    }

    println!("{} products:", products.len());
    for (category, group) in &products.iter().chunk_by(|p| p.category) {
        println!();
        println!("{}", style(category.display_name()).bold().cyan());
        for product in group {
            println!(
                "  {} {} ({}, {})",
                style(&product.id).dim(),
                product.name,
                product.brand,
                product.price_label()
            );
            println!("     {}", product.description);
        }
    }
}
