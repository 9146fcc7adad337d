use clap::{Parser, Subcommand};
use product_advisor::Result;
use product_advisor::catalog::Category;
use product_advisor::commands::{
    CatalogQuery, ask, browse_catalog, populate_index, run_chat, show_index_stats,
};
use product_advisor::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "product-advisor")]
#[command(about = "A conversational product recommendation assistant for phones, laptops and tablets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Azure OpenAI and Pinecone settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Start an interactive chat session
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// What you are looking for, e.g. "a laptop for video editing under $2000"
        message: String,
    },
    /// Embed the product catalog and upload it to the vector index
    Populate,
    /// Show vector index statistics
    Stats,
    /// Browse the built-in catalog without any network access
    Catalog {
        /// Only this category (phone, laptop, tablet)
        #[arg(long)]
        category: Option<Category>,
        /// Only this brand, case-insensitive
        #[arg(long)]
        brand: Option<String>,
        /// Minimum price, inclusive
        #[arg(long)]
        min_price: Option<f64>,
        /// Maximum price, inclusive
        #[arg(long)]
        max_price: Option<f64>,
        /// Keyword matched against names, descriptions, features and tags
        #[arg(long)]
        search: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Chat => {
            run_chat()?;
        }
        Commands::Ask { message } => {
            ask(&message)?;
        }
        Commands::Populate => {
            populate_index()?;
        }
        Commands::Stats => {
            show_index_stats()?;
        }
        Commands::Catalog {
            category,
            brand,
            min_price,
            max_price,
            search,
        } => {
            browse_catalog(&CatalogQuery {
                category,
                brand,
                min_price,
                max_price,
                search,
            });
        }
    }

    Ok(())
}
