
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Password};
use std::path::Path;

use super::{Config, ConfigError, mask_secret};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Product Advisor Configuration Setup").bold().cyan());
    eprintln!();

    let config_dir = Config::config_dir()?;
    let mut config = load_existing_config(&config_dir)?;

    eprintln!("{}", style("Azure OpenAI Chat").bold().yellow());
    eprintln!("Language model used for intent extraction and replies.");
    configure_llm(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Azure OpenAI Embeddings").bold().yellow());
    configure_embedding(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Pinecone").bold().yellow());
    configure_pinecone(&mut config)?;

    eprintln!();
    match config.validate() {
        Ok(()) => {
            eprintln!("{}", style("Testing Pinecone connection...").yellow());
            if test_pinecone_connection(&config) {
                eprintln!("{}", style("✓ Pinecone reachable").green());
            } else {
                eprintln!(
                    "{}",
                    style("⚠ Warning: Could not reach Pinecone with this key").yellow()
                );
            }
        }
        Err(e) => {
            eprintln!("{} {}", style("⚠ Incomplete configuration:").yellow(), e);
            eprintln!("Missing values can also be supplied through environment variables.");
        }
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config_dir = Config::config_dir()?;
    let mut config = Config::load(&config_dir).context("Failed to load configuration")?;
    config.apply_env(|key| std::env::var(key).ok());

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Azure OpenAI Chat:").bold().yellow());
    eprintln!("  Endpoint: {}", style(&config.llm.endpoint).cyan());
    eprintln!("  API Key: {}", style(mask_secret(&config.llm.api_key)).cyan());
    eprintln!("  Deployment: {}", style(&config.llm.deployment).cyan());
    eprintln!("  API Version: {}", style(&config.llm.api_version).cyan());
    eprintln!("  Temperature: {}", style(config.llm.temperature).cyan());

    eprintln!();
    eprintln!("{}", style("Azure OpenAI Embeddings:").bold().yellow());
    eprintln!("  Endpoint: {}", style(&config.embedding.endpoint).cyan());
    eprintln!(
        "  API Key: {}",
        style(mask_secret(&config.embedding.api_key)).cyan()
    );
    eprintln!("  Model: {}", style(&config.embedding.model).cyan());
    eprintln!("  Dimension: {}", style(config.embedding.dimension).cyan());

    eprintln!();
    eprintln!("{}", style("Pinecone:").bold().yellow());
    eprintln!(
        "  API Key: {}",
        style(mask_secret(&config.pinecone.api_key)).cyan()
    );
    eprintln!("  Environment: {}", style(&config.pinecone.environment).cyan());
    eprintln!("  Index: {}", style(&config.pinecone.index_name).cyan());
    eprintln!("  Top K: {}", style(config.pinecone.top_k).cyan());

    eprintln!();
    match config.validate() {
        Ok(()) => eprintln!("  Status: {}", style("complete").green()),
        Err(e) => eprintln!("  Status: {} ({})", style("incomplete").red(), e),
    }

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config(config_dir: &Path) -> Result<Config> {
    if config_dir.join("config.toml").exists() {
        let config = Config::load(config_dir)?;
        eprintln!("{}", style("Found existing configuration.").green());
        Ok(config)
    } else {
        eprintln!(
            "{}",
            style("No existing configuration found. Using defaults.").yellow()
        );
        Config::load(config_dir)
    }
}

fn prompt_url(prompt: &str, current: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            if input.trim().is_empty() {
                return Ok(());
            }
            url::Url::parse(input.trim())
                .map(|_| ())
                .map_err(|_| ConfigError::InvalidUrl(input.clone()))
        })
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn prompt_text(prompt: &str, current: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// Empty input keeps the stored secret
fn prompt_secret(prompt: &str, current: &str) -> Result<String> {
    let value = Password::new()
        .with_prompt(format!("{} [{}]", prompt, mask_secret(current)))
        .allow_empty_password(true)
        .interact()?;
    Ok(if value.trim().is_empty() {
        current.to_string()
    } else {
        value.trim().to_string()
    })
}

fn configure_llm(config: &mut Config) -> Result<()> {
    let llm = &mut config.llm;
    llm.endpoint = prompt_url("Endpoint", &llm.endpoint)?;
    llm.api_key = prompt_secret("API key", &llm.api_key)?;
    llm.deployment = prompt_text("Deployment name", &llm.deployment)?;
    llm.api_version = prompt_text("API version", &llm.api_version)?;
    llm.temperature = Input::new()
        .with_prompt("Temperature")
        .default(llm.temperature)
        .validate_with(|input: &f32| -> Result<(), &str> {
            if (0.0..=2.0).contains(input) {
                Ok(())
            } else {
                Err("Temperature must be between 0.0 and 2.0")
            }
        })
        .interact_text()?;
    Ok(())
}

fn configure_embedding(config: &mut Config) -> Result<()> {
    let embedding = &mut config.embedding;
    embedding.endpoint = prompt_url("Endpoint", &embedding.endpoint)?;
    embedding.api_key = prompt_secret("API key", &embedding.api_key)?;
    embedding.model = prompt_text("Model deployment", &embedding.model)?;
    embedding.dimension = Input::new()
        .with_prompt("Embedding dimension")
        .default(embedding.dimension)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if (64..=4096).contains(input) {
                Ok(())
            } else {
                Err("Dimension must be between 64 and 4096")
            }
        })
        .interact_text()?;
    Ok(())
}

fn configure_pinecone(config: &mut Config) -> Result<()> {
    let pinecone = &mut config.pinecone;
    pinecone.api_key = prompt_secret("API key", &pinecone.api_key)?;
    pinecone.environment = prompt_text("Environment (region)", &pinecone.environment)?;
    pinecone.index_name = prompt_text("Index name", &pinecone.index_name)?;
    pinecone.top_k = Input::new()
        .with_prompt("Results per query")
        .default(pinecone.top_k)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err("Results per query must be between 1 and 100")
            }
        })
        .interact_text()?;
    Ok(())
}

fn test_pinecone_connection(config: &Config) -> bool {
    let Ok(base) = config.pinecone.controller_url() else {
        return false;
    };
    let Ok(url) = base.join("indexes") else {
        return false;
    };

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    agent
        .get(url.as_str())
        .header("Api-Key", config.pinecone.api_key.as_str())
        .call()
        .is_ok()
}
