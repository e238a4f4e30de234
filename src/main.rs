use std::collections::BTreeSet;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};

use flashgen::api::{
    ApiError, FlashcardsPage, HttpClient, ListFlashcardsParams, RegisterRequest, Suggestion,
};
use flashgen::auth::{
    self, FileTokenStore, MemoryTokenStore, StaticTokenStore, TokenStore, credentials_path,
};
use flashgen::config::{self, Config};
use flashgen::error::FlashgenError;
use flashgen::workflow::{GenerationWorkflow, PollingConfig, WorkflowState};

mod cli;

use cli::{Cli, Command, EditArg, SourceArg};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Install color-eyre panic hook for better error messages
    color_eyre::install()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Command::Register {
            username,
            email,
            first_name,
            last_name,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            let form = RegisterRequest {
                username,
                password,
                email,
                first_name,
                last_name,
            };
            register(&config, &form).await
        }
        Command::Login { username, password } => login(&config, &username, password).await,
        Command::Logout => logout(),
        Command::List {
            page,
            size,
            sort,
            source,
        } => list(&config, page, size, sort, source).await,
        Command::Generate {
            input,
            approve,
            approve_all,
            edit,
        } => generate(&config, &input, &approve, approve_all, &edit).await,
    }
}

fn load_config(path: Option<&Path>) -> Config {
    let result = match path {
        Some(path) => {
            let mut result = config::load_config_from_path(path);
            result
                .config
                .apply_env_overrides(|name| std::env::var(name).ok());
            result
        }
        None => config::load_config(),
    };

    if let Some(warning) = result.warning {
        eprintln!("Warning: {}", warning);
    }
    result.config
}

fn credentials_store() -> Result<FileTokenStore, FlashgenError> {
    let path = credentials_path().ok_or_else(|| {
        FlashgenError::Credentials("could not determine home directory".to_string())
    })?;
    Ok(FileTokenStore::open(path))
}

/// Static token from config/env wins over stored credentials
fn token_store(config: &Config) -> Result<Arc<dyn TokenStore>, FlashgenError> {
    match &config.api.token {
        Some(token) => Ok(Arc::new(StaticTokenStore::new(token.clone()))),
        None => Ok(Arc::new(credentials_store()?)),
    }
}

async fn register(config: &Config, form: &RegisterRequest) -> Result<()> {
    let client = HttpClient::from_config(&config.api, Arc::new(MemoryTokenStore::new()))?;
    let response = auth::register(&client, form).await?;

    println!(
        "Registered {} (user {}). Log in with `flashgen login --username {}`.",
        form.username, response.user_id, form.username
    );
    Ok(())
}

async fn login(config: &Config, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    let store = Arc::new(credentials_store()?);
    let client = HttpClient::from_config(&config.api, store.clone())?;
    let response = auth::login(&client, &store, username, &password).await?;

    println!("Logged in as {}", response.username);
    Ok(())
}

fn logout() -> Result<()> {
    credentials_store()?.clear();
    println!("Logged out");
    Ok(())
}

async fn list(
    config: &Config,
    page: u32,
    size: u32,
    sort: String,
    source: Option<SourceArg>,
) -> Result<()> {
    let client = HttpClient::from_config(&config.api, token_store(config)?)?;
    let params = ListFlashcardsParams {
        page: page.saturating_sub(1),
        size,
        sort,
        source: source.map(Into::into),
    };

    let flashcards = match client.list_flashcards(&params).await {
        Ok(flashcards) => flashcards,
        Err(ApiError::Api { code: 401, .. }) => {
            return Err(eyre!(
                "Not logged in or session expired. Run `flashgen login` first."
            ));
        }
        Err(e) => return Err(e.into()),
    };

    print_flashcards(&flashcards);
    Ok(())
}

fn print_flashcards(flashcards: &FlashcardsPage) {
    let page = flashcards.page;
    if flashcards.content.is_empty() {
        println!("No flashcards found (page {} of {})", page.number + 1, page.total_pages.max(1));
        return;
    }

    println!(
        "Page {} of {} ({} flashcards)\n",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    );

    let first = u64::from(page.number) * u64::from(page.size);
    for (offset, flashcard) in (1u64..).zip(&flashcards.content) {
        println!(
            "{}. [{}] Q: {}",
            first + offset,
            flashcard.source.label(),
            flashcard.front_content
        );
        println!("   A: {}", flashcard.back_content);
    }
}

fn read_password() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .wrap_err("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .wrap_err("Failed to read input from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
            .wrap_err_with(|| format!("Failed to read {}", input.display()))
    }
}

async fn generate(
    config: &Config,
    input: &Path,
    approve: &[usize],
    approve_all: bool,
    edits: &[EditArg],
) -> Result<()> {
    let text = read_input(input)?;
    let polling = PollingConfig::from_config(&config.generation)?;
    let client = HttpClient::from_config(&config.api, token_store(config)?)?;

    let mut workflow = GenerationWorkflow::new(Arc::new(client), polling);
    workflow.set_input_text(text);

    workflow.generate_flashcards().await;
    if let Some(error) = workflow.error() {
        return Err(error.into());
    }

    eprintln!("Generating flashcards...");
    workflow.wait_for_polling().await;
    if let Some(error) = workflow.error() {
        return Err(error.into());
    }

    let suggestions = workflow.snapshot().suggestions().to_vec();
    for edit in edits {
        let id = suggestion_id(&suggestions, edit.number)?;
        workflow.edit_suggestion(id, edit.field, edit.value.clone());
    }

    if approve_all {
        workflow.toggle_all_selections();
    } else {
        // Dedup so a repeated number does not toggle twice
        let numbers: BTreeSet<usize> = approve.iter().copied().collect();
        for number in numbers {
            workflow.toggle_selection(suggestion_id(&suggestions, number)?);
        }
    }

    print_suggestions(&workflow.snapshot());

    let count = workflow.selected_count();
    if count == 0 {
        println!("\nNothing approved. Re-run with --approve N or --approve-all to save.");
        return Ok(());
    }

    if !workflow.save_approved().await {
        let error = workflow
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Error saving flashcards. Please try again.".to_string());
        return Err(eyre!(error));
    }

    println!("\nSaved {} flashcard{}", count, if count == 1 { "" } else { "s" });
    Ok(())
}

fn suggestion_id(suggestions: &[Suggestion], number: usize) -> Result<&str> {
    number
        .checked_sub(1)
        .and_then(|index| suggestions.get(index))
        .map(|s| s.suggestion_id.as_str())
        .ok_or_else(|| eyre!("No flashcard #{} ({} generated)", number, suggestions.len()))
}

fn print_suggestions(state: &WorkflowState) {
    let suggestions = state.suggestions();
    println!(
        "Generated {} flashcards (session {})\n",
        suggestions.len(),
        state.session_id().unwrap_or("-")
    );

    for (index, suggestion) in suggestions.iter().enumerate() {
        let Some(content) = state.display_content(&suggestion.suggestion_id) else {
            continue;
        };
        let marker = if state.is_selected(&suggestion.suggestion_id) {
            "[x]"
        } else {
            "[ ]"
        };
        println!("{} {}. Q: {}", marker, index + 1, content.front);
        println!("       A: {}", content.back);
    }
}
