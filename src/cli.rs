//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use flashgen::api::FlashcardSource;
use flashgen::api::types::{DEFAULT_PAGE_SIZE, DEFAULT_SORT, MAX_PAGE_SIZE};
use flashgen::workflow::SuggestionField;

#[derive(Parser, Debug)]
#[command(name = "flashgen")]
#[command(version)]
#[command(about = "Generate flashcards from text with an AI backend", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/flashgen/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log in and store the access token
    Login {
        #[arg(short, long)]
        username: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Remove stored credentials
    Logout,

    /// List saved flashcards, newest first
    List {
        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Flashcards per page
        #[arg(
            long,
            default_value_t = DEFAULT_PAGE_SIZE,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGE_SIZE))
        )]
        size: u32,

        /// Sort order as `field,asc|desc`
        #[arg(long, default_value = DEFAULT_SORT)]
        sort: String,

        /// Only flashcards from this source
        #[arg(long, value_enum)]
        source: Option<SourceArg>,
    },

    /// Generate flashcards from a text file
    Generate {
        /// Input file, or `-` to read stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Approve suggestions by their printed number
        #[arg(
            short,
            long,
            value_name = "N",
            value_delimiter = ',',
            num_args = 1..,
            conflicts_with = "approve_all"
        )]
        approve: Vec<usize>,

        /// Approve every suggestion
        #[arg(long)]
        approve_all: bool,

        /// Edit a suggestion before approving it
        #[arg(short, long, value_name = "N:front|back=TEXT", value_parser = parse_edit)]
        edit: Vec<EditArg>,
    },
}

/// `--source` values for `list`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArg {
    /// Approved unchanged from AI suggestions
    Ai,
    /// AI suggestions edited before approval
    AiUser,
    /// Written by hand
    User,
}

impl From<SourceArg> for FlashcardSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Ai => FlashcardSource::Ai,
            SourceArg::AiUser => FlashcardSource::AiUser,
            SourceArg::User => FlashcardSource::User,
        }
    }
}

/// One `--edit` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditArg {
    /// 1-based position in the printed list
    pub number: usize,
    pub field: SuggestionField,
    pub value: String,
}

/// Parse `N:front=TEXT` / `N:back=TEXT`
pub fn parse_edit(arg: &str) -> Result<EditArg, String> {
    let malformed = || format!("expected N:front=TEXT or N:back=TEXT, got '{}'", arg);

    let (target, value) = arg.split_once('=').ok_or_else(malformed)?;
    let (number, field) = target.split_once(':').ok_or_else(malformed)?;

    let number: usize = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid flashcard number '{}'", number.trim()))?;
    if number == 0 {
        return Err("flashcard numbers start at 1".to_string());
    }

    let field = match field.trim().to_ascii_lowercase().as_str() {
        "front" => SuggestionField::Front,
        "back" => SuggestionField::Back,
        other => {
            return Err(format!("unknown field '{}', expected front or back", other));
        }
    };

    Ok(EditArg {
        number,
        field,
        value: value.to_string(),
    })
}
