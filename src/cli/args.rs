//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::LlmProvider;

#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read settings from this file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate text with one of the configured LLMs
    Generate {
        /// Prompt text
        prompt: String,

        #[arg(short, long, value_enum, default_value_t = LlmProvider::Primary)]
        provider: LlmProvider,

        /// System prompt
        #[arg(short, long)]
        system: Option<String>,

        #[arg(long)]
        max_tokens: Option<u32>,

        #[arg(short, long)]
        temperature: Option<f32>,
    },

    /// Print the embedding of a piece of text as JSON
    Embed { text: String },

    /// Query the vector index
    Search {
        /// Comma-separated query vector
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required_unless_present = "text")]
        vector: Vec<f32>,

        /// Embed this text and use it as the query vector
        #[arg(long, conflicts_with = "vector")]
        text: Option<String>,

        /// Maximum number of matches [default: 10]
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Synthesize speech and write the audio to a file
    Speak {
        text: String,

        #[arg(long)]
        voice: String,

        /// Output path; the extension follows the returned content type when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a hosted model (owner/name[:version])
    Run {
        model: String,

        /// Input as a JSON object
        #[arg(short, long, default_value = "{}")]
        input: String,
    },

    /// Download (or reuse from cache) a hub model and report what was loaded
    LoadModel { name: String },

    /// Answer a question through the prompt pipeline
    Ask { question: String },

    /// Show which providers are enabled by the current environment
    Providers,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommands {
    /// Initialize a new config file
    Init,
    /// Print config file location
    Where,
    /// Validate settings and credentials without contacting any provider
    Check,
}
