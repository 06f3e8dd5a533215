use std::path::{Path, PathBuf};

use crate::config::{AppConfig, CredentialState, Credentials, LlmProvider};
use crate::core::error::Result;
use crate::core::types::CompletionRequest;
use crate::core::value::Value;
use crate::facade::ServiceFacade;

use super::args::{Commands, ConfigSubcommands};

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::load_from(Some(path))?),
        None => Ok(AppConfig::load()?),
    }
}

fn facade(config_path: Option<&Path>) -> Result<ServiceFacade> {
    let config = load_config(config_path)?;
    let credentials = Credentials::from_env()?;
    ServiceFacade::new(config, credentials)
}

/// Runs one subcommand to completion, writing results to stdout.
pub async fn execute(command: Commands, config_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Generate {
            prompt,
            provider,
            system,
            max_tokens,
            temperature,
        } => {
            let facade = facade(config_path)?;
            let mut request = CompletionRequest::prompt(prompt);
            if let Some(system) = system {
                request = request.with_system_prompt(system);
            }
            if let Some(max_tokens) = max_tokens {
                request = request.with_max_tokens(max_tokens);
            }
            if let Some(temperature) = temperature {
                request = request.with_temperature(temperature);
            }
            println!("{}", facade.generate(provider, request).await?);
        }
        Commands::Embed { text } => {
            let vector = facade(config_path)?.create_embedding(&text).await?;
            println!("{}", serde_json::to_string(&vector)?);
        }
        Commands::Search { vector, text, top_k } => {
            let facade = facade(config_path)?;
            let vector = match text {
                Some(text) => facade.create_embedding(&text).await?,
                None => vector,
            };
            let result = facade.search_vectors(vector, top_k).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Speak {
            text,
            voice,
            output,
        } => {
            let audio = facade(config_path)?.synthesize_speech(&text, &voice).await?;
            let path =
                output.unwrap_or_else(|| PathBuf::from(format!("speech.{}", audio.extension())));
            tokio::fs::write(&path, &audio.bytes).await?;
            println!(
                "✓ Wrote {} bytes of {} to {}",
                audio.len(),
                audio.content_type,
                path.display()
            );
        }
        Commands::Run { model, input } => {
            let input: Value = serde_json::from_str(&input)?;
            let output = facade(config_path)?.run_hosted_model(&model, input).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::LoadModel { name } => {
            let model = facade(config_path)?.load_local_model(&name).await?;
            println!("model:        {}", model.model.model_name);
            println!(
                "architecture: {}",
                model.model.architecture().unwrap_or("unknown")
            );
            println!(
                "weights:      {} ({} bytes)",
                model.model.weights_path.display(),
                model.model.weights.len()
            );
            match model.tokenizer.vocab_size() {
                Some(size) => println!("vocab size:   {size}"),
                None => println!("vocab size:   unknown"),
            }
        }
        Commands::Ask { question } => {
            let chain = facade(config_path)?.build_prompt_pipeline()?;
            println!("{}", chain.ask(&question).await?);
        }
        Commands::Providers => providers(config_path)?,
        Commands::Config { command } => config_command(&command, config_path)?,
    }
    Ok(())
}

fn providers(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let audit = Credentials::audit(|var| std::env::var(var).ok());
    let present = |var: &str| {
        audit
            .iter()
            .any(|(spec, state)| spec.var == var && *state == CredentialState::Present)
    };

    for provider in LlmProvider::ALL {
        let status = if present(provider.credential_var()) {
            "enabled"
        } else if provider.is_required() {
            "missing"
        } else {
            "disabled"
        };
        println!(
            "{:<16} {:<12} {:<9} {}",
            provider.as_str(),
            provider.display_name(),
            status,
            config.llm.model(provider)
        );
    }
    Ok(())
}

fn config_command(command: &ConfigSubcommands, config_path: Option<&Path>) -> Result<()> {
    match command {
        ConfigSubcommands::Init => {
            let path = match config_path {
                Some(path) => {
                    AppConfig::init_at(path)?;
                    path.to_path_buf()
                }
                None => AppConfig::init_default()?,
            };
            println!("✓ Created config file at {}", path.display());
        }
        ConfigSubcommands::Where => match config_path
            .map(Path::to_path_buf)
            .or_else(AppConfig::get_config_path)
        {
            Some(path) => println!("{}", path.display()),
            None => return Err(crate::config::ConfigError::NoConfigDir.into()),
        },
        ConfigSubcommands::Check => {
            load_config(config_path)?;
            let audit = Credentials::audit(|var| std::env::var(var).ok());
            for (spec, state) in &audit {
                let mark = match state {
                    CredentialState::Present => "✓",
                    CredentialState::Missing if !spec.required => "-",
                    CredentialState::Missing | CredentialState::Malformed(_) => "✗",
                };
                println!("{mark} {:<28} {}", spec.var, spec.purpose);
                if let CredentialState::Malformed(reason) = state {
                    println!("    {reason}");
                }
            }
            Credentials::from_env()?;
            println!("✓ Configuration is valid");
        }
    }
    Ok(())
}
