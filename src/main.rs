use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aitwin_gateway::api::ApiServer;
use aitwin_gateway::pipeline::AudioUpload;
use aitwin_gateway::{ApiKeys, Config, Persona, Pipeline};

/// AITwin - voice interview gateway for a persona digital twin
#[derive(Parser)]
#[command(name = "aitwin", version, about)]
struct Cli {
    /// Path to a configuration file (defaults to ~/.config/aitwin/config.toml)
    #[arg(short, long, env = "AITWIN_CONFIG")]
    config: Option<PathBuf>,

    /// Path to a persona TOML file; the embedded persona is used when unset
    #[arg(long, env = "AITWIN_PERSONA")]
    persona: Option<PathBuf>,

    /// Port to listen on (overrides the configuration file)
    #[arg(long, env = "AITWIN_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline once on a local audio file
    Ask {
        /// Audio file containing the question (wav, mp3, or m4a)
        file: PathBuf,

        /// Write the spoken answer to this MP3 file
        #[arg(long)]
        save_audio: Option<PathBuf>,
    },
    /// Check external tool and API key configuration
    Doctor,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,aitwin_gateway=info",
        1 => "info,aitwin_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let persona = load_persona(&cli, &config)?;

    if let Some(command) = cli.command {
        return match command {
            Command::Ask { file, save_audio } => {
                cmd_ask(&config, &persona, &file, save_audio.as_deref()).await
            }
            Command::Doctor => cmd_doctor(&config, &persona),
        };
    }

    tracing::info!(
        persona = %persona.identity.name,
        port = config.server.port,
        "starting aitwin gateway"
    );

    let keys = ApiKeys::from_env();
    let pipeline = Pipeline::from_config(&config, &persona, &keys)?;
    let server = ApiServer::new(pipeline, &persona, &config);

    tracing::info!(persona = %persona.identity.name, "gateway ready - upload a question");
    server.run().await?;

    Ok(())
}

/// Resolve the persona from CLI flag, config, or the embedded default
fn load_persona(cli: &Cli, config: &Config) -> anyhow::Result<Persona> {
    let path = cli.persona.as_ref().or(config.persona_path.as_ref());
    Ok(match path {
        Some(p) => Persona::load(p)?,
        None => Persona::embedded(),
    })
}

/// Run the pipeline once against a local file and print the exchange
async fn cmd_ask(
    config: &Config,
    persona: &Persona,
    file: &std::path::Path,
    save_audio: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let keys = ApiKeys::from_env();
    let pipeline = Pipeline::from_config(config, persona, &keys)?;

    let bytes = std::fs::read(file)?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let exchange = pipeline.ask(AudioUpload { file_name, bytes }).await?;

    println!("You asked: {}", exchange.question);
    if let Some(secs) = exchange.question_secs {
        println!("Question audio: {secs:.2}s");
    }
    println!("\n{} answers: {}", persona.identity.name, exchange.answer);

    if let Some(speech) = exchange.speech {
        if let Some(secs) = speech.secs {
            println!("Answer audio: {secs:.2}s");
        }
        if let Some(path) = save_audio {
            std::fs::write(path, &speech.audio)?;
            println!("Spoken answer written to {}", path.display());
        }
    }

    for warning in exchange.warnings {
        println!("warning: {warning}");
    }

    Ok(())
}

/// Check external tool and API key configuration
fn cmd_doctor(config: &Config, persona: &Persona) -> anyhow::Result<()> {
    println!("aitwin doctor\n");

    match config.audio.ffmpeg_path.as_ref() {
        Some(path) if path.exists() => println!("ffmpeg: ok ({})", path.display()),
        Some(path) => println!("ffmpeg: MISSING (configured path {} not found)", path.display()),
        None => match which::which("ffmpeg") {
            Ok(path) => println!("ffmpeg: ok ({})", path.display()),
            Err(_) => println!("ffmpeg: MISSING (not found on PATH)"),
        },
    }

    let keys = ApiKeys::from_env();
    println!(
        "GOOGLE_API_KEY: {}",
        if keys.google.is_some() { "ok" } else { "MISSING" }
    );
    println!(
        "GEMINI_API_KEY: {}",
        if keys.gemini.is_some() { "ok" } else { "MISSING" }
    );

    println!(
        "persona: {} ({} sample questions)",
        persona.identity.name,
        persona.personality.sample_questions.len()
    );

    Ok(())
}
