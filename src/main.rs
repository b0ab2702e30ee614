use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;

use byte_tts::{
    ByteTTS, ClientConfig, SynthesisParams,
    core::tts::{LongTextRequest, TaskStatus},
    utils::sink,
};

/// byte-tts - ByteDance OpenSpeech text-to-speech client
#[derive(Parser, Debug)]
#[command(name = "byte-tts")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize text and write the audio to a file
    Speak {
        /// Voice code, e.g. BV406_V2_streaming
        #[arg(short = 'v', long = "voice")]
        voice: String,

        /// Output audio file
        #[arg(short = 'o', long = "output")]
        output: PathBuf,

        /// Output encoding (mp3, wav, pcm, ogg_opus)
        #[arg(short = 'e', long = "encoding", default_value = "mp3")]
        encoding: String,

        /// Speaking speed, 0.2 to 3.0
        #[arg(long = "speed", default_value_t = 1.0)]
        speed: f32,

        /// Send the text in one request instead of splitting it into chunks
        #[arg(long = "single")]
        single: bool,

        /// Text to synthesize; read from --file when omitted
        text: Option<String>,

        /// Read the text from a file
        #[arg(short = 'f', long = "file", conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Submit a long-text synthesis job
    Submit {
        #[arg(short = 'v', long = "voice")]
        voice: String,

        /// Output format (mp3, wav, pcm, ogg_opus)
        #[arg(long = "format", default_value = "mp3")]
        format: String,

        /// Text file to synthesize
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },

    /// Query a long-text synthesis job, downloading the audio when finished
    Query {
        task_id: String,

        /// Where to save the audio once the job succeeded
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path),
        None => ClientConfig::from_env(),
    }
    .map_err(|e| anyhow!("Failed to load configuration: {e}"))?;

    let tts = ByteTTS::new(config)?;

    match cli.command {
        Commands::Speak {
            voice,
            output,
            encoding,
            speed,
            single,
            text,
            file,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("Provide text or --file"),
            };

            let params = SynthesisParams::new(voice, text)
                .with_encoding(encoding)
                .with_speed_ratio(speed);

            let written = speak(&tts, &params, single, &output).await?;
            info!(bytes = written, output = %output.display(), "Audio saved");
        }
        Commands::Submit {
            voice,
            format,
            file,
        } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let response = tts
                .long_text_to_voice_create(LongTextRequest::new(text, voice).with_format(format))
                .await?;
            println!("{}", response.task_id);
        }
        Commands::Query { task_id, output } => {
            let response = tts.long_text_to_voice_query(&task_id).await?;
            match (response.status(), output) {
                (TaskStatus::Success, Some(path)) => {
                    let mut sink = tokio::fs::File::create(&path)
                        .await
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    let written = tts.download_audio(&response.audio_url, &mut sink).await?;
                    info!(bytes = written, output = %path.display(), "Audio saved");
                }
                (TaskStatus::Success, None) => println!("{}", response.audio_url),
                (TaskStatus::Running, _) => println!("running"),
                (TaskStatus::Failure, _) => anyhow::bail!(
                    "Task {task_id} failed: {}",
                    response.message.unwrap_or_default()
                ),
                (TaskStatus::Unknown(status), _) => {
                    anyhow::bail!("Task {task_id} has unknown status {status}")
                }
            }
        }
    }

    Ok(())
}

/// Synthesize `params` and save the audio to `output`.
///
/// The file is only created once synthesis succeeded, so a failed run never
/// leaves an empty or truncated file behind.
async fn speak(
    tts: &ByteTTS,
    params: &SynthesisParams,
    single: bool,
    output: &Path,
) -> anyhow::Result<u64> {
    let audio = if single {
        tts.text_to_voice_audio(params).await?
    } else {
        tts.text_to_join_voice(params).await?.audio
    };

    let mut sink = tokio::fs::File::create(output)
        .await
        .with_context(|| format!("Failed to create {}", output.display()))?;
    Ok(sink::write_bytes(&mut sink, &audio).await?)
}
