use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    controller::GENERIC_FAILURE_MESSAGE, load_settings, ClientSettings, HttpTranslationClient,
    SourceSelection, SubmissionController, SubmissionOutcome, SubmitError, VideoFile,
};
use shared::domain::{CaptionTable, LanguageCode, SUPPORTED_LANGUAGES};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "vidtranslate", about = "Translate videos through a translation backend")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one video and print the translated result
    Translate(TranslateArgs),
    /// List supported target languages and caption options
    Languages,
}

#[derive(ClapArgs, Debug)]
struct TranslateArgs {
    /// Local MP4 or MOV file to upload
    #[arg(long, conflicts_with = "youtube_url")]
    file: Option<PathBuf>,
    /// YouTube video to translate instead of a local file
    #[arg(long)]
    youtube_url: Option<String>,
    /// Target language code, e.g. "fr"
    #[arg(short, long)]
    language: Option<String>,
    /// "none", "translated", or a language code
    #[arg(short, long)]
    caption: Option<String>,
    /// Overrides the configured backend address
    #[arg(long)]
    backend_url: Option<String>,
    /// Save the translated video here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    let settings = load_settings();
    tracing::debug!(backend_url = %settings.backend_url, "settings loaded");

    match args.command {
        Command::Translate(translate) => run_translate(settings, translate).await,
        Command::Languages => {
            print_tables(&settings.caption_table()?);
            Ok(())
        }
    }
}

async fn run_translate(mut settings: ClientSettings, args: TranslateArgs) -> Result<()> {
    if let Some(url) = args.backend_url {
        settings.backend_url = url;
    }
    let endpoint = settings.endpoint()?;
    let captions = settings.caption_table()?;

    let mut controller = SubmissionController::with_defaults(
        endpoint.clone(),
        settings.default_language()?,
        settings.default_caption_option()?,
    );

    if let Some(code) = args.language {
        controller.set_language(LanguageCode::parse(&code)?);
    }
    if let Some(option) = args.caption {
        controller.set_caption_option(captions.parse(&option)?);
    }
    if let Some(path) = args.file {
        controller.select_file(VideoFile::open(&path).await?);
    }
    if let Some(url) = args.youtube_url {
        controller
            .select_youtube_url(&url)
            .with_context(|| user_message(&controller))?;
    }

    let client = HttpTranslationClient::new(endpoint);
    if controller.is_ready() {
        println!("Processing... (backend {})", client.endpoint());
    }

    let outcome = match controller.submit(&client).await {
        Ok(outcome) => outcome,
        Err(SubmitError::Validation(_)) => bail!("{}", user_message(&controller)),
        Err(err @ SubmitError::AlreadyInFlight) => return Err(err.into()),
    };

    match outcome {
        SubmissionOutcome::Succeeded => {}
        SubmissionOutcome::Discarded => bail!("submission was discarded"),
        SubmissionOutcome::BackendRejected | SubmissionOutcome::TransportFailed => {
            bail!("{}", user_message(&controller))
        }
    }

    print_result(&controller);

    if let (Some(dest), Some(result)) = (args.output, controller.result()) {
        let bytes = client
            .download_output_video(&result.translated_video_ref, &dest)
            .await
            .with_context(|| format!("failed to save translated video to {}", dest.display()))?;
        println!("Saved {} bytes to {}", bytes, dest.display());
    }

    Ok(())
}

fn user_message(controller: &SubmissionController) -> String {
    controller
        .error_message()
        .unwrap_or(GENERIC_FAILURE_MESSAGE)
        .to_string()
}

fn print_result(controller: &SubmissionController) {
    match controller.source() {
        Some(SourceSelection::File(file)) => {
            println!("Original video:   {}", file.path().display())
        }
        Some(SourceSelection::YoutubeUrl(url)) => {
            println!("Original video:   {}", url.embed_url())
        }
        None => {}
    }

    let Some(result) = controller.result() else {
        return;
    };
    println!("Translated video: {}", result.translated_video_ref);
    if let Some(transcription) = &result.transcription {
        println!("\nTranscription:\n{transcription}");
    }
    if let Some(summary) = &result.summary {
        println!("\nSummary:\n{summary}");
    }
}

fn print_tables(captions: &CaptionTable) {
    println!("Languages:");
    for language in SUPPORTED_LANGUAGES {
        println!("  {:<4} {}", language.code, language.label);
    }
    println!("\nCaption options:");
    for option in captions.options() {
        println!("  {:<11} {}", option.form_value(), option.label());
    }
}
