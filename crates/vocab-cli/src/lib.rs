//! Command-line frontend over `vocab-core`.

pub mod cli_args;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use vocab_core::services::word_analysis::{AnalysisRequest, ExtractionRequest};
use vocab_core::services::word_books::{WordBookFilter, WordQuery};
use vocab_core::services::study_plans::StudyPlanFilter;
use vocab_core::services::tts::SpeechRequest;
use vocab_core::{
    Args, BatchProgressPoller, BatchStatus, Envelope, FileConfig, HttpTransport, InvocationClient, PollEvent,
    Services, format_remaining,
};

pub use cli_args::{
    AnalysisCommand, AnalyzeArgs, BooksCommand, CalendarCommand, Cli, Command, DataCommand,
    InvokeArgs, PlansCommand, TtsCommand,
};

/// Client for this run. `--endpoint` bypasses bridge detection entirely.
pub fn build_client(endpoint: Option<&str>, config: &FileConfig) -> Result<InvocationClient> {
    match endpoint.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => {
            let timeout = Duration::from_secs(config.bridge.request_timeout_secs);
            let transport = HttpTransport::new(url, timeout)
                .context("failed to build bridge HTTP client")?;
            Ok(InvocationClient::with_transport(transport))
        }
        None => Ok(InvocationClient::from_config(config)),
    }
}

/// Parse `--args` into a command argument map.
pub fn parse_invoke_args(raw: &str) -> Result<Args> {
    match serde_json::from_str::<Value>(raw).context("--args must be valid JSON")? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Args::new()),
        other => bail!("--args must be a JSON object, got {other}"),
    }
}

/// Run one command. A failure envelope becomes an `Err` after the envelope is printed.
pub async fn run(cli: Cli, config: &FileConfig) -> Result<()> {
    let client = build_client(cli.endpoint.as_deref(), config)?;
    let services = Services::new(client.clone());

    match cli.command {
        Command::Probe => {
            let available = client.is_environment_available();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "available": available }))?
            );
            if !available {
                bail!("no host bridge detected");
            }
            Ok(())
        }
        Command::Invoke(args) => {
            let params = parse_invoke_args(&args.args)?;
            emit(client.invoke_raw(&args.command, params).await)
        }
        Command::Books(command) => run_books(&services, command).await,
        Command::Plans(command) => match command {
            PlansCommand::List { status } => emit(
                services
                    .study_plans
                    .get_study_plans(&StudyPlanFilter { status })
                    .await,
            ),
            PlansCommand::History { plan_id } => emit(
                services
                    .study_plans
                    .get_study_plan_status_history(plan_id)
                    .await,
            ),
        },
        Command::Calendar(command) => run_calendar(&services, command).await,
        Command::Stats => emit(services.statistics.get_study_statistics().await),
        Command::Data(DataCommand::Stats) => emit(services.data.get_database_statistics().await),
        Command::Tts(command) => match command {
            TtsCommand::Voices { provider } => {
                emit(services.tts.get_tts_voices(provider.as_deref()).await)
            }
            TtsCommand::Providers => emit(services.tts.get_tts_providers().await),
            TtsCommand::Speak(args) => emit(
                services
                    .tts
                    .text_to_speech(&SpeechRequest {
                        text: args.text,
                        voice_id: args.voice,
                        provider: None,
                        speed: args.speed,
                    })
                    .await,
            ),
        },
        Command::Analyze(args) => run_analysis(&services, args, config).await,
        Command::Analysis(AnalysisCommand::Cancel) => {
            emit(services.word_analysis.cancel_batch_analysis().await)
        }
        Command::Analysis(AnalysisCommand::Status) => {
            emit(services.word_analysis.get_batch_analysis_progress().await)
        }
    }
}

async fn run_books(services: &Services, command: BooksCommand) -> Result<()> {
    let books = &services.word_books;
    match command {
        BooksCommand::List { status } => {
            emit(books.get_word_books(&WordBookFilter { status }).await)
        }
        BooksCommand::Show { book_id } => emit(books.get_word_book_detail(book_id).await),
        BooksCommand::Words(args) => emit(
            books
                .get_words_by_book(&WordQuery {
                    book_id: args.book_id,
                    page: Some(args.page),
                    page_size: Some(args.page_size),
                    search: args.search,
                    part_of_speech: None,
                })
                .await,
        ),
    }
}

async fn run_calendar(services: &Services, command: CalendarCommand) -> Result<()> {
    let calendar = &services.calendar;
    let today = Local::now().date_naive();
    match command {
        CalendarCommand::Month { year, month, stats } => {
            let year = year.unwrap_or(today.year());
            let month = month.unwrap_or(today.month());
            if stats {
                emit(calendar.get_calendar_monthly_stats(year, month).await)
            } else {
                emit(calendar.get_calendar_month_data(year, month).await)
            }
        }
        CalendarCommand::Day { date } => {
            let date = date.unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
            emit(calendar.get_calendar_day_detail(&date).await)
        }
        CalendarCommand::Today => emit(calendar.get_today_study_schedules().await),
        CalendarCommand::Streak => emit(calendar.get_study_streak().await),
    }
}

async fn run_analysis(services: &Services, args: AnalyzeArgs, config: &FileConfig) -> Result<()> {
    let analysis = &services.word_analysis;
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file))?;

    let extracted = analysis
        .extract_words_from_text(&ExtractionRequest {
            text,
            min_length: args.min_length,
            max_words: args.max_words,
        })
        .await
        .into_result()
        .map_err(anyhow::Error::msg)
        .context("word extraction failed")?;
    if extracted.is_empty() {
        println!("No words extracted from {}.", args.file);
        return Ok(());
    }
    info!(count = extracted.len(), file = %args.file, "Extracted words");

    analysis
        .analyze_extracted_words(&AnalysisRequest {
            words: extracted.into_iter().map(|w| w.word).collect(),
            book_id: args.book_id,
            batch_size: args.batch_size,
        })
        .await
        .into_result()
        .map_err(anyhow::Error::msg)
        .context("failed to start batch analysis")?;

    let mut poller = analysis
        .poller()
        .with_interval(config.analysis.poll_interval());
    follow_progress(&mut poller, tokio::signal::ctrl_c()).await
}

/// Print progress until the job settles, cancelling it once `interrupt` resolves.
async fn follow_progress<F>(poller: &mut BatchProgressPoller, interrupt: F) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let mut stream = poller.start();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            event = stream.next() => match event {
                Some(PollEvent::Progress(snapshot)) => {
                    let eta = match snapshot.status {
                        BatchStatus::Analyzing => {
                            format!(" (ETA {})", format_remaining(snapshot.estimated_remaining_seconds()))
                        }
                        _ => String::new(),
                    };
                    eprintln!(
                        "[{:>5.1}%] {}{eta}",
                        snapshot.overall_percentage(),
                        snapshot.phase_text()
                    );
                }
                Some(PollEvent::Failed(failure)) => bail!("{failure}"),
                None => return Ok(()),
            },
            _ = &mut interrupt => {
                eprintln!("Cancelling batch analysis...");
                return emit(poller.cancel().await);
            }
        }
    }
}

fn emit<T: Serialize>(envelope: Envelope<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if let Some(message) = envelope.error() {
        bail!("{message}");
    }
    Ok(())
}
