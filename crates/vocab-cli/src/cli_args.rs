use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Scripting and diagnostics frontend for the vocabulary backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "vocab", version, about, long_about = None)]
pub struct Cli {
    /// Bridge URL, overriding environment markers and config.toml.
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Mirror log output to stderr.
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Report whether a host bridge is reachable.
    Probe,
    /// Invoke any backend command with raw JSON arguments.
    Invoke(InvokeArgs),
    #[command(subcommand)]
    Books(BooksCommand),
    #[command(subcommand)]
    Plans(PlansCommand),
    #[command(subcommand)]
    Calendar(CalendarCommand),
    /// Overall study statistics.
    Stats,
    #[command(subcommand)]
    Data(DataCommand),
    #[command(subcommand)]
    Tts(TtsCommand),
    /// Extract words from a text file, analyze them and follow progress.
    Analyze(AnalyzeArgs),
    #[command(subcommand)]
    Analysis(AnalysisCommand),
}

#[derive(Debug, Clone, Args)]
pub struct InvokeArgs {
    /// Backend command name.
    pub command: String,
    /// Arguments as a JSON object.
    #[arg(long, default_value = "{}")]
    pub args: String,
}

/// Word book subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum BooksCommand {
    /// List word books.
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one word book.
    Show { book_id: i64 },
    /// Page through the words of a book.
    Words(WordsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct WordsArgs {
    pub book_id: i64,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 50)]
    pub page_size: u32,
    #[arg(long)]
    pub search: Option<String>,
}

/// Study plan subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum PlansCommand {
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        status: Option<String>,
    },
    /// Status change history of a plan.
    History { plan_id: i64 },
}

/// Calendar subcommands. Year, month and date default to today.
#[derive(Debug, Clone, Subcommand)]
pub enum CalendarCommand {
    Month {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        /// Show aggregated statistics instead of per-day data.
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    Day {
        /// Date as YYYY-MM-DD.
        date: Option<String>,
    },
    Today,
    Streak,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DataCommand {
    /// Database table statistics.
    Stats,
}

/// Text-to-speech subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TtsCommand {
    Voices {
        #[arg(long)]
        provider: Option<String>,
    },
    Providers,
    Speak(SpeakArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SpeakArgs {
    pub text: String,
    #[arg(long)]
    pub voice: Option<String>,
    #[arg(long)]
    pub speed: Option<f32>,
}

#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    /// Text file to extract words from.
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: String,
    /// Word book receiving the analyzed words.
    #[arg(long)]
    pub book_id: Option<i64>,
    #[arg(long)]
    pub min_length: Option<u32>,
    #[arg(long)]
    pub max_words: Option<u32>,
    #[arg(long)]
    pub batch_size: Option<u32>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum AnalysisCommand {
    /// Ask the backend to abandon the running batch job.
    Cancel,
    /// Print the current batch progress snapshot.
    Status,
}
