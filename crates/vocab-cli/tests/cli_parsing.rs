use clap::Parser;
use vocab_cli::{
    AnalysisCommand, BooksCommand, CalendarCommand, Cli, Command, PlansCommand, TtsCommand,
};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("vocab").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn test_global_endpoint_after_subcommand() {
    let cli = parse(&["books", "list", "--endpoint", "http://localhost:4815"]);
    assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:4815"));
    assert!(matches!(
        cli.command,
        Command::Books(BooksCommand::List { status: None })
    ));
}

#[test]
fn test_invoke_defaults_to_empty_object() {
    let cli = parse(&["invoke", "get_study_streak"]);
    let Command::Invoke(args) = cli.command else {
        panic!("expected invoke");
    };
    assert_eq!(args.command, "get_study_streak");
    assert_eq!(args.args, "{}");
}

#[test]
fn test_book_words_paging_defaults() {
    let cli = parse(&["books", "words", "7", "--search", "lu"]);
    let Command::Books(BooksCommand::Words(args)) = cli.command else {
        panic!("expected books words");
    };
    assert_eq!(args.book_id, 7);
    assert_eq!(args.page, 1);
    assert_eq!(args.page_size, 50);
    assert_eq!(args.search.as_deref(), Some("lu"));
}

#[test]
fn test_plan_history_takes_id() {
    let cli = parse(&["plans", "history", "3"]);
    assert!(matches!(
        cli.command,
        Command::Plans(PlansCommand::History { plan_id: 3 })
    ));
}

#[test]
fn test_calendar_month_options() {
    let cli = parse(&["calendar", "month", "--year", "2026", "--month", "10", "--stats"]);
    assert!(matches!(
        cli.command,
        Command::Calendar(CalendarCommand::Month {
            year: Some(2026),
            month: Some(10),
            stats: true
        })
    ));

    let cli = parse(&["calendar", "day"]);
    assert!(matches!(
        cli.command,
        Command::Calendar(CalendarCommand::Day { date: None })
    ));
}

#[test]
fn test_tts_speak_arguments() {
    let cli = parse(&["tts", "speak", "hello", "--voice", "rachel", "--speed", "1.5"]);
    let Command::Tts(TtsCommand::Speak(args)) = cli.command else {
        panic!("expected tts speak");
    };
    assert_eq!(args.text, "hello");
    assert_eq!(args.voice.as_deref(), Some("rachel"));
    assert_eq!(args.speed, Some(1.5));
}

#[test]
fn test_analyze_and_cancel() {
    let cli = parse(&["analyze", "notes.txt", "--book-id", "2", "--batch-size", "20", "-v"]);
    assert!(cli.verbose);
    let Command::Analyze(args) = cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(args.file, "notes.txt");
    assert_eq!(args.book_id, Some(2));
    assert_eq!(args.batch_size, Some(20));

    let cli = parse(&["analysis", "cancel"]);
    assert!(matches!(
        cli.command,
        Command::Analysis(AnalysisCommand::Cancel)
    ));
}

#[test]
fn test_subcommand_is_required() {
    assert!(Cli::try_parse_from(["vocab"]).is_err());
    assert!(Cli::try_parse_from(["vocab", "books", "show", "not-a-number"]).is_err());
}
