use clap::CommandFactory;

use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("careernest").chain(args.iter().copied())).unwrap()
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn session_file_defaults_under_home() {
    assert_eq!(
        default_session_file(Some(Path::new("/home/ada"))),
        PathBuf::from("/home/ada/.careernest/session.json")
    );
    assert_eq!(default_session_file(None), PathBuf::from(".careernest-session.json"));
}

#[test]
fn flags_override_config() {
    let cli = parse(&[
        "--api-url",
        "https://jobs.example.com/api/",
        "--timeout",
        "30",
        "--session-file",
        "/tmp/s.json",
        "whoami",
    ]);
    let config = build_config(&cli).unwrap();
    assert_eq!(config.base_url, "https://jobs.example.com/api");
    assert_eq!(config.timeouts.request_secs, 30);
    assert_eq!(config.session_file, Some(PathBuf::from("/tmp/s.json")));
}

#[test]
fn bad_timeout_flag_is_rejected() {
    let cli = parse(&["--timeout", "0", "whoami"]);
    assert!(matches!(build_config(&cli), Err(ApiError::ConfigParse(_))));
}

#[test]
fn extract_skills_requires_a_source() {
    let missing = Cli::try_parse_from(["careernest", "ai", "extract-skills"]);
    assert!(missing.is_err());
    let cli = parse(&["ai", "extract-skills", "--text", "Rust and SQL"]);
    assert!(matches!(
        cli.command,
        Command::Ai(AiCommand { command: AiSubcommand::ExtractSkills(ExtractArgs { text: Some(_), file: None }) })
    ));
}

#[test]
fn fallback_flag_selects_policy() {
    let cli = parse(&["ai", "roadmap", "--fallback"]);
    let Command::Ai(AiCommand { command: AiSubcommand::Roadmap(args) }) = cli.command else {
        panic!("expected ai roadmap");
    };
    assert_eq!(args.policy(), FallbackPolicy::UseSample);
}

#[test]
fn job_draft_args_split_skills() {
    let cli = parse(&[
        "jobs", "admin-create", "--title", "Dev", "--company", "Acme", "--location", "Remote", "--skills", "Rust, SQL",
    ]);
    let Command::Jobs(JobsCommand { command: JobsSubcommand::AdminCreate(args) }) = cli.command else {
        panic!("expected jobs admin-create");
    };
    let draft = JobDraft::from(args);
    assert_eq!(draft.required_skills, vec!["Rust", "SQL"]);
    assert_eq!(draft.job_type, "Full-time");
}

#[test]
fn patch_data_must_be_an_object() {
    assert!(parse_object(r#"{"bio":"hi"}"#, "--data").is_ok());
    assert!(matches!(parse_object("[1]", "--data"), Err(CliError::NotAnObject("--data"))));
    assert!(matches!(parse_object("{", "--data"), Err(CliError::InvalidJson(_))));
}
