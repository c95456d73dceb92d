use std::path::{Path, PathBuf};
use std::sync::Arc;

use careernest::auth::{Credentials, Registration};
use careernest::config::{API_URL_ENV, CONNECT_TIMEOUT_ENV, REQUEST_TIMEOUT_ENV, SESSION_FILE_ENV};
use careernest::services::ai::{self, SkillSource};
use careernest::services::fallback::{self, FallbackPolicy, Sourced};
use careernest::services::jobs::{self, JobDraft, JobFilter, JobId, JobQuery};
use careernest::services::profile::{self, CvUpload};
use careernest::{ApiError, AuthContext, ClientConfig, FileStore, HttpClient, SessionEvent};
use clap::{ArgGroup, Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

const SESSION_DIR: &str = ".careernest";
const SESSION_FILE_NAME: &str = "session.json";
const FALLBACK_SESSION_FILE: &str = ".careernest-session.json";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "careernest", about = "CareerNest command-line client")]
struct Cli {
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    #[arg(long, env = REQUEST_TIMEOUT_ENV, help = "Request timeout in seconds")]
    timeout: Option<String>,

    #[arg(long, env = CONNECT_TIMEOUT_ENV, help = "Connect timeout in seconds")]
    connect_timeout: Option<String>,

    #[arg(long, env = SESSION_FILE_ENV, help = "Where the login session is kept")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAREERNEST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    Register(RegisterArgs),
    Activate {
        uid: String,
        token: String,
    },
    PasswordReset {
        email: String,
    },
    PasswordResetConfirm {
        uid: String,
        token: String,
        #[arg(long, env = "CAREERNEST_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    Jobs(JobsCommand),
    Profile(ProfileCommand),
    Ai(AiCommand),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "CAREERNEST_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long, help = "Defaults to --password")]
    confirm_password: Option<String>,
    #[arg(long)]
    education: String,
    #[arg(long, default_value = careernest::auth::types::DEFAULT_EXPERIENCE_LEVEL)]
    experience_level: String,
    #[arg(long)]
    preferred_track: String,
}

#[derive(Args, Debug)]
struct JobsCommand {
    #[command(subcommand)]
    command: JobsSubcommand,
}

#[derive(Subcommand, Debug)]
enum JobsSubcommand {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: String,
    },
    Search {
        query: String,
    },
    Filter {
        #[arg(long)]
        skill: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        job_type: Option<String>,
    },
    AdminList,
    AdminCreate(JobDraftArgs),
    AdminUpdate {
        id: String,
        #[command(flatten)]
        draft: JobDraftArgs,
    },
    AdminPatch {
        id: String,
        #[arg(long)]
        data: String,
    },
    AdminDelete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct JobDraftArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    company: String,
    #[arg(long)]
    location: String,
    #[arg(long, help = "Comma-separated list")]
    skills: String,
    #[arg(long, default_value = jobs::DEFAULT_DRAFT_EXPERIENCE_LEVEL)]
    experience_level: String,
    #[arg(long, default_value = jobs::DEFAULT_JOB_TYPE)]
    job_type: String,
}

impl From<JobDraftArgs> for JobDraft {
    fn from(args: JobDraftArgs) -> Self {
        Self {
            title: args.title,
            company: args.company,
            location: args.location,
            required_skills: jobs::parse_skills(&args.skills),
            experience_level: args.experience_level,
            job_type: args.job_type,
        }
    }
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Show,
    Patch {
        #[arg(long)]
        data: String,
    },
    UploadCv {
        path: PathBuf,
    },
    DeleteCv,
}

#[derive(Args, Debug)]
struct AiCommand {
    #[command(subcommand)]
    command: AiSubcommand,
}

#[derive(Subcommand, Debug)]
enum AiSubcommand {
    Recommend(FallbackArgs),
    Gap(FallbackArgs),
    Roadmap(FallbackArgs),
    Chat {
        question: String,
        #[command(flatten)]
        fallback: FallbackArgs,
    },
    ExtractSkills(ExtractArgs),
}

#[derive(Args, Debug)]
struct FallbackArgs {
    #[arg(long, default_value_t = false, help = "Show sample content if the backend is unreachable")]
    fallback: bool,
}

impl FallbackArgs {
    fn policy(&self) -> FallbackPolicy {
        if self.fallback { FallbackPolicy::UseSample } else { FallbackPolicy::Surface }
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["text", "file"])))]
struct ExtractArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let session_path = config.session_file.clone().unwrap_or_else(|| default_session_file(home_dir().as_deref()));
    let store = Arc::new(FileStore::open(session_path)?);
    let client = Arc::new(HttpClient::new(&config, store)?);

    let auth = AuthContext::new(Arc::clone(&client));
    auth.restore_session();
    auth.watch_session();
    let mut events = client.subscribe();

    let result = run(&auth, cli.command).await;

    if session_expired(&mut events) {
        eprintln!("Your session has expired. Run `careernest login` to sign in again.");
    }
    auth.teardown();
    result
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Flags (with their env fallbacks) layered over the library defaults.
fn build_config(cli: &Cli) -> Result<ClientConfig, ApiError> {
    ClientConfig::from_lookup(|key| match key {
        API_URL_ENV => cli.api_url.clone(),
        REQUEST_TIMEOUT_ENV => cli.timeout.clone(),
        CONNECT_TIMEOUT_ENV => cli.connect_timeout.clone(),
        SESSION_FILE_ENV => cli.session_file.as_ref().map(|p| p.display().to_string()),
        _ => None,
    })
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").filter(|h| !h.is_empty()).map(PathBuf::from)
}

fn default_session_file(home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) => home.join(SESSION_DIR).join(SESSION_FILE_NAME),
        None => PathBuf::from(FALLBACK_SESSION_FILE),
    }
}

fn session_expired(events: &mut broadcast::Receiver<SessionEvent>) -> bool {
    let mut expired = false;
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Expired) => expired = true,
            Ok(SessionEvent::Refreshed) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(_) => return expired,
        }
    }
}

async fn run(auth: &AuthContext, command: Command) -> Result<(), CliError> {
    let client = auth.client();
    match command {
        Command::Login { email, password } => {
            let response = auth.login(&Credentials::new(email, password)).await?;
            println!("Logged in as {}", response.user.display_name());
            Ok(())
        }
        Command::Logout => {
            auth.logout().await;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            match auth.state().user {
                Some(user) if auth.state().is_authenticated() => print_json(&user)?,
                _ => println!("Not logged in"),
            }
            Ok(())
        }
        Command::Register(args) => {
            let confirm_password = args.confirm_password.unwrap_or_else(|| args.password.clone());
            let form = Registration {
                full_name: args.full_name,
                email: args.email,
                password: args.password,
                confirm_password,
                education: args.education,
                experience_level: args.experience_level,
                preferred_track: args.preferred_track,
            };
            print_json(&auth.register(&form).await?)?;
            eprintln!("Check {} for the activation link.", form.email);
            Ok(())
        }
        Command::Activate { uid, token } => print_json(&auth.activate_account(&uid, &token).await?),
        Command::PasswordReset { email } => print_json(&auth.request_password_reset(&email).await?),
        Command::PasswordResetConfirm { uid, token, new_password } => {
            print_json(&auth.confirm_password_reset(&uid, &token, &new_password).await?)
        }
        Command::Jobs(cmd) => run_jobs(client, cmd.command).await,
        Command::Profile(cmd) => run_profile(client, cmd.command).await,
        Command::Ai(cmd) => run_ai(client, cmd.command).await,
    }
}

async fn run_jobs(client: &HttpClient, command: JobsSubcommand) -> Result<(), CliError> {
    match command {
        JobsSubcommand::List { page, search } => {
            let list = jobs::list(client, &JobQuery { page, search }).await?;
            print_json(&list.into_jobs())
        }
        JobsSubcommand::Show { id } => print_json(&jobs::get(client, &JobId::from(id.as_str())).await?),
        JobsSubcommand::Search { query } => print_json(&jobs::search(client, &query).await?),
        JobsSubcommand::Filter { skill, location, job_type } => {
            let facets = JobFilter { skill, location, job_type };
            if facets.is_empty() {
                let list = jobs::list(client, &JobQuery::default()).await?;
                return print_json(&list.into_jobs());
            }
            print_json(&jobs::filter(client, &facets).await?)
        }
        JobsSubcommand::AdminList => print_json(&jobs::admin_list(client).await?.into_jobs()),
        JobsSubcommand::AdminCreate(args) => print_json(&jobs::admin_create(client, &args.into()).await?),
        JobsSubcommand::AdminUpdate { id, draft } => {
            print_json(&jobs::admin_update(client, &JobId::from(id.as_str()), &draft.into()).await?)
        }
        JobsSubcommand::AdminPatch { id, data } => {
            let changes = parse_object(&data, "--data")?;
            print_json(&jobs::admin_patch(client, &JobId::from(id.as_str()), &changes).await?)
        }
        JobsSubcommand::AdminDelete { id } => {
            jobs::admin_delete(client, &JobId::from(id.as_str())).await?;
            println!("Deleted job {id}");
            Ok(())
        }
    }
}

async fn run_profile(client: &HttpClient, command: ProfileSubcommand) -> Result<(), CliError> {
    match command {
        ProfileSubcommand::Show => print_json(&profile::get(client).await?),
        ProfileSubcommand::Patch { data } => {
            let changes = parse_object(&data, "--data")?;
            print_json(&profile::patch(client, &changes).await?)
        }
        ProfileSubcommand::UploadCv { path } => {
            let cv = CvUpload::from_path(&path).await?;
            print_json(&profile::upload_cv(client, cv).await?)
        }
        ProfileSubcommand::DeleteCv => print_json(&profile::delete_cv(client).await?),
    }
}

async fn run_ai(client: &HttpClient, command: AiSubcommand) -> Result<(), CliError> {
    match command {
        AiSubcommand::Recommend(args) => {
            let result = ai::job_recommendations(client).await;
            print_sourced(&fallback::resolve(result, args.policy(), fallback::sample_recommendations)?)
        }
        AiSubcommand::Gap(args) => {
            let result = ai::gap_analysis(client).await;
            print_sourced(&fallback::resolve(result, args.policy(), fallback::sample_gap_analysis)?)
        }
        AiSubcommand::Roadmap(args) => {
            let result = ai::roadmap(client).await;
            print_sourced(&fallback::resolve(result, args.policy(), fallback::sample_roadmap)?)
        }
        AiSubcommand::Chat { question, fallback: args } => {
            let result = ai::ask_career_bot(client, &question).await;
            let answer = fallback::resolve(result, args.policy(), || fallback::sample_chat_answer(&question))?;
            if let Some(error) = answer.error() {
                eprintln!("(offline answer: {error})");
            }
            println!("{}", answer.value().text());
            Ok(())
        }
        AiSubcommand::ExtractSkills(args) => {
            let source = match (args.text, args.file) {
                (Some(text), _) => SkillSource::Text(text),
                (None, Some(path)) => {
                    let bytes = tokio::fs::read(&path)
                        .await
                        .map_err(|e| ApiError::Storage(format!("read {}: {e}", path.display())))?;
                    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                    SkillSource::File { file_name, bytes }
                }
                (None, None) => SkillSource::Text(String::new()),
            };
            print_json(&ai::extract_skills(client, source).await?)
        }
    }
}

fn parse_object(raw: &str, flag: &'static str) -> Result<Value, CliError> {
    let value = serde_json::from_str::<Value>(raw)?;
    if value.is_object() { Ok(value) } else { Err(CliError::NotAnObject(flag)) }
}

fn print_sourced<T: Serialize>(value: &Sourced<T>) -> Result<(), CliError> {
    if let Some(error) = value.error() {
        eprintln!("Backend unavailable ({error}); showing sample content.");
    }
    print_json(value)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
