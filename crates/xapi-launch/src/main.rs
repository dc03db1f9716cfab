// Command-line course: resolve a launch URL, initialize the session, then
// send a statement or read/write a state document.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use xapi_core::model::{verb, PartialStatement, Verb};
use xapi_core::{
    CourseConfig, DocumentOptions, LrsResponse, SessionEvent, SessionOutcome, XapiCourse,
    XapiError,
};

#[derive(Parser)]
#[command(name = "xapi-launch")]
#[command(about = "Run a course session against an LRS", long_about = None)]
struct Cli {
    /// Launch URL (or query string) carrying endpoint, auth/fetch, actor,
    /// registration and activityId
    #[arg(long, env = "XAPI_LAUNCH_URL")]
    launch_url: String,

    /// Directory for the LRS traffic log
    #[arg(long, env = "XAPI_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// xAPI version header value
    #[arg(long, default_value = xapi_core::client::XAPI_VERSION)]
    xapi_version: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a statement about the launched activity
    Send {
        /// Verb name (e.g. experienced, passed) or a verb IRI
        #[arg(short, long, default_value = "experienced")]
        verb: String,
    },

    /// Send a completed statement
    Complete,

    /// Read a state document
    Get {
        state_id: String,
    },

    /// Replace a state document with a JSON value
    Put {
        state_id: String,

        /// Document body, as JSON
        value: String,
    },

    /// Initialize only and report the outcome
    Status,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), XapiError> {
    let course = XapiCourse::builder()
        .location(cli.launch_url)
        .config(CourseConfig {
            xapi_version: cli.xapi_version,
            log_dir: cli.log_dir,
        })
        .build()?;

    let mut events = course.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::Transition { state, .. } => log::debug!("session state: {:?}", state),
                SessionEvent::Failed { message, .. } => log::warn!("initialization failed: {}", message),
            }
        }
    });

    match course.outcome().await {
        SessionOutcome::Ready(handle) => log::info!("Session {} ready", handle.id()),
        SessionOutcome::Inert => {
            log::warn!("Session is inert; nothing will reach the LRS");
            if let Some(e) = course.take_init_error() {
                log::warn!("cause: {}", e);
            }
        }
        SessionOutcome::Error(e) => return Err(e),
    }

    let response = match cli.command {
        Commands::Send { verb } => {
            course
                .send(PartialStatement::verb(parse_verb(&verb)?))
                .await?
        }
        Commands::Complete => course.send_completed().await?,
        Commands::Get { state_id } => course.get(&state_id).await?,
        Commands::Put { state_id, value } => {
            let value: serde_json::Value = serde_json::from_str(&value)?;
            course.put(&value, &state_id, &DocumentOptions::json()).await?
        }
        Commands::Status => return Ok(()),
    };

    print_response(&response)
}

fn parse_verb(name: &str) -> Result<Verb, XapiError> {
    if name.contains("://") {
        return Ok(Verb {
            id: name.to_string(),
            display: None,
        });
    }
    let verb = match name {
        "answered" => verb::answered(),
        "attempted" => verb::attempted(),
        "completed" => verb::completed(),
        "experienced" => verb::experienced(),
        "failed" => verb::failed(),
        "initialized" => verb::initialized(),
        "passed" => verb::passed(),
        "progressed" => verb::progressed(),
        "terminated" => verb::terminated(),
        "abandoned" => verb::abandoned(),
        "satisfied" => verb::satisfied(),
        "waived" => verb::waived(),
        other => {
            return Err(XapiError::Configuration(format!(
                "unknown verb {:?}; pass a verb IRI instead",
                other
            )))
        }
    };
    Ok(verb)
}

fn print_response(response: &LrsResponse) -> Result<(), XapiError> {
    println!("HTTP {}", response.status);
    if let Some(body) = &response.body {
        println!("{}", serde_json::to_string_pretty(body)?);
    }
    Ok(())
}
