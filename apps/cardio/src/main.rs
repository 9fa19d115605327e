use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_settings, login, logout, present, signup, AuthGuard, ClientSettings, FileSessionStore,
    FormModel, HttpApi, Presentation, SessionContext, SubmissionController, SubmissionState,
};
use shared::domain::{FieldKey, FieldKind};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Heart disease risk prediction client
#[derive(Parser, Debug)]
#[command(name = "cardio", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./cardio.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the API, e.g. http://127.0.0.1:5000/api
    #[arg(long)]
    api_url: Option<String>,

    /// Where the session flag is stored
    #[arg(long)]
    session_path: Option<PathBuf>,

    /// Deadline for a prediction request in seconds; 0 disables it
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the session
    Logout,
    /// Show whether a session is active
    Status,
    /// List the prediction inputs and their accepted codes
    Fields,
    /// Submit the inputs for a risk prediction (requires login)
    Predict(PredictArgs),
}

/// Raw inputs. Anything left out is submitted as an empty value.
#[derive(Args, Debug, Default)]
struct PredictArgs {
    #[arg(long, allow_hyphen_values = true)]
    age: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    sex: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    cp: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    trestbps: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    chol: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    fbs: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    restecg: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    thalach: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    exang: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    oldpeak: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    slope: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    ca: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    thal: Option<String>,
}

impl PredictArgs {
    fn into_form(self) -> FormModel {
        let mut form = FormModel::new();
        let values = [
            (FieldKey::Age, self.age),
            (FieldKey::Sex, self.sex),
            (FieldKey::Cp, self.cp),
            (FieldKey::Trestbps, self.trestbps),
            (FieldKey::Chol, self.chol),
            (FieldKey::Fbs, self.fbs),
            (FieldKey::Restecg, self.restecg),
            (FieldKey::Thalach, self.thalach),
            (FieldKey::Exang, self.exang),
            (FieldKey::Oldpeak, self.oldpeak),
            (FieldKey::Slope, self.slope),
            (FieldKey::Ca, self.ca),
            (FieldKey::Thal, self.thal),
        ];
        for (key, raw) in values {
            if let Some(raw) = raw {
                form.set_field(key, raw);
            }
        }
        form
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = resolve_settings(&cli)?;
    let session_path = settings.resolve_session_path()?;
    tracing::debug!(
        api = %settings.api_base_url,
        session = %session_path.display(),
        "settings resolved"
    );
    let session = SessionContext::new(Arc::new(FileSessionStore::new(session_path)));
    let api = Arc::new(HttpApi::new(settings.api_base_url.clone()));

    match cli.command {
        Command::Login { email, password } => {
            match login(api.as_ref(), &session, &email, &password).await {
                Ok(route) => {
                    println!("Logged in. Continue at {route}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Signup {
            name,
            email,
            password,
        } => match signup(api.as_ref(), &name, &email, &password).await {
            Ok(message) => {
                println!("{message}");
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                eprintln!("{err}");
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Logout => {
            let route = logout(&session).context("failed to log out")?;
            println!("Logged out. Continue at {route}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => {
            if session.is_authenticated() {
                println!("logged in");
            } else {
                println!("logged out");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Fields => {
            print!("{}", describe_fields());
            Ok(ExitCode::SUCCESS)
        }
        Command::Predict(args) => {
            let guard = AuthGuard::new(session);
            let form = match guard.protect(|| args.into_form()) {
                Ok(form) => form,
                Err(required) => {
                    eprintln!(
                        "Please log in first (cardio login). Redirecting to {}",
                        required.redirect
                    );
                    return Ok(ExitCode::from(2));
                }
            };
            let controller =
                SubmissionController::new(api).with_timeout(settings.request_timeout());
            let state = run_submission(&controller, &form).await;
            Ok(render_outcome(&state))
        }
    }
}

fn resolve_settings(cli: &Cli) -> Result<ClientSettings> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        settings.api_base_url = url.clone();
    }
    if let Some(path) = &cli.session_path {
        settings.session_path = Some(path.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        settings.request_timeout_secs = Some(secs);
    }
    settings.validate()?;
    Ok(settings)
}

/// Drives one submission, showing progress while busy. Ctrl-C aborts the request.
async fn run_submission(controller: &SubmissionController, form: &FormModel) -> SubmissionState {
    let submission = async {
        let (state, ()) = tokio::join!(
            controller.submit(form),
            show_progress(controller.subscribe())
        );
        state
    };
    tokio::pin!(submission);

    loop {
        tokio::select! {
            state = &mut submission => break state,
            Ok(()) = tokio::signal::ctrl_c() => controller.abort(),
        }
    }
}

async fn show_progress(mut updates: watch::Receiver<SubmissionState>) {
    let Ok(state) = updates
        .wait_for(|state| state.is_busy() || state.is_terminal())
        .await
        .map(|state| state.clone())
    else {
        return;
    };
    if let Some(text) = present(&state).text().filter(|_| state.is_busy()) {
        eprintln!("{text}");
    }
}

fn render_outcome(state: &SubmissionState) -> ExitCode {
    match present(state) {
        Presentation::Result(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Presentation::Error(text) => {
            eprintln!("error: {text}");
            ExitCode::FAILURE
        }
        Presentation::Nothing | Presentation::Progress(_) => ExitCode::FAILURE,
    }
}

fn describe_fields() -> String {
    let mut out = String::new();
    for key in FieldKey::ALL {
        match key.kind() {
            FieldKind::Numeric => {
                out.push_str(&format!("--{:<9} {} (number)\n", key.as_str(), key.label()));
            }
            FieldKind::Categorical(options) => {
                let choices = options
                    .iter()
                    .map(|option| format!("{}={}", option.value, option.label))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!("--{:<9} {} [{choices}]\n", key.as_str(), key.label()));
            }
        }
    }
    out
}
