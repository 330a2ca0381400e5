use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};

use erpdesk::config::{ClientConfig, ConfigError};
use erpdesk::error::ApiError;
use erpdesk::net::types::{RegisterPayload, UserCreate};
use erpdesk::router::NavigationError;
use erpdesk::App;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("{0}")]
    Users(String),
    #[error("output encoding failed: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "E_CONFIG",
            Self::Api(e) => e.error_code(),
            Self::Navigation(_) => "E_NAVIGATION",
            Self::Users(_) => "E_USERS",
            Self::Output(_) => "E_OUTPUT",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "erpdesk", about = "ERP back office API client")]
struct Cli {
    /// Overrides `ERP_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `ERP_SESSION_FILE`.
    #[arg(long)]
    session_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ERP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    Refresh,
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        showname: String,
        #[arg(long, default_value = "user")]
        userrole: String,
        #[arg(long, env = "ERP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Users(UsersCommand),
    /// Show where navigating to a path lands.
    Route {
        path: String,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    Search {
        last_name: String,
    },
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error[{}]: {e}", e.error_code());
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    Ok(ClientConfig::from_env_with(cli.base_url.as_deref(), cli.session_file.as_deref())?)
}

async fn run(cli: Cli) -> Result<String, CliError> {
    let config = resolve_config(&cli)?;
    let app = App::from_config(&config)?;

    let output: Value = match cli.command {
        Command::Login { username, password } => {
            let user = app.auth.login(&username, &password).await?;
            json!({ "authenticated": app.auth.is_authenticated(), "user": user })
        }
        Command::Logout => {
            app.auth.logout().await;
            json!({ "authenticated": false })
        }
        Command::Whoami => json!({ "authenticated": app.auth.is_authenticated(), "user": app.auth.user() }),
        Command::Refresh => {
            app.auth.refresh().await?;
            json!({ "refreshed": true })
        }
        Command::Register { username, showname, userrole, password } => {
            let payload = RegisterPayload { username, showname, userrole, password };
            let created = app.auth.register(&payload).await?;
            json!({ "created": created })
        }
        Command::Users(UsersCommand { command }) => {
            let mut users = app.users();
            match command {
                UsersSubcommand::Search { last_name } => users.search_by_last_name(&last_name).await,
                UsersSubcommand::Add { first_name, last_name } => {
                    users.add_user(UserCreate { first_name, last_name }).await;
                }
            }
            if let Some(error) = &users.state().error {
                return Err(CliError::Users(error.clone()));
            }
            json!({ "count": users.state().count(), "users": users.state().list })
        }
        Command::Route { path } => {
            let landing = app.navigator.navigate(&path).await?;
            json!({
                "route": format!("{:?}", landing.route.name),
                "location": landing.location.full_path(),
                "title": landing.title(),
                "redirects": landing.redirects,
            })
        }
    };
    Ok(serde_json::to_string_pretty(&output)?)
}
