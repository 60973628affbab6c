/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → AppState 組み立て → subcommand の実行
 */
use std::{panic, process};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::AppError;
use crate::router::AuthState;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=portal_client=debug portal-client open /admin
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,portal_client=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // In development, fail fast.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::debug!(
        api_base_url = %config.api_base_url,
        storage = %config.storage_path.display(),
        "starting portal client in {:?} mode",
        config.app_env
    );

    let state = AppState::new(&config)?;
    if let Err(err) = execute(&state, cli.command).await {
        if err.is_unauthorized() {
            eprintln!("hint: run `portal-client login` to sign in again");
        }
        return Err(err.into());
    }
    Ok(())
}

async fn execute(state: &AppState, command: Command) -> Result<(), AppError> {
    match command {
        Command::Login { username, password } => {
            let response = state.api.login(&username, &password).await?;
            println!(
                "signed in as {username} ({} token)",
                response.token_type.as_deref().unwrap_or("bearer")
            );
            print_session(&state.guard.auth_state());
        }
        Command::Logout => {
            state.api.logout()?;
            println!("signed out");
        }
        Command::Status => print_session(&state.guard.auth_state()),
        Command::Open { path } => {
            let mut navigator = state.navigator();
            let navigation = navigator.push(&path)?;
            match &navigation.redirected_from {
                Some(from) => println!(
                    "{} ({}) [redirected from {from}]",
                    navigation.route, navigation.path
                ),
                None => println!("{} ({})", navigation.route, navigation.path),
            }
        }
        Command::Get { path } => {
            let body: serde_json::Value = state.api.get_json(&path).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
            );
        }
        Command::Routes => {
            for route in state.routes.routes() {
                let access = match (route.meta.requires_auth, &route.meta.required_role) {
                    (_, Some(role)) => format!("role:{role}"),
                    (true, None) => "signed-in".to_string(),
                    (false, None) => "public".to_string(),
                };
                println!("{:<22} {:<20} {access}", route.path, route.name);
            }
        }
    }

    Ok(())
}

fn print_session(state: &AuthState) {
    match state.session() {
        Some(session) => println!(
            "authenticated: role={} subject={} expires_at={}",
            session.role,
            session.subject.as_deref().unwrap_or("-"),
            session.expires_at.to_rfc3339()
        ),
        None => println!("not signed in"),
    }
}
