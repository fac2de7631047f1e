//! Admin account management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use catalog_auth::{JwtEncoder, PasswordHasher, PasswordValidator};
use catalog_core::config::AppConfig;
use catalog_core::error::AppError;
use catalog_database::Store;
use catalog_entity::user::{User, UserRole};
use catalog_service::AuthService;

use crate::output::{self, OutputFormat};

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create a new admin account
    Create {
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
        /// Login email
        #[arg(short, long)]
        email: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Reset an account's password
    ResetPassword {
        /// Login email of the account
        #[arg(short, long)]
        email: String,
        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Account row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            created_at: user.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn auth_service(config: &AppConfig, store: &Store) -> AuthService {
    AuthService::new(
        store.users.clone(),
        PasswordHasher::new(),
        PasswordValidator::new(&config.auth),
        JwtEncoder::new(&config.auth),
    )
}

fn prompt_text(prompt: &str) -> Result<String, AppError> {
    dialoguer::Input::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

fn prompt_password(prompt: &str) -> Result<String, AppError> {
    dialoguer::Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

/// Execute admin commands
pub async fn execute(args: &AdminArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let (config, store) = super::open_store(env).await?;
    if store.provider_name() == "memory" {
        output::print_warning("Using the memory store; changes are lost when this command exits.");
    }
    let auth = auth_service(&config, &store);

    let result = match &args.command {
        AdminCommand::Create {
            name,
            email,
            password,
        } => {
            let name = match name {
                Some(n) => n.clone(),
                None => prompt_text("Admin name")?,
            };
            let email = match email {
                Some(e) => e.clone(),
                None => prompt_text("Admin email")?,
            };
            let password = match password {
                Some(p) => p.clone(),
                None => prompt_password("Admin password")?,
            };

            auth.create_user(&name, &email, &password, UserRole::Admin)
                .await
                .map(|user| {
                    output::print_success(&format!("Admin '{}' created", user.email));
                    output::print_list(&[UserRow::from(&user)], format);
                })
        }
        AdminCommand::ResetPassword { email, password } => {
            let password = match password {
                Some(p) => p.clone(),
                None => prompt_password("New password")?,
            };

            auth.reset_password(email, &password).await.map(|user| {
                output::print_success(&format!("Password reset for '{}'", user.email));
            })
        }
    };

    store.close().await;
    result.map_err(|e| {
        for field in &e.field_errors {
            output::print_kv(&field.field, &field.message);
        }
        e
    })
}
