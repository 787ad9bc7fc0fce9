use std::path::PathBuf;

use anyhow::{bail, Context};
use campus_client::Config;
use campus_core::{Palette, Profile, Role, Route, Theme, User};
use clap::{Parser, Subcommand};

mod context;
mod logging;

use context::AppContext;

#[derive(Parser)]
#[command(name = "campus")]
#[command(about = "Campus rewards client")]
#[command(version)]
struct Cli {
    /// Override the API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Directory holding the persisted session
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore the saved session and show where the app would open
    Status,
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: String,
        /// student, faculty or admin
        #[arg(long, default_value = "student")]
        role: Role,
    },
    /// Sign out and remove saved credentials
    Logout,
    /// Delete every locally stored value
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Print the palette tokens
    Theme {
        #[arg(long)]
        dark: bool,
    },
}

fn describe_user(user: &User) -> String {
    let mut lines = vec![format!("{} <{}>", user.name, user.email)];
    if let Some(since) = user.created_on() {
        lines.push(format!("member since {since}"));
    }
    match &user.profile {
        Profile::Student(student) => {
            lines.push(format!(
                "{}, class of {}",
                student.department, student.enrollment_year
            ));
            lines.push(format!(
                "{} points, {} achievements, {} badges",
                student.points,
                student.achievements.len(),
                student.badges.len()
            ));
        }
        Profile::Faculty(faculty) => {
            lines.push(format!("{} / {}", faculty.department, faculty.subject));
            lines.push(format!("attendance code {}", faculty.qr_code));
        }
        Profile::Admin(admin) => {
            lines.push(admin.college.clone());
            if !admin.permissions.is_empty() {
                lines.push(format!("permissions: {}", admin.permissions.join(", ")));
            }
        }
        Profile::Unrecognized => lines.push("unrecognized role".to_string()),
    }
    lines.join("\n")
}

fn print_theme(theme: &Theme) {
    println!("palette: {:?}", theme.palette);
    for name in campus_core::Colors::TOKEN_NAMES {
        println!("{name:<16}{}", theme.colors.get(name).unwrap_or_default());
    }
    for name in campus_core::Gradients::TOKEN_NAMES {
        let stops = theme.gradients.get(name).unwrap_or_default();
        println!("gradient.{name:<7}{}", stops.join(" -> "));
    }
}

fn print_route(context: &AppContext) {
    let snapshot = context.snapshot();
    match context.route() {
        Route::Splash => println!("Still loading"),
        Route::Ready(destination) => {
            println!("Opens on: {destination}");
            if let Some(user) = snapshot.user() {
                println!("{}", describe_user(user));
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let mut config = Config::new();
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir);
    }

    let context = AppContext::new(config).context("Failed to initialise the client")?;
    log::debug!("Using API at {}", context.config().api_base);
    context.start().await;

    match cli.command {
        Commands::Status => print_route(&context),
        Commands::Login {
            email,
            password,
            role,
        } => {
            if !context.session().login(&email, &password, role).await {
                bail!("Login failed for {email}");
            }
            print_route(&context);
        }
        Commands::Logout => {
            context.session().logout().await;
            println!("Signed out");
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("Refusing to delete local data without --yes");
            }
            context.session().clear_all_data().await;
            println!("All local data cleared");
        }
        Commands::Theme { dark } => {
            if dark {
                context.theme().toggle();
            }
            print_theme(context.theme().current());
            if context.theme().palette() == Palette::Light {
                println!("(pass --dark for the dark palette)");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_students_with_balance() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "s",
            "email": "s@campus.edu",
            "name": "Sky",
            "createdAt": "2024-01-15",
            "role": "student",
            "department": "Art",
            "enrollmentYear": 2024,
            "points": 75,
            "achievements": ["a", "b"],
            "badges": []
        }))
        .unwrap();

        let text = describe_user(&user);
        assert!(text.contains("Sky <s@campus.edu>"));
        assert!(text.contains("member since 2024-01-15"));
        assert!(text.contains("75 points, 2 achievements, 0 badges"));
    }

    #[test]
    fn cli_parses_login() {
        let cli = Cli::try_parse_from([
            "campus", "login", "--email", "a@campus.edu", "--password", "pw", "--role", "faculty",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Login { role: Role::Faculty, .. }
        ));
    }

    #[test]
    fn cli_rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "campus", "login", "--email", "a@campus.edu", "--password", "pw", "--role", "dean",
        ]);
        assert!(result.is_err());
    }
}
