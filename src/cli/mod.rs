pub mod admin;
pub mod server;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "precinct-api")]
#[command(about = "Precinct Records API - case, personnel and incident records service")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to bind, overrides API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Create an administrator account")]
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => server::serve(config, port).await,
        Commands::Migrate => admin::migrate(&config).await,
        Commands::CreateAdmin {
            username,
            password,
            email,
            name,
            department,
        } => {
            let args = admin::CreateAdminArgs {
                username,
                password,
                email,
                name,
                department,
            };
            admin::create_admin(&config, args, output_format).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::parse_from(["precinct-api"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn create_admin_parses_flags() {
        let cli = Cli::parse_from([
            "precinct-api",
            "create-admin",
            "--username",
            "chief",
            "--password",
            "precinct42",
            "--email",
            "chief@precinct.gov",
            "--name",
            "Chief Bello",
        ]);
        match cli.command {
            Some(Commands::CreateAdmin { username, department, .. }) => {
                assert_eq!(username, "chief");
                assert_eq!(department, None);
            }
            _ => panic!("expected create-admin"),
        }
    }
}
