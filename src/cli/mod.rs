pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "marketplace-api")]
#[command(about = "Freelance marketplace API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default when no command is given)")]
    Serve {
        #[arg(long, help = "Port to listen on, overriding MARKETPLACE_API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending Postgres migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Migrate => commands::migrate::handle().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_with_port() {
        let cli = Cli::try_parse_from(["marketplace-api", "serve", "--port", "9100"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(9100) })));
    }

    #[test]
    fn no_command_means_serve() {
        let cli = Cli::try_parse_from(["marketplace-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_migrate() {
        let cli = Cli::try_parse_from(["marketplace-api", "migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Migrate)));
    }
}
