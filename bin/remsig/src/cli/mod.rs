use clap::{Parser, Subcommand};

pub mod migrate;
pub mod serve;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the signing server
    #[command(name = "serve")]
    Serve(serve::ServeCommand),

    /// Apply the slashing-protection schema to the database
    #[command(name = "migrate")]
    Migrate(migrate::MigrateCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_serve_command() {
        let cli = Cli::parse_from([
            "program",
            "serve",
            "--port",
            "9000",
            "--keystore-path",
            "./keystore",
            "--keystore-password-path",
            "./password",
            "--chain",
            "hoodi",
        ]);

        match cli.command {
            Commands::Serve(cmd) => {
                assert_eq!(cmd.port, 9000);
                assert_eq!(cmd.chain, "hoodi");
            }
            Commands::Migrate(_) => panic!("expected serve"),
        }
    }

    #[test]
    fn test_cli_migrate_command() {
        let cli = Cli::parse_from(["program", "migrate", "--db-path", "/tmp/protection.db"]);

        match cli.command {
            Commands::Migrate(cmd) => {
                assert_eq!(cmd.db_path.to_string_lossy(), "/tmp/protection.db");
            }
            Commands::Serve(_) => panic!("expected migrate"),
        }
    }
}
