use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "headroom")]
#[command(version)]
#[command(about = "Context compression sidecar for LLM conversations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a conversation (JSON request from stdin or --file)
    Compress {
        /// Path to request JSON (reads stdin if omitted)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Retrieve offloaded content by hash
    Retrieve {
        hash: String,

        /// Only return items mentioning this text
        #[arg(short, long)]
        query: Option<String>,

        #[arg(long, default_value_t = 20)]
        max_results: usize,
    },

    /// Suggest stored content worth expanding for a query
    Analyze {
        query: String,

        #[arg(long, default_value_t = 0)]
        turn: u32,
    },

    /// Report sidecar health
    Health,

    /// Print metrics
    Metrics,

    /// Print effective configuration
    Config,

    /// Serve JSON requests over stdin/stdout, one per line
    Serve,

    /// Print version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::try_parse_from(["headroom", "version"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Version));
    }

    #[test]
    fn test_cli_parse_compress() {
        let cli = Cli::try_parse_from(["headroom", "compress", "--file", "req.json"]);
        assert!(cli.is_ok());
        if let Commands::Compress { file } = cli.unwrap().command {
            assert_eq!(file, Some("req.json".to_string()));
        } else {
            panic!("Expected Compress command");
        }
    }

    #[test]
    fn test_cli_parse_retrieve() {
        let cli = Cli::try_parse_from(["headroom", "retrieve", "a1b2c3d4e5f6", "-q", "error"]);
        match cli.unwrap().command {
            Commands::Retrieve {
                hash,
                query,
                max_results,
            } => {
                assert_eq!(hash, "a1b2c3d4e5f6");
                assert_eq!(query.as_deref(), Some("error"));
                assert_eq!(max_results, 20);
            }
            _ => panic!("Expected Retrieve command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze() {
        let cli = Cli::try_parse_from(["headroom", "analyze", "timeout", "--turn", "4"]);
        match cli.unwrap().command {
            Commands::Analyze { query, turn } => {
                assert_eq!(query, "timeout");
                assert_eq!(turn, 4);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parse_simple_commands() {
        for cmd in ["health", "metrics", "config", "serve"] {
            let cli = Cli::try_parse_from(["headroom", cmd]);
            assert!(cli.is_ok(), "Failed to parse {}", cmd);
        }
    }

    #[test]
    fn test_cli_retrieve_requires_hash() {
        assert!(Cli::try_parse_from(["headroom", "retrieve"]).is_err());
    }
}
