//! firebrowse CLI - browse documents in a Firestore collection
//!
//! Usage: browse-firestore [collection] [limit]

use clap::Parser;
use fire_common::sanitizer::LogSanitizer;
use fire_common::{FireError, EXIT_ERROR};
use fire_config::{Config, Credentials, Environment};
use fire_core::formatter::fetching_banner;
use fire_core::{browse, BrowseOutcome, FirestoreClient};

const EXAMPLES: &str = "\
Examples:
  browse-firestore                      # Show 10 products
  browse-firestore products 5           # Show 5 products
  browse-firestore insurers 20          # Show 20 insurers
  browse-firestore metadata 1           # Show 1 metadata document
  browse-firestore users/alice/orders   # Browse a subcollection

Environment:
  GOOGLE_APPLICATION_CREDENTIALS  Service account JSON file (required)
  FIRESTORE_EMULATOR_HOST         host:port of a local Firestore emulator
  GOOGLE_CLOUD_PROJECT            Project id, overrides the credential file";

#[derive(Parser)]
#[command(
    name = "browse-firestore",
    version,
    about = "Browse documents in a Firestore collection",
    after_help = EXAMPLES
)]
struct Cli {
    /// Collection path (default: products)
    collection: Option<String>,

    /// Number of documents to fetch (default: 10)
    #[arg(allow_hyphen_values = true)]
    limit: Option<String>,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,

    /// Write logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

/// Resolved arguments plus the connected client
struct Session {
    collection: String,
    limit: u32,
    client: FirestoreClient,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli);
    let sanitizer = LogSanitizer::new();

    let session = match init(&cli) {
        Ok(session) => session,
        Err(e) => {
            report_error(&sanitizer, &e);
            std::process::exit(EXIT_ERROR);
        }
    };

    // Failed round-trips are reported but leave the exit status at 0
    if let Err(e) = cmd_browse(&session).await {
        report_error(&sanitizer, &e);
    }
}

fn init_logging(cli: &Cli) {
    fire_common::telemetry::init_tracing(cli.verbose, cli.log_json);
    tracing::debug!("firebrowse {} started", env!("CARGO_PKG_VERSION"));
}

//
// Helper functions
//

/// Load credentials, configuration and build the client.
///
/// Credentials come first: without them nothing else runs.
fn init(cli: &Cli) -> anyhow::Result<Session> {
    let credentials = Credentials::from_env()?;

    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd)?;
    let env = Environment::capture();

    let client = FirestoreClient::new(credentials, &config.client, &env)?;
    tracing::debug!("Connected to project {}", client.project());

    Ok(Session {
        collection: config.browse.collection(cli.collection.as_deref()),
        limit: config.browse.limit(cli.limit.as_deref()),
        client,
    })
}

fn report_error(sanitizer: &LogSanitizer, error: &anyhow::Error) {
    let message = sanitizer.sanitize(&error.to_string());
    tracing::debug!("Reporting error: {}", message);
    eprintln!("{}", error_line(error, &message));
}

/// Configuration errors print bare; everything else gets an `Error: ` prefix
fn error_line(error: &anyhow::Error, message: &str) -> String {
    let configuration = error
        .downcast_ref::<FireError>()
        .is_some_and(FireError::is_configuration);

    if configuration {
        message.to_string()
    } else {
        format!("Error: {}", message)
    }
}

//
// Command implementations
//

async fn cmd_browse(session: &Session) -> anyhow::Result<BrowseOutcome> {
    eprintln!("{}", fetching_banner(session.limit, &session.collection));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let outcome = browse(&session.client, &session.collection, session.limit, &mut out).await?;
    tracing::debug!("Browse finished: {:?}", outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_print_bare() {
        let error = anyhow::Error::from(FireError::MissingEnv(
            "GOOGLE_APPLICATION_CREDENTIALS".to_string(),
        ));
        assert_eq!(
            error_line(&error, &error.to_string()),
            "GOOGLE_APPLICATION_CREDENTIALS environment variable is required"
        );
    }

    #[test]
    fn test_data_errors_are_prefixed() {
        let error = anyhow::Error::from(FireError::Network("connection refused".to_string()));
        assert_eq!(
            error_line(&error, &error.to_string()),
            "Error: Network error: connection refused"
        );
    }
}
