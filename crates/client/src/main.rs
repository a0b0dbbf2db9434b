//! `clinica-client <resource> [page] [search...]`
//!
//! Fetches one page of a resource list and prints it as JSON on stdout.

use clap::Parser;

use clinica_client::api::BackendApi;
use clinica_client::config::ClientConfig;
use clinica_client::loader::ListLoader;
use clinica_client::logging;
use clinica_core::resources::Resource;

/// `clinica-client` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "clinica-client",
    about = "Print one page of a clinic backend list as JSON",
    version
)]
struct CliArgs {
    /// Resource list to read (e.g. `pacientes`, `divergencias`).
    resource: Resource,
    /// Page number, starting at 1.
    #[arg(value_parser = clap::value_parser!(i64).range(1..), default_value_t = 1)]
    page: i64,
    /// Search terms, joined with spaces.
    search: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    dotenvy::dotenv().ok();

    // --- Tracing ---
    logging::init();

    // --- Configuration ---
    let config = ClientConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        page_size = config.page_size,
        "Loaded client configuration",
    );

    // --- Fetch ---
    let api = BackendApi::from_config(&config)?;
    let loader = ListLoader::new(api, config.cache_config());
    let query = args
        .resource
        .query(args.page, config.page_size)?
        .with_search(args.search.join(" "));

    let result = loader.load_raw(args.resource, &query, &[]).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn parses_resource_page_and_search() {
        let args =
            CliArgs::try_parse_from(["clinica-client", "pacientes", "3", "maria", "silva"]).unwrap();
        assert_eq!(args.resource, Resource::Pacientes);
        assert_eq!(args.page, 3);
        assert_eq!(args.search.join(" "), "maria silva");
    }

    #[test]
    fn page_defaults_to_first() {
        let args = CliArgs::try_parse_from(["clinica-client", "planos"]).unwrap();
        assert_eq!(args.page, 1);
        assert!(args.search.is_empty());
    }

    #[test]
    fn help_is_not_a_resource() {
        let err = CliArgs::try_parse_from(["clinica-client", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn rejects_unknown_resource_and_zero_page() {
        assert_matches!(
            CliArgs::try_parse_from(["clinica-client", "usuarios"]),
            Err(ref e) if e.kind() == ErrorKind::ValueValidation
        );
        assert_matches!(
            CliArgs::try_parse_from(["clinica-client", "pacientes", "0"]),
            Err(ref e) if e.kind() == ErrorKind::ValueValidation
        );
    }
}
