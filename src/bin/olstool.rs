//! One-shot lookup against a live OLS endpoint, for manual testing of the
//! search path without a host application.

use std::process;

use clap::Parser;

use ontosuggest::{build_request, Config, OlsBackend, RawConfig, SearchBackend};

#[derive(Parser)]
#[command(name = "olstool", about = "Ontology lookup diagnostics")]
struct Cli {
    /// Free-text query
    query: String,
    /// Base URL of the lookup API
    #[arg(long, default_value = "https://semanticlookup.zbmed.de/ols/api/")]
    api: String,
    /// Comma-separated catalog filter, e.g. "efo,ms,chebi"
    #[arg(long)]
    ontology: Option<String>,
    /// Collection filter
    #[arg(long)]
    collection: Option<String>,
    /// Entity kind filter: class, property, individual or ontology
    #[arg(long = "type")]
    entity_type: Option<String>,
    /// Comma-separated result field list
    #[arg(long)]
    field_list: Option<String>,
    /// Maximum number of suggestions
    #[arg(long, default_value = "10")]
    rows: String,
    /// Output as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = Config::from_raw(RawConfig {
        ontologies: cli.ontology,
        collection: cli.collection,
        entity_type: cli.entity_type,
        field_list: cli.field_list,
        rows: Some(cli.rows),
        ..Default::default()
    })
    .unwrap_or_else(|e| {
        eprintln!("invalid configuration: {e}");
        process::exit(1);
    });

    let Some(request) = build_request(&cli.query, &config) else {
        eprintln!("query is too short to search");
        process::exit(1);
    };

    let backend = OlsBackend::new(cli.api);
    let candidates = backend.search(&request).unwrap_or_else(|e| {
        eprintln!("search failed: {e}");
        process::exit(1);
    });

    if cli.json {
        let objects: Vec<_> = candidates.iter().map(|c| c.host_object()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&objects).expect("candidates serialize to JSON")
        );
        return;
    }

    if candidates.is_empty() {
        println!("no matches for {:?}", request.text);
        return;
    }
    for candidate in &candidates {
        println!(
            "{:<16} {:<8} {}",
            candidate.short_form,
            candidate.ontology_name.to_uppercase(),
            candidate.display_label(true)
        );
    }
}
