use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

use craf::{Backend, RawParams, RequestConfig, TranslatedQuery};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target backend (default: from --request, else document)
    #[arg(short, long, value_enum, env = "CRAF_BACKEND")]
    pub backend: Option<Backend>,

    /// Request file (YAML, JSON or TOML) with `backend` and `params`
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    /// Filter expression
    #[arg(long, allow_hyphen_values = true)]
    pub filter: Option<String>,

    /// Sort fields, e.g. "name:asc email:desc"
    #[arg(long)]
    pub sort: Option<String>,

    /// Number of results to skip
    #[arg(long, allow_hyphen_values = true)]
    pub skip: Option<String>,

    /// Maximum number of results
    #[arg(long, allow_hyphen_values = true)]
    pub limit: Option<String>,

    /// Projected fields, space separated
    #[arg(long)]
    pub fields: Option<String>,

    /// Operator the search engine uses between terms (AND or OR)
    #[arg(long)]
    pub default_operator: Option<String>,

    /// Output format for document queries
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Resolve the backend and parameters: flags override the request file.
pub fn collect_params(cli: &Cli) -> Result<(Backend, RawParams)> {
    let request = match &cli.request {
        Some(path) => RequestConfig::load(path)
            .with_context(|| format!("CLI: Failed to load request file {}", path.display()))?,
        None => RequestConfig::default(),
    };

    let flags: RawParams = [
        (RawParams::FILTER, &cli.filter),
        (RawParams::SORT, &cli.sort),
        (RawParams::SKIP, &cli.skip),
        (RawParams::LIMIT, &cli.limit),
        (RawParams::FIELDS, &cli.fields),
        (RawParams::DEFAULT_OPERATOR, &cli.default_operator),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
    .collect();

    let backend = cli.backend.or(request.backend).unwrap_or_default();
    Ok((backend, request.params.merge(flags)))
}

/// Write a translated query: search queries as the encoded query string,
/// document queries as JSON or YAML.
pub fn write_output<W: Write>(query: &TranslatedQuery, format: OutputFormat, out: &mut W) -> Result<()> {
    match query {
        TranslatedQuery::Search(search) => writeln!(out, "{}", search.to_query_string())?,
        TranslatedQuery::Document(doc) => match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, doc)
                    .context("Output: Failed to write JSON")?;
                writeln!(out)?;
            }
            OutputFormat::Yaml => {
                serde_yaml::to_writer(&mut *out, doc).context("Output: Failed to write YAML")?
            }
        },
    }
    Ok(())
}
