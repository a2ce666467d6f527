use super::CliError;
use super::helpers::*;
use bgsim_core::common::parse_isotope;
use bgsim_core::domain::Projection;
use bgsim_core::modules::serialization::render_value_table;
use bgsim_core::modules::{SimView, component_livetime, livetime, total_primaries};
use serde::Serialize;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct CorpusArgs {
    /// Directory of simulation documents
    #[arg(long)]
    corpus: PathBuf,

    /// File name glob selecting documents (repeatable)
    #[arg(long = "include", value_name = "GLOB")]
    include: Vec<String>,
}

#[derive(clap::Args)]
pub(super) struct ModelArgs {
    /// Component hierarchy JSON
    #[arg(long)]
    model: PathBuf,

    /// Component to resolve (defaults to the model root)
    #[arg(long)]
    component: Option<String>,

    /// Only resolve the component's own specs, not its descendants'
    #[arg(long)]
    no_children: bool,
}

#[derive(clap::Args)]
pub(super) struct EvaluateArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    #[command(flatten)]
    model: ModelArgs,

    /// View configuration JSON (defaults to the reference detector view)
    #[arg(long)]
    view: Option<PathBuf>,

    /// Write each evaluated spectrum as a text listing into this directory
    #[arg(long, value_name = "DIR")]
    spectra_dir: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct LivetimeArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    #[command(flatten)]
    model: ModelArgs,

    /// View configuration JSON; its neutron expansion setting decides
    /// whether neutron matches are resolved
    #[arg(long)]
    view: Option<PathBuf>,

    /// Also print the summed livetime of matches querying this primary
    #[arg(long)]
    primary: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct IsotopeArgs {
    /// Names to parse, e.g. U238, Th-232, 60Co
    #[arg(required = true)]
    names: Vec<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct SummaryArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub(super) fn run_evaluate_command(args: EvaluateArgs) -> Result<i32, CliError> {
    let config = load_view(args.view.as_deref())?;
    let view = SimView::from_config(&config).map_err(|error| CliError::Compute(error.into()))?;
    let corpus = load_corpus(&args.corpus.corpus, args.corpus.include)?;
    let model = load_model_file(&args.model.model)?;
    let component = select_component(&model, args.model.component.as_deref())?;

    let requests = view.resolver().resolve_component(
        component,
        !args.model.no_children,
        &corpus,
        &view.projection(),
    )?;
    let evaluations = requests
        .iter()
        .map(|request| view.evaluate_request(request))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| CliError::Compute(error.into()))?;

    if let Some(directory) = &args.spectra_dir {
        let written = write_spectra(directory, &evaluations)?;
        tracing::info!(
            directory = %directory.display(),
            files = written,
            "wrote spectrum listings"
        );
    }

    if args.json {
        print_json(&evaluations)?;
    } else {
        let labels: Vec<String> = view
            .values()
            .iter()
            .map(|value| value.label.clone())
            .collect();
        print!("{}", render_value_table(&labels, &evaluations));
    }
    Ok(0)
}

#[derive(Debug, Serialize)]
struct LivetimeRow {
    component: String,
    spec: String,
    channel: String,
    primary: Option<String>,
    status: &'static str,
    documents: usize,
    nprimaries: u64,
    emission_rate: f64,
    livetime: Option<f64>,
}

#[derive(Debug, Serialize)]
struct LivetimeReport {
    matches: Vec<LivetimeRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<PrimaryLivetime>,
}

#[derive(Debug, Serialize)]
struct PrimaryLivetime {
    primary: String,
    livetime: f64,
}

pub(super) fn run_livetime_command(args: LivetimeArgs) -> Result<i32, CliError> {
    let config = load_view(args.view.as_deref())?;
    let view = SimView::from_config(&config).map_err(|error| CliError::Compute(error.into()))?;
    let corpus = load_corpus(&args.corpus.corpus, args.corpus.include)?;
    let model = load_model_file(&args.model.model)?;
    let component = select_component(&model, args.model.component.as_deref())?;

    let requests = view.resolver().resolve_component(
        component,
        !args.model.no_children,
        &corpus,
        &Projection::livetime(),
    )?;

    let mut rows = Vec::new();
    for request in &requests {
        let status = if request.is_error() { "error" } else { "ok" };
        for matched in &request.matches {
            rows.push(LivetimeRow {
                component: request.component.name.clone(),
                spec: request.spec.name.clone(),
                channel: matched.channel.to_string(),
                primary: matched.query.primary.clone(),
                status,
                documents: matched.documents.len(),
                nprimaries: total_primaries(matched),
                emission_rate: matched.emission_rate,
                livetime: livetime(matched).ok(),
            });
        }
        if request.matches.is_empty() {
            rows.push(LivetimeRow {
                component: request.component.name.clone(),
                spec: request.spec.name.clone(),
                channel: request.channel.to_string(),
                primary: request.query.as_ref().and_then(|query| query.primary.clone()),
                status,
                documents: 0,
                nprimaries: 0,
                emission_rate: request.emission_rate,
                livetime: None,
            });
        }
    }
    let total = args.primary.map(|primary| PrimaryLivetime {
        livetime: component_livetime(&requests, &primary),
        primary,
    });
    let report = LivetimeReport {
        matches: rows,
        total,
    };

    if args.json {
        print_json(&report)?;
        return Ok(0);
    }

    println!("component\tspec\tchannel\tprimary\tstatus\tdocuments\tnprimaries\tlivetime_s");
    for row in &report.matches {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.component,
            row.spec,
            row.channel,
            row.primary.as_deref().unwrap_or("-"),
            row.status,
            row.documents,
            row.nprimaries,
            format_optional(row.livetime)
        );
    }
    if let Some(total) = &report.total {
        println!(
            "Total livetime for primary '{}': {}",
            total.primary,
            format_optional(Some(total.livetime))
        );
    }
    Ok(0)
}

#[derive(Debug, Serialize)]
struct IsotopeRow {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    isotope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub(super) fn run_isotope_command(args: IsotopeArgs) -> Result<i32, CliError> {
    let rows: Vec<IsotopeRow> = args
        .names
        .into_iter()
        .map(|name| match parse_isotope(&name) {
            Ok(isotope) => IsotopeRow {
                name,
                isotope: Some(isotope.to_string()),
                key: Some(isotope.key()),
                error: None,
            },
            Err(error) => IsotopeRow {
                name,
                isotope: None,
                key: None,
                error: Some(error.to_string()),
            },
        })
        .collect();

    if args.json {
        print_json(&rows)?;
        return Ok(0);
    }

    for row in &rows {
        match (&row.isotope, &row.key, &row.error) {
            (Some(isotope), Some(key), _) => println!("{}\t{}\t{}", row.name, isotope, key),
            (_, _, error) => println!(
                "{}\terror\t{}",
                row.name,
                error.as_deref().unwrap_or("unparseable")
            ),
        }
    }
    Ok(0)
}

pub(super) fn run_summary_command(args: SummaryArgs) -> Result<i32, CliError> {
    let corpus = load_corpus(&args.corpus.corpus, args.corpus.include)?;
    let summary = corpus.summary();

    if args.json {
        print_json(&summary)?;
        return Ok(0);
    }

    println!("id\tvolume\tprimary\tspectrum\tnprimaries");
    for row in &summary {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            row.id.as_deref().unwrap_or("-"),
            row.volume.as_deref().unwrap_or("-"),
            row.primary.as_deref().unwrap_or("-"),
            row.spectrum.as_deref().unwrap_or("-"),
            row.nprimaries
        );
    }
    println!("{} documents", summary.len());
    Ok(0)
}
