use super::CliError;
use anyhow::Context;
use bgsim_core::common::{ViewConfig, load_view_config};
use bgsim_core::domain::{Component, SimsError, load_model};
use bgsim_core::modules::serialization::{
    format_scientific_f64, render_spectrum, write_text_artifact,
};
use bgsim_core::modules::{CorpusConfig, JsonDirectoryCorpus, RequestEvaluation};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub(super) fn load_view(path: Option<&Path>) -> Result<ViewConfig, CliError> {
    match path {
        Some(path) => load_view_config(path).map_err(|error| CliError::Compute(error.into())),
        None => Ok(ViewConfig::default()),
    }
}

pub(super) fn load_corpus(
    directory: &Path,
    include: Vec<String>,
) -> Result<JsonDirectoryCorpus, CliError> {
    let config = CorpusConfig::new(directory).with_include(include);
    JsonDirectoryCorpus::load(&config).map_err(CliError::Compute)
}

pub(super) fn load_model_file(path: &Path) -> Result<Component, CliError> {
    load_model(path).map_err(CliError::Compute)
}

pub(super) fn select_component<'a>(
    model: &'a Component,
    name: Option<&str>,
) -> Result<&'a Component, CliError> {
    let Some(name) = name else {
        return Ok(model);
    };
    model.find(name).ok_or_else(|| {
        CliError::Compute(SimsError::input_validation(
            "INPUT.CLI_COMPONENT",
            format!("component '{}' not found in model '{}'", name, model.name),
        ))
    })
}

pub(super) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to serialize JSON output")?;
    println!("{}", rendered);
    Ok(())
}

pub(super) fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format_scientific_f64(value, 0, 6))
}

/// Writes one listing per evaluated spectrum and returns how many were written.
pub(super) fn write_spectra(
    directory: &Path,
    evaluations: &[RequestEvaluation],
) -> Result<usize, CliError> {
    fs::create_dir_all(directory).with_context(|| {
        format!(
            "failed to create spectra directory '{}'",
            directory.display()
        )
    })?;

    let mut written = 0;
    for evaluation in evaluations {
        for matched in &evaluation.matches {
            for derived in &matched.spectra {
                let Some(spectrum) = &derived.spectrum else {
                    continue;
                };
                let path = spectrum_path(
                    directory,
                    &[
                        evaluation.component.as_str(),
                        evaluation.spec.as_str(),
                        matched.channel.as_str(),
                        derived.label.as_str(),
                    ],
                );
                write_text_artifact(&path, &render_spectrum(spectrum, &derived.unit))
                    .with_context(|| format!("failed to write spectrum '{}'", path.display()))?;
                written += 1;
            }
        }
    }
    Ok(written)
}

fn spectrum_path(directory: &Path, parts: &[&str]) -> PathBuf {
    let stem = parts
        .iter()
        .map(|part| sanitize_file_component(part))
        .collect::<Vec<_>>()
        .join("_");
    directory.join(format!("{}.dat", stem))
}

fn sanitize_file_component(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
