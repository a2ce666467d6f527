//! Access to the store of simulation documents.
//!
//! The resolver only sees [`SimulationCorpus`]. [`JsonDirectoryCorpus`] is a
//! small local implementation over a directory of JSON documents, enough to
//! drive the CLI and tests; any real document store plugs in through the
//! same trait or through [`FnCorpus`].

use crate::domain::{Projection, QueryDescriptor, SimsError, SimsResult, SimulationDocument};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub trait SimulationCorpus {
    /// Documents matching `query`, restricted to the fields in `projection`.
    fn fetch(
        &self,
        query: &QueryDescriptor,
        projection: &Projection,
    ) -> SimsResult<Vec<SimulationDocument>>;
}

impl<T: SimulationCorpus + ?Sized> SimulationCorpus for &T {
    fn fetch(
        &self,
        query: &QueryDescriptor,
        projection: &Projection,
    ) -> SimsResult<Vec<SimulationDocument>> {
        (**self).fetch(query, projection)
    }
}

/// Adapts a fetch closure into a corpus.
pub struct FnCorpus<F>(pub F);

impl<F> SimulationCorpus for FnCorpus<F>
where
    F: Fn(&QueryDescriptor, &Projection) -> SimsResult<Vec<SimulationDocument>>,
{
    fn fetch(
        &self,
        query: &QueryDescriptor,
        projection: &Projection,
    ) -> SimsResult<Vec<SimulationDocument>> {
        (self.0)(query, projection)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    pub directory: PathBuf,
    pub include: Vec<String>,
}

impl CorpusConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            include: vec!["*.json".to_string()],
        }
    }

    pub fn with_include(mut self, patterns: Vec<String>) -> Self {
        if !patterns.is_empty() {
            self.include = patterns;
        }
        self
    }
}

/// Per-document summary row: identifier, volume, primary and primaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub id: Option<String>,
    pub volume: Option<String>,
    pub primary: Option<String>,
    pub spectrum: Option<String>,
    pub nprimaries: u64,
}

impl From<&SimulationDocument> for DocumentSummary {
    fn from(document: &SimulationDocument) -> Self {
        Self {
            id: document.id.clone(),
            volume: document.volume.clone(),
            primary: document.primary.clone(),
            spectrum: document.spectrum.clone(),
            nprimaries: document.nprimaries,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonDirectoryCorpus {
    documents: Vec<SimulationDocument>,
}

impl JsonDirectoryCorpus {
    pub fn from_documents(documents: Vec<SimulationDocument>) -> Self {
        Self { documents }
    }

    /// Reads every file in the configured directory whose name matches one
    /// of the include globs, in file-name order. Documents without an `_id`
    /// are identified by their file stem.
    pub fn load(config: &CorpusConfig) -> SimsResult<Self> {
        let include = build_globset(&config.include)?;
        let entries = fs::read_dir(&config.directory).map_err(|source| {
            SimsError::io_system(
                "IO.CORPUS_DIRECTORY",
                format!(
                    "failed to list corpus directory '{}': {}",
                    config.directory.display(),
                    source
                ),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| {
                SimsError::io_system(
                    "IO.CORPUS_DIRECTORY",
                    format!(
                        "failed to read corpus directory '{}': {}",
                        config.directory.display(),
                        source
                    ),
                )
            })?;
            let path = entry.path();
            let included = path.is_file()
                && path
                    .file_name()
                    .is_some_and(|file_name| include.is_match(Path::new(file_name)));
            if included {
                paths.push(path);
            }
        }
        paths.sort();

        let documents = paths
            .iter()
            .map(|path| read_document(path))
            .collect::<SimsResult<Vec<_>>>()?;
        tracing::info!(
            directory = %config.directory.display(),
            documents = documents.len(),
            "loaded simulation corpus"
        );
        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[SimulationDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn summary(&self) -> Vec<DocumentSummary> {
        self.documents.iter().map(DocumentSummary::from).collect()
    }
}

impl SimulationCorpus for JsonDirectoryCorpus {
    fn fetch(
        &self,
        query: &QueryDescriptor,
        projection: &Projection,
    ) -> SimsResult<Vec<SimulationDocument>> {
        Ok(self
            .documents
            .iter()
            .filter(|document| query.matches(document))
            .map(|document| projection.apply(document))
            .collect())
    }
}

fn build_globset(patterns: &[String]) -> SimsResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| {
            SimsError::input_validation(
                "INPUT.CORPUS_GLOB",
                format!("invalid corpus include pattern '{}': {}", pattern, source),
            )
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| {
        SimsError::input_validation(
            "INPUT.CORPUS_GLOB",
            format!("failed to compile corpus include patterns: {}", source),
        )
    })
}

fn read_document(path: &Path) -> SimsResult<SimulationDocument> {
    let source = fs::read_to_string(path).map_err(|source| {
        SimsError::io_system(
            "IO.CORPUS_READ",
            format!(
                "failed to read simulation document '{}': {}",
                path.display(),
                source
            ),
        )
    })?;
    let mut document: SimulationDocument = serde_json::from_str(&source).map_err(|source| {
        SimsError::input_validation(
            "INPUT.CORPUS_PARSE",
            format!(
                "failed to parse simulation document '{}': {}",
                path.display(),
                source
            ),
        )
    })?;
    if document.id.is_none() {
        document.id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }
    Ok(document)
}
