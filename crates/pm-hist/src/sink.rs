//! Hand-off of finished distributions to rendering/export collaborators.
//!
//! A [`DistributionSink`] receives each finished histogram or curve together
//! with a destination name such as `mass/pipi_reco`. Rendering is done
//! downstream; the sinks here either keep artifacts in memory or write
//! plot-friendly JSON documents (arrays instead of nested objects).

use std::fs;
use std::path::{Component, Path, PathBuf};

use pm_core::{Error, Result};
use serde::Serialize;

use crate::curve::Curve;
use crate::histogram::{Histogram1D, Histogram2D};

/// Schema tag written into every JSON artifact.
pub const ARTIFACT_SCHEMA_VERSION: &str = "pidmass_artifact_v0";

/// A borrowed, finished distribution.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact<'a> {
    /// 1D histogram.
    #[serde(rename = "histogram_1d")]
    Histogram1D(&'a Histogram1D),
    /// 2D histogram.
    #[serde(rename = "histogram_2d")]
    Histogram2D(&'a Histogram2D),
    /// Ordered curve.
    Curve(&'a Curve),
}

impl Artifact<'_> {
    /// Name of the underlying distribution.
    pub fn name(&self) -> &str {
        match self {
            Artifact::Histogram1D(h) => &h.name,
            Artifact::Histogram2D(h) => &h.name,
            Artifact::Curve(c) => &c.name,
        }
    }

    /// Owned copy.
    pub fn to_owned_artifact(&self) -> OwnedArtifact {
        match self {
            Artifact::Histogram1D(h) => OwnedArtifact::Histogram1D((*h).clone()),
            Artifact::Histogram2D(h) => OwnedArtifact::Histogram2D((*h).clone()),
            Artifact::Curve(c) => OwnedArtifact::Curve((*c).clone()),
        }
    }
}

/// An owned distribution, as kept by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedArtifact {
    /// 1D histogram.
    Histogram1D(Histogram1D),
    /// 2D histogram.
    Histogram2D(Histogram2D),
    /// Ordered curve.
    Curve(Curve),
}

/// Receiver of finished distributions.
pub trait DistributionSink {
    /// Accept one artifact for `destination` (a `/`-separated relative name).
    fn accept(&mut self, destination: &str, artifact: Artifact<'_>) -> Result<()>;
}

/// Keeps every accepted artifact in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Vec<(String, OwnedArtifact)>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(destination, artifact)` pairs in arrival order.
    pub fn entries(&self) -> &[(String, OwnedArtifact)] {
        &self.entries
    }

    /// Artifact most recently accepted for `destination`.
    pub fn get(&self, destination: &str) -> Option<&OwnedArtifact> {
        self.entries.iter().rev().find(|(d, _)| d == destination).map(|(_, a)| a)
    }

    /// Destinations in arrival order.
    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(d, _)| d.as_str())
    }
}

impl DistributionSink for MemorySink {
    fn accept(&mut self, destination: &str, artifact: Artifact<'_>) -> Result<()> {
        self.entries.push((destination.to_string(), artifact.to_owned_artifact()));
        Ok(())
    }
}

#[derive(Serialize)]
struct ArtifactDocument<'a> {
    schema_version: &'static str,
    destination: &'a str,
    #[serde(flatten)]
    artifact: Artifact<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bin_edges: Option<Vec<f64>>,
}

/// Writes each artifact to `<root>/<destination>.json`.
#[derive(Debug, Clone)]
pub struct JsonArtifactSink {
    root: PathBuf,
    pretty: bool,
}

impl JsonArtifactSink {
    /// Sink rooted at `root` (created on first write).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), pretty: false }
    }

    /// Pretty-print the JSON output.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path an artifact for `destination` is written to.
    pub fn path_for(&self, destination: &str) -> Result<PathBuf> {
        let rel = Path::new(destination);
        let valid = !destination.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(Error::Validation(format!(
                "artifact destination must be a relative path without '..': '{destination}'"
            )));
        }
        Ok(self.root.join(format!("{destination}.json")))
    }
}

impl DistributionSink for JsonArtifactSink {
    fn accept(&mut self, destination: &str, artifact: Artifact<'_>) -> Result<()> {
        let path = self.path_for(destination)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bin_edges = match artifact {
            Artifact::Histogram1D(h) => Some(h.axis.edges()),
            _ => None,
        };
        let doc =
            ArtifactDocument { schema_version: ARTIFACT_SCHEMA_VERSION, destination, artifact, bin_edges };
        let bytes =
            if self.pretty { serde_json::to_vec_pretty(&doc)? } else { serde_json::to_vec(&doc)? };
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), name = artifact.name(), "artifact written");
        Ok(())
    }
}
