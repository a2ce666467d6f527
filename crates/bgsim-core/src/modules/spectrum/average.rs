use super::{BinEdges, document_bins, nonzero_livetime};
use crate::common::Energy;
use crate::domain::{EvaluationError, HitType, Match, Projection, SimulationDocument};
use crate::numerics::stable_sum_iter;

/// Normalized rate of one histogram over an energy window.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumAverage {
    hit: HitType,
    low_kev: f64,
    high_kev: f64,
    bin_edges: Option<BinEdges>,
    binwidths: bool,
    scale: f64,
}

impl SpectrumAverage {
    pub fn new(hit: HitType, low: Energy, high: Energy) -> Result<Self, EvaluationError> {
        let (low_kev, high_kev) = (low.in_kev(), high.in_kev());
        if !low_kev.is_finite() || !high_kev.is_finite() || low_kev >= high_kev {
            return Err(EvaluationError::InvalidEnergyRange {
                low: low_kev,
                high: high_kev,
            });
        }
        Ok(Self {
            hit,
            low_kev,
            high_kev,
            bin_edges: None,
            binwidths: false,
            scale: 1.0,
        })
    }

    /// Canonical edges, used for documents without their own and as the
    /// common grid for documents whose edges differ.
    pub fn with_bin_edges(mut self, bin_edges: BinEdges) -> Self {
        self.bin_edges = Some(bin_edges);
        self
    }

    pub fn with_binwidths(mut self, binwidths: bool) -> Self {
        self.binwidths = binwidths;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn hit(&self) -> HitType {
        self.hit
    }

    pub fn range_kev(&self) -> (f64, f64) {
        (self.low_kev, self.high_kev)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn projection(&self) -> Projection {
        Projection::with_hits([self.hit])
    }

    /// Counts inside the window summed over `documents`, before any
    /// livetime or scale normalization.
    pub fn window_counts(
        &self,
        documents: &[SimulationDocument],
    ) -> Result<f64, EvaluationError> {
        let mut per_document = Vec::with_capacity(documents.len());
        for document in documents {
            let bins =
                document_bins(document, self.hit, self.bin_edges.as_ref(), self.binwidths)?;
            let Some(bins) = bins else {
                continue;
            };
            let window = bins.edges.overlapping(self.low_kev, self.high_kev);
            per_document.push(stable_sum_iter(bins.totals[window].iter().copied()));
        }
        Ok(stable_sum_iter(per_document))
    }

    pub fn evaluate(&self, matched: &Match) -> Result<f64, EvaluationError> {
        let livetime = nonzero_livetime(matched)?;
        let counts = self.window_counts(&matched.documents)?;
        Ok(counts / livetime * self.scale)
    }
}
