use crate::common::{BinSpec, EnergyUnit};
use crate::domain::EvaluationError;
use crate::numerics::within_tolerance;
use std::ops::Range;

const EDGE_ABS_TOL: f64 = 1.0e-9;
const EDGE_REL_TOL: f64 = 1.0e-9;
const EDGE_RELATIVE_FLOOR: f64 = 1.0e-12;

/// Strictly increasing histogram bin edges, held in keV.
#[derive(Debug, Clone, PartialEq)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    pub fn new(edges: Vec<f64>, unit: EnergyUnit) -> Result<Self, EvaluationError> {
        if edges.len() < 2 {
            return Err(EvaluationError::InvalidBinEdges {
                reason: format!("need at least two edges, got {}", edges.len()),
            });
        }
        if let Some(value) = edges.iter().find(|value| !value.is_finite()) {
            return Err(EvaluationError::InvalidBinEdges {
                reason: format!("edge {} is not finite", value),
            });
        }
        if let Some(pair) = edges.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(EvaluationError::InvalidBinEdges {
                reason: format!(
                    "edges must be strictly increasing, found {} then {}",
                    pair[0], pair[1]
                ),
            });
        }

        Ok(Self {
            edges: edges.into_iter().map(|edge| unit.to_kev(edge)).collect(),
        })
    }

    /// Edges `start, start + step, ...` up to and including `stop`.
    pub fn uniform(
        start: f64,
        stop: f64,
        step: f64,
        unit: EnergyUnit,
    ) -> Result<Self, EvaluationError> {
        let valid = start.is_finite() && stop.is_finite() && step.is_finite();
        if !valid || step <= 0.0 || stop <= start {
            return Err(EvaluationError::InvalidBinEdges {
                reason: format!("invalid uniform binning {}..{} step {}", start, stop, step),
            });
        }
        let bins = ((stop - start) / step).round().max(1.0) as usize;
        let edges = (0..=bins).map(|index| start + index as f64 * step).collect();
        Self::new(edges, unit)
    }

    pub fn from_spec(spec: &BinSpec, unit: EnergyUnit) -> Result<Self, EvaluationError> {
        match spec {
            BinSpec::Uniform { start, stop, step } => Self::uniform(*start, *stop, *step, unit),
            BinSpec::Edges(edges) => Self::new(edges.clone(), unit),
        }
    }

    pub fn as_kev(&self) -> &[f64] {
        &self.edges
    }

    pub fn in_unit(&self, unit: EnergyUnit) -> Vec<f64> {
        self.edges.iter().map(|&edge| unit.from_kev(edge)).collect()
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }

    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub fn approx_eq(&self, other: &BinEdges) -> bool {
        self.edges.len() == other.edges.len()
            && self.edges.iter().zip(&other.edges).all(|(lhs, rhs)| {
                within_tolerance(*lhs, *rhs, EDGE_ABS_TOL, EDGE_REL_TOL, EDGE_RELATIVE_FLOOR)
            })
    }

    /// Index of the bin containing `energy_kev`, clamped to the end bins.
    pub fn locate(&self, energy_kev: f64) -> usize {
        let at_or_below = self.edges.partition_point(|&edge| edge <= energy_kev);
        at_or_below.saturating_sub(1).min(self.bin_count() - 1)
    }

    /// Bins with any overlap with the open window `(low_kev, high_kev)`.
    ///
    /// Boundary bins are included whole; no partial-bin weighting.
    pub fn overlapping(&self, low_kev: f64, high_kev: f64) -> Range<usize> {
        let bins = self.bin_count();
        let start = self.edges[1..].partition_point(|&upper| upper <= low_kev);
        let end = self.edges[..bins].partition_point(|&lower| lower < high_kev);
        start..end.max(start)
    }
}

/// Reassigns per-bin totals from `from` onto `onto`.
///
/// Each source bin moves whole into the target bin containing its centre;
/// centres outside `onto` land in the nearest end bin, so the total is kept.
pub fn resample(
    totals: &[f64],
    from: &BinEdges,
    onto: &BinEdges,
) -> Result<Vec<f64>, EvaluationError> {
    check_shape(totals, from)?;
    let mut resampled = vec![0.0; onto.bin_count()];
    for (bin, total) in totals.iter().enumerate() {
        let centre = 0.5 * (from.edges[bin] + from.edges[bin + 1]);
        resampled[onto.locate(centre)] += total;
    }
    Ok(resampled)
}

pub(crate) fn check_shape(counts: &[f64], edges: &BinEdges) -> Result<(), EvaluationError> {
    if counts.len() == edges.bin_count() {
        return Ok(());
    }
    Err(EvaluationError::InvalidBinEdges {
        reason: format!(
            "{} counts do not fit {} bins",
            counts.len(),
            edges.bin_count()
        ),
    })
}
