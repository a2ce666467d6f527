use super::{BinEdges, document_bins, nonzero_livetime};
use crate::common::EnergyUnit;
use crate::domain::{EvaluationError, HitType, Match, Projection, SimulationDocument};
use serde::Serialize;

/// Normalized histogram of one hit type on a canonical binning.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectSpectrum {
    hit: HitType,
    bin_edges: BinEdges,
    unit: EnergyUnit,
    binwidths: bool,
    scale: f64,
    density: bool,
}

impl DirectSpectrum {
    pub fn new(hit: HitType, bin_edges: BinEdges) -> Self {
        Self {
            hit,
            bin_edges,
            unit: EnergyUnit::Kev,
            binwidths: false,
            scale: 1.0,
            density: false,
        }
    }

    /// Unit of the reported edges (and of the widths used for `density`).
    pub fn with_unit(mut self, unit: EnergyUnit) -> Self {
        self.unit = unit;
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

    pub fn with_density(mut self, density: bool) -> Self {
        self.density = density;
        self
    }

    pub fn hit(&self) -> HitType {
        self.hit
    }

    pub fn bin_edges(&self) -> &BinEdges {
        &self.bin_edges
    }

    pub fn projection(&self) -> Projection {
        Projection::with_hits([self.hit])
    }

    /// Per-bin totals over `documents` on the canonical edges.
    pub fn summed_counts(
        &self,
        documents: &[SimulationDocument],
    ) -> Result<Vec<f64>, EvaluationError> {
        let mut summed = vec![0.0; self.bin_edges.bin_count()];
        for document in documents {
            let bins = document_bins(document, self.hit, Some(&self.bin_edges), self.binwidths)?;
            let Some(bins) = bins else {
                continue;
            };
            for (total, value) in summed.iter_mut().zip(&bins.totals) {
                *total += value;
            }
        }
        Ok(summed)
    }

    pub fn evaluate(&self, matched: &Match) -> Result<BinnedSpectrum, EvaluationError> {
        let livetime = nonzero_livetime(matched)?;
        let factor = self.scale / livetime;
        let widths = self.bin_edges.widths();

        let values = self
            .summed_counts(&matched.documents)?
            .into_iter()
            .zip(widths)
            .map(|(total, width_kev)| {
                let value = total * factor;
                if self.density {
                    value / self.unit.from_kev(width_kev)
                } else {
                    value
                }
            })
            .collect();

        Ok(BinnedSpectrum {
            edges: self.bin_edges.in_unit(self.unit),
            unit: self.unit,
            values,
        })
    }
}

/// Rates per canonical bin, with the edges they belong to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedSpectrum {
    pub edges: Vec<f64>,
    pub unit: EnergyUnit,
    pub values: Vec<f64>,
}

impl BinnedSpectrum {
    /// `(lower edge, value)` for every bin.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.edges.iter().copied().zip(self.values.iter().copied())
    }

    pub fn bin_count(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::DirectSpectrum;
    use crate::common::EnergyUnit;
    use crate::domain::{
        EvaluationError, HitType, Histogram, Match, PrimaryChannel, QueryDescriptor,
        SimulationDocument,
    };
    use crate::modules::spectrum::BinEdges;

    fn document(nprimaries: u64, counts: &[f64], edges: &[f64]) -> SimulationDocument {
        let mut document = SimulationDocument {
            nprimaries,
            ..SimulationDocument::default()
        };
        document.hits.insert(
            HitType::Gammas,
            Histogram::new(counts.to_vec(), (!edges.is_empty()).then(|| edges.to_vec())),
        );
        document
    }

    fn matched(rate: f64, documents: Vec<SimulationDocument>) -> Match {
        Match::new(
            QueryDescriptor::new("Crystal", Some("90-232".to_string())),
            PrimaryChannel::Gamma,
            rate,
            documents,
        )
    }

    fn canonical() -> BinEdges {
        BinEdges::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], EnergyUnit::Kev).expect("edges")
    }

    #[test]
    fn coarse_document_is_resampled_onto_canonical_bins() {
        let spectrum = DirectSpectrum::new(HitType::Gammas, canonical());
        let m = matched(1.0, vec![document(1, &[5.0, 7.0], &[0.0, 2.0, 4.0])]);

        let binned = spectrum.evaluate(&m).expect("spectrum");
        assert_eq!(binned.values, vec![0.0, 5.0, 0.0, 7.0]);
        assert_eq!(binned.values.iter().sum::<f64>(), 12.0);
        assert_eq!(binned.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn documents_sum_per_bin_and_normalize() {
        let spectrum = DirectSpectrum::new(HitType::Gammas, canonical()).with_scale(3.0);
        let m = matched(
            2.0,
            vec![
                document(2, &[1.0, 2.0, 3.0, 4.0], &[]),
                document(2, &[4.0, 3.0, 2.0, 1.0], &[0.0, 1.0, 2.0, 3.0, 4.0]),
                SimulationDocument {
                    nprimaries: 2,
                    ..SimulationDocument::default()
                },
            ],
        );

        let binned = spectrum.evaluate(&m).expect("spectrum");
        assert_eq!(binned.values, vec![5.0, 5.0, 5.0, 5.0]);
        let points: Vec<(f64, f64)> = binned.points().collect();
        assert_eq!(points[0], (0.0, 5.0));
        assert_eq!(points[3], (3.0, 5.0));
        assert_eq!(binned.bin_count(), 4);
    }

    #[test]
    fn density_divides_by_width_in_output_unit() {
        let edges = BinEdges::new(vec![0.0, 500.0, 1500.0], EnergyUnit::Kev).expect("edges");
        let spectrum = DirectSpectrum::new(HitType::Gammas, edges)
            .with_unit(EnergyUnit::Mev)
            .with_density(true);
        let m = matched(1.0, vec![document(1, &[1.0, 4.0], &[])]);

        let binned = spectrum.evaluate(&m).expect("spectrum");
        assert_eq!(binned.edges, vec![0.0, 0.5, 1.5]);
        assert_eq!(binned.values, vec![2.0, 4.0]);
    }

    #[test]
    fn zero_livetime_is_reported() {
        let spectrum = DirectSpectrum::new(HitType::Gammas, canonical());
        assert_eq!(
            spectrum.evaluate(&matched(1.0, Vec::new())),
            Err(EvaluationError::ZeroLivetime)
        );
        assert_eq!(
            spectrum.evaluate(&matched(0.0, vec![document(3, &[1.0; 4], &[])])),
            Err(EvaluationError::ZeroEmissionRate)
        );
    }
}
