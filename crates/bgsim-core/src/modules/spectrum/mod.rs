//! Evaluators turning the histograms of a match into normalized rates.
//!
//! Both evaluators read one [`HitType`] histogram per document. Counts are
//! first turned into per-bin totals on the document's own edges (multiplying
//! by bin width when the stored values are densities), then moved onto the
//! canonical edges when those differ. Rates are `totals / livetime * scale`.

mod average;
mod binning;
mod direct;

pub use average::SpectrumAverage;
pub use binning::{BinEdges, resample};
pub use direct::{BinnedSpectrum, DirectSpectrum};

use crate::common::EnergyUnit;
use crate::domain::{EvaluationError, HitType, Match, SimulationDocument};
use crate::modules::livetime::livetime;
use std::borrow::Cow;

/// Per-bin totals of one document histogram and the edges they sit on.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DocumentBins<'a> {
    pub edges: Cow<'a, BinEdges>,
    pub totals: Vec<f64>,
}

/// Reads the `hit` histogram of `document` as per-bin totals.
///
/// Documents without the histogram contribute nothing (`None`). Documents
/// without their own edges are read on `canonical`.
pub(crate) fn document_bins<'a>(
    document: &SimulationDocument,
    hit: HitType,
    canonical: Option<&'a BinEdges>,
    binwidths: bool,
) -> Result<Option<DocumentBins<'a>>, EvaluationError> {
    let Some(histogram) = document.histogram(hit) else {
        return Ok(None);
    };

    let native = match (&histogram.edges, canonical) {
        (Some(edges), _) => Cow::Owned(BinEdges::new(edges.clone(), EnergyUnit::Kev)?),
        (None, Some(canonical)) => Cow::Borrowed(canonical),
        (None, None) => {
            return Err(EvaluationError::MissingBinEdges { hit: hit.as_str() });
        }
    };
    binning::check_shape(&histogram.counts, &native)?;

    let totals = if binwidths {
        histogram
            .counts
            .iter()
            .zip(native.widths())
            .map(|(density, width)| density * width)
            .collect()
    } else {
        histogram.counts.clone()
    };

    match canonical {
        Some(canonical) if !native.approx_eq(canonical) => Ok(Some(DocumentBins {
            totals: resample(&totals, &native, canonical)?,
            edges: Cow::Borrowed(canonical),
        })),
        _ => Ok(Some(DocumentBins {
            edges: native,
            totals,
        })),
    }
}

/// Livetime of `matched`, rejecting the zero case a rate cannot divide by.
pub(crate) fn nonzero_livetime(matched: &Match) -> Result<f64, EvaluationError> {
    let livetime = livetime(matched)?;
    if livetime == 0.0 {
        return Err(EvaluationError::ZeroLivetime);
    }
    Ok(livetime)
}

#[cfg(test)]
mod tests {
    use super::{BinEdges, document_bins};
    use crate::common::EnergyUnit;
    use crate::domain::{EvaluationError, HitType, Histogram, SimulationDocument};
    use std::borrow::Cow;

    fn document(counts: &[f64], edges: &[f64]) -> SimulationDocument {
        let mut document = SimulationDocument::default();
        document.hits.insert(
            HitType::Gammas,
            Histogram::new(counts.to_vec(), (!edges.is_empty()).then(|| edges.to_vec())),
        );
        document
    }

    fn kev(edges: &[f64]) -> BinEdges {
        BinEdges::new(edges.to_vec(), EnergyUnit::Kev).expect("edges")
    }

    #[test]
    fn missing_histogram_contributes_nothing() {
        let bins = document_bins(&SimulationDocument::default(), HitType::Gammas, None, false)
            .expect("bins");
        assert!(bins.is_none());
    }

    #[test]
    fn missing_edges_fall_back_to_canonical() {
        let canonical = kev(&[0.0, 1.0, 2.0]);
        let bins = document_bins(
            &document(&[3.0, 4.0], &[]),
            HitType::Gammas,
            Some(&canonical),
            false,
        )
        .expect("bins")
        .expect("histogram present");
        assert!(matches!(bins.edges, Cow::Borrowed(_)));
        assert_eq!(bins.totals, vec![3.0, 4.0]);

        let error = document_bins(&document(&[3.0, 4.0], &[]), HitType::Gammas, None, false)
            .expect_err("no edges anywhere");
        assert_eq!(error, EvaluationError::MissingBinEdges { hit: "gammas" });
    }

    #[test]
    fn densities_use_native_widths_before_resampling() {
        let canonical = kev(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let bins = document_bins(
            &document(&[0.5, 2.0], &[0.0, 2.0, 4.0]),
            HitType::Gammas,
            Some(&canonical),
            true,
        )
        .expect("bins")
        .expect("histogram present");
        assert_eq!(bins.edges.as_kev(), canonical.as_kev());
        assert_eq!(bins.totals, vec![0.0, 1.0, 0.0, 4.0]);
    }

    #[test]
    fn count_length_must_fit_edges() {
        let error = document_bins(
            &document(&[1.0, 2.0, 3.0], &[0.0, 1.0]),
            HitType::Gammas,
            None,
            false,
        )
        .expect_err("shape mismatch");
        assert!(matches!(error, EvaluationError::InvalidBinEdges { .. }));
    }
}
