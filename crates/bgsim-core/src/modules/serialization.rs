use super::spectrum::BinnedSpectrum;
use super::view::RequestEvaluation;
use std::fs;
use std::path::Path;

const ABSENT: &str = "-";

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

pub fn format_scientific_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$e}",
        width = width,
        precision = precision
    )
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

/// Tab-separated table with one row per match and one column per value.
///
/// Requests without matches (error status) still get a row so they render.
pub fn render_value_table(labels: &[String], evaluations: &[RequestEvaluation]) -> String {
    let mut header = vec![
        "component".to_string(),
        "spec".to_string(),
        "channel".to_string(),
        "status".to_string(),
        "documents".to_string(),
        "livetime_s".to_string(),
    ];
    header.extend(labels.iter().cloned());

    let mut lines = vec![header.join("\t")];
    for evaluation in evaluations {
        let status = if evaluation.is_error() { "error" } else { "ok" };
        if evaluation.matches.is_empty() {
            let mut row = vec![
                evaluation.component.clone(),
                evaluation.spec.clone(),
                evaluation.channel.to_string(),
                status.to_string(),
                "0".to_string(),
                ABSENT.to_string(),
            ];
            row.extend(labels.iter().map(|_| ABSENT.to_string()));
            lines.push(row.join("\t"));
            continue;
        }
        for matched in &evaluation.matches {
            let mut row = vec![
                evaluation.component.clone(),
                evaluation.spec.clone(),
                matched.channel.to_string(),
                status.to_string(),
                matched.documents.to_string(),
                optional_scientific(matched.livetime),
            ];
            row.extend(labels.iter().map(|label| {
                let value = matched
                    .values
                    .iter()
                    .find(|value| &value.label == label)
                    .and_then(|value| value.value);
                optional_scientific(value)
            }));
            lines.push(row.join("\t"));
        }
    }

    normalize_text_artifact(&lines.join("\n"))
}

/// Two-column `lower edge, value` listing of a spectrum.
pub fn render_spectrum(spectrum: &BinnedSpectrum, value_unit: &str) -> String {
    let mut content = format!("# energy[{}]  rate[{}]\n", spectrum.unit, value_unit);
    for (edge, value) in spectrum.points() {
        content.push_str(&format_fixed_f64(edge, 12, 4));
        content.push_str(&format_scientific_f64(value, 16, 6));
        content.push('\n');
    }
    content
}

fn optional_scientific(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |value| format_scientific_f64(value, 0, 6))
}

#[cfg(test)]
mod tests {
    use super::{
        format_fixed_f64, format_scientific_f64, normalize_text_artifact, render_spectrum,
        render_value_table, write_text_artifact,
    };
    use crate::common::EnergyUnit;
    use crate::domain::{PrimaryChannel, QueryDescriptor, RequestStatus};
    use crate::modules::spectrum::BinnedSpectrum;
    use crate::modules::view::{DerivedValue, MatchEvaluation, RequestEvaluation};
    use std::fs;
    use tempfile::TempDir;

    fn evaluation(status: Vec<RequestStatus>, matches: Vec<MatchEvaluation>) -> RequestEvaluation {
        RequestEvaluation {
            component: "Crystal".to_string(),
            volume: "Crystal".to_string(),
            spec: "U238".to_string(),
            channel: PrimaryChannel::Gamma,
            emission_rate: 1.0,
            status,
            query: None,
            matches,
        }
    }

    #[test]
    fn fixed_width_float_formatting_is_deterministic() {
        assert_eq!(format_fixed_f64(1.23, 13, 5), "      1.23000");
        assert_eq!(format_scientific_f64(1234.56, 0, 3), "1.235e3");
        assert_eq!(format_scientific_f64(0.00025, 10, 1), "    2.5e-4");
    }

    #[test]
    fn normalize_text_artifact_uses_canonical_line_endings() {
        let normalized = normalize_text_artifact("alpha\r\nbeta\rgamma");
        assert_eq!(normalized, "alpha\nbeta\ngamma\n");
    }

    #[test]
    fn repeated_text_writes_produce_identical_bytes() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("gammas.dat");
        let input = "line 1\r\nline 2\rline 3";

        write_text_artifact(&path, input).expect("first write should succeed");
        let first = fs::read(&path).expect("artifact should be readable");
        write_text_artifact(&path, input).expect("second write should succeed");
        let second = fs::read(&path).expect("artifact should be readable");

        assert_eq!(first, second);
        assert_eq!(second, b"line 1\nline 2\nline 3\n");
    }

    #[test]
    fn value_table_renders_matches_and_error_rows() {
        let labels = vec!["Gammas, 1-3 keV".to_string()];
        let matched = MatchEvaluation {
            query: QueryDescriptor::new("Crystal", Some("92-238".to_string())),
            channel: PrimaryChannel::Gamma,
            emission_rate: 1.0,
            documents: 2,
            livetime: Some(2.0),
            values: vec![DerivedValue {
                label: "Gammas, 1-3 keV".to_string(),
                unit: "dru".to_string(),
                value: Some(50.0),
                spectrum: None,
                note: None,
            }],
            spectra: Vec::new(),
        };
        let table = render_value_table(
            &labels,
            &[
                evaluation(Vec::new(), vec![matched]),
                evaluation(vec![RequestStatus::Error], Vec::new()),
            ],
        );

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(
            lines[0],
            "component\tspec\tchannel\tstatus\tdocuments\tlivetime_s\tGammas, 1-3 keV"
        );
        assert_eq!(lines[1], "Crystal\tU238\tgamma\tok\t2\t2.000000e0\t5.000000e1");
        assert_eq!(lines[2], "Crystal\tU238\tgamma\terror\t0\t-\t-");
        assert!(table.ends_with('\n'));
    }

    #[test]
    fn spectrum_listing_has_one_line_per_bin() {
        let spectrum = BinnedSpectrum {
            edges: vec![0.0, 1.0, 2.0],
            unit: EnergyUnit::Kev,
            values: vec![0.5, 0.25],
        };
        let listing = render_spectrum(&spectrum, "1/kg/day");
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "# energy[keV]  rate[1/kg/day]");
        assert_eq!(lines[1], "      0.0000     5.000000e-1");
        assert_eq!(lines[2], "      1.0000     2.500000e-1");
    }
}
