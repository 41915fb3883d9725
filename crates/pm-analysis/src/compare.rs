//! Unit-area comparison of two runs' mass spectra.

use pm_core::{Error, Result};
use pm_hist::Histogram1D;

use crate::pairing::{MassSpectra, MassSpectrum};

/// One spectrum from both runs, each normalised to unit area.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumComparison {
    /// Which spectrum.
    pub spectrum: MassSpectrum,
    /// Normalised spectrum of the first run.
    pub primary: Histogram1D,
    /// Normalised spectrum of the reference run.
    pub reference: Histogram1D,
}

impl SpectrumComparison {
    /// Destinations of the two histograms, e.g. `combined/pipi_reco` and
    /// `combined/pipi_reference`.
    pub fn destinations(&self) -> (String, String) {
        let l = self.spectrum.label();
        (format!("combined/{l}_reco"), format!("combined/{l}_reference"))
    }
}

/// Normalise every spectrum of `primary` and `reference` side by side.
///
/// Both runs must use the same binning. A spectrum with no in-range entries
/// normalises to all zeros.
pub fn compare_spectra(primary: &MassSpectra, reference: &MassSpectra) -> Result<Vec<SpectrumComparison>> {
    MassSpectrum::ALL
        .into_iter()
        .map(|spectrum| {
            let a = primary.spectrum(spectrum);
            let b = reference.spectrum(spectrum);
            if a.axis != b.axis {
                return Err(Error::Validation(format!(
                    "cannot compare {} spectra with different binning",
                    spectrum.label()
                )));
            }
            let mut primary = a.normalised();
            primary.title = normalised_title(&a.title);
            let mut reference = b.normalised();
            reference.title = normalised_title(&b.title);
            Ok(SpectrumComparison { spectrum, primary, reference })
        })
        .collect()
}

/// Swap the y-axis label for `normalized events`.
fn normalised_title(title: &str) -> String {
    let mut parts: Vec<&str> = title.split(';').collect();
    if parts.len() == 3 {
        parts[2] = "normalized events";
    }
    parts.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AxisConfig, MassSpectraConfig};
    use approx::assert_relative_eq;

    #[test]
    fn empty_spectra_normalise_to_zero() {
        let cfg = MassSpectraConfig::default();
        let reco = MassSpectra::new(&cfg, "reco").unwrap();
        let recorded = MassSpectra::new(&cfg, "reco").unwrap();

        let cmp = compare_spectra(&reco, &recorded).unwrap();
        assert_eq!(cmp.len(), 3);
        assert_eq!(cmp[0].destinations().0, "combined/pipi_reco");
        assert!(cmp[0].primary.bin_content.iter().all(|&v| v == 0.0));
        assert!(cmp[0].primary.title.ends_with(";normalized events"));
    }

    #[test]
    fn unit_area_after_filling() {
        let mut h = Histogram1D::new("h", "a;b;events", AxisConfig::new(4, 0.0, 4.0).to_axis().unwrap());
        h.fill_n(&[0.5, 0.5, 1.5, 3.5]);
        let n = h.normalised();
        assert_relative_eq!(n.integral(), 1.0, max_relative = 1e-12);
        assert_eq!(normalised_title(&h.title), "a;b;normalized events");
    }

    #[test]
    fn different_binning_is_rejected() {
        let a = MassSpectra::new(&MassSpectraConfig::default(), "reco").unwrap();
        let cfg = MassSpectraConfig { kk: AxisConfig::new(10, 950.0, 1500.0), ..Default::default() };
        let b = MassSpectra::new(&cfg, "reco").unwrap();
        assert!(compare_spectra(&a, &b).is_err());
    }
}
