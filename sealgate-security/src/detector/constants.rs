//! Reference numerics the numerical scanner compares literals against.
//!
//! Values are CODATA 2018, PDG 2022 and Planck 2018 central values. They are
//! detection targets only and never flow into any computation.

/// A named empirical constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmpiricalConstant {
    pub name: &'static str,
    pub value: f64,
}

const fn c(name: &'static str, value: f64) -> EmpiricalConstant {
    EmpiricalConstant { name, value }
}

/// Curated table of named empirical constants, matched at two tolerances.
pub const EMPIRICAL_CONSTANTS: &[EmpiricalConstant] = &[
    // Electroweak / QED
    c("fine_structure_inverse", 137.035999084),
    c("fine_structure", 0.0072973525693),
    c("weinberg_angle_sin2", 0.23121),
    c("fermi_constant_gev2", 1.1663788e-5),
    c("strong_coupling_mz", 0.1179),
    // Masses (MeV unless noted)
    c("electron_mass_mev", 0.51099895000),
    c("muon_mass_mev", 105.6583755),
    c("tau_mass_mev", 1776.86),
    c("proton_mass_mev", 938.27208816),
    c("neutron_mass_mev", 939.56542052),
    c("proton_electron_mass_ratio", 1836.15267343),
    c("w_boson_mass_gev", 80.377),
    c("z_boson_mass_gev", 91.1876),
    c("higgs_mass_gev", 125.25),
    c("top_quark_mass_gev", 172.69),
    // Gravitation / cosmology
    c("gravitational_constant", 6.67430e-11),
    c("hubble_constant", 67.4),
    c("omega_lambda", 0.6847),
    c("omega_matter", 0.3153),
    c("spectral_index", 0.9649),
    c("baryon_density", 0.02237),
];

/// Numerics that must never appear in a pure derivation: measured particle
/// masses in alternative units and mixing angles. Matched at the exact tolerance.
pub const FORBIDDEN_NUMERICS: &[EmpiricalConstant] = &[
    // Lepton and hadron masses in GeV
    c("electron_mass_gev", 0.00051099895),
    c("muon_mass_gev", 0.1056583755),
    c("tau_mass_gev", 1.77686),
    c("proton_mass_gev", 0.93827208816),
    c("bottom_quark_mass_gev", 4.18),
    c("charm_quark_mass_gev", 1.27),
    c("strange_quark_mass_gev", 0.0934),
    // Neutrino mixing (sin^2 theta)
    c("sin2_theta12", 0.307),
    c("sin2_theta23", 0.546),
    c("sin2_theta13", 0.0220),
    // CKM magnitudes
    c("ckm_vus", 0.2243),
    c("ckm_vcb", 0.0408),
    c("ckm_vub", 0.00382),
    // Angles in degrees
    c("cabibbo_angle_deg", 13.04),
    c("weinberg_angle_deg", 28.74),
    // Cosmology
    c("cmb_temperature_k", 2.7255),
];

/// Relative difference between an observed literal and a reference value.
pub fn relative_difference(observed: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return observed.abs();
    }
    ((observed - reference) / reference).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_difference() {
        assert_eq!(relative_difference(2.0, 2.0), 0.0);
        assert!((relative_difference(1.01, 1.0) - 0.01).abs() < 1e-12);
        assert_eq!(relative_difference(0.5, 0.0), 0.5);
    }

    #[test]
    fn test_tables_have_unique_names() {
        let mut names: Vec<&str> = EMPIRICAL_CONSTANTS
            .iter()
            .chain(FORBIDDEN_NUMERICS)
            .map(|c| c.name)
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_no_reference_value_is_trivially_exempt() {
        for constant in EMPIRICAL_CONSTANTS.iter().chain(FORBIDDEN_NUMERICS) {
            assert!(constant.value != 0.0 && constant.value.abs() != 1.0);
        }
    }
}
