//! # Physical constants
//!
//! Thermophysical, kinetic and cost data for the isopropyl palmitate process.
//! The table is plain data: it is built once (either [`PhysicalConstants::default`] or
//! deserialised from JSON), validated, and then handed to the kinetics model and the
//! reactor solver. Nothing in the crate reads these values from global state.
//!
//! ## Units
//! | Quantity | Units |
//! |----------|-------|
//! | molar mass | kg/kmol (= g/mol) |
//! | density | kg/m³ |
//! | heat capacity | kJ/(kg·K) |
//! | thermal conductivity | kJ/(min·m·K) |
//! | heat transfer coefficient | kJ/(min·m²·K) |
//! | activation energy | J/mol |
//! | reaction enthalpy | kJ/kmol |
//! | dispersion coefficient | m²/min |
use crate::ReactorsPDE::RealPFR::ReactorError;
use serde::{Deserialize, Serialize};

/// Universal gas constant in J/(mol·K)
pub const R_G: f64 = 8.314;

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    ////////////////////////////// SPECIES //////////////////////////////
    pub palm_acid_wt: f64,
    pub palm_acid_density: f64,
    /// max amount of palmitic acid fed to the plant, kmol
    pub palm_acid_cap: f64,
    pub ipa_wt: f64,
    pub ipa_density: f64,
    pub ipp_wt: f64,
    pub ipp_density: f64,
    pub water_wt: f64,
    pub water_density: f64,
    pub linoleic_acid_wt: f64,
    pub linoleic_acid_density: f64,
    /// moles of linoleic acid carried per mole of palmitic acid in the acid feed
    pub linoleic_acid_impurity: f64,
    ////////////////////////////// CATALYST //////////////////////////////
    pub ptsa_wt: f64,
    pub ptsa_density: f64,
    /// USD per g
    pub ptsa_cost_per_g: f64,
    /// PTSA mass per mass of palmitic acid fed
    pub ptsa_loading: f64,
    pub zna_particle_size: f64,
    /// m²/g
    pub zna_surface_area: f64,
    pub zna_pore_diameter: f64,
    ////////////////////////////// KINETICS //////////////////////////////
    /// pre-exponential factor, m⁶/(kmol²·min) once multiplied by C_PTSA·C_PA
    pub A: f64,
    /// activation energy, J/mol
    pub Ea: f64,
    /// reaction enthalpy, kJ/kmol (positive = endothermic)
    pub dH: f64,
    ////////////////////////////// ENERGY BALANCE //////////////////////////////
    /// average thermal conductivity of the solution
    pub k_e: f64,
    /// overall heat transfer coefficient of the heater wall
    pub h_heater: f64,
    /// effective radial dispersion of the species
    pub d_radial: f64,
    pub feed_1_mass_flow: f64,
    pub feed_1_cp: f64,
    /// °C
    pub feed_1_temp: f64,
    pub feed_5_mass_flow: f64,
    pub feed_5_cp: f64,
    /// °C
    pub feed_5_temp: f64,
    pub ipa_cp: f64,
    pub feed_viscosity: f64,
    ////////////////////////////// COSTS //////////////////////////////
    /// USD/kg
    pub ipa_cost: f64,
    /// USD/kg
    pub ipp_cost: f64,
    pub lps_cost: f64,
    pub lps_cost_gj: f64,
    pub mps_cost_gj: f64,
    pub rw_cost: f64,
    pub jacket_reactor_a: f64,
    pub jacket_reactor_b: f64,
    pub jacket_reactor_n: f64,
    ////////////////////////////// PRESSURE DROP //////////////////////////////
    pub rough_cast_iron: f64,
    pub rough_galv_iron: f64,
    pub rough_steel: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            palm_acid_wt: 256.43,
            palm_acid_density: 852.0,
            palm_acid_cap: 93593.0,
            ipa_wt: 60.1,
            ipa_density: 786.0,
            ipp_wt: 298.511,
            ipp_density: 852.0,
            water_wt: 18.015,
            water_density: 997.0,
            linoleic_acid_wt: 280.45,
            linoleic_acid_density: 902.0,
            linoleic_acid_impurity: 0.02,

            ptsa_wt: 172.2,
            ptsa_density: 1240.0,
            ptsa_cost_per_g: 22500.0 / 1000.0 / 1000.0,
            ptsa_loading: 0.05,
            zna_particle_size: 32e-6,
            zna_surface_area: 89.97,
            zna_pore_diameter: 2.578e-9,

            A: 1.1e6,
            Ea: 50_000.0,
            dH: 10_000.0,

            k_e: 0.1399e-3 * 100.0,
            h_heater: 4.0 * 60.0,
            d_radial: 1e-4,
            feed_1_mass_flow: 2712.0,
            feed_1_cp: 2.204,
            feed_1_temp: 45.0,
            feed_5_mass_flow: 18810.0,
            feed_5_cp: 2.132,
            feed_5_temp: 30.07,
            ipa_cp: 4507.5,
            feed_viscosity: 1.507e-4,

            ipa_cost: 3.0,
            ipp_cost: 475.0,
            lps_cost: 5.56e-3,
            lps_cost_gj: 4.54,
            mps_cost_gj: 4.77,
            rw_cost: 0.185e-3,
            jacket_reactor_a: 53000.0,
            jacket_reactor_b: 28000.0,
            jacket_reactor_n: 0.8,

            rough_cast_iron: 0.25e-3,
            rough_galv_iron: 0.15e-3,
            rough_steel: 0.046e-3,
        }
    }
}

impl PhysicalConstants {
    pub fn new() -> Self {
        Self::default()
    }

    fn named_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("palm_acid_wt", self.palm_acid_wt),
            ("palm_acid_density", self.palm_acid_density),
            ("palm_acid_cap", self.palm_acid_cap),
            ("ipa_wt", self.ipa_wt),
            ("ipa_density", self.ipa_density),
            ("ipp_wt", self.ipp_wt),
            ("ipp_density", self.ipp_density),
            ("water_wt", self.water_wt),
            ("water_density", self.water_density),
            ("linoleic_acid_wt", self.linoleic_acid_wt),
            ("linoleic_acid_density", self.linoleic_acid_density),
            ("linoleic_acid_impurity", self.linoleic_acid_impurity),
            ("ptsa_wt", self.ptsa_wt),
            ("ptsa_density", self.ptsa_density),
            ("ptsa_cost_per_g", self.ptsa_cost_per_g),
            ("ptsa_loading", self.ptsa_loading),
            ("zna_particle_size", self.zna_particle_size),
            ("zna_surface_area", self.zna_surface_area),
            ("zna_pore_diameter", self.zna_pore_diameter),
            ("A", self.A),
            ("Ea", self.Ea),
            ("dH", self.dH.abs()),
            ("k_e", self.k_e),
            ("h_heater", self.h_heater),
            ("d_radial", self.d_radial),
            ("feed_1_mass_flow", self.feed_1_mass_flow),
            ("feed_1_cp", self.feed_1_cp),
            ("feed_1_temp", self.feed_1_temp),
            ("feed_5_mass_flow", self.feed_5_mass_flow),
            ("feed_5_cp", self.feed_5_cp),
            ("feed_5_temp", self.feed_5_temp),
            ("ipa_cp", self.ipa_cp),
            ("feed_viscosity", self.feed_viscosity),
            ("ipa_cost", self.ipa_cost),
            ("ipp_cost", self.ipp_cost),
            ("lps_cost", self.lps_cost),
            ("lps_cost_gj", self.lps_cost_gj),
            ("mps_cost_gj", self.mps_cost_gj),
            ("rw_cost", self.rw_cost),
            ("jacket_reactor_a", self.jacket_reactor_a),
            ("jacket_reactor_b", self.jacket_reactor_b),
            ("jacket_reactor_n", self.jacket_reactor_n),
            ("rough_cast_iron", self.rough_cast_iron),
            ("rough_galv_iron", self.rough_galv_iron),
            ("rough_steel", self.rough_steel),
        ]
    }

    /// Reject the table if any entry is non-positive or not finite.
    ///
    /// The reaction enthalpy may have either sign (endo- or exothermic) but must be
    /// finite and nonzero.
    pub fn validate(&self) -> Result<(), ReactorError> {
        for (name, value) in self.named_values() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "physical constant {} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Mass-weighted heat capacity of the two feed streams, kJ/(kg·K)
    pub fn mixture_heat_capacity(&self) -> f64 {
        let total = self.feed_1_mass_flow + self.feed_5_mass_flow;
        (self.feed_1_mass_flow * self.feed_1_cp + self.feed_5_mass_flow * self.feed_5_cp) / total
    }

    /// Adiabatic mixing temperature of feed streams 1 and 5, °C
    pub fn mixing_temperature(&self) -> f64 {
        let c1 = self.feed_1_mass_flow * self.feed_1_cp;
        let c5 = self.feed_5_mass_flow * self.feed_5_cp;
        (c1 * self.feed_1_temp + c5 * self.feed_5_temp) / (c1 + c5)
    }

    /// Purchased cost of a jacketed reactor, Ce = a + b·S^n with S the volume in m³
    pub fn jacketed_reactor_cost(&self, volume: f64) -> f64 {
        self.jacket_reactor_a + self.jacket_reactor_b * volume.max(0.0).powf(self.jacket_reactor_n)
    }

    /// molar masses of [PA, IPA, IPP, water, linoleic acid], kg/kmol
    pub fn molar_masses(&self) -> [f64; 5] {
        [
            self.palm_acid_wt,
            self.ipa_wt,
            self.ipp_wt,
            self.water_wt,
            self.linoleic_acid_wt,
        ]
    }

    /// liquid densities of [PA, IPA, IPP, water, linoleic acid], kg/m³
    pub fn densities(&self) -> [f64; 5] {
        [
            self.palm_acid_density,
            self.ipa_density,
            self.ipp_density,
            self.water_density,
            self.linoleic_acid_density,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_table_is_valid() {
        let constants = PhysicalConstants::default();
        assert!(constants.validate().is_ok());
        assert_relative_eq!(constants.k_e, 0.01399, epsilon = 1e-12);
        assert_relative_eq!(constants.h_heater, 240.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_positive_entry_rejected() {
        let mut constants = PhysicalConstants::default();
        constants.ipa_density = 0.0;
        let err = constants.validate().unwrap_err();
        assert!(matches!(err, ReactorError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("ipa_density"));

        let mut constants = PhysicalConstants::default();
        constants.Ea = f64::NAN;
        assert!(constants.validate().is_err());
    }

    #[test]
    fn test_exothermic_enthalpy_accepted() {
        let mut constants = PhysicalConstants::default();
        constants.dH = -15_000.0;
        assert!(constants.validate().is_ok());
        constants.dH = 0.0;
        assert!(constants.validate().is_err());
    }

    #[test]
    fn test_mixing_helpers() {
        let constants = PhysicalConstants::default();
        let cp = constants.mixture_heat_capacity();
        assert!(cp > constants.feed_5_cp && cp < constants.feed_1_cp);
        let t = constants.mixing_temperature();
        assert!(t > constants.feed_5_temp && t < constants.feed_1_temp);
        assert_relative_eq!(constants.jacketed_reactor_cost(0.0), 53000.0, epsilon = 1e-9);
        assert_relative_eq!(
            constants.jacketed_reactor_cost(1.0),
            53000.0 + 28000.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_json_round_trip_keeps_values() {
        let constants = PhysicalConstants::default();
        let json = serde_json::to_string(&constants).unwrap();
        let back: PhysicalConstants = serde_json::from_str(&json).unwrap();
        assert_relative_eq!(back.A, constants.A, max_relative = 1e-12);
        assert_relative_eq!(back.k_e, constants.k_e, max_relative = 1e-12);
        assert_relative_eq!(back.ptsa_cost_per_g, constants.ptsa_cost_per_g, max_relative = 1e-12);
        assert!(back.validate().is_ok());
    }
}
