//! PTSA-catalysed esterification of palmitic acid with isopropyl alcohol
//!
//! ```text
//! PA + IPA -> IPP + H2O        (linoleic acid is carried as an inert)
//! k(T)  = A * exp(-Ea / (R_G * T))
//! rate  = k(T) * C_PTSA * C_PA            kmol/(m³·min)
//! heat  = -dH * rate                      kJ/(m³·min)
//! ```
//! Isopropyl alcohol is fed in excess (molar ratio >= 1), so the rate is pseudo-first order
//! in the limiting reactant. The reverse reaction is not modelled.
use crate::Constants::{PhysicalConstants, R_G};
use crate::ReactorsPDE::RealPFR::ReactorError;
use enum_dispatch::enum_dispatch;

/// number of tracked species: [PA, IPA, IPP, H2O, linoleic acid]
pub const N_SPECIES: usize = 5;
/// stoichiometric coefficients of the species in the esterification
pub const STOICHIOMETRY: [f64; N_SPECIES] = [-1.0, -1.0, 1.0, 1.0, 0.0];

/// Arrhenius rate constant k = A·exp(-E/(R·T)), E in J/mol
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrhenius {
    pub A: f64,
    pub E: f64,
}

impl Arrhenius {
    #[allow(non_snake_case)]
    pub fn new(A: f64, E: f64) -> Self {
        Self { A, E }
    }

    pub fn k(&self, T: f64) -> f64 {
        if !(T > 0.0) || !T.is_finite() {
            return 0.0;
        }
        self.A * (-self.E / (R_G * T)).exp()
    }
}

/// Local reaction rate and the heat it releases into the liquid
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReactionRate {
    /// kmol/(m³·min), never negative
    pub rate: f64,
    /// kJ/(m³·min), negative for an endothermic reaction
    pub heat_release: f64,
}

#[enum_dispatch]
pub trait KineticModel {
    /// rate and heat release at local temperature T and concentrations
    /// [PA, IPA, IPP, H2O, linoleic acid]
    fn rate(&self, T: f64, concentrations: &[f64]) -> ReactionRate;
    /// largest linear rate coefficient d(rate)/d(C_PA) at temperature T, 1/min
    fn max_rate_coefficient(&self, T: f64) -> f64;
    fn name(&self) -> &str;
}

/// Homogeneous acid catalysis by p-toluenesulfonic acid
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct PtsaEsterification {
    pub arrhenius: Arrhenius,
    /// catalyst concentration, kmol/m³
    pub C_ptsa: f64,
    /// reaction enthalpy, kJ/kmol
    pub dH: f64,
}

impl PtsaEsterification {
    #[allow(non_snake_case)]
    pub fn new(arrhenius: Arrhenius, C_ptsa: f64, dH: f64) -> Result<Self, ReactorError> {
        if !(C_ptsa >= 0.0) || !C_ptsa.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "catalyst concentration must be non-negative, got {}",
                C_ptsa
            )));
        }
        if !(arrhenius.A > 0.0) || !(arrhenius.E > 0.0) || !dH.is_finite() {
            return Err(ReactorError::InvalidConfiguration(
                "Arrhenius parameters must be positive and dH finite".to_string(),
            ));
        }
        Ok(Self {
            arrhenius,
            C_ptsa,
            dH,
        })
    }

    /// Build the model from the constants table. The catalyst concentration follows from
    /// the PTSA loading (kg PTSA per kg palmitic acid), the acid feed (kmol/min) and the
    /// volumetric flow through the reactor (m³/min).
    pub fn from_constants(
        constants: &PhysicalConstants,
        acid_feed: f64,
        volumetric_flow: f64,
    ) -> Result<Self, ReactorError> {
        if !(volumetric_flow > 0.0) {
            return Err(ReactorError::InvalidConfiguration(
                "volumetric flow must be positive".to_string(),
            ));
        }
        let ptsa_mass_flow = constants.ptsa_loading * acid_feed * constants.palm_acid_wt;
        let c_ptsa = ptsa_mass_flow / constants.ptsa_wt / volumetric_flow;
        Self::new(
            Arrhenius::new(constants.A, constants.Ea),
            c_ptsa,
            constants.dH,
        )
    }
}

impl KineticModel for PtsaEsterification {
    #[allow(non_snake_case)]
    fn rate(&self, T: f64, concentrations: &[f64]) -> ReactionRate {
        let clamp = |c: Option<&f64>| match c {
            Some(v) if *v > 0.0 && v.is_finite() => *v,
            _ => 0.0,
        };
        let c_pa = clamp(concentrations.first());
        let c_ipa = clamp(concentrations.get(1));
        if c_pa == 0.0 || c_ipa == 0.0 {
            return ReactionRate::default();
        }
        let rate = self.max_rate_coefficient(T) * c_pa;
        ReactionRate {
            rate,
            heat_release: -self.dH * rate,
        }
    }

    #[allow(non_snake_case)]
    fn max_rate_coefficient(&self, T: f64) -> f64 {
        self.arrhenius.k(T) * self.C_ptsa
    }

    fn name(&self) -> &str {
        "PTSA esterification"
    }
}

/// Kinetics switched off: the reactor reduces to pure transport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoReaction;

impl KineticModel for NoReaction {
    fn rate(&self, _T: f64, _concentrations: &[f64]) -> ReactionRate {
        ReactionRate::default()
    }
    fn max_rate_coefficient(&self, _T: f64) -> f64 {
        0.0
    }
    fn name(&self) -> &str {
        "no reaction"
    }
}

/// Reaction models the reactor solver can carry
#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch(KineticModel)]
pub enum ReactionModel {
    Ptsa(PtsaEsterification),
    Inert(NoReaction),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> PtsaEsterification {
        PtsaEsterification::new(Arrhenius::new(1.1e6, 50_000.0), 0.1, 10_000.0).unwrap()
    }

    #[test]
    fn test_arrhenius_temperature_dependence() {
        let arr = Arrhenius::new(1.1e6, 50_000.0);
        let k1 = arr.k(393.0);
        let k2 = arr.k(420.0);
        assert!(k2 > k1);
        assert_relative_eq!(
            k1,
            1.1e6 * (-50_000.0 / (8.314 * 393.0_f64)).exp(),
            max_relative = 1e-12
        );
        assert_eq!(arr.k(0.0), 0.0);
        assert_eq!(arr.k(f64::NAN), 0.0);
    }

    #[test]
    fn test_rate_is_linear_in_acid_and_heat_is_proportional() {
        let m = model();
        let r1 = m.rate(410.0, &[1.0, 5.0, 0.0, 0.0, 0.02]);
        let r2 = m.rate(410.0, &[2.0, 5.0, 0.0, 0.0, 0.02]);
        assert!(r1.rate > 0.0);
        assert_relative_eq!(r2.rate, 2.0 * r1.rate, max_relative = 1e-12);
        assert_relative_eq!(r1.heat_release, -10_000.0 * r1.rate, max_relative = 1e-12);
        // endothermic reaction draws heat from the liquid
        assert!(r1.heat_release < 0.0);
    }

    #[test]
    fn test_rate_clamps_degenerate_concentrations() {
        let m = model();
        assert_eq!(m.rate(410.0, &[0.0, 5.0, 0.0, 0.0, 0.0]).rate, 0.0);
        assert_eq!(m.rate(410.0, &[-1e-12, 5.0, 0.0, 0.0, 0.0]).rate, 0.0);
        assert_eq!(m.rate(410.0, &[1.0, 0.0, 0.0, 0.0, 0.0]).rate, 0.0);
        assert_eq!(m.rate(410.0, &[f64::NAN, 5.0, 0.0, 0.0, 0.0]).rate, 0.0);
        assert_eq!(m.rate(410.0, &[]).rate, 0.0);
        let r = m.rate(-5.0, &[1.0, 5.0, 0.0, 0.0, 0.0]);
        assert_eq!(r.rate, 0.0);
        assert!(!r.heat_release.is_nan());
    }

    #[test]
    fn test_enum_dispatch_and_inert_model() {
        let ptsa: ReactionModel = model().into();
        let inert: ReactionModel = NoReaction.into();
        assert!(ptsa.rate(410.0, &[1.0, 5.0, 0.0, 0.0, 0.0]).rate > 0.0);
        assert_eq!(inert.rate(410.0, &[1.0, 5.0, 0.0, 0.0, 0.0]), ReactionRate::default());
        assert_eq!(inert.max_rate_coefficient(500.0), 0.0);
        assert_eq!(ptsa.name(), "PTSA esterification");
    }

    #[test]
    fn test_catalyst_concentration_from_constants() {
        let constants = PhysicalConstants::default();
        let m = PtsaEsterification::from_constants(&constants, 1.3385, 0.923).unwrap();
        // 5 wt% of 343 kg/min acid is ~0.1 kmol/min PTSA in ~0.92 m³/min
        assert!(m.C_ptsa > 0.09 && m.C_ptsa < 0.13);
        assert!(PtsaEsterification::from_constants(&constants, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(PtsaEsterification::new(Arrhenius::new(-1.0, 5e4), 0.1, 1e4).is_err());
        assert!(PtsaEsterification::new(Arrhenius::new(1e6, 5e4), -0.1, 1e4).is_err());
        assert!(PtsaEsterification::new(Arrhenius::new(1e6, 5e4), 0.1, f64::INFINITY).is_err());
    }

    #[test]
    fn test_stoichiometry_conserves_mass() {
        let constants = PhysicalConstants::default();
        let mw = constants.molar_masses();
        let balance: f64 = STOICHIOMETRY.iter().zip(mw.iter()).map(|(nu, m)| nu * m).sum();
        // 256.43 + 60.1 vs 298.511 + 18.015
        assert!(balance.abs() < 0.01);
    }
}
