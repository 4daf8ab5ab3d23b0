/// Rate law of the PTSA-catalysed esterification of palmitic acid with isopropyl alcohol.
///
/// The module provides the Arrhenius rate constant, the catalytic rate expression and the heat it
/// releases, and an inert model for transport-only runs. Both are carried by the `ReactionModel`
/// enum and dispatched through the `KineticModel` trait.
///
/// # Examples
/// ```
/// use EsterPFR::Kinetics::esterification::{Arrhenius, KineticModel, PtsaEsterification};
/// let model = PtsaEsterification::new(Arrhenius::new(1.1e6, 50_000.0), 0.1, 10_000.0).unwrap();
/// let r = model.rate(410.0, &[1.45, 7.25, 0.0, 0.0, 0.03]);
/// assert!(r.rate > 0.0);
/// assert!(r.heat_release < 0.0);
/// ```
pub mod esterification;
