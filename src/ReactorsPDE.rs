//! # Reactor PDE Module
//!
//! Transient two-dimensional ("real") plug-flow reactor for the esterification of palmitic acid
//! with isopropyl alcohol over dissolved PTSA, with radial heat and mass transport.
//!
//! ## Mathematical Model
//!
//! ### Nomenclature
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `z`, `r` | axial and radial coordinate | m |
//! | `u` | superficial velocity `Q/(πR²)` | m/min |
//! | `C_i` | concentration of species i | kmol/m³ |
//! | `T` | temperature | K |
//! | `ρ`, `Cp` | density, heat capacity of the liquid | kg/m³, kJ/(kg·K) |
//! | `k_e` | thermal conductivity | kJ/(min·m·K) |
//! | `D_r` | radial dispersion coefficient | m²/min |
//! | `h` | heater wall heat transfer coefficient | kJ/(min·m²·K) |
//! | `w` | reaction rate | kmol/(m³·min) |
//!
//! ### Model Assumptions
//!
//! - no axial back-mixing; the velocity profile is flat
//! - density and heat capacity are those of the feed mixture
//! - heat enters only through the wall at `r = R`
//!
//! ### Governing Equations
//! ```text
//! ∂C_i/∂t = -u ∂C_i/∂z + D_r (1/r) ∂/∂r (r ∂C_i/∂r) + ν_i w(T, C)
//! ρCp ∂T/∂t = -ρCp u ∂T/∂z + k_e (1/r) ∂/∂r (r ∂T/∂r) - ΔH w(T, C)
//! ```
//! ### Boundary Conditions
//! - `z = 0`: `C_i = C_i0`, `T = T_feed`
//! - `r = 0`: `∂C_i/∂r = ∂T/∂r = 0`
//! - `r = R`: `∂C_i/∂r = 0`, `-k_e ∂T/∂r = h (T - T_heater)`
//!
//! The reactor starts filled with feed at the feed temperature. Conversion is
//! `X = 1 - C_PA / C_PA0`.
//!
//! ## Numerical Solution
//! Explicit finite volumes with a CFL-type stability bound, see [`RealPFR`](RealPFR::RealPFR).
//!
//! ```rust,no_run
//! use EsterPFR::ReactorsPDE::RealPFR::RealPFR;
//! use EsterPFR::ReactorsPDE::simulation_trace::StateVariable;
//! let reactor = RealPFR::new(1.3385, 5.0, 4.0, 1.25, 393.0, 420.0, 51).unwrap();
//! let trace = reactor.run(0.1, 100.0).unwrap();
//! let last = trace.len() - 1;
//! let mean_conversion = reactor
//!     .flow_averaged_profile(&trace, last, StateVariable::Conversion)
//!     .unwrap();
//! println!("outlet conversion {}", mean_conversion[mean_conversion.len() - 1]);
//! ```

pub mod RealPFR;
pub mod pfr_config;
pub mod pfr_output;
pub mod reactor_grid;
pub mod simulation_trace;
