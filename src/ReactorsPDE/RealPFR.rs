//! # Real plug-flow reactor
//!
//! Time-marching solver for the tubular esterification reactor with radial heat and mass
//! transport. See the parent module for the governing equations.
//!
//! ## Scheme
//! Explicit (forward Euler) finite volumes on the [`ReactorGrid`]:
//! - axial convection: first-order upwind, `-u (φ_i - φ_{i-1}) / dz`
//! - radial conduction/dispersion: conservative annulus fluxes, zero flux at the centreline
//! - wall: `h (T_heater - T)` into the outermost ring, no species flux
//! - reaction: explicit source from the [`KineticModel`]
//! - inlet row pinned to the feed at every step
//!
//! ## Stability bound
//! Written per cell, one explicit step is
//! `φ_new = (1 - dt·s_cell) φ + dt·(inflow terms) + dt·source`, with
//! `s_cell = u/dz + D·(in + out) + wall + k(T_max)·C_PTSA`. All coefficients of the combination
//! are non-negative (no new extrema, no negative concentrations) iff `dt · max(s_cell) <= 1`.
//! This is the CFL-type condition of the scheme; [`RealPFR::run`] refuses time steps that violate
//! it with [`ReactorError::NumericalInstability`].
//!
//! `T_max = max(T_feed, T_heater)` bounds the temperature only while the reaction draws heat.
//! An exothermic constants table can heat cells past it, so every cell is re-checked against its
//! own temperature during the step and a violation ends the run with [`ReactorError::Divergence`].
use super::pfr_config::{ReactorConfiguration, SolverSettings};
use super::reactor_grid::ReactorGrid;
use super::simulation_trace::{N_STATE, SimulationTrace, StateField, StateVariable, StepFlag};
use crate::Constants::PhysicalConstants;
use crate::Kinetics::esterification::{
    KineticModel, N_SPECIES, PtsaEsterification, ReactionModel, STOICHIOMETRY,
};
use log::{debug, info, warn};
use nalgebra::DVector;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// overshoots smaller than this (relative to the feed acid concentration) are rounding noise
const OVERSHOOT_TOLERANCE: f64 = 1e-10;
/// local stability numbers up to `1 + STABILITY_SLACK` are accepted during the step
const STABILITY_SLACK: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error(
        "Numerical instability: stability number {stability_number:.3} > 1 for time step {time_step} min (largest stable step {max_stable_step:.4e} min)"
    )]
    NumericalInstability {
        stability_number: f64,
        time_step: f64,
        max_stable_step: f64,
    },
    #[error("Solution diverged at t = {time} min in cell (axial {axial}, radial {radial})")]
    Divergence {
        time: f64,
        axial: usize,
        radial: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReactorError {
    /// both a violated stability bound and a detected divergence
    pub fn is_numerical_instability(&self) -> bool {
        matches!(
            self,
            ReactorError::NumericalInstability { .. } | ReactorError::Divergence { .. }
        )
    }
}

/// Cooperative cancellation flag shared between a running simulation and its caller
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Palmitic acid flows on the discrete grid at one time sample, kmol/min
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitingReactantBalance {
    pub inflow: f64,
    pub outflow: f64,
    pub consumption: f64,
}

impl LimitingReactantBalance {
    /// inflow - outflow - consumption; zero at steady state
    pub fn residual(&self) -> f64 {
        self.inflow - self.outflow - self.consumption
    }
    pub fn relative_residual(&self) -> f64 {
        self.residual() / self.inflow
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct RealPFR {
    pub config: ReactorConfiguration,
    pub constants: PhysicalConstants,
    pub settings: SolverSettings,
    pub grid: ReactorGrid,
    pub kinetics: ReactionModel,
    /// inlet cell state [T, C_PA, C_IPA, C_IPP, C_H2O, C_LA, X]
    pub feed: [f64; N_STATE],
    /// m³/min
    pub volumetric_flow: f64,
    /// superficial velocity, m/min
    pub u: f64,
    /// kg/m³
    pub ro: f64,
    /// kJ/(kg·K)
    pub Cp: f64,
    /// thermal diffusivity, m²/min
    pub alpha: f64,
    /// wall exchange rate of the outermost ring, h·P/(A·ρ·Cp), 1/min
    pub wall_rate: f64,
}

impl RealPFR {
    /// Reactor with the reference constants table and PTSA kinetics.
    #[allow(non_snake_case)]
    pub fn new(
        feed_rate: f64,
        molar_ratio: f64,
        L: f64,
        R: f64,
        feed_temp: f64,
        heater_temp: f64,
        axial_nodes: usize,
    ) -> Result<Self, ReactorError> {
        let config = ReactorConfiguration::new(
            feed_rate,
            molar_ratio,
            L,
            R,
            feed_temp,
            heater_temp,
            axial_nodes,
        );
        Self::from_configuration(config, PhysicalConstants::default(), SolverSettings::default())
    }

    /// Reactor with PTSA kinetics built from the supplied constants table
    pub fn from_configuration(
        config: ReactorConfiguration,
        constants: PhysicalConstants,
        settings: SolverSettings,
    ) -> Result<Self, ReactorError> {
        config.validate()?;
        constants.validate()?;
        let (_, q) = feed_streams(&config, &constants);
        let kinetics = PtsaEsterification::from_constants(&constants, config.feed_rate, q)?;
        Self::with_kinetics(config, constants, settings, kinetics)
    }

    /// Reactor with an injected reaction model
    pub fn with_kinetics(
        config: ReactorConfiguration,
        constants: PhysicalConstants,
        settings: SolverSettings,
        kinetics: impl Into<ReactionModel>,
    ) -> Result<Self, ReactorError> {
        config.validate()?;
        constants.validate()?;
        settings.validate()?;
        let grid = ReactorGrid::build(config.L, config.R, config.axial_nodes, settings.radial_nodes)?;

        let (molar_flows, volumetric_flow) = feed_streams(&config, &constants);
        let mass_flow: f64 = molar_flows
            .iter()
            .zip(constants.molar_masses().iter())
            .map(|(f, mw)| f * mw)
            .sum();
        let ro = mass_flow / volumetric_flow;
        let cp = constants.mixture_heat_capacity();
        let u = volumetric_flow / grid.cross_section();

        let mut feed = [0.0; N_STATE];
        feed[StateVariable::Temperature.index()] = config.feed_temp;
        for (k, f) in molar_flows.iter().enumerate() {
            feed[1 + k] = f / volumetric_flow;
        }
        feed[StateVariable::Conversion.index()] = 0.0;

        let reactor = Self {
            alpha: constants.k_e / (ro * cp),
            wall_rate: constants.h_heater * grid.wall_coefficient() / (ro * cp),
            config,
            constants,
            settings,
            grid,
            kinetics: kinetics.into(),
            feed,
            volumetric_flow,
            u,
            ro,
            Cp: cp,
        };
        info!(
            "real PFR set up: u = {:.4e} m/min, Q = {:.4e} m³/min, C_PA0 = {:.4} kmol/m³, kinetics: {}",
            reactor.u,
            reactor.volumetric_flow,
            reactor.feed[StateVariable::PalmiticAcid.index()],
            reactor.kinetics.name()
        );
        Ok(reactor)
    }

    ///////////////////////////////////// ACCESSORS /////////////////////////////////////
    /// (axial positions, radial positions)
    pub fn get_dimensions(&self) -> (&DVector<f64>, &DVector<f64>) {
        (&self.grid.z, &self.grid.r)
    }

    /// radial flow-averaging weights, sum to 1
    pub fn get_radial_volumes(&self) -> &DVector<f64> {
        &self.grid.weights
    }

    pub fn feed_concentrations(&self) -> &[f64] {
        &self.feed[1..1 + N_SPECIES]
    }

    ///////////////////////////////////// STABILITY /////////////////////////////////////
    /// Outflow coefficient of a cell in radial ring `j` at temperature `temperature`, 1/min
    fn cell_rate_coefficient(&self, j: usize, temperature: f64) -> f64 {
        let (inner, outer) = self.grid.radial_coefficients(j);
        let wall = if j == self.grid.radial_nodes() - 1 {
            self.wall_rate
        } else {
            0.0
        };
        let energy = self.alpha * (inner + outer) + wall;
        let species = self.constants.d_radial * (inner + outer)
            + self.kinetics.max_rate_coefficient(temperature);
        self.u / self.grid.dz + energy.max(species)
    }

    /// Largest per-unit-time outflow coefficient of any cell, 1/min
    fn rate_coefficient_bound(&self) -> f64 {
        let t_max = self.config.feed_temp.max(self.config.heater_temp);
        (0..self.grid.radial_nodes())
            .map(|j| self.cell_rate_coefficient(j, t_max))
            .fold(0.0, f64::max)
    }

    /// `dt · s_max`; the scheme is stable for values up to 1
    pub fn stability_number(&self, time_step: f64) -> f64 {
        time_step * self.rate_coefficient_bound()
    }

    pub fn max_stable_time_step(&self) -> f64 {
        1.0 / self.rate_coefficient_bound()
    }

    pub fn check_stability(&self, time_step: f64) -> Result<(), ReactorError> {
        let stability_number = self.stability_number(time_step);
        if stability_number > 1.0 {
            return Err(ReactorError::NumericalInstability {
                stability_number,
                time_step,
                max_stable_step: self.max_stable_time_step(),
            });
        }
        Ok(())
    }

    /// Number of samples of a run, `floor(time_end / time_step) + 1`, after validating both
    /// values and the size of the resulting trace.
    pub fn sample_count(&self, time_step: f64, time_end: f64) -> Result<usize, ReactorError> {
        if !(time_step > 0.0) || !time_step.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "time step must be positive and finite, got {}",
                time_step
            )));
        }
        if !(time_end > 0.0) || !time_end.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "end time must be positive and finite, got {}",
                time_end
            )));
        }
        let steps = (time_end / time_step + 1e-9).floor();
        let cells = self.grid.axial_nodes() * self.grid.radial_nodes() * N_STATE;
        let limit = self.settings.max_trace_values;
        if !steps.is_finite() || (steps + 1.0) * cells as f64 > limit as f64 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "{} / {} gives {} samples of {} values, above the trace limit of {} values",
                time_end, time_step, steps + 1.0, cells, limit
            )));
        }
        Ok(steps as usize + 1)
    }

    ///////////////////////////////////// TIME MARCHING /////////////////////////////////////
    /// Integrate from the feed-filled reactor at t = 0 to `time_end`.
    pub fn run(&self, time_step: f64, time_end: f64) -> Result<SimulationTrace, ReactorError> {
        self.run_with_cancel(time_step, time_end, &CancellationToken::new())
    }

    /// As [`RealPFR::run`], checking `cancel` once per step. A cancelled run returns the samples
    /// completed so far with status `Cancelled`.
    pub fn run_with_cancel(
        &self,
        time_step: f64,
        time_end: f64,
        cancel: &CancellationToken,
    ) -> Result<SimulationTrace, ReactorError> {
        self.run_observed(time_step, time_end, cancel, |_, _| {})
    }

    /// As [`RealPFR::run_with_cancel`]; `observer(sample, time)` is called after every stored
    /// sample, including the initial one.
    pub fn run_observed<F>(
        &self,
        time_step: f64,
        time_end: f64,
        cancel: &CancellationToken,
        mut observer: F,
    ) -> Result<SimulationTrace, ReactorError>
    where
        F: FnMut(usize, f64),
    {
        let samples = self.sample_count(time_step, time_end)?;
        self.check_stability(time_step)?;
        info!(
            "running real PFR: dt = {} min, t_end = {} min, {} samples, stability number {:.3}",
            time_step,
            time_end,
            samples,
            self.stability_number(time_step)
        );

        let n_z = self.grid.axial_nodes();
        let n_r = self.grid.radial_nodes();
        let mut trace = SimulationTrace::with_capacity(n_z, n_r, time_step, samples);
        let mut prev = StateField::uniform(n_z, n_r, &self.feed);
        let mut next = prev.clone();
        trace.push(&prev);
        observer(0, 0.0);

        for step in 1..samples {
            if cancel.is_cancelled() {
                trace.mark_cancelled();
                info!(
                    "real PFR run cancelled after {} of {} samples",
                    trace.len(),
                    samples
                );
                return Ok(trace);
            }
            let time = step as f64 * time_step;
            let clamped = self.advance(&prev, &mut next, time_step, time)?;
            if clamped > 0 {
                warn!(
                    "t = {:.4} min: {} cells overshot a physical bound and were clamped",
                    time, clamped
                );
                trace.flag(StepFlag {
                    sample: step,
                    time,
                    clamped_cells: clamped,
                });
            }
            trace.push(&next);
            std::mem::swap(&mut prev, &mut next);
            observer(step, time);
        }
        debug!("real PFR run finished with {} flagged steps", trace.flags().len());
        Ok(trace)
    }

    /// One explicit step from `prev` into `next`; returns the number of clamped cells.
    fn advance(
        &self,
        prev: &StateField,
        next: &mut StateField,
        dt: f64,
        time: f64,
    ) -> Result<usize, ReactorError> {
        #[cfg(feature = "parallel")]
        {
            let cells = self.grid.axial_nodes() * self.grid.radial_nodes();
            if cells > self.settings.parallel_threshold {
                use rayon::prelude::*;
                return next
                    .par_rows_mut()
                    .enumerate()
                    .map(|(i, row)| self.update_row(prev, i, row, dt, time))
                    .try_reduce(|| 0, |a, b| Ok(a + b));
            }
        }
        let mut clamped = 0;
        for (i, row) in next.rows_mut().enumerate() {
            clamped += self.update_row(prev, i, row, dt, time)?;
        }
        Ok(clamped)
    }

    /// Update axial row `i`; reads only `prev`, writes only `row`.
    fn update_row(
        &self,
        prev: &StateField,
        i: usize,
        row: &mut [f64],
        dt: f64,
        time: f64,
    ) -> Result<usize, ReactorError> {
        if i == 0 {
            for cell in row.chunks_exact_mut(N_STATE) {
                cell.copy_from_slice(&self.feed);
            }
            return Ok(0);
        }
        let n_r = self.grid.radial_nodes();
        let last = n_r - 1;
        let convection = self.u / self.grid.dz;
        let heater = self.config.heater_temp;
        let d_radial = self.constants.d_radial;
        let t_idx = StateVariable::Temperature.index();
        let mut clamped = 0;

        for j in 0..n_r {
            let cell = prev.cell(i, j);
            let upstream = prev.cell(i - 1, j);
            let inward = if j > 0 { Some(prev.cell(i, j - 1)) } else { None };
            let outward = if j < last { Some(prev.cell(i, j + 1)) } else { None };
            let (c_in, c_out) = self.grid.radial_coefficients(j);
            let radial = |v: usize| -> f64 {
                let mut flux = 0.0;
                if let Some(n) = inward {
                    flux += c_in * (n[v] - cell[v]);
                }
                if let Some(n) = outward {
                    flux += c_out * (n[v] - cell[v]);
                }
                flux
            };

            if dt * self.cell_rate_coefficient(j, cell[t_idx]) > 1.0 + STABILITY_SLACK {
                warn!(
                    "t = {:.4} min: cell ({}, {}) at {:.2} K left the stable time-step range",
                    time, i, j, cell[t_idx]
                );
                return Err(ReactorError::Divergence {
                    time,
                    axial: i,
                    radial: j,
                });
            }

            let reaction = self.kinetics.rate(cell[t_idx], &cell[1..1 + N_SPECIES]);
            let out = &mut row[j * N_STATE..(j + 1) * N_STATE];

            // energy
            let t = cell[t_idx];
            let mut d_t = -convection * (t - upstream[t_idx])
                + self.alpha * radial(t_idx)
                + reaction.heat_release / (self.ro * self.Cp);
            if j == last {
                d_t += self.wall_rate * (heater - t);
            }
            let t_new = t + dt * d_t;
            if !t_new.is_finite() || t_new <= 0.0 {
                return Err(ReactorError::Divergence {
                    time,
                    axial: i,
                    radial: j,
                });
            }
            out[t_idx] = t_new;

            // species
            for k in 0..N_SPECIES {
                let v = 1 + k;
                let d_c = -convection * (cell[v] - upstream[v])
                    + d_radial * radial(v)
                    + STOICHIOMETRY[k] * reaction.rate;
                let c_new = cell[v] + dt * d_c;
                if !c_new.is_finite() {
                    return Err(ReactorError::Divergence {
                        time,
                        axial: i,
                        radial: j,
                    });
                }
                out[v] = c_new;
            }
            if clamp_cell(out, self.feed[StateVariable::PalmiticAcid.index()]) {
                clamped += 1;
            }
        }
        Ok(clamped)
    }

    ///////////////////////////////////// BALANCES /////////////////////////////////////
    /// Palmitic acid entering, leaving and consumed (kmol/min) at sample `k`. On the discrete grid
    /// `inflow = outflow + consumption` holds exactly once the field is steady.
    pub fn limiting_reactant_balance(
        &self,
        trace: &SimulationTrace,
        k: usize,
    ) -> Result<LimitingReactantBalance, ReactorError> {
        if k >= trace.len() {
            return Err(ReactorError::MissingData(format!(
                "sample {} requested from a trace of {} samples",
                k,
                trace.len()
            )));
        }
        let [_, n_z, n_r, _] = trace.shape();
        if n_z != self.grid.axial_nodes() || n_r != self.grid.radial_nodes() {
            return Err(ReactorError::InvalidConfiguration(
                "trace was produced on a different grid".to_string(),
            ));
        }
        let field = trace.snapshot(k);
        let pa = StateVariable::PalmiticAcid;
        let areas = &self.grid.annulus_areas;
        let section_flow = |i: usize| -> f64 {
            (0..n_r)
                .map(|j| self.u * areas[j] * field.get(i, j, pa))
                .sum()
        };
        let mut consumption = 0.0;
        for i in 1..n_z {
            for j in 0..n_r {
                let cell = field.cell(i, j);
                let r = self.kinetics.rate(cell[0], &cell[1..1 + N_SPECIES]);
                consumption += r.rate * areas[j] * self.grid.dz;
            }
        }
        Ok(LimitingReactantBalance {
            inflow: section_flow(0),
            outflow: section_flow(n_z - 1),
            consumption,
        })
    }
}

/// Molar feed flows [PA, IPA, IPP, H2O, LA] in kmol/min and the volumetric flow in m³/min
fn feed_streams(
    config: &ReactorConfiguration,
    constants: &PhysicalConstants,
) -> ([f64; N_SPECIES], f64) {
    let f_pa = config.feed_rate;
    let molar_flows = [
        f_pa,
        config.molar_ratio * f_pa,
        0.0,
        0.0,
        constants.linoleic_acid_impurity * f_pa,
    ];
    let volumetric_flow: f64 = molar_flows
        .iter()
        .zip(constants.molar_masses().iter())
        .zip(constants.densities().iter())
        .map(|((f, mw), ro)| f * mw / ro)
        .sum();
    (molar_flows, volumetric_flow)
}

/// Clamp concentrations to >= 0, the acid to at most its feed value, and derive conversion in
/// [0, 1] from the acid concentration.
/// Returns true when a bound was overshot by more than rounding noise.
pub(crate) fn clamp_cell(cell: &mut [f64], c_pa_feed: f64) -> bool {
    let tolerance = OVERSHOOT_TOLERANCE * c_pa_feed;
    let mut overshoot = false;
    for v in 1..1 + N_SPECIES {
        if cell[v] < 0.0 {
            if cell[v] < -tolerance {
                overshoot = true;
            }
            cell[v] = 0.0;
        }
    }
    let pa = StateVariable::PalmiticAcid.index();
    if cell[pa] > c_pa_feed {
        if cell[pa] > c_pa_feed + tolerance {
            overshoot = true;
        }
        cell[pa] = c_pa_feed;
    }
    let x = 1.0 - cell[pa] / c_pa_feed;
    cell[StateVariable::Conversion.index()] = x.clamp(0.0, 1.0);
    overshoot
}
