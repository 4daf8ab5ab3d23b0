//! # Field storage
//!
//! `StateField` is one time sample of the reactor: a flat arena of `n_z * n_r * N_STATE` values
//! addressed as `[axial][radial][variable]`. The solver keeps two of them (previous and next step)
//! and copies each completed sample into a `SimulationTrace`, a flat 4-D buffer
//! `[time][axial][radial][variable]`.
use crate::Kinetics::esterification::N_SPECIES;
use nalgebra::DMatrix;

/// temperature, five concentrations, conversion
pub const N_STATE: usize = N_SPECIES + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariable {
    Temperature,
    PalmiticAcid,
    Isopropanol,
    IsopropylPalmitate,
    Water,
    LinoleicAcid,
    Conversion,
}

impl StateVariable {
    pub const ALL: [StateVariable; N_STATE] = [
        StateVariable::Temperature,
        StateVariable::PalmiticAcid,
        StateVariable::Isopropanol,
        StateVariable::IsopropylPalmitate,
        StateVariable::Water,
        StateVariable::LinoleicAcid,
        StateVariable::Conversion,
    ];

    pub fn index(&self) -> usize {
        match self {
            StateVariable::Temperature => 0,
            StateVariable::PalmiticAcid => 1,
            StateVariable::Isopropanol => 2,
            StateVariable::IsopropylPalmitate => 3,
            StateVariable::Water => 4,
            StateVariable::LinoleicAcid => 5,
            StateVariable::Conversion => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StateVariable::Temperature => "Temperature",
            StateVariable::PalmiticAcid => "Palmitic Acid Concentration",
            StateVariable::Isopropanol => "IPA Concentration",
            StateVariable::IsopropylPalmitate => "IPP Concentration",
            StateVariable::Water => "Water Concentration",
            StateVariable::LinoleicAcid => "Linoleic Acid Concentration",
            StateVariable::Conversion => "Conversion",
        }
    }
}

/// One (axial × radial) sample of the reactor state
#[derive(Debug, Clone, PartialEq)]
pub struct StateField {
    n_z: usize,
    n_r: usize,
    data: Vec<f64>,
}

impl StateField {
    pub fn new(n_z: usize, n_r: usize) -> Self {
        Self {
            n_z,
            n_r,
            data: vec![0.0; n_z * n_r * N_STATE],
        }
    }

    /// every cell set to the same state vector
    pub fn uniform(n_z: usize, n_r: usize, cell: &[f64; N_STATE]) -> Self {
        let mut field = Self::new(n_z, n_r);
        for chunk in field.data.chunks_exact_mut(N_STATE) {
            chunk.copy_from_slice(cell);
        }
        field
    }

    pub fn n_z(&self) -> usize {
        self.n_z
    }

    pub fn n_r(&self) -> usize {
        self.n_r
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        (i * self.n_r + j) * N_STATE
    }

    /// state vector of cell (i, j)
    #[inline]
    pub fn cell(&self, i: usize, j: usize) -> &[f64] {
        let o = self.offset(i, j);
        &self.data[o..o + N_STATE]
    }

    #[inline]
    pub fn cell_mut(&mut self, i: usize, j: usize) -> &mut [f64] {
        let o = self.offset(i, j);
        &mut self.data[o..o + N_STATE]
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, var: StateVariable) -> f64 {
        self.data[self.offset(i, j) + var.index()]
    }

    /// contiguous slice holding axial row i (all radial cells)
    pub fn row(&self, i: usize) -> &[f64] {
        let len = self.n_r * N_STATE;
        &self.data[i * len..(i + 1) * len]
    }

    /// rows as disjoint mutable chunks, for row-wise (and parallel) updates
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, f64> {
        let len = self.n_r * N_STATE;
        self.data.chunks_exact_mut(len)
    }

    #[cfg(feature = "parallel")]
    pub fn par_rows_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, f64> {
        use rayon::prelude::*;
        let len = self.n_r * N_STATE;
        self.data.par_chunks_exact_mut(len)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// (axial × radial) matrix of a single variable
    pub fn variable(&self, var: StateVariable) -> DMatrix<f64> {
        DMatrix::from_fn(self.n_z, self.n_r, |i, j| self.get(i, j, var))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStatus {
    /// all requested samples were produced
    Complete,
    /// the caller cancelled the run; samples up to the last completed step are valid
    Cancelled,
}

/// A time step at which some cells overshot a physical bound and were clamped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepFlag {
    pub sample: usize,
    pub time: f64,
    pub clamped_cells: usize,
}

/// Time series of reactor states sampled every `time_step` minutes from t = 0
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationTrace {
    n_z: usize,
    n_r: usize,
    time_step: f64,
    data: Vec<f64>,
    status: TraceStatus,
    flags: Vec<StepFlag>,
}

impl SimulationTrace {
    pub(crate) fn with_capacity(n_z: usize, n_r: usize, time_step: f64, samples: usize) -> Self {
        Self {
            n_z,
            n_r,
            time_step,
            data: Vec::with_capacity(samples * n_z * n_r * N_STATE),
            status: TraceStatus::Complete,
            flags: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, field: &StateField) {
        debug_assert_eq!(field.n_z, self.n_z);
        debug_assert_eq!(field.n_r, self.n_r);
        self.data.extend_from_slice(field.as_slice());
    }

    pub(crate) fn flag(&mut self, flag: StepFlag) {
        self.flags.push(flag);
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.status = TraceStatus::Cancelled;
    }

    fn sample_len(&self) -> usize {
        self.n_z * self.n_r * N_STATE
    }

    /// number of time samples
    pub fn len(&self) -> usize {
        self.data.len() / self.sample_len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// [time, axial, radial, variable]
    pub fn shape(&self) -> [usize; 4] {
        [self.len(), self.n_z, self.n_r, N_STATE]
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn times(&self) -> Vec<f64> {
        (0..self.len()).map(|k| k as f64 * self.time_step).collect()
    }

    pub fn status(&self) -> TraceStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == TraceStatus::Complete
    }

    pub fn flags(&self) -> &[StepFlag] {
        &self.flags
    }

    /// Sample index closest below time `t`, capped to the last stored sample
    pub fn time_index(&self, t: f64) -> usize {
        let last = self.len().saturating_sub(1);
        if !(t > 0.0) {
            return 0;
        }
        ((t / self.time_step + 1e-9).floor() as usize).min(last)
    }

    pub fn get(&self, k: usize, i: usize, j: usize, var: StateVariable) -> f64 {
        self.data[k * self.sample_len() + (i * self.n_r + j) * N_STATE + var.index()]
    }

    /// borrowed view of sample k as a flat [axial][radial][variable] slice
    pub fn sample(&self, k: usize) -> &[f64] {
        let len = self.sample_len();
        &self.data[k * len..(k + 1) * len]
    }

    /// owned copy of sample k
    pub fn snapshot(&self, k: usize) -> StateField {
        StateField {
            n_z: self.n_z,
            n_r: self.n_r,
            data: self.sample(k).to_vec(),
        }
    }

    /// (axial × radial) matrix of one variable at sample k
    pub fn field(&self, k: usize, var: StateVariable) -> DMatrix<f64> {
        DMatrix::from_fn(self.n_z, self.n_r, |i, j| self.get(k, i, j, var))
    }

    /// whole buffer, row-major in [time][axial][radial][variable]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(t: f64) -> [f64; N_STATE] {
        [t, 1.0, 5.0, 0.0, 0.0, 0.02, 0.0]
    }

    #[test]
    fn test_state_field_indexing() {
        let mut field = StateField::uniform(3, 4, &cell(393.0));
        field.cell_mut(2, 1)[StateVariable::Conversion.index()] = 0.5;
        assert_eq!(field.get(2, 1, StateVariable::Conversion), 0.5);
        assert_eq!(field.get(2, 2, StateVariable::Conversion), 0.0);
        assert_eq!(field.row(2).len(), 4 * N_STATE);
        assert_eq!(field.row(2)[N_STATE + 6], 0.5);
        let m = field.variable(StateVariable::Temperature);
        assert_eq!((m.nrows(), m.ncols()), (3, 4));
        assert_eq!(m[(1, 3)], 393.0);
        assert_eq!(field.rows_mut().count(), 3);
    }

    #[test]
    fn test_trace_layout_and_time_index() {
        let mut trace = SimulationTrace::with_capacity(3, 4, 0.1, 3);
        for k in 0..3 {
            trace.push(&StateField::uniform(3, 4, &cell(393.0 + k as f64)));
        }
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.shape(), [3, 3, 4, N_STATE]);
        assert_eq!(trace.get(2, 1, 1, StateVariable::Temperature), 395.0);
        assert_eq!(trace.snapshot(1).get(0, 0, StateVariable::Temperature), 394.0);
        assert_eq!(trace.field(0, StateVariable::Isopropanol)[(2, 3)], 5.0);
        assert_eq!(trace.time_index(0.0), 0);
        assert_eq!(trace.time_index(0.1), 1);
        assert_eq!(trace.time_index(0.19), 1);
        assert_eq!(trace.time_index(50.0), 2);
        assert_eq!(trace.times().len(), 3);
        assert!(trace.is_complete());
        trace.mark_cancelled();
        assert_eq!(trace.status(), TraceStatus::Cancelled);
    }

    #[test]
    fn test_variable_names_are_unique() {
        let names: std::collections::HashSet<&str> =
            StateVariable::ALL.iter().map(|v| v.name()).collect();
        assert_eq!(names.len(), N_STATE);
        for (idx, v) in StateVariable::ALL.iter().enumerate() {
            assert_eq!(v.index(), idx);
        }
    }
}
