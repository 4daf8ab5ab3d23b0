//! # Reactor grid
//!
//! Axial × radial discretisation of the tube.
//!
//! Axial nodes are evenly spaced from the inlet `z = 0` to the outlet `z = L`. Radial nodes are
//! evenly spaced from the centreline `r = 0` to the wall `r = R`; each radial node owns the annulus
//! between its two faces:
//! ```text
//!  node 0        : [0, dr/2]
//!  node j        : [r_j - dr/2, r_j + dr/2]
//!  node n_r - 1  : [R - dr/2, R]
//! ```
//! The annulus areas sum to πR² exactly, so `w_j = area_j / (πR²)` is a normalised flow-averaging
//! weight (trapezoidal r·dr rule) and the same areas close the finite-volume radial fluxes.
use super::RealPFR::ReactorError;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// radial resolution used when the caller does not ask for another one
pub const DEFAULT_RADIAL_NODES: usize = 11;

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct ReactorGrid {
    /// reactor length, m
    pub L: f64,
    /// reactor radius, m
    pub R: f64,
    pub z: DVector<f64>,
    pub r: DVector<f64>,
    pub dz: f64,
    pub dr: f64,
    /// radius of the outer face of every radial control volume
    pub outer_faces: Vec<f64>,
    /// radius of the inner face of every radial control volume
    pub inner_faces: Vec<f64>,
    /// cross-section area of every radial control volume, m²
    pub annulus_areas: Vec<f64>,
    /// annulus area shares, sum to 1
    pub weights: DVector<f64>,
}

impl ReactorGrid {
    /// Build the grid. Fails for non-positive or non-finite dimensions, fewer than 2 axial
    /// nodes or fewer than 3 radial nodes.
    #[allow(non_snake_case)]
    pub fn build(
        L: f64,
        R: f64,
        axial_nodes: usize,
        radial_nodes: usize,
    ) -> Result<Self, ReactorError> {
        if !(L > 0.0) || !L.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "reactor length must be positive, got {}",
                L
            )));
        }
        if !(R > 0.0) || !R.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "reactor radius must be positive, got {}",
                R
            )));
        }
        if axial_nodes < 2 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "at least 2 axial nodes are required, got {}",
                axial_nodes
            )));
        }
        if radial_nodes < 3 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "at least 3 radial nodes are required, got {}",
                radial_nodes
            )));
        }
        let dz = L / (axial_nodes - 1) as f64;
        let dr = R / (radial_nodes - 1) as f64;
        let z = DVector::from_fn(axial_nodes, |i, _| i as f64 * dz);
        let r = DVector::from_fn(radial_nodes, |j, _| j as f64 * dr);

        let last = radial_nodes - 1;
        let inner_faces: Vec<f64> = (0..radial_nodes)
            .map(|j| if j == 0 { 0.0 } else { r[j] - 0.5 * dr })
            .collect();
        let outer_faces: Vec<f64> = (0..radial_nodes)
            .map(|j| if j == last { R } else { r[j] + 0.5 * dr })
            .collect();
        let annulus_areas: Vec<f64> = inner_faces
            .iter()
            .zip(outer_faces.iter())
            .map(|(ri, ro)| PI * (ro * ro - ri * ri))
            .collect();
        let total: f64 = annulus_areas.iter().sum();
        let weights = DVector::from_iterator(radial_nodes, annulus_areas.iter().map(|a| a / total));

        Ok(Self {
            L,
            R,
            z,
            r,
            dz,
            dr,
            outer_faces,
            inner_faces,
            annulus_areas,
            weights,
        })
    }

    pub fn axial_nodes(&self) -> usize {
        self.z.len()
    }

    pub fn radial_nodes(&self) -> usize {
        self.r.len()
    }

    pub fn cross_section(&self) -> f64 {
        PI * self.R * self.R
    }

    pub fn volume(&self) -> f64 {
        self.cross_section() * self.L
    }

    /// Diffusive exchange coefficients of radial node j with its inner and outer neighbour,
    /// per unit diffusivity: `face_area / (annulus_area * dr)`, 1/m². The centreline inner
    /// coefficient is zero (symmetry), the wall outer coefficient is zero (the wall is handled
    /// by the caller).
    pub fn radial_coefficients(&self, j: usize) -> (f64, f64) {
        let last = self.radial_nodes() - 1;
        let area = self.annulus_areas[j];
        let inner = if j == 0 {
            0.0
        } else {
            2.0 * PI * self.inner_faces[j] / (area * self.dr)
        };
        let outer = if j == last {
            0.0
        } else {
            2.0 * PI * self.outer_faces[j] / (area * self.dr)
        };
        (inner, outer)
    }

    /// wall perimeter per unit annulus area of the outermost ring, 1/m
    pub fn wall_coefficient(&self) -> f64 {
        let last = self.radial_nodes() - 1;
        2.0 * PI * self.R / self.annulus_areas[last]
    }

    /// Flow-weighted radial mean of every axial row of an (axial × radial) field
    pub fn flow_average(&self, field: &DMatrix<f64>) -> DVector<f64> {
        field * &self.weights
    }

    /// Flow-weighted mean of a single radial profile
    pub fn flow_average_profile(&self, profile: &[f64]) -> f64 {
        profile
            .iter()
            .zip(self.weights.iter())
            .map(|(v, w)| v * w)
            .sum()
    }
}
