//! Second-order finite-difference stencils on a uniform 2D grid.
//!
//! Fields are flat slices indexed `i + j * nx`, with `i` along x and `j`
//! along y. Every stencil reads the four direct neighbours, so it is only
//! valid at interior points `1 <= i < nx - 1`, `1 <= j < ny - 1`.

use crate::types::RomError;

/// Uniform rectangular grid with node spacing derived from the domain extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid2D {
    pub nx: usize,
    pub ny: usize,
    pub dx: f64,
    pub dy: f64,
}

impl Grid2D {
    /// Grid of `nx × ny` nodes spanning `[0, lx] × [0, ly]`, including both ends.
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Result<Self, RomError> {
        if nx < 3 || ny < 3 {
            return Err(RomError::InvalidInput(format!(
                "grid needs at least 3x3 nodes, got {nx}x{ny}"
            )));
        }
        if !(lx > 0.0 && ly > 0.0 && lx.is_finite() && ly.is_finite()) {
            return Err(RomError::InvalidInput(format!(
                "domain extents must be positive, got {lx}x{ly}"
            )));
        }
        Ok(Self {
            nx,
            ny,
            dx: lx / (nx - 1) as f64,
            dy: ly / (ny - 1) as f64,
        })
    }

    /// Number of nodes per field.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    /// Always false; a valid grid has at least 9 nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        i + j * self.nx
    }

    /// Physical coordinates of node (i, j).
    pub fn coords(&self, i: usize, j: usize) -> (f64, f64) {
        (i as f64 * self.dx, j as f64 * self.dy)
    }

    #[inline]
    pub fn is_boundary(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i == self.nx - 1 || j == self.ny - 1
    }

    /// Flat indices of all boundary nodes.
    pub fn boundary_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.ny).flat_map(move |j| {
            (0..self.nx)
                .filter(move |&i| self.is_boundary(i, j))
                .map(move |i| self.idx(i, j))
        })
    }
}

/// Central difference ∂φ/∂x at interior node (i, j).
#[inline]
pub fn gradient_x(phi: &[f64], grid: &Grid2D, i: usize, j: usize) -> f64 {
    (phi[grid.idx(i + 1, j)] - phi[grid.idx(i - 1, j)]) / (2.0 * grid.dx)
}

/// Central difference ∂φ/∂y at interior node (i, j).
#[inline]
pub fn gradient_y(phi: &[f64], grid: &Grid2D, i: usize, j: usize) -> f64 {
    (phi[grid.idx(i, j + 1)] - phi[grid.idx(i, j - 1)]) / (2.0 * grid.dy)
}

/// Five-point Laplacian ∇²φ at interior node (i, j).
#[inline]
pub fn laplacian(phi: &[f64], grid: &Grid2D, i: usize, j: usize) -> f64 {
    let center = phi[grid.idx(i, j)];
    let d2x = (phi[grid.idx(i - 1, j)] - 2.0 * center + phi[grid.idx(i + 1, j)])
        / (grid.dx * grid.dx);
    let d2y = (phi[grid.idx(i, j - 1)] - 2.0 * center + phi[grid.idx(i, j + 1)])
        / (grid.dy * grid.dy);
    d2x + d2y
}

/// Burgers right-hand side `(−(u·∇)u + ν∇²u, −(u·∇)v + ν∇²v)` at interior
/// node (i, j).
#[inline]
pub fn burgers_rhs(
    u: &[f64],
    v: &[f64],
    grid: &Grid2D,
    nu: f64,
    i: usize,
    j: usize,
) -> (f64, f64) {
    let id = grid.idx(i, j);
    let conv_u = u[id] * gradient_x(u, grid, i, j) + v[id] * gradient_y(u, grid, i, j);
    let conv_v = u[id] * gradient_x(v, grid, i, j) + v[id] * gradient_y(v, grid, i, j);
    (
        -conv_u + nu * laplacian(u, grid, i, j),
        -conv_v + nu * laplacian(v, grid, i, j),
    )
}
