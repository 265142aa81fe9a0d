//! Freeze-out hypersurface produced by the hydrodynamic stage.

use crate::error::EventError;

/// Number of columns in a hydro surface row:
/// `tau x y dsigma_t dsigma_x dsigma_y v_x v_y pi_tt pi_tx pi_ty pi_xx pi_xy pi_yy pi_zz Pi`.
pub const SURFACE_COLUMNS: usize = 16;

/// The three independent transverse shear-stress components.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShearStress {
    /// `π^{xx}`.
    pub xx: f64,
    /// `π^{xy}`.
    pub xy: f64,
    /// `π^{yy}`.
    pub yy: f64,
}

/// One volume element of the freeze-out hypersurface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceElement {
    /// Proper time τ.
    pub tau: f64,
    /// Transverse position `(x, y)`.
    pub x: [f64; 2],
    /// Covariant normal `(dσ_τ, dσ_x, dσ_y)`.
    pub sigma: [f64; 3],
    /// Transverse flow velocity `(v_x, v_y)`.
    pub v: [f64; 2],
    /// Shear stress.
    pub pi: ShearStress,
    /// Bulk pressure Π.
    pub bulk: f64,
}

impl SurfaceElement {
    /// Decode one 16-column surface row.
    pub fn from_row(row: &[f64]) -> Result<Self, EventError> {
        if row.len() != SURFACE_COLUMNS {
            return Err(EventError::malformed(format!(
                "surface row has {} columns, expected {SURFACE_COLUMNS}",
                row.len()
            )));
        }
        Ok(Self {
            tau: row[0],
            x: [row[1], row[2]],
            sigma: [row[3], row[4], row[5]],
            v: [row[6], row[7]],
            pi: ShearStress {
                xx: row[11],
                xy: row[12],
                yy: row[13],
            },
            bulk: row[15],
        })
    }

    /// Lorentz factor of the cell velocity.
    pub fn gamma(&self) -> f64 {
        let v2 = self.v[0] * self.v[0] + self.v[1] * self.v[1];
        1.0 / (1.0 - v2).max(f64::MIN_POSITIVE).sqrt()
    }

    /// Flow four-velocity `u^μ = γ(1, v_x, v_y)`.
    pub fn u(&self) -> [f64; 3] {
        let g = self.gamma();
        [g, g * self.v[0], g * self.v[1]]
    }

    /// Cooper–Frye volume `u^μ dσ_μ` (transverse part, per unit η_s).
    pub fn u_dot_sigma(&self) -> f64 {
        let u = self.u();
        u[0] * self.sigma[0] + u[1] * self.sigma[1] + u[2] * self.sigma[2]
    }
}

/// An ordered sequence of surface elements.
///
/// An empty surface is legal: the event never got hot enough to freeze out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FreezeOutSurface {
    elements: Vec<SurfaceElement>,
}

impl FreezeOutSurface {
    /// Wrap a list of elements.
    pub fn new(elements: Vec<SurfaceElement>) -> Self {
        Self { elements }
    }

    /// Decode rows read from the hydro output table.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, EventError> {
        let elements = rows
            .iter()
            .map(|r| SurfaceElement::from_row(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { elements })
    }

    /// The elements in hydro output order.
    pub fn elements(&self) -> &[SurfaceElement] {
        &self.elements
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// `true` if the surface has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
