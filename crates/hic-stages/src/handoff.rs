//! Names of the files exchanged with the external programs.
//!
//! All names are relative to the event's scratch directory. They are fixed
//! because the external programs look for them by name.

/// Directory the IC generator writes one file per event into.
pub const IC_BATCH_DIR: &str = "ic";

/// Free-streamed energy density.
pub const ED_FILE: &str = "ed.dat";
/// Free-streamed flow velocity `u^x`.
pub const U1_FILE: &str = "u1.dat";
/// Free-streamed flow velocity `u^y`.
pub const U2_FILE: &str = "u2.dat";
/// Free-streamed shear stress `π^{xx}`.
pub const PI11_FILE: &str = "pi11.dat";
/// Free-streamed shear stress `π^{xy}`.
pub const PI12_FILE: &str = "pi12.dat";
/// Free-streamed shear stress `π^{yy}`.
pub const PI22_FILE: &str = "pi22.dat";

/// Raw initial density, used when free streaming is off.
pub const SD_FILE: &str = "sd.dat";

/// Freeze-out surface written by the hydro solver.
pub const SURFACE_FILE: &str = "surface.dat";

/// Sampled particles, input to the afterburner.
pub const PARTICLES_IN_FILE: &str = "particles_in.dat";
/// Final particles, output of the afterburner.
pub const PARTICLES_OUT_FILE: &str = "particles_out.dat";
