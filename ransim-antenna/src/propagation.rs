//! Propagation and link-budget primitives
//!
//! Standalone RF math shared by the path-loss models: free-space loss,
//! thermal noise and logarithmic power conversions.

/// Thermal noise power spectral density at 290 K (dBm/Hz)
pub const THERMAL_NOISE_DENSITY_DBM_PER_HZ: f64 = -174.0;

/// Free-space path loss in dB.
///
/// # Formula
///
/// ```text
/// FSPL(dB) = 20·log10(d_km) + 20·log10(f_MHz) + 32.45
/// ```
///
/// The distance is floored at 1 m so co-located endpoints do not produce a
/// negative-infinity loss.
pub fn free_space_path_loss_db(distance_km: f64, freq_mhz: f64) -> f64 {
    let d_km = distance_km.max(1e-3);
    20.0 * d_km.log10() + 20.0 * freq_mhz.log10() + 32.45
}

/// Thermal noise power over a bandwidth in dBm.
///
/// # Formula
///
/// ```text
/// N(dBm) = -174 + 10·log10(BW_Hz)
/// ```
pub fn thermal_noise_dbm(bandwidth_hz: f64) -> f64 {
    THERMAL_NOISE_DENSITY_DBM_PER_HZ + 10.0 * bandwidth_hz.log10()
}

/// Convert power from dBm to milliwatts: `P(mW) = 10^(P(dBm)/10)`.
pub fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

/// Convert power from milliwatts to dBm: `P(dBm) = 10·log10(P(mW))`.
/// Undefined for non-positive input (returns -∞ or NaN).
pub fn mw_to_dbm(mw: f64) -> f64 {
    10.0 * mw.log10()
}
