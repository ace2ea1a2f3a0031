//! Two-body orbital helpers and the stock configuration samplers.
//!
//! Units are SI throughout (metres, seconds, radians).  Vectors are inertial
//! unless noted.

use std::f64::consts::{FRAC_PI_4, TAU};

use rand::{Rng, RngCore};
use st_core::{ArgValue, SatError, SatResult};

/// Earth gravitational parameter, m³/s².
pub const MU_EARTH: f64 = 3.986_004_418e14;

/// Earth equatorial radius, m.
pub const REQ_EARTH: f64 = 6_378_136.6;

/// 2023-01-01T00:00:00Z.
const EPOCH_WINDOW_START: i64 = 1_672_531_200;
/// 2026-01-01T00:00:00Z.
const EPOCH_WINDOW_END: i64 = 1_767_225_600;

pub type Vec3 = [f64; 3];

// ── Orbital elements ──────────────────────────────────────────────────────────

/// Classical orbital elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Semi-major axis.
    pub a:    f64,
    /// Eccentricity (elliptic orbits only).
    pub e:    f64,
    /// Inclination.
    pub i:    f64,
    /// Right ascension of the ascending node.
    pub raan: f64,
    /// Argument of periapsis.
    pub argp: f64,
    /// True anomaly.
    pub f:    f64,
}

impl OrbitalElements {
    /// Pack as `[a, e, i, raan, argp, f]` for storage in an `ArgMap`.
    pub fn to_arg(self) -> ArgValue {
        ArgValue::Vector(vec![self.a, self.e, self.i, self.raan, self.argp, self.f])
    }

    /// Inverse of [`to_arg`](Self::to_arg).
    pub fn from_slice(key: &str, v: &[f64]) -> SatResult<Self> {
        match v {
            &[a, e, i, raan, argp, f] if a > 0.0 && (0.0..1.0).contains(&e) => {
                Ok(Self { a, e, i, raan, argp, f })
            }
            _ => Err(SatError::BadArg {
                key:      key.to_owned(),
                expected: "[a, e, i, raan, argp, f] with a > 0 and 0 <= e < 1",
            }),
        }
    }

    /// Inertial position and velocity.
    pub fn to_rv(&self, mu: f64) -> (Vec3, Vec3) {
        let p = self.a * (1.0 - self.e * self.e);
        let (sf, cf) = self.f.sin_cos();
        let r = p / (1.0 + self.e * cf);
        let vk = (mu / p).sqrt();

        // Perifocal frame.
        let r_pqw = [r * cf, r * sf];
        let v_pqw = [-vk * sf, vk * (self.e + cf)];

        let (so, co) = self.raan.sin_cos();
        let (sw, cw) = self.argp.sin_cos();
        let (si, ci) = self.i.sin_cos();
        let rot = [
            [co * cw - so * sw * ci, -co * sw - so * cw * ci],
            [so * cw + co * sw * ci, -so * sw + co * cw * ci],
            [sw * si, cw * si],
        ];
        let apply = |x: [f64; 2]| -> Vec3 {
            [
                rot[0][0] * x[0] + rot[0][1] * x[1],
                rot[1][0] * x[0] + rot[1][1] * x[1],
                rot[2][0] * x[0] + rot[2][1] * x[1],
            ]
        };
        (apply(r_pqw), apply(v_pqw))
    }
}

// ── Samplers ──────────────────────────────────────────────────────────────────

/// A 500 km circular orbit at 45° inclination with uniformly drawn node,
/// periapsis argument, and phase.
pub fn random_orbit(rng: &mut dyn RngCore) -> ArgValue {
    OrbitalElements {
        a:    REQ_EARTH + 500e3,
        e:    0.0,
        i:    FRAC_PI_4,
        raan: rng.gen_range(0.0..TAU),
        argp: rng.gen_range(0.0..TAU),
        f:    rng.gen_range(0.0..TAU),
    }
    .to_arg()
}

/// A Unix timestamp drawn uniformly from 2023–2025.
pub fn random_epoch(rng: &mut dyn RngCore) -> ArgValue {
    ArgValue::Int(rng.gen_range(EPOCH_WINDOW_START..EPOCH_WINDOW_END))
}

// ── Propagation ───────────────────────────────────────────────────────────────

#[inline]
pub fn norm(v: Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[inline]
fn axpy(a: f64, x: Vec3, y: Vec3) -> Vec3 {
    [y[0] + a * x[0], y[1] + a * x[1], y[2] + a * x[2]]
}

#[inline]
fn gravity(mu: f64, r: Vec3) -> Vec3 {
    let rn = norm(r);
    let k = -mu / (rn * rn * rn);
    [k * r[0], k * r[1], k * r[2]]
}

/// One classical RK4 step of point-mass two-body motion.
pub fn rk4_two_body(mu: f64, r: Vec3, v: Vec3, dt: f64) -> (Vec3, Vec3) {
    let k1r = v;
    let k1v = gravity(mu, r);

    let k2r = axpy(dt / 2.0, k1v, v);
    let k2v = gravity(mu, axpy(dt / 2.0, k1r, r));

    let k3r = axpy(dt / 2.0, k2v, v);
    let k3v = gravity(mu, axpy(dt / 2.0, k2r, r));

    let k4r = axpy(dt, k3v, v);
    let k4v = gravity(mu, axpy(dt, k3r, r));

    let combine = |x: Vec3, k1: Vec3, k2: Vec3, k3: Vec3, k4: Vec3| -> Vec3 {
        let mut out = x;
        for j in 0..3 {
            out[j] += dt / 6.0 * (k1[j] + 2.0 * k2[j] + 2.0 * k3[j] + k4[j]);
        }
        out
    };
    (combine(r, k1r, k2r, k3r, k4r), combine(v, k1v, k2v, k3v, k4v))
}
