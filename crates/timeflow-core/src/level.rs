//! Level curve: cumulative XP to level and in-level progress.
//!
//! The curve is quadratic. Reaching level `L` takes `base * (L - 1)^2`
//! cumulative XP, so with the default base of 100 the thresholds are
//! 0, 100, 400, 900, 1600, ... Thresholds are strictly increasing, which
//! keeps the progress percentage well defined.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default XP multiplier for the quadratic curve.
pub const DEFAULT_XP_PER_LEVEL_BASE: u64 = 100;

/// Quadratic level curve parameterized by its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelCurve {
    /// XP needed to go from level 1 to level 2
    pub xp_per_level_base: u64,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            xp_per_level_base: DEFAULT_XP_PER_LEVEL_BASE,
        }
    }
}

impl LevelCurve {
    /// Create a curve with a custom base.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `xp_per_level_base` is zero.
    pub fn new(xp_per_level_base: u64) -> Result<Self> {
        let curve = Self { xp_per_level_base };
        curve.validate()?;
        Ok(curve)
    }

    /// Check the curve parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the base is zero.
    pub fn validate(&self) -> Result<()> {
        if self.xp_per_level_base == 0 {
            return Err(Error::invalid("xp_per_level_base must be greater than zero"));
        }
        Ok(())
    }

    const fn base(&self) -> u64 {
        if self.xp_per_level_base == 0 {
            1
        } else {
            self.xp_per_level_base
        }
    }

    /// Level reached with `xp` cumulative points. Always at least 1.
    #[must_use]
    pub fn level_for_xp(&self, xp: u64) -> u32 {
        let steps = isqrt(xp / self.base());
        u32::try_from(steps)
            .map(|s| s.saturating_add(1))
            .unwrap_or(u32::MAX)
    }

    /// Cumulative XP at which `level` starts. Level 0 is treated as level 1.
    #[must_use]
    pub fn xp_for_level(&self, level: u32) -> u64 {
        let steps = u64::from(level.saturating_sub(1));
        steps.saturating_mul(steps).saturating_mul(self.base())
    }

    /// Full level breakdown for `xp`.
    #[must_use]
    pub fn level_info(&self, xp: u64) -> LevelInfo {
        let current_level = self.level_for_xp(xp);
        let current_level_xp = self.xp_for_level(current_level);
        let next_level_xp = self.xp_for_level(current_level.saturating_add(1));

        // Only reachable when the thresholds saturate at the top of u64.
        if next_level_xp <= current_level_xp {
            return LevelInfo {
                current_level,
                current_level_xp,
                next_level_xp: current_level_xp,
                xp_to_next_level: 0,
                progress_percent: 100.0,
            };
        }

        let span = next_level_xp - current_level_xp;
        let earned = xp.saturating_sub(current_level_xp).min(span);

        #[allow(clippy::cast_precision_loss)]
        let progress_percent = ((earned as f64 / span as f64) * 100.0).clamp(0.0, 100.0);

        LevelInfo {
            current_level,
            current_level_xp,
            next_level_xp,
            xp_to_next_level: next_level_xp.saturating_sub(xp),
            progress_percent,
        }
    }

    /// Level breakdown for XP arriving from an untyped source.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for negative XP. Negative values are
    /// rejected rather than clamped to zero.
    pub fn level_info_signed(&self, xp: i64) -> Result<LevelInfo> {
        u64::try_from(xp)
            .map(|xp| self.level_info(xp))
            .map_err(|_| Error::invalid(format!("xp must be non-negative, got {xp}")))
    }
}

/// Derived level snapshot. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Current level, starting at 1
    pub current_level: u32,
    /// Cumulative XP at which the current level started
    pub current_level_xp: u64,
    /// Cumulative XP at which the next level starts
    pub next_level_xp: u64,
    /// XP still missing for the next level
    pub xp_to_next_level: u64,
    /// Progress through the current level, in `[0, 100]`
    pub progress_percent: f64,
}

impl LevelInfo {
    /// Rank name for the current level band.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self.current_level {
            0..=4 => "Novice",
            5..=9 => "Apprentice",
            10..=19 => "Achiever",
            20..=34 => "Expert",
            35..=49 => "Master",
            _ => "Legend",
        }
    }
}

/// [`LevelCurve::level_info`] on the default curve.
#[must_use]
pub fn level_info(xp: u64) -> LevelInfo {
    LevelCurve::default().level_info(xp)
}

/// [`LevelCurve::level_for_xp`] on the default curve.
#[must_use]
pub fn level_for_xp(xp: u64) -> u32 {
    LevelCurve::default().level_for_xp(xp)
}

/// Floor of the square root, exact over the whole `u64` range.
fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // Binary search on [1, 2^32); r*r fits in u128 without overflow.
    let (mut lo, mut hi) = (1_u64, 1_u64 << 32);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if u128::from(mid) * u128::from(mid) <= u128::from(n) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}
