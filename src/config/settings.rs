//! Redemption policy settings loaded from environment variables.
//!
//! This module provides the repeat-redemption policy that governs how often a
//! member may redeem the same deal. Operators tune it through `.env` without
//! code changes; unset variables fall back to the stock 24 hour cooldown.

use crate::errors::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};

/// How repeat redemptions of the same deal by the same member are limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPolicy {
    /// A member may redeem the deal again once the cooldown has elapsed.
    Cooldown(TimeDelta),
    /// A member may redeem the deal exactly once, ever.
    OncePerMember,
}

impl Default for RepeatPolicy {
    fn default() -> Self {
        Self::Cooldown(TimeDelta::hours(24))
    }
}

impl RepeatPolicy {
    /// Loads the policy from the environment.
    ///
    /// Reads `REDEMPTION_REPEAT_POLICY` (`cooldown` or `once`) and, for the
    /// cooldown policy, `REDEMPTION_COOLDOWN_HOURS` (positive integer,
    /// default 24).
    ///
    /// # Errors
    /// Returns [`Error::Config`] when either variable is set to a value that
    /// does not parse.
    pub fn from_env() -> Result<Self> {
        let policy = std::env::var("REDEMPTION_REPEAT_POLICY")
            .unwrap_or_else(|_| "cooldown".to_string());

        match policy.as_str() {
            "cooldown" => {
                let hours = match std::env::var("REDEMPTION_COOLDOWN_HOURS") {
                    Ok(raw) => raw.parse::<i64>().map_err(|_| Error::Config {
                        message: format!(
                            "REDEMPTION_COOLDOWN_HOURS must be a positive integer, got '{raw}'"
                        ),
                    })?,
                    Err(_) => 24,
                };
                Self::cooldown_from_hours(hours)
            }
            "once" => Ok(Self::OncePerMember),
            other => Err(Error::Config {
                message: format!(
                    "REDEMPTION_REPEAT_POLICY must be 'cooldown' or 'once', got '{other}'"
                ),
            }),
        }
    }

    /// Builds a cooldown policy from an hour count, rejecting values that are
    /// non-positive or too large for chrono's millisecond representation.
    fn cooldown_from_hours(hours: i64) -> Result<Self> {
        if hours <= 0 {
            return Err(Error::Config {
                message: format!(
                    "REDEMPTION_COOLDOWN_HOURS must be a positive integer, got '{hours}'"
                ),
            });
        }
        let delta = TimeDelta::try_hours(hours).ok_or_else(|| Error::Config {
            message: format!("REDEMPTION_COOLDOWN_HOURS is out of range: '{hours}'"),
        })?;
        Ok(Self::Cooldown(delta))
    }

    /// Earliest `redeemed_at` that still counts as a repeat at time `now`.
    ///
    /// Returns `None` for [`RepeatPolicy::OncePerMember`], meaning every prior
    /// redemption counts no matter how old it is.
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Cooldown(delta) => Some(now - *delta),
            Self::OncePerMember => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_default_policy_is_24_hour_cooldown() {
        assert_eq!(
            RepeatPolicy::default(),
            RepeatPolicy::Cooldown(TimeDelta::hours(24))
        );
    }

    #[test]
    fn test_cooldown_window_start() {
        let now = Utc::now();
        let policy = RepeatPolicy::Cooldown(TimeDelta::hours(24));
        assert_eq!(policy.window_start(now), Some(now - TimeDelta::hours(24)));
    }

    #[test]
    fn test_once_per_member_has_no_window_start() {
        let policy = RepeatPolicy::OncePerMember;
        assert_eq!(policy.window_start(Utc::now()), None);
    }

    #[test]
    fn test_cooldown_from_hours_accepts_positive_values() {
        assert_eq!(
            RepeatPolicy::cooldown_from_hours(48).unwrap(),
            RepeatPolicy::Cooldown(TimeDelta::hours(48))
        );
    }

    #[test]
    fn test_cooldown_from_hours_rejects_non_positive_values() {
        assert!(matches!(
            RepeatPolicy::cooldown_from_hours(0).unwrap_err(),
            Error::Config { message: _ }
        ));
        assert!(matches!(
            RepeatPolicy::cooldown_from_hours(-3).unwrap_err(),
            Error::Config { message: _ }
        ));
    }

    #[test]
    fn test_cooldown_from_hours_rejects_out_of_range_values() {
        // Hour counts past chrono's representable span must error, not panic
        assert!(matches!(
            RepeatPolicy::cooldown_from_hours(i64::MAX).unwrap_err(),
            Error::Config { message: _ }
        ));
    }

    #[test]
    fn test_from_env_defaults_when_unset() {
        // This test assumes the env vars aren't set in the test environment
        if std::env::var("REDEMPTION_REPEAT_POLICY").is_err()
            && std::env::var("REDEMPTION_COOLDOWN_HOURS").is_err()
        {
            let policy = RepeatPolicy::from_env().unwrap();
            assert_eq!(policy, RepeatPolicy::default());
        }
    }
}
