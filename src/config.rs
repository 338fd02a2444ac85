//! Lending configuration: the limits attached to each membership tier.
//!
//! Loaded from JSON; any tier left out keeps its built-in limits.
//!
//! ```json
//! { "basic": { "max_concurrent_loans": 3, "max_loan_days": 14, "late_fee_per_day": 25 } }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{MembershipTier, TierPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse lending config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid policy for tier {tier}: {reason}")]
    InvalidPolicy {
        tier: MembershipTier,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingConfig {
    pub basic: TierPolicy,
    pub premium: TierPolicy,
    pub student: TierPolicy,
    pub faculty: TierPolicy,
}

impl Default for LendingConfig {
    fn default() -> Self {
        LendingConfig {
            basic: MembershipTier::Basic.default_policy(),
            premium: MembershipTier::Premium.default_policy(),
            student: MembershipTier::Student.default_policy(),
            faculty: MembershipTier::Faculty.default_policy(),
        }
    }
}

impl LendingConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: LendingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: LendingConfig = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn policy(&self, tier: MembershipTier) -> &TierPolicy {
        match tier {
            MembershipTier::Basic => &self.basic,
            MembershipTier::Premium => &self.premium,
            MembershipTier::Student => &self.student,
            MembershipTier::Faculty => &self.faculty,
        }
    }

    /// Replace the limits of one tier.
    pub fn with_policy(mut self, tier: MembershipTier, policy: TierPolicy) -> Self {
        match tier {
            MembershipTier::Basic => self.basic = policy,
            MembershipTier::Premium => self.premium = policy,
            MembershipTier::Student => self.student = policy,
            MembershipTier::Faculty => self.faculty = policy,
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for tier in MembershipTier::ALL {
            let policy = self.policy(tier);
            if policy.max_concurrent_loans == 0 {
                return Err(ConfigError::InvalidPolicy {
                    tier,
                    reason: "max_concurrent_loans must be at least 1",
                });
            }
            if policy.max_loan_days == 0 {
                return Err(ConfigError::InvalidPolicy {
                    tier,
                    reason: "max_loan_days must be at least 1",
                });
            }
        }
        Ok(())
    }
}
