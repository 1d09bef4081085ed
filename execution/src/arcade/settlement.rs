use winfinity_types::arcade::{Amount, SettlementPolicy};

/// Reward earned by a finished round.
///
/// Nothing is earned at or below the target. Above it, every extra point is
/// worth `policy.rate`, and the flat `policy.bonus` is added whenever that
/// comes to more than zero.
pub fn settle(score: u32, target: u32, policy: &SettlementPolicy) -> Amount {
    if score <= target {
        return Amount::ZERO;
    }
    let base = policy.rate * u64::from(score - target);
    if base.is_zero() {
        return Amount::ZERO;
    }
    base.saturating_add(policy.bonus)
}
