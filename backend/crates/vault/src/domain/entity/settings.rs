//! Switch Settings Entity
//!
//! Per-user check-in schedule. The switch is due at
//! `last_check_in_at + interval` and releases after a further grace period.

use chrono::{DateTime, Duration, Utc};
use kernel::error::app_error::AppError;
use kernel::id::UserId;
use serde::Serialize;

use crate::error::VaultResult;

pub const DEFAULT_INTERVAL_DAYS: i32 = 30;
pub const DEFAULT_GRACE_DAYS: i32 = 7;
pub const INTERVAL_RANGE: std::ops::RangeInclusive<i32> = 1..=365;
pub const GRACE_RANGE: std::ops::RangeInclusive<i32> = 0..=90;
const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchStatus {
    Healthy,
    DueSoon,
    Overdue,
    Triggered,
}

#[derive(Debug, Clone)]
pub struct SwitchSettings {
    pub user_id: UserId,
    pub check_in_interval_days: i32,
    pub grace_period_days: i32,
    pub last_check_in_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SwitchSettings {
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            check_in_interval_days: DEFAULT_INTERVAL_DAYS,
            grace_period_days: DEFAULT_GRACE_DAYS,
            last_check_in_at: now,
            triggered_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.last_check_in_at + Duration::days(i64::from(self.check_in_interval_days))
    }

    pub fn release_at(&self) -> DateTime<Utc> {
        self.deadline() + Duration::days(i64::from(self.grace_period_days))
    }

    pub fn status(&self, now: DateTime<Utc>) -> SwitchStatus {
        if self.triggered_at.is_some() {
            return SwitchStatus::Triggered;
        }
        let deadline = self.deadline();
        if now >= deadline {
            SwitchStatus::Overdue
        } else if deadline - now <= Duration::days(DUE_SOON_DAYS) {
            SwitchStatus::DueSoon
        } else {
            SwitchStatus::Healthy
        }
    }

    /// Whole days until the deadline rounded up; negative once overdue
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        const DAY: i64 = 86_400;
        let secs = (self.deadline() - now).num_seconds();
        secs.div_euclid(DAY) + i64::from(secs.rem_euclid(DAY) > 0)
    }

    /// Untriggered and past the grace period
    pub fn is_due_for_release(&self, now: DateTime<Utc>) -> bool {
        self.triggered_at.is_none() && now >= self.release_at()
    }

    pub fn check_in(&mut self, now: DateTime<Utc>) {
        self.last_check_in_at = now;
        self.triggered_at = None;
        self.updated_at = now;
    }

    pub fn trigger(&mut self, now: DateTime<Utc>) {
        self.triggered_at = Some(now);
        self.updated_at = now;
    }

    pub fn update_schedule(&mut self, interval_days: i32, grace_days: i32) -> VaultResult<()> {
        if !INTERVAL_RANGE.contains(&interval_days) {
            return Err(AppError::bad_request(
                "Check-in interval must be between 1 and 365 days",
            )
            .into());
        }
        if !GRACE_RANGE.contains(&grace_days) {
            return Err(
                AppError::bad_request("Grace period must be between 0 and 90 days").into(),
            );
        }
        self.check_in_interval_days = interval_days;
        self.grace_period_days = grace_days;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings_at(last: DateTime<Utc>) -> SwitchSettings {
        SwitchSettings::new(UserId::new(), last)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_deadline_and_release() {
        let s = settings_at(t0());
        assert_eq!(s.deadline(), t0() + Duration::days(30));
        assert_eq!(s.release_at(), t0() + Duration::days(37));
    }

    #[test]
    fn test_status_thresholds() {
        let s = settings_at(t0());
        assert_eq!(s.status(t0()), SwitchStatus::Healthy);
        assert_eq!(s.status(t0() + Duration::days(26)), SwitchStatus::Healthy);
        assert_eq!(s.status(t0() + Duration::days(27)), SwitchStatus::DueSoon);
        assert_eq!(s.status(t0() + Duration::days(30)), SwitchStatus::Overdue);
        assert_eq!(s.status(t0() + Duration::days(40)), SwitchStatus::Overdue);

        let mut triggered = s.clone();
        triggered.trigger(t0() + Duration::days(40));
        assert_eq!(triggered.status(t0()), SwitchStatus::Triggered);
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let s = settings_at(t0());
        assert_eq!(s.days_remaining(t0()), 30);
        assert_eq!(s.days_remaining(t0() + Duration::hours(1)), 30);
        assert_eq!(s.days_remaining(t0() + Duration::days(30)), 0);
        assert_eq!(s.days_remaining(t0() + Duration::hours(30 * 24 + 36)), -1);
        assert_eq!(s.days_remaining(t0() + Duration::days(32)), -2);
    }

    #[test]
    fn test_due_for_release() {
        let mut s = settings_at(t0());
        assert!(!s.is_due_for_release(t0() + Duration::days(36)));
        assert!(s.is_due_for_release(t0() + Duration::days(37)));
        s.trigger(t0() + Duration::days(37));
        assert!(!s.is_due_for_release(t0() + Duration::days(38)));
        s.check_in(t0() + Duration::days(38));
        assert!(s.triggered_at.is_none());
    }

    #[test]
    fn test_update_schedule_ranges() {
        let mut s = settings_at(t0());
        assert!(s.update_schedule(1, 0).is_ok());
        assert!(s.update_schedule(365, 90).is_ok());
        assert!(s.update_schedule(0, 7).is_err());
        assert!(s.update_schedule(366, 7).is_err());
        assert!(s.update_schedule(30, -1).is_err());
        assert!(s.update_schedule(30, 91).is_err());
        assert_eq!(s.check_in_interval_days, 365);
    }
}
