//! 重试策略（RetryPolicy）
//!
//! 指数退避 + 上限：`interval(n) = min(max_interval, initial_interval * multiplier^(n-1))`，
//! `n` 为刚失败的尝试序号（从 1 开始），返回值即第 `n + 1` 次尝试前的等待时长。
//! 不加抖动，给定策略与尝试序号时结果确定。
//!
use crate::error::{MessagingError, MessagingResult};
use std::time::Duration;

/// 重试策略，构造后不可变
///
/// # 示例
///
/// ```
/// use senik_messaging::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, 500, 1.5, 2000).unwrap();
/// assert_eq!(policy.interval(1), Duration::from_millis(500));
/// assert_eq!(policy.interval(2), Duration::from_millis(750));
/// assert_eq!(policy.interval(10), Duration::from_millis(2000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_interval_ms: u64,
    multiplier: f64,
    max_interval_ms: u64,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_INITIAL_INTERVAL_MS: u64 = 500;
    pub const DEFAULT_MULTIPLIER: f64 = 1.5;
    pub const DEFAULT_MAX_INTERVAL_MS: u64 = 2000;

    /// 创建并校验重试策略
    ///
    /// `max_attempts` 为含首次在内的总尝试次数；`0` 与 `1` 等价（只尝试一次，不重试）。
    pub fn new(
        max_attempts: u32,
        initial_interval_ms: u64,
        multiplier: f64,
        max_interval_ms: u64,
    ) -> MessagingResult<Self> {
        if !multiplier.is_finite() || multiplier <= 1.0 {
            return Err(MessagingError::invalid_retry_policy(format!(
                "multiplier must be a finite number greater than 1.0, got {multiplier}"
            )));
        }
        if max_interval_ms < initial_interval_ms {
            return Err(MessagingError::invalid_retry_policy(format!(
                "max interval ({max_interval_ms}ms) must not be less than initial interval ({initial_interval_ms}ms)"
            )));
        }

        Ok(Self {
            max_attempts,
            initial_interval_ms,
            multiplier,
            max_interval_ms,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 实际可用的尝试次数（至少一次）
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    /// 第 `attempt` 次尝试失败后的退避时长；`attempt = 0` 按 1 处理
    pub fn interval(&self, attempt: u32) -> Duration {
        // 0 * inf 为 NaN，需单独处理
        if self.initial_interval_ms == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let raw = self.initial_interval_ms as f64 * self.multiplier.powi(exponent);
        // 溢出为 inf 时 min 取上限；f64 -> u64 的 as 转换是饱和的
        let capped = raw.min(self.max_interval_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// 第 `attempt` 次尝试失败后是否还能再试
    pub fn has_attempts_remaining(&self, attempt: u32) -> bool {
        attempt < self.attempt_budget()
    }

    /// 完整退避序列：相邻两次尝试之间的等待时长，共 `attempt_budget - 1` 个
    pub fn backoff_schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.attempt_budget()).map(|attempt| self.interval(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_interval_ms: Self::DEFAULT_INITIAL_INTERVAL_MS,
            multiplier: Self::DEFAULT_MULTIPLIER,
            max_interval_ms: Self::DEFAULT_MAX_INTERVAL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_default_policy_schedule() {
        let policy = RetryPolicy::default();
        let schedule: Vec<_> = policy.backoff_schedule().collect();
        assert_eq!(schedule, vec![ms(500), ms(750)]);
    }

    #[test]
    fn test_interval_is_capped() {
        let policy = RetryPolicy::new(10, 500, 1.5, 2000).unwrap();
        let schedule: Vec<_> = policy.backoff_schedule().collect();
        assert_eq!(
            schedule,
            vec![ms(500), ms(750), ms(1125), ms(1687), ms(2000), ms(2000), ms(2000), ms(2000), ms(2000)]
        );
    }

    #[test]
    fn test_attempt_zero_treated_as_first() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.interval(0), policy.interval(1));
    }

    #[test]
    fn test_zero_max_attempts_means_single_attempt() {
        let policy = RetryPolicy::new(0, 100, 2.0, 1000).unwrap();
        assert_eq!(policy.attempt_budget(), 1);
        assert!(!policy.has_attempts_remaining(1));
        assert_eq!(policy.backoff_schedule().count(), 0);
    }

    #[test]
    fn test_attempts_remaining() {
        let policy = RetryPolicy::default();
        assert!(policy.has_attempts_remaining(1));
        assert!(policy.has_attempts_remaining(2));
        assert!(!policy.has_attempts_remaining(3));
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let policy = RetryPolicy::new(u32::MAX, 1, 10.0, 60_000).unwrap();
        assert_eq!(policy.interval(u32::MAX), ms(60_000));
    }

    #[test]
    fn test_zero_initial_interval_stays_zero() {
        let policy = RetryPolicy::new(5000, 0, 2.0, 1000).unwrap();
        assert_eq!(policy.interval(1), Duration::ZERO);
        assert_eq!(policy.interval(1100), Duration::ZERO);
        assert_eq!(policy.interval(u32::MAX), Duration::ZERO);
    }

    #[test]
    fn test_invalid_policies() {
        assert!(RetryPolicy::new(3, 500, 1.0, 2000).is_err());
        assert!(RetryPolicy::new(3, 500, 0.5, 2000).is_err());
        assert!(RetryPolicy::new(3, 500, f64::NAN, 2000).is_err());
        assert!(RetryPolicy::new(3, 500, f64::INFINITY, 2000).is_err());
        assert!(matches!(
            RetryPolicy::new(3, 5000, 1.5, 2000),
            Err(MessagingError::InvalidRetryPolicy { .. })
        ));
    }

    proptest! {
        // 任意合法策略下，退避序列单调不减且不超过上限
        #[test]
        fn prop_intervals_monotonic_and_capped(
            max_attempts in 0u32..40,
            initial in 0u64..10_000,
            extra in 0u64..100_000,
            multiplier in 1.0001f64..10.0,
        ) {
            let policy = RetryPolicy::new(max_attempts, initial, multiplier, initial + extra).unwrap();
            let schedule: Vec<_> = policy.backoff_schedule().collect();

            prop_assert_eq!(schedule.len() as u32, policy.attempt_budget() - 1);
            for pair in schedule.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
            for delay in &schedule {
                prop_assert!(*delay <= policy.max_interval());
            }
        }

        // 远超序列长度的尝试序号（指数溢出）下仍满足 min(上限, 初始 * 倍数^(n-1))
        #[test]
        fn prop_interval_formula_holds_for_huge_attempts(
            initial in prop_oneof![Just(0u64), 0u64..10_000],
            extra in 0u64..100_000,
            multiplier in 1.0001f64..10.0,
            attempt in 200_000u32..=u32::MAX,
        ) {
            let policy = RetryPolicy::new(u32::MAX, initial, multiplier, initial + extra).unwrap();
            let interval = policy.interval(attempt);

            if initial == 0 {
                prop_assert_eq!(interval, Duration::ZERO);
            } else {
                prop_assert_eq!(interval, policy.max_interval());
            }
            prop_assert!(policy.interval(attempt - 1) <= interval);
        }
    }
}
