//! 失败观察者（FailureObserver）
//!
//! 管道在每次失败后、执行重试或恢复动作之前调用观察者一次。
//! 观察者只产生副作用（日志、指标），不能失败，也不能改变控制流。
//!
use crate::failure::ProcessingError;
use crate::record::ConsumerRecord;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// 本次失败之后管道将采取的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// 等待 `delay` 后发起第 `next_attempt` 次尝试
    Retrying { next_attempt: u32, delay: Duration },
    /// 不可重试，直接进入死信
    Recovered,
    /// 重试次数耗尽，进入死信
    Exhausted,
}

impl FailureDisposition {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FailureDisposition::Retrying { .. })
    }
}

/// 一次失败的上下文
#[derive(Debug, Clone, Copy)]
pub struct FailureEvent<'a> {
    pub record: &'a ConsumerRecord,
    pub error: &'a ProcessingError,
    pub attempt: u32,
    pub disposition: FailureDisposition,
}

/// 失败观察者；实现需支持多 worker 并发调用
pub trait FailureObserver: Send + Sync {
    fn on_failure(&self, event: &FailureEvent<'_>);
}

/// 默认日志钩子：将要重试的失败记为 warn，进入死信的失败记为 error
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureObserver;

impl FailureObserver for TracingFailureObserver {
    fn on_failure(&self, event: &FailureEvent<'_>) {
        let record = event.record;
        let err = event.error;

        match event.disposition {
            FailureDisposition::Retrying {
                next_attempt,
                delay,
            } => warn!(
                topic = record.topic(),
                partition = record.partition(),
                offset = record.offset(),
                key = record.key(),
                attempt = event.attempt,
                next_attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                kind = err.kind(),
                error = %err.message(),
                "message processing failed, retrying after backoff"
            ),
            FailureDisposition::Recovered => error!(
                topic = record.topic(),
                partition = record.partition(),
                offset = record.offset(),
                key = record.key(),
                attempt = event.attempt,
                kind = err.kind(),
                error = %err.message(),
                "non-retryable failure, publishing to dead-letter topic"
            ),
            FailureDisposition::Exhausted => error!(
                topic = record.topic(),
                partition = record.partition(),
                offset = record.offset(),
                key = record.key(),
                attempt = event.attempt,
                kind = err.kind(),
                error = %err.message(),
                "retries exhausted, publishing to dead-letter topic"
            ),
        }
    }
}

/// 依次通知多个观察者（例如日志 + 指标）
#[derive(Clone, Default)]
pub struct ObserverChain {
    observers: Vec<Arc<dyn FailureObserver>>,
}

impl ObserverChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn FailureObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl FailureObserver for ObserverChain {
    fn on_failure(&self, event: &FailureEvent<'_>) {
        for observer in &self.observers {
            observer.on_failure(event);
        }
    }
}
