//! 弹性处理管道（RetryingPipeline）
//!
//! 单条消息的状态机：
//! - 初始 `Processing(1)`；
//! - 处理成功 → `Success`；
//! - 不可重试失败（任意尝试）→ 通知观察者 → 死信 → `Recovered`；
//! - 可重试失败且仍有余量 → 通知观察者 → 等待退避 → `Processing(n + 1)`；
//! - 可重试失败且已是最后一次 → 通知观察者 → 死信 → `Exhausted`。
//!
//! 退避期间当前 worker 被占用，不处理其他消息。死信投递失败不重试，
//! 以 `MessagingError::Recovery` 返回给调用方。
//!
use crate::dead_letter::{DeadLetterRecord, DeadLetterSink, DeadLetterTopic, FailureInfo};
use crate::error::{MessagingError, MessagingResult};
use crate::failure::{FailureClassification, ProcessingError};
use crate::handler::MessageHandler;
use crate::observer::{FailureDisposition, FailureEvent, FailureObserver, TracingFailureObserver};
use crate::record::ConsumerRecord;
use crate::retry::RetryPolicy;
use bon::Builder;
use std::sync::Arc;
use tracing::debug;

/// 单条消息的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 处理成功
    Success { attempts: u32 },
    /// 不可重试失败，已进入死信
    Recovered { attempts: u32 },
    /// 重试耗尽，已进入死信
    Exhausted { attempts: u32 },
}

impl Outcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Outcome::Success { attempts }
            | Outcome::Recovered { attempts }
            | Outcome::Exhausted { attempts } => *attempts,
        }
    }

    pub fn is_dead_lettered(&self) -> bool {
        !matches!(self, Outcome::Success { .. })
    }
}

fn default_observer() -> Arc<dyn FailureObserver> {
    Arc::new(TracingFailureObserver)
}

/// 重试 + 死信 + 失败日志的组合管道
#[derive(Builder)]
pub struct RetryingPipeline {
    #[builder(default)]
    policy: RetryPolicy,
    dead_letter_sink: Arc<dyn DeadLetterSink>,
    #[builder(default = default_observer())]
    observer: Arc<dyn FailureObserver>,
    #[builder(default)]
    dead_letter_topic: DeadLetterTopic,
}

impl RetryingPipeline {
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn dead_letter_topic(&self) -> &DeadLetterTopic {
        &self.dead_letter_topic
    }

    /// 处理一条消息直至终态
    ///
    /// 只有死信投递失败会返回错误；其余失败均以 `Outcome` 表达。
    pub async fn process<H>(&self, record: &ConsumerRecord, handler: &H) -> MessagingResult<Outcome>
    where
        H: MessageHandler + ?Sized,
    {
        let mut attempt: u32 = 1;

        loop {
            let error = match handler.handle(record, attempt).await {
                Ok(()) => {
                    debug!(
                        handler = handler.handler_name(),
                        position = %record.position(),
                        attempt,
                        "message processed"
                    );
                    return Ok(Outcome::Success { attempts: attempt });
                }
                Err(error) => error,
            };

            let disposition = self.disposition_for(&error, attempt);
            self.observer.on_failure(&FailureEvent {
                record,
                error: &error,
                attempt,
                disposition,
            });

            match disposition {
                FailureDisposition::Retrying {
                    next_attempt,
                    delay,
                } => {
                    tokio::time::sleep(delay).await;
                    attempt = next_attempt;
                }
                FailureDisposition::Recovered => {
                    self.recover(record, &error, attempt).await?;
                    return Ok(Outcome::Recovered { attempts: attempt });
                }
                FailureDisposition::Exhausted => {
                    self.recover(record, &error, attempt).await?;
                    return Ok(Outcome::Exhausted { attempts: attempt });
                }
            }
        }
    }

    fn disposition_for(&self, error: &ProcessingError, attempt: u32) -> FailureDisposition {
        match error.classification() {
            FailureClassification::NonRetryable => FailureDisposition::Recovered,
            FailureClassification::Retryable if self.policy.has_attempts_remaining(attempt) => {
                FailureDisposition::Retrying {
                    next_attempt: attempt + 1,
                    delay: self.policy.interval(attempt),
                }
            }
            FailureClassification::Retryable => FailureDisposition::Exhausted,
        }
    }

    async fn recover(
        &self,
        record: &ConsumerRecord,
        error: &ProcessingError,
        attempt: u32,
    ) -> MessagingResult<()> {
        let topic = self.dead_letter_topic.resolve(record.topic());
        let failure = FailureInfo::builder()
            .kind(error.kind())
            .message(error.message())
            .classification(error.classification())
            .attempts(attempt)
            .build();

        self.dead_letter_sink
            .publish(DeadLetterRecord::new(record, topic.clone(), failure))
            .await
            .map_err(|e| match e {
                MessagingError::Recovery { .. } => e,
                other => MessagingError::Recovery {
                    topic,
                    reason: other.to_string(),
                },
            })
    }
}
