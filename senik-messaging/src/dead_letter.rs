//! 死信（Dead Letter）
//!
//! 重试耗尽或被判定为不可重试的消息，连同失败信息封装为 `DeadLetterRecord`，
//! 经 `DeadLetterSink` 投递到独立的死信主题（默认 `<原主题>.DLT`）。
//! 投递为尽力而为，失败不在本层重试。
//!
use crate::error::{MessagingError, MessagingResult};
use crate::failure::FailureClassification;
use crate::record::{ConsumerRecord, Headers, ProducerRecord};
use crate::transport::MessageProducer;
use async_trait::async_trait;
use bon::Builder;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

/// 死信消息附加的失败信息头
pub mod headers {
    pub const ORIGINAL_TOPIC: &str = "dlt-original-topic";
    pub const ORIGINAL_PARTITION: &str = "dlt-original-partition";
    pub const ORIGINAL_OFFSET: &str = "dlt-original-offset";
    pub const EXCEPTION_KIND: &str = "dlt-exception-kind";
    pub const EXCEPTION_MESSAGE: &str = "dlt-exception-message";
    pub const CLASSIFICATION: &str = "dlt-classification";
    pub const ATTEMPTS: &str = "dlt-attempts";
    pub const FAILED_AT: &str = "dlt-failed-at";
}

/// 失败元数据
#[derive(Debug, Clone, Builder, PartialEq)]
pub struct FailureInfo {
    #[builder(into)]
    kind: String,
    #[builder(into)]
    message: String,
    classification: FailureClassification,
    attempts: u32,
    #[builder(default = Utc::now())]
    failed_at: DateTime<Utc>,
}

impl FailureInfo {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn classification(&self) -> FailureClassification {
        self.classification
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn failed_at(&self) -> DateTime<Utc> {
        self.failed_at
    }
}

/// 死信记录：原消息的键/值/头与来源位置，加上失败元数据
#[derive(Debug, Clone, PartialEq)]
pub struct DeadLetterRecord {
    topic: String,
    source_topic: String,
    source_partition: i32,
    source_offset: i64,
    key: Option<String>,
    value: Vec<u8>,
    headers: Headers,
    failure: FailureInfo,
}

impl DeadLetterRecord {
    pub fn new(record: &ConsumerRecord, topic: impl Into<String>, failure: FailureInfo) -> Self {
        Self {
            topic: topic.into(),
            source_topic: record.topic().to_string(),
            source_partition: record.partition(),
            source_offset: record.offset(),
            key: record.key().map(str::to_string),
            value: record.value().to_vec(),
            headers: record.headers().clone(),
            failure,
        }
    }

    /// 死信主题
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn source_topic(&self) -> &str {
        &self.source_topic
    }

    pub fn source_partition(&self) -> i32 {
        self.source_partition
    }

    pub fn source_offset(&self) -> i64 {
        self.source_offset
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// 原消息头（不含失败信息头）
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn failure(&self) -> &FailureInfo {
        &self.failure
    }

    /// 转为待发送消息：保留原分区、键、值与原消息头，并追加失败信息头
    pub fn into_producer_record(self) -> ProducerRecord {
        let mut hdrs = self.headers;
        hdrs.insert(headers::ORIGINAL_TOPIC, self.source_topic);
        hdrs.insert(headers::ORIGINAL_PARTITION, self.source_partition.to_string());
        hdrs.insert(headers::ORIGINAL_OFFSET, self.source_offset.to_string());
        hdrs.insert(headers::EXCEPTION_KIND, self.failure.kind);
        hdrs.insert(headers::EXCEPTION_MESSAGE, self.failure.message);
        hdrs.insert(
            headers::CLASSIFICATION,
            self.failure.classification.as_str(),
        );
        hdrs.insert(headers::ATTEMPTS, self.failure.attempts.to_string());
        hdrs.insert(
            headers::FAILED_AT,
            self.failure
                .failed_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        ProducerRecord::builder()
            .topic(self.topic)
            .partition(self.source_partition)
            .maybe_key(self.key)
            .headers(hdrs)
            .value(self.value)
            .build()
    }
}

/// 死信主题命名：原主题 + 后缀
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterTopic {
    suffix: String,
}

impl DeadLetterTopic {
    pub const DEFAULT_SUFFIX: &'static str = ".DLT";

    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn resolve(&self, source_topic: &str) -> String {
        format!("{source_topic}{}", self.suffix)
    }
}

impl Default for DeadLetterTopic {
    fn default() -> Self {
        Self::with_suffix(Self::DEFAULT_SUFFIX)
    }
}

/// 恢复出口：接收死信记录；实现需支持多 worker 并发调用
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    async fn publish(&self, record: DeadLetterRecord) -> MessagingResult<()>;
}

/// 基于传输层生产者的死信投递
#[derive(Clone)]
pub struct DeadLetterPublisher {
    producer: Arc<dyn MessageProducer>,
}

impl DeadLetterPublisher {
    pub fn new(producer: Arc<dyn MessageProducer>) -> Self {
        Self { producer }
    }
}

#[async_trait]
impl DeadLetterSink for DeadLetterPublisher {
    async fn publish(&self, record: DeadLetterRecord) -> MessagingResult<()> {
        let topic = record.topic().to_string();
        self.producer
            .send(record.into_producer_record())
            .await
            .map_err(|e| MessagingError::Recovery {
                topic,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_record() -> ConsumerRecord {
        ConsumerRecord::builder()
            .topic("senik.events")
            .partition(2)
            .offset(41)
            .key("income-1")
            .headers(Headers::new().with("trace-id", "abc"))
            .value(r#"{"className":"IncomeCalculated"}"#)
            .build()
    }

    fn failure() -> FailureInfo {
        FailureInfo::builder()
            .kind("validation")
            .message("currency must be 3 letters")
            .classification(FailureClassification::NonRetryable)
            .attempts(1)
            .failed_at(
                DateTime::parse_from_rfc3339("2024-03-01T10:15:30Z")
                    .unwrap()
                    .with_timezone(&Utc),
            )
            .build()
    }

    #[test]
    fn test_default_topic_suffix() {
        assert_eq!(
            DeadLetterTopic::default().resolve("calculation.commands"),
            "calculation.commands.DLT"
        );
        assert_eq!(DeadLetterTopic::with_suffix("-dlq").resolve("a"), "a-dlq");
    }

    #[test]
    fn test_record_keeps_original_message() {
        let source = failed_record();
        let dlr = DeadLetterRecord::new(&source, "senik.events.DLT", failure());

        assert_eq!(dlr.topic(), "senik.events.DLT");
        assert_eq!(dlr.source_topic(), "senik.events");
        assert_eq!(dlr.source_partition(), 2);
        assert_eq!(dlr.source_offset(), 41);
        assert_eq!(dlr.key(), Some("income-1"));
        assert_eq!(dlr.value(), source.value());
        assert_eq!(dlr.headers(), source.headers());
        assert_eq!(dlr.failure().attempts(), 1);
    }

    #[test]
    fn test_producer_record_carries_failure_headers() {
        let pr = DeadLetterRecord::new(&failed_record(), "senik.events.DLT", failure())
            .into_producer_record();

        assert_eq!(pr.topic(), "senik.events.DLT");
        assert_eq!(pr.partition(), Some(2));
        assert_eq!(pr.key(), Some("income-1"));

        let h = pr.headers();
        assert_eq!(h.get_str("trace-id"), Some("abc"));
        assert_eq!(h.get_str(headers::ORIGINAL_TOPIC), Some("senik.events"));
        assert_eq!(h.get_str(headers::ORIGINAL_PARTITION), Some("2"));
        assert_eq!(h.get_str(headers::ORIGINAL_OFFSET), Some("41"));
        assert_eq!(h.get_str(headers::EXCEPTION_KIND), Some("validation"));
        assert_eq!(
            h.get_str(headers::EXCEPTION_MESSAGE),
            Some("currency must be 3 letters")
        );
        assert_eq!(h.get_str(headers::CLASSIFICATION), Some("non_retryable"));
        assert_eq!(h.get_str(headers::ATTEMPTS), Some("1"));
        assert_eq!(
            h.get_str(headers::FAILED_AT),
            Some("2024-03-01T10:15:30.000Z")
        );
    }
}
