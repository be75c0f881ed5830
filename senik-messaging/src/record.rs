//! 消息记录（ConsumerRecord / ProducerRecord）
//!
//! 传输层交付与发送的消息形态：主题、分区、位点、键、头与原始字节值。
//!
use bon::Builder;
use chrono::{DateTime, Utc};

/// 消息头：按插入顺序保存，允许同名键重复（与 Kafka 语义一致）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, Vec<u8>)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(key, value);
        self
    }

    /// 同名键取最后一个值
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Extend<(String, Vec<u8>)> for Headers {
    fn extend<T: IntoIterator<Item = (String, Vec<u8>)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

/// 传输层交付给消费者的一条消息
#[derive(Debug, Clone, Builder, PartialEq)]
pub struct ConsumerRecord {
    #[builder(into)]
    topic: String,
    #[builder(default)]
    partition: i32,
    #[builder(default)]
    offset: i64,
    #[builder(into)]
    key: Option<String>,
    #[builder(default)]
    headers: Headers,
    #[builder(into)]
    value: Vec<u8>,
    #[builder(default = Utc::now())]
    timestamp: DateTime<Utc>,
}

impl ConsumerRecord {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition(&self) -> i32 {
        self.partition
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// `topic-partition@offset`，用于日志
    pub fn position(&self) -> String {
        format!("{}-{}@{}", self.topic, self.partition, self.offset)
    }
}

/// 待发送的一条消息；`partition` 为空时由传输层决定
#[derive(Debug, Clone, Builder, PartialEq)]
pub struct ProducerRecord {
    #[builder(into)]
    topic: String,
    partition: Option<i32>,
    #[builder(into)]
    key: Option<String>,
    #[builder(default)]
    headers: Headers,
    #[builder(into)]
    value: Vec<u8>,
}

impl ProducerRecord {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition(&self) -> Option<i32> {
        self.partition
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}
