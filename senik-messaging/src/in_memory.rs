//! 内存版传输（InMemoryBroker）
//!
//! 同时实现 `MessageSource` 与 `MessageProducer`，典型用途：测试、示例与本地开发。
//! - 每个主题保存完整日志，按分区分配递增位点；
//! - 订阅得到的是主题日志上的游标：从头读取，跳过订阅时已提交的位点，
//!   读到末尾后等待 `tokio::sync::watch` 的写入通知；
//! - 消费再慢也不会丢消息，日志只追加不截断；
//! - `commit` 记录每个分区下一条待消费的位点（与 Kafka 语义一致）。

use crate::error::{MessagingError, MessagingResult as Result};
use crate::record::{ConsumerRecord, ProducerRecord};
use crate::transport::{MessageProducer, MessageSource};
use async_trait::async_trait;
use dashmap::DashMap;
use futures_core::stream::BoxStream;
use futures_util::{StreamExt, stream};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::watch;

struct TopicLog {
    /// 日志长度变化通知
    appended: watch::Sender<usize>,
    records: Vec<ConsumerRecord>,
    next_offsets: HashMap<i32, i64>,
}

impl TopicLog {
    fn new() -> Self {
        let (appended, _rx) = watch::channel(0);
        Self {
            appended,
            records: Vec::new(),
            next_offsets: HashMap::new(),
        }
    }
}

struct BrokerState {
    partitions: u32,
    topics: DashMap<String, TopicLog>,
    committed: DashMap<(String, i32), i64>,
}

/// 主题日志上的读游标
struct TopicCursor {
    state: Arc<BrokerState>,
    topic: String,
    position: usize,
    /// 订阅时各分区已提交的位点，低于它的消息不再交付
    skip_below: HashMap<i32, i64>,
    appended: watch::Receiver<usize>,
}

impl TopicCursor {
    fn next_ready(&mut self) -> Option<ConsumerRecord> {
        let log = self.state.topics.get(&self.topic)?;
        while let Some(record) = log.records.get(self.position) {
            self.position += 1;
            let floor = self.skip_below.get(&record.partition()).copied().unwrap_or(0);
            if record.offset() >= floor {
                return Some(record.clone());
            }
        }
        None
    }

    async fn advance(mut self) -> Option<(Result<ConsumerRecord>, Self)> {
        loop {
            // 先标记已读再查日志：检查之后的写入一定会唤醒 changed()
            drop(self.appended.borrow_and_update());
            if let Some(record) = self.next_ready() {
                return Some((Ok(record), self));
            }
            if self.appended.changed().await.is_err() {
                return None;
            }
        }
    }
}

/// 内存消息代理
#[derive(Clone)]
pub struct InMemoryBroker {
    inner: Arc<BrokerState>,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::with_partitions(1)
    }
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每个主题的分区数（至少 1）
    pub fn with_partitions(partitions: u32) -> Self {
        Self {
            inner: Arc::new(BrokerState {
                partitions: partitions.max(1),
                topics: DashMap::new(),
                committed: DashMap::new(),
            }),
        }
    }

    pub fn partitions(&self) -> u32 {
        self.inner.partitions
    }

    /// 主题内全部消息（按写入顺序）
    pub fn records(&self, topic: &str) -> Vec<ConsumerRecord> {
        self.inner
            .topics
            .get(topic)
            .map(|log| log.records.clone())
            .unwrap_or_default()
    }

    /// 分区下一条待消费的位点；从未提交时为 `None`
    pub fn committed_offset(&self, topic: &str, partition: i32) -> Option<i64> {
        self.inner
            .committed
            .get(&(topic.to_string(), partition))
            .map(|v| *v)
    }

    fn committed_for(&self, topic: &str) -> HashMap<i32, i64> {
        self.inner
            .committed
            .iter()
            .filter(|entry| entry.key().0 == topic)
            .map(|entry| (entry.key().1, *entry.value()))
            .collect()
    }

    fn partition_for(&self, record: &ProducerRecord, written: usize) -> i32 {
        let partitions = u64::from(self.inner.partitions);
        let slot = match (record.partition(), record.key()) {
            (Some(p), _) => u64::from(p.unsigned_abs()) % partitions,
            (None, Some(key)) => {
                let mut hasher = DefaultHasher::new();
                key.hash(&mut hasher);
                hasher.finish() % partitions
            }
            (None, None) => (written as u64) % partitions,
        };
        i32::try_from(slot).unwrap_or(0)
    }
}

#[async_trait]
impl MessageProducer for InMemoryBroker {
    async fn send(&self, record: ProducerRecord) -> Result<()> {
        let mut log = self
            .inner
            .topics
            .entry(record.topic().to_string())
            .or_insert_with(TopicLog::new);

        let partition = self.partition_for(&record, log.records.len());
        let next = log.next_offsets.entry(partition).or_insert(0);
        let offset = *next;
        *next += 1;

        let consumed = ConsumerRecord::builder()
            .topic(record.topic())
            .partition(partition)
            .offset(offset)
            .maybe_key(record.key())
            .headers(record.headers().clone())
            .value(record.value())
            .build();

        log.records.push(consumed);
        let len = log.records.len();
        log.appended.send_replace(len);
        Ok(())
    }
}

#[async_trait]
impl MessageSource for InMemoryBroker {
    async fn subscribe(
        &self,
        topics: &[String],
    ) -> Result<BoxStream<'static, Result<ConsumerRecord>>> {
        if topics.is_empty() {
            return Err(MessagingError::transport("no topics to subscribe to"));
        }

        let mut streams = Vec::with_capacity(topics.len());
        for topic in topics {
            let appended = self
                .inner
                .topics
                .entry(topic.clone())
                .or_insert_with(TopicLog::new)
                .appended
                .subscribe();

            let cursor = TopicCursor {
                state: self.inner.clone(),
                topic: topic.clone(),
                position: 0,
                skip_below: self.committed_for(topic),
                appended,
            };
            streams.push(stream::unfold(cursor, TopicCursor::advance).boxed());
        }

        Ok(Box::pin(stream::select_all(streams)))
    }

    async fn commit(&self, record: &ConsumerRecord) -> Result<()> {
        let next = record.offset() + 1;
        self.inner
            .committed
            .entry((record.topic().to_string(), record.partition()))
            .and_modify(|committed| *committed = (*committed).max(next))
            .or_insert(next);
        Ok(())
    }
}
