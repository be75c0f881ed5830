//! 传输协议（transport）
//!
//! 管道只依赖两个窄接口：
//! - `MessageSource`：订阅主题并逐条交付消息，终态后提交位点；
//! - `MessageProducer`：发送消息（死信投递使用）。
//!
//! 具体实现（Kafka 客户端等）由上层注入；`in_memory` 提供测试与演示用实现。
//!
use crate::error::MessagingResult as Result;
use crate::record::{ConsumerRecord, ProducerRecord};
use async_trait::async_trait;
use futures_core::stream::BoxStream;

/// 消息来源
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// 返回一个 'static 生命周期的消息流，便于在 tokio::spawn 中使用
    async fn subscribe(
        &self,
        topics: &[String],
    ) -> Result<BoxStream<'static, Result<ConsumerRecord>>>;

    /// 提交位点：该消息已到达终态（成功或已进入死信）
    async fn commit(&self, record: &ConsumerRecord) -> Result<()>;
}

/// 消息生产者
#[async_trait]
pub trait MessageProducer: Send + Sync {
    async fn send(&self, record: ProducerRecord) -> Result<()>;
}
