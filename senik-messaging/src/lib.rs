//! senik 消息层（senik-messaging）
//!
//! 在“消费一条消息 → 处理 → 成功或失败”这一传输原语之上提供策略层：
//! - `retry`：指数退避 + 最大尝试次数的重试策略；
//! - `failure`：处理失败的分类（可重试 / 不可重试）；
//! - `dead_letter`：死信记录与死信投递（恢复出口）；
//! - `observer`：失败观察者（日志钩子），每次失败恰好记录一次；
//! - `pipeline`：组合上述策略的弹性处理管道；
//! - `handler`：原始消息处理器与“解码 → 校验 → 业务处理”的类型化适配器；
//! - `container`：按分区分发到并发 worker 的监听容器；
//! - `transport` / `in_memory`：传输协议与内存实现。
//!
//! 传输本身（Kafka 客户端等）不在本 crate 内实现，仅通过 `transport` 中的协议对接。
//!
pub mod container;
pub mod dead_letter;
pub mod error;
pub mod failure;
pub mod handler;
pub mod in_memory;
pub mod observer;
pub mod pipeline;
pub mod record;
pub mod retry;
pub mod transport;

pub use container::{ContainerConfig, ContainerHandle, ListenerContainer};
pub use dead_letter::{DeadLetterPublisher, DeadLetterRecord, DeadLetterSink, DeadLetterTopic};
pub use error::{MessagingError, MessagingResult};
pub use failure::{FailureClassification, ProcessingError};
pub use handler::{DecodingHandler, EventListener, MessageHandler};
pub use in_memory::InMemoryBroker;
pub use observer::{
    FailureDisposition, FailureEvent, FailureObserver, ObserverChain, TracingFailureObserver,
};
pub use pipeline::{Outcome, RetryingPipeline};
pub use record::{ConsumerRecord, Headers, ProducerRecord};
pub use retry::RetryPolicy;
pub use transport::{MessageProducer, MessageSource};
