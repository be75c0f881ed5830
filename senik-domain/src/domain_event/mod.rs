//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`），以及从事件中提取的
//! 只读元数据 `Metadata`（用于日志与审计）。

mod domain_event_trait;
mod metadata;

pub use domain_event_trait::DomainEvent;
pub use metadata::Metadata;
