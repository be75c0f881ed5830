//! senik 领域层（senik-domain）
//!
//! 收入计算（income calculation）相关的领域模型与事件编解码：
//! - 实体标识（`IncomeId`、`LegalEntityId`）与值对象（`Money`）；
//! - 领域事件协议（`domain_event`）与具体事件（`income`）；
//! - 以显式判别字段编码的事件联合类型及统一的解码路径（`codec`）；
//! - 领域层统一错误（`error`）。
//!
//! 本 crate 不依赖任何传输实现，消息层（senik-messaging）只通过 `codec`
//! 对事件进行解码与校验。
//!
#[macro_use]
mod entity_id;

pub mod codec;
pub mod domain_event;
pub mod error;
pub mod income;
pub mod value_object;

pub use codec::SenikEvent;
pub use error::{DomainError, DomainResult};
