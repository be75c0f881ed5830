//! 消息层统一错误定义
//!
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("invalid retry policy: {reason}")]
    InvalidRetryPolicy { reason: String },

    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// 死信投递失败：管道不重试，交由外层（容器/进程监管）处理
    #[error("dead-letter recovery failed: topic={topic}, reason={reason}")]
    Recovery { topic: String, reason: String },

    #[error("worker failed: {reason}")]
    Worker { reason: String },
}

impl MessagingError {
    pub fn transport(reason: impl Into<String>) -> Self {
        MessagingError::Transport {
            reason: reason.into(),
        }
    }

    pub fn invalid_retry_policy(reason: impl Into<String>) -> Self {
        MessagingError::InvalidRetryPolicy {
            reason: reason.into(),
        }
    }
}

pub type MessagingResult<T> = Result<T, MessagingError>;
