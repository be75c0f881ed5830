//! 领域层统一错误定义
//!
//! 聚焦事件解码、数据校验与下游依赖的最小必要集合，
//! 便于消息层按错误种类区分“可重试 / 不可重试”。
//!
use thiserror::Error;

/// 统一错误类型（领域层最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化/解码 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("deserialization error: {reason}")]
    Deserialization { reason: String },
    #[error("parse error: {reason}")]
    Parse { reason: String },

    // --- 数据校验 ---
    #[error("validation failed: field={field}, reason={reason}")]
    Validation { field: &'static str, reason: String },

    // --- 下游依赖 ---
    #[error("downstream unavailable: {reason}")]
    Unavailable { reason: String },
}

impl DomainError {
    pub fn deserialization(reason: impl Into<String>) -> Self {
        DomainError::Deserialization {
            reason: reason.into(),
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        DomainError::Unavailable {
            reason: reason.into(),
        }
    }

    /// 错误种类的稳定名称（用于日志与死信记录）
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Serde { .. } => "serde",
            DomainError::Deserialization { .. } => "deserialization",
            DomainError::Parse { .. } => "parse",
            DomainError::Validation { .. } => "validation",
            DomainError::Unavailable { .. } => "unavailable",
        }
    }

    /// 是否为永久性错误：载荷本身有问题，重试不会改变结果
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            DomainError::Serde { .. }
                | DomainError::Deserialization { .. }
                | DomainError::Parse { .. }
                | DomainError::Validation { .. }
        )
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_errors() {
        assert!(DomainError::deserialization("bad tag").is_permanent());
        assert!(DomainError::validation("currency", "empty").is_permanent());
        assert!(!DomainError::unavailable("db down").is_permanent());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(DomainError::validation("income", "negative").kind(), "validation");
        assert_eq!(DomainError::unavailable("timeout").kind(), "unavailable");
    }

    #[test]
    fn test_display() {
        let err = DomainError::validation("currency", "must be 3 letters");
        assert_eq!(
            err.to_string(),
            "validation failed: field=currency, reason=must be 3 letters"
        );
    }

    #[test]
    fn test_from_uuid_error() {
        let err: DomainError = "not-a-uuid".parse::<uuid::Uuid>().unwrap_err().into();
        assert!(matches!(err, DomainError::Parse { .. }));
    }
}
