//! 处理失败分类（FailureClassification）
//!
//! 分类由处理器/校验器在构造错误时给出，管道本身只读取分类，不做判断。
//!
use senik_domain::DomainError;
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClassification {
    /// 瞬时故障（超时、下游不可用等），按退避策略重试
    Retryable,
    /// 永久故障（载荷/结构校验失败等），跳过退避直接进入死信
    NonRetryable,
}

impl FailureClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClassification::Retryable => "retryable",
            FailureClassification::NonRetryable => "non_retryable",
        }
    }
}

impl fmt::Display for FailureClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 处理器返回的已分类错误
#[derive(Debug)]
pub struct ProcessingError {
    classification: FailureClassification,
    kind: Cow<'static, str>,
    source: anyhow::Error,
}

impl ProcessingError {
    pub fn new(
        classification: FailureClassification,
        kind: impl Into<Cow<'static, str>>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self {
            classification,
            kind: kind.into(),
            source: source.into(),
        }
    }

    pub fn retryable(kind: impl Into<Cow<'static, str>>, source: impl Into<anyhow::Error>) -> Self {
        Self::new(FailureClassification::Retryable, kind, source)
    }

    pub fn non_retryable(
        kind: impl Into<Cow<'static, str>>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::new(FailureClassification::NonRetryable, kind, source)
    }

    pub fn classification(&self) -> FailureClassification {
        self.classification
    }

    pub fn is_retryable(&self) -> bool {
        self.classification == FailureClassification::Retryable
    }

    /// 错误种类（如 `validation`、`unavailable`），写入日志与死信头
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// 含完整错误链的描述
    pub fn message(&self) -> String {
        format!("{:#}", self.source)
    }
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {:#}", self.kind, self.classification, self.source)
    }
}

impl std::error::Error for ProcessingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// 领域错误的固定映射：解码/校验类为不可重试，其余为可重试
impl From<DomainError> for ProcessingError {
    fn from(err: DomainError) -> Self {
        let classification = if err.is_permanent() {
            FailureClassification::NonRetryable
        } else {
            FailureClassification::Retryable
        };
        Self::new(classification, err.kind(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        let err: ProcessingError = DomainError::validation("currency", "bad").into();
        assert_eq!(err.classification(), FailureClassification::NonRetryable);
        assert_eq!(err.kind(), "validation");

        let err: ProcessingError = DomainError::deserialization("unknown tag").into();
        assert!(!err.is_retryable());

        let err: ProcessingError = DomainError::unavailable("ledger down").into();
        assert!(err.is_retryable());
        assert_eq!(err.kind(), "unavailable");
    }

    #[test]
    fn test_message_includes_context() {
        let source = anyhow::anyhow!("connection refused").context("calling ledger");
        let err = ProcessingError::retryable("timeout", source);
        assert_eq!(err.message(), "calling ledger: connection refused");
        assert_eq!(
            err.to_string(),
            "timeout (retryable): calling ledger: connection refused"
        );
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let err: ProcessingError = DomainError::unavailable("db").into();
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("downstream unavailable: db"));
    }
}
