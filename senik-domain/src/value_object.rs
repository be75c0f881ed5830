//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//!
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建或反序列化值对象后进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 金额：以最小货币单位（如“分”）存储，避免浮点误差
///
/// 反序列化不会经过 [`Money::new`]，因此解码后需显式调用 `validate`。
///
/// # 示例
///
/// ```
/// use senik_domain::value_object::Money;
///
/// let m = Money::new(123_45, "EUR").unwrap();
/// assert_eq!(m.amount_minor(), 12345);
/// assert_eq!(m.to_string(), "123.45 EUR");
///
/// assert!(Money::new(100, "euro").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    amount_minor: i64,
    currency: String,
}

impl Money {
    /// 创建金额并校验币种
    pub fn new(amount_minor: i64, currency: impl Into<String>) -> DomainResult<Self> {
        let money = Self {
            amount_minor,
            currency: currency.into(),
        };
        money.validate()?;
        Ok(money)
    }

    pub fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }
}

impl ValueObject for Money {
    type Error = DomainError;

    fn validate(&self) -> DomainResult<()> {
        let is_iso_code =
            self.currency.len() == 3 && self.currency.bytes().all(|b| b.is_ascii_uppercase());
        if !is_iso_code {
            return Err(DomainError::validation(
                "currency",
                format!("expected a 3-letter ISO 4217 code, got {:?}", self.currency),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        write!(f, "{sign}{}.{:02} {}", abs / 100, abs % 100, self.currency)
    }
}
