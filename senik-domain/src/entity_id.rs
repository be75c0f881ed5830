//! 实体标识（Entity Id）
//!
//! `entity_id!` 为单字段 UUID 包装类型生成统一的派生与便捷实现：
//! - 派生 Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize（透明序列化）；
//! - 提供 `new`/`generate`/`value`，以及 Display、FromStr、AsRef、From 等转换。
//!
macro_rules! entity_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(::uuid::Uuid);

        impl $name {
            pub const fn new(value: ::uuid::Uuid) -> Self {
                Self(value)
            }

            /// 生成随机（v4）标识
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            pub const fn value(&self) -> ::uuid::Uuid {
                self.0
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::DomainError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Ok(Self(s.parse::<::uuid::Uuid>()?))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}", self.0)
            }
        }

        impl ::core::convert::AsRef<::uuid::Uuid> for $name {
            fn as_ref(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::core::convert::From<::uuid::Uuid> for $name {
            fn from(value: ::uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl ::core::convert::From<$name> for ::uuid::Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}
