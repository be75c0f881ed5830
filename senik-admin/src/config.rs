//! 运行配置
//!
//! 从 TOML 文件读取；文件中缺省的项使用与线上部署一致的默认值。
//!
use senik_messaging::{ContainerConfig, DeadLetterTopic, MessagingError, RetryPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid retry settings: {0}")]
    Retry(#[from] MessagingError),
    #[error("invalid consumer settings: {reason}")]
    Consumer { reason: String },
    #[error("invalid dead-letter settings: {reason}")]
    DeadLetter { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminConfig {
    pub consumer: ConsumerSettings,
    pub retry: RetrySettings,
    pub dead_letter: DeadLetterSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsumerSettings {
    pub group_id: String,
    pub topics: Vec<String>,
    pub concurrency: usize,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        let container = ContainerConfig::default();
        Self {
            group_id: container.group_id,
            topics: container.topics,
            concurrency: container.concurrency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_interval_ms: u64,
    pub multiplier: f64,
    pub max_interval_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: RetryPolicy::DEFAULT_MAX_ATTEMPTS,
            initial_interval_ms: RetryPolicy::DEFAULT_INITIAL_INTERVAL_MS,
            multiplier: RetryPolicy::DEFAULT_MULTIPLIER,
            max_interval_ms: RetryPolicy::DEFAULT_MAX_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeadLetterSettings {
    pub topic_suffix: String,
}

impl Default for DeadLetterSettings {
    fn default() -> Self {
        Self {
            topic_suffix: DeadLetterTopic::default().suffix().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AdminConfig {
    /// 读取配置文件；未指定路径时使用默认配置
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::parse(&contents)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.consumer.topics.is_empty() {
            return Err(ConfigError::Consumer {
                reason: "at least one topic is required".to_string(),
            });
        }
        if self.consumer.group_id.trim().is_empty() {
            return Err(ConfigError::Consumer {
                reason: "group_id must not be empty".to_string(),
            });
        }
        if self.dead_letter.topic_suffix.is_empty() {
            return Err(ConfigError::DeadLetter {
                reason: "dead-letter topic suffix must not be empty".to_string(),
            });
        }
        self.retry_policy()?;
        Ok(())
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        let r = &self.retry;
        Ok(RetryPolicy::new(
            r.max_attempts,
            r.initial_interval_ms,
            r.multiplier,
            r.max_interval_ms,
        )?)
    }

    pub fn container_config(&self) -> ContainerConfig {
        ContainerConfig {
            topics: self.consumer.topics.clone(),
            group_id: self.consumer.group_id.clone(),
            concurrency: self.consumer.concurrency,
            ..ContainerConfig::default()
        }
    }

    pub fn dead_letter_topic(&self) -> DeadLetterTopic {
        DeadLetterTopic::with_suffix(self.dead_letter.topic_suffix.clone())
    }
}
