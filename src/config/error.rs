//! Configuration error types.
//!
//! `ConfigError` is the invalid-argument condition reported synchronously
//! by setters. `StoreError` covers settings storage failures, which callers
//! log and otherwise ignore.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A setting was given a value outside its allowed range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Work time outside one minute to one day.
    #[error("作業時間は1分以上1440分以下で指定してください（指定値: {0:?}）")]
    InvalidWorkTime(Duration),

    /// Resting time outside one minute to one day.
    #[error("休憩時間は1分以上1440分以下で指定してください（指定値: {0:?}）")]
    InvalidRestingTime(Duration),

    /// Notify lead time outside one second to one hour.
    #[error("事前通知時間は1秒以上3600秒以下で指定してください（指定値: {0:?}）")]
    InvalidNotifyTime(Duration),

    /// Ringer volume above 100.
    #[error("音量は0-100の範囲で指定してください（指定値: {0}）")]
    InvalidRingerVolume(u32),
}

impl ConfigError {
    /// Returns true if this error rejected a setter argument.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidWorkTime(_)
                | Self::InvalidRestingTime(_)
                | Self::InvalidNotifyTime(_)
                | Self::InvalidRingerVolume(_)
        )
    }

    /// Returns the name of the setting that was rejected.
    #[must_use]
    pub fn setting(&self) -> &'static str {
        match self {
            Self::InvalidWorkTime(_) => "WorkTime",
            Self::InvalidRestingTime(_) => "RestingTime",
            Self::InvalidNotifyTime(_) => "NotifyTime",
            Self::InvalidRingerVolume(_) => "RingerVolume",
        }
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidWorkTime(_) | Self::InvalidRestingTime(_) => {
                "分単位で1から1440までの値を指定してください"
            }
            Self::InvalidNotifyTime(_) => "秒単位で1から3600までの値を指定してください",
            Self::InvalidRingerVolume(_) => "0から100までの整数を指定してください",
        }
    }
}

/// Errors raised while reading or writing the settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The settings file could not be read or written.
    #[error("設定ファイルの入出力に失敗しました: {path}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not a JSON object.
    #[error("設定ファイルの形式が不正です: {path}")]
    Format {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Store-specific failure without an underlying source.
    #[error("設定ストアエラー: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidWorkTime(Duration::from_secs(30));
        assert!(err.to_string().contains("作業時間"));
        assert!(err.to_string().contains("30s"));

        let err = ConfigError::InvalidRingerVolume(150);
        assert!(err.to_string().contains("150"));
        assert!(err.to_string().contains("0-100"));
    }

    #[test]
    fn test_is_invalid_argument() {
        assert!(ConfigError::InvalidWorkTime(Duration::ZERO).is_invalid_argument());
        assert!(ConfigError::InvalidRestingTime(Duration::ZERO).is_invalid_argument());
        assert!(ConfigError::InvalidNotifyTime(Duration::ZERO).is_invalid_argument());
        assert!(ConfigError::InvalidRingerVolume(101).is_invalid_argument());
    }

    #[test]
    fn test_setting_names() {
        assert_eq!(ConfigError::InvalidWorkTime(Duration::ZERO).setting(), "WorkTime");
        assert_eq!(ConfigError::InvalidRestingTime(Duration::ZERO).setting(), "RestingTime");
        assert_eq!(ConfigError::InvalidNotifyTime(Duration::ZERO).setting(), "NotifyTime");
        assert_eq!(ConfigError::InvalidRingerVolume(101).setting(), "RingerVolume");
    }

    #[test]
    fn test_suggestion() {
        assert!(ConfigError::InvalidWorkTime(Duration::ZERO)
            .suggestion()
            .contains("分単位"));
        assert!(ConfigError::InvalidNotifyTime(Duration::ZERO)
            .suggestion()
            .contains("秒単位"));
        assert!(ConfigError::InvalidRingerVolume(101)
            .suggestion()
            .contains("100"));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Io {
            path: PathBuf::from("/tmp/user-config.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/user-config.json"));
        assert!(std::error::Error::source(&err).is_some());

        let err = StoreError::Other("boom".to_string());
        assert!(err.to_string().contains("boom"));
    }
}
