//! # Config 模块
//!
//! 分层 UI 配置，集中管理图层池与过渡动画的参数。
//!
//! ## 配置优先级
//!
//! 1. 调用方显式构造的配置（最高）
//! 2. 配置文件 (layered_ui.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::animation::EasingFunction;

/// 空闲图层自动隐藏的最短等待时间（秒）
pub const MIN_IDLE_TIMEOUT: f32 = 1.0;

/// 空闲图层自动隐藏的最长等待时间（秒）
pub const MAX_IDLE_TIMEOUT: f32 = 60.0;

/// 图层缩放模式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// 按屏幕尺寸缩放（以参考分辨率为基准）
    #[default]
    ScaleWithScreenSize,
    /// 固定像素尺寸
    ConstantPixelSize,
}

/// 参考分辨率
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 2430,
            height: 1080,
        }
    }
}

/// 分层 UI 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayeredUiConfig {
    /// 每个新建图层使用的参考分辨率
    #[serde(default)]
    pub reference_resolution: Resolution,

    /// 图层缩放模式
    #[serde(default)]
    pub scale_mode: ScaleMode,

    /// 图层池容量上限
    #[serde(default = "default_max_layers")]
    pub max_layers: usize,

    /// 空图层保持激活的时长（秒），超过后自动隐藏
    #[serde(default = "default_layer_idle_timeout")]
    pub layer_idle_timeout: f32,

    /// 入场/退场动画配置
    #[serde(default)]
    pub animation: AnimationConfig,
}

/// 入场/退场动画配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationConfig {
    /// Instant 淡入淡出时长（秒）
    #[serde(default = "default_fade_duration")]
    pub fade_duration: f32,

    /// Slide 滑入滑出时长（秒）
    #[serde(default = "default_slide_duration")]
    pub slide_duration: f32,

    /// Instant 入场起始缩放
    #[serde(default = "default_entrance_scale")]
    pub entrance_scale: f32,

    /// 缓动函数
    #[serde(default)]
    pub easing: EasingFunction,
}

// 默认值函数
fn default_max_layers() -> usize {
    16
}

fn default_layer_idle_timeout() -> f32 {
    1.0
}

fn default_fade_duration() -> f32 {
    0.2
}

fn default_slide_duration() -> f32 {
    0.2
}

fn default_entrance_scale() -> f32 {
    1.5
}

impl Default for LayeredUiConfig {
    fn default() -> Self {
        Self {
            reference_resolution: Resolution::default(),
            scale_mode: ScaleMode::default(),
            max_layers: default_max_layers(),
            layer_idle_timeout: default_layer_idle_timeout(),
            animation: AnimationConfig::default(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fade_duration: default_fade_duration(),
            slide_duration: default_slide_duration(),
            entrance_scale: default_entrance_scale(),
            easing: EasingFunction::default(),
        }
    }
}

impl LayeredUiConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = ?path, "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_layers == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_layers 至少为 1".to_string(),
            ));
        }

        if self.reference_resolution.width == 0 || self.reference_resolution.height == 0 {
            return Err(ConfigError::ValidationFailed(format!(
                "参考分辨率无效: {}x{}",
                self.reference_resolution.width, self.reference_resolution.height
            )));
        }

        if !(MIN_IDLE_TIMEOUT..=MAX_IDLE_TIMEOUT).contains(&self.layer_idle_timeout) {
            return Err(ConfigError::ValidationFailed(format!(
                "layer_idle_timeout 必须在 {MIN_IDLE_TIMEOUT} - {MAX_IDLE_TIMEOUT} 秒之间，实际 {}",
                self.layer_idle_timeout
            )));
        }

        let anim = &self.animation;
        if !anim.fade_duration.is_finite() || !anim.slide_duration.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "动画时长必须是有限值".to_string(),
            ));
        }

        if !(anim.entrance_scale.is_finite() && anim.entrance_scale > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "entrance_scale 必须是大于 0 的有限值".to_string(),
            ));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayeredUiConfig::default();
        assert_eq!(config.reference_resolution.width, 2430);
        assert_eq!(config.reference_resolution.height, 1080);
        assert_eq!(config.scale_mode, ScaleMode::ScaleWithScreenSize);
        assert_eq!(config.layer_idle_timeout, 1.0);
        assert_eq!(config.animation.fade_duration, 0.2);
        assert_eq!(config.animation.entrance_scale, 1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LayeredUiConfig =
            serde_json::from_str(r#"{ "max_layers": 4, "animation": { "easing": "ease_out_quad" } }"#)
                .unwrap();
        assert_eq!(config.max_layers, 4);
        assert_eq!(config.animation.easing, EasingFunction::EaseOutQuad);
        assert_eq!(config.animation.slide_duration, 0.2);
        assert_eq!(config.reference_resolution, Resolution::default());
    }

    #[test]
    fn test_validate_rejects_short_idle_timeout() {
        let config = LayeredUiConfig {
            layer_idle_timeout: 0.5,
            ..LayeredUiConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_pool() {
        let config = LayeredUiConfig {
            max_layers: 0,
            ..LayeredUiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_entrance_scale() {
        for scale in [f32::NAN, f32::INFINITY, 0.0, -1.5] {
            let config = LayeredUiConfig {
                animation: AnimationConfig {
                    entrance_scale: scale,
                    ..AnimationConfig::default()
                },
                ..LayeredUiConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::ValidationFailed(_))),
                "entrance_scale = {scale} 应被拒绝"
            );
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layered_ui.json");

        let config = LayeredUiConfig {
            max_layers: 3,
            layer_idle_timeout: 2.5,
            ..LayeredUiConfig::default()
        };
        config.save(&path).unwrap();

        assert_eq!(LayeredUiConfig::load(&path), config);
    }

    #[test]
    fn test_load_missing_or_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(LayeredUiConfig::load(&missing), LayeredUiConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(LayeredUiConfig::load(&broken), LayeredUiConfig::default());
    }
}
