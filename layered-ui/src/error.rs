//! # Error 模块
//!
//! 定义 layered-ui 中使用的错误类型。

use thiserror::Error;

use crate::animator::{AnimationDirection, EntranceType};
use crate::config::ConfigError;
use crate::layer::LayerIndex;
use crate::panel::PanelId;

/// 图层池错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    /// 图层池已满
    #[error("图层池已满：最多允许 {capacity} 个图层")]
    PoolExhausted { capacity: usize },

    /// 无效的图层索引
    #[error("无效的图层索引 {index}")]
    InvalidIndex { index: LayerIndex },
}

/// 面板错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    /// 面板模板缺少入场动画所需的能力
    #[error("面板 '{panel}' 使用 {entrance:?} 入场需要 {capability}，但模板未声明")]
    MissingCapability {
        panel: String,
        entrance: EntranceType,
        capability: &'static str,
    },

    /// 面板内容初始化失败
    #[error("面板 '{panel}' 初始化失败: {message}")]
    SetupFailed { panel: String, message: String },

    /// 同方向的动画仍在播放
    #[error("面板 {id} 的 {direction:?} 动画仍在播放")]
    AnimationInFlight {
        id: PanelId,
        direction: AnimationDirection,
    },
}

/// layered-ui 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UiError {
    /// 面板未注册（或已在关闭中）
    #[error("面板 {id} 未找到")]
    PanelNotFound { id: PanelId },

    /// 图层错误
    #[error("图层错误: {0}")]
    Layer(#[from] LayerError),

    /// 面板错误
    #[error("面板错误: {0}")]
    Panel(#[from] PanelError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type UiResult<T> = Result<T, UiError>;
