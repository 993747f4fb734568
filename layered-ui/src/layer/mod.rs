//! # Layer 模块
//!
//! 图层（顶层绘制层）与图层池。
//!
//! 图层按需懒创建、永不销毁；空闲超过宽限期后被隐藏，之后可被复用。
//! 面板总是挂在某个激活的图层下，被隐藏的图层不持有任何面板。

mod compositor;
mod pool;

use std::fmt;

use serde::Serialize;

pub use compositor::{Compositor, CompositorLog, CompositorOp, NullCompositor, RecordingCompositor};
pub use pool::{Allocation, LayerPool};

use crate::config::{LayeredUiConfig, Resolution, ScaleMode};
use crate::panel::PanelId;

/// 图层在池中的槽位索引（创建顺序，稳定不变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerIndex(usize);

impl LayerIndex {
    /// 创建索引
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// 原始值
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for LayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerIndex({})", self.0)
    }
}

/// 图层缩放设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasScaler {
    pub reference_resolution: Resolution,
    pub scale_mode: ScaleMode,
}

impl CanvasScaler {
    /// 从配置构造
    pub fn from_config(config: &LayeredUiConfig) -> Self {
        Self {
            reference_resolution: config.reference_resolution,
            scale_mode: config.scale_mode,
        }
    }
}

impl Default for CanvasScaler {
    fn default() -> Self {
        Self::from_config(&LayeredUiConfig::default())
    }
}

/// 面板放置策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStrategy {
    /// 放到当前最上层的激活图层（`use_canvas`）
    SameLevel,
    /// 放到一个新建或复用的图层，并把它提到最前（`use_higher_canvas`）
    NewLevel,
}

/// 单个图层
#[derive(Debug, Clone)]
pub struct Layer {
    index: LayerIndex,
    active: bool,
    /// z 序中的位置，越大越靠上
    sibling_index: usize,
    /// 激活且无子面板的累计时长（秒）
    idle_time: f32,
    /// 最后一个面板在本帧内被移除，下一次空闲计时跳过本帧
    emptied: bool,
    children: Vec<PanelId>,
    scaler: CanvasScaler,
}

impl Layer {
    fn new(index: LayerIndex, sibling_index: usize, scaler: CanvasScaler) -> Self {
        Self {
            index,
            active: false,
            sibling_index,
            idle_time: 0.0,
            emptied: false,
            children: Vec::new(),
            scaler,
        }
    }

    pub fn index(&self) -> LayerIndex {
        self.index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sibling_index(&self) -> usize {
        self.sibling_index
    }

    pub fn idle_time(&self) -> f32 {
        self.idle_time
    }

    /// 挂在该图层下的面板（挂载顺序）
    pub fn children(&self) -> &[PanelId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn scaler(&self) -> &CanvasScaler {
        &self.scaler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_index_display() {
        assert_eq!(LayerIndex::new(3).to_string(), "LayerIndex(3)");
    }

    #[test]
    fn test_scaler_follows_config() {
        let config = LayeredUiConfig {
            reference_resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            scale_mode: ScaleMode::ConstantPixelSize,
            ..LayeredUiConfig::default()
        };
        let scaler = CanvasScaler::from_config(&config);
        assert_eq!(scaler.reference_resolution.width, 1920);
        assert_eq!(scaler.scale_mode, ScaleMode::ConstantPixelSize);

        let default = CanvasScaler::default();
        assert_eq!(default.reference_resolution.width, 2430);
        assert_eq!(default.scale_mode, ScaleMode::ScaleWithScreenSize);
    }
}
