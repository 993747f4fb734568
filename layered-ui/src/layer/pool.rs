//! # Pool 模块
//!
//! 图层池：按槽位保存全部图层，另外维护一份 z 序列表。
//!
//! ## 职责
//!
//! - 查找或创建未激活图层（容量受 `max_layers` 限制）
//! - 查询最上层的激活图层
//! - 空闲监视：激活但无子面板的图层超过宽限期后被隐藏
//! - 所有状态变化同步给 [`Compositor`]

use std::cmp::Reverse;

use tracing::{debug, info, warn};

use super::{CanvasScaler, Compositor, Layer, LayerIndex, NullCompositor};
use crate::config::LayeredUiConfig;
use crate::error::LayerError;
use crate::panel::PanelId;

/// 一次图层分配的结果
///
/// 面板放置失败时据此回滚：只有本次分配激活的图层才会被重新隐藏。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub index: LayerIndex,
    /// 本次分配新建了图层
    pub created: bool,
    /// 本次分配把图层从隐藏变为激活
    pub activated: bool,
}

impl Allocation {
    fn existing(index: LayerIndex) -> Self {
        Self {
            index,
            created: false,
            activated: false,
        }
    }
}

/// 图层池
pub struct LayerPool {
    /// 按创建顺序排列
    layers: Vec<Layer>,
    /// 从下到上的绘制顺序
    z_order: Vec<LayerIndex>,
    scaler: CanvasScaler,
    max_layers: usize,
    idle_timeout: f32,
    compositor: Box<dyn Compositor>,
}

impl std::fmt::Debug for LayerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerPool")
            .field("layers", &self.layers)
            .field("z_order", &self.z_order)
            .field("max_layers", &self.max_layers)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl LayerPool {
    /// 创建空的图层池
    pub fn new(config: &LayeredUiConfig, compositor: Box<dyn Compositor>) -> Self {
        Self {
            layers: Vec::new(),
            z_order: Vec::new(),
            scaler: CanvasScaler::from_config(config),
            max_layers: config.max_layers,
            idle_timeout: config.layer_idle_timeout,
            compositor,
        }
    }

    /// 使用空后端创建
    pub fn headless(config: &LayeredUiConfig) -> Self {
        Self::new(config, Box::new(NullCompositor))
    }

    // ========== 分配 ==========

    /// 返回池中第一个未激活的图层；没有则新建一个
    ///
    /// 新建的图层默认激活，`start_inactive` 为 true 时保持隐藏。
    pub fn find_or_create_inactive(
        &mut self,
        start_inactive: bool,
    ) -> Result<Allocation, LayerError> {
        if let Some(layer) = self.layers.iter().find(|layer| !layer.active) {
            return Ok(Allocation::existing(layer.index));
        }

        let index = self.create_layer(!start_inactive)?;
        Ok(Allocation {
            index,
            created: true,
            activated: !start_inactive,
        })
    }

    /// 返回 z 序最靠上的激活图层
    ///
    /// - 池为空：新建一个激活图层
    /// - 没有激活图层：激活 0 号槽位
    pub fn topmost_active(&mut self) -> Result<Allocation, LayerError> {
        if self.layers.is_empty() {
            let index = self.create_layer(true)?;
            return Ok(Allocation {
                index,
                created: true,
                activated: true,
            });
        }

        let topmost = self
            .layers
            .iter()
            .filter(|layer| layer.active)
            .max_by_key(|layer| (layer.sibling_index, Reverse(layer.index)))
            .map(|layer| layer.index);

        match topmost {
            Some(index) => Ok(Allocation::existing(index)),
            None => {
                let index = LayerIndex::new(0);
                self.apply_active(index, true);
                Ok(Allocation {
                    index,
                    created: false,
                    activated: true,
                })
            }
        }
    }

    fn create_layer(&mut self, active: bool) -> Result<LayerIndex, LayerError> {
        if self.layers.len() >= self.max_layers {
            warn!(capacity = self.max_layers, "图层池已满，无法创建新图层");
            return Err(LayerError::PoolExhausted {
                capacity: self.max_layers,
            });
        }

        let index = LayerIndex::new(self.layers.len());
        self.compositor.create_layer(index, &self.scaler);

        let sibling_index = self.z_order.len();
        self.z_order.push(index);
        self.layers.push(Layer::new(index, sibling_index, self.scaler));

        info!(layer = %index, sibling_index, active, "创建图层");
        self.compositor.set_layer_active(index, active);
        if let Some(layer) = self.layers.get_mut(index.value()) {
            layer.active = active;
        }
        Ok(index)
    }

    // ========== 状态 ==========

    /// 激活图层，返回状态是否发生变化
    pub fn activate(&mut self, index: LayerIndex) -> Result<bool, LayerError> {
        self.check(index)?;
        Ok(self.apply_active(index, true))
    }

    /// 把图层移到 z 序最上方
    ///
    /// 被移动的图层和原先在它上方、因此下移一位的图层都会通知后端，
    /// 按新的兄弟顺序从下到上发送。
    pub fn bring_to_front(&mut self, index: LayerIndex) -> Result<(), LayerError> {
        self.check(index)?;
        if self.z_order.last() == Some(&index) {
            return Ok(());
        }

        self.z_order.retain(|other| *other != index);
        self.z_order.push(index);
        debug!(layer = %index, sibling_index = self.z_order.len() - 1, "图层移到最前");
        self.sync_sibling_indices();
        Ok(())
    }

    /// 按 `z_order` 重写兄弟顺序，只通知发生变化的图层
    fn sync_sibling_indices(&mut self) {
        for (sibling_index, layer_index) in self.z_order.iter().enumerate() {
            let Some(layer) = self.layers.get_mut(layer_index.value()) else {
                continue;
            };
            if layer.sibling_index != sibling_index {
                layer.sibling_index = sibling_index;
                self.compositor.set_layer_order(*layer_index, sibling_index);
            }
        }
    }

    /// 隐藏全部激活图层，返回被隐藏的图层
    ///
    /// 调用方需先移走所有面板。
    pub fn hide_all(&mut self) -> Vec<LayerIndex> {
        let active: Vec<LayerIndex> = self
            .layers
            .iter()
            .filter(|layer| layer.active)
            .map(|layer| layer.index)
            .collect();

        for index in &active {
            let children = self.layer(*index).map_or(0, Layer::child_count);
            if children > 0 {
                warn!(layer = %index, children, "隐藏仍有面板的图层");
            }
            self.apply_active(*index, false);
        }
        active
    }

    /// 放置失败时回滚：本次分配激活的图层若仍为空则重新隐藏
    pub fn deactivate_if_unused(&mut self, allocation: &Allocation) -> Result<bool, LayerError> {
        let layer = self.get(allocation.index)?;
        if !allocation.activated || !layer.children.is_empty() {
            return Ok(false);
        }

        debug!(layer = %allocation.index, "回滚图层激活");
        Ok(self.apply_active(allocation.index, false))
    }

    fn apply_active(&mut self, index: LayerIndex, active: bool) -> bool {
        let Some(layer) = self.layers.get_mut(index.value()) else {
            return false;
        };
        if layer.active == active {
            return false;
        }

        layer.active = active;
        layer.idle_time = 0.0;
        layer.emptied = false;
        self.compositor.set_layer_active(index, active);
        true
    }

    // ========== 子面板 ==========

    /// 把面板挂到图层下，重置空闲计时
    pub fn attach(&mut self, index: LayerIndex, panel: PanelId) -> Result<(), LayerError> {
        let layer = self.get_mut(index)?;
        debug_assert!(layer.active, "面板只能挂到激活的图层");
        layer.children.push(panel);
        layer.idle_time = 0.0;
        layer.emptied = false;
        self.compositor.attach_panel(index, panel);
        Ok(())
    }

    /// 从图层移除并销毁面板，返回面板是否存在
    pub fn detach(&mut self, index: LayerIndex, panel: PanelId) -> Result<bool, LayerError> {
        let layer = self.get_mut(index)?;
        let Some(position) = layer.children.iter().position(|child| *child == panel) else {
            return Ok(false);
        };
        layer.children.remove(position);
        if layer.children.is_empty() {
            layer.emptied = true;
        }
        self.compositor.destroy_panel(index, panel);
        Ok(true)
    }

    // ========== 空闲监视 ==========

    /// 推进空闲计时，返回本帧被隐藏的图层
    ///
    /// 自上次 tick 以来才变空的图层不计入这一段 `dt`：
    /// 宽限期从它变空之后的下一帧开始算。
    pub fn tick(&mut self, dt: f32) -> Vec<LayerIndex> {
        let dt = dt.max(0.0);
        let mut expired = Vec::new();

        for layer in self.layers.iter_mut().filter(|layer| layer.active) {
            if layer.emptied {
                layer.emptied = false;
                layer.idle_time = 0.0;
            } else if layer.children.is_empty() {
                layer.idle_time += dt;
                if layer.idle_time >= self.idle_timeout {
                    expired.push(layer.index);
                }
            } else {
                layer.idle_time = 0.0;
            }
        }

        for index in &expired {
            debug!(layer = %index, "空闲图层已隐藏");
            self.apply_active(*index, false);
        }
        expired
    }

    // ========== 查询 ==========

    fn check(&self, index: LayerIndex) -> Result<(), LayerError> {
        self.get(index).map(|_| ())
    }

    fn get(&self, index: LayerIndex) -> Result<&Layer, LayerError> {
        self.layers
            .get(index.value())
            .ok_or(LayerError::InvalidIndex { index })
    }

    fn get_mut(&mut self, index: LayerIndex) -> Result<&mut Layer, LayerError> {
        self.layers
            .get_mut(index.value())
            .ok_or(LayerError::InvalidIndex { index })
    }

    pub fn layer(&self, index: LayerIndex) -> Option<&Layer> {
        self.layers.get(index.value())
    }

    /// 全部图层（创建顺序）
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// 从下到上的绘制顺序
    pub fn z_order(&self) -> &[LayerIndex] {
        &self.z_order
    }

    pub fn sibling_index(&self, index: LayerIndex) -> Option<usize> {
        self.layer(index).map(Layer::sibling_index)
    }

    pub fn active_count(&self) -> usize {
        self.layers.iter().filter(|layer| layer.active).count()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_layers
    }

    /// 恢复初始状态（测试用的重新初始化）
    ///
    /// 图层在后端已经存在，因此保留槽位：全部隐藏、清零空闲计时，
    /// z 序恢复为创建顺序。调用前应先移走所有面板。
    pub fn reset(&mut self) {
        self.hide_all();
        for layer in &mut self.layers {
            layer.idle_time = 0.0;
            layer.emptied = false;
        }
        self.z_order = self.layers.iter().map(|layer| layer.index).collect();
        self.sync_sibling_indices();
    }
}
