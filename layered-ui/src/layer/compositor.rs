//! # Compositor 模块
//!
//! 渲染/合成后端接口。图层池只通过这几个调用驱动真正的绘制层，
//! 像素级渲染不在本 crate 中。

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use super::{CanvasScaler, LayerIndex};
use crate::panel::PanelId;

/// 合成后端接口
pub trait Compositor {
    /// 创建一个新的绘制层
    fn create_layer(&mut self, layer: LayerIndex, scaler: &CanvasScaler);

    /// 激活/隐藏绘制层
    fn set_layer_active(&mut self, layer: LayerIndex, active: bool);

    /// 设置绘制层的兄弟顺序（越大越靠上）
    ///
    /// `sibling_index` 是绝对位置。顺序变化时，位置改变的每个图层都会收到一次调用，
    /// 按新顺序从下到上发送。
    fn set_layer_order(&mut self, layer: LayerIndex, sibling_index: usize);

    /// 把面板挂到绘制层下
    fn attach_panel(&mut self, layer: LayerIndex, panel: PanelId);

    /// 销毁面板的后端对象
    fn destroy_panel(&mut self, layer: LayerIndex, panel: PanelId);
}

/// 不做任何事的后端（默认）
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCompositor;

impl Compositor for NullCompositor {
    fn create_layer(&mut self, _layer: LayerIndex, _scaler: &CanvasScaler) {}

    fn set_layer_active(&mut self, _layer: LayerIndex, _active: bool) {}

    fn set_layer_order(&mut self, _layer: LayerIndex, _sibling_index: usize) {}

    fn attach_panel(&mut self, _layer: LayerIndex, _panel: PanelId) {}

    fn destroy_panel(&mut self, _layer: LayerIndex, _panel: PanelId) {}
}

/// 一次后端调用的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CompositorOp {
    /// 创建绘制层
    CreateLayer { layer: usize, width: u32, height: u32 },
    /// 激活/隐藏
    SetActive { layer: usize, active: bool },
    /// 调整顺序
    SetOrder { layer: usize, sibling: usize },
    /// 挂载面板
    Attach { layer: usize, panel: u64 },
    /// 销毁面板
    Destroy { layer: usize, panel: u64 },
}

/// 记录日志的共享句柄
#[derive(Debug, Clone, Default)]
pub struct CompositorLog(Rc<RefCell<Vec<CompositorOp>>>);

impl CompositorLog {
    /// 已记录的全部调用
    pub fn ops(&self) -> Vec<CompositorOp> {
        self.0.borrow().clone()
    }

    /// 取出并清空记录
    pub fn drain(&self) -> Vec<CompositorOp> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    fn push(&self, op: CompositorOp) {
        self.0.borrow_mut().push(op);
    }
}

/// 无头后端：记录每一次调用，供测试和模拟器使用
#[derive(Debug, Clone, Default)]
pub struct RecordingCompositor {
    log: CompositorLog,
}

impl RecordingCompositor {
    /// 创建新的记录后端
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取共享的调用记录
    pub fn log(&self) -> CompositorLog {
        self.log.clone()
    }
}

impl Compositor for RecordingCompositor {
    fn create_layer(&mut self, layer: LayerIndex, scaler: &CanvasScaler) {
        self.log.push(CompositorOp::CreateLayer {
            layer: layer.value(),
            width: scaler.reference_resolution.width,
            height: scaler.reference_resolution.height,
        });
    }

    fn set_layer_active(&mut self, layer: LayerIndex, active: bool) {
        self.log.push(CompositorOp::SetActive {
            layer: layer.value(),
            active,
        });
    }

    fn set_layer_order(&mut self, layer: LayerIndex, sibling_index: usize) {
        self.log.push(CompositorOp::SetOrder {
            layer: layer.value(),
            sibling: sibling_index,
        });
    }

    fn attach_panel(&mut self, layer: LayerIndex, panel: PanelId) {
        self.log.push(CompositorOp::Attach {
            layer: layer.value(),
            panel: panel.value(),
        });
    }

    fn destroy_panel(&mut self, layer: LayerIndex, panel: PanelId) {
        self.log.push(CompositorOp::Destroy {
            layer: layer.value(),
            panel: panel.value(),
        });
    }
}
