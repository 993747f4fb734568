//! # Layered UI
//!
//! 分层 UI 管理库：把面板放到一组顶层绘制层（图层）上，负责图层池分配、
//! 面板生命周期和入场/退场过渡动画。
//!
//! ## 架构概述
//!
//! `layered-ui` 不做像素渲染。它维护图层与面板的逻辑状态，通过
//! [`Compositor`] 把状态变化交给真正的渲染后端：
//!
//! ```text
//! Host                              LayeredUiService
//!   │                                      │
//!   │──── use_canvas / close ────────────►│
//!   │                                      │ update(dt)
//!   │◄─── Vec<UiEvent> ───────────────────│
//!   │                                      │
//!   │◄─── Compositor 调用（创建/激活/排序图层，挂载/销毁面板）
//! ```
//!
//! ## 核心类型
//!
//! - [`LayeredUiService`]：对外入口，放置/查询/关闭面板，逐帧推进
//! - [`PanelTemplate`]：面板模板，声明尺寸、能力和内容工厂
//! - [`EntranceType`]：入场类型（Instant / Slide）
//! - [`LayerPool`]：图层池，懒创建、空闲自动隐藏
//! - [`Scheduler`]：协作式逐帧动画调度器
//!
//! ## 使用示例
//!
//! ```ignore
//! use layered_ui::{EntranceType, LayeredUiConfig, LayeredUiService, PanelTemplate, Size};
//!
//! let mut ui = LayeredUiService::new(LayeredUiConfig::default())?;
//! let menu = PanelTemplate::new("menu", Size::new(400.0, 300.0));
//!
//! let id = ui.use_canvas(&menu, EntranceType::Slide)?;
//!
//! // 主循环
//! loop {
//!     for event in ui.update(dt) {
//!         // 处理 PanelShown / PanelClosed / LayerDeactivated
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`animation`]：补间、缓动和调度器
//! - [`animator`]：面板入场/退场动画
//! - [`panel`]：面板、表面与模板
//! - [`layer`]：图层、图层池与合成后端接口
//! - [`service`]：分层 UI 服务
//! - [`config`]：配置
//! - [`error`]：错误类型定义

pub mod animation;
pub mod animator;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod panel;
pub mod service;

// 重导出核心类型
pub use animation::{CancelToken, EasingFunction, Scheduler, SharedValue, Transition};
pub use animator::{AnimationDirection, Animator, AnimatorState, EntranceType};
pub use config::{AnimationConfig, ConfigError, LayeredUiConfig, Resolution, ScaleMode};
pub use error::{LayerError, PanelError, UiError, UiResult};
pub use geometry::{Size, Vec2};
pub use layer::{
    AllocationStrategy, CanvasScaler, Compositor, CompositorLog, CompositorOp, Layer, LayerIndex,
    LayerPool, NullCompositor, RecordingCompositor,
};
pub use panel::{
    EmptyContent, Panel, PanelContent, PanelId, PanelPhase, PanelSurface, PanelTemplate,
    SurfaceHandle,
};
pub use service::{LayeredUiService, UiEvent};
