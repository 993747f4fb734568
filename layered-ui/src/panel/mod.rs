//! # Panel 模块
//!
//! 面板：挂在某个图层下、带入场/退场动画的 UI 单元。
//!
//! ## 生命周期
//!
//! ```text
//! instantiate → setup(id) → display ─(入场完成)→ Shown
//!                                 └─ close ─(退场完成)→ 由服务销毁
//! ```
//!
//! 面板本身不持有服务的引用：动画结束时通过回调通知调用方。

mod surface;
mod template;

use std::fmt;

use serde::Serialize;
use tracing::debug;

pub use surface::{PanelSurface, SurfaceHandle, SurfaceProperty};
pub use template::{EmptyContent, PanelContent, PanelTemplate};

use crate::animation::Scheduler;
use crate::animator::{Animator, AnimatorState, EntranceType};
use crate::config::AnimationConfig;
use crate::error::PanelError;
use crate::layer::LayerIndex;

/// 面板 ID
///
/// 由服务按计数器分配，从 1 开始，0 表示尚未绑定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PanelId(u64);

impl PanelId {
    /// 尚未绑定的 ID
    pub const UNBOUND: Self = Self(0);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PanelId({})", self.0)
    }
}

/// 面板阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPhase {
    /// 入场动画播放中
    #[default]
    Entering,
    /// 入场完成
    Shown,
    /// 退场动画播放中
    Closing,
}

/// 面板实例
pub struct Panel {
    id: PanelId,
    name: String,
    layer: LayerIndex,
    surface: SurfaceHandle,
    animator: Animator,
    /// 首次入场时记录，退场时按同一类型反向播放
    entrance: Option<EntranceType>,
    phase: PanelPhase,
    content: Box<dyn PanelContent>,
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("layer", &self.layer)
            .field("entrance", &self.entrance)
            .field("phase", &self.phase)
            .field("animator", &self.animator.state())
            .finish_non_exhaustive()
    }
}

impl Panel {
    /// 按模板在指定图层下实例化面板
    ///
    /// 模板缺少入场所需能力时返回错误。变换被归一化（缩放 1，本地偏移 0）。
    pub fn instantiate(
        template: &PanelTemplate,
        entrance: EntranceType,
        layer: LayerIndex,
        animation: &AnimationConfig,
    ) -> Result<Self, PanelError> {
        template.validate(entrance)?;

        let surface = SurfaceHandle::new(PanelSurface::new(
            template.size(),
            template.has_opacity_group(),
        ));
        surface.normalize_transform();

        Ok(Self {
            id: PanelId::UNBOUND,
            name: template.name().to_string(),
            layer,
            surface,
            animator: Animator::new(entrance, animation),
            entrance: None,
            phase: PanelPhase::default(),
            content: template.create_content(),
        })
    }

    /// 绑定 ID 并调用内容的初始化钩子
    pub fn setup(&mut self, id: PanelId) -> Result<(), PanelError> {
        self.id = id;
        self.content.on_setup(id)
    }

    /// 播放入场动画
    pub fn display(
        &mut self,
        scheduler: &mut Scheduler,
        on_finished: impl FnOnce(&mut Scheduler) + 'static,
    ) -> Result<(), PanelError> {
        self.animator
            .display(self.id, &self.surface, scheduler, on_finished)?;
        self.entrance.get_or_insert(self.animator.entrance());
        self.phase = PanelPhase::Entering;
        Ok(())
    }

    /// 按入场类型反向播放退场动画，结束后调用 `on_close`
    pub fn close(
        &mut self,
        scheduler: &mut Scheduler,
        on_close: impl FnOnce(&mut Scheduler) + 'static,
    ) -> Result<(), PanelError> {
        self.animator
            .reverse(self.id, &self.surface, scheduler, on_close)?;
        self.phase = PanelPhase::Closing;
        debug!(panel = %self.id, name = %self.name, "面板开始退场");
        Ok(())
    }

    /// 入场完成
    pub(crate) fn mark_shown(&mut self) {
        if self.phase == PanelPhase::Entering {
            self.phase = PanelPhase::Shown;
            self.content.on_displayed();
        }
    }

    /// 销毁前的收尾：停止动画并通知内容
    pub(crate) fn teardown(&mut self) {
        if self.animator.is_running() {
            self.animator.cancel();
        }
        self.content.on_closed();
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 所在图层
    pub fn layer(&self) -> LayerIndex {
        self.layer
    }

    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    /// 实际使用的入场类型（尚未入场时为 None）
    pub fn entrance(&self) -> Option<EntranceType> {
        self.entrance
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn animator_state(&self) -> AnimatorState {
        self.animator.state()
    }

    pub fn content(&self) -> &dyn PanelContent {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> &mut dyn PanelContent {
        self.content.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Size, Vec2};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn config() -> AnimationConfig {
        AnimationConfig {
            fade_duration: 0.25,
            slide_duration: 0.25,
            ..AnimationConfig::default()
        }
    }

    #[test]
    fn test_panel_id_display() {
        assert_eq!(PanelId::new(42).to_string(), "PanelId(42)");
        assert_eq!(PanelId::UNBOUND.value(), 0);
    }

    #[test]
    fn test_instantiate_rejects_missing_capability() {
        let template = PanelTemplate::new("toast", Size::new(300.0, 80.0)).without_opacity_group();

        let result = Panel::instantiate(
            &template,
            EntranceType::Instant,
            LayerIndex::new(0),
            &config(),
        );

        assert!(matches!(
            result,
            Err(PanelError::MissingCapability { .. })
        ));
    }

    #[test]
    fn test_setup_binds_id_and_propagates_failure() {
        struct Failing;
        impl PanelContent for Failing {
            fn on_setup(&mut self, _id: PanelId) -> Result<(), PanelError> {
                Err(PanelError::SetupFailed {
                    panel: "broken".to_string(),
                    message: "缺少资源".to_string(),
                })
            }
        }

        let template = PanelTemplate::new("broken", Size::new(100.0, 100.0)).with_content(|| Failing);
        let mut panel =
            Panel::instantiate(&template, EntranceType::Instant, LayerIndex::new(0), &config())
                .unwrap();

        assert!(panel.setup(PanelId::new(3)).is_err());
        assert_eq!(panel.id(), PanelId::new(3));
    }

    #[test]
    fn test_display_then_close_replays_entrance() {
        let template = PanelTemplate::new("drawer", Size::new(400.0, 300.0));
        let mut panel =
            Panel::instantiate(&template, EntranceType::Slide, LayerIndex::new(1), &config())
                .unwrap();
        panel.setup(PanelId::new(1)).unwrap();
        let mut scheduler = Scheduler::new();

        assert_eq!(panel.entrance(), None);
        panel.display(&mut scheduler, |_| {}).unwrap();
        assert_eq!(panel.entrance(), Some(EntranceType::Slide));
        assert_eq!(panel.phase(), PanelPhase::Entering);

        scheduler.tick(0.25);
        panel.mark_shown();
        assert_eq!(panel.phase(), PanelPhase::Shown);

        let closed = Rc::new(Cell::new(false));
        let handle = closed.clone();
        panel
            .close(&mut scheduler, move |_| handle.set(true))
            .unwrap();
        assert_eq!(panel.phase(), PanelPhase::Closing);

        scheduler.tick(0.25);
        assert!(closed.get());
        assert_eq!(panel.surface().anchored_position(), Vec2::new(400.0, 0.0));
    }

    #[test]
    fn test_content_hooks() {
        struct Journal(Rc<RefCell<Vec<&'static str>>>);
        impl PanelContent for Journal {
            fn on_setup(&mut self, _id: PanelId) -> Result<(), PanelError> {
                self.0.borrow_mut().push("setup");
                Ok(())
            }
            fn on_displayed(&mut self) {
                self.0.borrow_mut().push("displayed");
            }
            fn on_closed(&mut self) {
                self.0.borrow_mut().push("closed");
            }
        }

        let journal = Rc::new(RefCell::new(Vec::new()));
        let handle = journal.clone();
        let template = PanelTemplate::new("menu", Size::new(200.0, 100.0))
            .with_content(move || Journal(handle.clone()));
        let mut panel =
            Panel::instantiate(&template, EntranceType::Instant, LayerIndex::new(0), &config())
                .unwrap();

        panel.setup(PanelId::new(1)).unwrap();
        panel.mark_shown();
        // 重复通知只生效一次
        panel.mark_shown();
        panel.teardown();

        assert_eq!(*journal.borrow(), vec!["setup", "displayed", "closed"]);
    }
}
