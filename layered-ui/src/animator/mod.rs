//! # Animator 模块
//!
//! 面板的入场/退场动画器。
//!
//! ## 入场类型
//!
//! - [`EntranceType::Instant`]: 从放大状态缩回并淡入；退场时淡出
//! - [`EntranceType::Slide`]: 从右侧（自身宽度处）滑入；退场时滑回
//!
//! ## 状态机
//!
//! 每次调用：`Idle → Running(direction) → Complete(direction)`。
//!
//! - 同方向动画仍在播放时再次启动会被拒绝（[`PanelError::AnimationInFlight`]）
//! - 入场播放中启动退场：取消入场（不执行其完成回调），从当前值开始退场

mod instant;
mod slide;

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use instant::InstantAnimator;
pub use slide::SlideAnimator;

use crate::animation::{CancelToken, Completion, Scheduler};
use crate::config::AnimationConfig;
use crate::error::PanelError;
use crate::panel::{PanelId, SurfaceHandle};

/// 入场类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntranceType {
    /// 缩放 + 淡入
    #[default]
    Instant,
    /// 水平滑入
    Slide,
}

/// 动画方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationDirection {
    /// 入场
    Display,
    /// 退场
    Reverse,
}

/// 动画器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimatorState {
    #[default]
    Idle,
    Running(AnimationDirection),
    Complete(AnimationDirection),
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Instant(InstantAnimator),
    Slide(SlideAnimator),
}

/// 入场/退场动画器
///
/// 面板创建时按入场类型确定，之后不再改变。
#[derive(Debug)]
pub struct Animator {
    style: Style,
    state: Rc<Cell<AnimatorState>>,
    /// 当前调用的取消令牌
    token: Option<CancelToken>,
}

impl Animator {
    /// 按入场类型和动画配置创建
    pub fn new(entrance: EntranceType, config: &AnimationConfig) -> Self {
        let style = match entrance {
            EntranceType::Instant => Style::Instant(InstantAnimator::from_config(config)),
            EntranceType::Slide => Style::Slide(SlideAnimator::from_config(config)),
        };
        Self {
            style,
            state: Rc::new(Cell::new(AnimatorState::Idle)),
            token: None,
        }
    }

    pub fn entrance(&self) -> EntranceType {
        match self.style {
            Style::Instant(_) => EntranceType::Instant,
            Style::Slide(_) => EntranceType::Slide,
        }
    }

    pub fn state(&self) -> AnimatorState {
        self.state.get()
    }

    /// 是否有动画在播放
    pub fn is_running(&self) -> bool {
        matches!(self.state.get(), AnimatorState::Running(_))
    }

    /// 播放入场动画，结束后调用 `on_finished`
    pub fn display(
        &mut self,
        owner: PanelId,
        surface: &SurfaceHandle,
        scheduler: &mut Scheduler,
        on_finished: impl FnOnce(&mut Scheduler) + 'static,
    ) -> Result<(), PanelError> {
        if let AnimatorState::Running(direction) = self.state.get() {
            return Err(PanelError::AnimationInFlight {
                id: owner,
                direction,
            });
        }

        let token = self.begin(AnimationDirection::Display);
        let finish = self.finisher(AnimationDirection::Display, on_finished);
        debug!(panel = %owner, entrance = ?self.entrance(), "播放入场动画");

        match &self.style {
            Style::Instant(instant) => instant.display(surface, scheduler, &token, finish),
            Style::Slide(slide) => slide.display(surface, scheduler, &token, finish),
        }
        Ok(())
    }

    /// 播放退场动画，结束后调用 `on_finished`
    ///
    /// 入场仍在播放时会先取消入场，再从当前值开始退场。
    pub fn reverse(
        &mut self,
        owner: PanelId,
        surface: &SurfaceHandle,
        scheduler: &mut Scheduler,
        on_finished: impl FnOnce(&mut Scheduler) + 'static,
    ) -> Result<(), PanelError> {
        let interrupted = match self.state.get() {
            AnimatorState::Running(AnimationDirection::Reverse) => {
                return Err(PanelError::AnimationInFlight {
                    id: owner,
                    direction: AnimationDirection::Reverse,
                });
            }
            AnimatorState::Running(AnimationDirection::Display) => {
                debug!(panel = %owner, "中断入场动画");
                self.cancel_current();
                true
            }
            _ => false,
        };

        let token = self.begin(AnimationDirection::Reverse);
        let finish = self.finisher(AnimationDirection::Reverse, on_finished);
        debug!(panel = %owner, entrance = ?self.entrance(), interrupted, "播放退场动画");

        match &self.style {
            Style::Instant(instant) => {
                instant.reverse(surface, scheduler, &token, finish, interrupted)
            }
            Style::Slide(slide) => slide.reverse(surface, scheduler, &token, finish, interrupted),
        }
        Ok(())
    }

    /// 取消正在播放的动画，回到 Idle（不执行完成回调）
    pub fn cancel(&mut self) {
        self.cancel_current();
        self.state.set(AnimatorState::Idle);
    }

    fn cancel_current(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    fn begin(&mut self, direction: AnimationDirection) -> CancelToken {
        let token = CancelToken::new();
        self.token = Some(token.clone());
        self.state.set(AnimatorState::Running(direction));
        token
    }

    fn finisher(
        &self,
        direction: AnimationDirection,
        on_finished: impl FnOnce(&mut Scheduler) + 'static,
    ) -> Completion {
        let state = self.state.clone();
        Box::new(move |scheduler: &mut Scheduler| {
            state.set(AnimatorState::Complete(direction));
            on_finished(scheduler);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Size, Vec2};
    use crate::panel::PanelSurface;

    fn surface(width: f32) -> SurfaceHandle {
        SurfaceHandle::new(PanelSurface::new(Size::new(width, 300.0), true))
    }

    fn config() -> AnimationConfig {
        AnimationConfig {
            fade_duration: 0.25,
            slide_duration: 0.25,
            ..AnimationConfig::default()
        }
    }

    fn flag() -> (Rc<Cell<u32>>, impl FnOnce(&mut Scheduler) + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = count.clone();
        (count, move |_: &mut Scheduler| handle.set(handle.get() + 1))
    }

    #[test]
    fn test_same_direction_rejected_while_running() {
        let mut scheduler = Scheduler::new();
        let surface = surface(400.0);
        let mut animator = Animator::new(EntranceType::Slide, &config());
        let id = PanelId::new(1);

        animator.display(id, &surface, &mut scheduler, |_| {}).unwrap();
        let err = animator.display(id, &surface, &mut scheduler, |_| {}).unwrap_err();

        assert_eq!(
            err,
            PanelError::AnimationInFlight {
                id,
                direction: AnimationDirection::Display
            }
        );
    }

    #[test]
    fn test_state_machine_reaches_complete() {
        let mut scheduler = Scheduler::new();
        let surface = surface(400.0);
        let mut animator = Animator::new(EntranceType::Slide, &config());
        assert_eq!(animator.state(), AnimatorState::Idle);

        animator
            .display(PanelId::new(1), &surface, &mut scheduler, |_| {})
            .unwrap();
        assert_eq!(
            animator.state(),
            AnimatorState::Running(AnimationDirection::Display)
        );

        scheduler.tick(0.25);
        assert_eq!(
            animator.state(),
            AnimatorState::Complete(AnimationDirection::Display)
        );
        assert!(!animator.is_running());
    }

    #[test]
    fn test_reverse_interrupts_display() {
        let mut scheduler = Scheduler::new();
        let surface = surface(400.0);
        let mut animator = Animator::new(EntranceType::Slide, &config());
        let id = PanelId::new(1);
        let (shown, on_shown) = flag();
        let (closed, on_closed) = flag();

        animator.display(id, &surface, &mut scheduler, on_shown).unwrap();
        scheduler.tick(0.125);
        // 滑到一半
        assert_eq!(surface.anchored_position(), Vec2::new(200.0, 0.0));

        animator.reverse(id, &surface, &mut scheduler, on_closed).unwrap();
        // 从当前位置开始退场，不回到原点
        assert_eq!(surface.anchored_position(), Vec2::new(200.0, 0.0));

        scheduler.tick(0.125);
        assert_eq!(surface.anchored_position(), Vec2::new(300.0, 0.0));
        scheduler.tick(0.125);
        assert_eq!(surface.anchored_position(), Vec2::new(400.0, 0.0));

        assert_eq!(shown.get(), 0);
        assert_eq!(closed.get(), 1);
        assert_eq!(
            animator.state(),
            AnimatorState::Complete(AnimationDirection::Reverse)
        );
    }

    #[test]
    fn test_cancel_skips_callback() {
        let mut scheduler = Scheduler::new();
        let surface = surface(400.0);
        let mut animator = Animator::new(EntranceType::Instant, &config());
        let (shown, on_shown) = flag();

        animator
            .display(PanelId::new(1), &surface, &mut scheduler, on_shown)
            .unwrap();
        animator.cancel();
        for _ in 0..4 {
            scheduler.tick(0.125);
        }

        assert_eq!(shown.get(), 0);
        assert_eq!(animator.state(), AnimatorState::Idle);
        // 延迟任务被丢弃，透明度停在入场起点
        assert_eq!(surface.opacity(), 0.0);
    }

    #[test]
    fn test_entrance_type_serde() {
        let json = serde_json::to_string(&EntranceType::Slide).unwrap();
        assert_eq!(json, "\"slide\"");
        assert_eq!(EntranceType::default(), EntranceType::Instant);
    }
}
