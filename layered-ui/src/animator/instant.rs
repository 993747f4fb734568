//! Instant 入场：从放大状态缩回并淡入，退场时淡出。

use crate::animation::{CancelToken, Completion, EasingFunction, Scheduler, Transition};
use crate::config::AnimationConfig;
use crate::geometry::Vec2;
use crate::panel::{SurfaceHandle, SurfaceProperty};

/// 缩放 + 淡入动画
///
/// 需要面板带透明度组（放置前由模板校验）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstantAnimator {
    pub fade_duration: f32,
    pub entrance_scale: f32,
    pub easing: EasingFunction,
}

impl InstantAnimator {
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            fade_duration: config.fade_duration,
            entrance_scale: config.entrance_scale,
            easing: config.easing,
        }
    }

    /// 透明度置 0、缩放置为入场倍数，下一帧开始同时缩回 1 并淡入。
    ///
    /// 以透明度过渡的完成为结束信号，不等待缩放。
    pub(super) fn display(
        &self,
        surface: &SurfaceHandle,
        scheduler: &mut Scheduler,
        token: &CancelToken,
        finish: Completion,
    ) {
        surface.set_opacity(0.0);
        surface.set_local_scale(Vec2::splat(self.entrance_scale));

        let settings = *self;
        let surface = surface.clone();
        let guard = token.clone();
        scheduler.defer_guarded(token, move |scheduler| {
            scheduler.start(
                Transition::new(
                    SurfaceProperty::local_scale(&surface),
                    Vec2::ONE,
                    settings.fade_duration,
                )
                .with_easing(settings.easing)
                .with_token(&guard),
            );
            scheduler.start(
                Transition::new(SurfaceProperty::opacity(&surface), 1.0, settings.fade_duration)
                    .with_easing(settings.easing)
                    .with_token(&guard)
                    .on_complete(finish),
            );
        });
    }

    /// 透明度置 1，下一帧开始淡出。
    ///
    /// `interrupted` 为 true 时保留当前透明度，从中途继续。
    pub(super) fn reverse(
        &self,
        surface: &SurfaceHandle,
        scheduler: &mut Scheduler,
        token: &CancelToken,
        finish: Completion,
        interrupted: bool,
    ) {
        if !interrupted {
            surface.set_opacity(1.0);
        }

        let settings = *self;
        let surface = surface.clone();
        let guard = token.clone();
        scheduler.defer_guarded(token, move |scheduler| {
            scheduler.start(
                Transition::new(SurfaceProperty::opacity(&surface), 0.0, settings.fade_duration)
                    .with_easing(settings.easing)
                    .with_token(&guard)
                    .on_complete(finish),
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationEvent;
    use crate::geometry::Size;
    use crate::panel::PanelSurface;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() -> (InstantAnimator, SurfaceHandle, Scheduler) {
        let animator = InstantAnimator {
            fade_duration: 0.25,
            entrance_scale: 1.5,
            easing: EasingFunction::Linear,
        };
        let surface = SurfaceHandle::new(PanelSurface::new(Size::new(400.0, 300.0), true));
        (animator, surface, Scheduler::new())
    }

    fn finished() -> (Rc<Cell<bool>>, Completion) {
        let done = Rc::new(Cell::new(false));
        let handle = done.clone();
        (done, Box::new(move |_: &mut Scheduler| handle.set(true)))
    }

    #[test]
    fn test_display_waits_one_tick_then_fades_in() {
        let (animator, surface, mut scheduler) = setup();
        let (done, finish) = finished();

        animator.display(&surface, &mut scheduler, &CancelToken::new(), finish);

        // 立即写入起始值
        assert_eq!(surface.opacity(), 0.0);
        assert_eq!(surface.local_scale(), Vec2::splat(1.5));

        // 第一帧只启动过渡，数值不变
        scheduler.tick(0.125);
        assert_eq!(surface.opacity(), 0.0);
        assert_eq!(scheduler.active_count(), 2);

        scheduler.tick(0.125);
        assert_eq!(surface.opacity(), 0.5);
        assert_eq!(surface.local_scale(), Vec2::splat(1.25));
        assert!(!done.get());

        scheduler.tick(0.125);
        assert_eq!(surface.opacity(), 1.0);
        assert_eq!(surface.local_scale(), Vec2::ONE);
        assert!(done.get());
    }

    #[test]
    fn test_reverse_fades_out() {
        let (animator, surface, mut scheduler) = setup();
        let (done, finish) = finished();
        surface.set_opacity(0.3);

        animator.reverse(&surface, &mut scheduler, &CancelToken::new(), finish, false);
        assert_eq!(surface.opacity(), 1.0);

        scheduler.tick(0.125);
        scheduler.tick(0.125);
        assert_eq!(surface.opacity(), 0.5);

        let events = scheduler.tick(0.125);
        assert_eq!(surface.opacity(), 0.0);
        assert!(done.get());
        assert!(
            events
                .iter()
                .any(|event| matches!(event, AnimationEvent::Completed(_)))
        );
    }

    #[test]
    fn test_interrupted_reverse_keeps_current_opacity() {
        let (animator, surface, mut scheduler) = setup();
        let (_done, finish) = finished();
        surface.set_opacity(0.5);

        animator.reverse(&surface, &mut scheduler, &CancelToken::new(), finish, true);
        assert_eq!(surface.opacity(), 0.5);

        scheduler.tick(0.125);
        scheduler.tick(0.125);
        assert_eq!(surface.opacity(), 0.25);
    }
}
