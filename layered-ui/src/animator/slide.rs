//! Slide 入场：从自身宽度处水平滑入，退场时滑回。

use crate::animation::{CancelToken, Completion, EasingFunction, Scheduler, Transition};
use crate::config::AnimationConfig;
use crate::geometry::Vec2;
use crate::panel::{SurfaceHandle, SurfaceProperty};

/// 水平滑动动画
///
/// 需要面板宽度为正（放置前由模板校验）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideAnimator {
    pub duration: f32,
    pub easing: EasingFunction,
}

impl SlideAnimator {
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            duration: config.slide_duration,
            easing: config.easing,
        }
    }

    fn offscreen(surface: &SurfaceHandle) -> Vec2 {
        Vec2::new(surface.size().width, 0.0)
    }

    /// 锚定位置置为 (宽度, 0)，滑到原点
    pub(super) fn display(
        &self,
        surface: &SurfaceHandle,
        scheduler: &mut Scheduler,
        token: &CancelToken,
        finish: Completion,
    ) {
        surface.set_anchored_position(Self::offscreen(surface));
        scheduler.start(
            Transition::new(
                SurfaceProperty::anchored_position(surface),
                Vec2::ZERO,
                self.duration,
            )
            .with_easing(self.easing)
            .with_token(token)
            .on_complete(finish),
        );
    }

    /// 锚定位置置为原点，滑回 (宽度, 0)
    ///
    /// `interrupted` 为 true 时从当前位置继续。
    pub(super) fn reverse(
        &self,
        surface: &SurfaceHandle,
        scheduler: &mut Scheduler,
        token: &CancelToken,
        finish: Completion,
        interrupted: bool,
    ) {
        if !interrupted {
            surface.set_anchored_position(Vec2::ZERO);
        }
        scheduler.start(
            Transition::new(
                SurfaceProperty::anchored_position(surface),
                Self::offscreen(surface),
                self.duration,
            )
            .with_easing(self.easing)
            .with_token(token)
            .on_complete(finish),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::panel::PanelSurface;
    use std::cell::Cell;
    use std::rc::Rc;

    fn slide(duration: f32) -> SlideAnimator {
        SlideAnimator {
            duration,
            easing: EasingFunction::Linear,
        }
    }

    fn surface() -> SurfaceHandle {
        SurfaceHandle::new(PanelSurface::new(Size::new(400.0, 300.0), false))
    }

    #[test]
    fn test_display_slides_in_from_width() {
        let surface = surface();
        let mut scheduler = Scheduler::new();
        let done = Rc::new(Cell::new(0));
        let handle = done.clone();

        slide(0.25).display(
            &surface,
            &mut scheduler,
            &CancelToken::new(),
            Box::new(move |_: &mut Scheduler| handle.set(handle.get() + 1)),
        );
        assert_eq!(surface.anchored_position(), Vec2::new(400.0, 0.0));

        scheduler.tick(0.125);
        assert_eq!(surface.anchored_position(), Vec2::new(200.0, 0.0));

        scheduler.tick(0.125);
        assert_eq!(surface.anchored_position(), Vec2::ZERO);
        // 入场结束时完成回调恰好执行一次
        assert_eq!(done.get(), 1);

        scheduler.tick(0.125);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn test_reverse_slides_out() {
        let surface = surface();
        let mut scheduler = Scheduler::new();
        let done = Rc::new(Cell::new(false));
        let handle = done.clone();

        slide(0.25).reverse(
            &surface,
            &mut scheduler,
            &CancelToken::new(),
            Box::new(move |_: &mut Scheduler| handle.set(true)),
            false,
        );
        scheduler.tick(0.25);

        assert_eq!(surface.anchored_position(), Vec2::new(400.0, 0.0));
        assert!(done.get());
    }

    #[test]
    fn test_zero_duration_finishes_synchronously() {
        let surface = surface();
        let mut scheduler = Scheduler::new();
        let done = Rc::new(Cell::new(false));
        let handle = done.clone();

        slide(0.0).display(
            &surface,
            &mut scheduler,
            &CancelToken::new(),
            Box::new(move |_: &mut Scheduler| handle.set(true)),
        );

        assert_eq!(surface.anchored_position(), Vec2::ZERO);
        assert!(done.get());
        assert!(!scheduler.has_pending());
    }
}
