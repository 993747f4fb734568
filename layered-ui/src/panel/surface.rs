//! # Surface 模块
//!
//! 面板的可动画表面：透明度组、本地缩放、本地偏移、锚定位置与尺寸。
//!
//! 表面通过 [`SurfaceHandle`] 共享，动画器用 [`SurfaceProperty`]
//! 访问其中的单个属性。

use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::PropertyAccessor;
use crate::geometry::{Size, Vec2};

/// 面板表面状态
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSurface {
    /// 是否带透明度组
    pub opacity_group: bool,
    /// 透明度 (0.0 - 1.0)
    pub opacity: f32,
    pub local_scale: Vec2,
    pub local_position: Vec2,
    /// 相对锚点的位置
    pub anchored_position: Vec2,
    pub size: Size,
}

impl PanelSurface {
    /// 创建处于默认变换的表面
    pub fn new(size: Size, opacity_group: bool) -> Self {
        Self {
            opacity_group,
            opacity: 1.0,
            local_scale: Vec2::ONE,
            local_position: Vec2::ZERO,
            anchored_position: Vec2::ZERO,
            size,
        }
    }
}

/// 共享的表面句柄
#[derive(Debug, Clone)]
pub struct SurfaceHandle(Rc<RefCell<PanelSurface>>);

impl SurfaceHandle {
    pub fn new(surface: PanelSurface) -> Self {
        Self(Rc::new(RefCell::new(surface)))
    }

    /// 当前状态的副本
    pub fn snapshot(&self) -> PanelSurface {
        self.0.borrow().clone()
    }

    pub fn opacity(&self) -> f32 {
        self.0.borrow().opacity
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.0.borrow_mut().opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn local_scale(&self) -> Vec2 {
        self.0.borrow().local_scale
    }

    pub fn set_local_scale(&self, scale: Vec2) {
        self.0.borrow_mut().local_scale = scale;
    }

    pub fn local_position(&self) -> Vec2 {
        self.0.borrow().local_position
    }

    pub fn anchored_position(&self) -> Vec2 {
        self.0.borrow().anchored_position
    }

    pub fn set_anchored_position(&self, position: Vec2) {
        self.0.borrow_mut().anchored_position = position;
    }

    pub fn size(&self) -> Size {
        self.0.borrow().size
    }

    pub fn has_opacity_group(&self) -> bool {
        self.0.borrow().opacity_group
    }

    /// 归一化变换：缩放 1，本地偏移 0
    pub fn normalize_transform(&self) {
        let mut surface = self.0.borrow_mut();
        surface.local_scale = Vec2::ONE;
        surface.local_position = Vec2::ZERO;
    }
}

/// 表面单个属性的访问器
///
/// 持有表面句柄和一对 getter/setter，交给 [`Scheduler`](crate::animation::Scheduler) 驱动。
pub struct SurfaceProperty<V> {
    surface: SurfaceHandle,
    get: fn(&PanelSurface) -> V,
    set: fn(&mut PanelSurface, V),
}

impl SurfaceProperty<f32> {
    /// 透明度
    pub fn opacity(surface: &SurfaceHandle) -> Self {
        Self {
            surface: surface.clone(),
            get: |s| s.opacity,
            set: |s, v| s.opacity = v.clamp(0.0, 1.0),
        }
    }
}

impl SurfaceProperty<Vec2> {
    /// 本地缩放
    pub fn local_scale(surface: &SurfaceHandle) -> Self {
        Self {
            surface: surface.clone(),
            get: |s| s.local_scale,
            set: |s, v| s.local_scale = v,
        }
    }

    /// 锚定位置
    pub fn anchored_position(surface: &SurfaceHandle) -> Self {
        Self {
            surface: surface.clone(),
            get: |s| s.anchored_position,
            set: |s, v| s.anchored_position = v,
        }
    }
}

impl<V> PropertyAccessor<V> for SurfaceProperty<V> {
    fn get(&self) -> V {
        (self.get)(&self.surface.0.borrow())
    }

    fn set(&mut self, value: V) {
        (self.set)(&mut self.surface.0.borrow_mut(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_property_writes_through_handle() {
        let handle = SurfaceHandle::new(PanelSurface::new(Size::new(400.0, 300.0), true));
        let mut position = SurfaceProperty::anchored_position(&handle);

        position.set(Vec2::new(400.0, 0.0));
        assert_eq!(handle.anchored_position(), Vec2::new(400.0, 0.0));
        assert_eq!(position.get(), Vec2::new(400.0, 0.0));

        let mut opacity = SurfaceProperty::opacity(&handle);
        opacity.set(1.5);
        // 透明度被限制在 [0, 1]
        assert_eq!(handle.opacity(), 1.0);
    }

    #[test]
    fn test_normalize_transform() {
        let handle = SurfaceHandle::new(PanelSurface::new(Size::new(100.0, 100.0), false));
        handle.set_local_scale(Vec2::splat(2.0));
        handle.set_anchored_position(Vec2::new(5.0, 5.0));

        handle.normalize_transform();

        let surface = handle.snapshot();
        assert_eq!(surface.local_scale, Vec2::ONE);
        assert_eq!(surface.local_position, Vec2::ZERO);
        // 锚定位置不受影响
        assert_eq!(surface.anchored_position, Vec2::new(5.0, 5.0));
        assert!(!handle.has_opacity_group());
    }
}
