//! # Tween 模块
//!
//! 单个值的时间轴插值。
//!
//! 核心设计：补间只关注值从 `from` 到 `to` 在 `duration` 内的变化，
//! 不关心值属于哪个对象。对象的读写由 [`PropertyAccessor`](super::PropertyAccessor) 负责。

use super::EasingFunction;
use crate::geometry::Vec2;

/// 可插值的值类型
pub trait Lerp: Copy {
    /// 线性插值，`t` 为 0.0 - 1.0
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec2::lerp(self, to, t)
    }
}

/// 补间状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenState {
    /// 尚未推进过
    #[default]
    Idle,
    /// 正在播放
    Running,
    /// 已完成（最终值已写出）
    Complete,
}

/// 补间实例
///
/// 每次 [`step`](Self::step) 推进一帧：
/// `fraction = clamp(elapsed / duration, 0, 1)`，`value = lerp(from, to, easing(fraction))`。
/// 当 `elapsed >= duration` 时返回精确的 `to`。
#[derive(Debug, Clone)]
pub struct Tween<V> {
    /// 起始值
    from: V,
    /// 目标值
    to: V,
    /// 动画时长（秒）
    duration: f32,
    /// 已经过的时间
    elapsed: f32,
    /// 缓动函数
    easing: EasingFunction,
    /// 当前状态
    state: TweenState,
}

impl<V: Lerp> Tween<V> {
    /// 创建新的补间
    ///
    /// `duration <= 0` 的补间在第一次推进（或 [`finish`](Self::finish)）时直接给出目标值。
    pub fn new(from: V, to: V, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            easing: EasingFunction::default(),
            state: TweenState::Idle,
        }
    }

    /// 设置缓动函数
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// 是否为零时长（立即完成）
    pub fn is_instant(&self) -> bool {
        self.duration <= 0.0
    }

    /// 推进一帧并返回本帧的值
    pub fn step(&mut self, dt: f32) -> V {
        if self.state == TweenState::Complete {
            return self.to;
        }

        self.elapsed += dt.max(0.0);
        if self.is_instant() || self.elapsed >= self.duration {
            return self.finish();
        }

        self.state = TweenState::Running;
        self.from.lerp(self.to, self.easing.apply(self.progress()))
    }

    /// 立即完成并返回目标值
    pub fn finish(&mut self) -> V {
        self.state = TweenState::Complete;
        self.to
    }

    /// 原始进度（0.0 - 1.0，未应用缓动）
    pub fn progress(&self) -> f32 {
        if self.is_instant() {
            return if self.state == TweenState::Complete { 1.0 } else { 0.0 };
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// 当前状态
    pub fn state(&self) -> TweenState {
        self.state
    }

    /// 是否已完成
    pub fn is_complete(&self) -> bool {
        self.state == TweenState::Complete
    }

    /// 起始值
    pub fn from(&self) -> V {
        self.from
    }

    /// 目标值
    pub fn to(&self) -> V {
        self.to
    }
}
