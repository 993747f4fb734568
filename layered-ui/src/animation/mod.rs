//! # Animation 模块
//!
//! 过渡原语：把一个标量或向量属性在给定时长内驱动到目标值。
//!
//! ## 核心设计理念
//!
//! 动画系统只负责 **时间轴管理**：
//! - 知道某个属性从 A 到 B 需要在 duration 内变化
//! - 每帧通过 [`PropertyAccessor`] 写入插值结果
//! - **不假设对象类型**，对象自己决定如何使用这些值
//!
//! ## 核心概念
//!
//! - [`Tween`]: 单个值的补间，纯计算
//! - [`Transition`]: 启动参数（访问器、目标值、时长、回调、取消令牌）
//! - [`Scheduler`]: 协作式逐帧调度器
//! - [`EasingFunction`]: 缓动函数
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut scheduler = Scheduler::new();
//! let alpha = SharedValue::new(0.0_f32);
//!
//! scheduler.start(
//!     Transition::new(alpha.clone(), 1.0, 0.2).on_complete(|_| println!("done")),
//! );
//!
//! // 主循环
//! scheduler.tick(dt);
//! ```

mod easing;
mod property;
mod scheduler;
mod tween;

pub use easing::EasingFunction;
pub use property::{PropertyAccessor, SharedValue};
pub use scheduler::{AnimationEvent, AnimationId, CancelToken, Completion, Scheduler, Transition};
pub use tween::{Lerp, Tween, TweenState};
