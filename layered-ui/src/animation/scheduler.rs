//! # Scheduler 模块
//!
//! 协作式逐帧调度器。
//!
//! 每次 [`tick`](Scheduler::tick) 按以下顺序执行：
//! 1. 按启动顺序推进所有过渡，写入本帧的值
//! 2. 依次执行本帧完成的过渡的完成回调
//! 3. 执行上一帧登记的延迟任务（"延迟一帧"）
//!
//! 回调与延迟任务拿到 `&mut Scheduler`，可以继续启动过渡或登记新的延迟任务；
//! 这些新任务从下一帧开始推进。

use std::cell::Cell;
use std::rc::Rc;

use super::{EasingFunction, Lerp, PropertyAccessor, Tween};

/// 完成回调 / 延迟任务
pub type Completion = Box<dyn FnOnce(&mut Scheduler)>;

/// 动画 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

impl AnimationId {
    /// 创建新的动画 ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// 动画事件
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// 动画开始
    Started(AnimationId),
    /// 动画完成（目标值已写出）
    Completed(AnimationId),
    /// 动画被取消（不写最终值，不执行回调）
    Cancelled(AnimationId),
}

/// 取消令牌
///
/// 一次动画调用中启动的所有过渡和延迟任务共享同一个令牌，
/// 取消后它们在下一帧被丢弃，完成回调不会执行。
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    /// 创建新的令牌
    pub fn new() -> Self {
        Self::default()
    }

    /// 取消
    pub fn cancel(&self) {
        self.0.set(true);
    }

    /// 是否已取消
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// 过渡描述
///
/// 由 [`Scheduler::start`] 消费。起始值在启动时从访问器读取。
pub struct Transition<V, P> {
    property: P,
    to: V,
    duration: f32,
    easing: EasingFunction,
    on_complete: Option<Completion>,
    token: Option<CancelToken>,
}

impl<V, P> Transition<V, P>
where
    V: Lerp + 'static,
    P: PropertyAccessor<V> + 'static,
{
    /// 创建过渡：在 `duration` 秒内把属性驱动到 `to`
    pub fn new(property: P, to: V, duration: f32) -> Self {
        Self {
            property,
            to,
            duration,
            easing: EasingFunction::default(),
            on_complete: None,
            token: None,
        }
    }

    /// 设置缓动函数
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// 设置完成回调
    pub fn on_complete(mut self, callback: impl FnOnce(&mut Scheduler) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// 绑定取消令牌
    pub fn with_token(mut self, token: &CancelToken) -> Self {
        self.token = Some(token.clone());
        self
    }
}

/// 调度器内部的过渡任务（类型擦除）
trait Advance {
    fn id(&self) -> AnimationId;
    fn is_cancelled(&self) -> bool;
    /// 推进一帧，返回是否已完成
    fn advance(&mut self, dt: f32) -> bool;
    fn take_completion(&mut self) -> Option<Completion>;
}

struct Running<V, P> {
    id: AnimationId,
    tween: Tween<V>,
    property: P,
    completion: Option<Completion>,
    token: Option<CancelToken>,
}

impl<V, P> Advance for Running<V, P>
where
    V: Lerp,
    P: PropertyAccessor<V>,
{
    fn id(&self) -> AnimationId {
        self.id
    }

    fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn advance(&mut self, dt: f32) -> bool {
        let value = self.tween.step(dt);
        self.property.set(value);
        self.tween.is_complete()
    }

    fn take_completion(&mut self) -> Option<Completion> {
        self.completion.take()
    }
}

/// 延迟一帧执行的任务
struct Deferred {
    token: Option<CancelToken>,
    action: Completion,
}

/// 协作式调度器
pub struct Scheduler {
    /// 正在播放的过渡（按启动顺序）
    running: Vec<Box<dyn Advance>>,
    /// 等待下一帧执行的任务
    deferred: Vec<Deferred>,
    /// 下一个动画 ID
    next_id: u64,
    /// 已执行的帧数
    ticks: u64,
    /// 待返回的事件队列
    events: Vec<AnimationEvent>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("running", &self.running.len())
            .field("deferred", &self.deferred.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl Scheduler {
    /// 创建空的调度器
    pub fn new() -> Self {
        Self {
            running: Vec::new(),
            deferred: Vec::new(),
            next_id: 1,
            ticks: 0,
            events: Vec::new(),
        }
    }

    fn next_animation_id(&mut self) -> AnimationId {
        let id = AnimationId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// 启动过渡
    ///
    /// 起始值在此刻从访问器读取。时长 `<= 0` 的过渡立即写入目标值并执行完成回调。
    pub fn start<V, P>(&mut self, transition: Transition<V, P>) -> AnimationId
    where
        V: Lerp + 'static,
        P: PropertyAccessor<V> + 'static,
    {
        let Transition {
            mut property,
            to,
            duration,
            easing,
            on_complete,
            token,
        } = transition;

        let id = self.next_animation_id();
        if token.as_ref().is_some_and(CancelToken::is_cancelled) {
            self.events.push(AnimationEvent::Cancelled(id));
            return id;
        }

        let mut tween = Tween::new(property.get(), to, duration).with_easing(easing);
        self.events.push(AnimationEvent::Started(id));

        if tween.is_instant() {
            property.set(tween.finish());
            self.events.push(AnimationEvent::Completed(id));
            if let Some(callback) = on_complete {
                callback(self);
            }
            return id;
        }

        self.running.push(Box::new(Running {
            id,
            tween,
            property,
            completion: on_complete,
            token,
        }));
        id
    }

    /// 登记一个在下一帧执行的任务
    pub fn defer(&mut self, action: impl FnOnce(&mut Scheduler) + 'static) {
        self.deferred.push(Deferred {
            token: None,
            action: Box::new(action),
        });
    }

    /// 登记一个受令牌保护的延迟任务，令牌取消后任务不再执行
    pub fn defer_guarded(
        &mut self,
        token: &CancelToken,
        action: impl FnOnce(&mut Scheduler) + 'static,
    ) {
        self.deferred.push(Deferred {
            token: Some(token.clone()),
            action: Box::new(action),
        });
    }

    /// 推进一帧
    ///
    /// # 返回
    /// 返回自上一帧以来产生的事件列表
    pub fn tick(&mut self, dt: f32) -> Vec<AnimationEvent> {
        self.ticks += 1;
        let due = std::mem::take(&mut self.deferred);

        let mut completions = Vec::new();
        let mut still_running = Vec::with_capacity(self.running.len());
        for mut job in std::mem::take(&mut self.running) {
            if job.is_cancelled() {
                self.events.push(AnimationEvent::Cancelled(job.id()));
                continue;
            }
            if job.advance(dt) {
                self.events.push(AnimationEvent::Completed(job.id()));
                if let Some(callback) = job.take_completion() {
                    completions.push(callback);
                }
            } else {
                still_running.push(job);
            }
        }
        self.running = still_running;

        for callback in completions {
            callback(self);
        }

        for task in due {
            if task.token.as_ref().is_some_and(CancelToken::is_cancelled) {
                continue;
            }
            (task.action)(self);
        }

        std::mem::take(&mut self.events)
    }

    /// 正在播放的过渡数量
    pub fn active_count(&self) -> usize {
        self.running.len()
    }

    /// 是否还有未完成的过渡或延迟任务
    pub fn has_pending(&self) -> bool {
        !self.running.is_empty() || !self.deferred.is_empty()
    }

    /// 已执行的帧数
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// 丢弃所有过渡、延迟任务和事件（不执行回调）
    pub fn clear(&mut self) {
        self.running.clear();
        self.deferred.clear();
        self.events.clear();
    }
}
