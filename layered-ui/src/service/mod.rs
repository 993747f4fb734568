//! # Service 模块
//!
//! 分层 UI 服务：对外的唯一入口。
//!
//! ## 职责
//!
//! - 把面板放到当前最上层图层（[`use_canvas`](LayeredUiService::use_canvas)）
//!   或一个新的更高图层（[`use_higher_canvas`](LayeredUiService::use_higher_canvas)）
//! - 为面板分配 ID、登记到注册表、播放入场动画
//! - 关闭面板：播放退场动画，结束后销毁
//! - 每帧推进动画调度器和图层池的空闲监视
//!
//! ## 帧循环
//!
//! ```text
//! update(dt)
//!   ├─ scheduler.tick(dt)      推进过渡 → 完成回调 → 延迟任务
//!   ├─ 处理动画回调发出的信号   入场完成 / 退场完成（销毁面板）
//!   └─ pool.tick(dt)           隐藏空闲图层
//! ```
//!
//! 动画回调只往共享的信号队列里写入，真正修改注册表和图层池的操作都在
//! `update` 中完成。

mod registry;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

pub use registry::PanelRegistry;

use crate::animation::Scheduler;
use crate::animator::EntranceType;
use crate::config::LayeredUiConfig;
use crate::error::{UiError, UiResult};
use crate::layer::{
    Allocation, AllocationStrategy, Compositor, Layer, LayerIndex, LayerPool, NullCompositor,
};
use crate::panel::{Panel, PanelId, PanelTemplate};

/// 服务对外报告的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UiEvent {
    /// 面板入场完成
    PanelShown(PanelId),
    /// 面板已销毁
    PanelClosed(PanelId),
    /// 图层被隐藏
    LayerDeactivated(LayerIndex),
}

/// 动画回调发给服务的信号
#[derive(Debug, Clone, Copy)]
enum PanelSignal {
    Displayed(PanelId),
    Closed(PanelId),
}

type Outbox = Rc<RefCell<Vec<PanelSignal>>>;

/// 分层 UI 服务
#[derive(Debug)]
pub struct LayeredUiService {
    config: LayeredUiConfig,
    pool: LayerPool,
    scheduler: Scheduler,
    registry: PanelRegistry,
    /// 已从注册表移除、退场动画仍在播放的面板
    closing: BTreeMap<PanelId, Panel>,
    outbox: Outbox,
    next_panel_id: u64,
}

impl LayeredUiService {
    /// 使用空后端创建服务
    pub fn new(config: LayeredUiConfig) -> UiResult<Self> {
        Self::with_compositor(config, Box::new(NullCompositor))
    }

    /// 使用指定后端创建服务
    pub fn with_compositor(
        config: LayeredUiConfig,
        compositor: Box<dyn Compositor>,
    ) -> UiResult<Self> {
        config.validate()?;
        let pool = LayerPool::new(&config, compositor);

        info!(
            max_layers = config.max_layers,
            idle_timeout = config.layer_idle_timeout,
            "分层 UI 服务已创建"
        );

        Ok(Self {
            config,
            pool,
            scheduler: Scheduler::new(),
            registry: PanelRegistry::new(),
            closing: BTreeMap::new(),
            outbox: Rc::new(RefCell::new(Vec::new())),
            next_panel_id: 1,
        })
    }

    // ========== 放置 ==========

    /// 把面板放到当前最上层的激活图层
    pub fn use_canvas(
        &mut self,
        template: &PanelTemplate,
        entrance: EntranceType,
    ) -> UiResult<PanelId> {
        self.place(template, entrance, AllocationStrategy::SameLevel)
    }

    /// 把面板放到一个新的更高图层，使用 Instant 入场
    pub fn use_higher_canvas(&mut self, template: &PanelTemplate) -> UiResult<PanelId> {
        self.use_higher_canvas_with(template, EntranceType::Instant)
    }

    /// 把面板放到一个新的更高图层，并指定入场类型
    pub fn use_higher_canvas_with(
        &mut self,
        template: &PanelTemplate,
        entrance: EntranceType,
    ) -> UiResult<PanelId> {
        self.place(template, entrance, AllocationStrategy::NewLevel)
    }

    fn place(
        &mut self,
        template: &PanelTemplate,
        entrance: EntranceType,
        strategy: AllocationStrategy,
    ) -> UiResult<PanelId> {
        // 先校验模板，失败时不触碰任何图层
        if let Err(e) = template.validate(entrance) {
            warn!(panel = %template.name(), error = %e, "面板放置被拒绝");
            return Err(e.into());
        }

        let allocation = self.allocate(strategy)?;
        let id = PanelId::new(self.next_panel_id);

        let panel = match self.mount(template, entrance, &allocation, id) {
            Ok(panel) => panel,
            Err(e) => {
                warn!(panel = %template.name(), error = %e, "面板放置失败，回滚");
                self.pool.deactivate_if_unused(&allocation)?;
                return Err(e);
            }
        };
        // 放置成功后才调整 z 序，失败的放置不改变图层顺序
        if strategy == AllocationStrategy::NewLevel {
            self.pool.bring_to_front(allocation.index)?;
        }
        self.next_panel_id += 1;

        debug!(
            panel = %id,
            name = %template.name(),
            layer = %allocation.index,
            ?entrance,
            ?strategy,
            "面板已放置"
        );
        self.registry.insert(panel);
        Ok(id)
    }

    fn allocate(&mut self, strategy: AllocationStrategy) -> UiResult<Allocation> {
        let allocation = match strategy {
            AllocationStrategy::SameLevel => self.pool.topmost_active()?,
            AllocationStrategy::NewLevel => {
                let mut allocation = self.pool.find_or_create_inactive(false)?;
                if self.pool.activate(allocation.index)? {
                    allocation.activated = true;
                }
                allocation
            }
        };
        Ok(allocation)
    }

    /// 实例化、挂载、初始化面板并开始入场；任一步失败时从图层上移除
    fn mount(
        &mut self,
        template: &PanelTemplate,
        entrance: EntranceType,
        allocation: &Allocation,
        id: PanelId,
    ) -> UiResult<Panel> {
        let mut panel = Panel::instantiate(
            template,
            entrance,
            allocation.index,
            &self.config.animation,
        )?;
        self.pool.attach(allocation.index, id)?;

        if let Err(e) = self.start(&mut panel, id) {
            self.pool.detach(allocation.index, id)?;
            return Err(e);
        }
        Ok(panel)
    }

    fn start(&mut self, panel: &mut Panel, id: PanelId) -> UiResult<()> {
        panel.setup(id)?;

        let outbox = self.outbox.clone();
        panel.display(&mut self.scheduler, move |_| {
            outbox.borrow_mut().push(PanelSignal::Displayed(id));
        })?;
        Ok(())
    }

    // ========== 查询 ==========

    /// 查找已注册的面板（正在关闭的面板不可见）
    pub fn get_panel(&self, id: PanelId) -> Option<&Panel> {
        self.registry.get(id)
    }

    pub fn get_panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.registry.get_mut(id)
    }

    /// 已注册的面板 ID（升序）
    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.registry.ids()
    }

    /// 正在播放退场动画的面板数
    pub fn closing_count(&self) -> usize {
        self.closing.len()
    }

    /// 全部图层（只读）
    pub fn layers(&self) -> &[Layer] {
        self.pool.layers()
    }

    pub fn pool(&self) -> &LayerPool {
        &self.pool
    }

    pub fn config(&self) -> &LayeredUiConfig {
        &self.config
    }

    /// 是否还有未完成的动画
    pub fn is_animating(&self) -> bool {
        self.scheduler.has_pending()
    }

    // ========== 关闭 ==========

    /// 关闭面板：从注册表移除并播放退场动画，结束后销毁
    pub fn close(&mut self, id: PanelId) -> UiResult<()> {
        let Some(mut panel) = self.registry.remove(id) else {
            warn!(panel = %id, "关闭未注册的面板");
            return Err(UiError::PanelNotFound { id });
        };

        let outbox = self.outbox.clone();
        let started = panel.close(&mut self.scheduler, move |_| {
            outbox.borrow_mut().push(PanelSignal::Closed(id));
        });

        match started {
            Ok(()) => {
                self.closing.insert(id, panel);
                Ok(())
            }
            Err(e) => {
                self.registry.insert(panel);
                Err(e.into())
            }
        }
    }

    fn destroy(&mut self, mut panel: Panel) -> UiResult<()> {
        let id = panel.id();
        let layer = panel.layer();
        panel.teardown();
        self.pool.detach(layer, id)?;
        debug!(panel = %id, layer = %layer, "面板已销毁");
        Ok(())
    }

    /// 立即销毁全部面板（不播放动画）并隐藏全部图层
    pub fn hide_all(&mut self) -> Vec<UiEvent> {
        let mut events = Vec::new();

        let mut panels = self.registry.take_all();
        panels.extend(std::mem::take(&mut self.closing).into_values());
        panels.sort_by_key(Panel::id);

        for panel in panels {
            let id = panel.id();
            if let Err(e) = self.destroy(panel) {
                warn!(panel = %id, error = %e, "销毁面板失败");
            }
            events.push(UiEvent::PanelClosed(id));
        }

        let hidden = self.pool.hide_all();
        debug!(layers = hidden.len(), "隐藏全部图层");
        events.extend(hidden.into_iter().map(UiEvent::LayerDeactivated));
        events
    }

    /// 重新初始化服务（测试用）
    ///
    /// 已创建的图层在后端仍然存在，只被隐藏并恢复创建顺序，之后继续复用。
    pub fn reset(&mut self) {
        self.hide_all();
        self.scheduler.clear();
        self.outbox.borrow_mut().clear();
        self.pool.reset();
        self.next_panel_id = 1;
        debug!("分层 UI 服务已重置");
    }

    // ========== 帧循环 ==========

    /// 推进一帧
    ///
    /// # 返回
    /// 本帧发生的事件
    pub fn update(&mut self, dt: f32) -> Vec<UiEvent> {
        let mut events = Vec::new();

        for event in self.scheduler.tick(dt) {
            trace!(?event, "动画事件");
        }

        let signals = std::mem::take(&mut *self.outbox.borrow_mut());
        for signal in signals {
            match signal {
                PanelSignal::Displayed(id) => {
                    // 入场期间被关闭的面板不在注册表中
                    if let Some(panel) = self.registry.get_mut(id) {
                        panel.mark_shown();
                        events.push(UiEvent::PanelShown(id));
                    }
                }
                PanelSignal::Closed(id) => {
                    let Some(panel) = self.closing.remove(&id) else {
                        continue;
                    };
                    match self.destroy(panel) {
                        Ok(()) => events.push(UiEvent::PanelClosed(id)),
                        Err(e) => warn!(panel = %id, error = %e, "销毁面板失败"),
                    }
                }
            }
        }

        events.extend(
            self.pool
                .tick(dt)
                .into_iter()
                .map(UiEvent::LayerDeactivated),
        );
        events
    }
}
