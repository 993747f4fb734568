//! # Template 模块
//!
//! 面板模板：描述面板的名称、尺寸、声明的能力，以及内容对象的工厂。
//! 放置面板前先用 [`PanelTemplate::validate`] 检查入场动画所需的能力。

use std::fmt;
use std::rc::Rc;

use super::PanelId;
use crate::animator::EntranceType;
use crate::error::PanelError;
use crate::geometry::Size;

/// 面板内容钩子
///
/// 由使用方实现，承载面板的具体逻辑。所有方法都有默认实现。
pub trait PanelContent {
    /// 面板挂载并分配 ID 后调用，返回错误会回滚整次放置
    fn on_setup(&mut self, _id: PanelId) -> Result<(), PanelError> {
        Ok(())
    }

    /// 入场动画播放完毕
    fn on_displayed(&mut self) {}

    /// 面板被销毁
    fn on_closed(&mut self) {}
}

/// 不带任何逻辑的内容
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContent;

impl PanelContent for EmptyContent {}

type ContentFactory = Rc<dyn Fn() -> Box<dyn PanelContent>>;

/// 面板模板
#[derive(Clone)]
pub struct PanelTemplate {
    name: String,
    size: Size,
    opacity_group: bool,
    content: ContentFactory,
}

impl fmt::Debug for PanelTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelTemplate")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("opacity_group", &self.opacity_group)
            .finish_non_exhaustive()
    }
}

impl PanelTemplate {
    /// 创建带透明度组、内容为空的模板
    pub fn new(name: impl Into<String>, size: Size) -> Self {
        Self {
            name: name.into(),
            size,
            opacity_group: true,
            content: Rc::new(|| Box::new(EmptyContent) as Box<dyn PanelContent>),
        }
    }

    /// 去掉透明度组（此时只能使用 Slide 入场）
    pub fn without_opacity_group(mut self) -> Self {
        self.opacity_group = false;
        self
    }

    /// 设置内容工厂，每次放置都会创建一个新的内容对象
    pub fn with_content<C, F>(mut self, factory: F) -> Self
    where
        C: PanelContent + 'static,
        F: Fn() -> C + 'static,
    {
        self.content = Rc::new(move || Box::new(factory()) as Box<dyn PanelContent>);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn has_opacity_group(&self) -> bool {
        self.opacity_group
    }

    /// 检查模板是否具备入场动画所需的能力
    pub fn validate(&self, entrance: EntranceType) -> Result<(), PanelError> {
        let missing = match entrance {
            EntranceType::Instant if !self.opacity_group => Some("透明度组"),
            EntranceType::Slide if !(self.size.width.is_finite() && self.size.width > 0.0) => {
                Some("宽度为正的矩形")
            }
            _ => None,
        };

        match missing {
            Some(capability) => Err(PanelError::MissingCapability {
                panel: self.name.clone(),
                entrance,
                capability,
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn create_content(&self) -> Box<dyn PanelContent> {
        (self.content)()
    }
}
