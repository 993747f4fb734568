//! 面板注册表：`PanelId → Panel`。

use std::collections::BTreeMap;

use crate::panel::{Panel, PanelId};

/// 面板注册表
///
/// 查找未知 ID 返回 `None`，不会 panic。按 ID 升序迭代。
#[derive(Debug, Default)]
pub struct PanelRegistry {
    panels: BTreeMap<PanelId, Panel>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, panel: Panel) {
        self.panels.insert(panel.id(), panel);
    }

    pub fn get(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(&id)
    }

    pub fn get_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(&id)
    }

    pub fn remove(&mut self, id: PanelId) -> Option<Panel> {
        self.panels.remove(&id)
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.panels.contains_key(&id)
    }

    /// 已注册的 ID（升序）
    pub fn ids(&self) -> Vec<PanelId> {
        self.panels.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    /// 取出全部面板
    pub fn take_all(&mut self) -> Vec<Panel> {
        std::mem::take(&mut self.panels).into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::EntranceType;
    use crate::config::AnimationConfig;
    use crate::geometry::Size;
    use crate::layer::LayerIndex;
    use crate::panel::PanelTemplate;

    fn panel(id: u64) -> Panel {
        let template = PanelTemplate::new("item", Size::new(100.0, 100.0));
        let mut panel = Panel::instantiate(
            &template,
            EntranceType::Instant,
            LayerIndex::new(0),
            &AnimationConfig::default(),
        )
        .unwrap();
        panel.setup(PanelId::new(id)).unwrap();
        panel
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = PanelRegistry::new();
        registry.insert(panel(2));
        registry.insert(panel(1));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), vec![PanelId::new(1), PanelId::new(2)]);
        assert!(registry.get(PanelId::new(3)).is_none());

        let removed = registry.remove(PanelId::new(1)).unwrap();
        assert_eq!(removed.id(), PanelId::new(1));
        assert!(!registry.contains(PanelId::new(1)));
        assert!(registry.remove(PanelId::new(1)).is_none());
    }

    #[test]
    fn test_take_all_empties_registry() {
        let mut registry = PanelRegistry::new();
        registry.insert(panel(1));
        registry.insert(panel(2));

        let panels = registry.take_all();
        assert_eq!(panels.len(), 2);
        assert!(registry.is_empty());
    }
}
