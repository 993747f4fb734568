//! # Property 模块
//!
//! 属性访问器接口：补间通过它读取起始值、逐帧写入新值。

use std::cell::RefCell;
use std::rc::Rc;

/// 属性访问器接口
///
/// 提供对单个属性的 getter/setter 访问。
///
/// ## 设计说明
///
/// 使用 `Rc<RefCell<T>>` 模式实现内部可变性：
/// - 访问器持有共享状态的引用
/// - 可以同时动画同一对象的多个属性，无需担心借用冲突
pub trait PropertyAccessor<V> {
    /// 获取当前值
    fn get(&self) -> V;

    /// 设置新值
    fn set(&mut self, value: V);
}

/// 简单的共享值访问器
///
/// 使用 `Rc<RefCell<V>>` 包装单个值，克隆后共享同一份数据。
#[derive(Debug, Clone, Default)]
pub struct SharedValue<V> {
    value: Rc<RefCell<V>>,
}

impl<V: Copy> SharedValue<V> {
    /// 创建新的共享值
    pub fn new(initial_value: V) -> Self {
        Self {
            value: Rc::new(RefCell::new(initial_value)),
        }
    }

    /// 读取当前值
    pub fn value(&self) -> V {
        *self.value.borrow()
    }
}

impl<V: Copy> PropertyAccessor<V> for SharedValue<V> {
    fn get(&self) -> V {
        *self.value.borrow()
    }

    fn set(&mut self, value: V) {
        *self.value.borrow_mut() = value;
    }
}
