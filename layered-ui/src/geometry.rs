//! # Geometry 模块
//!
//! 面板与图层使用的二维几何类型。

use serde::{Deserialize, Serialize};

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 零向量
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// 单位向量 (1, 1)
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 各分量相同的向量
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    /// 线性插值
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// 矩形尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// 创建尺寸
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// 宽高均为正数
    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}
