//! 容器配置与统计

use serde::{Deserialize, Serialize};

/// 编译模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    /// 编译时只冻结定义图，单例在首次获取时创建
    #[default]
    Lazy,
    /// 编译时按注册顺序创建所有公开单例，任一失败则整个编译失败
    Eager,
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerOptions {
    /// 编译模式
    pub compile_mode: CompileMode,
    /// 最大解析深度
    pub max_resolution_depth: usize,
}

impl ContainerOptions {
    /// 设置编译模式
    pub fn with_compile_mode(mut self, compile_mode: CompileMode) -> Self {
        self.compile_mode = compile_mode;
        self
    }

    /// 设置最大解析深度
    pub fn with_max_resolution_depth(mut self, max_resolution_depth: usize) -> Self {
        self.max_resolution_depth = max_resolution_depth;
        self
    }
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            compile_mode: CompileMode::Lazy,
            max_resolution_depth: 100,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default)]
pub struct ContainerStats {
    /// 服务定义数量
    pub definitions: usize,
    /// 参数数量
    pub parameters: usize,
    /// 已注册类型数量
    pub types: usize,
    /// 已创建的单例数量
    pub singletons_created: usize,
    /// 编译时间
    pub compiled_at: Option<chrono::DateTime<chrono::Utc>>,
}
