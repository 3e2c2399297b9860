//! 服务提供者抽象接口
//!
//! 属性注入器和服务定位器只依赖这里的 trait，不依赖具体容器

use crate::definition::Definition;
use crate::instance::Instance;
use infrastructure_common::DependencyResult;
use serde_json::Value;

/// 服务提供者 trait
///
/// 面向容器外部调用方：只能看到公开服务
pub trait ServiceProvider: Send + Sync {
    /// 服务是否存在且公开
    fn has(&self, id: &str) -> bool;

    /// 获取服务实例
    fn get(&self, id: &str) -> DependencyResult<Instance>;

    /// 参数是否存在
    fn has_parameter(&self, name: &str) -> bool;

    /// 获取参数值
    fn parameter(&self, name: &str) -> DependencyResult<Value>;
}

/// 只读的定义图视图，供定义检查使用
pub trait DefinitionGraph {
    /// 按 ID 查找定义（包含私有定义）
    fn definition(&self, id: &str) -> Option<&Definition>;

    /// 参数是否存在
    fn has_parameter(&self, name: &str) -> bool;

    /// 类型是否已注册
    fn has_type(&self, type_ref: &str) -> bool;

    /// 按注册顺序列出所有定义
    fn ordered_definitions(&self) -> Vec<&Definition>;
}
