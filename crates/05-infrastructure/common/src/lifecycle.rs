//! 服务生命周期与容器阶段

use serde::{Deserialize, Serialize};
use std::fmt;

/// 服务作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// 单例模式 - 容器生命周期内只创建一个实例，首次获取时创建
    #[default]
    Singleton,
    /// 原型模式 - 每次获取都创建新实例
    Prototype,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Prototype => f.write_str("prototype"),
        }
    }
}

/// 容器生命周期阶段
///
/// Building → Compiled，或在预热编译失败时 Building → Failed，不存在回退
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerPhase {
    /// 构建中，可以注册定义、参数和类型
    Building,
    /// 已编译，定义图不可变
    Compiled,
    /// 编译失败，只能查看失败原因
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_serde_lowercase() {
        let scope: Scope = serde_json::from_str("\"prototype\"").unwrap();
        assert_eq!(scope, Scope::Prototype);
        assert_eq!(serde_json::to_string(&Scope::Singleton).unwrap(), "\"singleton\"");
        assert_eq!(Scope::default(), Scope::Singleton);
    }
}
