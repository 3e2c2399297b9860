//! 元数据定义
//!
//! 提供运行时类型信息，用于类型擦除后的实例和字段声明类型比较

use std::any::TypeId;
use std::fmt;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 完整类型名称（包含模块路径）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: std::any::type_name::<T>().to_string(),
            id: TypeId::of::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        // 泛型参数中也可能出现 "::"，只截取最外层路径
        let outer = self.name.split('<').next().unwrap_or(&self.name);
        let start = outer.rfind("::").map_or(0, |pos| pos + 2);
        &self.name[start..]
    }

    /// 是否为指定类型
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
