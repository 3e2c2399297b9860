//! 服务定义
//!
//! 描述如何构建一个服务：类型、参数、作用域和可见性。
//! 定义由外部加载器提供，核心不解析任何配置文件格式。

use infrastructure_common::Scope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// 定义参数引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reference {
    /// 字面量，原样传给构造函数
    Literal(Value),
    /// 参数名，解析时替换为参数值
    Parameter(String),
    /// 另一个服务定义的 ID
    Service(String),
    /// 含 `%name%` 占位符的字符串模板，`%%` 表示字面量 `%`
    Interpolated(String),
}

impl Reference {
    /// 创建字面量引用
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// 创建参数引用
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::Parameter(name.into())
    }

    /// 创建服务引用
    pub fn service(id: impl Into<String>) -> Self {
        Self::Service(id.into())
    }

    /// 创建字符串模板引用
    pub fn interpolated(template: impl Into<String>) -> Self {
        Self::Interpolated(template.into())
    }

    /// 引用的服务 ID（仅服务引用）
    pub fn service_id(&self) -> Option<&str> {
        match self {
            Self::Service(id) => Some(id),
            _ => None,
        }
    }
}

/// 服务定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// 服务 ID，在定义存储中唯一
    pub id: String,
    /// 要实例化的类型名称，在类型注册表中查找构造函数
    pub type_ref: String,
    /// 按声明顺序排列的构造参数
    #[serde(default)]
    pub arguments: Vec<Reference>,
    /// 标签，仅用于分组和查询
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// 作用域
    #[serde(default)]
    pub scope: Scope,
    /// 是否可以从容器外部直接获取
    #[serde(default = "default_public")]
    pub public: bool,
}

const fn default_public() -> bool {
    true
}

impl Definition {
    /// 创建新的服务定义（公开单例，无参数）
    pub fn new(id: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_ref: type_ref.into(),
            arguments: Vec::new(),
            tags: BTreeSet::new(),
            scope: Scope::Singleton,
            public: true,
        }
    }

    /// 追加一个参数
    pub fn with_argument(mut self, argument: Reference) -> Self {
        self.arguments.push(argument);
        self
    }

    /// 追加多个参数
    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = Reference>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    /// 添加标签
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置为原型作用域
    pub fn prototype(self) -> Self {
        self.with_scope(Scope::Prototype)
    }

    /// 设置可见性
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// 设置为私有服务
    pub fn private(self) -> Self {
        self.with_public(false)
    }

    /// 是否带有指定标签
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// 是否为单例
    pub fn is_singleton(&self) -> bool {
        self.scope == Scope::Singleton
    }

    /// 按声明顺序列出引用的服务 ID
    pub fn service_references(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().filter_map(Reference::service_id)
    }
}
