//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义服务定义数据模型和各组件之间的接口。
//!
//! ## 核心接口
//!
//! - [`Definition`] / [`Reference`] - 服务定义与参数引用
//! - [`Constructor`] - 类型构造函数
//! - [`ServiceProvider`] - 面向外部调用方的服务获取接口
//! - [`FieldBinding`] / [`InjectionRequest`] - 属性注入请求
//! - [`DefinitionCheck`] - 定义验证

pub mod container;
pub mod definition;
pub mod factory;
pub mod injection;
pub mod instance;
pub mod provider;
pub mod validation;

pub use container::*;
pub use definition::*;
pub use factory::*;
pub use injection::*;
pub use instance::*;
pub use provider::*;
pub use validation::*;
