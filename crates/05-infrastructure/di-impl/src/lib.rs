//! # 依赖注入具体实现
//!
//! 提供定义存储、参数存储、类型注册表、依赖解析器、容器、
//! 属性注入器和服务定位器的具体实现

mod checks;
mod container;
mod definition_store;
mod graph;
mod injector;
mod locator;
mod parameter_store;
mod resolver;
mod template;
mod type_registry;

pub use checks::{default_checks, Acyclic, ParametersDefined, ReferencesDefined, TypeRegistered};
pub use container::Container;
pub use definition_store::DefinitionStore;
pub use injector::PropertyInjector;
pub use locator::{global_locator, ServiceLocator};
pub use parameter_store::ParameterStore;
pub use type_registry::TypeRegistry;
