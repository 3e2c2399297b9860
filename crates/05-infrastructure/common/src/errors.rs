//! 错误类型定义

use std::sync::Arc;
use thiserror::Error;

/// 构造函数返回的装箱错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 可共享的底层错误，保证 [`DependencyError`] 可以 Clone
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// 依赖注入错误类型
///
/// 所有错误都携带出错的服务 ID、字段或类型名称，核心内部不做重试
#[derive(Error, Debug, Clone)]
pub enum DependencyError {
    #[error("服务定义重复: {id}，容器冻结后不允许以不同内容重新定义")]
    DuplicateDefinition { id: String },

    #[error("容器已编译冻结，无法{operation}: {key}")]
    FrozenContainer { operation: &'static str, key: String },

    #[error("引用了未定义的服务: {id}（被 {referenced_by} 引用）")]
    UndefinedReference { id: String, referenced_by: String },

    #[error("参数不存在: {name}")]
    UnknownParameter { name: String },

    #[error("参数 {name} 不是字符串或数字，无法插入字符串模板: {template}")]
    NonScalarParameter { name: String, template: String },

    #[error("检测到循环依赖: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("服务实例化失败: {id} ({type_ref})，原因: {source}")]
    Instantiation {
        id: String,
        type_ref: String,
        #[source]
        source: SharedError,
    },

    #[error("类型未注册: {type_ref}（服务 {id}）")]
    UnknownType { id: String, type_ref: String },

    #[error("服务不存在: {id}{}", requested_by_suffix(.requested_by))]
    ServiceNotFound {
        id: String,
        requested_by: Option<String>,
    },

    #[error("容器尚未编译，无法获取服务: {id}")]
    NotCompiled { id: String },

    #[error("类型不匹配: 字段 {field} 声明类型 {expected}，实际类型 {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("容器编译失败，只能查看失败原因: {source}")]
    CompileFailed {
        #[source]
        source: Box<DependencyError>,
    },

    #[error("解析深度超过上限 {max_depth}: {}", .path.join(" -> "))]
    ResolutionDepthExceeded { max_depth: usize, path: Vec<String> },

    #[error("服务定义无效: '{id}'，原因: {message}")]
    InvalidDefinition { id: String, message: String },

    #[error("服务定位器已经初始化，不允许重复设置容器")]
    LocatorAlreadyInitialized,

    #[error("服务定位器尚未初始化，请先调用 initialize()")]
    LocatorNotInitialized,
}

fn requested_by_suffix(requested_by: &Option<String>) -> String {
    requested_by
        .as_ref()
        .map(|target| format!("（注入目标: {target}）"))
        .unwrap_or_default()
}

impl DependencyError {
    /// 创建容器冻结错误
    pub fn frozen(operation: &'static str, key: impl Into<String>) -> Self {
        Self::FrozenContainer {
            operation,
            key: key.into(),
        }
    }

    /// 创建服务不存在错误
    pub fn service_not_found(id: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            id: id.into(),
            requested_by: None,
        }
    }

    /// 包装构造函数失败，保留原始错误
    pub fn instantiation(id: impl Into<String>, type_ref: impl Into<String>, source: BoxError) -> Self {
        Self::Instantiation {
            id: id.into(),
            type_ref: type_ref.into(),
            source: Arc::from(source),
        }
    }

    /// 包装编译失败后的访问错误
    pub fn compile_failed(cause: &Self) -> Self {
        Self::CompileFailed {
            source: Box::new(cause.clone()),
        }
    }

    /// 循环依赖路径（仅 `CircularDependency`）
    pub fn cycle_path(&self) -> Option<&[String]> {
        match self {
            Self::CircularDependency { path } => Some(path),
            _ => None,
        }
    }
}

/// 构造参数访问错误
///
/// 由构造函数通过 `?` 返回，最终被包装进 [`DependencyError::Instantiation`]
#[derive(Error, Debug)]
pub enum ArgumentError {
    #[error("服务 {service} 缺少第 {index} 个参数（共 {len} 个）")]
    Missing {
        service: String,
        index: usize,
        len: usize,
    },

    #[error("服务 {service} 的第 {index} 个参数不是值")]
    NotAValue { service: String, index: usize },

    #[error("服务 {service} 的第 {index} 个参数不是服务实例")]
    NotAService { service: String, index: usize },

    #[error("服务 {service} 的第 {index} 个参数类型不匹配: 期望 {expected}，实际 {actual}")]
    ServiceType {
        service: String,
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("服务 {service} 的第 {index} 个参数反序列化失败: {source}")]
    Deserialize {
        service: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type ArgumentResult<T> = Result<T, ArgumentError>;
