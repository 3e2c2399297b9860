//! 属性注入请求
//!
//! 字段元数据由外部扫描器提供。每个字段在装配时创建一次 [`FieldBinding`]，
//! 注入时通过绑定的 setter 赋值，不依赖运行时反射。

use crate::instance::Instance;
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::fmt;
use std::sync::Arc;

type Setter<T> = Arc<dyn Fn(&mut T, Instance) -> DependencyResult<()> + Send + Sync>;

/// 可赋值的字段绑定
pub struct FieldBinding<T> {
    name: String,
    declared_type: Option<TypeInfo>,
    setter: Setter<T>,
}

impl<T: 'static> FieldBinding<T> {
    /// 创建声明了类型 `S` 的字段绑定
    pub fn typed<S, F>(name: impl Into<String>, assign: F) -> Self
    where
        S: Send + Sync + 'static,
        F: Fn(&mut T, Arc<S>) + Send + Sync + 'static,
    {
        let name = name.into();
        let field = name.clone();
        Self {
            name,
            declared_type: Some(TypeInfo::of::<S>()),
            setter: Arc::new(move |target: &mut T, instance: Instance| {
                let value = instance
                    .downcast::<S>()
                    .ok_or_else(|| DependencyError::TypeMismatch {
                        field: field.clone(),
                        expected: TypeInfo::of::<S>().short_name().to_string(),
                        actual: instance.type_info().short_name().to_string(),
                    })?;
                assign(target, value);
                Ok(())
            }),
        }
    }

    /// 创建未声明类型的字段绑定，接受任何实例
    pub fn untyped<F>(name: impl Into<String>, assign: F) -> Self
    where
        F: Fn(&mut T, Instance) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            declared_type: None,
            setter: Arc::new(move |target: &mut T, instance: Instance| {
                assign(target, instance);
                Ok(())
            }),
        }
    }
}

impl<T> FieldBinding<T> {
    /// 字段名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 字段声明类型
    pub fn declared_type(&self) -> Option<&TypeInfo> {
        self.declared_type.as_ref()
    }

    /// 实例是否与声明类型兼容，未声明类型时总是兼容
    pub fn accepts(&self, instance: &Instance) -> bool {
        self.declared_type
            .as_ref()
            .map_or(true, |declared| declared.id == instance.type_info().id)
    }

    /// 把实例赋值给目标字段
    pub fn assign(&self, target: &mut T, instance: Instance) -> DependencyResult<()> {
        (self.setter)(target, instance)
    }
}

impl<T> Clone for FieldBinding<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            declared_type: self.declared_type.clone(),
            setter: Arc::clone(&self.setter),
        }
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type.as_ref().map(|t| t.name.as_str()))
            .field("setter", &"<function>")
            .finish()
    }
}

/// 注入请求：字段绑定 + 服务 ID
pub struct InjectionRequest<T> {
    /// 目标字段
    pub field: FieldBinding<T>,
    /// 要注入的服务 ID
    pub service_id: String,
}

impl<T> InjectionRequest<T> {
    pub fn new(field: FieldBinding<T>, service_id: impl Into<String>) -> Self {
        Self {
            field,
            service_id: service_id.into(),
        }
    }
}

impl<T> Clone for InjectionRequest<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            service_id: self.service_id.clone(),
        }
    }
}

impl<T> fmt::Debug for InjectionRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionRequest")
            .field("field", &self.field)
            .field("service_id", &self.service_id)
            .finish()
    }
}

/// 可注入目标 trait
///
/// 相当于元数据扫描器的输出：类型自己按顺序列出需要注入的字段
pub trait InjectionTarget: Sized + 'static {
    /// 按字段顺序返回注入请求
    fn injection_requests() -> Vec<InjectionRequest<Self>>;
}
