//! 服务实例与构造参数

use infrastructure_common::{ArgumentError, ArgumentResult, TypeInfo};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的服务实例
///
/// 克隆只增加引用计数，单例的多次获取指向同一个对象
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_info: TypeInfo,
}

impl Instance {
    /// 包装一个新创建的值
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// 包装一个已共享的值
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value,
            type_info: TypeInfo::of::<T>(),
        }
    }

    /// 运行时类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 运行时类型名称
    pub fn type_name(&self) -> &str {
        &self.type_info.name
    }

    /// 是否为指定类型
    pub fn is<T: Send + Sync + 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// 转换为具体类型
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// 是否与另一个实例指向同一个对象
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_info.name)
            .finish_non_exhaustive()
    }
}

/// 已解析的构造参数
#[derive(Debug, Clone)]
pub enum ArgumentValue {
    /// 字面量或参数值
    Value(Value),
    /// 依赖服务实例
    Service(Instance),
}

/// 传给构造函数的参数序列，顺序与定义中的声明顺序一致
#[derive(Debug, Clone)]
pub struct Arguments {
    service: String,
    values: Vec<ArgumentValue>,
}

impl Arguments {
    /// 创建参数序列
    pub fn new(service: impl Into<String>, values: Vec<ArgumentValue>) -> Self {
        Self {
            service: service.into(),
            values,
        }
    }

    /// 正在构建的服务 ID
    pub fn service_id(&self) -> &str {
        &self.service
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArgumentValue> {
        self.values.iter()
    }

    /// 获取第 `index` 个参数
    pub fn get(&self, index: usize) -> ArgumentResult<&ArgumentValue> {
        self.values.get(index).ok_or_else(|| ArgumentError::Missing {
            service: self.service.clone(),
            index,
            len: self.values.len(),
        })
    }

    /// 获取第 `index` 个值参数
    pub fn value(&self, index: usize) -> ArgumentResult<&Value> {
        match self.get(index)? {
            ArgumentValue::Value(value) => Ok(value),
            ArgumentValue::Service(_) => Err(ArgumentError::NotAValue {
                service: self.service.clone(),
                index,
            }),
        }
    }

    /// 将第 `index` 个值参数反序列化为 `T`
    pub fn parse<T: DeserializeOwned>(&self, index: usize) -> ArgumentResult<T> {
        let value = self.value(index)?.clone();
        serde_json::from_value(value).map_err(|source| ArgumentError::Deserialize {
            service: self.service.clone(),
            index,
            source,
        })
    }

    /// 第 `index` 个参数作为字符串
    pub fn string(&self, index: usize) -> ArgumentResult<String> {
        self.parse(index)
    }

    /// 获取第 `index` 个服务参数（类型擦除）
    pub fn instance(&self, index: usize) -> ArgumentResult<&Instance> {
        match self.get(index)? {
            ArgumentValue::Service(instance) => Ok(instance),
            ArgumentValue::Value(_) => Err(ArgumentError::NotAService {
                service: self.service.clone(),
                index,
            }),
        }
    }

    /// 获取第 `index` 个服务参数并转换为 `T`
    pub fn service<T: Send + Sync + 'static>(&self, index: usize) -> ArgumentResult<Arc<T>> {
        let instance = self.instance(index)?;
        instance.downcast::<T>().ok_or_else(|| ArgumentError::ServiceType {
            service: self.service.clone(),
            index,
            expected: std::any::type_name::<T>().to_string(),
            actual: instance.type_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Logger;

    #[test]
    fn test_instance_identity_and_downcast() {
        let instance = Instance::new(Logger);
        let same = instance.clone();
        let other = Instance::new(Logger);

        assert!(instance.ptr_eq(&same));
        assert!(!instance.ptr_eq(&other));
        assert!(instance.is::<Logger>());
        assert!(instance.downcast::<Logger>().is_some());
        assert!(instance.downcast::<String>().is_none());
        assert!(instance.type_name().ends_with("Logger"));
    }

    #[test]
    fn test_arguments_accessors() {
        let arguments = Arguments::new(
            "greeter",
            vec![
                ArgumentValue::Value(json!("hello")),
                ArgumentValue::Value(json!({ "retries": 3 })),
                ArgumentValue::Service(Instance::new(Logger)),
            ],
        );

        assert_eq!(arguments.len(), 3);
        assert_eq!(arguments.string(0).unwrap(), "hello");
        assert_eq!(arguments.value(1).unwrap()["retries"], 3);
        assert!(arguments.service::<Logger>(2).is_ok());

        assert!(matches!(arguments.value(2), Err(ArgumentError::NotAValue { index: 2, .. })));
        assert!(matches!(arguments.instance(0), Err(ArgumentError::NotAService { index: 0, .. })));
        assert!(matches!(arguments.get(5), Err(ArgumentError::Missing { index: 5, len: 3, .. })));
        assert!(matches!(arguments.parse::<u32>(0), Err(ArgumentError::Deserialize { .. })));
        assert!(matches!(
            arguments.service::<String>(2),
            Err(ArgumentError::ServiceType { .. })
        ));
    }
}
