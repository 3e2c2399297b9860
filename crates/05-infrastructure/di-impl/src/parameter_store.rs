//! 参数存储

use crate::template::{self, Segment};
use infrastructure_common::{DependencyError, DependencyResult};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// 参数存储
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    parameters: HashMap<String, Value>,
    frozen: bool,
}

impl ParameterStore {
    /// 创建空的参数存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置参数
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> DependencyResult<()> {
        let name = name.into();
        if self.frozen {
            return Err(DependencyError::frozen("设置参数", name));
        }
        debug!("设置参数: {}", name);
        self.parameters.insert(name, value.into());
        Ok(())
    }

    /// 获取参数
    pub fn get(&self, name: &str) -> DependencyResult<&Value> {
        self.parameters
            .get(name)
            .ok_or_else(|| DependencyError::UnknownParameter { name: name.to_string() })
    }

    pub fn has(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// 冻结存储，可重复调用
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// 展开 `%name%` 字符串模板
    ///
    /// 整个模板只有一个占位符时返回参数原值（可以是结构化值）；
    /// 嵌入更长字符串的参数只能是字符串或数字
    pub fn interpolate(&self, template: &str) -> DependencyResult<Value> {
        let segments = template::segments(template);
        if let [Segment::Placeholder(name)] = segments.as_slice() {
            return self.get(name).cloned();
        }

        let mut expanded = String::with_capacity(template.len());
        for segment in segments {
            match segment {
                Segment::Text(text) => expanded.push_str(text),
                Segment::Percent => expanded.push('%'),
                Segment::Placeholder(name) => match self.get(name)? {
                    Value::String(text) => expanded.push_str(text),
                    Value::Number(number) => expanded.push_str(&number.to_string()),
                    Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                        return Err(DependencyError::NonScalarParameter {
                            name: name.to_string(),
                            template: template.to_string(),
                        })
                    }
                },
            }
        }
        Ok(Value::String(expanded))
    }
}
