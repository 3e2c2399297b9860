//! 服务定义存储

use di_abstractions::Definition;
use infrastructure_common::{DependencyError, DependencyResult};
use std::collections::HashMap;
use tracing::debug;

/// 服务定义存储
///
/// 保留注册顺序；冻结前重复定义会覆盖（位置不变），冻结后只接受内容相同的重复定义
#[derive(Debug, Clone, Default)]
pub struct DefinitionStore {
    definitions: HashMap<String, Definition>,
    order: Vec<String>,
    frozen: bool,
}

impl DefinitionStore {
    /// 创建空的定义存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册服务定义
    pub fn define(&mut self, definition: Definition) -> DependencyResult<()> {
        validate(&definition)?;

        if self.frozen {
            return match self.definitions.get(&definition.id) {
                Some(existing) if *existing == definition => Ok(()),
                Some(_) => Err(DependencyError::DuplicateDefinition { id: definition.id }),
                None => Err(DependencyError::frozen("定义服务", definition.id)),
            };
        }

        debug!("注册服务定义: {} ({}, {})", definition.id, definition.type_ref, definition.scope);
        if !self.definitions.contains_key(&definition.id) {
            self.order.push(definition.id.clone());
        }
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Definition> {
        self.definitions.get(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// 冻结存储，可重复调用
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 按注册顺序遍历定义
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.order.iter().filter_map(|id| self.definitions.get(id))
    }

    /// 按注册顺序列出带有指定标签的服务 ID
    pub fn tagged(&self, tag: &str) -> Vec<String> {
        self.iter()
            .filter(|definition| definition.has_tag(tag))
            .map(|definition| definition.id.clone())
            .collect()
    }
}

fn validate(definition: &Definition) -> DependencyResult<()> {
    if definition.id.trim().is_empty() {
        return Err(DependencyError::InvalidDefinition {
            id: definition.id.clone(),
            message: "服务 ID 不能为空".to_string(),
        });
    }
    if definition.type_ref.trim().is_empty() {
        return Err(DependencyError::InvalidDefinition {
            id: definition.id.clone(),
            message: "类型名称不能为空".to_string(),
        });
    }
    Ok(())
}
