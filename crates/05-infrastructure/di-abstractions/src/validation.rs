//! 定义验证抽象接口
//!
//! 每个检查对一个定义给出通过或失败的结论，由调用方决定遇到第一个失败就停止，
//! 还是收集全部失败

use crate::definition::Definition;
use crate::provider::DefinitionGraph;
use infrastructure_common::{DependencyError, DependencyResult};

/// 定义检查 trait
pub trait DefinitionCheck: Send + Sync {
    /// 检查名称
    fn name(&self) -> &'static str;

    /// 检查一个定义
    fn check(&self, definition: &Definition, graph: &dyn DefinitionGraph) -> DependencyResult<()>;
}

/// 验证模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// 遇到第一个失败即停止
    #[default]
    FailFast,
    /// 执行全部检查并收集所有失败
    CollectAll,
}

/// 单个检查结论
#[derive(Debug, Clone)]
pub struct Verdict {
    /// 检查名称
    pub check: &'static str,
    /// 被检查的服务 ID
    pub subject: String,
    /// 失败原因，通过时为 None
    pub failure: Option<DependencyError>,
}

impl Verdict {
    /// 创建通过的结论
    pub fn pass(check: &'static str, subject: impl Into<String>) -> Self {
        Self {
            check,
            subject: subject.into(),
            failure: None,
        }
    }

    /// 创建失败的结论
    pub fn fail(check: &'static str, subject: impl Into<String>, failure: DependencyError) -> Self {
        Self {
            check,
            subject: subject.into(),
            failure: Some(failure),
        }
    }

    /// 从检查结果创建结论
    pub fn from_result(check: &'static str, subject: impl Into<String>, result: DependencyResult<()>) -> Self {
        match result {
            Ok(()) => Self::pass(check, subject),
            Err(failure) => Self::fail(check, subject, failure),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.failure.is_none()
    }
}

/// 验证报告
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// 验证模式
    pub mode: ValidationMode,
    /// 按执行顺序记录的结论
    pub verdicts: Vec<Verdict>,
    /// 验证耗时
    pub duration: std::time::Duration,
    /// 验证时间
    pub validated_at: chrono::DateTime<chrono::Utc>,
}

impl ValidationReport {
    /// 创建空报告
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            verdicts: Vec::new(),
            duration: std::time::Duration::ZERO,
            validated_at: chrono::Utc::now(),
        }
    }

    /// 记录一个结论，返回是否应继续执行后续检查
    pub fn record(&mut self, verdict: Verdict) -> bool {
        let failed = !verdict.is_pass();
        self.verdicts.push(verdict);
        !(failed && self.mode == ValidationMode::FailFast)
    }

    /// 是否全部通过
    pub fn is_valid(&self) -> bool {
        self.verdicts.iter().all(Verdict::is_pass)
    }

    /// 所有失败原因
    pub fn failures(&self) -> impl Iterator<Item = &DependencyError> {
        self.verdicts.iter().filter_map(|verdict| verdict.failure.as_ref())
    }

    /// 通过的检查数量
    pub fn passed_count(&self) -> usize {
        self.verdicts.iter().filter(|verdict| verdict.is_pass()).count()
    }

    /// 转换为结果，返回第一个失败原因
    pub fn into_result(self) -> DependencyResult<()> {
        match self.verdicts.into_iter().find_map(|verdict| verdict.failure) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}
