//! rsjsonsieve 全局错误定义
//! 基于thiserror实现类型安全处理；配置类错误在构造期同步暴露给调用方，
//! 候选级的匹配/解码失败一律在引擎内部吸收，绝不中断整条提取流。
use thiserror::Error;

use regex::Error as RegexError;

/// 引擎核心错误枚举
#[derive(Error, Debug)]
pub enum SieveError {
    // ===================== 配置相关错误（致命，立即暴露） =====================
    /// 模式集配置非法（必现键模式必须 ≥2 个）
    #[error("Pattern set config invalid: {0}")]
    Config(String),

    /// 必现键正则编译失败（正则语法错误/不支持的特性）
    #[error("Regex compilation failed: {0}")]
    RegexCompile(#[from] RegexError),

    // ===================== 候选相关错误（内部吸收，降级为无匹配） =====================
    /// 候选窗口在迭代预算内无法修复为可解码JSON
    #[error("Malformed candidate: {0}")]
    MalformedCandidate(String),

    /// 核心逻辑不变量被破坏（组合匹配与单键模式判定不一致，属于严重错误）
    #[error("Core invariant violation: {0}")]
    Invariant(&'static str),
}

/// 全局Result类型别名
pub type SieveResult<T> = Result<T, SieveError>;
