//! 模式集编译
//! 将调用方提供的必现键正则编译为：单键正则 + 结构外壳锚点 + 必现字面量门闸。
//! 组合判定采用两阶段扫描（regex crate 不支持前瞻断言）：
//! 外壳锚点 + 各键前向共现校验 + 最近闭括号，语义即「同一对象形窗口内全键共现」。
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::error::{SieveError, SieveResult};
use crate::extractor::ExtractIter;
use crate::pruner::must_literal;

/// 默认迭代预算：单次提取尝试内 预过滤+修复+解码 的总重试上限
pub const DEFAULT_REPAIR_LIMIT: usize = 2000;

/// 对象外壳锚点正则：`{"` 起始 + 非 `{` 前缀（全局预编译）
static SHELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\{"[^{]*"#).unwrap());

/// 编译后的必现键模式集
/// 构建后不可变，可跨线程只读共享；每组必现键编译一次、复用于任意多条输入
#[derive(Debug)]
pub struct PatternSet {
    /// 单键正则（保持调用方顺序，首键兼任子文档下钻门闸）
    keys: Vec<Regex>,
    /// 每键的必现字面量门闸（None=该键无法证明必现子串，门闸放行）
    guards: Vec<Option<String>>,
    /// 迭代预算上限
    limit: usize,
}

impl PatternSet {
    /// 以默认迭代预算编译模式集
    /// 少于2个键时返回Config错误：单键场景下共现消歧没有意义
    pub fn compile(keys: &[&str]) -> SieveResult<Self> {
        Self::compile_with_limit(keys, DEFAULT_REPAIR_LIMIT)
    }

    /// 以指定迭代预算编译模式集
    pub fn compile_with_limit(raw_keys: &[&str], limit: usize) -> SieveResult<Self> {
        if raw_keys.len() < 2 {
            return Err(SieveError::Config(format!(
                "required key patterns: got {}, need at least 2",
                raw_keys.len()
            )));
        }

        // 重复键合法但无增益，仅告警提示
        let mut seen = FxHashSet::default();
        for key in raw_keys {
            if !seen.insert(*key) {
                log::warn!("Duplicate key pattern supplied: {}", key);
            }
        }

        let mut keys = Vec::with_capacity(raw_keys.len());
        let mut guards = Vec::with_capacity(raw_keys.len());
        for key in raw_keys {
            keys.push(Regex::new(key)?);
            guards.push(must_literal(key));
        }

        log::debug!(
            "Pattern set compiled: keys={} guarded={} limit={}",
            keys.len(),
            guards.iter().filter(|g| g.is_some()).count(),
            limit
        );

        Ok(Self { keys, guards, limit })
    }

    /// 单键正则列表（预过滤与子文档定位共用）
    #[inline(always)]
    pub fn keys(&self) -> &[Regex] {
        &self.keys
    }

    /// 必现字面量门闸列表
    #[inline(always)]
    pub fn guards(&self) -> &[Option<String>] {
        &self.guards
    }

    /// 迭代预算上限
    #[inline(always)]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 对象外壳锚点正则
    #[inline(always)]
    pub(crate) fn shell() -> &'static Regex {
        &SHELL_RE
    }

    /// 流式提取入口：惰性产出文本中所有满足全键共现的JSON对象
    /// 序列有限、按从左到右顺序产出；跨文本复用需重新调用以获得新游标
    pub fn extract_all<'p, 't>(&'p self, text: &'t str) -> ExtractIter<'p, 't> {
        ExtractIter::new(self, text)
    }
}
