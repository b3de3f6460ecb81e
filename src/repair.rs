//! 括号平衡修复
//! 组合匹配对精确括号边界刻意不精确，本模块在原文上逐步移动候选窗口的
//! 左右边缘，使窗口内开/闭括号计数达到平衡。全部移动与退化分支共享同一
//! 迭代预算，保证恶意或深度畸形输入下必然终止。
use serde::{Deserialize, Serialize};

/// 候选窗口：原文上的半开字节区间 [start, end)
/// 括号均为ASCII字节，修复产生的偏移天然落在字符边界上
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    #[inline(always)]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// 取窗口对应的原文切片
    #[inline(always)]
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }

    /// 统计窗口内开/闭括号数
    #[inline]
    pub fn brace_counts(&self, text: &str) -> (usize, usize) {
        let mut opens = 0usize;
        let mut closes = 0usize;
        for &b in &text.as_bytes()[self.start..self.end] {
            match b {
                b'{' => opens += 1,
                b'}' => closes += 1,
                _ => {}
            }
        }
        (opens, closes)
    }
}

/// 最近前导开括号：在 before-1 之前回溯查找 `{`
/// 跳过紧贴 before 的位置，避免回溯原地踏步
#[inline]
pub(crate) fn prev_open_brace(text: &str, before: usize) -> Option<usize> {
    let cap = before.saturating_sub(1).min(text.len());
    text.as_bytes()[..cap].iter().rposition(|&b| b == b'{')
}

/// 最近后续闭括号：自 from（含）起前向查找 `}`
#[inline]
pub(crate) fn next_close_brace(text: &str, from: usize) -> Option<usize> {
    if from >= text.len() {
        return None;
    }
    text.as_bytes()[from..]
        .iter()
        .position(|&b| b == b'}')
        .map(|p| from + p)
}

/// 括号平衡修复器
/// 三个分支按固定顺序各自循环；退化方向（所需方向已无括号）计一次迭代后
/// 离开循环，窗口原样交还，由调用方复核平衡与可解码性
#[derive(Debug, Clone, Copy)]
pub struct BoundaryRepairer {
    limit: usize,
}

impl BoundaryRepairer {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// 修复窗口边界直至括号平衡或预算耗尽
    /// 计数器与调用方的当前提取尝试共享；返回到达的窗口，不保证平衡
    pub fn repair(&self, full: &str, mut win: Window, cnt: &mut usize) -> Window {
        let (mut opens, mut closes) = win.brace_counts(full);

        // 表面平衡：可能误捕内层对象，向外回溯寻找真实外层
        while opens == closes && *cnt < self.limit {
            *cnt += 1;
            match prev_open_brace(full, win.start) {
                Some(p) => win.start = p,
                None => break,
            }
            (opens, closes) = win.brace_counts(full);
        }

        // 开多闭少：组合匹配截停过早，右缘前探至下一个闭括号
        while opens > closes && *cnt < self.limit {
            *cnt += 1;
            match next_close_brace(full, win.end) {
                Some(p) => win.end = p + 1,
                None => break,
            }
            (opens, closes) = win.brace_counts(full);
        }

        // 闭多开少：组合匹配起步过晚，左缘回溯至上一个开括号
        while opens < closes && *cnt < self.limit {
            *cnt += 1;
            match prev_open_brace(full, win.start) {
                Some(p) => win.start = p,
                None => break,
            }
            (opens, closes) = win.brace_counts(full);
        }

        win
    }
}
