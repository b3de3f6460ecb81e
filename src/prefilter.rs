//! 截断加速预过滤
//! 在文本上对每个必现键做一次首匹配定位，围绕最晚起始的键回溯/前探出
//! 有界候选窗口，避免结构扫描在任意长输入上全量执行。
//! 这是启发式提速层而非最终判定：窗口内的结构与共现由组合扫描复核。
use crate::pattern::PatternSet;
use crate::repair::{next_close_brace, Window};
use crate::utils::preview::preview_compact;

/// ASCII单词字节判定（与正则 \w 对齐）
#[inline(always)]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// 预过滤器：持有模式集引用，对单个文本窗口执行窄化
#[derive(Debug, Clone, Copy)]
pub struct PreFilter<'p> {
    set: &'p PatternSet,
}

impl<'p> PreFilter<'p> {
    pub fn new(set: &'p PatternSet) -> Self {
        Self { set }
    }

    /// 窄化候选窗口
    /// None即哨兵：本窗口放弃，由调用方决定推进或终止。
    /// 保守语义：要求全键在本窗口内至少各命中一次，缺一即哨兵
    pub fn narrow(&self, text: &str) -> Option<Window> {
        // 门闸：任一必现字面量缺失则对应键正则必不匹配，零正则成本拒绝
        for guard in self.set.guards().iter().flatten() {
            if !text.contains(guard.as_str()) {
                return None;
            }
        }

        // 全键首匹配定位，取最晚起始键L
        let mut latest = 0usize;
        for key in self.set.keys() {
            let m = key.find(text)?;
            latest = latest.max(m.start());
        }

        let start = left_edge(text, latest)?;
        let end = right_edge(text, latest)?;
        log::debug!(
            "Prefilter window [{}, {}) | latest_key_at={} | preview: {}",
            start,
            end,
            latest,
            preview_compact(&text[start..end], 120)
        );
        Some(Window::new(start, end))
    }
}

/// 左缘：自L回溯最近的「非单词内容 + `{`」边界
/// 文本起始视为有效边界；命中时退一位落在分隔内容上（对齐到字符边界）
fn left_edge(text: &str, latest: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut i = latest.min(bytes.len() - 1);
    loop {
        if bytes[i] == b'{' {
            if i == 0 {
                return Some(0);
            }
            if !is_word_byte(bytes[i - 1]) {
                let mut j = i - 1;
                while j > 0 && !text.is_char_boundary(j) {
                    j -= 1;
                }
                return Some(j);
            }
        }
        if i == 0 {
            return None;
        }
        i -= 1;
    }
}

/// 右缘：自L前探最近闭括号，窗口右开区间含该括号
fn right_edge(text: &str, latest: usize) -> Option<usize> {
    next_close_brace(text, latest).map(|p| p + 1)
}
