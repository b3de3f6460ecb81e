//! 对象提取调度
//! 预过滤 → 结构扫描 → 括号修复 → JSON解码的重试环，以单调推进的扫描
//! 游标支持同一文本流上的多次提取。候选级失败全部在此吸收：一段畸形
//! 区域只会让提取推进或终止，绝不向调用方抛出。
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SieveError, SieveResult};
use crate::locator::SubDocumentLocator;
use crate::pattern::PatternSet;
use crate::prefilter::PreFilter;
use crate::repair::{next_close_brace, BoundaryRepairer, Window};
use crate::utils::preview::preview_compact;

/// 单流提取状态：扫描游标 + 迭代计数
/// 由单个ObjectExtractor独占；并行流必须各自构造独立实例
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct ExtractionState {
    /// 已消费区域末端（全文字节偏移，只增不减，同一流内绝不回扫）
    pub cursor: usize,
    /// 当前提取尝试内 预过滤+修复+解码 的累计迭代数
    pub cnt: usize,
}

/// 结构扫描结果：窗口内的相对候选区间
/// 外壳锚点直接落在 `{` 上，即内容真实起点，无需额外的起点剥离
struct ShellMatch {
    /// 对象外壳锚点（相对窗口）
    start: usize,
    /// 首个闭括号之后（相对窗口）
    end: usize,
}

/// 两阶段结构扫描（前瞻组合判定的无前瞻实现）
/// 外壳锚点逐个尝试：锚点之后（跳过 `{"`）全键均可命中才算结构匹配，
/// 匹配终点取锚点后首个闭括号
fn combined_scan(set: &PatternSet, window: &str) -> Option<ShellMatch> {
    for shell in PatternSet::shell().find_iter(window) {
        let anchor = shell.start();
        let ahead = &window[anchor + 2..];
        if !set.keys().iter().all(|k| k.is_match(ahead)) {
            continue;
        }
        // 首个闭括号需在 `{"` 之后至少一个字符；此后再无闭括号则整窗无望
        let close = next_close_brace(window, anchor + 3)?;
        return Some(ShellMatch {
            start: anchor,
            end: close + 1,
        });
    }
    None
}

/// 对象提取器：编排预过滤、结构扫描、边界修复与解码
pub struct ObjectExtractor<'p> {
    set: &'p PatternSet,
    repairer: BoundaryRepairer,
    state: ExtractionState,
}

impl<'p> ObjectExtractor<'p> {
    pub fn new(set: &'p PatternSet) -> Self {
        Self {
            set,
            repairer: BoundaryRepairer::new(set.limit()),
            state: ExtractionState::default(),
        }
    }

    /// 当前扫描游标（全文字节偏移）
    #[inline(always)]
    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    /// 提取下一个满足全键共现的JSON对象
    /// None表示本流再无匹配；同一个full应在整个流期间保持不变，
    /// 跨文本复用提取器会让游标失去意义
    pub fn extract_one(&mut self, full: &str) -> Option<Value> {
        // 计数器每次提取尝试归零
        self.state.cnt = 0;
        let tail_base = self.state.cursor.min(full.len());
        let tail = &full[tail_base..];

        match self.try_extract(tail) {
            Ok(Some((value, consumed_end))) => {
                // 游标越过已消费窗口，后续调用只扫描残余
                self.state.cursor = tail_base + consumed_end;
                let located = SubDocumentLocator::new(self.set).narrow(&value);
                if located.is_none() {
                    log::warn!(
                        "{}",
                        SieveError::Invariant("combined match and per-key patterns disagree")
                    );
                }
                located
            }
            Ok(None) => None,
            Err(err) => {
                // 候选级失败内部吸收，降级为无匹配
                log::debug!("Candidate abandoned: {}", err);
                None
            }
        }
    }

    /// 在残余文本上完成一次完整提取尝试
    /// Ok(None)=无匹配；Err(MalformedCandidate)=预算内无法解码（调用方吸收）
    fn try_extract(&mut self, tail: &str) -> SieveResult<Option<(Value, usize)>> {
        let prefilter = PreFilter::new(self.set);

        // 预过滤窗口内结构扫描失败时，向后推进窗口重试直至命中或文本耗尽
        let mut offset = 0usize;
        let (win, shell) = loop {
            let Some(w) = prefilter.narrow(&tail[offset..]) else {
                return Ok(None);
            };
            let abs = Window::new(offset + w.start, offset + w.end);
            if let Some(m) = combined_scan(self.set, abs.slice(tail)) {
                break (abs, m);
            }
            self.state.cnt += 1;
            if self.state.cnt >= self.set.limit() || abs.end >= tail.len() {
                return Ok(None);
            }
            offset = abs.end;
        };

        let mut cand = Window::new(win.start + shell.start, win.start + shell.end);
        log::debug!(
            "Structural match [{}, {}) | preview: {}",
            cand.start,
            cand.end,
            preview_compact(cand.slice(tail), 120)
        );

        // 修复+解码重试环：每次失败解码计入共享预算
        cand = self.repairer.repair(tail, cand, &mut self.state.cnt);
        loop {
            match serde_json::from_str::<Value>(cand.slice(tail)) {
                Ok(value) => return Ok(Some((value, cand.end))),
                Err(_) if self.state.cnt < self.set.limit() => {
                    self.state.cnt += 1;
                    cand = self.repairer.repair(tail, cand, &mut self.state.cnt);
                }
                Err(e) => {
                    return Err(SieveError::MalformedCandidate(format!(
                        "budget exhausted after {} iterations: {}",
                        self.state.cnt, e
                    )));
                }
            }
        }
    }
}

/// 惰性流式提取迭代器
/// 有限序列，按从左到右顺序产出；跨文本不可复用（游标单调性随文本失效）
pub struct ExtractIter<'p, 't> {
    extractor: ObjectExtractor<'p>,
    text: &'t str,
    done: bool,
}

impl<'p, 't> ExtractIter<'p, 't> {
    pub(crate) fn new(set: &'p PatternSet, text: &'t str) -> Self {
        Self {
            extractor: ObjectExtractor::new(set),
            text,
            done: false,
        }
    }
}

impl Iterator for ExtractIter<'_, '_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.done {
            return None;
        }
        match self.extractor.extract_one(self.text) {
            Some(value) => Some(value),
            None => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(keys: &[&str]) -> PatternSet {
        PatternSet::compile(keys).unwrap()
    }

    #[test]
    fn test_single_embedded_object_extracted_once() {
        // 测试场景：文本中嵌入单个满足全键的对象，恰好产出一次
        let text = r#"<div>noise</div> {"alpha":1,"beta":2} <footer>"#;
        let set = set(&["alpha", "beta"]);
        let results: Vec<Value> = set.extract_all(text).collect();
        assert_eq!(results, vec![json!({"alpha":1,"beta":2})]);
    }

    #[test]
    fn test_bare_object_input() {
        // 测试场景：输入就是对象本身（无前后杂质）
        let text = r#"{"alpha":1,"beta":2}"#;
        let set = set(&["alpha", "beta"]);
        let results: Vec<Value> = set.extract_all(text).collect();
        assert_eq!(results, vec![json!({"alpha":1,"beta":2})]);
    }

    #[test]
    fn test_under_captured_boundary_repaired_to_outer() {
        // 测试场景：组合匹配截停于内层闭括号，修复必须恢复真实外层对象；
        // 以结果重序列化包含两个必现子串验证
        let text = r#"log: {"alpha":"x","beta":{"deep":1},"tail":"y"} end"#;
        let set = set(&["alpha", "beta"]);
        let results: Vec<Value> = set.extract_all(text).collect();
        assert_eq!(results.len(), 1);
        let serialized = serde_json::to_string(&results[0]).unwrap();
        assert!(serialized.contains("alpha"));
        assert!(serialized.contains("beta"));
        assert_eq!(results[0]["tail"], json!("y"));
    }

    #[test]
    fn test_two_disjoint_objects_streamed_in_order() {
        // 测试场景：两个不相交的合格对象被非JSON文本分隔，依序全部产出，
        // 游标只增不减、绝不回扫已消费区域
        let text = r#"{"alpha":1,"beta":2} -- noise -- {"alpha":3,"beta":4}"#;
        let set = set(&["alpha", "beta"]);
        let mut extractor = ObjectExtractor::new(&set);

        let first = extractor.extract_one(text).unwrap();
        assert_eq!(first, json!({"alpha":1,"beta":2}));
        let cursor_after_first = extractor.cursor();

        let second = extractor.extract_one(text).unwrap();
        assert_eq!(second, json!({"alpha":3,"beta":4}));
        assert!(extractor.cursor() > cursor_after_first);

        assert!(extractor.extract_one(text).is_none());
    }

    #[test]
    fn test_nested_object_narrowed_to_deepest() {
        // 测试场景：外层与内层对象均满足全键，产出最深的内层对象
        let text = r#"{"alpha":1,"beta":2,"nested":{"alpha":9,"beta":8}}"#;
        let set = set(&["alpha", "beta"]);
        let results: Vec<Value> = set.extract_all(text).collect();
        assert_eq!(results, vec![json!({"alpha":9,"beta":8})]);
    }

    #[test]
    fn test_no_keys_means_empty_stream() {
        // 测试场景：键不共现，流为空
        let text = r#"{"alpha":1} and {"beta":2} never together"#;
        let set = set(&["alpha", "beta"]);
        assert_eq!(set.extract_all(text).count(), 0);
    }

    #[test]
    fn test_truncated_object_yields_nothing() {
        // 测试场景：对象被截断（无闭括号），预过滤右缘失败，流为空
        let text = r#"{"alpha":1,"beta":2"#;
        let set = set(&["alpha", "beta"]);
        assert_eq!(set.extract_all(text).count(), 0);
    }

    #[test]
    fn test_budget_exhaustion_returns_empty_not_hang() {
        // 测试场景：键后嵌套深度超出迭代预算，该候选放弃、调用返回空而非悬挂
        let text = r#"{"alpha":1,"beta":2,"n":{"n":{"n":{"n":{"n":1}}}}}"#;
        let tight = PatternSet::compile_with_limit(&["alpha", "beta"], 2).unwrap();
        assert_eq!(tight.extract_all(text).count(), 0);

        // 同一文本在默认预算下应完整恢复外层对象
        let roomy = set(&["alpha", "beta"]);
        let results: Vec<Value> = roomy.extract_all(text).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["n"]["n"]["n"]["n"]["n"], json!(1));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        // 测试场景：相同模式集+相同文本+全新提取器，两次结果序列一致
        let text = r#"x {"alpha":1,"beta":2} y {"alpha":3,"beta":4} z"#;
        let set = set(&["alpha", "beta"]);
        let first: Vec<Value> = set.extract_all(text).collect();
        let second: Vec<Value> = set.extract_all(text).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let set = set(&["alpha", "beta"]);
        assert_eq!(set.extract_all("").count(), 0);
    }

    #[test]
    fn test_regex_key_patterns_supported() {
        // 测试场景：键是真正的正则而非字面量
        let text = r#"{"alpha_7":1,"beta_code":"Q"}"#;
        let set = set(&[r"alpha_\d+", r"beta_\w+"]);
        let results: Vec<Value> = set.extract_all(text).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["alpha_7"], json!(1));
    }

    #[test]
    fn test_malformed_region_then_valid_object() {
        // 测试场景：游标越过已消费区域后，残余文本中的下一个对象仍可提取
        let text = r#"{"alpha":0,"beta":0} ((( garbage %% ))) {"alpha":5,"beta":6}"#;
        let set = set(&["alpha", "beta"]);
        let results: Vec<Value> = set.extract_all(text).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1], json!({"alpha":5,"beta":6}));
    }
}
