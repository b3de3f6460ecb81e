//! 必现字面量提取 - 预过滤加速门闸
//! 核心铁律(优先级最高)
//! 1. 仅提取正则匹配时100%必现的连续字面量，拿不准一概返回None，宁空勿脏
//! 2. 输入文本缺失某键的必现字面量 → 该键正则必然无法匹配 → 预过滤可零正则成本放弃窗口
//! 3. HIR解析失败(保守兜底)：绝不猜测，直接返回None
use regex_syntax::hir::{Hir, HirKind};
use regex_syntax::Parser;

/// 提取正则中最长的必现连续字面量子串
/// 返回None表示无法证明任何必现子串（保守兜底，门闸退化为放行）
pub fn must_literal(pattern: &str) -> Option<String> {
    let hir = Parser::new().parse(pattern).ok()?;
    let mut run = String::new();
    let mut best = String::new();
    collect_runs(&hir, &mut run, &mut best);
    promote(&mut run, &mut best);
    if best.is_empty() {
        None
    } else {
        Some(best)
    }
}

/// 递归收集连续字面量片段
/// 连续性规则：Literal/Concat延续当前片段，Capture透传，
/// min≥1的重复体自成独立片段，其余节点一律截断当前片段
fn collect_runs(hir: &Hir, run: &mut String, best: &mut String) {
    match hir.kind() {
        HirKind::Literal(lit) => match std::str::from_utf8(&lit.0) {
            Ok(s) => run.push_str(s),
            // 非UTF-8字面量无法参与&str包含判定，截断片段
            Err(_) => promote(run, best),
        },
        HirKind::Concat(parts) => {
            for part in parts {
                collect_runs(part, run, best);
            }
        }
        // 捕获组恰好匹配一次，直接透传
        HirKind::Capture(cap) => collect_runs(&cap.sub, run, best),
        // 重复体至少出现一次时其内部字面量仍必现，但与邻居不再连续
        HirKind::Repetition(rep) if rep.min >= 1 => {
            promote(run, best);
            collect_runs(&rep.sub, run, best);
            promote(run, best);
        }
        // Class/Alternation/Look/空重复等：必现性无法保证，截断片段
        _ => promote(run, best),
    }
}

/// 片段归档：当前片段更长则晋升为最优，随后清空重新累积
#[inline]
fn promote(run: &mut String, best: &mut String) {
    if run.len() > best.len() {
        std::mem::swap(run, best);
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_literal_pattern() {
        // 测试场景：纯字面量正则，整体即必现子串
        assert_eq!(must_literal("session_token"), Some("session_token".to_string()));
    }

    #[test]
    fn test_concat_with_class_keeps_longest_run() {
        // 测试场景：字面量 + 字符类重复，仅前段字面量必现
        assert_eq!(must_literal(r#""price":\d+"#), Some(r#""price":"#.to_string()));
    }

    #[test]
    fn test_alternation_returns_none() {
        // 测试场景：OR分支无必现保证，保守返回None
        assert_eq!(must_literal("alpha|beta"), None);
    }

    #[test]
    fn test_case_insensitive_returns_none() {
        // 测试场景：忽略大小写展开为字符类，无连续必现字面量
        assert_eq!(must_literal("(?i)token"), None);
    }

    #[test]
    fn test_repetition_min_one_inner_literal() {
        // 测试场景：min≥1重复体内部字面量仍必现
        assert_eq!(must_literal("(?:checkout)+"), Some("checkout".to_string()));
    }

    #[test]
    fn test_optional_prefix_keeps_suffix() {
        // 测试场景：可选前缀不必现，后缀字面量必现
        assert_eq!(must_literal("(?:www)?shop_id"), Some("shop_id".to_string()));
    }

    #[test]
    fn test_invalid_pattern_returns_none() {
        // 测试场景：HIR解析失败，保守兜底
        assert_eq!(must_literal("("), None);
    }
}
