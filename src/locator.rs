//! 子文档定位
//! 对解码成功的候选对象做深度优先下钻，定位仍满足全键共现的最深嵌套
//! 对象；深层命中覆盖浅层命中，最深者胜。判定基准是节点的紧凑序列化
//! 形式（serde_json 默认输出，无多余空白）。
use serde_json::Value;

use crate::pattern::PatternSet;

/// 子文档定位器：持有模式集引用，对单个解码值执行窄化
#[derive(Debug, Clone, Copy)]
pub struct SubDocumentLocator<'p> {
    set: &'p PatternSet,
}

impl<'p> SubDocumentLocator<'p> {
    pub fn new(set: &'p PatternSet) -> Self {
        Self { set }
    }

    /// 返回最深的全键满足子对象
    /// 根对象本应至少自身满足（它通过了组合扫描）；若连根都不满足，
    /// 说明组合匹配与单键判定不一致，返回None交由调用方告警
    pub fn narrow(&self, value: &Value) -> Option<Value> {
        let mut best = None;
        self.descend(value, &mut best);
        best
    }

    fn descend(&self, node: &Value, best: &mut Option<Value>) {
        match node {
            Value::Object(map) => {
                let serialized = serialize(node);
                if self.satisfies_all(&serialized) {
                    // 后写覆盖前写，递归顺序保证最深者胜
                    *best = Some(node.clone());
                }
                // 首键兼任下钻门闸：子值序列化中连首键都不含则不可能更优
                let Some(first_key) = self.set.keys().first() else {
                    return;
                };
                for child in map.values() {
                    if first_key.is_match(&serialize(child)) {
                        self.descend(child, best);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.descend(item, best);
                }
            }
            _ => {}
        }
    }

    #[inline]
    fn satisfies_all(&self, serialized: &str) -> bool {
        self.set.keys().iter().all(|k| k.is_match(serialized))
    }
}

/// 定位期的规范序列化形式
#[inline]
fn serialize(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
