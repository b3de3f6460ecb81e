//! rsjsonsieve - 嵌入式JSON对象提取引擎
//! 在任意（可能畸形/截断）的文本流中，按多个必现键模式的共现关系定位并
//! 提取最小满足JSON对象：预过滤窄化 → 结构扫描 → 括号平衡修复 →
//! 解码 → 子文档下钻。

// 全局错误类型
pub mod error;
// 模式集编译（必现键正则 + 外壳锚点 + 字面量门闸）
pub mod pattern;
// 必现字面量提取（预过滤加速门闸）
pub mod pruner;
// 截断加速预过滤
pub mod prefilter;
// 括号平衡修复
pub mod repair;
// 对象提取调度 + 流式迭代
pub mod extractor;
// 子文档定位
pub mod locator;
// 外部协作队列契约
pub mod queue;
// 通用工具
pub mod utils;

// 顶层导出常用类型
pub use error::{SieveError, SieveResult};
pub use extractor::{ExtractIter, ExtractionState, ObjectExtractor};
pub use locator::SubDocumentLocator;
pub use pattern::{PatternSet, DEFAULT_REPAIR_LIMIT};
pub use prefilter::PreFilter;
pub use queue::{KeyQueue, MemoryQueue};
pub use repair::{BoundaryRepairer, Window};
