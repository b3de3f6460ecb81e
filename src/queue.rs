//! 外部协作队列契约
//! 引擎核心不做任何I/O；提取出的键/结果的跨进程持久排队通过本契约交由
//! 外部实现。持久实现必须满足两条硬性保证：
//! 1. 共享同一后备文件的进程间互斥（带有界等待超时的建议锁）
//! 2. 已写入的键仅在其写事务提交后才对其他进程可见
use rustc_hash::FxHashMap;

/// 进程安全字符串队列契约
/// 重复put同一键不是错误；pop不存在的键为空操作
pub trait KeyQueue {
    /// 获取/初始化持久存储；对同一后备文件幂等
    fn open(&mut self);

    /// 持久记录每个键的存在
    fn put(&mut self, keys: &[&str]);

    /// 读取键对应的存储值；缺席返回None
    fn get(&self, key: &str) -> Option<String>;

    /// 成员判定
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 移除键（缺席键静默跳过）
    fn pop(&mut self, keys: &[&str]);

    /// 当前全部键的快照迭代
    fn iter_keys(&self) -> Vec<String>;

    /// 队列是否为空
    fn is_empty(&self) -> bool;

    /// 压实后备存储回收空间；仅允许在无并发写者时执行
    fn vacuum(&mut self);
}

/// 进程内队列实现
/// 供测试与单进程调用方使用；跨进程持久场景应换用满足契约保证的
/// 外部后备实现（嵌入式事务KV存储 + 文件建议锁）
#[derive(Debug, Default)]
pub struct MemoryQueue {
    entries: FxHashMap<String, String>,
    /// 插入顺序，供快照迭代保持稳定输出
    order: Vec<String>,
    opened: bool,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 自上次open/vacuum以来写入的键数
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl KeyQueue for MemoryQueue {
    fn open(&mut self) {
        // 幂等：重复open不清空已有内容
        self.opened = true;
    }

    fn put(&mut self, keys: &[&str]) {
        debug_assert!(self.opened, "put before open");
        for &k in keys {
            if self.entries.insert(k.to_string(), String::new()).is_none() {
                self.order.push(k.to_string());
            }
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn pop(&mut self, keys: &[&str]) {
        for &k in keys {
            if self.entries.remove(k).is_some() {
                self.order.retain(|stored| stored != k);
            }
        }
    }

    fn iter_keys(&self) -> Vec<String> {
        self.order.clone()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn vacuum(&mut self) {
        self.order.shrink_to_fit();
        self.entries.shrink_to_fit();
    }
}
