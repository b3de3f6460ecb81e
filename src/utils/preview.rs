use std::fmt::{self, Write};

// ======================== 输出截断工具函数 ========================
/// 空白折叠 + 定长截断的日志预览（零堆分配）
/// 逻辑：
/// 1. 连续空白折叠为单个空格，仅格式化输出，不修改原字符串
/// 2. 写满 max_len 个字符后以 ".." 提示截断并立即终止
/// 3. 全程无堆分配、无String创建
#[inline(always)]
pub fn preview_compact(s: &str, max_len: usize) -> impl fmt::Display + '_ {
    struct Preview<'a> {
        source: &'a str,
        max_len: usize,
    }

    impl fmt::Display for Preview<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut written = 0usize;
            let mut pending_space = false;

            for ch in self.source.chars() {
                if ch.is_whitespace() {
                    // 首字符前的空白直接丢弃，其余折叠为单个待写空格
                    pending_space = written > 0;
                    continue;
                }
                if written >= self.max_len {
                    return f.write_str("..");
                }
                if pending_space {
                    f.write_char(' ')?;
                    written += 1;
                    pending_space = false;
                    if written >= self.max_len {
                        return f.write_str("..");
                    }
                }
                f.write_char(ch)?;
                written += 1;
            }
            Ok(())
        }
    }

    Preview { source: s, max_len }
}
