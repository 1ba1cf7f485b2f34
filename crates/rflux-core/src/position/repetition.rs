//! 千日手（同一局面）検出用の履歴

/// 過去局面のハッシュ列
///
/// `make_move` 前のキーを積み、`undo_move` で最後の出現を取り除く。
/// null move は積まない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepetitionTable {
    keys: Vec<u64>,
}

impl RepetitionTable {
    pub fn new() -> Self {
        Self {
            keys: Vec::with_capacity(512),
        }
    }

    #[inline]
    pub fn put(&mut self, key: u64) {
        self.keys.push(key);
    }

    /// 最後に積まれた `key` を取り除く
    pub fn remove(&mut self, key: u64) {
        if let Some(pos) = self.keys.iter().rposition(|&k| k == key) {
            self.keys.remove(pos);
        } else {
            debug_assert!(false, "key {key:016x} not in repetition table");
        }
    }

    #[inline]
    pub fn exists(&self, key: u64) -> bool {
        self.keys.contains(&key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
