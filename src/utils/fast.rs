// src/utils/fast.rs
//! 查表：`hashbrown + AHash`；短序列：`SmallVec`
//!
//! 生成器只对这些表做点查，从不遍历它们来决定输出顺序，
//! 输出顺序只由声明的源顺序决定。

use ahash::RandomState;
pub use smallvec::SmallVec;

pub type FastMap<K, V> = hashbrown::HashMap<K, V, RandomState>;
pub type FastSet<K> = hashbrown::HashSet<K, RandomState>;

#[inline]
pub fn fast_map<K, V>() -> FastMap<K, V> {
    FastMap::with_hasher(RandomState::default())
}

#[inline]
pub fn fast_set<K>() -> FastSet<K> {
    FastSet::with_hasher(RandomState::default())
}

/// 绑定名对（`rowA, colA`）
pub type SmallVec2<T> = SmallVec<[T; 2]>;
/// 一条声明的形参（CBLAS 最多 14 个）
pub type SmallVec16<T> = SmallVec<[T; 16]>;

/// 字面量建表：`fast_map! { k => v, ... }`
#[macro_export]
macro_rules! fast_map {
    () => {{
        $crate::utils::fast::fast_map()
    }};
    ($($k:expr => $v:expr),+ $(,)?) => {{
        let mut __m = $crate::utils::fast::fast_map();
        $( __m.insert($k, $v); )+
        __m
    }};
}
