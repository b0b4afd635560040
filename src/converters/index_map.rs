//! # 超胞 → 原胞索引映射
//!
//! phonopy 的 `s2p_map` 用超胞索引标识原胞原子（如 p2s = [0, 4]，
//! s2p = [0, 0, 0, 0, 4, 4, 4, 4]），euphonic 需要原胞索引
//! （[0, 0, 0, 0, 1, 1, 1, 1]）。
//!
//! ## 依赖关系
//! - 被 `converters/assemble.rs` 使用
//! - 使用 `error.rs`

use crate::error::{ConvertError, Result};
use std::collections::HashMap;

/// 计算 `s2p_index[i] = j`，其中 `s2p_map[i] == p2s_map[j]`
///
/// `p2s_map` 中的值必须互不相同，且 `s2p_map` 的每个值都必须出现在
/// `p2s_map` 中；否则模型自相矛盾，返回错误而不是任选一个匹配。
pub fn s2p_index(p2s_map: &[usize], s2p_map: &[usize]) -> Result<Vec<usize>> {
    let mut position: HashMap<usize, usize> = HashMap::with_capacity(p2s_map.len());
    for (j, &value) in p2s_map.iter().enumerate() {
        if let Some(first) = position.insert(value, j) {
            return Err(ConvertError::InconsistentIndexMap(format!(
                "p2s_map value {} appears at both primitive atoms {} and {}",
                value, first, j
            )));
        }
    }

    s2p_map
        .iter()
        .enumerate()
        .map(|(i, value)| {
            position.get(value).copied().ok_or_else(|| {
                ConvertError::InconsistentIndexMap(format!(
                    "supercell atom {} maps to {}, which is not in p2s_map {:?}",
                    i, value, p2s_map
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_atoms_repeated_four_times() {
        let idx = s2p_index(&[0, 4], &[0, 0, 0, 0, 4, 4, 4, 4]).unwrap();
        assert_eq!(idx, vec![0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_interleaved_supercell() {
        let idx = s2p_index(&[0, 1, 2], &[0, 1, 2, 0, 1, 2]).unwrap();
        assert_eq!(idx, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_each_index_appears_k_times() {
        let (n, k) = (3usize, 8usize);
        let p2s: Vec<usize> = (0..n).map(|j| j * k).collect();
        let s2p: Vec<usize> = (0..n * k).map(|i| (i / k) * k).collect();

        let idx = s2p_index(&p2s, &s2p).unwrap();
        assert_eq!(idx.len(), n * k);
        assert!(idx.iter().all(|&j| j < n));
        for j in 0..n {
            assert_eq!(idx.iter().filter(|&&x| x == j).count(), k);
        }
    }

    #[test]
    fn test_duplicate_p2s_value_rejected() {
        let err = s2p_index(&[0, 0], &[0, 0, 0, 0]).unwrap_err();
        match err {
            ConvertError::InconsistentIndexMap(msg) => assert!(msg.contains("value 0")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unknown_s2p_value_rejected() {
        let err = s2p_index(&[0, 4], &[0, 0, 3, 4]).unwrap_err();
        match err {
            ConvertError::InconsistentIndexMap(msg) => assert!(msg.contains("supercell atom 2")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_maps() {
        assert_eq!(s2p_index(&[], &[]).unwrap(), Vec::<usize>::new());
    }
}
