//! # 伴随力常数文件定位
//!
//! 按 phonopy 的命名约定，从 `<seedname>-phonopy.yaml` 推断同目录下的
//! `<seedname>-force_constants.hdf5`。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `regex` crate

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn seedname_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<seedname>.+)-phonopy\.ya?ml$").expect("seedname pattern is valid")
    })
}

/// 从文件名提取 seedname，不匹配时返回 None
pub fn seedname(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    seedname_pattern()
        .captures(name)
        .and_then(|caps| caps.name("seedname"))
        .map(|m| m.as_str())
}

/// 查找伴随的 HDF5 力常数文件
///
/// 文件名不匹配或候选文件不存在时返回 None，从不报错。
pub fn find_companion_fc(path: &Path) -> Option<PathBuf> {
    let seedname = seedname(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let candidate = dir.join(format!("{}-force_constants.hdf5", seedname));

    if candidate.exists() {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_seedname_matches_yaml_and_yml() {
        assert_eq!(seedname(Path::new("data/Si-phonopy.yaml")), Some("Si"));
        assert_eq!(seedname(Path::new("NaCl-2x2x2-phonopy.yml")), Some("NaCl-2x2x2"));
        assert_eq!(seedname(Path::new("phonopy.yaml")), None);
        assert_eq!(seedname(Path::new("Si-phonopy.yaml.bak")), None);
        assert_eq!(seedname(Path::new("-phonopy.yaml")), None);
    }

    #[test]
    fn test_companion_found_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("Si-phonopy.yaml");
        let hdf5 = dir.path().join("Si-force_constants.hdf5");
        fs::write(&yaml, "").unwrap();
        fs::write(&hdf5, "").unwrap();

        assert_eq!(find_companion_fc(&yaml), Some(hdf5));
    }

    #[test]
    fn test_companion_absent_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("Si-phonopy.yml");
        fs::write(&yaml, "").unwrap();

        assert_eq!(find_companion_fc(&yaml), None);
    }

    #[test]
    fn test_companion_ignored_for_unmatched_name() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("phonopy_disp.yaml");
        fs::write(&yaml, "").unwrap();
        // 即使存在同名 hdf5 也不应被使用
        fs::write(dir.path().join("phonopy_disp-force_constants.hdf5"), "").unwrap();
        fs::write(dir.path().join("force_constants.hdf5"), "").unwrap();

        assert_eq!(find_companion_fc(&yaml), None);
    }

    #[test]
    fn test_companion_must_be_in_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("Si-force_constants.hdf5"), "").unwrap();

        assert_eq!(find_companion_fc(&sub.join("Si-phonopy.yaml")), None);
    }
}
