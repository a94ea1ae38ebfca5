//! 写真の役割（位置ベースの業務ルール）
//!
//! 先頭N枚は外装パネル写真（ロゴ/タイプ判定対象）、
//! 末尾M枚は車内写真（アメニティ判定対象）。
//! 位置判定はここに集約し、呼び出し側で `index < 10` を書かない。

use serde::{Deserialize, Serialize};

/// クライアントごとの撮影レイアウト
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutPolicy {
    /// 外装パネル写真の枚数（先頭から）
    pub panel_count: usize,
    /// 車内写真の枚数（末尾から）
    pub interior_count: usize,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            panel_count: 10,
            interior_count: 4,
        }
    }
}

impl LayoutPolicy {
    /// 位置から役割を判定
    pub fn role_of(&self, index: usize, total: usize) -> PhotoRole {
        if index >= total {
            return PhotoRole::default();
        }
        PhotoRole {
            panel: index < self.panel_count,
            interior: index >= total.saturating_sub(self.interior_count),
        }
    }
}

/// 写真1枚の役割
///
/// 枚数が `panel_count + interior_count` 未満の場合は両方が立つことがある。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRole {
    pub panel: bool,
    pub interior: bool,
}

impl PhotoRole {
    pub const PANEL: PhotoRole = PhotoRole { panel: true, interior: false };
    pub const INTERIOR: PhotoRole = PhotoRole { panel: false, interior: true };
    pub const OTHER: PhotoRole = PhotoRole { panel: false, interior: false };
}

/// 写真リスト全体の役割マップ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoRoleMap {
    roles: Vec<PhotoRole>,
}

impl PhotoRoleMap {
    /// 写真枚数とレイアウトから一度だけ計算
    pub fn build(total: usize, policy: &LayoutPolicy) -> Self {
        let roles = (0..total).map(|i| policy.role_of(i, total)).collect();
        Self { roles }
    }

    /// 範囲外は役割なし
    pub fn role(&self, index: usize) -> PhotoRole {
        self.roles.get(index).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PhotoRole> + '_ {
        self.roles.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_fourteen_photos() {
        let map = PhotoRoleMap::build(14, &LayoutPolicy::default());
        assert_eq!(map.len(), 14);

        for i in 0..10 {
            assert_eq!(map.role(i), PhotoRole::PANEL, "index {}", i);
        }
        for i in 10..14 {
            assert_eq!(map.role(i), PhotoRole::INTERIOR, "index {}", i);
        }
    }

    #[test]
    fn test_gap_between_panel_and_interior() {
        let map = PhotoRoleMap::build(20, &LayoutPolicy::default());
        assert_eq!(map.role(9), PhotoRole::PANEL);
        assert_eq!(map.role(10), PhotoRole::OTHER);
        assert_eq!(map.role(15), PhotoRole::OTHER);
        assert_eq!(map.role(16), PhotoRole::INTERIOR);
    }

    #[test]
    fn test_short_set_overlaps() {
        let map = PhotoRoleMap::build(12, &LayoutPolicy::default());
        assert_eq!(map.role(7), PhotoRole::PANEL);
        assert_eq!(map.role(8), PhotoRole { panel: true, interior: true });
        assert_eq!(map.role(11), PhotoRole::INTERIOR);
    }

    #[test]
    fn test_fewer_than_interior_count() {
        let map = PhotoRoleMap::build(3, &LayoutPolicy::default());
        assert!(map.iter().all(|r| r.panel && r.interior));
    }

    #[test]
    fn test_out_of_range() {
        let map = PhotoRoleMap::build(5, &LayoutPolicy::default());
        assert_eq!(map.role(5), PhotoRole::OTHER);
        assert!(PhotoRoleMap::build(0, &LayoutPolicy::default()).is_empty());
    }

    #[test]
    fn test_custom_policy() {
        let policy = LayoutPolicy { panel_count: 2, interior_count: 1 };
        let map = PhotoRoleMap::build(5, &policy);
        let roles: Vec<PhotoRole> = map.iter().collect();
        assert_eq!(
            roles,
            vec![
                PhotoRole::PANEL,
                PhotoRole::PANEL,
                PhotoRole::OTHER,
                PhotoRole::OTHER,
                PhotoRole::INTERIOR,
            ]
        );
    }
}
