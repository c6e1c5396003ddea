use crate::domain::value_objects::project_type::ProjectType;
use serde::{Deserialize, Serialize};

/// プロジェクトエンティティ
///
/// レジストリに登録されたリモートリポジトリへの名前付き参照。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// プロジェクト名（レジストリ内で一意）
    pub name: String,

    /// リモートの種別
    #[serde(rename = "type", default)]
    pub project_type: ProjectType,

    /// クローン元のURL
    pub url: String,
}

impl Project {
    /// 新しいProjectインスタンスを作成
    pub fn new(
        name: impl Into<String>,
        project_type: ProjectType,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            project_type,
            url: url.into(),
        }
    }

    /// Git種別のプロジェクトを作成
    pub fn git(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, ProjectType::Git, url)
    }
}
