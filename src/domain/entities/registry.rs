use super::group::Group;
use super::project::Project;
use std::collections::BTreeMap;
use thiserror::Error;

/// Registry関連のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("project with name '{0}' already exists")]
    ProjectAlreadyExists(String),

    #[error("project with name '{0}' does not exist")]
    ProjectNotFound(String),

    #[error("group with name '{0}' already exists")]
    GroupAlreadyExists(String),

    #[error("group '{0}' does not exist in configuration")]
    GroupNotFound(String),
}

/// プロジェクトとグループのレジストリ
///
/// プロジェクト名はレジストリ全体で一意。プロジェクトを削除しても
/// グループ内の参照は自動では削除されない（`remove_project_from_groups`で明示的に掃除する）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    projects: BTreeMap<String, Project>,
    groups: BTreeMap<String, Group>,
}

impl Registry {
    /// 空のRegistryを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// プロジェクトを取得（存在しない場合はNone）
    pub fn get_project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    /// グループを取得（存在しない場合はNone）
    pub fn get_group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// プロジェクトが登録されているか
    pub fn has_project(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// 名前順のプロジェクト一覧
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// 名前順のグループ一覧
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn project_names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    /// 新しいプロジェクトを追加する。同名のプロジェクトが存在する場合はエラー
    pub fn add_project(&mut self, project: Project) -> Result<&Project, RegistryError> {
        if self.projects.contains_key(&project.name) {
            return Err(RegistryError::ProjectAlreadyExists(project.name));
        }
        let name = project.name.clone();
        Ok(self.projects.entry(name).or_insert(project))
    }

    /// プロジェクトを作成または上書きする。以前の値があれば返す
    pub fn set_project(&mut self, project: Project) -> Option<Project> {
        self.projects.insert(project.name.clone(), project)
    }

    /// プロジェクトを削除する（グループ内の参照は残る）
    pub fn remove_project(&mut self, name: &str) -> Option<Project> {
        self.projects.remove(name)
    }

    /// 全グループからプロジェクトへの参照を取り除き、変更されたグループ名を返す
    pub fn remove_project_from_groups(&mut self, project_name: &str) -> Vec<String> {
        self.groups
            .values_mut()
            .filter_map(|group| {
                group
                    .remove_project(project_name)
                    .then(|| group.name.clone())
            })
            .collect()
    }

    /// 空のグループを作成する
    pub fn create_group(&mut self, name: impl Into<String>) -> Result<&mut Group, RegistryError> {
        let name = name.into();
        if self.groups.contains_key(&name) {
            return Err(RegistryError::GroupAlreadyExists(name));
        }
        Ok(self
            .groups
            .entry(name.clone())
            .or_insert_with(|| Group::new(name)))
    }

    /// グループを作成または置き換える
    pub fn set_group(&mut self, group: Group) -> Option<Group> {
        self.groups.insert(group.name.clone(), group)
    }

    /// グループを削除する
    pub fn delete_group(&mut self, name: &str) -> Result<Group, RegistryError> {
        self.groups
            .remove(name)
            .ok_or_else(|| RegistryError::GroupNotFound(name.to_string()))
    }

    /// 登録済みのプロジェクトをグループに追加する
    ///
    /// 既にメンバーの場合は`Ok(false)`。
    pub fn add_project_to_group(
        &mut self,
        group_name: &str,
        project_name: &str,
    ) -> Result<bool, RegistryError> {
        if !self.projects.contains_key(project_name) {
            return Err(RegistryError::ProjectNotFound(project_name.to_string()));
        }
        let group = self
            .groups
            .get_mut(group_name)
            .ok_or_else(|| RegistryError::GroupNotFound(group_name.to_string()))?;
        Ok(group.add_project(project_name))
    }

    /// グループからプロジェクトを削除する。メンバーでなかった場合は`Ok(false)`
    pub fn remove_project_from_group(
        &mut self,
        group_name: &str,
        project_name: &str,
    ) -> Result<bool, RegistryError> {
        let group = self
            .groups
            .get_mut(group_name)
            .ok_or_else(|| RegistryError::GroupNotFound(group_name.to_string()))?;
        Ok(group.remove_project(project_name))
    }
}
