/// グループの定義
///
/// プロジェクト名の順序付きリスト。重複は許可しない。
/// メンバーが参照するプロジェクトの存在はプル時に遅延検証される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// グループ名
    pub name: String,

    /// 追加順に並んだプロジェクト名
    members: Vec<String>,
}

impl Group {
    /// 空のGroupインスタンスを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// メンバーを指定してGroupを作成（重複は除去される）
    pub fn with_members<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut group = Self::new(name);
        for member in members {
            group.add_project(member);
        }
        group
    }

    /// メンバーのプロジェクト名
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// プロジェクトがグループに含まれているか
    pub fn has_project(&self, project_name: &str) -> bool {
        self.members.iter().any(|m| m == project_name)
    }

    /// プロジェクトを末尾に追加する
    ///
    /// 既に含まれている場合は何もせず`false`を返す。
    pub fn add_project(&mut self, project_name: impl Into<String>) -> bool {
        let project_name = project_name.into();
        if self.has_project(&project_name) {
            return false;
        }
        self.members.push(project_name);
        true
    }

    /// プロジェクトを削除する。含まれていなかった場合は`false`
    pub fn remove_project(&mut self, project_name: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != project_name);
        before != self.members.len()
    }
}
