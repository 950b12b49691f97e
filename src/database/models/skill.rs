use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: i64,
    #[sqlx(rename = "profile_id")]
    pub profile: i64,
    pub name: String,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSkill {
    pub profile: i64,
    pub name: String,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub level: Option<String>,
}

impl Skill {
    pub fn apply(&mut self, patch: SkillPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.level {
            self.level = Some(v);
        }
    }
}

/// Trim skill names and drop the blank ones.
pub fn clean_skill_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
