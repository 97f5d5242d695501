use anyhow::{Context, Result};
use serde_json::Value;

use crate::api::{ApiSource, hero_detail_path};
use crate::directory::{HeroDirectory, HeroId};

#[derive(Debug, Clone, PartialEq)]
pub struct HeroDetailView {
    pub id: HeroId,
    pub name: String,
    pub head_url: String,
    pub roles: Vec<String>,
    pub lanes: Vec<String>,
    pub difficulty: String,
    pub specialities: Vec<String>,
    pub story: Option<String>,
    pub skills: Vec<Skill>,
    pub relations: Vec<RelationGroup>,
    pub lore_url: Option<String>,
}

impl HeroDetailView {
    pub fn relation(&self, kind: RelationKind) -> Option<&RelationGroup> {
        self.relations.iter().find(|r| r.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub name: String,
    pub icon_url: String,
    pub description: String,
    pub tags: Vec<SkillTag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillTag {
    pub label: String,
    /// `"r,g,b"` exactly as the API sends it.
    pub rgb: String,
}

impl SkillTag {
    pub fn rgb_components(&self) -> Option<(u8, u8, u8)> {
        let mut parts = self.rgb.split(',').map(|p| p.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((r, g, b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Assist,
    Strong,
    Weak,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [
        RelationKind::Assist,
        RelationKind::Strong,
        RelationKind::Weak,
    ];

    fn key(self) -> &'static str {
        match self {
            RelationKind::Assist => "assist",
            RelationKind::Strong => "strong",
            RelationKind::Weak => "weak",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RelationKind::Assist => "Best Partners",
            RelationKind::Strong => "Strong Against",
            RelationKind::Weak => "Weak Against",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationGroup {
    pub kind: RelationKind,
    pub description: String,
    pub hero_heads: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Detail(Box<HeroDetailView>),
    /// The name has no entry in the directory index.
    NotFound(String),
    /// The detail response lacks the nested hero object.
    Malformed,
}

pub fn resolve_hero_detail(
    api: &dyn ApiSource,
    directory: &HeroDirectory,
    display_name: &str,
) -> Result<DetailOutcome> {
    let Some(id) = directory.lookup(display_name) else {
        log::info!("hero {display_name:?} not in directory");
        return Ok(DetailOutcome::NotFound(display_name.to_string()));
    };

    let body = api
        .get(&hero_detail_path(id.as_str()))
        .with_context(|| format!("hero detail request failed (id {id})"))?;
    match parse_hero_detail_json(id.clone(), &body)? {
        Some(view) => Ok(DetailOutcome::Detail(Box::new(view))),
        None => {
            log::warn!("hero detail for id {id} is missing the hero payload");
            Ok(DetailOutcome::Malformed)
        }
    }
}

/// `Ok(None)` when the body is valid json but has no
/// `data.records[0].data.hero.data` object.
pub fn parse_hero_detail_json(id: HeroId, raw: &str) -> Result<Option<HeroDetailView>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid hero detail json")?;
    let record = root
        .get("data")
        .and_then(|v| v.get("records"))
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("data"))
        .unwrap_or(&Value::Null);
    let Some(hero) = record
        .get("hero")
        .and_then(|v| v.get("data"))
        .filter(|v| v.is_object())
    else {
        return Ok(None);
    };

    let relation = record.get("relation").unwrap_or(&Value::Null);
    let relations = RelationKind::ALL
        .into_iter()
        .filter_map(|kind| parse_relation(kind, relation.get(kind.key())))
        .collect();

    Ok(Some(HeroDetailView {
        id,
        name: str_field(hero, "name"),
        head_url: str_field(hero, "head"),
        roles: string_list(hero.get("sortlabel")),
        lanes: string_list(hero.get("roadsortlabel")),
        difficulty: hero
            .get("difficulty")
            .map(value_to_string)
            .unwrap_or_else(|| "-".to_string()),
        specialities: string_list(hero.get("speciality")),
        story: hero
            .get("story")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        skills: parse_skills(hero.get("heroskilllist")),
        relations,
        lore_url: record
            .get("url")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }))
}

fn parse_skills(groups: Option<&Value>) -> Vec<Skill> {
    let Some(skills) = groups
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("skilllist"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    skills
        .iter()
        .filter(|s| s.is_object())
        .map(|skill| Skill {
            name: str_field(skill, "skillname"),
            icon_url: str_field(skill, "skillicon"),
            description: str_field(skill, "skilldesc"),
            tags: skill
                .get("skilltag")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter(|t| t.is_object())
                        .map(|tag| SkillTag {
                            label: str_field(tag, "tagname"),
                            rgb: tag.get("tagrgb").map(value_to_string).unwrap_or_default(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect()
}

fn parse_relation(kind: RelationKind, group: Option<&Value>) -> Option<RelationGroup> {
    let group = group?;
    let targets = group.get("target_hero").and_then(Value::as_array)?;
    if !targets.first().is_some_and(Value::is_object) {
        return None;
    }
    let hero_heads = targets
        .iter()
        .filter_map(|t| t.get("data")?.get("head")?.as_str())
        .map(str::to_string)
        .collect();
    Some(RelationGroup {
        kind,
        description: str_field(group, "desc"),
        hero_heads,
    })
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => {
            if *b {
                "yes".to_string()
            } else {
                "no".to_string()
            }
        }
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Skill descriptions carry inline markup such as `<font color=..>`; this
/// drops the tags for plain-text rendering.
pub fn plain_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{SkillTag, plain_text};

    #[test]
    fn rgb_triple_parses_when_well_formed() {
        let tag = |rgb: &str| SkillTag {
            label: "CC".to_string(),
            rgb: rgb.to_string(),
        };
        assert_eq!(tag("255, 90,0").rgb_components(), Some((255, 90, 0)));
        assert_eq!(tag("300,0,0").rgb_components(), None);
        assert_eq!(tag("1,2").rgb_components(), None);
        assert_eq!(tag("1,2,3,4").rgb_components(), None);
    }

    #[test]
    fn plain_text_strips_markup() {
        assert_eq!(
            plain_text("Deals <font color=\"#ff0\">120</font>\n physical  damage."),
            "Deals 120 physical damage."
        );
    }
}
