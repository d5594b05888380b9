//! Character (persona) definitions and the typed catalog used to resolve them.
//!
//! The catalog is read-only reference data: it is built once at startup,
//! either from the built-in personas or from a TOML file, and then shared by
//! the turn pipeline and the browse endpoints.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Character
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A persona definition. Only `id` and `prompt_template` drive the turn
/// pipeline; the rest is display metadata for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub conversation_count: u64,
    #[serde(default)]
    pub is_premium: bool,
    /// System prompt defining the persona's voice and behaviour.
    pub prompt_template: String,
    #[serde(default = "d_created_at")]
    pub created_at: DateTime<Utc>,
}

fn d_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

impl Character {
    /// Case-insensitive match against name, description and tags.
    fn matches_search(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
            || self
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(needle_lower))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Queries
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Filter + pagination parameters for browsing the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterQuery {
    /// Category name; `"all"` or absent disables the filter.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    /// 1-based page number (default 1).
    #[serde(default)]
    pub page: Option<usize>,
    /// Page size (default 10).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One page of catalog results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPage {
    pub characters: Vec<Character>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Catalog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Typed `id → Character` mapping that preserves catalog order.
#[derive(Debug, Clone)]
pub struct CharacterCatalog {
    characters: Vec<Character>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    characters: Vec<Character>,
}

impl CharacterCatalog {
    /// Build a catalog, rejecting duplicate ids and empty prompts.
    pub fn new(characters: Vec<Character>) -> Result<Self> {
        let mut index = HashMap::with_capacity(characters.len());
        for (i, c) in characters.iter().enumerate() {
            if c.id.trim().is_empty() {
                return Err(Error::Config(format!("character #{i} has an empty id")));
            }
            if c.prompt_template.trim().is_empty() {
                return Err(Error::Config(format!(
                    "character '{}' has an empty prompt_template",
                    c.id
                )));
            }
            if index.insert(c.id.clone(), i).is_some() {
                return Err(Error::Config(format!("duplicate character id '{}'", c.id)));
            }
        }
        Ok(Self { characters, index })
    }

    /// Parse a `[[characters]]` TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(raw).map_err(|e| Error::Config(format!("parsing characters: {e}")))?;
        Self::new(file.characters)
    }

    /// Load a catalog from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            characters = catalog.len(),
            "character catalog loaded"
        );
        Ok(catalog)
    }

    /// Resolve a character by id.
    pub fn get(&self, id: &str) -> Result<&Character> {
        self.index
            .get(id)
            .map(|&i| &self.characters[i])
            .ok_or_else(|| Error::CharacterNotFound(id.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    /// Filter by category/search and return the requested page.
    pub fn list(&self, query: &CharacterQuery) -> CharacterPage {
        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_lowercase);
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let filtered: Vec<&Character> = self
            .characters
            .iter()
            .filter(|c| match &category {
                Some(cat) => c.category.to_lowercase() == *cat,
                None => true,
            })
            .filter(|c| match &search {
                Some(needle) => c.matches_search(needle),
                None => true,
            })
            .collect();

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).max(1);
        let total = filtered.len();
        let total_pages = total.div_ceil(limit);

        let characters = filtered
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();

        CharacterPage {
            characters,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Distinct categories in first-seen order, with member counts.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut out: Vec<CategoryCount> = Vec::new();
        for c in &self.characters {
            match out.iter_mut().find(|cc| cc.name == c.category) {
                Some(cc) => cc.count += 1,
                None => out.push(CategoryCount {
                    name: c.category.clone(),
                    count: 1,
                }),
            }
        }
        out
    }

    /// The `n` highest-rated characters. Ties keep catalog order.
    pub fn featured(&self, n: usize) -> Vec<Character> {
        let mut sorted: Vec<&Character> = self.characters.iter().collect();
        sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        sorted.into_iter().take(n).cloned().collect()
    }

    /// The personas shipped with the application.
    pub fn builtin() -> Self {
        // Built-in ids are unique and every prompt is non-empty.
        let characters = builtin_characters();
        let index = characters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Self { characters, index }
    }
}

fn avatar(prompt: &str) -> Option<String> {
    Some(format!(
        "https://trae-api-sg.mchost.guru/api/ide/v1/text_to_image?prompt={prompt}&image_size=square"
    ))
}

#[allow(clippy::too_many_arguments)]
fn persona(
    id: &str,
    name: &str,
    description: &str,
    personality: &str,
    background: &str,
    category: &str,
    avatar_prompt: &str,
    tags: &[&str],
    rating: f32,
    conversation_count: u64,
    is_premium: bool,
    prompt_template: &str,
) -> Character {
    Character {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        personality: personality.into(),
        background: background.into(),
        category: category.into(),
        avatar_url: avatar(avatar_prompt),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        rating,
        conversation_count,
        is_premium,
        prompt_template: prompt_template.into(),
        created_at: d_created_at(),
    }
}

fn builtin_characters() -> Vec<Character> {
    vec![
        persona(
            "1",
            "哈利·波特",
            "霍格沃茨魔法学校的学生，拥有闪电疤痕的男孩",
            "勇敢、忠诚、有正义感",
            "在姨妈家长大，11岁时发现自己是巫师",
            "文学角色",
            "Harry%20Potter%20young%20wizard%20with%20lightning%20scar%20Hogwarts%20uniform",
            &["魔法", "冒险", "友谊"],
            4.8,
            1234,
            false,
            "你是哈利·波特，一个勇敢的年轻巫师。你在霍格沃茨魔法学校学习，拥有闪电疤痕。你的性格特点：勇敢、忠诚、有正义感。你经历了与伏地魔的斗争，有着丰富的魔法世界经验。请以哈利·波特的身份和语气回复用户，保持角色的一致性。",
        ),
        persona(
            "2",
            "苏格拉底",
            "古希腊哲学家，被誉为西方哲学的奠基人",
            "智慧、好奇、善于提问",
            "生活在公元前5世纪的雅典，以问答法著称",
            "历史人物",
            "Socrates%20ancient%20Greek%20philosopher%20wise%20beard%20toga",
            &["哲学", "智慧", "思辨"],
            4.9,
            2156,
            false,
            "你是苏格拉底，古希腊的智者和哲学家。你以问答法著称，善于通过提问引导他人思考。你的性格特点：智慧、好奇、善于提问。你相信\"我知道我一无所知\"，总是通过对话来探索真理。请以苏格拉底的身份和语气回复用户，多使用反问和引导性问题。",
        ),
        persona(
            "3",
            "心理咨询师",
            "专业的心理健康顾问",
            "耐心、理解、专业",
            "具有丰富的心理咨询经验",
            "虚拟助手",
            "professional%20psychologist%20counselor%20warm%20smile%20office%20setting",
            &["心理健康", "咨询", "专业"],
            4.7,
            3421,
            true,
            "你是一位专业的心理咨询师，具有丰富的心理健康咨询经验。你的性格特点：耐心、理解、专业。你善于倾听，能够提供专业的心理支持和建议。请以专业心理咨询师的身份回复用户，保持温暖、理解和专业的语气。",
        ),
        persona(
            "4",
            "爱因斯坦",
            "著名物理学家，相对论的提出者",
            "好奇、创新、幽默",
            "20世纪最伟大的科学家之一",
            "历史人物",
            "Albert%20Einstein%20physicist%20wild%20hair%20mustache%20genius",
            &["科学", "物理", "创新"],
            4.9,
            1876,
            false,
            "你是阿尔伯特·爱因斯坦，著名的物理学家和相对论的提出者。你的性格特点：好奇、创新、幽默。你对宇宙和自然规律有着深刻的理解，善于用简单的语言解释复杂的科学概念。请以爱因斯坦的身份和语气回复用户。",
        ),
        persona(
            "5",
            "夏洛克·福尔摩斯",
            "世界著名的咨询侦探",
            "敏锐、理性、观察力强",
            "居住在贝克街221B，与华生医生合作破案",
            "文学角色",
            "Sherlock%20Holmes%20detective%20deerstalker%20hat%20pipe%20Victorian%20era",
            &["推理", "侦探", "逻辑"],
            4.8,
            2987,
            true,
            "你是夏洛克·福尔摩斯，世界著名的咨询侦探。你的性格特点：敏锐、理性、观察力强。你善于通过细微的观察和逻辑推理解决复杂的案件。请以福尔摩斯的身份和语气回复用户，展现你的推理能力。",
        ),
    ]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> CharacterQuery {
        CharacterQuery::default()
    }

    #[test]
    fn builtin_has_five_personas_with_prompts() {
        let catalog = CharacterCatalog::builtin();
        assert_eq!(catalog.len(), 5);
        assert!(catalog.iter().all(|c| !c.prompt_template.is_empty()));
        // Rebuilding through the validating constructor must succeed.
        CharacterCatalog::new(catalog.iter().cloned().collect()).unwrap();
    }

    #[test]
    fn get_known_and_unknown() {
        let catalog = CharacterCatalog::builtin();
        assert_eq!(catalog.get("2").unwrap().name, "苏格拉底");
        let err = catalog.get("999").unwrap_err();
        assert!(matches!(err, Error::CharacterNotFound(ref id) if id == "999"));
    }

    #[test]
    fn category_filter_is_case_insensitive_and_all_disables_it() {
        let catalog = CharacterCatalog::builtin();
        let page = catalog.list(&CharacterQuery {
            category: Some("历史人物".into()),
            ..query()
        });
        assert_eq!(page.total, 2);
        assert!(page.characters.iter().all(|c| c.category == "历史人物"));

        let all = catalog.list(&CharacterQuery {
            category: Some("ALL".into()),
            ..query()
        });
        assert_eq!(all.total, 5);
    }

    #[test]
    fn search_matches_name_description_and_tags() {
        let catalog = CharacterCatalog::builtin();
        let by_tag = catalog.list(&CharacterQuery {
            search: Some("侦探".into()),
            ..query()
        });
        assert_eq!(by_tag.total, 1);
        assert_eq!(by_tag.characters[0].id, "5");

        let by_description = catalog.list(&CharacterQuery {
            search: Some("相对论".into()),
            ..query()
        });
        assert_eq!(by_description.characters[0].id, "4");

        let none = catalog.list(&CharacterQuery {
            search: Some("nobody".into()),
            ..query()
        });
        assert_eq!(none.total, 0);
        assert_eq!(none.total_pages, 0);
    }

    #[test]
    fn pagination() {
        let catalog = CharacterCatalog::builtin();
        let p2 = catalog.list(&CharacterQuery {
            page: Some(2),
            limit: Some(2),
            ..query()
        });
        assert_eq!(p2.total, 5);
        assert_eq!(p2.total_pages, 3);
        let ids: Vec<&str> = p2.characters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "4"]);

        let past_end = catalog.list(&CharacterQuery {
            page: Some(9),
            limit: Some(2),
            ..query()
        });
        assert!(past_end.characters.is_empty());

        let zeroes = catalog.list(&CharacterQuery {
            page: Some(0),
            limit: Some(0),
            ..query()
        });
        assert_eq!(zeroes.page, 1);
        assert_eq!(zeroes.limit, 1);
        assert_eq!(zeroes.characters.len(), 1);
    }

    #[test]
    fn categories_in_first_seen_order() {
        let catalog = CharacterCatalog::builtin();
        let cats = catalog.categories();
        assert_eq!(
            cats,
            vec![
                CategoryCount { name: "文学角色".into(), count: 2 },
                CategoryCount { name: "历史人物".into(), count: 2 },
                CategoryCount { name: "虚拟助手".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn featured_sorted_by_rating_stable() {
        let catalog = CharacterCatalog::builtin();
        let top = catalog.featured(3);
        let ids: Vec<&str> = top.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "1"]);
        assert_eq!(catalog.featured(6).len(), 5);
    }

    #[test]
    fn toml_catalog_parses_and_validates() {
        let raw = r#"
            [[characters]]
            id = "pirate"
            name = "Captain"
            category = "fun"
            promptTemplate = "You are a pirate."
            tags = ["sea"]
            rating = 4.2
        "#;
        let catalog = CharacterCatalog::from_toml_str(raw).unwrap();
        let c = catalog.get("pirate").unwrap();
        assert_eq!(c.prompt_template, "You are a pirate.");
        assert!(!c.is_premium);

        let dup = r#"
            [[characters]]
            id = "a"
            name = "A"
            promptTemplate = "x"
            [[characters]]
            id = "a"
            name = "B"
            promptTemplate = "y"
        "#;
        let err = CharacterCatalog::from_toml_str(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate character id 'a'"));

        let empty_prompt = r#"
            [[characters]]
            id = "a"
            name = "A"
            promptTemplate = "  "
        "#;
        assert!(CharacterCatalog::from_toml_str(empty_prompt).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("characters.toml");
        std::fs::write(
            &path,
            "[[characters]]\nid = \"x\"\nname = \"X\"\npromptTemplate = \"be x\"\n",
        )
        .unwrap();
        let catalog = CharacterCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn serializes_camel_case() {
        let catalog = CharacterCatalog::builtin();
        let json = serde_json::to_value(catalog.get("1").unwrap()).unwrap();
        assert!(json.get("promptTemplate").is_some());
        assert!(json.get("conversationCount").is_some());
        assert!(json.get("isPremium").is_some());
    }
}
