//! Domain models mirroring the JSON documents produced by the corpus build.
//! These types stay light-weight data holders so the search, reader and UI
//! layers can focus on presentation logic. Field names on the wire are kept
//! exactly as the generator writes them; the Rust names are the readable ones.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One entry of `poets.json`. Loaded once per session and used for listing,
/// searching and picking a random poet.
pub struct PoetSummary {
    /// Stable identifier, also the file stem of the poet detail document.
    pub id: String,
    /// Display name, usually in Chinese characters.
    pub name: String,
    /// Romanized name. Searching matches it as well as `name`.
    #[serde(default)]
    pub pinyin: String,
    /// Number of poems in the poet's detail document.
    #[serde(rename = "poemCount", default)]
    pub poem_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One entry of `poems.json`. The generator abbreviates every key to keep the
/// file small, hence the single-letter renames.
pub struct PoemSummary {
    #[serde(rename = "t")]
    pub title: String,
    /// Author display name, denormalized for listing.
    #[serde(rename = "p")]
    pub author: String,
    /// Owning poet identifier.
    #[serde(rename = "i")]
    pub poet_id: String,
    /// Position of the poem inside the owning poet's `poems` array.
    #[serde(rename = "x")]
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Full poem as stored inside a poet detail document.
pub struct Poem {
    pub title: String,
    #[serde(default)]
    pub date: String,
    /// Body text with `\n` separated lines. Blank lines are significant.
    pub content: String,
}

impl Poem {
    /// Split the body into display lines, keeping empty lines so stanza breaks
    /// survive rendering.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Everything known about a single poet, fetched lazily when the detail screen
/// opens and discarded when the user navigates away.
pub struct PoetDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub poems: Vec<Poem>,
}

impl PoetDetail {
    pub fn poem(&self, index: usize) -> Option<&Poem> {
        self.poems.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poem_summary_reads_abbreviated_keys() {
        let raw = r#"{"t":"静夜思","p":"李白","i":"li-bai","x":3}"#;
        let poem: PoemSummary = serde_json::from_str(raw).unwrap();
        assert_eq!(poem.title, "静夜思");
        assert_eq!(poem.author, "李白");
        assert_eq!(poem.poet_id, "li-bai");
        assert_eq!(poem.index, 3);
    }

    #[test]
    fn poet_detail_tolerates_missing_optional_fields() {
        let raw = r#"{"id":"du-fu","name":"杜甫","poems":[{"title":"春望","content":"国破山河在\n\n城春草木深"}]}"#;
        let detail: PoetDetail = serde_json::from_str(raw).unwrap();
        assert_eq!(detail.pinyin, "");
        assert_eq!(detail.poems[0].date, "");
        let lines: Vec<&str> = detail.poems[0].lines().collect();
        assert_eq!(lines, vec!["国破山河在", "", "城春草木深"]);
    }

    #[test]
    fn poet_summary_reads_camel_case_count() {
        let raw = r#"{"id":"li-bai","name":"李白","pinyin":"libai","poemCount":5}"#;
        let poet: PoetSummary = serde_json::from_str(raw).unwrap();
        assert_eq!(poet.poem_count, 5);
    }
}
