//! URL surface of the reader: `/`, `/poet/:id`, an optional `?poemId=<n>`
//! and the `#poem-<n>` fragment that tracks the open poem.

use std::fmt;

/// Prefix of the fragment naming the open poem.
pub const FRAGMENT_PREFIX: &str = "poem-";
/// Query parameter selecting the initial poem when arriving from a link.
pub const POEM_ID_PARAM: &str = "poemId";
/// Site used for links when the corpus is not served over http.
pub const APP_SCHEME: &str = "shiku:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Index,
    Poet { id: String },
}

/// A parsed location. Query and fragment values are kept raw; whether they
/// name a real poem is only known once the poet document has loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    route: Route,
    poem_id: Option<String>,
    fragment: Option<String>,
}

impl Location {
    pub fn index() -> Self {
        Self {
            route: Route::Index,
            poem_id: None,
            fragment: None,
        }
    }

    pub fn poet(id: &str, poem: Option<usize>) -> Self {
        Self {
            route: Route::Poet { id: id.to_string() },
            poem_id: poem.map(|p| p.to_string()),
            fragment: None,
        }
    }

    /// Parse a path (`/poet/li-bai?poemId=2#poem-3`) or a full URL. Unknown
    /// paths fall back to the index, like a single-page host would.
    pub fn parse(input: &str) -> Self {
        let rest = strip_origin(input.trim());
        let (rest, fragment) = match rest.split_once('#') {
            Some((head, frag)) => (head, Some(frag.to_string())),
            None => (rest, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((head, query)) => (head, Some(query)),
            None => (rest, None),
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [.., "poet", id] => Route::Poet { id: id.to_string() },
            _ => Route::Index,
        };

        let poem_id = query.and_then(|q| {
            q.split('&').find_map(|pair| match pair.split_once('=') {
                Some((key, value)) if key == POEM_ID_PARAM => Some(value.to_string()),
                _ => None,
            })
        });

        Self {
            route,
            poem_id,
            fragment: fragment.filter(|f| !f.is_empty()),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn poet_id(&self) -> Option<&str> {
        match &self.route {
            Route::Poet { id } => Some(id),
            Route::Index => None,
        }
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn poem_param(&self) -> Option<&str> {
        self.poem_id.as_deref()
    }

    /// Point the fragment at `index` in place; this never creates a new
    /// history entry.
    pub fn replace_fragment(&mut self, index: usize) {
        self.fragment = Some(fragment_for(index));
    }

    pub fn path(&self) -> String {
        match &self.route {
            Route::Index => "/".to_string(),
            Route::Poet { id } => format!("/poet/{id}"),
        }
    }

    /// Full URL of this location under `site`.
    pub fn href(&self, site: &str) -> String {
        format!("{}{}", site.trim_end_matches('/'), self)
    }

    /// Poem to open for a document holding `len` poems: a valid fragment
    /// wins, then a valid `poemId`, then the first poem.
    pub fn initial_index(&self, len: usize) -> usize {
        let from_fragment = self.fragment().and_then(parse_fragment);
        let from_query = self.poem_param().and_then(|raw| raw.parse::<usize>().ok());
        [from_fragment, from_query]
            .into_iter()
            .flatten()
            .find(|&idx| idx < len)
            .unwrap_or(0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())?;
        if let Some(poem) = &self.poem_id {
            write!(f, "?{POEM_ID_PARAM}={poem}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// Fragment naming poem `index`, without the leading `#`.
pub fn fragment_for(index: usize) -> String {
    format!("{FRAGMENT_PREFIX}{index}")
}

/// Poem index encoded in a fragment, with or without the leading `#`.
pub fn parse_fragment(fragment: &str) -> Option<usize> {
    fragment
        .strip_prefix('#')
        .unwrap_or(fragment)
        .strip_prefix(FRAGMENT_PREFIX)?
        .parse()
        .ok()
}

/// Drop `scheme://host` when the input starts with one. A `://` after the
/// first `/`, `?` or `#` belongs to the path or query and is left alone.
fn strip_origin(input: &str) -> &str {
    let head_end = input.find(['/', '?', '#']).unwrap_or(input.len());
    if let Some(pos) = input.find("://").filter(|&pos| pos < head_end) {
        let after = &input[pos + 3..];
        return match after.find(['/', '?', '#']) {
            Some(idx) => &after[idx..],
            None => "/",
        };
    }
    input.strip_prefix(APP_SCHEME).unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", Route::Index)]
    #[case("", Route::Index)]
    #[case("/poet/li-bai", Route::Poet { id: "li-bai".into() })]
    #[case("https://example.org/shiku/poet/du-fu?poemId=2", Route::Poet { id: "du-fu".into() })]
    #[case("shiku:/poet/wang-wei#poem-1", Route::Poet { id: "wang-wei".into() })]
    #[case("https://example.org", Route::Index)]
    #[case("/about", Route::Index)]
    #[case("/poet/x?ref=http://a", Route::Poet { id: "x".into() })]
    #[case("/poet/x#see=https://a/poet/y", Route::Poet { id: "x".into() })]
    fn parses_routes(#[case] input: &str, #[case] expected: Route) {
        assert_eq!(Location::parse(input).route(), &expected);
    }

    #[rstest]
    #[case("#poem-3", Some(3))]
    #[case("poem-0", Some(0))]
    #[case("#poem-", None)]
    #[case("#poem--1", None)]
    #[case("#verse-2", None)]
    fn parses_fragments(#[case] fragment: &str, #[case] expected: Option<usize>) {
        assert_eq!(parse_fragment(fragment), expected);
    }

    #[rstest]
    #[case("/poet/li-bai", 0)]
    #[case("/poet/li-bai#poem-3", 3)]
    #[case("/poet/li-bai#poem-9", 0)]
    #[case("/poet/li-bai?poemId=2", 2)]
    #[case("/poet/li-bai?poemId=7", 0)]
    #[case("/poet/li-bai?poemId=2#poem-4", 4)]
    #[case("/poet/li-bai?poemId=1#poem-9", 1)]
    #[case("/poet/li-bai?poemId=abc", 0)]
    fn initial_index_validates_against_length(#[case] input: &str, #[case] expected: usize) {
        assert_eq!(Location::parse(input).initial_index(5), expected);
    }

    #[test]
    fn replacing_the_fragment_keeps_path_and_query() {
        let mut location = Location::poet("li-bai", Some(2));
        location.replace_fragment(4);
        assert_eq!(location.fragment(), Some("poem-4"));
        assert_eq!(location.to_string(), "/poet/li-bai?poemId=2#poem-4");
        assert_eq!(
            location.href("https://example.org/"),
            "https://example.org/poet/li-bai?poemId=2#poem-4"
        );
    }

    #[test]
    fn rendered_locations_parse_back() {
        let mut location = Location::poet("du-fu", None);
        location.replace_fragment(1);
        let parsed = Location::parse(&location.href(APP_SCHEME));
        assert_eq!(parsed, location);
    }
}
