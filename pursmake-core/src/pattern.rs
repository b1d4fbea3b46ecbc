//! Glob patterns for selecting project files.

use std::path::Path;

use anyhow::{anyhow, Result};

/// One compiled glob pattern, matched against root-relative paths.
///
/// Supported syntax: `*` and `?` inside a segment, `**` as a whole
/// segment spanning any number of intermediate directories.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    /// `**`: zero or more path components.
    Globstar,
    Literal(String),
    /// Segment containing `*` or `?`, possibly mixed with literal text.
    Wildcard(Vec<char>),
}

impl Pattern {
    pub fn new(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(anyhow!("empty pattern"));
        }
        if raw.starts_with('/') {
            return Err(anyhow!("pattern must be relative: {raw}"));
        }

        let mut segments = Vec::new();
        for piece in raw.split('/') {
            if piece.is_empty() {
                return Err(anyhow!("empty segment in pattern: {raw}"));
            }
            if piece == "**" {
                segments.push(Segment::Globstar);
            } else if piece.contains('*') || piece.contains('?') {
                segments.push(Segment::Wildcard(piece.chars().collect()));
            } else {
                segments.push(Segment::Literal(piece.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Original pattern text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Structural match against a root-relative path; no filesystem access.
    pub fn matches(&self, rel: &Path) -> bool {
        let mut comps = Vec::new();
        for comp in rel.components() {
            match comp.as_os_str().to_str() {
                Some(s) => comps.push(s),
                None => return false,
            }
        }
        match_segments(&self.segments, &comps)
    }
}

/// Ordered collection of patterns; a path matches when any pattern does.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new<I, S>(raws: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = raws
            .into_iter()
            .map(|raw| Pattern::new(raw.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, rel: &Path) -> bool {
        self.patterns.iter().any(|p| p.matches(rel))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }
}

fn match_segments(pat: &[Segment], comps: &[&str]) -> bool {
    match pat.first() {
        None => comps.is_empty(),
        Some(Segment::Globstar) => (0..=comps.len()).any(|skip| {
            comps[..skip].iter().all(|c| !c.starts_with('.'))
                && match_segments(&pat[1..], &comps[skip..])
        }),
        Some(Segment::Literal(lit)) => match comps.split_first() {
            Some((head, rest)) => *head == lit.as_str() && match_segments(&pat[1..], rest),
            None => false,
        },
        Some(Segment::Wildcard(wild)) => match comps.split_first() {
            Some((head, rest)) => wildcard_matches(wild, head) && match_segments(&pat[1..], rest),
            None => false,
        },
    }
}

fn wildcard_matches(pat: &[char], text: &str) -> bool {
    // Dot-prefixed components are only ever matched by literal segments.
    if text.starts_with('.') {
        return false;
    }
    let chars: Vec<char> = text.chars().collect();
    match_chars(pat, &chars)
}

fn match_chars(pat: &[char], text: &[char]) -> bool {
    match pat.split_first() {
        None => text.is_empty(),
        Some((&'*', rest)) => (0..=text.len()).any(|i| match_chars(rest, &text[i..])),
        Some((&'?', rest)) => match text.split_first() {
            Some((_, tail)) => match_chars(rest, tail),
            None => false,
        },
        Some((ch, rest)) => match text.split_first() {
            Some((head, tail)) => head == ch && match_chars(rest, tail),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{Pattern, PatternSet};
    use std::path::Path;

    fn pat(raw: &str) -> Pattern {
        Pattern::new(raw).expect("pattern")
    }

    #[test]
    fn literal_segments_match_exactly() {
        let p = pat("src/Main.purs");
        assert!(p.matches(Path::new("src/Main.purs")));
        assert!(!p.matches(Path::new("src/Other.purs")));
        assert!(!p.matches(Path::new("lib/src/Main.purs")));
    }

    #[test]
    fn star_matches_within_a_single_segment() {
        let p = pat("examples/*/*.purs");
        assert!(p.matches(Path::new("examples/undo/Main.purs")));
        assert!(!p.matches(Path::new("examples/Main.purs")));
        assert!(!p.matches(Path::new("examples/undo/deep/Main.purs")));
    }

    #[test]
    fn star_mixes_with_literal_text() {
        let p = pat("bower_components/purescript-*/src/**/*.purs");
        assert!(p.matches(Path::new(
            "bower_components/purescript-prelude/src/Prelude.purs"
        )));
        assert!(p.matches(Path::new(
            "bower_components/purescript-pux/src/Pux/Html.purs"
        )));
        assert!(!p.matches(Path::new("bower_components/jquery/src/jquery.purs")));
    }

    #[test]
    fn globstar_spans_zero_or_more_directories() {
        let p = pat("src/**/*.purs");
        assert!(p.matches(Path::new("src/Main.purs")));
        assert!(p.matches(Path::new("src/Pux/Undo.purs")));
        assert!(p.matches(Path::new("src/a/b/c/D.purs")));
        assert!(!p.matches(Path::new("test/Main.purs")));
    }

    #[test]
    fn question_mark_matches_one_character() {
        let p = pat("src/?.purs");
        assert!(p.matches(Path::new("src/A.purs")));
        assert!(!p.matches(Path::new("src/AB.purs")));
        assert!(!p.matches(Path::new("src/.purs")));
    }

    #[test]
    fn wildcards_never_match_dot_files() {
        assert!(!pat("src/**/*.purs").matches(Path::new("src/.hidden.purs")));
        assert!(!pat("src/*/A.purs").matches(Path::new("src/.dir/A.purs")));
        assert!(!pat("**/*.js").matches(Path::new(".spago/pkg/a.js")));
        // A literal segment can still name a dotted path.
        assert!(pat(".build/out.js").matches(Path::new(".build/out.js")));
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(Pattern::new("").is_err());
        assert!(Pattern::new("/abs/*.purs").is_err());
        assert!(Pattern::new("src//Main.purs").is_err());
    }

    #[test]
    fn set_matches_when_any_pattern_does() {
        let set = PatternSet::new(["src/**/*.js", "bower_components/purescript-*/src/**/*.js"])
            .expect("set");
        assert!(set.matches(Path::new("src/Pux/Undo.js")));
        assert!(set.matches(Path::new(
            "bower_components/purescript-dom/src/DOM.js"
        )));
        assert!(!set.matches(Path::new("output/Main/index.js")));
        assert!(!set.is_empty());
        assert_eq!(set.iter().count(), 2);
    }
}
