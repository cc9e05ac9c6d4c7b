//! Corpus-wide table of external post hashes to local slugs.

use std::collections::HashMap;

use crate::corpus::Post;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossRefIndex {
    slugs: HashMap<String, String>,
    domains: Vec<String>,
}

impl CrossRefIndex {
    /// Record every post that has content. Later duplicates overwrite earlier ones.
    pub fn build<'a>(posts: impl IntoIterator<Item = &'a Post>, domains: &[String]) -> Self {
        let entries = posts
            .into_iter()
            .filter(|post| post.has_content())
            .filter_map(|post| {
                let hash = external_hash(post.page_url.as_deref()?)?;
                Some((hash.to_string(), post.slug.clone()))
            });
        Self::from_entries(domains, entries)
    }

    pub fn from_entries(
        domains: &[String],
        entries: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut slugs = HashMap::new();
        for (hash, slug) in entries {
            slugs.insert(hash, slug);
        }
        Self {
            slugs,
            domains: domains
                .iter()
                .map(|domain| domain.trim().to_ascii_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    pub fn slug_for_hash(&self, hash: &str) -> Option<&str> {
        self.slugs.get(hash).map(String::as_str)
    }

    /// Entries sorted by hash.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries = self
            .slugs
            .iter()
            .map(|(hash, slug)| (hash.as_str(), slug.as_str()))
            .collect::<Vec<_>>();
        entries.sort_unstable();
        entries
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// `/<slug>` or `/<slug>#<anchor>` for a link to a migrated post.
    pub fn resolve(&self, url: &str) -> Option<String> {
        let (location, anchor) = match url.split_once('#') {
            Some((location, anchor)) => (location, Some(anchor)),
            None => (url, None),
        };
        let without_scheme = location
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(location);
        let (authority, path) = without_scheme
            .split_once('/')
            .unwrap_or((without_scheme, ""));
        if !self.is_source_host(authority) {
            return None;
        }
        let path = path.split('?').next().unwrap_or_default();
        let slug = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .find_map(|segment| self.slug_for_hash(segment))?;
        Some(match anchor.filter(|anchor| !anchor.is_empty()) {
            Some(anchor) => format!("/{slug}#{anchor}"),
            None => format!("/{slug}"),
        })
    }

    /// The local link for `url`, or `url` itself when it is not a migrated post.
    pub fn rewrite_url(&self, url: &str) -> String {
        self.resolve(url).unwrap_or_else(|| url.to_string())
    }

    fn is_source_host(&self, authority: &str) -> bool {
        let host = authority.rsplit('@').next().unwrap_or(authority);
        let host = host.split(':').next().unwrap_or(host).to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// The opaque post identifier in a canonical URL: the segment after `posts`,
/// else the last non-empty path segment.
pub fn external_hash(page_url: &str) -> Option<&str> {
    let location = page_url.split(['?', '#']).next().unwrap_or(page_url);
    let path = location
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(location);
    let segments = path
        .split('/')
        .skip(1)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();
    segments
        .iter()
        .position(|segment| *segment == "posts")
        .and_then(|position| segments.get(position + 1))
        .or_else(|| segments.last())
        .copied()
}
