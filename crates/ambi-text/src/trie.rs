#![forbid(unsafe_code)]

//! Prefix trie with occurrence counts.
//!
//! Every node stands for the string spelled by the path from the root. A node
//! marked as an end carries a counter of how many times that exact string was
//! inserted. Nodes are created lazily and never removed.
//!
//! # Ranking
//!
//! [`Trie::search`] sorts completions by descending count; equal counts are
//! ordered lexically (ascending by word).
//!
//! # Example
//! ```
//! use ambi_text::trie::{Completion, Trie};
//!
//! let mut trie = Trie::new();
//! trie.insert("robot");
//! trie.insert("robber");
//! trie.insert("robot");
//!
//! assert_eq!(
//!     trie.search("rob"),
//!     vec![Completion::new("robot", 2), Completion::new("robber", 1)]
//! );
//! assert!(trie.search("x").is_empty());
//! ```

use std::collections::BTreeMap;

/// Separator between words in [`Trie::query`] output.
pub const QUERY_DELIMITER: char = '\t';

/// A completed word and the number of times it was inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Completion {
    /// The full word.
    pub word: String,
    /// Insertion count.
    pub count: u64,
}

impl Completion {
    /// Create a completion.
    #[must_use]
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

/// A node in the trie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieNode {
    /// The character on the edge into this node (`None` for the root).
    value: Option<char>,
    /// Whether a word ends here.
    is_end: bool,
    /// How many times the word ending here was inserted.
    counter: u64,
    /// Children keyed by their character.
    children: BTreeMap<char, TrieNode>,
}

impl TrieNode {
    fn with_value(value: char) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// The character on the edge into this node.
    #[must_use]
    pub fn value(&self) -> Option<char> {
        self.value
    }

    /// Whether a word ends at this node.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.is_end
    }

    /// Insertion count of the word ending here (0 if none does).
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Child reached by `c`, if any.
    #[must_use]
    pub fn child(&self, c: char) -> Option<&TrieNode> {
        self.children.get(&c)
    }

    /// Children in character order.
    pub fn children(&self) -> impl Iterator<Item = &TrieNode> {
        self.children.values()
    }

    /// Depth-first collection of every word at or below this node.
    fn collect_words(&self, word: &mut String, out: &mut Vec<Completion>) {
        if self.is_end {
            out.push(Completion::new(word.as_str(), self.counter));
        }
        for (&c, child) in &self.children {
            word.push(c);
            child.collect_words(word, out);
            word.pop();
        }
    }
}

/// Word store with ranked prefix search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trie {
    root: TrieNode,
    /// Number of distinct words.
    words: usize,
}

impl Trie {
    /// Create an empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trie pre-seeded with `vocabulary`.
    ///
    /// Repeated entries count as repeated insertions.
    #[must_use]
    pub fn with_vocabulary<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self::new();
        trie.extend(vocabulary);
        trie
    }

    /// The root node (its value is empty).
    #[must_use]
    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Number of distinct words stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words
    }

    /// Whether no word has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Insert one occurrence of `word`.
    ///
    /// Missing nodes along the path are created; the final node is marked as
    /// a word end and its counter incremented. The empty string marks the
    /// root.
    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node
                .children
                .entry(c)
                .or_insert_with(|| TrieNode::with_value(c));
        }
        if !node.is_end {
            self.words += 1;
        }
        node.is_end = true;
        node.counter += 1;
        tracing::trace!(word, count = node.counter, "trie insert");
    }

    /// Number of times exactly `word` was inserted.
    #[must_use]
    pub fn count(&self, word: &str) -> u64 {
        self.find(word).map_or(0, |node| node.counter)
    }

    /// Whether exactly `word` was inserted at least once.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.find(word).is_some_and(TrieNode::is_end)
    }

    /// Every stored word starting with `prefix`, ranked.
    ///
    /// Order: descending count, then ascending word. Returns an empty vector
    /// when no stored word has this prefix.
    #[must_use]
    pub fn search(&self, prefix: &str) -> Vec<Completion> {
        let Some(node) = self.find(prefix) else {
            tracing::debug!(prefix, "prefix not in trie");
            return Vec::new();
        };

        let mut word = prefix.to_string();
        let mut results = Vec::new();
        node.collect_words(&mut word, &mut results);
        results.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        results
    }

    /// The words of [`Trie::search`] joined by [`QUERY_DELIMITER`], for display.
    #[must_use]
    pub fn query(&self, prefix: &str) -> String {
        let mut line = String::new();
        for (i, completion) in self.search(prefix).into_iter().enumerate() {
            if i > 0 {
                line.push(QUERY_DELIMITER);
            }
            line.push_str(&completion.word);
        }
        line
    }

    /// Node reached by following `prefix` from the root.
    fn find(&self, prefix: &str) -> Option<&TrieNode> {
        prefix
            .chars()
            .try_fold(&self.root, |node, c| node.children.get(&c))
    }
}

impl<S: AsRef<str>> Extend<S> for Trie {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for word in iter {
            self.insert(word.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for Trie {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::with_vocabulary(iter)
    }
}
