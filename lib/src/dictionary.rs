use crate::board::SIZE;
use crate::tiles::Letter;
use crate::Error;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Handle of a node in the [Dictionary] graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug, Clone, Copy)]
struct Node {
    first_edge: u32,
    edge_count: u8,
    terminal: bool,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    letter: Letter,
    target: u32,
}

/// A read-only word graph (DAWG) supporting membership and prefix queries.
///
/// The graph is minimized when it is built: equal suffix subtrees are shared, so
/// the node count is far below that of a plain trie. There are no mutating
/// methods, so a `Dictionary` can be shared between threads (e.g. in an
/// [Arc](std::sync::Arc)) without locking.
///
/// # Example
/// ```
/// # use crossplay_solver::Dictionary;
/// let dictionary = Dictionary::from_words(&["care", "cares", "scare"]);
/// assert!(dictionary.contains("CARES"));
/// assert!(!dictionary.contains("car"));
/// assert!(dictionary.contains_prefix("sca"));
/// ```
#[derive(Debug, Clone)]
pub struct Dictionary {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    root: u32,
    words: usize,
}

/// Mutable trie used while reading a wordlist. [finish](DictionaryBuilder::finish)
/// turns it into a [Dictionary].
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    nodes: Vec<BuildNode>,
    words: usize,
    skipped: usize,
}

#[derive(Debug, Default)]
struct BuildNode {
    children: BTreeMap<Letter, usize>,
    terminal: bool,
}

/// Convert a wordlist entry to letters. Returns `None` for entries that can never
/// be played: non-alphabetic characters, or a length outside `2..=15`.
fn normalize(word: &str) -> Option<Vec<Letter>> {
    let letters = word
        .trim()
        .chars()
        .map(Letter::from_char)
        .collect::<Option<Vec<_>>>()?;
    if letters.len() < 2 || letters.len() > SIZE {
        return None;
    }
    Some(letters)
}

impl DictionaryBuilder {
    pub fn new() -> DictionaryBuilder {
        DictionaryBuilder {
            nodes: vec![BuildNode::default()],
            words: 0,
            skipped: 0,
        }
    }

    /// Add a word (case-insensitive). Returns false if the word was skipped.
    pub fn insert(&mut self, word: &str) -> bool {
        let letters = match normalize(word) {
            Some(letters) => letters,
            None => {
                self.skipped += 1;
                return false;
            }
        };
        let mut node = 0;
        for letter in letters {
            node = match self.nodes[node].children.get(&letter) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(BuildNode::default());
                    self.nodes[node].children.insert(letter, child);
                    child
                }
            };
        }
        if !self.nodes[node].terminal {
            self.nodes[node].terminal = true;
            self.words += 1;
        }
        true
    }

    /// Minimize the trie and freeze it.
    pub fn finish(self) -> Dictionary {
        let mut dictionary = Dictionary {
            nodes: Vec::new(),
            edges: Vec::new(),
            root: 0,
            words: self.words,
        };
        let mut registry = HashMap::new();
        dictionary.root = self.register(0, &mut dictionary, &mut registry);
        debug!(
            "dictionary: {} trie nodes minimized to {} nodes, {} edges, {} entries skipped",
            self.nodes.len(),
            dictionary.nodes.len(),
            dictionary.edges.len(),
            self.skipped
        );
        dictionary
    }

    /// Post-order: register the children first, then share this node with any
    /// equal node (same terminal flag and same outgoing edges).
    fn register(
        &self,
        index: usize,
        dictionary: &mut Dictionary,
        registry: &mut HashMap<(bool, Vec<(Letter, u32)>), u32>,
    ) -> u32 {
        let node = &self.nodes[index];
        let signature: Vec<(Letter, u32)> = node
            .children
            .iter()
            .map(|(&letter, &child)| (letter, self.register(child, dictionary, registry)))
            .collect();
        let key = (node.terminal, signature);
        if let Some(&id) = registry.get(&key) {
            return id;
        }
        let id = dictionary.nodes.len() as u32;
        dictionary.nodes.push(Node {
            first_edge: dictionary.edges.len() as u32,
            edge_count: key.1.len() as u8,
            terminal: key.0,
        });
        dictionary
            .edges
            .extend(key.1.iter().map(|&(letter, target)| Edge { letter, target }));
        registry.insert(key, id);
        id
    }
}

impl Dictionary {
    /// Build a dictionary from a list of words.
    pub fn from_words<I, S>(words: I) -> Dictionary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = DictionaryBuilder::new();
        for word in words {
            builder.insert(word.as_ref());
        }
        builder.finish()
    }

    /// Read a wordlist with one word per line.
    ///
    /// # Errors
    /// If the file is missing or not valid UTF-8.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Dictionary, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::DictionaryLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let dictionary = Dictionary::from_words(text.lines());
        info!(
            "loaded {} words from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Number of nodes in the minimized graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> NodeId {
        NodeId(self.root)
    }

    fn edges(&self, node: NodeId) -> &[Edge] {
        let node = self.nodes[node.0 as usize];
        let start = node.first_edge as usize;
        &self.edges[start..start + node.edge_count as usize]
    }

    /// Follow the edge labeled `letter`.
    pub fn child(&self, node: NodeId, letter: Letter) -> Option<NodeId> {
        let edges = self.edges(node);
        edges
            .binary_search_by_key(&letter, |edge| edge.letter)
            .ok()
            .map(|i| NodeId(edges[i].target))
    }

    /// All outgoing edges in alphabetical order.
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = (Letter, NodeId)> + '_ {
        self.edges(node)
            .iter()
            .map(|edge| (edge.letter, NodeId(edge.target)))
    }

    /// True if the path to `node` spells a complete word.
    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.nodes[node.0 as usize].terminal
    }

    /// Walk `letters` from `node`.
    pub fn walk(&self, node: NodeId, letters: &[Letter]) -> Option<NodeId> {
        letters
            .iter()
            .try_fold(node, |node, &letter| self.child(node, letter))
    }

    /// True if `letters` is a word.
    pub fn contains_word(&self, letters: &[Letter]) -> bool {
        self.walk(self.root(), letters)
            .map_or(false, |node| self.is_terminal(node))
    }

    /// True if some word starts with `letters`.
    pub fn has_prefix(&self, letters: &[Letter]) -> bool {
        self.walk(self.root(), letters).is_some()
    }

    /// String version of [contains_word](Dictionary::contains_word), case-insensitive.
    pub fn contains(&self, word: &str) -> bool {
        to_letters(word).map_or(false, |letters| self.contains_word(&letters))
    }

    /// String version of [has_prefix](Dictionary::has_prefix), case-insensitive.
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        to_letters(prefix).map_or(false, |letters| self.has_prefix(&letters))
    }
}

fn to_letters(word: &str) -> Option<Vec<Letter>> {
    word.chars().map(Letter::from_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_membership_and_prefix() {
        let dictionary = Dictionary::from_words(&["rust", "rest", "rusty", "trust"]);
        assert_eq!(dictionary.len(), 4);
        assert!(dictionary.contains("rust"));
        assert!(dictionary.contains("RUSTY"));
        assert!(!dictionary.contains("rus"));
        assert!(dictionary.contains_prefix("rus"));
        assert!(dictionary.contains_prefix(""));
        assert!(!dictionary.contains_prefix("x"));
        assert!(!dictionary.contains("ru5t"));
    }

    #[test]
    fn test_suffixes_are_shared() {
        let words = ["cats", "bats", "rats", "mats", "hats"];
        let dictionary = Dictionary::from_words(&words);
        // root, one node after the first letter, then "ts" shared by all words
        assert_eq!(dictionary.node_count(), 5);
        for word in words.iter() {
            assert!(dictionary.contains(word));
        }
    }

    #[test]
    fn test_skips_unplayable_entries() {
        let mut builder = DictionaryBuilder::new();
        assert!(!builder.insert("a"));
        assert!(!builder.insert("don't"));
        assert!(!builder.insert("abcdefghijklmnop"));
        assert!(builder.insert("  qi  "));
        assert!(builder.insert("QI"));
        let dictionary = builder.finish();
        assert_eq!(dictionary.len(), 1);
        assert!(dictionary.contains("qi"));
    }

    #[test]
    fn test_children_are_sorted() {
        let dictionary = Dictionary::from_words(&["ab", "aa", "ac"]);
        let a = dictionary.child(dictionary.root(), Letter::from_char('A').unwrap()).unwrap();
        let letters: String = dictionary.children(a).map(|(l, _)| l.to_char()).collect();
        assert_eq!(letters, "ABC");
    }

    #[test]
    fn test_from_file() -> Result<(), Error> {
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        writeln!(file, "Care\ncares\n\nscare").expect("write wordlist");
        let dictionary = Dictionary::from_file(file.path())?;
        assert_eq!(dictionary.len(), 3);
        assert!(dictionary.contains("care"));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = Dictionary::from_file("does/not/exist.txt").unwrap_err();
        assert!(matches!(err, Error::DictionaryLoad { .. }));
    }
}
