//! core-keymap: validated key sequence to command resolution.
//!
//! Bindings compile into a trie keyed by [`Key`]. A node that ends a declared
//! sequence carries the command name; every node above it is an implicit
//! prefix entry meaning "more keys are needed". Construction rejects tables
//! where one binding would shadow another:
//! - the same sequence bound twice ([`KeymapError::Duplicate`]);
//! - a bound sequence that is a strict prefix of another bound sequence, in
//!   either declaration order ([`KeymapError::Ambiguous`]).
//!
//! The map is immutable once built. Lookups are exact: the caller extends the
//! pending sequence one key at a time and asks again.

use core_events::{Key, KeyParseError, KeySeq, format_key_seq, parse_key_seq};
use smallvec::SmallVec;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeymapError {
    #[error("empty key sequence bound to `{command}`")]
    EmptySequence { command: String },
    #[error("empty command name bound to `{keys}`")]
    EmptyCommand { keys: String },
    #[error("duplicate binding for `{keys}`: `{first}` and `{second}`")]
    Duplicate {
        keys: String,
        first: String,
        second: String,
    },
    #[error("ambiguous bindings: `{prefix}` ({prefix_command}) is a prefix of `{keys}` ({command})")]
    Ambiguous {
        prefix: String,
        prefix_command: String,
        keys: String,
        command: String,
    },
    #[error("bad key sequence `{notation}`: {source}")]
    Parse {
        notation: String,
        #[source]
        source: KeyParseError,
    },
}

/// Result of looking up a complete pending sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding<'a> {
    Command(&'a str),
    /// A strict prefix of at least one binding.
    Prefix,
}

#[derive(Debug, Clone)]
struct Edge {
    key: Key,
    next: usize,
}

#[derive(Debug, Clone)]
struct Node {
    command: Option<String>,
    edges: SmallVec<[Edge; 4]>,
}

impl Node {
    fn new() -> Self {
        Self {
            command: None,
            edges: SmallVec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyMap {
    nodes: Vec<Node>,
    len: usize,
}

impl KeyMap {
    pub fn build<I, S>(bindings: I) -> Result<Self, KeymapError>
    where
        I: IntoIterator<Item = (KeySeq, S)>,
        S: Into<String>,
    {
        let mut map = KeyMap {
            nodes: vec![Node::new()],
            len: 0,
        };
        for (seq, command) in bindings {
            map.insert(&seq, command.into())?;
        }
        debug!(target: "input.map", bindings = map.len, nodes = map.nodes.len(), "keymap_built");
        Ok(map)
    }

    /// Build from chord notation pairs such as `("C-x C-s", "save")`.
    pub fn from_notation<'a, I>(bindings: I) -> Result<Self, KeymapError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let parsed = bindings
            .into_iter()
            .map(|(notation, command)| {
                parse_key_seq(notation)
                    .map(|seq| (seq, command))
                    .map_err(|source| KeymapError::Parse {
                        notation: notation.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(parsed)
    }

    /// The built-in Emacs-style bindings.
    pub fn defaults() -> Result<Self, KeymapError> {
        Self::from_notation(DEFAULT_BINDINGS.iter().copied())
    }

    fn insert(&mut self, seq: &[Key], command: String) -> Result<(), KeymapError> {
        if seq.is_empty() {
            return Err(KeymapError::EmptySequence { command });
        }
        if command.is_empty() {
            return Err(KeymapError::EmptyCommand {
                keys: format_key_seq(seq),
            });
        }
        let mut cur = 0usize;
        for (depth, key) in seq.iter().enumerate() {
            if let Some(bound) = &self.nodes[cur].command {
                return Err(KeymapError::Ambiguous {
                    prefix: format_key_seq(&seq[..depth]),
                    prefix_command: bound.clone(),
                    keys: format_key_seq(seq),
                    command,
                });
            }
            let existing = self.nodes[cur]
                .edges
                .iter()
                .find(|e| e.key == *key)
                .map(|e| e.next);
            cur = match existing {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::new());
                    self.nodes[cur].edges.push(Edge { key: *key, next });
                    next
                }
            };
        }
        if let Some(first) = &self.nodes[cur].command {
            return Err(KeymapError::Duplicate {
                keys: format_key_seq(seq),
                first: first.clone(),
                second: command,
            });
        }
        if !self.nodes[cur].edges.is_empty() {
            let (longer, longer_command) = self.first_binding_below(cur, seq);
            return Err(KeymapError::Ambiguous {
                prefix: format_key_seq(seq),
                prefix_command: command,
                keys: format_key_seq(&longer),
                command: longer_command,
            });
        }
        trace!(target: "input.map", keys = %format_key_seq(seq), command = %command, "bind");
        self.nodes[cur].command = Some(command);
        self.len += 1;
        Ok(())
    }

    /// Some binding in the subtree at `node`, for error messages.
    fn first_binding_below(&self, mut node: usize, prefix: &[Key]) -> (KeySeq, String) {
        let mut keys: KeySeq = prefix.iter().copied().collect();
        loop {
            if let Some(command) = &self.nodes[node].command {
                return (keys, command.clone());
            }
            match self.nodes[node].edges.first() {
                Some(edge) => {
                    keys.push(edge.key);
                    node = edge.next;
                }
                None => return (keys, String::new()),
            }
        }
    }

    /// Exact lookup of a pending sequence. `None` means nothing starts with it.
    pub fn lookup(&self, keys: &[Key]) -> Option<Binding<'_>> {
        if keys.is_empty() {
            return None;
        }
        let mut cur = 0usize;
        for key in keys {
            cur = self.nodes[cur].edges.iter().find(|e| e.key == *key)?.next;
        }
        let binding = match &self.nodes[cur].command {
            Some(command) => Binding::Command(command),
            None => Binding::Prefix,
        };
        trace!(target: "input.map", keys = %format_key_seq(keys), ?binding, "lookup");
        Some(binding)
    }

    /// Number of bound sequences.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All bindings in trie order.
    pub fn bindings(&self) -> Vec<(KeySeq, &str)> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<(usize, KeySeq)> = vec![(0, KeySeq::new())];
        while let Some((node, keys)) = stack.pop() {
            if let Some(command) = &self.nodes[node].command {
                out.push((keys.clone(), command.as_str()));
            }
            for edge in self.nodes[node].edges.iter().rev() {
                let mut next = keys.clone();
                next.push(edge.key);
                stack.push((edge.next, next));
            }
        }
        out
    }
}

/// Default bindings in chord notation.
pub const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    ("<up>", "move-up"),
    ("C-p", "move-up"),
    ("<down>", "move-down"),
    ("C-n", "move-down"),
    ("<left>", "move-left"),
    ("C-b", "move-left"),
    ("<right>", "move-right"),
    ("C-f", "move-right"),
    ("<next>", "page-down"),
    ("<prior>", "page-up"),
    ("<home>", "move-beginning-of-line"),
    ("C-a", "move-beginning-of-line"),
    ("<end>", "move-end-of-line"),
    ("C-e", "move-end-of-line"),
    ("DEL", "delete-char"),
    ("C-h", "delete-char"),
    ("<delete>", "delete-char-right"),
    ("C-d", "delete-char-right"),
    ("TAB", "insert-tab"),
    ("C-i", "insert-tab"),
    ("RET", "new-line"),
    ("C-j", "new-line"),
    ("C-k", "kill-line"),
    ("C-w", "cut"),
    ("C-y", "paste"),
    ("M-w", "copy"),
    ("C-SPC", "start-selection"),
    ("C-@", "start-selection"),
    ("C-_", "undo"),
    ("C-/", "undo"),
    ("C-7", "undo"),
    ("C-x C-c", "quit"),
    ("C-x C-s", "save"),
    ("C-x h", "select-whole-buffer"),
    ("C-x [", "move-beginning-buffer"),
    ("C-x ]", "move-end-buffer"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyCode;
    use pretty_assertions::assert_eq;

    fn seq(notation: &str) -> KeySeq {
        parse_key_seq(notation).unwrap()
    }

    #[test]
    fn defaults_build_and_resolve() {
        let map = KeyMap::defaults().expect("default table is consistent");
        assert_eq!(map.len(), DEFAULT_BINDINGS.len());
        assert_eq!(map.lookup(&seq("C-x C-s")), Some(Binding::Command("save")));
        assert_eq!(map.lookup(&seq("C-x")), Some(Binding::Prefix));
        assert_eq!(
            map.lookup(&[Key::plain(KeyCode::Esc)]),
            Some(Binding::Prefix),
            "ESC introduces M- chords"
        );
        assert_eq!(map.lookup(&seq("M-w")), Some(Binding::Command("copy")));
        assert_eq!(map.lookup(&seq("C-x C-x")), None);
        assert_eq!(map.lookup(&seq("a")), None);
        assert_eq!(map.lookup(&[]), None);
    }

    #[test]
    fn duplicate_binding_is_rejected() {
        let err = KeyMap::from_notation([("C-a", "one"), ("C-a", "two")]).unwrap_err();
        assert_eq!(
            err,
            KeymapError::Duplicate {
                keys: "C-a".into(),
                first: "one".into(),
                second: "two".into(),
            }
        );
        assert!(KeyMap::from_notation([("C-a", "same"), ("C-a", "same")]).is_err());
    }

    #[test]
    fn short_binding_declared_first_is_ambiguous() {
        let err = KeyMap::from_notation([("C-x", "cut"), ("C-x C-s", "save")]).unwrap_err();
        assert_eq!(
            err,
            KeymapError::Ambiguous {
                prefix: "C-x".into(),
                prefix_command: "cut".into(),
                keys: "C-x C-s".into(),
                command: "save".into(),
            }
        );
    }

    #[test]
    fn short_binding_declared_last_is_ambiguous() {
        let err = KeyMap::from_notation([("C-x C-s", "save"), ("C-x", "cut")]).unwrap_err();
        assert_eq!(
            err,
            KeymapError::Ambiguous {
                prefix: "C-x".into(),
                prefix_command: "cut".into(),
                keys: "C-x C-s".into(),
                command: "save".into(),
            }
        );
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(matches!(
            KeyMap::build([(KeySeq::new(), "x")]),
            Err(KeymapError::EmptySequence { .. })
        ));
        assert!(matches!(
            KeyMap::build([(seq("a"), "")]),
            Err(KeymapError::EmptyCommand { .. })
        ));
        assert!(matches!(
            KeyMap::from_notation([("<hyper>", "x")]),
            Err(KeymapError::Parse { .. })
        ));
    }

    #[test]
    fn bindings_lists_everything() {
        let map = KeyMap::from_notation([("C-x C-s", "save"), ("C-x h", "all"), ("C-a", "bol")])
            .unwrap();
        let mut listed: Vec<(String, String)> = map
            .bindings()
            .into_iter()
            .map(|(k, c)| (format_key_seq(&k), c.to_string()))
            .collect();
        listed.sort();
        assert_eq!(
            listed,
            vec![
                ("C-a".to_string(), "bol".to_string()),
                ("C-x C-s".to_string(), "save".to_string()),
                ("C-x h".to_string(), "all".to_string()),
            ]
        );
    }
}
