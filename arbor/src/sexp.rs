//! Compact text form for syntax trees.
//!
//! ```text
//! (MethodDeclaration Modifier:public (PrimitiveType:void) SimpleName:run (Block))
//! ```
//!
//! A parenthesised group is a node followed by its children; a bare atom is a
//! leaf. `Kind:label` attaches a label, and labels containing spaces or
//! parentheses are written in double quotes. Spans are laid out automatically
//! so that every node gets a distinct range, each child strictly inside its
//! parent: this is a fixture and debugging format, not a source parser.

use std::sync::{Mutex, OnceLock};

use facet::Facet;
use indextree::NodeId;
use rapidhash::RapidHashSet as HashSet;

use crate::kinds;
use crate::tree::{NodeData, Span, SyntaxTree};

/// Errors produced while reading the text form.
#[derive(Facet, Debug)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum SexpError {
    /// unexpected end of input
    UnexpectedEnd,

    /// unexpected closing parenthesis at byte {offset}
    UnexpectedClose { offset: usize },

    /// expected a node kind at byte {offset}
    MissingKind { offset: usize },

    /// unterminated quoted label starting at byte {offset}
    UnterminatedLabel { offset: usize },

    /// trailing input at byte {offset}
    TrailingInput { offset: usize },
}

struct Parsed {
    kind: &'static str,
    label: Option<String>,
    grouped: bool,
    span: Span,
    children: Vec<Parsed>,
}

/// Read a tree from its text form.
pub fn parse(text: &str) -> Result<SyntaxTree, SexpError> {
    let mut parser = Parser { text, offset: 0 };
    let mut root = parser.node()?;
    parser.skip_whitespace();
    if parser.offset < text.len() {
        return Err(SexpError::TrailingInput {
            offset: parser.offset,
        });
    }

    let mut cursor = 0;
    layout(&mut root, &mut cursor);

    let mut tree = SyntaxTree::new(node_data(&root));
    let tree_root = tree.root;
    for child in &root.children {
        build(&mut tree, tree_root, child);
    }
    tree.finish();
    Ok(tree)
}

/// Render the subtree rooted at `node` in the text form.
pub fn dump(tree: &SyntaxTree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, &mut out);
    out
}

fn write_node(tree: &SyntaxTree, node: NodeId, out: &mut String) {
    let grouped = !tree.is_leaf(node);
    if grouped {
        out.push('(');
    }
    out.push_str(tree.kind(node));
    if let Some(label) = tree.label(node) {
        out.push(':');
        write_label(label, out);
    }
    for child in tree.children(node) {
        out.push(' ');
        write_node(tree, child, out);
    }
    if grouped {
        out.push(')');
    }
}

fn write_label(label: &str, out: &mut String) {
    let needs_quotes = label.is_empty()
        || label
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"'));
    if !needs_quotes {
        out.push_str(label);
        return;
    }
    out.push('"');
    for c in label.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

fn layout(node: &mut Parsed, cursor: &mut u32) {
    let start = *cursor;
    if !node.grouped {
        *cursor += text_width(node);
        node.span = Span::new(start, *cursor);
        return;
    }
    *cursor += 1;
    if node.children.is_empty() {
        *cursor += text_width(node);
    }
    for child in &mut node.children {
        layout(child, cursor);
        *cursor += 1;
    }
    if node.children.is_empty() {
        *cursor += 1;
    }
    node.span = Span::new(start, *cursor);
}

fn text_width(node: &Parsed) -> u32 {
    let text = node.label.as_deref().unwrap_or(node.kind);
    u32::try_from(text.len()).unwrap_or(u32::MAX).max(1)
}

fn node_data(parsed: &Parsed) -> NodeData {
    match &parsed.label {
        Some(label) => NodeData::labelled(parsed.kind, label.clone(), parsed.span),
        None => NodeData::new(parsed.kind, parsed.span),
    }
}

fn build(tree: &mut SyntaxTree, parent: NodeId, parsed: &Parsed) {
    let id = tree.add_child(parent, node_data(parsed));
    for child in &parsed.children {
        build(tree, id, child);
    }
}

/// Map a kind name to a `'static` string, leaking each unknown name once.
fn intern(name: &str) -> &'static str {
    if let Some(known) = kinds::ALL.iter().copied().find(|k| *k == name) {
        return known;
    }
    static EXTRA: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();
    let mut extra = EXTRA
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(existing) = extra.get(name).copied() {
        return existing;
    }
    let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
    extra.insert(leaked);
    leaked
}

struct Parser<'a> {
    text: &'a str,
    offset: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.offset += 1;
        }
    }

    fn node(&mut self) -> Result<Parsed, SexpError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(SexpError::UnexpectedEnd),
            Some(b')') => Err(SexpError::UnexpectedClose {
                offset: self.offset,
            }),
            Some(b'(') => {
                self.offset += 1;
                self.skip_whitespace();
                let mut node = self.atom()?;
                node.grouped = true;
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        None => return Err(SexpError::UnexpectedEnd),
                        Some(b')') => {
                            self.offset += 1;
                            return Ok(node);
                        }
                        Some(_) => node.children.push(self.node()?),
                    }
                }
            }
            Some(_) => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<Parsed, SexpError> {
        let start = self.offset;
        while self
            .peek()
            .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'(' | b')' | b':'))
        {
            self.offset += 1;
        }
        if self.offset == start {
            return Err(SexpError::MissingKind { offset: start });
        }
        let kind = intern(&self.text[start..self.offset]);

        let label = if self.peek() == Some(b':') {
            self.offset += 1;
            Some(self.label()?)
        } else {
            None
        };

        Ok(Parsed {
            kind,
            label,
            grouped: false,
            span: Span::default(),
            children: Vec::new(),
        })
    }

    fn label(&mut self) -> Result<String, SexpError> {
        if self.peek() != Some(b'"') {
            let start = self.offset;
            while self
                .peek()
                .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'(' | b')'))
            {
                self.offset += 1;
            }
            return Ok(self.text[start..self.offset].to_owned());
        }

        let open = self.offset;
        let mut label = String::new();
        let mut escaped = false;
        for (i, c) in self.text[open + 1..].char_indices() {
            if escaped {
                label.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                self.offset = open + 1 + i + 1;
                return Ok(label);
            } else {
                label.push(c);
            }
        }
        Err(SexpError::UnterminatedLabel { offset: open })
    }
}
