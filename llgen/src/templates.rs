//! Templates of the generated artifacts.
//!
//! Emission is plain `{{placeholder}}` substitution over these constants;
//! no code-generation AST is involved. The generated sources form a small
//! binary crate rooted at `main.rs` and depend on the `regex` crate for
//! token matching.

/// Template of the generated `ast.rs`: the token enumeration, the parse
/// tree, the visitor trait and the DOT rendering.
///
/// Placeholders: `{{token_variants}}`, `{{visitor_methods}}`.
pub const AST_TEMPLATE: &str = r##"//! Parse-tree scaffolding and the visitor surface of the generated parser.
//!
//! Generated file. Implement [`Visitor`] with real semantic actions and
//! keep the rest as is.

use std::any::Any;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::{Rc, Weak};

/// Token kinds recognized by the generated lexer.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End-of-input sentinel.
    Eof,
    /// The empty string.
    Eps,
{{token_variants}}}

/// Shared handle to a parse-tree node.
pub type NodeRef = Rc<Node>;

/// A parse-tree node. Inner nodes are labeled with a nonterminal and own
/// their children; leaves carry the matched token text.
pub struct Node {
    /// Non-owning back-link to the parent node.
    pub parent: RefCell<Weak<Node>>,
    /// Nonterminal label for inner nodes, token text for leaves.
    pub name: String,
    /// Opaque slot for values attached by visitor callbacks.
    pub value: RefCell<Option<Box<dyn Any>>>,
    /// Children in derivation order; always empty for leaves.
    pub children: RefCell<Vec<NodeRef>>,
    /// Whether this node is a leaf.
    leaf: bool,
}

impl Node {
    /// Create an inner node labeled with a nonterminal name.
    pub fn inner(name: &str) -> NodeRef {
        Rc::new(Node {
            parent: RefCell::new(Weak::new()),
            name: name.to_string(),
            value: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            leaf: false,
        })
    }

    /// Create a leaf node carrying matched token text.
    pub fn leaf(text: &str) -> NodeRef {
        Rc::new(Node {
            parent: RefCell::new(Weak::new()),
            name: text.to_string(),
            value: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            leaf: true,
        })
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Whether this node derives the empty string.
    pub fn is_eps(&self) -> bool {
        !self.leaf && self.children.borrow().is_empty()
    }

    /// Attach `child` under `parent`, wiring the parent back-link.
    pub fn add_child(parent: &NodeRef, child: NodeRef) {
        *child.parent.borrow_mut() = Rc::downgrade(parent);
        parent.children.borrow_mut().push(child);
    }

    /// The `i`-th enclosing node.
    ///
    /// # Panics
    ///
    /// Panics if `i` is zero or the chain of parents is shorter than `i`.
    pub fn ancestor(node: &NodeRef, i: usize) -> NodeRef {
        assert!(i > 0, "bad index for ancestor access");
        let mut current = Rc::clone(node);
        for _ in 0..i {
            let parent = current
                .parent
                .borrow()
                .upgrade()
                .expect("can't access parent");
            current = parent;
        }
        current
    }

    /// The `i`-th child of this node's parent.
    ///
    /// # Panics
    ///
    /// Panics if the node has no parent or the index is out of range.
    pub fn sibling(node: &NodeRef, i: usize) -> NodeRef {
        let parent = node
            .parent
            .borrow()
            .upgrade()
            .expect("can't access parent");
        let children = parent.children.borrow();
        children
            .get(i)
            .cloned()
            .expect("can't access sibling: index out of range")
    }
}

/// Semantic-action callbacks, one per translation symbol of the grammar.
///
/// The parser fires each callback at the exact position of its marker
/// within the chosen alternative, so a callback observes every earlier
/// child of `ctx` already attached and fully parsed.
pub trait Visitor {
{{visitor_methods}}}

/// Write the tree as a DOT digraph.
///
/// # Errors
///
/// Propagates whatever the sink returns.
pub fn tree_to_dot(out: &mut dyn Write, node: &NodeRef) -> io::Result<()> {
    writeln!(out, "strict digraph {{")?;
    let mut id = 0;
    dot_node(out, node, &mut id)?;
    writeln!(out, "}}")
}

/// Emit one node and its outgoing edges, returning the node's DOT id.
fn dot_node(out: &mut dyn Write, node: &NodeRef, id: &mut usize) -> io::Result<usize> {
    *id += 1;
    let this_id = *id;
    writeln!(out, "n{} [label=\"{}\"]", this_id, node.name)?;
    for child in node.children.borrow().iter() {
        let child_id = dot_node(out, child, id)?;
        writeln!(out, "n{} -> n{}", this_id, child_id)?;
    }
    Ok(this_id)
}
"##;

/// Template of the generated `parser.rs`: the windowed longest-match lexer
/// and the recursive-descent parser.
///
/// Placeholders: `{{token_patterns}}`, `{{parse_methods}}`.
pub const PARSER_TEMPLATE: &str = r##"//! Generated lexer and recursive-descent parser.
//!
//! Generated file; the grammar it accepts is baked into the dispatch
//! tables below.

use std::fmt;
use std::io::{ErrorKind, Read};
use std::rc::Rc;

use regex::Regex;

use crate::ast::{Node, NodeRef, TokenKind, Visitor};

/// Capacity of the lexer's buffered window. Tokens longer than this
/// cannot be matched.
const CAPACITY: usize = 64;

/// Raised when the lookahead token fits no alternative of the nonterminal
/// being parsed.
#[derive(Debug)]
pub struct ParseError {
    /// Kind of the offending token.
    pub kind: TokenKind,
    /// Text of the offending token.
    pub text: String,
    /// The nonterminal whose dispatch failed.
    pub nonterminal: &'static str,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected {:?} (`{}`) while parsing `{}`",
            self.kind, self.text, self.nonterminal
        )
    }
}

/// Longest-match lexer over an owned byte stream, buffered through a
/// bounded window.
pub struct Lexer {
    /// Token patterns in declaration order; earlier patterns win ties.
    patterns: Vec<(TokenKind, Regex)>,
    /// Whitespace skipped between tokens.
    whitespace: Regex,
    /// The input stream, owned for the lexer's lifetime.
    input: Box<dyn Read>,
    /// Buffered window over the head of the remaining input.
    buf: String,
    /// Whether the stream may still deliver bytes.
    remains: bool,
    /// Kind of the current token.
    kind: TokenKind,
    /// Text of the current token.
    text: String,
}

impl Lexer {
    /// Build the lexer over a stream and load the first token.
    pub fn new(input: Box<dyn Read>) -> Self {
        let patterns = vec![
{{token_patterns}}        ];
        let mut lexer = Lexer {
            patterns,
            whitespace: Regex::new(r"^[ \t\n]+").expect("invalid whitespace pattern"),
            input,
            buf: String::with_capacity(CAPACITY),
            remains: true,
            kind: TokenKind::Eps,
            text: String::new(),
        };
        lexer.fill_buffer();
        lexer.next_token();
        lexer
    }

    /// Kind and text of the current token, without advancing.
    pub fn peek(&self) -> (TokenKind, &str) {
        (self.kind, &self.text)
    }

    /// Advance to the next token.
    ///
    /// The longest prefix match among the token patterns wins; ties go to
    /// the earliest declared pattern. When nothing matches, the sentinel
    /// is delivered and the lexer refuses further advances.
    ///
    /// # Panics
    ///
    /// Panics when called after the end-of-input sentinel was delivered.
    pub fn next_token(&mut self) {
        assert!(
            self.kind != TokenKind::Eof,
            "attempt to call next_token past the end"
        );

        loop {
            let skip = match self.whitespace.find(&self.buf) {
                Some(m) => m.end(),
                None => break,
            };
            self.remove_prefix(skip);
        }

        if self.buf.is_empty() {
            self.kind = TokenKind::Eof;
            self.text.clear();
            return;
        }

        let mut best: Option<(TokenKind, usize)> = None;
        for (kind, pattern) in &self.patterns {
            if let Some(m) = pattern.find(&self.buf) {
                if best.map_or(true, |(_, len)| m.end() > len) {
                    best = Some((*kind, m.end()));
                }
            }
        }

        match best {
            Some((kind, len)) if len > 0 => {
                self.kind = kind;
                self.text = self.buf[..len].to_string();
                self.remove_prefix(len);
            }
            _ => {
                self.kind = TokenKind::Eof;
                self.text.clear();
            }
        }
    }

    /// Drop `n` bytes from the window head and refill from the stream.
    fn remove_prefix(&mut self, n: usize) {
        self.buf.drain(..n);
        self.fill_buffer();
    }

    /// Top up the window from the stream until full or exhausted.
    fn fill_buffer(&mut self) {
        let mut chunk = [0u8; CAPACITY];
        while self.remains && self.buf.len() < CAPACITY {
            let want = CAPACITY - self.buf.len();
            match self.input.read(&mut chunk[..want]) {
                Ok(0) => self.remains = false,
                Ok(n) => {
                    let piece = std::str::from_utf8(&chunk[..n])
                        .expect("input must be valid UTF-8");
                    self.buf.push_str(piece);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => panic!("failed to read input: {}", e),
            }
        }
    }
}

/// Recursive-descent parser owning one lexer and one visitor.
pub struct Parser {
    /// Token source.
    lexer: Lexer,
    /// User-supplied semantic actions.
    visitor: Box<dyn Visitor>,
}

impl Parser {
    /// Construct the parser.
    pub fn new(lexer: Lexer, visitor: Box<dyn Visitor>) -> Self {
        Parser { lexer, visitor }
    }

    /// Parse the whole input, returning the root of the derivation tree.
    ///
    /// # Errors
    ///
    /// Fails when the input does not belong to the grammar's language.
    pub fn parse(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_start(None)
    }
{{parse_methods}}}
"##;

/// Template of one `parse_<nonterminal>` routine.
///
/// Placeholders: `{{nterm}}`, `{{rule_cases}}`.
pub const PARSE_METHOD_TEMPLATE: &str = r##"
    /// Parse one `{{nterm}}` node, dispatching on the lookahead token.
    fn parse_{{nterm}}(&mut self, parent: Option<&NodeRef>) -> Result<NodeRef, ParseError> {
        let r = Node::inner("{{nterm}}");
        if let Some(parent) = parent {
            *r.parent.borrow_mut() = Rc::downgrade(parent);
        }
        let lookahead = self.lexer.peek().0;
        match lookahead {
{{rule_cases}}            _ => {
                let (kind, text) = self.lexer.peek();
                return Err(ParseError {
                    kind,
                    text: text.to_string(),
                    nonterminal: "{{nterm}}",
                });
            }
        }
        Ok(r)
    }
"##;

/// Template of the generated `main.rs` driver skeleton, written only when
/// the output directory has none.
///
/// Placeholders: `{{ast_imports}}`, `{{visit_overrides}}`.
pub const MAIN_TEMPLATE: &str = r##"//! Driver skeleton for the generated parser.
//!
//! Generated once; edit freely. Replace [`DefaultVisitor`]'s empty
//! callback bodies with real semantic actions.

use std::fs::File;
use std::io::{self, Read};
use std::process::ExitCode;

mod ast;
mod parser;

use ast::{{{ast_imports}}};
use parser::{Lexer, Parser};

/// Visitor implementation with empty callback bodies.
struct DefaultVisitor;

impl Visitor for DefaultVisitor {
{{visit_overrides}}}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let input: Box<dyn Read> = match args.len() {
        1 => Box::new(io::stdin()),
        2 => match File::open(&args[1]) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("[ERROR] can't open {}: {}", args[1], e);
                return ExitCode::FAILURE;
            }
        },
        _ => {
            eprintln!("usage: {} [input-file]", args[0]);
            return ExitCode::FAILURE;
        }
    };

    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer, Box::new(DefaultVisitor));

    match parser.parse() {
        Ok(tree) => {
            let mut stdout = io::stdout();
            if let Err(e) = tree_to_dot(&mut stdout, &tree) {
                eprintln!("[ERROR] {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            ExitCode::FAILURE
        }
    }
}
"##;
