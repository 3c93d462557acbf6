//! Rendering and writing of the generated artifacts.
//!
//! The emitter consumes an analyzed, LL(1) grammar: for each nonterminal
//! it builds a dispatch over the director sets of its alternatives and
//! splices the result into the parser template. Everything is rendered
//! before the first write, so a failure leaves no partial output.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::info;

use grammar::cfg::{Alternative, Grammar, Symbol, EOF, EPS};

use crate::error::Error;
use crate::templates::{AST_TEMPLATE, MAIN_TEMPLATE, PARSER_TEMPLATE, PARSE_METHOD_TEMPLATE};

/// File name of the AST/visitor artifact.
const AST_FILE: &str = "ast.rs";
/// File name of the parser/lexer artifact.
const PARSER_FILE: &str = "parser.rs";
/// File name of the driver skeleton.
const MAIN_FILE: &str = "main.rs";

/// Replace every `{{name}}` placeholder with its substitution.
fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in substitutions {
        out = out.replace(&format!("{{{{{}}}}}", name), value);
    }
    out
}

/// The distinct translation symbols of the grammar, sorted.
fn translation_symbols(grammar: &Grammar) -> BTreeSet<String> {
    let mut symbols = BTreeSet::new();
    for alternatives in grammar.rules.values() {
        for alternative in alternatives {
            for symbol in alternative {
                if let Symbol::Translation(name) = symbol {
                    symbols.insert(name.clone());
                }
            }
        }
    }
    symbols
}

/// Escape a regex source for embedding in a Rust string literal.
fn escape_pattern(pattern: &str) -> String {
    pattern.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Enum variant of a terminal name; the sentinels get their own spelling.
fn token_variant(name: &str) -> &str {
    match name {
        EOF => "Eof",
        EPS => "Eps",
        _ => name,
    }
}

/// Render the AST/visitor artifact.
pub fn ast_source(grammar: &Grammar) -> String {
    let mut token_variants = String::new();
    for (name, _) in &grammar.token_patterns {
        token_variants += &format!("    {},\n", name);
    }

    let mut visitor_methods = String::new();
    for name in translation_symbols(grammar) {
        visitor_methods += &format!("    /// Callback for the `${}` marker.\n", name);
        visitor_methods += &format!("    fn visit_{}(&mut self, ctx: &NodeRef);\n", name);
    }

    render(
        AST_TEMPLATE,
        &[
            ("token_variants", token_variants.as_str()),
            ("visitor_methods", visitor_methods.as_str()),
        ],
    )
}

/// Render the parser/lexer artifact.
pub fn parser_source(grammar: &Grammar) -> String {
    let mut token_patterns = String::new();
    for (name, pattern) in &grammar.token_patterns {
        token_patterns += &format!(
            "            (TokenKind::{}, Regex::new(\"^(?:{})\").expect(\"invalid pattern for token {}\")),\n",
            name,
            escape_pattern(pattern),
            name
        );
    }

    let mut parse_methods = String::new();
    for (lhs, alternatives) in &grammar.rules {
        parse_methods += &render(
            PARSE_METHOD_TEMPLATE,
            &[
                ("nterm", lhs.as_str()),
                ("rule_cases", rule_cases(grammar, lhs, alternatives).as_str()),
            ],
        );
    }

    render(
        PARSER_TEMPLATE,
        &[
            ("token_patterns", token_patterns.as_str()),
            ("parse_methods", parse_methods.as_str()),
        ],
    )
}

/// Render the driver skeleton.
pub fn main_source(grammar: &Grammar) -> String {
    let symbols = translation_symbols(grammar);

    let mut visit_overrides = String::new();
    for name in &symbols {
        visit_overrides += &format!("    fn visit_{}(&mut self, _ctx: &NodeRef) {{}}\n", name);
    }

    // NodeRef is only referenced by the overrides
    let ast_imports = if symbols.is_empty() {
        "tree_to_dot, Visitor"
    } else {
        "tree_to_dot, NodeRef, Visitor"
    };

    render(
        MAIN_TEMPLATE,
        &[
            ("visit_overrides", visit_overrides.as_str()),
            ("ast_imports", ast_imports),
        ],
    )
}

/// Build the dispatch arms of one nonterminal's parse routine: one arm per
/// alternative, covering every token of its director set.
fn rule_cases(grammar: &Grammar, lhs: &str, alternatives: &[Alternative]) -> String {
    let mut cases = String::new();
    for alternative in alternatives {
        let director = grammar.director_set(lhs, alternative);
        if director.is_empty() {
            // vacuous FIRST; the alternative can never be selected
            continue;
        }
        let arm = director
            .iter()
            .map(|token| format!("TokenKind::{}", token_variant(token)))
            .collect::<Vec<_>>()
            .join(" | ");

        let body = case_body(lhs, alternative);
        if body.is_empty() {
            cases += &format!("            {} => {{}}\n", arm);
        } else {
            cases += &format!("            {} => {{\n{}            }}\n", arm, body);
        }
    }
    cases
}

/// Statements walking one alternative left to right: terminals become
/// check-attach-advance blocks, nonterminals become recursive calls, and
/// translation symbols fire their visitor callbacks in place.
fn case_body(lhs: &str, alternative: &[Symbol]) -> String {
    if matches!(alternative, [Symbol::Eps]) {
        return String::new();
    }
    let mut body = String::new();
    for symbol in alternative {
        match symbol {
            Symbol::Eps => {}
            Symbol::Translation(name) => {
                body += &format!("                self.visitor.visit_{}(&r);\n", name);
            }
            Symbol::Nonterminal(name) => {
                body += &format!(
                    "                Node::add_child(&r, self.parse_{}(Some(&r))?);\n",
                    name
                );
            }
            Symbol::Terminal(name) => {
                body += "                {\n";
                body += "                    let (kind, text) = self.lexer.peek();\n";
                body += &format!("                    if kind != TokenKind::{} {{\n", name);
                body += "                        return Err(ParseError {\n";
                body += "                            kind,\n";
                body += "                            text: text.to_string(),\n";
                body += &format!("                            nonterminal: \"{}\",\n", lhs);
                body += "                        });\n";
                body += "                    }\n";
                body += "                    Node::add_child(&r, Node::leaf(text));\n";
                body += "                    self.lexer.next_token();\n";
                body += "                }\n";
            }
        }
    }
    body
}

/// Render and write the artifacts into `out_dir`.
///
/// The LL(1) gate and all rendering run before the first write. The driver
/// skeleton is only written when the directory has none.
///
/// # Errors
///
/// Fails if the grammar is not LL(1) or an artifact cannot be written.
pub fn write_artifacts(grammar: &Grammar, out_dir: &Path) -> Result<(), Error> {
    grammar.check_ll1()?;

    let ast = ast_source(grammar);
    let parser = parser_source(grammar);
    let main = main_source(grammar);

    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join(AST_FILE), ast)?;
    fs::write(out_dir.join(PARSER_FILE), parser)?;
    info!("wrote {} and {}", AST_FILE, PARSER_FILE);

    let main_path = out_dir.join(MAIN_FILE);
    if main_path.exists() {
        info!("{} already exists, left as is", MAIN_FILE);
    } else {
        fs::write(&main_path, main)?;
        info!("no {} in the output directory; wrote a skeleton", MAIN_FILE);
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::fs;

    use grammar::Grammar;

    use super::*;

    /// Factored arithmetic, the canonical LL(1) fixture.
    const ARITHMETIC: &str = "\
NUM    [0-9]+
PLUS    [+]
ASTERISK    [*]
LPAREN    [(]
RPAREN    [)]
%%
start: e;
e: t e_prime;
e_prime: PLUS t e_prime | EPS;
t: f t_prime;
t_prime: ASTERISK f t_prime | EPS;
f: LPAREN e RPAREN | NUM;
";

    /// A small LL(1) grammar with translation symbols.
    const MARKED: &str = "\
NUM    [0-9]+
%%
start: e $finish;
e: NUM $push;
";

    /// Parse a description and run the full analysis.
    fn analyzed(text: &str) -> Grammar {
        let mut grammar = Grammar::parse(text).unwrap();
        grammar.compute_first();
        grammar.compute_follow().unwrap();
        grammar
    }

    #[test]
    fn token_enum_lists_declared_terminals_in_order() {
        let ast = ast_source(&analyzed(ARITHMETIC));
        assert!(ast.contains("    NUM,\n    PLUS,\n    ASTERISK,\n    LPAREN,\n    RPAREN,\n}"));
    }

    #[test]
    fn visitor_declares_one_callback_per_marker() {
        let ast = ast_source(&analyzed(MARKED));
        assert!(ast.contains("fn visit_finish(&mut self, ctx: &NodeRef);"));
        assert!(ast.contains("fn visit_push(&mut self, ctx: &NodeRef);"));

        // no markers, no methods
        let ast = ast_source(&analyzed(ARITHMETIC));
        assert!(ast.contains("pub trait Visitor {\n}"));
    }

    #[test]
    fn lexer_table_embeds_anchored_patterns_in_order() {
        let parser = parser_source(&analyzed(ARITHMETIC));
        let num = parser.find("(TokenKind::NUM, Regex::new(\"^(?:[0-9]+)\")").unwrap();
        let plus = parser.find("(TokenKind::PLUS, Regex::new(\"^(?:[+])\")").unwrap();
        assert!(num < plus);
    }

    #[test]
    fn dispatch_arms_cover_the_director_sets() {
        let parser = parser_source(&analyzed(ARITHMETIC));
        assert!(parser.contains("fn parse_e_prime(&mut self, parent: Option<&NodeRef>)"));
        assert!(parser.contains("            TokenKind::PLUS => {"));
        // the nullable alternative is selected by FOLLOW(e_prime)
        assert!(parser.contains("            TokenKind::Eof | TokenKind::RPAREN => {}"));
        // terminals inside an arm are checked against the lookahead
        assert!(parser.contains("if kind != TokenKind::ASTERISK {"));
        // nonterminals recurse with the parent back-link
        assert!(parser.contains("Node::add_child(&r, self.parse_e(Some(&r))?);"));
    }

    #[test]
    fn visitor_callbacks_fire_in_marker_position() {
        let parser = parser_source(&analyzed(MARKED));
        let recurse = parser
            .find("Node::add_child(&r, self.parse_e(Some(&r))?);")
            .unwrap();
        let finish = parser.find("self.visitor.visit_finish(&r);").unwrap();
        assert!(recurse < finish);
    }

    #[test]
    fn patterns_are_escaped_for_embedding() {
        assert_eq!(escape_pattern(r#""a\b""#), r#"\"a\\b\""#);

        let grammar = analyzed("STR    \"[a-z]*\"\n%%\nstart: s;\ns: STR;");
        let parser = parser_source(&grammar);
        assert!(parser.contains("Regex::new(\"^(?:\\\"[a-z]*\\\")\")"));
    }

    #[test]
    fn skeleton_stubs_every_callback() {
        let main = main_source(&analyzed(MARKED));
        assert!(main.contains("fn visit_finish(&mut self, _ctx: &NodeRef) {}"));
        assert!(main.contains("fn visit_push(&mut self, _ctx: &NodeRef) {}"));
        assert!(main.contains("use ast::{tree_to_dot, NodeRef, Visitor};"));

        let main = main_source(&analyzed(ARITHMETIC));
        assert!(main.contains("use ast::{tree_to_dot, Visitor};"));
    }

    #[test]
    fn writes_artifacts_and_a_skeleton_when_absent() {
        let dir = std::env::temp_dir().join(format!("llgen-emit-fresh-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        write_artifacts(&analyzed(ARITHMETIC), &dir).unwrap();

        assert!(dir.join("ast.rs").exists());
        assert!(dir.join("parser.rs").exists());
        assert!(dir.join("main.rs").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn leaves_an_existing_driver_alone() {
        let dir = std::env::temp_dir().join(format!("llgen-emit-keep-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("main.rs"), "// custom driver\n").unwrap();

        write_artifacts(&analyzed(ARITHMETIC), &dir).unwrap();

        assert_eq!(
            fs::read_to_string(dir.join("main.rs")).unwrap(),
            "// custom driver\n"
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn refuses_to_emit_non_ll1_grammars() {
        let grammar = analyzed("NUM    [0-9]+\n%%\nstart: e;\ne: NUM | NUM NUM;");
        let dir = std::env::temp_dir().join(format!("llgen-emit-gate-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        assert!(matches!(
            write_artifacts(&grammar, &dir),
            Err(Error::Grammar(_))
        ));
        // the gate fires before anything is written
        assert!(!dir.exists());
    }
}
