use closure_deps::parsers::common::TreeSitterParser;
use closure_deps::parsers::lexer::{tokenize, LexError, TokenKind};

fn kinds_and_values(source: &str) -> Vec<(TokenKind, String)> {
    let tree = TreeSitterParser::javascript()
        .unwrap()
        .parse_source(source)
        .unwrap();
    tokenize(&tree, source)
        .unwrap()
        .into_iter()
        .map(|t| (t.kind, t.value.to_string()))
        .collect()
}

fn has(tokens: &[(TokenKind, String)], kind: TokenKind, value: &str) -> bool {
    tokens.iter().any(|(k, v)| *k == kind && v == value)
}

#[test]
fn lexer_splits_goog_call_into_five_tokens() {
    let tokens = kinds_and_values("goog.provide('a.b');");
    let expected = [
        (TokenKind::Identifier, "goog"),
        (TokenKind::Punctuator, "."),
        (TokenKind::Identifier, "provide"),
        (TokenKind::Punctuator, "("),
        (TokenKind::String, "'a.b'"),
        (TokenKind::Punctuator, ")"),
        (TokenKind::Punctuator, ";"),
    ];
    assert_eq!(tokens.len(), expected.len());
    for ((kind, value), (want_kind, want_value)) in tokens.iter().zip(expected) {
        assert_eq!(*kind, want_kind);
        assert_eq!(value, want_value);
    }
}

#[test]
fn lexer_skips_comments_and_tracks_lines() {
    let source = "// line comment\n/* block\n comment */\nvar x = 1;\n";
    let tree = TreeSitterParser::javascript()
        .unwrap()
        .parse_source(source)
        .unwrap();
    let tokens = tokenize(&tree, source).unwrap();
    assert_eq!(tokens[0].value, "var");
    assert_eq!(tokens[0].kind, TokenKind::Keyword);
    assert_eq!(tokens[0].line, 4);
    assert_eq!(tokens[3].kind, TokenKind::Numeric);
}

#[test]
fn lexer_keeps_escapes_raw_in_strings() {
    let tokens = kinds_and_values(r#"x = "a\"b" + 'c\'d';"#);
    assert!(has(&tokens, TokenKind::String, r#""a\"b""#));
    assert!(has(&tokens, TokenKind::String, r#"'c\'d'"#));
}

#[test]
fn lexer_distinguishes_regex_from_division() {
    let tokens = kinds_and_values("var r = /ab+c/gi; var d = a / b / c;");
    assert!(has(&tokens, TokenKind::RegularExpression, "/ab+c/gi"));
    let divisions = tokens
        .iter()
        .filter(|(kind, value)| *kind == TokenKind::Punctuator && value == "/")
        .count();
    assert_eq!(divisions, 2);

    let tokens = kinds_and_values("if (ok) /'/.test(s);\nfunction f() {}\n/\"/.test(s);\n");
    assert!(has(&tokens, TokenKind::RegularExpression, "/'/"));
    assert!(has(&tokens, TokenKind::RegularExpression, "/\"/"));
}

#[test]
fn lexer_keeps_template_and_its_substitutions() {
    let tokens = kinds_and_values("var t = `a${ goog.x }c`;");
    assert!(has(&tokens, TokenKind::Template, "`a${ goog.x }c`"));
    assert!(has(&tokens, TokenKind::Identifier, "goog"));
    assert!(has(&tokens, TokenKind::Identifier, "x"));
}

#[test]
fn lexer_classifies_literals() {
    let tokens = kinds_and_values("a = true !== null ? 0x1F : 1.5e-3; this.b = false;");
    assert!(has(&tokens, TokenKind::Boolean, "true"));
    assert!(has(&tokens, TokenKind::Boolean, "false"));
    assert!(has(&tokens, TokenKind::Punctuator, "!=="));
    assert!(has(&tokens, TokenKind::Null, "null"));
    assert!(has(&tokens, TokenKind::Numeric, "0x1F"));
    assert!(has(&tokens, TokenKind::Numeric, "1.5e-3"));
    assert!(has(&tokens, TokenKind::Keyword, "this"));
    assert!(has(&tokens, TokenKind::Identifier, "b"));
}

#[test]
fn lexer_rejects_broken_source_with_line() {
    let source = "goog.provide('a');\nvar s = 'open;\n";
    let tree = TreeSitterParser::javascript()
        .unwrap()
        .parse_source(source)
        .unwrap();
    assert!(matches!(
        tokenize(&tree, source).unwrap_err(),
        LexError::Syntax { line } if line >= 2
    ));
}
