///
/// # Import Statement Scanner and Resolver
///
/// Scans game scripts for module statements and turns them into
/// `ImportRecord`s with absolute dotted paths.
///
/// ## Grammar
///
/// One statement per line, anchored at the line start after optional
/// indentation and up to two `//` markers (a commented statement and its
/// sanitized form), so sanitized scripts scan the same as raw ones:
///
/// ```text
/// import <path> [as <alias>];
/// from <path> import <name> [as <alias>];
/// ```
///
/// The statement body runs up to the first `;` and is split on runs of
/// whitespace into tokens. Lines without a terminator or with a body that
/// does not fit the grammar are skipped; `parse_imports_strict` reports
/// them instead.
///
/// ## Relative Paths
///
/// Each leading dot climbs one level from the importing module's own
/// dotted path. With base `a.b.c`, `.Foo` is `a.b.Foo` and `..Foo` is
/// `a.Foo`. Paths without a leading dot are already absolute.
///

use std::iter::Enumerate;
use std::str::Lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Import,
    From,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub kind: ImportKind,
    pub package: String,
    pub class_name: String,
    pub alias: String,
    pub resolved_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedImport {
    /// 1-based line number.
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct StrictParse {
    pub records: Vec<ImportRecord>,
    pub unmatched: Vec<UnmatchedImport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Import,
    As,
    Path,
    Ident,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
}

impl<'a> Token<'a> {
    fn classify(text: &'a str) -> Self {
        let kind = match text {
            "import" => TokenKind::Import,
            "as" => TokenKind::As,
            _ if text.contains('.') => TokenKind::Path,
            _ => TokenKind::Ident,
        };
        Token { kind, text }
    }

    fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Path | TokenKind::Ident)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statement<'a> {
    Import { path: &'a str, alias: Option<&'a str> },
    From { package: &'a str, name: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScannedLine<'a> {
    Statement(Statement<'a>),
    Unmatched { line: usize, text: &'a str },
}

///
/// Line scanner over one source text. Every call to `parse_imports`
/// builds a fresh scanner, so no position survives between calls.
///
struct ImportScanner<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> ImportScanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate(),
        }
    }
}

impl<'a> Iterator for ImportScanner<'a> {
    type Item = ScannedLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, text) in self.lines.by_ref() {
            let Some((keyword, rest)) = split_keyword(text) else {
                continue;
            };

            let statement = rest
                .split_once(';')
                .and_then(|(body, _)| parse_body(keyword, body));

            return Some(match statement {
                Some(statement) => ScannedLine::Statement(statement),
                None => ScannedLine::Unmatched {
                    line: index + 1,
                    text,
                },
            });
        }
        None
    }
}

fn split_keyword(line: &str) -> Option<(ImportKind, &str)> {
    // A commented statement (`//import`) and its masked form (`////import`)
    // both count.
    let trimmed = line.trim_start();
    let trimmed = trimmed.strip_prefix("//").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("//").unwrap_or(trimmed);

    let (kind, rest) = if let Some(rest) = trimmed.strip_prefix("import") {
        (ImportKind::Import, rest)
    } else if let Some(rest) = trimmed.strip_prefix("from") {
        (ImportKind::From, rest)
    } else {
        return None;
    };

    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => None,
        _ => Some((kind, rest)),
    }
}

fn parse_body(keyword: ImportKind, body: &str) -> Option<Statement<'_>> {
    // The keyword must be separated from its first operand.
    if !body.starts_with(char::is_whitespace) {
        return None;
    }

    let tokens: Vec<Token<'_>> = body.split_whitespace().map(Token::classify).collect();

    match keyword {
        ImportKind::Import => {
            let path = tokens.first().filter(|t| t.is_name())?;
            Some(Statement::Import {
                path: path.text,
                alias: tokens.get(2).map(|t| t.text),
            })
        }
        ImportKind::From => {
            let package = tokens.first().filter(|t| t.is_name())?;
            tokens.get(1).filter(|t| t.kind == TokenKind::Import)?;
            let name = tokens.get(2).filter(|t| t.is_name())?;
            Some(Statement::From {
                package: package.text,
                name: name.text,
            })
        }
    }
}

pub fn resolve_path(path: &str, base: &str) -> String {
    if !path.starts_with('.') {
        return path.to_string();
    }

    let mut base = base;
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix('.') {
        base = match base.rfind('.') {
            Some(index) => &base[..index],
            None => "",
        };
        rest = stripped;
    }

    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}.{}", base, rest),
    }
}

impl Statement<'_> {
    fn into_record(self, base: &str) -> ImportRecord {
        match self {
            Statement::Import { path, alias } => {
                let resolved_path = resolve_path(path, base);
                let (package, class_name) = match resolved_path.rsplit_once('.') {
                    Some((package, class_name)) => (package.to_string(), class_name.to_string()),
                    None => (resolved_path.clone(), resolved_path.clone()),
                };
                let alias = match alias {
                    Some(alias) => alias.trim_start_matches('.').to_string(),
                    None => class_name.clone(),
                };
                ImportRecord {
                    kind: ImportKind::Import,
                    package,
                    class_name,
                    alias,
                    resolved_path,
                }
            }
            Statement::From { package, name } => {
                let package = resolve_path(package, base);
                let resolved_path = if package.is_empty() {
                    resolve_path(name, base)
                } else {
                    format!("{}.{}", package, name)
                };
                ImportRecord {
                    kind: ImportKind::From,
                    package,
                    class_name: name.to_string(),
                    alias: name.to_string(),
                    resolved_path,
                }
            }
        }
    }
}

/// Returns the records of every statement that matches the grammar, in
/// source order. Non-matching lines are skipped without error.
pub fn parse_imports(code: &str, base_package_path: &str) -> Vec<ImportRecord> {
    ImportScanner::new(code)
        .filter_map(|scanned| match scanned {
            ScannedLine::Statement(statement) => Some(statement.into_record(base_package_path)),
            ScannedLine::Unmatched { .. } => None,
        })
        .collect()
}

/// Like `parse_imports`, but also reports lines that start with `import`
/// or `from` and fail the grammar.
pub fn parse_imports_strict(code: &str, base_package_path: &str) -> StrictParse {
    let mut parsed = StrictParse::default();

    for scanned in ImportScanner::new(code) {
        match scanned {
            ScannedLine::Statement(statement) => {
                parsed.records.push(statement.into_record(base_package_path));
            }
            ScannedLine::Unmatched { line, text } => {
                tracing::warn!(line, text, "unmatched import statement");
                parsed.unmatched.push(UnmatchedImport {
                    line,
                    text: text.to_string(),
                });
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_two_levels() {
        assert_eq!(resolve_path("..Foo", "a.b.c"), "a.Foo");
    }

    #[test]
    fn test_resolve_relative_one_level() {
        assert_eq!(resolve_path(".Foo", "a.b.c"), "a.b.Foo");
        assert_eq!(resolve_path(".sub.Foo", "a.b"), "a.sub.Foo");
    }

    #[test]
    fn test_resolve_absolute_ignores_base() {
        assert_eq!(resolve_path("Foo", "a.b.c"), "Foo");
        assert_eq!(resolve_path("x.y.Foo", ""), "x.y.Foo");
    }

    #[test]
    fn test_resolve_past_root_never_leaves_leading_dot() {
        assert_eq!(resolve_path("...Foo", "a.b"), "Foo");
        assert_eq!(resolve_path(".Foo", ""), "Foo");
        assert_eq!(resolve_path("..", "a.b.c"), "a");
    }

    #[test]
    fn test_parse_import_record_shape() {
        let records = parse_imports("import a.b.C;", "");
        assert_eq!(
            records,
            vec![ImportRecord {
                kind: ImportKind::Import,
                package: "a.b".to_string(),
                class_name: "C".to_string(),
                alias: "C".to_string(),
                resolved_path: "a.b.C".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_from_record_shape() {
        let records = parse_imports("from a.b import C as D;", "");
        assert_eq!(
            records,
            vec![ImportRecord {
                kind: ImportKind::From,
                package: "a.b".to_string(),
                class_name: "C".to_string(),
                alias: "C".to_string(),
                resolved_path: "a.b.C".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_single_segment_import() {
        let records = parse_imports("import Sound;", "game.main");
        assert_eq!(records[0].package, "Sound");
        assert_eq!(records[0].class_name, "Sound");
        assert_eq!(records[0].resolved_path, "Sound");
    }

    #[test]
    fn test_parse_import_with_alias() {
        let records = parse_imports("import ui.widget.ButtonView as Button;", "");
        assert_eq!(records[0].alias, "Button");
        assert_eq!(records[0].class_name, "ButtonView");
        assert_eq!(records[0].package, "ui.widget");
    }

    #[test]
    fn test_parse_relative_import() {
        let records = parse_imports("import .util.Math;", "game.scenes.Title");
        assert_eq!(records[0].resolved_path, "game.scenes.util.Math");
        assert_eq!(records[0].package, "game.scenes.util");
        assert_eq!(records[0].class_name, "Math");
        assert!(!records[0].resolved_path.starts_with('.'));
    }

    #[test]
    fn test_parse_relative_from() {
        let records = parse_imports("from ..lib import Timer;", "game.scenes.Title");
        assert_eq!(records[0].package, "game.lib");
        assert_eq!(records[0].resolved_path, "game.lib.Timer");
    }

    #[test]
    fn test_parse_from_above_root() {
        let records = parse_imports("from .. import Timer;", "Title");
        assert_eq!(records[0].package, "");
        assert_eq!(records[0].resolved_path, "Timer");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let code = "import a.b.C\nfrom a.b C;\nimport ;\nfrom x import;\nimport ok.Fine;";
        let records = parse_imports(code, "");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].resolved_path, "ok.Fine");
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        let records = parse_imports("importer.run();\nfromage = 1;\nimport\ta.B;", "");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].resolved_path, "a.B");
    }

    #[test]
    fn test_indented_and_sanitized_statements() {
        let code = "  import a.B;\n//import c.D;\n\t//from e import F;";
        let paths: Vec<String> = parse_imports(code, "")
            .into_iter()
            .map(|r| r.resolved_path)
            .collect();
        assert_eq!(paths, vec!["a.B", "c.D", "e.F"]);
    }

    #[test]
    fn test_sanitized_and_raw_scan_identically() {
        let code = "#define X\nimport a.B;\nfrom .c import D;\n//import x.Y;\n  //from e import F;\nvar z;";
        let sanitized = crate::sanitize::sanitize(code);
        assert!(sanitized.contains("////import x.Y;"));
        let raw = parse_imports(code, "m.n");
        assert_eq!(raw.len(), 4);
        assert_eq!(raw, parse_imports(&sanitized, "m.n"));
    }

    #[test]
    fn test_parse_is_restartable() {
        let code = "import a.B;\nfrom c import D;\nimport e.F;";
        let first = parse_imports(code, "x");
        let second = parse_imports(code, "x");
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_strict_reports_unmatched() {
        let code = "import a.B;\nimport broken\nvar x;\nfrom c D;";
        let parsed = parse_imports_strict(code, "");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(
            parsed.unmatched,
            vec![
                UnmatchedImport { line: 2, text: "import broken".to_string() },
                UnmatchedImport { line: 4, text: "from c D;".to_string() },
            ]
        );
    }
}
