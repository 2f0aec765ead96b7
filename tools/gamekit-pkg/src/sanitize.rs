///
/// # Source Sanitizer
///
/// Reversible masking of the two syntax forms a standard script parser
/// rejects:
///
/// - `#` preprocessor directives at the start of a line become `//#...`
/// - `import` / `from` statements (after optional indentation, optionally
///   already commented with `//`) get a `//` inserted before the keyword
///
/// `unsanitize` removes exactly what `sanitize` inserted, so
/// `unsanitize(&sanitize(code)) == code` for any input whose lines do not
/// already start with `//#` or with a double `////` before a keyword.
///
/// Only the line start is considered. Statements that follow other code on
/// the same line are left alone.
///

use regex::Regex;
use std::sync::LazyLock;

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#").expect("directive pattern"));

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)((?://)?(?i:import|from)\b)").expect("import pattern")
});

static MASKED_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^//#").expect("masked directive pattern"));

static MASKED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)//((?://)?(?i:import|from)\b)").expect("masked import pattern")
});

pub fn sanitize(code: &str) -> String {
    let code = DIRECTIVE.replace_all(code, "//#");
    IMPORT.replace_all(&code, "${1}//${2}").into_owned()
}

pub fn unsanitize(code: &str) -> String {
    let code = MASKED_DIRECTIVE.replace_all(code, "#");
    MASKED_IMPORT.replace_all(&code, "${1}${2}").into_owned()
}
