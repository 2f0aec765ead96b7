///
/// Script engine seam.
///
/// An engine parses standard-syntax script source, runs its node visitors
/// and returns regenerated source. The package facade only ever hands it
/// sanitized code, so `#` directives and module statements arrive as line
/// comments.
///

use crate::errors::PackageError;

pub trait ScriptEngine {
    fn transform(&mut self, sanitized: &str) -> Result<String, PackageError>;
}

impl<F> ScriptEngine for F
where
    F: FnMut(&str) -> Result<String, PackageError>,
{
    fn transform(&mut self, sanitized: &str) -> Result<String, PackageError> {
        self(sanitized)
    }
}
