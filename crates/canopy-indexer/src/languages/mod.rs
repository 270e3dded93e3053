//! Language extractors for different programming languages (C1).

pub mod c;
pub mod cpp;
pub mod generic;
pub mod go;
pub mod java;
pub mod javascript;
pub mod python;
pub mod rust;
pub mod typescript;

pub use crate::extractor::{ExtractionResult, LanguageExtractor};

use crate::parser_pool::ParserPool;
use std::path::Path;

/// Resolve the extractor for a file, dispatching on extension. Always
/// returns `Some` — unrecognized extensions fall back to [`generic::GenericExtractor`].
pub fn get_extractor(path: &Path) -> Option<Box<dyn LanguageExtractor>> {
    get_extractor_with_pool(path, crate::parser_pool::create_parser_pool())
}

/// Same as [`get_extractor`] but reuses a shared parser pool instead of
/// spinning up a fresh one per call — what the coordinator uses.
pub fn get_extractor_with_pool(path: &Path, pool: ParserPool) -> Option<Box<dyn LanguageExtractor>> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let extractor: Box<dyn LanguageExtractor> = match ext {
        "rs" => Box::new(rust::RustExtractor::new(pool)),
        "ts" | "tsx" => Box::new(typescript::TypeScriptExtractor::new(pool)),
        "js" | "jsx" | "mjs" | "cjs" => Box::new(javascript::JavaScriptExtractor::new(pool)),
        "py" | "pyi" => Box::new(python::PythonExtractor::new(pool)),
        "go" => Box::new(go::GoExtractor::new(pool)),
        "java" => Box::new(java::JavaExtractor::new(pool)),
        "c" | "h" => Box::new(c::CExtractor::new(pool)),
        "cpp" | "cc" | "cxx" | "hpp" | "hh" => Box::new(cpp::CppExtractor::new(pool)),
        _ => Box::new(generic::GenericExtractor),
    };
    Some(extractor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn dispatches_by_extension() {
        for (name, _) in [
            ("main.rs", "rust"),
            ("app.ts", "typescript"),
            ("index.js", "javascript"),
            ("lib.py", "python"),
            ("main.go", "go"),
            ("Main.java", "java"),
            ("main.c", "c"),
            ("main.cpp", "cpp"),
            ("unknown.xyz", "generic"),
        ] {
            let path = PathBuf::from(name);
            let extractor = get_extractor(&path);
            assert!(extractor.is_some(), "expected extractor for {name}");
            let result = extractor.unwrap().extract(&path, b"");
            assert!(result.is_ok(), "extractor failed for {name}");
        }
    }
}
