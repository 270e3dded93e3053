//! Content-addressed signatures driving incremental regeneration.

use crate::error::SignatureError;
use crate::notes::Note;
use crate::page::PageSidecar;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest rendered as lowercase hex.
pub type Signature = String;

fn hex_digest(bytes: &[u8]) -> Signature {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Deterministic serialization of notes for mixing into a signature:
/// sorted by `updated_at`, then `updated_at|content` joined by `\n`.
fn canonical_notes(notes: &[Note]) -> String {
    let mut sorted: Vec<&Note> = notes.iter().collect();
    sorted.sort_by_key(|n| n.updated_at);
    sorted
        .iter()
        .map(|n| format!("{}|{}", n.updated_at.to_rfc3339(), n.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `SHA256(file_bytes || 0x00 || canonical(notes))`.
pub fn file_signature(file_bytes: &[u8], notes: &[Note]) -> Signature {
    let mut input = file_bytes.to_vec();
    input.push(0u8);
    input.extend_from_slice(canonical_notes(notes).as_bytes());
    hex_digest(&input)
}

/// `(filename, file_content_sha256)` pair for a file directly inside a
/// directory being signed.
pub struct DirectFile {
    pub name: String,
    pub content_hash: Signature,
}

/// `(directory_path, purpose)` for a direct child directory's stored
/// summary, used to propagate changes upward.
pub struct ChildDirectory {
    pub path: String,
    pub purpose: String,
}

/// Mixes direct files and direct child-directory purposes so that a
/// directory's page is invalidated when either its own files change or a
/// child's purpose changes.
pub fn directory_signature(mut files: Vec<DirectFile>, mut children: Vec<ChildDirectory>) -> Signature {
    files.sort_by(|a, b| a.name.cmp(&b.name));
    children.sort_by(|a, b| a.path.cmp(&b.path));

    let file_part = files
        .iter()
        .map(|f| format!("{}:{}", f.name, f.content_hash))
        .collect::<Vec<_>>()
        .join("|");
    let dir_part = children
        .iter()
        .map(|c| format!("{}:{}", c.path, c.purpose))
        .collect::<Vec<_>>()
        .join("|");

    hex_digest(format!("{file_part}||{dir_part}").as_bytes())
}

/// Hashes a canonical JSON serialization of the synthesis map.
pub fn architecture_signature(synthesis_map: &crate::page::SynthesisMap) -> Result<Signature, SignatureError> {
    let json = serde_json::to_string(synthesis_map).map_err(SignatureError::Serialize)?;
    Ok(hex_digest(json.as_bytes()))
}

/// What the orchestrator should do about a page given its current
/// signature, the previously stored sidecar (if any), and any notes newer
/// than the stored generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Regenerate,
    Skip,
}

pub fn decide(current_signature: &str, stored: Option<&PageSidecar>, notes: &[Note]) -> Decision {
    let Some(sidecar) = stored else {
        return Decision::Regenerate;
    };
    if sidecar.source_hash != current_signature {
        return Decision::Regenerate;
    }
    if has_newer_note(sidecar.generated_at, notes) {
        return Decision::Regenerate;
    }
    Decision::Skip
}

fn has_newer_note(generated_at: DateTime<Utc>, notes: &[Note]) -> bool {
    notes.iter().any(|n| n.updated_at > generated_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_signature_is_deterministic() {
        let a = file_signature(b"fn main() {}", &[]);
        let b = file_signature(b"fn main() {}", &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn file_signature_changes_with_content() {
        let a = file_signature(b"fn main() {}", &[]);
        let b = file_signature(b"fn main() {} ", &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn directory_signature_changes_with_child_purpose() {
        let files = vec![DirectFile {
            name: "lib.rs".to_string(),
            content_hash: "abc".to_string(),
        }];
        let a = directory_signature(
            files.clone(),
            vec![ChildDirectory {
                path: "src/utils".to_string(),
                purpose: "helpers".to_string(),
            }],
        );
        let b = directory_signature(
            files,
            vec![ChildDirectory {
                path: "src/utils".to_string(),
                purpose: "changed purpose".to_string(),
            }],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn decide_regenerates_when_no_sidecar() {
        assert_eq!(decide("abc", None, &[]), Decision::Regenerate);
    }

    #[test]
    fn decide_skips_on_matching_signature_and_no_new_notes() {
        let sidecar = PageSidecar {
            source_hash: "abc".to_string(),
            generated_at: Utc::now(),
        };
        assert_eq!(decide("abc", Some(&sidecar), &[]), Decision::Skip);
    }

    #[test]
    fn decide_regenerates_on_newer_note() {
        let sidecar = PageSidecar {
            source_hash: "abc".to_string(),
            generated_at: DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let note = Note {
            content: "fix this".to_string(),
            author: None,
            updated_at: Utc::now(),
        };
        assert_eq!(decide("abc", Some(&sidecar), &[note]), Decision::Regenerate);
    }
}
