use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use crate::product::ProductRecord;

/// Extensions tried when a stored reference does not match a file as-is
pub const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".PNG", ".jpg", ".JPG"];

/// Trim a raw reference; blanks and the literal `nan` mean "no image".
fn normalize_reference(reference: &str) -> Option<&str> {
    let trimmed = reference.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed)
    }
}

/// File names probed for a reference, in lookup order.
///
/// The exact reference comes first, then the reference with each extension,
/// then the reference without its last suffix with each extension.
pub fn image_candidates(reference: &str) -> Vec<String> {
    let Some(reference) = normalize_reference(reference) else {
        return Vec::new();
    };
    let base = reference
        .rsplit_once('.')
        .map(|(base, _)| base)
        .unwrap_or(reference);

    let mut candidates = vec![reference.to_string()];
    candidates.extend(IMAGE_EXTENSIONS.iter().map(|ext| format!("{reference}{ext}")));
    if !base.is_empty() {
        candidates.extend(IMAGE_EXTENSIONS.iter().map(|ext| format!("{base}{ext}")));
    }

    let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

/// A bare file name: no root, no `..`, no subdirectory.
fn is_plain_file_name(candidate: &str) -> bool {
    let mut components = Path::new(candidate).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Find the first existing file in `search_dir` matching a loose image reference.
///
/// Only files directly inside `search_dir` are considered.
pub fn resolve_image(reference: Option<&str>, search_dir: &Path) -> Option<PathBuf> {
    image_candidates(reference?)
        .into_iter()
        .filter(|candidate| is_plain_file_name(candidate))
        .map(|candidate| search_dir.join(candidate))
        .find(|path| path.is_file())
}

/// Resolved front and back pictures of one product
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductImages {
    pub front: Option<PathBuf>,
    pub back: Option<PathBuf>,
}

impl ProductImages {
    /// The picture to use where only one fits, front first
    pub fn primary(&self) -> Option<&Path> {
        self.front.as_deref().or(self.back.as_deref())
    }
}

/// Resolves product pictures against one image directory
#[derive(Debug, Clone)]
pub struct ImageResolver {
    dir: PathBuf,
}

impl ImageResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn resolve(&self, reference: Option<&str>) -> Option<PathBuf> {
        resolve_image(reference, &self.dir)
    }

    pub fn images_for(&self, record: &ProductRecord) -> ProductImages {
        ProductImages {
            front: self.resolve(record.image_front.as_deref()),
            back: self.resolve(record.image_back.as_deref()),
        }
    }

    /// Public URL of a resolved image under the `/images` route
    pub fn url_for(&self, path: &Path) -> Option<String> {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| format!("/images/{}", urlencoding::encode(name)))
    }
}
