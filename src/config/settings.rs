use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Measure logical file length instead of allocated on-disk size.
    pub use_apparent_size: bool,
    /// Directory extensions treated as single logical files (scanned as
    /// atomic leaves, never fanned out).
    pub bundle_extensions: Vec<String>,
    /// Number of rings the layout builds before the expansion gate applies.
    pub base_depth: usize,
    /// Hard cap on ring count, bounding pathological depth.
    pub max_rings: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_apparent_size: false,
            bundle_extensions: vec![
                "app".into(),
                "framework".into(),
                "bundle".into(),
                "plugin".into(),
                "appex".into(),
                "kext".into(),
                "xcodeproj".into(),
                "photoslibrary".into(),
            ],
            base_depth: 3,
            max_rings: 16,
        }
    }
}

impl Settings {
    pub fn is_bundle_name(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self
                .bundle_extensions
                .iter()
                .any(|b| b.eq_ignore_ascii_case(ext)),
            _ => false,
        }
    }
}
