//! Caption-font resolution with silent fallback.

use std::path::PathBuf;
use tracing::{info, warn};

/// Resolves the font family used for chart captions. A miss is not an
/// error; callers keep their built-in default family.
pub trait FontResolver {
    fn title_family(&self) -> Option<String>;
}

/// Probes well-known filesystem locations for CJK-capable fonts and yields
/// the family of the first font file that exists.
#[derive(Debug, Clone)]
pub struct SystemFonts {
    probes: Vec<(PathBuf, String)>,
}

impl Default for SystemFonts {
    fn default() -> Self {
        // Bundled font first, then the usual Linux and Windows locations.
        let probes = [
            ("NanumGothic.ttf", "NanumGothic"),
            ("/usr/share/fonts/truetype/nanum/NanumGothic.ttf", "NanumGothic"),
            ("C:/Windows/Fonts/malgun.ttf", "Malgun Gothic"),
        ];
        Self {
            probes: probes
                .into_iter()
                .map(|(path, family)| (PathBuf::from(path), family.to_string()))
                .collect(),
        }
    }
}

impl SystemFonts {
    pub fn with_probes(probes: Vec<(PathBuf, String)>) -> Self {
        Self { probes }
    }
}

impl FontResolver for SystemFonts {
    fn title_family(&self) -> Option<String> {
        for (path, family) in &self.probes {
            if path.exists() {
                info!("using caption font {family} from {}", path.display());
                return Some(family.clone());
            }
        }
        warn!("no CJK-capable font found, captions use the default family");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_first_existing_probe_wins() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.ttf");
        fs::write(&present, b"not really a font").unwrap();

        let fonts = SystemFonts::with_probes(vec![
            (dir.path().join("missing.ttf"), "Missing".to_string()),
            (present, "Present".to_string()),
        ]);
        assert_eq!(fonts.title_family(), Some("Present".to_string()));
    }

    #[test]
    fn test_no_probe_found_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let fonts = SystemFonts::with_probes(vec![(
            dir.path().join("missing.ttf"),
            "Missing".to_string(),
        )]);
        assert_eq!(fonts.title_family(), None);
    }
}
