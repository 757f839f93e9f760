pub const DEFAULT_ALLOWED_ROOTS: &[&str] = &["/projects/", "/assets/", "/public/"];

/// Roots a relative document path may live under before it is exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    allowed_roots: Vec<String>,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_ROOTS.iter().copied())
    }
}

impl PathPolicy {
    /// Roots are normalized to `/name/`; blank entries are dropped.
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_roots = roots
            .into_iter()
            .filter_map(|root| normalize_root(root.as_ref()))
            .collect();
        Self { allowed_roots }
    }

    pub fn allowed_roots(&self) -> &[String] {
        &self.allowed_roots
    }

    /// Returns the normalized path when it is safe to expose, `None` otherwise.
    pub fn validate(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() || raw.contains('\0') {
            return None;
        }

        if is_absolute_url(raw) {
            if raw.contains("..") {
                return None;
            }
            return Some(raw.to_string());
        }

        if raw.contains("..") {
            return None;
        }

        // Leading slashes collapse first; only interior `//` is refused.
        let normalized = normalize_path(raw);
        if normalized.contains("//") {
            return None;
        }

        if !self.is_under_allowed_root(&normalized) {
            return None;
        }

        Some(normalized)
    }

    fn is_under_allowed_root(&self, normalized: &str) -> bool {
        self.allowed_roots
            .iter()
            .any(|root| normalized.starts_with(root.as_str()))
    }
}

fn normalize_root(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("/{trimmed}/"))
}

pub fn validate_path(raw: &str) -> Option<String> {
    PathPolicy::default().validate(raw)
}

pub fn is_absolute_url(raw: &str) -> bool {
    let lowered = raw.trim_start().to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Exactly one leading `/`; the remainder is left untouched.
pub fn normalize_path(raw: &str) -> String {
    format!("/{}", raw.trim_start_matches('/'))
}
