use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("input '{input}' contains a blank pattern")]
    Blank { input: String },

    #[error("invalid glob '{pattern}' in input '{input}': {source}")]
    Invalid {
        input: String,
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Compiled glob list. `*` stays within one path segment, `**` spans
/// directories and dotfiles are ordinary names.
#[derive(Clone, Debug)]
pub struct PatternList {
    patterns: Vec<String>,
    set: GlobSet,
}

impl PatternList {
    pub fn compile(input: &str, patterns: &[String]) -> Result<Self, PatternError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            if pattern.trim().is_empty() {
                return Err(PatternError::Blank {
                    input: input.to_string(),
                });
            }
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| PatternError::Invalid {
                    input: input.to_string(),
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| PatternError::Invalid {
            input: input.to_string(),
            pattern: patterns.join(", "),
            source,
        })?;
        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

/// How a single commit's changed files relate to the configured filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathVerdict {
    /// Every changed file matches `paths_ignore`.
    Ignored,
    /// No changed file matches `paths`.
    Skipped,
    /// The change may affect the build.
    Relevant,
}

impl PathVerdict {
    pub fn is_skippable(self) -> bool {
        !matches!(self, Self::Relevant)
    }
}

#[derive(Clone, Debug)]
pub struct PathMatcher {
    include: PatternList,
    exclude: PatternList,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self {
            include: PatternList::empty(),
            exclude: PatternList::empty(),
        }
    }
}

impl PathMatcher {
    pub fn new(paths: &[String], paths_ignore: &[String]) -> Result<Self, PatternError> {
        Ok(Self {
            include: PatternList::compile("paths", paths)?,
            exclude: PatternList::compile("paths_ignore", paths_ignore)?,
        })
    }

    pub fn is_active(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }

    pub fn include_patterns(&self) -> &[String] {
        self.include.patterns()
    }

    pub fn exclude_patterns(&self) -> &[String] {
        self.exclude.patterns()
    }

    /// All changed files match `paths_ignore`. False when no ignore patterns exist.
    pub fn is_path_ignored(&self, changed_files: &[String]) -> bool {
        !self.exclude.is_empty() && changed_files.iter().all(|f| self.exclude.is_match(f))
    }

    /// None of the changed files match `paths`. False when no include patterns exist.
    pub fn is_path_skipped(&self, changed_files: &[String]) -> bool {
        !self.include.is_empty() && !changed_files.iter().any(|f| self.include.is_match(f))
    }

    pub fn classify(&self, changed_files: &[String]) -> PathVerdict {
        if self.is_path_ignored(changed_files) {
            PathVerdict::Ignored
        } else if self.is_path_skipped(changed_files) {
            PathVerdict::Skipped
        } else {
            PathVerdict::Relevant
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn empty_pattern_lists_never_skip() {
        let matcher = PathMatcher::default();
        let files = strings(&["README.md", "src/lib.rs"]);

        assert!(!matcher.is_active());
        assert!(!matcher.is_path_ignored(&files));
        assert!(!matcher.is_path_skipped(&files));
        assert_eq!(matcher.classify(&files), PathVerdict::Relevant);
    }

    #[test]
    fn markdown_only_commit_is_path_ignored() {
        let matcher = PathMatcher::new(&[], &strings(&["**/*.md"])).unwrap();

        assert!(matcher.is_path_ignored(&strings(&["README.md"])));
        assert!(matcher.is_path_ignored(&strings(&["docs/guide/intro.md", "CHANGELOG.md"])));
        assert!(!matcher.is_path_ignored(&strings(&["README.md", "src/main.rs"])));
    }

    #[test]
    fn commit_outside_include_list_is_path_skipped() {
        let matcher = PathMatcher::new(&strings(&["src/**"]), &[]).unwrap();

        assert!(matcher.is_path_skipped(&strings(&["README.md"])));
        assert_eq!(
            matcher.classify(&strings(&["README.md"])),
            PathVerdict::Skipped
        );
        assert!(!matcher.is_path_skipped(&strings(&["README.md", "src/a/b.rs"])));
    }

    #[test]
    fn single_star_stays_within_a_segment() {
        let matcher = PathMatcher::new(&[], &strings(&["*.md"])).unwrap();

        assert!(matcher.is_path_ignored(&strings(&["README.md"])));
        assert!(!matcher.is_path_ignored(&strings(&["docs/README.md"])));
    }

    #[test]
    fn star_matches_dotfiles() {
        let matcher = PathMatcher::new(&[], &strings(&["*", "*/workflows/*"])).unwrap();

        assert!(matcher.is_path_ignored(&strings(&[".eslintrc"])));
        assert!(matcher.is_path_ignored(&strings(&[".github/workflows/ci.yml"])));
    }

    #[test]
    fn ignore_takes_precedence_in_classification() {
        let matcher = PathMatcher::new(&strings(&["src/**"]), &strings(&["docs/**"])).unwrap();

        assert_eq!(
            matcher.classify(&strings(&["docs/x.md"])),
            PathVerdict::Ignored
        );
        assert_eq!(
            matcher.classify(&strings(&["src/lib.rs"])),
            PathVerdict::Relevant
        );
        assert!(matcher.classify(&strings(&["docs/x.md"])).is_skippable());
    }

    #[test]
    fn commit_without_files_is_vacuously_skippable() {
        let matcher = PathMatcher::new(&strings(&["src/**"]), &strings(&["docs/**"])).unwrap();

        assert!(matcher.is_path_ignored(&[]));
        assert!(matcher.is_path_skipped(&[]));
    }

    #[test]
    fn invalid_and_blank_patterns_are_rejected() {
        let err = PathMatcher::new(&strings(&["src/[a"]), &[]).unwrap_err();
        assert!(matches!(err, PatternError::Invalid { ref input, .. } if input == "paths"));

        let err = PathMatcher::new(&[], &strings(&["  "])).unwrap_err();
        assert!(matches!(err, PatternError::Blank { ref input } if input == "paths_ignore"));
    }
}
