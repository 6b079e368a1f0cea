use std::str::FromStr;

use log::warn;

use crate::error::Error;

/// One `prefix:replacement` rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub prefix: String,
    pub replacement: String,
}

impl FromStr for RewriteRule {
    type Err = Error;

    /// Splits on the first `:`; the replacement may itself contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((prefix, replacement)) if !prefix.is_empty() => Ok(Self {
                prefix: prefix.to_string(),
                replacement: replacement.to_string(),
            }),
            _ => Err(Error::InvalidRewrite(s.to_string())),
        }
    }
}

/// Ordered prefix rewrites turning library paths into paths on this host.
///
/// A prefix given more than once keeps the position of its first occurrence
/// and takes the replacement of its last one.
#[derive(Debug, Clone, Default)]
pub struct PathRewrites {
    rules: Vec<RewriteRule>,
}

impl PathRewrites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: impl IntoIterator<Item = RewriteRule>) -> Self {
        let mut rewrites = Self::new();
        for rule in rules {
            rewrites.push(rule);
        }
        rewrites
    }

    pub fn push(&mut self, rule: RewriteRule) {
        match self.rules.iter_mut().find(|r| r.prefix == rule.prefix) {
            Some(existing) => {
                warn!(
                    "rewrite prefix '{}' given twice, using replacement '{}' instead of '{}'",
                    rule.prefix, rule.replacement, existing.replacement
                );
                existing.replacement = rule.replacement;
            }
            None => self.rules.push(rule),
        }
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Apply the first rule whose prefix starts `path`; unmatched paths pass through.
    pub fn apply(&self, path: &str) -> String {
        self.rules
            .iter()
            .find_map(|rule| {
                path.strip_prefix(rule.prefix.as_str())
                    .map(|rest| format!("{}{}", rule.replacement, rest))
            })
            .unwrap_or_else(|| path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(s: &str) -> RewriteRule {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!(
            rule("/media:/mnt/media"),
            RewriteRule {
                prefix: "/media".to_string(),
                replacement: "/mnt/media".to_string()
            }
        );
        assert_eq!(rule("/data:D:/data").replacement, "D:/data");
        assert_eq!(rule("/strip:").replacement, "");
        assert!(matches!("no-colon".parse::<RewriteRule>(), Err(Error::InvalidRewrite(_))));
        assert!(":/x".parse::<RewriteRule>().is_err());
    }

    #[test]
    fn test_single_rewrite() {
        let rewrites = PathRewrites::from_rules([rule("/media:/mnt/media")]);
        assert_eq!(rewrites.apply("/media/x.mkv"), "/mnt/media/x.mkv");
    }

    #[test]
    fn test_no_match_is_noop() {
        let rewrites = PathRewrites::from_rules([rule("/media:/mnt/media")]);
        assert_eq!(rewrites.apply("/tv/show/s01e01.mkv"), "/tv/show/s01e01.mkv");
        assert_eq!(PathRewrites::new().apply("/media/x.mkv"), "/media/x.mkv");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rewrites = PathRewrites::from_rules([rule("/media/movies:/fast/movies"), rule("/media:/slow")]);
        assert_eq!(rewrites.apply("/media/movies/a.mkv"), "/fast/movies/a.mkv");
        assert_eq!(rewrites.apply("/media/tv/b.mkv"), "/slow/tv/b.mkv");

        let reversed = PathRewrites::from_rules([rule("/media:/slow"), rule("/media/movies:/fast/movies")]);
        assert_eq!(reversed.apply("/media/movies/a.mkv"), "/slow/movies/a.mkv");
    }

    #[test]
    fn test_rewrite_applied_once() {
        let rewrites = PathRewrites::from_rules([rule("/a:/a/a"), rule("/a/a:/never")]);
        assert_eq!(rewrites.apply("/a/x"), "/a/a/x");
    }

    #[test]
    fn test_duplicate_prefix_keeps_position_takes_last_replacement() {
        let rewrites = PathRewrites::from_rules([
            rule("/media:/first"),
            rule("/media/tv:/tv"),
            rule("/media:/last"),
        ]);
        assert_eq!(rewrites.rules().len(), 2);
        assert_eq!(rewrites.rules()[0].replacement, "/last");
        assert_eq!(rewrites.apply("/media/tv/x.mkv"), "/last/tv/x.mkv");
    }
}
