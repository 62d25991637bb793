//! Package prefix filtering of call targets.

/// Separator of the command-line package list.
pub const LIST_SEPARATOR: char = ',';

/// An ordered set of package prefixes that call targets must start with.
///
/// An empty filter excludes nothing. Otherwise a type is included if its binary name starts with
/// at least one prefix. Matching is a literal string prefix test without any package boundary
/// check, so `com.acme` also includes `com.acmecorp.Foo`, and an empty prefix includes every
/// type.
///
/// # Examples
///
/// ```rust
/// use javacg::analysis::PackageFilter;
///
/// let filter = PackageFilter::from_list("com.acme,org.example");
/// assert!(filter.includes("com.acme.Foo"));
/// assert!(filter.is_excluded("java.lang.Math"));
///
/// assert!(!PackageFilter::default().is_excluded("java.lang.Math"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilter {
    prefixes: Vec<String>,
}

impl PackageFilter {
    /// Creates a filter from the given prefixes, in order.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PackageFilter {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a comma-separated prefix list.
    ///
    /// Segments are taken literally, without trimming. Trailing empty segments are dropped,
    /// while a list without any separator is always a single prefix, so `""` yields one empty
    /// prefix that includes every type.
    ///
    /// ```rust
    /// use javacg::analysis::PackageFilter;
    ///
    /// assert_eq!(PackageFilter::from_list("a,b,,").prefixes(), ["a", "b"]);
    /// assert_eq!(PackageFilter::from_list("a,,b").prefixes(), ["a", "", "b"]);
    /// assert_eq!(PackageFilter::from_list("").prefixes(), [""]);
    /// ```
    #[must_use]
    pub fn from_list(list: &str) -> Self {
        let mut filter = PackageFilter::default();
        filter.extend_from_list(list);
        filter
    }

    /// Appends the prefixes of a comma-separated list, see [`PackageFilter::from_list`].
    pub fn extend_from_list(&mut self, list: &str) {
        if !list.contains(LIST_SEPARATOR) {
            self.prefixes.push(list.to_string());
            return;
        }

        let mut segments: Vec<&str> = list.split(LIST_SEPARATOR).collect();
        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }

        self.prefixes
            .extend(segments.into_iter().map(str::to_string));
    }

    /// The configured prefixes in order.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Returns `true` if no prefixes are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Returns `true` if edges to `type_name` must be dropped.
    ///
    /// `type_name` is the dotted binary name of the call target's owning type.
    #[must_use]
    pub fn is_excluded(&self, type_name: &str) -> bool {
        if self.prefixes.is_empty() {
            return false;
        }

        !self
            .prefixes
            .iter()
            .any(|prefix| type_name.starts_with(prefix.as_str()))
    }

    /// Returns `true` if edges to `type_name` are kept.
    #[must_use]
    pub fn includes(&self, type_name: &str) -> bool {
        !self.is_excluded(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_excludes_nothing() {
        let filter = PackageFilter::default();
        assert!(filter.is_empty());
        assert!(!filter.is_excluded("java.lang.Math"));
        assert!(!filter.is_excluded(""));
    }

    #[test]
    fn prefix_matching() {
        let filter = PackageFilter::new(["com.acme", "org.example."]);

        assert!(filter.includes("com.acme.Foo"));
        assert!(filter.includes("com.acmecorp.Foo"));
        assert!(filter.includes("org.example.Bar"));
        assert!(filter.is_excluded("org.examples.Bar"));
        assert!(filter.is_excluded("java.lang.Math"));
        assert!(filter.is_excluded("com"));
    }

    #[test]
    fn empty_prefix_includes_everything() {
        let filter = PackageFilter::from_list("");
        assert!(!filter.is_empty());
        assert!(filter.includes("java.lang.Math"));

        let filter = PackageFilter::from_list("com.acme,,org");
        assert!(filter.includes("java.lang.Math"));
    }

    #[test]
    fn list_parsing() {
        assert_eq!(PackageFilter::from_list("com.acme").prefixes(), ["com.acme"]);
        assert_eq!(
            PackageFilter::from_list("com.acme, org").prefixes(),
            ["com.acme", " org"]
        );
        assert_eq!(PackageFilter::from_list("a,b,").prefixes(), ["a", "b"]);
        assert!(PackageFilter::from_list(",,").is_empty());
        assert_eq!(PackageFilter::from_list(",a").prefixes(), ["", "a"]);
    }

    #[test]
    fn lists_accumulate() {
        let mut filter = PackageFilter::from_list("com.acme");
        filter.extend_from_list("org.example,net");

        assert_eq!(filter.prefixes(), ["com.acme", "org.example", "net"]);
    }
}
