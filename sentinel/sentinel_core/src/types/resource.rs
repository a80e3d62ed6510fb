//! Hierarchical resource identifiers.
//!
//! A resource identifier such as `Sales.Invoice.Read` is split on a literal
//! separator character into segments. Every leading run of segments names an
//! enclosing namespace, so a rule on `Sales` covers `Sales.Invoice.Read`
//! unless something more specific exists.

/// The separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = '.';

/// A resource identifier split into its namespace segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath<'a> {
    segments: Vec<&'a str>,
    separator: char,
}

impl<'a> ResourcePath<'a> {
    /// Split `identifier` on `separator`.
    ///
    /// # Arguments
    ///
    /// * `identifier` - The resource identifier, e.g. `Sales.Invoice.Read`.
    /// * `separator` - The literal character between segments.
    ///
    /// # Returns
    ///
    /// The parsed path. The empty identifier has no segments at all, so only
    /// the configured default can answer for it.
    pub fn parse(identifier: &'a str, separator: char) -> Self {
        let segments = if identifier.is_empty() {
            Vec::new()
        } else {
            identifier.split(separator).collect()
        };

        Self {
            segments,
            separator,
        }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments in order.
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// Join the first `depth` segments back into a namespace name.
    ///
    /// # Arguments
    ///
    /// * `depth` - How many leading segments to keep. Clamped to the number
    ///   of segments.
    ///
    /// # Returns
    ///
    /// The segments joined with the path's separator.
    pub fn prefix(&self, depth: usize) -> String {
        let depth = depth.min(self.segments.len());
        let mut name = String::new();
        for (i, segment) in self.segments[..depth].iter().enumerate() {
            if i > 0 {
                name.push(self.separator);
            }
            name.push_str(segment);
        }
        name
    }

    /// Namespace names from the full path down to the first segment.
    pub fn ancestors(&self) -> impl Iterator<Item = (usize, String)> + '_ {
        (1..=self.segments.len())
            .rev()
            .map(move |depth| (depth, self.prefix(depth)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let path = ResourcePath::parse("Sales.Invoice.Read", DEFAULT_SEPARATOR);
        assert_eq!(path.len(), 3);
        assert_eq!(path.segments(), &["Sales", "Invoice", "Read"]);
    }

    #[test]
    fn test_empty_identifier_has_no_segments() {
        let path = ResourcePath::parse("", DEFAULT_SEPARATOR);
        assert!(path.is_empty());
        assert_eq!(path.prefix(3), "");
        assert_eq!(path.ancestors().count(), 0);
    }

    #[test]
    fn test_prefix() {
        let path = ResourcePath::parse("A.B.C", DEFAULT_SEPARATOR);
        assert_eq!(path.prefix(0), "");
        assert_eq!(path.prefix(1), "A");
        assert_eq!(path.prefix(2), "A.B");
        assert_eq!(path.prefix(3), "A.B.C");
        assert_eq!(path.prefix(10), "A.B.C");
    }

    #[test]
    fn test_ancestors_most_specific_first() {
        let path = ResourcePath::parse("A.B.C", DEFAULT_SEPARATOR);
        let names: Vec<String> = path.ancestors().map(|(_, name)| name).collect();
        assert_eq!(names, vec!["A.B.C", "A.B", "A"]);
    }

    #[test]
    fn test_literal_separator() {
        // A regex-special character is still split literally.
        let path = ResourcePath::parse("a|b|c", '|');
        assert_eq!(path.segments(), &["a", "b", "c"]);
        assert_eq!(path.prefix(2), "a|b");

        // A different separator leaves dots inside segments untouched.
        let path = ResourcePath::parse("a.b/c", '/');
        assert_eq!(path.segments(), &["a.b", "c"]);
    }
}
