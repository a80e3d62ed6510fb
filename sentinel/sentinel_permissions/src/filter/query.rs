//! Query pipelines.

use std::fmt;

use super::SpecificationRef;

/// A lazily evaluated query that filters can be appended to.
pub trait Query<T>: Sized {
    /// Append `specification`; the query then only yields items satisfying it
    /// as well as every filter added before.
    fn filter(self, specification: SpecificationRef<T>) -> Self;
}

/// A query over an in-memory collection.
///
/// Filters are recorded and only evaluated when the query is executed.
pub struct InMemoryQuery<T> {
    /// The source items.
    items: Vec<T>,

    /// The filters, in the order they were added.
    filters: Vec<SpecificationRef<T>>,
}

impl<T> InMemoryQuery<T> {
    /// Create a query over `items` with no filters.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            filters: Vec::new(),
        }
    }

    /// Number of filters in the pipeline.
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Number of items the query would yield.
    pub fn count(&self) -> usize {
        self.items.iter().filter(|item| self.matches(item)).count()
    }

    /// Run the query.
    pub fn execute(self) -> Vec<T> {
        let Self { items, filters } = self;
        items
            .into_iter()
            .filter(|item| filters.iter().all(|f| f.is_satisfied_by(item)))
            .collect()
    }

    fn matches(&self, item: &T) -> bool {
        self.filters.iter().all(|f| f.is_satisfied_by(item))
    }
}

impl<T> Query<T> for InMemoryQuery<T> {
    fn filter(mut self, specification: SpecificationRef<T>) -> Self {
        self.filters.push(specification);
        self
    }
}

impl<T> From<Vec<T>> for InMemoryQuery<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: fmt::Debug> fmt::Debug for InMemoryQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryQuery")
            .field("items", &self.items)
            .field("filters", &self.filters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_filters_are_combined() {
        let query = InMemoryQuery::new((1..=20).collect::<Vec<i32>>())
            .filter(Arc::new(|n: &i32| n % 2 == 0))
            .filter(Arc::new(|n: &i32| *n > 10));

        assert_eq!(query.filter_count(), 2);
        assert_eq!(query.count(), 5);
        assert_eq!(query.execute(), vec![12, 14, 16, 18, 20]);
    }

    #[test]
    fn test_unfiltered_query_yields_everything() {
        let query: InMemoryQuery<&str> = vec!["a", "b"].into();
        assert_eq!(query.execute(), vec!["a", "b"]);
    }
}
