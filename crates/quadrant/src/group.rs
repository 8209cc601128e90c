//! Kind-tagged groups of items.
//!
//! Map markers are filtered by kind, one whole group at a time. A [`Group`]
//! carries its kind explicitly, so a kind filter never has to look at a
//! member to decide what the group is, and an empty group is still a
//! well-defined value.
//!
//! Empty groups follow the engine's policy for items without members: they
//! pass through when no filter is selected and never pass an active filter.
//!
//! # Example
//!
//! ```
//! use quadrant::group::{group_by_kind, kind_filter};
//! use quadrant::items::{MapMarker, MapMarkerType};
//! use std::sync::Arc;
//!
//! let markers = vec![
//!     Arc::new(MapMarker::new("Moffitt printer", MapMarkerType::Printer, 37.8726, -122.2607)),
//!     Arc::new(MapMarker::new("Sather fountain", MapMarkerType::Water, 37.8702, -122.2595)),
//!     Arc::new(MapMarker::new("Doe printer", MapMarkerType::Printer, 37.8722, -122.2594)),
//! ];
//!
//! let groups = group_by_kind(markers, |m: &MapMarker| m.marker_type());
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[0].len(), 2);
//!
//! let printers = kind_filter(MapMarkerType::Printer);
//! assert!(printers.matches(&groups[0]));
//! assert!(!printers.matches(&groups[1]));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::capability::Item;
use crate::table_function::Filter;

/// A kind tag for groups.
pub trait GroupKind: Copy + Eq + fmt::Display + Send + Sync + 'static {}

impl<K: Copy + Eq + fmt::Display + Send + Sync + 'static> GroupKind for K {}

/// An ordered group of same-kind items.
pub struct Group<K, T: ?Sized> {
    kind: K,
    name: String,
    items: Vec<Arc<T>>,
}

impl<K: GroupKind, T: ?Sized> Group<K, T> {
    /// Create a group of `kind`. The group is named after its kind.
    pub fn new(kind: K, items: Vec<Arc<T>>) -> Self {
        Self {
            kind,
            name: kind.to_string(),
            items,
        }
    }

    /// An empty group of `kind`.
    pub fn empty(kind: K) -> Self {
        Self::new(kind, Vec::new())
    }

    /// The group's kind tag.
    pub fn kind(&self) -> K {
        self.kind
    }

    /// The members, in order.
    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a member.
    pub fn push(&mut self, item: Arc<T>) {
        self.items.push(item);
    }
}

impl<K: GroupKind, T: Item + ?Sized> Item for Group<K, T> {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn has_members(&self) -> bool {
        !self.items.is_empty()
    }
}

impl<K: Clone, T: ?Sized> Clone for Group<K, T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            name: self.name.clone(),
            items: self.items.clone(),
        }
    }
}

impl<K: fmt::Debug, T: ?Sized> fmt::Debug for Group<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("kind", &self.kind)
            .field("len", &self.items.len())
            .finish()
    }
}

/// Split `items` into groups by kind.
///
/// Groups appear in the order their kind is first seen, and members keep
/// their relative order.
pub fn group_by_kind<K, T, I, F>(items: I, kind_of: F) -> Vec<Group<K, T>>
where
    K: GroupKind,
    T: ?Sized,
    I: IntoIterator<Item = Arc<T>>,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<Group<K, T>> = Vec::new();
    for item in items {
        let kind = kind_of(&*item);
        match groups.iter_mut().find(|group| group.kind == kind) {
            Some(group) => group.push(item),
            None => groups.push(Group::new(kind, vec![item])),
        }
    }
    groups
}

/// A filter that keeps groups of `kind`, labelled with the kind's name.
pub fn kind_filter<K: GroupKind, T: ?Sized + 'static>(kind: K) -> Filter<Group<K, T>> {
    Filter::new(kind.to_string(), move |group: &Group<K, T>| group.kind() == kind)
}

/// One kind filter per entry of `kinds`, in order.
pub fn kind_filters<K: GroupKind, T: ?Sized + 'static>(
    kinds: impl IntoIterator<Item = K>,
) -> Vec<Filter<Group<K, T>>> {
    kinds.into_iter().map(kind_filter::<K, T>).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate;
    use crate::selection::{FilterMode, TableSelection};
    use crate::table_function::TableFunction;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shape {
        Round,
        Square,
    }

    impl fmt::Display for Shape {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Shape::Round => f.write_str("Round"),
                Shape::Square => f.write_str("Square"),
            }
        }
    }

    struct Token(&'static str, Shape);

    impl Item for Token {
        fn display_name(&self) -> &str {
            self.0
        }
    }

    fn tokens() -> Vec<Arc<Token>> {
        vec![
            Arc::new(Token("a", Shape::Square)),
            Arc::new(Token("b", Shape::Round)),
            Arc::new(Token("c", Shape::Square)),
        ]
    }

    #[test]
    fn test_group_by_kind_keeps_order() {
        let groups = group_by_kind(tokens(), |t: &Token| t.1);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind(), Shape::Square);
        let names: Vec<_> = groups[0].items().iter().map(|t| t.0).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(groups[1].display_name(), "Round");
    }

    #[test]
    fn test_group_filter_is_all_or_nothing() {
        let groups: Vec<Arc<Group<Shape, Token>>> =
            group_by_kind(tokens(), |t: &Token| t.1).into_iter().map(Arc::new).collect();
        let functions: Vec<TableFunction<Group<Shape, Token>>> =
            kind_filters::<_, Token>([Shape::Round, Shape::Square]).into_iter().map(Into::into).collect();

        let mut selection = TableSelection::for_functions(&functions, FilterMode::Single);
        selection.toggle_filter(0).unwrap();
        let output = evaluate(&groups, &functions, &selection, None);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].kind(), Shape::Round);
        assert_eq!(output[0].len(), 1);
    }

    #[test]
    fn test_empty_group_policy() {
        let groups: Vec<Arc<Group<Shape, Token>>> = vec![
            Arc::new(Group::empty(Shape::Round)),
            Arc::new(Group::new(Shape::Square, vec![Arc::new(Token("a", Shape::Square))])),
        ];
        let functions: Vec<TableFunction<Group<Shape, Token>>> =
            kind_filters::<_, Token>([Shape::Round, Shape::Square]).into_iter().map(Into::into).collect();
        let mut selection = TableSelection::for_functions(&functions, FilterMode::Multiple);

        // No filter selected: empty groups pass through.
        assert_eq!(evaluate(&groups, &functions, &selection, None).len(), 2);

        // The kind filter matches, but an empty group never passes.
        selection.toggle_filter(0).unwrap();
        assert!(evaluate(&groups, &functions, &selection, None).is_empty());

        selection.toggle_filter(1).unwrap();
        let output = evaluate(&groups, &functions, &selection, None);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].kind(), Shape::Square);
    }
}
