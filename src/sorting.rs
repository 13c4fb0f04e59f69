//! Sorting algorithms as interchangeable strategies.
//!
//! Every strategy sorts ascending; they differ only in how they get there, so
//! a [`SortedList`] produces the same order whichever one it holds.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::operation::{Operation, SharedOperation};
use crate::registry::StrategyRegistry;
use crate::strategy::StrategySlot;

// ============================================================================
// Strategies
// ============================================================================

/// In-place quicksort.
///
/// The pivot is the median of the first, middle and last elements, and a
/// three-way partition groups everything equal to it, so presorted and
/// all-equal input both split evenly. Only the smaller side is recursed into;
/// the larger one is handled by the loop, which bounds stack depth by
/// `log2(n)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickSort;

impl QuickSort {
    fn sort<T: Ord>(mut items: &mut [T]) {
        while items.len() > 1 {
            let (lt, gt) = Self::partition(items);
            let (left, rest) = std::mem::take(&mut items).split_at_mut(lt);
            let right = &mut rest[gt - lt..];
            if left.len() < right.len() {
                Self::sort(left);
                items = right;
            } else {
                Self::sort(right);
                items = left;
            }
        }
    }

    /// Returns `(lt, gt)` such that `items[..lt]` is below the pivot,
    /// `items[lt..gt]` equals it and `items[gt..]` is above it.
    fn partition<T: Ord>(items: &mut [T]) -> (usize, usize) {
        let mid = items.len() / 2;
        let last = items.len() - 1;
        if items[mid] < items[0] {
            items.swap(mid, 0);
        }
        if items[last] < items[0] {
            items.swap(last, 0);
        }
        if items[last] < items[mid] {
            items.swap(last, mid);
        }
        items.swap(0, mid);

        // items[lt] is always a copy of the pivot
        let (mut lt, mut i, mut gt) = (0, 1, items.len());
        while i < gt {
            match items[i].cmp(&items[lt]) {
                Ordering::Less => {
                    items.swap(lt, i);
                    lt += 1;
                    i += 1;
                }
                Ordering::Greater => {
                    gt -= 1;
                    items.swap(i, gt);
                }
                Ordering::Equal => i += 1,
            }
        }
        (lt, gt)
    }
}

impl<T: Ord> Operation<Vec<T>, Vec<T>> for QuickSort {
    fn name(&self) -> &str {
        "quick"
    }

    fn execute(&self, mut input: Vec<T>) -> Result<Vec<T>> {
        Self::sort(&mut input);
        Ok(input)
    }
}

/// Shell sort with the halving gap sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellSort;

impl<T: Ord> Operation<Vec<T>, Vec<T>> for ShellSort {
    fn name(&self) -> &str {
        "shell"
    }

    fn execute(&self, mut input: Vec<T>) -> Result<Vec<T>> {
        let mut gap = input.len() / 2;
        while gap > 0 {
            for i in gap..input.len() {
                let mut j = i;
                while j >= gap && input[j - gap] > input[j] {
                    input.swap(j - gap, j);
                    j -= gap;
                }
            }
            gap /= 2;
        }
        Ok(input)
    }
}

/// Top-down merge sort. Stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeSort;

impl MergeSort {
    fn sort<T: Ord>(mut items: Vec<T>) -> Vec<T> {
        if items.len() <= 1 {
            return items;
        }
        let right = items.split_off(items.len() / 2);
        let left = Self::sort(items);
        let right = Self::sort(right);

        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();
        loop {
            let take_left = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => l.cmp(r) != Ordering::Greater,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_left { left.next() } else { right.next() };
            merged.extend(next);
        }
        merged
    }
}

impl<T: Ord> Operation<Vec<T>, Vec<T>> for MergeSort {
    fn name(&self) -> &str {
        "merge"
    }

    fn execute(&self, input: Vec<T>) -> Result<Vec<T>> {
        Ok(Self::sort(input))
    }
}

pub type SortOperation = SharedOperation<Vec<String>, Vec<String>>;

/// Registry holding `quick`, `shell` and `merge`.
pub fn default_sort_registry() -> Result<StrategyRegistry<Vec<String>, Vec<String>>> {
    StrategyRegistry::<Vec<String>, Vec<String>>::new()
        .with(Arc::new(QuickSort))?
        .with(Arc::new(ShellSort))?
        .with(Arc::new(MergeSort))
}

// ============================================================================
// SortedList
// ============================================================================

/// A list of names sorted by whichever strategy is currently installed.
#[derive(Debug)]
pub struct SortedList {
    items: Vec<String>,
    strategy: StrategySlot<Vec<String>, Vec<String>>,
}

impl SortedList {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            strategy: StrategySlot::new("sorted_list"),
        }
    }

    /// Use an existing slot, e.g. one built from configuration.
    pub fn with_slot(strategy: StrategySlot<Vec<String>, Vec<String>>) -> Self {
        Self {
            items: Vec::new(),
            strategy,
        }
    }

    pub fn add(&mut self, name: impl Into<String>) {
        self.items.push(name.into());
    }

    pub fn set_sort_strategy(&self, strategy: SortOperation) {
        self.strategy.set_strategy(strategy);
    }

    pub fn strategy(&self) -> &StrategySlot<Vec<String>, Vec<String>> {
        &self.strategy
    }

    /// Sort in place. The list is unchanged if the strategy fails.
    pub fn sort(&mut self) -> Result<&[String]> {
        let sorted = self.strategy.execute(self.items.clone())?;
        debug!(
            strategy = self.strategy.current_name().as_deref().unwrap_or("<none>"),
            len = sorted.len(),
            "sorted list"
        );
        self.items = sorted;
        Ok(&self.items)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for SortedList {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Into<String>> FromIterator<S> for SortedList {
    fn from_iter<It: IntoIterator<Item = S>>(iter: It) -> Self {
        let mut list = Self::new();
        for name in iter {
            list.add(name);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn students() -> SortedList {
        ["Samual", "Jimmy", "Sandra", "Vivek", "Anna"]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_unsorted_list_without_strategy_fails() {
        let mut list = students();
        assert!(matches!(
            list.sort(),
            Err(PatternError::NoStrategySelected { .. })
        ));
        assert_eq!(list.items()[0], "Samual");
    }

    #[test]
    fn test_each_strategy_sorts_students() {
        let expected = vec!["Anna", "Jimmy", "Samual", "Sandra", "Vivek"];
        let strategies: Vec<SortOperation> =
            vec![Arc::new(QuickSort), Arc::new(ShellSort), Arc::new(MergeSort)];

        for strategy in strategies {
            let mut list = students();
            let name = strategy.name().to_string();
            list.set_sort_strategy(strategy);
            assert_eq!(list.sort().unwrap(), expected.as_slice(), "{}", name);
        }
    }

    #[test]
    fn test_default_registry_names() {
        let registry = default_sort_registry().unwrap();
        assert_eq!(registry.names(), vec!["merge", "quick", "shell"]);
    }

    #[test]
    fn test_edge_inputs() {
        for input in [vec![], vec![1], vec![2, 1], vec![3, 3, 3], vec![5, 4, 3, 2, 1]] {
            let mut expected = input.clone();
            expected.sort();
            assert_eq!(QuickSort.execute(input.clone()), Ok(expected.clone()));
            assert_eq!(ShellSort.execute(input.clone()), Ok(expected.clone()));
            assert_eq!(MergeSort.execute(input), Ok(expected));
        }
    }

    // Runs on a small stack: a quicksort that degrades to linear recursion on
    // these inputs overflows it long before finishing.
    fn quick_sort_on_small_stack<T: Ord + Send + 'static>(input: Vec<T>) -> Vec<T> {
        std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || QuickSort.execute(input).unwrap())
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_quick_sort_handles_presorted_input() {
        let ascending: Vec<u32> = (0..200_000).collect();
        assert_eq!(quick_sort_on_small_stack(ascending.clone()), ascending);

        let descending: Vec<u32> = (0..200_000).rev().collect();
        assert_eq!(quick_sort_on_small_stack(descending), ascending);
    }

    #[test]
    fn test_quick_sort_handles_all_equal_input() {
        let same = vec!["same".to_string(); 20_000];
        assert_eq!(quick_sort_on_small_stack(same.clone()), same);
    }

    #[test]
    fn test_merge_sort_is_stable() {
        #[derive(Debug, Clone, PartialEq, Eq)]
        struct Keyed(u8, &'static str);
        impl PartialOrd for Keyed {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for Keyed {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.cmp(&other.0)
            }
        }

        let input = vec![Keyed(2, "a"), Keyed(1, "b"), Keyed(2, "c"), Keyed(1, "d")];
        let sorted = MergeSort.execute(input).unwrap();
        assert_eq!(
            sorted,
            vec![Keyed(1, "b"), Keyed(1, "d"), Keyed(2, "a"), Keyed(2, "c")]
        );
    }

    proptest! {
        #[test]
        fn test_strategies_agree_with_std(vec in prop::collection::vec(any::<i32>(), 0..200)) {
            let mut expected = vec.clone();
            expected.sort();

            prop_assert_eq!(QuickSort.execute(vec.clone()).unwrap(), expected.clone());
            prop_assert_eq!(ShellSort.execute(vec.clone()).unwrap(), expected.clone());
            prop_assert_eq!(MergeSort.execute(vec).unwrap(), expected);
        }
    }
}
