//! Fixed-size pagination.

use serde::Serialize;

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: usize,
    pub size: usize,
}

/// Where a window sits within the full result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub index: usize,
    pub size: usize,
    pub count: usize,
}

impl PageInfo {
    /// Everything on one page.
    pub fn single(len: usize) -> Self {
        Self {
            index: 0,
            size: len,
            count: 1,
        }
    }
}

/// Number of pages for `len` rows. An empty result still has one page.
pub fn page_count(len: usize, size: usize) -> usize {
    let size = size.max(1);
    if len == 0 {
        1
    } else {
        len.div_ceil(size)
    }
}

/// Slices `rows` to `[index*size, (index+1)*size)`, clamping the index to the last page.
pub fn paginate<T>(rows: Vec<T>, request: PageRequest) -> (Vec<T>, PageInfo) {
    let size = request.size.max(1);
    let count = page_count(rows.len(), size);
    let index = request.index.min(count - 1);
    let start = index * size;

    let window = rows.into_iter().skip(start).take(size).collect();
    (window, PageInfo { index, size, count })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &[u32], index: usize, size: usize) -> (Vec<u32>, PageInfo) {
        paginate(rows.to_vec(), PageRequest { index, size })
    }

    #[test]
    fn slices_pages() {
        let rows: Vec<u32> = (1..=7).collect();
        assert_eq!(page(&rows, 0, 3).0, vec![1, 2, 3]);
        assert_eq!(page(&rows, 1, 3).0, vec![4, 5, 6]);
        assert_eq!(page(&rows, 2, 3).0, vec![7]);
        assert_eq!(page(&rows, 2, 3).1.count, 3);
    }

    #[test]
    fn out_of_range_clamps_to_last_page() {
        let rows: Vec<u32> = (1..=7).collect();
        let (window, info) = page(&rows, 42, 3);
        assert_eq!(window, vec![7]);
        assert_eq!(info.index, 2);
    }

    #[test]
    fn empty_input_has_one_empty_page() {
        let (window, info) = page(&[], 5, 10);
        assert!(window.is_empty());
        assert_eq!(info, PageInfo { index: 0, size: 10, count: 1 });
    }

    #[test]
    fn zero_size_is_treated_as_one() {
        let (window, info) = page(&[1, 2, 3], 1, 0);
        assert_eq!(window, vec![2]);
        assert_eq!(info.size, 1);
        assert_eq!(info.count, 3);
    }

    #[test]
    fn pages_reconstruct_the_input_exactly_once() {
        for len in 0..20u32 {
            let rows: Vec<u32> = (0..len).collect();
            for size in 1..6 {
                let count = page_count(rows.len(), size);
                let mut joined = Vec::new();
                for index in 0..count {
                    let (window, _) = page(&rows, index, size);
                    assert!(window.len() <= size);
                    joined.extend(window);
                }
                assert_eq!(joined, rows, "len={} size={}", len, size);
            }
        }
    }
}
