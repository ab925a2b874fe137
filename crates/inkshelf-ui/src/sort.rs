//! Natural ordering for directory listings.
//!
//! Directories (entries with a trailing `/`) sort before files. Within
//! each group names compare case-insensitively, except that runs of
//! ASCII digits compare as unsigned integers, so `item2` sorts before
//! `item10`.

use alloc::string::String;
use core::cmp::Ordering;

/// Sort a directory listing in place: directories first, then natural
/// case-insensitive order.
pub fn sort_file_list(files: &mut [String]) {
    files.sort_by(|a, b| compare_entries(a, b));
}

/// Comparator behind [`sort_file_list`], exposed for property tests.
pub fn compare_entries(a: &str, b: &str) -> Ordering {
    let a_dir = a.ends_with('/');
    let b_dir = b.ends_with('/');
    if a_dir != b_dir {
        return if a_dir { Ordering::Less } else { Ordering::Greater };
    }
    natural_compare(a.as_bytes(), b.as_bytes())
}

fn digit_run_len(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn natural_compare(mut s1: &[u8], mut s2: &[u8]) -> Ordering {
    loop {
        match (s1.first(), s2.first()) {
            (Some(&c1), Some(&c2)) if c1.is_ascii_digit() && c2.is_ascii_digit() => {
                // Skip leading zeros, then compare run length before
                // digits: fewer digits means a smaller number.
                while s1.first() == Some(&b'0') {
                    s1 = &s1[1..];
                }
                while s2.first() == Some(&b'0') {
                    s2 = &s2[1..];
                }

                let len1 = digit_run_len(s1);
                let len2 = digit_run_len(s2);
                if len1 != len2 {
                    return len1.cmp(&len2);
                }
                for i in 0..len1 {
                    if s1[i] != s2[i] {
                        return s1[i].cmp(&s2[i]);
                    }
                }

                // Numbers equal, keep going after the run.
                s1 = &s1[len1..];
                s2 = &s2[len2..];
            }
            (Some(&c1), Some(&c2)) => {
                let l1 = c1.to_ascii_lowercase();
                let l2 = c2.to_ascii_lowercase();
                if l1 != l2 {
                    return l1.cmp(&l2);
                }
                s1 = &s1[1..];
                s2 = &s2[1..];
            }
            (None, None) => return Ordering::Equal,
            // One string is a prefix of the other: the prefix sorts first.
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn sorted(names: &[&str]) -> vec::Vec<String> {
        let mut list: vec::Vec<String> = names.iter().map(|s| s.to_string()).collect();
        sort_file_list(&mut list);
        list
    }

    #[test]
    fn numeric_runs_compare_by_magnitude() {
        assert_eq!(
            sorted(&["item2", "item10", "item1"]),
            vec!["item1", "item2", "item10"]
        );
    }

    #[test]
    fn comparison_is_case_insensitive() {
        assert_eq!(sorted(&["b.txt", "A.txt"]), vec!["A.txt", "b.txt"]);
    }

    #[test]
    fn directories_sort_before_files() {
        assert_eq!(
            sorted(&["zebra.epub", "albums/", "notes.txt", "books/"]),
            vec!["albums/", "books/", "notes.txt", "zebra.epub"]
        );
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(sorted(&["chapter12", "chapter1"]), vec!["chapter1", "chapter12"]);
        assert_eq!(sorted(&["read.me", "read"]), vec!["read", "read.me"]);
    }

    #[test]
    fn leading_zeros_do_not_change_magnitude() {
        assert_eq!(
            sorted(&["book010", "book9", "book0002"]),
            vec!["book0002", "book9", "book010"]
        );
    }

    #[test]
    fn order_is_strict_over_distinct_names() {
        let names = [
            "a/", "b10/", "b2/", "cover.epub", "Cover2.txt", "cover10.md", "z",
        ];
        for x in &names {
            for y in &names {
                if x == y {
                    continue;
                }
                let fwd = compare_entries(x, y);
                let rev = compare_entries(y, x);
                assert_eq!(fwd, rev.reverse(), "{} vs {}", x, y);
            }
        }
    }
}
