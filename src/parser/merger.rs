use std::collections::HashMap;

use super::title_classifier::normalize_title;
use super::Entry;

/// 合并规范化标题相同的词条（跨页的栏头会把同一词条切成多段）
pub struct DuplicateMerger;

impl DuplicateMerger {
    pub fn new() -> Self {
        Self
    }

    /// 按首次出现的顺序输出，同名词条的正文按出现顺序以空格拼接
    pub fn merge(&self, entries: Vec<Entry>) -> Vec<Entry> {
        let mut merged: Vec<Entry> = Vec::with_capacity(entries.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let key = normalize_title(&entry.title);
            match index.get(&key) {
                Some(&pos) => {
                    let target = &mut merged[pos];
                    target.text.push(' ');
                    target.text.push_str(&entry.text);
                }
                None => {
                    index.insert(key.clone(), merged.len());
                    merged.push(Entry { title: key, ..entry });
                }
            }
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, text: &str) -> Entry {
        Entry::segmented(title, text)
    }

    #[test]
    fn merges_same_title_in_first_occurrence_position() {
        let merged = DuplicateMerger::new().merge(vec![
            entry("ALGEBRA", "ALGEBRA, first part."),
            entry("ANGLE", "ANGLE, the inclination of lines."),
            entry("ALGEBRA.", "second part."),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "ALGEBRA");
        assert_eq!(merged[0].text, "ALGEBRA, first part. second part.");
        assert_eq!(merged[1].title, "ANGLE");
        assert_eq!(merged[1].text, "ANGLE, the inclination of lines.");
    }

    #[test]
    fn distinct_titles_untouched() {
        let input = vec![entry("ABBOT", "x y z."), entry("ABBEY", "a b c.")];
        assert_eq!(DuplicateMerger::new().merge(input.clone()), input);
    }

    #[test]
    fn merge_is_idempotent() {
        let merger = DuplicateMerger::new();
        let once = merger.merge(vec![
            entry("ALGEBRA,", "one."),
            entry("ANGLE", "two."),
            entry("ALGEBRA", "three."),
            entry(" ANGLE. ", "four."),
            entry("ABACUS", "five."),
        ]);
        let twice = merger.merge(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
        assert_eq!(once[1].text, "two. four.");
    }

    #[test]
    fn empty_input() {
        assert!(DuplicateMerger::new().merge(Vec::new()).is_empty());
    }
}
