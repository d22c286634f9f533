//! Point listing grouped by shop name.

use std::collections::HashMap;

use serde::Serialize;

use crate::records::ShopRecord;

/// Section title for records without a name.
pub const UNNAMED_GROUP: &str = "Laundry Lainnya";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordGroup {
    pub title: String,
    /// Never empty; sorted by id, newest first.
    pub records: Vec<ShopRecord>,
}

impl RecordGroup {
    fn newest_id(&self) -> &str {
        self.records.first().map_or("", |r| r.id.as_str())
    }
}

/// Group records by name, newest first.
///
/// Feed keys are push ids that sort chronologically, so ordering by id
/// descending lists the most recent entries first. Groups are ordered by
/// their newest member; ties keep first-seen order.
#[must_use]
pub fn group_by_name(records: &[ShopRecord]) -> Vec<RecordGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<RecordGroup> = Vec::new();

    for record in records {
        let title = if record.name.is_empty() {
            UNNAMED_GROUP
        } else {
            record.name.as_str()
        };
        let slot = *index.entry(title).or_insert_with(|| {
            groups.push(RecordGroup {
                title: title.to_string(),
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record.clone());
    }

    for group in &mut groups {
        group.records.sort_by(|a, b| b.id.cmp(&a.id));
    }
    groups.sort_by(|a, b| b.newest_id().cmp(a.newest_id()));
    groups
}
