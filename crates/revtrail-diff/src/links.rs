//! Link-level diff between states.
//!
//! States may point at other states (for example, an outcome that sends the
//! reader to the next state). A [`LinkExtractor`] reads those pointers from
//! state content; [`diff_links`] maps them onto the identities of a
//! [`StateDiffTable`] so a rename does not register as a broken link.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use revtrail_types::EntitySnapshot;

use crate::identity::{StateDiffTable, StateId, StateStatus};

/// Reads outgoing links from a state's content.
pub trait LinkExtractor {
    /// Names of the states that `content` links to.
    fn links(&self, content: &Value) -> BTreeSet<String>;
}

/// Collects string values stored under any of a set of keys, at any depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationExtractor {
    keys: Vec<String>,
}

impl DestinationExtractor {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    fn collect(&self, value: &Value, out: &mut BTreeSet<String>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if let Value::String(target) = child {
                        if self.keys.iter().any(|k| k == key) {
                            out.insert(target.clone());
                        }
                    } else {
                        self.collect(child, out);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.collect(item, out);
                }
            }
            _ => {}
        }
    }
}

impl Default for DestinationExtractor {
    fn default() -> Self {
        Self::new(["dest"])
    }
}

impl LinkExtractor for DestinationExtractor {
    fn links(&self, content: &Value) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect(content, &mut out);
        out
    }
}

/// Whether a link exists at each end of the diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Added,
    Deleted,
    Unchanged,
}

/// A link between two state identities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDiff {
    pub source: StateId,
    pub target: StateId,
    pub status: LinkStatus,
}

/// Compare the links of the two snapshots a diff table was computed from.
///
/// Names at the earlier end resolve through `original_name`, names at the
/// later end through `newest_name`. An identity only resolves at an end
/// whose snapshot holds its name, so states that lived and died between the
/// two revisions never pick up links. Self-links and links to names with no
/// identity are skipped.
pub fn diff_links<E: LinkExtractor + ?Sized>(
    table: &StateDiffTable,
    v1_snapshot: &EntitySnapshot,
    v2_snapshot: &EntitySnapshot,
    extractor: &E,
) -> Vec<LinkDiff> {
    let mut before_ids: HashMap<&str, StateId> = HashMap::new();
    let mut after_ids: HashMap<&str, StateId> = HashMap::new();
    for (id, entry) in table.iter() {
        if entry.status != StateStatus::Added && v1_snapshot.contains(&entry.original_name) {
            before_ids.entry(entry.original_name.as_str()).or_insert(id);
        }
        if entry.status != StateStatus::Deleted && v2_snapshot.contains(&entry.newest_name) {
            after_ids.insert(entry.newest_name.as_str(), id);
        }
    }

    let before = resolve_links(v1_snapshot, &before_ids, extractor);
    let after = resolve_links(v2_snapshot, &after_ids, extractor);

    let mut statuses: BTreeMap<(StateId, StateId), LinkStatus> = BTreeMap::new();
    for link in &before {
        let status = if after.contains(link) {
            LinkStatus::Unchanged
        } else {
            LinkStatus::Deleted
        };
        statuses.insert(*link, status);
    }
    for link in after.difference(&before) {
        statuses.insert(*link, LinkStatus::Added);
    }

    statuses
        .into_iter()
        .map(|((source, target), status)| LinkDiff {
            source,
            target,
            status,
        })
        .collect()
}

fn resolve_links<E: LinkExtractor + ?Sized>(
    snapshot: &EntitySnapshot,
    ids: &HashMap<&str, StateId>,
    extractor: &E,
) -> BTreeSet<(StateId, StateId)> {
    let mut links = BTreeSet::new();
    for (name, content) in snapshot.iter() {
        let Some(&source) = ids.get(name) else {
            continue;
        };
        for dest in extractor.links(content) {
            if let Some(&target) = ids.get(dest.as_str()) {
                if target != source {
                    links.insert((source, target));
                }
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StateDiffEntry;
    use serde_json::json;

    fn state(dests: &[&str]) -> Value {
        json!({
            "interaction": {
                "answer_groups": dests.iter().map(|d| json!({"outcome": {"dest": d}})).collect::<Vec<_>>(),
                "default_outcome": null
            }
        })
    }

    #[test]
    fn extractor_walks_nested_content() {
        let content = json!({
            "interaction": {
                "answer_groups": [{"outcome": {"dest": "B"}}, {"outcome": {"dest": "C"}}],
                "default_outcome": {"dest": "A", "feedback": "dest"}
            }
        });
        let links = DestinationExtractor::default().links(&content);
        assert_eq!(
            links.into_iter().collect::<Vec<_>>(),
            vec!["A".to_string(), "B".into(), "C".into()]
        );
    }

    #[test]
    fn custom_keys() {
        let content = json!({"next": "X", "dest": "Y"});
        let links = DestinationExtractor::new(["next"]).links(&content);
        assert_eq!(links.len(), 1);
        assert!(links.contains("X"));
    }

    #[test]
    fn renamed_target_keeps_link_unchanged() {
        let mut table = StateDiffTable::new();
        table.insert(StateId(0), StateDiffEntry::unchanged("A"));
        let mut b = StateDiffEntry::unchanged("B");
        b.newest_name = "B2".into();
        table.insert(StateId(1), b);
        table.insert(StateId(2), StateDiffEntry::added("C"));

        let v1: EntitySnapshot = [("A", state(&["B", "A"])), ("B", state(&[]))]
            .into_iter()
            .collect();
        let v2: EntitySnapshot = [
            ("A", state(&["B2"])),
            ("B2", state(&["C"])),
            ("C", state(&["Nowhere"])),
        ]
        .into_iter()
        .collect();

        let links = diff_links(&table, &v1, &v2, &DestinationExtractor::default());
        assert_eq!(
            links,
            vec![
                LinkDiff {
                    source: StateId(0),
                    target: StateId(1),
                    status: LinkStatus::Unchanged
                },
                LinkDiff {
                    source: StateId(1),
                    target: StateId(2),
                    status: LinkStatus::Added
                },
            ]
        );
    }

    #[test]
    fn link_from_deleted_state_is_deleted() {
        let mut table = StateDiffTable::new();
        table.insert(StateId(0), StateDiffEntry::unchanged("A"));
        let mut gone = StateDiffEntry::unchanged("B");
        gone.status = StateStatus::Deleted;
        table.insert(StateId(1), gone);

        let v1: EntitySnapshot = [("A", state(&[])), ("B", state(&["A"]))]
            .into_iter()
            .collect();
        let v2: EntitySnapshot = [("A", state(&[]))].into_iter().collect();

        let links = diff_links(&table, &v1, &v2, &DestinationExtractor::default());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].status, LinkStatus::Deleted);
        assert_eq!((links[0].source, links[0].target), (StateId(1), StateId(0)));
    }

    #[test]
    fn identity_absent_from_both_ends_takes_no_links() {
        let mut table = StateDiffTable::new();
        table.insert(StateId(0), StateDiffEntry::unchanged("A"));
        // Added and deleted between the two revisions.
        let mut transient = StateDiffEntry::added("Ghost");
        transient.status = StateStatus::Changed;
        table.insert(StateId(1), transient);

        let v1: EntitySnapshot = [("A", state(&["Ghost"]))].into_iter().collect();
        let v2: EntitySnapshot = [("A", state(&["Ghost"]))].into_iter().collect();

        let links = diff_links(&table, &v1, &v2, &DestinationExtractor::default());
        assert!(links.is_empty());
    }
}
