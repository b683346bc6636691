//! Class hierarchy: super/sub-class closures over `rdfs:subClassOf`, and the
//! class-centric queries built on them.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;

use super::memo::SubClassIndex;
use super::VocabStore;
use crate::model::ontology::{schema, standard};
use crate::model::Node;

/// Breadth-first closure from `start` over `edges`. The visited set makes
/// termination independent of cycles in the input; `start` comes first and
/// every id appears once.
fn closure(start: &str, mut edges: impl FnMut(&str) -> Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::from([start.to_string()]);
    let mut ordered = vec![start.to_string()];
    let mut queue = VecDeque::from([start.to_string()]);
    while let Some(current) = queue.pop_front() {
        for next in edges(&current) {
            if seen.insert(next.clone()) {
                ordered.push(next.clone());
                queue.push_back(next);
            }
        }
    }
    ordered
}

impl VocabStore {
    /// `id` followed by every class it transitively derives from.
    ///
    /// Superclass ids are included even when the superclass node itself is
    /// not loaded.
    pub fn super_classes(&self, id: &str) -> Vec<String> {
        self.super_classes_shared(id).to_vec()
    }

    pub(crate) fn super_classes_shared(&self, id: &str) -> Arc<[String]> {
        self.memo
            .super_classes
            .get_or_compute(self.generation, id.to_string(), || {
                closure(id, |current| {
                    self.get_node(current)
                        .map(|n| {
                            n.reference_ids(standard::RDFS_SUBCLASS_OF)
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .into()
            })
    }

    /// `id` followed by every class that transitively derives from it.
    pub fn sub_classes(&self, id: &str) -> Vec<String> {
        self.memo
            .sub_classes
            .get_or_compute(self.generation, id.to_string(), || {
                let index = self.sub_class_index();
                closure(id, |current| index.get(current).cloned().unwrap_or_default()).into()
            })
            .to_vec()
    }

    fn sub_class_index(&self) -> Arc<SubClassIndex> {
        self.memo
            .sub_class_index
            .get_or_compute(self.generation, (), || {
                let mut index = SubClassIndex::new();
                for node in self.all_nodes().iter() {
                    for parent in node.reference_ids(standard::RDFS_SUBCLASS_OF) {
                        let children = index.entry(parent.to_string()).or_default();
                        if !children.contains(&node.id) {
                            children.push(node.id.clone());
                        }
                    }
                }
                Arc::new(index)
            })
    }

    /// Union of the super-class closures of `ids`, in order.
    pub fn super_classes_for_types<S: AsRef<str>>(&self, ids: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        ids.iter()
            .flat_map(|id| self.super_classes_shared(id.as_ref()).to_vec())
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }

    fn derives_from(&self, id: &str, ancestor: &str) -> bool {
        self.super_classes_shared(id).iter().any(|c| c == ancestor)
    }

    /// Whether a node is an enumeration (derives from `schema:Enumeration`).
    pub fn is_enum(&self, node: &Node) -> bool {
        self.derives_from(&node.id, schema::ENUMERATION)
    }

    /// Whether a node derives from one of the schema.org data types.
    pub fn is_special_terminal(&self, node: &Node) -> bool {
        self.super_classes_shared(&node.id)
            .iter()
            .any(|c| schema::SPECIAL_TERMINALS.contains(&c.as_str()))
    }

    /// Whether instances of a type may use `-input` / `-output` properties.
    pub fn type_can_use_io_props(&self, id: &str) -> bool {
        self.derives_from(id, schema::ACTION)
    }

    pub fn nodes_can_use_io_props(&self, nodes: &[Node]) -> bool {
        nodes.iter().any(|n| self.type_can_use_io_props(&n.id))
    }

    /// Members of an enumeration: nodes typed with `id`.
    pub fn enum_values(&self, id: &str) -> Vec<Node> {
        self.members_of_types(&[id])
    }

    /// Nodes typed with any of `ids`.
    pub fn members_of_types<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Node> {
        let ids: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
        self.all_nodes()
            .iter()
            .filter(|n| n.has_any_type(&ids))
            .cloned()
            .collect()
    }

    /// Property nodes whose declared domain contains `id`, sorted by label.
    pub fn property_nodes_for_class(&self, id: &str) -> Vec<Node> {
        let mut properties: Vec<Node> = self
            .all_nodes()
            .iter()
            .filter(|n| n.has_any_type(&standard::PROPERTY_TYPES) && n.domains().any(|d| d == id))
            .cloned()
            .collect();
        properties.sort_by(|a, b| a.label().cmp(b.label()));
        properties
    }

    /// Property nodes available on a type, grouped by the class declaring them.
    pub fn property_nodes_for_type(&self, id: &str) -> IndexMap<String, Vec<Node>> {
        self.super_classes_shared(id)
            .iter()
            .map(|class| (class.clone(), self.property_nodes_for_class(class)))
            .collect()
    }

    pub fn property_nodes_for_types<S: AsRef<str>>(&self, ids: &[S]) -> IndexMap<String, Vec<Node>> {
        let mut grouped = IndexMap::new();
        for id in ids {
            grouped.extend(self.property_nodes_for_type(id.as_ref()));
        }
        grouped
    }
}
