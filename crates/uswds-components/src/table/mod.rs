//! Sortable table component
//!
//! Clicking a sortable column header reorders the rows of the table's
//! first `tbody` by that column. `aria-sort` on the header records the
//! last applied direction; at most one header per table carries it.

mod compare;

pub use compare::{Collator, compare_values, parse_number};

use crate::{Behavior, BehaviorError, Config, TableError};
use std::rc::Rc;
use uswds_css::{ElementQuery, SelectorList};
use uswds_dom::{Document, DomTree, EventType, NodeId};

const SORTABLE: &str = "data-sortable";
const SORTED: &str = "aria-sort";
const ASCENDING: &str = "ascending";
const DESCENDING: &str = "descending";
const SORT_OVERRIDE: &str = "data-sort-value";

struct Shared {
    table: SelectorList,
    header: SelectorList,
    button: SelectorList,
}

/// Sortable table behavior
#[derive(Clone)]
pub struct SortableTable {
    behavior: Behavior,
    shared: Rc<Shared>,
}

impl SortableTable {
    pub fn new(config: &Config) -> Result<Self, BehaviorError> {
        let table = format!(".{}", config.class("table--sortable"));
        let header = format!(".{}[{SORTABLE}]", config.class("table__header--sortable"));
        let button = format!("{header} > button");

        let compile = |selector: &str| {
            SelectorList::parse(selector).map_err(|source| BehaviorError::InvalidSelector {
                behavior: "table".to_string(),
                selector: selector.to_string(),
                source,
            })
        };
        let shared = Rc::new(Shared {
            table: compile(&table)?,
            header: compile(&header)?,
            button: compile(&button)?,
        });

        let behavior = Behavior::builder("table")
            .on(EventType::Click, &header, {
                let shared = Rc::clone(&shared);
                move |doc, event| {
                    event.prevent_default();
                    shared.toggle_sort(doc, event.target, None)?;
                    Ok(())
                }
            })
            .init({
                let shared = Rc::clone(&shared);
                move |doc, root| Ok(shared.init(doc, root)?)
            })
            .build()?;

        Ok(Self { behavior, shared })
    }

    /// Underlying delegated behavior
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Attach to `root`, label its headers and apply any pre-set sort
    pub fn on(&self, doc: &mut Document, root: NodeId) -> Result<(), BehaviorError> {
        self.behavior.on(doc, root)
    }

    pub fn off(&self, doc: &mut Document, root: NodeId) -> Result<(), BehaviorError> {
        self.behavior.off(doc, root)
    }

    /// Sort the header's table by its column.
    ///
    /// `ascending` of `None` flips the header's last applied direction, or
    /// uses its `data-sortable` default when it is unsorted. Returns the
    /// applied direction. A header inside the document but outside any
    /// sortable table is an error; a detached header is left alone.
    pub fn toggle_sort(
        &self,
        doc: &mut Document,
        header: NodeId,
        ascending: Option<bool>,
    ) -> Result<bool, TableError> {
        self.shared.toggle_sort(doc, header, ascending)
    }

    /// `aria-label` text for `header` in its current state
    pub fn sort_label(&self, doc: &Document, header: NodeId) -> String {
        self.shared.label_text(&doc.tree, header)
    }
}

impl Shared {
    fn toggle_sort(
        &self,
        doc: &mut Document,
        header: NodeId,
        ascending: Option<bool>,
    ) -> Result<bool, TableError> {
        let ascending = ascending.unwrap_or_else(|| next_ascending(&doc.tree, header));
        if !doc.tree.is_connected(header) {
            tracing::debug!("Header {} is detached, not sorting", header);
            return Ok(ascending);
        }
        let table = doc
            .tree
            .closest(header, &self.table)
            .ok_or(TableError::MissingTable(header))?;

        let direction = if ascending { ASCENDING } else { DESCENDING };
        doc.tree.set_attribute(header, SORTED, direction)?;
        self.update_label(&mut doc.tree, header)?;

        self.sort_rows(doc, table, header, ascending)?;

        for other in self.column_headers(&doc.tree, table) {
            if other != header {
                doc.tree.remove_attribute(other, SORTED);
                self.update_label(&mut doc.tree, other)?;
            }
        }

        tracing::debug!("Sorted table {} by {} {}", table, header, direction);
        Ok(ascending)
    }

    fn sort_rows(
        &self,
        doc: &mut Document,
        table: NodeId,
        header: NodeId,
        ascending: bool,
    ) -> Result<(), TableError> {
        let tree = &doc.tree;
        let Some(tbody) = tree
            .element_children(table)
            .into_iter()
            .find(|&c| tree.tag_name(c) == Some("tbody"))
        else {
            return Ok(());
        };
        let Some(column) = tree.index_in_parent(header) else {
            return Ok(());
        };

        let mut rows: Vec<(NodeId, String)> = tree
            .element_children(tbody)
            .into_iter()
            .filter(|&row| tree.tag_name(row) == Some("tr"))
            .map(|row| (row, cell_value(tree, row, column)))
            .collect();

        let collator = Collator::new(doc.preferred_language());
        rows.sort_by(|(_, a), (_, b)| {
            if ascending {
                compare_values(a, b, &collator)
            } else {
                compare_values(b, a, &collator)
            }
        });

        for (row, _) in rows {
            doc.tree.append_child(tbody, row)?;
        }
        Ok(())
    }

    /// Sortable headers belonging to `table` itself, not to nested tables
    fn column_headers(&self, tree: &DomTree, table: NodeId) -> Vec<NodeId> {
        tree.query_selector_all(table, &self.header)
            .into_iter()
            .filter(|&h| tree.closest(h, &self.table) == Some(table))
            .collect()
    }

    fn label_target(&self, tree: &DomTree, header: NodeId) -> NodeId {
        tree.element_children(header)
            .into_iter()
            .find(|&child| self.button.matches(tree, child))
            .unwrap_or(header)
    }

    fn label_text(&self, tree: &DomTree, header: NodeId) -> String {
        let name = tree.inner_text(self.label_target(tree, header));
        let state = match tree.attribute(header, SORTED) {
            Some(ASCENDING) => "sorted ascending",
            Some(DESCENDING) => "sorted descending",
            _ => "unsorted",
        };
        let next = if next_ascending(tree, header) {
            ASCENDING
        } else {
            DESCENDING
        };
        format!(
            "Sortable column, {state}, activate to sort by {} in {next} order",
            name.trim()
        )
    }

    fn update_label(&self, tree: &mut DomTree, header: NodeId) -> Result<(), TableError> {
        let label = self.label_text(tree, header);
        let target = self.label_target(tree, header);
        tree.set_attribute(target, "aria-label", &label)?;
        Ok(())
    }

    fn init(&self, doc: &mut Document, root: NodeId) -> Result<(), TableError> {
        let headers = doc.tree.query_selector_all(root, &self.header);
        for &header in &headers {
            self.update_label(&mut doc.tree, header)?;
        }

        let mut tables = doc.tree.query_selector_all(root, &self.table);
        if self.table.matches(&doc.tree, root) {
            tables.insert(0, root);
        }

        for table in tables {
            let sorted = self.column_headers(&doc.tree, table).into_iter().find_map(|h| {
                match doc.tree.attribute(h, SORTED) {
                    Some(ASCENDING) => Some((h, true)),
                    Some(DESCENDING) => Some((h, false)),
                    _ => None,
                }
            });
            if let Some((header, ascending)) = sorted {
                self.toggle_sort(doc, header, Some(ascending))?;
            }
        }

        tracing::debug!("Labelled {} sortable headers under {}", headers.len(), root);
        Ok(())
    }
}

/// Direction the next activation of `header` applies
fn next_ascending(tree: &DomTree, header: NodeId) -> bool {
    match tree.attribute(header, SORTED) {
        Some(ASCENDING) => false,
        Some(DESCENDING) => true,
        _ => tree.attribute(header, SORTABLE) != Some(DESCENDING),
    }
}

/// Sort key of the `column`th cell of `row`
fn cell_value(tree: &DomTree, row: NodeId, column: usize) -> String {
    let Some(cell) = tree.element_children(row).get(column).copied() else {
        return String::new();
    };
    if let Some(value) = tree.attribute(cell, SORT_OVERRIDE).filter(|v| !v.is_empty()) {
        return value.to_string();
    }
    let rendered = tree.inner_text(cell);
    let rendered = rendered.trim();
    if !rendered.is_empty() {
        return rendered.to_string();
    }
    tree.text_content(cell)
}
