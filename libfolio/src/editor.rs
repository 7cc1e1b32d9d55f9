//! Component operations on the selected page
//!
//! All operations act on the store's working copy and leave the page
//! collection alone until [`PageStore::save_page`] is called. Without a
//! selection every operation fails with [`StoreError::NoSelection`].
//!
//! Operations that change the component list refresh the page's
//! `updated_at`. Operations that fail change nothing.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::PageStore;
use crate::types::{CmsPage, MoveDirection, PageComponent, Props};

type EditResult<T> = std::result::Result<T, StoreError>;

impl PageStore {
    /// Place a new instance of `component_type` on the selected page.
    ///
    /// `index` may be anything from 0 to the current length; `None` appends.
    pub fn add_component(
        &mut self,
        component_type: &str,
        index: Option<usize>,
    ) -> EditResult<&PageComponent> {
        let page = self.selected.as_mut().ok_or(StoreError::NoSelection)?;
        let definition = self
            .catalog
            .find(component_type)
            .ok_or_else(|| StoreError::UnknownComponentType(component_type.to_string()))?;

        let len = page.components.len();
        let position = match index {
            Some(index) if index <= len => index,
            Some(index) => return Err(StoreError::IndexOutOfBounds { index, len }),
            None => len,
        };

        let component = PageComponent::from_definition(definition);
        tracing::debug!(
            "Adding {} to page {} at position {}",
            component.id,
            page.id,
            position
        );
        page.components.insert(position, component);
        page.touch();

        Ok(&page.components[position])
    }

    /// Shallow-merge `partial` into a component's props
    pub fn update_component_props(
        &mut self,
        component_id: &str,
        partial: Props,
    ) -> EditResult<&PageComponent> {
        let page = self.selected.as_mut().ok_or(StoreError::NoSelection)?;
        let index = find_component(page, component_id)?;

        page.components[index].merge_props(partial);
        page.touch();
        tracing::debug!("Updated props of {} on page {}", component_id, page.id);

        Ok(&page.components[index])
    }

    /// Remove a component from the selected page
    pub fn remove_component(&mut self, component_id: &str) -> EditResult<PageComponent> {
        let page = self.selected.as_mut().ok_or(StoreError::NoSelection)?;
        let index = find_component(page, component_id)?;

        let removed = page.components.remove(index);
        page.touch();
        tracing::debug!("Removed {} from page {}", component_id, page.id);

        Ok(removed)
    }

    /// Swap a component with its neighbour in `direction`.
    ///
    /// Returns `Ok(false)` without touching the page when the component is
    /// already first (moving up) or last (moving down).
    pub fn move_component(
        &mut self,
        component_id: &str,
        direction: MoveDirection,
    ) -> EditResult<bool> {
        let page = self.selected.as_mut().ok_or(StoreError::NoSelection)?;
        let index = find_component(page, component_id)?;

        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < page.components.len() => index + 1,
            _ => return Ok(false),
        };

        page.components.swap(index, target);
        page.touch();
        tracing::debug!(
            "Moved {} {} on page {} ({} -> {})",
            component_id,
            direction,
            page.id,
            index,
            target
        );

        Ok(true)
    }

    /// Apply a single [`EditOp`] to the selected page
    pub fn apply(&mut self, op: EditOp) -> EditResult<EditOutcome> {
        match op {
            EditOp::Add {
                component_type,
                index,
            } => self
                .add_component(&component_type, index)
                .map(|c| EditOutcome::Added(c.id.clone())),
            EditOp::UpdateProps {
                component_id,
                props,
            } => self
                .update_component_props(&component_id, props)
                .map(|_| EditOutcome::Updated),
            EditOp::Remove { component_id } => self
                .remove_component(&component_id)
                .map(|_| EditOutcome::Removed),
            EditOp::Move {
                component_id,
                direction,
            } => self
                .move_component(&component_id, direction)
                .map(EditOutcome::Moved),
        }
    }

    /// Apply a sequence of operations, stopping at the first failure.
    ///
    /// Operations before the failing one stay applied to the working copy.
    pub fn apply_all(&mut self, ops: Vec<EditOp>) -> EditResult<Vec<EditOutcome>> {
        ops.into_iter().map(|op| self.apply(op)).collect()
    }
}

fn find_component(page: &CmsPage, component_id: &str) -> EditResult<usize> {
    page.component_index(component_id)
        .ok_or_else(|| StoreError::ComponentNotFound(component_id.to_string()))
}

/// A component operation in serializable form, for batch edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Add {
        #[serde(rename = "type")]
        component_type: String,
        #[serde(default)]
        index: Option<usize>,
    },
    UpdateProps {
        component_id: String,
        props: Props,
    },
    Remove {
        component_id: String,
    },
    Move {
        component_id: String,
        direction: MoveDirection,
    },
}

/// What an applied [`EditOp`] did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "value", rename_all = "snake_case")]
pub enum EditOutcome {
    /// Id of the new component
    Added(String),
    Updated,
    Removed,
    /// Whether the component actually moved
    Moved(bool),
}
