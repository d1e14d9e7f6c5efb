//! Reorderable selector widget
//!
//! A toolkit-independent state machine for the quick-pick button group that
//! sits above each record form. Renderers feed it gestures (click, drag,
//! drop, form submit) and draw from [`SelectorWidget::item_visual`]; the
//! widget turns gestures into [`OptionSetStore`] calls and hands back
//! [`SelectorEvent`]s for the consuming form.
//!
//! The widget never stores the form's selection. It only highlights the
//! value the form passes in, and deleting the selected option leaves the
//! form's selection alone.

use serde::{Deserialize, Serialize};

use crate::error::{OptionSetError, ValidationError};
use crate::models::{OptionDraft, OptionFields, OptionId, OptionItem};
use crate::option_set::OptionSetStore;

/// Interaction mode, toggled only by the consumer's edit button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Clicking an option selects its value
    #[default]
    Browse,
    /// Clicking edits, dragging reorders, trash deletes
    Edit,
}

/// Outbound messages for the consuming form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    /// The user picked an option; carries its value
    SelectionChanged(String),
    /// The option set was mutated; carries the complete new sequence
    OptionSetChanged(Vec<OptionItem>),
}

impl SelectorEvent {
    /// Delivers this event to the matching consumer callback
    pub fn dispatch<C: SelectorConsumer + ?Sized>(self, consumer: &mut C) {
        match self {
            SelectorEvent::SelectionChanged(value) => consumer.on_select(&value),
            SelectorEvent::OptionSetChanged(options) => consumer.on_change(&options),
        }
    }
}

/// The form side of the selector contract
pub trait SelectorConsumer {
    /// Update the form's selected field
    fn on_select(&mut self, value: &str);

    /// Take note of a new option sequence
    fn on_change(&mut self, options: &[OptionItem]);
}

/// Transient state of one reorder gesture
///
/// Exists between drag start and drop or drag end, and is discarded right
/// after. Indices refer to the displayed sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragSession {
    dragged: Option<usize>,
    target: Option<usize>,
}

impl DragSession {
    pub fn dragged(&self) -> Option<usize> {
        self.dragged
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.dragged.is_some()
    }

    /// Lifts the item at `index`
    pub fn start(&mut self, index: usize) {
        self.dragged = Some(index);
        self.target = None;
    }

    /// Records `index` as the drop target. Returns true only when the
    /// target actually moved, so repeated hover events over the same item
    /// are absorbed.
    pub fn over(&mut self, index: usize) -> bool {
        match self.dragged {
            Some(dragged) if dragged != index && self.target != Some(index) => {
                self.target = Some(index);
                true
            }
            _ => false,
        }
    }

    /// Ends the gesture, returning `(from, to)` when it amounts to a move
    pub fn finish(&mut self) -> Option<(usize, usize)> {
        let result = match (self.dragged, self.target) {
            (Some(from), Some(to)) if from != to => Some((from, to)),
            _ => None,
        };
        self.cancel();
        result
    }

    /// Ends the gesture without a move
    pub fn cancel(&mut self) {
        self.dragged = None;
        self.target = None;
    }
}

/// Add/edit form shown in edit mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionEditor {
    editing: Option<OptionId>,
    pub label: String,
    pub value: String,
    error: Option<ValidationError>,
}

impl OptionEditor {
    fn blank() -> Self {
        Self::default()
    }

    fn for_option(option: &OptionItem) -> Self {
        Self {
            editing: Some(option.id),
            label: option.label.clone(),
            value: option.value.clone(),
            error: None,
        }
    }

    /// Id of the option being edited, `None` when adding
    pub fn editing(&self) -> Option<OptionId> {
        self.editing
    }

    pub fn is_new(&self) -> bool {
        self.editing.is_none()
    }

    /// Inline validation message from the last submit attempt
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn title(&self) -> &'static str {
        if self.is_new() {
            "新增按鈕"
        } else {
            "編輯按鈕"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
}

/// Short message for a toast or status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.to_string(),
        }
    }

    fn warning(text: &str) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.to_string(),
        }
    }
}

/// How a renderer should draw one option
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemVisual {
    /// Being dragged; draw at reduced opacity
    pub lifted: bool,
    /// Current drop target; draw the dashed border
    pub drop_indicator: bool,
    /// Matches the form's selection (browse mode only)
    pub highlighted: bool,
    pub draggable: bool,
    /// Show the trash control
    pub deletable: bool,
}

/// Selector state for one option set
#[derive(Debug, Clone)]
pub struct SelectorWidget {
    title: String,
    mode: Mode,
    displayed: Vec<OptionItem>,
    synced: Option<(String, u64)>,
    drag: DragSession,
    editor: Option<OptionEditor>,
    pending_delete: Option<OptionId>,
    notice: Option<Notice>,
}

impl SelectorWidget {
    /// Creates a widget showing the current contents of `store`
    pub fn new(title: impl Into<String>, store: &OptionSetStore) -> Self {
        let mut widget = Self {
            title: title.into(),
            mode: Mode::Browse,
            displayed: Vec::new(),
            synced: None,
            drag: DragSession::default(),
            editor: None,
            pending_delete: None,
            notice: None,
        };
        widget.sync(store);
        widget
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Edit
    }

    /// The sequence currently on screen
    pub fn options(&self) -> &[OptionItem] {
        &self.displayed
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    pub fn editor(&self) -> Option<&OptionEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut OptionEditor> {
        self.editor.as_mut()
    }

    /// Option awaiting delete confirmation
    pub fn pending_delete(&self) -> Option<&OptionItem> {
        let id = self.pending_delete?;
        self.displayed.iter().find(|o| o.id == id)
    }

    /// Whether the "new" button is shown; empty sets still get it in edit mode
    pub fn shows_new_button(&self) -> bool {
        self.is_editing()
    }

    /// Label of the mode toggle button
    pub fn toggle_label(&self) -> &'static str {
        match self.mode {
            Mode::Browse => "編輯按鈕",
            Mode::Edit => "完成編輯",
        }
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Refreshes the displayed sequence when the store has changed since the
    /// last sync. Any drag in progress is dropped because its indices no
    /// longer refer to the same items.
    ///
    /// Revisions are per store instance, so the contents are compared as
    /// well: two stores over the same key can share a revision number.
    pub fn sync(&mut self, store: &OptionSetStore) {
        let source = (store.key().to_string(), store.revision());
        if self.synced.as_ref() == Some(&source) && self.displayed.as_slice() == store.options() {
            return;
        }

        self.displayed = store.options().to_vec();
        self.synced = Some(source);
        self.drag.cancel();

        // A pending delete or open edit form may name an option that is gone
        if let Some(id) = self.pending_delete {
            if !self.is_displayed(id) {
                log::debug!("Dropping delete of vanished option #{}", id);
                self.pending_delete = None;
            }
        }
        if let Some(id) = self.editor.as_ref().and_then(OptionEditor::editing) {
            if !self.is_displayed(id) {
                log::debug!("Closing editor of vanished option #{}", id);
                self.editor = None;
            }
        }
    }

    fn is_displayed(&self, id: OptionId) -> bool {
        self.displayed.iter().any(|o| o.id == id)
    }

    /// Switches between browse and edit mode. Leaving edit mode abandons
    /// any open form, pending delete or drag.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Browse => Mode::Edit,
            Mode::Edit => {
                self.drag.cancel();
                self.editor = None;
                self.pending_delete = None;
                Mode::Browse
            }
        };
    }

    pub fn item_visual(&self, index: usize, selected_value: Option<&str>) -> ItemVisual {
        let Some(option) = self.displayed.get(index) else {
            return ItemVisual::default();
        };
        let editing = self.is_editing();
        ItemVisual {
            lifted: editing && self.drag.dragged() == Some(index),
            drop_indicator: editing && self.drag.target() == Some(index),
            highlighted: !editing && selected_value == Some(option.value.as_str()),
            draggable: editing,
            deletable: editing,
        }
    }

    /// Handles a click on the option at `index`: selects in browse mode,
    /// opens the edit form in edit mode
    pub fn click(&mut self, index: usize) -> Option<SelectorEvent> {
        let option = self.displayed.get(index)?;
        match self.mode {
            Mode::Browse => Some(SelectorEvent::SelectionChanged(option.value.clone())),
            Mode::Edit => {
                self.editor = Some(OptionEditor::for_option(option));
                None
            }
        }
    }

    /// Opens an empty form for a new option
    pub fn open_new(&mut self) {
        if self.is_editing() {
            self.editor = Some(OptionEditor::blank());
        }
    }

    pub fn cancel_editor(&mut self) {
        self.editor = None;
    }

    /// Validates the open form and applies it as an add or edit.
    ///
    /// On a validation failure the form stays open with an inline error and
    /// nothing is written.
    pub fn submit_editor(&mut self, store: &mut OptionSetStore) -> Option<SelectorEvent> {
        let editor = self.editor.as_mut()?;

        let result = match editor.editing {
            Some(id) => store.edit(id, OptionFields::new(editor.label.trim(), editor.value.trim())),
            None => store.add(OptionDraft::new(editor.label.trim(), editor.value.trim())),
        }
        .map(|_| ());

        let success_text = if editor.is_new() {
            "新按鈕已添加"
        } else {
            "按鈕已更新"
        };

        match result {
            Ok(_) => {
                self.editor = None;
                Some(self.after_mutation(store, success_text))
            }
            Err(OptionSetError::Validation(e)) => {
                log::debug!("Option form rejected: {}", e);
                editor.error = Some(e);
                None
            }
            Err(e) => {
                log::warn!("Option form failed: {}", e);
                None
            }
        }
    }

    /// Asks for confirmation before deleting the option at `index`
    pub fn request_delete(&mut self, index: usize) {
        if !self.is_editing() {
            return;
        }
        if let Some(option) = self.displayed.get(index) {
            self.pending_delete = Some(option.id);
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the option awaiting confirmation
    pub fn confirm_delete(&mut self, store: &mut OptionSetStore) -> Option<SelectorEvent> {
        let id = self.pending_delete.take()?;
        store.remove(id);
        Some(self.after_mutation(store, "按鈕已刪除"))
    }

    /// Starts dragging the option at `index`; ignored outside edit mode
    pub fn drag_start(&mut self, index: usize) -> bool {
        if !self.is_editing() || index >= self.displayed.len() {
            return false;
        }
        self.drag.start(index);
        true
    }

    /// Pointer is over the option at `index`. Returns true when the drop
    /// indicator moved and needs a redraw.
    pub fn drag_over(&mut self, index: usize) -> bool {
        if !self.is_editing() || index >= self.displayed.len() {
            return false;
        }
        self.drag.over(index)
    }

    /// Completes the gesture, reordering when it names two distinct items.
    /// The drag session is cleared whatever the outcome.
    pub fn drop(&mut self, store: &mut OptionSetStore) -> Option<SelectorEvent> {
        let (from, to) = self.drag.finish()?;
        match store.reorder(from, to).map(|_| ()) {
            Ok(_) => Some(self.after_mutation(store, "按鈕順序已更新")),
            Err(e) => {
                log::warn!("Ignoring drop on '{}': {}", store.key(), e);
                None
            }
        }
    }

    /// Gesture ended without a drop
    pub fn drag_end(&mut self) {
        self.drag.cancel();
    }

    fn after_mutation(&mut self, store: &OptionSetStore, success_text: &str) -> SelectorEvent {
        self.sync(store);
        self.notice = Some(if store.last_write_succeeded() {
            Notice::success(success_text)
        } else {
            Notice::warning("變更未能保存，重新載入後可能遺失")
        });
        SelectorEvent::OptionSetChanged(store.options().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::OptionCategory;
    use crate::storage::test_support::RecordingBacking;
    use crate::storage::MemoryBacking;
    use std::sync::Arc;

    fn breed_store() -> (Arc<RecordingBacking>, OptionSetStore) {
        let backing = Arc::new(RecordingBacking::new());
        let store = OptionSetStore::load(
            backing.clone(),
            "chicken_farm_chicken_breeds",
            vec![
                OptionItem::labelled(1, "黑羽土雞"),
                OptionItem::labelled(2, "白羽土雞"),
                OptionItem::labelled(3, "紅羽土雞"),
            ],
        );
        (backing, store)
    }

    fn ids(options: &[OptionItem]) -> Vec<u64> {
        options.iter().map(|o| o.id.0).collect()
    }

    #[derive(Default)]
    struct Form {
        breed: String,
        options: Vec<OptionItem>,
    }

    impl SelectorConsumer for Form {
        fn on_select(&mut self, value: &str) {
            self.breed = value.to_string();
        }

        fn on_change(&mut self, options: &[OptionItem]) {
            self.options = options.to_vec();
        }
    }

    #[test]
    fn test_browse_click_selects_value() {
        let (_, store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        let mut form = Form::default();

        widget.click(1).unwrap().dispatch(&mut form);
        assert_eq!(form.breed, "白羽土雞");
        assert!(widget.editor().is_none());
        assert!(widget.click(9).is_none());
    }

    #[test]
    fn test_highlight_only_in_browse_mode() {
        let (_, store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);

        assert!(widget.item_visual(0, Some("黑羽土雞")).highlighted);
        assert!(!widget.item_visual(1, Some("黑羽土雞")).highlighted);

        widget.toggle_mode();
        let visual = widget.item_visual(0, Some("黑羽土雞"));
        assert!(!visual.highlighted);
        assert!(visual.draggable && visual.deletable);
    }

    #[test]
    fn test_browse_mode_ignores_drag_and_delete() {
        let (backing, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);

        assert!(!widget.drag_start(0));
        assert!(!widget.drag_over(1));
        assert!(widget.drop(&mut store).is_none());
        widget.request_delete(0);
        assert!(widget.pending_delete().is_none());
        widget.open_new();
        assert!(widget.editor().is_none());
        assert_eq!(backing.write_count(), 0);
    }

    #[test]
    fn test_edit_click_opens_prefilled_form_and_submits() {
        let (backing, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();

        assert!(widget.click(2).is_none());
        let editor = widget.editor_mut().unwrap();
        assert_eq!(editor.label, "紅羽土雞");
        assert!(!editor.is_new());
        editor.label = "紅羽雞".to_string();
        editor.value = "紅羽雞".to_string();

        let event = widget.submit_editor(&mut store).unwrap();
        match event {
            SelectorEvent::OptionSetChanged(options) => {
                assert_eq!(ids(&options), vec![1, 2, 3]);
                assert_eq!(options[2].value, "紅羽雞");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(widget.editor().is_none());
        assert_eq!(widget.options()[2].label, "紅羽雞");
        assert_eq!(widget.take_notice().unwrap().text, "按鈕已更新");
        assert_eq!(backing.write_count(), 1);
    }

    #[test]
    fn test_new_option_appended_last() {
        let (_, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();
        widget.open_new();

        let editor = widget.editor_mut().unwrap();
        assert!(editor.is_new());
        editor.label = "花羽土雞".to_string();
        editor.value = "花羽土雞".to_string();

        let mut form = Form::default();
        widget.submit_editor(&mut store).unwrap().dispatch(&mut form);
        assert_eq!(form.options.len(), 4);
        assert_eq!(form.options[3].label, "花羽土雞");
        assert_eq!(widget.options(), store.options());
    }

    #[test]
    fn test_validation_failure_keeps_form_open_without_writing() {
        let (backing, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();
        widget.open_new();
        widget.editor_mut().unwrap().label = "只有標籤".to_string();

        assert!(widget.submit_editor(&mut store).is_none());
        assert_eq!(
            widget.editor().unwrap().error(),
            Some(&ValidationError::EmptyValue)
        );
        assert_eq!(store.len(), 3);
        assert_eq!(backing.write_count(), 0);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (_, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();

        widget.request_delete(0);
        assert_eq!(widget.pending_delete().unwrap().label, "黑羽土雞");
        widget.cancel_delete();
        assert!(widget.confirm_delete(&mut store).is_none());
        assert_eq!(store.len(), 3);

        widget.request_delete(0);
        let event = widget.confirm_delete(&mut store).unwrap();
        assert_eq!(
            event,
            SelectorEvent::OptionSetChanged(store.options().to_vec())
        );
        assert_eq!(ids(widget.options()), vec![2, 3]);
    }

    #[test]
    fn test_deleting_selected_option_leaves_selection_alone() {
        let (_, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        let mut form = Form::default();

        widget.click(0).unwrap().dispatch(&mut form);
        widget.toggle_mode();
        widget.request_delete(0);
        widget.confirm_delete(&mut store).unwrap().dispatch(&mut form);

        assert_eq!(form.breed, "黑羽土雞");
        assert!(store.find_by_value(&form.breed).is_none());
    }

    #[test]
    fn test_drag_protocol_reorders_with_post_removal_index() {
        let (backing, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();

        assert!(widget.drag_start(0));
        assert!(widget.item_visual(0, None).lifted);

        assert!(widget.drag_over(2));
        assert!(!widget.drag_over(2), "same target must not re-queue");
        assert!(!widget.drag_over(0), "hovering the dragged item is ignored");
        assert!(widget.item_visual(2, None).drop_indicator);

        let event = widget.drop(&mut store).unwrap();
        assert_eq!(event, SelectorEvent::OptionSetChanged(store.options().to_vec()));
        assert_eq!(ids(store.options()), vec![2, 3, 1]);
        assert_eq!(widget.drag_session(), &DragSession::default());
        assert_eq!(backing.write_count(), 1);
        assert_eq!(widget.take_notice().unwrap().text, "按鈕順序已更新");
    }

    #[test]
    fn test_drop_without_target_only_clears_session() {
        let (backing, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();

        widget.drag_start(1);
        assert!(widget.drop(&mut store).is_none());
        assert!(!widget.drag_session().is_active());
        assert_eq!(widget.drag_session().target(), None);
        assert_eq!(backing.write_count(), 0);
    }

    #[test]
    fn test_drag_end_cancels_without_reorder() {
        let (backing, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();

        widget.drag_start(0);
        widget.drag_over(1);
        widget.drag_end();

        assert_eq!(widget.drag_session(), &DragSession::default());
        assert!(widget.drop(&mut store).is_none());
        assert_eq!(ids(store.options()), vec![1, 2, 3]);
        assert_eq!(backing.write_count(), 0);
    }

    #[test]
    fn test_leaving_edit_mode_clears_transient_state() {
        let (_, store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();
        widget.drag_start(0);
        widget.open_new();

        widget.toggle_mode();
        assert_eq!(widget.mode(), Mode::Browse);
        assert!(!widget.drag_session().is_active());
        assert!(widget.editor().is_none());
        assert_eq!(widget.toggle_label(), "編輯按鈕");
    }

    #[test]
    fn test_sync_follows_external_changes() {
        let backing = Arc::new(MemoryBacking::new());
        let mut store = OptionSetStore::for_category(backing, OptionCategory::Suppliers);
        let mut widget = SelectorWidget::new("供應商", &store);

        store.remove(OptionId(1));
        assert_eq!(widget.options().len(), 4);

        widget.sync(&store);
        assert_eq!(widget.options(), store.options());
    }

    #[test]
    fn test_sync_detects_second_store_with_same_revision() {
        let backing = Arc::new(MemoryBacking::new());
        let defaults = vec![
            OptionItem::labelled(1, "一"),
            OptionItem::labelled(2, "二"),
            OptionItem::labelled(3, "三"),
            OptionItem::labelled(4, "四"),
        ];

        let mut a = OptionSetStore::load(backing.clone(), "shared", defaults.clone());
        a.remove(OptionId(4));
        let mut widget = SelectorWidget::new("共用", &a);
        assert_eq!(ids(widget.options()), vec![1, 2, 3]);

        let mut b = OptionSetStore::load(backing, "shared", defaults);
        b.remove(OptionId(1));
        assert_eq!(a.revision(), b.revision());

        widget.sync(&b);
        assert_eq!(widget.options(), b.options());

        widget.toggle_mode();
        assert!(widget.drag_start(0));
        assert!(widget.drag_over(1));
        assert!(widget.drop(&mut b).is_some());
        assert_eq!(ids(b.options()), vec![3, 2]);
    }

    #[test]
    fn test_release_over_dragged_item_uses_recorded_target() {
        let (_, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();

        widget.drag_start(0);
        widget.drag_over(2);
        // Pointer wanders back over the lifted item before release
        assert!(!widget.drag_over(0));
        assert!(widget.drop(&mut store).is_some());
        assert_eq!(ids(store.options()), vec![2, 3, 1]);
    }

    #[test]
    fn test_sync_clears_pending_delete_of_vanished_option() {
        let backing = Arc::new(MemoryBacking::new());
        let mut store = OptionSetStore::for_category(backing.clone(), OptionCategory::Suppliers);
        let mut widget = SelectorWidget::new("供應商", &store);
        widget.toggle_mode();
        widget.request_delete(0);
        widget.click(0);
        assert!(widget.pending_delete().is_some());
        assert!(widget.editor().is_some());

        let mut other = OptionSetStore::for_category(backing, OptionCategory::Suppliers);
        other.remove(OptionId(1));
        store.reload();
        widget.sync(&store);

        assert!(widget.pending_delete().is_none());
        assert!(widget.editor().is_none());
        assert!(widget.confirm_delete(&mut store).is_none());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_sync_keeps_pending_delete_of_surviving_option() {
        let (_, mut store) = breed_store();
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();
        widget.request_delete(1);

        store.remove(OptionId(3));
        widget.sync(&store);
        assert_eq!(widget.pending_delete().unwrap().id, OptionId(2));
    }

    #[test]
    fn test_empty_set_shows_only_new_button_in_edit_mode() {
        let backing = Arc::new(MemoryBacking::new());
        let store = OptionSetStore::load(backing, "empty", Vec::new());
        let mut widget = SelectorWidget::new("空", &store);

        assert!(widget.options().is_empty());
        assert!(!widget.shows_new_button());
        widget.toggle_mode();
        assert!(widget.shows_new_button());
        assert_eq!(widget.item_visual(0, None), ItemVisual::default());
    }

    #[test]
    fn test_write_failure_surfaces_warning_notice() {
        let (backing, mut store) = breed_store();
        backing.set_failing(true);
        let mut widget = SelectorWidget::new("雞種", &store);
        widget.toggle_mode();

        widget.request_delete(2);
        assert!(widget.confirm_delete(&mut store).is_some());
        assert_eq!(widget.options().len(), 2);
        assert_eq!(widget.take_notice().unwrap().kind, NoticeKind::Warning);
    }

    #[test]
    fn test_drag_session_serializes() {
        let mut session = DragSession::default();
        session.start(3);
        session.over(1);

        let json = serde_json::to_string(&session).unwrap();
        let parsed: DragSession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
        assert_eq!(session.finish(), Some((3, 1)));
        assert!(!session.is_active());
    }
}
