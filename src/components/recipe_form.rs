//! New recipe form
//!
//! Scalar fields live in a [`RecipeDraft`]; the three lists live in their
//! editors and are copied into the draft on submit. Tags are picked with a
//! multi-select [`CheckCombo`] whose popup is drawn over the rest of the form.

use crate::action::Action;
use crate::component::Component;
use crate::components::check_combo::CheckCombo;
use crate::components::list_editor::ListEditor;
use crate::model::item::{ItemShapeError, ItemValue};
use crate::model::query::CellValue;
use crate::model::modal::PromptPurpose;
use crate::model::recipe::{ImageEntry, RecipeDraft, RecipeImport, DISPLAY_FORMAT};
use crate::model::ui::FormField;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::debug;

pub struct RecipeForm {
    draft: RecipeDraft,
    pub focus: FormField,
    pub tags: CheckCombo,
    ingredients: ListEditor<String>,
    steps: ListEditor<String>,
    images: ListEditor<ImageEntry>,
}

impl RecipeForm {
    pub fn new(max_visible_tags: usize) -> Self {
        let mut tags = CheckCombo::new("Select tags…", max_visible_tags, true);
        tags.on_selection_changed(|values| {
            debug!(count = values.len(), "Recipe tag selection changed");
        });
        let mut form = Self {
            draft: RecipeDraft::new(),
            focus: FormField::Name,
            tags,
            ingredients: ListEditor::new("Ingredients", false),
            steps: ListEditor::new("Steps", false),
            images: ListEditor::new("Images (path | alt)", true),
        };
        form.apply_focus();
        form
    }

    /// Fill the tag picker from query rows; items are appended, never replaced
    ///
    /// Rows before a malformed one stay in the picker.
    pub fn load_tags(&mut self, rows: Vec<Vec<CellValue>>) -> Result<(), ItemShapeError> {
        self.tags.try_add_items(rows)
    }

    pub fn draft(&self) -> &RecipeDraft {
        &self.draft
    }

    pub fn selected_tags(&self) -> Vec<ItemValue> {
        self.tags.selected_values()
    }

    /// The draft with the editor lists copied in
    pub fn draft_for_submit(&self) -> RecipeDraft {
        let mut draft = self.draft.clone();
        draft.ingredients = self.ingredients.items().to_vec();
        draft.steps = self.steps.items().to_vec();
        draft.images = self.images.items().to_vec();
        draft
    }

    /// Merge an imported recipe file into the form
    pub fn apply_import(&mut self, import: RecipeImport) {
        if let Some(n) = import.nb_peoples {
            self.draft.nb_peoples = n;
        }
        self.ingredients.extend(import.ingredients);
        self.steps.extend(import.steps);
    }

    /// Start a fresh recipe after a successful save
    pub fn reset(&mut self) {
        self.draft = RecipeDraft::new();
        self.ingredients.clear();
        self.steps.clear();
        self.images.clear();
        self.tags.clear_selection();
        self.tags.close_popup();
        self.focus = FormField::Name;
        self.apply_focus();
    }

    fn set_focus(&mut self, field: FormField) {
        self.focus = field;
        self.apply_focus();
    }

    fn apply_focus(&mut self) {
        self.tags.set_focused(self.focus == FormField::Tags);
        self.ingredients
            .set_focused(self.focus == FormField::Ingredients);
        self.steps.set_focused(self.focus == FormField::Steps);
        self.images.set_focused(self.focus == FormField::Images);
    }

    fn text_field(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.draft.name),
            FormField::Description => Some(&mut self.draft.description),
            _ => None,
        }
    }

    fn field_block(&self, field: FormField, title: &str) -> Block<'static> {
        let color = if self.focus == field {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", title))
            .border_style(Style::default().fg(color))
    }

    fn text_paragraph(&self, field: FormField, title: &str, text: &str) -> Paragraph<'static> {
        let mut spans = vec![Span::styled(text.to_string(), Style::default().fg(Color::White))];
        if self.focus == field {
            spans.push(Span::styled("█", Style::default().fg(Color::Gray)));
        }
        Paragraph::new(Line::from(spans)).block(self.field_block(field, title))
    }

    fn button(&self, field: FormField, label: &str, color: Color) -> Paragraph<'static> {
        let style = if self.focus == field {
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        Paragraph::new(Line::from(Span::styled(format!(" {} ", label), style)))
            .alignment(ratatui::layout::Alignment::Center)
            .block(self.field_block(field, ""))
    }
}

fn rating_text(rating: Option<u8>) -> String {
    match rating {
        Some(r) => format!("◀ {:>2}/10 ▶", r),
        None => "◀  -/10 ▶".to_string(),
    }
}

impl Component for RecipeForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // An open popup or a drag in progress owns the keyboard
        if self.tags.is_open() {
            return self.tags.handle_key_event(key);
        }
        if self.focus == FormField::Images && self.images.is_grabbing() {
            return self.images.handle_key_event(key);
        }

        match key.code {
            KeyCode::Tab => {
                self.set_focus(self.focus.next());
                return Ok(None);
            }
            KeyCode::BackTab => {
                self.set_focus(self.focus.prev());
                return Ok(None);
            }
            _ => {}
        }

        let action = match self.focus {
            FormField::Name | FormField::Description => {
                match key.code {
                    KeyCode::Enter => self.set_focus(self.focus.next()),
                    KeyCode::Backspace => {
                        if let Some(text) = self.text_field() {
                            text.pop();
                        }
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        if let Some(text) = self.text_field() {
                            text.push(c);
                        }
                    }
                    _ => {}
                }
                None
            }
            FormField::Rate => {
                match key.code {
                    KeyCode::Right | KeyCode::Char('l') => self.draft.next_rating(),
                    KeyCode::Left | KeyCode::Char('h') => self.draft.prev_rating(),
                    _ => {}
                }
                None
            }
            FormField::Peoples => {
                match key.code {
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => {
                        self.draft.increment_peoples()
                    }
                    KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => {
                        self.draft.decrement_peoples()
                    }
                    _ => {}
                }
                None
            }
            FormField::Tags => self.tags.handle_key_event(key)?,
            FormField::ImportJson => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    Some(Action::OpenPrompt(PromptPurpose::ImportRecipeJson))
                }
                _ => None,
            },
            FormField::Ingredients => self.ingredients.handle_key_event(key)?,
            FormField::Steps => self.steps.handle_key_event(key)?,
            FormField::Images => self.images.handle_key_event(key)?,
            FormField::Save => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(Action::SubmitRecipe),
                _ => None,
            },
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
            ])
            .split(rows[0]);
        frame.render_widget(
            self.text_paragraph(FormField::Name, "Name", &self.draft.name),
            top[0],
        );
        frame.render_widget(
            Paragraph::new(rating_text(self.draft.rating)).block(self.field_block(FormField::Rate, "Rate")),
            top[1],
        );
        frame.render_widget(
            Paragraph::new(format!("◀ {:>2} ▶", self.draft.nb_peoples))
                .block(self.field_block(FormField::Peoples, "Peoples")),
            top[2],
        );

        frame.render_widget(
            self.text_paragraph(FormField::Description, "Description", &self.draft.description),
            rows[1],
        );

        let tag_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(18)])
            .split(rows[2]);
        frame.render_widget(
            self.button(FormField::ImportJson, "Import JSON", Color::Cyan),
            tag_row[1],
        );

        let lists = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(rows[3]);
        self.ingredients.draw(frame, lists[0])?;
        self.steps.draw(frame, lists[1])?;
        self.images.draw(frame, lists[2])?;

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(14), Constraint::Min(0)])
            .split(rows[4]);
        frame.render_widget(self.button(FormField::Save, "Save", Color::Green), bottom[0]);
        let stamps = Paragraph::new(Line::from(vec![
            Span::styled("Created ", Style::default().fg(Color::DarkGray)),
            Span::raw(self.draft.created_at.format(DISPLAY_FORMAT).to_string()),
            Span::styled("  Updated ", Style::default().fg(Color::DarkGray)),
            Span::raw(self.draft.updated_at.format(DISPLAY_FORMAT).to_string()),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(stamps, bottom[1]);

        // Last, so the popup covers the lists below it
        self.tags.draw(frame, tag_row[0])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::ItemSpec;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut RecipeForm, text: &str) {
        for c in text.chars() {
            form.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn focus(form: &mut RecipeForm, field: FormField) {
        while form.focus != field {
            form.handle_key_event(key(KeyCode::Tab)).unwrap();
        }
    }

    #[test]
    fn test_load_tags_keeps_rows_before_bad_one() {
        let mut form = RecipeForm::new(8);
        let rows = vec![
            vec![CellValue::Text("Vegan".to_string()), CellValue::Integer(1)],
            vec![CellValue::Text("Quick".to_string())],
            vec![CellValue::Integer(3); 4],
            vec![CellValue::Text("Never".to_string())],
        ];
        let err = form.load_tags(rows).unwrap_err();
        assert!(matches!(err, ItemShapeError::AtIndex { index: 2, .. }));
        assert_eq!(form.tags.len(), 2);
    }

    fn form_with_tags() -> RecipeForm {
        let mut form = RecipeForm::new(8);
        form.tags.add_items([
            ItemSpec::from(("Vegan", 1i64)),
            ItemSpec::from(("Quick", 2i64)),
            ItemSpec::from(("Dessert", 3i64)),
        ]);
        form
    }

    #[test]
    fn test_typing_fills_name_then_description() {
        let mut form = RecipeForm::new(8);
        type_text(&mut form, "Pancakes");
        form.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(form.focus, FormField::Rate);
        focus(&mut form, FormField::Description);
        type_text(&mut form, "Fluffy");
        form.handle_key_event(key(KeyCode::Backspace)).unwrap();
        assert_eq!(form.draft().name, "Pancakes");
        assert_eq!(form.draft().description, "Fluff");
    }

    #[test]
    fn test_arrows_change_rating_and_peoples() {
        let mut form = RecipeForm::new(8);
        focus(&mut form, FormField::Rate);
        form.handle_key_event(key(KeyCode::Right)).unwrap();
        form.handle_key_event(key(KeyCode::Right)).unwrap();
        assert_eq!(form.draft().rating, Some(1));

        focus(&mut form, FormField::Peoples);
        form.handle_key_event(key(KeyCode::Left)).unwrap();
        assert_eq!(form.draft().nb_peoples, 3);
    }

    #[test]
    fn test_backtab_wraps_to_save() {
        let mut form = RecipeForm::new(8);
        form.handle_key_event(key(KeyCode::BackTab)).unwrap();
        assert_eq!(form.focus, FormField::Save);
        assert_eq!(
            form.handle_key_event(key(KeyCode::Enter)).unwrap(),
            Some(Action::SubmitRecipe)
        );
    }

    #[test]
    fn test_open_combo_owns_keys() {
        let mut form = form_with_tags();
        focus(&mut form, FormField::Tags);
        form.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(form.tags.is_open());

        // Swallowed by the open combo
        form.handle_key_event(key(KeyCode::Tab)).unwrap();
        assert_eq!(form.focus, FormField::Tags);

        form.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        form.handle_key_event(key(KeyCode::Down)).unwrap();
        form.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        form.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(!form.tags.is_open());
        assert_eq!(
            form.selected_tags(),
            vec![ItemValue::Integer(1), ItemValue::Integer(2)]
        );
    }

    #[test]
    fn test_lists_copied_into_submitted_draft() {
        let mut form = RecipeForm::new(8);
        focus(&mut form, FormField::Ingredients);
        type_text(&mut form, "flour");
        form.handle_key_event(key(KeyCode::Enter)).unwrap();
        focus(&mut form, FormField::Images);
        type_text(&mut form, "cake.jpg | the cake");
        form.handle_key_event(key(KeyCode::Enter)).unwrap();

        let draft = form.draft_for_submit();
        assert_eq!(draft.ingredients, vec!["flour".to_string()]);
        assert_eq!(draft.images[0].path, "cake.jpg");
        assert_eq!(draft.images[0].alt_text.as_deref(), Some("the cake"));
    }

    #[test]
    fn test_import_appends_lists() {
        let mut form = RecipeForm::new(8);
        let import = RecipeImport::from_json_str(
            r#"{"nb_peoples": 6, "ingredients": ["milk"], "steps": ["stir"]}"#,
        )
        .unwrap();
        form.apply_import(import);
        let draft = form.draft_for_submit();
        assert_eq!(draft.nb_peoples, 6);
        assert_eq!(draft.ingredients, vec!["milk".to_string()]);
        assert_eq!(draft.steps, vec!["stir".to_string()]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = form_with_tags();
        form.tags.toggle(0);
        type_text(&mut form, "Soup");
        form.reset();
        assert!(form.draft().name.is_empty());
        assert!(form.selected_tags().is_empty());
        assert_eq!(form.focus, FormField::Name);
    }

    #[test]
    fn test_import_button_opens_prompt() {
        let mut form = RecipeForm::new(8);
        focus(&mut form, FormField::ImportJson);
        assert_eq!(
            form.handle_key_event(key(KeyCode::Enter)).unwrap(),
            Some(Action::OpenPrompt(PromptPurpose::ImportRecipeJson))
        );
    }
}
