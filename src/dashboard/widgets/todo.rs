use super::{TodoInput, WidgetContext, WidgetHandle, WidgetInput};
use crate::settings::{SettingsDocument, WidgetId};
use eframe::egui;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEntry {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoEntry {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            completed: false,
        }
    }
}

/// To-do list stored under `widgets[id].todos`.
pub struct TodoWidget {
    id: WidgetId,
    draft: String,
}

impl TodoWidget {
    pub fn init(id: &WidgetId, ctx: &mut WidgetContext<'_>) -> Self {
        let missing = ctx
            .data()
            .and_then(|bag| bag.get("todos"))
            .map_or(true, |todos| !todos.is_array());
        if missing {
            ctx.update_data(|bag| store_todos(bag, &[]));
        }
        Self {
            id: id.clone(),
            draft: String::new(),
        }
    }

    pub fn todos(doc: &SettingsDocument, id: &WidgetId) -> Vec<TodoEntry> {
        doc.widget_data(id)
            .and_then(|bag| bag.get("todos"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn apply(&mut self, input: TodoInput, ctx: &mut WidgetContext<'_>) {
        let mut todos = Self::todos(ctx.document(), &self.id);
        match input {
            TodoInput::Add(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                todos.push(TodoEntry::new(text));
            }
            TodoInput::Toggle(index) => match todos.get_mut(index) {
                Some(entry) => entry.completed = !entry.completed,
                None => {
                    tracing::warn!(widget = %self.id, index, "toggle on missing to-do");
                    return;
                }
            },
            TodoInput::Delete(index) => {
                if index >= todos.len() {
                    tracing::warn!(widget = %self.id, index, "delete on missing to-do");
                    return;
                }
                todos.remove(index);
            }
        }
        ctx.save_data(|bag| store_todos(bag, &todos));
    }
}

fn store_todos(bag: &mut Value, todos: &[TodoEntry]) {
    if !bag.is_object() {
        *bag = json!({});
    }
    if let Some(obj) = bag.as_object_mut() {
        obj.insert(
            "todos".into(),
            serde_json::to_value(todos).unwrap_or_else(|_| json!([])),
        );
    }
}

impl WidgetHandle for TodoWidget {
    fn cleanup(&mut self) {
        self.draft.clear();
    }

    fn handle_input(&mut self, input: WidgetInput, ctx: &mut WidgetContext<'_>) {
        if let WidgetInput::Todo(input) = input {
            self.apply(input, ctx);
        }
    }

    fn text_content(&self, doc: &SettingsDocument) -> Vec<String> {
        Self::todos(doc, &self.id)
            .into_iter()
            .map(|t| format!("[{}] {}", if t.completed { "x" } else { " " }, t.text))
            .collect()
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut WidgetContext<'_>) {
        let todos = Self::todos(ctx.document(), &self.id);
        let mut input = None;
        ui.horizontal(|ui| {
            let resp = ui.add(
                egui::TextEdit::singleline(&mut self.draft).hint_text("Add a new task..."),
            );
            let submitted = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Add").clicked() || submitted {
                input = Some(TodoInput::Add(std::mem::take(&mut self.draft)));
            }
        });
        for (idx, todo) in todos.iter().enumerate() {
            ui.horizontal(|ui| {
                let mut done = todo.completed;
                if ui.checkbox(&mut done, "").changed() {
                    input = Some(TodoInput::Toggle(idx));
                }
                let mut text = egui::RichText::new(&todo.text);
                if todo.completed {
                    text = text.strikethrough().weak();
                }
                ui.label(text);
                if ui.small_button("✕").clicked() {
                    input = Some(TodoInput::Delete(idx));
                }
            });
        }
        if let Some(input) = input {
            self.apply(input, ctx);
        }
    }
}
