//! HTML templates.
//!
//! Pages are plain `format!` templates. Every interpolated user value goes
//! through [`escape`].

use crate::routes::Route;
use crate::types::TodoItem;
use crossoff_web::{escape, Page};
// Writing into a `String` never fails, so `let _ = write!(..)` drops nothing
use std::fmt::Write as _;

/// Template name of the list page.
pub const HOME: &str = "home.html";

/// Template name of the edit form.
pub const EDIT: &str = "edit.html";

/// Data for the list page.
#[derive(Debug, Clone, Default)]
pub struct HomeView {
    /// Every item, in id order
    pub items: Vec<TodoItem>,
    /// Validation message from a rejected add
    pub error: Option<String>,
    /// Text to put back into the add box after a rejected add
    pub draft: String,
}

/// Data for the edit form.
#[derive(Debug, Clone)]
pub struct EditView {
    /// Item being edited
    pub item: TodoItem,
    /// Validation message from a rejected save
    pub error: Option<String>,
    /// Text to show in the form (the stored text, or the rejected submission)
    pub draft: String,
    /// Status preselected in the form
    pub completed: bool,
}

impl EditView {
    /// Blank form for `item`.
    #[must_use]
    pub fn new(item: TodoItem) -> Self {
        Self {
            draft: item.text.clone(),
            completed: item.completed,
            item,
            error: None,
        }
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>li.done .text {{ text-decoration: line-through; color: #888; }}</style>\n\
         </head>\n\
         <body>\n{body}</body>\n\
         </html>\n",
        title = escape(title),
    )
}

fn error_block(error: Option<&str>) -> String {
    error.map_or_else(String::new, |message| {
        format!("<p class=\"error\">{}</p>\n", escape(message))
    })
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Render the list page.
#[must_use]
pub fn home(view: &HomeView) -> Page {
    let done = view.items.iter().filter(|item| item.completed).count();

    let mut body = String::new();
    body.push_str("<h1>To-do list</h1>\n");
    let _ = write!(
        body,
        "<form method=\"post\" action=\"{action}\">\n\
         <input type=\"text\" name=\"item\" value=\"{draft}\" placeholder=\"What needs doing?\">\n\
         <button type=\"submit\">Add</button>\n\
         </form>\n",
        action = Route::Home,
        draft = escape(&view.draft),
    );
    body.push_str(&error_block(view.error.as_deref()));
    let _ = writeln!(
        body,
        "<p class=\"summary\">{}, {done} done</p>",
        plural(view.items.len(), "item")
    );

    if view.items.is_empty() {
        body.push_str("<p class=\"empty\">Nothing to do.</p>\n");
    } else {
        body.push_str("<ul class=\"items\">\n");
        for item in &view.items {
            let (class, toggle, toggle_label) = if item.completed {
                ("done", Route::Uncross(item.id), "Uncross")
            } else {
                ("pending", Route::CrossOff(item.id), "Cross off")
            };
            let _ = writeln!(
                body,
                "<li class=\"item {class}\" id=\"item-{id}\"><span class=\"text\">{text}</span> \
                 <a href=\"{toggle}\">{toggle_label}</a> \
                 <a href=\"{edit}\">Edit</a> \
                 <a href=\"{delete}\">Delete</a></li>",
                id = item.id,
                text = escape(&item.text),
                edit = Route::Edit(item.id),
                delete = Route::Delete(item.id),
            );
        }
        body.push_str("</ul>\n");
    }

    Page::ok(HOME, layout("To-do list", &body))
}

/// Render the edit form.
#[must_use]
pub fn edit(view: &EditView) -> Page {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Edit item {}</h1>", view.item.id);
    body.push_str(&error_block(view.error.as_deref()));
    let _ = write!(
        body,
        "<form method=\"post\" action=\"{action}\">\n\
         <input type=\"text\" name=\"item\" value=\"{draft}\">\n\
         <select name=\"completed\">\n\
         <option value=\"false\"{pending}>Pending</option>\n\
         <option value=\"true\"{done}>Done</option>\n\
         </select>\n\
         <button type=\"submit\">Save</button>\n\
         </form>\n\
         <p><a href=\"{home}\">Back to the list</a></p>\n",
        action = Route::Edit(view.item.id),
        draft = escape(&view.draft),
        pending = if view.completed { "" } else { " selected" },
        done = if view.completed { " selected" } else { "" },
        home = Route::Home,
    );

    Page::ok(EDIT, layout("Edit item", &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoId;

    fn item(id: u64, text: &str, completed: bool) -> TodoItem {
        TodoItem {
            id: TodoId::new(id),
            text: text.to_string(),
            completed,
        }
    }

    #[test]
    fn empty_home_page() {
        let page = home(&HomeView::default());

        assert!(page.html().contains("0 items, 0 done"));
        assert!(page.html().contains("Nothing to do."));
    }

    #[test]
    fn home_lists_items_with_toggle_links() {
        let page = home(&HomeView {
            items: vec![item(1, "Buy milk", false), item(2, "Walk the dog", true)],
            ..HomeView::default()
        });
        let html = page.html();

        assert!(html.contains("2 items, 1 done"));
        assert!(html.contains("<a href=\"/cross_off/1\">Cross off</a>"));
        assert!(html.contains("<a href=\"/uncross/2\">Uncross</a>"));
        assert!(html.contains("<a href=\"/edit/2\">Edit</a>"));
        assert!(html.contains("<a href=\"/delete/1\">Delete</a>"));
    }

    #[test]
    fn home_escapes_item_text() {
        let page = home(&HomeView {
            items: vec![item(1, "<script>alert('x')</script>", false)],
            ..HomeView::default()
        });

        assert!(page.html().contains("&lt;script&gt;"));
        assert!(!page.html().contains("<script>"));
    }

    #[test]
    fn single_item_summary_is_singular() {
        let page = home(&HomeView {
            items: vec![item(1, "Buy milk", true)],
            ..HomeView::default()
        });
        assert!(page.html().contains("1 item, 1 done"));
    }

    #[test]
    fn edit_form_reflects_draft_and_status() {
        let mut view = EditView::new(item(4, "Buy milk", true));
        assert!(edit(&view).html().contains("<option value=\"true\" selected>Done</option>"));

        view.completed = false;
        view.draft = "\"quoted\"".to_string();
        view.error = Some("Item text cannot be empty".to_string());
        let html = edit(&view).html().to_string();

        assert!(html.contains("<option value=\"false\" selected>Pending</option>"));
        assert!(html.contains("value=\"&quot;quoted&quot;\""));
        assert!(html.contains("action=\"/edit/4\""));
        assert!(html.contains("<p class=\"error\">Item text cannot be empty</p>"));
    }
}
