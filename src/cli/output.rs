use crate::server::QueueItem;

/// Format the server queue for display (human or JSON)
pub fn format_queue(items: &[QueueItem], json: bool) -> String {
    if json {
        serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
    } else {
        if items.is_empty() {
            return "Queue is empty.".to_string();
        }

        // Width of the widest value per column, floored at the header width
        let id_width = items
            .iter()
            .map(|item| item.id.to_string().len())
            .max()
            .unwrap_or(0)
            .max(2);
        let title_width = items
            .iter()
            .map(|item| item.title.as_deref().unwrap_or("—").chars().count())
            .max()
            .unwrap_or(0)
            .max(5);
        let quality_width = items
            .iter()
            .map(|item| item.quality.chars().count())
            .max()
            .unwrap_or(0)
            .max(7);
        let format_width = items
            .iter()
            .map(|item| item.format_selector.chars().count())
            .max()
            .unwrap_or(0)
            .max(6);

        let mut output = String::new();
        output.push_str(&format!(
            "{:<id_width$}  {:<title_width$}  {:<quality_width$}  {:<format_width$}  {}\n",
            "ID", "TITLE", "QUALITY", "FORMAT", "URL"
        ));

        for item in items {
            let title = item.title.as_deref().unwrap_or("—");
            output.push_str(&format!(
                "{:<id_width$}  {:<title_width$}  {:<quality_width$}  {:<format_width$}  {}\n",
                item.id, title, item.quality, item.format_selector, item.url
            ));
        }

        // Drop the trailing newline, println adds one
        output.pop();
        output
    }
}
