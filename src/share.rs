// Shopping list sharing

use crate::models::Item;

const HEADER: &str = "*🛒 My Shopping List*";
const FOOTER: &str = "_Sent via GroceryTracker_";
const WHATSAPP_BASE: &str = "https://wa.me/?text=";

/// Numbered plain-text message listing the given items
pub fn shopping_list_message<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a Item>,
{
    let lines: Vec<String> = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| format!("{}. {} ({} {})", idx + 1, item.name, item.quantity, item.unit))
        .collect();

    format!("{}\n\n{}\n\n{}", HEADER, lines.join("\n"), FOOTER)
}

/// Click-to-chat link carrying the message
pub fn whatsapp_link(message: &str) -> String {
    format!("{}{}", WHATSAPP_BASE, urlencoding::encode(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Status, Unit};

    fn planned(name: &str, quantity: f64, unit: Unit) -> Item {
        Item {
            id: 1,
            name: name.to_string(),
            price: 0.0,
            quantity,
            unit,
            total: 0.0,
            status: Status::Planned,
            date: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_message_lists_items_in_order() {
        let items = vec![planned("Eggs", 12.0, Unit::Count), planned("Flour", 1.5, Unit::Kilogram)];
        let message = shopping_list_message(&items);
        assert_eq!(
            message,
            "*🛒 My Shopping List*\n\n1. Eggs (12 count)\n2. Flour (1.5 kg)\n\n_Sent via GroceryTracker_"
        );
    }

    #[test]
    fn test_whatsapp_link_is_encoded() {
        let link = whatsapp_link("1. Eggs (12 count)\n");
        assert_eq!(link, "https://wa.me/?text=1.%20Eggs%20%2812%20count%29%0A");
    }
}
