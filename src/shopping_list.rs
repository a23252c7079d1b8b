//! Folding a user's basket into one shopping list.

use std::{collections::HashMap, fmt};

use serde::Serialize;

use crate::db::BasketLine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.measurement_unit, self.amount)
    }
}

/// Totals per ingredient name, in the order names were first seen.
#[derive(Debug, Default)]
pub struct ShoppingList {
    items: Vec<ShoppingItem>,
    index: HashMap<String, usize>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the total for `name`. The unit of the first occurrence is kept.
    pub fn add(&mut self, name: &str, measurement_unit: &str, amount: i64) {
        match self.index.get(name) {
            Some(&position) => self.items[position].amount += amount,
            None => {
                self.index.insert(name.to_string(), self.items.len());
                self.items.push(ShoppingItem {
                    name: name.to_string(),
                    measurement_unit: measurement_unit.to_string(),
                    amount,
                });
            }
        }
    }

    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One `Наименование: <name>, количество: <amount>, <unit>.` line per item.
    pub fn to_labelled_text(&self) -> String {
        self.items
            .iter()
            .map(|item| {
                format!(
                    "Наименование: {}, количество: {}, {}.\n",
                    item.name, item.amount, item.measurement_unit
                )
            })
            .collect()
    }

    /// One `<name> (<unit>) - <total>` line per item.
    pub fn to_compact_text(&self) -> String {
        self.items.iter().map(|item| format!("{item}\n")).collect()
    }

    pub fn into_items(self) -> Vec<ShoppingItem> {
        self.items
    }
}

impl FromIterator<BasketLine> for ShoppingList {
    fn from_iter<I: IntoIterator<Item = BasketLine>>(iter: I) -> Self {
        let mut list = ShoppingList::new();
        for line in iter {
            list.add(&line.name, &line.measurement_unit, i64::from(line.amount));
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, measurement_unit: &str, amount: i32) -> BasketLine {
        BasketLine {
            name: name.to_string(),
            measurement_unit: measurement_unit.to_string(),
            amount,
        }
    }

    #[test]
    fn sums_repeated_ingredients_in_first_seen_order() {
        // Recipe A: flour 200 g, sugar 50 g. Recipe B: flour 100 g.
        let list: ShoppingList = vec![
            line("Flour", "g", 200),
            line("Sugar", "g", 50),
            line("Flour", "g", 100),
        ]
        .into_iter()
        .collect();

        let lines: Vec<String> = list.items().iter().map(ToString::to_string).collect();
        assert_eq!(lines, ["Flour (g) - 300", "Sugar (g) - 50"]);
    }

    #[test]
    fn total_equals_sum_over_every_recipe() {
        let amounts = [3, 7, 11, 13];
        let mut lines = Vec::new();
        for (i, amount) in amounts.iter().enumerate() {
            lines.push(line("Egg", "pcs", *amount));
            lines.push(line(&format!("Spice {i}"), "pinch", 1));
        }

        let list: ShoppingList = lines.into_iter().collect();
        assert_eq!(list.items()[0].amount, amounts.iter().map(|a| i64::from(*a)).sum::<i64>());
        assert_eq!(list.items().len(), amounts.len() + 1);
    }

    #[test]
    fn empty_basket_yields_empty_list() {
        let list: ShoppingList = Vec::<BasketLine>::new().into_iter().collect();
        assert!(list.is_empty());
        assert_eq!(list.to_labelled_text(), "");
    }

    #[test]
    fn keeps_the_first_unit_for_a_name() {
        let mut list = ShoppingList::new();
        list.add("Milk", "ml", 200);
        list.add("Milk", "l", 1);
        assert_eq!(list.items()[0].measurement_unit, "ml");
        assert_eq!(list.items()[0].amount, 201);
    }

    #[test]
    fn totals_do_not_overflow_i32() {
        let list: ShoppingList = vec![line("Rice", "g", i32::MAX), line("Rice", "g", i32::MAX)]
            .into_iter()
            .collect();
        assert_eq!(list.items()[0].amount, 2 * i64::from(i32::MAX));
    }

    #[test]
    fn renders_both_text_formats() {
        let mut list = ShoppingList::new();
        list.add("Flour", "g", 300);
        list.add("Sugar", "g", 50);

        assert_eq!(
            list.to_labelled_text(),
            "Наименование: Flour, количество: 300, g.\nНаименование: Sugar, количество: 50, g.\n"
        );
        assert_eq!(list.to_compact_text(), "Flour (g) - 300\nSugar (g) - 50\n");
    }
}
