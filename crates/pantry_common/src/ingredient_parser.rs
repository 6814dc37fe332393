//! Recipe ingredient text parser.
//!
//! One line per row:
//!
//! ```text
//! Onion,1,diced
//! =Sauce=
//! Soy Sauce,2tbsp,
//! Mirin...1 tbsp
//! =
//! Rice
//! ```
//!
//! A line starting with `=` (or `＝`) sets the group for the following rows.
//! An empty marker or a blank line ends the group. Data lines are
//! `name, amount[unit], details`; `name…amount` and `name...amount` are
//! accepted too, and a line with no separator is a bare name.

use crate::models::RecipeIngredient;

/// One data line of the ingredient text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedRow {
    /// 1-based line number in the source text
    pub line: usize,
    pub name: String,
    pub amount: String,
    pub unit: String,
    pub details: String,
    /// Empty when ungrouped
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Blank,
    /// `,2` and the like: nothing to resolve, group unaffected
    Nameless,
    Group(String),
    Data {
        name: String,
        quantity: String,
        details: String,
    },
}

/// Accumulator threaded through the lines
#[derive(Debug, Default)]
struct ParseState {
    group: String,
    rows: Vec<ParsedRow>,
}

impl ParseState {
    fn step(mut self, line_no: usize, raw: &str) -> Self {
        match classify(raw) {
            LineKind::Blank => {
                self.group.clear();
            }
            LineKind::Group(name) => {
                self.group = name;
            }
            LineKind::Nameless => {}
            LineKind::Data {
                name,
                quantity,
                details,
            } => {
                let (amount, unit) = split_amount(&quantity);
                self.rows.push(ParsedRow {
                    line: line_no,
                    name,
                    amount,
                    unit,
                    details,
                    group_name: self.group.clone(),
                });
            }
        }
        self
    }
}

/// Parse the whole ingredient block
pub fn parse_ingredients(text: &str) -> Vec<ParsedRow> {
    text.lines()
        .enumerate()
        .fold(ParseState::default(), |state, (idx, raw)| {
            state.step(idx + 1, raw)
        })
        .rows
}

fn is_marker_char(c: char) -> bool {
    c == '=' || c == '＝'
}

fn classify(raw: &str) -> LineKind {
    let line = raw.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    if line.starts_with(is_marker_char) {
        let name = line
            .trim_matches(|c: char| is_marker_char(c) || c.is_whitespace())
            .to_string();
        return LineKind::Group(name);
    }

    let (name, quantity, details) = if line.contains(',') {
        let mut parts = line.split(',');
        let name = parts.next().unwrap_or_default().trim().to_string();
        let quantity = parts.next().unwrap_or_default().trim().to_string();
        let rest: Vec<&str> = parts.collect();
        (name, quantity, rest.join(",").trim().to_string())
    } else if let Some((name, quantity)) = line.split_once('…') {
        (name.trim().to_string(), quantity.trim().to_string(), String::new())
    } else if let Some((name, quantity)) = line.split_once("...") {
        (name.trim().to_string(), quantity.trim().to_string(), String::new())
    } else {
        (line.to_string(), String::new(), String::new())
    };

    if name.is_empty() {
        return LineKind::Nameless;
    }

    LineKind::Data {
        name,
        quantity,
        details,
    }
}

fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || ('０'..='９').contains(&c) || c == '.' || c == '/'
}

/// Split a fused quantity like `2tbsp` or `1/2 cup` into amount and unit.
///
/// Quantities that do not start with a number (`to taste`, `大さじ2`) stay
/// whole in the amount.
pub fn split_amount(quantity: &str) -> (String, String) {
    let quantity = quantity.trim();
    let numeric_len: usize = quantity
        .char_indices()
        .take_while(|(_, c)| is_numeric_char(*c))
        .map(|(_, c)| c.len_utf8())
        .sum();

    if numeric_len == 0 {
        return (quantity.to_string(), String::new());
    }

    let (amount, unit) = quantity.split_at(numeric_len);
    (amount.to_string(), unit.trim().to_string())
}

/// Rebuild ingredient text from resolved rows, so that editing and
/// re-saving a recipe reproduces its rows and groups.
pub fn render_ingredients(rows: &[RecipeIngredient]) -> String {
    let mut lines = Vec::with_capacity(rows.len());
    let mut current_group = String::new();

    for row in rows {
        if row.group_name != current_group {
            if row.group_name.is_empty() {
                lines.push("=".to_string());
            } else {
                lines.push(format!("={}=", row.group_name));
            }
            current_group = row.group_name.clone();
        }
        lines.push(format!("{},{}{},{}", row.name, row.amount, row.unit, row.details));
    }

    lines.join("\n")
}

/// Names in first-appearance order, without duplicates
pub fn distinct_names(rows: &[ParsedRow]) -> Vec<String> {
    let mut seen = Vec::new();
    for row in rows {
        if !row.name.is_empty() && !seen.contains(&row.name) {
            seen.push(row.name.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_applies_only_after_marker() {
        let rows = parse_ingredients("Onion,1,diced\n=Sauce=\nSoy Sauce,2tbsp,");
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].name, "Onion");
        assert_eq!(rows[0].amount, "1");
        assert_eq!(rows[0].details, "diced");
        assert_eq!(rows[0].group_name, "");

        assert_eq!(rows[1].name, "Soy Sauce");
        assert_eq!(rows[1].amount, "2");
        assert_eq!(rows[1].unit, "tbsp");
        assert_eq!(rows[1].details, "");
        assert_eq!(rows[1].group_name, "Sauce");
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn test_group_persists_until_ungroup_or_blank() {
        let text = "=Dough=\nFlour,200g\nWater,100ml\n=\nSalt\n=Topping=\nCheese,50g\n\nBasil";
        let rows = parse_ingredients(text);
        let groups: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.name.as_str(), r.group_name.as_str()))
            .collect();
        assert_eq!(
            groups,
            vec![
                ("Flour", "Dough"),
                ("Water", "Dough"),
                ("Salt", ""),
                ("Cheese", "Topping"),
                ("Basil", ""),
            ]
        );
    }

    #[test]
    fn test_full_width_marker() {
        let rows = parse_ingredients("＝たれ＝\n醤油,大さじ2");
        assert_eq!(rows[0].group_name, "たれ");
        assert_eq!(rows[0].amount, "大さじ2");
        assert_eq!(rows[0].unit, "");
    }

    #[test]
    fn test_alternative_separators() {
        let rows = parse_ingredients("Mirin...1 tbsp\nSake…50ml\nRice");
        assert_eq!(rows[0].name, "Mirin");
        assert_eq!((rows[0].amount.as_str(), rows[0].unit.as_str()), ("1", "tbsp"));
        assert_eq!(rows[1].name, "Sake");
        assert_eq!((rows[1].amount.as_str(), rows[1].unit.as_str()), ("50", "ml"));
        assert_eq!(rows[2].name, "Rice");
        assert_eq!(rows[2].amount, "");
    }

    #[test]
    fn test_details_keep_extra_commas() {
        let rows = parse_ingredients("Carrot, 1/2 , peeled, cut into sticks");
        assert_eq!(rows[0].amount, "1/2");
        assert_eq!(rows[0].details, "peeled, cut into sticks");
    }

    #[test]
    fn test_split_amount() {
        assert_eq!(split_amount("2tbsp"), ("2".into(), "tbsp".into()));
        assert_eq!(split_amount("1.5 kg"), ("1.5".into(), "kg".into()));
        assert_eq!(split_amount("3"), ("3".into(), "".into()));
        assert_eq!(split_amount("to taste"), ("to taste".into(), "".into()));
        assert_eq!(split_amount(""), ("".into(), "".into()));
    }

    #[test]
    fn test_render_reproduces_rows() {
        let resolved = vec![
            RecipeIngredient {
                name: "Onion".into(),
                amount: "1".into(),
                details: "diced".into(),
                ..Default::default()
            },
            RecipeIngredient {
                name: "Soy Sauce".into(),
                amount: "2".into(),
                unit: "tbsp".into(),
                group_name: "Sauce".into(),
                ..Default::default()
            },
            RecipeIngredient {
                name: "Rice".into(),
                amount: "300".into(),
                unit: "g".into(),
                ..Default::default()
            },
        ];
        let text = render_ingredients(&resolved);
        assert_eq!(text, "Onion,1,diced\n=Sauce=\nSoy Sauce,2tbsp,\n=\nRice,300g,");

        let reparsed = parse_ingredients(&text);
        for (row, original) in reparsed.iter().zip(&resolved) {
            assert_eq!(row.name, original.name);
            assert_eq!(row.amount, original.amount);
            assert_eq!(row.unit, original.unit);
            assert_eq!(row.details, original.details);
            assert_eq!(row.group_name, original.group_name);
        }
    }

    #[test]
    fn test_distinct_names() {
        let rows = parse_ingredients("Salt,1\nPepper\nSalt,2\n,3");
        assert_eq!(distinct_names(&rows), vec!["Salt", "Pepper"]);
    }
}
