//! Printable diet chart document.

use html_escape::encode_text;

use super::EXPORT_ANCHOR_ID;
use crate::models::{FoodItem, LetterheadSettings, MealPlan};
use crate::plan::{grand_totals, totals};

const CELL: &str = "padding: 6px; border: 1px solid #ddd;";
const CELL_NUM: &str = "text-align: right; padding: 6px; border: 1px solid #ddd;";
const TABLE: &str = "width: 100%; border-collapse: collapse; font-size: 12px;";

/// A diet chart laid out for printing.
#[derive(Debug, Clone)]
pub struct DietChartDocument {
    pub patient_name: String,
    pub letterhead: LetterheadSettings,
    pub chart: MealPlan,
    pub notes: String,
}

impl DietChartDocument {
    pub fn new(
        patient_name: impl Into<String>,
        letterhead: LetterheadSettings,
        chart: MealPlan,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            patient_name: patient_name.into(),
            letterhead,
            chart,
            notes: notes.into(),
        }
    }

    /// Non-blank note lines, trimmed.
    pub fn note_lines(&self) -> Vec<&str> {
        self.notes
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Render the full document under the export anchor.
    ///
    /// Meals without items are omitted. The notes page is only emitted when
    /// there is at least one non-blank line, and starts on a new page.
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(&format!(
            "<div id=\"{}\" style=\"padding: 20px; font-family: Arial, sans-serif; color: #333;\">\n",
            EXPORT_ANCHOR_ID
        ));

        // Letterhead
        html.push_str(
            "<header style=\"text-align: center; border-bottom: 2px solid #333; padding-bottom: 10px; margin-bottom: 20px;\">\n",
        );
        html.push_str(&format!(
            "<h1 style=\"margin: 0; font-size: 24px;\">{}</h1>\n",
            encode_text(self.letterhead.display_name())
        ));
        html.push_str(&format!(
            "<p style=\"margin: 4px 0 0;\">{} | {}</p>\n",
            encode_text(self.letterhead.display_email()),
            encode_text(self.letterhead.display_phone())
        ));
        html.push_str("</header>\n<main>\n");

        html.push_str(&format!(
            "<h2 style=\"font-size: 20px; margin-bottom: 10px;\">Diet Chart for: {}</h2>\n",
            encode_text(&self.patient_name)
        ));

        for (meal, items) in self.chart.meals() {
            if !items.is_empty() {
                render_meal_table(&mut html, meal.title(), items);
            }
        }

        render_grand_totals(&mut html, &self.chart);
        html.push_str("</main>\n");

        let notes = self.note_lines();
        if !notes.is_empty() {
            html.push_str("<section class=\"notes\" style=\"page-break-before: always;\">\n");
            html.push_str("<h3 style=\"font-size: 16px; font-weight: bold;\">Notes</h3>\n<ul>\n");
            for line in notes {
                html.push_str(&format!("<li>{}</li>\n", encode_text(line)));
            }
            html.push_str("</ul>\n</section>\n");
        }

        html.push_str("</div>\n");
        html
    }
}

fn render_meal_table(html: &mut String, title: &str, items: &[FoodItem]) {
    let subtotal = totals(items);

    html.push_str("<section style=\"margin-bottom: 16px;\">\n");
    html.push_str(&format!(
        "<h3 style=\"font-size: 16px; font-weight: bold; border-bottom: 1px solid #ccc;\">{}</h3>\n",
        title
    ));
    html.push_str(&format!("<table style=\"{TABLE}\">\n<thead>\n<tr>"));
    html.push_str(&format!("<th style=\"{CELL}\">Food Item</th>"));
    for heading in ["Calories", "Protein (g)", "Carbs (g)", "Fat (g)"] {
        html.push_str(&format!("<th style=\"{CELL_NUM}\">{heading}</th>"));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for item in items {
        html.push_str(&format!(
            "<tr><td style=\"{CELL}\">{}</td><td style=\"{CELL_NUM}\">{}</td><td style=\"{CELL_NUM}\">{}</td><td style=\"{CELL_NUM}\">{}</td><td style=\"{CELL_NUM}\">{}</td></tr>\n",
            encode_text(&item.label),
            item.calories,
            item.protein,
            item.carbs,
            item.fat
        ));
    }

    html.push_str(&format!(
        "<tr style=\"font-weight: bold;\"><td style=\"{CELL}\">Subtotal</td><td style=\"{CELL_NUM}\">{}</td><td style=\"{CELL_NUM}\">{}</td><td style=\"{CELL_NUM}\">{}</td><td style=\"{CELL_NUM}\">{}</td></tr>\n",
        subtotal.calories, subtotal.protein, subtotal.carbs, subtotal.fat
    ));
    html.push_str("</tbody>\n</table>\n</section>\n");
}

fn render_grand_totals(html: &mut String, chart: &MealPlan) {
    let grand = grand_totals(chart);

    html.push_str(
        "<section style=\"margin-top: 20px; padding-top: 10px; border-top: 2px solid #333;\">\n",
    );
    html.push_str("<h3 style=\"font-size: 16px; font-weight: bold;\">Grand Totals</h3>\n");
    html.push_str(&format!("<table style=\"{TABLE}\">\n<tbody>\n"));

    let rows = [
        ("Total Calories", grand.calories.to_string()),
        ("Total Protein", format!("{}g", grand.protein)),
        ("Total Carbs", format!("{}g", grand.carbs)),
        ("Total Fat", format!("{}g", grand.fat)),
    ];
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><td style=\"{CELL}\">{label}</td><td style=\"{CELL_NUM}\">{value}</td></tr>\n"
        ));
    }
    html.push_str("</tbody>\n</table>\n</section>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> MealPlan {
        let mut chart = MealPlan::new();
        chart.breakfast.push(FoodItem::new("100g oats", 200, 10, 20, 5));
        chart.lunch.push(FoodItem::new("200g dal", 300, 20, 30, 10));
        chart
    }

    #[test]
    fn test_letterhead_fallbacks() {
        let html = DietChartDocument::new("Jane", LetterheadSettings::default(), chart(), "")
            .render_html();
        assert!(html.contains("Your Nutritionist Name"));
        assert!(html.contains("your.email@example.com | (123) 456-7890"));
    }

    #[test]
    fn test_custom_letterhead() {
        let letterhead = LetterheadSettings {
            nutritionist_name: Some("Dr. Rao".into()),
            email: Some("rao@example.com".into()),
            phone: None,
        };
        let html = DietChartDocument::new("Jane", letterhead, chart(), "").render_html();
        assert!(html.contains("Dr. Rao"));
        assert!(html.contains("rao@example.com | (123) 456-7890"));
    }

    #[test]
    fn test_only_non_empty_meals_rendered() {
        let html = DietChartDocument::new("Jane", LetterheadSettings::default(), chart(), "")
            .render_html();
        assert!(html.contains(">Breakfast</h3>"));
        assert!(html.contains(">Lunch</h3>"));
        assert!(!html.contains(">Snacks</h3>"));
        assert!(!html.contains(">Dinner</h3>"));
        assert_eq!(html.matches(">Subtotal</td>").count(), 2);
    }

    #[test]
    fn test_grand_totals() {
        let html = DietChartDocument::new("Jane", LetterheadSettings::default(), chart(), "")
            .render_html();
        assert!(html.contains("Total Calories</td><td style=\"text-align: right; padding: 6px; border: 1px solid #ddd;\">500</td>"));
        assert!(html.contains(">30g</td>"));
        assert!(html.contains(">50g</td>"));
        assert!(html.contains(">15g</td>"));
    }

    #[test]
    fn test_notes_page_only_with_content() {
        let without = DietChartDocument::new("Jane", LetterheadSettings::default(), chart(), "  \n\n")
            .render_html();
        assert!(!without.contains("page-break-before"));

        let with = DietChartDocument::new(
            "Jane",
            LetterheadSettings::default(),
            chart(),
            "Drink water\n\n  Walk 30 minutes  ",
        )
        .render_html();
        assert!(with.contains("page-break-before: always"));
        assert!(with.contains("<li>Drink water</li>"));
        assert!(with.contains("<li>Walk 30 minutes</li>"));
        assert_eq!(with.matches("<li>").count(), 2);
    }

    #[test]
    fn test_text_is_escaped() {
        let mut chart = MealPlan::new();
        chart.snacks.push(FoodItem::new("<b>chips</b> & dip", 150, 2, 15, 9));
        let html = DietChartDocument::new(
            "Tom <script>",
            LetterheadSettings::default(),
            chart,
            "a < b",
        )
        .render_html();

        assert!(html.contains("&lt;b&gt;chips&lt;/b&gt; &amp; dip"));
        assert!(html.contains("Diet Chart for: Tom &lt;script&gt;"));
        assert!(html.contains("<li>a &lt; b</li>"));
        assert!(!html.contains("<script>"));
    }
}
