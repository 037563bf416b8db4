//! Plain-text rendering of a recipe for the terminal

use std::fmt::Write;

use crate::data::Recipe;

/// Formats minutes as "1 hr 15 min", "45 min", or "0 min"
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{} min", m),
        (h, 0) => format!("{} hr", h),
        (h, m) => format!("{} hr {} min", h, m),
    }
}

/// Renders a recipe as a readable text page
pub fn render_recipe(recipe: &Recipe) -> String {
    // Writing to a String cannot fail
    let mut out = String::new();

    let _ = writeln!(out, "{}", recipe.title);
    let _ = writeln!(out, "{}", "=".repeat(recipe.title.chars().count()));
    let _ = writeln!(out, "{}", recipe.description);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Prep: {}  |  Cook: {}  |  Total: {}  |  Servings: {}  |  Difficulty: {}",
        format_minutes(recipe.prep_time),
        format_minutes(recipe.cook_time),
        format_minutes(recipe.total_time()),
        recipe.servings,
        recipe.difficulty_level
    );
    if let Some(rating) = recipe.user_rating {
        let _ = writeln!(out, "Rating: {:.1} / 5", rating);
    }

    section(&mut out, "Ingredients");
    for ingredient in &recipe.ingredients {
        let quantity = [ingredient.amount.as_str(), ingredient.unit.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if quantity.is_empty() {
            let _ = writeln!(out, "  - {}", ingredient.name);
        } else {
            let _ = writeln!(out, "  - {} {}", quantity, ingredient.name);
        }
    }

    section(&mut out, "Instructions");
    for instruction in &recipe.instructions {
        let _ = writeln!(out, "  {}. {}", instruction.step, instruction.description);
    }

    if let Some(nutrition) = &recipe.nutritional_info {
        section(&mut out, "Nutrition (per serving)");
        let _ = writeln!(
            out,
            "  Calories: {}  Protein: {}g  Carbohydrates: {}g  Fat: {}g",
            nutrition.calories, nutrition.protein, nutrition.carbohydrates, nutrition.fat
        );
    }

    list_section(&mut out, "Special Equipment", recipe.special_equipment.as_deref());
    list_section(&mut out, "Tips", recipe.tips.as_deref());

    section(&mut out, "Related Recipes");
    for related in &recipe.related_recipe_ids {
        let _ = writeln!(out, "  - {}", related);
    }

    if let Some(suggestions) = recipe
        .meal_planning_suggestions
        .as_ref()
        .filter(|s| !s.is_empty())
    {
        section(&mut out, "Meal Planning");
        for suggestion in suggestions {
            let _ = writeln!(out, "  - {}: {}", suggestion.category, suggestion.id);
        }
    }

    if let Some(comments) = recipe.comments.as_ref().filter(|c| !c.is_empty()) {
        section(&mut out, "Comments");
        for comment in comments {
            let stars = comment
                .rating
                .map(|r| format!(" ({}/5)", r))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {} on {}{}: {}",
                comment.user,
                comment.date.format("%Y-%m-%d"),
                stars,
                comment.content
            );
        }
    }

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

fn list_section(out: &mut String, title: &str, items: Option<&[String]>) {
    let Some(items) = items.filter(|items| !items.is_empty()) else {
        return;
    };
    section(out, title);
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}
